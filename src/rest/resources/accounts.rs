//! Account resource implementation (auth service).
//!
//! Account endpoints act on behalf of an end user. The user's access token,
//! and for sensitive changes a password validation token, travel as request
//! headers alongside the client credentials.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clients::{HttpMethod, HttpRequest, Transport};
use crate::config::{AccessToken, ApiVersion};
use crate::rest::{
    json_body, ApiMethod, Filter, QueryParams, Resource, ResourceClient, ResourceError,
};

/// Header carrying the end user's access token.
pub const ACCOUNT_ACCESS_TOKEN_HEADER: &str = "accountAccessToken";

/// Header carrying a password validation token.
pub const PASSWORD_VALIDATION_TOKEN_HEADER: &str = "accountPasswordValidationToken";

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// The account can sign in.
    Active,
    /// Sign-in is blocked by an administrator.
    Blocked,
    /// The account has not completed registration.
    Pending,
}

/// A phone number attached to an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BaseAccountPhone {
    /// The phone number.
    pub value: String,
    /// Whether the number was confirmed with a code.
    pub verified: bool,
    /// When the number was removed, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// An account, plus whatever custom attributes the platform stores on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BaseAccountInfo {
    /// The unique identifier of the account.
    pub id: String,
    /// Set while the email address is unconfirmed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_email_not_verified: Option<bool>,
    /// Set while multi-factor setup is unfinished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mfa_incomplete: Option<bool>,
    /// The account's email address.
    pub email: String,
    /// Phone numbers attached to the account.
    #[serde(default)]
    pub phones: Vec<BaseAccountPhone>,
    /// Last activity as a Unix timestamp in milliseconds.
    #[serde(default)]
    pub last_active_at: Option<i64>,
    /// Lifecycle state of the account.
    pub status: AccountStatus,
    /// Custom attributes (e.g., `borrowerId`), keyed by wire name.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Resource for BaseAccountInfo {
    const NAME: &'static str = "Account";
    const PATH: &'static str = "accounts";
}

/// Parameters for [`AccountsApi::create`].
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountParams {
    /// Email address to register.
    pub email: String,
    /// Phone number to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Initial password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Extra string attributes sent alongside the fields above.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAccountBody<'a> {
    #[serde(flatten)]
    params: &'a CreateAccountParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token_expiration_time_minutes: Option<u32>,
}

/// Tokens issued when an account is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Token authenticating the new account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Token used to obtain new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Any other fields the auth service returned.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Result of [`AccountsApi::create_password_validation_token`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PasswordValidationTokenResponse {
    /// Token proving the password was re-entered recently.
    pub password_validation_token: String,
}

/// Parameters for [`AccountsApi::find`]. Every list is sent as repeated
/// keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindAccountsParams {
    /// Account identifiers.
    pub ids: Option<Vec<String>>,
    /// Email addresses.
    pub emails: Option<Vec<String>>,
    /// Phone numbers.
    pub phones: Option<Vec<String>>,
    /// Borrowers the accounts belong to.
    pub borrower_ids: Option<Vec<String>>,
    /// Intermediaries the accounts belong to.
    pub intermediary_ids: Option<Vec<String>>,
}

impl QueryParams for FindAccountsParams {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .with("ids", self.ids.as_ref())
            .with("emails", self.emails.as_ref())
            .with("phones", self.phones.as_ref())
            .with("borrowerIds", self.borrower_ids.as_ref())
            .with("intermediaryIds", self.intermediary_ids.as_ref())
    }
}

/// Client for `/accounts` on the auth service.
#[derive(Debug)]
pub struct AccountsApi<T> {
    base: ResourceClient<BaseAccountInfo, T>,
}

impl<T: Transport> AccountsApi<T> {
    /// Creates a client over `transport`, which must point at the auth service.
    #[must_use]
    pub fn new(transport: T, version: Option<ApiVersion>) -> Self {
        Self {
            base: ResourceClient::new(transport, version),
        }
    }

    /// Looks an account up by email address.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport or decoding failure.
    pub async fn find_by_email(&self, email: &str) -> Result<BaseAccountInfo, ResourceError> {
        self.base
            .get(ApiMethod::Find, self.base.member_path(email), &())
            .await
    }

    /// Registers an account and returns its tokens.
    ///
    /// `refresh_token_expiration_minutes` overrides the refresh token lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn create(
        &self,
        params: &CreateAccountParams,
        refresh_token_expiration_minutes: Option<u32>,
    ) -> Result<AuthResponse, ResourceError> {
        let body = CreateAccountBody {
            params,
            refresh_token_expiration_time_minutes: refresh_token_expiration_minutes,
        };
        self.base
            .send_json(
                ApiMethod::Create,
                HttpMethod::Post,
                self.base.collection_path(),
                &body,
            )
            .await
    }

    /// The account the access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport or decoding failure.
    pub async fn get_current_user(
        &self,
        access_token: &AccessToken,
    ) -> Result<BaseAccountInfo, ResourceError> {
        let request = account_request(
            HttpMethod::Get,
            self.base.collection_path(),
            None,
            access_token,
            None,
        )?;
        self.base.call(ApiMethod::Find, request).await
    }

    /// Sends a confirmation code to the phone number replacing the current one.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport failure.
    pub async fn send_update_phone_number_code(
        &self,
        phone: &str,
        access_token: &AccessToken,
        password_validation_token: &AccessToken,
    ) -> Result<(), ResourceError> {
        self.send_void(
            ApiMethod::Update,
            HttpMethod::Put,
            self.base.sub_path("phone"),
            Some(json!({ "phone": phone })),
            access_token,
            Some(password_validation_token),
        )
        .await
    }

    /// Confirms a phone number change with the code sent by
    /// [`send_update_phone_number_code`](Self::send_update_phone_number_code).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport failure.
    pub async fn update_phone_number(
        &self,
        code: &str,
        access_token: &AccessToken,
    ) -> Result<(), ResourceError> {
        self.send_void(
            ApiMethod::Update,
            HttpMethod::Put,
            self.verification_path("phone", code),
            None,
            access_token,
            None,
        )
        .await
    }

    /// Sends a confirmation code to a phone number being added.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport failure.
    pub async fn send_add_phone_number_code(
        &self,
        phone: &str,
        access_token: &AccessToken,
        password_validation_token: &AccessToken,
    ) -> Result<(), ResourceError> {
        self.send_void(
            ApiMethod::Create,
            HttpMethod::Post,
            self.base.sub_path("phone"),
            Some(json!({ "phone": phone })),
            access_token,
            Some(password_validation_token),
        )
        .await
    }

    /// Confirms a new phone number with the code sent by
    /// [`send_add_phone_number_code`](Self::send_add_phone_number_code).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport failure.
    pub async fn add_phone_number(
        &self,
        code: &str,
        access_token: &AccessToken,
    ) -> Result<(), ResourceError> {
        self.send_void(
            ApiMethod::Create,
            HttpMethod::Post,
            self.verification_path("phone", code),
            None,
            access_token,
            None,
        )
        .await
    }

    /// Removes a phone number from the account.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport failure.
    pub async fn delete_phone_number(
        &self,
        phone: &str,
        access_token: &AccessToken,
        password_validation_token: &AccessToken,
    ) -> Result<(), ResourceError> {
        self.send_void(
            ApiMethod::Update,
            HttpMethod::Put,
            self.base.sub_path("delete-phone"),
            Some(json!({ "phone": phone })),
            access_token,
            Some(password_validation_token),
        )
        .await
    }

    /// Sends a confirmation code to the email address replacing the current one.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport failure.
    pub async fn send_update_email_code(
        &self,
        email: &str,
        access_token: &AccessToken,
        password_validation_token: &AccessToken,
    ) -> Result<(), ResourceError> {
        self.send_void(
            ApiMethod::Update,
            HttpMethod::Put,
            self.base.sub_path("email"),
            Some(json!({ "email": email })),
            access_token,
            Some(password_validation_token),
        )
        .await
    }

    /// Confirms an email change with the code sent by
    /// [`send_update_email_code`](Self::send_update_email_code).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport failure.
    pub async fn update_email_address(
        &self,
        code: &str,
        access_token: &AccessToken,
    ) -> Result<(), ResourceError> {
        self.send_void(
            ApiMethod::Update,
            HttpMethod::Put,
            self.verification_path("email", code),
            None,
            access_token,
            None,
        )
        .await
    }

    /// Exchanges the account password for a short-lived token required by
    /// the phone and email change flows.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport or decoding failure.
    pub async fn create_password_validation_token(
        &self,
        password: &str,
        access_token: &AccessToken,
    ) -> Result<PasswordValidationTokenResponse, ResourceError> {
        let request = account_request(
            HttpMethod::Post,
            self.base.sub_path("password-validation-token"),
            Some(json!({ "password": password })),
            access_token,
            None,
        )?;
        self.base.call(ApiMethod::Create, request).await
    }

    /// Changes the account password.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport failure.
    pub async fn update_password(
        &self,
        old_password: &str,
        new_password: &str,
        access_token: &AccessToken,
    ) -> Result<(), ResourceError> {
        self.send_void(
            ApiMethod::Update,
            HttpMethod::Put,
            self.base.sub_path("password"),
            Some(json!({ "oldPassword": old_password, "newPassword": new_password })),
            access_token,
            None,
        )
        .await
    }

    /// Accounts matching any of the given ids, emails or phones.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn find(
        &self,
        params: &FindAccountsParams,
    ) -> Result<Vec<BaseAccountInfo>, ResourceError> {
        self.base
            .get(ApiMethod::FindCollection, self.base.sub_path("search"), params)
            .await
    }

    fn verification_path(&self, channel: &str, code: &str) -> String {
        format!(
            "{}/{}",
            self.base.sub_path(channel),
            urlencoding::encode(code)
        )
    }

    async fn send_void(
        &self,
        api_method: ApiMethod,
        method: HttpMethod,
        path: String,
        body: Option<serde_json::Value>,
        access_token: &AccessToken,
        password_validation_token: Option<&AccessToken>,
    ) -> Result<(), ResourceError> {
        let request = account_request(
            method,
            path,
            body,
            access_token,
            password_validation_token,
        )?;
        self.base.send(api_method, request).await?;
        Ok(())
    }
}

fn account_request(
    method: HttpMethod,
    path: String,
    body: Option<serde_json::Value>,
    access_token: &AccessToken,
    password_validation_token: Option<&AccessToken>,
) -> Result<HttpRequest, ResourceError> {
    let mut builder = HttpRequest::builder(method, path)
        .header(ACCOUNT_ACCESS_TOKEN_HEADER, access_token.as_ref());
    if let Some(token) = password_validation_token {
        builder = builder.header(PASSWORD_VALIDATION_TOKEN_HEADER, token.as_ref());
    }
    if let Some(body) = body {
        builder = builder.json(json_body(&body)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_params_use_repeated_keys() {
        let params = FindAccountsParams {
            ids: Some(vec!["1".to_string(), "2".to_string()]),
            borrower_ids: Some(vec!["b1".to_string()]),
            ..Default::default()
        };

        assert_eq!(
            params.to_filter().to_query_string().unwrap(),
            "ids=1&ids=2&borrowerIds=b1"
        );
    }

    #[test]
    fn test_create_body_flattens_attributes() {
        let params = CreateAccountParams {
            email: "jo@example.com".to_string(),
            attributes: BTreeMap::from([("firstName".to_string(), "Jo".to_string())]),
            ..Default::default()
        };
        let body = CreateAccountBody {
            params: &params,
            refresh_token_expiration_time_minutes: Some(60),
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "email": "jo@example.com",
                "firstName": "Jo",
                "refreshTokenExpirationTimeMinutes": 60
            })
        );
    }

    #[test]
    fn test_account_request_carries_token_headers() {
        let access = AccessToken::new("access").unwrap();
        let validation = AccessToken::new("validation").unwrap();

        let request = account_request(
            HttpMethod::Put,
            "/accounts/phone".to_string(),
            Some(json!({"phone": "+15550100"})),
            &access,
            Some(&validation),
        )
        .unwrap();

        assert_eq!(request.header(ACCOUNT_ACCESS_TOKEN_HEADER), Some("access"));
        assert_eq!(
            request.header(PASSWORD_VALIDATION_TOKEN_HEADER),
            Some("validation")
        );
    }

    #[test]
    fn test_account_info_keeps_custom_attributes() {
        let account: BaseAccountInfo = serde_json::from_value(json!({
            "id": "acc1",
            "email": "jo@example.com",
            "phones": [{"value": "+15550100", "verified": true}],
            "lastActiveAt": null,
            "status": "active",
            "firstName": "Jo"
        }))
        .unwrap();

        assert_eq!(account.status, AccountStatus::Active);
        assert_eq!(account.attributes.get("firstName"), Some(&json!("Jo")));
    }
}
