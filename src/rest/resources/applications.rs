//! Application resource implementation.
//!
//! Applications are version-gated: `find` is served by offset pagination on
//! [`ApiVersion::Legacy`] and by ranked search on newer versions, and `list`
//! does not exist on `Legacy` at all.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::clients::{HttpMethod, Transport};
use crate::config::ApiVersion;
use crate::rest::{
    ApiMethod, Creatable, CursorPaginationResult, CursorParams, Deletable, Filter, Findable,
    HighlightSpan, Listable, PaginationResult, QueryParams, RangeFilter, Resource, ResourceClient,
    ResourceError, SortDirection, SortSpec, Updatable,
};

use super::application_statuses::ApplicationStatusType;
use super::common::{BorrowerType, StatusPermissions, UserShort, VariableValue};

/// Name of the variable holding the requested loan amount.
pub const LOAN_AMOUNT_VARIABLE: &str = "loan_amount";

/// The status an application is currently in.
///
/// A snapshot of the [`ApplicationStatus`](super::ApplicationStatus) embedded
/// in every application, carrying the permission groups that gate the board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusInfo {
    /// The unique identifier of the status.
    pub id: String,
    /// Display name of the status.
    pub name: String,
    /// Permission groups that see the application on the board.
    #[serde(default)]
    pub permission_groups_able_to_view_application_on_board: StatusPermissions,
    /// Permission groups allowed to edit the application in this status.
    #[serde(default)]
    pub permission_groups_to_edit_application: StatusPermissions,
    /// Permission groups allowed to move an application into this status.
    #[serde(default)]
    pub permission_groups_to_move_application_into_status: StatusPermissions,
    /// Whether this is an approval, rejection or custom status.
    #[serde(rename = "type")]
    pub status_type: ApplicationStatusType,
    /// When the status was archived, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
}

/// A platform user assigned to an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTeamMember {
    /// The user's identifier.
    pub id: String,
    /// The user's first name.
    pub first_name: String,
    /// The user's last name.
    pub last_name: String,
    /// The user's email address.
    pub email: String,
    /// Identifier of the user's avatar image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<String>,
}

/// A colored label attached to an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApplicationLabel {
    /// The unique identifier of the label.
    pub id: String,
    /// Display name of the label.
    pub name: String,
    /// Label color as a CSS color string (e.g., "#FF0000").
    pub color: String,
}

/// The product an application was created for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationProduct {
    /// The unique identifier of the product.
    pub id: String,
    /// Display name of the product.
    pub name: String,
    /// The organization owning the product.
    pub organization_id: String,
    /// Organization configuration version the product belongs to.
    pub organization_version: u64,
    /// Borrower types the product accepts.
    #[serde(default)]
    pub borrower_types: Vec<BorrowerType>,
}

/// A loan application.
///
/// Applications tie a borrower (and optional co-borrowers and intermediary)
/// to a product, and move through the product's statuses. Most business
/// data lives in `variables`, keyed by variable system name.
///
/// # Fields
///
/// Read-only fields set by the platform:
/// - `id`, `organization_id`, `display_id` - Identifiers
/// - `created_at`, `updated_at`, `created_by`, `updated_by` - Audit data
/// - `approved_at`, `rejected_at`, `transitioned_to_status_at` - Status history
/// - `highlights` - Search highlights, only present on search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// The unique identifier of the application.
    pub id: String,
    /// The organization owning the application.
    pub organization_id: String,
    /// Short human-readable identifier shown in the UI.
    pub display_id: String,
    /// Variable values keyed by variable system name.
    #[serde(default)]
    pub variables: BTreeMap<String, VariableValue>,
    /// The status the application is currently in.
    pub status: ApplicationStatusInfo,
    /// The primary borrower.
    pub borrower_id: String,
    /// Co-borrowers, in the order they were added.
    #[serde(default)]
    pub coborrower_ids: Vec<String>,
    /// The intermediary (broker) attached to the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediary_id: Option<String>,
    /// Reasons recorded when the application was rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reasons: Option<Vec<String>>,
    /// Users assigned to the application.
    #[serde(default)]
    pub team_members: Vec<ApplicationTeamMember>,
    /// Labels attached to the application.
    #[serde(default)]
    pub labels: Vec<ApplicationLabel>,
    /// Type of the primary borrower.
    pub borrower_type: BorrowerType,
    /// Types of the co-borrowers, aligned with `coborrower_ids`.
    #[serde(default)]
    pub coborrower_types: Vec<BorrowerType>,
    /// The product the application was created for.
    pub product: ApplicationProduct,
    /// Whether the application was created in testing mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing: Option<bool>,
    /// The user who created the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserShort>,
    /// The user who last updated the application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserShort>,
    /// When the application was created.
    pub created_at: DateTime<Utc>,
    /// When the application was last updated.
    pub updated_at: DateTime<Utc>,
    /// When the application reached an approval status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    /// When the application reached a rejection status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    /// The application this one was duplicated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_application_id: Option<String>,
    /// When the application entered its current status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitioned_to_status_at: Option<DateTime<Utc>>,
    /// Matched spans, returned by ranked search only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlights: Option<Vec<HighlightSpan>>,
}

impl Application {
    /// Returns the requested loan amount, if set.
    #[must_use]
    pub fn loan_amount(&self) -> Option<f64> {
        match self.variables.get(LOAN_AMOUNT_VARIABLE) {
            Some(VariableValue::Number(amount)) => Some(*amount),
            _ => None,
        }
    }
}

impl Resource for Application {
    const NAME: &'static str = "Application";
    const PATH: &'static str = "applications";
}

impl Findable for Application {
    type FindParams = FindApplicationsParams;
}

impl Listable for Application {
    type ListParams = ListApplicationsParams;
}

impl Creatable for Application {
    type CreateParams = CreateApplicationParams;
}

impl Updatable for Application {
    type UpdateParams = UpdateApplicationParams;
}

impl Deletable for Application {}

/// Inline borrower creation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowerParams {
    /// Person or company.
    #[serde(rename = "type")]
    pub borrower_type: BorrowerType,
    /// Initial borrower variables.
    pub variables: BTreeMap<String, VariableValue>,
}

/// Inline intermediary creation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CreateIntermediaryParams {
    /// Initial intermediary variables.
    pub variables: BTreeMap<String, VariableValue>,
}

/// An existing borrower id, or a borrower to create along with the
/// application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BorrowerRef {
    /// Identifier of an existing borrower.
    Id(String),
    /// A borrower to create.
    New(CreateBorrowerParams),
}

/// An existing intermediary id, or an intermediary to create.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IntermediaryRef {
    /// Identifier of an existing intermediary.
    Id(String),
    /// An intermediary to create.
    New(CreateIntermediaryParams),
}

/// Parameters for [`ApplicationsApi::create`].
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationParams {
    /// The product to create the application for.
    pub product_id: String,
    /// Initial status; the product's first status when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
    /// The primary borrower.
    pub borrower: BorrowerRef,
    /// Co-borrowers to attach.
    pub co_borrowers: Vec<BorrowerRef>,
    /// Intermediary to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intermediary: Option<IntermediaryRef>,
    /// Identifiers of users to assign.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<String>>,
    /// Identifiers of labels to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_ids: Option<Vec<String>>,
    /// Initial application variables.
    pub variables: BTreeMap<String, VariableValue>,
}

/// Parameters for [`ApplicationsApi::update`]. Only `Some` fields are sent.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationParams {
    /// Moves the application into this status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
    /// Replaces the decline reasons.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_reasons: Option<Vec<String>>,
    /// Replaces the assigned users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<String>>,
    /// Replaces the attached labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_ids: Option<Vec<String>>,
    /// Variable values to merge into the application.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<BTreeMap<String, VariableValue>>,
}

/// Fields [`ApplicationsApi::find`] can sort by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ApplicationSortField {
    BorrowerFullName,
    DisplayId,
    CreatedAt,
    UpdatedAt,
    Status,
    BorrowerPhoneNumber,
    BorrowerEmail,
    LoanAmount,
    #[serde(rename = "intermediaryName")]
    Intermediary,
    #[serde(rename = "productName")]
    Product,
    SearchRelevance,
}

impl ApplicationSortField {
    /// Returns the wire name of the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BorrowerFullName => "borrowerFullName",
            Self::DisplayId => "displayId",
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            Self::Status => "status",
            Self::BorrowerPhoneNumber => "borrowerPhoneNumber",
            Self::BorrowerEmail => "borrowerEmail",
            Self::LoanAmount => "loanAmount",
            Self::Intermediary => "intermediaryName",
            Self::Product => "productName",
            Self::SearchRelevance => "searchRelevance",
        }
    }
}

impl fmt::Display for ApplicationSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which borrower slot a `borrower_id` filter matches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BorrowerIdTarget {
    Borrower,
    Coborrowers,
}

impl BorrowerIdTarget {
    /// Returns the wire name of the target.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Borrower => "borrower",
            Self::Coborrowers => "coborrowers",
        }
    }
}

/// Parameters for [`ApplicationsApi::find`].
///
/// Date bounds are sent as `createdAt.from` / `createdAt.to` (and likewise
/// for `updatedAt`). `filter_by_variables` and the sort maps are sent as
/// nested keys, e.g. `filterByVariables.loan_amount.from=1000` and
/// `sortByFields.createdAt=desc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindApplicationsParams {
    /// Page number, starting at 1.
    pub page: Option<u32>,
    /// Number of results per page.
    pub page_size: Option<u32>,
    /// Free-text search.
    pub search: Option<String>,
    /// Field to sort by.
    pub sort_field: Option<ApplicationSortField>,
    /// Direction for `sort_field`.
    pub sort_direction: Option<SortDirection>,
    /// Exact display id match.
    pub display_id: Option<String>,
    /// Restrict to these statuses.
    pub status_ids: Option<Vec<String>>,
    /// Restrict to applications carrying any of these labels.
    pub label_ids: Option<Vec<String>>,
    /// Restrict to these intermediaries.
    pub intermediary_ids: Option<Vec<String>>,
    /// Restrict to applications assigned to these users.
    pub team_member_ids: Option<Vec<String>>,
    /// Lower bound on `created_at`.
    pub created_at_from: Option<DateTime<Utc>>,
    /// Upper bound on `created_at`.
    pub created_at_to: Option<DateTime<Utc>>,
    /// Lower bound on `updated_at`.
    pub updated_at_from: Option<DateTime<Utc>>,
    /// Upper bound on `updated_at`.
    pub updated_at_to: Option<DateTime<Utc>>,
    /// Restrict to one borrower; see `borrower_id_targets`.
    pub borrower_id: Option<String>,
    /// Restrict to any of these borrowers.
    pub borrower_ids: Option<Vec<String>>,
    /// Restrict to one product.
    pub product_id: Option<String>,
    /// Search text in the backend's formatted query syntax.
    pub formatted_search: Option<String>,
    /// Only applications shown on the board.
    pub visible_on_board: Option<bool>,
    /// Only duplicates of this application.
    pub original_application: Option<String>,
    /// Exclude applications in a final status.
    pub only_in_progress: Option<bool>,
    /// Fields the `search` text is matched against.
    pub search_by_fields: Option<Vec<String>>,
    /// Variables the `search` text is matched against.
    pub search_by_variables: Option<Vec<String>>,
    /// Per-variable filters, sent under `filterByVariables`.
    pub filter_by_variables: Option<Filter>,
    /// Multi-field sort, sent under `sortByFields`.
    pub sort_by_fields: Option<SortSpec>,
    /// Sort by variable values, sent under `sortByVariables`.
    pub sort_by_variables: Option<SortSpec>,
    /// Only applications in a final status.
    pub only_in_final_status: Option<bool>,
    /// Which borrower slots `borrower_id` matches.
    pub borrower_id_targets: Option<Vec<BorrowerIdTarget>>,
}

impl QueryParams for FindApplicationsParams {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .with("page", self.page)
            .with("pageSize", self.page_size)
            .with("search", self.search.as_ref())
            .with("sortField", self.sort_field.map(ApplicationSortField::as_str))
            .with("sortDirection", self.sort_direction.map(|d| d.to_string()))
            .with("displayId", self.display_id.as_ref())
            .with("statusIds", self.status_ids.as_ref())
            .with("labelIds", self.label_ids.as_ref())
            .with("intermediaryIds", self.intermediary_ids.as_ref())
            .with("teamMemberIds", self.team_member_ids.as_ref())
            .with(
                "createdAt",
                RangeFilter::dates(self.created_at_from, self.created_at_to),
            )
            .with(
                "updatedAt",
                RangeFilter::dates(self.updated_at_from, self.updated_at_to),
            )
            .with("borrowerId", self.borrower_id.as_ref())
            .with("borrowerIds", self.borrower_ids.as_ref())
            .with("productId", self.product_id.as_ref())
            .with("formattedSearch", self.formatted_search.as_ref())
            .with("visibleOnBoard", self.visible_on_board)
            .with("originalApplication", self.original_application.as_ref())
            .with("onlyInProgress", self.only_in_progress)
            .with("searchByFields", self.search_by_fields.as_ref())
            .with("searchByVariables", self.search_by_variables.as_ref())
            .group("filterByVariables", self.filter_by_variables.clone())
            .sort("sortByFields", self.sort_by_fields.clone())
            .sort("sortByVariables", self.sort_by_variables.clone())
            .with("onlyInFinalStatus", self.only_in_final_status)
            .with(
                "borrowerIdTargets",
                self.borrower_id_targets.as_ref().map(|targets| {
                    targets
                        .iter()
                        .map(|target| target.as_str().to_string())
                        .collect::<Vec<_>>()
                }),
            )
    }
}

/// Parameters for [`ApplicationsApi::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListApplicationsParams {
    /// Cursor and page size.
    pub cursor: CursorParams,
    /// Restrict to one borrower.
    pub borrower_id: Option<String>,
    /// Restrict to these statuses.
    pub statuses_ids: Option<Vec<String>>,
    /// Restrict to one product.
    pub product_id: Option<String>,
}

impl QueryParams for ListApplicationsParams {
    fn to_filter(&self) -> Filter {
        self.cursor.extend(
            Filter::new()
                .with("borrowerId", self.borrower_id.as_ref())
                .with("statusesIds", self.statuses_ids.as_ref())
                .with("productId", self.product_id.as_ref()),
        )
    }
}

/// Either removes one co-borrower or adds several.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum UpdateCoBorrowersParams {
    /// Detaches one co-borrower.
    #[serde(rename_all = "camelCase")]
    Delete { co_borrower_id_to_delete: String },
    /// Attaches new or existing co-borrowers.
    #[serde(rename_all = "camelCase")]
    Add { co_borrowers_to_add: Vec<BorrowerRef> },
}

/// `None` detaches the intermediary; it is sent as an explicit `null`.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct UpdateApplicationIntermediaryParams {
    /// The intermediary to attach.
    pub intermediary: Option<IntermediaryRef>,
}

/// Parameters for [`ApplicationsApi::run_calculations`].
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunApplicationCalculationsParams {
    /// Calculated variables to refresh; all of them when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables_to_run: Option<Vec<String>>,
}

/// Client for `/applications`.
#[derive(Debug)]
pub struct ApplicationsApi<T> {
    base: ResourceClient<Application, T>,
}

impl<T: Transport> ApplicationsApi<T> {
    /// Creates a client over `transport`, bound to `version` (or the default
    /// version when `None`).
    #[must_use]
    pub fn new(transport: T, version: Option<ApiVersion>) -> Self {
        Self {
            base: ResourceClient::new(transport, version),
        }
    }

    /// Returns the bound API version.
    #[must_use]
    pub const fn version(&self) -> ApiVersion {
        self.base.version()
    }

    /// Offset pagination on `Legacy`, ranked search otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn find(
        &self,
        params: &FindApplicationsParams,
    ) -> Result<PaginationResult<Application>, ResourceError> {
        self.base.find(params).await
    }

    /// Pages through applications with a cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedApiVersion`] on `Legacy` without
    /// sending anything.
    pub async fn list(
        &self,
        params: &ListApplicationsParams,
    ) -> Result<CursorPaginationResult<Application>, ResourceError> {
        self.base.list(params).await
    }

    /// Creates an application.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn create(
        &self,
        params: &CreateApplicationParams,
    ) -> Result<Application, ResourceError> {
        self.base.create(params).await
    }

    /// Updates an application.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn update(
        &self,
        id: &str,
        params: &UpdateApplicationParams,
    ) -> Result<Application, ResourceError> {
        self.base.update(id, params).await
    }

    /// Deletes an application.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] for transport failures.
    pub async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        self.base.delete(id).await
    }

    /// Adds or removes co-borrowers.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn update_co_borrowers(
        &self,
        id: &str,
        params: &UpdateCoBorrowersParams,
    ) -> Result<Application, ResourceError> {
        self.base
            .send_json(
                ApiMethod::Update,
                HttpMethod::Put,
                self.base.member_sub_path(id, "coborrowers"),
                params,
            )
            .await
    }

    /// Attaches, replaces or detaches the intermediary.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn update_intermediary(
        &self,
        id: &str,
        params: &UpdateApplicationIntermediaryParams,
    ) -> Result<Application, ResourceError> {
        self.base
            .send_json(
                ApiMethod::Update,
                HttpMethod::Put,
                self.base.member_sub_path(id, "intermediary"),
                params,
            )
            .await
    }

    /// Fetches variable values, optionally restricted to
    /// `variables_to_include` (sent as repeated keys).
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport or decoding failure.
    pub async fn get_variables(
        &self,
        id: &str,
        variables_to_include: Option<&[String]>,
    ) -> Result<BTreeMap<String, VariableValue>, ResourceError> {
        let filter = Filter::new().with("variablesToInclude", variables_to_include);
        self.base
            .get(
                ApiMethod::FindCollection,
                self.base.member_sub_path(id, "variables"),
                &filter,
            )
            .await
    }

    /// Re-runs product calculations on the application.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn run_calculations(
        &self,
        id: &str,
        params: &RunApplicationCalculationsParams,
    ) -> Result<Application, ResourceError> {
        self.base
            .send_json(
                ApiMethod::Update,
                HttpMethod::Post,
                self.base.member_sub_path(id, "run-calculations"),
                params,
            )
            .await
    }

    /// Attaches labels to the application.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport or decoding failure.
    pub async fn add_labels(
        &self,
        id: &str,
        labels_ids: &[String],
    ) -> Result<Application, ResourceError> {
        self.base
            .send_json(
                ApiMethod::Update,
                HttpMethod::Post,
                self.base.member_sub_path(id, "labels"),
                &json!({ "labelsIds": labels_ids }),
            )
            .await
    }

    /// Assigns users to the application.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport or decoding failure.
    pub async fn add_team_members(
        &self,
        id: &str,
        team_members_ids: &[String],
    ) -> Result<Application, ResourceError> {
        self.base
            .send_json(
                ApiMethod::Update,
                HttpMethod::Post,
                self.base.member_sub_path(id, "team-members"),
                &json!({ "teamMembersIds": team_members_ids }),
            )
            .await
    }
}

impl<T: Clone> Clone for ApplicationsApi<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn pairs(params: &impl QueryParams) -> Vec<(String, String)> {
        params.to_filter().encode().unwrap()
    }

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn test_find_params_encode_pagination_and_ids() {
        let params = FindApplicationsParams {
            page: Some(2),
            page_size: Some(20),
            sort_field: Some(ApplicationSortField::Intermediary),
            sort_direction: Some(SortDirection::Desc),
            status_ids: Some(vec!["s1".to_string(), "s2".to_string()]),
            ..Default::default()
        };

        assert_eq!(
            pairs(&params),
            vec![
                pair("page", "2"),
                pair("pageSize", "20"),
                pair("sortField", "intermediaryName"),
                pair("sortDirection", "desc"),
                pair("statusIds", "s1"),
                pair("statusIds", "s2"),
            ]
        );
    }

    #[test]
    fn test_find_params_encode_date_ranges() {
        let params = FindApplicationsParams {
            created_at_from: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };

        assert_eq!(
            pairs(&params),
            vec![pair("createdAt.from", "2024-01-01T00:00:00.000Z")]
        );
    }

    #[test]
    fn test_find_params_inverted_dates_fail() {
        let params = FindApplicationsParams {
            updated_at_from: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
            updated_at_to: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(params.to_filter().encode().is_err());
    }

    #[test]
    fn test_find_params_encode_variable_filters_and_sorts() {
        let params = FindApplicationsParams {
            filter_by_variables: Some(
                Filter::new().with(LOAN_AMOUNT_VARIABLE, Some(RangeFilter::starting("1000"))),
            ),
            sort_by_fields: Some(SortSpec::new().then("createdAt", SortDirection::Desc)),
            sort_by_variables: Some(SortSpec::new().then(LOAN_AMOUNT_VARIABLE, SortDirection::Asc)),
            borrower_id_targets: Some(vec![BorrowerIdTarget::Coborrowers]),
            ..Default::default()
        };

        assert_eq!(
            pairs(&params),
            vec![
                pair("filterByVariables.loan_amount.from", "1000"),
                pair("sortByFields.createdAt", "desc"),
                pair("sortByVariables.loan_amount", "asc"),
                pair("borrowerIdTargets", "coborrowers"),
            ]
        );
    }

    #[test]
    fn test_list_params_encode_cursor_last() {
        let params = ListApplicationsParams {
            cursor: CursorParams {
                cursor: Some("next".to_string()),
                limit: Some(50),
            },
            product_id: Some("p1".to_string()),
            ..Default::default()
        };

        assert_eq!(
            pairs(&params),
            vec![
                pair("productId", "p1"),
                pair("cursor", "next"),
                pair("limit", "50"),
            ]
        );
    }

    #[test]
    fn test_create_params_serialize_borrower_refs() {
        let params = CreateApplicationParams {
            product_id: "p1".to_string(),
            status_id: None,
            borrower: BorrowerRef::Id("b1".to_string()),
            co_borrowers: vec![BorrowerRef::New(CreateBorrowerParams {
                borrower_type: BorrowerType::Company,
                variables: BTreeMap::from([(
                    "company_name".to_string(),
                    VariableValue::from("Acme"),
                )]),
            })],
            intermediary: None,
            team_members: None,
            labels_ids: None,
            variables: BTreeMap::from([(
                LOAN_AMOUNT_VARIABLE.to_string(),
                VariableValue::Number(5000.0),
            )]),
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({
                "productId": "p1",
                "borrower": "b1",
                "coBorrowers": [{"type": "company", "variables": {"company_name": "Acme"}}],
                "variables": {"loan_amount": 5000.0}
            })
        );
    }

    #[test]
    fn test_co_borrower_update_shapes() {
        let delete = UpdateCoBorrowersParams::Delete {
            co_borrower_id_to_delete: "b2".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&delete).unwrap(),
            json!({"coBorrowerIdToDelete": "b2"})
        );

        let add = UpdateCoBorrowersParams::Add {
            co_borrowers_to_add: vec![BorrowerRef::Id("b3".to_string())],
        };
        assert_eq!(
            serde_json::to_value(&add).unwrap(),
            json!({"coBorrowersToAdd": ["b3"]})
        );
    }

    #[test]
    fn test_intermediary_none_is_explicit_null() {
        let params = UpdateApplicationIntermediaryParams::default();
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"intermediary": null})
        );
    }

    #[test]
    fn test_application_deserializes() {
        let application: Application = serde_json::from_value(json!({
            "id": "a1",
            "organizationId": "o1",
            "displayId": "1001",
            "variables": {"loan_amount": 2500, "state": "CA"},
            "status": {"id": "s1", "name": "New", "type": "custom"},
            "borrowerId": "b1",
            "borrowerType": "person",
            "product": {"id": "p1", "name": "Personal", "organizationId": "o1", "organizationVersion": 3},
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(application.display_id, "1001");
        assert_eq!(application.loan_amount(), Some(2500.0));
        assert_eq!(application.status.status_type, ApplicationStatusType::Custom);
        assert!(application.coborrower_ids.is_empty());
    }
}
