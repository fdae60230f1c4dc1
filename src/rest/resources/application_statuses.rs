//! Application status resource implementation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::Transport;
use crate::config::ApiVersion;
use crate::rest::{Filter, Findable, QueryParams, Resource, ResourceClient, ResourceError};

use super::common::StatusPermissions;

/// The role a status plays in an application's lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatusType {
    /// Final status for approved applications.
    Approve,
    /// Final status for rejected applications.
    Reject,
    /// Any intermediate status.
    #[default]
    Custom,
    /// A type this client does not recognize.
    #[serde(other)]
    Unknown,
}

/// A condition an application must meet to enter a status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusRule {
    /// The unique identifier of the rule.
    pub id: String,
    /// The status the rule guards.
    pub status_id: String,
    /// The organization owning the rule.
    pub organization_id: String,
    /// Organization configuration version of the rule.
    #[serde(default)]
    pub organization_version: Option<u64>,
    /// The product the rule belongs to.
    pub product_id: String,
    /// The rule's condition tree, passed through as JSON.
    pub condition: serde_json::Value,
    /// When the rule was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the rule was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A column of a product's application board.
///
/// Statuses are ordered by `position`; applications move between them and
/// the final `Approve` and `Reject` statuses close an application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    /// The unique identifier of the status.
    pub id: String,
    /// The product the status belongs to.
    pub product_id: String,
    /// The organization owning the status.
    pub organization_id: String,
    /// Organization configuration version of the status.
    #[serde(default)]
    pub organization_version: Option<u64>,
    /// Position on the board, starting at 0.
    pub position: u32,
    /// Display name of the status.
    pub name: String,
    /// The role the status plays.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub status_type: Option<ApplicationStatusType>,
    /// Permission groups allowed to move an application into this status.
    #[serde(default)]
    pub permission_groups_to_move_application_into_status: StatusPermissions,
    /// Permission groups allowed to edit applications in this status.
    #[serde(default)]
    pub permission_groups_to_edit_application: StatusPermissions,
    /// Permission groups that see applications in this status on the board.
    #[serde(default)]
    pub permission_groups_able_to_view_application_on_board: StatusPermissions,
    /// When the status was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the status was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Entry rules for the status.
    #[serde(default)]
    pub rules: Vec<ApplicationStatusRule>,
}

impl Resource for ApplicationStatus {
    const NAME: &'static str = "ApplicationStatus";
    const PATH: &'static str = "application-statuses";
}

impl Findable for ApplicationStatus {
    type FindParams = ProductScope;
}

/// Restricts a lookup to one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductScope {
    /// The product to look up.
    pub product_id: String,
}

impl QueryParams for ProductScope {
    fn to_filter(&self) -> Filter {
        Filter::new().with("productId", Some(&self.product_id))
    }
}

/// Client for `/application-statuses`.
#[derive(Debug)]
pub struct ApplicationStatusesApi<T> {
    base: ResourceClient<ApplicationStatus, T>,
}

impl<T: Transport> ApplicationStatusesApi<T> {
    /// Creates a client over `transport`, bound to `version` (or the default
    /// version when `None`).
    #[must_use]
    pub fn new(transport: T, version: Option<ApiVersion>) -> Self {
        Self {
            base: ResourceClient::new(transport, version),
        }
    }

    /// Statuses of a product, in board order.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on transport or decoding failure.
    pub async fn find(&self, product_id: &str) -> Result<Vec<ApplicationStatus>, ResourceError> {
        let scope = ProductScope {
            product_id: product_id.to_string(),
        };
        self.base.find_collection(&scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_scope_encodes_product_id() {
        let scope = ProductScope {
            product_id: "p 1".to_string(),
        };
        assert_eq!(
            scope.to_filter().to_query_string().unwrap(),
            "productId=p%201"
        );
    }

    #[test]
    fn test_unknown_status_type_deserializes() {
        let status: ApplicationStatusType = serde_json::from_value(json!("archived")).unwrap();
        assert_eq!(status, ApplicationStatusType::Unknown);

        let status: ApplicationStatusType = serde_json::from_value(json!("approve")).unwrap();
        assert_eq!(status, ApplicationStatusType::Approve);
    }

    #[test]
    fn test_status_deserializes_with_rules() {
        let status: ApplicationStatus = serde_json::from_value(json!({
            "id": "s1",
            "productId": "p1",
            "organizationId": "o1",
            "organizationVersion": null,
            "position": 0,
            "name": "New",
            "rules": [{
                "id": "r1",
                "statusId": "s1",
                "organizationId": "o1",
                "productId": "p1",
                "condition": {"formula": "loan_amount > 0"}
            }]
        }))
        .unwrap();

        assert_eq!(status.rules.len(), 1);
        assert_eq!(status.organization_version, None);
    }
}
