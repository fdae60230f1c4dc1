//! Concrete resource clients.
//!
//! Each client wraps a [`ResourceClient`](crate::rest::ResourceClient) for
//! its entity and adds only the endpoints specific to that entity.
//!
//! | Client | Path | Notes |
//! |--------|------|-------|
//! | [`ApplicationsApi`] | `/applications` | version-gated `find` and `list` |
//! | [`ApplicationDocumentsApi`] | `/application-documents` | multipart uploads |
//! | [`ApplicationStatusesApi`] | `/application-statuses` | per product |
//! | [`ProductCalculationsApi`] | `/product-calculations` | per product |
//! | [`AccountsApi`] | `/accounts` (auth service) | per-user token headers |
//!
//! # Example
//!
//! ```rust,ignore
//! use los_api::rest::resources::{ApplicationsApi, FindApplicationsParams};
//! use los_api::ApiVersion;
//!
//! let applications = ApplicationsApi::new(transport, Some(ApiVersion::Current));
//! let page = applications
//!     .find(&FindApplicationsParams {
//!         search: Some("smith".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! ```

mod accounts;
mod application_documents;
mod application_statuses;
mod applications;
mod common;
mod product_calculations;

pub use accounts::{
    AccountStatus, AccountsApi, AuthResponse, BaseAccountInfo, BaseAccountPhone,
    CreateAccountParams, FindAccountsParams, PasswordValidationTokenResponse,
    ACCOUNT_ACCESS_TOKEN_HEADER, PASSWORD_VALIDATION_TOKEN_HEADER,
};
pub use application_documents::{
    AccessPermission, AccessPermissionEntityType, ApplicationDocument, ApplicationDocumentType,
    ApplicationDocumentsApi, CreateApplicationDocumentFolderParams,
    CreateApplicationDocumentParams, CreateManyApplicationDocumentsParams,
    FindApplicationDocumentsParams, UpdateApplicationDocumentParams,
};
pub use application_statuses::{
    ApplicationStatus, ApplicationStatusRule, ApplicationStatusType, ApplicationStatusesApi,
    ProductScope,
};
pub use applications::{
    Application, ApplicationLabel, ApplicationProduct, ApplicationSortField,
    ApplicationStatusInfo, ApplicationTeamMember, ApplicationsApi, BorrowerIdTarget, BorrowerRef,
    CreateApplicationParams, CreateBorrowerParams, CreateIntermediaryParams,
    FindApplicationsParams, IntermediaryRef, ListApplicationsParams,
    RunApplicationCalculationsParams, UpdateApplicationIntermediaryParams,
    UpdateApplicationParams, UpdateCoBorrowersParams, LOAN_AMOUNT_VARIABLE,
};
pub use common::{BorrowerType, StatusPermissions, UserShort, VariableValue};
pub use product_calculations::{
    CalculatedVariable, ProductCalculation, ProductCalculationsApi, VariableType,
};
