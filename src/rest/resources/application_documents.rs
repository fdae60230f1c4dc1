//! Application document resource implementation.
//!
//! Documents are uploaded as multipart payloads. A batch upload sends each
//! file as a `files` part followed by its own `options[i].*` fields, then the
//! fields shared by the whole batch:
//!
//! ```text
//! files            (one.pdf)
//! files            (two.pdf)
//! options[1].anchor
//! applicationId
//! taskId
//! accessPermissions  (JSON text)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clients::{HttpMethod, Transport};
use crate::config::ApiVersion;
use crate::rest::{
    ApiMethod, Deletable, EncodeError, FileAttachment, Filter, Findable, MultipartPayload,
    QueryParams, Resource, ResourceClient, ResourceError, Updatable,
};

use super::common::UserShort;

/// Whether a document entry is a file or a folder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationDocumentType {
    /// An uploaded file.
    File,
    /// A folder grouping other entries.
    Folder,
}

/// The kind of portal user an access permission applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessPermissionEntityType {
    /// A borrower portal user.
    Borrower,
    /// An intermediary portal user.
    Intermediary,
}

impl AccessPermissionEntityType {
    /// Returns the wire name of the entity type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Borrower => "borrower",
            Self::Intermediary => "intermediary",
        }
    }
}

/// Grants or withholds one portal user's access to a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessPermission {
    /// The borrower or intermediary the permission applies to.
    pub entity_id: String,
    /// Whether `entity_id` names a borrower or an intermediary.
    pub entity_type: AccessPermissionEntityType,
    /// Whether the entity may see the document.
    pub access_granted: bool,
}

/// A file or folder stored on an application.
///
/// Documents form a tree through `parent_id`; root entries have no parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDocument {
    /// The unique identifier of the document.
    pub id: String,
    /// File or folder.
    #[serde(rename = "type")]
    pub document_type: ApplicationDocumentType,
    /// The containing folder, or `None` at the root.
    pub parent_id: Option<String>,
    /// The organization owning the document.
    pub organization_id: String,
    /// Document configuration slot the file satisfies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration_anchor: Option<String>,
    /// File or folder name.
    pub name: String,
    /// File extension, absent on folders.
    #[serde(default)]
    pub extension: Option<String>,
    /// File size in bytes, absent on folders.
    #[serde(default)]
    pub size: Option<u64>,
    /// The task the document was uploaded for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    /// Whether the document belongs to a testing application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub testing: Option<bool>,
    /// The user who uploaded the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserShort>,
    /// The user who last changed the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<UserShort>,
    /// When the document was created.
    pub created_at: DateTime<Utc>,
    /// When the document was last updated.
    pub updated_at: DateTime<Utc>,
    /// The application the document belongs to.
    pub application_id: String,
    /// The document this one was copied from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicated_from: Option<String>,
    /// Per-user portal visibility.
    #[serde(default)]
    pub access_permissions: Option<Vec<AccessPermission>>,
}

impl ApplicationDocument {
    /// Returns `true` for folder entries.
    #[must_use]
    pub fn is_folder(&self) -> bool {
        self.document_type == ApplicationDocumentType::Folder
    }
}

impl Resource for ApplicationDocument {
    const NAME: &'static str = "ApplicationDocument";
    const PATH: &'static str = "application-documents";
}

impl Findable for ApplicationDocument {
    type FindParams = FindApplicationDocumentsParams;
}

impl Updatable for ApplicationDocument {
    type UpdateParams = UpdateApplicationDocumentParams;
}

impl Deletable for ApplicationDocument {}

/// Parameters for [`ApplicationDocumentsApi::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindApplicationDocumentsParams {
    /// The application to list documents of.
    pub application_id: String,
    /// Only documents uploaded for this task.
    pub task_id: Option<String>,
    /// Only documents visible to this kind of portal user.
    pub access_permission_entity_type: Option<AccessPermissionEntityType>,
    /// Only documents visible to this portal user.
    pub access_permission_entity_id: Option<String>,
}

impl QueryParams for FindApplicationDocumentsParams {
    fn to_filter(&self) -> Filter {
        Filter::new()
            .with("applicationId", Some(&self.application_id))
            .with("taskId", self.task_id.as_ref())
            .with(
                "accessPermissionEntityType",
                self.access_permission_entity_type
                    .map(AccessPermissionEntityType::as_str),
            )
            .with(
                "accessPermissionEntityId",
                self.access_permission_entity_id.as_ref(),
            )
    }
}

/// A single document upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateApplicationDocumentParams {
    /// The application to upload into.
    pub application_id: String,
    /// The file, with its optional folder and anchor.
    pub attachment: FileAttachment,
    /// The task the upload is for.
    pub task_id: Option<String>,
    /// Initial portal visibility.
    pub access_permissions: Option<Vec<AccessPermission>>,
}

impl CreateApplicationDocumentParams {
    /// Builds the upload payload: `applicationId`, `file`, then the optional
    /// `parentId`, `anchor`, `taskId` and `accessPermissions`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Serialization`] if the access permissions
    /// cannot be serialized.
    pub fn to_payload(&self) -> Result<MultipartPayload, EncodeError> {
        Ok(MultipartPayload::builder()
            .text("applicationId", self.application_id.as_str())
            .file(
                "file",
                self.attachment.file.clone(),
                self.attachment.file_name.as_str(),
            )
            .optional_text("parentId", self.attachment.parent_id.as_deref())
            .optional_text("anchor", self.attachment.anchor.as_deref())
            .optional_text("taskId", self.task_id.as_deref())
            .json("accessPermissions", self.access_permissions.as_ref())?
            .build())
    }
}

/// A batch upload into one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateManyApplicationDocumentsParams {
    /// The files, each with its own folder and anchor.
    pub files: Vec<FileAttachment>,
    /// The task every file is uploaded for.
    pub task_id: Option<String>,
    /// Portal visibility applied to every file.
    pub access_permissions: Option<Vec<AccessPermission>>,
}

impl CreateManyApplicationDocumentsParams {
    /// Builds the batch payload for `application_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Serialization`] if the access permissions
    /// cannot be serialized.
    pub fn to_payload(&self, application_id: &str) -> Result<MultipartPayload, EncodeError> {
        Ok(MultipartPayload::builder()
            .attachments(&self.files)
            .text("applicationId", application_id)
            .optional_text("taskId", self.task_id.as_deref())
            .json("accessPermissions", self.access_permissions.as_ref())?
            .build())
    }
}

/// Parameters for [`ApplicationDocumentsApi::update`]. Only `Some` fields
/// are sent.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplicationDocumentParams {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Folder to move the document into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Replaces the portal visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_permissions: Option<Vec<AccessPermission>>,
}

/// A folder to create. A missing or empty `parent_id` creates the folder at
/// the root and is sent as `"parentId": null`.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationDocumentFolderParams {
    /// The application to create the folder in.
    pub application_id: String,
    /// Folder name.
    pub name: String,
    /// The containing folder.
    pub parent_id: Option<String>,
}

/// Client for `/application-documents`.
#[derive(Debug)]
pub struct ApplicationDocumentsApi<T> {
    base: ResourceClient<ApplicationDocument, T>,
}

impl<T: Transport> ApplicationDocumentsApi<T> {
    /// Creates a client over `transport`, bound to `version` (or the default
    /// version when `None`).
    #[must_use]
    pub fn new(transport: T, version: Option<ApiVersion>) -> Self {
        Self {
            base: ResourceClient::new(transport, version),
        }
    }

    /// Documents and folders of an application. The backend returns them as
    /// a plain array.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn find(
        &self,
        params: &FindApplicationDocumentsParams,
    ) -> Result<Vec<ApplicationDocument>, ResourceError> {
        self.base.find_collection(params).await
    }

    /// Uploads one file.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn create(
        &self,
        params: &CreateApplicationDocumentParams,
    ) -> Result<ApplicationDocument, ResourceError> {
        self.base
            .guard()
            .ensure(ApplicationDocument::NAME, ApiMethod::Create)?;
        let payload = params.to_payload()?;
        let body = self
            .base
            .upload(ApiMethod::Create, self.base.collection_path(), payload)
            .await?;
        crate::rest::decode(ApplicationDocument::NAME, body)
    }

    /// Uploads several files in one request. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding or transport failure.
    pub async fn create_many(
        &self,
        application_id: &str,
        params: &CreateManyApplicationDocumentsParams,
    ) -> Result<(), ResourceError> {
        self.base
            .guard()
            .ensure(ApplicationDocument::NAME, ApiMethod::Create)?;
        let payload = params.to_payload(application_id)?;
        self.base
            .upload(ApiMethod::Create, self.base.sub_path("batch"), payload)
            .await?;
        Ok(())
    }

    /// Renames, moves or re-permissions a document.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn update(
        &self,
        id: &str,
        params: &UpdateApplicationDocumentParams,
    ) -> Result<ApplicationDocument, ResourceError> {
        self.base.update(id, params).await
    }

    /// Deletes a document or folder.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Http`] for transport failures.
    pub async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        self.base.delete(id).await
    }

    /// Creates a folder.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError`] on encoding, transport or decoding failure.
    pub async fn create_folder(
        &self,
        params: &CreateApplicationDocumentFolderParams,
    ) -> Result<ApplicationDocument, ResourceError> {
        let body = CreateApplicationDocumentFolderParams {
            parent_id: params.parent_id.clone().filter(|id| !id.is_empty()),
            ..params.clone()
        };
        self.base
            .send_json(
                ApiMethod::Create,
                HttpMethod::Post,
                self.base.sub_path("document-folders"),
                &body,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::MultipartPart;
    use serde_json::json;

    fn permissions() -> Vec<AccessPermission> {
        vec![AccessPermission {
            entity_id: "b1".to_string(),
            entity_type: AccessPermissionEntityType::Borrower,
            access_granted: true,
        }]
    }

    #[test]
    fn test_single_upload_payload_order() {
        let params = CreateApplicationDocumentParams {
            application_id: "a1".to_string(),
            attachment: FileAttachment::new(b"pdf".to_vec(), "paystub.pdf").anchor("income"),
            task_id: Some("t1".to_string()),
            access_permissions: Some(permissions()),
        };

        let payload = params.to_payload().unwrap();

        assert_eq!(
            payload.names(),
            vec!["applicationId", "file", "anchor", "taskId", "accessPermissions"]
        );
        assert_eq!(
            payload.get("accessPermissions").and_then(MultipartPart::text),
            Some(r#"[{"entityId":"b1","entityType":"borrower","accessGranted":true}]"#)
        );
    }

    #[test]
    fn test_single_upload_omits_absent_fields() {
        let params = CreateApplicationDocumentParams {
            application_id: "a1".to_string(),
            attachment: FileAttachment::new(b"x".to_vec(), "x.txt"),
            ..Default::default()
        };

        assert_eq!(
            params.to_payload().unwrap().names(),
            vec!["applicationId", "file"]
        );
    }

    #[test]
    fn test_batch_payload_shared_fields_last() {
        let params = CreateManyApplicationDocumentsParams {
            files: vec![
                FileAttachment::new(b"1".to_vec(), "one.pdf").parent_id("f1"),
                FileAttachment::new(b"2".to_vec(), "two.pdf"),
            ],
            task_id: None,
            access_permissions: Some(permissions()),
        };

        let payload = params.to_payload("a1").unwrap();

        assert_eq!(
            payload.names(),
            vec![
                "files",
                "options[0].parentId",
                "files",
                "applicationId",
                "accessPermissions",
            ]
        );
    }

    #[test]
    fn test_find_params_encode() {
        let params = FindApplicationDocumentsParams {
            application_id: "a1".to_string(),
            access_permission_entity_type: Some(AccessPermissionEntityType::Intermediary),
            ..Default::default()
        };

        assert_eq!(
            params.to_filter().encode().unwrap(),
            vec![
                ("applicationId".to_string(), "a1".to_string()),
                (
                    "accessPermissionEntityType".to_string(),
                    "intermediary".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_folder_params_serialize_null_parent() {
        let params = CreateApplicationDocumentFolderParams {
            application_id: "a1".to_string(),
            name: "Income".to_string(),
            parent_id: None,
        };

        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"applicationId": "a1", "name": "Income", "parentId": null})
        );
    }

    #[test]
    fn test_document_deserializes() {
        let document: ApplicationDocument = serde_json::from_value(json!({
            "id": "d1",
            "type": "folder",
            "parentId": null,
            "organizationId": "o1",
            "name": "Income",
            "extension": null,
            "size": null,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z",
            "applicationId": "a1",
            "accessPermissions": null
        }))
        .unwrap();

        assert!(document.is_folder());
        assert_eq!(document.parent_id, None);
    }
}
