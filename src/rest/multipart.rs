//! Multipart payload construction for uploads.
//!
//! [`MultipartBuilder`] produces an ordered [`MultipartPayload`]: a list of
//! text and file parts. It only describes the payload. Byte-level framing
//! and the boundary are left to the transport's body encoder, which is why
//! [`RequestBody::Multipart`](crate::clients::RequestBody::Multipart) carries
//! no content type.
//!
//! Batch uploads bind per-file options to their file through index-qualified
//! names (`options[0].parentId`, `options[1].anchor`, ...). Indices follow
//! input position starting at 0, so they are unique within one payload.

use serde::Serialize;

use crate::rest::EncodeError;

/// Part name used for each file of a batch upload.
pub const BATCH_FILES_FIELD: &str = "files";

/// Group name used for per-file options of a batch upload.
pub const BATCH_OPTIONS_GROUP: &str = "options";

/// One part of a multipart payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MultipartPart {
    /// A plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A binary field.
    File {
        /// Field name.
        name: String,
        /// File content.
        bytes: Vec<u8>,
        /// File name sent with the part.
        file_name: String,
    },
}

impl MultipartPart {
    /// Returns the field name of the part.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }

    /// Returns the value of a text part.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { value, .. } => Some(value),
            Self::File { .. } => None,
        }
    }
}

/// An ordered multipart payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    parts: Vec<MultipartPart>,
}

impl MultipartPayload {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> MultipartBuilder {
        MultipartBuilder::default()
    }

    /// Returns the parts in wire order.
    #[must_use]
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Returns the field names in wire order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.parts.iter().map(MultipartPart::name).collect()
    }

    /// Returns the first part with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MultipartPart> {
        self.parts.iter().find(|part| part.name() == name)
    }

    /// Returns the number of parts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns `true` if the payload has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// A file to upload, with its own optional placement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileAttachment {
    /// File content.
    pub file: Vec<u8>,
    /// File name.
    pub file_name: String,
    /// Destination folder.
    pub parent_id: Option<String>,
    /// Placement anchor.
    pub anchor: Option<String>,
}

impl FileAttachment {
    /// Creates an attachment with no placement options.
    #[must_use]
    pub fn new(file: impl Into<Vec<u8>>, file_name: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            file_name: file_name.into(),
            parent_id: None,
            anchor: None,
        }
    }

    /// Sets the destination folder.
    #[must_use]
    pub fn parent_id(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Sets the placement anchor.
    #[must_use]
    pub fn anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }
}

/// Builder for [`MultipartPayload`].
///
/// Optional fields that are `None` or empty are skipped.
///
/// # Example
///
/// ```rust
/// use los_api::rest::{FileAttachment, MultipartPayload};
///
/// let files = vec![
///     FileAttachment::new(b"a".to_vec(), "a.pdf"),
///     FileAttachment::new(b"b".to_vec(), "b.pdf").anchor("income"),
/// ];
///
/// let payload = MultipartPayload::builder()
///     .attachments(&files)
///     .text("applicationId", "app-1")
///     .optional_text("taskId", None::<String>)
///     .build();
///
/// assert_eq!(
///     payload.names(),
///     vec!["files", "files", "options[1].anchor", "applicationId"]
/// );
/// ```
#[derive(Debug, Default)]
pub struct MultipartBuilder {
    parts: Vec<MultipartPart>,
}

impl MultipartBuilder {
    /// Appends a text part.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Appends a text part if `value` is present and non-empty.
    #[must_use]
    pub fn optional_text(self, name: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value.map(Into::into) {
            Some(value) if !value.is_empty() => self.text(name, value),
            _ => self,
        }
    }

    /// Appends a structured value as a single compact JSON text part, if
    /// present.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::Serialization`] if `value` cannot be
    /// serialized.
    pub fn json<T: Serialize + ?Sized>(
        self,
        name: impl Into<String>,
        value: Option<&T>,
    ) -> Result<Self, EncodeError> {
        let name = name.into();
        let Some(value) = value else {
            return Ok(self);
        };
        let text = serde_json::to_string(value).map_err(|source| EncodeError::Serialization {
            field: name.clone(),
            source,
        })?;
        Ok(self.text(name, text))
    }

    /// Appends a file part.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        file_name: impl Into<String>,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            bytes: bytes.into(),
            file_name: file_name.into(),
        });
        self
    }

    /// Appends `group[index].field` if `value` is present and non-empty.
    #[must_use]
    pub fn indexed(
        self,
        group: &str,
        index: usize,
        field: &str,
        value: Option<impl Into<String>>,
    ) -> Self {
        self.optional_text(indexed_name(group, index, field), value)
    }

    /// Appends a batch of files. Each file becomes a [`BATCH_FILES_FIELD`]
    /// part followed by its own `options[i].parentId` and
    /// `options[i].anchor` parts.
    #[must_use]
    pub fn attachments(self, attachments: &[FileAttachment]) -> Self {
        attachments
            .iter()
            .enumerate()
            .fold(self, |builder, (index, attachment)| {
                builder
                    .file(
                        BATCH_FILES_FIELD,
                        attachment.file.clone(),
                        attachment.file_name.clone(),
                    )
                    .indexed(
                        BATCH_OPTIONS_GROUP,
                        index,
                        "parentId",
                        attachment.parent_id.as_deref(),
                    )
                    .indexed(
                        BATCH_OPTIONS_GROUP,
                        index,
                        "anchor",
                        attachment.anchor.as_deref(),
                    )
            })
    }

    /// Builds the payload.
    #[must_use]
    pub fn build(self) -> MultipartPayload {
        MultipartPayload { parts: self.parts }
    }
}

/// Formats an index-qualified field name: `group[index].field`.
#[must_use]
pub fn indexed_name(group: &str, index: usize, field: &str) -> String {
    format!("{group}[{index}].{field}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indexed_name_format() {
        assert_eq!(indexed_name("options", 0, "parentId"), "options[0].parentId");
        assert_eq!(indexed_name("options", 12, "anchor"), "options[12].anchor");
    }

    #[test]
    fn test_optional_text_skips_absent_and_empty() {
        let payload = MultipartPayload::builder()
            .optional_text("taskId", None::<String>)
            .optional_text("parentId", Some(""))
            .optional_text("anchor", Some("a-1"))
            .build();

        assert_eq!(payload.names(), vec!["anchor"]);
    }

    #[test]
    fn test_json_part_is_single_compact_text() {
        let permissions = json!([
            {"entityId": "b-1", "entityType": "borrower", "accessGranted": true},
            {"entityId": "i-1", "entityType": "intermediary", "accessGranted": false}
        ]);
        let payload = MultipartPayload::builder()
            .json("accessPermissions", Some(&permissions))
            .unwrap()
            .build();

        assert_eq!(payload.len(), 1);
        let text = payload.get("accessPermissions").unwrap().text().unwrap();
        assert!(!text.contains(' '));
        assert!(!text.contains('\n'));
        let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, permissions);
    }

    #[test]
    fn test_json_part_skipped_when_absent() {
        let payload = MultipartPayload::builder()
            .json::<serde_json::Value>("accessPermissions", None)
            .unwrap()
            .build();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_file_part_carries_name_and_bytes() {
        let payload = MultipartPayload::builder()
            .file("file", b"%PDF".to_vec(), "paystub.pdf")
            .build();

        assert_eq!(
            payload.parts(),
            &[MultipartPart::File {
                name: "file".to_string(),
                bytes: b"%PDF".to_vec(),
                file_name: "paystub.pdf".to_string(),
            }]
        );
        assert!(payload.parts()[0].text().is_none());
    }

    #[test]
    fn test_attachments_bind_options_to_their_index() {
        let files = vec![
            FileAttachment::new(b"1".to_vec(), "one.pdf"),
            FileAttachment::new(b"2".to_vec(), "two.pdf")
                .parent_id("folder-2")
                .anchor("anchor-2"),
            FileAttachment::new(b"3".to_vec(), "three.pdf").parent_id("folder-3"),
        ];

        let payload = MultipartPayload::builder().attachments(&files).build();

        assert_eq!(
            payload.names(),
            vec![
                "files",
                "files",
                "options[1].parentId",
                "options[1].anchor",
                "files",
                "options[2].parentId",
            ]
        );
        assert_eq!(
            payload.get("options[1].anchor").and_then(MultipartPart::text),
            Some("anchor-2")
        );
    }

    #[test]
    fn test_shared_fields_follow_per_item_fields() {
        let files = vec![FileAttachment::new(b"1".to_vec(), "one.pdf").anchor("x")];
        let payload = MultipartPayload::builder()
            .attachments(&files)
            .text("applicationId", "app-1")
            .optional_text("taskId", Some("task-1"))
            .build();

        assert_eq!(
            payload.names(),
            vec!["files", "options[0].anchor", "applicationId", "taskId"]
        );
    }
}
