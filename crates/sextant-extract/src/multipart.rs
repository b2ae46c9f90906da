//! Multipart form bodies.
//!
//! A `multipart/form-data` body is read field by field with `multer` and
//! buffered into [`MultipartData`]: text fields by name, and file parts as
//! [`UploadedFile`]s.

use bytes::Bytes;
use indexmap::IndexMap;
use std::io;

use crate::{ExtractionError, ExtractionSource};

/// Default maximum size per field (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum number of fields.
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Limits applied while reading a multipart body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultipartLimits {
    /// Maximum size per field in bytes.
    pub max_field_size: usize,
    /// Maximum number of fields allowed.
    pub max_fields: usize,
}

impl Default for MultipartLimits {
    fn default() -> Self {
        Self {
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

/// A file part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: Option<String>,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadedFile {
    /// Create a new uploaded file.
    #[must_use]
    pub fn new(
        name: Option<String>,
        file_name: Option<String>,
        content_type: Option<String>,
        data: Bytes,
    ) -> Self {
        Self {
            name,
            file_name,
            content_type,
            data,
        }
    }

    /// Get the form field name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the original file name.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// Get the MIME type.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Get the file data as bytes.
    #[must_use]
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Get the file size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the file is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the file extension from the filename.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .as_ref()
            .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
    }
}

/// A fully read multipart body.
///
/// Text fields with the same name keep the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartData {
    fields: IndexMap<String, String>,
    files: Vec<UploadedFile>,
}

impl MultipartData {
    /// Reads a multipart body.
    ///
    /// `content_type` must carry the boundary parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The Content-Type header is missing or has no boundary
    /// - The maximum number of fields is exceeded
    /// - A field exceeds the size limit
    /// - The multipart data is malformed
    pub async fn read(
        content_type: Option<&str>,
        body: Bytes,
        limits: MultipartLimits,
    ) -> Result<Self, ExtractionError> {
        let content_type = content_type
            .ok_or_else(|| ExtractionError::unsupported_media_type("multipart/form-data", None))?;

        let boundary = multer::parse_boundary(content_type).map_err(|_| {
            ExtractionError::unsupported_media_type("multipart/form-data", Some(content_type))
        })?;

        let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut data = Self::default();
        let mut field_count = 0;

        while let Some(field) = multipart.next_field().await.map_err(|e| {
            ExtractionError::deserialization_failed(
                ExtractionSource::Body,
                format!("multipart parse error: {e}"),
            )
        })? {
            field_count += 1;
            if field_count > limits.max_fields {
                return Err(ExtractionError::deserialization_failed(
                    ExtractionSource::Body,
                    format!("too many multipart fields (max {})", limits.max_fields),
                ));
            }

            let name = field.name().map(String::from);
            let file_name = field.file_name().map(String::from);
            let field_type = field.content_type().map(ToString::to_string);

            let bytes = field.bytes().await.map_err(|e| {
                ExtractionError::deserialization_failed(
                    ExtractionSource::Body,
                    format!("failed to read field: {e}"),
                )
            })?;
            if bytes.len() > limits.max_field_size {
                return Err(ExtractionError::payload_too_large(
                    limits.max_field_size,
                    bytes.len(),
                ));
            }

            if file_name.is_some() {
                data.files
                    .push(UploadedFile::new(name, file_name, field_type, bytes));
            } else {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    ExtractionError::deserialization_failed(
                        ExtractionSource::Body,
                        format!("field is not valid UTF-8: {e}"),
                    )
                })?;
                data.fields.insert(name.unwrap_or_default(), text);
            }
        }

        Ok(data)
    }

    /// Returns the text fields in body order.
    #[must_use]
    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    /// Looks up a text field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Returns the uploaded files in body order.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Looks up the first file uploaded under a field name.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|f| f.name() == Some(name))
    }
}

/// Returns `true` if the Content-Type names a multipart form.
#[must_use]
pub fn is_multipart(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.parse::<mime::Mime>().ok())
        .is_some_and(|m| m.essence_str() == mime::MULTIPART_FORM_DATA.essence_str())
}
