use crate::errors::PostImageError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Basic-auth credentials carried on a request.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Everything needed for one multipart upload.
///
/// Built through [`UploadRequestBuilder`], which guarantees that the URL, the
/// field name, the image name and the content are all non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadRequest {
    url: String,
    field_name: String,
    image_name: String,
    image_type: Option<String>,
    content: Vec<u8>,
    header: Option<(String, String)>,
    basic_auth: Option<BasicAuth>,
    extra_fields: BTreeMap<String, String>,
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("url", &self.url)
            .field("field_name", &self.field_name)
            .field("image_name", &self.image_name)
            .field("image_type", &self.image_type)
            .field("content_len", &self.content.len())
            .field("header", &self.header.as_ref().map(|(name, _)| name))
            .field("extra_fields", &self.extra_fields)
            .finish_non_exhaustive()
    }
}

impl UploadRequest {
    pub fn builder() -> UploadRequestBuilder {
        UploadRequestBuilder::new()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    /// The declared content type of the image part, `None` for an untyped part.
    pub fn image_type(&self) -> Option<&str> {
        self.image_type.as_deref()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// The single custom header to send, present only when both halves were set.
    pub fn header(&self) -> Option<(&str, &str)> {
        self.header
            .as_ref()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn basic_auth(&self) -> Option<&BasicAuth> {
        self.basic_auth.as_ref()
    }

    pub fn extra_fields(&self) -> &BTreeMap<String, String> {
        &self.extra_fields
    }
}

/// A builder for [`UploadRequest`].
///
/// Empty strings are treated the same as unset values, so callers can pass
/// resolved property values through without pre-filtering them.
#[derive(Default)]
pub struct UploadRequestBuilder {
    url: Option<String>,
    field_name: Option<String>,
    image_name: Option<String>,
    image_type: Option<String>,
    content: Option<Vec<u8>>,
    header_name: Option<String>,
    header_value: Option<String>,
    basic_username: Option<String>,
    basic_password: Option<String>,
    extra_fields: BTreeMap<String, String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl UploadRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = Some(field_name.into());
        self
    }

    pub fn image_name(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = Some(image_name.into());
        self
    }

    pub fn image_type(mut self, image_type: Option<String>) -> Self {
        self.image_type = image_type;
        self
    }

    pub fn content(mut self, content: Vec<u8>) -> Self {
        self.content = Some(content);
        self
    }

    /// Sets the custom header. Either half may be `None`; the header is only
    /// attached when both end up non-empty.
    pub fn header(mut self, name: Option<String>, value: Option<String>) -> Self {
        self.header_name = name;
        self.header_value = value;
        self
    }

    pub fn basic_auth(mut self, username: Option<String>, password: Option<String>) -> Self {
        self.basic_username = username;
        self.basic_password = password;
        self
    }

    pub fn extra_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_fields.insert(name.into(), value.into());
        self
    }

    /// Validates the required parts and builds the request.
    pub fn build(self) -> Result<UploadRequest, PostImageError> {
        let url = non_empty(self.url).ok_or(PostImageError::MissingRequiredInput("url"))?;
        let field_name = non_empty(self.field_name)
            .ok_or(PostImageError::MissingRequiredInput("fieldname"))?;
        let image_name = non_empty(self.image_name)
            .ok_or(PostImageError::MissingRequiredInput("imagename"))?;
        let content = self
            .content
            .filter(|c| !c.is_empty())
            .ok_or(PostImageError::MissingRequiredInput("content"))?;

        let header = match (non_empty(self.header_name), non_empty(self.header_value)) {
            (Some(name), Some(value)) => Some((name, value)),
            _ => None,
        };

        let basic_auth = non_empty(self.basic_username).map(|username| BasicAuth {
            username,
            password: non_empty(self.basic_password),
        });

        Ok(UploadRequest {
            url,
            field_name,
            image_name,
            image_type: non_empty(self.image_type),
            content,
            header,
            basic_auth,
            extra_fields: self.extra_fields,
        })
    }
}

/// The normalized outcome of one upload.
///
/// Equality and hashing cover every field, including the status code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct UploadResult {
    /// Rendering of the full response header collection.
    pub header: String,
    /// Status reason phrase, e.g. "OK".
    pub status: String,
    pub status_code: u16,
    /// The last non-null element of the JSON array body, if any.
    pub json_result_body: Option<String>,
}

impl UploadResult {
    /// Whether the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}
