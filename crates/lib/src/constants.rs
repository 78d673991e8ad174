//! # Shared Constants
//!
//! Property names, output attribute names and the fallback values used when a
//! record and the configuration both leave a property unset. Using these
//! constants keeps the processor, the CLI and the tests in agreement.

/// Target URL of the upload.
pub const PROP_URL: &str = "url";
/// Multipart field name the image is posted under.
pub const PROP_FIELD_NAME: &str = "fieldname";
/// File name declared on the image part.
pub const PROP_IMAGE_NAME: &str = "imagename";
/// Content type declared on the image part.
pub const PROP_IMAGE_TYPE: &str = "imagetype";
pub const PROP_HEADER_NAME: &str = "headername";
pub const PROP_HEADER_VALUE: &str = "headervalue";
pub const PROP_BASIC_USERNAME: &str = "basicusername";
pub const PROP_BASIC_PASSWORD: &str = "basicpassword";

/// Every fixed property name. Anything else configured is a dynamic property.
pub const FIXED_PROPERTIES: [&str; 8] = [
    PROP_URL,
    PROP_FIELD_NAME,
    PROP_IMAGE_NAME,
    PROP_IMAGE_TYPE,
    PROP_HEADER_NAME,
    PROP_HEADER_VALUE,
    PROP_BASIC_USERNAME,
    PROP_BASIC_PASSWORD,
];

pub const DEFAULT_URL: &str = "http://localhost:8080/nifi";
pub const DEFAULT_FIELD_NAME: &str = "data";
pub const DEFAULT_IMAGE_NAME: &str = "test.jpg";
/// Legacy default, sent verbatim. Not a registered MIME type (`image/jpeg` is).
pub const DEFAULT_IMAGE_TYPE: &str = "images/jpeg";

/// Output attribute holding the last non-null element of the JSON array body.
pub const ATTR_RESULTS: &str = "post.results";
pub const ATTR_HEADER: &str = "post.header";
pub const ATTR_STATUS: &str = "post.status";
pub const ATTR_STATUS_CODE: &str = "post.statuscode";

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 180;
