use crate::MultipartBuilderConfigBuilder;

/// The page URL used for event requests, when none is set.
pub const DEFAULT_PAGE_URL: &str = "/";

/// The basic setup for a [`MultipartBuilder`](crate::MultipartBuilder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBuilderConfig {
    /// The URL event requests are sent to,
    /// when [`MultipartBuilder::set_page_url()`](crate::MultipartBuilder::set_page_url()) is not called.
    ///
    /// **Defaults** to `/`.
    pub default_page_url: String,

    /// Set a fixed multipart boundary.
    ///
    /// This is useful for asserting against the exact bytes of a body.
    ///
    /// **Defaults** to `None`, where a _random_ boundary is generated for each body.
    pub boundary: Option<String>,
}

impl MultipartBuilderConfig {
    pub fn builder() -> MultipartBuilderConfigBuilder {
        MultipartBuilderConfigBuilder::default()
    }
}

impl Default for MultipartBuilderConfig {
    fn default() -> Self {
        Self {
            default_page_url: DEFAULT_PAGE_URL.to_string(),
            boundary: None,
        }
    }
}
