use crate::MultipartBuilderConfig;

/// This is for easing the building of [`MultipartBuilderConfig`](crate::MultipartBuilderConfig).
///
/// For full documentation see there.
///
/// ```rust
/// use ::multipart_test_utils::MultipartBuilderConfig;
///
/// let config = MultipartBuilderConfig::builder()
///     .default_page_url("/users/edit")
///     .boundary("my-fixed-boundary")
///     .build();
/// ```
///
/// These can be passed to `MultipartBuilder::new_with_config`:
///
/// ```rust
/// # fn test() -> Result<(), Box<dyn ::std::error::Error>> {
/// #
/// use ::multipart_test_utils::MultipartBuilder;
/// use ::multipart_test_utils::MultipartBuilderConfig;
///
/// let config = MultipartBuilderConfig::builder()
///     .boundary("my-fixed-boundary")
///     .build();
///
/// let builder = MultipartBuilder::new_with_config(config)?
///     .add_field("name", "Joe");
/// #
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MultipartBuilderConfigBuilder {
    config: MultipartBuilderConfig,
}

impl MultipartBuilderConfigBuilder {
    pub fn default_page_url(mut self, page_url: &str) -> Self {
        self.config.default_page_url = page_url.to_string();
        self
    }

    pub fn boundary(mut self, boundary: &str) -> Self {
        self.config.boundary = Some(boundary.to_string());
        self
    }

    pub fn random_boundary(mut self) -> Self {
        self.config.boundary = None;
        self
    }

    pub fn build(self) -> MultipartBuilderConfig {
        self.config
    }
}

impl Default for MultipartBuilderConfigBuilder {
    fn default() -> Self {
        Self {
            config: MultipartBuilderConfig::default(),
        }
    }
}
