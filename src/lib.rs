//!
//! Multipart Test Utils is a library for building `multipart/form-data` requests in tests:
//!
//!  * You create a [`MultipartBuilder`] within a test,
//!  * add text fields, and files (from readers, paths, or an [`UploadedFile`]),
//!  * then finalize it into a body, or straight into an [`http::Request`].
//!
//! The body is written on a background thread as it is read,
//! so large files are never held in memory all at once.
//!
//! ## Getting Started
//!
//! Build a body, and read it back:
//!
//! ```rust
//! # fn test() -> Result<(), Box<dyn ::std::error::Error>> {
//! #
//! use ::std::io::Read;
//! use ::multipart_test_utils::MultipartBuilder;
//!
//! let (content_type, mut body) = MultipartBuilder::new()
//!     .add_field("username", "Terrance Pencilworth")
//!     .add_file("avatar", "README.md")
//!     .finalize();
//!
//! let mut bytes = vec![];
//! body.read_to_end(&mut bytes)?;
//! body.close()?;
//! #
//! # Ok(())
//! # }
//! ```
//!
//! Any error whilst writing the body, such as a missing file,
//! is returned when reading the body. Not when the part is added.
//!
//! ## Event Requests
//!
//! Pages which dispatch UI events post them as a multipart form,
//! with the event as JSON in an `__event_data__` field,
//! and the event id in an `__execute_event__` query parameter.
//!
//! ```rust
//! # async fn test() -> Result<(), Box<dyn ::std::error::Error>> {
//! #
//! use ::axum::Router;
//! use ::multipart_test_utils::Event;
//! use ::multipart_test_utils::MultipartBuilder;
//! use ::tower::ServiceExt;
//!
//! let app = Router::new();
//!
//! let request = MultipartBuilder::new()
//!     .set_page_url("/users/edit")
//!     .set_event_func("toggle_admin", ["user-123"])
//!     .set_event(Event {
//!         checked: true,
//!         ..Event::default()
//!     })
//!     .finalize_event_request()?;
//!
//! let response = app.oneshot(request).await?;
//! #
//! # Ok(())
//! # }
//! ```
//!
//! ## Uploaded Files
//!
//! [`create_uploaded_file`] builds a file in memory,
//! which can be opened any number of times.
//!

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub(crate) mod internals;

pub mod multipart;

mod event;
pub use self::event::*;

mod multipart_builder_config_builder;
pub use self::multipart_builder_config_builder::*;

mod multipart_builder_config;
pub use self::multipart_builder_config::*;

mod multipart_builder;
pub use self::multipart_builder::*;

mod multipart_reader;
pub use self::multipart_reader::*;

mod uploaded_file;
pub use self::uploaded_file::*;

pub use ::http;
