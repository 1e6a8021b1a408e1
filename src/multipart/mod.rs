//!
//! The building blocks behind [`MultipartBuilder`](crate::MultipartBuilder).
//!
//! [`PartWriter`] is a single recorded part, as held by the builder.
//! On finalize each part is added to a `multipart/form-data` form,
//! which is streamed out part by part as the body is read.
//!

mod boundary;
pub(crate) use self::boundary::*;

mod part_writer;
pub use self::part_writer::*;
