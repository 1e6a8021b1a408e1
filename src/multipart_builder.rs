use ::anyhow::Context;
use ::anyhow::Error as AnyhowError;
use ::anyhow::Result;
use ::axum::body::Body as AxumBody;
use ::futures::executor::block_on_stream;
use ::http::Method;
use ::http::Request;
use ::http::Uri;
use ::http::header;
use ::rust_multipart_rfc7578_2::client::multipart::Body as CommonMultipartBody;
use ::rust_multipart_rfc7578_2::client::multipart::Form;
use ::std::fmt::Display;
use ::std::io::Error as IoError;
use ::std::io::Read;
use ::std::io::Write;
use ::std::path::PathBuf;
use ::std::thread;
use ::tracing::debug;
use ::tracing::trace;

use crate::EVENT_DATA_FIELD;
use crate::Event;
use crate::EventDescriptor;
use crate::MultipartBuilderConfig;
use crate::MultipartReader;
use crate::UploadedFile;
use crate::internals::PipeWriter;
use crate::internals::build_event_request_path;
use crate::internals::pipe;
use crate::multipart::PartWriter;
use crate::multipart::PresetBoundary;
use crate::multipart::form_data_content_type;
use crate::multipart::new_random_boundary;
use crate::multipart::validate_boundary;

///
/// Builds a `multipart/form-data` body, as a browser would send for a form.
///
/// Parts are recorded in the order they are added,
/// and are only written once the builder is finalized.
/// Finalizing takes the builder by value, so it can only ever happen once.
///
/// ```rust
/// use ::std::io::Read;
/// use ::multipart_test_utils::MultipartBuilder;
///
/// let (content_type, mut body) = MultipartBuilder::new()
///     .add_field("name", "Joe")
///     .add_reader("avatar", "avatar.png", &b"not really a png"[..])
///     .finalize();
///
/// let mut bytes = vec![];
/// body.read_to_end(&mut bytes).unwrap();
/// body.close().unwrap();
///
/// assert!(content_type.starts_with("multipart/form-data; boundary="));
/// ```
///
/// The builder is not meant to be shared between threads.
///
#[derive(Debug)]
pub struct MultipartBuilder {
    config: MultipartBuilderConfig,
    parts: Vec<PartWriter>,
    page_url: Option<String>,
    event_descriptor: EventDescriptor,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self {
            config: MultipartBuilderConfig::default(),
            parts: Vec::new(),
            page_url: None,
            event_descriptor: EventDescriptor::default(),
        }
    }

    /// Creates a builder using the config given.
    ///
    /// This will fail if the config holds an invalid boundary.
    pub fn new_with_config(config: MultipartBuilderConfig) -> Result<Self> {
        if let Some(boundary) = &config.boundary {
            validate_boundary(boundary)?;
        }

        Ok(Self {
            config,
            ..Self::new()
        })
    }

    /// Adds a plain text field.
    pub fn add_field<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Display,
        V: ToString,
    {
        self.parts.push(PartWriter::WriteField {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Adds a file field, with the contents read from the reader given.
    ///
    /// The reader is only read from when the body is being written.
    pub fn add_reader<N, F, R>(mut self, field_name: N, file_name: F, reader: R) -> Self
    where
        N: Display,
        F: Display,
        R: Read + Send + 'static,
    {
        self.parts.push(PartWriter::WriteFileFromReader {
            field_name: field_name.to_string(),
            file_name: file_name.to_string(),
            reader: Box::new(reader),
        });
        self
    }

    /// Adds a file field, with the contents read from the file at the path given.
    ///
    /// The file is only opened when the body is being written,
    /// and is sent using the last component of the path as its file name.
    pub fn add_file<N, P>(mut self, field_name: N, file_path: P) -> Self
    where
        N: Display,
        P: Into<PathBuf>,
    {
        self.parts.push(PartWriter::WriteFileFromPath {
            field_name: field_name.to_string(),
            path: file_path.into(),
        });
        self
    }

    /// Adds a file field, sending the [`UploadedFile`] given.
    pub fn add_uploaded_file<N>(self, field_name: N, file: &UploadedFile) -> Self
    where
        N: Display,
    {
        self.add_reader(field_name, file.file_name(), file.open())
    }

    /// Sets the event function to execute, and the parameters to pass to it.
    ///
    /// This replaces any event function set before.
    pub fn set_event_func<I, P>(mut self, id: I, params: P) -> Self
    where
        I: Display,
        P: IntoIterator,
        P::Item: ToString,
    {
        self.event_descriptor.event_func_id.id = id.to_string();
        self.event_descriptor.event_func_id.params =
            params.into_iter().map(|param| param.to_string()).collect();
        self
    }

    /// Sets the event state to send.
    ///
    /// This replaces any event set before.
    pub fn set_event(mut self, event: Event) -> Self {
        self.event_descriptor.event = event;
        self
    }

    /// Sets the URL event requests are sent to.
    ///
    /// When not set, the `default_page_url` from the config is used.
    pub fn set_page_url<U>(mut self, page_url: U) -> Self
    where
        U: Display,
    {
        self.page_url = Some(page_url.to_string());
        self
    }

    /// The parts added so far, in the order they will be written.
    pub fn parts(&self) -> &[PartWriter] {
        &self.parts
    }

    pub fn event_descriptor(&self) -> &EventDescriptor {
        &self.event_descriptor
    }

    /// Finalizes the builder, returning the `Content-Type` to use and a reader of the body.
    ///
    /// This returns straight away. The body is written on a background thread
    /// as the reader is read, and any errors are returned from the reader.
    ///
    /// The reader must be read until the end (or dropped),
    /// otherwise the background thread will wait on it forever.
    pub fn finalize(self) -> (String, MultipartReader) {
        let (pipe_writer, reader) = pipe();
        // Validated when the builder was created.
        let boundary = self.config.boundary.unwrap_or_else(new_random_boundary);
        let content_type = form_data_content_type(&boundary);

        let parts = self.parts;
        thread::spawn(move || write_parts(boundary, parts, pipe_writer));

        (content_type, reader)
    }

    /// Finalizes the builder into a `POST` request, for executing the event set.
    ///
    /// The event is sent as JSON in the `__event_data__` field,
    /// and the event id as the `__execute_event__` query parameter.
    ///
    /// ```rust
    /// # fn test() -> Result<(), Box<dyn ::std::error::Error>> {
    /// #
    /// use ::multipart_test_utils::MultipartBuilder;
    ///
    /// let request = MultipartBuilder::new()
    ///     .set_event_func("save", ["x", "y"])
    ///     .add_field("name", "Joe")
    ///     .finalize_event_request()?;
    ///
    /// assert_eq!(request.uri(), "/?__execute_event__=save");
    /// #
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// This fails if the page URL cannot be used as a request URI.
    pub fn finalize_event_request(self) -> Result<Request<AxumBody>> {
        let page_url = self
            .page_url
            .clone()
            .unwrap_or_else(|| self.config.default_page_url.clone());
        let event_id = &self.event_descriptor.event_func_id.id;
        let request_path = build_event_request_path(&page_url, event_id)?;
        let uri: Uri = request_path
            .parse()
            .with_context(|| format!("Failed to use '{request_path}' as the event request URI"))?;

        // Serialization failures send an empty payload, rather than failing the request.
        let event_data = ::serde_json::to_string(&self.event_descriptor).unwrap_or_default();
        let (content_type, reader) = self.add_field(EVENT_DATA_FIELD, event_data).finalize();

        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(AxumBody::from(reader))
            .with_context(|| format!("Failed to build event request for POST {request_path}"))
    }
}

impl Default for MultipartBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_parts(boundary: String, parts: Vec<PartWriter>, mut pipe_writer: PipeWriter) {
    let result = if parts.is_empty() {
        // An empty form streams nothing at all, not even the closing boundary.
        trace!(%boundary, "Writing multipart closing boundary");
        pipe_writer
            .write_all(format!("--{boundary}--\r\n").as_bytes())
            .context("Failed to write multipart closing boundary")
    } else {
        let mut form = PresetBoundary::new_form(boundary);
        for part in parts {
            trace!(?part, "Adding multipart part");
            part.add_to_form(&mut form);
        }

        stream_form(form, &mut pipe_writer)
    };

    if let Err(err) = &result {
        debug!(error = ?err, "Multipart body failed, closing body with error");
    }
    pipe_writer.close_with_error(result.err());
}

/// Streams the form into the pipe, stopping at the first error.
///
/// Readers are only read from as their part is reached.
fn stream_form(form: Form<'static>, pipe_writer: &mut PipeWriter) -> Result<()> {
    let body: CommonMultipartBody = form.into();

    for chunk in block_on_stream(body) {
        let chunk = chunk.map_err(|err| AnyhowError::from(IoError::from(err)))?;
        pipe_writer
            .write_all(&chunk)
            .context("Failed to write multipart body")?;
    }

    Ok(())
}


#[cfg(test)]
mod test_add_file {
    use super::*;

    #[test]
    fn it_should_not_open_file_until_finalized() {
        let builder = MultipartBuilder::new().add_file("upload", "/does/not/exist.txt");

        assert!(matches!(
            &builder.parts()[0],
            PartWriter::WriteFileFromPath { path, .. } if path == &PathBuf::from("/does/not/exist.txt")
        ));
    }
}


#[cfg(test)]
mod test_set_event_func {
    use super::*;

    #[test]
    fn it_should_replace_previous_event_func() {
        let builder = MultipartBuilder::new()
            .set_event_func("first", ["a"])
            .set_event_func("second", ["b", "c"]);

        let event_func_id = &builder.event_descriptor().event_func_id;
        assert_eq!(event_func_id.id, "second");
        assert_eq!(event_func_id.params, vec!["b", "c"]);
    }

    #[test]
    fn it_should_not_add_a_part() {
        let builder = MultipartBuilder::new().set_event_func("save", Vec::<String>::new());

        assert!(builder.parts().is_empty());
    }
}



#[cfg(test)]
mod test_finalize {
    use super::*;
    use ::pretty_assertions::assert_eq;
    use ::std::io;
    use ::std::io::Cursor;
    use ::std::io::Repeat;
    use ::std::io::Take;
    use ::std::sync::mpsc;
    use ::std::sync::mpsc::Sender;
    use ::std::time::Duration;

    fn new_fixed_builder() -> MultipartBuilder {
        let config = MultipartBuilderConfig::builder().boundary("xyz").build();
        MultipartBuilder::new_with_config(config).unwrap()
    }

    #[test]
    fn it_should_write_parts_in_order() {
        let (content_type, mut reader) = new_fixed_builder()
            .add_field("name", "Joe")
            .add_reader("upload", "a.txt", Cursor::new(b"hello".to_vec()))
            .finalize();

        let mut output = String::new();
        reader.read_to_string(&mut output).unwrap();
        reader.close().unwrap();

        assert_eq!(content_type, "multipart/form-data; boundary=xyz");
        assert_eq!(
            output,
            "--xyz\r\n\
            Content-Type: text/plain\r\n\
            Content-Disposition: form-data; name=\"name\"\r\n\
            \r\n\
            Joe\r\n\
            --xyz\r\n\
            Content-Type: application/octet-stream\r\n\
            Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\
            \r\n\
            hello\r\n\
            --xyz--\r\n"
        );
    }

    #[test]
    fn it_should_write_only_closing_boundary_with_no_parts() {
        let (_, mut reader) = new_fixed_builder().finalize();

        let mut output = String::new();
        reader.read_to_string(&mut output).unwrap();

        assert_eq!(output, "--xyz--\r\n");
    }

    #[test]
    fn it_should_stop_at_first_error() {
        let (_, mut reader) = new_fixed_builder()
            .add_field("before", "1")
            .add_file("upload", "/does/not/exist.txt")
            .add_field("after", "2")
            .finalize();

        let mut output = vec![];
        let error = reader.read_to_end(&mut output).unwrap_err();
        let output = String::from_utf8(output).unwrap();
        let message = error.to_string();

        assert!(output.contains("name=\"before\"\r\n\r\n1\r\n"), "{output}");
        assert!(output.ends_with("name=\"upload\"; filename=\"exist.txt\"\r\n\r\n"), "{output}");
        assert!(!output.contains("after"), "{output}");
        assert!(message.contains("Failed to open file upload"), "{message}");
        assert!(message.contains("/does/not/exist.txt"), "{message}");
    }

    #[test]
    fn it_should_not_touch_readers_before_body_is_read() {
        let (touched_sender, touched_receiver) = mpsc::channel();
        let (_, mut reader) = new_fixed_builder()
            .add_field("before", "1")
            .add_reader(
                "upload",
                "a.txt",
                TouchSignalReader {
                    touched: touched_sender,
                },
            )
            .finalize();

        assert!(touched_receiver.recv_timeout(Duration::from_millis(100)).is_err());

        let mut output = vec![];
        let _ = reader.read_to_end(&mut output);
        assert!(touched_receiver.try_recv().is_ok());
    }

    #[test]
    fn it_should_drop_readers_when_body_is_dropped() {
        let (dropped_sender, dropped_receiver) = mpsc::channel();
        let (_, mut reader) = new_fixed_builder()
            .add_reader(
                "upload",
                "large.bin",
                DropSignalReader {
                    inner: io::repeat(7).take(100_000_000),
                    dropped: dropped_sender,
                },
            )
            .finalize();

        let mut buffer = [0; 64];
        reader.read_exact(&mut buffer).unwrap();
        drop(reader);

        let result = dropped_receiver.recv_timeout(Duration::from_secs(10));
        assert!(result.is_ok(), "Reader was not dropped");
    }

    struct TouchSignalReader {
        touched: Sender<()>,
    }

    impl Read for TouchSignalReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            let _ = self.touched.send(());
            Ok(0)
        }
    }

    struct DropSignalReader {
        inner: Take<Repeat>,
        dropped: Sender<()>,
    }

    impl Read for DropSignalReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Drop for DropSignalReader {
        fn drop(&mut self) {
            let _ = self.dropped.send(());
        }
    }
}
