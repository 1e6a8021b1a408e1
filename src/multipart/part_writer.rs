use ::anyhow::Error as AnyhowError;
use ::rust_multipart_rfc7578_2::client::multipart::Form;
use ::std::fmt;
use ::std::fs::File;
use ::std::io;
use ::std::io::Read;
use ::std::path::Path;
use ::std::path::PathBuf;
use ::std::sync::Mutex;
use ::std::sync::PoisonError;

///
/// A single deferred write into a multipart body.
///
/// These are recorded by the [`MultipartBuilder`](crate::MultipartBuilder),
/// and only run when the builder is finalized.
/// Readers and files are not touched until the body is read up to their part.
///
pub enum PartWriter {
    WriteField {
        name: String,
        value: String,
    },
    WriteFileFromReader {
        field_name: String,
        file_name: String,
        reader: Box<dyn Read + Send>,
    },
    WriteFileFromPath {
        field_name: String,
        path: PathBuf,
    },
}

impl PartWriter {
    /// The form field name this part will be sent under.
    pub fn field_name(&self) -> &str {
        match self {
            Self::WriteField { name, .. } => name,
            Self::WriteFileFromReader { field_name, .. } => field_name,
            Self::WriteFileFromPath { field_name, .. } => field_name,
        }
    }

    /// Adds this part to the end of the form.
    ///
    /// Read failures are raised by the form's body, when it is streamed,
    /// with the field and file named in the error.
    pub(crate) fn add_to_form(self, form: &mut Form<'static>) {
        match self {
            Self::WriteField { name, value } => form.add_text(name, value),
            Self::WriteFileFromReader {
                field_name,
                file_name,
                reader,
            } => {
                let context =
                    format!("Failed to copy form file {field_name} ({file_name}) for reader");
                let reader = ContextReader::new(reader, context);
                add_form_file(form, field_name, file_name, reader);
            }
            Self::WriteFileFromPath { field_name, path } => {
                let file_name = base_name(&path);
                let reader = LazyFileReader {
                    field_name: field_name.clone(),
                    path,
                    file: None,
                };
                add_form_file(form, field_name, file_name, reader);
            }
        }
    }
}

impl fmt::Debug for PartWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteField { name, value } => f
                .debug_struct("WriteField")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::WriteFileFromReader {
                field_name,
                file_name,
                ..
            } => f
                .debug_struct("WriteFileFromReader")
                .field("field_name", field_name)
                .field("file_name", file_name)
                .finish_non_exhaustive(),
            Self::WriteFileFromPath { field_name, path } => f
                .debug_struct("WriteFileFromPath")
                .field("field_name", field_name)
                .field("path", path)
                .finish(),
        }
    }
}

fn add_form_file<R>(form: &mut Form<'static>, field_name: String, file_name: String, reader: R)
where
    R: Read + Send + Sync + Unpin + 'static,
{
    form.add_reader_2(
        field_name,
        reader,
        Some(file_name),
        Some(::mime::APPLICATION_OCTET_STREAM),
        Vec::new(),
    );
}

/// Adds the context given to any read error.
struct ContextReader {
    // Only here to make the reader `Sync`. It is never locked.
    reader: Mutex<Box<dyn Read + Send>>,
    context: String,
}

impl ContextReader {
    fn new(reader: Box<dyn Read + Send>, context: String) -> Self {
        Self {
            reader: Mutex::new(reader),
            context,
        }
    }
}

impl Read for ContextReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let reader = self
            .reader
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);

        reader
            .read(buf)
            .map_err(|err| with_context(err, self.context.clone()))
    }
}

/// Opens the file on the first read, and closes it when dropped.
struct LazyFileReader {
    field_name: String,
    path: PathBuf,
    file: Option<File>,
}

impl Read for LazyFileReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let field_name = &self.field_name;
        let path_display = self.path.display();

        let file = match self.file.take() {
            Some(file) => file,
            None => File::open(&self.path).map_err(|err| {
                with_context(err, format!("Failed to open file {field_name} ({path_display})"))
            })?,
        };

        self.file.insert(file).read(buf).map_err(|err| {
            with_context(err, format!("Failed to copy form file {field_name} ({path_display})"))
        })
    }
}

/// Wraps the error so the context is shown first, with the original error as its source.
fn with_context(err: io::Error, context: String) -> io::Error {
    let kind = err.kind();
    io::Error::new(kind, AnyhowError::from(err).context(context))
}

/// The last component of the path, falling back to the whole path.
fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
