use ::bytes::Bytes;
use ::mime::Mime;
use ::std::io::Cursor;

/// Creates an in memory [`UploadedFile`], for use in place of a file a user has uploaded.
///
/// ```rust
/// use ::std::io::Read;
/// use ::multipart_test_utils::create_uploaded_file;
///
/// let file = create_uploaded_file("test.txt", "hello");
///
/// let mut content = String::new();
/// file.open().read_to_string(&mut content).unwrap();
///
/// assert_eq!(file.file_name(), "test.txt");
/// assert_eq!(content, "hello");
/// ```
pub fn create_uploaded_file<N, C>(file_name: N, content: C) -> UploadedFile
where
    N: Into<String>,
    C: Into<Bytes>,
{
    UploadedFile {
        file_name: file_name.into(),
        content: content.into(),
    }
}

///
/// A file held in memory, as though it had been uploaded.
///
/// Use [`UploadedFile::open()`] to read it.
/// Each call returns a new reader starting from the beginning,
/// so it can be read any number of times.
///
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    file_name: String,
    content: Bytes,
}

impl UploadedFile {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// The size of the file in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// This is always `application/octet-stream`,
    /// matching the file parts written by the [`MultipartBuilder`](crate::MultipartBuilder).
    pub fn content_type(&self) -> Mime {
        ::mime::APPLICATION_OCTET_STREAM
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// Returns a new reader over the file contents.
    pub fn open(&self) -> Cursor<Bytes> {
        Cursor::new(self.content.clone())
    }
}
