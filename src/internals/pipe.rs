use ::anyhow::Error as AnyhowError;
use ::bytes::Bytes;
use ::std::io;
use ::std::io::Write;
use ::tokio::sync::mpsc::Sender;
use ::tokio::sync::mpsc::channel;

use crate::MultipartReader;

/// Only one chunk is ever in flight, so writes wait on the reader.
const PIPE_CAPACITY: usize = 1;

pub(crate) type PipeMessage = Result<Bytes, AnyhowError>;

/// Creates an in process pipe.
///
/// Writes block (on the calling thread) until the reader has taken the previous chunk.
/// Dropping either end is seen by the other end.
pub(crate) fn pipe() -> (PipeWriter, MultipartReader) {
    let (sender, receiver) = channel(PIPE_CAPACITY);

    (PipeWriter { sender }, MultipartReader::new(receiver))
}

/// The write end of a [`pipe()`].
///
/// This must only be used from outside of an async runtime,
/// as writes block the current thread.
#[derive(Debug)]
pub(crate) struct PipeWriter {
    sender: Sender<PipeMessage>,
}

impl PipeWriter {
    /// Closes the pipe.
    ///
    /// When an error is given, it is handed to the reader before the end of the stream.
    pub fn close_with_error(self, error: Option<AnyhowError>) {
        if let Some(error) = error {
            // The reader may already be gone, in which case nobody is left to tell.
            let _ = self.sender.blocking_send(Err(error));
        }
    }
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        self.sender
            .blocking_send(Ok(Bytes::copy_from_slice(buf)))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "Multipart reader was closed"))?;

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
