use ::anyhow::Result;
use ::axum::body::Body as AxumBody;
use ::bytes::Buf;
use ::bytes::Bytes;
use ::futures_util::Stream;
use ::std::io;
use ::std::io::Read;
use ::std::pin::Pin;
use ::std::task::Context as TaskContext;
use ::std::task::Poll;
use ::tokio::sync::mpsc::Receiver;

use crate::internals::PipeMessage;

///
/// The read end of a finalized [`MultipartBuilder`](crate::MultipartBuilder).
///
/// The multipart body is produced in the background as this is read.
/// It can be read as a blocking [`std::io::Read`],
/// as an async [`Stream`] of [`Bytes`],
/// or turned into an axum [`Body`](::axum::body::Body).
///
/// Any error hit whilst writing the body is returned from the read (or stream)
/// at the point it happened. Only the first error is reported.
///
/// **Note:** the background writer waits on this to be read.
/// Holding onto this without draining it will leave that writer parked.
/// Dropping it (or calling [`MultipartReader::close()`]) will release it.
///
#[derive(Debug)]
pub struct MultipartReader {
    receiver: Receiver<PipeMessage>,
    pending: Bytes,
    failure: Option<String>,
}

impl MultipartReader {
    pub(crate) fn new(receiver: Receiver<PipeMessage>) -> Self {
        Self {
            receiver,
            pending: Bytes::new(),
            failure: None,
        }
    }

    /// Closes the reader, releasing the background writer.
    ///
    /// This returns an error if one was sent but not yet read.
    pub fn close(mut self) -> Result<()> {
        self.receiver.close();

        while let Ok(message) = self.receiver.try_recv() {
            if let Err(error) = message {
                return Err(error);
            }
        }

        Ok(())
    }
}

impl Read for MultipartReader {
    /// Blocks until the next chunk is written.
    ///
    /// This will panic if called from within an async runtime.
    /// Use the [`Stream`] implementation there instead.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            if let Some(failure) = &self.failure {
                return Err(io::Error::other(failure.clone()));
            }

            if self.pending.has_remaining() {
                let len = buf.len().min(self.pending.len());
                self.pending.copy_to_slice(&mut buf[..len]);
                return Ok(len);
            }

            match self.receiver.blocking_recv() {
                None => return Ok(0),
                Some(Ok(chunk)) => self.pending = chunk,
                Some(Err(error)) => self.failure = Some(format!("{error:#}")),
            }
        }
    }
}

impl Stream for MultipartReader {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if this.failure.is_some() {
            return Poll::Ready(None);
        }

        if this.pending.has_remaining() {
            let chunk = ::std::mem::take(&mut this.pending);
            return Poll::Ready(Some(Ok(chunk)));
        }

        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(Err(error))) => {
                this.failure = Some(format!("{error:#}"));
                Poll::Ready(Some(Err(error)))
            }
            poll => poll,
        }
    }
}

impl From<MultipartReader> for AxumBody {
    fn from(reader: MultipartReader) -> Self {
        AxumBody::from_stream(reader)
    }
}
