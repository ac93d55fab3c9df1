//! Bounded in-process byte pipe between two blocking pipeline stages.
//!
//! Bytes travel as chunks over a bounded `tokio::sync::mpsc` channel, so the
//! writer blocks once `capacity` chunks are in flight and the reader blocks
//! while the channel is empty. Every blocking send and receive also races a
//! [`CancellationToken`].
//!
//! Both halves implement the std `Read`/`Write` traits and block the calling
//! thread, so they belong on `spawn_blocking` threads, never on the runtime.

use std::io::{self, Read, Write};
use std::mem;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const CANCELLED: &str = "operation cancelled";

enum Frame {
    Data(Vec<u8>),
    /// Producer finished; `Some` carries its failure to the reader.
    End(Option<io::Error>),
}

/// Creates a connected writer/reader pair.
pub fn pipe(
    capacity: usize,
    chunk_size: usize,
    cancel: CancellationToken,
) -> (PipeWriter, PipeReader) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let chunk_size = chunk_size.max(1);
    let writer = PipeWriter {
        tx: Some(tx),
        buf: Vec::with_capacity(chunk_size),
        chunk_size,
        cancel: cancel.clone(),
    };
    let reader = PipeReader {
        rx,
        chunk: Vec::new(),
        pos: 0,
        state: ReadState::Open,
        cancel,
    };
    (writer, reader)
}

fn cancelled() -> io::Error {
    io::Error::other(CANCELLED)
}

/// Producing half. Must be [`close`](PipeWriter::close)d; dropping it
/// unclosed makes the reader fail with `UnexpectedEof`.
pub struct PipeWriter {
    tx: Option<mpsc::Sender<Frame>>,
    buf: Vec<u8>,
    chunk_size: usize,
    cancel: CancellationToken,
}

impl PipeWriter {
    /// Ends the stream, delivering `result` to the reader.
    ///
    /// On `Ok` any buffered bytes are sent first and the reader sees a clean
    /// end of stream. On `Err` buffered bytes are discarded and the reader's
    /// next read returns the error.
    pub fn close(mut self, result: io::Result<()>) -> io::Result<()> {
        let end = match result {
            Ok(()) => {
                self.send_buffered()?;
                None
            }
            Err(e) => Some(e),
        };
        self.send(Frame::End(end))?;
        self.tx = None;
        Ok(())
    }

    fn send_buffered(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let chunk = mem::replace(&mut self.buf, Vec::with_capacity(self.chunk_size));
        self.send(Frame::Data(chunk))
    }

    fn send(&self, frame: Frame) -> io::Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "pipe already closed"))?;
        let cancel = &self.cancel;
        futures::executor::block_on(async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(cancelled()),
                sent = tx.send(frame) => sent.map_err(|_| {
                    io::Error::new(io::ErrorKind::BrokenPipe, "pipe reader went away")
                }),
            }
        })
    }
}

impl Write for PipeWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.cancel.is_cancelled() {
            return Err(cancelled());
        }
        if data.is_empty() {
            return Ok(0);
        }
        let room = self.chunk_size - self.buf.len();
        let n = room.min(data.len());
        self.buf.extend_from_slice(&data[..n]);
        if self.buf.len() == self.chunk_size {
            self.send_buffered()?;
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.send_buffered()
    }
}

enum ReadState {
    Open,
    Finished,
    /// Kind and message of the error already returned, repeated on every
    /// later read so a retrying caller cannot mistake it for end of stream.
    Failed(io::ErrorKind, String),
}

/// Consuming half.
pub struct PipeReader {
    rx: mpsc::Receiver<Frame>,
    chunk: Vec<u8>,
    pos: usize,
    state: ReadState,
    cancel: CancellationToken,
}

impl PipeReader {
    /// Whether the producer closed the pipe with an error.
    pub fn producer_failed(&self) -> bool {
        matches!(self.state, ReadState::Failed(..)) && !self.cancel.is_cancelled()
    }

    fn fail(&mut self, err: io::Error) -> io::Error {
        // std read loops retry Interrupted forever.
        let kind = match err.kind() {
            io::ErrorKind::Interrupted => io::ErrorKind::Other,
            kind => kind,
        };
        let message = err.to_string();
        self.state = ReadState::Failed(kind, message.clone());
        io::Error::new(kind, message)
    }

    fn receive(&mut self) -> Option<Frame> {
        let rx = &mut self.rx;
        let cancel = &self.cancel;
        futures::executor::block_on(async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                frame = rx.recv() => Some(frame),
            }
        })
        .unwrap_or_else(|| Some(Frame::End(Some(cancelled()))))
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            match &self.state {
                ReadState::Finished => return Ok(0),
                ReadState::Failed(kind, message) => {
                    return Err(io::Error::new(*kind, message.clone()));
                }
                ReadState::Open => {}
            }

            if self.pos < self.chunk.len() {
                let n = buf.len().min(self.chunk.len() - self.pos);
                buf[..n].copy_from_slice(&self.chunk[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }

            match self.receive() {
                Some(Frame::Data(chunk)) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                Some(Frame::End(None)) => self.state = ReadState::Finished,
                Some(Frame::End(Some(err))) => return Err(self.fail(err)),
                None => {
                    return Err(self.fail(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "producer exited without closing the pipe",
                    )));
                }
            }
        }
    }
}
