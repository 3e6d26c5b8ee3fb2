//! MCP Transport Layer
//!
//! Newline-delimited JSON-RPC framing over any async reader/writer pair.
//! The server reads requests from stdin and writes replies to stdout, so
//! nothing else may print to stdout while the transport is open.
//!
//! # Architecture
//!
//! The transport layer is responsible only for moving lines. Lines are
//! handed over as raw bytes; decoding and dispatch are handled by the
//! server, so a line that is not valid UTF-8 is still a line.
//!
//! The two halves can be separated with [`LineTransport::into_split`] so
//! that reading and writing proceed independently.

use anyhow::{Context, Result};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout,
};

/// Line-oriented transport over a buffered reader and a writer
///
/// # Example
///
/// ```ignore
/// let mut transport = StdioTransport::new();
/// while let Some(line) = transport.recv().await? {
///     transport.send(&reply).await?;
/// }
/// ```
pub struct LineTransport<R, W> {
    reader: LineReader<R>,
    writer: LineWriter<W>,
}

/// Transport bound to the process stdin/stdout
pub type StdioTransport = LineTransport<BufReader<Stdin>, Stdout>;

impl StdioTransport {
    /// Create a transport over the process stdin/stdout
    pub fn new() -> Self {
        LineTransport::from_parts(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Create a transport over an arbitrary reader/writer pair
    pub fn from_parts(reader: R, writer: W) -> Self {
        Self {
            reader: LineReader::new(reader),
            writer: LineWriter::new(writer),
        }
    }

    /// Separate the reading and writing halves
    pub fn into_split(self) -> (LineReader<R>, LineWriter<W>) {
        (self.reader, self.writer)
    }

    /// Receive the next line as raw bytes, see [`LineReader::recv`]
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        self.reader.recv().await
    }

    /// Send one line and flush it immediately
    pub async fn send(&mut self, line: &str) -> Result<()> {
        self.writer.send(line).await
    }

    /// Whether end of input has not been reached yet
    pub fn is_open(&self) -> bool {
        self.reader.is_open()
    }
}

/// Reading half of a [`LineTransport`]
pub struct LineReader<R> {
    reader: R,

    /// Holds a partial line across cancelled reads
    buffer: Vec<u8>,

    /// Cleared once the reader reports end of input
    open: bool,
}

impl<R: AsyncBufRead + Unpin> LineReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            open: true,
        }
    }

    /// Receive the next line, without its terminator
    ///
    /// Returns `Ok(None)` at end of input. The bytes are not checked for
    /// UTF-8. Safe to use in `tokio::select!`: a cancelled read keeps its
    /// partial line and the next call continues it.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.open {
            return Ok(None);
        }

        let bytes_read = self
            .reader
            .read_until(b'\n', &mut self.buffer)
            .await
            .context("Failed to read from input")?;

        if bytes_read == 0 && self.buffer.is_empty() {
            self.open = false;
            return Ok(None);
        }

        let mut line = std::mem::take(&mut self.buffer);
        while matches!(line.last(), Some(b'\n' | b'\r')) {
            line.pop();
        }
        tracing::trace!("Received: {}", String::from_utf8_lossy(&line));
        Ok(Some(line))
    }

    /// Whether end of input has not been reached yet
    pub fn is_open(&self) -> bool {
        self.open
    }
}

/// Writing half of a [`LineTransport`]
pub struct LineWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Send one line and flush it immediately
    pub async fn send(&mut self, line: &str) -> Result<()> {
        tracing::trace!("Sending: {}", line);

        self.writer
            .write_all(line.as_bytes())
            .await
            .context("Failed to write to output")?;

        // JSON-RPC over stdio is line-based
        self.writer
            .write_all(b"\n")
            .await
            .context("Failed to write newline to output")?;

        self.writer
            .flush()
            .await
            .context("Failed to flush output")?;

        Ok(())
    }
}
