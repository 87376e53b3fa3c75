//! Stdio transport with LSP header framing.
//!
//! Every message is framed as:
//! ```text
//! Content-Length: <length>\r\n
//! \r\n
//! <payload>
//! ```
//! Headers other than `Content-Length` are ignored.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::process::{ChildStdin, ChildStdout};

use super::error::TransportError;

/// Transport wired to a spawned language server process.
pub type ProcessTransport = StdioTransport<ChildStdout, ChildStdin>;

/// Reads and writes LSP-framed messages over a byte stream pair.
///
/// The transport is generic over its endpoints so tests can drive it with
/// in-memory buffers instead of process pipes.
pub struct StdioTransport<R: Read, W: Write> {
    reader: BufReader<R>,
    writer: BufWriter<W>,
}

impl<R: Read, W: Write> StdioTransport<R, W> {
    /// Wraps a reader/writer pair in the framing protocol.
    #[must_use]
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer: BufWriter::new(writer),
        }
    }

    /// Sends one framed message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] when writing to the peer fails.
    pub fn send(&mut self, message: &[u8]) -> Result<(), TransportError> {
        let header = format!("Content-Length: {}\r\n\r\n", message.len());
        self.writer.write_all(header.as_bytes())?;
        self.writer.write_all(message)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Receives one framed message, blocking until it is complete.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::MissingContentLength`] when the headers
    /// carry no length, [`TransportError::InvalidHeader`] when a header line
    /// is malformed, and [`TransportError::Io`] when the stream fails or
    /// closes mid-message.
    pub fn receive(&mut self) -> Result<Vec<u8>, TransportError> {
        let content_length = self.read_headers()?;
        let mut payload = vec![0_u8; content_length];
        self.reader.read_exact(&mut payload)?;
        Ok(payload)
    }

    /// Consumes header lines up to the blank separator and extracts the
    /// payload length.
    fn read_headers(&mut self) -> Result<usize, TransportError> {
        let mut content_length: Option<usize> = None;

        loop {
            let mut line = String::new();
            let bytes_read = self.reader.read_line(&mut line)?;
            if bytes_read == 0 {
                return Err(TransportError::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "connection closed while reading headers",
                )));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }

            if let Some(value) = trimmed.strip_prefix("Content-Length:") {
                content_length = Some(
                    value
                        .trim()
                        .parse()
                        .map_err(|_| TransportError::InvalidHeader)?,
                );
            }
        }

        content_length.ok_or(TransportError::MissingContentLength)
    }
}
