//! MCP transport layer.
//!
//! Messages are newline-delimited JSON. `StdioTransport` frames any reader
//! (stdin in production) with `LinesCodec`; `ChannelTransport` is an
//! in-memory pair used in tests.

use crate::error::McpError;
use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::codec::{Decoder, FramedRead, LinesCodec, LinesCodecError};

/// Largest accepted message line.
pub const MAX_LINE_BYTES: usize = 8 * 1024 * 1024;

/// Trait for MCP message transport.
#[async_trait]
pub trait McpTransport: Send {
    /// Next non-empty message line, or `None` once the peer has closed.
    ///
    /// A line that cannot be decoded comes back as `McpError::Codec`; the
    /// transport stays usable and the following line is read normally.
    async fn receive(&mut self) -> Result<Option<String>, McpError>;

    /// Write one message line.
    async fn send(&mut self, message: &str) -> Result<(), McpError>;
}

/// `LinesCodec` that yields per-line failures as items. `FramedRead` ends
/// the stream after a decoder error, so an oversized or non-UTF-8 line must
/// not surface as one.
#[derive(Debug)]
struct LineDecoder(LinesCodec);

impl Decoder for LineDecoder {
    type Item = Result<String, LinesCodecError>;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.0.decode(buf) {
            Ok(line) => Ok(line.map(Ok)),
            Err(e) => Ok(Some(Err(e))),
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.0.decode_eof(buf) {
            Ok(line) => Ok(line.map(Ok)),
            Err(e) => Ok(Some(Err(e))),
        }
    }
}

/// Newline-delimited transport over a reader/writer pair, stdin and stdout
/// by default. Stdout carries protocol messages only.
pub struct StdioTransport<R = tokio::io::Stdin, W = tokio::io::Stdout> {
    reader: FramedRead<R, LineDecoder>,
    writer: W,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self::with_io(tokio::io::stdin(), tokio::io::stdout(), MAX_LINE_BYTES)
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn with_io(reader: R, writer: W, max_line_bytes: usize) -> Self {
        Self {
            reader: FramedRead::new(
                reader,
                LineDecoder(LinesCodec::new_with_max_length(max_line_bytes)),
            ),
            writer,
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> McpTransport for StdioTransport<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        while let Some(item) = self.reader.next().await {
            let line = item??;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
        Ok(None)
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.writer.write_all(message.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

/// In-memory transport backed by channel pairs.
pub struct ChannelTransport {
    rx: mpsc::Receiver<String>,
    tx: mpsc::Sender<String>,
}

impl ChannelTransport {
    /// Two connected ends; what one sends the other receives.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::channel(32);
        let (tx_b, rx_a) = mpsc::channel(32);
        (Self { rx: rx_a, tx: tx_a }, Self { rx: rx_b, tx: tx_b })
    }
}

#[async_trait]
impl McpTransport for ChannelTransport {
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        Ok(self.rx.recv().await)
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.tx.send(message.to_string()).await.map_err(|e| {
            McpError::Transport(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_transport_pair() {
        let (mut a, mut b) = ChannelTransport::pair();

        a.send("hello from a").await.unwrap();
        assert_eq!(b.receive().await.unwrap(), Some("hello from a".to_string()));

        b.send("hello from b").await.unwrap();
        assert_eq!(a.receive().await.unwrap(), Some("hello from b".to_string()));
    }

    #[tokio::test]
    async fn test_bad_lines_do_not_end_stream() {
        let mut input = vec![b'a'; 80];
        input.extend_from_slice(b"\n\xff\xfe\n\n{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
        let mut transport = StdioTransport::with_io(&input[..], Vec::new(), 64);

        assert!(matches!(transport.receive().await, Err(McpError::Codec(_))));
        assert!(matches!(transport.receive().await, Err(McpError::Codec(_))));
        assert_eq!(
            transport.receive().await.unwrap().as_deref(),
            Some(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#)
        );
        assert_eq!(transport.receive().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_appends_newline() {
        let mut transport = StdioTransport::with_io(&b""[..], Vec::new(), 64);
        transport.send("{}").await.unwrap();
        assert_eq!(transport.into_writer(), b"{}\n".to_vec());
    }

    #[tokio::test]
    async fn test_channel_transport_closed() {
        let (mut a, b) = ChannelTransport::pair();
        drop(b);
        assert_eq!(a.receive().await.unwrap(), None);
    }
}
