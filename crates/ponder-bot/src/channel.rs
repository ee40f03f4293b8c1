//! Line-oriented channels to the engine and the server.
//!
//! Both peers speak newline-terminated text. [`LineChannel`] wraps any tokio
//! reader/writer pair; [`ScriptedChannel`] replays canned input and records
//! what was written, for driving the bot without real processes.

use std::collections::VecDeque;
use std::io;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// A bidirectional stream of text lines.
#[allow(async_fn_in_trait)]
pub trait LineIo {
    /// Write one line; the newline is appended.
    async fn send_line(&mut self, line: &str) -> io::Result<()>;

    /// Read one line without its terminator. `None` at end of stream.
    async fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// A line channel backed by a process that can be replaced.
#[allow(async_fn_in_trait)]
pub trait EngineIo: LineIo {
    /// Close the current pipes and start a fresh process.
    async fn respawn(&mut self) -> io::Result<()>;
}

/// Byte-to-text mapping used on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// Invalid sequences become U+FFFD.
    Utf8,
    /// One byte per char; chars above U+00FF are sent as `?`.
    Latin1,
}

impl TextEncoding {
    fn decode(self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }

    fn encode(self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Latin1 => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect(),
        }
    }
}

pub struct LineChannel<R, W> {
    reader: BufReader<R>,
    writer: W,
    encoding: TextEncoding,
    buf: Vec<u8>,
}

impl<R, W> LineChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, encoding: TextEncoding) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            encoding,
            buf: Vec::new(),
        }
    }
}

impl<R, W> LineIo for LineChannel<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        let mut bytes = self.encoding.encode(line);
        bytes.push(b'\n');
        self.writer.write_all(&bytes).await?;
        self.writer.flush().await
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        if self.reader.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        while matches!(self.buf.last(), Some(&(b'\n' | b'\r'))) {
            self.buf.pop();
        }
        Ok(Some(self.encoding.decode(&self.buf)))
    }
}

/// In-memory channel: reads come from a queue, writes are recorded.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    incoming: VecDeque<String>,
    sent: Vec<String>,
    closed: bool,
    respawns: usize,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<I, T>(lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut channel = Self::new();
        channel.push_lines(lines);
        channel
    }

    pub fn push_lines<I, T>(&mut self, lines: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.incoming.extend(lines.into_iter().map(Into::into));
    }

    /// Every line written so far, oldest first.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }

    /// Drain the record of written lines.
    pub fn take_sent(&mut self) -> Vec<String> {
        std::mem::take(&mut self.sent)
    }

    /// Lines queued but not yet read.
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }

    /// Make further writes fail as if the peer had gone away.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn respawns(&self) -> usize {
        self.respawns
    }
}

impl LineIo for ScriptedChannel {
    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        if self.closed {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "channel closed"));
        }
        self.sent.push(line.to_string());
        Ok(())
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.incoming.pop_front())
    }
}

impl EngineIo for ScriptedChannel {
    async fn respawn(&mut self) -> io::Result<()> {
        self.respawns += 1;
        self.closed = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_line_channel_strips_terminators() {
        let input: &[u8] = b"uciok\r\nreadyok\n\nlast";
        let mut channel = LineChannel::new(input, Vec::new(), TextEncoding::Utf8);
        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some("uciok"));
        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some("readyok"));
        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some(""));
        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some("last"));
        assert_eq!(channel.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_line_channel_latin1() {
        let input: &[u8] = b"Jos\xe9 tells you: hola\n";
        let mut channel = LineChannel::new(input, Vec::new(), TextEncoding::Latin1);
        assert_eq!(
            channel.read_line().await.unwrap().as_deref(),
            Some("José tells you: hola")
        );

        channel.send_line("tell José ¡sí! ♞").await.unwrap();
        assert_eq!(channel.writer, b"tell Jos\xe9 \xa1s\xed! ?\n".to_vec());
    }

    #[tokio::test]
    async fn test_scripted_channel() {
        let mut channel = ScriptedChannel::with_lines(["a", "b"]);
        channel.send_line("x").await.unwrap();
        assert_eq!(channel.read_line().await.unwrap().as_deref(), Some("a"));
        assert_eq!(channel.pending(), 1);
        assert_eq!(channel.sent(), ["x"]);

        channel.close();
        assert!(channel.send_line("y").await.is_err());
        channel.respawn().await.unwrap();
        assert!(channel.send_line("y").await.is_ok());
        assert_eq!(channel.respawns(), 1);
        assert_eq!(channel.take_sent(), vec!["x", "y"]);
    }
}
