//! Connection to the chess server, either through a wrapper process such as
//! `timeseal` or over plain TCP.

use std::io;
use std::path::Path;
use std::process::Stdio;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::info;

use crate::channel::{LineChannel, LineIo, TextEncoding};

pub enum ServerConnection {
    Wrapper {
        child: Child,
        channel: LineChannel<ChildStdout, ChildStdin>,
    },
    Direct(LineChannel<OwnedReadHalf, OwnedWriteHalf>),
}

impl ServerConnection {
    /// Start `wrapper host port` and talk to the server through its stdio.
    pub fn spawn_wrapper(wrapper: &Path, host: &str, port: u16) -> io::Result<Self> {
        let mut child = Command::new(wrapper)
            .arg(host)
            .arg(port.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("wrapper stdin not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("wrapper stdout not captured"))?;

        info!(wrapper = %wrapper.display(), host, port, "Connected through wrapper");
        Ok(Self::Wrapper {
            child,
            channel: LineChannel::new(stdout, stdin, TextEncoding::Latin1),
        })
    }

    pub async fn connect(host: &str, port: u16) -> io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        let (reader, writer) = stream.into_split();
        info!(host, port, "Connected");
        Ok(Self::Direct(LineChannel::new(
            reader,
            writer,
            TextEncoding::Latin1,
        )))
    }

    /// Wrapper process id, if there is one.
    pub fn wrapper_pid(&self) -> Option<u32> {
        match self {
            Self::Wrapper { child, .. } => child.id(),
            Self::Direct(_) => None,
        }
    }
}

impl LineIo for ServerConnection {
    async fn send_line(&mut self, line: &str) -> io::Result<()> {
        match self {
            Self::Wrapper { channel, .. } => channel.send_line(line).await,
            Self::Direct(channel) => channel.send_line(line).await,
        }
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        match self {
            Self::Wrapper { channel, .. } => channel.read_line().await,
            Self::Direct(channel) => channel.read_line().await,
        }
    }
}
