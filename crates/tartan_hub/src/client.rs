//! Controller-side connection to a hub.
//!
//! Sends one request at a time and waits for the newline-terminated reply.

use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use tokio::net::ToSocketAddrs;
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::tcp::OwnedWriteHalf;
use tracing::debug;

use crate::house::FieldKey;
use crate::house::HouseState;
use crate::protocol;
use crate::protocol::ProtocolError;

pub struct HubClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl HubClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Ask the hub for a full state report
    pub async fn get_state(&mut self) -> Result<HouseState, ClientError> {
        let reply = self.request(&protocol::encode_get_state()).await?;
        Ok(protocol::parse_state_update(&reply)?)
    }

    /// Set the given flags, in order
    pub async fn set_state(&mut self, fields: &[(FieldKey, bool)]) -> Result<(), ClientError> {
        let reply = self.request(&protocol::encode_set_state(fields)).await?;
        Ok(protocol::parse_ok(&reply)?)
    }

    async fn request(&mut self, msg: &str) -> Result<String, ClientError> {
        debug!("Sending {}", msg);
        self.writer.write_all(msg.as_bytes()).await?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply).await? == 0 {
            return Err(ClientError::Closed);
        }
        debug!("Received {}", reply.trim_end());
        Ok(reply)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Hub closed the connection")]
    Closed,
}
