use std::io;
use std::net::SocketAddr;

use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::config::Config;
use crate::console::ConsoleFactory;
use crate::house::House;
use crate::protocol::Request;
use crate::protocol::Response;
use crate::protocol::set_state_payload;
use crate::user::UserActor;

/// Hub server
///
/// Serves one house controller at a time. Each connection gets its own
/// occupant, stopped when the connection ends. Time in the simulation only
/// moves forward when a request has been handled.
pub struct Server {
    listener: TcpListener,
    house: House,
    consoles: ConsoleFactory,
    read_chunk_size: usize,
}

impl Server {
    /// Bind the listening socket. Failing here is fatal for the hub.
    pub async fn bind(
        config: &Config,
        house: House,
        consoles: ConsoleFactory,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((config.listen.as_str(), config.port))
            .await
            .map_err(|source| ServerError::Bind {
                address: config.bind_address(),
                source,
            })?;

        Ok(Self {
            listener,
            house,
            consoles,
            read_chunk_size: config.read_chunk_size,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept and serve connections forever
    ///
    /// Connection failures are logged and the next connection is accepted.
    /// Only a failure of the listening socket itself ends the loop.
    pub async fn run(self) -> Result<(), ServerError> {
        let address = self.local_addr()?;

        loop {
            info!("Waiting for house connection on {}", address);
            let (stream, peer) = self.listener.accept().await.map_err(ServerError::Accept)?;
            info!("Connection from {}", peer);

            let occupant = UserActor::start(self.house.clone(), (self.consoles)());

            if let Err(e) = self.serve_connection(stream).await {
                error!("Connection from {} failed: {}", peer, e);
            }

            info!("Closing connection from {}", peer);
            occupant.stop();
        }
    }

    /// Run the request loop for one connection until the peer goes away
    async fn serve_connection(&self, mut stream: TcpStream) -> Result<(), ServerError> {
        let mut buf = vec![0u8; self.read_chunk_size];

        loop {
            let n = stream.read(&mut buf).await?;
            if n == 0 {
                debug!("Peer closed the connection");
                return Ok(());
            }

            let text = decode_ascii(&buf[..n])?;
            if let Some(response) = handle_request(&self.house, text) {
                stream.write_all(response.encode().as_bytes()).await?;
            }

            self.house.tick();
        }
    }
}

/// Decode a request, refusing anything outside ASCII
fn decode_ascii(bytes: &[u8]) -> Result<&str, ServerError> {
    if !bytes.is_ascii() {
        return Err(ServerError::NotAscii);
    }
    std::str::from_utf8(bytes).map_err(|_| ServerError::NotAscii)
}

/// Answer one request against the house
///
/// Returns None for requests that get no reply. The caller ticks the
/// simulation afterwards either way.
pub fn handle_request(house: &House, text: &str) -> Option<Response> {
    match Request::parse(text) {
        Ok(Request::GetState) => Some(Response::StateUpdate(house.snapshot())),
        Ok(Request::SetState(pairs)) => {
            info!("Received state update {}", set_state_payload(text));
            house.apply_update(pairs);
            Some(Response::Ok)
        }
        Err(e) => {
            warn!("Dropping request: {}", e);
            None
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to accept connection: {0}")]
    Accept(#[source] io::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Request is not ASCII")]
    NotAscii,
}
