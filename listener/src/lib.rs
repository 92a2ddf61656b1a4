//! UDP and TCP front end for the [`Responder`].

mod tcp;
mod udp;

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use authority::Responder;
use configuration::ListenerConfiguration;
use futures::future;
use thiserror::Error;
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transport {
    Udp,
    Tcp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Transport::Udp => write!(f, "UDP"),
            Transport::Tcp => write!(f, "TCP"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {transport} on {addr}: {source}")]
    Bind {
        transport: Transport,
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("neither UDP nor TCP is enabled")]
    NoTransport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decodes one message, answers it and encodes the reply for `transport`.
/// Messages that do not decode as a query are dropped without a reply.
pub fn handle_message(responder: &Responder, request: &[u8], transport: Transport) -> Option<Vec<u8>> {
    let query = match dns::decode_query(request) {
        Ok(query) => query,
        Err(e) => {
            tracing::debug!("dropping malformed {} message, err: {}", transport, e);
            return None;
        }
    };

    let response = responder.respond(&query);
    let encoded = match transport {
        Transport::Udp => dns::encode_response_for_udp(&response),
        Transport::Tcp => dns::encode_response(&response),
    };

    match encoded {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::error!("failed to encode response to query id {}, err: {}", query.id, e);
            None
        }
    }
}

pub struct DnsServer {
    address: IpAddr,
    port: u16,
    tcp: bool,
    udp: bool,
    tcp_idle_timeout: Duration,
    responder: Arc<Responder>,
}

impl DnsServer {
    pub fn new(address: IpAddr, port: u16, tcp: bool, udp: bool, responder: Responder) -> Self {
        Self {
            address,
            port,
            tcp,
            udp,
            tcp_idle_timeout: Duration::from_secs(10),
            responder: Arc::new(responder),
        }
    }

    pub fn from_configuration(cfg: &ListenerConfiguration, responder: Responder) -> Self {
        Self::new(cfg.address, cfg.port, cfg.tcp, cfg.udp, responder).with_tcp_idle_timeout(cfg.tcp_idle_timeout())
    }

    pub fn with_tcp_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.tcp_idle_timeout = idle_timeout;
        self
    }

    /// Binds every enabled transport and starts serving in the background.
    /// Bind failures are returned before anything is spawned. With port 0
    /// the TCP listener reuses the port the UDP socket was given.
    pub async fn start(self) -> Result<RunningServer, ListenerError> {
        if !self.tcp && !self.udp {
            return Err(ListenerError::NoTransport);
        }

        let mut bind_addr = SocketAddr::new(self.address, self.port);

        let udp_socket = if self.udp {
            let socket = UdpSocket::bind(bind_addr).await.map_err(|source| ListenerError::Bind {
                transport: Transport::Udp,
                addr: bind_addr,
                source,
            })?;
            bind_addr = socket.local_addr()?;
            Some(socket)
        } else {
            None
        };

        let tcp_listener = if self.tcp {
            let listener = TcpListener::bind(bind_addr).await.map_err(|source| ListenerError::Bind {
                transport: Transport::Tcp,
                addr: bind_addr,
                source,
            })?;
            Some(listener)
        } else {
            None
        };

        let (shutdown, _) = broadcast::channel(1);
        let mut tasks = vec![];
        let mut udp_addr = None;
        let mut tcp_addr = None;

        if let Some(socket) = udp_socket {
            let addr = socket.local_addr()?;
            tracing::info!("UDP server started on {}", addr);
            udp_addr = Some(addr);
            tasks.push(tokio::spawn(udp::serve(socket, self.responder.clone(), shutdown.subscribe())));
        }

        if let Some(listener) = tcp_listener {
            let addr = listener.local_addr()?;
            tracing::info!("TCP server started on {}", addr);
            tcp_addr = Some(addr);
            tasks.push(tokio::spawn(tcp::serve(
                listener,
                self.responder.clone(),
                self.tcp_idle_timeout,
                shutdown.subscribe(),
            )));
        }

        Ok(RunningServer {
            udp_addr,
            tcp_addr,
            shutdown,
            tasks,
        })
    }
}

/// Handle to the background listener tasks.
pub struct RunningServer {
    udp_addr: Option<SocketAddr>,
    tcp_addr: Option<SocketAddr>,
    shutdown: broadcast::Sender<()>,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningServer {
    pub fn udp_addr(&self) -> Option<SocketAddr> {
        self.udp_addr
    }

    pub fn tcp_addr(&self) -> Option<SocketAddr> {
        self.tcp_addr
    }

    /// Stops accepting queries and waits for the listener loops to exit.
    /// Established TCP connections finish on their own idle timeout.
    pub async fn stop(self) {
        tracing::info!("stopping DNS server");
        let _ = self.shutdown.send(());
        Self::join(self.tasks).await;
        tracing::info!("DNS server stopped");
    }

    /// Waits until the listener loops exit.
    pub async fn wait(self) {
        Self::join(self.tasks).await;
    }

    async fn join(tasks: Vec<JoinHandle<()>>) {
        for result in future::join_all(tasks).await {
            if let Err(e) = result {
                tracing::error!("listener task failed, err: {}", e);
            }
        }
    }
}
