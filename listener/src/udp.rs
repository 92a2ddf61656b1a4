use std::sync::Arc;

use authority::Responder;
use bytes::BytesMut;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;

use crate::{handle_message, Transport};

// Queries are tiny; anything larger than the EDNS default is not worth reading.
const RECV_BUFFER_SIZE: usize = 4096;

pub(crate) async fn serve(socket: UdpSocket, responder: Arc<Responder>, mut shutdown: broadcast::Receiver<()>) {
    let mut buf = BytesMut::with_capacity(RECV_BUFFER_SIZE);

    loop {
        buf.clear();

        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("UDP listener shutting down");
                break;
            }
            received = socket.recv_buf_from(&mut buf) => {
                let (size, peer) = match received {
                    Ok(r) => r,
                    Err(e) => {
                        // e.g. ICMP port unreachable surfacing as ConnectionReset
                        tracing::debug!("UDP receive error, err: {}", e);
                        continue;
                    }
                };
                tracing::debug!("received udp message from {}, length: {}", peer, size);

                if let Some(reply) = handle_message(&responder, &buf[..size], Transport::Udp) {
                    if let Err(e) = socket.send_to(&reply, peer).await {
                        tracing::error!("failed to send UDP response to {}, err: {}", peer, e);
                    }
                }
            }
        }
    }
}
