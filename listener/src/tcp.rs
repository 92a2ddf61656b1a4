use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use authority::Responder;
use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::{handle_message, Transport};

pub(crate) async fn serve(
    listener: TcpListener,
    responder: Arc<Responder>,
    idle_timeout: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("TCP listener shutting down");
                break;
            }
            accepted = accept(&listener) => {
                if let Some((stream, peer)) = accepted {
                    let responder = responder.clone();
                    tokio::spawn(async move {
                        serve_connection(stream, peer, responder, idle_timeout).await;
                    });
                }
            }
        }
    }
}

// Reference:
// https://github.com/tokio-rs/axum/blob/axum-v0.7.5/axum/src/serve.rs#L388
async fn accept(listener: &TcpListener) -> Option<(TcpStream, SocketAddr)> {
    match listener.accept().await {
        Ok(conn) => Some(conn),
        Err(e) => {
            if is_connection_error(&e) {
                return None;
            }

            // Most likely EMFILE, back off so the loop does not spin while
            // file descriptors are exhausted.
            tracing::error!("TCP accept error, err: {}", e);
            tokio::time::sleep(Duration::from_secs(1)).await;
            None
        }
    }
}

fn is_connection_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::ConnectionRefused | ErrorKind::ConnectionAborted | ErrorKind::ConnectionReset
    )
}

// https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.2
//
// Every message is prefixed with a two byte length field. A client may send
// several queries over one connection.
async fn serve_connection(mut stream: TcpStream, peer: SocketAddr, responder: Arc<Responder>, idle_timeout: Duration) {
    tracing::debug!("accepted TCP connection from {}", peer);

    loop {
        let length = match timeout(idle_timeout, stream.read_u16()).await {
            Ok(Ok(length)) => length,
            Ok(Err(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Ok(Err(e)) => {
                tracing::debug!("TCP read error from {}, err: {}", peer, e);
                break;
            }
            Err(_) => {
                tracing::debug!("closing idle TCP connection from {}", peer);
                break;
            }
        };

        let mut request = vec![0u8; usize::from(length)];
        match timeout(idle_timeout, stream.read_exact(&mut request)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                tracing::debug!("TCP read error from {}, err: {}", peer, e);
                break;
            }
            Err(_) => {
                tracing::debug!("timed out reading TCP message from {}", peer);
                break;
            }
        }

        let reply = match handle_message(&responder, &request, Transport::Tcp) {
            Some(reply) => reply,
            None => continue,
        };

        let mut framed = BytesMut::with_capacity(reply.len() + 2);
        framed.put_u16(reply.len() as u16);
        framed.put_slice(&reply);

        if let Err(e) = stream.write_all(&framed).await {
            tracing::debug!("TCP write error to {}, err: {}", peer, e);
            break;
        }
    }

    tracing::debug!("TCP connection from {} closed", peer);
}
