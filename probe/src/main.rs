extern crate tokio;

use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

use argh::FromArgs;
use dns::{Name, QType};
use log::{info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

fn default_server() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 53))
}

fn default_id() -> u16 {
    std::process::id() as u16
}

#[derive(Debug, FromArgs)]
#[argh(description = "send one DNS query and print the decoded reply")]
struct ProbeArgs {
    #[argh(positional, description = "name to query")]
    name: Name,

    #[argh(option, short = 't', default = "QType::Soa", description = "query type, default: SOA")]
    qtype: QType,

    #[argh(option, short = 's', default = "default_server()", description = "server address, default: 127.0.0.1:53")]
    server: SocketAddr,

    #[argh(option, default = "default_id()", description = "transaction id, default: derived from the pid")]
    id: u16,

    #[argh(switch, description = "query over TCP instead of UDP")]
    tcp: bool,

    #[argh(switch, description = "set the RD flag")]
    recurse: bool,
}

async fn query_udp(server: SocketAddr, request: &[u8]) -> std::io::Result<Vec<u8>> {
    let local_addr: SocketAddr = if server.is_ipv4() {
        SocketAddr::from(([0, 0, 0, 0], 0))
    } else {
        SocketAddr::from(([0u16; 8], 0))
    };
    let sock = UdpSocket::bind(local_addr).await?;
    sock.send_to(request, server).await?;

    let mut buf = vec![0u8; 4096];
    let size = timeout(REPLY_TIMEOUT, sock.recv(&mut buf)).await??;
    buf.truncate(size);

    Ok(buf)
}

async fn query_tcp(server: SocketAddr, request: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut stream = timeout(REPLY_TIMEOUT, TcpStream::connect(server)).await??;
    stream.write_u16(request.len() as u16).await?;
    stream.write_all(request).await?;

    let length = timeout(REPLY_TIMEOUT, stream.read_u16()).await??;
    let mut buf = vec![0u8; usize::from(length)];
    stream.read_exact(&mut buf).await?;

    Ok(buf)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::try_init();
    let args: ProbeArgs = argh::from_env();

    let request = dns::encode_request(args.id, &args.name, args.qtype, args.recurse)?;
    let transport = if args.tcp { "tcp" } else { "udp" };
    info!("sending {} {} query for {} to {} over {}", args.id, args.qtype, args.name, args.server, transport);

    let reply = if args.tcp {
        query_tcp(args.server, &request).await?
    } else {
        query_udp(args.server, &request).await?
    };
    info!("received {} bytes", reply.len());

    let response = dns::decode_response(&reply)?;
    if response.id() != args.id {
        warn!("reply id {} does not match query id {}", response.id(), args.id);
    }

    println!("{}", response);

    Ok(())
}
