use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use authority::{FixedDate, Responder, ZoneRecords};
use chrono::NaiveDate;
use configuration::ZoneConfiguration;
use dns::{Name, QType, RData, Rcode, ResponseMessage};
use listener::{DnsServer, ListenerError, RunningServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

fn responder() -> Responder {
    let zone = ZoneConfiguration::default().validate().unwrap();
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    Responder::new(ZoneRecords::with_clock(zone, FixedDate(today)))
}

async fn start(tcp: bool, udp: bool) -> RunningServer {
    DnsServer::new(LOCALHOST, 0, tcp, udp, responder())
        .start()
        .await
        .unwrap()
}

fn request(id: u16, name: &str, qtype: QType) -> Vec<u8> {
    dns::encode_request(id, &Name::from_ascii(name).unwrap(), qtype, false).unwrap()
}

async fn udp_exchange(client: &UdpSocket, server: SocketAddr, bytes: &[u8]) -> ResponseMessage {
    client.send_to(bytes, server).await.unwrap();

    let mut buf = [0u8; 512];
    let size = timeout(Duration::from_secs(5), client.recv(&mut buf))
        .await
        .expect("no UDP reply")
        .unwrap();
    dns::decode_response(&buf[..size]).unwrap()
}

async fn tcp_exchange(stream: &mut TcpStream, bytes: &[u8]) -> ResponseMessage {
    stream.write_u16(bytes.len() as u16).await.unwrap();
    stream.write_all(bytes).await.unwrap();

    let length = stream.read_u16().await.unwrap();
    let mut buf = vec![0u8; usize::from(length)];
    stream.read_exact(&mut buf).await.unwrap();
    dns::decode_response(&buf).unwrap()
}

#[tokio::test]
async fn udp_soa_query() {
    let server = start(false, true).await;
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let response = udp_exchange(&client, server.udp_addr().unwrap(), &request(0x1234, "blackhole.romulan.zone", QType::Soa)).await;

    assert_eq!(response.id(), 0x1234);
    assert_eq!(response.rcode(), Rcode::NoError);
    assert!(response.is_authoritative());
    match &response.answers()[0].rdata {
        RData::Soa(soa) => assert_eq!(soa.serial, 2026101900),
        other => panic!("expected SOA, got {:?}", other),
    }

    server.stop().await;
}

#[tokio::test]
async fn udp_nxdomain_query() {
    let server = start(false, true).await;
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    let response = udp_exchange(&client, server.udp_addr().unwrap(), &request(1, "example.com", QType::A)).await;

    assert_eq!(response.id(), 1);
    assert_eq!(response.rcode(), Rcode::NxDomain);
    assert!(response.answers().is_empty());
    assert_eq!(response.authorities().len(), 1);

    server.stop().await;
}

#[tokio::test]
async fn malformed_datagram_gets_no_reply() {
    let server = start(false, true).await;
    let addr = server.udp_addr().unwrap();
    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

    client.send_to(&[0xde, 0xad, 0xbe, 0xef], addr).await.unwrap();
    let mut buf = [0u8; 512];
    assert!(timeout(Duration::from_millis(200), client.recv(&mut buf)).await.is_err());

    // the listener is still alive afterwards
    let response = udp_exchange(&client, addr, &request(2, "romulan.zone", QType::Ns)).await;
    assert_eq!(response.id(), 2);

    server.stop().await;
}

#[tokio::test]
async fn tcp_serves_several_queries_per_connection() {
    let server = start(true, false).await;
    let mut stream = TcpStream::connect(server.tcp_addr().unwrap()).await.unwrap();

    let ns = tcp_exchange(&mut stream, &request(0xabcd, "blackhole.romulan.zone", QType::Ns)).await;
    assert_eq!(ns.id(), 0xabcd);
    assert_eq!(ns.rcode(), Rcode::NoError);
    assert_eq!(
        ns.answers()[0].rdata,
        RData::Ns(Name::from_ascii("blackhole.romulan.zone").unwrap())
    );

    let txt = tcp_exchange(&mut stream, &request(2, "blackhole.romulan.zone", QType::Txt)).await;
    assert_eq!(txt.id(), 2);
    assert_eq!(txt.rcode(), Rcode::NxDomain);

    server.stop().await;
}

async fn start_with_idle_timeout(idle_timeout: Duration) -> RunningServer {
    DnsServer::new(LOCALHOST, 0, true, false, responder())
        .with_tcp_idle_timeout(idle_timeout)
        .start()
        .await
        .unwrap()
}

async fn assert_closed_by_server(stream: &mut TcpStream) {
    let mut buf = [0u8; 16];
    let read = timeout(Duration::from_secs(5), stream.read(&mut buf))
        .await
        .expect("connection still open");
    assert!(matches!(read, Ok(0) | Err(_)));
}

#[tokio::test]
async fn idle_tcp_connection_is_closed() {
    let server = start_with_idle_timeout(Duration::from_millis(100)).await;
    let mut stream = TcpStream::connect(server.tcp_addr().unwrap()).await.unwrap();

    let soa = tcp_exchange(&mut stream, &request(3, "romulan.zone", QType::Soa)).await;
    assert_eq!(soa.rcode(), Rcode::NoError);

    assert_closed_by_server(&mut stream).await;

    server.stop().await;
}

#[tokio::test]
async fn stalled_tcp_message_is_closed() {
    let server = start_with_idle_timeout(Duration::from_millis(100)).await;
    let mut stream = TcpStream::connect(server.tcp_addr().unwrap()).await.unwrap();

    // length prefix promises 40 bytes, only 2 arrive
    stream.write_u16(40).await.unwrap();
    stream.write_all(&[0x12, 0x34]).await.unwrap();

    assert_closed_by_server(&mut stream).await;

    server.stop().await;
}

#[tokio::test]
async fn udp_and_tcp_share_a_port() {
    let server = start(true, true).await;
    let udp_addr = server.udp_addr().unwrap();
    let tcp_addr = server.tcp_addr().unwrap();
    assert_eq!(udp_addr, tcp_addr);

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let over_udp = udp_exchange(&client, udp_addr, &request(3, "romulan.zone", QType::Soa)).await;
    let mut stream = TcpStream::connect(tcp_addr).await.unwrap();
    let over_tcp = tcp_exchange(&mut stream, &request(3, "romulan.zone", QType::Soa)).await;
    assert_eq!(over_udp, over_tcp);

    server.stop().await;
}

#[tokio::test]
async fn bind_conflict_fails_fast() {
    let taken = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let port = taken.local_addr().unwrap().port();

    let result = DnsServer::new(LOCALHOST, port, false, true, responder()).start().await;
    assert!(matches!(result, Err(ListenerError::Bind { .. })));
}

#[tokio::test]
async fn no_transport_is_an_error() {
    let result = DnsServer::new(LOCALHOST, 0, false, false, responder()).start().await;
    assert!(matches!(result, Err(ListenerError::NoTransport)));
}

#[tokio::test]
async fn stop_closes_the_listeners() {
    let server = start(true, false).await;
    let addr = server.tcp_addr().unwrap();
    timeout(Duration::from_secs(5), server.stop()).await.unwrap();

    assert!(TcpStream::connect(addr).await.is_err());
}
