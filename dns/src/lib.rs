//! RFC 1035 message codec.
//!
//! Server side: [`decode_query`] turns a datagram into a [`Query`],
//! [`encode_response`] / [`encode_response_for_udp`] serialise a
//! [`ResponseMessage`]. Client side: [`encode_request`] and
//! [`decode_response`].

mod error;
mod header;
mod question;
mod request_message;
mod resource_record;
mod response_message;
mod utils;

pub use domain_name_query_types::{Name, QClass, QType, Query};
pub use error::DnsError;
pub use header::{Flags, Rcode};
pub use question::Question;
pub use resource_record::{RData, ResourceRecord, Soa};
pub use response_message::ResponseMessage;

// https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.1
//
// Messages carried by UDP are restricted to 512 bytes (not counting the IP
// or UDP headers).
pub const MAX_UDP_MESSAGE_SIZE: usize = 512;

pub fn decode_query(request_bytes: &[u8]) -> Result<Query, DnsError> {
    request_message::RequestMessage::parse_query(request_bytes)
}

pub fn encode_response(response: &ResponseMessage) -> std::io::Result<Vec<u8>> {
    let mut response_bytes: Vec<u8> = vec![];
    response.to_bytes(&mut response_bytes)?;

    Ok(response_bytes)
}

pub fn encode_response_for_udp(response: &ResponseMessage) -> std::io::Result<Vec<u8>> {
    response.to_bytes_limited(MAX_UDP_MESSAGE_SIZE)
}

pub fn encode_request(id: u16, name: &Name, qtype: QType, recursion_desired: bool) -> std::io::Result<Vec<u8>> {
    let request_msg = request_message::RequestMessage::new(id, name.clone(), qtype, recursion_desired);
    let mut request_bytes: Vec<u8> = vec![];
    request_msg.to_bytes(&mut request_bytes)?;

    Ok(request_bytes)
}

pub fn decode_response(response_bytes: &[u8]) -> Result<ResponseMessage, DnsError> {
    ResponseMessage::parse_response(response_bytes)
}
