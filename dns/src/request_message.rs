use crate::error::DnsError;
use crate::header::{Flags, Header};
use crate::question::Question;
use crate::utils::NameCompressor;
use domain_name_query_types::{Name, QType, Query};
use std::io::Cursor;

pub struct RequestMessage {
    header: Header,
    question: Question,
}

impl RequestMessage {
    pub fn new(id: u16, name: Name, qtype: QType, recursion_desired: bool) -> Self {
        let mut flags = Flags::default();
        flags.set_recursion_desired(recursion_desired);

        let mut header = Header::new(id, flags);
        header.qdcount = 1;
        let question = Question::new(name, qtype);

        Self { header, question }
    }

    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> std::io::Result<()> {
        let mut compressor = NameCompressor::new();
        self.header.to_bytes(bytes)?;
        self.question.to_bytes(bytes, &mut compressor)?;

        Ok(())
    }

    // 解析客户端发来的查询，只关心 header 和第一个 question
    pub fn parse_query(request: &[u8]) -> Result<Query, DnsError> {
        let mut reader = Cursor::new(request);

        let header = Header::parse_from_reader(&mut reader)?;
        if header.flags.is_response() {
            return Err(DnsError::NotAQuery);
        }
        if header.qdcount != 1 {
            return Err(DnsError::QuestionCount(header.qdcount));
        }

        let question = Question::parse_from_reader(&mut reader)?;

        let query = Query {
            id: header.id,
            name: question.name,
            q_type: question.qtype,
            q_class: question.qclass,
            opcode: header.flags.opcode(),
            recursion_desired: header.flags.recursion_desired(),
            checking_disabled: header.flags.checking_disabled(),
        };

        Ok(query)
    }
}
