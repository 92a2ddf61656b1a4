use crate::error::DnsError;
use crate::header::{Flags, Header, Rcode};
use crate::question::Question;
use crate::resource_record::{Fqdn, ResourceRecord};
use crate::utils::NameCompressor;
use domain_name_query_types::Query;
use std::fmt;
use std::io::Cursor;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResponseMessage {
    id: u16,
    flags: Flags,
    question: Option<Question>,
    answer_records: Vec<ResourceRecord>,
    authority_records: Vec<ResourceRecord>,
    additional_records: Vec<ResourceRecord>,
}

impl ResponseMessage {
    /// Empty reply to `query`: id, opcode, RD, CD and the question are
    /// echoed, QR is set and everything else is left clear.
    pub fn for_query(query: &Query) -> Self {
        let mut flags = Flags::default();
        flags.set_response(true);
        flags.set_opcode(query.opcode);
        flags.set_recursion_desired(query.recursion_desired);
        // RFC 4035 section 3.2.2
        flags.set_checking_disabled(query.checking_disabled);

        let question = Question {
            name: query.name.clone(),
            qtype: query.q_type,
            qclass: query.q_class,
        };

        Self {
            id: query.id,
            flags,
            question: Some(question),
            answer_records: vec![],
            authority_records: vec![],
            additional_records: vec![],
        }
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn rcode(&self) -> Rcode {
        self.flags.rcode()
    }

    pub fn set_rcode(&mut self, rcode: Rcode) {
        self.flags.set_rcode(rcode);
    }

    pub fn is_authoritative(&self) -> bool {
        self.flags.is_authoritative()
    }

    pub fn set_authoritative(&mut self, on: bool) {
        self.flags.set_authoritative(on);
    }

    pub fn is_truncated(&self) -> bool {
        self.flags.is_truncated()
    }

    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answer_records
    }

    pub fn authorities(&self) -> &[ResourceRecord] {
        &self.authority_records
    }

    pub fn additionals(&self) -> &[ResourceRecord] {
        &self.additional_records
    }

    pub fn add_answer(&mut self, record: ResourceRecord) {
        self.answer_records.push(record);
    }

    pub fn add_authority(&mut self, record: ResourceRecord) {
        self.authority_records.push(record);
    }

    pub fn to_bytes(&self, bytes: &mut Vec<u8>) -> std::io::Result<()> {
        let mut header = Header::new(self.id, self.flags);
        header.qdcount = self.question.iter().count() as u16;
        header.ancount = self.answer_records.len() as u16;
        header.nscount = self.authority_records.len() as u16;
        header.arcount = self.additional_records.len() as u16;
        header.to_bytes(bytes)?;

        let mut compressor = NameCompressor::new();
        if let Some(question) = &self.question {
            question.to_bytes(bytes, &mut compressor)?;
        }

        let records = self
            .answer_records
            .iter()
            .chain(&self.authority_records)
            .chain(&self.additional_records);
        for record in records {
            record.to_bytes(bytes, &mut compressor)?;
        }

        Ok(())
    }

    /// Encodes for a transport that caps the message size. When the full
    /// message does not fit, the record sections are dropped and TC is set
    /// so the client retries over TCP.
    pub fn to_bytes_limited(&self, max_size: usize) -> std::io::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(max_size);
        self.to_bytes(&mut bytes)?;
        if bytes.len() <= max_size {
            return Ok(bytes);
        }

        let mut truncated = Self {
            id: self.id,
            flags: self.flags,
            question: self.question.clone(),
            answer_records: vec![],
            authority_records: vec![],
            additional_records: vec![],
        };
        truncated.flags.set_truncated(true);

        bytes.clear();
        truncated.to_bytes(&mut bytes)?;

        Ok(bytes)
    }

    // 解析 DNS 的响应
    pub fn parse_response(response: &[u8]) -> Result<Self, DnsError> {
        let mut reader = Cursor::new(response);

        let header = Header::parse_from_reader(&mut reader)?;

        let mut question = None;
        for _ in 0..header.qdcount {
            let q = Question::parse_from_reader(&mut reader)?;
            question.get_or_insert(q);
        }

        let answer_records = parse_records(&mut reader, header.ancount)?;
        let authority_records = parse_records(&mut reader, header.nscount)?;
        let additional_records = parse_records(&mut reader, header.arcount)?;

        let msg = Self {
            id: header.id,
            flags: header.flags,
            question,
            answer_records,
            authority_records,
            additional_records,
        };

        Ok(msg)
    }
}

fn parse_records(reader: &mut Cursor<&[u8]>, count: u16) -> Result<Vec<ResourceRecord>, DnsError> {
    let mut records: Vec<ResourceRecord> = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        records.push(ResourceRecord::parse_from_reader(reader)?);
    }

    Ok(records)
}

// dig 风格的输出
impl fmt::Display for ResponseMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut flag_names = vec![];
        if self.flags.is_response() {
            flag_names.push("qr");
        }
        if self.flags.is_authoritative() {
            flag_names.push("aa");
        }
        if self.flags.is_truncated() {
            flag_names.push("tc");
        }
        if self.flags.recursion_desired() {
            flag_names.push("rd");
        }
        if self.flags.recursion_available() {
            flag_names.push("ra");
        }

        writeln!(
            f,
            ";; opcode: {}, status: {}, id: {}",
            self.flags.opcode(),
            self.rcode(),
            self.id
        )?;
        writeln!(f, ";; flags: {}", flag_names.join(" "))?;

        if let Some(q) = &self.question {
            writeln!(f, "\n;; QUESTION SECTION:")?;
            writeln!(f, ";{}\t\t{}\t{}", Fqdn(&q.name), q.qclass, q.qtype)?;
        }

        let sections = [
            ("ANSWER", &self.answer_records),
            ("AUTHORITY", &self.authority_records),
            ("ADDITIONAL", &self.additional_records),
        ];
        for (title, records) in sections.iter() {
            if records.is_empty() {
                continue;
            }
            writeln!(f, "\n;; {} SECTION:", title)?;
            for record in records.iter() {
                writeln!(f, "{}", record)?;
            }
        }

        Ok(())
    }
}
