//! The message model: the 12-byte header, questions, and the four record
//! sections, plus `DnsQuery`/`DnsReply` wrappers that enforce the QR
//! direction invariant at the type level.

use crate::bail;
use crate::name::DnsName;
use crate::reader::WireReader;
use crate::record::Record;
use crate::types::{Class, Opcode, Rcode, Type, QR};
use crate::writer::WireWriter;
use num_traits::FromPrimitive;
use std::io;

/// The 12-byte DNS header, decoded into its individual fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Header {
    pub id: u16,
    pub qr: QR,
    pub opcode: Opcode,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: bool,
    pub ad: bool,
    pub cd: bool,
    pub rcode: Rcode,
}

impl Header {
    fn read(reader: &mut WireReader) -> io::Result<(Header, u16, u16, u16, u16)> {
        let id = reader.read_u16()?;

        let b = reader.read_u8()?;
        let qr = QR::from_bool(b & 0b1000_0000 != 0);
        let opcode_bits = (b & 0b0111_1000) >> 3;
        let aa = b & 0b0000_0100 != 0;
        let tc = b & 0b0000_0010 != 0;
        let rd = b & 0b0000_0001 != 0;

        let opcode = match Opcode::from_u8(opcode_bits) {
            Some(o) => o,
            None => bail!(InvalidData, "invalid OPCODE({})", opcode_bits),
        };

        let b = reader.read_u8()?;
        let ra = b & 0b1000_0000 != 0;
        let z = b & 0b0100_0000 != 0;
        let ad = b & 0b0010_0000 != 0;
        let cd = b & 0b0001_0000 != 0;
        let rcode_bits = b & 0b0000_1111;

        let rcode = match Rcode::from_u8(rcode_bits) {
            Some(r) => r,
            None => bail!(InvalidData, "invalid RCODE({})", rcode_bits),
        };

        let qdcount = reader.read_u16()?;
        let ancount = reader.read_u16()?;
        let nscount = reader.read_u16()?;
        let arcount = reader.read_u16()?;

        Ok((
            Header {
                id,
                qr,
                opcode,
                aa,
                tc,
                rd,
                ra,
                z,
                ad,
                cd,
                rcode,
            },
            qdcount,
            ancount,
            nscount,
            arcount,
        ))
    }

    fn write(&self, writer: &mut WireWriter, qd: u16, an: u16, ns: u16, ar: u16) -> io::Result<()> {
        writer.write_u16(self.id)?;

        let mut b = 0u8;
        b |= if self.qr.to_bool() { 0b1000_0000 } else { 0 };
        b |= ((self.opcode as u8) << 3) & 0b0111_1000;
        b |= if self.aa { 0b0000_0100 } else { 0 };
        b |= if self.tc { 0b0000_0010 } else { 0 };
        b |= if self.rd { 0b0000_0001 } else { 0 };
        writer.write_u8(b)?;

        let mut b = 0u8;
        b |= if self.ra { 0b1000_0000 } else { 0 };
        b |= if self.z { 0b0100_0000 } else { 0 };
        b |= if self.ad { 0b0010_0000 } else { 0 };
        b |= if self.cd { 0b0001_0000 } else { 0 };
        b |= (self.rcode as u8) & 0b0000_1111;
        writer.write_u8(b)?;

        writer.write_u16(qd)?;
        writer.write_u16(an)?;
        writer.write_u16(ns)?;
        writer.write_u16(ar)
    }
}

/// A single question: `(name, type, class)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Question {
    pub name: DnsName,
    pub r#type: Type,
    pub class: Class,
}

impl Question {
    fn read(reader: &mut WireReader) -> io::Result<Question> {
        let name = reader.read_name()?;
        let type_code = reader.read_u16()?;
        let class_code = reader.read_u16()?;

        let r#type = match Type::from_u16(type_code) {
            Some(t) => t,
            None => bail!(InvalidData, "unknown question type {}", type_code),
        };
        let class = match Class::from_u16(class_code) {
            Some(c) => c,
            None => bail!(InvalidData, "unknown question class {}", class_code),
        };

        Ok(Question {
            name,
            r#type,
            class,
        })
    }

    fn write(&self, writer: &mut WireWriter) -> io::Result<()> {
        writer.write_name(&self.name, true)?;
        writer.write_u16(self.r#type as u16)?;
        writer.write_u16(self.class as u16)
    }
}

/// Header + four ordered record sections. The common core shared by
/// [`DnsQuery`] and [`DnsReply`].
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DnsMessage {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub additionals: Vec<Record>,
}

impl DnsMessage {
    /// Adds a question, rejecting a `(name, type, class)` duplicate.
    pub fn add_question(&mut self, name: DnsName, r#type: Type, class: Class) -> io::Result<()> {
        let q = Question {
            name,
            r#type,
            class,
        };

        if self
            .questions
            .iter()
            .any(|existing| existing.name == q.name && existing.r#type == q.r#type && existing.class == q.class)
        {
            bail!(
                InvalidInput,
                "duplicate question ({}, {}, {})",
                q.name,
                q.r#type,
                q.class
            );
        }

        self.questions.push(q);
        Ok(())
    }

    fn read(buf: &[u8]) -> io::Result<DnsMessage> {
        let mut reader = WireReader::new(buf);
        let (header, qdcount, ancount, nscount, arcount) = Header::read(&mut reader)?;

        let mut questions = Vec::with_capacity(qdcount as usize);
        for _ in 0..qdcount {
            questions.push(Question::read(&mut reader)?);
        }

        let answers = read_records(&mut reader, ancount)?;
        let authorities = read_records(&mut reader, nscount)?;
        let additionals = read_records(&mut reader, arcount)?;

        Ok(DnsMessage {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }

    fn write(&self) -> io::Result<Vec<u8>> {
        let mut writer = WireWriter::new();

        self.header.write(
            &mut writer,
            self.questions.len() as u16,
            self.answers.len() as u16,
            self.authorities.len() as u16,
            self.additionals.len() as u16,
        )?;

        for q in &self.questions {
            q.write(&mut writer)?;
        }

        for section in [&self.answers, &self.authorities, &self.additionals] {
            for record in section {
                write_record(&mut writer, record)?;
            }
        }

        Ok(writer.into_bytes())
    }
}

fn read_records(reader: &mut WireReader, count: u16) -> io::Result<Vec<Record>> {
    let mut records = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let name = reader.read_name()?;
        let type_code = reader.read_u16()?;
        let class_code = reader.read_u16()?;
        let ttl = reader.read_ttl()?;
        let rdlength = reader.read_u16()?;

        let class = match Class::from_u16(class_code) {
            Some(c) => c,
            None => bail!(InvalidData, "unknown record class {}", class_code),
        };

        let data = crate::record::RecordData::read(reader, type_code, rdlength)?;

        records.push(Record {
            name,
            class,
            ttl,
            data,
        });
    }

    Ok(records)
}

fn write_record(writer: &mut WireWriter, record: &Record) -> io::Result<()> {
    // Record owner names are compressible; RDATA compression rules are
    // decided per-variant inside `RecordData::write`.
    writer.write_name(&record.name, true)?;
    writer.write_u16(record.type_code())?;
    writer.write_u16(record.class as u16)?;
    writer.write_u32(record.ttl)?;

    let rdlength_offset = writer.reserve_u16()?;
    let rdata_start = writer.len();
    record.data.write(writer)?;
    let rdlength = writer.len() - rdata_start;
    writer.patch_u16(rdlength_offset, rdlength as u16);

    Ok(())
}

/// A message sent from a resolver to a server: `qr == Query` is enforced at
/// construction and checked again on read.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DnsQuery(pub DnsMessage);

impl DnsQuery {
    pub fn new(id: u16, rd: bool) -> DnsQuery {
        DnsQuery(DnsMessage {
            header: Header {
                id,
                qr: QR::Query,
                opcode: Opcode::Query,
                rd,
                ..Header::default()
            },
            ..DnsMessage::default()
        })
    }

    pub fn add_question(&mut self, name: DnsName, r#type: Type, class: Class) -> io::Result<()> {
        self.0.add_question(name, r#type, class)
    }

    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        self.0.write()
    }

    pub fn from_slice(buf: &[u8]) -> io::Result<DnsQuery> {
        let m = DnsMessage::read(buf)?;
        if m.header.qr != QR::Query {
            bail!(InvalidData, "expected a query message, got a reply");
        }
        Ok(DnsQuery(m))
    }
}

impl std::ops::Deref for DnsQuery {
    type Target = DnsMessage;
    fn deref(&self) -> &DnsMessage {
        &self.0
    }
}

impl std::ops::DerefMut for DnsQuery {
    fn deref_mut(&mut self) -> &mut DnsMessage {
        &mut self.0
    }
}

/// A message received back from a server: `qr == Response` is enforced on
/// read.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DnsReply(pub DnsMessage);

impl DnsReply {
    pub fn from_slice(buf: &[u8]) -> io::Result<DnsReply> {
        let m = DnsMessage::read(buf)?;
        if m.header.qr != QR::Response {
            bail!(InvalidData, "expected a reply message, got a query");
        }
        Ok(DnsReply(m))
    }

    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        self.0.write()
    }
}

impl std::ops::Deref for DnsReply {
    type Target = DnsMessage;
    fn deref(&self) -> &DnsMessage {
        &self.0
    }
}

impl std::ops::DerefMut for DnsReply {
    fn deref_mut(&mut self) -> &mut DnsMessage {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_round_trips() {
        let mut q = DnsQuery::new(0x1234, true);
        q.add_question(DnsName::parse("example.com.").unwrap(), Type::A, Class::Internet)
            .unwrap();

        let bytes = q.to_vec().unwrap();
        let back = DnsQuery::from_slice(&bytes).unwrap();
        assert_eq!(q, back);
    }

    #[test]
    fn rejects_duplicate_question() {
        let mut q = DnsQuery::new(1, true);
        q.add_question(DnsName::parse("example.com.").unwrap(), Type::A, Class::Internet)
            .unwrap();
        assert!(q
            .add_question(DnsName::parse("example.com.").unwrap(), Type::A, Class::Internet)
            .is_err());
    }

    #[test]
    fn reply_rejects_query_direction() {
        let mut q = DnsQuery::new(1, true);
        q.add_question(DnsName::parse("example.com.").unwrap(), Type::A, Class::Internet)
            .unwrap();
        let bytes = q.to_vec().unwrap();
        assert!(DnsReply::from_slice(&bytes).is_err());
    }

    #[test]
    fn section_counts_recomputed_on_write() {
        let mut m = DnsMessage::default();
        m.header.qr = QR::Query;
        m.add_question(DnsName::parse("a.com.").unwrap(), Type::A, Class::Internet)
            .unwrap();

        let bytes = m.write().unwrap();
        // QDCOUNT lives at offset 4..6.
        assert_eq!(&bytes[4..6], &[0, 1]);
    }
}
