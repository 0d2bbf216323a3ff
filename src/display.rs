//! `dig`-style `Display` implementations for the message model.
//!
//! Grounded on the teacher's `src/display.rs` (`Message::fmt_header`,
//! `Stats`/`Question`/`Record`/`Resource` `Display` impls), updated for
//! the new message/record types.

use crate::message::{DnsMessage, DnsQuery, DnsReply, Question};
use crate::record::{Record, RecordData};
use std::fmt;

impl DnsMessage {
    fn fmt_header(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {opcode}, status: {rcode}, id: {id}",
            opcode = self.header.opcode,
            rcode = self.header.rcode,
            id = self.header.id,
        )?;

        let mut flags = String::new();
        if self.header.qr.to_bool() {
            flags.push_str(" qr");
        }
        if self.header.aa {
            flags.push_str(" aa");
        }
        if self.header.tc {
            flags.push_str(" tc");
        }
        if self.header.rd {
            flags.push_str(" rd");
        }
        if self.header.ra {
            flags.push_str(" ra");
        }
        if self.header.ad {
            flags.push_str(" ad");
        }
        if self.header.cd {
            flags.push_str(" cd");
        }

        writeln!(
            f,
            ";; flags:{flags}; QUERY: {qd}, ANSWER: {an}, AUTHORITY: {ns}, ADDITIONAL: {ar}",
            flags = flags,
            qd = self.questions.len(),
            an = self.answers.len(),
            ns = self.authorities.len(),
            ar = self.additionals.len(),
        )?;

        writeln!(f)
    }
}

impl fmt::Display for DnsMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_header(f)?;

        writeln!(f, ";; QUESTION SECTION:")?;
        for question in &self.questions {
            question.fmt(f)?;
        }
        writeln!(f)?;

        if !self.answers.is_empty() {
            writeln!(f, ";; ANSWER SECTION:")?;
            for record in &self.answers {
                record.fmt(f)?;
            }
            writeln!(f)?;
        }

        if !self.authorities.is_empty() {
            writeln!(f, ";; AUTHORITY SECTION:")?;
            for record in &self.authorities {
                record.fmt(f)?;
            }
            writeln!(f)?;
        }

        if !self.additionals.is_empty() {
            writeln!(f, ";; ADDITIONAL SECTION:")?;
            for record in &self.additionals {
                record.fmt(f)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for DnsQuery {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for DnsReply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";{name:<20} {class:4} {type:6}",
            name = self.name,
            class = self.class,
            r#type = self.r#type,
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let type_name = self
            .data
            .rtype()
            .map(|t| t.to_string())
            .unwrap_or_else(|| self.type_code().to_string());

        writeln!(
            f,
            "{name:<20} {ttl:>6} {class:4} {type:6} {data}",
            name = self.name,
            ttl = self.ttl,
            class = self.class,
            type = type_name,
            data = self.data,
        )
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(ip) => ip.fmt(f),
            RecordData::AAAA(ip) => ip.fmt(f),

            RecordData::NS(name)
            | RecordData::CNAME(name)
            | RecordData::PTR(name)
            | RecordData::MB(name)
            | RecordData::MG(name)
            | RecordData::MR(name)
            | RecordData::DNAME(name) => name.fmt(f),

            RecordData::SOA(soa) => write!(
                f,
                "{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}",
                mname = soa.mname,
                rname = soa.rname,
                serial = soa.serial,
                refresh = soa.refresh,
                retry = soa.retry,
                expire = soa.expire,
                minimum = soa.minimum,
            ),

            RecordData::MX(mx) => write!(f, "{} {}", mx.preference, mx.exchange),

            RecordData::SRV(srv) => write!(
                f,
                "{} {} {} {}",
                srv.priority, srv.weight, srv.port, srv.target
            ),

            RecordData::HINFO(h) => write!(f, "{} {}", char_string(&h.cpu), char_string(&h.os)),
            RecordData::MINFO(m) => write!(f, "{} {}", m.rmailbx, m.emailbx),

            RecordData::TXT(s) | RecordData::SPF(s) => write!(f, "{}", char_string(s)),

            RecordData::WKS(wks) => write!(f, "{} {}", wks.address, wks.protocol),
            RecordData::NULL(bytes) => write!(f, "\\# {}", bytes.len()),

            RecordData::Unknown { type_code, rdata } => {
                write!(f, "TYPE{} \\# {}", type_code, rdata.len())
            }
        }
    }
}

fn char_string(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => format!("\"{}\"", s),
        Err(_) => format!("\\# {}", bytes.len()),
    }
}
