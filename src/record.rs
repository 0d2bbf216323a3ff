//! Resource record data: the per-type RDATA payloads, and the builder
//! registry that decodes a record's RDATA once its TYPE and RDLENGTH are
//! known.
//!
//! Known types decode into a strongly-typed [`RecordData`] variant. A type
//! code the registry doesn't recognise — whether a code this crate simply
//! hasn't implemented yet, or one genuinely unassigned by IANA — falls
//! through to [`RecordData::Unknown`], which keeps the raw RDATA bytes so
//! the record can still be carried, displayed, and re-encoded unchanged.
//! This is what keeps decoding forward-compatible with new record types.

use crate::bail;
use crate::name::DnsName;
use crate::reader::WireReader;
use crate::types::{Class, Type};
use crate::writer::WireWriter;
use num_traits::FromPrimitive;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoaData {
    pub mname: DnsName,
    pub rname: DnsName,
    pub serial: u32,
    pub refresh: i32,
    pub retry: i32,
    pub expire: i32,
    pub minimum: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MxData {
    pub preference: i16,
    pub exchange: DnsName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SrvData {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: DnsName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HInfoData {
    pub cpu: Vec<u8>,
    pub os: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MInfoData {
    pub rmailbx: DnsName,
    pub emailbx: DnsName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WksData {
    pub address: Ipv4Addr,
    pub protocol: u8,
    pub bitmap: Vec<u8>,
}

/// The decoded RDATA of a resource record, one variant per record type this
/// crate natively understands, plus [`Unknown`](RecordData::Unknown) as the
/// default builder's fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    NS(DnsName),
    CNAME(DnsName),
    SOA(SoaData),
    MB(DnsName),
    MG(DnsName),
    MR(DnsName),
    NULL(Vec<u8>),
    WKS(WksData),
    PTR(DnsName),
    HINFO(HInfoData),
    MINFO(MInfoData),
    MX(MxData),
    TXT(Vec<u8>),
    SRV(SrvData),
    DNAME(DnsName),
    SPF(Vec<u8>),

    /// A record whose TYPE this crate has no builder for. `type_code` is
    /// the raw wire value; `rdata` is the untouched RDATA bytes.
    Unknown { type_code: u16, rdata: Vec<u8> },
}

impl RecordData {
    /// The wire TYPE code for this record's data, used both when writing
    /// and as the primary key of the record comparator.
    pub fn type_code(&self) -> u16 {
        match self {
            RecordData::A(_) => Type::A as u16,
            RecordData::AAAA(_) => Type::AAAA as u16,
            RecordData::NS(_) => Type::NS as u16,
            RecordData::CNAME(_) => Type::CNAME as u16,
            RecordData::SOA(_) => Type::SOA as u16,
            RecordData::MB(_) => Type::MB as u16,
            RecordData::MG(_) => Type::MG as u16,
            RecordData::MR(_) => Type::MR as u16,
            RecordData::NULL(_) => Type::NULL as u16,
            RecordData::WKS(_) => Type::WKS as u16,
            RecordData::PTR(_) => Type::PTR as u16,
            RecordData::HINFO(_) => Type::HINFO as u16,
            RecordData::MINFO(_) => Type::MINFO as u16,
            RecordData::MX(_) => Type::MX as u16,
            RecordData::TXT(_) => Type::TXT as u16,
            RecordData::SRV(_) => Type::SRV as u16,
            RecordData::DNAME(_) => Type::DNAME as u16,
            RecordData::SPF(_) => Type::SPF as u16,
            RecordData::Unknown { type_code, .. } => *type_code,
        }
    }

    /// The [`Type`] enum value for this record, when the type code maps
    /// onto a known variant.
    pub fn rtype(&self) -> Option<Type> {
        Type::from_u16(self.type_code())
    }

    /// The builder registry: decodes `rdlength` bytes of RDATA starting at
    /// `reader`'s current position, dispatching on the raw wire type code.
    ///
    /// `reader` must be the full-message reader (not a slice of just the
    /// RDATA) so that names inside RDATA can follow compression pointers
    /// back into earlier parts of the message.
    pub fn read(reader: &mut WireReader, type_code: u16, rdlength: u16) -> io::Result<RecordData> {
        let start = reader.position();
        let end = start + rdlength as usize;

        let data = match Type::from_u16(type_code) {
            Some(Type::A) => RecordData::A(reader.read_ipv4()?),
            Some(Type::AAAA) => RecordData::AAAA(reader.read_ipv6()?),
            Some(Type::NS) => RecordData::NS(reader.read_name()?),
            Some(Type::CNAME) => RecordData::CNAME(reader.read_name()?),
            Some(Type::PTR) => RecordData::PTR(reader.read_name()?),
            Some(Type::MB) => RecordData::MB(reader.read_name()?),
            Some(Type::MG) => RecordData::MG(reader.read_name()?),
            Some(Type::MR) => RecordData::MR(reader.read_name()?),
            Some(Type::DNAME) => RecordData::DNAME(reader.read_name()?),

            Some(Type::SOA) => RecordData::SOA(SoaData {
                mname: reader.read_name()?,
                rname: reader.read_name()?,
                serial: reader.read_u32()?,
                refresh: reader.read_i32()?,
                retry: reader.read_i32()?,
                expire: reader.read_i32()?,
                minimum: reader.read_i32()?,
            }),

            Some(Type::MX) => RecordData::MX(MxData {
                preference: reader.read_i16()?,
                exchange: reader.read_name()?,
            }),

            Some(Type::SRV) => RecordData::SRV(SrvData {
                priority: reader.read_u16()?,
                weight: reader.read_u16()?,
                port: reader.read_u16()?,
                target: reader.read_name()?,
            }),

            Some(Type::HINFO) => RecordData::HINFO(HInfoData {
                cpu: reader.read_char_string()?,
                os: reader.read_char_string()?,
            }),

            Some(Type::MINFO) => RecordData::MINFO(MInfoData {
                rmailbx: reader.read_name()?,
                emailbx: reader.read_name()?,
            }),

            Some(Type::WKS) => {
                let address = reader.read_ipv4()?;
                let protocol = reader.read_u8()?;
                let remaining = end.saturating_sub(reader.position());
                RecordData::WKS(WksData {
                    address,
                    protocol,
                    bitmap: reader.read_bytes(remaining)?,
                })
            }

            Some(Type::NULL) => RecordData::NULL(reader.read_bytes(rdlength as usize)?),

            Some(Type::TXT) => RecordData::TXT(reader.read_char_string()?),
            Some(Type::SPF) => RecordData::SPF(reader.read_char_string()?),

            // Known-but-unimplemented (e.g. RP, AFSDB, LOC) or genuinely
            // unassigned codes: the default builder keeps the opaque bytes.
            _ => RecordData::Unknown {
                type_code,
                rdata: reader.read_bytes(rdlength as usize)?,
            },
        };

        if reader.position() != end {
            bail!(
                InvalidData,
                "record of type {} claimed RDLENGTH {} but consumed {} bytes",
                type_code,
                rdlength,
                reader.position() - start
            );
        }

        Ok(data)
    }

    /// Encodes this record's RDATA, returning the byte offset of the
    /// RDLENGTH field so the caller can back-patch it once the length is
    /// known.
    pub fn write(&self, writer: &mut WireWriter) -> io::Result<()> {
        match self {
            RecordData::A(addr) => writer.write_ipv4(*addr),
            RecordData::AAAA(addr) => writer.write_ipv6(*addr),
            RecordData::NS(name)
            | RecordData::CNAME(name)
            | RecordData::PTR(name)
            | RecordData::MB(name)
            | RecordData::MG(name)
            | RecordData::MR(name) => writer.write_name(name, true),

            // SOA and DNAME must not be compressed against the rest of the
            // message: RFC 1035 only lists the record types above as
            // eligible, and SOA/DNAME names are frequently compared
            // byte-for-byte by resolvers that don't decompress RDATA.
            RecordData::DNAME(name) => writer.write_name(name, false),

            RecordData::SOA(soa) => {
                writer.write_name(&soa.mname, false)?;
                writer.write_name(&soa.rname, false)?;
                writer.write_u32(soa.serial)?;
                writer.write_i32(soa.refresh)?;
                writer.write_i32(soa.retry)?;
                writer.write_i32(soa.expire)?;
                writer.write_i32(soa.minimum)
            }

            RecordData::MX(mx) => {
                writer.write_i16(mx.preference)?;
                writer.write_name(&mx.exchange, true)
            }

            RecordData::SRV(srv) => {
                writer.write_u16(srv.priority)?;
                writer.write_u16(srv.weight)?;
                writer.write_u16(srv.port)?;
                writer.write_name(&srv.target, true)
            }

            RecordData::HINFO(h) => {
                writer.write_char_string(&h.cpu)?;
                writer.write_char_string(&h.os)
            }

            RecordData::MINFO(m) => {
                writer.write_name(&m.rmailbx, true)?;
                writer.write_name(&m.emailbx, true)
            }

            RecordData::WKS(wks) => {
                writer.write_ipv4(wks.address)?;
                writer.write_u8(wks.protocol)?;
                writer.write_bytes(&wks.bitmap)
            }

            RecordData::NULL(bytes) => writer.write_bytes(bytes),

            RecordData::TXT(s) | RecordData::SPF(s) => writer.write_char_string(s),

            RecordData::Unknown { rdata, .. } => writer.write_bytes(rdata),
        }
    }
}

/// A complete resource record: owner name, class, TTL, and data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub name: DnsName,
    pub class: Class,
    pub ttl: u32,
    pub data: RecordData,
}

impl Record {
    pub fn type_code(&self) -> u16 {
        self.data.type_code()
    }

    /// A sort key implementing the total record comparator: TYPE (by its
    /// name, e.g. `"A"` sorts before `"AAAA"`, not by its wire code), then
    /// owner name (canonical/lowercased), then class, then a byte-wise
    /// comparison of the encoded RDATA as the final tiebreaker so that any
    /// two distinct records, including two [`RecordData::Unknown`] of the
    /// same type, compare unequal rather than arbitrarily equal.
    pub fn sort_key(&self) -> io::Result<(String, String, u16, Vec<u8>)> {
        let mut w = WireWriter::new();
        self.data.write(&mut w)?;

        let type_name = self
            .data
            .rtype()
            .map(|t| t.to_string())
            .unwrap_or_else(|| self.type_code().to_string());

        Ok((
            type_name,
            self.name.to_string().to_ascii_lowercase(),
            self.class as u16,
            w.into_bytes(),
        ))
    }
}
