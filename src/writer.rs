//! Byte-level encoder: the write-side counterpart of [`crate::reader`].
//!
//! A single [`WireWriter`] is used for an entire message so that name
//! compression can point backwards across section boundaries (e.g. an
//! answer's owner name pointing into the question section).

use crate::bail;
use crate::name::DnsName;
use byteorder::{ByteOrder, BE};
use std::collections::HashMap;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Names may only be pointed at from an offset that fits in the 14-bit
/// pointer field, per [rfc1035#section-4.1.4].
///
/// [rfc1035#section-4.1.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
const MAX_COMPRESSIBLE_OFFSET: usize = 0x3FFF;

pub struct WireWriter {
    buf: Vec<u8>,

    /// Maps a canonical (lowercased, dotted) label suffix to the offset at
    /// which it was first written, so a later name sharing that suffix can
    /// be compressed into a pointer.
    suffixes: HashMap<String, u16>,
}

impl WireWriter {
    pub fn new() -> WireWriter {
        WireWriter {
            buf: Vec::new(),
            suffixes: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn write_u8(&mut self, v: u8) -> io::Result<()> {
        self.buf.push(v);
        Ok(())
    }

    pub fn write_u16(&mut self, v: u16) -> io::Result<()> {
        let mut b = [0u8; 2];
        BE::write_u16(&mut b, v);
        self.buf.extend_from_slice(&b);
        Ok(())
    }

    pub fn write_u32(&mut self, v: u32) -> io::Result<()> {
        let mut b = [0u8; 4];
        BE::write_u32(&mut b, v);
        self.buf.extend_from_slice(&b);
        Ok(())
    }

    pub fn write_i32(&mut self, v: i32) -> io::Result<()> {
        let mut b = [0u8; 4];
        BE::write_i32(&mut b, v);
        self.buf.extend_from_slice(&b);
        Ok(())
    }

    pub fn write_i16(&mut self, v: i16) -> io::Result<()> {
        let mut b = [0u8; 2];
        BE::write_i16(&mut b, v);
        self.buf.extend_from_slice(&b);
        Ok(())
    }

    pub fn write_bytes(&mut self, b: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(b);
        Ok(())
    }

    pub fn write_ipv4(&mut self, addr: Ipv4Addr) -> io::Result<()> {
        self.write_bytes(&addr.octets())
    }

    pub fn write_ipv6(&mut self, addr: Ipv6Addr) -> io::Result<()> {
        self.write_bytes(&addr.octets())
    }

    /// Writes a length-prefixed RFC 1035 character-string.
    pub fn write_char_string(&mut self, s: &[u8]) -> io::Result<()> {
        if s.len() > 255 {
            bail!(
                InvalidInput,
                "character-string of {} bytes exceeds the 255 byte limit",
                s.len()
            );
        }
        self.write_u8(s.len() as u8)?;
        self.write_bytes(s)
    }

    /// Reserves two bytes for a field to be filled in later (e.g.
    /// RDLENGTH), returning the offset to pass to [`patch_u16`](Self::patch_u16).
    pub fn reserve_u16(&mut self) -> io::Result<usize> {
        let offset = self.buf.len();
        self.write_u16(0)?;
        Ok(offset)
    }

    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        BE::write_u16(&mut self.buf[offset..offset + 2], value);
    }

    /// Writes a domain name, compressing against any previously written
    /// name sharing a suffix when `compress` is true.
    ///
    /// RFC 1035 only permits compression for most record types; SOA and
    /// DNAME RDATA names are written with `compress = false`.
    pub fn write_name(&mut self, name: &DnsName, compress: bool) -> io::Result<()> {
        let labels = name.labels();

        for i in 0..labels.len() {
            let suffix_key = labels[i..]
                .iter()
                .map(|l| l.to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join(".");

            if compress {
                if let Some(&offset) = self.suffixes.get(&suffix_key) {
                    self.write_u16(0xC000 | offset)?;
                    return Ok(());
                }
            }

            if compress && suffix_key.len() >= 3 && self.buf.len() <= MAX_COMPRESSIBLE_OFFSET {
                self.suffixes.insert(suffix_key, self.buf.len() as u16);
            }

            let label = &labels[i];
            self.write_u8(label.len() as u8)?;
            self.write_bytes(label.as_bytes())?;
        }

        self.write_u8(0)
    }
}

impl Default for WireWriter {
    fn default() -> Self {
        WireWriter::new()
    }
}
