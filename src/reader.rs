//! Byte-level decoder: the single place that turns a `&[u8]` message buffer
//! into the primitive values (integers, names, addresses, character-strings)
//! the rest of the codec is built from.

use crate::bail;
use crate::name::{DnsName, NameKind};
use byteorder::{ByteOrder, BE};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Maximum number of compression-pointer indirections followed while
/// decoding a single name, per [rfc1035#section-4.1.4]. Chosen so that a
/// pointer chain can at most walk the entire 16K-offset space once.
///
/// [rfc1035#section-4.1.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
const MAX_POINTER_DEPTH: u32 = 30;

/// A cursor over an entire DNS message, used both for sequential reads
/// (header, question, record envelope) and for following compression
/// pointers, which jump to an earlier absolute offset in the same buffer.
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> WireReader<'a> {
        WireReader { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> io::Result<&'a [u8]> {
        match self.buf.get(self.pos..self.pos + n) {
            None => bail!(
                UnexpectedEof,
                "need {} bytes at offset {}, only {} remain",
                n,
                self.pos,
                self.remaining()
            ),
            Some(s) => {
                self.pos += n;
                Ok(s)
            }
        }
    }

    pub fn read_u8(&mut self) -> io::Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> io::Result<u16> {
        Ok(BE::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> io::Result<u32> {
        Ok(BE::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> io::Result<i32> {
        Ok(BE::read_i32(self.take(4)?))
    }

    pub fn read_i16(&mut self) -> io::Result<i16> {
        Ok(BE::read_i16(self.take(2)?))
    }

    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    pub fn read_ipv4(&mut self) -> io::Result<Ipv4Addr> {
        let b = self.take(4)?;
        Ok(Ipv4Addr::new(b[0], b[1], b[2], b[3]))
    }

    pub fn read_ipv6(&mut self) -> io::Result<Ipv6Addr> {
        let b = self.take(16)?;
        let mut octets = [0u8; 16];
        octets.copy_from_slice(b);
        Ok(Ipv6Addr::from(octets))
    }

    /// Reads a TTL per the data model: a `u32` seconds count on the wire,
    /// clamped to zero if the high bit is set.
    pub fn read_ttl(&mut self) -> io::Result<u32> {
        let ttl = self.read_u32()?;
        Ok(if ttl & 0x8000_0000 != 0 { 0 } else { ttl })
    }

    /// Reads a length-prefixed RFC 1035 character-string (`LEN:u8 | bytes[LEN]`).
    pub fn read_char_string(&mut self) -> io::Result<Vec<u8>> {
        let len = self.read_u8()? as usize;
        self.read_bytes(len)
    }

    /// Reads a domain name, following compression pointers as needed.
    ///
    /// Compression pointers jump to an earlier absolute offset in the
    /// message and are resolved by recursing into a private reader bound
    /// to that offset; the outer cursor only ever advances past the
    /// pointer pair itself (or past the literal labels plus terminator, in
    /// the uncompressed case).
    pub fn read_name(&mut self) -> io::Result<DnsName> {
        let mut labels = Vec::new();
        self.read_name_into(&mut labels, 0)?;
        DnsName::from_labels(labels, NameKind::Absolute).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("invalid name: {}", e))
        })
    }

    fn read_name_into(&mut self, labels: &mut Vec<String>, depth: u32) -> io::Result<()> {
        loop {
            let len = self.read_u8()?;

            match len & 0xC0 {
                0x00 => {
                    if len == 0 {
                        return Ok(());
                    }

                    let label = self.take(len as usize)?;
                    if !label.is_ascii() {
                        bail!(InvalidData, "label is not valid ascii");
                    }
                    labels.push(String::from_utf8_lossy(label).into_owned());
                }

                0xC0 => {
                    if depth >= MAX_POINTER_DEPTH {
                        bail!(
                            InvalidData,
                            "name has too many compression pointer indirections"
                        );
                    }

                    let lo = self.read_u8()? as u16;
                    let offset = (((len as u16) & 0x3F) << 8) | lo;

                    let mut target = WireReader {
                        buf: self.buf,
                        pos: offset as usize,
                    };
                    if target.pos >= target.buf.len() {
                        bail!(
                            UnexpectedEof,
                            "compression pointer to offset {} is out of range",
                            offset
                        );
                    }

                    target.read_name_into(labels, depth + 1)?;
                    return Ok(());
                }

                _ => bail!(InvalidData, "unsupported label type {:#04x}", len & 0xC0),
            }
        }
    }

    /// Returns a bounded sub-reader over `[start, end)` of the same
    /// underlying buffer, used so a record's RDATA reader can't read past
    /// its own RDLENGTH while still being able to follow compression
    /// pointers back into the rest of the message.
    pub fn bounded(&self, start: usize, end: usize) -> WireReader<'a> {
        WireReader {
            buf: self.buf,
            pos: start.min(self.buf.len()),
        }
        .with_limit(end)
    }

    fn with_limit(self, end: usize) -> WireReader<'a> {
        let end = end.min(self.buf.len());
        WireReader {
            buf: &self.buf[..end],
            pos: self.pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_integers() {
        let buf = [0x01, 0x02, 0x03, 0x04];
        let mut r = WireReader::new(&buf);
        assert_eq!(r.read_u16().unwrap(), 0x0102);
        assert_eq!(r.read_u16().unwrap(), 0x0304);
    }

    #[test]
    fn end_of_stream_on_truncation() {
        let buf = [0x01];
        let mut r = WireReader::new(&buf);
        assert!(r.read_u16().is_err());
    }

    #[test]
    fn reads_uncompressed_name() {
        let buf = [3, b'w', b'w', b'w', 0];
        let mut r = WireReader::new(&buf);
        let name = r.read_name().unwrap();
        assert_eq!(name.to_string(), "www.");
    }

    #[test]
    fn follows_compression_pointer() {
        // offset 0: "example.com." ; offset 13: pointer back to offset 0.
        let mut buf = vec![7];
        buf.extend_from_slice(b"example");
        buf.push(3);
        buf.extend_from_slice(b"com");
        buf.push(0);
        let ptr_offset = buf.len();
        buf.push(0xC0);
        buf.push(0x00);

        let mut r = WireReader::new(&buf);
        r.pos = ptr_offset;
        let name = r.read_name().unwrap();
        assert_eq!(name.to_string(), "example.com.");
    }

    #[test]
    fn rejects_self_referential_pointer() {
        let buf = [0xC0, 0x00];
        let mut r = WireReader::new(&buf);
        assert!(r.read_name().is_err());
    }

    #[test]
    fn rejects_pointer_chain_too_deep() {
        // Each two bytes is a pointer to the pair immediately before it,
        // forming a chain with no terminator; this must bail out via the
        // depth counter rather than looping forever.
        let mut buf = Vec::new();
        for i in 0..40u16 {
            let target = if i == 0 { 0 } else { (i - 1) * 2 };
            buf.push(0xC0 | ((target >> 8) as u8));
            buf.push((target & 0xFF) as u8);
        }

        let mut r = WireReader::new(&buf);
        r.pos = buf.len() - 2;
        assert!(r.read_name().is_err());
    }
}
