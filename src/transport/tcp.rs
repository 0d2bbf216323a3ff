//! TCP transport: length-framed messages with a capped incoming size.
//!
//! Grounded on the teacher's `clients/tcp.rs` `TcpClient::exchange`
//! (connect, two-byte length prefix, `read_exact`), generalized with the
//! `IncomingMessageTooLarge`/`TransportReceivedEmptyMessage` caps and the
//! same id/question validation the UDP transport applies.

use crate::config::TcpConfig;
use crate::errors::Error;
use crate::message::{DnsQuery, DnsReply};
use crate::transport::{is_valid_reply, Exchanger};
use crate::util::StatsBuilder;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};

pub struct TcpTransport {
    config: TcpConfig,
}

impl Default for TcpTransport {
    fn default() -> Self {
        TcpTransport {
            config: TcpConfig::default(),
        }
    }
}

impl TcpTransport {
    pub fn new(config: TcpConfig) -> TcpTransport {
        TcpTransport { config }
    }
}

impl Exchanger for TcpTransport {
    fn exchange(&self, query: &DnsQuery, server: SocketAddr) -> Result<DnsReply, Error> {
        let mut stream = TcpStream::connect_timeout(&server, self.config.connect_timeout)
            .map_err(|e| Error::Transport(format!("connect: {}", e)))?;
        stream
            .set_nodelay(true)
            .map_err(|e| Error::Transport(e.to_string()))?;
        stream
            .set_read_timeout(Some(self.config.read_timeout))
            .map_err(|e| Error::Transport(e.to_string()))?;
        stream
            .set_write_timeout(Some(self.config.write_timeout))
            .map_err(|e| Error::Transport(e.to_string()))?;

        let req = query.to_vec()?;
        let stats = StatsBuilder::start(req.len());

        stream
            .write_all(&(req.len() as u16).to_be_bytes())
            .map_err(|e| Error::Transport(e.to_string()))?;
        stream
            .write_all(&req)
            .map_err(|e| Error::Transport(e.to_string()))?;

        let mut len_buf = [0u8; 2];
        stream
            .read_exact(&mut len_buf)
            .map_err(|e| Error::Transport(e.to_string()))?;
        let len = u16::from_be_bytes(len_buf);

        if len < 1 {
            return Err(Error::TransportReceivedEmptyMessage);
        }
        if len as usize > self.config.max_incoming_message_size {
            return Err(Error::IncomingMessageTooLarge {
                got: len as usize,
                max: self.config.max_incoming_message_size,
            });
        }

        let mut buf = vec![0u8; len as usize];
        stream
            .read_exact(&mut buf)
            .map_err(|e| Error::Transport(e.to_string()))?;

        let reply = DnsReply::from_slice(&buf)?;
        if !is_valid_reply(query, &reply) {
            return Err(Error::NoEndPointsReplied);
        }

        stats.end(server, buf.len());
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::DnsName;
    use crate::types::{Class, Type};
    use std::net::TcpListener;
    use std::thread;

    fn query() -> DnsQuery {
        let mut q = DnsQuery::new(1, true);
        q.add_question(DnsName::parse("example.com.").unwrap(), Type::A, Class::Internet)
            .unwrap();
        q
    }

    #[test]
    fn exchanges_over_a_framed_tcp_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let q = query();
        let reply_bytes = {
            let mut reply = q.clone();
            reply.header.qr = crate::types::QR::Response;
            reply.to_vec().unwrap()
        };

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut len_buf = [0u8; 2];
            stream.read_exact(&mut len_buf).unwrap();
            let len = u16::from_be_bytes(len_buf) as usize;
            let mut req = vec![0u8; len];
            stream.read_exact(&mut req).unwrap();

            stream.write_all(&(reply_bytes.len() as u16).to_be_bytes()).unwrap();
            stream.write_all(&reply_bytes).unwrap();
        });

        let transport = TcpTransport::default();
        let reply = transport.exchange(&q, addr).unwrap();
        assert_eq!(reply.header.id, q.header.id);

        server.join().unwrap();
    }

    #[test]
    fn rejects_incoming_message_over_configured_cap() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut len_buf = [0u8; 2];
            stream.read_exact(&mut len_buf).unwrap();
            let len = u16::from_be_bytes(len_buf) as usize;
            let mut req = vec![0u8; len];
            stream.read_exact(&mut req).unwrap();

            // Declare a reply far larger than the configured cap.
            stream.write_all(&20_000u16.to_be_bytes()).unwrap();
        });

        let mut config = TcpConfig::default();
        config.max_incoming_message_size = 10;
        let transport = TcpTransport::new(config);

        let result = transport.exchange(&query(), addr);
        assert!(matches!(result, Err(Error::IncomingMessageTooLarge { .. })));

        server.join().unwrap();
    }
}
