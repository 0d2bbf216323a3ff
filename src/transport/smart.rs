//! Smart transport: AXFR routes straight to TCP; everything else tries UDP
//! first and falls back to TCP on transport failure or a truncated (TC)
//! reply.

use crate::errors::Error;
use crate::message::{DnsQuery, DnsReply};
use crate::transport::tcp::TcpTransport;
use crate::transport::udp::UdpTransport;
use crate::transport::Exchanger;
use crate::types::Type;
use log::warn;
use std::net::SocketAddr;

pub struct SmartTransport {
    udp: UdpTransport,
    tcp: TcpTransport,
}

impl Default for SmartTransport {
    fn default() -> Self {
        SmartTransport {
            udp: UdpTransport::default(),
            tcp: TcpTransport::default(),
        }
    }
}

impl SmartTransport {
    pub fn new(udp: UdpTransport, tcp: TcpTransport) -> SmartTransport {
        SmartTransport { udp, tcp }
    }

    fn wants_tcp(query: &DnsQuery) -> bool {
        matches!(query.questions.first(), Some(q) if q.r#type as u16 == Type::AXFR as u16)
    }
}

impl Exchanger for SmartTransport {
    fn exchange(&self, query: &DnsQuery, server: SocketAddr) -> Result<DnsReply, Error> {
        if Self::wants_tcp(query) {
            return self.tcp.exchange(query, server);
        }

        match self.udp.exchange(query, server) {
            Ok(reply) if reply.header.tc => {
                warn!("udp reply from {} was truncated, retrying over tcp", server);
                self.tcp.exchange(query, server)
            }
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!("udp exchange with {} failed ({}), falling back to tcp", server, e);
                self.tcp.exchange(query, server)
            }
        }
    }
}
