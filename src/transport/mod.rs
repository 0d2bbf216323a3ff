//! Transports: the pluggable boundary between an encoded [`DnsQuery`] and
//! the socket I/O that turns it into a [`DnsReply`].

pub mod smart;
pub mod tcp;
pub mod udp;

use crate::errors::Error;
use crate::message::{DnsQuery, DnsReply};
use std::net::SocketAddr;

/// Anything that can send a query to a server and return its reply. The
/// resolver is generic over this so tests can substitute a mock transport.
pub trait Exchanger: Send + Sync {
    fn exchange(&self, query: &DnsQuery, server: SocketAddr) -> Result<DnsReply, Error>;
}

/// Validates a candidate reply against the query it's meant to answer:
/// matching transaction id and an elementwise-identical question list.
/// Shared by the UDP and TCP transports as their spoof guard.
pub(crate) fn is_valid_reply(query: &DnsQuery, reply: &DnsReply) -> bool {
    reply.header.id == query.header.id && reply.questions == query.questions
}
