//! dnsstub is a simple stub DNS resolver library: a wire codec, a typed
//! record/message model, and pluggable UDP/TCP/"smart" transports for
//! resolving names against a configured set of recursive servers.
//!
//! # Features
//! * Parsing and generating the following record types:
//!   * A, AAAA, CNAME, MX, NS, SOA, PTR, TXT, SRV, and more, with
//!     unrecognised types falling back to [`record::RecordData::Unknown`].
//! * Name compression on the wire, with a depth-limited pointer chaser
//!   on decode to reject pointer loops.
//! * UDP, TCP, and a "smart" transport that tries UDP first and falls
//!   back to TCP on truncation or transport failure.
//! * A stub resolver ([`resolver::Resolver`]) with both synchronous and
//!   [`async_op`]-backed asynchronous entry points, and an optional
//!   [`cache::DnsCache`] seam in front of the network.
//! * A `dig`-like [command line](../dig/index.html) for ad hoc queries.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dnsstub::{Resolver, Type};
//!
//! fn example() -> Result<(), dnsstub::Error> {
//!     let resolver = Resolver::default();
//!     let entry = resolver.get_host_entry_by_name("example.com")?;
//!     println!("{:?}", entry.addresses);
//!     Ok(())
//! }
//! ```
//!
//! ## Reference
//!
//! * [rfc1034]: DOMAIN NAMES - CONCEPTS AND FACILITIES
//! * [rfc1035]: DOMAIN NAMES - IMPLEMENTATION AND SPECIFICATION
//! * [rfc6895]: Domain Name System (DNS) IANA Considerations
//! * [IANA Domain Name System (DNS) Parameters](https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml)
//!
//! [rfc1034]: https://datatracker.ietf.org/doc/html/rfc1034
//! [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
//! [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895

pub mod async_op;
pub mod cache;
pub mod config;
mod display;
pub mod errors;
pub mod message;
pub mod name;
mod reader;
pub mod record;
pub mod resolver;
pub mod transport;
pub mod types;
pub mod util;
mod writer;

// Pull up the various types that should be on the front page of the docs.
#[doc(inline)]
pub use crate::types::*;

#[doc(inline)]
pub use crate::record::*;

pub use crate::cache::{DnsCache, MemoryCache, NoopCache};
pub use crate::config::{ResolverConfig, TcpConfig, UdpConfig};
pub use crate::errors::Error;
pub use crate::message::{DnsMessage, DnsQuery, DnsReply, Header, Question};
pub use crate::name::DnsName;
pub use crate::resolver::{IPHostEntry, MXInfo, Resolver};
pub use crate::transport::smart::SmartTransport;
pub use crate::transport::tcp::TcpTransport;
pub use crate::transport::udp::UdpTransport;
pub use crate::transport::Exchanger;
