//! The stub resolver: turns a question into a reply by picking a
//! forwarder, driving a transport, and applying the cache seam. Higher
//! level helpers (`GetHostEntry`, `GetMXInfo`, `GetNameServers`) compose
//! [`Resolver::resolve`].
//!
//! Grounded on the teacher's `clients/resolver.rs` `Resolver<E>` (generic
//! over an `Exchanger`, `new_with_client`), generalized with the cache
//! seam, name-suffix rewriting, and the `server_override` parameter this
//! crate uses in place of any racy global "current server" state.

use crate::async_op::AsyncOp;
use crate::cache::{DnsCache, MemoryCache, NoopCache};
use crate::config::ResolverConfig;
use crate::errors::Error;
use crate::message::DnsQuery;
use crate::message::DnsReply;
use crate::name::DnsName;
use crate::record::RecordData;
use crate::transport::smart::SmartTransport;
use crate::transport::Exchanger;
use crate::types::{Class, Rcode, Type};
use log::error;
use rand::Rng;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Addresses gathered for a hostname, per [`Resolver::get_host_entry_by_name`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IPHostEntry {
    pub hostname: DnsName,
    pub addresses: Vec<IpAddr>,
}

/// Mail exchanges for a domain, ordered by ascending preference, per
/// [`Resolver::get_mx_info`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MXInfo {
    pub domain: DnsName,
    pub exchanges: Vec<DnsName>,
}

/// A stub resolver: a configured forwarder list, an optional relative-name
/// suffix, a transport, and a cache.
pub struct Resolver<E: Exchanger = SmartTransport> {
    transport: E,
    config: ResolverConfig,
    cache: Arc<dyn DnsCache>,
}

impl Default for Resolver<SmartTransport> {
    fn default() -> Self {
        Resolver::new(SmartTransport::default(), ResolverConfig::default())
    }
}

impl<E: Exchanger> Resolver<E> {
    /// Builds a resolver from a transport and its configuration. When
    /// `config.discover_from_os` is set, OS-discovered resolvers are
    /// appended to `config.servers` here, after whatever was explicitly
    /// configured, so explicit servers are always tried first by
    /// [`Resolver::servers_to_try`]. When `config.cache_enabled` is set, a
    /// [`MemoryCache`] is installed instead of the no-op default;
    /// [`Resolver::with_cache`] remains the way to install a specific cache
    /// implementation regardless of this flag.
    pub fn new(transport: E, mut config: ResolverConfig) -> Resolver<E> {
        if config.discover_from_os {
            for server in crate::config::os_nameservers() {
                if !config.servers.contains(&server) {
                    config.servers.push(server);
                }
            }
        }

        let cache: Arc<dyn DnsCache> = if config.cache_enabled {
            Arc::new(MemoryCache::new())
        } else {
            Arc::new(NoopCache)
        };

        Resolver {
            transport,
            config,
            cache,
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn DnsCache>) -> Resolver<E> {
        self.cache = cache;
        self
    }

    /// The forwarders to try, in order: just `server_override` if given,
    /// otherwise every configured server.
    fn servers_to_try(&self, server_override: Option<SocketAddr>) -> Result<Vec<SocketAddr>, Error> {
        if let Some(server) = server_override {
            return Ok(vec![server]);
        }

        if self.config.servers.is_empty() {
            return Err(Error::Usage("no forwarders configured"));
        }

        Ok(self.config.servers.clone())
    }

    fn rewrite_name(&self, name: &DnsName) -> Result<DnsName, Error> {
        if name.is_relative() {
            if let Some(suffix) = &self.config.name_suffix {
                return Ok(name.concat(suffix)?);
            }
        }
        Ok(name.clone())
    }

    /// Resolves a single question: rewrites a relative name, checks the
    /// cache, then tries forwarders in order (or just `server_override` if
    /// given), issuing the query against each until one exchanges
    /// successfully, and caches a successful reply. A reply with a
    /// non-`NoError` RCODE is an authoritative answer to the question, not
    /// a transport failure, so it's returned (as an error) without trying
    /// any further forwarder.
    pub fn resolve(
        &self,
        name: &DnsName,
        qtype: Type,
        qclass: Class,
        server_override: Option<SocketAddr>,
    ) -> Result<DnsReply, Error> {
        let name = self.rewrite_name(name)?;

        let mut query = DnsQuery::new(rand::thread_rng().gen(), true);
        query.add_question(name, qtype, qclass)?;

        if let Some(cached) = self.cache.get(&query) {
            return Ok(cached);
        }

        let servers = self.servers_to_try(server_override)?;
        let mut last_err = None;

        for server in servers {
            let reply = match self.transport.exchange(&query, server) {
                Ok(reply) => reply,
                Err(e) => {
                    last_err = Some(e);
                    continue;
                }
            };

            if reply.header.rcode != Rcode::NoError {
                error!(
                    "resolve of {} {} against {} failed with rcode {}",
                    qtype, qclass, server, reply.header.rcode
                );
                return Err(Error::Resolution(reply.header.rcode));
            }

            self.cache.put(&query, &reply);
            return Ok(reply);
        }

        Err(last_err.unwrap_or(Error::NoEndPointsReplied))
    }

    fn addresses_in(reply: &DnsReply) -> Vec<IpAddr> {
        reply
            .answers
            .iter()
            .filter_map(|r| match &r.data {
                RecordData::A(ip) => Some(IpAddr::V4(*ip)),
                RecordData::AAAA(ip) => Some(IpAddr::V6(*ip)),
                _ => None,
            })
            .collect()
    }

    /// `A` first, falling back to `AAAA` only if the `A` query's answer
    /// section was empty.
    pub fn get_host_entry_by_name(
        &self,
        hostname: &DnsName,
        server_override: Option<SocketAddr>,
    ) -> Result<IPHostEntry, Error> {
        let reply = self.resolve(hostname, Type::A, Class::Internet, server_override)?;
        let mut addresses = Self::addresses_in(&reply);

        if addresses.is_empty() {
            let reply = self.resolve(hostname, Type::AAAA, Class::Internet, server_override)?;
            addresses = Self::addresses_in(&reply);
        }

        Ok(IPHostEntry {
            hostname: hostname.clone(),
            addresses,
        })
    }

    /// Reverse lookup: builds the `in-addr.arpa.`/`ip6.arpa.` name for
    /// `addr`, queries PTR, and returns the first answer's domain name.
    pub fn get_host_entry_by_addr(
        &self,
        addr: IpAddr,
        server_override: Option<SocketAddr>,
    ) -> Result<DnsName, Error> {
        let ptr_name = DnsName::from_ptr(addr);
        let reply = self.resolve(&ptr_name, Type::PTR, Class::Internet, server_override)?;

        reply
            .answers
            .iter()
            .find_map(|r| match &r.data {
                RecordData::PTR(name) => Some(name.clone()),
                _ => None,
            })
            .ok_or(Error::NotFound)
    }

    /// Queries MX and returns the exchanges sorted by ascending preference.
    pub fn get_mx_info(
        &self,
        domain: &DnsName,
        server_override: Option<SocketAddr>,
    ) -> Result<MXInfo, Error> {
        let reply = self.resolve(domain, Type::MX, Class::Internet, server_override)?;

        let mut exchanges: Vec<(i16, DnsName)> = reply
            .answers
            .iter()
            .filter_map(|r| match &r.data {
                RecordData::MX(mx) => Some((mx.preference, mx.exchange.clone())),
                _ => None,
            })
            .collect();
        exchanges.sort_by_key(|(preference, _)| *preference);

        Ok(MXInfo {
            domain: domain.clone(),
            exchanges: exchanges.into_iter().map(|(_, name)| name).collect(),
        })
    }

    /// Queries NS and returns the name servers in answer order.
    pub fn get_name_servers(
        &self,
        domain: &DnsName,
        server_override: Option<SocketAddr>,
    ) -> Result<Vec<DnsName>, Error> {
        let reply = self.resolve(domain, Type::NS, Class::Internet, server_override)?;

        Ok(reply
            .answers
            .iter()
            .filter_map(|r| match &r.data {
                RecordData::NS(name) => Some(name.clone()),
                _ => None,
            })
            .collect())
    }
}

impl<E: Exchanger + Send + Sync + 'static> Resolver<E> {
    fn spawn<T, F>(self: &Arc<Self>, f: F) -> AsyncOp<T>
    where
        T: Send + 'static,
        F: FnOnce(&Resolver<E>) -> Result<T, Error> + Send + 'static,
    {
        let resolver = self.clone();
        AsyncOp::begin(move || f(&resolver))
    }

    /// `Begin*` sibling of [`Resolver::resolve`]; call `.end()` on the
    /// returned [`AsyncOp`] for the matching `End*`.
    pub fn begin_resolve(
        self: &Arc<Self>,
        name: DnsName,
        qtype: Type,
        qclass: Class,
        server_override: Option<SocketAddr>,
    ) -> AsyncOp<DnsReply> {
        self.spawn(move |r| r.resolve(&name, qtype, qclass, server_override))
    }

    pub fn begin_get_host_entry_by_name(
        self: &Arc<Self>,
        hostname: DnsName,
        server_override: Option<SocketAddr>,
    ) -> AsyncOp<IPHostEntry> {
        self.spawn(move |r| r.get_host_entry_by_name(&hostname, server_override))
    }

    pub fn begin_get_host_entry_by_addr(
        self: &Arc<Self>,
        addr: IpAddr,
        server_override: Option<SocketAddr>,
    ) -> AsyncOp<DnsName> {
        self.spawn(move |r| r.get_host_entry_by_addr(addr, server_override))
    }

    pub fn begin_get_mx_info(
        self: &Arc<Self>,
        domain: DnsName,
        server_override: Option<SocketAddr>,
    ) -> AsyncOp<MXInfo> {
        self.spawn(move |r| r.get_mx_info(&domain, server_override))
    }

    pub fn begin_get_name_servers(
        self: &Arc<Self>,
        domain: DnsName,
        server_override: Option<SocketAddr>,
    ) -> AsyncOp<Vec<DnsName>> {
        self.spawn(move |r| r.get_name_servers(&domain, server_override))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Header;
    use crate::record::Record;
    use crate::types::QR;
    use std::sync::Mutex;

    /// A transport stub that always answers with the reply it was built
    /// with, capturing the last query it saw for assertions.
    struct MockTransport {
        reply: DnsReply,
        last_query: Mutex<Option<DnsQuery>>,
    }

    impl Exchanger for MockTransport {
        fn exchange(&self, query: &DnsQuery, _server: SocketAddr) -> Result<DnsReply, Error> {
            *self.last_query.lock().unwrap() = Some(query.clone());
            let mut reply = self.reply.clone();
            reply.0.header.id = query.header.id;
            reply.0.questions = query.questions.clone();
            Ok(reply)
        }
    }

    fn a_reply(name: &str, ip: &str) -> DnsReply {
        let mut m = crate::message::DnsMessage::default();
        m.header = Header {
            qr: QR::Response,
            rcode: Rcode::NoError,
            ..Header::default()
        };
        m.answers.push(Record {
            name: DnsName::parse(name).unwrap(),
            class: Class::Internet,
            ttl: 300,
            data: RecordData::A(ip.parse().unwrap()),
        });
        DnsReply(m)
    }

    fn resolver_with(reply: DnsReply) -> Resolver<MockTransport> {
        let transport = MockTransport {
            reply,
            last_query: Mutex::new(None),
        };
        let config = ResolverConfig {
            servers: vec!["127.0.0.1:53".parse().unwrap()],
            discover_from_os: false,
            ..ResolverConfig::default()
        };
        Resolver::new(transport, config)
    }

    #[test]
    fn resolve_returns_answer() {
        let resolver = resolver_with(a_reply("example.com.", "93.184.216.34"));
        let reply = resolver
            .resolve(
                &DnsName::parse("example.com.").unwrap(),
                Type::A,
                Class::Internet,
                None,
            )
            .unwrap();
        assert_eq!(reply.answers.len(), 1);
    }

    #[test]
    fn resolve_uses_server_override_without_configured_servers() {
        let transport = MockTransport {
            reply: a_reply("example.com.", "1.2.3.4"),
            last_query: Mutex::new(None),
        };
        let config = ResolverConfig {
            discover_from_os: false,
            ..ResolverConfig::default()
        };
        let resolver = Resolver::new(transport, config);

        let result = resolver.resolve(
            &DnsName::parse("example.com.").unwrap(),
            Type::A,
            Class::Internet,
            Some("9.9.9.9:53".parse().unwrap()),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn resolve_fails_with_no_servers_and_no_override() {
        let transport = MockTransport {
            reply: a_reply("example.com.", "1.2.3.4"),
            last_query: Mutex::new(None),
        };
        // `discover_from_os: false` keeps this deterministic regardless of
        // what the host's own `/etc/resolv.conf` happens to contain.
        let config = ResolverConfig {
            discover_from_os: false,
            ..ResolverConfig::default()
        };
        let resolver = Resolver::new(transport, config);

        let result = resolver.resolve(
            &DnsName::parse("example.com.").unwrap(),
            Type::A,
            Class::Internet,
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn get_host_entry_by_name_collects_addresses() {
        let resolver = resolver_with(a_reply("example.com.", "93.184.216.34"));
        let entry = resolver
            .get_host_entry_by_name(&DnsName::parse("example.com.").unwrap(), None)
            .unwrap();
        assert_eq!(entry.addresses, vec![IpAddr::V4("93.184.216.34".parse().unwrap())]);
    }

    #[test]
    fn relative_name_gets_suffix_applied() {
        let transport = MockTransport {
            reply: a_reply("www.example.com.", "1.1.1.1"),
            last_query: Mutex::new(None),
        };
        let config = ResolverConfig {
            servers: vec!["127.0.0.1:53".parse().unwrap()],
            name_suffix: Some(DnsName::parse("example.com.").unwrap()),
            ..ResolverConfig::default()
        };
        let resolver = Resolver::new(transport, config);

        resolver
            .resolve(&DnsName::parse("www").unwrap(), Type::A, Class::Internet, None)
            .unwrap();

        let seen = resolver.transport.last_query.lock().unwrap();
        let seen = seen.as_ref().unwrap();
        assert_eq!(seen.questions[0].name, DnsName::parse("www.example.com.").unwrap());
    }

    #[test]
    fn begin_resolve_completes_asynchronously() {
        let resolver = Arc::new(resolver_with(a_reply("example.com.", "93.184.216.34")));
        let op = resolver.begin_resolve(
            DnsName::parse("example.com.").unwrap(),
            Type::A,
            Class::Internet,
            None,
        );
        let reply = op.end().unwrap();
        assert_eq!(reply.answers.len(), 1);
    }
}
