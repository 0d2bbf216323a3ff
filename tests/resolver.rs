//! Resolver integration tests against a mock transport: end-to-end
//! `Resolve`/`GetHostEntry`/`GetMXInfo` behavior, the cache seam, and
//! the `Begin*`/`End*` async surface.

use dnsstub::{
    Class, DnsCache, DnsName, DnsQuery, DnsReply, Error, Exchanger, Header, MemoryCache, Opcode,
    Record, RecordData, Resolver, ResolverConfig, Type, QR,
};
use pretty_assertions::assert_eq;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Always answers with a fixed A record, counting how many times it was
/// asked so tests can assert on cache hits.
struct CountingTransport {
    reply_ip: &'static str,
    calls: AtomicUsize,
    last_server: Mutex<Option<SocketAddr>>,
}

impl Exchanger for CountingTransport {
    fn exchange(&self, query: &DnsQuery, server: SocketAddr) -> Result<DnsReply, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_server.lock().unwrap() = Some(server);

        let mut reply = DnsReply::default();
        reply.0.header = Header {
            id: query.header.id,
            qr: QR::Response,
            opcode: Opcode::Query,
            ..Header::default()
        };
        reply.0.questions = query.questions.clone();
        reply.0.answers.push(Record {
            name: query.questions[0].name.clone(),
            class: Class::Internet,
            ttl: 300,
            data: RecordData::A(self.reply_ip.parse().unwrap()),
        });
        Ok(reply)
    }
}

fn resolver(reply_ip: &'static str) -> Resolver<Arc<CountingTransport>> {
    let config = ResolverConfig {
        servers: vec!["127.0.0.1:5300".parse().unwrap()],
        discover_from_os: false,
        ..ResolverConfig::default()
    };
    Resolver::new(
        Arc::new(CountingTransport {
            reply_ip,
            calls: AtomicUsize::new(0),
            last_server: Mutex::new(None),
        }),
        config,
    )
}

impl Exchanger for Arc<CountingTransport> {
    fn exchange(&self, query: &DnsQuery, server: SocketAddr) -> Result<DnsReply, Error> {
        (**self).exchange(query, server)
    }
}

#[test]
fn resolve_reaches_the_transport_and_decodes_the_answer() {
    let r = resolver("203.0.113.10");
    let reply = r
        .resolve(
            &DnsName::parse("example.com.").unwrap(),
            Type::A,
            Class::Internet,
            None,
        )
        .unwrap();

    assert_eq!(reply.answers.len(), 1);
    match &reply.answers[0].data {
        RecordData::A(ip) => assert_eq!(*ip, "203.0.113.10".parse::<std::net::Ipv4Addr>().unwrap()),
        other => panic!("unexpected record: {:?}", other),
    }
}

#[test]
fn server_override_takes_precedence_over_configured_servers() {
    let transport = Arc::new(CountingTransport {
        reply_ip: "203.0.113.10",
        calls: AtomicUsize::new(0),
        last_server: Mutex::new(None),
    });
    let r = Resolver::new(transport.clone(), ResolverConfig::default());

    let override_addr: SocketAddr = "198.51.100.1:53".parse().unwrap();
    r.resolve(
        &DnsName::parse("example.com.").unwrap(),
        Type::A,
        Class::Internet,
        Some(override_addr),
    )
    .unwrap();

    assert_eq!(*transport.last_server.lock().unwrap(), Some(override_addr));
}

#[test]
fn memory_cache_avoids_a_second_transport_call() {
    let transport = Arc::new(CountingTransport {
        reply_ip: "203.0.113.10",
        calls: AtomicUsize::new(0),
        last_server: Mutex::new(None),
    });
    let config = ResolverConfig {
        servers: vec!["127.0.0.1:5300".parse().unwrap()],
        discover_from_os: false,
        ..ResolverConfig::default()
    };
    let cache: Arc<dyn DnsCache> = Arc::new(MemoryCache::default());
    let r = Resolver::new(transport.clone(), config).with_cache(cache);

    let name = DnsName::parse("cached.example.com.").unwrap();
    r.resolve(&name, Type::A, Class::Internet, None).unwrap();
    r.resolve(&name, Type::A, Class::Internet, None).unwrap();

    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn cache_enabled_config_installs_a_working_cache_without_with_cache() {
    let transport = Arc::new(CountingTransport {
        reply_ip: "203.0.113.10",
        calls: AtomicUsize::new(0),
        last_server: Mutex::new(None),
    });
    let config = ResolverConfig {
        servers: vec!["127.0.0.1:5300".parse().unwrap()],
        discover_from_os: false,
        cache_enabled: true,
        ..ResolverConfig::default()
    };
    let r = Resolver::new(transport.clone(), config);

    let name = DnsName::parse("cache-enabled.example.com.").unwrap();
    r.resolve(&name, Type::A, Class::Internet, None).unwrap();
    r.resolve(&name, Type::A, Class::Internet, None).unwrap();

    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn get_host_entry_by_name_collects_addresses() {
    let r = resolver("192.0.2.55");
    let entry = r
        .get_host_entry_by_name(&DnsName::parse("example.com.").unwrap(), None)
        .unwrap();

    assert_eq!(entry.addresses, vec![IpAddr::V4("192.0.2.55".parse().unwrap())]);
}

/// Fails for one configured server, answers for any other — used to check
/// that `resolve` keeps trying forwarders after a transport failure.
struct FlakyTransport {
    failing_server: SocketAddr,
    reply_ip: &'static str,
    attempts: AtomicUsize,
}

impl Exchanger for FlakyTransport {
    fn exchange(&self, query: &DnsQuery, server: SocketAddr) -> Result<DnsReply, Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if server == self.failing_server {
            return Err(Error::Transport("connection refused".into()));
        }

        let mut reply = DnsReply::default();
        reply.0.header = Header {
            id: query.header.id,
            qr: QR::Response,
            opcode: Opcode::Query,
            ..Header::default()
        };
        reply.0.questions = query.questions.clone();
        reply.0.answers.push(Record {
            name: query.questions[0].name.clone(),
            class: Class::Internet,
            ttl: 300,
            data: RecordData::A(self.reply_ip.parse().unwrap()),
        });
        Ok(reply)
    }
}

impl Exchanger for Arc<FlakyTransport> {
    fn exchange(&self, query: &DnsQuery, server: SocketAddr) -> Result<DnsReply, Error> {
        (**self).exchange(query, server)
    }
}

#[test]
fn resolve_tries_the_next_server_after_a_transport_failure() {
    let bad: SocketAddr = "127.0.0.1:5301".parse().unwrap();
    let good: SocketAddr = "127.0.0.1:5302".parse().unwrap();

    let transport = Arc::new(FlakyTransport {
        failing_server: bad,
        reply_ip: "203.0.113.20",
        attempts: AtomicUsize::new(0),
    });
    let config = ResolverConfig {
        servers: vec![bad, good],
        discover_from_os: false,
        ..ResolverConfig::default()
    };
    let r = Resolver::new(transport.clone(), config);

    let reply = r
        .resolve(
            &DnsName::parse("example.com.").unwrap(),
            Type::A,
            Class::Internet,
            None,
        )
        .unwrap();

    assert_eq!(reply.answers.len(), 1);
    assert_eq!(transport.attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn begin_resolve_completes_asynchronously() {
    let r = Arc::new(resolver("192.0.2.77"));
    let op = r.begin_resolve(
        DnsName::parse("example.com.").unwrap(),
        Type::A,
        Class::Internet,
        None,
    );

    let reply = op.end().unwrap();
    assert_eq!(reply.answers.len(), 1);

    // A second `end()` call must be rejected rather than block or
    // silently replay the cached result.
    assert!(op.end().is_err());
}
