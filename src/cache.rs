//! The resolver's cache seam. The resolver only ever talks to the
//! [`DnsCache`] trait; whether that's backed by nothing, memory, or some
//! external store is the caller's choice.

use crate::message::{DnsQuery, DnsReply};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// A cache keyed by question, consulted before and populated after a
/// resolver exchange.
pub trait DnsCache: Send + Sync {
    /// Returns a cached reply for this query's question set, if present
    /// and not expired.
    fn get(&self, query: &DnsQuery) -> Option<DnsReply>;

    /// Stores `reply` as the cached answer for `query`'s question set.
    fn put(&self, query: &DnsQuery, reply: &DnsReply);
}

/// A cache that never hits and never stores. The default for a resolver
/// that doesn't want caching.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopCache;

impl DnsCache for NoopCache {
    fn get(&self, _query: &DnsQuery) -> Option<DnsReply> {
        None
    }

    fn put(&self, _query: &DnsQuery, _reply: &DnsReply) {}
}

struct Entry {
    reply: DnsReply,
    expires: Instant,
}

/// A simple in-memory cache, keyed by the query's question list, honoring
/// the minimum TTL across the reply's answer records.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<Vec<crate::message::Question>, Entry>>,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn min_ttl(reply: &DnsReply) -> Duration {
        reply
            .answers
            .iter()
            .map(|r| r.ttl)
            .min()
            .map(|secs| Duration::from_secs(secs as u64))
            .unwrap_or(Duration::from_secs(0))
    }
}

impl DnsCache for MemoryCache {
    fn get(&self, query: &DnsQuery) -> Option<DnsReply> {
        let entries = self.entries.lock();
        let entry = entries.get(&query.questions)?;
        if Instant::now() >= entry.expires {
            return None;
        }
        Some(entry.reply.clone())
    }

    fn put(&self, query: &DnsQuery, reply: &DnsReply) {
        let ttl = Self::min_ttl(reply);
        if ttl.is_zero() {
            return;
        }

        let mut entries = self.entries.lock();
        entries.insert(
            query.questions.clone(),
            Entry {
                reply: reply.clone(),
                expires: Instant::now() + ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::DnsName;
    use crate::types::{Class, Rcode, Type, QR};

    fn query() -> DnsQuery {
        let mut q = DnsQuery::new(1, true);
        q.add_question(DnsName::parse("example.com.").unwrap(), Type::A, Class::Internet)
            .unwrap();
        q
    }

    fn reply_with_ttl(ttl: u32) -> DnsReply {
        let mut m = crate::message::DnsMessage::default();
        m.header.qr = QR::Response;
        m.header.rcode = Rcode::NoError;
        m.answers.push(crate::record::Record {
            name: DnsName::parse("example.com.").unwrap(),
            class: Class::Internet,
            ttl,
            data: crate::record::RecordData::A("93.184.216.34".parse().unwrap()),
        });
        DnsReply(m)
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopCache;
        let q = query();
        cache.put(&q, &reply_with_ttl(300));
        assert!(cache.get(&q).is_none());
    }

    #[test]
    fn memory_cache_hits_until_expiry() {
        let cache = MemoryCache::new();
        let q = query();
        cache.put(&q, &reply_with_ttl(300));
        assert!(cache.get(&q).is_some());
    }

    #[test]
    fn memory_cache_does_not_store_zero_ttl() {
        let cache = MemoryCache::new();
        let q = query();
        cache.put(&q, &reply_with_ttl(0));
        assert!(cache.get(&q).is_none());
    }
}
