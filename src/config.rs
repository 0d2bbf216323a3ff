//! Construction-time options for transports and the resolver.
//!
//! These mirror the parameters an XML-shaped config file would supply to
//! the core in the full system; this crate only owns the plain options
//! struct, not the file format.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Options for the UDP transport. See the UDP transport's send loop for
/// how each field is used.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UdpConfig {
    pub send_timeout: Duration,
    pub receive_timeout: Duration,
    pub transmit_retries: u32,
}

impl Default for UdpConfig {
    fn default() -> Self {
        UdpConfig {
            send_timeout: Duration::from_millis(10_000),
            receive_timeout: Duration::from_millis(10_000),
            transmit_retries: 4,
        }
    }
}

/// Per-exchange buffer size for the UDP transport, per [rfc1035#section-4.2.1].
///
/// [rfc1035#section-4.2.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.2.1
pub const UDP_DATA_SIZE: usize = 512;

/// Options for the TCP transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TcpConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_incoming_message_size: usize,
}

impl Default for TcpConfig {
    fn default() -> Self {
        TcpConfig {
            connect_timeout: Duration::from_millis(5_000),
            read_timeout: Duration::from_millis(5_000),
            write_timeout: Duration::from_millis(5_000),
            max_incoming_message_size: 5 * 1024 * 1024,
        }
    }
}

/// Construction-time options for the stub [`crate::resolver::Resolver`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResolverConfig {
    /// The forwarders to query, tried in order. Extended with any
    /// OS-discovered resolvers at construction time when `discover_from_os`
    /// is set; explicitly listed servers are always tried first.
    pub servers: Vec<SocketAddr>,

    /// Whether to append resolvers found in the host's own configuration
    /// (`/etc/resolv.conf`) to `servers` at construction time.
    pub discover_from_os: bool,

    /// Appended to relative question names before querying.
    pub name_suffix: Option<crate::name::DnsName>,

    /// Whether `Resolver::new` should install a [`crate::cache::MemoryCache`]
    /// instead of the no-op default. Disabled by default; `Resolver::with_cache`
    /// remains the way to install a specific cache implementation.
    pub cache_enabled: bool,

    pub udp: UdpConfig,
    pub tcp: TcpConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            servers: Vec::new(),
            discover_from_os: true,
            name_suffix: None,
            cache_enabled: false,
            udp: UdpConfig::default(),
            tcp: TcpConfig::default(),
        }
    }
}

/// Best-effort `nameserver` discovery from `/etc/resolv.conf`. A missing
/// file, an unreadable file, or a platform without one just yields no
/// servers rather than an error; callers fold the result into whatever
/// servers were already configured.
pub fn os_nameservers() -> Vec<SocketAddr> {
    match std::fs::read_to_string("/etc/resolv.conf") {
        Ok(contents) => parse_resolv_conf(&contents),
        Err(_) => Vec::new(),
    }
}

fn parse_resolv_conf(contents: &str) -> Vec<SocketAddr> {
    contents
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("nameserver"))
        .filter_map(|rest| rest.split_whitespace().next())
        .filter_map(|addr| addr.parse::<IpAddr>().ok())
        .map(|ip| SocketAddr::new(ip, 53))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn udp_defaults_match_spec() {
        let udp = UdpConfig::default();
        assert_eq!(udp.send_timeout, Duration::from_millis(10_000));
        assert_eq!(udp.receive_timeout, Duration::from_millis(10_000));
        assert_eq!(udp.transmit_retries, 4);
    }

    #[test]
    fn resolver_config_defaults_discover_from_os_and_no_cache() {
        let config = ResolverConfig::default();
        assert!(config.servers.is_empty());
        assert!(config.discover_from_os);
        assert!(config.name_suffix.is_none());
        assert!(!config.cache_enabled);
    }

    #[test]
    fn parses_ipv4_and_ipv6_nameserver_lines() {
        let contents = "\
domain example.com
nameserver 192.0.2.1
nameserver 2001:db8::53
search example.com
";
        let servers = parse_resolv_conf(contents);
        assert_eq!(
            servers,
            vec![
                SocketAddr::new("192.0.2.1".parse().unwrap(), 53),
                SocketAddr::new("2001:db8::53".parse().unwrap(), 53),
            ]
        );
    }

    #[test]
    fn ignores_malformed_or_unrelated_lines() {
        let contents = "\
# a comment
nameserver not-an-ip
options rotate
";
        assert!(parse_resolv_conf(contents).is_empty());
    }
}
