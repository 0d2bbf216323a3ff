//! DNS names: parsing, validation, and the absolute/relative comparisons
//! the rest of the crate builds on.

use crate::bail;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io;
use std::net::IpAddr;
use std::str::FromStr;

/// Whether a [`DnsName`] is rooted at the DNS root (ends in a `.`) or is a
/// fragment meant to be [`concat`](DnsName::concat)-ed onto a suffix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NameKind {
    Absolute,
    Relative,
}

/// An immutable, validated DNS name: an ordered sequence of ASCII labels
/// plus whether the name is absolute (rooted) or relative.
///
/// Equality, ordering, and hashing all operate on the name's absolute,
/// ASCII-lowercased form, so `EXAMPLE.com.` and `example.com` (relative)
/// and `example.com.` (absolute) all compare equal.
#[derive(Clone, Debug)]
pub struct DnsName {
    labels: Vec<String>,
    kind: NameKind,
}

impl DnsName {
    const MAX_ENCODED_LEN: usize = 255;
    const MAX_LABELS: usize = 128;
    const MAX_LABEL_LEN: usize = 63;

    /// The DNS root, `.`.
    pub fn root() -> DnsName {
        DnsName {
            labels: Vec::new(),
            kind: NameKind::Absolute,
        }
    }

    /// Builds a name directly from already-validated labels. Used by the
    /// wire reader, which has already checked label lengths as it read them.
    pub(crate) fn from_labels(labels: Vec<String>, kind: NameKind) -> io::Result<DnsName> {
        let name = DnsName { labels, kind };
        name.check_invariants()?;
        Ok(name)
    }

    fn check_invariants(&self) -> io::Result<()> {
        if self.labels.len() > Self::MAX_LABELS {
            bail!(
                InvalidData,
                "name has {} labels, more than the {} allowed",
                self.labels.len(),
                Self::MAX_LABELS
            );
        }

        let encoded_len: usize = self.labels.iter().map(|l| l.len() + 1).sum::<usize>() + 1;
        if encoded_len > Self::MAX_ENCODED_LEN {
            bail!(
                InvalidData,
                "name is {} bytes encoded, more than the {} allowed",
                encoded_len,
                Self::MAX_ENCODED_LEN
            );
        }

        Ok(())
    }

    fn valid_label(label: &str) -> io::Result<()> {
        if label.is_empty() {
            bail!(InvalidData, "empty labels are not valid");
        }
        if label.len() > Self::MAX_LABEL_LEN {
            bail!(
                InvalidData,
                "label '{}' is longer than {} characters",
                label,
                Self::MAX_LABEL_LEN
            );
        }

        // Leading `_` is allowed (SRV-style names like `_ldap._tcp`), but
        // only as the very first character.
        let rest = if let Some(stripped) = label.strip_prefix('_') {
            stripped
        } else {
            label
        };

        if rest.is_empty() {
            bail!(InvalidData, "label '{}' is not valid", label);
        }

        if !rest
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        {
            bail!(InvalidData, "label '{}' contains invalid characters", label);
        }

        if rest.starts_with('-') || rest.ends_with('-') {
            bail!(
                InvalidData,
                "label '{}' may not start or end with '-'",
                label
            );
        }

        Ok(())
    }

    /// Parses a domain name of the form `www.example.com` (relative) or
    /// `www.example.com.` (absolute, trailing dot).
    pub fn parse(s: &str) -> io::Result<DnsName> {
        if s.is_empty() || s == "." {
            return Ok(DnsName::root());
        }

        let kind = if s.ends_with('.') {
            NameKind::Absolute
        } else {
            NameKind::Relative
        };

        let labels: io::Result<Vec<String>> = s
            .split_terminator('.')
            .map(|label| {
                Self::valid_label(label)?;
                Ok(label.to_string())
            })
            .collect();
        let labels = labels?;

        DnsName::from_labels(labels, kind)
    }

    /// Like [`parse`](DnsName::parse), but returns `None` instead of an
    /// error on invalid input.
    pub fn try_parse(s: &str) -> Option<DnsName> {
        DnsName::parse(s).ok()
    }

    pub fn is_absolute(&self) -> bool {
        self.kind == NameKind::Absolute
    }

    pub fn is_relative(&self) -> bool {
        self.kind == NameKind::Relative
    }

    pub fn kind(&self) -> NameKind {
        self.kind
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Appends `suffix`'s labels onto this name. Only valid when this name
    /// is relative; the result takes `suffix`'s absolute/relative kind.
    pub fn concat(&self, suffix: &DnsName) -> io::Result<DnsName> {
        if self.is_absolute() {
            bail!(
                InvalidInput,
                "cannot concat a suffix onto the absolute name '{}'",
                self
            );
        }

        let mut labels = self.labels.clone();
        labels.extend(suffix.labels.iter().cloned());

        DnsName::from_labels(labels, suffix.kind)
    }

    /// True iff `self` is a (strict) parent domain of `other`: `other`'s
    /// labels end with `self`'s labels, and `self` is shorter.
    pub fn is_parent_of(&self, other: &DnsName) -> bool {
        if self.labels.len() >= other.labels.len() {
            return false;
        }

        self.labels
            .iter()
            .rev()
            .zip(other.labels.iter().rev())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Strips `parent`'s labels from the end of `self`, returning the
    /// remaining relative name. Fails if `parent` is not actually a parent
    /// of `self`.
    pub fn make_relative(&self, parent: &DnsName) -> io::Result<DnsName> {
        if !parent.is_parent_of(self) {
            bail!(
                InvalidInput,
                "'{}' is not a subdomain of '{}'",
                self,
                parent
            );
        }

        let keep = self.labels.len() - parent.labels.len();
        DnsName::from_labels(self.labels[..keep].to_vec(), NameKind::Relative)
    }

    /// Builds the reverse-lookup name for an address, per [rfc1035#section-3.5]
    /// (IPv4, `in-addr.arpa.`) and [rfc3596#section-2.5] (IPv6, `ip6.arpa.`).
    ///
    /// [rfc1035#section-3.5]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.5
    /// [rfc3596#section-2.5]: https://datatracker.ietf.org/doc/html/rfc3596#section-2.5
    pub fn from_ptr(addr: IpAddr) -> DnsName {
        let labels = match addr {
            IpAddr::V4(v4) => {
                let octets = v4.octets();
                let mut labels: Vec<String> =
                    octets.iter().rev().map(|o| o.to_string()).collect();
                labels.push("in-addr".to_string());
                labels.push("arpa".to_string());
                labels
            }
            IpAddr::V6(v6) => {
                let mut labels: Vec<String> = Vec::with_capacity(34);
                for byte in v6.octets().iter().rev() {
                    labels.push(format!("{:x}", byte & 0x0f));
                    labels.push(format!("{:x}", byte >> 4));
                }
                labels.push("ip6".to_string());
                labels.push("arpa".to_string());
                labels
            }
        };

        DnsName {
            labels,
            kind: NameKind::Absolute,
        }
    }

    /// The absolute, ASCII-lowercased form used for equality/hashing.
    fn canonical_key(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.to_ascii_lowercase()).collect()
    }
}

impl FromStr for DnsName {
    type Err = io::Error;

    fn from_str(s: &str) -> io::Result<Self> {
        DnsName::parse(s)
    }
}

impl fmt::Display for DnsName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.labels.is_empty() {
            return write!(f, ".");
        }

        for label in &self.labels {
            write!(f, "{}.", label)?;
        }

        Ok(())
    }
}

/// Equality ignores absolute vs. relative and is ASCII case-insensitive,
/// per the canonicalization rule in the data model.
impl PartialEq for DnsName {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_key() == other.canonical_key()
    }
}

impl Eq for DnsName {}

impl Hash for DnsName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.canonical_key() {
            label.hash(state);
        }
    }
}
