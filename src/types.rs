//! Core wire-level enums shared by the header, question, and record codecs.
//!
//! See [rfc1035] and the [IANA DNS Parameters] registry.
//!
//! [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
//! [IANA DNS Parameters]: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml

use strum_macros::{Display, EnumString};

/// Query or Response bit.
#[derive(Copy, Clone, Debug, EnumString, PartialEq, Eq, Hash)]
pub enum QR {
    Query = 0,
    Response = 1,
}

impl Default for QR {
    fn default() -> Self {
        QR::Query
    }
}

impl QR {
    pub fn from_bool(b: bool) -> QR {
        match b {
            false => QR::Query,
            true => QR::Response,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            QR::Query => false,
            QR::Response => true,
        }
    }
}

/// Specifies kind of query in this message. See [rfc1035] and [rfc6895].
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
#[repr(u8)] // Really only 4 bits on the wire.
pub enum Opcode {
    /// A standard query.
    Query = 0,

    /// Inverse Query (OBSOLETE). See [rfc3425].
    ///
    /// [rfc3425]: https://datatracker.ietf.org/doc/html/rfc3425
    IQuery = 1,
    Status = 2,

    /// See [rfc1996].
    ///
    /// [rfc1996]: https://datatracker.ietf.org/doc/html/rfc1996
    Notify = 4,

    /// See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    Update = 5,
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Query
    }
}

/// Response codes. See [rfc1035].
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
#[repr(u16)] // 4 bits in the header, but callers may want the wider numeric space.
pub enum Rcode {
    /// No error condition.
    NoError = 0,

    /// The name server was unable to interpret the query.
    FormErr = 1,

    /// The name server was unable to process this query due to a
    /// problem with the name server.
    ServFail = 2,

    /// The domain name referenced in the query does not exist.
    NXDomain = 3,

    /// The name server does not support the requested kind of query.
    NotImp = 4,

    /// The name server refuses to perform the specified operation.
    Refused = 5,
}

impl Default for Rcode {
    fn default() -> Self {
        Rcode::NoError
    }
}

/// Resource Record Type, for example, A, CNAME, or SOA.
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
#[repr(u16)]
pub enum Type {
    Reserved = 0,

    /// IPv4 address.
    A = 1,
    /// Authoritative name server.
    NS = 2,
    /// Canonical name for an alias.
    CNAME = 5,
    /// Start of a zone of authority.
    SOA = 6,
    /// Mailbox domain name.
    MB = 7,
    /// Mail group member.
    MG = 8,
    /// Mail rename domain name.
    MR = 9,
    /// A null resource record.
    NULL = 10,
    /// A well known service description.
    WKS = 11,
    /// Domain name pointer.
    PTR = 12,
    /// Host information.
    HINFO = 13,
    /// Mailbox or mail list information.
    MINFO = 14,
    /// Mail exchange.
    MX = 15,
    /// Text strings.
    TXT = 16,
    /// IPv6 address. See [rfc3596].
    ///
    /// [rfc3596]: https://datatracker.ietf.org/doc/html/rfc3596
    AAAA = 28,
    /// Server selection. See [rfc2782].
    ///
    /// [rfc2782]: https://datatracker.ietf.org/doc/html/rfc2782
    SRV = 33,
    /// A DNAME redirects an entire subtree. See [rfc6672].
    ///
    /// [rfc6672]: https://datatracker.ietf.org/doc/html/rfc6672
    DNAME = 39,
    /// Sender Policy Framework. See [rfc4408].
    ///
    /// [rfc4408]: https://datatracker.ietf.org/doc/html/rfc4408
    SPF = 99,
    /// Zone transfer. Only valid as a Question Type.
    AXFR = 252,
    /// Any record type. Only valid as a Question Type.
    ANY = 255,
}

impl Default for Type {
    fn default() -> Self {
        Type::ANY
    }
}

/// Resource Record Class, for example Internet.
#[derive(Copy, Clone, Debug, Display, EnumString, FromPrimitive, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Class {
    Reserved = 0,

    /// (Default) The Internet (IN). See [rfc1035].
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "IN")]
    Internet = 1,

    /// CSNET (CS), obsolete.
    #[strum(serialize = "CS")]
    CsNet = 2,

    /// Chaosnet (CH).
    #[strum(serialize = "CH")]
    Chaos = 3,

    /// Hesiod (HS).
    #[strum(serialize = "HS")]
    Hesiod = 4,

    /// No class specified. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    None = 254,

    /// `*` (ANY). See [rfc1035].
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    #[strum(serialize = "*")]
    Any = 255,
}

impl Default for Class {
    fn default() -> Self {
        Class::Internet
    }
}
