//! Error taxonomy for the wire codec, transports, and resolver.

use crate::types::Rcode;
use std::io;

/// Shortcut for returning an `io::Error` of a given `ErrorKind`, used
/// throughout the wire reader/writer where a framing problem is always
/// just an `io::Error` in disguise.
#[macro_export]
macro_rules! bail {
    ($kind:ident, $($arg:tt)*) => {
        // Construct the I/O error.
        return Err(
            ::std::io::Error::new(::std::io::ErrorKind::$kind, format!($($arg)*))
        )
    };
}

/// Top level error type returned by everything above the wire layer
/// (name parsing, transports, and the resolver).
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The message failed to parse, or a name failed validation.
    #[error("format error: {0}")]
    Format(#[from] io::Error),

    /// A transport-level failure: a socket error, or the peer sent
    /// something outside the transport's framing rules.
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport exhausted its retries without a usable reply.
    #[error("no endpoints replied")]
    NoEndPointsReplied,

    /// The incoming TCP message declared a length larger than the
    /// configured `max_incoming_message_size`.
    #[error("incoming message of {got} bytes exceeds the {max} byte limit")]
    IncomingMessageTooLarge { got: usize, max: usize },

    /// The TCP peer declared a zero-length reply.
    #[error("transport received an empty message")]
    TransportReceivedEmptyMessage,

    /// The upstream server responded with a non-`NoError` RCODE.
    #[error("resolution failed with rcode {0}")]
    Resolution(Rcode),

    /// A caller-side usage error (bad argument, duplicate question, or
    /// an async result whose `End*` was called more than once).
    #[error("usage error: {0}")]
    Usage(&'static str),

    /// The reply decoded and validated fine, but contained none of the
    /// record type the caller asked for (e.g. no PTR in a reverse lookup).
    #[error("no matching record found in reply")]
    NotFound,
}

impl From<Error> for io::Error {
    fn from(e: Error) -> io::Error {
        match e {
            Error::Format(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}
