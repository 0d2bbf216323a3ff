//! Small support types shared across the transports and resolver: request
//! timing stats and a hex dump helper used by the `dig` collaborator.

use log::trace;
use std::net::SocketAddr;
use std::time::{Duration, Instant, SystemTime};

/// Per-exchange timing and size information, populated by a transport and
/// attached to the reply it returns.
#[derive(Clone, Debug, PartialEq)]
pub struct Stats {
    /// The time the query was sent to the server.
    pub start: SystemTime,

    /// The duration of the whole exchange, start to finish.
    pub duration: Duration,

    /// The server that serviced this query.
    pub server: SocketAddr,

    /// The size, in bytes, of the encoded query.
    pub request_size: usize,

    /// The size, in bytes, of the encoded reply.
    pub response_size: usize,
}

/// Builder used by transports to assemble a [`Stats`] around a single send
/// + receive pair, without needing to thread the start time through every
/// intermediate call.
pub(crate) struct StatsBuilder {
    start: SystemTime,
    timer: Instant,
    request_size: usize,
}

impl StatsBuilder {
    pub fn start(request_size: usize) -> StatsBuilder {
        StatsBuilder {
            start: SystemTime::now(),
            timer: Instant::now(),
            request_size,
        }
    }

    pub fn end(self, server: SocketAddr, response_size: usize) -> Stats {
        let stats = Stats {
            start: self.start,
            duration: self.timer.elapsed(),
            request_size: self.request_size,
            server,
            response_size,
        };

        trace!(
            "exchange with {} took {:?} ({} -> {} bytes)",
            stats.server,
            stats.duration,
            stats.request_size,
            stats.response_size
        );

        stats
    }
}

/// Pretty-prints a byte slice as a classic hex + ASCII dump, 16 bytes per
/// row, used by the interactive CLI's `--debug` style output.
pub fn hexdump(slice: &[u8]) -> String {
    const WIDTH: usize = 16;
    let mut out = String::new();

    for (row_index, row) in slice.chunks(WIDTH).enumerate() {
        let offset = row_index * WIDTH;

        let row_hex: String = row.iter().map(|b| format!("{:02x} ", b)).collect();
        let row_str: String = row
            .iter()
            .map(|b| if b.is_ascii_graphic() { *b as char } else { '.' })
            .collect();

        out.push_str(&format!("{:08x}: {:<48}{}\n", offset, row_hex, row_str));
    }

    out
}

/// Clamps `value` into `[low, high]`.
pub fn clamp<T: PartialOrd>(value: T, low: T, high: T) -> T {
    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hexdump_marks_non_printable() {
        let out = hexdump(&[0x41, 0x00, 0x42]);
        assert!(out.contains("41 00 42"));
        assert!(out.contains("A.B"));
    }

    #[test]
    fn clamp_bounds_value() {
        assert_eq!(clamp(10, 0, 5), 5);
        assert_eq!(clamp(-1, 0, 5), 0);
        assert_eq!(clamp(3, 0, 5), 3);
    }
}
