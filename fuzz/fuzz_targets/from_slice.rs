#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate dnsstub;

use dnsstub::{DnsQuery, DnsReply};

fuzz_target!(|data: &[u8]| {
    #[allow(unused_must_use)]
    {
        DnsQuery::from_slice(data);
        DnsReply::from_slice(data);
    }
});
