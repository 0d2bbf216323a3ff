// Interactive dig-style REPL driving dnsstub's Resolver.
//
// Reads lines from stdin. The first whitespace-separated token names a
// command; anything else is routed to the default query handler, which
// parses its arguments as `[@server] [qtype] [qclass] qname`.

use dnsstub::{Class, DnsName, DnsQuery, Resolver, Type};
use std::io::{self, BufRead, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::process;
use std::str::FromStr;

fn main() {
    let resolver = Resolver::default();
    let stdin = io::stdin();
    let mut had_error = false;

    loop {
        print!("dig> ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Io - {}", e);
                had_error = true;
                break;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let command = tokens.next().unwrap_or("");

        let result = match command {
            "exit" | "quit" => break,
            "help" => {
                print_help();
                Ok(())
            }
            _ => run_query(&resolver, line),
        };

        // A per-query failure is handled here (printed, REPL continues);
        // only a failure to read stdin itself is unhandled and exits non-zero.
        if let Err(e) = result {
            println!("{} - {}", error_kind(&e), e);
        }
    }

    process::exit(if had_error { 1 } else { 0 });
}

fn print_help() {
    println!("usage: [@server] [qtype] [qclass] qname");
    println!("commands: help, exit");
}

/// Parses `[@server] [qtype] [qclass] qname` and issues the query.
fn run_query(resolver: &Resolver, line: &str) -> Result<(), dnsstub::Error> {
    let mut server: Option<SocketAddr> = None;
    let mut qtype = Type::A;
    let mut qclass = Class::Internet;
    let mut name: Option<String> = None;

    for token in line.split_whitespace() {
        if let Some(host) = token.strip_prefix('@') {
            server = Some(resolve_server(host)?);
            continue;
        }

        if name.is_none() {
            if let Ok(t) = Type::from_str(token) {
                qtype = t;
                continue;
            }
            if let Ok(c) = Class::from_str(token) {
                qclass = c;
                continue;
            }
        }

        name = Some(token.to_string());
    }

    let name = match name {
        Some(n) => n,
        None => return Ok(()),
    };

    let qname = DnsName::parse(&name)?;

    let mut preview = DnsQuery::new(0, true);
    preview.add_question(qname.clone(), qtype, qclass)?;
    println!("query:");
    println!("{}", dnsstub::util::hexdump(&preview.to_vec()?));

    let reply = resolver.resolve(&qname, qtype, qclass, server)?;
    println!("response:");
    println!("{}", reply);

    Ok(())
}

fn resolve_server(host: &str) -> Result<SocketAddr, dnsstub::Error> {
    let with_port = if host.contains(':') {
        host.to_string()
    } else {
        format!("{}:53", host)
    };

    with_port
        .to_socket_addrs()
        .map_err(|e| dnsstub::Error::Transport(format!("failed to resolve server {}: {}", host, e)))?
        .next()
        .ok_or_else(|| dnsstub::Error::Transport(format!("no address found for server {}", host)))
}

fn error_kind(e: &dnsstub::Error) -> &'static str {
    match e {
        dnsstub::Error::Format(_) => "Format",
        dnsstub::Error::Transport(_) => "Transport",
        dnsstub::Error::NoEndPointsReplied => "Transport",
        dnsstub::Error::IncomingMessageTooLarge { .. } => "Transport",
        dnsstub::Error::TransportReceivedEmptyMessage => "Transport",
        dnsstub::Error::Resolution(_) => "Resolution",
        dnsstub::Error::Usage(_) => "Usage",
        dnsstub::Error::NotFound => "NotFound",
    }
}
