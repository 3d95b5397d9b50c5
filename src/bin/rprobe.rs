use clap::{Parser, ValueEnum};
use console::{Term, set_colors_enabled, style};
use std::io::{self, IsTerminal};
use std::net::IpAddr;
use std::process;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use rprobe::{
    AddressFamily, ProbeConfig, ProbeMethod, ProbeTarget, RprobeError, fmt, parse_target,
    probe_many, run_probe_with,
};

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Simple,
    JsonShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Timed TCP connect to host:port
    Tcp,
    /// ICMP echo request (usually needs elevated privileges)
    #[cfg(feature = "icmp")]
    Icmp,
}

impl From<Method> for ProbeMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Tcp => ProbeMethod::Tcp,
            #[cfg(feature = "icmp")]
            Method::Icmp => ProbeMethod::Icmp,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Rusty Probe - TCP and ICMP Connectivity Probe Tool")]
struct Args {
    /// Target host, host:port or [v6]:port - Examples: [example.com:80, [2001:db8::1]:443, 192.0.2.7:22]
    #[arg(index = 1)]
    target: Option<String>,

    /// Probe multiple targets concurrently
    #[arg(short = 'C', long, num_args = 2.., conflicts_with = "target")]
    compare: Option<Vec<String>>,

    /// Target port (alternative to the host:port form)
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Number of attempts
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Probe until stopped with Ctrl-C
    #[arg(short = 't', long)]
    continuous: bool,

    /// Per-attempt timeout in milliseconds
    #[arg(short = 'w', long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Time to live for outgoing attempts
    #[arg(short = 'i', long, default_value_t = 128, value_parser = clap::value_parser!(u32).range(1..=255))]
    ttl: u32,

    /// Interval between attempts in seconds
    #[arg(long, default_value_t = 1.0)]
    interval: f64,

    /// Force IPv4 resolution
    #[arg(short = '4', long, conflicts_with = "ipv6")]
    ipv4: bool,

    /// Force IPv6 resolution
    #[arg(short = '6', long)]
    ipv6: bool,

    /// Custom DNS server address
    #[arg(short = 'd', long)]
    dns_server: Option<IpAddr>,

    /// Probe method
    #[arg(short = 'm', long, value_enum, default_value = "tcp")]
    method: Method,

    /// Output format: text or json
    #[arg(short = 'f', long, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Alias for JSON output
    #[arg(short = 'j', long)]
    json: bool,

    /// Alias for simple / short text output
    #[arg(short = 'S', long)]
    short: bool,

    /// Pretty-print JSON
    #[arg(short = 'P', long)]
    pretty: bool,

    /// Disable colored output
    #[arg(long = "no-color", alias = "nocolor")]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let mut args = Args::parse();

    // alias --json
    if args.json {
        args.format = OutputFormat::Json;
    }
    // alias --short
    if args.short {
        args.format = OutputFormat::Simple;
    }
    if args.short && args.json {
        args.format = OutputFormat::JsonShort;
    }
    // colors
    let want_color = (matches!(args.format, OutputFormat::Text)
        || matches!(args.format, OutputFormat::Simple))
        && io::stdout().is_terminal()
        && std::env::var_os("NO_COLOR").is_none()
        && !args.no_color;
    set_colors_enabled(want_color);

    let term = Term::stdout();

    if args.continuous && args.count.is_some() {
        term.write_line(
            &style("--continuous cannot be used with --count")
                .red()
                .to_string(),
        )
        .ok();
        process::exit(2);
    }
    if args.interval <= 0.0 {
        term.write_line(&style("--interval must be positive").red().to_string())
            .ok();
        process::exit(2);
    }

    // Ctrl-C cancels the running probe; partial results still summarize.
    let cancel = CancellationToken::new();
    let ctrlc = cancel.clone();
    tokio::spawn(async move {
        let _ = signal::ctrl_c().await;
        ctrlc.cancel();
    });

    let exit_code = match (&args.compare, &args.target) {
        (Some(list), _) => run_compare(list, &args, &term, cancel).await,
        (_, Some(input)) => run_single(input, &args, &term, cancel).await,
        _ => {
            term.write_line(
                &style("Error: Provide either a target, or --compare, -h to show help.")
                    .red()
                    .bold()
                    .to_string(),
            )
            .ok();
            2
        }
    };

    process::exit(exit_code);
}

fn build_config(args: &Args) -> ProbeConfig {
    ProbeConfig {
        count: if args.continuous {
            None
        } else {
            Some(args.count.unwrap_or(4))
        },
        timeout: Duration::from_millis(args.timeout),
        interval: Duration::from_secs_f64(args.interval),
        ttl: args.ttl,
    }
}

/// Turn one CLI target string into a [`ProbeTarget`], or an exit code.
fn build_target(input: &str, args: &Args, term: &Term) -> Result<ProbeTarget, i32> {
    let parsed = match parse_target(input) {
        Ok(parsed) => parsed,
        Err(e) => {
            term.write_line(&style(format!("Error: {e}")).red().to_string())
                .ok();
            return Err(2);
        }
    };

    let port = match (parsed.port, args.port) {
        (Some(_), Some(_)) => {
            term.write_line(
                &style("--port cannot be combined with a host:port target")
                    .red()
                    .to_string(),
            )
            .ok();
            return Err(2);
        }
        (from_target, from_flag) => from_target.or(from_flag),
    };

    let method: ProbeMethod = args.method.into();
    if method == ProbeMethod::Tcp && port.is_none() {
        term.write_line(
            &style("Error: tcp probing requires a port (host:port or --port)")
                .red()
                .to_string(),
        )
        .ok();
        return Err(2);
    }
    #[cfg(feature = "icmp")]
    if method == ProbeMethod::Icmp && port.is_some() {
        term.write_line(
            &style("port is ignored with the icmp method")
                .yellow()
                .to_string(),
        )
        .ok();
    }

    let family = if args.ipv4 {
        AddressFamily::V4
    } else if args.ipv6 || parsed.is_ipv6_literal {
        AddressFamily::V6
    } else {
        AddressFamily::Auto
    };

    let mut target = ProbeTarget::new(parsed.host, port);
    target.family = family;
    target.dns_server = args.dns_server;
    Ok(target)
}

async fn run_single(input: &str, args: &Args, term: &Term, cancel: CancellationToken) -> i32 {
    let target = match build_target(input, args, term) {
        Ok(target) => target,
        Err(code) => return code,
    };
    let config = build_config(args);
    let method: ProbeMethod = args.method.into();

    let streaming = matches!(args.format, OutputFormat::Text);
    let mut printed_header = false;
    let result = run_probe_with(&target, method, &config, cancel, |resolved, outcome| {
        if streaming {
            if !printed_header {
                term.write_line(&fmt::text::render_header(resolved)).ok();
                printed_header = true;
            }
            term.write_line(&fmt::text::render_attempt(resolved, outcome, config.ttl))
                .ok();
        }
    })
    .await;

    match result {
        Ok(report) => {
            match args.format {
                OutputFormat::Text => {
                    term.write_line(&fmt::text::render_summary(&report)).ok();
                }
                OutputFormat::Simple => {
                    term.write_line(&fmt::text::render_short_summary(&report))
                        .ok();
                }
                OutputFormat::Json => {
                    match fmt::json::to_json(std::slice::from_ref(&report), args.pretty) {
                        Ok(s) => println!("{s}"),
                        Err(e) => eprintln!("error serializing: {e}"),
                    }
                }
                OutputFormat::JsonShort => match fmt::json::report_to_short_json(&report) {
                    Ok(s) => println!("{s}"),
                    Err(e) => eprintln!("error serializing: {e}"),
                },
            }
            0
        }
        Err(e) => handle_error(term, e),
    }
}

async fn run_compare(list: &[String], args: &Args, term: &Term, cancel: CancellationToken) -> i32 {
    let mut targets = Vec::with_capacity(list.len());
    for input in list {
        match build_target(input, args, term) {
            Ok(target) => targets.push(target),
            Err(code) => return code,
        }
    }
    let config = build_config(args);
    let method: ProbeMethod = args.method.into();

    match probe_many(&targets, method, &config, cancel).await {
        Ok(reports) => {
            match args.format {
                OutputFormat::Text | OutputFormat::Simple => {
                    let resolved: Vec<_> = reports.iter().map(|r| r.target.clone()).collect();
                    term.write_line(&fmt::text::render_multi_header(&resolved))
                        .ok();
                    for report in &reports {
                        term.write_line(&fmt::text::render_short_summary(report))
                            .ok();
                    }
                }
                OutputFormat::Json => match fmt::json::to_json(&reports, args.pretty) {
                    Ok(s) => println!("{s}"),
                    Err(e) => eprintln!("error serializing: {e}"),
                },
                OutputFormat::JsonShort => {
                    for report in &reports {
                        match fmt::json::report_to_short_json(report) {
                            Ok(s) => println!("{s}"),
                            Err(e) => eprintln!("error serializing: {e}"),
                        }
                    }
                }
            }
            0
        }
        Err(e) => handle_error(term, e),
    }
}

fn handle_error(term: &Term, err: RprobeError) -> i32 {
    term.write_line(&style(format!("Error: {}", err)).red().to_string())
        .ok();
    match err {
        RprobeError::Dns(_) => 2,
        _ => 1,
    }
}
