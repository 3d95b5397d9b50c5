use console::style;

use crate::domain::probe::{OutcomeKind, ProbeOutcome, ProbeReport, Target};

/// Header line printed before the first attempt.
pub fn render_header(target: &Target) -> String {
    if target.name == target.ip.to_string() {
        format!(
            "{} {} with 32 bytes of data:",
            style("Probing").bold(),
            style(target.endpoint()).green()
        )
    } else {
        format!(
            "{} {} [{}] with 32 bytes of data:",
            style("Probing").bold(),
            style(&target.name).green(),
            target.endpoint()
        )
    }
}

/// One line per attempt, classic ping style.
pub fn render_attempt(target: &Target, outcome: &ProbeOutcome, ttl: u32) -> String {
    match outcome.kind {
        OutcomeKind::Success => {
            let rtt = outcome.rtt_ms().unwrap_or_default();
            format!(
                "Reply from {}: seq={} time={} ttl={}",
                style(target.endpoint()).green(),
                outcome.seq,
                style(format!("{rtt:.0}ms")).yellow(),
                ttl
            )
        }
        OutcomeKind::Timeout => "Request timed out.".to_string(),
        OutcomeKind::ConnectionRefused => {
            format!(
                "Connection refused by {}.",
                style(target.endpoint()).red()
            )
        }
        OutcomeKind::Unreachable => {
            format!("Host {} unreachable.", style(target.ip).red())
        }
        OutcomeKind::Cancelled => "Interrupted.".to_string(),
    }
}

/// Final statistics block, rendered once per probe run.
pub fn render_summary(report: &ProbeReport) -> String {
    let s = &report.summary;
    let mut out = format!(
        "\n{} {}\n    {} sent = {}, received = {}, lost = {} ({:.1}% loss)",
        style(report.target.endpoint()).green().bold(),
        style("probe statistics:").bold(),
        style("Packets:").cyan().bold(),
        s.sent,
        s.received,
        s.lost,
        s.loss_pct,
    );

    match &s.latency {
        Some(l) => {
            out.push_str(&format!(
                "\n{}\n    min = {:.0}ms, max = {:.0}ms, avg = {:.0}ms",
                style("Round trip times:").cyan().bold(),
                l.min_ms,
                l.max_ms,
                l.avg_ms,
            ));
        }
        None => {
            out.push_str(&format!(
                "\n{}",
                style("All attempts failed, round trip times not computable.").yellow()
            ));
        }
    }

    out
}

/// Single line form, used by short output and multi-target runs.
pub fn render_short_summary(report: &ProbeReport) -> String {
    let ip_style = if report.target.ip.is_ipv6() {
        style(report.target.ip).cyan()
    } else {
        style(report.target.ip).blue()
    };
    let ip_version = if report.target.ip.is_ipv6() { "v6" } else { "v4" };
    let s = &report.summary;

    let mut out = format!(
        "{} [{} {}]: sent={} received={} loss={:.1}%",
        style(&report.target.name).green().bold(),
        ip_style,
        ip_version,
        s.sent,
        s.received,
        s.loss_pct,
    );
    if let Some(l) = &s.latency {
        out.push_str(&format!(" avg={}", style(format!("{:.1}ms", l.avg_ms)).yellow()));
    }
    out
}

/// Header for a multi-target run.
pub fn render_multi_header(targets: &[Target]) -> String {
    if targets.len() == 2 {
        format!(
            "{} {} and {}",
            style("Probing").bold(),
            style(&targets[0].name).green(),
            style(&targets[1].name).green()
        )
    } else {
        format!("{} {} targets", style("Probing").bold(), targets.len())
    }
}
