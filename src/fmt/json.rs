#[cfg(feature = "json")]
use chrono::Utc;
#[cfg(feature = "json")]
use serde::Serialize;

#[cfg(feature = "json")]
use crate::domain::probe::OutcomeKind;
use crate::domain::probe::ProbeReport;
use crate::error::RprobeError;
#[cfg(feature = "json")]
use crate::stats::ProbeSummary;

#[cfg(feature = "json")]
#[derive(Serialize)]
pub struct JsonAttempt {
    pub seq: u32,
    pub kind: OutcomeKind,
    pub rtt_ms: Option<f64>,
}

#[cfg(feature = "json")]
#[derive(Serialize)]
pub struct JsonReport {
    pub name: String,
    pub ip: String,
    pub port: Option<u16>,
    pub summary: ProbeSummary,
    pub attempts: Vec<JsonAttempt>,
}

#[cfg(feature = "json")]
#[derive(Serialize)]
pub struct JsonRun {
    pub schema_version: u8,
    pub run_ts: String,
    pub reports: Vec<JsonReport>,
}

#[cfg(feature = "json")]
fn report_to_json_report(report: &ProbeReport) -> JsonReport {
    JsonReport {
        name: report.target.name.clone(),
        ip: report.target.ip.to_string(),
        port: report.target.port,
        summary: report.summary.clone(),
        attempts: report
            .outcomes
            .iter()
            .map(|o| JsonAttempt {
                seq: o.seq,
                kind: o.kind,
                rtt_ms: o.rtt_ms(),
            })
            .collect(),
    }
}

/// Serialize probe reports into a JSON document.
#[allow(unused_variables)]
pub fn to_json(reports: &[ProbeReport], pretty: bool) -> Result<String, RprobeError> {
    #[cfg(feature = "json")]
    {
        let run = JsonRun {
            schema_version: 1,
            run_ts: Utc::now().to_rfc3339(),
            reports: reports.iter().map(report_to_json_report).collect(),
        };
        let text = if pretty {
            serde_json::to_string_pretty(&run).map_err(|e| RprobeError::Other(e.to_string()))?
        } else {
            serde_json::to_string(&run).map_err(|e| RprobeError::Other(e.to_string()))?
        };
        Ok(text)
    }
    #[cfg(not(feature = "json"))]
    {
        let _ = reports;
        let _ = pretty;
        Err(RprobeError::Other("json feature disabled".into()))
    }
}

/// One-line summary form for a single report.
#[allow(unused_variables)]
pub fn report_to_short_json(report: &ProbeReport) -> Result<String, RprobeError> {
    #[cfg(feature = "json")]
    {
        #[derive(Serialize)]
        struct Short<'a> {
            name: &'a str,
            ip: String,
            summary: &'a ProbeSummary,
        }
        let short = Short {
            name: &report.target.name,
            ip: report.target.ip.to_string(),
            summary: &report.summary,
        };
        serde_json::to_string(&short).map_err(|e| RprobeError::Other(e.to_string()))
    }
    #[cfg(not(feature = "json"))]
    {
        let _ = report;
        Err(RprobeError::Other("json feature disabled".into()))
    }
}
