use super::{parse_identifiers, Session};
use crate::cli::GraphArgs;
use crate::output::OutputWriter;
use crate::output_types::GraphOutput;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

pub fn execute(args: &GraphArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let adapter = session.adapter(&args.layer)?;
    let identifiers = parse_identifiers(&args.ids);
    let start = parse_date(&args.start).context("Invalid --start")?;
    let end = parse_date(&args.end).context("Invalid --end")?;
    if end < start {
        anyhow::bail!("--end must not be before --start");
    }

    let graph = adapter.graph(&identifiers, start, end, args.width, args.height, Utc::now());
    let bytes = graph.png()?;
    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;

    let result = GraphOutput {
        path: args.out.clone(),
        title: graph.title().map(str::to_string),
        series: graph.series_count(),
        bytes: bytes.len(),
    };
    if output.is_json() {
        return output.result(result);
    }
    output.success(format!(
        "Wrote {} ({})",
        result.path.display(),
        result.title.as_deref().unwrap_or("untitled")
    ));
    Ok(())
}

/// RFC 3339 timestamp or a plain date at midnight UTC
fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("'{}' is neither RFC 3339 nor YYYY-MM-DD", value))?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}
