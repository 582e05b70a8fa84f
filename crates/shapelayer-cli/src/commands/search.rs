use super::Session;
use crate::cli::SearchArgs;
use crate::output::OutputWriter;
use crate::output_types::SearchRow;
use anyhow::Result;
use shapelayer_core::models::format_number;

pub fn execute(args: &SearchArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let adapter = session.adapter(&args.layer)?;
    let results = adapter.search(args.x, args.y, args.radius);

    if output.is_json() {
        return output.result(results);
    }

    let rows: Vec<SearchRow> = results
        .into_iter()
        .map(|result| SearchRow {
            name: result.name,
            identifier: result.identifier.map(|i| i.key()).unwrap_or_default(),
            distance: format_number(result.distance),
            coordinates: result
                .coordinates
                .map(|(x, y)| format!("{}, {}", format_number(x), format_number(y)))
                .unwrap_or_default(),
        })
        .collect();
    output.table(rows)
}
