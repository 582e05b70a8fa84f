use super::Session;
use crate::cli::LayerFileArgs;
use crate::output::OutputWriter;
use crate::output_types::LegendRow;
use anyhow::Result;

pub fn execute(args: &LayerFileArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let adapter = session.adapter(&args.layer)?;
    let swatches = adapter.legend();

    if output.is_json() {
        return output.result(swatches);
    }

    let rows: Vec<LegendRow> = swatches
        .into_iter()
        .map(|swatch| LegendRow {
            description: swatch.description,
            icon: swatch.icon_style.icon,
            color: swatch.icon_style.color.to_hex(),
        })
        .collect();
    output.table(rows)
}
