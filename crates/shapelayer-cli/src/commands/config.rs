use crate::output::OutputWriter;
use crate::output_types::ConfigRow;
use anyhow::Result;
use shapelayer_core::config::LayeredConfig;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow { key, value, source: format!("{:?}", source) })
        .collect();

    // Sort by key for consistent output
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    output.section("Configuration Values");
    output.table(rows)?;

    if !output.is_json() {
        output.section("Configuration Precedence");
        output.info("CLI arguments > Environment variables > Config file > Defaults");
    }
    Ok(())
}
