use super::Session;
use crate::cli::LayerFileArgs;
use crate::output::OutputWriter;
use anyhow::Result;

pub fn execute(args: &LayerFileArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let adapter = session.adapter(&args.layer)?;

    match adapter.extent() {
        Some(extent) if output.is_json() => output.result(extent)?,
        Some(extent) => {
            output.kv("West", extent.west);
            output.kv("South", extent.south);
            output.kv("East", extent.east);
            output.kv("North", extent.north);
        }
        None if output.is_json() => output.result(serde_json::Value::Null)?,
        None => output.warning("No extent available for this layer"),
    }
    Ok(())
}
