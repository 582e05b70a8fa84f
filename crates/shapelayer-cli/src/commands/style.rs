use super::Session;
use crate::cli::LayerFileArgs;
use crate::output::OutputWriter;
use crate::output_types::StyleOutput;
use anyhow::Result;

pub fn execute(args: &LayerFileArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let adapter = session.adapter(&args.layer)?;
    let (layers, styles) = adapter.layer();
    output.result(StyleOutput { layers, styles })
}
