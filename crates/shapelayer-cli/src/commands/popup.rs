use super::{parse_identifiers, Session};
use crate::cli::PopupArgs;
use crate::output::OutputWriter;
use anyhow::Result;
use shapelayer_core::models::format_value;

pub fn execute(args: &PopupArgs, session: &Session, output: &OutputWriter) -> Result<()> {
    let adapter = session.adapter(&args.layer)?;
    let identifiers = parse_identifiers(&args.ids);
    let content = adapter.popup(&identifiers, args.add_snippet)?;

    if output.is_json() {
        return output.result(content);
    }

    for record in &content.display_group {
        output.section(format_value(&record.name));
        if let Some(value_name) = &record.value_name {
            output.kv(value_name, format_value(&record.value));
        }
        for field in &record.values {
            output.kv(&field.name, format_value(&field.value));
        }
    }
    if content.display_group.is_empty() {
        output.warning("No features found");
    }
    if let Some(url) = &content.image_url {
        output.info(format!("Graph: {}", url));
    }
    Ok(())
}
