//! Native CRS detection from projection-definition (.prj) text.
//!
//! The result is a definition PROJ understands: `EPSG:<code>` when the code
//! can be recovered, the WKT itself otherwise, or [`UNKNOWN_PRJ`].

/// CRS of the web map the layers are displayed on (spherical web mercator).
pub const DISPLAY_CRS: &str = "EPSG:3857";

/// Placeholder stored when the projection text is missing or unrecognised.
pub const UNKNOWN_PRJ: &str = "unknown";

/// ESRI-style names that carry no AUTHORITY clause.
const KNOWN_NAMES: &[(&str, u32)] = &[
    ("RD_New", 28992),
    ("Amersfoort / RD New", 28992),
    ("Amersfoort_RD_New", 28992),
    ("WGS_1984_Web_Mercator", 3857),
    ("Pseudo-Mercator", 3857),
    ("Popular Visualisation", 3857),
];

/// Detect the CRS definition for the given projection text.
pub fn detect_prj(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        tracing::warn!("Empty projection definition, using placeholder");
        return UNKNOWN_PRJ.to_string();
    }

    if let Some(epsg) = parse_epsg(text) {
        return format!("EPSG:{}", epsg);
    }

    if let Some(epsg) = known_name(text) {
        return format!("EPSG:{}", epsg);
    }

    if text.starts_with("GEOGCS[") && is_wgs84(text) {
        return "EPSG:4326".to_string();
    }

    if text.starts_with("PROJCS[") || text.starts_with("GEOGCS[") || text.starts_with("+proj=") {
        return text.to_string();
    }

    tracing::warn!(prj = %text, "Unrecognised projection definition, using placeholder");
    UNKNOWN_PRJ.to_string()
}

/// Whether a detected definition is the placeholder.
pub fn is_unknown(definition: &str) -> bool {
    definition == UNKNOWN_PRJ
}

/// EPSG code of the outermost CRS.
///
/// WKT nests the base CRS (with its own AUTHORITY) before the projected CRS
/// authority, so the last occurrence wins.
fn parse_epsg(wkt: &str) -> Option<u32> {
    const AUTHORITY: &str = "AUTHORITY[\"EPSG\",";
    if let Some(start) = wkt.rfind(AUTHORITY) {
        let code: String = wkt[start + AUTHORITY.len()..]
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        if let Ok(code) = code.parse::<u32>() {
            return Some(code);
        }
    }

    // Look for EPSG: prefix
    if let Some(start) = wkt.find("EPSG:") {
        let code: String =
            wkt[start + 5..].chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(code) = code.parse::<u32>() {
            return Some(code);
        }
    }

    None
}

fn known_name(wkt: &str) -> Option<u32> {
    let head = wkt.split(',').next().unwrap_or(wkt);
    KNOWN_NAMES.iter().find(|(name, _)| head.contains(name)).map(|(_, code)| *code)
}

fn is_wgs84(wkt: &str) -> bool {
    let head = wkt.split(',').next().unwrap_or(wkt);
    head.contains("WGS_1984") || head.contains("WGS 84")
}
