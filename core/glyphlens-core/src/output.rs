/// The graceful art of telling the world what a font can do
///
/// Reports leave glyphlens in one of two costumes: prettified JSON for the
/// humans reading along, or NDJSON for the pipelines that want one record
/// per line and nothing else.
///
/// Made with love at FontLab https://www.fontlab.com/
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

/// Writes `items` as one indented JSON array, followed by a newline.
pub fn write_json_pretty<T: Serialize>(items: &[T], mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(items)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// One compact JSON document per line, steady as a metronome.
pub fn write_ndjson<T: Serialize>(items: &[T], mut w: impl Write) -> Result<()> {
    for item in items {
        let line = serde_json::to_string(item)?;
        w.write_all(line.as_bytes())?;
        w.write_all(b"\n")?;
    }
    Ok(())
}
