//! JSON export: serialize a report for the persistence layer.
//!
//! ```text
//! GeometryEngine::analyze() → GeometryReport → export_json() → writer
//!   → embedded into a larger per-turn artifact
//! ```
//!
//! All keyed collections are `BTreeMap`, so two reports built from the same
//! snapshot differ only in `meta.built_at` and `meta.build_time_ms`.

use std::io::Write;

use serde_json::Value;

use crate::model::GeometryReport;
use crate::Result;

/// Write a report as pretty-printed JSON followed by a newline.
pub fn export_json(report: &GeometryReport, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, report)?;
    writeln!(writer)?;
    Ok(())
}

pub fn to_json_value(report: &GeometryReport) -> Result<Value> {
    Ok(serde_json::to_value(report)?)
}

/// As [`to_json_value`] with the wall-clock fields removed, for comparing
/// two runs.
pub fn to_stable_json_value(report: &GeometryReport) -> Result<Value> {
    let mut value = to_json_value(report)?;
    if let Some(meta) = value
        .get_mut("substrate")
        .and_then(|s| s.get_mut("meta"))
        .and_then(Value::as_object_mut)
    {
        meta.remove("built_at");
        meta.remove("build_time_ms");
    }
    Ok(value)
}
