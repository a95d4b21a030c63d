use std::path::Path;

use crate::eval::CalibrationPair;
use crate::report::{ReportError, write_text};

/// Serialises pairs as a JSON array of `[hit, score]`.
pub fn render_calibration(pairs: &[CalibrationPair]) -> Result<String, ReportError> {
    serde_json::to_string(pairs).map_err(|source| ReportError::Serialize {
        what: "calibration pairs",
        source,
    })
}

pub fn write_calibration(pairs: &[CalibrationPair], path: &Path) -> Result<(), ReportError> {
    let json = render_calibration(pairs)?;
    write_text(path, &json)?;
    tracing::info!(path = %path.display(), pairs = pairs.len(), "wrote calibration pairs");
    Ok(())
}
