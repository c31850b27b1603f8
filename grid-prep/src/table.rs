//! Reader for the hand-made CMFGEN parameter tables.
//!
//! The Fierro+15 atmosphere files do not encode their parameters precisely
//! enough in the filenames, so the model parameters come from whitespace-
//! separated tables (`Table_rot.txt`, `Table_noRot.txt`) transcribed from
//! the paper: file prefix, effective temperature, luminosity, log g.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Parameters for one model atmosphere file.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParams {
    /// Atmosphere file name (or prefix) this row describes.
    pub name: String,
    /// Effective temperature in Kelvin.
    pub temperature: f64,
    /// Log surface gravity (cgs).
    pub gravity: f64,
}

/// Read a parameter table. Lines that do not parse as
/// `name temperature _ gravity ...` (headers, comments, blanks) are skipped.
pub fn read_param_table(path: &Path) -> Result<Vec<ModelParams>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading parameter table {}", path.display()))?;

    let mut rows = Vec::new();
    for line in contents.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }
        let (Ok(temperature), Ok(gravity)) = (fields[1].parse::<f64>(), fields[3].parse::<f64>())
        else {
            continue;
        };
        rows.push(ModelParams {
            name: fields[0].to_string(),
            temperature,
            gravity,
        });
    }

    Ok(rows)
}
