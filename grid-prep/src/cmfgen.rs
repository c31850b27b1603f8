//! Reorganization of the CMFGEN (Fierro+15) grid into cdbs layout.
//!
//! Raw downloads arrive as a flat directory of `t*r.flx*` (rotating) and
//! `t*n.flx*` (non-rotating) flux files plus two hand-made parameter tables.
//! Step 1 splits the files into `cmfgenF15_rot` / `cmfgenF15_noRot`
//! subdirectories; step 2 writes a `catalog.fits` for one such subdirectory
//! from its parameter table.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::catalog::{write_catalog, CatalogEntry};
use crate::table::read_param_table;

pub const ROT_DIR: &str = "cmfgenF15_rot";
pub const NO_ROT_DIR: &str = "cmfgenF15_noRot";

/// What `organize` moved where.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OrganizeSummary {
    pub rotating: usize,
    pub non_rotating: usize,
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Split downloaded CMFGEN flux files into rotating and non-rotating
/// subdirectories of `dir`, and move the parameter tables alongside.
///
/// Rotating models match `t*r.flx*`, non-rotating `t*n.flx*`; nothing else
/// in the directory may start with `t`.
pub fn organize(dir: &Path) -> Result<OrganizeSummary> {
    let rot_dir = dir.join(ROT_DIR);
    let no_rot_dir = dir.join(NO_ROT_DIR);
    fs::create_dir_all(&rot_dir)?;
    fs::create_dir_all(&no_rot_dir)?;

    let mut summary = OrganizeSummary::default();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let Some(name) = file_name(&path) else {
            continue;
        };
        if !name.starts_with('t') {
            continue;
        }
        if name.contains("r.flx") {
            fs::rename(&path, rot_dir.join(name))?;
            summary.rotating += 1;
        } else if name.contains("n.flx") {
            fs::rename(&path, no_rot_dir.join(name))?;
            summary.non_rotating += 1;
        }
    }

    for (table, destination) in [("Table_rot.txt", &rot_dir), ("Table_noRot.txt", &no_rot_dir)] {
        let source = dir.join(table);
        if source.exists() {
            fs::rename(&source, destination.join(table))?;
        }
    }

    info!(
        rotating = summary.rotating,
        non_rotating = summary.non_rotating,
        dir = %dir.display(),
        "organized CMFGEN atmosphere files"
    );
    Ok(summary)
}

/// Find the `Table_*` parameter file in a model directory.
fn find_param_table(dir: &Path) -> Result<PathBuf> {
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if file_name(&path).is_some_and(|name| name.starts_with("Table_")) {
            return Ok(path);
        }
    }
    bail!("no Table_* parameter file in {}", dir.display())
}

/// Write `catalog.fits` for one organized model directory (rotating or
/// non-rotating). Model parameters come from the directory's `Table_*`
/// file; filenames in the table are not precise enough to re-derive them.
///
/// Returns the number of catalog rows written.
pub fn catalog(dir: &Path, output: &Path) -> Result<usize> {
    let table_path = find_param_table(dir)?;
    let rows = read_param_table(&table_path)?;
    if rows.is_empty() {
        bail!("parameter table {} has no rows", table_path.display());
    }

    let entries: Vec<CatalogEntry> = rows
        .into_iter()
        .map(|row| CatalogEntry::keyed(row.temperature, row.gravity, 2, row.name))
        .collect();

    write_catalog(output, &entries)?;
    info!(
        rows = entries.len(),
        output = %output.display(),
        "wrote CMFGEN catalog"
    );
    Ok(entries.len())
}
