//! cdbs `catalog.fits` writing.
//!
//! The lookup library locates template spectra through a binary table with
//! two string columns: `INDEX` (`"Teff,metallicity,logg"`) and `FILENAME`
//! (the spectrum file, optionally with a `[gX.X]` column selector suffix).

use std::path::Path;

use anyhow::{Context, Result};
use fitsio::tables::{ColumnDataType, ColumnDescription};
use fitsio::FitsFile;

/// One catalog row.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    /// Formatted `"Teff,metallicity,logg"` key.
    pub index: String,
    /// Spectrum file the key resolves to.
    pub filename: String,
}

impl CatalogEntry {
    /// Format a key the way cdbs catalogs expect, with the given number of
    /// log g decimals (CMFGEN catalogs use two, PHOENIX uses one).
    pub fn keyed(temperature: f64, gravity: f64, gravity_decimals: usize, filename: String) -> Self {
        Self {
            index: format!("{temperature:5.0},0.0,{gravity:.gravity_decimals$}"),
            filename,
        }
    }
}

/// Write `catalog.fits` with the given rows.
pub fn write_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    let index_width = entries.iter().map(|e| e.index.len()).max().unwrap_or(1);
    let filename_width = entries.iter().map(|e| e.filename.len()).max().unwrap_or(1);

    let columns = vec![
        ColumnDescription::new("INDEX")
            .with_type(ColumnDataType::String)
            .that_repeats(index_width)
            .create()?,
        ColumnDescription::new("FILENAME")
            .with_type(ColumnDataType::String)
            .that_repeats(filename_width)
            .create()?,
    ];

    let mut fptr = FitsFile::create(path)
        .overwrite()
        .open()
        .with_context(|| format!("creating {}", path.display()))?;
    let hdu = fptr.create_table("CATALOG", &columns)?;

    let index: Vec<String> = entries.iter().map(|e| e.index.clone()).collect();
    let filenames: Vec<String> = entries.iter().map(|e| e.filename.clone()).collect();
    hdu.write_col(&mut fptr, "INDEX", &index)?;
    hdu.write_col(&mut fptr, "FILENAME", &filenames)?;

    Ok(())
}

/// Read a `catalog.fits` back into rows.
pub fn read_catalog(path: &Path) -> Result<Vec<CatalogEntry>> {
    let mut fptr = FitsFile::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let hdu = fptr.hdu("CATALOG")?;

    let index: Vec<String> = hdu.read_col(&mut fptr, "INDEX")?;
    let filenames: Vec<String> = hdu.read_col(&mut fptr, "FILENAME")?;

    Ok(index
        .into_iter()
        .zip(filenames)
        .map(|(index, filename)| CatalogEntry { index, filename })
        .collect())
}
