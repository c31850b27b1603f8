//! Reorganization of the PHOENIX v16 (Husser+13) grid into cdbs layout.
//!
//! The grid downloads as one `*-HiRes.fits` flux image per (Teff, log g)
//! point plus a single shared wavelength image. Assembly combines them into
//! one binary table per temperature (`phoenixm00_NNNNN.fits` with a
//! `WAVELENGTH` column and one `gX.X` column per gravity), after which a
//! `catalog.fits` is generated, fluxes are converted to cdbs FLAM units,
//! and optionally everything is rebinned onto the ATLAS wavelength grid.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use atmos::{GridFamily, ModelGrid};
use fitsio::tables::{Column, ColumnDataType, ColumnDescription};
use fitsio::FitsFile;
use indicatif::ProgressBar;
use tracing::info;

use crate::catalog::{write_catalog, CatalogEntry};
use crate::rebin::rebin_spec;

/// Shared wavelength image distributed with the Husser+13 grid.
pub const WAVE_FILE: &str = "WAVE_PHOENIX-ACES-AGSS-COND-2011.fits";

/// erg s⁻¹ cm⁻² cm⁻¹ to erg s⁻¹ cm⁻² Å⁻¹.
const FLUX_SCALE_TO_FLAM: f64 = 1e-8;

/// One assembled grid file: a wavelength axis and per-gravity flux columns.
#[derive(Debug, Clone, PartialEq)]
struct GridTable {
    wavelength: Vec<f64>,
    /// `("g4.5", fluxes)` pairs, ordered by gravity.
    columns: Vec<(String, Vec<f64>)>,
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

/// Sorted `.fits` file names in `dir` starting with `prefix`.
fn list_fits(dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if let Some(name) = file_name(&path) {
            if name.starts_with(prefix) && name.ends_with(".fits") {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn read_primary_image(path: &Path) -> Result<Vec<f64>> {
    let mut fptr =
        FitsFile::open(path).with_context(|| format!("opening {}", path.display()))?;
    let hdu = fptr.primary_hdu()?;
    let data: Vec<f64> = hdu.read_image(&mut fptr)?;
    Ok(data)
}

fn read_grid_table(path: &Path) -> Result<GridTable> {
    let mut fptr =
        FitsFile::open(path).with_context(|| format!("opening {}", path.display()))?;
    let hdu = fptr.hdu(1)?;

    let names: Vec<String> = hdu.columns(&mut fptr).map(column_name).collect();
    let wavelength: Vec<f64> = hdu.read_col(&mut fptr, "WAVELENGTH")?;
    let mut columns = Vec::new();
    for name in names {
        if name.starts_with('g') {
            let flux: Vec<f64> = hdu.read_col(&mut fptr, &name)?;
            columns.push((name, flux));
        }
    }

    Ok(GridTable { wavelength, columns })
}

fn read_column_names(path: &Path) -> Result<Vec<String>> {
    let mut fptr =
        FitsFile::open(path).with_context(|| format!("opening {}", path.display()))?;
    let hdu = fptr.hdu(1)?;
    Ok(hdu.columns(&mut fptr).map(column_name).collect())
}

fn column_name(column: Column) -> String {
    match column {
        Column::Int32 { name, .. }
        | Column::Int64 { name, .. }
        | Column::Float { name, .. }
        | Column::Double { name, .. }
        | Column::String { name, .. } => name,
    }
}

/// Write an assembled grid table. Wavelengths are stored double precision,
/// fluxes single precision, matching the cdbs convention. `flam_units`
/// stamps the `TUNITn` keywords the lookup library reads.
fn write_grid_table(path: &Path, table: &GridTable, flam_units: bool) -> Result<()> {
    let mut descriptions = vec![ColumnDescription::new("WAVELENGTH")
        .with_type(ColumnDataType::Double)
        .create()?];
    for (name, _) in &table.columns {
        descriptions.push(
            ColumnDescription::new(name)
                .with_type(ColumnDataType::Float)
                .create()?,
        );
    }

    let mut fptr = FitsFile::create(path)
        .overwrite()
        .open()
        .with_context(|| format!("creating {}", path.display()))?;
    let hdu = fptr.create_table("MODELS", &descriptions)?;

    hdu.write_col(&mut fptr, "WAVELENGTH", &table.wavelength)?;
    for (name, flux) in &table.columns {
        let single: Vec<f32> = flux.iter().map(|&f| f as f32).collect();
        hdu.write_col(&mut fptr, name, &single)?;
    }

    if flam_units {
        hdu.write_key(&mut fptr, "TUNIT1", "ANGSTROM".to_string())?;
        for i in 0..table.columns.len() {
            hdu.write_key(&mut fptr, &format!("TUNIT{}", i + 2), "FLAM".to_string())?;
        }
    }

    Ok(())
}

fn assembled_file_name(temperature: f64) -> String {
    format!("phoenixm00_{:05}.fits", temperature as u32)
}

/// The Husser+13 temperature nodes, from the grid descriptor.
fn temperature_nodes() -> &'static [f64] {
    ModelGrid::get(GridFamily::PhoenixV16HiRes)
        .temperature_nodes
        .as_deref()
        .expect("PHOENIX v16 defines temperature nodes")
}

/// Combine per-(Teff, log g) HiRes flux images with the shared wavelength
/// image into one table per temperature under `output`.
///
/// Returns the number of assembled files; temperatures with no downloaded
/// models are skipped.
pub fn assemble(input: &Path, output: &Path) -> Result<usize> {
    let wave = read_primary_image(&input.join(WAVE_FILE))?;
    fs::create_dir_all(output)?;

    let temperatures = temperature_nodes();
    let bar = ProgressBar::new(temperatures.len() as u64);
    let mut written = 0;

    for &temperature in temperatures {
        let prefix = format!("lte{:05}", temperature as u32);
        // The gravity is the second dash field of the filename; the name is
        // not precise enough for the temperature, which is why we iterate
        // the documented nodes instead.
        let mut models: Vec<(f64, Vec<f64>)> = Vec::new();
        for entry in fs::read_dir(input)? {
            let path = entry?.path();
            let Some(name) = file_name(&path) else {
                continue;
            };
            if !name.starts_with(&prefix) || !name.ends_with("-HiRes.fits") {
                continue;
            }
            let gravity: f64 = name
                .split('-')
                .nth(1)
                .with_context(|| format!("no gravity field in {name}"))?
                .parse()
                .with_context(|| format!("bad gravity field in {name}"))?;
            let flux = read_primary_image(&path)?;
            if flux.len() != wave.len() {
                bail!(
                    "{name}: {} flux samples but {} wavelengths",
                    flux.len(),
                    wave.len()
                );
            }
            models.push((gravity, flux));
        }
        if models.is_empty() {
            bar.inc(1);
            continue;
        }
        models.sort_by(|a, b| a.0.total_cmp(&b.0));

        let table = GridTable {
            wavelength: wave.clone(),
            columns: models
                .into_iter()
                .map(|(gravity, flux)| (format!("g{gravity:.1}"), flux))
                .collect(),
        };
        write_grid_table(&output.join(assembled_file_name(temperature)), &table, false)?;
        written += 1;
        bar.inc(1);
    }
    bar.finish();

    info!(files = written, output = %output.display(), "assembled PHOENIX v16 grid");
    Ok(written)
}

/// Write `catalog.fits` for a directory of assembled files. Each file
/// contributes one row per gravity column; `prefix` is prepended to the
/// `FILENAME` entries (typically the models directory name plus `/`).
pub fn catalog(models_dir: &Path, output: &Path, prefix: &str) -> Result<usize> {
    let mut entries = Vec::new();
    for file in list_fits(models_dir, "phoenixm00_")? {
        let temperature = parse_temperature(&file)?;
        for column in read_column_names(&models_dir.join(&file))? {
            let Some(gravity) = column.strip_prefix('g') else {
                continue;
            };
            let gravity: f64 = gravity
                .parse()
                .with_context(|| format!("bad gravity column {column} in {file}"))?;
            entries.push(CatalogEntry::keyed(
                temperature,
                gravity,
                1,
                format!("{prefix}{file}[{column}]"),
            ));
        }
    }
    if entries.is_empty() {
        bail!("no assembled models under {}", models_dir.display());
    }

    write_catalog(output, &entries)?;
    info!(rows = entries.len(), output = %output.display(), "wrote PHOENIX v16 catalog");
    Ok(entries.len())
}

fn parse_temperature(file: &str) -> Result<f64> {
    file.strip_prefix("phoenixm00_")
        .and_then(|rest| rest.strip_suffix(".fits"))
        .and_then(|digits| digits.parse().ok())
        .with_context(|| format!("cannot parse temperature from {file}"))
}

/// Convert assembled tables in place to cdbs flux units
/// (erg s⁻¹ cm⁻² cm⁻¹ → erg s⁻¹ cm⁻² Å⁻¹) and stamp unit keywords.
pub fn cdbs(dir: &Path) -> Result<usize> {
    let files = list_fits(dir, "phoenixm00_")?;
    let bar = ProgressBar::new(files.len() as u64);

    for file in &files {
        let path = dir.join(file);
        let mut table = read_grid_table(&path)?;
        for (_, flux) in &mut table.columns {
            for value in flux.iter_mut() {
                *value *= FLUX_SCALE_TO_FLAM;
            }
        }

        // Write beside, then swap in, so a failure cannot corrupt the grid.
        let staged = path.with_extension("fits.tmp");
        write_grid_table(&staged, &table, true)?;
        fs::rename(&staged, &path)?;
        bar.inc(1);
    }
    bar.finish();

    info!(files = files.len(), dir = %dir.display(), "converted PHOENIX v16 grid to cdbs units");
    Ok(files.len())
}

/// Rebin the cdbs PHOENIX v16 grid onto the wavelength axis of an ATLAS
/// grid file, into `grid/phoenix_v16_rebin/phoenixm00` under `cdbs_root`.
pub fn rebin(cdbs_root: &Path, wave_from: &Path) -> Result<usize> {
    let target = read_grid_table(wave_from)
        .with_context(|| format!("reading target wavelength grid {}", wave_from.display()))?
        .wavelength;

    let source_dir = cdbs_root.join("grid/phoenix_v16/phoenixm00");
    let dest_dir = cdbs_root.join("grid/phoenix_v16_rebin/phoenixm00");
    fs::create_dir_all(&dest_dir)?;

    let files = list_fits(&source_dir, "phoenixm00_")?;
    if files.is_empty() {
        bail!("no assembled models under {}", source_dir.display());
    }
    let bar = ProgressBar::new(files.len() as u64);

    for file in &files {
        let table = read_grid_table(&source_dir.join(file))?;
        let rebinned = GridTable {
            wavelength: target.clone(),
            columns: table
                .columns
                .iter()
                .map(|(name, flux)| {
                    (
                        name.clone(),
                        rebin_spec(&table.wavelength, flux, &target),
                    )
                })
                .collect(),
        };
        write_grid_table(&dest_dir.join(file), &rebinned, true)?;
        bar.inc(1);
    }
    bar.finish();

    info!(files = files.len(), dest = %dest_dir.display(), "rebinned PHOENIX v16 grid");
    Ok(files.len())
}
