use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::film::LayerStack;
use crate::fresnel::Polarization;
use crate::settings::Settings;
use crate::sweep::SweepResult;


/// Per-polarization digest of a sweep.
#[derive(Debug, Serialize)]
struct SweepSummary {
    polarization: Polarization,
    num_angles: usize,
    num_failures: usize,
    num_flagged: usize,
    min_reflectance: Option<f64>,
    min_reflectance_angle_deg: Option<f64>,
}

/// Run summary written as `summary.json`.
#[derive(Debug, Serialize)]
struct Summary {
    generated: String,
    wavelength: f64,
    stack: LayerStack,
    sweeps: Vec<SweepSummary>,
}

impl Summary {
    fn new(wavelength: f64, stack: &LayerStack, results: &[SweepResult]) -> Self {
        let sweeps = results
            .iter()
            .map(|result| {
                let minimum = result.minimum();
                SweepSummary {
                    polarization: result.polarization,
                    num_angles: result.len(),
                    num_failures: result.failures.len(),
                    num_flagged: result.flagged.len(),
                    min_reflectance: minimum.map(|(_, r)| r),
                    min_reflectance_angle_deg: minimum.map(|(theta, _)| theta.to_degrees()),
                }
            })
            .collect();

        Self {
            generated: Local::now().to_rfc3339(),
            wavelength,
            stack: *stack,
            sweeps,
        }
    }
}

/// Write all output files for a solved problem into `settings.output_dir`.
pub fn writeup(settings: &Settings, stack: &LayerStack, results: &[SweepResult]) -> Result<()> {
    let dir = Path::new(&settings.output_dir);
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {:?}", dir))?;

    for result in results {
        let path = dir.join(format!("reflectance_{}", result.polarization));
        let file = File::create(&path).with_context(|| format!("failed to create {:?}", path))?;
        let mut writer = BufWriter::new(file);
        write_table(&mut writer, result)?;
        writer.flush()?;
        info!("Wrote {:?}", path);
    }

    let summary = Summary::new(settings.wavelength, stack, results);
    let path = dir.join("summary.json");
    let file = File::create(&path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &summary)?;
    writer.flush()?;
    info!("Wrote {:?}", path);

    let path = dir.join("settings.toml");
    fs::write(&path, toml::to_string(settings)?)
        .with_context(|| format!("failed to write {:?}", path))?;
    info!("Wrote {:?}", path);

    Ok(())
}

/// Write a sweep as whitespace separated columns: angle in degrees, real and
/// imaginary part of the coefficient, and the intensity reflectance.
pub fn write_table<W: Write>(writer: &mut W, result: &SweepResult) -> Result<()> {
    writeln!(writer, "# theta_deg re(r_{0}) im(r_{0}) R_{0}", result.polarization)?;
    for (theta, r) in result.thetas.iter().zip(result.coefficients.iter()) {
        let row = [theta.to_degrees(), r.re, r.im, r.norm_sqr()]
            .iter()
            .join(" ");
        writeln!(writer, "{}", row)?;
    }
    Ok(())
}
