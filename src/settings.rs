use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use config::{Config, Environment, File};
use log::{debug, info};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::domain::check_index;
use crate::film::{LayerStack, PROBE_WAVELENGTH};
use crate::fresnel::Polarization;
use crate::sweep::{AngleGrid, ErrorPolicy};


/// Runtime configuration for a reflectance sweep.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    /// Probe wavelength in meters.
    #[serde(default = "default_wavelength")]
    pub wavelength: f64,
    pub incident_refr_index: Complex64,
    pub film_refr_index: Complex64,
    pub substrate_refr_index: Complex64,
    /// Film thickness in meters.
    pub thickness: f64,
    pub polarizations: Vec<Polarization>,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Incident angle grid in degrees. Kept last so it serializes as a
    /// trailing TOML table.
    pub angles: AngleGrid,
}

fn default_wavelength() -> f64 {
    PROBE_WAVELENGTH
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Settings {
    pub fn layer_stack(&self) -> Result<LayerStack> {
        LayerStack::new(
            self.incident_refr_index,
            self.film_refr_index,
            self.substrate_refr_index,
            self.thickness,
        )
        .context("invalid layer stack")
    }
}

/// Loads `config/default.toml` without looking at the command line.
pub fn load_default_config() -> Result<Settings> {
    let root = retrieve_project_root()?;
    let default_config_file = root.join("config/default.toml");

    let settings = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .context("error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("error deserializing configuration")?;

    validate_config(&config)?;

    Ok(config)
}

/// Loads the configuration and applies the process command-line arguments.
pub fn load_config() -> Result<Settings> {
    load_config_from(CliArgs::parse())
}

/// Loads the configuration file (local if present, otherwise default), the
/// `THINFILM_*` environment, and then `args` on top.
pub fn load_config_from(args: CliArgs) -> Result<Settings> {
    let root = retrieve_project_root()?;

    let default_config_file = root.join("config/default.toml");
    let local_config = root.join("config/local.toml");

    let config_file = if local_config.exists() {
        info!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        info!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(Environment::with_prefix("thinfilm"))
        .build()
        .context("error loading configuration")?;

    let config: Settings = settings
        .try_deserialize()
        .context("error deserializing configuration")?;

    let config = apply_overrides(config, args)?;

    debug!("{:#?}", config);

    Ok(config)
}

fn apply_overrides(mut config: Settings, args: CliArgs) -> Result<Settings> {
    if let Some(wavelength) = args.w {
        config.wavelength = wavelength;
    }
    if let Some(incident) = args.incident {
        config.incident_refr_index = incident;
    }
    if let Some(film) = args.film {
        config.film_refr_index = film;
    }
    if let Some(substrate) = args.substrate {
        config.substrate_refr_index = substrate;
    }
    if let Some(d) = args.d {
        config.thickness = d;
    }
    if let Some(pols) = args.pol {
        config.polarizations = pols;
    }
    if let Some(angles) = args.angles {
        let &[start, end, num] = angles.as_slice() else {
            return Err(anyhow!("--angles expects exactly three values: start end num"));
        };
        ensure!(
            num >= 1.0 && num.fract() == 0.0,
            "number of angles must be a positive integer, got {}",
            num
        );
        config.angles = AngleGrid {
            start,
            end,
            num: num as usize,
        };
    }
    if let Some(policy) = args.policy {
        config.error_policy = policy;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }

    validate_config(&config)?;

    Ok(config)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the THINFILM_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
fn retrieve_project_root() -> Result<PathBuf> {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        return Ok(PathBuf::from(manifest_dir));
    }
    if let Ok(path) = env::var("THINFILM_ROOT_DIR") {
        return Ok(PathBuf::from(path));
    }

    // Walk upward from the executable looking for a "config" subdirectory
    let exe_path = env::current_exe().context("failed to get current executable path")?;
    exe_path
        .ancestors()
        .skip(1)
        .find(|dir| dir.join("config").is_dir())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("could not find project root directory"))
}

fn validate_config(config: &Settings) -> Result<()> {
    ensure!(
        config.wavelength.is_finite() && config.wavelength > 0.0,
        "wavelength must be greater than 0, got {}",
        config.wavelength
    );
    ensure!(
        config.thickness.is_finite() && config.thickness >= 0.0,
        "thickness must be non-negative, got {}",
        config.thickness
    );
    ensure!(
        !config.polarizations.is_empty(),
        "at least one polarization is required"
    );
    check_index("incident", config.incident_refr_index)?;
    check_index("film", config.film_refr_index)?;
    check_index("substrate", config.substrate_refr_index)?;
    config.angles.validate()?;
    Ok(())
}

#[derive(Parser, Debug)]
#[command(version, about = "thinfilm - Fresnel reflectance of thin-film stacks")]
pub struct CliArgs {
    /// Probe wavelength in meters.
    #[arg(short, long)]
    w: Option<f64>,

    /// Refractive index of the incident medium, e.g. 1.0 or 1.0+0i.
    #[arg(long)]
    incident: Option<Complex64>,

    /// Refractive index of the film.
    #[arg(long)]
    film: Option<Complex64>,

    /// Refractive index of the substrate.
    #[arg(long)]
    substrate: Option<Complex64>,

    /// Film thickness in meters.
    #[arg(short, long)]
    d: Option<f64>,

    /// Polarizations to sweep, separated by spaces (s, p).
    #[arg(long, num_args = 1.., value_delimiter = ' ')]
    pol: Option<Vec<Polarization>>,

    /// Angle grid in degrees.
    /// Format: start end num
    #[arg(long, num_args = 3, value_delimiter = ' ', allow_negative_numbers = true)]
    angles: Option<Vec<f64>>,

    /// What to do with angles that cannot be evaluated: abort, skip or nan.
    #[arg(long)]
    policy: Option<ErrorPolicy>,

    /// Directory for the output files.
    #[arg(short, long)]
    output: Option<String>,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Wavelength: {:.6e}
  - Incident Refractive Index: {:.6} + {:.6}i
  - Film Refractive Index: {:.6} + {:.6}i
  - Substrate Refractive Index: {:.6} + {:.6}i
  - Thickness: {:.6e}
  - Polarizations: {:?}
  - Angles: {} to {} deg ({} points)
  - Error Policy: {:?}
  ",
            self.wavelength,
            self.incident_refr_index.re,
            self.incident_refr_index.im,
            self.film_refr_index.re,
            self.film_refr_index.im,
            self.substrate_refr_index.re,
            self.substrate_refr_index.im,
            self.thickness,
            self.polarizations,
            self.angles.start,
            self.angles.end,
            self.angles.num,
            self.error_policy,
        )
    }
}
