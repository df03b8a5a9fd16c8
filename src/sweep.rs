//! Batch evaluation of a layer stack over a grid of incident angles.
//!
//! The coefficient functions are scalar. Measurements however come as a set
//! of angles, so this module evaluates a [`LayerStack`] over an [`AngleGrid`]
//! in parallel and decides explicitly what happens to angles that fail with a
//! [`DomainError`]:
//!
//! - [`ErrorPolicy::Abort`] stops at the first failure (lowest angle first)
//! - [`ErrorPolicy::Skip`] drops the failing angles from the result
//! - [`ErrorPolicy::Nan`] keeps them as `NaN + NaN i`
//!
//! In all three cases the failures are recorded, never hidden. Coefficients
//! with a magnitude above one are kept but flagged. With the `exp(-2i phi)`
//! round-trip convention a film with positive extinction is where they show
//! up.

use std::f64::consts::PI;

use anyhow::{ensure, Result};
use log::warn;
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::{check_wavelength, DomainError};
use crate::film::LayerStack;
use crate::fresnel::Polarization;

/// Tolerance above unit magnitude before a coefficient is flagged.
pub const MAGNITUDE_TOLERANCE: f64 = 1e-9;


/// Linear grid of incident angles, given in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleGrid {
    pub start: f64,
    pub end: f64,
    pub num: usize,
}

impl AngleGrid {
    pub fn new(start: f64, end: f64, num: usize) -> Result<Self> {
        let grid = Self { start, end, num };
        grid.validate()?;
        Ok(grid)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.num > 0, "angle grid needs at least one point");
        ensure!(
            self.start.is_finite() && self.end.is_finite(),
            "angle grid bounds must be finite, got {} to {}",
            self.start,
            self.end
        );
        ensure!(
            self.start <= self.end,
            "angle grid start {} is after end {}",
            self.start,
            self.end
        );
        Ok(())
    }

    /// Grid points in radians.
    pub fn thetas(&self) -> Array1<f64> {
        Array1::linspace(self.start, self.end, self.num).mapv(|deg| deg * PI / 180.0)
    }
}

/// What to do with an angle whose coefficient cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    #[default]
    Abort,
    Skip,
    Nan,
}

impl std::str::FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            "nan" => Ok(ErrorPolicy::Nan),
            _ => Err(format!(
                "unknown error policy '{}', expected abort, skip or nan",
                s
            )),
        }
    }
}

/// An angle that failed during a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepFailure {
    pub theta: f64,
    pub error: DomainError,
}

/// Reflection coefficients of one polarization over an angle grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub polarization: Polarization,
    /// Incident angles in radians.
    pub thetas: Array1<f64>,
    pub coefficients: Array1<Complex64>,
    pub failures: Vec<SweepFailure>,
    /// Indices into `coefficients` with `|r| > 1`.
    pub flagged: Vec<usize>,
}

impl SweepResult {
    pub fn len(&self) -> usize {
        self.thetas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thetas.is_empty()
    }

    /// Intensity reflectance `|r|^2` at each angle.
    pub fn reflectance(&self) -> Array1<f64> {
        self.coefficients.mapv(|r| r.norm_sqr())
    }

    /// Angle (radians) and value of the lowest reflectance, ignoring NaN.
    pub fn minimum(&self) -> Option<(f64, f64)> {
        let reflectance = self.reflectance();
        let index = reflectance.argmin_skipnan().ok()?;
        Some((self.thetas[index], reflectance[index]))
    }
}

/// Parallel evaluation of a stack over an angle grid.
pub struct Sweep;

impl Sweep {
    /// Evaluates `stack` at every angle of `grid`.
    ///
    /// **Context**: Reflectance measurements are taken over tens to thousands
    /// of angles. Each angle is independent, so they are evaluated in parallel
    /// and reassembled in grid order.
    ///
    /// **How it Works**: Delegates to [`Sweep::evaluate`] with the grid
    /// points in radians.
    pub fn run(
        stack: &LayerStack,
        polarization: Polarization,
        grid: &AngleGrid,
        wavelength: f64,
        policy: ErrorPolicy,
    ) -> std::result::Result<SweepResult, DomainError> {
        Self::evaluate(stack, polarization, &grid.thetas().to_vec(), wavelength, policy)
    }

    /// Evaluates `stack` at arbitrary angles (radians), kept in the given
    /// order.
    ///
    /// An invalid `wavelength` fails every angle alike, so it is returned as
    /// an error whatever the policy. Otherwise every angle is mapped to a
    /// `Result` with rayon, then the results are walked in order and `policy`
    /// is applied to the failures. Successful coefficients with `|r| > 1` are
    /// logged and flagged.
    pub fn evaluate(
        stack: &LayerStack,
        polarization: Polarization,
        thetas: &[f64],
        wavelength: f64,
        policy: ErrorPolicy,
    ) -> std::result::Result<SweepResult, DomainError> {
        check_wavelength(wavelength)?;

        let evaluated: Vec<(f64, std::result::Result<Complex64, DomainError>)> = thetas
            .par_iter()
            .map(|&theta| (theta, stack.reflectance(polarization, theta, wavelength)))
            .collect();

        let mut kept_thetas = Vec::with_capacity(evaluated.len());
        let mut coefficients = Vec::with_capacity(evaluated.len());
        let mut failures = Vec::new();
        let mut flagged = Vec::new();

        for (theta, outcome) in evaluated {
            match outcome {
                Ok(r) => {
                    if r.norm() > 1.0 + MAGNITUDE_TOLERANCE {
                        warn!(
                            "{}-polarized |r| = {:.6} exceeds one at theta = {:.4} rad",
                            polarization,
                            r.norm(),
                            theta
                        );
                        flagged.push(coefficients.len());
                    }
                    kept_thetas.push(theta);
                    coefficients.push(r);
                }
                Err(error) => match policy {
                    ErrorPolicy::Abort => return Err(error),
                    ErrorPolicy::Skip => {
                        warn!("skipping theta = {:.4} rad: {}", theta, error);
                        failures.push(SweepFailure { theta, error });
                    }
                    ErrorPolicy::Nan => {
                        warn!("theta = {:.4} rad set to NaN: {}", theta, error);
                        failures.push(SweepFailure { theta, error });
                        kept_thetas.push(theta);
                        coefficients.push(Complex64::new(f64::NAN, f64::NAN));
                    }
                },
            }
        }

        Ok(SweepResult {
            polarization,
            thetas: Array1::from(kept_thetas),
            coefficients: Array1::from(coefficients),
            failures,
            flagged,
        })
    }
}
