//! Fresnel reflection coefficients at a single planar interface.
//!
//! This module implements the Fresnel amplitude reflection coefficients for
//! light going from a medium of index `n1` into a medium of index `n2`. Both
//! indices may be complex (`n + ik`) to describe absorbing materials.
//!
//! The module provides:
//! - [`reflection_s`] and [`reflection_p`] for the two polarization states
//! - [`Polarization`], a closed selector that dispatches to either formula
//! - [`refl`], the diagonal amplitude matrix holding both coefficients
//!
//! # Sign convention
//!
//! At normal incidence both coefficients reduce to the same magnitude,
//! `|n1 - n2| / |n1 + n2|`, with `r_s = (n1 - n2) / (n1 + n2)` and
//! `r_p = -r_s`.

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{checked_div, DomainError};
use crate::snell::cos_theta_t;


/// Polarization state of the incident light.
///
/// `S` is perpendicular to the plane of incidence, `P` is parallel to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarization {
    S,
    P,
}

impl Polarization {
    pub const BOTH: [Polarization; 2] = [Polarization::S, Polarization::P];

    /// Single-interface reflection coefficient for this polarization.
    pub fn coefficient(
        self,
        theta: f64,
        n1: Complex64,
        n2: Complex64,
    ) -> Result<Complex64, DomainError> {
        match self {
            Polarization::S => reflection_s(theta, n1, n2),
            Polarization::P => reflection_p(theta, n1, n2),
        }
    }
}

impl fmt::Display for Polarization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarization::S => write!(f, "s"),
            Polarization::P => write!(f, "p"),
        }
    }
}

impl std::str::FromStr for Polarization {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s" => Ok(Polarization::S),
            "p" => Ok(Polarization::P),
            _ => Err(format!("unknown polarization '{}', expected 's' or 'p'", s)),
        }
    }
}

/// Computes the s-polarized Fresnel reflection coefficient.
///
/// **Context**: For light polarized perpendicular to the plane of incidence the
/// reflected amplitude depends on the impedance mismatch `n cos(theta)` on each
/// side of the interface.
///
/// **How it Works**: Evaluates
/// `(n1 cos(theta) - n2 cos(theta_t)) / (n1 cos(theta) + n2 cos(theta_t))`
/// with `cos(theta_t)` from [`cos_theta_t`]. An exactly zero denominator is a
/// [`DomainError`].
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use thinfilm::fresnel::reflection_s;
///
/// let r = reflection_s(0.0, Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.0)).unwrap();
/// assert!((r.re + 0.2).abs() < 1e-12);
/// ```
pub fn reflection_s(theta: f64, n1: Complex64, n2: Complex64) -> Result<Complex64, DomainError> {
    let ctt = cos_theta_t(theta, n1, n2)?;
    let cti = theta.cos();
    checked_div(n1 * cti - n2 * ctt, n1 * cti + n2 * ctt, "reflection_s")
}

/// Computes the p-polarized Fresnel reflection coefficient.
///
/// **Context**: Light polarized in the plane of incidence sees the mismatch in
/// `n / cos(theta)` instead, which makes the coefficient vanish at Brewster's
/// angle for lossless media.
///
/// **How it Works**: Evaluates
/// `(n2 cos(theta) - n1 cos(theta_t)) / (n1 cos(theta_t) + n2 cos(theta))`,
/// sharing the transmitted cosine and the error rules with [`reflection_s`].
pub fn reflection_p(theta: f64, n1: Complex64, n2: Complex64) -> Result<Complex64, DomainError> {
    let ctt = cos_theta_t(theta, n1, n2)?;
    let cti = theta.cos();
    checked_div(-n1 * ctt + n2 * cti, n1 * ctt + n2 * cti, "reflection_p")
}

/// Computes the Fresnel reflection amplitude matrix for an interface.
///
/// Returns `diag(r_p, r_s)` so that it can be applied directly to a
/// `(parallel, perpendicular)` amplitude vector.
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use thinfilm::fresnel;
///
/// let m = fresnel::refl(0.3, Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.0)).unwrap();
/// assert!(m[(0, 0)].norm() < m[(1, 1)].norm());
/// ```
pub fn refl(theta: f64, n1: Complex64, n2: Complex64) -> Result<Matrix2<Complex64>, DomainError> {
    let f11 = reflection_p(theta, n1, n2)?;
    let f22 = reflection_s(theta, n1, n2)?;
    Ok(Matrix2::from_diagonal(&Vector2::new(f11, f22)))
}
