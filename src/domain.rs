//! Input domain checks for the Fresnel calculations.
//!
//! Every public calculation in this crate is a pure function of its inputs and
//! can only fail in one way: the inputs lie outside the physical domain, or a
//! formula hits an exact singularity. Both cases are reported as a
//! [`DomainError`] so that NaN never leaks out of the core silently.

use std::f64::consts::FRAC_PI_2;

use num_complex::Complex64;
use thiserror::Error;

/// The only failure kind of the numeric core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("refractive index {name} = {value} must have a finite, positive real part")]
    InvalidIndex { name: &'static str, value: Complex64 },

    #[error("incident angle {0} rad is outside [-pi/2, pi/2]")]
    InvalidAngle(f64),

    #[error("film thickness {0} m must be finite and non-negative")]
    InvalidThickness(f64),

    #[error("wavelength {0} m must be finite and positive")]
    InvalidWavelength(f64),

    #[error("zero denominator in {0}")]
    ZeroDenominator(&'static str),

    #[error("non-finite result in {0}")]
    NonFinite(&'static str),
}


/// Checks that a refractive index is finite with a positive real part.
pub fn check_index(name: &'static str, value: Complex64) -> Result<(), DomainError> {
    if value.re.is_finite() && value.im.is_finite() && value.re > 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidIndex { name, value })
    }
}

/// Checks that an incident angle is finite and within `[-pi/2, pi/2]`.
pub fn check_angle(theta: f64) -> Result<(), DomainError> {
    if theta.is_finite() && theta.abs() <= FRAC_PI_2 {
        Ok(())
    } else {
        Err(DomainError::InvalidAngle(theta))
    }
}

pub fn check_thickness(d: f64) -> Result<(), DomainError> {
    if d.is_finite() && d >= 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidThickness(d))
    }
}

pub fn check_wavelength(wavelength: f64) -> Result<(), DomainError> {
    if wavelength.is_finite() && wavelength > 0.0 {
        Ok(())
    } else {
        Err(DomainError::InvalidWavelength(wavelength))
    }
}

/// Divides `num` by `den`, failing on an exactly zero denominator or a
/// non-finite quotient.
pub fn checked_div(
    num: Complex64,
    den: Complex64,
    what: &'static str,
) -> Result<Complex64, DomainError> {
    if den.re == 0.0 && den.im == 0.0 {
        return Err(DomainError::ZeroDenominator(what));
    }
    let q = num / den;
    if q.re.is_finite() && q.im.is_finite() {
        Ok(q)
    } else {
        Err(DomainError::NonFinite(what))
    }
}

/// Principal complex square root with the branch cut on the negative real
/// axis. A signed-zero imaginary part is normalised first so that the cut is
/// always approached from above and `sqrt(-x) = +i sqrt(x)`.
pub fn principal_sqrt(z: Complex64) -> Complex64 {
    if z.im == 0.0 {
        Complex64::new(z.re, 0.0).sqrt()
    } else {
        z.sqrt()
    }
}
