//! Thin-film interference for a three-layer stack.
//!
//! A stack is an incident medium, a film of thickness `d` and a substrate.
//! The light reflected at the first interface interferes with the light that
//! crosses the film, reflects at the second interface and comes back. The
//! Airy formula sums all multiple reflections in closed form:
//!
//! ```text
//! r = (r12 + r23 exp(-2i phi)) / (1 + r12 r23 exp(-2i phi))
//! phi = 2 pi d n2 cos(theta_2) / lambda
//! ```
//!
//! With `d = 0` the exponential is one but `r12` and `r23` are still taken at
//! the film index, so the result only matches the bare `n1 | n3` interface in
//! the limit. That is a property of the formula and is kept as is.

use std::f64::consts::PI;

use nalgebra::{Matrix2, Vector2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::domain::{check_index, check_thickness, check_wavelength, checked_div, DomainError};
use crate::fresnel::Polarization;
use crate::snell::cos_theta_t;

/// Probe wavelength of the reflectance setup, in meters.
pub const PROBE_WAVELENGTH: f64 = 532e-9;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fresnel::reflection_s;

    fn real(x: f64) -> Complex64 {
        Complex64::new(x, 0.0)
    }

    #[test]
    fn phase_at_normal_incidence() {
        let phi = phase_thickness(0.0, real(1.0), real(1.5), 100e-9, 532e-9).unwrap();
        let expected = 2.0 * PI * 100e-9 * 1.5 / 532e-9;
        assert!((phi - real(expected)).norm() < 1e-12, "phi: {}", phi);
        assert!(phi.re > 0.0);
    }

    #[test]
    fn phase_rejects_bad_lengths() {
        let (n1, n2) = (real(1.0), real(1.5));
        assert_eq!(
            phase_thickness(0.0, n1, n2, -1e-9, 532e-9),
            Err(DomainError::InvalidThickness(-1e-9))
        );
        assert_eq!(
            phase_thickness(0.0, n1, n2, 1e-7, 0.0),
            Err(DomainError::InvalidWavelength(0.0))
        );
    }

    #[test]
    fn matched_film_of_zero_thickness_is_transparent() {
        let n1 = real(1.0);
        let n3 = Complex64::new(1.5, 0.01);
        for theta in [0.0, 0.3, 0.9, 1.3] {
            for pol in Polarization::BOTH {
                let r = three_layer_reflectance(pol, theta, n1, n1, n3, 0.0, PROBE_WAVELENGTH)
                    .unwrap();
                let direct = pol.coefficient(theta, n1, n3).unwrap();
                assert!((r - direct).norm() < 1e-12, "{} {}: {} vs {}", pol, theta, r, direct);
            }
        }
    }

    #[test]
    fn quarter_wave_in_air_reflects_more() {
        // a bare quarter-wave slab between equal media is a high reflector
        let (n1, n2, n3) = (real(1.0), real(1.5), real(1.0));
        let d = PROBE_WAVELENGTH / (4.0 * 1.5);
        let r = three_layer_reflectance(Polarization::S, 0.0, n1, n2, n3, d, PROBE_WAVELENGTH)
            .unwrap();
        assert!((r - real(-0.4 / 1.04)).norm() < 1e-12, "r: {}", r);
        assert_eq!(reflection_s(0.0, n1, n3).unwrap(), real(0.0));
    }

    #[test]
    fn quarter_wave_antireflection() {
        let (n1, n3) = (real(1.0), real(1.5));
        let n2 = real(1.5_f64.sqrt());
        let d = PROBE_WAVELENGTH / (4.0 * n2.re);
        let coated = three_layer_reflectance(Polarization::S, 0.0, n1, n2, n3, d, PROBE_WAVELENGTH)
            .unwrap();
        let bare = reflection_s(0.0, n1, n3).unwrap();
        assert!(coated.norm() < bare.norm());
        assert!(coated.norm() < 1e-12, "coated: {}", coated);
    }

    #[test]
    fn half_wave_is_absentee() {
        let (n1, n2) = (real(1.0), real(2.0));
        let d = PROBE_WAVELENGTH / (2.0 * 2.0);
        for pol in Polarization::BOTH {
            let r = three_layer_reflectance(pol, 0.0, n1, n2, n1, d, PROBE_WAVELENGTH).unwrap();
            assert!(r.norm() < 1e-12, "{}: {}", pol, r);
        }
    }

    #[test]
    fn zero_film_index_is_domain_error() {
        let r = three_layer_reflectance(
            Polarization::P,
            0.2,
            real(1.0),
            real(0.0),
            real(1.5),
            1e-7,
            PROBE_WAVELENGTH,
        );
        assert!(matches!(r, Err(DomainError::InvalidIndex { .. })));
    }

    #[test]
    fn stack_methods_agree_with_free_functions() {
        let stack = LayerStack::new(real(1.0), Complex64::new(2.0, 0.05), real(1.5), 80e-9).unwrap();
        let theta = 0.5;
        let rs = stack.reflectance(Polarization::S, theta, PROBE_WAVELENGTH).unwrap();
        let rp = stack.reflectance(Polarization::P, theta, PROBE_WAVELENGTH).unwrap();
        let m = stack.reflection_matrix(theta, PROBE_WAVELENGTH).unwrap();
        assert_eq!(m[(0, 0)], rp);
        assert_eq!(m[(1, 1)], rs);

        let unpolarized = stack.unpolarized_reflectance(theta, PROBE_WAVELENGTH).unwrap();
        let expected = 0.5 * (rs.norm_sqr() + rp.norm_sqr());
        assert!((unpolarized - expected).abs() < 1e-12);
    }

    #[test]
    fn stack_validation() {
        assert!(LayerStack::new(real(1.0), real(1.5), real(1.0), -1.0).is_err());
        assert!(LayerStack::new(real(-1.0), real(1.5), real(1.0), 1e-7).is_err());
        assert!(LayerStack::new(real(1.0), real(1.5), real(1.0), 0.0).is_ok());
    }

    #[test]
    fn thick_lossy_film_decouples_substrate() {
        // with k > 0 the round-trip term grows, so r tends to 1 / r12
        let (n1, n2) = (real(1.0), Complex64::new(1.5, 0.5));
        let d = 20e-6;
        for pol in Polarization::BOTH {
            let a = three_layer_reflectance(pol, 0.4, n1, n2, real(1.0), d, PROBE_WAVELENGTH)
                .unwrap();
            let b = three_layer_reflectance(pol, 0.4, n1, n2, real(3.0), d, PROBE_WAVELENGTH)
                .unwrap();
            let r12 = pol.coefficient(0.4, n1, n2).unwrap();
            assert!((a - 1.0 / r12).norm() < 1e-9, "{}: {} vs {}", pol, a, 1.0 / r12);
            assert!((b - 1.0 / r12).norm() < 1e-9, "{}: {} vs {}", pol, b, 1.0 / r12);
        }
    }

    #[test]
    fn very_thick_absorber_stays_finite() {
        // exp(-2i phi) overflows f64 here
        let (n1, n2) = (real(1.0), Complex64::new(1.5, 2.0));
        for pol in Polarization::BOTH {
            let r = three_layer_reflectance(pol, 0.0, n1, n2, real(1.0), 1e-3, PROBE_WAVELENGTH)
                .unwrap();
            let r12 = pol.coefficient(0.0, n1, n2).unwrap();
            assert!(r.re.is_finite() && r.im.is_finite());
            assert!((r - 1.0 / r12).norm() < 1e-12, "{}: {}", pol, r);
        }
    }

    #[test]
    fn both_forms_agree_for_moderate_absorption() {
        let stack = LayerStack::new(real(1.0), Complex64::new(2.0, 0.02), real(1.5), 300e-9).unwrap();
        let theta = 0.6;
        let phi = phase_thickness(theta, stack.incident, stack.film, stack.thickness, PROBE_WAVELENGTH)
            .unwrap();
        assert!(phi.im > 0.0);
        for pol in Polarization::BOTH {
            let r12 = pol.coefficient(theta, stack.incident, stack.film).unwrap();
            let r23 = pol.coefficient(theta, stack.film, stack.substrate).unwrap();
            let delay = (Complex64::new(0.0, -2.0) * phi).exp();
            let direct = (r12 + r23 * delay) / (1.0 + r12 * r23 * delay);
            let r = stack.reflectance(pol, theta, PROBE_WAVELENGTH).unwrap();
            assert!((r - direct).norm() < 1e-12);
        }
    }
}

/// Computes the one-way phase accumulated across the film.
///
/// **Context**: Interference between the two reflected waves depends on the
/// optical path inside the film, which grows with thickness and index and
/// shrinks with the transmitted angle.
///
/// **How it Works**: `2 pi d n2 cos(theta_2) / lambda` with the complex
/// transmitted cosine from the incident medium `n1` into the film `n2`. For an
/// absorbing film (`k > 0`) the phase has a positive imaginary part, and the
/// round-trip factor `exp(-2i phi)` in [`three_layer_reflectance`] grows as
/// `exp(2 Im phi)`.
pub fn phase_thickness(
    theta: f64,
    n1: Complex64,
    n2: Complex64,
    d: f64,
    wavelength: f64,
) -> Result<Complex64, DomainError> {
    check_thickness(d)?;
    check_wavelength(wavelength)?;
    let ct2 = cos_theta_t(theta, n1, n2)?;
    Ok(2.0 * PI * d * n2 * ct2 / wavelength)
}

/// Computes the reflection coefficient of a three-layer stack.
///
/// **Context**: A thin film on a substrate reflects as a single effective
/// interface whose coefficient oscillates with thickness and angle.
///
/// **How it Works**: Takes the single-interface coefficients `r12` and `r23`
/// for the selected polarization, the film phase from [`phase_thickness`], and
/// combines them with the Airy formula. When the round-trip factor grows
/// (`Im phi > 0`) numerator and denominator are both divided by it, so thick
/// absorbing films converge to `1 / r12` instead of overflowing. A vanishing
/// denominator (critical coupling) is a [`DomainError`].
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use thinfilm::film::{three_layer_reflectance, PROBE_WAVELENGTH};
/// use thinfilm::fresnel::Polarization;
///
/// let air = Complex64::new(1.0, 0.0);
/// let film = Complex64::new(1.5, 0.0);
/// // half-wave film between equal media leaves no reflection
/// let d = PROBE_WAVELENGTH / (2.0 * 1.5);
/// let r = three_layer_reflectance(Polarization::S, 0.0, air, film, air, d, PROBE_WAVELENGTH).unwrap();
/// assert!(r.norm() < 1e-12);
/// ```
pub fn three_layer_reflectance(
    polarization: Polarization,
    theta: f64,
    n1: Complex64,
    n2: Complex64,
    n3: Complex64,
    d: f64,
    wavelength: f64,
) -> Result<Complex64, DomainError> {
    let phi = phase_thickness(theta, n1, n2, d, wavelength)?;
    let r12 = polarization.coefficient(theta, n1, n2)?;
    let r23 = polarization.coefficient(theta, n2, n3)?;

    if phi.im > 0.0 {
        let advance = (Complex64::new(0.0, 2.0) * phi).exp();
        checked_div(
            r12 * advance + r23,
            advance + r12 * r23,
            "three_layer_reflectance",
        )
    } else {
        let delay = (Complex64::new(0.0, -2.0) * phi).exp();
        checked_div(
            r12 + r23 * delay,
            1.0 + r12 * r23 * delay,
            "three_layer_reflectance",
        )
    }
}

/// Incident medium, film and substrate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    pub incident: Complex64,
    pub film: Complex64,
    pub substrate: Complex64,
    /// Film thickness in meters.
    pub thickness: f64,
}

impl LayerStack {
    /// Creates a stack, checking every index and the thickness.
    pub fn new(
        incident: Complex64,
        film: Complex64,
        substrate: Complex64,
        thickness: f64,
    ) -> Result<Self, DomainError> {
        check_index("incident", incident)?;
        check_index("film", film)?;
        check_index("substrate", substrate)?;
        check_thickness(thickness)?;
        Ok(Self {
            incident,
            film,
            substrate,
            thickness,
        })
    }

    /// Reflection coefficient of the stack for one polarization.
    pub fn reflectance(
        &self,
        polarization: Polarization,
        theta: f64,
        wavelength: f64,
    ) -> Result<Complex64, DomainError> {
        three_layer_reflectance(
            polarization,
            theta,
            self.incident,
            self.film,
            self.substrate,
            self.thickness,
            wavelength,
        )
    }

    /// Amplitude matrix `diag(r_p, r_s)` of the whole stack.
    pub fn reflection_matrix(
        &self,
        theta: f64,
        wavelength: f64,
    ) -> Result<Matrix2<Complex64>, DomainError> {
        let f11 = self.reflectance(Polarization::P, theta, wavelength)?;
        let f22 = self.reflectance(Polarization::S, theta, wavelength)?;
        Ok(Matrix2::from_diagonal(&Vector2::new(f11, f22)))
    }

    /// Intensity reflectance for unpolarized light, `(|r_p|^2 + |r_s|^2) / 2`.
    pub fn unpolarized_reflectance(&self, theta: f64, wavelength: f64) -> Result<f64, DomainError> {
        let m = self.reflection_matrix(theta, wavelength)?;
        Ok(0.5 * m.norm_squared())
    }
}
