//! Snell's law for complex refractive indices.
//!
//! The Fresnel coefficients and the thin-film phase only ever need the cosine
//! of the transmitted angle, never the angle itself. Working with the complex
//! cosine directly handles absorbing media and total internal reflection with
//! the same expression:
//!
//! ```text
//! cos(theta_t) = sqrt(1 - (n1 / n2 * sin(theta_i))^2)
//! ```
//!
//! The root is taken on the principal branch (see
//! [`principal_sqrt`](crate::domain::principal_sqrt)), so beyond the critical
//! angle the cosine is purely imaginary with a positive imaginary part and the
//! transmitted field decays away from the interface.

use num_complex::Complex64;

use crate::domain::{check_angle, check_index, principal_sqrt, DomainError};

#[cfg(test)]
mod tests {

    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn normal_incidence_same_media() {
        let m1 = Complex64::new(1.0, 0.0);
        let ct = cos_theta_t(0.0, m1, m1).unwrap();
        assert!((ct - Complex64::new(1.0, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn normal_incidence() {
        let m1 = Complex64::new(1.0, 0.0);
        let m2 = Complex64::new(1.31, 0.0);
        let ct = cos_theta_t(0.0, m1, m2).unwrap();
        assert_eq!(ct, Complex64::new(1.0, 0.0));
    }

    #[test]
    fn angle30_incidence() {
        let theta_i = 30.0 * PI / 180.0;
        let m1 = Complex64::new(1.0, 0.0);
        let m2 = Complex64::new(1.31, 0.0);
        let ct = cos_theta_t(theta_i, m1, m2).unwrap();
        // theta_t = asin(0.5 / 1.31)
        let abs_difference = (ct.re - 0.3916126_f64.cos()).abs();
        assert!(abs_difference < 1e-6);
        assert!(ct.im.abs() < 1e-15);
    }

    #[test]
    fn total_internal_reflection_is_evanescent() {
        let m1 = Complex64::new(1.5, 0.0);
        let m2 = Complex64::new(1.0, 0.0);
        for theta_i in [0.8, 1.0, 1.2, -1.0] {
            let ct = cos_theta_t(theta_i, m1, m2).unwrap();
            assert!(ct.re.abs() < 1e-15, "ct: {}", ct);
            assert!(ct.im > 0.0, "ct: {}", ct);
        }
    }

    #[test]
    fn absorbing_medium_on_principal_branch() {
        let m1 = Complex64::new(1.0, 0.0);
        let m2 = Complex64::new(1.5, 0.1);
        let ct = cos_theta_t(1.17773, m1, m2).unwrap();
        assert!(ct.re > 0.0);
        // the squared cosine must still satisfy Snell's law
        let st = m1 / m2 * 1.17773_f64.sin();
        assert!((ct * ct + st * st - 1.0).norm() < 1e-12);
    }

    #[test]
    fn critical_angles() {
        let glass = Complex64::new(1.5, 0.0);
        let air = Complex64::new(1.0, 0.0);
        let theta_c = critical_angle(glass, air).unwrap();
        assert!((theta_c - (1.0_f64 / 1.5).asin()).abs() < 1e-15);
        assert_eq!(critical_angle(air, glass), None);
        assert_eq!(critical_angle(glass, Complex64::new(1.0, 0.01)), None);
    }
}

/// Computes the complex cosine of the transmitted angle at an interface.
///
/// **Context**: For absorbing media or beyond the critical angle the
/// transmitted "angle" is complex and has no useful real value. The
/// coefficient formulas only need its cosine, which stays well defined.
///
/// **How it Works**: Applies Snell's law to get `sin(theta_t)` and takes the
/// principal square root of `1 - sin^2(theta_t)`.
///
/// # Example
/// ```rust
/// use num_complex::Complex64;
/// use thinfilm::snell::cos_theta_t;
///
/// let ct = cos_theta_t(0.0, Complex64::new(1.0, 0.0), Complex64::new(1.5, 0.0)).unwrap();
/// assert_eq!(ct, Complex64::new(1.0, 0.0));
/// ```
pub fn cos_theta_t(theta_i: f64, n1: Complex64, n2: Complex64) -> Result<Complex64, DomainError> {
    check_angle(theta_i)?;
    check_index("n1", n1)?;
    check_index("n2", n2)?;

    let sin_t = n1 / n2 * theta_i.sin();
    Ok(principal_sqrt(1.0 - sin_t * sin_t))
}

/// Critical angle for total internal reflection, if one exists.
///
/// Only defined for lossless media going from the denser to the rarer one.
pub fn critical_angle(n1: Complex64, n2: Complex64) -> Option<f64> {
    if n1.im != 0.0 || n2.im != 0.0 || n1.re <= n2.re || n2.re <= 0.0 {
        return None;
    }
    Some((n2.re / n1.re).asin())
}
