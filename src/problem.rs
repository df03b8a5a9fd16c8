//! Reflectance sweep driven by runtime settings.
//!
//! A [`Problem`] owns the settings, the validated [`LayerStack`] built from
//! them, and one [`SweepResult`] per requested polarization once solved.

use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    film::LayerStack,
    output,
    settings::Settings,
    sweep::{Sweep, SweepResult},
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fresnel::Polarization;
    use crate::settings::load_default_config;
    use crate::sweep::AngleGrid;

    #[test]
    fn solve_default_settings() {
        let mut settings = load_default_config().unwrap();
        settings.angles = AngleGrid::new(0.0, 60.0, 13).unwrap();
        let mut problem = Problem::new(settings).unwrap();
        problem.solve().unwrap();

        assert_eq!(problem.results.len(), 2);
        assert_eq!(problem.results[0].polarization, Polarization::S);
        assert_eq!(problem.results[1].polarization, Polarization::P);
        for result in &problem.results {
            assert_eq!(result.len(), 13);
        }
        // s and p agree at normal incidence up to sign
        let rs = problem.results[0].coefficients[0];
        let rp = problem.results[1].coefficients[0];
        assert!((rs + rp).norm() < 1e-12);
    }

    #[test]
    fn invalid_stack_is_rejected() {
        let mut settings = load_default_config().unwrap();
        settings.thickness = -1.0;
        assert!(Problem::new(settings).is_err());
    }

    #[test]
    fn solve_is_repeatable() {
        let mut settings = load_default_config().unwrap();
        settings.angles = AngleGrid::new(0.0, 45.0, 4).unwrap();
        let mut problem = Problem::new(settings).unwrap();
        problem.solve().unwrap();
        let first = problem.results.clone();
        problem.solve().unwrap();
        assert_eq!(first, problem.results);
    }
}

/// A solvable reflectance sweep.
#[derive(Debug, Clone)]
pub struct Problem {
    pub settings: Settings,         // runtime settings
    pub stack: LayerStack,          // stack built from the settings
    pub results: Vec<SweepResult>,  // one per polarization, in settings order
}

impl Problem {
    /// Creates a problem, validating the stack described by `settings`.
    pub fn new(settings: Settings) -> Result<Self> {
        let stack = settings.layer_stack()?;
        Ok(Self {
            settings,
            stack,
            results: Vec::new(),
        })
    }

    /// Sweeps every requested polarization over the configured angle grid.
    ///
    /// **Context**: Each polarization is measured separately, so each gets
    /// its own sweep over the same grid.
    ///
    /// **How it Works**: Clears previous results and runs [`Sweep::run`] for
    /// each polarization with the configured error policy. Failures and
    /// flagged coefficients are reported in the log.
    pub fn solve(&mut self) -> Result<()> {
        let start = Instant::now();
        info!("Solving problem...");

        self.results.clear();
        for &polarization in &self.settings.polarizations {
            let result = Sweep::run(
                &self.stack,
                polarization,
                &self.settings.angles,
                self.settings.wavelength,
                self.settings.error_policy,
            )
            .with_context(|| format!("{}-polarized sweep failed", polarization))?;

            if !result.failures.is_empty() {
                warn!(
                    "{}-polarized sweep: {} of {} angles failed",
                    polarization,
                    result.failures.len(),
                    self.settings.angles.num
                );
            }
            if !result.flagged.is_empty() {
                warn!(
                    "{}-polarized sweep: {} coefficients with |r| > 1",
                    polarization,
                    result.flagged.len()
                );
            }
            if let Some((theta, reflectance)) = result.minimum() {
                info!(
                    "{}-polarized minimum reflectance {:.6e} at {:.4} deg",
                    polarization,
                    reflectance,
                    theta.to_degrees()
                );
            }

            self.results.push(result);
        }

        let duration = start.elapsed();
        info!("Time taken: {:.2?}", duration);

        Ok(())
    }

    /// Writes the sweep tables, summary and settings snapshot.
    pub fn writeup(&self) -> Result<()> {
        output::writeup(&self.settings, &self.stack, &self.results)
    }
}
