//! Fresnel reflection coefficients for single interfaces and three-layer
//! thin-film stacks, with parallel angle sweeps for reflectance measurements.
//!
//! The numeric core ([`snell`], [`fresnel`], [`film`]) is made of pure scalar
//! functions that fail only with a [`domain::DomainError`]. [`sweep`] evaluates
//! them over angle grids; [`settings`], [`problem`] and [`output`] drive a
//! sweep from a configuration file and write the results.

pub mod domain;
pub mod film;
pub mod fresnel;
pub mod output;
pub mod problem;
pub mod settings;
pub mod snell;
pub mod sweep;
