use num_complex::Complex64;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use thinfilm::{
    domain::{self, DomainError},
    film::{self, PROBE_WAVELENGTH},
    fresnel::{self, Polarization},
    sweep::{ErrorPolicy, Sweep},
};

fn to_py_err(err: DomainError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_polarization(pol: &str) -> PyResult<Polarization> {
    pol.parse::<Polarization>().map_err(PyValueError::new_err)
}

/// Fresnel s-polarization reflection coefficient.
#[pyfunction]
fn r_s(theta: f64, n1: Complex64, n2: Complex64) -> PyResult<Complex64> {
    fresnel::reflection_s(theta, n1, n2).map_err(to_py_err)
}

/// Fresnel p-polarization reflection coefficient.
#[pyfunction]
fn r_p(theta: f64, n1: Complex64, n2: Complex64) -> PyResult<Complex64> {
    fresnel::reflection_p(theta, n1, n2).map_err(to_py_err)
}

/// One-way phase accumulated across a film of thickness `d`.
#[pyfunction]
#[pyo3(signature = (theta, n1, n2, d, wavelength=PROBE_WAVELENGTH))]
fn phi(theta: f64, n1: Complex64, n2: Complex64, d: f64, wavelength: f64) -> PyResult<Complex64> {
    film::phase_thickness(theta, n1, n2, d, wavelength).map_err(to_py_err)
}

/// Reflection coefficient of an incident medium / film / substrate stack.
#[pyfunction]
#[pyo3(signature = (pol, theta, n1, n2, n3, d, wavelength=PROBE_WAVELENGTH))]
fn three_layer_r(
    pol: &str,
    theta: f64,
    n1: Complex64,
    n2: Complex64,
    n3: Complex64,
    d: f64,
    wavelength: f64,
) -> PyResult<Complex64> {
    let pol = parse_polarization(pol)?;
    film::three_layer_reflectance(pol, theta, n1, n2, n3, d, wavelength).map_err(to_py_err)
}

/// Evaluates a stack at every angle in `thetas`. Angles that fail come back as
/// NaN so the result lines up with the input. An invalid wavelength or stack
/// raises `ValueError`.
#[pyfunction]
#[pyo3(signature = (pol, thetas, n1, n2, n3, d, wavelength=PROBE_WAVELENGTH))]
fn sweep(
    py: Python<'_>,
    pol: &str,
    thetas: Vec<f64>,
    n1: Complex64,
    n2: Complex64,
    n3: Complex64,
    d: f64,
    wavelength: f64,
) -> PyResult<Vec<Complex64>> {
    let pol = parse_polarization(pol)?;
    domain::check_wavelength(wavelength).map_err(to_py_err)?;
    let stack = film::LayerStack::new(n1, n2, n3, d).map_err(to_py_err)?;
    let result = py
        .allow_threads(|| Sweep::evaluate(&stack, pol, &thetas, wavelength, ErrorPolicy::Nan))
        .map_err(to_py_err)?;
    Ok(result.coefficients.to_vec())
}

/// A Python module implemented in Rust.
#[pymodule]
fn _thinfilm_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("PROBE_WAVELENGTH", PROBE_WAVELENGTH)?;
    m.add_function(wrap_pyfunction!(r_s, m)?)?;
    m.add_function(wrap_pyfunction!(r_p, m)?)?;
    m.add_function(wrap_pyfunction!(phi, m)?)?;
    m.add_function(wrap_pyfunction!(three_layer_r, m)?)?;
    m.add_function(wrap_pyfunction!(sweep, m)?)?;
    Ok(())
}
