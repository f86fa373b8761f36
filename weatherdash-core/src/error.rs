use thiserror::Error;

/// Arithmetic faults inside the AQI estimator.
///
/// These never leave [`crate::aqi::estimate`]; they are logged and replaced
/// by the default reading.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AqiError {
    #[error("{field} is not a finite number ({value})")]
    NonFiniteInput { field: &'static str, value: f64 },

    #[error("normalization domain for {field} is empty ({min}..{max})")]
    DegenerateDomain {
        field: &'static str,
        min: f64,
        max: f64,
    },
}
