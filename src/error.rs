use std::fmt;

/// Errors raised before any computation starts. A solver never returns a
/// partial result alongside one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum SoilError {
    /// Scalar argument is NaN or infinite
    NonFinite { name: &'static str, value: f64 },
    /// Scalar argument must be strictly greater than zero
    NotPositive { name: &'static str, value: f64 },
    /// Scalar argument must be zero or greater
    Negative { name: &'static str, value: f64 },
    /// Temperature profile has no internal nodes
    EmptyProfile,
    /// Diffusion solve asked for zero time steps
    ZeroSteps,
    /// Precipitation and evapotranspiration series differ in length
    LengthMismatch { precip: usize, eto: usize },
    /// Entry of an input series is NaN, infinite or negative
    InvalidSeriesValue {
        name: &'static str,
        index: usize,
        value: f64,
    },
    /// Requires 0 < wilting point < field capacity < 1
    FractionOrder {
        wilting_point: f64,
        field_capacity: f64,
    },
    /// Failed to read a parameter file
    LoadFailed(String),
    /// Failed to parse TOML contents
    ParseFailed(String),
    /// Soil texture not present in the table (and no fallback available)
    UnknownSoil(String),
}

impl fmt::Display for SoilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoilError::NonFinite { name, value } => {
                write!(f, "{name} must be finite, got {value}")
            }
            SoilError::NotPositive { name, value } => {
                write!(f, "{name} must be positive, got {value}")
            }
            SoilError::Negative { name, value } => {
                write!(f, "{name} must be non-negative, got {value}")
            }
            SoilError::EmptyProfile => write!(f, "temperature profile is empty"),
            SoilError::ZeroSteps => write!(f, "at least one time step is required"),
            SoilError::LengthMismatch { precip, eto } => write!(
                f,
                "precipitation length {precip} does not match evapotranspiration length {eto}"
            ),
            SoilError::InvalidSeriesValue { name, index, value } => {
                write!(f, "{name}[{index}] is invalid: {value}")
            }
            SoilError::FractionOrder {
                wilting_point,
                field_capacity,
            } => write!(
                f,
                "expected 0 < wilting point ({wilting_point}) < \
                 field capacity ({field_capacity}) < 1"
            ),
            SoilError::LoadFailed(msg) => write!(f, "Failed to load: {msg}"),
            SoilError::ParseFailed(msg) => write!(f, "Failed to parse: {msg}"),
            SoilError::UnknownSoil(name) => write!(f, "Unknown soil texture '{name}'"),
        }
    }
}

impl std::error::Error for SoilError {}

pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<f64, SoilError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SoilError::NonFinite { name, value })
    }
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, SoilError> {
    require_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(SoilError::NotPositive { name, value })
    }
}

pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<f64, SoilError> {
    require_finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(SoilError::Negative { name, value })
    }
}

// Every entry must be finite and >= 0
pub(crate) fn require_series(name: &'static str, values: &[f64]) -> Result<(), SoilError> {
    match values
        .iter()
        .enumerate()
        .find(|&(_, v)| !v.is_finite() || *v < 0.0)
    {
        Some((index, &value)) => Err(SoilError::InvalidSeriesValue { name, index, value }),
        None => Ok(()),
    }
}
