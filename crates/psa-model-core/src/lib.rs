pub mod error;
pub mod evaluation;
pub mod kpi;
pub mod projection;
pub mod scenario;
pub mod time_value;
pub mod types;

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;

pub use error::PsaModelError;
pub use types::*;

/// Standard result type for all PSA model computations
pub type PsaModelResult<T> = Result<T, PsaModelError>;
