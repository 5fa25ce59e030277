use serde::{Deserialize, Serialize};

/// Monetary values in $ thousand.
pub type Money = f64;

/// Rates expressed as decimals (0.12 = 12%). Never as percentages.
pub type Rate = f64;

/// Production volumes in thousand barrels.
pub type Volume = f64;

/// A party to the production-sharing agreement, or the project as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stakeholder {
    Ioc,
    State,
    Project,
}

impl Stakeholder {
    pub const ALL: [Stakeholder; 3] = [Stakeholder::Ioc, Stakeholder::State, Stakeholder::Project];

    pub fn label(&self) -> &'static str {
        match self {
            Stakeholder::Ioc => "IOC",
            Stakeholder::State => "State",
            Stakeholder::Project => "Project",
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}
