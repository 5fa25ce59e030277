use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{LogNormal, Normal, Triangular, Uniform};

use crate::error::PsaModelError;
use crate::monte_carlo::factors::{PeriodFactors, TrialFactors};
use crate::PsaModelResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Distribution of a multiplicative perturbation factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FactorDistribution {
    Normal { mean: f64, std_dev: f64 },
    LogNormal { mu: f64, sigma: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Uniform { min: f64, max: f64 },
    Fixed { value: f64 },
}

impl Default for FactorDistribution {
    fn default() -> Self {
        FactorDistribution::Normal {
            mean: 1.0,
            std_dev: 0.1,
        }
    }
}

/// One distribution per perturbed input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorDistributions {
    pub price: FactorDistribution,
    pub production: FactorDistribution,
    pub capital_expenditure: FactorDistribution,
    pub unit_operating_cost: FactorDistribution,
}

/// Monte Carlo run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    #[serde(default = "default_num_trials")]
    pub num_trials: u32,
    /// Optional seed for reproducibility.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Worker threads; `None` uses one per available core.
    #[serde(default)]
    pub workers: Option<usize>,
    /// Trials handed to a worker at a time.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default)]
    pub factors: FactorDistributions,
}

fn default_num_trials() -> u32 {
    1_000
}

fn default_batch_size() -> usize {
    64
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_trials: default_num_trials(),
            seed: None,
            workers: None,
            batch_size: default_batch_size(),
            factors: FactorDistributions::default(),
        }
    }
}

impl MonteCarloConfig {
    pub fn validate(&self) -> PsaModelResult<()> {
        if self.num_trials == 0 {
            return Err(PsaModelError::InvalidInput {
                field: "num_trials".into(),
                reason: "Must be at least 1".into(),
            });
        }
        if self.batch_size == 0 {
            return Err(PsaModelError::InvalidInput {
                field: "batch_size".into(),
                reason: "Must be at least 1".into(),
            });
        }
        if self.workers == Some(0) {
            return Err(PsaModelError::InvalidInput {
                field: "workers".into(),
                reason: "Must be at least 1 when set".into(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

/// Distribution with validated parameters, ready to draw from.
enum Sampler {
    Normal(Normal),
    LogNormal(LogNormal),
    Triangular(Triangular),
    Uniform(Uniform),
    Fixed(f64),
}

impl Sampler {
    fn new(field: &str, dist: &FactorDistribution) -> PsaModelResult<Self> {
        Ok(match dist {
            FactorDistribution::Normal { mean, std_dev } => Sampler::Normal(
                Normal::new(*mean, *std_dev).map_err(|e| invalid_params(field, "Normal", e))?,
            ),
            FactorDistribution::LogNormal { mu, sigma } => Sampler::LogNormal(
                LogNormal::new(*mu, *sigma).map_err(|e| invalid_params(field, "LogNormal", e))?,
            ),
            FactorDistribution::Triangular { min, mode, max } => Sampler::Triangular(
                Triangular::new(*min, *max, *mode)
                    .map_err(|e| invalid_params(field, "Triangular", e))?,
            ),
            FactorDistribution::Uniform { min, max } => Sampler::Uniform(
                Uniform::new(*min, *max).map_err(|e| invalid_params(field, "Uniform", e))?,
            ),
            FactorDistribution::Fixed { value } => {
                if !value.is_finite() {
                    return Err(PsaModelError::InvalidInput {
                        field: format!("factors.{field}"),
                        reason: format!("Fixed factor must be finite, got {value}"),
                    });
                }
                Sampler::Fixed(*value)
            }
        })
    }

    fn draw(&self, rng: &mut StdRng) -> f64 {
        match self {
            Sampler::Normal(d) => rng.sample(d),
            Sampler::LogNormal(d) => rng.sample(d),
            Sampler::Triangular(d) => rng.sample(d),
            Sampler::Uniform(d) => rng.sample(d),
            Sampler::Fixed(v) => *v,
        }
    }
}

fn invalid_params(field: &str, kind: &str, e: impl std::fmt::Display) -> PsaModelError {
    PsaModelError::InvalidInput {
        field: format!("factors.{field}"),
        reason: format!("Invalid {kind} parameters: {e}"),
    }
}

/// Draw `config.num_trials` factor sets for a horizon of `num_periods`.
///
/// Each trial draws its price factor first, then production, capex and unit
/// opex factors period by period. With a seed the draws are reproducible.
pub fn sample_trial_factors(
    config: &MonteCarloConfig,
    num_periods: usize,
) -> PsaModelResult<Vec<TrialFactors>> {
    config.validate()?;

    let f = &config.factors;
    let price = Sampler::new("price", &f.price)?;
    let production = Sampler::new("production", &f.production)?;
    let capex = Sampler::new("capital_expenditure", &f.capital_expenditure)?;
    let opex = Sampler::new("unit_operating_cost", &f.unit_operating_cost)?;

    let mut rng = match config.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let trials = (0..config.num_trials as usize)
        .map(|trial_id| {
            let price = price.draw(&mut rng);
            let periods = (0..num_periods)
                .map(|_| PeriodFactors {
                    production: production.draw(&mut rng),
                    capital_expenditure: capex.draw(&mut rng),
                    unit_operating_cost: opex.draw(&mut rng),
                })
                .collect();
            TrialFactors {
                trial_id,
                price,
                periods,
            }
        })
        .collect();

    Ok(trials)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(num_trials: u32, seed: u64) -> MonteCarloConfig {
        MonteCarloConfig {
            num_trials,
            seed: Some(seed),
            ..MonteCarloConfig::default()
        }
    }

    #[test]
    fn test_shape() {
        let trials = sample_trial_factors(&seeded(25, 1), 19).unwrap();
        assert_eq!(trials.len(), 25);
        assert!(trials.iter().all(|t| t.periods.len() == 19));
        let ids: Vec<usize> = trials.iter().map(|t| t.trial_id).collect();
        assert_eq!(ids, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_seed_reproducible() {
        let a = sample_trial_factors(&seeded(10, 42), 5).unwrap();
        let b = sample_trial_factors(&seeded(10, 42), 5).unwrap();
        let c = sample_trial_factors(&seeded(10, 43), 5).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_default_factors_centred_on_one() {
        let trials = sample_trial_factors(&seeded(2_000, 7), 1).unwrap();
        let mean = trials.iter().map(|t| t.price).sum::<f64>() / trials.len() as f64;
        assert!((mean - 1.0).abs() < 0.02, "mean price factor {mean}");
    }

    #[test]
    fn test_fixed_factors() {
        let config = MonteCarloConfig {
            num_trials: 3,
            seed: Some(0),
            factors: FactorDistributions {
                price: FactorDistribution::Fixed { value: 1.2 },
                production: FactorDistribution::Fixed { value: 1.0 },
                capital_expenditure: FactorDistribution::Fixed { value: 0.9 },
                unit_operating_cost: FactorDistribution::Fixed { value: 1.1 },
            },
            ..MonteCarloConfig::default()
        };
        let trials = sample_trial_factors(&config, 2).unwrap();
        for t in &trials {
            assert_eq!(t.price, 1.2);
            assert_eq!(
                t.periods,
                vec![
                    PeriodFactors {
                        production: 1.0,
                        capital_expenditure: 0.9,
                        unit_operating_cost: 1.1
                    };
                    2
                ]
            );
        }
    }

    #[test]
    fn test_uniform_bounds() {
        let config = MonteCarloConfig {
            num_trials: 200,
            seed: Some(3),
            factors: FactorDistributions {
                price: FactorDistribution::Uniform { min: 0.5, max: 1.5 },
                ..FactorDistributions::default()
            },
            ..MonteCarloConfig::default()
        };
        let trials = sample_trial_factors(&config, 0).unwrap();
        assert!(trials.iter().all(|t| (0.5..=1.5).contains(&t.price)));
    }

    #[test]
    fn test_invalid_distribution_rejected() {
        let config = MonteCarloConfig {
            num_trials: 1,
            factors: FactorDistributions {
                production: FactorDistribution::Normal {
                    mean: 1.0,
                    std_dev: -1.0,
                },
                ..FactorDistributions::default()
            },
            ..MonteCarloConfig::default()
        };
        let err = sample_trial_factors(&config, 3).unwrap_err();
        assert!(err.to_string().contains("factors.production"));
    }

    #[test]
    fn test_zero_trials_rejected() {
        assert!(sample_trial_factors(&seeded(0, 1), 3).is_err());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: MonteCarloConfig = serde_json::from_str(
            r#"{ "seed": 9, "factors": { "price": { "type": "Triangular", "min": 0.7, "mode": 1.0, "max": 1.4 } } }"#,
        )
        .unwrap();
        assert_eq!(config.num_trials, 1_000);
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.seed, Some(9));
        assert_eq!(
            config.factors.price,
            FactorDistribution::Triangular { min: 0.7, mode: 1.0, max: 1.4 }
        );
        assert_eq!(config.factors.production, FactorDistribution::default());
    }
}
