//! Stress testing utilities for the projection engine.
//!
//! Generates random property portfolios to exercise full analyses at
//! volume. Runs are sequential and each constructs its own fresh context;
//! parallelism across runs is a host concern, not an engine capability.

use crate::core::property::{Property, Space};
use crate::core::settings::AnalysisSettings;
use crate::core::timeline::Timeline;
use crate::engine::aggregator::AggregateKey;
use crate::engine::error::EngineError;
use crate::scenario::registry::ScenarioRegistry;
use crate::scenario::AssetType;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for generating a random portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    /// Number of properties to generate.
    pub property_count: usize,
    /// Spaces per property.
    pub spaces_per_property: usize,
    /// Smallest space, in square feet.
    pub min_area: Decimal,
    /// Largest space, in square feet.
    pub max_area: Decimal,
    /// Lowest contract rent, $/sf/yr.
    pub min_rent_psf: Decimal,
    /// Highest contract rent, $/sf/yr.
    pub max_rent_psf: Decimal,
    /// Shortest and longest lease terms, in months.
    pub term_range_months: (u32, u32),
    /// Extra never-leased area as a fraction of leased area.
    pub vacant_ratio: Decimal,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            property_count: 10,
            spaces_per_property: 5,
            min_area: Decimal::from(1_000),
            max_area: Decimal::from(25_000),
            min_rent_psf: Decimal::from(18),
            max_rent_psf: Decimal::from(45),
            term_range_months: (24, 120),
            vacant_ratio: Decimal::new(10, 2), // 10% shell vacancy
        }
    }
}

/// Generate a random portfolio for stress testing.
pub fn generate_random_portfolio(config: &PortfolioConfig, timeline: &Timeline) -> Vec<Property> {
    let mut rng = rand::thread_rng();
    let mut portfolio = Vec::with_capacity(config.property_count);

    let min_area = decimal_to_f64(config.min_area, 1_000.0);
    let max_area = decimal_to_f64(config.max_area, 25_000.0);
    let min_rent = decimal_to_f64(config.min_rent_psf, 18.0);
    let max_rent = decimal_to_f64(config.max_rent_psf, 45.0);

    for p in 0..config.property_count {
        let mut spaces = Vec::with_capacity(config.spaces_per_property);
        let mut leased_area = Decimal::ZERO;

        for s in 0..config.spaces_per_property {
            let area = Decimal::from_f64_retain(rng.gen_range(min_area..max_area))
                .unwrap_or(Decimal::from(1_000))
                .round_dp(0);
            let rent = Decimal::from_f64_retain(rng.gen_range(min_rent..max_rent))
                .unwrap_or(Decimal::from(20))
                .round_dp(2);
            let term = rng.gen_range(config.term_range_months.0..=config.term_range_months.1);

            leased_area += area;
            spaces.push(Space {
                name: format!("SUITE-{:03}", s),
                area,
                annual_rent_psf: rent,
                lease_start: timeline.start(),
                lease_term_months: term,
            });
        }

        let nra = leased_area * (Decimal::ONE + config.vacant_ratio);
        let mut property = Property::new(format!("PROP-{:03}", p), nra.round_dp(0));
        for space in spaces {
            property = property.with_space(space);
        }
        portfolio.push(property);
    }

    portfolio
}

/// Headline results for one property in a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRunResult {
    pub property_name: String,
    pub potential_gross_revenue: Decimal,
    pub net_operating_income: Decimal,
    pub unlevered_cash_flow: Decimal,
}

/// Analyze every property in sequence, one fresh context per run.
///
/// Fail-fast like the engine itself: the first failing property aborts the
/// batch.
pub fn run_batch(
    properties: &[Property],
    timeline: &Timeline,
    settings: &AnalysisSettings,
    registry: &ScenarioRegistry,
) -> Result<Vec<BatchRunResult>, EngineError> {
    let builder = registry
        .get(AssetType::Office)
        .expect("batch runs use the office builder");

    let mut results = Vec::with_capacity(properties.len());
    for property in properties {
        let scenario = builder.build(property.clone(), timeline.clone(), settings.clone());
        let output = scenario.execute()?;
        results.push(BatchRunResult {
            property_name: property.name().to_string(),
            potential_gross_revenue: output
                .summary
                .total(AggregateKey::PotentialGrossRevenue),
            net_operating_income: output.summary.total(AggregateKey::NetOperatingIncome),
            unlevered_cash_flow: output.summary.total(AggregateKey::UnleveredCashFlow),
        });
    }
    Ok(results)
}

fn decimal_to_f64(value: Decimal, fallback: f64) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn timeline() -> Timeline {
        Timeline::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 12)
    }

    #[test]
    fn test_portfolio_generation() {
        let config = PortfolioConfig {
            property_count: 4,
            spaces_per_property: 3,
            ..Default::default()
        };
        let portfolio = generate_random_portfolio(&config, &timeline());
        assert_eq!(portfolio.len(), 4);
        for property in &portfolio {
            assert_eq!(property.spaces().len(), 3);
            // Shell vacancy keeps NRA above leased area.
            assert!(property.net_rentable_area() >= property.leased_area());
        }
    }

    #[test]
    fn test_batch_run_produces_one_result_per_property() {
        let config = PortfolioConfig {
            property_count: 3,
            spaces_per_property: 2,
            ..Default::default()
        };
        let timeline = timeline();
        let portfolio = generate_random_portfolio(&config, &timeline);
        let registry = ScenarioRegistry::with_defaults();
        let settings = AnalysisSettings::default().with_operating_expense_psf(dec!(8));

        let results = run_batch(&portfolio, &timeline, &settings, &registry).unwrap();
        assert_eq!(results.len(), 3);
        for result in &results {
            assert!(result.potential_gross_revenue > Decimal::ZERO);
            assert!(result.net_operating_income < result.potential_gross_revenue);
        }
    }
}
