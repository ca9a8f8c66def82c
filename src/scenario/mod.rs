//! The scenario façade: assembles the model set for an asset, owns the
//! orchestrator invocation, and exposes the final summary to callers.

pub mod registry;

use crate::core::item::{ComputableItem, ItemId, RecoveryState};
use crate::core::property::Property;
use crate::core::series::CashFlowSeries;
use crate::core::settings::AnalysisSettings;
use crate::core::timeline::{months_between, Timeline};
use crate::engine::context::AnalysisContext;
use crate::engine::error::EngineError;
use crate::engine::orchestrator::{AnalysisOutput, Orchestrator};
use crate::items::annual_growth_factor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Asset classes the scenario registry can dispatch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Office,
    Retail,
    Industrial,
}

/// One analysis of one asset: the item list, the inputs, and the engine
/// invocation.
///
/// The scenario owns the computable items and the orchestrator; `execute`
/// builds a fresh context every time, so repeated executions share no state
/// (batch callers may run many scenarios side by side).
pub struct Scenario {
    name: String,
    asset_type: AssetType,
    timeline: Timeline,
    settings: AnalysisSettings,
    property: Property,
    items: Vec<Box<dyn ComputableItem>>,
    recovery_states: HashMap<ItemId, RecoveryState>,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        asset_type: AssetType,
        timeline: Timeline,
        settings: AnalysisSettings,
        property: Property,
    ) -> Self {
        Self {
            name: name.into(),
            asset_type,
            timeline,
            settings,
            property,
            items: Vec::new(),
            recovery_states: HashMap::new(),
        }
    }

    /// Add an item to the model set. Assembly order matters for items whose
    /// evaluation reads aggregate snapshots: the resolver breaks ties by
    /// input order (general vacancy before collection loss).
    pub fn add_item(&mut self, item: impl ComputableItem + 'static) -> ItemId {
        let id = item.id();
        self.items.push(Box::new(item));
        id
    }

    /// Attach precomputed recovery state for a lease-like item.
    pub fn set_recovery_state(&mut self, id: ItemId, state: RecoveryState) {
        self.recovery_states.insert(id, state);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    pub fn items(&self) -> &[Box<dyn ComputableItem>] {
        &self.items
    }

    /// Run the full analysis: fresh context, four phases, summary + detail.
    pub fn execute(&self) -> Result<AnalysisOutput, EngineError> {
        log::debug!(
            "executing scenario '{}' ({} items over {})",
            self.name,
            self.items.len(),
            self.timeline
        );
        let context = AnalysisContext::new(
            self.timeline.clone(),
            self.settings.clone(),
            self.property.clone(),
            self.recovery_states.clone(),
        );
        let mut orchestrator = Orchestrator::new(context);
        orchestrator.run(&self.items)
    }
}

/// Precompute the recoverable expense pool a recovery state divides among
/// tenants: net rentable area times the annual rate, inflated annually,
/// over the full timeline.
pub fn recoverable_expense_pool(
    timeline: &Timeline,
    net_rentable_area: Decimal,
    annual_psf: Decimal,
    inflation_pct: Decimal,
) -> CashFlowSeries {
    let monthly = net_rentable_area * annual_psf / Decimal::from(12);
    let start = timeline.start();
    timeline
        .periods()
        .iter()
        .map(|p| {
            let years = (months_between(start, *p) / 12) as u32;
            (*p, monthly * annual_growth_factor(inflation_pct, years))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregator::AggregateKey;
    use crate::items::expense::{ExpenseBasis, ExpenseItem};
    use crate::items::lease::LeaseItem;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_execute_produces_summary() {
        let timeline = Timeline::new(d(2026, 1), 3);
        let mut scenario = Scenario::new(
            "Single tenant",
            AssetType::Office,
            timeline,
            AnalysisSettings::default(),
            Property::new("100 Main", dec!(5_000)),
        );
        scenario.add_item(LeaseItem::new("Suite 100", dec!(5_000), dec!(30), d(2026, 1), 60));

        let output = scenario.execute().unwrap();
        assert_eq!(
            output
                .summary
                .value_at(AggregateKey::PotentialGrossRevenue, d(2026, 1)),
            dec!(12_500)
        );
    }

    #[test]
    fn test_repeated_execution_shares_no_state() {
        let timeline = Timeline::new(d(2026, 1), 3);
        let mut scenario = Scenario::new(
            "Repeat",
            AssetType::Office,
            timeline,
            AnalysisSettings::default(),
            Property::new("100 Main", dec!(5_000)),
        );
        scenario.add_item(ExpenseItem::new(
            "Base OpEx",
            ExpenseBasis::AnnualPerSquareFoot(dec!(8)),
        ));

        let first = scenario.execute().unwrap();
        let second = scenario.execute().unwrap();
        assert_eq!(
            first.summary.total(AggregateKey::TotalOperatingExpenses),
            second.summary.total(AggregateKey::TotalOperatingExpenses)
        );
    }

    #[test]
    fn test_recoverable_expense_pool() {
        let timeline = Timeline::new(d(2026, 1), 3);
        let pool = recoverable_expense_pool(&timeline, dec!(20_000), dec!(8), Decimal::ZERO);
        assert_eq!(pool.value_at(d(2026, 1)).round_dp(2), dec!(13_333.33));
    }
}
