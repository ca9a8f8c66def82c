use crate::core::property::Property;
use crate::core::settings::AnalysisSettings;
use crate::core::timeline::Timeline;
use crate::items::expense::{ExpenseBasis, ExpenseItem};
use crate::items::lease::LeaseItem;
use crate::items::loss::{CollectionLossItem, GeneralVacancyLossItem};
use crate::scenario::{AssetType, Scenario};
use std::collections::HashMap;

/// Builds the model set for one asset class.
pub trait ScenarioBuilder {
    fn asset_type(&self) -> AssetType;

    /// Assemble a scenario from the asset inputs.
    fn build(
        &self,
        property: Property,
        timeline: Timeline,
        settings: AnalysisSettings,
    ) -> Scenario;
}

/// Explicit registry mapping asset types to scenario builders.
///
/// Constructed once at process start with explicit `register` calls — there
/// is no import-time side channel and no runtime subclass walking. Lookups
/// are by asset type tag.
///
/// # Examples
///
/// ```
/// use proforma_engine::scenario::registry::ScenarioRegistry;
/// use proforma_engine::scenario::AssetType;
///
/// let registry = ScenarioRegistry::with_defaults();
/// assert!(registry.get(AssetType::Office).is_some());
/// assert!(registry.get(AssetType::Retail).is_none());
/// ```
#[derive(Default)]
pub struct ScenarioRegistry {
    builders: HashMap<AssetType, Box<dyn ScenarioBuilder>>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the stock builders registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(OfficeScenarioBuilder));
        registry
    }

    /// Register a builder for its asset type. A later registration for the
    /// same type replaces the earlier one.
    pub fn register(&mut self, builder: Box<dyn ScenarioBuilder>) {
        self.builders.insert(builder.asset_type(), builder);
    }

    pub fn get(&self, asset_type: AssetType) -> Option<&dyn ScenarioBuilder> {
        self.builders.get(&asset_type).map(|b| b.as_ref())
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

/// Stock office scenario: one lease per rent-roll space, a base operating
/// expense line when the settings carry one, and sequential vacancy and
/// collection losses when those assumptions are set.
pub struct OfficeScenarioBuilder;

impl ScenarioBuilder for OfficeScenarioBuilder {
    fn asset_type(&self) -> AssetType {
        AssetType::Office
    }

    fn build(
        &self,
        property: Property,
        timeline: Timeline,
        settings: AnalysisSettings,
    ) -> Scenario {
        let mut scenario = Scenario::new(
            format!("{} (office)", property.name()),
            AssetType::Office,
            timeline,
            settings.clone(),
            property.clone(),
        );

        for space in property.spaces() {
            scenario.add_item(LeaseItem::new(
                space.name.clone(),
                space.area,
                space.annual_rent_psf,
                space.lease_start,
                space.lease_term_months,
            ));
        }

        if let Some(psf) = settings.operating_expense_psf {
            scenario.add_item(ExpenseItem::new(
                "Operating Expenses",
                ExpenseBasis::AnnualPerSquareFoot(psf),
            ));
        }

        // Vacancy before collection: collection loss reads the vacancy
        // snapshot, and ties resolve in assembly order.
        if let Some(pct) = settings.general_vacancy_pct {
            scenario.add_item(GeneralVacancyLossItem::new("General Vacancy", pct));
        }
        if let Some(pct) = settings.collection_loss_pct {
            scenario.add_item(CollectionLossItem::new("Collection Loss", pct));
        }

        scenario
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::property::Space;
    use crate::engine::aggregator::AggregateKey;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn sample_property() -> Property {
        Property::new("100 Main", dec!(10_000)).with_space(Space {
            name: "Suite 100".into(),
            area: dec!(10_000),
            annual_rent_psf: dec!(30),
            lease_start: d(2026, 1),
            lease_term_months: 60,
        })
    }

    #[test]
    fn test_office_builder_assembles_and_runs() {
        let registry = ScenarioRegistry::with_defaults();
        let builder = registry.get(AssetType::Office).unwrap();

        let settings = AnalysisSettings::default()
            .with_operating_expense_psf(dec!(8))
            .with_general_vacancy(dec!(0.03));
        let scenario = builder.build(sample_property(), Timeline::new(d(2026, 1), 12), settings);

        // One lease, one expense line, one loss item.
        assert_eq!(scenario.items().len(), 3);

        let output = scenario.execute().unwrap();
        assert_eq!(
            output
                .summary
                .value_at(AggregateKey::PotentialGrossRevenue, d(2026, 1)),
            dec!(25_000)
        );
        assert!(
            output.summary.total(AggregateKey::GeneralVacancyLoss)
                > rust_decimal::Decimal::ZERO
        );
    }

    #[test]
    fn test_registration_replaces() {
        let mut registry = ScenarioRegistry::new();
        assert!(registry.is_empty());
        registry.register(Box::new(OfficeScenarioBuilder));
        registry.register(Box::new(OfficeScenarioBuilder));
        assert_eq!(registry.len(), 1);
    }
}
