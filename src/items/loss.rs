use crate::core::item::{
    CalculationPass, Category, ComputableItem, ItemId, ItemValue, Reference, Subcategory,
};
use crate::engine::aggregator::AggregateKey;
use crate::engine::context::ContextView;
use crate::engine::error::EngineError;
use rust_decimal::Decimal;

/// General vacancy loss: a percentage of potential gross revenue.
///
/// Runs in the dependent pass and reads the revenue aggregate as a
/// snapshot of the lease results cached by the independent pass. The
/// aggregate reference never becomes a graph edge, so summing over the
/// leases that produced it is not a cycle.
#[derive(Debug, Clone)]
pub struct GeneralVacancyLossItem {
    id: ItemId,
    name: String,
    pct: Decimal,
}

impl GeneralVacancyLossItem {
    pub fn new(name: impl Into<String>, pct: Decimal) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            pct,
        }
    }
}

impl ComputableItem for GeneralVacancyLossItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Loss
    }

    fn subcategory(&self) -> Subcategory {
        Subcategory::Vacancy
    }

    fn reference(&self) -> Reference {
        Reference::Aggregate(AggregateKey::PotentialGrossRevenue)
    }

    fn calculation_pass(&self) -> CalculationPass {
        CalculationPass::DependentValues
    }

    fn evaluate(&self, ctx: &ContextView<'_>) -> Result<ItemValue, EngineError> {
        let revenue = ctx.aggregate(AggregateKey::PotentialGrossRevenue);
        Ok(ItemValue::Series(revenue.scale(self.pct)))
    }
}

/// Collection loss: a percentage of revenue net of vacancy.
///
/// Applied sequentially after general vacancy — assemble this item after
/// the vacancy item so the resolver's stable input-order tie-break runs it
/// second and its vacancy snapshot is populated.
#[derive(Debug, Clone)]
pub struct CollectionLossItem {
    id: ItemId,
    name: String,
    pct: Decimal,
}

impl CollectionLossItem {
    pub fn new(name: impl Into<String>, pct: Decimal) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            pct,
        }
    }
}

impl ComputableItem for CollectionLossItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Loss
    }

    fn subcategory(&self) -> Subcategory {
        Subcategory::Collection
    }

    fn reference(&self) -> Reference {
        Reference::Aggregate(AggregateKey::PotentialGrossRevenue)
    }

    fn calculation_pass(&self) -> CalculationPass {
        CalculationPass::DependentValues
    }

    fn evaluate(&self, ctx: &ContextView<'_>) -> Result<ItemValue, EngineError> {
        let mut collectible = ctx.aggregate(AggregateKey::PotentialGrossRevenue);
        collectible.subtract_series(&ctx.aggregate(AggregateKey::GeneralVacancyLoss));
        Ok(ItemValue::Series(collectible.scale(self.pct)))
    }
}
