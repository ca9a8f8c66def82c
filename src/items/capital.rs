use crate::core::item::{
    CalculationPass, Category, ComputableItem, ItemId, ItemValue, Subcategory,
};
use crate::core::series::CashFlowSeries;
use crate::core::timeline::{add_months, month_of};
use crate::engine::context::ContextView;
use crate::engine::error::EngineError;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Which capital aggregate a capital item rolls up into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapitalKind {
    CapitalExpenditure,
    TenantImprovements,
    LeasingCommissions,
}

/// A capital outlay: a one-time amount, optionally spread evenly over a
/// number of months starting at `date`.
#[derive(Debug, Clone)]
pub struct CapitalItem {
    id: ItemId,
    name: String,
    kind: CapitalKind,
    amount: Decimal,
    date: NaiveDate,
    spread_months: u32,
}

impl CapitalItem {
    /// # Panics
    ///
    /// Panics if `amount` is negative.
    pub fn new(
        name: impl Into<String>,
        kind: CapitalKind,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        assert!(
            amount >= Decimal::ZERO,
            "capital amount must not be negative, got {amount}"
        );
        Self {
            id: ItemId::new(),
            name: name.into(),
            kind,
            amount,
            date: month_of(date),
            spread_months: 1,
        }
    }

    /// Spread the amount evenly across this many months.
    pub fn spread_over(mut self, months: u32) -> Self {
        assert!(months > 0, "spread must cover at least one month");
        self.spread_months = months;
        self
    }

    pub fn kind(&self) -> CapitalKind {
        self.kind
    }
}

impl ComputableItem for CapitalItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Capital
    }

    fn subcategory(&self) -> Subcategory {
        match self.kind {
            CapitalKind::CapitalExpenditure => Subcategory::CapitalExpenditure,
            CapitalKind::TenantImprovements => Subcategory::TenantImprovements,
            CapitalKind::LeasingCommissions => Subcategory::LeasingCommissions,
        }
    }

    fn calculation_pass(&self) -> CalculationPass {
        CalculationPass::IndependentValues
    }

    fn evaluate(&self, _ctx: &ContextView<'_>) -> Result<ItemValue, EngineError> {
        let monthly = self.amount / Decimal::from(self.spread_months);
        let series: CashFlowSeries = (0..self.spread_months)
            .map(|i| (add_months(self.date, i), monthly))
            .collect();
        Ok(ItemValue::Series(series))
    }
}
