use crate::core::item::{
    CalculationPass, Category, ComputableItem, ItemId, ItemValue, Subcategory,
};
use crate::core::series::CashFlowSeries;
use crate::engine::context::ContextView;
use crate::engine::error::EngineError;
use rust_decimal::Decimal;

/// Miscellaneous income: parking, signage, storage, antenna licenses.
/// A flat monthly amount over the analysis window.
#[derive(Debug, Clone)]
pub struct MiscIncomeItem {
    id: ItemId,
    name: String,
    monthly_amount: Decimal,
}

impl MiscIncomeItem {
    pub fn new(name: impl Into<String>, monthly_amount: Decimal) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            monthly_amount,
        }
    }
}

impl ComputableItem for MiscIncomeItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Revenue
    }

    fn subcategory(&self) -> Subcategory {
        Subcategory::MiscIncome
    }

    fn calculation_pass(&self) -> CalculationPass {
        CalculationPass::IndependentValues
    }

    fn evaluate(&self, ctx: &ContextView<'_>) -> Result<ItemValue, EngineError> {
        Ok(ItemValue::Series(CashFlowSeries::constant(
            ctx.timeline().periods(),
            self.monthly_amount,
        )))
    }
}
