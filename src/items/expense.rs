use crate::core::item::{
    CalculationPass, Category, ComputableItem, ItemId, ItemValue, Reference, Subcategory,
};
use crate::core::series::CashFlowSeries;
use crate::core::timeline::months_between;
use crate::engine::aggregator::AggregateKey;
use crate::engine::context::ContextView;
use crate::engine::error::EngineError;
use crate::items::annual_growth_factor;
use rust_decimal::Decimal;

/// How an operating expense line derives its amount.
#[derive(Debug, Clone)]
pub enum ExpenseBasis {
    /// Dollars per square foot of net rentable area per year, inflated by
    /// the global expense inflation rate.
    AnnualPerSquareFoot(Decimal),
    /// A flat monthly amount.
    FixedMonthly(Decimal),
    /// A percentage of another item's computed total (a management fee on a
    /// specific lease's collections). Same-run dependency: resolves through
    /// the dependency graph.
    PercentOfItem { item: ItemId, pct: Decimal },
    /// A percentage of an aggregate line (an admin fee at 5% of Total
    /// Operating Expenses). Reads the aggregate from the context; never a
    /// graph edge, so it cannot form a cycle with the items it sums over.
    PercentOfAggregate { aggregate: AggregateKey, pct: Decimal },
}

/// An operating expense line.
///
/// Per-square-foot and fixed bases are self-contained and run in the
/// independent pass; percent-of bases run in the dependent pass with the
/// corresponding declared reference.
#[derive(Debug, Clone)]
pub struct ExpenseItem {
    id: ItemId,
    name: String,
    basis: ExpenseBasis,
    occupancy_sensitive: bool,
}

impl ExpenseItem {
    pub fn new(name: impl Into<String>, basis: ExpenseBasis) -> Self {
        Self::with_id(ItemId::new(), name, basis)
    }

    /// Create an expense with a specific id (useful when wiring mutual
    /// references up front, or for deterministic tests).
    pub fn with_id(id: ItemId, name: impl Into<String>, basis: ExpenseBasis) -> Self {
        Self {
            id,
            name: name.into(),
            basis,
            occupancy_sensitive: false,
        }
    }

    /// Scale the expense by the derived occupancy-rate series (variable
    /// expenses that track how full the building is).
    pub fn with_occupancy_sensitivity(mut self) -> Self {
        self.occupancy_sensitive = true;
        self
    }

    pub fn basis(&self) -> &ExpenseBasis {
        &self.basis
    }

    fn apply_occupancy(
        &self,
        series: CashFlowSeries,
        ctx: &ContextView<'_>,
    ) -> CashFlowSeries {
        if !self.occupancy_sensitive {
            return series;
        }
        let Some(occupancy) = ctx.occupancy_rate() else {
            return series;
        };
        ctx.timeline()
            .periods()
            .iter()
            .zip(occupancy)
            .map(|(period, rate)| {
                let factor = Decimal::from_f64_retain(*rate).unwrap_or(Decimal::ONE);
                (*period, series.value_at(*period) * factor)
            })
            .collect()
    }
}

impl ComputableItem for ExpenseItem {
    fn id(&self) -> ItemId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::Expense
    }

    fn subcategory(&self) -> Subcategory {
        Subcategory::OperatingExpense
    }

    fn reference(&self) -> Reference {
        match &self.basis {
            ExpenseBasis::PercentOfItem { item, .. } => Reference::Item(*item),
            ExpenseBasis::PercentOfAggregate { aggregate, .. } => {
                Reference::Aggregate(*aggregate)
            }
            _ => Reference::None,
        }
    }

    fn calculation_pass(&self) -> CalculationPass {
        match self.basis {
            ExpenseBasis::AnnualPerSquareFoot(_) | ExpenseBasis::FixedMonthly(_) => {
                CalculationPass::IndependentValues
            }
            ExpenseBasis::PercentOfItem { .. } | ExpenseBasis::PercentOfAggregate { .. } => {
                CalculationPass::DependentValues
            }
        }
    }

    fn evaluate(&self, ctx: &ContextView<'_>) -> Result<ItemValue, EngineError> {
        let timeline = ctx.timeline();
        let series = match &self.basis {
            ExpenseBasis::AnnualPerSquareFoot(psf) => {
                let nra = ctx.property().net_rentable_area();
                let monthly = nra * psf / Decimal::from(12);
                let inflation = ctx.settings().expense_inflation_pct;
                let start = timeline.start();
                let base: CashFlowSeries = timeline
                    .periods()
                    .iter()
                    .map(|p| {
                        let years = (months_between(start, *p) / 12) as u32;
                        (*p, monthly * annual_growth_factor(inflation, years))
                    })
                    .collect();
                self.apply_occupancy(base, ctx)
            }
            ExpenseBasis::FixedMonthly(amount) => {
                let base = CashFlowSeries::constant(timeline.periods(), *amount);
                self.apply_occupancy(base, ctx)
            }
            ExpenseBasis::PercentOfItem { item, pct } => ctx.item_total(*item)?.scale(*pct),
            ExpenseBasis::PercentOfAggregate { aggregate, pct } => {
                ctx.aggregate(*aggregate).scale(*pct)
            }
        };
        Ok(ItemValue::Series(series))
    }
}
