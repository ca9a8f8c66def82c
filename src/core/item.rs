use crate::core::series::CashFlowSeries;
use crate::engine::aggregator::AggregateKey;
use crate::engine::context::ContextView;
use crate::engine::error::EngineError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Process-unique identifier for a computable item, stable for the lifetime
/// of one analysis run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Top-level classification of a cash flow line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Revenue,
    Expense,
    Capital,
    Loss,
}

/// Second-level classification; together with [`Category`] it routes a
/// result to its aggregate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subcategory {
    Lease,
    OperatingExpense,
    CapitalExpenditure,
    TenantImprovements,
    LeasingCommissions,
    MiscIncome,
    Vacancy,
    Collection,
}

/// Coarse-grained execution bucket for an item.
///
/// Independent items have no same-run dependency; dependent items may
/// reference a peer in the same run (but not cyclically) or an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationPass {
    IndependentValues,
    DependentValues,
}

/// An item's declared dependency, resolved by pattern match.
///
/// `Item` references become graph edges when the target runs in the same
/// pass. `Aggregate` references never become edges — the referenced line is
/// read from the context at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reference {
    None,
    Item(ItemId),
    Aggregate(AggregateKey),
}

/// Well-known component names emitted by lease-like items.
///
/// Components route to aggregate lines by
/// (category, subcategory, component); a component with no routing rule is
/// retained in the detail output and excluded from every aggregate.
pub mod components {
    pub const BASE_RENT: &str = "base_rent";
    pub const RECOVERIES: &str = "recoveries";
    pub const ABATEMENT: &str = "abatement";
    /// Rent foregone during projected turnover downtime. Diagnostic only:
    /// the projected `base_rent` already excludes downtime, so this
    /// component has no aggregate routing.
    pub const TURNOVER_DOWNTIME_LOSS: &str = "turnover_downtime_loss";
}

/// The result of evaluating one item: either a single series or a record of
/// named component series (a lease's base rent / recoveries / abatement
/// breakdown).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemValue {
    Series(CashFlowSeries),
    Components(BTreeMap<String, CashFlowSeries>),
}

impl ItemValue {
    /// Collapse to a single series, summing components.
    pub fn to_series(&self) -> CashFlowSeries {
        match self {
            ItemValue::Series(s) => s.clone(),
            ItemValue::Components(map) => {
                let mut out = CashFlowSeries::new();
                for series in map.values() {
                    out.add_assign_series(series);
                }
                out
            }
        }
    }
}

/// A lease-like item's claim on floor area over a date window, the input to
/// the occupancy-rate pre-pass. An absent `end` means the claim runs
/// through the end of the analysis (a lease projected to keep rolling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyProfile {
    pub area: Decimal,
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl OccupancyProfile {
    /// Whether the profile occupies area during the month of `period`.
    pub fn occupies(&self, period: NaiveDate) -> bool {
        period >= crate::core::timeline::month_of(self.start)
            && self
                .end
                .map_or(true, |end| period <= crate::core::timeline::month_of(end))
    }
}

/// Per-item auxiliary state for expense recovery, precomputed by the
/// scenario before execution and read by the item during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryState {
    /// Tenant's share of the recoverable pool (typically area / NRA).
    pub pro_rata_share: Decimal,
    /// Fraction of the share actually recovered (1 = fully net lease).
    pub recovery_pct: Decimal,
    /// The recoverable expense pool the share applies to.
    pub expense_pool: CashFlowSeries,
}

impl RecoveryState {
    /// The reimbursement series this state produces.
    pub fn reimbursement(&self) -> CashFlowSeries {
        self.expense_pool
            .scale(self.pro_rata_share * self.recovery_pct)
    }
}

/// One cash-flow-producing line: a lease, an expense, a capital outlay, a
/// misc income stream.
///
/// Identity and classification are immutable after construction. The
/// computed value is produced exactly once per analysis run and cached by
/// the orchestrator; evaluation reads the shared context and must never
/// mutate it (the context is handed in as a read-only view).
pub trait ComputableItem {
    fn id(&self) -> ItemId;

    /// Human-readable name, used in error messages and the detail output.
    fn name(&self) -> &str;

    fn category(&self) -> Category;

    fn subcategory(&self) -> Subcategory;

    /// Declared dependency. Defaults to none (self-contained item).
    fn reference(&self) -> Reference {
        Reference::None
    }

    fn calculation_pass(&self) -> CalculationPass;

    /// Produce this item's per-period value(s).
    fn evaluate(&self, ctx: &ContextView<'_>) -> Result<ItemValue, EngineError>;

    /// Area claim for the occupancy pre-pass; `None` for items that do not
    /// occupy space.
    fn occupancy(&self) -> Option<OccupancyProfile> {
        None
    }

    /// Multi-period projection capability. Items whose expiration
    /// disposition spans future lease generations return `Some`; the
    /// orchestrator then drives [`MultiPeriodProjection::project`] instead
    /// of [`ComputableItem::evaluate`].
    fn projection(&self) -> Option<&dyn MultiPeriodProjection> {
        None
    }
}

/// Projection over possibly-renewed future lease generations.
pub trait MultiPeriodProjection {
    fn project(&self, ctx: &ContextView<'_>) -> Result<ProjectionTable, EngineError>;
}

/// Named component series for one projected lease generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationProjection {
    /// Generation label ("initial", "renewal-1", ...).
    pub label: String,
    pub components: BTreeMap<String, CashFlowSeries>,
}

/// The table a multi-period projection produces: one entry per lease
/// generation, each with named component series.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectionTable {
    pub generations: Vec<GenerationProjection>,
}

impl ProjectionTable {
    /// Decompose the table into the uniform named-component result shape,
    /// summing each component across generations. Pure data transform; the
    /// aggregator then treats rolling and non-rolling items identically.
    pub fn into_components(self) -> BTreeMap<String, CashFlowSeries> {
        let mut merged: BTreeMap<String, CashFlowSeries> = BTreeMap::new();
        for generation in self.generations {
            for (name, series) in generation.components {
                merged
                    .entry(name)
                    .or_insert_with(CashFlowSeries::new)
                    .add_assign_series(&series);
            }
        }
        merged
    }
}

/// Identity and classification captured when a result is recorded, so the
/// aggregator can route results without holding the items themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMeta {
    pub id: ItemId,
    pub name: String,
    pub category: Category,
    pub subcategory: Subcategory,
}

impl ItemMeta {
    pub fn of(item: &dyn ComputableItem) -> Self {
        Self {
            id: item.id(),
            name: item.name().to_string(),
            category: item.category(),
            subcategory: item.subcategory(),
        }
    }
}
