use crate::core::item::{Category, ItemMeta, ItemValue, Subcategory};
use crate::core::series::CashFlowSeries;
use crate::core::timeline::Timeline;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of canonical summary lines — the chart of accounts for an
/// analysis and the engine's de facto API surface.
///
/// External callers read final results exclusively by these names, and a
/// cross-referencing item (an admin fee at 5% of Total Operating Expenses)
/// uses the same key to read the aggregate as if it were just another
/// computable value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AggregateKey {
    PotentialGrossRevenue,
    RentalAbatement,
    ExpenseReimbursements,
    MiscellaneousIncome,
    GeneralVacancyLoss,
    CollectionLoss,
    TotalEffectiveGrossIncome,
    TotalOperatingExpenses,
    NetOperatingIncome,
    TotalCapitalExpenditures,
    TotalTenantImprovements,
    TotalLeasingCommissions,
    UnleveredCashFlow,
}

impl AggregateKey {
    /// Every aggregate line, in presentation order.
    pub const ALL: [AggregateKey; 13] = [
        AggregateKey::PotentialGrossRevenue,
        AggregateKey::RentalAbatement,
        AggregateKey::GeneralVacancyLoss,
        AggregateKey::CollectionLoss,
        AggregateKey::ExpenseReimbursements,
        AggregateKey::MiscellaneousIncome,
        AggregateKey::TotalEffectiveGrossIncome,
        AggregateKey::TotalOperatingExpenses,
        AggregateKey::NetOperatingIncome,
        AggregateKey::TotalCapitalExpenditures,
        AggregateKey::TotalTenantImprovements,
        AggregateKey::TotalLeasingCommissions,
        AggregateKey::UnleveredCashFlow,
    ];

    /// Stable identifier used in lookups and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateKey::PotentialGrossRevenue => "potential_gross_revenue",
            AggregateKey::RentalAbatement => "rental_abatement",
            AggregateKey::ExpenseReimbursements => "expense_reimbursements",
            AggregateKey::MiscellaneousIncome => "miscellaneous_income",
            AggregateKey::GeneralVacancyLoss => "general_vacancy_loss",
            AggregateKey::CollectionLoss => "collection_loss",
            AggregateKey::TotalEffectiveGrossIncome => "total_effective_gross_income",
            AggregateKey::TotalOperatingExpenses => "total_operating_expenses",
            AggregateKey::NetOperatingIncome => "net_operating_income",
            AggregateKey::TotalCapitalExpenditures => "total_capital_expenditures",
            AggregateKey::TotalTenantImprovements => "total_tenant_improvements",
            AggregateKey::TotalLeasingCommissions => "total_leasing_commissions",
            AggregateKey::UnleveredCashFlow => "unlevered_cash_flow",
        }
    }

    /// Parse a stable identifier back into a key.
    pub fn parse(s: &str) -> Option<AggregateKey> {
        AggregateKey::ALL.iter().copied().find(|k| k.as_str() == s)
    }
}

impl fmt::Display for AggregateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Route a single-series result to its aggregate line.
///
/// The table is fixed: there is no runtime extension point, and a result
/// with no entry here contributes to no aggregate.
pub fn route_series(category: Category, subcategory: Subcategory) -> Option<AggregateKey> {
    match (category, subcategory) {
        (Category::Revenue, Subcategory::Lease) => Some(AggregateKey::PotentialGrossRevenue),
        (Category::Revenue, Subcategory::MiscIncome) => Some(AggregateKey::MiscellaneousIncome),
        (Category::Expense, Subcategory::OperatingExpense) => {
            Some(AggregateKey::TotalOperatingExpenses)
        }
        (Category::Capital, Subcategory::CapitalExpenditure) => {
            Some(AggregateKey::TotalCapitalExpenditures)
        }
        (Category::Capital, Subcategory::TenantImprovements) => {
            Some(AggregateKey::TotalTenantImprovements)
        }
        (Category::Capital, Subcategory::LeasingCommissions) => {
            Some(AggregateKey::TotalLeasingCommissions)
        }
        (Category::Loss, Subcategory::Vacancy) => Some(AggregateKey::GeneralVacancyLoss),
        (Category::Loss, Subcategory::Collection) => Some(AggregateKey::CollectionLoss),
        _ => None,
    }
}

/// Route one named component of a component-record result.
pub fn route_component(
    category: Category,
    subcategory: Subcategory,
    component: &str,
) -> Option<AggregateKey> {
    use crate::core::item::components;
    match (category, subcategory, component) {
        (Category::Revenue, Subcategory::Lease, components::BASE_RENT) => {
            Some(AggregateKey::PotentialGrossRevenue)
        }
        (Category::Revenue, Subcategory::Lease, components::RECOVERIES) => {
            Some(AggregateKey::ExpenseReimbursements)
        }
        (Category::Revenue, Subcategory::Lease, components::ABATEMENT) => {
            Some(AggregateKey::RentalAbatement)
        }
        _ => None,
    }
}

/// One routed (or intentionally unrouted) component retained for
/// drill-down. Never used for arithmetic — inspection only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailRecord {
    pub item: ItemMeta,
    /// Component name for component-record results; `None` for a single
    /// series.
    pub component: Option<String>,
    /// The aggregate line this series was added into, or `None` when no
    /// routing rule matched (excluded from every aggregate by design).
    pub target: Option<AggregateKey>,
    /// The raw series as the item produced it, before reindexing.
    pub series: CashFlowSeries,
}

/// The summary table: one series per aggregate line, every series spanning
/// the full run timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryTable {
    timeline: Timeline,
    lines: BTreeMap<AggregateKey, CashFlowSeries>,
}

impl SummaryTable {
    /// A table with every line zero-filled over the timeline.
    pub fn zeroed(timeline: &Timeline) -> Self {
        Self {
            timeline: timeline.clone(),
            lines: AggregateKey::ALL
                .iter()
                .map(|k| (*k, CashFlowSeries::zero(timeline)))
                .collect(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The series for one aggregate line. Every enumerated line is present.
    pub fn line(&self, key: AggregateKey) -> &CashFlowSeries {
        &self.lines[&key]
    }

    /// One line's value in one period.
    pub fn value_at(&self, key: AggregateKey, period: NaiveDate) -> Decimal {
        self.line(key).value_at(period)
    }

    /// One line's total across the timeline.
    pub fn total(&self, key: AggregateKey) -> Decimal {
        self.line(key).total()
    }

    fn line_mut(&mut self, key: AggregateKey) -> &mut CashFlowSeries {
        self.lines.get_mut(&key).expect("all lines are initialized")
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Analysis Summary ({}) ===", self.timeline)?;
        for key in AggregateKey::ALL {
            writeln!(f, "{:<32} {:>18}", key.as_str(), self.total(key).round_dp(2))?;
        }
        Ok(())
    }
}

/// Reduces every cached per-item result into the canonical aggregate lines
/// plus a detail record for drill-down.
pub struct Aggregator;

impl Aggregator {
    /// Run the full reduction.
    ///
    /// Routing happens first: each single series goes to at most one line by
    /// (category, subcategory); each named component goes independently by
    /// (category, subcategory, component). Every routed series is reindexed
    /// onto the run timeline before it is added. Derived lines are then
    /// computed by fixed formula, in fixed order.
    pub fn aggregate(
        entries: &[(&ItemMeta, &ItemValue)],
        timeline: &Timeline,
    ) -> (SummaryTable, Vec<DetailRecord>) {
        let mut summary = SummaryTable::zeroed(timeline);
        let mut detail = Vec::new();

        for (meta, value) in entries {
            match value {
                ItemValue::Series(series) => {
                    let target = route_series(meta.category, meta.subcategory);
                    Self::apply(&mut summary, timeline, target, series);
                    if target.is_none() {
                        log::debug!(
                            "item '{}' ({:?}/{:?}) has no aggregate routing; detail only",
                            meta.name,
                            meta.category,
                            meta.subcategory
                        );
                    }
                    detail.push(DetailRecord {
                        item: (*meta).clone(),
                        component: None,
                        target,
                        series: series.clone(),
                    });
                }
                ItemValue::Components(map) => {
                    for (component, series) in map {
                        let target =
                            route_component(meta.category, meta.subcategory, component);
                        Self::apply(&mut summary, timeline, target, series);
                        if target.is_none() {
                            log::debug!(
                                "component '{}' of item '{}' has no aggregate routing; detail only",
                                component,
                                meta.name
                            );
                        }
                        detail.push(DetailRecord {
                            item: (*meta).clone(),
                            component: Some(component.clone()),
                            target,
                            series: series.clone(),
                        });
                    }
                }
            }
        }

        Self::compute_derived(&mut summary);
        (summary, detail)
    }

    /// Compute a single aggregate line from the given entries, without
    /// producing detail output. Used for in-run snapshots when a dependent
    /// item references an aggregate before the aggregation pass has run.
    pub fn snapshot_line(
        entries: &[(&ItemMeta, &ItemValue)],
        timeline: &Timeline,
        key: AggregateKey,
    ) -> CashFlowSeries {
        let (summary, _) = Self::aggregate(entries, timeline);
        summary.line(key).clone()
    }

    fn apply(
        summary: &mut SummaryTable,
        timeline: &Timeline,
        target: Option<AggregateKey>,
        series: &CashFlowSeries,
    ) {
        if let Some(key) = target {
            let reindexed = series.reindexed(timeline);
            summary.line_mut(key).add_assign_series(&reindexed);
        }
    }

    /// Derived lines, after all routing, in this order and no other:
    /// effective gross income, then net operating income, then unlevered
    /// cash flow. Always recomputed from the routed lines, never from a
    /// cached shortcut.
    fn compute_derived(summary: &mut SummaryTable) {
        let mut egi = summary.line(AggregateKey::PotentialGrossRevenue).clone();
        egi.subtract_series(summary.line(AggregateKey::GeneralVacancyLoss));
        egi.subtract_series(summary.line(AggregateKey::CollectionLoss));
        egi.subtract_series(summary.line(AggregateKey::RentalAbatement));
        egi.add_assign_series(summary.line(AggregateKey::MiscellaneousIncome));
        egi.add_assign_series(summary.line(AggregateKey::ExpenseReimbursements));
        *summary.line_mut(AggregateKey::TotalEffectiveGrossIncome) = egi;

        let mut noi = summary
            .line(AggregateKey::TotalEffectiveGrossIncome)
            .clone();
        noi.subtract_series(summary.line(AggregateKey::TotalOperatingExpenses));
        *summary.line_mut(AggregateKey::NetOperatingIncome) = noi;

        let mut ucf = summary.line(AggregateKey::NetOperatingIncome).clone();
        ucf.subtract_series(summary.line(AggregateKey::TotalCapitalExpenditures));
        ucf.subtract_series(summary.line(AggregateKey::TotalTenantImprovements));
        ucf.subtract_series(summary.line(AggregateKey::TotalLeasingCommissions));
        *summary.line_mut(AggregateKey::UnleveredCashFlow) = ucf;
    }
}
