use crate::core::item::{
    components, CalculationPass, Category, ComputableItem, ItemId, ItemValue, OccupancyProfile,
    Reference, Subcategory,
};
use crate::core::series::CashFlowSeries;
use crate::core::timeline::{add_months, month_of, months_between, Timeline};
use crate::engine::context::ContextView;
use crate::engine::error::EngineError;
use crate::items::annual_growth_factor;
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A contract lease on a defined area: the workhorse revenue item.
///
/// Evaluation produces a named-component record — `base_rent`, `abatement`
/// (free rent, as a positive magnitude) and `recoveries` (expense
/// reimbursements from the item's precomputed recovery state). Potential
/// gross revenue carries the full contract rent; abatement is netted out of
/// effective income downstream, by the aggregator's fixed formula.
///
/// # Examples
///
/// ```
/// use proforma_engine::items::lease::LeaseItem;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let lease = LeaseItem::new(
///     "Suite 100",
///     dec!(5_000),
///     dec!(30),
///     NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
///     60,
/// );
/// // 5,000 sq ft at $30/sf/yr = $12,500/month.
/// assert_eq!(lease.monthly_rent_at_start(), dec!(12_500));
/// ```
#[derive(Debug, Clone)]
pub struct LeaseItem {
    id: ItemId,
    name: String,
    area: Decimal,
    annual_rent_psf: Decimal,
    start: NaiveDate,
    term_months: u32,
    abatement_months: u32,
    escalation_pct: Decimal,
}

impl LeaseItem {
    /// Create a lease.
    ///
    /// # Panics
    ///
    /// Panics if `area` is not positive or `term_months` is zero.
    pub fn new(
        name: impl Into<String>,
        area: Decimal,
        annual_rent_psf: Decimal,
        start: NaiveDate,
        term_months: u32,
    ) -> Self {
        assert!(area > Decimal::ZERO, "lease area must be positive, got {area}");
        assert!(term_months > 0, "lease term must be at least one month");
        Self {
            id: ItemId::new(),
            name: name.into(),
            area,
            annual_rent_psf,
            start: month_of(start),
            term_months,
            abatement_months: 0,
            escalation_pct: Decimal::ZERO,
        }
    }

    /// Free rent at the head of the term.
    pub fn with_abatement(mut self, months: u32) -> Self {
        self.abatement_months = months;
        self
    }

    /// Annual rent escalation applied on each lease anniversary.
    pub fn with_escalation(mut self, pct: Decimal) -> Self {
        self.escalation_pct = pct;
        self
    }

    pub fn area(&self) -> Decimal {
        self.area
    }

    pub fn annual_rent_psf(&self) -> Decimal {
        self.annual_rent_psf
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Last month of the term.
    pub fn expiration(&self) -> NaiveDate {
        add_months(self.start, self.term_months - 1)
    }

    /// Contract rent per month in the first lease year.
    pub fn monthly_rent_at_start(&self) -> Decimal {
        self.area * self.annual_rent_psf / Decimal::from(12)
    }

    /// Contract rent for every timeline period inside the term, escalated
    /// on lease anniversaries.
    pub fn base_rent_series(&self, timeline: &Timeline) -> CashFlowSeries {
        let expiration = self.expiration();
        let base = self.monthly_rent_at_start();
        timeline
            .periods()
            .iter()
            .filter(|p| **p >= self.start && **p <= expiration)
            .map(|p| {
                let years = (months_between(self.start, *p) / 12) as u32;
                (*p, base * annual_growth_factor(self.escalation_pct, years))
            })
            .collect()
    }

    fn abatement_series(&self, timeline: &Timeline) -> CashFlowSeries {
        if self.abatement_months == 0 {
            return CashFlowSeries::new();
        }
        let window_end = add_months(self.start, self.abatement_months - 1);
        self.base_rent_series(timeline).windowed(self.start, window_end)
    }
}

impl ComputableItem for LeaseItem {
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
        Subcategory::Lease
    }

    fn reference(&self) -> Reference {
        Reference::None
    }

    fn calculation_pass(&self) -> CalculationPass {
        CalculationPass::IndependentValues
    }

    fn occupancy(&self) -> Option<OccupancyProfile> {
        Some(OccupancyProfile {
            area: self.area,
            start: self.start,
            end: Some(self.expiration()),
        })
    }

    fn evaluate(&self, ctx: &ContextView<'_>) -> Result<ItemValue, EngineError> {
        let timeline = ctx.timeline();
        let mut map = std::collections::BTreeMap::new();
        map.insert(
            components::BASE_RENT.to_string(),
            self.base_rent_series(timeline),
        );

        let abatement = self.abatement_series(timeline);
        if !abatement.is_empty() {
            map.insert(components::ABATEMENT.to_string(), abatement);
        }

        if let Some(state) = ctx.recovery_state(self.id) {
            map.insert(
                components::RECOVERIES.to_string(),
                state.reimbursement().reindexed(timeline),
            );
        }

        Ok(ItemValue::Components(map))
    }
}
