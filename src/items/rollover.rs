use crate::core::item::{
    components, CalculationPass, Category, ComputableItem, GenerationProjection, ItemId,
    ItemValue, MultiPeriodProjection, OccupancyProfile, ProjectionTable, Reference, Subcategory,
};
use crate::core::series::CashFlowSeries;
use crate::core::timeline::{add_months, months_between};
use crate::engine::context::ContextView;
use crate::engine::error::EngineError;
use crate::items::annual_growth_factor;
use crate::items::lease::LeaseItem;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// What happens when the initial term expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationDisposition {
    /// Tenant renews at the contract face rate. No downtime.
    Renew,
    /// Space is re-leased at projected market rent; turnover downtime is
    /// weighted by the renewal probability.
    ReleaseAtMarket,
    /// Tenant leaves and the space goes dark for the rest of the analysis.
    Vacate,
    /// Tenant exercises a renewal option at the lesser of contract and
    /// market. No downtime.
    OptionExercise,
}

/// Renewal behavior for a rolling lease.
#[derive(Debug, Clone)]
pub struct RolloverPolicy {
    pub disposition: ExpirationDisposition,
    /// Probability the sitting tenant renews; weights turnover downtime.
    pub renewal_probability: Decimal,
    /// Market rent today, in dollars per square foot per year; grown by the
    /// global market rent growth rate to each generation's start.
    pub market_rent_psf: Decimal,
    pub renewal_term_months: u32,
    /// Months of downtime on a turnover (re-lease) event.
    pub downtime_months: u32,
}

/// A lease that carries a rollover policy.
///
/// The only kind of item whose "one evaluation" spans multiple future lease
/// generations: the orchestrator detects the projection capability and
/// drives [`MultiPeriodProjection::project`], decomposing the resulting
/// generation table into the same named-component shape as a plain lease.
/// The single-shot [`ComputableItem::evaluate`] remains the initial-term
/// view for direct callers.
#[derive(Debug, Clone)]
pub struct RolloverLeaseItem {
    lease: LeaseItem,
    policy: RolloverPolicy,
}

impl RolloverLeaseItem {
    /// # Panics
    ///
    /// Panics if the renewal probability is outside `[0, 1]` or the renewal
    /// term is zero.
    pub fn new(lease: LeaseItem, policy: RolloverPolicy) -> Self {
        assert!(
            policy.renewal_probability >= Decimal::ZERO
                && policy.renewal_probability <= Decimal::ONE,
            "renewal probability must be in [0, 1], got {}",
            policy.renewal_probability
        );
        assert!(
            policy.renewal_term_months > 0,
            "renewal term must be at least one month"
        );
        Self { lease, policy }
    }

    pub fn lease(&self) -> &LeaseItem {
        &self.lease
    }

    pub fn policy(&self) -> &RolloverPolicy {
        &self.policy
    }

    /// Rent per square foot per year for a generation starting at
    /// `years_out` years into the analysis.
    fn generation_rent_psf(&self, ctx: &ContextView<'_>, years_out: u32) -> Decimal {
        let growth = ctx.settings().market_rent_growth_pct;
        let market = self.policy.market_rent_psf * annual_growth_factor(growth, years_out);
        match self.policy.disposition {
            ExpirationDisposition::Renew => self.lease.annual_rent_psf(),
            ExpirationDisposition::ReleaseAtMarket => market,
            ExpirationDisposition::OptionExercise => self.lease.annual_rent_psf().min(market),
            ExpirationDisposition::Vacate => Decimal::ZERO,
        }
    }
}

impl ComputableItem for RolloverLeaseItem {
    fn id(&self) -> ItemId {
        self.lease.id()
    }

    fn name(&self) -> &str {
        self.lease.name()
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
        let end = match self.policy.disposition {
            ExpirationDisposition::Vacate => Some(self.lease.expiration()),
            _ => None, // keeps rolling through the analysis window
        };
        Some(OccupancyProfile {
            area: self.lease.area(),
            start: self.lease.start(),
            end,
        })
    }

    /// Initial-term view only; renewal generations come from the
    /// projection capability.
    fn evaluate(&self, ctx: &ContextView<'_>) -> Result<ItemValue, EngineError> {
        self.lease.evaluate(ctx)
    }

    fn projection(&self) -> Option<&dyn MultiPeriodProjection> {
        Some(self)
    }
}

impl MultiPeriodProjection for RolloverLeaseItem {
    fn project(&self, ctx: &ContextView<'_>) -> Result<ProjectionTable, EngineError> {
        let timeline = ctx.timeline();
        let mut generations = Vec::new();

        // Generation zero: the contract term as written.
        let mut initial = match self.lease.evaluate(ctx)? {
            ItemValue::Components(map) => map,
            ItemValue::Series(series) => {
                BTreeMap::from([(components::BASE_RENT.to_string(), series)])
            }
        };
        if self.policy.disposition == ExpirationDisposition::Vacate {
            // Recoveries stop with occupancy.
            if let Some(recoveries) = initial.get_mut(components::RECOVERIES) {
                *recoveries =
                    recoveries.windowed(self.lease.start(), self.lease.expiration());
            }
        }
        generations.push(GenerationProjection {
            label: "initial".into(),
            components: initial,
        });

        if self.policy.disposition == ExpirationDisposition::Vacate {
            return Ok(ProjectionTable { generations });
        }

        let area = self.lease.area();
        let renew_p = self.policy.renewal_probability;
        let mut gen_start = add_months(self.lease.expiration(), 1);
        let mut index = 1u32;

        while gen_start <= timeline.end() {
            let years_out = (months_between(timeline.start(), gen_start).max(0) / 12) as u32;
            let monthly_rent =
                area * self.generation_rent_psf(ctx, years_out) / Decimal::from(12);

            let mut base_rent = CashFlowSeries::new();
            let mut downtime_loss = CashFlowSeries::new();
            for offset in 0..self.policy.renewal_term_months {
                let period = add_months(gen_start, offset);
                if period > timeline.end() {
                    break;
                }
                let turnover_downtime = self.policy.disposition
                    == ExpirationDisposition::ReleaseAtMarket
                    && offset < self.policy.downtime_months;
                if turnover_downtime {
                    base_rent.set(period, monthly_rent * renew_p);
                    downtime_loss.set(period, monthly_rent * (Decimal::ONE - renew_p));
                } else {
                    base_rent.set(period, monthly_rent);
                }
            }

            let mut components_map = BTreeMap::new();
            components_map.insert(components::BASE_RENT.to_string(), base_rent);
            if !downtime_loss.is_empty() {
                components_map.insert(
                    components::TURNOVER_DOWNTIME_LOSS.to_string(),
                    downtime_loss,
                );
            }
            generations.push(GenerationProjection {
                label: format!("renewal-{index}"),
                components: components_map,
            });

            gen_start = add_months(gen_start, self.policy.renewal_term_months);
            index += 1;
        }

        Ok(ProjectionTable { generations })
    }
}
