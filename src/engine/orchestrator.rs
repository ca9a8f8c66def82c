use crate::core::item::{
    CalculationPass, ComputableItem, ItemId, ItemMeta, ItemValue, Reference,
};
use crate::engine::aggregator::{AggregateKey, Aggregator, DetailRecord, SummaryTable};
use crate::engine::context::{AnalysisContext, LookupKey};
use crate::engine::error::EngineError;
use crate::engine::resolver::resolve_order;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The orchestrator's position in its fixed phase sequence.
///
/// Phases are strictly sequential: no re-entry, no partial rollback. Any
/// failure moves straight to `Failed` and the run produces no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    PrePass,
    IndependentPass,
    DependentPass,
    Aggregate,
    Done,
    Failed,
}

/// Final output of a run: the canonical summary table plus the long-form
/// drill-down record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutput {
    pub summary: SummaryTable,
    pub detail: Vec<DetailRecord>,
}

/// Drives a full analysis to completion: derived-state pre-pass,
/// independent-values pass, dependent-values pass, aggregation.
///
/// The orchestrator owns the analysis context and is its only writer.
/// Items receive a read-only view; their results are cached in the context
/// as each completes, and a cached result is never recomputed.
pub struct Orchestrator {
    context: AnalysisContext,
    phase: Phase,
}

impl Orchestrator {
    pub fn new(context: AnalysisContext) -> Self {
        Self {
            context,
            phase: Phase::Init,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The context, readable by callers after (or during) a run.
    pub fn context(&self) -> &AnalysisContext {
        &self.context
    }

    /// Run all four phases over the given model set.
    ///
    /// Fail-fast: the first unrecoverable error aborts the run with no
    /// partial summary; item evaluation errors propagate unmodified.
    pub fn run(
        &mut self,
        items: &[Box<dyn ComputableItem>],
    ) -> Result<AnalysisOutput, EngineError> {
        match self.run_phases(items) {
            Ok(output) => {
                self.phase = Phase::Done;
                Ok(output)
            }
            Err(err) => {
                self.phase = Phase::Failed;
                Err(err)
            }
        }
    }

    fn run_phases(
        &mut self,
        items: &[Box<dyn ComputableItem>],
    ) -> Result<AnalysisOutput, EngineError> {
        self.phase = Phase::PrePass;
        self.compute_occupancy(items);

        self.phase = Phase::IndependentPass;
        self.run_pass(items, CalculationPass::IndependentValues)?;

        self.phase = Phase::DependentPass;
        self.run_pass(items, CalculationPass::DependentValues)?;

        self.phase = Phase::Aggregate;
        self.aggregate()
    }

    /// Derived-state pre-pass: the occupancy-rate series.
    ///
    /// For every period, sum the area of each item occupying space in that
    /// period and divide by the property's net rentable area. A property
    /// with zero or negative net rentable area yields an all-zero series —
    /// the engine never divides by it.
    fn compute_occupancy(&mut self, items: &[Box<dyn ComputableItem>]) {
        let nra = self.context.property().net_rentable_area();
        let periods = self.context.timeline().periods().to_vec();

        let series: Vec<f64> = if nra <= Decimal::ZERO {
            vec![0.0; periods.len()]
        } else {
            periods
                .iter()
                .map(|period| {
                    let occupied: Decimal = items
                        .iter()
                        .filter_map(|item| item.occupancy())
                        .filter(|profile| profile.occupies(*period))
                        .map(|profile| profile.area)
                        .sum();
                    decimal_to_f64(occupied / nra)
                })
                .collect()
        };

        log::debug!(
            "pre-pass: occupancy series over {} periods (nra {})",
            series.len(),
            nra
        );
        self.context.set_occupancy_rate(series);
    }

    fn run_pass(
        &mut self,
        items: &[Box<dyn ComputableItem>],
        pass: CalculationPass,
    ) -> Result<(), EngineError> {
        let members: Vec<&dyn ComputableItem> = items
            .iter()
            .filter(|item| item.calculation_pass() == pass)
            .map(|item| item.as_ref())
            .collect();

        self.validate_references(&members, items)?;
        let order = resolve_order(&members)?;
        log::debug!("{pass:?}: executing {} items", order.len());

        for &index in &order {
            let item = members[index];
            if self.context.lookup(&LookupKey::Item(item.id())).is_some() {
                log::trace!("item '{}' already cached; skipping", item.name());
                continue;
            }

            // Rollover items span multiple future lease generations, so
            // they are driven through their projection capability and
            // decomposed into the same named-component shape as everything
            // else.
            let value = match item.projection() {
                Some(projection) => {
                    let table = projection.project(&self.context.view())?;
                    ItemValue::Components(table.into_components())
                }
                None => item.evaluate(&self.context.view())?,
            };

            log::trace!("item '{}' computed", item.name());
            self.context.record_item(ItemMeta::of(item), value)?;
        }
        Ok(())
    }

    /// Every same-run item reference must point at an item that is part of
    /// this analysis (any pass) or already resolved from a prior pass.
    /// Anything else is a model-construction bug surfaced before execution.
    fn validate_references(
        &self,
        members: &[&dyn ComputableItem],
        all_items: &[Box<dyn ComputableItem>],
    ) -> Result<(), EngineError> {
        let known: HashSet<ItemId> = all_items.iter().map(|item| item.id()).collect();
        for item in members {
            if let Reference::Item(dep) = item.reference() {
                if !known.contains(&dep)
                    && self.context.lookup(&LookupKey::Item(dep)).is_none()
                {
                    return Err(EngineError::UnresolvedReference {
                        item: item.name().to_string(),
                        reference: dep.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Aggregation pass: reduce every cached result into the canonical
    /// lines, then write each line back into the lookup cache under its own
    /// name so later analyses can cross-reference aggregates like any other
    /// computed value.
    fn aggregate(&mut self) -> Result<AnalysisOutput, EngineError> {
        let (summary, detail) = {
            let entries = self.context.item_entries();
            Aggregator::aggregate(&entries, self.context.timeline())
        };

        for key in AggregateKey::ALL {
            // A seeded aggregate keeps its first-write value; everything
            // else is recorded from this run's summary.
            if self.context.lookup(&LookupKey::Aggregate(key)).is_none() {
                self.context.record_aggregate(key, summary.line(key).clone())?;
            }
        }

        Ok(AnalysisOutput { summary, detail })
    }
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(0.0)
}
