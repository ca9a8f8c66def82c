use crate::core::item::{ItemId, ItemMeta, ItemValue, RecoveryState};
use crate::core::property::Property;
use crate::core::series::CashFlowSeries;
use crate::core::settings::AnalysisSettings;
use crate::core::timeline::Timeline;
use crate::engine::aggregator::{AggregateKey, Aggregator};
use crate::engine::error::EngineError;
use std::collections::HashMap;
use std::fmt;

/// Key into the shared result cache: either an item's identity or an
/// aggregate line's name. One cache, one source of truth for "has this been
/// computed".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Item(ItemId),
    Aggregate(AggregateKey),
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Item(id) => write!(f, "item {id}"),
            LookupKey::Aggregate(key) => write!(f, "aggregate '{key}'"),
        }
    }
}

/// All shared state for one analysis run.
///
/// Constructed fresh by the scenario at the start of `execute()`, mutated in
/// place by the orchestrator through the phases, and read by every item
/// evaluation through [`ContextView`]. The orchestrator holds the sole
/// mutable handle; items never see `&mut AnalysisContext`.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    timeline: Timeline,
    settings: AnalysisSettings,
    property: Property,
    recovery_states: HashMap<ItemId, RecoveryState>,
    /// One occupancy rate per timeline period; written once by the
    /// pre-pass.
    occupancy_rate: Option<Vec<f64>>,
    /// The single cache of computed results.
    resolved: HashMap<LookupKey, ItemValue>,
    /// Classification captured alongside each recorded item result, so
    /// routing never needs the item objects themselves.
    metadata: HashMap<ItemId, ItemMeta>,
}

impl AnalysisContext {
    /// Build a context for one run. All required configuration is taken by
    /// value — there are no engine-side defaults for timeline, settings or
    /// property.
    pub fn new(
        timeline: Timeline,
        settings: AnalysisSettings,
        property: Property,
        recovery_states: HashMap<ItemId, RecoveryState>,
    ) -> Self {
        Self {
            timeline,
            settings,
            property,
            recovery_states,
            occupancy_rate: None,
            resolved: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// Seed aggregate lines from an earlier analysis, so items in this run
    /// can cross-reference them before this run's aggregation pass.
    pub fn with_seeded_aggregates(
        mut self,
        aggregates: impl IntoIterator<Item = (AggregateKey, CashFlowSeries)>,
    ) -> Self {
        for (key, series) in aggregates {
            self.resolved
                .insert(LookupKey::Aggregate(key), ItemValue::Series(series));
        }
        self
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn settings(&self) -> &AnalysisSettings {
        &self.settings
    }

    pub fn property(&self) -> &Property {
        &self.property
    }

    /// Record an item's computed value. First write wins for the whole run;
    /// a second write for the same item is an orchestration bug and fails.
    pub fn record_item(&mut self, meta: ItemMeta, value: ItemValue) -> Result<(), EngineError> {
        let key = LookupKey::Item(meta.id);
        if self.resolved.contains_key(&key) {
            return Err(EngineError::DuplicateResult {
                key: key.to_string(),
            });
        }
        self.metadata.insert(meta.id, meta);
        self.resolved.insert(key, value);
        Ok(())
    }

    /// Record a computed aggregate line under its own name.
    pub fn record_aggregate(
        &mut self,
        key: AggregateKey,
        series: CashFlowSeries,
    ) -> Result<(), EngineError> {
        let key = LookupKey::Aggregate(key);
        if self.resolved.contains_key(&key) {
            return Err(EngineError::DuplicateResult {
                key: key.to_string(),
            });
        }
        self.resolved.insert(key, ItemValue::Series(series));
        Ok(())
    }

    /// Read a cached result. `None` means "not yet computed" — valid while
    /// a later pass is still pending.
    pub fn lookup(&self, key: &LookupKey) -> Option<&ItemValue> {
        self.resolved.get(key)
    }

    /// Store the derived occupancy series. Written once, in the pre-pass.
    pub fn set_occupancy_rate(&mut self, series: Vec<f64>) {
        self.occupancy_rate = Some(series);
    }

    /// Every recorded item result with its metadata, in a deterministic
    /// order (by name, then id). This is what the aggregator consumes.
    pub fn item_entries(&self) -> Vec<(&ItemMeta, &ItemValue)> {
        let mut entries: Vec<(&ItemMeta, &ItemValue)> = self
            .metadata
            .values()
            .filter_map(|meta| {
                self.resolved
                    .get(&LookupKey::Item(meta.id))
                    .map(|value| (meta, value))
            })
            .collect();
        entries.sort_by(|a, b| a.0.name.cmp(&b.0.name).then(a.0.id.cmp(&b.0.id)));
        entries
    }

    /// The read-only facade handed to item evaluations.
    pub fn view(&self) -> ContextView<'_> {
        ContextView { ctx: self }
    }
}

/// Read-only view of the analysis context.
///
/// Items receive this during evaluation: they may read any already-populated
/// field but have no way to write. The split keeps the single-writer
/// discipline of the engine visible in the types instead of relying on
/// convention.
#[derive(Clone, Copy)]
pub struct ContextView<'a> {
    ctx: &'a AnalysisContext,
}

impl<'a> ContextView<'a> {
    pub fn timeline(&self) -> &'a Timeline {
        &self.ctx.timeline
    }

    pub fn settings(&self) -> &'a AnalysisSettings {
        &self.ctx.settings
    }

    pub fn property(&self) -> &'a Property {
        &self.ctx.property
    }

    /// Recovery state for one item, if the scenario precomputed any.
    pub fn recovery_state(&self, id: ItemId) -> Option<&'a RecoveryState> {
        self.ctx.recovery_states.get(&id)
    }

    /// The derived occupancy-rate series, one value per timeline period.
    /// `None` until the pre-pass has run.
    pub fn occupancy_rate(&self) -> Option<&'a [f64]> {
        self.ctx.occupancy_rate.as_deref()
    }

    /// Another item's computed value. Failing here means the reference
    /// points at something this run never computed — a construction bug.
    pub fn item_value(&self, id: ItemId) -> Result<&'a ItemValue, EngineError> {
        self.ctx
            .lookup(&LookupKey::Item(id))
            .ok_or_else(|| EngineError::MissingResult {
                key: LookupKey::Item(id).to_string(),
            })
    }

    /// Another item's computed value collapsed to a single series.
    pub fn item_total(&self, id: ItemId) -> Result<CashFlowSeries, EngineError> {
        Ok(self.item_value(id)?.to_series())
    }

    /// An aggregate line's series.
    ///
    /// Serves the cached value when one exists (a seeded aggregate, or this
    /// run's aggregation pass has completed). Otherwise computes a snapshot
    /// by routing and summing the item results cached so far — which is how
    /// a dependent-pass item can reference an aggregate produced by summing
    /// *other* items without creating a cycle.
    pub fn aggregate(&self, key: AggregateKey) -> CashFlowSeries {
        if let Some(value) = self.ctx.lookup(&LookupKey::Aggregate(key)) {
            return value.to_series();
        }
        log::trace!("aggregate '{key}' not yet recorded; computing snapshot");
        Aggregator::snapshot_line(&self.ctx.item_entries(), &self.ctx.timeline, key)
    }
}
