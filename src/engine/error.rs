use thiserror::Error;

/// Errors raised by the orchestration engine.
///
/// Every variant is fatal for the run: the engine recovers nothing locally,
/// produces no partial summary, and callers are expected to treat a failure
/// as "the whole analysis failed, with a specific named cause".
#[derive(Debug, Error)]
pub enum EngineError {
    /// A calculation pass's reference graph is not a DAG. Carries the names
    /// of every item on the offending cycle (not the whole item set) so the
    /// failure is diagnosable without a debugger.
    #[error("dependency cycle among items: {}", .items.join(" -> "))]
    DependencyCycle { items: Vec<String> },

    /// An item's declared reference points at an item that was never
    /// assembled into this analysis. A model-construction bug, not a data
    /// problem.
    #[error("item '{item}' references '{reference}', which is not part of this analysis")]
    UnresolvedReference { item: String, reference: String },

    /// A result was requested that has not been computed. Distinct from a
    /// pending same-run value: this is a caller error.
    #[error("no computed result for {key}")]
    MissingResult { key: String },

    /// A second result was recorded for a key within one run. Each item
    /// executes at most once; a duplicate write is an orchestration bug.
    #[error("result for {key} was already recorded in this run")]
    DuplicateResult { key: String },

    /// An item's evaluation failed. Propagated unmodified through the
    /// orchestrator — there is no per-item retry or fallback at this layer.
    #[error("evaluation of item '{item}' failed: {message}")]
    Evaluation { item: String, message: String },
}
