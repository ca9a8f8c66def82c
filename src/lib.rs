//! # proforma-engine
//!
//! Time-phased cash flow projection engine for real-estate underwriting.
//!
//! Given a declarative description of an asset — leases, expense lines,
//! losses, capital items — the engine discovers which financial line items
//! must run, resolves their dependencies into a safe evaluation order,
//! executes each exactly once against a shared context, and reduces the
//! results into canonical summary lines (Potential Gross Revenue, NOI,
//! Unlevered Cash Flow, ...).
//!
//! ## Architecture
//!
//! - **core** — Foundational types: timeline, cash flow series, property,
//!   settings, and the computable item contract
//! - **engine** — Analysis context, dependency resolver, four-phase
//!   orchestrator, aggregator
//! - **items** — The formula library: leases, expenses, losses, capital
//!   outlays, rollover projections
//! - **scenario** — Scenario façade and the asset-type registry
//! - **simulation** — Random portfolio generation and batch stress runs

pub mod core;
pub mod engine;
pub mod items;
pub mod scenario;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::item::{
        CalculationPass, Category, ComputableItem, ItemId, ItemValue, Reference, Subcategory,
    };
    pub use crate::core::property::Property;
    pub use crate::core::series::CashFlowSeries;
    pub use crate::core::settings::AnalysisSettings;
    pub use crate::core::timeline::Timeline;
    pub use crate::engine::aggregator::{AggregateKey, SummaryTable};
    pub use crate::engine::error::EngineError;
    pub use crate::engine::orchestrator::{AnalysisOutput, Orchestrator};
    pub use crate::scenario::{AssetType, Scenario};
}
