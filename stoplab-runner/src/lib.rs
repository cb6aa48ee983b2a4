//! StopLab Runner — scenario orchestration over the stop-order engine.
//!
//! Provides the collaborators the engine needs (simulated venue, scripted
//! mark price feeds, static position fixtures), a TOML scenario runner that
//! drives a fresh engine tick by tick, CSV/text reporting of the stop-order
//! table, and randomized fuzz sweeps that assert engine invariants across
//! parallel markets.

pub mod feed;
pub mod fuzz;
pub mod positions;
pub mod report;
pub mod scenario;
pub mod venue;

pub use feed::ScriptedFeed;
pub use fuzz::{run_fuzz, FuzzConfig, FuzzSummary};
pub use positions::StaticPositions;
pub use report::{
    render_table, row_for, write_audit_csv, write_rows_csv, ScenarioReport, StopOrderRow,
};
pub use scenario::{load_scenario, run_scenario, Scenario, ScenarioError, ScenarioRun};
pub use venue::SimVenue;
