// crates/permit-gate-admin/src/lib.rs
// ============================================================================
// Module: Permit Gate Admin
// Description: Administrative aggregation and safety-filtered mutations.
// Purpose: Reconcile on-ledger tool state with catalog metadata and gate
// permit and policy toggles behind ordered safety filters.
// Dependencies: permit-gate-core, permit-gate-registry, thiserror
// ============================================================================

//! ## Overview
//! The admin crate aggregates, per PKP, the registered tools, their policies,
//! and delegatee assignments into the three-class snapshot, and offers
//! permit, unpermit, enable, and disable operations. Mutations are filtered
//! tool-level first and delegatee-level second, so callers can distinguish
//! "no tools at all" from "tools exist but none qualify for this delegatee."

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod orchestrator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use orchestrator::AdminContext;
pub use orchestrator::AdminError;
pub use orchestrator::AdminOrchestrator;
