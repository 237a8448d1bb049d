// crates/permit-gate-pipeline/src/telemetry.rs
// ============================================================================
// Module: Pipeline Telemetry
// Description: Observability hooks for execution outcomes.
// Purpose: Provide stable metric labels without hard dependencies.
// Dependencies: crate::outcome, permit-gate-core
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for execution counters. It is
//! intentionally dependency-light so downstream deployments can plug in
//! Prometheus or OpenTelemetry without redesign. The pipeline never reads
//! wall-clock time; latency measurement is the sink's responsibility.
//! Security posture: telemetry must avoid leaking parameter values or policy
//! contents and treat labels as untrusted; see `Docs/security/threat_model.md`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use permit_gate_core::ToolCid;

use crate::outcome::PipelineStage;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default latency buckets in milliseconds for execution histograms.
pub const EXECUTION_LATENCY_BUCKETS_MS: &[u64] =
    &[1, 2, 5, 10, 25, 50, 100, 250, 500, 1_000, 2_500, 5_000, 10_000, 30_000];

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Execution outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum ExecutionOutcomeLabel {
    /// The invocation succeeded.
    Succeeded,
    /// The invocation terminated in a returned failure value.
    ReturnedFailure,
    /// The invocation escaped as a thrown error.
    ThrownFailure,
}

impl ExecutionOutcomeLabel {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::ReturnedFailure => "returned_failure",
            Self::ThrownFailure => "thrown_failure",
        }
    }
}

// ============================================================================
// SECTION: Metrics Sink
// ============================================================================

/// Sink receiving one record per completed invocation.
pub trait MetricsSink {
    /// Records an execution outcome, with the terminating stage for returned
    /// failures.
    fn record_execution(
        &self,
        tool: &ToolCid,
        outcome: ExecutionOutcomeLabel,
        stage: Option<PipelineStage>,
    );
}

#[cfg(test)]
mod tests;
