// crates/permit-gate-pipeline/src/pipeline.rs
// ============================================================================
// Module: Execution Pipeline
// Description: Staged invocation gate with a result-or-exception boundary.
// Purpose: Advance one invocation through permission, policy, validation, and
// execution, converting tagged failures into returned outcomes.
// Dependencies: crate::{callbacks, error, outcome}, permit-gate-core,
// permit-gate-registry
// ============================================================================

//! ## Overview
//! One invocation flows through fixed stages; each stage fully commits or
//! terminates the pipeline before the next begins, and no stage retries
//! automatically except the single parameter-revision re-attempt. The
//! boundary preserves the asymmetry callers rely on: tagged failures come
//! back as [`ExecutionOutcome::Failed`] values, and only unexpected
//! dependency failures escape as [`PipelineError::ToolExecutionFailed`].
//! A policy read failing with exactly the not-initialized ledger condition is
//! swallowed (no policy constraint); every other read failure propagates
//! unchanged.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::error::Error;
use std::sync::Arc;

use permit_gate_core::DecodedPolicy;
use permit_gate_core::DelegateeAddress;
use permit_gate_core::LedgerAddress;
use permit_gate_core::LedgerError;
use permit_gate_core::LedgerProvider;
use permit_gate_core::ParameterMap;
use permit_gate_core::ParameterName;
use permit_gate_core::PkpTokenId;
use permit_gate_core::PolicyLedger;
use permit_gate_core::SigningCapability;
use permit_gate_core::ToolCatalog;
use permit_gate_core::ToolCid;
use permit_gate_core::ToolDescriptor;
use permit_gate_core::ToolExecutor;
use permit_gate_core::ToolPolicy;
use permit_gate_registry::MutationSpec;
use permit_gate_registry::RegistryClient;

use crate::callbacks::PipelineCallbacks;
use crate::callbacks::PromptError;
use crate::error::PipelineError;
use crate::outcome::ExecutionOutcome;
use crate::outcome::PipelineStage;
use crate::outcome::interpret_execution_result;
use crate::telemetry::ExecutionOutcomeLabel;
use crate::telemetry::MetricsSink;

// ============================================================================
// SECTION: Request and Context
// ============================================================================

/// One tool invocation request.
///
/// # Invariants
/// - `pkp_owner` signs registration mutations; the pipeline holds no keys.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// PKP the invocation acts for.
    pub pkp: PkpTokenId,
    /// Owner address registration mutations are sent from.
    pub pkp_owner: LedgerAddress,
    /// Delegatee invoking the tool.
    pub delegatee: DelegateeAddress,
    /// Tool to invoke.
    pub tool: ToolCid,
    /// Caller-supplied initial parameters.
    pub parameters: ParameterMap,
}

/// Per-invocation context carrying external capabilities.
pub struct ExecutionContext<'a> {
    /// External signing capability for registration mutations.
    pub signer: &'a dyn SigningCapability,
    /// Connected ledger provider for registration mutations.
    pub provider: &'a dyn LedgerProvider,
    /// Injected callback bundle.
    pub callbacks: PipelineCallbacks<'a>,
    /// Optional metrics sink receiving one record per invocation.
    pub metrics: Option<&'a dyn MetricsSink>,
}

// ============================================================================
// SECTION: Stage Errors
// ============================================================================

/// Internal stage failure, split by boundary disposition.
enum StageError {
    /// Expected failure converted into a returned outcome.
    Tagged {
        /// Stage that terminated the pipeline.
        stage: PipelineStage,
        /// Tagged pipeline error whose display is the reason.
        error: PipelineError,
        /// Raw result, when execution was dispatched before failing.
        result: Option<permit_gate_core::RawExecutionResult>,
    },
    /// Unexpected dependency failure propagated as an error.
    Unexpected {
        /// Underlying failure.
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StageError {
    /// Builds a tagged stage failure with no raw result.
    const fn tagged(stage: PipelineStage, error: PipelineError) -> Self {
        Self::Tagged { stage, error, result: None }
    }

    /// Wraps an unexpected dependency failure.
    fn unexpected(source: impl Error + Send + Sync + 'static) -> Self {
        Self::Unexpected { source: Box::new(source) }
    }
}

// ============================================================================
// SECTION: Signer State
// ============================================================================

/// Two-phase signer state: configured settings, then a live executor.
enum SignerState {
    /// Immutable settings only; execution fails with `NotInitialized`.
    Configured,
    /// Live execution backend installed.
    Initialized(Arc<dyn ToolExecutor + Send + Sync>),
}

// ============================================================================
// SECTION: Execution Pipeline
// ============================================================================

/// Staged gate for tool invocations.
///
/// # Invariants
/// - `execute` before [`Self::initialize`] fails with
///   [`PipelineError::NotInitialized`] and touches nothing.
pub struct ExecutionPipeline {
    /// Ledger read surface.
    ledger: Arc<dyn PolicyLedger + Send + Sync>,
    /// External tool metadata catalog.
    catalog: Arc<dyn ToolCatalog + Send + Sync>,
    /// Registry client for registration mutations.
    registry: RegistryClient,
    /// Two-phase signer state.
    signer: SignerState,
}

impl ExecutionPipeline {
    /// Creates a configured pipeline without a live signer.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn PolicyLedger + Send + Sync>,
        catalog: Arc<dyn ToolCatalog + Send + Sync>,
        registry: RegistryClient,
    ) -> Self {
        Self { ledger, catalog, registry, signer: SignerState::Configured }
    }

    /// Installs the live execution backend.
    pub fn initialize(&mut self, executor: Arc<dyn ToolExecutor + Send + Sync>) {
        self.signer = SignerState::Initialized(executor);
    }

    /// Returns true once a live signer is installed.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        matches!(self.signer, SignerState::Initialized(_))
    }

    /// Runs one invocation through the staged gate.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotInitialized`] before initialization and
    /// [`PipelineError::ToolExecutionFailed`] for unexpected dependency failures.
    /// Every expected failure is a returned [`ExecutionOutcome::Failed`].
    pub fn execute(
        &self,
        request: &ExecutionRequest,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ExecutionOutcome, PipelineError> {
        let SignerState::Initialized(executor) = &self.signer else {
            return Err(PipelineError::NotInitialized);
        };
        let outcome = match self.run_stages(request, ctx, executor.as_ref()) {
            Ok(outcome) => Ok(outcome),
            Err(StageError::Tagged { stage, error, result }) => {
                Ok(ExecutionOutcome::Failed { stage, reason: error.to_string(), result })
            }
            Err(StageError::Unexpected { source }) => {
                Err(PipelineError::ToolExecutionFailed { tool: request.tool.clone(), source })
            }
        };
        if let Some(metrics) = ctx.metrics {
            let (label, stage) = match &outcome {
                Ok(ExecutionOutcome::Succeeded { .. }) => {
                    (ExecutionOutcomeLabel::Succeeded, None)
                }
                Ok(ExecutionOutcome::Failed { stage, .. }) => {
                    (ExecutionOutcomeLabel::ReturnedFailure, Some(*stage))
                }
                Err(_) => (ExecutionOutcomeLabel::ThrownFailure, None),
            };
            metrics.record_execution(&request.tool, label, stage);
        }
        outcome
    }

    /// Advances through the fixed stage sequence.
    fn run_stages(
        &self,
        request: &ExecutionRequest,
        ctx: &ExecutionContext<'_>,
        executor: &dyn ToolExecutor,
    ) -> Result<ExecutionOutcome, StageError> {
        let descriptor = self
            .catalog
            .resolve(&request.tool)
            .map_err(StageError::unexpected)?
            .ok_or_else(|| {
                StageError::tagged(
                    PipelineStage::ToolResolved,
                    PipelineError::UnknownTool { tool: request.tool.clone() },
                )
            })?;

        self.check_permission(request, ctx)?;
        let mut parameters = self.collect_parameters(request, ctx)?;
        let decoded = self.fetch_policy(request, descriptor.as_ref())?;
        if let Some(policy) = &decoded {
            parameters =
                self.validate_parameters(request, ctx, descriptor.as_ref(), parameters, policy)?;
        }

        let raw = executor
            .execute(&request.tool, &parameters)
            .map_err(StageError::unexpected)?;
        if let Some(error) = interpret_execution_result(&raw) {
            return Err(StageError::Tagged {
                stage: PipelineStage::Executed,
                error,
                result: Some(raw),
            });
        }
        Ok(ExecutionOutcome::Succeeded { result: raw })
    }

    /// Checks the permit, running the interactive grant branch when absent.
    fn check_permission(
        &self,
        request: &ExecutionRequest,
        ctx: &ExecutionContext<'_>,
    ) -> Result<(), StageError> {
        let permitted = self
            .ledger
            .is_tool_permitted(request.pkp, &request.tool, &request.delegatee)
            .map_err(StageError::unexpected)?;
        if permitted {
            return Ok(());
        }

        let approved =
            ctx.callbacks.permission.confirm(&request.tool).map_err(StageError::unexpected)?;
        if !approved {
            return Err(StageError::tagged(
                PipelineStage::PermissionChecked,
                PipelineError::PermissionDenied,
            ));
        }

        let draft = match ctx.callbacks.new_policy {
            Some(prompt) => {
                let current = self.read_policy_swallowing_uninitialized(request)?;
                prompt
                    .propose(&request.tool, current.as_ref())
                    .map_err(StageError::unexpected)?
            }
            None => None,
        };

        let permit = MutationSpec::PermitTool {
            pkp: request.pkp,
            tool: request.tool.clone(),
            delegatee: request.delegatee.address(),
        };
        let mut pending = self
            .registry
            .submit_policy_mutation(&request.pkp_owner, ctx.signer, ctx.provider, &permit)
            .map_err(|err| self.registration_failure(request, &err))?;
        if let Some(draft) = draft {
            let set = MutationSpec::set_policy(
                request.pkp,
                request.tool.clone(),
                request.delegatee.address(),
                &draft.policy,
                draft.version,
            );
            pending = self
                .registry
                .submit_policy_mutation(&request.pkp_owner, ctx.signer, ctx.provider, &set)
                .map_err(|err| self.registration_failure(request, &err))?;
        }
        if let Some(listener) = ctx.callbacks.registered {
            listener.policy_registered(&pending);
        }
        Ok(())
    }

    /// Folds a registry submission failure into the returned failure shape.
    fn registration_failure(
        &self,
        request: &ExecutionRequest,
        error: &permit_gate_registry::RegistryError,
    ) -> StageError {
        StageError::tagged(
            PipelineStage::PermissionChecked,
            PipelineError::PolicyRegistrationFailed {
                tool: request.tool.clone(),
                message: error.to_string(),
            },
        )
    }

    /// Merges caller-supplied parameters with prompted values for names the
    /// ledger expects but the caller did not supply.
    fn collect_parameters(
        &self,
        request: &ExecutionRequest,
        ctx: &ExecutionContext<'_>,
    ) -> Result<ParameterMap, StageError> {
        let expected = self
            .ledger
            .parameter_names(request.pkp, &request.tool, &request.delegatee)
            .map_err(StageError::unexpected)?;
        let mut parameters = request.parameters.clone();
        let missing: Vec<ParameterName> =
            expected.into_iter().filter(|name| !parameters.contains_key(name)).collect();
        if missing.is_empty() {
            return Ok(parameters);
        }

        let collected = ctx
            .callbacks
            .parameters
            .collect(&request.tool, &missing)
            .map_err(|err| match err {
                PromptError::Cancelled(message) => StageError::tagged(
                    PipelineStage::ParametersCollected,
                    PipelineError::ParameterCollectionCancelled { message },
                ),
                PromptError::Failed(message) => StageError::tagged(
                    PipelineStage::ParametersCollected,
                    PipelineError::ParameterCollectionInvalid { message },
                ),
            })?;
        for name in &missing {
            if let Some(value) = collected.get(name) {
                parameters.insert(name.clone(), value.clone());
            }
        }

        let unresolved: Vec<String> = missing
            .iter()
            .filter(|name| !parameters.contains_key(*name))
            .map(|name| name.as_str().to_string())
            .collect();
        if unresolved.is_empty() {
            Ok(parameters)
        } else {
            Err(StageError::tagged(
                PipelineStage::ParametersCollected,
                PipelineError::ParameterCollectionInvalid {
                    message: format!("missing after collection: {}", unresolved.join(", ")),
                },
            ))
        }
    }

    /// Fetches and decodes the active policy for the invocation triple.
    ///
    /// An empty blob or a disabled policy means no constraint. The
    /// not-initialized ledger condition is swallowed; any other read failure
    /// propagates unchanged.
    fn fetch_policy(
        &self,
        request: &ExecutionRequest,
        descriptor: &dyn ToolDescriptor,
    ) -> Result<Option<DecodedPolicy>, StageError> {
        let Some(policy) = self.read_policy_swallowing_uninitialized(request)? else {
            return Ok(None);
        };
        if policy.blob.is_empty() || !policy.enabled {
            return Ok(None);
        }
        descriptor.decode_policy(&policy.blob).map(Some).map_err(|err| {
            StageError::tagged(
                PipelineStage::PolicyFetched,
                PipelineError::PolicyValidationFailed {
                    tool: request.tool.clone(),
                    message: err.to_string(),
                },
            )
        })
    }

    /// Reads the triple's policy, swallowing only the not-initialized
    /// condition.
    fn read_policy_swallowing_uninitialized(
        &self,
        request: &ExecutionRequest,
    ) -> Result<Option<ToolPolicy>, StageError> {
        match self.ledger.policy(request.pkp, &request.tool, &request.delegatee) {
            Ok(policy) => Ok(policy),
            Err(LedgerError::NotInitialized) => Ok(None),
            Err(other) => Err(StageError::unexpected(other)),
        }
    }

    /// Validates parameters against the decoded policy, with at most one
    /// revision re-attempt.
    fn validate_parameters(
        &self,
        request: &ExecutionRequest,
        ctx: &ExecutionContext<'_>,
        descriptor: &dyn ToolDescriptor,
        parameters: ParameterMap,
        policy: &DecodedPolicy,
    ) -> Result<ParameterMap, StageError> {
        let error = match descriptor.validate_parameters(&parameters, policy) {
            Ok(()) => return Ok(parameters),
            Err(error) => error,
        };

        if let Some(prompt) = ctx.callbacks.failed_policy {
            let replacement = prompt
                .revise(&request.tool, &parameters, policy, &error)
                .map_err(StageError::unexpected)?;
            if let Some(replacement) = replacement {
                // At most one re-attempt; a second failure is terminal.
                return match descriptor.validate_parameters(&replacement, policy) {
                    Ok(()) => Ok(replacement),
                    Err(second) => Err(self.validation_failure(request, &second)),
                };
            }
        }
        Err(self.validation_failure(request, &error))
    }

    /// Folds a validation error into the returned failure shape.
    fn validation_failure(
        &self,
        request: &ExecutionRequest,
        error: &permit_gate_core::ParameterValidationError,
    ) -> StageError {
        StageError::tagged(
            PipelineStage::ParametersValidated,
            PipelineError::PolicyValidationFailed {
                tool: request.tool.clone(),
                message: error.to_string(),
            },
        )
    }
}
