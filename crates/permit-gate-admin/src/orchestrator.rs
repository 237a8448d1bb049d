// crates/permit-gate-admin/src/orchestrator.rs
// ============================================================================
// Module: Admin Orchestrator
// Description: Snapshot aggregation and safety-filtered permit operations.
// Purpose: Apply tool-level filters before delegatee-level filters so error
// conditions stay distinguishable.
// Dependencies: permit-gate-core, permit-gate-registry, thiserror
// ============================================================================

//! ## Overview
//! The orchestrator reads the ledger and the external tool catalog, never key
//! material: every mutation is submitted through the registry client with a
//! per-call [`AdminContext`] carrying the owner identity, signer, and
//! provider. Filter order is load-bearing: a later, narrower filter can
//! legitimately produce a different error than an earlier, broader one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use permit_gate_core::CatalogError;
use permit_gate_core::DelegateeAddress;
use permit_gate_core::LedgerAddress;
use permit_gate_core::LedgerError;
use permit_gate_core::LedgerProvider;
use permit_gate_core::PendingTransaction;
use permit_gate_core::PkpTokenId;
use permit_gate_core::PolicyLedger;
use permit_gate_core::RegisteredToolsView;
use permit_gate_core::SigningCapability;
use permit_gate_core::ToolCatalog;
use permit_gate_core::ToolCid;
use permit_gate_core::ToolPolicy;
use permit_gate_core::ToolWithPolicy;
use permit_gate_core::ToolWithoutPolicy;
use permit_gate_core::UnknownToolWithPolicy;
use permit_gate_registry::MutationSpec;
use permit_gate_registry::RegistryClient;
use permit_gate_registry::RegistryError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Admin orchestrator errors.
///
/// # Invariants
/// - Filter-order variants are distinct: `NoToolsWithPolicies` precedes
///   `NoToolsWithEnabledPolicies`, which precedes
///   `NoDelegateesWithEnabledPolicies`.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The PKP has no registered tools.
    #[error("no tools registered for pkp {pkp}")]
    NothingRegistered {
        /// PKP scope of the rejected operation.
        pkp: PkpTokenId,
    },
    /// The delegatee holds no permits intersecting the PKP's tools.
    #[error("no permitted tools for delegatee {delegatee} under pkp {pkp}")]
    NoPermittedTools {
        /// PKP scope of the rejected operation.
        pkp: PkpTokenId,
        /// Delegatee whose permit set was empty.
        delegatee: DelegateeAddress,
    },
    /// The selected tool is not permitted for the delegatee.
    #[error("tool {tool} is not permitted for delegatee {delegatee}")]
    ToolNotPermitted {
        /// Tool outside the permitted intersection.
        tool: ToolCid,
        /// Delegatee scope of the rejected operation.
        delegatee: DelegateeAddress,
    },
    /// No tool under the PKP has any policy.
    #[error("no tools with policies for pkp {pkp}")]
    NoToolsWithPolicies {
        /// PKP scope of the rejected operation.
        pkp: PkpTokenId,
    },
    /// No tool under the PKP has an enabled policy.
    #[error("no tools with enabled policies for pkp {pkp}")]
    NoToolsWithEnabledPolicies {
        /// PKP scope of the rejected operation.
        pkp: PkpTokenId,
    },
    /// No tool under the PKP has a disabled policy.
    #[error("no tools with disabled policies for pkp {pkp}")]
    NoToolsWithDisabledPolicies {
        /// PKP scope of the rejected operation.
        pkp: PkpTokenId,
    },
    /// The selected tool has no delegatee with an enabled policy.
    #[error("no delegatees with enabled policies for tool {tool}")]
    NoDelegateesWithEnabledPolicies {
        /// Tool scope of the rejected operation.
        tool: ToolCid,
    },
    /// The selected tool has no delegatee with a disabled policy.
    #[error("no delegatees with disabled policies for tool {tool}")]
    NoDelegateesWithDisabledPolicies {
        /// Tool scope of the rejected operation.
        tool: ToolCid,
    },
    /// A ledger read failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// A catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A registry submission failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

// ============================================================================
// SECTION: Admin Context
// ============================================================================

/// Per-call mutation context; the orchestrator holds no key material.
pub struct AdminContext<'a> {
    /// Owner identity mutations are sent from.
    pub pkp_owner: LedgerAddress,
    /// External signing capability.
    pub signer: &'a dyn SigningCapability,
    /// Connected ledger provider.
    pub provider: &'a dyn LedgerProvider,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Administrative aggregation over the ledger and tool catalog.
pub struct AdminOrchestrator {
    /// Ledger read surface.
    ledger: Arc<dyn PolicyLedger + Send + Sync>,
    /// External tool metadata catalog.
    catalog: Arc<dyn ToolCatalog + Send + Sync>,
    /// Registry client for mutations.
    registry: RegistryClient,
}

impl AdminOrchestrator {
    /// Creates an orchestrator over a ledger, catalog, and registry client.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn PolicyLedger + Send + Sync>,
        catalog: Arc<dyn ToolCatalog + Send + Sync>,
        registry: RegistryClient,
    ) -> Self {
        Self { ledger, catalog, registry }
    }

    /// Aggregates the PKP's registered tools into the three-class snapshot.
    ///
    /// Returns `None` when nothing is registered. Registered CIDs with
    /// neither resolvable metadata nor policies are omitted from the view.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError`] when a ledger read or catalog lookup fails.
    pub fn registered_tools_and_delegatees(
        &self,
        pkp: PkpTokenId,
    ) -> Result<Option<RegisteredToolsView>, AdminError> {
        let cids = self.ledger.registered_tools(pkp)?;
        if cids.is_empty() {
            return Ok(None);
        }
        let mut view = RegisteredToolsView::default();
        for cid in cids {
            let delegatees = self.ledger.permitted_delegatees(pkp, &cid)?;
            let policies = self.delegatee_policies(pkp, &cid, &delegatees)?;
            match self.catalog.resolve(&cid)? {
                Some(descriptor) if policies.is_empty() => {
                    view.tools_without_policies.push(ToolWithoutPolicy {
                        cid,
                        name: descriptor.name().to_string(),
                        description: descriptor.description().to_string(),
                        permitted_delegatees: delegatees,
                    });
                }
                Some(descriptor) => {
                    view.tools_with_policies.push(ToolWithPolicy {
                        cid,
                        name: descriptor.name().to_string(),
                        description: descriptor.description().to_string(),
                        delegatee_policies: policies,
                    });
                }
                None if !policies.is_empty() => {
                    view.unknown_tools_with_policies.push(UnknownToolWithPolicy {
                        cid,
                        delegatee_policies: policies,
                    });
                }
                None => {}
            }
        }
        Ok(Some(view))
    }

    /// Permits a registered tool for a delegatee.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NothingRegistered`] when the PKP has no tools,
    /// a ledger error when the tool is unregistered, or a registry error when
    /// submission fails.
    pub fn permit_tool_for_delegatee(
        &self,
        ctx: &AdminContext<'_>,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<PendingTransaction, AdminError> {
        let registered = self.ledger.registered_tools(pkp)?;
        if registered.is_empty() {
            return Err(AdminError::NothingRegistered { pkp });
        }
        if !registered.contains(tool) {
            return Err(AdminError::Ledger(LedgerError::ToolNotRegistered {
                pkp,
                tool: tool.clone(),
            }));
        }
        let mutation = MutationSpec::PermitTool {
            pkp,
            tool: tool.clone(),
            delegatee: delegatee.address(),
        };
        Ok(self.registry.submit_policy_mutation(
            &ctx.pkp_owner,
            ctx.signer,
            ctx.provider,
            &mutation,
        )?)
    }

    /// Revokes a delegatee's permit for a tool.
    ///
    /// The selectable set is the intersection of the PKP's registered tools
    /// with the delegatee's permitted tools, computed before any submission.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NoPermittedTools`] when the intersection is
    /// empty at either level, [`AdminError::ToolNotPermitted`] when the
    /// selected tool falls outside it, or a registry error when submission
    /// fails.
    pub fn unpermit_tool_for_delegatee(
        &self,
        ctx: &AdminContext<'_>,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<PendingTransaction, AdminError> {
        let registered = self.ledger.registered_tools(pkp)?;
        if registered.is_empty() {
            return Err(AdminError::NoPermittedTools { pkp, delegatee: *delegatee });
        }
        let permitted = self.ledger.permitted_tools(pkp, delegatee)?;
        let selectable: Vec<&ToolCid> =
            registered.iter().filter(|cid| permitted.contains(cid)).collect();
        if selectable.is_empty() {
            return Err(AdminError::NoPermittedTools { pkp, delegatee: *delegatee });
        }
        if !selectable.iter().any(|cid| *cid == tool) {
            return Err(AdminError::ToolNotPermitted {
                tool: tool.clone(),
                delegatee: *delegatee,
            });
        }
        let mutation = MutationSpec::UnpermitTool {
            pkp,
            tool: tool.clone(),
            delegatee: delegatee.address(),
        };
        Ok(self.registry.submit_policy_mutation(
            &ctx.pkp_owner,
            ctx.signer,
            ctx.provider,
            &mutation,
        )?)
    }

    /// Disables an enabled policy for a delegatee.
    ///
    /// # Errors
    ///
    /// In filter order: [`AdminError::NoToolsWithPolicies`] when no tool has
    /// any policy, [`AdminError::NoToolsWithEnabledPolicies`] when none has an
    /// enabled one, [`AdminError::NoDelegateesWithEnabledPolicies`] when the
    /// selected tool has none for this delegatee, or a registry error when
    /// submission fails.
    pub fn disable_tool_policy_for_delegatee(
        &self,
        ctx: &AdminContext<'_>,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<PendingTransaction, AdminError> {
        self.toggle_tool_policy(ctx, pkp, tool, delegatee, false)
    }

    /// Enables a disabled policy for a delegatee.
    ///
    /// # Errors
    ///
    /// Mirrors the disable path with the disabled-policy filter variants.
    pub fn enable_tool_policy_for_delegatee(
        &self,
        ctx: &AdminContext<'_>,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<PendingTransaction, AdminError> {
        self.toggle_tool_policy(ctx, pkp, tool, delegatee, true)
    }

    /// Shared enable/disable flow with ordered tool and delegatee filters.
    fn toggle_tool_policy(
        &self,
        ctx: &AdminContext<'_>,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        enable: bool,
    ) -> Result<PendingTransaction, AdminError> {
        let policies = self.all_policies(pkp)?;
        if policies.is_empty() {
            return Err(AdminError::NoToolsWithPolicies { pkp });
        }
        // Tool-level filter first: tools having at least one delegatee whose
        // policy is currently in the state the toggle moves away from.
        let selectable: Vec<&ToolCid> = policies
            .iter()
            .filter(|(_, delegatee_policies)| {
                delegatee_policies.values().any(|policy| policy.enabled != enable)
            })
            .map(|(cid, _)| cid)
            .collect();
        if selectable.is_empty() {
            return Err(if enable {
                AdminError::NoToolsWithDisabledPolicies { pkp }
            } else {
                AdminError::NoToolsWithEnabledPolicies { pkp }
            });
        }
        // Delegatee-level filter second, scoped to the selected tool.
        let eligible = policies
            .get(tool)
            .and_then(|delegatee_policies| delegatee_policies.get(delegatee))
            .is_some_and(|policy| policy.enabled != enable);
        if !eligible {
            return Err(if enable {
                AdminError::NoDelegateesWithDisabledPolicies { tool: tool.clone() }
            } else {
                AdminError::NoDelegateesWithEnabledPolicies { tool: tool.clone() }
            });
        }
        let mutation = MutationSpec::SetPolicyEnabled {
            pkp,
            tool: tool.clone(),
            delegatee: delegatee.address(),
            enabled: enable,
        };
        Ok(self.registry.submit_policy_mutation(
            &ctx.pkp_owner,
            ctx.signer,
            ctx.provider,
            &mutation,
        )?)
    }

    /// Collects every registered policy for the PKP, keyed by tool.
    fn all_policies(
        &self,
        pkp: PkpTokenId,
    ) -> Result<BTreeMap<ToolCid, BTreeMap<DelegateeAddress, ToolPolicy>>, AdminError> {
        let mut out = BTreeMap::new();
        for cid in self.ledger.registered_tools(pkp)? {
            let delegatees = self.ledger.permitted_delegatees(pkp, &cid)?;
            let policies = self.delegatee_policies(pkp, &cid, &delegatees)?;
            if !policies.is_empty() {
                out.insert(cid, policies);
            }
        }
        Ok(out)
    }

    /// Reads the policies registered for a tool across its delegatees.
    fn delegatee_policies(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatees: &[DelegateeAddress],
    ) -> Result<BTreeMap<DelegateeAddress, ToolPolicy>, AdminError> {
        let mut policies = BTreeMap::new();
        for delegatee in delegatees {
            if let Some(policy) = self.ledger.policy(pkp, tool, delegatee)? {
                policies.insert(*delegatee, policy);
            }
        }
        Ok(policies)
    }
}

#[cfg(test)]
mod tests;
