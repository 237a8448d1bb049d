// crates/permit-gate-core/src/runtime/ledger.rs
// ============================================================================
// Module: In-Memory Policy Ledger
// Description: Reference PolicyLedger with full contract semantics.
// Purpose: Enforce owner gating, registration preconditions, and audit events
// without a deployed contract.
// Dependencies: crate::core, crate::interfaces, std
// ============================================================================

//! ## Overview
//! The in-memory ledger mirrors the deployed policy store: mutations are
//! owner-gated, require the tool to be registered under the PKP, and fail
//! closed before any state change. Parameter name lists keep the contract's
//! exact shape: idempotent append on set, swap-with-last on remove (order
//! among survivors is not preserved). Every applied mutation appends one
//! audit event (batches append one per element); rejected calls, including
//! rejected batches, emit nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::events::LedgerEvent;
use crate::core::identifiers::DelegateeAddress;
use crate::core::identifiers::LedgerAddress;
use crate::core::identifiers::ParameterName;
use crate::core::identifiers::PkpTokenId;
use crate::core::identifiers::PolicyVersion;
use crate::core::identifiers::ToolCid;
use crate::core::policy::ParameterValue;
use crate::core::policy::PolicyBlob;
use crate::core::policy::ToolPolicy;
use crate::interfaces::LedgerError;
use crate::interfaces::PolicyLedger;

// ============================================================================
// SECTION: State
// ============================================================================

/// Scope key for per-triple state.
type Triple = (PkpTokenId, ToolCid, DelegateeAddress);

/// Mutable ledger state behind the lock.
#[derive(Debug, Default)]
struct LedgerState {
    /// Whether the policy manager surface is wired up.
    policy_manager_ready: bool,
    /// PKP owners; mutation authority.
    owners: BTreeMap<PkpTokenId, LedgerAddress>,
    /// Registered tool CIDs per PKP.
    registered: BTreeMap<PkpTokenId, BTreeSet<ToolCid>>,
    /// Permits granted to delegatees.
    permits: BTreeSet<Triple>,
    /// Policies per triple.
    policies: BTreeMap<Triple, ToolPolicy>,
    /// Ordered parameter name lists per triple.
    parameter_names: BTreeMap<Triple, Vec<ParameterName>>,
    /// Parameter values per triple.
    parameter_values: BTreeMap<Triple, BTreeMap<ParameterName, ParameterValue>>,
    /// Append-only audit event log.
    events: Vec<LedgerEvent>,
}

impl LedgerState {
    /// Fails unless the tool is registered under the PKP.
    fn ensure_registered(&self, pkp: PkpTokenId, tool: &ToolCid) -> Result<(), LedgerError> {
        let registered =
            self.registered.get(&pkp).is_some_and(|tools| tools.contains(tool));
        if registered {
            Ok(())
        } else {
            Err(LedgerError::ToolNotRegistered { pkp, tool: tool.clone() })
        }
    }

    /// Fails unless the caller is the registered PKP owner.
    fn ensure_owner(&self, caller: LedgerAddress, pkp: PkpTokenId) -> Result<(), LedgerError> {
        let owner = self.owners.get(&pkp).ok_or(LedgerError::UnknownPkp { pkp })?;
        if *owner == caller { Ok(()) } else { Err(LedgerError::NotOwner { pkp, caller }) }
    }

    /// Runs the shared precondition chain for scoped mutations.
    ///
    /// Check order matches the contract: registration before ownership, so an
    /// unregistered tool is reported the same way to every caller.
    fn ensure_scoped_mutation(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
    ) -> Result<(), LedgerError> {
        self.ensure_registered(pkp, tool)?;
        self.ensure_owner(caller, pkp)
    }

    /// Applies one parameter set: idempotent name append, unconditional value
    /// overwrite, one event.
    fn apply_set_parameter(
        &mut self,
        triple: &Triple,
        name: ParameterName,
        value: ParameterValue,
    ) {
        let names = self.parameter_names.entry(triple.clone()).or_default();
        // Linear scan, first match wins: duplicate protection, not an index.
        if !names.iter().any(|existing| *existing == name) {
            names.push(name.clone());
        }
        self.parameter_values.entry(triple.clone()).or_default().insert(name.clone(), value);
        self.events.push(LedgerEvent::ParameterSet {
            pkp: triple.0,
            tool: triple.1.clone(),
            delegatee: triple.2,
            name,
        });
    }

    /// Applies one parameter remove: swap-with-last on the name list when
    /// present, idempotent value delete, one event.
    fn apply_remove_parameter(&mut self, triple: &Triple, name: &ParameterName) {
        if let Some(names) = self.parameter_names.get_mut(triple) {
            if let Some(index) = names.iter().position(|existing| existing == name) {
                names.swap_remove(index);
            }
        }
        if let Some(values) = self.parameter_values.get_mut(triple) {
            values.remove(name);
        }
        self.events.push(LedgerEvent::ParameterRemoved {
            pkp: triple.0,
            tool: triple.1.clone(),
            delegatee: triple.2,
            name: name.clone(),
        });
    }
}

// ============================================================================
// SECTION: In-Memory Ledger
// ============================================================================

/// Reference policy ledger backed by process memory.
///
/// # Invariants
/// - Mutations fail closed before any state change.
/// - Every successful mutating call appends exactly one audit event.
#[derive(Debug)]
pub struct InMemoryPolicyLedger {
    /// Ledger state behind a lock; never held across a suspension point.
    state: Mutex<LedgerState>,
}

impl InMemoryPolicyLedger {
    /// Creates a ledger with the policy manager surface wired up.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LedgerState { policy_manager_ready: true, ..LedgerState::default() }),
        }
    }

    /// Creates a ledger whose policy reads fail with
    /// [`LedgerError::NotInitialized`] until [`Self::mark_initialized`] runs.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self { state: Mutex::new(LedgerState::default()) }
    }

    /// Wires up the policy manager surface.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the state lock is poisoned.
    pub fn mark_initialized(&self) -> Result<(), LedgerError> {
        self.lock_state()?.policy_manager_ready = true;
        Ok(())
    }

    /// Records the PKP owner; stands in for the out-of-scope mint flow.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the state lock is poisoned.
    pub fn set_pkp_owner(
        &self,
        pkp: PkpTokenId,
        owner: LedgerAddress,
    ) -> Result<(), LedgerError> {
        self.lock_state()?.owners.insert(pkp, owner);
        Ok(())
    }

    /// Returns a snapshot of the audit event log.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the state lock is poisoned.
    pub fn events(&self) -> Result<Vec<LedgerEvent>, LedgerError> {
        Ok(self.lock_state()?.events.clone())
    }

    /// Locks the ledger state, converting poisoning into a ledger error.
    fn lock_state(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        self.state.lock().map_err(|_| LedgerError::Ledger("ledger state lock poisoned".into()))
    }
}

impl Default for InMemoryPolicyLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyLedger for InMemoryPolicyLedger {
    fn registered_tools(&self, pkp: PkpTokenId) -> Result<Vec<ToolCid>, LedgerError> {
        let state = self.lock_state()?;
        Ok(state.registered.get(&pkp).map(|tools| tools.iter().cloned().collect()).unwrap_or_default())
    }

    fn permitted_tools(
        &self,
        pkp: PkpTokenId,
        delegatee: &DelegateeAddress,
    ) -> Result<Vec<ToolCid>, LedgerError> {
        let state = self.lock_state()?;
        Ok(state
            .permits
            .iter()
            .filter(|(permit_pkp, _, permit_delegatee)| {
                *permit_pkp == pkp && permit_delegatee == delegatee
            })
            .map(|(_, tool, _)| tool.clone())
            .collect())
    }

    fn permitted_delegatees(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
    ) -> Result<Vec<DelegateeAddress>, LedgerError> {
        let state = self.lock_state()?;
        Ok(state
            .permits
            .iter()
            .filter(|(permit_pkp, permit_tool, _)| *permit_pkp == pkp && permit_tool == tool)
            .map(|(_, _, delegatee)| *delegatee)
            .collect())
    }

    fn is_tool_permitted(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<bool, LedgerError> {
        let state = self.lock_state()?;
        Ok(state.permits.contains(&(pkp, tool.clone(), *delegatee)))
    }

    fn policy(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<Option<ToolPolicy>, LedgerError> {
        let state = self.lock_state()?;
        if !state.policy_manager_ready {
            return Err(LedgerError::NotInitialized);
        }
        Ok(state.policies.get(&(pkp, tool.clone(), *delegatee)).cloned())
    }

    fn parameter_names(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<Vec<ParameterName>, LedgerError> {
        let state = self.lock_state()?;
        Ok(state
            .parameter_names
            .get(&(pkp, tool.clone(), *delegatee))
            .cloned()
            .unwrap_or_default())
    }

    fn parameter(
        &self,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        name: &ParameterName,
    ) -> Result<Option<ParameterValue>, LedgerError> {
        let state = self.lock_state()?;
        Ok(state
            .parameter_values
            .get(&(pkp, tool.clone(), *delegatee))
            .and_then(|values| values.get(name))
            .cloned())
    }

    fn register_tool(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_owner(caller, pkp)?;
        state.registered.entry(pkp).or_default().insert(tool.clone());
        state.events.push(LedgerEvent::ToolRegistered { pkp, tool: tool.clone() });
        Ok(())
    }

    fn permit_tool(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        state.permits.insert((pkp, tool.clone(), *delegatee));
        state.events.push(LedgerEvent::ToolPermitted {
            pkp,
            tool: tool.clone(),
            delegatee: *delegatee,
        });
        Ok(())
    }

    fn unpermit_tool(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        state.permits.remove(&(pkp, tool.clone(), *delegatee));
        state.events.push(LedgerEvent::ToolUnpermitted {
            pkp,
            tool: tool.clone(),
            delegatee: *delegatee,
        });
        Ok(())
    }

    fn set_policy(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        blob: PolicyBlob,
        version: PolicyVersion,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        state
            .policies
            .insert((pkp, tool.clone(), *delegatee), ToolPolicy::new(blob, version.clone()));
        state.events.push(LedgerEvent::PolicySet {
            pkp,
            tool: tool.clone(),
            delegatee: *delegatee,
            version,
        });
        Ok(())
    }

    fn remove_policy(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        state.policies.remove(&(pkp, tool.clone(), *delegatee));
        state.events.push(LedgerEvent::PolicyRemoved {
            pkp,
            tool: tool.clone(),
            delegatee: *delegatee,
        });
        Ok(())
    }

    fn set_policy_enabled(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        enabled: bool,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        let policy = state.policies.get_mut(&(pkp, tool.clone(), *delegatee)).ok_or_else(
            || LedgerError::PolicyNotFound { tool: tool.clone(), delegatee: *delegatee },
        )?;
        policy.enabled = enabled;
        let event = if enabled {
            LedgerEvent::PolicyEnabled { pkp, tool: tool.clone(), delegatee: *delegatee }
        } else {
            LedgerEvent::PolicyDisabled { pkp, tool: tool.clone(), delegatee: *delegatee }
        };
        state.events.push(event);
        Ok(())
    }

    fn set_parameter(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        name: ParameterName,
        value: ParameterValue,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        let triple = (pkp, tool.clone(), *delegatee);
        state.apply_set_parameter(&triple, name, value);
        Ok(())
    }

    fn remove_parameter(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        name: &ParameterName,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        let triple = (pkp, tool.clone(), *delegatee);
        state.apply_remove_parameter(&triple, name);
        Ok(())
    }

    fn batch_set_parameters(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        names: Vec<ParameterName>,
        values: Vec<ParameterValue>,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        if names.len() != values.len() {
            return Err(LedgerError::LengthMismatch {
                names: names.len(),
                values: values.len(),
            });
        }
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        let triple = (pkp, tool.clone(), *delegatee);
        for (name, value) in names.into_iter().zip(values) {
            state.apply_set_parameter(&triple, name, value);
        }
        Ok(())
    }

    fn batch_remove_parameters(
        &self,
        caller: LedgerAddress,
        pkp: PkpTokenId,
        tool: &ToolCid,
        delegatee: &DelegateeAddress,
        names: Vec<ParameterName>,
    ) -> Result<(), LedgerError> {
        let mut state = self.lock_state()?;
        state.ensure_scoped_mutation(caller, pkp, tool)?;
        let triple = (pkp, tool.clone(), *delegatee);
        for name in &names {
            state.apply_remove_parameter(&triple, name);
        }
        Ok(())
    }
}
