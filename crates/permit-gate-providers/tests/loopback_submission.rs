// crates/permit-gate-providers/tests/loopback_submission.rs
// ============================================================================
// Module: Loopback Submission Tests
// Description: End-to-end submission through the registry client.
// Purpose: Validate encode, estimate, margin, sign, broadcast, and apply.
// Dependencies: permit-gate-providers, permit-gate-registry, permit-gate-core
// ============================================================================

//! Full submission cycle tests over the loopback provider: mutations built by
//! the registry client land in the in-memory ledger with the documented gas
//! margin applied.

use std::error::Error;
use std::sync::Arc;

use permit_gate_core::DelegateeAddress;
use permit_gate_core::InMemoryPolicyLedger;
use permit_gate_core::LedgerAddress;
use permit_gate_core::ParameterName;
use permit_gate_core::ParameterValue;
use permit_gate_core::PkpTokenId;
use permit_gate_core::PolicyLedger;
use permit_gate_core::Signature;
use permit_gate_core::SigningCapability;
use permit_gate_core::SigningError;
use permit_gate_core::ToolCid;
use permit_gate_core::TxHash;
use permit_gate_providers::LoopbackProvider;
use permit_gate_registry::MutationSpec;
use permit_gate_registry::RegistryClient;
use permit_gate_registry::RegistryError;
use permit_gate_registry::apply_gas_margin;

/// Test result alias for readable assertions without panics.
type TestResult = Result<(), Box<dyn Error>>;

/// Signer stub producing a fixed opaque signature.
struct FixedSigner;

impl SigningCapability for FixedSigner {
    fn sign(&self, _digest: &TxHash) -> Result<Signature, SigningError> {
        Ok(Signature::new(vec![0x5f; 65]))
    }
}

/// Builds an address whose last byte is `tag`.
fn address(tag: u8) -> LedgerAddress {
    let mut bytes = [0_u8; 20];
    bytes[19] = tag;
    LedgerAddress::new(bytes)
}

/// Seeds a ledger with an owned PKP and one registered tool.
fn seeded() -> Result<(Arc<InMemoryPolicyLedger>, PkpTokenId, ToolCid), Box<dyn Error>> {
    let ledger = Arc::new(InMemoryPolicyLedger::new());
    let pkp = PkpTokenId::from_raw(1).ok_or("non-zero pkp")?;
    let owner = address(0xaa);
    let tool = ToolCid::new("QmSignerTool");
    ledger.set_pkp_owner(pkp, owner)?;
    ledger.register_tool(owner, pkp, &tool)?;
    Ok((ledger, pkp, tool))
}

#[test]
fn submitted_parameter_mutation_lands_on_the_ledger() -> TestResult {
    let (ledger, pkp, tool) = seeded()?;
    let owner = address(0xaa);
    let delegatee_address = address(0x01);
    let delegatee =
        DelegateeAddress::from_address(delegatee_address).ok_or("non-zero delegatee")?;

    let client = RegistryClient::new(ledger.clone(), address(0xc0));
    let provider = LoopbackProvider::new(ledger.clone(), owner);

    let permit = MutationSpec::PermitTool { pkp, tool: tool.clone(), delegatee: delegatee_address };
    client.submit_policy_mutation(&owner, &FixedSigner, &provider, &permit)?;

    let set = MutationSpec::SetParameter {
        pkp,
        tool: tool.clone(),
        delegatee: delegatee_address,
        name: ParameterName::new("maxAmount"),
        value: ParameterValue::new(vec![0x2a]),
    };
    let pending = client.submit_policy_mutation(&owner, &FixedSigner, &provider, &set)?;
    let _ = pending.hash;

    let names = ledger.parameter_names(pkp, &tool, &delegatee)?;
    if names != vec![ParameterName::new("maxAmount")] {
        return Err("expected the parameter name to be registered once".into());
    }
    let value = ledger.parameter(pkp, &tool, &delegatee, &ParameterName::new("maxAmount"))?;
    if value != Some(ParameterValue::new(vec![0x2a])) {
        return Err("expected the parameter value to be stored".into());
    }
    Ok(())
}

#[test]
fn broadcast_gas_limit_honors_the_margin_rule() -> TestResult {
    let (ledger, pkp, tool) = seeded()?;
    let owner = address(0xaa);
    let client = RegistryClient::new(ledger.clone(), address(0xc0));
    let provider = LoopbackProvider::new(ledger.clone(), owner);

    let permit = MutationSpec::PermitTool { pkp, tool, delegatee: address(0x01) };
    client.submit_policy_mutation(&owner, &FixedSigner, &provider, &permit)?;

    let record = provider.last_broadcast()?.ok_or("expected a recorded broadcast")?;
    let request = permit_gate_core::TransactionRequest {
        to: record.transaction.transaction.to,
        data: record.transaction.transaction.data.clone(),
    };
    let estimate = permit_gate_core::LedgerProvider::estimate_gas(&provider, &owner, &request)?;
    if record.transaction.transaction.gas_limit != apply_gas_margin(estimate) {
        return Err("expected the broadcast gas limit to carry the fixed margin".into());
    }
    Ok(())
}

#[test]
fn non_owner_submission_folds_into_registration_error() -> TestResult {
    let (ledger, pkp, tool) = seeded()?;
    let intruder = address(0xbb);
    let client = RegistryClient::new(ledger.clone(), address(0xc0));
    let provider = LoopbackProvider::new(ledger, intruder);

    let permit = MutationSpec::PermitTool { pkp, tool, delegatee: address(0x01) };
    let result = client.submit_policy_mutation(&intruder, &FixedSigner, &provider, &permit);
    match result {
        Err(RegistryError::PolicyRegistrationFailed { .. }) => Ok(()),
        _ => Err("expected the rejected mutation to fold into a registration error".into()),
    }
}
