// crates/permit-gate-admin/src/orchestrator/tests.rs
// ============================================================================
// Module: Admin Orchestrator Unit Tests
// Description: Unit coverage for snapshot partitioning and filter order.
// Purpose: Ensure the distinct filter errors stay distinguishable.
// Dependencies: permit-gate-admin, permit-gate-core, permit-gate-providers,
// permit-gate-registry, serde_json
// ============================================================================

//! ## Overview
//! Exercises the three-class snapshot and the ordered tool-then-delegatee
//! filters on unpermit, disable, and enable, over the in-memory ledger and
//! the loopback provider.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeMap;
use std::sync::Arc;

use permit_gate_core::CatalogError;
use permit_gate_core::DecodedPolicy;
use permit_gate_core::DelegateeAddress;
use permit_gate_core::InMemoryPolicyLedger;
use permit_gate_core::LedgerAddress;
use permit_gate_core::ParameterMap;
use permit_gate_core::ParameterValidationError;
use permit_gate_core::PkpTokenId;
use permit_gate_core::PolicyBlob;
use permit_gate_core::PolicyCodecError;
use permit_gate_core::PolicyLedger;
use permit_gate_core::PolicyVersion;
use permit_gate_core::Signature;
use permit_gate_core::SigningCapability;
use permit_gate_core::SigningError;
use permit_gate_core::ToolCatalog;
use permit_gate_core::ToolCid;
use permit_gate_core::ToolDescriptor;
use permit_gate_core::TxHash;
use permit_gate_providers::LoopbackProvider;
use permit_gate_registry::RegistryClient;

use super::AdminContext;
use super::AdminError;
use super::AdminOrchestrator;

/// Catalog stub backed by a static name map.
struct StaticCatalog {
    /// Known descriptors keyed by CID.
    known: BTreeMap<ToolCid, Arc<StaticTool>>,
}

impl ToolCatalog for StaticCatalog {
    fn resolve(
        &self,
        cid: &ToolCid,
    ) -> Result<Option<Arc<dyn ToolDescriptor>>, CatalogError> {
        Ok(self.known.get(cid).map(|tool| tool.clone() as Arc<dyn ToolDescriptor>))
    }
}

/// Descriptor stub carrying static metadata.
struct StaticTool {
    /// Resolved tool name.
    name: String,
}

impl ToolDescriptor for StaticTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "static test tool"
    }

    fn decode_policy(&self, blob: &PolicyBlob) -> Result<DecodedPolicy, PolicyCodecError> {
        serde_json::from_slice(blob.as_bytes())
            .map(DecodedPolicy::new)
            .map_err(|err| PolicyCodecError::Decode(err.to_string()))
    }

    fn validate_parameters(
        &self,
        _parameters: &ParameterMap,
        _policy: &DecodedPolicy,
    ) -> Result<(), ParameterValidationError> {
        Ok(())
    }
}

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

/// Builds a non-zero delegatee address whose last byte is `tag`.
fn delegatee(tag: u8) -> DelegateeAddress {
    DelegateeAddress::from_address(address(tag)).expect("non-zero tag")
}

/// Test fixture bundling the ledger, provider, and orchestrator.
struct Fixture {
    /// Shared reference ledger.
    ledger: Arc<InMemoryPolicyLedger>,
    /// Loopback provider applying as the owner.
    provider: LoopbackProvider,
    /// Orchestrator under test.
    admin: AdminOrchestrator,
    /// PKP under management.
    pkp: PkpTokenId,
    /// PKP owner address.
    owner: LedgerAddress,
}

impl Fixture {
    /// Builds a fixture with the given known catalog CIDs.
    fn new(known: &[&str]) -> Self {
        let ledger = Arc::new(InMemoryPolicyLedger::new());
        let pkp = PkpTokenId::from_raw(1).expect("non-zero pkp");
        let owner = address(0xaa);
        ledger.set_pkp_owner(pkp, owner).expect("seed owner");
        let catalog = StaticCatalog {
            known: known
                .iter()
                .map(|name| {
                    (ToolCid::new(*name), Arc::new(StaticTool { name: (*name).to_string() }))
                })
                .collect(),
        };
        let registry = RegistryClient::new(ledger.clone(), address(0xc0));
        let admin = AdminOrchestrator::new(ledger.clone(), Arc::new(catalog), registry);
        let provider = LoopbackProvider::new(ledger.clone(), owner);
        Self { ledger, provider, admin, pkp, owner }
    }

    /// Returns an admin context bound to the fixture provider.
    fn ctx(&self) -> AdminContext<'_> {
        AdminContext { pkp_owner: self.owner, signer: &FixedSigner, provider: &self.provider }
    }

    /// Registers and permits a tool for a delegatee.
    fn seed_permit(&self, tool: &str, grantee: DelegateeAddress) {
        let cid = ToolCid::new(tool);
        self.ledger.register_tool(self.owner, self.pkp, &cid).expect("register");
        self.ledger.permit_tool(self.owner, self.pkp, &cid, &grantee).expect("permit");
    }

    /// Sets a policy for a triple, optionally disabled.
    fn seed_policy(&self, tool: &str, grantee: DelegateeAddress, enabled: bool) {
        let cid = ToolCid::new(tool);
        self.ledger
            .set_policy(
                self.owner,
                self.pkp,
                &cid,
                &grantee,
                PolicyBlob::new(br#"{"maxAmount":100}"#.to_vec()),
                PolicyVersion::new("1"),
            )
            .expect("policy");
        if !enabled {
            self.ledger
                .set_policy_enabled(self.owner, self.pkp, &cid, &grantee, false)
                .expect("disable");
        }
    }
}

#[test]
fn snapshot_is_none_when_nothing_is_registered() {
    let fixture = Fixture::new(&["QmKnown"]);
    let view = fixture.admin.registered_tools_and_delegatees(fixture.pkp).expect("snapshot");
    assert!(view.is_none());
}

#[test]
fn snapshot_partitions_the_three_classes() {
    let fixture = Fixture::new(&["QmWithPolicy", "QmBare"]);
    let grantee = delegatee(0x01);
    fixture.seed_permit("QmWithPolicy", grantee);
    fixture.seed_policy("QmWithPolicy", grantee, true);
    fixture.seed_permit("QmBare", grantee);
    fixture.seed_permit("QmUnknown", grantee);
    fixture.seed_policy("QmUnknown", grantee, true);

    let view = fixture
        .admin
        .registered_tools_and_delegatees(fixture.pkp)
        .expect("snapshot")
        .expect("non-empty view");
    assert_eq!(view.tools_with_policies.len(), 1);
    assert_eq!(view.tools_with_policies[0].name, "QmWithPolicy");
    assert_eq!(view.tools_without_policies.len(), 1);
    assert_eq!(view.tools_without_policies[0].cid, ToolCid::new("QmBare"));
    assert_eq!(view.unknown_tools_with_policies.len(), 1);
    assert_eq!(view.unknown_tools_with_policies[0].cid, ToolCid::new("QmUnknown"));
}

#[test]
fn unpermit_fails_with_no_permitted_tools_before_any_broadcast() {
    let fixture = Fixture::new(&["QmKnown"]);
    let grantee = delegatee(0x01);
    fixture.seed_permit("QmKnown", delegatee(0x02));

    let result = fixture.admin.unpermit_tool_for_delegatee(
        &fixture.ctx(),
        fixture.pkp,
        &ToolCid::new("QmKnown"),
        &grantee,
    );
    assert!(matches!(result, Err(AdminError::NoPermittedTools { .. })));
    assert!(fixture.provider.last_broadcast().expect("log").is_none());
}

#[test]
fn unpermit_removes_the_permit() {
    let fixture = Fixture::new(&["QmKnown"]);
    let grantee = delegatee(0x01);
    fixture.seed_permit("QmKnown", grantee);

    fixture
        .admin
        .unpermit_tool_for_delegatee(
            &fixture.ctx(),
            fixture.pkp,
            &ToolCid::new("QmKnown"),
            &grantee,
        )
        .expect("unpermit");
    let permitted =
        fixture.ledger.permitted_tools(fixture.pkp, &grantee).expect("permitted tools");
    assert!(permitted.is_empty());
}

#[test]
fn disable_distinguishes_the_three_filter_errors() {
    let fixture = Fixture::new(&["QmKnown", "QmOther"]);
    let grantee = delegatee(0x01);
    let other = delegatee(0x02);
    let tool = ToolCid::new("QmKnown");

    // No policies at all.
    fixture.seed_permit("QmKnown", grantee);
    let result = fixture.admin.disable_tool_policy_for_delegatee(
        &fixture.ctx(),
        fixture.pkp,
        &tool,
        &grantee,
    );
    assert!(matches!(result, Err(AdminError::NoToolsWithPolicies { .. })));

    // Policies exist but every one is disabled.
    fixture.seed_policy("QmKnown", grantee, false);
    let result = fixture.admin.disable_tool_policy_for_delegatee(
        &fixture.ctx(),
        fixture.pkp,
        &tool,
        &grantee,
    );
    assert!(matches!(result, Err(AdminError::NoToolsWithEnabledPolicies { .. })));

    // An enabled policy exists elsewhere, but not for this delegatee pairing.
    fixture.seed_permit("QmOther", other);
    fixture.seed_policy("QmOther", other, true);
    let result = fixture.admin.disable_tool_policy_for_delegatee(
        &fixture.ctx(),
        fixture.pkp,
        &tool,
        &grantee,
    );
    assert!(matches!(result, Err(AdminError::NoDelegateesWithEnabledPolicies { .. })));
}

#[test]
fn disable_then_enable_round_trips_the_policy_state() {
    let fixture = Fixture::new(&["QmKnown"]);
    let grantee = delegatee(0x01);
    let tool = ToolCid::new("QmKnown");
    fixture.seed_permit("QmKnown", grantee);
    fixture.seed_policy("QmKnown", grantee, true);

    fixture
        .admin
        .disable_tool_policy_for_delegatee(&fixture.ctx(), fixture.pkp, &tool, &grantee)
        .expect("disable");
    let policy = fixture
        .ledger
        .policy(fixture.pkp, &tool, &grantee)
        .expect("read")
        .expect("present");
    assert!(!policy.enabled);

    fixture
        .admin
        .enable_tool_policy_for_delegatee(&fixture.ctx(), fixture.pkp, &tool, &grantee)
        .expect("enable");
    let policy = fixture
        .ledger
        .policy(fixture.pkp, &tool, &grantee)
        .expect("read")
        .expect("present");
    assert!(policy.enabled);
}

#[test]
fn enable_reports_disabled_policy_filters() {
    let fixture = Fixture::new(&["QmKnown"]);
    let grantee = delegatee(0x01);
    let tool = ToolCid::new("QmKnown");
    fixture.seed_permit("QmKnown", grantee);
    fixture.seed_policy("QmKnown", grantee, true);

    // Every policy is already enabled.
    let result = fixture.admin.enable_tool_policy_for_delegatee(
        &fixture.ctx(),
        fixture.pkp,
        &tool,
        &grantee,
    );
    assert!(matches!(result, Err(AdminError::NoToolsWithDisabledPolicies { .. })));
}
