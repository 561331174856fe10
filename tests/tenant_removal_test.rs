// ABOUTME: Integration tests for the removal saga and cleanup by prefix
// ABOUTME: Covers soft suspension, forced hard teardown, protected tenants and failure reversion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use freeflow_tenants::{
    errors::ErrorCode,
    models::{LogStatus, NewTenant, TenantId, TenantRecord, TenantStatus},
    tenant::RemovalMode,
};

mod common;
use common::{step, TestHarness};

async fn provisioned(harness: &TestHarness, name: &str) -> TenantRecord {
    let outcome = harness.provisioner(false).provision(name).await.unwrap();
    harness.calls.clear();
    outcome.tenant
}

async fn registered(harness: &TestHarness, name: &str, status: TenantStatus) -> TenantRecord {
    let tenant = harness
        .registry
        .create(&NewTenant::for_name(name))
        .await
        .unwrap();
    harness
        .registry
        .update_status(tenant.id, status)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_soft_removal_suspends_and_disables_realm() {
    let harness = TestHarness::new().await;
    let tenant = provisioned(&harness, "acme").await;
    let logs_before = harness.logs(tenant.id).await.len();

    let removed = harness
        .remover()
        .remove(tenant.id, RemovalMode::Soft, false)
        .await
        .unwrap();

    assert_eq!(removed.status, TenantStatus::Suspended);
    assert_eq!(harness.calls.all(), vec!["keycloak.disable(freeflow-acme)"]);

    let stored = harness.registry.find_by_id(tenant.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TenantStatus::Suspended);

    let logs = harness.logs(tenant.id).await;
    let new_entries: Vec<_> = logs[logs_before..]
        .iter()
        .map(|entry| (entry.step.clone(), entry.status))
        .collect();
    assert_eq!(
        new_entries,
        vec![
            step("remove:soft", LogStatus::Started),
            step("remove:soft", LogStatus::Succeeded)
        ]
    );
    assert_eq!(
        logs[logs_before].message.as_deref(),
        Some("Soft delete requested.")
    );
}

#[tokio::test]
async fn test_hard_removal_requires_force() {
    let harness = TestHarness::new().await;
    let tenant = provisioned(&harness, "acme").await;
    let logs_before = harness.logs(tenant.id).await.len();

    let error = harness
        .remover()
        .remove(tenant.id, RemovalMode::Hard, false)
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert_eq!(error.message, "force=true is required for hard delete.");
    assert!(harness.calls.all().is_empty());

    let stored = harness.registry.find_by_id(tenant.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TenantStatus::Active);
    assert_eq!(harness.logs(tenant.id).await.len(), logs_before);
}

#[tokio::test]
async fn test_protected_tenants_cannot_be_removed() {
    let harness = TestHarness::new().await;

    for name in ["freeflow", "system"] {
        let tenant = registered(&harness, name, TenantStatus::Active).await;

        for (mode, force) in [
            (RemovalMode::Hard, true),
            (RemovalMode::Hard, false),
            (RemovalMode::Soft, false),
        ] {
            let error = harness
                .remover()
                .remove(tenant.id, mode, force)
                .await
                .unwrap_err();
            assert_eq!(error.code, ErrorCode::PermissionDenied, "{name} {mode}");
            assert_eq!(error.message, "Protected tenant cannot be removed.");
        }

        let stored = harness.registry.find_by_id(tenant.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TenantStatus::Active);
    }

    assert!(harness.calls.all().is_empty());
}

#[tokio::test]
async fn test_unknown_tenant_is_not_found() {
    let harness = TestHarness::new().await;

    let error = harness
        .remover()
        .remove(TenantId::new(), RemovalMode::Hard, true)
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    assert!(harness.calls.all().is_empty());
}

#[tokio::test]
async fn test_hard_removal_tears_down_everything() {
    let harness = TestHarness::new().await;
    let tenant = provisioned(&harness, "acme").await;

    let snapshot = harness
        .remover()
        .remove(tenant.id, RemovalMode::Hard, true)
        .await
        .unwrap();

    assert_eq!(snapshot.id, tenant.id);
    assert_eq!(snapshot.name, "acme");
    assert_eq!(
        harness.calls.all(),
        vec![
            "keycloak.disable(freeflow-acme)",
            "keycloak.drop_resource(freeflow-acme)",
            "postgres.drop_resource(freeflow_acme)",
            "mongo.drop_resource(freeflow_acme)",
            "qdrant.drop_resource(freeflow_acme_vectors)",
            "storage.drop_resource(acme)",
        ]
    );

    assert!(harness.registry.find_by_name("acme").await.unwrap().is_none());
    assert!(harness
        .registry
        .list_connections(tenant.id)
        .await
        .unwrap()
        .is_empty());

    // The audit trail outlives the tenant record
    let logs = harness.logs(tenant.id).await;
    let last = logs.last().unwrap();
    assert_eq!(last.step, "remove:finalize");
    assert_eq!(last.status, LogStatus::Succeeded);
    assert_eq!(last.message.as_deref(), Some("Hard delete completed."));
    for name in [
        "keycloak:disable",
        "keycloak:delete",
        "postgres:drop",
        "mongo:drop",
        "qdrant:drop",
        "storage:remove",
    ] {
        let steps = harness.log_steps(tenant.id).await;
        assert!(steps.contains(&step(name, LogStatus::Succeeded)), "{name}");
    }
}

#[tokio::test]
async fn test_soft_then_hard_removal() {
    let harness = TestHarness::new().await;
    let tenant = provisioned(&harness, "acme").await;
    let remover = harness.remover();

    remover
        .remove(tenant.id, RemovalMode::Soft, false)
        .await
        .unwrap();
    remover
        .remove(tenant.id, RemovalMode::Hard, true)
        .await
        .unwrap();

    assert!(harness.registry.find_by_id(tenant.id).await.unwrap().is_none());
    assert_eq!(harness.calls.count("keycloak.disable(freeflow-acme)"), 2);
    assert_eq!(harness.calls.count("keycloak.drop_resource(freeflow-acme)"), 1);
}

#[tokio::test]
async fn test_hard_removal_failure_reverts_to_suspended() {
    let harness = TestHarness::new().await;
    let tenant = provisioned(&harness, "acme").await;
    harness.mongo.fail_drop(1);

    let error = harness
        .remover()
        .remove(tenant.id, RemovalMode::Hard, true)
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceError);
    // Teardown steps run once, without retry
    assert_eq!(harness.calls.count("mongo.drop_resource(freeflow_acme)"), 1);
    assert_eq!(harness.calls.count("qdrant.drop_resource(freeflow_acme_vectors)"), 0);
    assert_eq!(harness.calls.count("storage.drop_resource(acme)"), 0);

    let stored = harness.registry.find_by_id(tenant.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TenantStatus::Suspended);

    let steps = harness.log_steps(tenant.id).await;
    assert!(steps.contains(&step("mongo:drop", LogStatus::Failed)));
    assert_eq!(steps.last().unwrap(), &step("remove:failed", LogStatus::Failed));

    // Re-invoking is safe because every teardown step is idempotent
    harness
        .remover()
        .remove(tenant.id, RemovalMode::Hard, true)
        .await
        .unwrap();
    assert!(harness.registry.find_by_id(tenant.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_soft_removal_failure_is_logged_and_raised() {
    let harness = TestHarness::new().await;
    let tenant = provisioned(&harness, "acme").await;
    harness.keycloak.fail_disable(1);

    let error = harness
        .remover()
        .remove(tenant.id, RemovalMode::Soft, false)
        .await
        .unwrap_err();

    assert_eq!(error.code, ErrorCode::ExternalServiceError);
    let steps = harness.log_steps(tenant.id).await;
    assert_eq!(steps.last().unwrap(), &step("remove:soft", LogStatus::Failed));
}

#[tokio::test]
async fn test_cleanup_skips_active_unless_included() {
    let harness = TestHarness::new().await;
    provisioned(&harness, "e2eone").await;
    let broken = registered(&harness, "e2etwo", TenantStatus::Suspended).await;
    let other = registered(&harness, "other", TenantStatus::Suspended).await;
    let remover = harness.remover();

    let report = remover.cleanup("e2e", false).await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.targeted(), 1);
    assert_eq!(report.removed[0].id, broken.id);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "e2eone");

    let report = remover.cleanup("e2e", true).await.unwrap();
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].name, "e2eone");

    let remaining = harness.registry.list_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, other.id);
}

#[tokio::test]
async fn test_cleanup_prefix_does_not_fold_case() {
    let harness = TestHarness::new().await;
    let acme = registered(&harness, "acme", TenantStatus::Suspended).await;

    let report = harness.remover().cleanup("ACM", true).await.unwrap();

    assert_eq!(report.targeted(), 0);
    assert!(report.skipped.is_empty());
    assert!(harness.calls.of_op("drop_resource").is_empty());
    let kept = harness.registry.find_by_id(acme.id).await.unwrap().unwrap();
    assert_eq!(kept.status, TenantStatus::Suspended);
}

#[tokio::test]
async fn test_cleanup_continues_past_failures() {
    let harness = TestHarness::new().await;
    registered(&harness, "e2ea", TenantStatus::Suspended).await;
    registered(&harness, "e2eb", TenantStatus::Provisioning).await;
    harness.postgres.fail_drop(1);

    let report = harness.remover().cleanup("e2e", false).await.unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.targeted(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].tenant.name, "e2ea");
    assert_eq!(report.removed.len(), 1);
    assert_eq!(report.removed[0].name, "e2eb");

    let left = harness.registry.find_by_name("e2ea").await.unwrap().unwrap();
    assert_eq!(left.status, TenantStatus::Suspended);
}

#[tokio::test]
async fn test_cleanup_never_touches_protected_tenants() {
    let harness = TestHarness::new().await;
    registered(&harness, "system", TenantStatus::Suspended).await;

    let report = harness.remover().cleanup("sys", true).await.unwrap();

    assert_eq!(report.targeted(), 0);
    assert_eq!(report.skipped.len(), 1);
    assert!(harness.registry.find_by_name("system").await.unwrap().is_some());
}

#[tokio::test]
async fn test_cleanup_rejects_empty_prefix() {
    let harness = TestHarness::new().await;
    registered(&harness, "acme", TenantStatus::Suspended).await;

    let error = harness.remover().cleanup("", true).await.unwrap_err();

    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert_eq!(harness.registry.list_all().await.unwrap().len(), 1);
}
