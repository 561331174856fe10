// ABOUTME: Generic saga step runner shared by the provisioning and removal sagas
// ABOUTME: Runs ordered steps with audit logging and optional retry, and rolls executed steps back
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FreeFlow Contributors

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{error, info, info_span, warn, Instrument};

use crate::constants::provisioning_steps::ROLLBACK_SUFFIX;
use crate::database::TenantRepository;
use crate::drivers::ResourceDriver;
use crate::errors::{AppError, AppResult};
use crate::models::{LogStatus, NewProvisionLog, TenantId};
use crate::utils::retry::{with_retry, RetryPolicy};

/// Boxed future produced by a step action
pub type StepFuture = Pin<Box<dyn Future<Output = AppResult<()>> + Send>>;

type StepAction = Box<dyn Fn() -> StepFuture + Send + Sync>;

/// One named, idempotent unit of a saga with an optional compensating action
pub struct SagaStep {
    name: &'static str,
    run: StepAction,
    rollback: Option<StepAction>,
}

impl SagaStep {
    /// Step without a rollback
    pub fn new<F, Fut>(name: &'static str, run: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        Self {
            name,
            run: Box::new(move || Box::pin(run())),
            rollback: None,
        }
    }

    /// Declare the compensating action
    #[must_use]
    pub fn with_rollback<F, Fut>(mut self, rollback: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.rollback = Some(Box::new(move || Box::pin(rollback())));
        self
    }

    /// `ensure(resource)` on `driver`, rolled back by dropping the resource
    pub fn ensure_resource<D>(name: &'static str, driver: &Arc<D>, resource: &str) -> Self
    where
        D: ResourceDriver + ?Sized + 'static,
    {
        let ensure_driver = Arc::clone(driver);
        let ensure_name = resource.to_owned();
        let rollback_driver = Arc::clone(driver);
        let rollback_name = resource.to_owned();

        Self::new(name, move || {
            let driver = Arc::clone(&ensure_driver);
            let resource = ensure_name.clone();
            async move { driver.ensure(&resource).await }
        })
        .with_rollback(move || {
            let driver = Arc::clone(&rollback_driver);
            let resource = rollback_name.clone();
            async move { driver.drop_resource(&resource).await }
        })
    }

    /// `drop_resource(resource)` on `driver`, with nothing to compensate
    pub fn drop_resource<D>(name: &'static str, driver: &Arc<D>, resource: &str) -> Self
    where
        D: ResourceDriver + ?Sized + 'static,
    {
        let driver = Arc::clone(driver);
        let resource = resource.to_owned();

        Self::new(name, move || {
            let driver = Arc::clone(&driver);
            let resource = resource.clone();
            async move { driver.drop_resource(&resource).await }
        })
    }

    /// Step label written to the provisioning log
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a compensating action was declared
    #[must_use]
    pub const fn has_rollback(&self) -> bool {
        self.rollback.is_some()
    }
}

/// The step that stopped a saga run
#[derive(Debug)]
pub struct StepFailure {
    /// Label of the failing step
    pub step: &'static str,
    /// Number of steps that ran, the failing one included
    pub ran: usize,
    /// What went wrong
    pub error: AppError,
}

/// Outcome of compensating the steps of a failed run
#[derive(Debug, Default)]
pub struct RollbackReport {
    /// Steps whose rollback ran, in execution order (reverse of the saga)
    pub attempted: Vec<&'static str>,
    /// Steps whose rollback failed
    pub failed: Vec<&'static str>,
}

/// Executes saga steps for one tenant, recording every transition
pub struct SagaRunner<'a> {
    registry: &'a dyn TenantRepository,
    tenant_id: TenantId,
    retry: Option<RetryPolicy>,
}

impl<'a> SagaRunner<'a> {
    /// Runner writing to `registry` on behalf of `tenant_id`; steps run once
    #[must_use]
    pub const fn new(registry: &'a dyn TenantRepository, tenant_id: TenantId) -> Self {
        Self {
            registry,
            tenant_id,
            retry: None,
        }
    }

    /// Wrap every step in [`with_retry`] using `policy`
    #[must_use]
    pub const fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Append one audit entry for this tenant
    ///
    /// # Errors
    ///
    /// Returns an error if the registry write fails
    pub async fn log(&self, step: &str, status: LogStatus, message: Option<&str>) -> AppResult<()> {
        let mut entry = NewProvisionLog::new(self.tenant_id, step, status);
        if let Some(message) = message {
            entry = entry.with_message(message);
        }
        self.registry.append_log(entry).await?;
        Ok(())
    }

    /// Record a failure without masking the error that caused it
    pub async fn log_failure(&self, step: &str, failure: &AppError) {
        if let Err(log_error) = self
            .log(step, LogStatus::Failed, Some(&failure.to_string()))
            .await
        {
            error!(
                tenant_id = %self.tenant_id,
                step,
                error = %log_error,
                "Failed to record step failure"
            );
        }
    }

    /// Run `steps` in order, stopping at the first failure
    ///
    /// # Errors
    ///
    /// Returns the failing step together with the number of steps that ran
    pub async fn run(&self, steps: &[SagaStep]) -> Result<(), StepFailure> {
        for (index, step) in steps.iter().enumerate() {
            let span = info_span!("saga_step", tenant_id = %self.tenant_id, step = step.name);
            self.run_step(step)
                .instrument(span)
                .await
                .map_err(|error| StepFailure {
                    step: step.name,
                    ran: index + 1,
                    error,
                })?;
        }
        Ok(())
    }

    async fn run_step(&self, step: &SagaStep) -> AppResult<()> {
        self.log(step.name, LogStatus::Started, None).await?;

        let outcome = match &self.retry {
            Some(policy) => with_retry(policy, step.name, || (step.run)()).await,
            None => (step.run)().await,
        };

        match outcome {
            Ok(()) => {
                self.log(step.name, LogStatus::Succeeded, None).await?;
                info!("Step succeeded");
                Ok(())
            }
            Err(error) => {
                warn!(error = %error, "Step failed");
                self.log_failure(step.name, &error).await;
                Err(error)
            }
        }
    }

    /// Compensate the first `ran` steps in reverse order
    ///
    /// The step that failed counts as ran: it may have created its resource
    /// before erroring, and drops are idempotent. Steps without a rollback are
    /// skipped. A failing rollback is logged and the remaining ones still run.
    pub async fn rollback(&self, steps: &[SagaStep], ran: usize) -> RollbackReport {
        let mut report = RollbackReport::default();

        for step in steps.iter().take(ran).rev() {
            let Some(rollback) = &step.rollback else {
                continue;
            };
            let label = format!("{}{ROLLBACK_SUFFIX}", step.name);
            report.attempted.push(step.name);

            let span = info_span!("saga_rollback", tenant_id = %self.tenant_id, step = %label);
            let result: AppResult<()> = async {
                self.log(&label, LogStatus::Started, None).await?;
                rollback().await?;
                self.log(&label, LogStatus::Succeeded, None).await
            }
            .instrument(span)
            .await;

            match result {
                Ok(()) => info!(tenant_id = %self.tenant_id, step = %label, "Rollback succeeded"),
                Err(error) => {
                    warn!(tenant_id = %self.tenant_id, step = %label, error = %error, "Rollback failed");
                    self.log_failure(&label, &error).await;
                    report.failed.push(step.name);
                }
            }
        }

        report
    }
}
