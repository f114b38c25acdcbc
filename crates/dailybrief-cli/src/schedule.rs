//! Cron-driven briefing runs.
//!
//! Cron expressions are evaluated in UTC; the default `0 0 23 * * Sun-Thu`
//! fires at 08:00 KST Monday through Friday.

use std::sync::Arc;

use anyhow::Context;
use futures::future::BoxFuture;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use dailybrief_core::AppConfig;

use crate::pipeline::{self, RunOptions, RunOutcome};

/// Register the briefing job and block until Ctrl-C.
///
/// # Errors
///
/// Returns an error if `OPENAI_API_KEY` is missing, the cron expression is
/// invalid or the scheduler cannot start.
pub(crate) async fn run_scheduled(config: AppConfig) -> anyhow::Result<()> {
    config.openai_api_key()?;
    let config = Arc::new(config);
    let mut scheduler = JobScheduler::new()
        .await
        .context("initialising job scheduler")?;

    register_briefing_job(&scheduler, Arc::clone(&config))
        .await
        .with_context(|| format!("registering briefing job ({})", config.schedule))?;

    scheduler.start().await.context("starting job scheduler")?;
    tracing::info!(cron = %config.schedule, "scheduler running; Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl-C")?;
    tracing::info!("scheduler: shutting down");
    scheduler
        .shutdown()
        .await
        .context("stopping job scheduler")?;
    Ok(())
}

async fn register_briefing_job(
    scheduler: &JobScheduler,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let cron = config.schedule.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        briefing_run(Arc::clone(&config))
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered briefing job");
    Ok(())
}

/// One scheduled briefing. The scheduler drives it on its own tasks, so the
/// future must be `Send + 'static`.
fn briefing_run(config: Arc<AppConfig>) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        tracing::info!("scheduler: starting briefing run");
        match pipeline::run(&config, &RunOptions::default()).await {
            Ok(RunOutcome::Completed { reports, page_id }) => {
                tracing::info!(reports, page_id = ?page_id, "scheduler: briefing run complete");
            }
            Ok(outcome) => {
                tracing::info!(outcome = ?outcome, "scheduler: briefing run skipped");
            }
            Err(e) => {
                tracing::error!(error = %e, "scheduler: briefing run failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn briefing_run_builds_a_send_future() {
        let config = dailybrief_core::load_app_config_from_env()
            .expect("defaults should load without any env vars");
        let job: BoxFuture<'static, ()> = briefing_run(Arc::new(config));
        drop(job);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn invalid_cron_is_rejected_at_registration() {
        let scheduler = JobScheduler::new().await.expect("scheduler");
        let mut config = dailybrief_core::load_app_config_from_env()
            .expect("defaults should load without any env vars");
        config.schedule = "every weekday at eight".to_string();

        let result = register_briefing_job(&scheduler, Arc::new(config)).await;
        assert!(result.is_err());
    }
}
