//! One-shot compilation runner.
//!
//! Operator tool: compiles a user's folder from the command line using
//! the same service the backend embeds, polling the tracker until the
//! job reaches a terminal state.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_engine::{CompilationService, EngineConfig};
use reel_models::{CompilationRequest, JobStatus};
use reel_storage::BucketStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("reel=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(true).with_target(true))
            .with(env_filter)
            .init();
    }

    let user_id = std::env::var("REEL_USER_ID").context("REEL_USER_ID not set")?;
    let folder_name = std::env::var("REEL_FOLDER").unwrap_or_else(|_| user_id.clone());

    let mut request = CompilationRequest {
        start_date: parse_date_env("REEL_START_DATE")?,
        end_date: parse_date_env("REEL_END_DATE")?,
        music_track: None,
    };
    if let Ok(path) = std::env::var("REEL_MUSIC_FILE") {
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading music track {}", path))?;
        request = request.with_music(bytes);
    }

    let store = Arc::new(BucketStore::from_env()?);
    let service = CompilationService::new(store.clone(), EngineConfig::from_env())?;

    let folder = store_folder(&*store, &folder_name).await?;
    let job_id = service
        .start_compilation(&user_id, &folder, request)
        .await?;
    info!(%job_id, "Compilation started");

    let mut last_message = String::new();
    loop {
        tokio::time::sleep(Duration::from_secs(2)).await;

        let Some(job) = service.get_status(&user_id).await else {
            bail!("job record disappeared while polling");
        };

        if job.progress_message != last_message {
            info!("{}", job.progress_message);
            last_message = job.progress_message.clone();
        }

        match job.status {
            JobStatus::Completed => {
                let artifact = job.result.context("completed job without artifact")?;
                info!(
                    output = %artifact.name,
                    segments = artifact.segment_count,
                    "Done"
                );
                service.clear_status(&user_id).await;
                return Ok(());
            }
            JobStatus::Failed => {
                let error = job.error.unwrap_or_else(|| "unknown error".to_string());
                service.clear_status(&user_id).await;
                bail!("compilation failed: {}", error);
            }
            JobStatus::Pending | JobStatus::Running => {}
        }
    }
}

async fn store_folder(
    store: &BucketStore,
    name: &str,
) -> anyhow::Result<reel_storage::FolderId> {
    use reel_storage::SegmentStore;
    Ok(store.get_or_create_folder(name).await?)
}

fn parse_date_env(var: &str) -> anyhow::Result<Option<NaiveDate>> {
    match std::env::var(var) {
        Ok(value) => {
            let date = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                .with_context(|| format!("{} must be YYYY-MM-DD, got {}", var, value))?;
            Ok(Some(date))
        }
        Err(_) => Ok(None),
    }
}
