//! The compilation engine.
//!
//! One `compile` call runs the whole pipeline for one user: catalog →
//! download → normalize → concatenate → upload. Items are processed
//! strictly in ascending date order, one at a time; the bounded-memory,
//! bounded-disk behavior of the service depends on that. Any failure
//! aborts the run; the workspace is destroyed on every exit path.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, warn};

use reel_media::{concat_segments, normalize_item, EncoderPaths, FfmpegRunner};
use reel_models::naming::output_name;
use reel_models::{CompilationArtifact, CompilationRequest, EncodingProfile, MediaItem};
use reel_storage::{FolderId, SegmentStore};

use crate::catalog::build_catalog;
use crate::config::EngineConfig;
use crate::error::{CompileError, CompileResult};
use crate::metrics;
use crate::progress::{ProgressSink, Stage};
use crate::workspace::Workspace;

/// MIME type of every compilation output.
const OUTPUT_MIME: &str = "video/mp4";

/// Orchestrates compilation runs against one segment store.
pub struct CompilationEngine {
    store: Arc<dyn SegmentStore>,
    encoder: EncoderPaths,
    profile: EncodingProfile,
    config: EngineConfig,
}

impl CompilationEngine {
    /// Create an engine. Encoder paths are resolved by the caller once
    /// at service construction.
    pub fn new(store: Arc<dyn SegmentStore>, encoder: EncoderPaths, config: EngineConfig) -> Self {
        Self {
            store,
            encoder,
            profile: EncodingProfile::default(),
            config,
        }
    }

    /// Run one compilation to completion.
    pub async fn compile(
        &self,
        folder: &FolderId,
        request: &CompilationRequest,
        progress: &ProgressSink,
    ) -> CompileResult<CompilationArtifact> {
        let started = Instant::now();

        let result = self.compile_inner(folder, request, progress).await;

        match &result {
            Ok(artifact) => {
                metrics::record_run("completed", started.elapsed());
                metrics::record_segments(artifact.segment_count as usize);
                info!(
                    output = %artifact.name,
                    segments = artifact.segment_count,
                    "Compilation finished in {:.1}s",
                    started.elapsed().as_secs_f64()
                );
            }
            Err(err) => {
                metrics::record_run("failed", started.elapsed());
                warn!("Compilation failed: {}", err);
            }
        }

        result
    }

    async fn compile_inner(
        &self,
        folder: &FolderId,
        request: &CompilationRequest,
        progress: &ProgressSink,
    ) -> CompileResult<CompilationArtifact> {
        progress.emit(Stage::Fetching, "Fetching media list...");
        let catalog =
            build_catalog(self.store.as_ref(), folder, request, self.config.min_clips).await?;
        info!(clips = catalog.len(), "Catalog built");

        // Nothing before this point touches the disk; catalog errors
        // leave no trace behind.
        let workspace = Workspace::create(&self.config.work_dir)?;

        let result = self
            .run_in_workspace(&workspace, folder, request, &catalog, progress)
            .await;

        // The workspace is removed on both paths; `close` only exists to
        // surface removal errors on success. The Drop on the error path
        // removes it just the same.
        if result.is_ok() {
            if let Err(e) = workspace.close() {
                warn!("Workspace removal failed: {}", e);
            }
        }

        result
    }

    async fn run_in_workspace(
        &self,
        workspace: &Workspace,
        folder: &FolderId,
        request: &CompilationRequest,
        catalog: &[MediaItem],
        progress: &ProgressSink,
    ) -> CompileResult<CompilationArtifact> {
        let total = catalog.len();

        // Download everything first, in date order.
        for (i, item) in catalog.iter().enumerate() {
            progress.emit(
                Stage::Downloading,
                format!("Downloading {}/{}...", i + 1, total),
            );
            let raw = workspace.raw_path(&item.raw_file_name());
            self.store
                .download_to(&item.remote_id, &raw)
                .await
                .map_err(|e| CompileError::from_fetch(item.name.clone(), e))?;
        }

        // Normalize each item; drop the raw download as soon as its
        // segment exists to bound disk usage.
        let normalize_runner = FfmpegRunner::new(self.encoder.clone())
            .with_timeout(self.config.normalize_timeout);
        let mut segments: Vec<PathBuf> = Vec::with_capacity(total);

        for (i, item) in catalog.iter().enumerate() {
            progress.emit(
                Stage::Normalizing,
                format!("Normalizing {}/{}...", i + 1, total),
            );
            let raw = workspace.raw_path(&item.raw_file_name());
            let segment = workspace.segment_path(&item.segment_file_name());

            normalize_item(&normalize_runner, &self.profile, item.kind, &raw, &segment)
                .await
                .map_err(|e| CompileError::Normalization {
                    date: item.date,
                    source: e,
                })?;

            tokio::fs::remove_file(&raw).await?;
            segments.push(segment);
        }

        // Persist the music track, if one was attached.
        let music = match &request.music_track {
            Some(bytes) => {
                let path = workspace.music_path();
                tokio::fs::write(&path, bytes).await?;
                Some(path)
            }
            None => None,
        };

        progress.emit(
            Stage::Concatenating,
            format!("Assembling {} segments...", total),
        );
        let name = output_name(
            &self.config.output_prefix,
            request.range(),
            Utc::now().timestamp(),
        );
        let output = workspace.output_path(&name);
        let concat_runner = FfmpegRunner::new(self.encoder.clone());

        concat_segments(
            &concat_runner,
            &segments,
            music.as_deref(),
            &self.profile,
            &output,
        )
        .await
        .map_err(CompileError::Concatenation)?;

        progress.emit(Stage::Uploading, "Uploading compilation...");
        let bytes = tokio::fs::read(&output).await?;
        let uploaded = self
            .store
            .upload(folder, &name, OUTPUT_MIME, bytes)
            .await
            .map_err(CompileError::from_upload)?;

        progress.emit(Stage::Done, "Compilation complete");
        Ok(CompilationArtifact {
            remote_id: uploaded.id,
            name: uploaded.name,
            segment_count: total as u32,
        })
    }
}
