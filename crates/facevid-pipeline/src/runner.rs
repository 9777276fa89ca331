//! Pipeline orchestration.
//!
//! Drives one run through the stage machine, one provider call per stage,
//! strictly forward. Each run owns a distinct output directory under
//! `<output_dir>/<subject>/<run_id>/`, so concurrent runs share no mutable
//! state. A stage failure is recorded on the run and propagated; the run
//! is never resumed.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{warn, Instrument};

use facevid_models::{PipelineRun, ReferenceImage};
use facevid_providers::{ImageProvider, VideoProvider, VisionLanguageProvider};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RunLogger;
use crate::metrics;
use crate::reference::load_reference_set;
use crate::stages;

/// Stage names used for failure tagging, logging and metrics.
pub mod stage_names {
    pub const LOAD_REFERENCES: &str = "load_references";
    pub const DESCRIBE: &str = "describe";
    pub const SYNTHESIZE: &str = "synthesize";
    pub const GENERATE_CANDIDATES: &str = "generate_candidates";
    pub const SELECT: &str = "select";
    pub const OUTPAINT: &str = "outpaint";
    pub const RENDER_VIDEO: &str = "render_video";
}

/// Name of the per-run manifest file.
pub const MANIFEST_FILE: &str = "run.json";

/// One sequential generation pipeline bound to its three providers.
pub struct Pipeline {
    config: PipelineConfig,
    vision: Arc<dyn VisionLanguageProvider>,
    images: Arc<dyn ImageProvider>,
    video: Arc<dyn VideoProvider>,
}

impl Pipeline {
    pub fn new(
        config: PipelineConfig,
        vision: Arc<dyn VisionLanguageProvider>,
        images: Arc<dyn ImageProvider>,
        video: Arc<dyn VideoProvider>,
    ) -> Self {
        Self {
            config,
            vision,
            images,
            video,
        }
    }

    /// Run the full pipeline for one subject and scenario.
    ///
    /// On success the returned run is in the `VideoRendered` stage with
    /// every artifact path populated. On failure the error names the stage
    /// that failed, and the persisted manifest records the same failure.
    pub async fn run(&self, reference_dir: &Path, scenario: &str) -> PipelineResult<PipelineRun> {
        // Fail fast on bad input, before any external call.
        if self.config.candidate_count == 0 {
            return Err(PipelineError::input_validation(
                "candidate count must be at least 1",
            ));
        }
        let references = load_reference_set(reference_dir).await?;

        let subject = reference_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "subject".to_string());

        let reference_paths = references.iter().map(|r| r.path.clone()).collect();
        let run = PipelineRun::new(&subject, scenario, reference_paths);
        let logger = RunLogger::new(&run.id, &subject);
        let span = logger.create_span();

        self.execute(run, references, scenario, &logger)
            .instrument(span)
            .await
    }

    /// Drive the staged body of a run inside its tracing span.
    async fn execute(
        &self,
        mut run: PipelineRun,
        references: Vec<ReferenceImage>,
        scenario: &str,
        logger: &RunLogger,
    ) -> PipelineResult<PipelineRun> {
        let run_dir = self
            .config
            .output_dir
            .join(&run.subject)
            .join(run.id.as_str());
        let candidates_dir = run_dir.join("candidates");
        tokio::fs::create_dir_all(&candidates_dir).await?;

        logger.stage_started(
            stage_names::DESCRIBE,
            &format!("profiling {} reference image(s)", references.len()),
        );
        let started = Instant::now();
        let profiles = match stages::describe_references(self.vision.as_ref(), &references).await {
            Ok(profiles) => {
                metrics::record_stage(stage_names::DESCRIBE, true, started.elapsed().as_secs_f64());
                profiles
            }
            Err(e) => {
                return self
                    .abort(run, &run_dir, logger, stage_names::DESCRIBE, started, e)
                    .await
            }
        };
        run = run.described();
        logger.stage_completed(
            stage_names::DESCRIBE,
            &format!("{} conformant profile(s)", profiles.len()),
        );

        logger.stage_started(stage_names::SYNTHESIZE, "reconciling profiles");
        let started = Instant::now();
        let description =
            match stages::synthesize_description(self.vision.as_ref(), &profiles).await {
                Ok(description) => {
                    metrics::record_stage(
                        stage_names::SYNTHESIZE,
                        true,
                        started.elapsed().as_secs_f64(),
                    );
                    description
                }
                Err(e) => {
                    return self
                        .abort(run, &run_dir, logger, stage_names::SYNTHESIZE, started, e)
                        .await
                }
            };
        run = run.synthesized();
        logger.stage_completed(stage_names::SYNTHESIZE, "subject description ready");

        logger.stage_started(
            stage_names::GENERATE_CANDIDATES,
            &format!("requesting {} square candidate(s)", self.config.candidate_count),
        );
        let started = Instant::now();
        let candidates = match stages::generate_candidates(
            self.images.as_ref(),
            &references,
            &description,
            scenario,
            self.config.candidate_count,
            &candidates_dir,
        )
        .await
        {
            Ok(candidates) => {
                metrics::record_stage(
                    stage_names::GENERATE_CANDIDATES,
                    true,
                    started.elapsed().as_secs_f64(),
                );
                candidates
            }
            Err(e) => {
                return self
                    .abort(
                        run,
                        &run_dir,
                        logger,
                        stage_names::GENERATE_CANDIDATES,
                        started,
                        e,
                    )
                    .await
            }
        };
        run = run.candidates_generated(candidates.iter().map(|c| c.path.clone()).collect());
        logger.stage_completed(
            stage_names::GENERATE_CANDIDATES,
            &format!("{} candidate(s) persisted", candidates.len()),
        );

        logger.stage_started(stage_names::SELECT, "ranking candidates against references");
        let started = Instant::now();
        let selected =
            match stages::select_best(self.vision.as_ref(), &references, &candidates).await {
                Ok(selected) => {
                    metrics::record_stage(stage_names::SELECT, true, started.elapsed().as_secs_f64());
                    selected
                }
                Err(e) => {
                    return self
                        .abort(run, &run_dir, logger, stage_names::SELECT, started, e)
                        .await
                }
            };
        run = run.selected(selected.index);
        logger.stage_completed(
            stage_names::SELECT,
            &format!("candidate {} promoted", selected.index),
        );

        logger.stage_started(stage_names::OUTPAINT, "expanding to 16:9");
        let started = Instant::now();
        let outpainted_path = run_dir.join("outpainted.png");
        let outpainted = match stages::outpaint_selected(
            self.images.as_ref(),
            &selected,
            scenario,
            &outpainted_path,
        )
        .await
        {
            Ok(outpainted) => {
                metrics::record_stage(stage_names::OUTPAINT, true, started.elapsed().as_secs_f64());
                outpainted
            }
            Err(e) => {
                return self
                    .abort(run, &run_dir, logger, stage_names::OUTPAINT, started, e)
                    .await
            }
        };
        run = run.outpainted(outpainted.path.clone());
        logger.stage_completed(
            stage_names::OUTPAINT,
            &format!("{}x{} frame ready", outpainted.width, outpainted.height),
        );

        logger.stage_started(stage_names::RENDER_VIDEO, "rendering clip");
        let started = Instant::now();
        let video_path = run_dir.join("video.mp4");
        let video_path =
            match stages::render_video(self.video.as_ref(), &outpainted, scenario, &video_path)
                .await
            {
                Ok(path) => {
                    metrics::record_stage(
                        stage_names::RENDER_VIDEO,
                        true,
                        started.elapsed().as_secs_f64(),
                    );
                    path
                }
                Err(e) => {
                    return self
                        .abort(run, &run_dir, logger, stage_names::RENDER_VIDEO, started, e)
                        .await
                }
            };
        run = run.video_rendered(video_path);
        logger.stage_completed(stage_names::RENDER_VIDEO, "run complete");

        metrics::record_run(true);
        self.persist_manifest(&run, &run_dir).await;
        Ok(run)
    }

    /// Record a terminal failure, persist what we know, and propagate.
    async fn abort(
        &self,
        run: PipelineRun,
        run_dir: &Path,
        logger: &RunLogger,
        stage: &'static str,
        started: Instant,
        err: PipelineError,
    ) -> PipelineResult<PipelineRun> {
        let err = err.with_stage(stage);
        metrics::record_stage(stage, false, started.elapsed().as_secs_f64());
        metrics::record_run(false);
        logger.stage_failed(stage, &err.to_string());

        let failed = run.fail(stage, err.to_string());
        self.persist_manifest(&failed, run_dir).await;
        Err(err)
    }

    /// Write the run manifest. Best effort: a manifest write failure never
    /// masks the run's own outcome.
    async fn persist_manifest(&self, run: &PipelineRun, run_dir: &Path) {
        let path = run_dir.join(MANIFEST_FILE);
        let json = match serde_json::to_vec_pretty(run) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize run manifest: {}", e);
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&path, json).await {
            warn!("Failed to write run manifest {}: {}", path.display(), e);
        }
    }
}
