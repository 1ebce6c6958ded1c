//! End-to-end run: links → resolution → validation → IDM queue → resume → summary.
//!
//! [`Pipeline`] owns one run. Every collaborator with a side effect (HTTP
//! probing, landing-page resolution, the download manager, the existing-file
//! prompt) can be swapped through a `with_*` builder method; anything not
//! supplied is built from the [`AppConfig`].

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::idm::{DownloadManager, IdmController, IdmError, reconcile_with_idm_state};
use crate::input::generate_multipart;
use crate::queue::{
    ExistingFilePrompt, ExistingFileResolver, QueueAborted, QueueOutcome, QueueRunner,
    TerminalPrompt, filename_from_url,
};
use crate::report::{FilePart, GenerationReport, RejectedLink, RejectionStage};
use crate::resolver::{
    ResolveContext, ResolveError, ResolveMethod, ResolverRegistry, build_resolver_registry,
    is_http_url,
};
use crate::resume::{ResumeError, load_resume_state, save_resume_state};
use crate::summary::RunSummary;
use crate::validator::{HttpLinkValidator, LinkValidator};

/// Stop reason for explicit-link modes.
pub const EXPLICIT_STOP_REASON: &str = "input_urls processed";

/// Fatal run errors. Per-link failures never surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The download directory could not be created
    #[error("could not create download directory '{}': {source}", .path.display())]
    DownloadDir {
        /// Configured `download_path`
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// An HTTP client could not be built
    #[error(transparent)]
    Client(#[from] ResolveError),

    /// IDM is missing or vanished mid-run
    #[error(transparent)]
    Idm(#[from] IdmError),

    /// Resume state could not be saved
    #[error(transparent)]
    Resume(#[from] ResumeError),
}

/// One configured run.
pub struct Pipeline {
    config: AppConfig,
    validator: Option<Box<dyn LinkValidator>>,
    resolver: Option<ResolverRegistry>,
    manager: Option<Box<dyn DownloadManager>>,
    prompt: Option<Box<dyn ExistingFilePrompt>>,
}

impl Pipeline {
    /// Creates a run with collaborators derived from `config`.
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            validator: None,
            resolver: None,
            manager: None,
            prompt: None,
        }
    }

    /// Replaces the HTTP link validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Box<dyn LinkValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Replaces the landing-page resolver registry.
    #[must_use]
    pub fn with_resolver(mut self, resolver: ResolverRegistry) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Replaces the IDM controller.
    #[must_use]
    pub fn with_download_manager(mut self, manager: Box<dyn DownloadManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Replaces the terminal prompt used by `existing_file_action = ask`.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Box<dyn ExistingFilePrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Configuration for this run.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs to completion and returns the summary.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for fatal conditions only: the download
    /// directory, HTTP client construction, IDM missing, or a failed resume save.
    #[tracing::instrument(skip_all, fields(mode = %self.config.input.mode, dry_run = self.config.dry_run))]
    pub async fn run(self, interrupted: Arc<AtomicBool>) -> Result<RunSummary, PipelineError> {
        let Self {
            config,
            validator,
            resolver,
            manager,
            prompt,
        } = self;

        if !config.dry_run {
            fs::create_dir_all(&config.download_path).map_err(|source| {
                PipelineError::DownloadDir {
                    path: config.download_path.clone(),
                    source,
                }
            })?;
        }

        let validator: Box<dyn LinkValidator> = match validator {
            Some(validator) => validator,
            None => Box::new(HttpLinkValidator::new(
                config.validation_policy(),
                &config.http_settings(),
            )?),
        };

        let report = if config.input.mode.is_explicit() {
            info!(
                mode = %config.input.mode,
                count = config.input.urls.len(),
                "Using explicit link mode"
            );
            let resolver = if config.resolve_download_button_links {
                Some(match resolver {
                    Some(resolver) => resolver,
                    None => build_resolver_registry(&config.resolver_settings())?,
                })
            } else {
                None
            };
            let ctx = ResolveContext::new(config.request_timeout());
            build_report_from_links(
                &config.input.urls,
                resolver.as_ref(),
                &ctx,
                validator.as_ref(),
                &interrupted,
            )
            .await
        } else {
            info!(
                base_url = %config.base_url,
                pattern = %config.filename_pattern,
                start = config.start_index,
                "Using generated multipart mode"
            );
            generate_multipart(
                &config.multipart_pattern(),
                config.start_index,
                config.end_index,
                config.max_part,
                validator.as_ref(),
                &interrupted,
            )
            .await
        };

        if report.interrupted {
            warn!(
                examined = report.examined_count,
                "Process interrupted by user (Ctrl+C) before queueing; nothing was sent to IDM"
            );
            return Ok(RunSummary::new(
                config.input.mode,
                &report,
                &QueueOutcome::default(),
                config.dry_run,
            ));
        }

        if report.parts.is_empty() {
            warn!("No valid parts detected. Nothing to queue.");
            return Ok(RunSummary::new(
                config.input.mode,
                &report,
                &QueueOutcome::default(),
                config.dry_run,
            ));
        }

        let manager: Option<Box<dyn DownloadManager>> = if config.dry_run {
            None
        } else {
            let manager = manager.unwrap_or_else(|| Box::new(IdmController::from_config(&config)));
            manager.ensure_available()?;
            Some(manager)
        };

        let mut resume = if config.resume_mode {
            load_resume_state(&config.resume_state_file)
        } else {
            BTreeSet::new()
        };
        if !config.dry_run && config.resume_mode && config.validate_resume_with_idm {
            resume = reconcile_with_idm_state(resume, &config.idm_state_dir);
        }

        let prompt = prompt.unwrap_or_else(|| Box::new(TerminalPrompt::stdin()));
        let mut runner = QueueRunner::new(
            manager.as_deref(),
            config.download_path.clone(),
            config.resume_mode,
            ExistingFileResolver::new(config.existing_file_action, prompt),
        );
        let persist_resume = config.resume_mode && !config.dry_run;

        let outcome = match runner.run(&report.parts, &mut resume, &interrupted).await {
            Ok(outcome) => outcome,
            Err(QueueAborted { outcome, error }) => {
                warn!(queued = outcome.queued, "Queue aborted; saving partial progress");
                if persist_resume {
                    save_resume_state(&config.resume_state_file, &resume)?;
                }
                return Err(error.into());
            }
        };

        if !config.dry_run && outcome.queued == 0 {
            if outcome.skipped > 0 && config.resume_mode {
                warn!(
                    skipped = outcome.skipped,
                    "No new queue created; skips come from resume state and/or the existing-file policy"
                );
            } else {
                warn!(
                    "No URL was queued to IDM despite valid parts; check the [IDM] diagnostics in the log"
                );
            }
        }

        if persist_resume {
            save_resume_state(&config.resume_state_file, &resume)?;
        }

        if let Some(manager) = manager.as_deref() {
            post_queue_actions(&config, manager, &outcome).await?;
        } else if outcome.interrupted {
            warn!("Process interrupted by user (Ctrl+C)");
        }

        Ok(RunSummary::new(config.input.mode, &report, &outcome, config.dry_run))
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

/// Starts the IDM queue after a successful, uninterrupted, non-empty pass.
async fn post_queue_actions(
    config: &AppConfig,
    manager: &dyn DownloadManager,
    outcome: &QueueOutcome,
) -> Result<(), IdmError> {
    if outcome.interrupted {
        warn!("Process interrupted by user (Ctrl+C)");
        return Ok(());
    }
    if !config.auto_start_queue || outcome.queued == 0 {
        return Ok(());
    }
    if !config.queue_only {
        warn!("auto_start_queue is ignored because queue_only=false (downloads were started immediately)");
        return Ok(());
    }

    if config.launch_idm_shortcut {
        if let Err(err) = manager.launch_via_shortcut().await {
            if err.is_fatal() {
                return Err(err);
            }
            error!(error = %err, "Could not launch IDM through its shortcut");
        }
    }
    match manager.start_queue().await {
        Ok(()) => {
            info!("IDM queue started");
            Ok(())
        }
        Err(err) if err.is_fatal() => Err(err),
        Err(err) => {
            error!(error = %err, "Could not start the IDM queue");
            Ok(())
        }
    }
}

/// Resolves and validates explicit links in order.
///
/// Resolution failures and validation rejections drop the link and are
/// recorded in the report. A 200/206 answer that only lacks a size is
/// accepted; IDM determines the size itself. `interrupted` is checked
/// before each link; once set, the remaining links are left unexamined.
pub async fn build_report_from_links(
    urls: &[String],
    resolver: Option<&ResolverRegistry>,
    ctx: &ResolveContext,
    validator: &dyn LinkValidator,
    interrupted: &AtomicBool,
) -> GenerationReport {
    let mut report = GenerationReport {
        stop_reason: EXPLICIT_STOP_REASON.to_string(),
        ..GenerationReport::default()
    };

    for (position, url) in urls.iter().enumerate() {
        let index = u64::try_from(position).unwrap_or(u64::MAX).saturating_add(1);
        if interrupted.load(Ordering::SeqCst) {
            warn!(index, "Interrupted while checking links");
            report.mark_interrupted(index);
            return report;
        }
        report.examined_count += 1;

        let target = match resolver.filter(|_| is_http_url(url)) {
            None => url.clone(),
            Some(registry) => match registry.resolve(url, ctx).await {
                Ok(resolved) => {
                    if resolved.method.is_rewrite() {
                        info!(url = %url, target = %resolved.url, "[RESOLVED] {url} -> {}", resolved.url);
                    } else if resolved.method != ResolveMethod::AlreadyDirect {
                        info!(url = %url, reason = %resolved.method, "[RESOLVE SKIP]");
                    }
                    resolved.url
                }
                Err(err) => {
                    let reason = err.reason();
                    warn!(url = %url, reason = %reason, "[RESOLVE FAILED]");
                    report.rejected.push(RejectedLink {
                        url: url.clone(),
                        stage: RejectionStage::Resolve,
                        reason,
                    });
                    continue;
                }
            },
        };

        let result = validator.validate(&target).await;
        let size_bytes = if result.is_valid() {
            result.size_bytes
        } else if result.is_unknown_size_only() {
            warn!(
                url = %target,
                "[INPUT URL SIZE UNKNOWN] Proceeding with IDM queue (size not provided by server)"
            );
            0
        } else {
            let reason = result.reason();
            warn!(url = %target, reason = %reason, "[INPUT URL INVALID]");
            report.rejected.push(RejectedLink {
                url: url.clone(),
                stage: RejectionStage::Validate,
                reason,
            });
            continue;
        };

        report.parts.push(FilePart {
            index,
            filename: filename_from_url(url, index),
            url: target,
            size_bytes,
        });
    }

    report.stop_index = (report.examined_count > 0)
        .then(|| u64::try_from(report.examined_count).unwrap_or(u64::MAX));
    report
}
