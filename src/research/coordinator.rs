//! Research run orchestration.
//!
//! [`ResearchCoordinator`] walks a run through its phases, reporting each
//! transition to `tracing` and an optional progress channel, and always ends
//! with one [`ResearchOutcome`], degraded to the fallback report when the
//! analysis backend is missing or fails.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::timeout;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    llm::{LLMClient, Provider},
    research::{
        brief::BriefSynthesizer,
        collector::SourceCollector,
        fallback::FallbackReportBuilder,
        prompt::{AnalysisFormatter, build_analysis_prompt},
    },
    tools::{DaedraSearch, Encyclopedia, HttpPageFetcher, PageFetcher, WebSearch, WikipediaClient},
    types::{AnalysisResult, AppError, ResearchBrief, ResearchOutcome, Result},
    utils::toml_config::ResearchConfig,
};

/// Domain used when the caller passes none
pub const DEFAULT_DOMAIN: &str = "general";

/// Where a research run currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchPhase {
    Idle,
    CollectingWeb,
    CollectingWiki,
    Synthesizing,
    Analyzing,
    Done,
    Failed,
}

impl ResearchPhase {
    /// Fraction of the run completed on entering this phase
    pub fn progress(&self) -> f32 {
        match self {
            ResearchPhase::Idle => 0.0,
            ResearchPhase::CollectingWeb => 0.1,
            ResearchPhase::CollectingWiki => 0.5,
            ResearchPhase::Synthesizing => 0.7,
            ResearchPhase::Analyzing => 0.8,
            ResearchPhase::Done | ResearchPhase::Failed => 1.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ResearchPhase::Done | ResearchPhase::Failed)
    }
}

impl std::fmt::Display for ResearchPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResearchPhase::Idle => "idle",
            ResearchPhase::CollectingWeb => "collecting_web",
            ResearchPhase::CollectingWiki => "collecting_wiki",
            ResearchPhase::Synthesizing => "synthesizing",
            ResearchPhase::Analyzing => "analyzing",
            ResearchPhase::Done => "done",
            ResearchPhase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Phase transition reported to an attached progress channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub run_id: Uuid,
    pub phase: ResearchPhase,
    pub progress: f32,
    pub message: String,
}

/// Drives one research run: collect, synthesize, analyze.
///
/// Collection and analysis failures never abort a run; they shrink the
/// source set or switch the narrative to the fallback report. Only an empty
/// topic (at run time) or an invalid configuration (at construction) fails.
pub struct ResearchCoordinator {
    config: Arc<ResearchConfig>,
    collector: SourceCollector,
    synthesizer: BriefSynthesizer,
    fallback: FallbackReportBuilder,
    formatter: AnalysisFormatter,
    backend: Option<Arc<dyn LLMClient>>,
    progress: Option<UnboundedSender<ProgressUpdate>>,
}

impl ResearchCoordinator {
    pub fn new(
        config: Arc<ResearchConfig>,
        search: Arc<dyn WebSearch>,
        fetcher: Arc<dyn PageFetcher>,
        encyclopedia: Arc<dyn Encyclopedia>,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            collector: SourceCollector::new(config.clone(), search, fetcher, encyclopedia)?,
            synthesizer: BriefSynthesizer::new(&config),
            fallback: FallbackReportBuilder::new(),
            formatter: AnalysisFormatter::new()?,
            backend: None,
            progress: None,
            config,
        })
    }

    /// Coordinator wired to the network collaborators and the configured
    /// backend. A backend that cannot be created leaves the run degraded.
    pub async fn from_config(config: Arc<ResearchConfig>) -> Result<Self> {
        let coordinator = Self::new(
            config.clone(),
            Arc::new(DaedraSearch::new()),
            Arc::new(HttpPageFetcher::new()?),
            Arc::new(WikipediaClient::new()?),
        )?;

        Ok(coordinator.with_configured_backend().await)
    }

    /// Attach the backend named in `[backend.provider]`. A missing API key or
    /// an unreachable backend is logged and leaves the run degraded.
    pub async fn with_configured_backend(self) -> Self {
        let Some(provider_config) = &self.config.backend.provider else {
            info!("No analysis backend configured; reports will use fallback mode");
            return self;
        };

        let client = match Provider::from_config(provider_config) {
            Ok(provider) => provider.create_client().await,
            Err(e) => Err(e),
        };
        match client {
            Ok(client) => {
                info!(model = client.model_name(), "Analysis backend ready");
                self.with_backend(Arc::from(client))
            }
            Err(e) => {
                warn!(error = %e, "Analysis backend unavailable; reports will use fallback mode");
                self
            }
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn LLMClient>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_progress(mut self, progress: UnboundedSender<ProgressUpdate>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ResearchConfig {
        &self.config
    }

    /// Research `topic` within `domain` and return the outcome
    pub async fn run(&self, topic: &str, domain: &str) -> Result<ResearchOutcome> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let topic = topic.trim();
        if topic.is_empty() {
            self.transition(run_id, ResearchPhase::Failed, "Research topic is empty");
            return Err(AppError::InvalidInput("Research topic is empty".to_string()));
        }
        let domain = match domain.trim() {
            "" => DEFAULT_DOMAIN,
            d => d,
        };

        self.transition(run_id, ResearchPhase::Idle, &format!("Researching '{}'", topic));

        self.transition(run_id, ResearchPhase::CollectingWeb, "Searching legal databases");
        let web = self.collector.collect_web(topic).await;

        self.transition(run_id, ResearchPhase::CollectingWiki, "Gathering Wikipedia data");
        let wiki = self.collector.collect_encyclopedia(topic).await;

        self.transition(run_id, ResearchPhase::Synthesizing, "Synthesizing research brief");
        let brief = self
            .synthesizer
            .synthesize(topic, domain, &web.documents, &wiki.documents);

        self.transition(run_id, ResearchPhase::Analyzing, "Analyzing legal information");
        let analysis = self.analyze(&brief).await;

        let mut skipped = web.skipped;
        skipped.extend(wiki.skipped);

        let outcome = ResearchOutcome {
            run_id,
            analysis,
            web_documents: web.documents,
            wiki_documents: wiki.documents,
            skipped,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        self.transition(
            run_id,
            ResearchPhase::Done,
            &format!(
                "Research complete: {} sources, quality {:.1}/10{}",
                outcome.analysis.sources_count,
                outcome.analysis.quality_score,
                if outcome.analysis.degraded { " (fallback)" } else { "" }
            ),
        );

        Ok(outcome)
    }

    async fn analyze(&self, brief: &ResearchBrief) -> AnalysisResult {
        let Some(backend) = &self.backend else {
            info!("No analysis backend, building fallback report");
            return self.fallback.build(brief, Utc::now());
        };

        let prompt = build_analysis_prompt(brief);
        let limit = self.config.backend.timeout();

        match timeout(limit, backend.generate(&prompt)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => AnalysisResult {
                topic: brief.topic.clone(),
                domain: brief.domain.clone(),
                narrative_text: self.formatter.format(&text),
                timestamp: Utc::now(),
                sources_count: brief.sources_count(),
                quality_score: brief.data_quality,
                degraded: false,
                model: Some(backend.model_name().to_string()),
            },
            Ok(Ok(_)) => {
                error!(model = backend.model_name(), "Analysis backend returned an empty answer");
                self.fallback.build(brief, Utc::now())
            }
            Ok(Err(e)) => {
                error!(model = backend.model_name(), error = %e, "Analysis backend failed");
                self.fallback.build(brief, Utc::now())
            }
            Err(_) => {
                error!(model = backend.model_name(), timeout = ?limit, "Analysis backend timed out");
                self.fallback.build(brief, Utc::now())
            }
        }
    }

    fn transition(&self, run_id: Uuid, phase: ResearchPhase, message: &str) {
        info!(
            run_id = %run_id,
            phase = %phase,
            progress = phase.progress(),
            "{}",
            message
        );

        if let Some(tx) = &self.progress {
            // A dropped receiver only means nobody is watching.
            let _ = tx.send(ProgressUpdate {
                run_id,
                phase,
                progress: phase.progress(),
                message: message.to_string(),
            });
        }
    }
}
