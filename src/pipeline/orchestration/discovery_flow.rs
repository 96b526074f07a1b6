use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Configuration;
use crate::error::AppError;
use crate::pipeline::orchestration::flow_phase::{
    Completion, FlowPhase, RequestKind, RequestTicket, SelectionTicket,
};
use crate::pipeline::orchestration::save_payload::build_save_request;
use crate::pipeline::services::classification::AttributeClassifier;
use crate::pipeline::services::query::{filter_by_threshold, FilteredResults, QueryComposer};
use crate::pipeline::types::{
    AcquiredImage, AnalysisResult, Candidate, ImageReference, InferredProfile, Product,
    SaveRequest, SearchQuery, Threshold,
};

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: RequestTicket,
    resume: FlowPhase,
    limit: usize,
}

/// One user's walk from an image to filtered search results.
///
/// Requests are split into `begin_*` (validates the transition, moves into
/// the in-flight phase and hands out a ticket) and `complete_*` (applies or
/// discards the response). Nothing here awaits, so the flow can sit behind
/// a lock that is released while the collaborator call runs.
#[derive(Debug)]
pub struct DiscoveryFlow {
    id: Uuid,
    phase: FlowPhase,
    generation: u64,
    selection: u64,
    pending: Option<Pending>,
    image: Option<AcquiredImage>,
    analysis: Option<AnalysisResult>,
    profile: InferredProfile,
    last_query: Option<SearchQuery>,
    candidates: Vec<Candidate>,
    has_searched: bool,
    threshold: Threshold,
    saved: Option<Product>,
    last_error: Option<String>,
    classifier: AttributeClassifier,
    composer: QueryComposer,
}

impl DiscoveryFlow {
    pub fn new(threshold: Threshold, composer: QueryComposer) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: FlowPhase::Idle,
            generation: 0,
            selection: 0,
            pending: None,
            image: None,
            analysis: None,
            profile: InferredProfile::default(),
            last_query: None,
            candidates: Vec::new(),
            has_searched: false,
            threshold,
            saved: None,
            last_error: None,
            classifier: AttributeClassifier::new(),
            composer,
        }
    }

    pub fn from_configuration(configuration: &Configuration) -> Self {
        Self::new(
            Threshold::clamped(configuration.min_similarity),
            QueryComposer::new()
                .with_limit(configuration.search_limit)
                .with_tag_keyword_limit(configuration.tag_keyword_limit),
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn image(&self) -> Option<&AcquiredImage> {
        self.image.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn profile(&self) -> &InferredProfile {
        &self.profile
    }

    /// The query sent by the most recent search for the current analysis.
    pub fn last_query(&self) -> Option<&SearchQuery> {
        self.last_query.as_ref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn saved(&self) -> Option<&Product> {
        self.saved.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn save_message(&self) -> Option<String> {
        self.saved
            .as_ref()
            .map(|product| format!("Saved as #{}: {}", product.record_id, product.name))
    }

    /// Reserves a selection before its image is acquired. Acquisitions begun
    /// earlier become stale.
    pub fn begin_select(&mut self) -> SelectionTicket {
        self.selection += 1;
        SelectionTicket(self.selection)
    }

    /// Applies an acquired image unless a newer selection has begun since
    /// `ticket` was reserved. A failed acquisition leaves the flow untouched.
    pub fn complete_select(
        &mut self,
        ticket: SelectionTicket,
        result: Result<AcquiredImage, AppError>,
    ) -> Result<Completion, AppError> {
        if ticket.0 != self.selection {
            debug!(
                "Flow {} discarding stale image selection {} (current {})",
                self.id, ticket.0, self.selection
            );
            return Ok(Completion::Discarded);
        }
        self.select_image(result?);
        Ok(Completion::Applied)
    }

    /// Starts over with a new image. Anything derived from the previous image
    /// is dropped and any in-flight response becomes stale.
    pub fn select_image(&mut self, image: AcquiredImage) {
        self.selection += 1;
        self.generation += 1;
        if let Some(pending) = self.pending.take() {
            debug!(
                "Flow {} abandoning in-flight {} request",
                self.id,
                pending.ticket.kind.name()
            );
        }

        self.profile = InferredProfile::from_extracted_color(image.derived_color.clone());
        self.image = Some(image);
        self.analysis = None;
        self.last_query = None;
        self.candidates.clear();
        self.has_searched = false;
        self.saved = None;
        self.last_error = None;
        self.transition(FlowPhase::ImageAcquired);
    }

    pub fn begin_analyze(&mut self) -> Result<(RequestTicket, ImageReference), AppError> {
        self.ensure_idle_for(RequestKind::Analyze)?;
        let image = self
            .image
            .as_ref()
            .map(|image| image.reference.clone())
            .ok_or(AppError::MissingImage)?;

        let ticket = self.issue(RequestKind::Analyze, 0);
        Ok((ticket, image))
    }

    pub fn complete_analyze(
        &mut self,
        ticket: RequestTicket,
        result: Result<AnalysisResult, AppError>,
    ) -> Result<Completion, AppError> {
        let Some(pending) = self.settle(ticket) else {
            return Ok(Completion::Discarded);
        };

        match result {
            Ok(analysis) => {
                let extracted = self
                    .image
                    .as_ref()
                    .and_then(|image| image.derived_color.as_deref());
                self.profile = self.classifier.classify(&analysis.raw, extracted);
                info!(
                    "Flow {} classified image as {:?} / {:?} ({})",
                    self.id, self.profile.category, self.profile.color, self.profile.name
                );
                self.analysis = Some(analysis);
                self.last_query = None;
                self.candidates.clear();
                self.has_searched = false;
                self.saved = None;
                self.last_error = None;
                self.transition(FlowPhase::Analyzed);
                Ok(Completion::Applied)
            }
            Err(e) => Err(self.fail(pending.resume, e)),
        }
    }

    pub fn begin_search(&mut self) -> Result<(RequestTicket, SearchQuery), AppError> {
        self.ensure_idle_for(RequestKind::Search)?;
        self.ensure_analyzed("search")?;
        let analysis = self.analysis.as_ref().ok_or(AppError::InvalidTransition {
            action: "search",
            phase: self.phase.name(),
        })?;

        let query = self.composer.compose(
            self.image.as_ref().map(|image| &image.reference),
            analysis,
            &self.profile,
        )?;

        self.candidates.clear();
        self.saved = None;
        self.last_query = Some(query.clone());
        let ticket = self.issue(RequestKind::Search, query.limit);
        Ok((ticket, query))
    }

    pub fn complete_search(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<Candidate>, AppError>,
    ) -> Result<Completion, AppError> {
        let Some(pending) = self.settle(ticket) else {
            return Ok(Completion::Discarded);
        };

        match result {
            Ok(mut candidates) => {
                if candidates.len() > pending.limit {
                    warn!(
                        "Search returned {} candidates, keeping the first {}",
                        candidates.len(),
                        pending.limit
                    );
                    candidates.truncate(pending.limit);
                }
                self.candidates = candidates;
                self.has_searched = true;
                self.last_error = None;
                self.transition(FlowPhase::Searched);
                Ok(Completion::Applied)
            }
            Err(e) => Err(self.fail(FlowPhase::Analyzed, e)),
        }
    }

    pub fn begin_save(&mut self) -> Result<(RequestTicket, SaveRequest), AppError> {
        self.ensure_idle_for(RequestKind::Save)?;
        self.ensure_analyzed("save")?;
        let image = self.image.as_ref().ok_or(AppError::MissingImage)?;

        let enhanced = self
            .analysis
            .as_ref()
            .and_then(|analysis| analysis.enhanced_data.as_ref());
        let request = build_save_request(image, enhanced, &self.profile)?;

        let ticket = self.issue(RequestKind::Save, 0);
        Ok((ticket, request))
    }

    pub fn complete_save(
        &mut self,
        ticket: RequestTicket,
        result: Result<Product, AppError>,
    ) -> Result<Completion, AppError> {
        let Some(pending) = self.settle(ticket) else {
            return Ok(Completion::Discarded);
        };

        match result {
            Ok(product) => {
                info!("Flow {} saved product {}", self.id, product.record_id);
                self.saved = Some(product);
                self.last_error = None;
                self.transition(FlowPhase::Saved);
                Ok(Completion::Applied)
            }
            Err(e) => Err(self.fail(pending.resume, e)),
        }
    }

    /// Only re-filters; never triggers another search.
    pub fn set_threshold(&mut self, threshold: Threshold) -> Result<FilteredResults, AppError> {
        if !self.has_searched {
            return Err(AppError::InvalidTransition {
                action: "change the threshold",
                phase: self.phase.name(),
            });
        }
        debug!("Flow {} threshold {} -> {}", self.id, self.threshold, threshold);
        self.threshold = threshold;
        Ok(self.visible_results())
    }

    /// Candidates passing the current threshold, recomputed on every call.
    pub fn visible_results(&self) -> FilteredResults {
        filter_by_threshold(&self.candidates, self.threshold)
    }

    fn ensure_idle_for(&self, kind: RequestKind) -> Result<(), AppError> {
        if let Some(pending) = &self.pending {
            return Err(AppError::Busy(pending.ticket.kind.name()));
        }
        if self.phase == FlowPhase::Idle {
            return Err(AppError::InvalidTransition {
                action: kind.name(),
                phase: self.phase.name(),
            });
        }
        Ok(())
    }

    fn ensure_analyzed(&self, action: &'static str) -> Result<(), AppError> {
        if self.phase.has_analysis() {
            Ok(())
        } else {
            Err(AppError::InvalidTransition {
                action,
                phase: self.phase.name(),
            })
        }
    }

    fn issue(&mut self, kind: RequestKind, limit: usize) -> RequestTicket {
        self.generation += 1;
        let ticket = RequestTicket {
            generation: self.generation,
            kind,
        };
        self.pending = Some(Pending {
            ticket,
            resume: self.phase,
            limit,
        });
        self.transition(kind.in_flight_phase());
        ticket
    }

    /// Clears the pending request if `ticket` is the one it was issued for.
    fn settle(&mut self, ticket: RequestTicket) -> Option<Pending> {
        match self.pending {
            Some(pending) if pending.ticket == ticket => self.pending.take(),
            _ => {
                debug!(
                    "Flow {} discarding stale {} response (generation {}, current {})",
                    self.id,
                    ticket.kind.name(),
                    ticket.generation,
                    self.generation
                );
                None
            }
        }
    }

    fn fail(&mut self, resume: FlowPhase, error: AppError) -> AppError {
        warn!("Flow {} request failed: {}", self.id, error);
        self.last_error = Some(error.to_string());
        self.transition(resume);
        error
    }

    fn transition(&mut self, next: FlowPhase) {
        debug!("Flow {} {} -> {}", self.id, self.phase, next);
        self.phase = next;
    }
}

impl Default for DiscoveryFlow {
    fn default() -> Self {
        Self::new(Threshold::default(), QueryComposer::new())
    }
}
