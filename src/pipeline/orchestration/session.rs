use std::sync::Arc;

use tokio::sync::Mutex;
use tower::ServiceExt;
use tracing::{debug, info};

use crate::config::Configuration;
use crate::error::AppError;
use crate::network::{CatalogStore, ImageAcquirer, ImageAnalyzer, SimilaritySearch};
use crate::pipeline::orchestration::discovery_flow::DiscoveryFlow;
use crate::pipeline::orchestration::flow_phase::Completion;
use crate::pipeline::services::image::{ColorExtractionService, ColorExtractor};
use crate::pipeline::services::query::FilteredResults;
use crate::pipeline::types::{ImageSource, Threshold};

/// Shared handle to one discovery flow and its collaborators.
///
/// The flow lock is only held to begin or complete a request, never across
/// the collaborator call itself. A second request while one is pending is
/// rejected as busy, and selecting a new image meanwhile turns the pending
/// response stale.
#[derive(Clone)]
pub struct DiscoverySession {
    flow: Arc<Mutex<DiscoveryFlow>>,
    acquirer: Arc<dyn ImageAcquirer>,
    analyzer: Arc<dyn ImageAnalyzer>,
    search: Arc<dyn SimilaritySearch>,
    catalog: Arc<dyn CatalogStore>,
    color_service: ColorExtractionService,
}

impl DiscoverySession {
    pub fn new(
        flow: DiscoveryFlow,
        acquirer: Arc<dyn ImageAcquirer>,
        analyzer: Arc<dyn ImageAnalyzer>,
        search: Arc<dyn SimilaritySearch>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        Self {
            flow: Arc::new(Mutex::new(flow)),
            acquirer,
            analyzer,
            search,
            catalog,
            color_service: ColorExtractionService::default(),
        }
    }

    /// Wires every collaborator to the same backend client.
    pub fn with_backend<B>(configuration: &Configuration, backend: Arc<B>) -> Self
    where
        B: ImageAcquirer + ImageAnalyzer + SimilaritySearch + CatalogStore + 'static,
    {
        Self::new(
            DiscoveryFlow::from_configuration(configuration),
            backend.clone(),
            backend.clone(),
            backend.clone(),
            backend,
        )
        .with_color_extractor(ColorExtractor::with_stride(configuration.color_sample_stride))
    }

    pub fn with_color_extractor(mut self, extractor: ColorExtractor) -> Self {
        self.color_service = ColorExtractionService::new(extractor);
        self
    }

    /// Runs `f` against the flow's current state.
    pub async fn inspect<R>(&self, f: impl FnOnce(&DiscoveryFlow) -> R) -> R {
        let flow = self.flow.lock().await;
        f(&flow)
    }

    /// Acquires the image, extracts its color and resets the flow onto it.
    /// If another selection starts while this one is acquiring, this one is
    /// discarded. A failed acquisition leaves the flow untouched.
    pub async fn select_image(&self, source: &ImageSource) -> Result<Completion, AppError> {
        info!("Selecting image {}", source);
        let ticket = self.flow.lock().await.begin_select();

        let result = match self.acquirer.acquire(source).await {
            Ok(acquired) => match self.color_service.clone().oneshot(acquired).await {
                Ok(acquired) => {
                    debug!("Derived color {:?}", acquired.derived_color);
                    Ok(acquired)
                }
                Err(never) => match never {},
            },
            Err(e) => Err(e),
        };

        self.flow.lock().await.complete_select(ticket, result)
    }

    pub async fn analyze(&self) -> Result<Completion, AppError> {
        let (ticket, image) = self.flow.lock().await.begin_analyze()?;
        let result = self.analyzer.analyze(&image).await;
        self.flow.lock().await.complete_analyze(ticket, result)
    }

    pub async fn search(&self) -> Result<Completion, AppError> {
        let (ticket, query) = self.flow.lock().await.begin_search()?;
        let result = self.search.search(&query).await;
        self.flow.lock().await.complete_search(ticket, result)
    }

    pub async fn save(&self) -> Result<Completion, AppError> {
        let (ticket, request) = self.flow.lock().await.begin_save()?;
        let result = self.catalog.save(request).await;
        self.flow.lock().await.complete_save(ticket, result)
    }

    pub async fn set_threshold(&self, threshold: Threshold) -> Result<FilteredResults, AppError> {
        self.flow.lock().await.set_threshold(threshold)
    }

    pub async fn visible_results(&self) -> FilteredResults {
        self.flow.lock().await.visible_results()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::orchestration::flow_phase::FlowPhase;
    use crate::pipeline::orchestration::test_support::{
        candidate, FakeBackend, GatedAcquirer, GatedAnalyzer,
    };
    use crate::pipeline::types::{
        AnalysisResult, Caption, EnhancedAttributes, NamedEntry, RawAnalysis, Tag,
    };

    fn url(u: &str) -> ImageSource {
        ImageSource::RemoteUrl(u.to_string())
    }

    fn session_with(backend: Arc<FakeBackend>) -> DiscoverySession {
        DiscoverySession::with_backend(&Configuration::default(), backend)
    }

    async fn wait_for_phase(session: &DiscoverySession, phase: FlowPhase) {
        while session.inspect(|flow| flow.phase()).await != phase {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_red_leather_jacket_end_to_end() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_analysis(AnalysisResult::new(RawAnalysis {
                    tags: vec![
                        Tag {
                            name: "jacket".to_string(),
                            confidence: Some(0.98),
                        },
                        Tag {
                            name: "leather".to_string(),
                            confidence: Some(0.91),
                        },
                    ],
                    brands: vec![NamedEntry {
                        name: "Schott".to_string(),
                    }],
                    categories: vec![NamedEntry {
                        name: "apparel_jacket".to_string(),
                    }],
                    captions: vec![Caption {
                        text: "a red leather jacket".to_string(),
                    }],
                    dominant_colors: vec!["red".to_string()],
                }))
                .with_results(vec![
                    candidate("p1", 0.93),
                    candidate("p2", 0.4),
                    candidate("p3", 0.5),
                ]),
        );
        let session = session_with(backend.clone());

        session.select_image(&url("https://example.com/jacket.jpg")).await.unwrap();
        assert_eq!(session.analyze().await.unwrap(), Completion::Applied);

        let profile = session.inspect(|flow| flow.profile().clone()).await;
        assert_eq!(profile.color.as_deref(), Some("red"));
        assert_eq!(profile.category.as_deref(), Some("Jackets"));
        assert_eq!(profile.name, "A red leather jacket");

        assert_eq!(session.search().await.unwrap(), Completion::Applied);
        let query = backend.last_query().unwrap();
        assert_eq!(
            query.keywords,
            vec!["jacket", "leather", "Schott", "apparel_jacket"]
        );
        assert_eq!(query.limit, 20);

        let visible = session.visible_results().await;
        let ids: Vec<_> = visible.candidates.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3"]);
        assert_eq!(visible.excluded(), 1);
    }

    #[tokio::test]
    async fn test_tiger_lands_in_animal() {
        let backend = Arc::new(FakeBackend::new().with_analysis(AnalysisResult::new(RawAnalysis {
            categories: vec![NamedEntry {
                name: "tiger".to_string(),
            }],
            ..RawAnalysis::default()
        })));
        let session = session_with(backend);

        session.select_image(&url("https://example.com/tiger.jpg")).await.unwrap();
        session.analyze().await.unwrap();

        let category = session.inspect(|flow| flow.profile().category.clone()).await;
        assert_eq!(category.as_deref(), Some("Animal"));
    }

    #[tokio::test]
    async fn test_empty_analysis_uses_fallbacks() {
        let backend = Arc::new(FakeBackend::new().with_analysis(AnalysisResult::default()));
        let session = session_with(backend);

        session.select_image(&url("https://example.com/blank.jpg")).await.unwrap();
        session.analyze().await.unwrap();

        let profile = session.inspect(|flow| flow.profile().clone()).await;
        assert_eq!(profile.name, "Uploaded Item");
        assert_eq!(profile.category.as_deref(), Some("Other"));
        assert_eq!(profile.color, None);
    }

    #[tokio::test]
    async fn test_enhanced_category_reaches_query() {
        let backend = Arc::new(FakeBackend::new().with_analysis(
            AnalysisResult::new(RawAnalysis {
                categories: vec![NamedEntry {
                    name: "shoe".to_string(),
                }],
                ..RawAnalysis::default()
            })
            .with_enhanced(EnhancedAttributes {
                category: Some("Jackets".to_string()),
                ..EnhancedAttributes::default()
            }),
        ));
        let session = session_with(backend.clone());

        session.select_image(&url("https://example.com/x.jpg")).await.unwrap();
        session.analyze().await.unwrap();
        session.search().await.unwrap();

        assert_eq!(
            backend.last_query().unwrap().category.as_deref(),
            Some("Jackets")
        );
    }

    #[tokio::test]
    async fn test_local_image_color_feeds_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swatch.png");
        crate::pipeline::orchestration::test_support::write_solid_png(&path, [0x33, 0x66, 0x99]);

        let backend = Arc::new(FakeBackend::new().with_analysis(AnalysisResult::default()));
        let session = session_with(backend);
        session
            .select_image(&ImageSource::LocalFile(path))
            .await
            .unwrap();

        let color = session.inspect(|flow| flow.profile().color.clone()).await;
        assert_eq!(color.as_deref(), Some("#336699"));

        // No analyzer color, so the extracted one survives classification.
        session.analyze().await.unwrap();
        let profile = session.inspect(|flow| flow.profile().clone()).await;
        assert_eq!(profile.color.as_deref(), Some("#336699"));
        assert_eq!(profile.name, "#336699 Other");
    }

    #[tokio::test]
    async fn test_acquisition_failure_leaves_flow_untouched() {
        let backend = Arc::new(FakeBackend::new());
        let session = session_with(backend);

        let error = session
            .select_image(&ImageSource::LocalFile("/no/such/file.png".into()))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::Acquisition(_)));
        assert_eq!(session.inspect(|flow| flow.phase()).await, FlowPhase::Idle);
    }

    #[tokio::test]
    async fn test_analysis_failure_surfaces_and_reverts() {
        let backend = Arc::new(FakeBackend::new().failing_analysis("Vision quota exceeded"));
        let session = session_with(backend);

        session.select_image(&url("https://example.com/a.jpg")).await.unwrap();
        let error = session.analyze().await.unwrap_err();

        assert!(matches!(error, AppError::Analysis(_)));
        let (phase, message) = session
            .inspect(|flow| (flow.phase(), flow.last_error().map(str::to_string)))
            .await;
        assert_eq!(phase, FlowPhase::ImageAcquired);
        assert_eq!(message.as_deref(), Some("Vision quota exceeded"));
    }

    #[tokio::test]
    async fn test_save_failure_keeps_results() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_analysis(AnalysisResult::default())
                .with_results(vec![candidate("p1", 0.7)])
                .failing_save("Failed to save"),
        );
        let session = session_with(backend.clone());

        session.select_image(&url("https://example.com/a.jpg")).await.unwrap();
        session.analyze().await.unwrap();
        session.search().await.unwrap();
        assert!(session.save().await.is_err());

        let (phase, kept) = session
            .inspect(|flow| (flow.phase(), flow.candidates().len()))
            .await;
        assert_eq!(phase, FlowPhase::Searched);
        assert_eq!(kept, 1);
        assert_eq!(backend.save_attempts(), 1);
    }

    #[tokio::test]
    async fn test_save_success_message() {
        let backend = Arc::new(FakeBackend::new().with_analysis(AnalysisResult::new(RawAnalysis {
            captions: vec![Caption {
                text: "a canvas tote bag".to_string(),
            }],
            ..RawAnalysis::default()
        })));
        let session = session_with(backend);

        session.select_image(&url("https://example.com/tote.jpg")).await.unwrap();
        session.analyze().await.unwrap();
        assert_eq!(session.save().await.unwrap(), Completion::Applied);

        let message = session.inspect(|flow| flow.save_message()).await;
        assert_eq!(message.as_deref(), Some("Saved as #saved-1: A canvas tote bag"));
    }

    #[tokio::test]
    async fn test_threshold_change_does_not_search_again() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_analysis(AnalysisResult::default())
                .with_results(vec![candidate("p1", 0.9), candidate("p2", 0.3)]),
        );
        let session = session_with(backend.clone());

        session.select_image(&url("https://example.com/a.jpg")).await.unwrap();
        session.analyze().await.unwrap();
        assert!(session.set_threshold(Threshold::MIN).await.is_err());

        session.search().await.unwrap();
        assert_eq!(session.set_threshold(Threshold::MIN).await.unwrap().kept(), 2);
        assert_eq!(session.set_threshold(Threshold::MAX).await.unwrap().kept(), 0);
        assert_eq!(backend.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_analyze_is_rejected_as_busy() {
        let analyzer = Arc::new(GatedAnalyzer::new(AnalysisResult::default()));
        let backend = Arc::new(FakeBackend::new());
        let session = DiscoverySession::new(
            DiscoveryFlow::default(),
            backend.clone(),
            analyzer.clone(),
            backend.clone(),
            backend,
        );
        session.select_image(&url("https://example.com/a.jpg")).await.unwrap();

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.analyze().await }
        });
        wait_for_phase(&session, FlowPhase::Analyzing).await;

        assert!(matches!(session.analyze().await, Err(AppError::Busy("analyze"))));

        analyzer.release();
        assert_eq!(first.await.unwrap().unwrap(), Completion::Applied);
        assert_eq!(analyzer.calls(), 1);
        assert_eq!(session.inspect(|flow| flow.phase()).await, FlowPhase::Analyzed);
    }

    #[tokio::test]
    async fn test_response_for_previous_image_is_discarded() {
        let analyzer = Arc::new(GatedAnalyzer::new(AnalysisResult::new(RawAnalysis {
            tags: vec![Tag {
                name: "sneaker".to_string(),
                confidence: None,
            }],
            ..RawAnalysis::default()
        })));
        let backend = Arc::new(FakeBackend::new());
        let session = DiscoverySession::new(
            DiscoveryFlow::default(),
            backend.clone(),
            analyzer.clone(),
            backend.clone(),
            backend,
        );
        session.select_image(&url("https://example.com/old.jpg")).await.unwrap();

        let pending = tokio::spawn({
            let session = session.clone();
            async move { session.analyze().await }
        });
        wait_for_phase(&session, FlowPhase::Analyzing).await;

        session.select_image(&url("https://example.com/new.jpg")).await.unwrap();
        analyzer.release();

        assert_eq!(pending.await.unwrap().unwrap(), Completion::Discarded);
        let (phase, analyzed, image) = session
            .inspect(|flow| {
                (
                    flow.phase(),
                    flow.analysis().is_some(),
                    flow.image().map(|i| i.reference.as_str().to_string()),
                )
            })
            .await;
        assert_eq!(phase, FlowPhase::ImageAcquired);
        assert!(!analyzed);
        assert_eq!(image.as_deref(), Some("https://example.com/new.jpg"));
    }

    #[tokio::test]
    async fn test_slow_earlier_selection_does_not_override_newer() {
        let acquirer = Arc::new(GatedAcquirer::new("slow-old"));
        let backend = Arc::new(FakeBackend::new());
        let session = DiscoverySession::new(
            DiscoveryFlow::default(),
            acquirer.clone(),
            backend.clone(),
            backend.clone(),
            backend,
        );

        let older = tokio::spawn({
            let session = session.clone();
            async move { session.select_image(&url("https://x/slow-old.jpg")).await }
        });
        while acquirer.held() == 0 {
            tokio::task::yield_now().await;
        }

        let newer = session.select_image(&url("https://x/new.jpg")).await.unwrap();
        assert_eq!(newer, Completion::Applied);

        acquirer.release();
        assert_eq!(older.await.unwrap().unwrap(), Completion::Discarded);

        let image = session
            .inspect(|flow| flow.image().map(|i| i.reference.as_str().to_string()))
            .await;
        assert_eq!(image.as_deref(), Some("https://x/new.jpg"));
    }
}
