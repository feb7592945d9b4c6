use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use leadscout_core::{Pacing, CSV_HEADER};
use leadscout_reachability::ReachabilityError;
use leadscout_scraper::{FetchedPage, PageFetcher, ScraperError, SearchSource};

use super::*;

struct StubSource {
    urls: Vec<String>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SearchSource for StubSource {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn search(&self, _query: &str, max_results: usize) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.iter().take(max_results).cloned().collect()
    }
}

struct StubFetcher {
    pages: HashMap<String, String>,
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        let html = self.pages.get(url).ok_or_else(|| ScraperError::UnexpectedStatus {
            status: 404,
            url: url.to_string(),
        })?;
        Ok(FetchedPage {
            url: url.to_string(),
            html: html.clone(),
            title: leadscout_scraper::page_title(html),
        })
    }
}

/// Answers every number with `status`, or fails when `fail` is set.
/// Records each batch it was handed.
struct StubValidator {
    status: ReachabilityStatus,
    fail: bool,
    batches: Mutex<Vec<Vec<CanonicalNumber>>>,
}

impl StubValidator {
    fn answering(status: ReachabilityStatus) -> Arc<Self> {
        Arc::new(Self {
            status,
            fail: false,
            batches: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            status: ReachabilityStatus::Unknown,
            fail: true,
            batches: Mutex::new(Vec::new()),
        })
    }

    fn batches(&self) -> Vec<Vec<CanonicalNumber>> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReachabilityValidator for StubValidator {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn validate(
        &self,
        numbers: &[CanonicalNumber],
    ) -> Result<ReachabilityMap, ReachabilityError> {
        self.batches.lock().unwrap().push(numbers.to_vec());
        if self.fail {
            return Err(ReachabilityError::MissingCredential("WHAPI_TOKEN".into()));
        }
        Ok(numbers.iter().map(|n| (n.clone(), self.status)).collect())
    }
}

const PAGE_A: &str =
    "<html><head><title>Clinica A</title></head><body>(41) 3322-1100</body></html>";
const PAGE_B: &str =
    "<html><head><title>Clinica B</title></head><body>(41) 99888-7766</body></html>";

fn pipeline_with(
    validator: Arc<StubValidator>,
    settings: PipelineSettings,
) -> (Pipeline, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = StubSource {
        urls: vec!["https://a.com.br".into(), "https://b.com.br".into()],
        calls: Arc::clone(&calls),
    };
    let fetcher = StubFetcher {
        pages: HashMap::from([
            ("https://a.com.br".to_string(), PAGE_A.to_string()),
            ("https://b.com.br".to_string(), PAGE_B.to_string()),
        ]),
    };
    let cascade = DiscoveryCascade::new(vec![Box::new(source)], 6, 80);
    let extractor = ExtractionOrchestrator::new(
        Arc::new(fetcher),
        Pacing::unthrottled(),
        80,
        Region::Brazil,
    );
    (Pipeline::new(cascade, extractor, validator, settings), calls)
}

fn strings(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|s| (*s).to_string()).collect()
}

#[tokio::test]
async fn deferred_validation_leaves_rows_unvalidated() {
    let validator = StubValidator::answering(ReachabilityStatus::Valid);
    let (pipeline, _) = pipeline_with(Arc::clone(&validator), PipelineSettings::default());

    let result = pipeline
        .run(RunRequest::new("Curitiba").with_segment("dentista"))
        .await
        .unwrap();

    assert_eq!(result.query, "dentista Curitiba");
    assert_eq!(result.total, 2);
    assert!(result
        .rows
        .iter()
        .all(|r| r.reachability_status == ReachabilityStatus::Unvalidated));
    assert!(validator.batches().is_empty());
}

#[tokio::test]
async fn inline_validation_annotates_rows() {
    let validator = StubValidator::answering(ReachabilityStatus::Valid);
    let settings = PipelineSettings {
        validate_inline: true,
        ..PipelineSettings::default()
    };
    let (pipeline, _) = pipeline_with(Arc::clone(&validator), settings);

    let result = pipeline.run(RunRequest::new("Curitiba")).await.unwrap();

    assert!(result
        .rows
        .iter()
        .all(|r| r.reachability_status == ReachabilityStatus::Valid));
    assert_eq!(validator.batches().len(), 1);
    assert_eq!(validator.batches()[0].len(), 2);
    assert!(result.csv.contains(",valid,"));
}

#[tokio::test]
async fn csv_matches_rows() {
    let (pipeline, _) = pipeline_with(
        StubValidator::answering(ReachabilityStatus::Valid),
        PipelineSettings::default(),
    );
    let result = pipeline.run(RunRequest::new("Curitiba")).await.unwrap();

    let lines: Vec<&str> = result.csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADER);
    assert_eq!(lines.len(), result.total + 1);
    assert_eq!(
        lines[1],
        "Clinica A,+554133221100,unvalidated,,https://a.com.br"
    );
}

#[tokio::test]
async fn invalid_request_issues_no_search() {
    let (pipeline, calls) = pipeline_with(
        StubValidator::answering(ReachabilityStatus::Valid),
        PipelineSettings::default(),
    );
    let err = pipeline.run(RunRequest::new(" a ")).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn requested_volume_caps_rows() {
    let (pipeline, _) = pipeline_with(
        StubValidator::answering(ReachabilityStatus::Valid),
        PipelineSettings::default(),
    );
    let result = pipeline
        .run(RunRequest::new("Curitiba").with_volume(1))
        .await
        .unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.rows.len(), 1);
}

#[tokio::test]
async fn inline_validation_failure_fails_the_run() {
    let settings = PipelineSettings {
        validate_inline: true,
        ..PipelineSettings::default()
    };
    let (pipeline, _) = pipeline_with(StubValidator::failing(), settings);
    let err = pipeline.run(RunRequest::new("Curitiba")).await.unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Reachability(ReachabilityError::MissingCredential(_))
    ));
}

#[tokio::test]
async fn standalone_validation_semantics() {
    let validator = StubValidator::answering(ReachabilityStatus::Valid);
    let raw = strings(&["  (41) 99888-7766 ", "", "   ", "abc", "+55 41 99888-7766"]);

    let outcomes = validate_raw_numbers(validator.as_ref(), &raw, Region::Brazil)
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].raw, "(41) 99888-7766");
    assert_eq!(outcomes[0].status, ReachabilityStatus::Valid);
    assert_eq!(outcomes[0].normalized_id.as_deref(), Some("5541998887766"));
    assert_eq!(outcomes[1].raw, "abc");
    assert_eq!(outcomes[1].canonical, None);
    assert_eq!(outcomes[1].status, ReachabilityStatus::Invalid);
    assert_eq!(outcomes[1].normalized_id, None);
    assert_eq!(outcomes[2].canonical, outcomes[0].canonical);

    let batches = validator.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1, "repeated numbers are probed once");
}

#[tokio::test]
async fn standalone_validation_rejects_blank_input() {
    let validator = StubValidator::answering(ReachabilityStatus::Valid);
    for raw in [Vec::new(), strings(&["", "  "])] {
        let err = validate_raw_numbers(validator.as_ref(), &raw, Region::Brazil)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }
    assert!(validator.batches().is_empty());
}

#[tokio::test]
async fn unparsable_only_input_skips_the_provider() {
    let validator = StubValidator::failing();
    let raw = strings(&["abc", "123"]);
    let outcomes = validate_raw_numbers(validator.as_ref(), &raw, Region::Brazil)
        .await
        .unwrap();
    for outcome in &outcomes {
        assert_eq!(outcome.status, ReachabilityStatus::Invalid);
    }
    assert!(validator.batches().is_empty());
}
