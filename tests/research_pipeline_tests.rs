//! End-to-end tests for the research pipeline
//!
//! Every collaborator is mocked; these runs exercise collection, ranking,
//! synthesis, analysis and fallback together.

mod common;

use common::mocks::{MockEncyclopedia, MockLLMClient, MockPageFetcher, MockWebSearch};
use std::sync::Arc;
use std::time::Duration;
use themis::research::{ResearchCoordinator, ResearchPhase, SourceCollector};
use themis::types::{ExtractionMode, SearchHit, SkipReason};
use themis::utils::toml_config::{DisambiguationPolicy, ResearchConfig};

const EMPLOYMENT_CONTEXT: &str = "Employment Law, Labor Rights, Workplace Issues, Discrimination";

const NON_COMPETE_ARTICLE: &str = "A non-compete clause is a contract term under which an employee \
    agrees not to compete with an employer after employment ends.\n\n\
    == Enforceability ==\n\
    Courts in many jurisdictions review such clauses for reasonableness before enforcing them.";

fn test_config() -> ResearchConfig {
    let mut config = ResearchConfig::default();
    config.search.fetch_delay_ms = 0;
    config
}

fn non_compete_hits() -> Vec<SearchHit> {
    vec![
        SearchHit::new(
            "Are non-compete clauses enforceable?",
            "https://www.example-firm.com/non-compete",
            "A non-compete contract is enforceable only when reasonable in scope and duration.",
        ),
        SearchHit::new(
            "State rules on non-competes",
            "https://labor.example.gov/non-compete",
            "Whether the contract is enforceable depends on state statutes and court review.",
        ),
        SearchHit::new(
            "Employment agreement basics",
            "https://hr.example.com/agreements",
            "What employees should know before signing at a new job.",
        ),
    ]
}

fn coordinator(
    config: ResearchConfig,
    search: MockWebSearch,
    fetcher: MockPageFetcher,
    encyclopedia: MockEncyclopedia,
) -> ResearchCoordinator {
    ResearchCoordinator::new(
        Arc::new(config),
        Arc::new(search),
        Arc::new(fetcher),
        Arc::new(encyclopedia),
    )
    .unwrap()
}

fn article_markup(body: &str) -> String {
    format!(
        "<html><body><nav>Home | About | Contact</nav>\
         <main><p>{}</p></main><footer>Copyright</footer></body></html>",
        body
    )
}

// ============= Degraded Mode =============

#[tokio::test]
async fn test_non_compete_run_degrades_when_backend_unavailable() {
    let coordinator = coordinator(
        test_config(),
        MockWebSearch::new(non_compete_hits()),
        MockPageFetcher::failing(),
        MockEncyclopedia::new()
            .with_search(&["Non-compete clause"])
            .with_page("Non-compete clause", NON_COMPETE_ARTICLE),
    )
    .with_backend(Arc::new(MockLLMClient::failing()));

    let outcome = coordinator
        .run("non-compete clauses", "employment")
        .await
        .unwrap();
    let analysis = &outcome.analysis;

    assert!(analysis.degraded);
    assert!(analysis.model.is_none());
    assert_eq!(analysis.sources_count, 4);
    assert_eq!(outcome.web_documents.len(), 3);
    assert_eq!(outcome.wiki_documents.len(), 1);
    assert!(outcome.wiki_documents[0].relevance_score > 2.0);
    assert!(analysis.narrative_text.contains("non-compete clauses"));
    assert!(analysis.narrative_text.contains(EMPLOYMENT_CONTEXT));
    assert!(analysis.quality_score > 0.0 && analysis.quality_score <= 10.0);
}

#[tokio::test]
async fn test_total_failure_still_yields_result() {
    let coordinator = coordinator(
        test_config(),
        MockWebSearch::failing(),
        MockPageFetcher::failing(),
        MockEncyclopedia::failing(),
    )
    .with_backend(Arc::new(MockLLMClient::failing()));

    let outcome = coordinator.run("adverse possession", "real_estate").await.unwrap();

    assert_eq!(outcome.analysis.sources_count, 0);
    assert_eq!(outcome.analysis.quality_score, 0.0);
    assert!(outcome.analysis.degraded);
    assert!(outcome.web_documents.is_empty());
    assert!(outcome.wiki_documents.is_empty());

    let failed_searches = outcome
        .skipped
        .iter()
        .filter(|s| matches!(s.reason, SkipReason::SearchFailed(_)))
        .count();
    // two web queries plus five encyclopedia variants
    assert_eq!(failed_searches, 7);
}

#[tokio::test]
async fn test_backend_timeout_falls_back() {
    let mut config = test_config();
    config.backend.timeout_secs = 1;

    let coordinator = coordinator(
        config,
        MockWebSearch::new(non_compete_hits()),
        MockPageFetcher::failing(),
        MockEncyclopedia::new(),
    )
    .with_backend(Arc::new(MockLLMClient::slow(
        "too late",
        Duration::from_secs(5),
    )));

    let outcome = coordinator.run("non-compete clauses", "employment").await.unwrap();
    assert!(outcome.analysis.degraded);
    assert!(!outcome.analysis.narrative_text.contains("too late"));
}

#[tokio::test]
async fn test_empty_backend_answer_falls_back() {
    let coordinator = coordinator(
        test_config(),
        MockWebSearch::new(non_compete_hits()),
        MockPageFetcher::failing(),
        MockEncyclopedia::new(),
    )
    .with_backend(Arc::new(MockLLMClient::new("   \n")));

    let outcome = coordinator.run("non-compete clauses", "employment").await.unwrap();
    assert!(outcome.analysis.degraded);
    assert!(outcome.analysis.narrative_text.starts_with("LEGAL RESEARCH REPORT"));
}

// ============= Backend Analysis =============

#[tokio::test]
async fn test_backend_answer_is_formatted() {
    let coordinator = coordinator(
        test_config(),
        MockWebSearch::new(non_compete_hits()),
        MockPageFetcher::failing(),
        MockEncyclopedia::new(),
    )
    .with_backend(Arc::new(MockLLMClient::new(
        "## Executive Summary\nNon-compete clauses are **narrowly** enforced.",
    )));

    let outcome = coordinator.run("non-compete clauses", "employment").await.unwrap();
    let analysis = &outcome.analysis;

    assert!(!analysis.degraded);
    assert_eq!(analysis.model.as_deref(), Some("mock-model"));
    assert_eq!(
        analysis.narrative_text,
        "EXECUTIVE SUMMARY\n=================\nNon-compete clauses are narrowly enforced."
    );
    assert_eq!(analysis.sources_count, 3);
}

#[tokio::test]
async fn test_progress_follows_phase_order() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let coordinator = coordinator(
        test_config(),
        MockWebSearch::new(non_compete_hits()),
        MockPageFetcher::failing(),
        MockEncyclopedia::new(),
    )
    .with_progress(tx);

    let outcome = coordinator.run("non-compete clauses", "employment").await.unwrap();
    drop(coordinator);

    let mut updates = Vec::new();
    while let Some(update) = rx.recv().await {
        updates.push(update);
    }

    let phases: Vec<_> = updates.iter().map(|u| u.phase).collect();
    assert_eq!(
        phases,
        vec![
            ResearchPhase::Idle,
            ResearchPhase::CollectingWeb,
            ResearchPhase::CollectingWiki,
            ResearchPhase::Synthesizing,
            ResearchPhase::Analyzing,
            ResearchPhase::Done,
        ]
    );
    assert!(updates.iter().all(|u| u.run_id == outcome.run_id));
    assert!(updates.windows(2).all(|w| w[0].progress <= w[1].progress));
}

// ============= Web Collection =============

#[tokio::test]
async fn test_one_failing_fetch_among_five_keeps_the_rest() {
    let body = "The court held that the restrictive covenant in the employment contract \
                was enforceable. The appeal court later confirmed the ruling on liability \
                and damages. Legal commentators noted the precedent for similar contract \
                disputes across the jurisdiction. Many lawyers now cite the case law when \
                drafting agreements for clients.";

    let hits: Vec<_> = (1..=5)
        .map(|i| {
            SearchHit::new(
                format!("Court ruling {}", i),
                format!("https://law.example.edu/case/{}", i),
                "A court ruling on contract enforcement.",
            )
        })
        .collect();

    let mut fetcher = MockPageFetcher::failing();
    for i in 1..=5 {
        fetcher = fetcher.with_page(
            &format!("https://law.example.edu/case/{}", i),
            &article_markup(body),
        );
    }
    let fetcher = fetcher.failing_for("https://law.example.edu/case/3");

    let collector = SourceCollector::new(
        Arc::new(test_config()),
        Arc::new(MockWebSearch::new(hits)),
        Arc::new(fetcher),
        Arc::new(MockEncyclopedia::new()),
    )
    .unwrap();

    let collection = collector.collect_web("restrictive covenants").await;
    assert!(collection.documents.len() >= 4);

    let full = collection
        .documents
        .iter()
        .filter(|d| d.extraction == ExtractionMode::Full)
        .count();
    assert_eq!(full, 4);

    let failed = collection
        .documents
        .iter()
        .find(|d| d.url.ends_with("/case/3"))
        .unwrap();
    assert_eq!(failed.extraction, ExtractionMode::Snippet);
    assert_eq!(failed.extracted_text, "A court ruling on contract enforcement.");

    let extracted = collection
        .documents
        .iter()
        .find(|d| d.url.ends_with("/case/1"))
        .unwrap();
    assert!(!extracted.extracted_text.contains("Home | About"));
    assert!(extracted.extracted_text.chars().count() <= 5000);
}

#[tokio::test]
async fn test_web_fetches_only_the_top_max_fetch_hits() {
    let urls: Vec<String> = (1..=14)
        .map(|i| format!("https://courts.example.gov/opinion/{}", i))
        .collect();
    let hits: Vec<_> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            SearchHit::new(
                format!("Appellate opinion {}", i + 1),
                url.clone(),
                "The court of appeal reviewed the contract dispute and the damages award.",
            )
        })
        .collect();

    let mut config = test_config();
    config.search.max_search_results = 30;
    config.search.max_fetch = 10;

    let search = Arc::new(MockWebSearch::new(hits));
    let fetcher = Arc::new(MockPageFetcher::failing());
    let collector = SourceCollector::new(
        Arc::new(config),
        search.clone(),
        fetcher.clone(),
        Arc::new(MockEncyclopedia::new()),
    )
    .unwrap();

    let collection = collector.collect_web("appellate review").await;

    assert_eq!(search.queries().len(), 2);
    assert_eq!(fetcher.requested(), urls[..10].to_vec());
    assert_eq!(collection.documents.len(), 10);
    assert!(
        collection
            .documents
            .iter()
            .all(|d| d.extraction == ExtractionMode::Snippet)
    );
}

#[tokio::test]
async fn test_web_ranking_is_non_increasing_and_stable() {
    let hits = vec![
        SearchHit::new("Low", "https://a.example/1", "A long note about one court somewhere in town."),
        SearchHit::new("High", "https://a.example/2", "court ruling court ruling law"),
        SearchHit::new("Low twin", "https://a.example/3", "A long note about one court somewhere in town."),
    ];

    let collector = SourceCollector::new(
        Arc::new(test_config()),
        Arc::new(MockWebSearch::new(hits)),
        Arc::new(MockPageFetcher::failing()),
        Arc::new(MockEncyclopedia::new()),
    )
    .unwrap();

    let collection = collector.collect_web("court").await;
    let scores: Vec<f32> = collection.documents.iter().map(|d| d.relevance_score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let titles: Vec<_> = collection.documents.iter().map(|d| d.title.as_str()).collect();
    assert_eq!(titles, vec!["High", "Low", "Low twin"]);
}

// ============= Encyclopedia Collection =============

#[tokio::test]
async fn test_disambiguation_resolves_to_first_alternative() {
    let collector = SourceCollector::new(
        Arc::new(test_config()),
        Arc::new(MockWebSearch::new(vec![])),
        Arc::new(MockPageFetcher::failing()),
        Arc::new(
            MockEncyclopedia::new()
                .with_search(&["Foo"])
                .with_disambiguation("Foo", &["Foo (law)", "Foo (surname)"])
                .with_page(
                    "Foo (law)",
                    "Foo (law) is a doctrine of contract law applied by the court in litigation over agreements.",
                ),
        ),
    )
    .unwrap();

    let collection = collector.collect_encyclopedia("foo").await;
    assert_eq!(collection.documents.len(), 1);
    assert_eq!(collection.documents[0].title, "Foo (law)");
    assert_eq!(collection.documents[0].sections[0].name, "Introduction");
}

#[tokio::test]
async fn test_disambiguation_skip_policy() {
    let mut config = test_config();
    config.search.disambiguation = DisambiguationPolicy::Skip;

    let collector = SourceCollector::new(
        Arc::new(config),
        Arc::new(MockWebSearch::new(vec![])),
        Arc::new(MockPageFetcher::failing()),
        Arc::new(
            MockEncyclopedia::new()
                .with_search(&["Foo"])
                .with_disambiguation("Foo", &["Foo (law)", "Foo (surname)"]),
        ),
    )
    .unwrap();

    let collection = collector.collect_encyclopedia("foo").await;
    assert!(collection.documents.is_empty());
    assert_eq!(
        collection.skipped[0].reason,
        SkipReason::Disambiguation(vec!["Foo (law)".to_string(), "Foo (surname)".to_string()])
    );
}

#[tokio::test]
async fn test_encyclopedia_filters_and_dedups_pages() {
    let mut config = test_config();
    // four titles per query variant
    config.search.max_wikipedia_pages = 20;

    let collector = SourceCollector::new(
        Arc::new(config),
        Arc::new(MockWebSearch::new(vec![])),
        Arc::new(MockPageFetcher::failing()),
        Arc::new(
            MockEncyclopedia::new()
                .with_search(&["Non-compete clause", "NON-COMPETE CLAUSE", "Pasta", "Missing"])
                .with_page("Non-compete clause", NON_COMPETE_ARTICLE)
                .with_page("Pasta", "Pasta is a type of food made from dough."),
        ),
    )
    .unwrap();

    let collection = collector.collect_encyclopedia("non-compete").await;
    assert_eq!(collection.documents.len(), 1);

    let doc = &collection.documents[0];
    assert_eq!(doc.title, "Non-compete clause");
    let names: Vec<_> = doc.sections.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Introduction", "Enforceability"]);

    let reasons: Vec<_> = collection.skipped.iter().map(|s| &s.reason).collect();
    assert!(reasons.contains(&&SkipReason::BelowRelevanceThreshold));
    assert!(reasons.contains(&&SkipReason::NotFound));
}

// ============= Export =============

#[tokio::test]
async fn test_outcome_exports_to_json() {
    let coordinator = coordinator(
        test_config(),
        MockWebSearch::new(non_compete_hits()),
        MockPageFetcher::failing(),
        MockEncyclopedia::new()
            .with_search(&["Non-compete clause"])
            .with_page("Non-compete clause", NON_COMPETE_ARTICLE),
    );

    let outcome = coordinator.run("non-compete clauses", "employment").await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = themis::export::save_json(&outcome, dir.path()).unwrap();

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("legal_research_non_compete_clauses_"));
    assert!(name.ends_with(".json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["research_topic"], "non-compete clauses");
    assert_eq!(json["metadata"]["total_sources"], 4);
    assert_eq!(json["summary"]["top_wiki_sources"][0]["title"], "Non-compete clause");
}
