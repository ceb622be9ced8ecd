use chrono::Utc;

use fundscout_common::{
    identity_key, AlertFrequency, CandidateOpportunity, DiscoveryMethod, Enrichment, OriginClass,
    Reliability, SourceProfile, SourceStatus, StoredOpportunity, Subscriber,
};
use fundscout_store::Store;

fn test_source() -> SourceProfile {
    SourceProfile {
        id: "tx_tea".to_string(),
        name: "Texas Education Agency".to_string(),
        url: "https://tea.texas.gov/finance-and-grants/grants".to_string(),
        selectors: vec!["a".to_string()],
        status: SourceStatus::Active,
        origin: OriginClass::State,
    }
}

fn test_opportunity(title: &str) -> StoredOpportunity {
    let source = test_source();
    let found_at = Utc::now();
    let candidate = CandidateOpportunity {
        title: title.to_string(),
        url: "https://tea.texas.gov/grants/math-innovation".to_string(),
        amount_text: "$1.5M".to_string(),
        deadline_text: "March 15, 2026".to_string(),
        tags: vec!["K-12".to_string(), "STEM".to_string()],
        method: DiscoveryMethod::Structural,
        enrichment: Enrichment::default(),
        quality_score: 7.0,
        reliability: Reliability::High,
    };
    let identity = identity_key(&source.id, title, found_at);
    StoredOpportunity::from_candidate(candidate, identity, &source)
}

async fn memory_store() -> Store {
    Store::connect("sqlite::memory:")
        .await
        .expect("in-memory store")
}

#[tokio::test]
async fn insert_if_absent_is_idempotent() {
    let store = memory_store().await;
    let opp = test_opportunity("Math Innovation Grant");

    assert!(store.insert_if_absent(&opp).await.unwrap());
    assert!(!store.insert_if_absent(&opp).await.unwrap());

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_opportunities, 1);
}

#[tokio::test]
async fn stored_opportunity_round_trips() {
    let store = memory_store().await;
    let mut opp = test_opportunity("Rural Broadband Grant");
    opp.enrichment.eligibility = Some("Public school districts".to_string());
    opp.enrichment.description = Some("Connectivity funding for rural campuses".to_string());

    store.insert_if_absent(&opp).await.unwrap();

    let listed = store.list_recent(10, 0, None).await.unwrap();
    assert_eq!(listed.len(), 1);
    let got = &listed[0];
    assert_eq!(got.identity, opp.identity);
    assert_eq!(got.title, "Rural Broadband Grant");
    assert_eq!(got.tags, vec!["K-12".to_string(), "STEM".to_string()]);
    assert_eq!(got.method, DiscoveryMethod::Structural);
    assert_eq!(got.reliability, Reliability::High);
    assert_eq!(
        got.enrichment.eligibility.as_deref(),
        Some("Public school districts")
    );
}

#[tokio::test]
async fn list_recent_pages_and_filters_by_source() {
    let store = memory_store().await;
    for i in 0..5 {
        let opp = test_opportunity(&format!("Grant Program {i}"));
        store.insert_if_absent(&opp).await.unwrap();
    }
    let mut other = test_opportunity("Federal STEM Grant");
    other.source_id = "grants_gov".to_string();
    other.identity = identity_key("grants_gov", "Federal STEM Grant", Utc::now());
    store.insert_if_absent(&other).await.unwrap();

    let first_page = store.list_recent(3, 0, None).await.unwrap();
    assert_eq!(first_page.len(), 3);
    let second_page = store.list_recent(3, 3, None).await.unwrap();
    assert_eq!(second_page.len(), 3);

    let filtered = store.list_recent(10, 0, Some("grants_gov")).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Federal STEM Grant");
}

#[tokio::test]
async fn subscriber_last_write_wins() {
    let store = memory_store().await;

    let first = Subscriber {
        email: "admin@district.k12.tx.us".to_string(),
        frequency: AlertFrequency::Daily,
        source_ids: vec!["tx_tea".to_string()],
        created_at: Utc::now(),
    };
    store.upsert_subscriber(&first).await.unwrap();

    let second = Subscriber {
        frequency: AlertFrequency::Weekly,
        source_ids: vec!["tx_tea".to_string(), "grants_gov".to_string()],
        ..first.clone()
    };
    store.upsert_subscriber(&second).await.unwrap();

    let subs = store.subscribers().await.unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].frequency, AlertFrequency::Weekly);
    assert_eq!(subs[0].source_ids.len(), 2);
}

#[tokio::test]
async fn stats_sum_parseable_amounts() {
    let store = memory_store().await;

    let a = test_opportunity("Grant A");
    store.insert_if_absent(&a).await.unwrap();

    let mut b = test_opportunity("Grant B");
    b.amount_text = "Amount TBD".to_string();
    store.insert_if_absent(&b).await.unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_opportunities, 2);
    assert_eq!(stats.total_funding, 1_500_000.0);
}
