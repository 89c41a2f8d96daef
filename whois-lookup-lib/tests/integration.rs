// whois-lookup-lib/tests/integration.rs

//! End-to-end tests for the lookup engine using an in-memory WHOIS client.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use whois_lookup_lib::{
    keys, validate_domains, validate_domains_detailed, DomainResult, LookupConfig, LookupError,
    LookupPhase, ProgressCallback, ProgressEvent, RawRecord, WhoisLookup, WhoisQuery,
};

/// Serves canned records; unknown domains fail with a network error.
#[derive(Default)]
struct CannedClient {
    records: HashMap<String, RawRecord>,
    calls: AtomicUsize,
}

impl CannedClient {
    fn with(mut self, domain: &str, record: RawRecord) -> Self {
        self.records.insert(domain.to_string(), record);
        self
    }
}

#[async_trait]
impl WhoisQuery for CannedClient {
    async fn query(&self, domain: &str) -> Result<RawRecord, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1)).await;
        self.records
            .get(domain)
            .cloned()
            .ok_or_else(|| LookupError::network("connection reset by peer"))
    }
}

/// Every domain is registered with "ACME".
struct AcmeClient;

#[async_trait]
impl WhoisQuery for AcmeClient {
    async fn query(&self, _domain: &str) -> Result<RawRecord, LookupError> {
        Ok(RawRecord::new().with(keys::REGISTRAR, "ACME"))
    }
}

fn engine(client: Arc<dyn WhoisQuery>, concurrency: usize) -> WhoisLookup {
    let config = LookupConfig::default()
        .with_concurrency(concurrency)
        .with_rate_delay(Duration::ZERO)
        .with_timeout(Duration::from_secs(5));
    WhoisLookup::with_config(config).with_client(client)
}

#[test]
fn test_validation_grammar() {
    assert_eq!(validate_domains(&["Example.COM"]), vec!["example.com"]);
    assert!(validate_domains(&["-bad-.com"]).is_empty());
    assert_eq!(validate_domains(&["a.b.c.io"]), vec!["a.b.c.io"]);
    assert!(validate_domains(&[""]).is_empty());
}

#[tokio::test]
async fn test_invalid_entries_are_dropped_before_dispatch() {
    let raw = ["example.com", "not a domain!!"];

    let validated = validate_domains_detailed(&raw);
    assert_eq!(validated.valid, vec!["example.com"]);
    assert_eq!(validated.rejected.len(), 1);

    let client = Arc::new(CannedClient::default().with(
        "example.com",
        RawRecord::new().with(keys::REGISTRAR, "RESERVED-Internet Assigned Numbers Authority"),
    ));
    let results = engine(client.clone(), 5).lookup_domains(&raw).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].domain, "example.com");
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_ten_domains_with_three_workers() {
    let domains: Vec<String> = (0..10).map(|i| format!("site{}.com", i)).collect();

    let results = engine(Arc::new(AcmeClient), 3).dispatch_all(&domains).await;

    assert_eq!(results.len(), 10);
    for (result, domain) in results.iter().zip(&domains) {
        assert_eq!(&result.domain, domain);
        assert_eq!(result.registrar.as_deref(), Some("ACME"));
        assert_eq!(result.error, None);
    }
}

#[tokio::test]
async fn test_mixed_batch_keeps_order_and_isolates_failures() {
    let client = Arc::new(
        CannedClient::default()
            .with(
                "google.com",
                RawRecord::new()
                    .with(keys::REGISTRAR, "MarkMonitor Inc.")
                    .with(keys::CREATION_DATE, vec!["1997-09-15T04:00:00Z"])
                    .with(keys::NAME_SERVERS, vec!["NS1.GOOGLE.COM", "NS2.GOOGLE.COM"])
                    .with(keys::STATUS, "clientUpdateProhibited"),
            )
            .with("empty.org", RawRecord::new()),
    );
    let domains = vec![
        "google.com".to_string(),
        "unreachable.net".to_string(),
        "empty.org".to_string(),
    ];

    let results = engine(client, 2).dispatch_all(&domains).await;

    assert_eq!(results.len(), 3);

    let google = &results[0];
    assert_eq!(google.registrar.as_deref(), Some("MarkMonitor Inc."));
    assert_eq!(google.creation_date.as_deref(), Some("1997-09-15T04:00:00Z"));
    assert_eq!(google.name_servers, vec!["NS1.GOOGLE.COM", "NS2.GOOGLE.COM"]);
    assert_eq!(google.status, vec!["clientUpdateProhibited"]);
    assert!(google.has_data());

    assert_eq!(
        results[1],
        DomainResult::failed("unreachable.net", "Network error: connection reset by peer")
    );

    let empty = &results[2];
    assert_eq!(empty.error, None);
    assert!(!empty.has_data());
    assert!(empty.name_servers.is_empty());
}

#[tokio::test]
async fn test_empty_batch() {
    let results = engine(Arc::new(AcmeClient), 4)
        .lookup_domains(&["", "   ", "???"])
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_progress_reports_every_domain() {
    let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let progress: ProgressCallback = Arc::new(move |event: &ProgressEvent| {
        sink.lock().unwrap().push(event.clone());
    });

    let client = Arc::new(CannedClient::default().with("ok.com", RawRecord::new()));
    engine(client, 2)
        .with_progress(progress)
        .lookup_domains(&["ok.com", "broken.com"])
        .await;

    let events = events.lock().unwrap();
    let finished: Vec<(&str, LookupPhase)> = events
        .iter()
        .filter(|e| e.phase != LookupPhase::Started)
        .map(|e| (e.domain.as_str(), e.phase))
        .collect();

    assert_eq!(events.len(), 4);
    assert!(finished.contains(&("ok.com", LookupPhase::Succeeded)));
    assert!(finished.contains(&("broken.com", LookupPhase::Failed)));

    let ok = events
        .iter()
        .find(|e| e.phase == LookupPhase::Succeeded)
        .unwrap();
    assert_eq!(ok.detail.as_deref(), Some("Unknown registrar"));
}

#[tokio::test]
async fn test_results_serialize_with_stable_field_names() {
    let results = engine(Arc::new(AcmeClient), 1)
        .lookup_domains(&["acme.dev"])
        .await;

    let json = serde_json::to_value(&results).unwrap();
    let first = &json[0];
    assert_eq!(first["domain"], "acme.dev");
    assert_eq!(first["registrar"], "ACME");
    assert_eq!(first["name_servers"], serde_json::json!([]));
    assert!(first["error"].is_null());
}
