// tests/pipeline_fallback.rs
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use g2b_collect::collect::{dedup, AcquisitionMethod, AttemptOutcome, CollectionResult, Orchestrator};
use g2b_collect::config::options::{CollectOptions, RetryPolicy};
use g2b_collect::error::{AdapterFailure, FailureReason};
use g2b_collect::fields;
use g2b_collect::model::{Category, ContractMethod, DateRange, SourceKind};
use g2b_collect::normalize::{normalize, RawRecord};
use g2b_collect::sources::api::PublicApiAdapter;
use g2b_collect::sources::demo::{DemoAdapter, DemoSet};
use g2b_collect::sources::SourceAdapter;

type Reply = Box<dyn FnMut(Category, u32) -> Result<Vec<RawRecord>, AdapterFailure> + Send>;

/// Adapter driven by a closure: `(category, nth call for that category)`.
struct Scripted {
    kind: SourceKind,
    reply: Reply,
    probe: Probe,
}

#[derive(Clone, Default)]
struct Probe {
    calls: Arc<Mutex<Vec<Category>>>,
    shutdowns: Arc<AtomicUsize>,
}

impl Probe {
    fn calls(&self) -> Vec<Category> {
        self.calls.lock().unwrap().clone()
    }
    fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceAdapter for Scripted {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn collect(
        &mut self,
        _range: &DateRange,
        category: Category,
    ) -> Result<Vec<RawRecord>, AdapterFailure> {
        let nth = {
            let mut calls = self.probe.calls.lock().unwrap();
            calls.push(category);
            calls.iter().filter(|c| **c == category).count() as u32
        };
        (self.reply)(category, nth)
    }

    async fn shutdown(&mut self) {
        self.probe.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

fn scripted(
    kind: SourceKind,
    reply: impl FnMut(Category, u32) -> Result<Vec<RawRecord>, AdapterFailure> + Send + 'static,
) -> (Box<dyn SourceAdapter>, Probe) {
    let probe = Probe::default();
    let adapter = Scripted { kind, reply: Box::new(reply), probe: probe.clone() };
    (Box::new(adapter), probe)
}

/// A raw record shaped the way `kind` would deliver it.
fn raw(kind: SourceKind, cat: Category, id: &str, title: &str, method: &str) -> RawRecord {
    let fields = match kind {
        SourceKind::PublicApi => fields! {
            "bidNtceNo" => id, "bidNtceNm" => title, "ntceInsttNm" => "조달청",
            "cntrctCnclsMthdNm" => method, "bidNtceDt" => "2025-07-01 09:00:00",
        },
        SourceKind::Browser => fields! {
            "공고번호" => id, "공고명" => title, "공고기관" => "조달청",
            "계약방법" => method, "공고일자" => "2025/07/01 09:00",
        },
        _ => fields! {
            "id" => id, "title" => title, "institution" => "조달청",
            "contract_method" => method, "published" => "2025-07-01 09:00",
        },
    };
    RawRecord::with_fields(kind, cat, fields)
}

fn range() -> DateRange {
    let now = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap().and_hms_opt(12, 0, 0).unwrap();
    DateRange::last_days(7, now)
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy { max_attempts, base_delay: Duration::from_millis(1) }
}

#[tokio::test]
async fn auth_failure_on_api_moves_to_browser() {
    let (api, api_probe) = scripted(SourceKind::PublicApi, |_, _| {
        Err(AdapterFailure::authentication("SERVICE_KEY_IS_NOT_REGISTERED_ERROR"))
    });
    let (browser, browser_probe) = scripted(SourceKind::Browser, |cat, _| {
        let id = format!("B-{}", cat.label());
        Ok(vec![raw(SourceKind::Browser, cat, &id, "브라우저 공고", "일반경쟁")])
    });
    let (demo, demo_probe) = scripted(SourceKind::Demo, |_, _| panic!("demo must not be reached"));

    let mut orch = Orchestrator::new(vec![api, browser, demo], fast_retry(3));
    let result = orch.collect(&range(), &Category::ALL, None).await;

    assert_eq!(api_probe.calls(), Category::ALL.to_vec(), "auth is not retried");
    assert_eq!(browser_probe.calls(), Category::ALL.to_vec());
    assert!(demo_probe.calls().is_empty());

    for outcome in result.outcomes() {
        assert_eq!(outcome.method, Some(SourceKind::Browser));
        assert_eq!(outcome.attempts.len(), 2);
        assert_eq!(outcome.attempts[0].source, SourceKind::PublicApi);
        assert_eq!(outcome.attempts[0].tries, 1);
        assert!(matches!(
            &outcome.attempts[0].outcome,
            AttemptOutcome::Failed(f) if f.reason == FailureReason::Authentication
        ));
        assert_eq!(outcome.attempts[1].outcome, AttemptOutcome::Collected(1));
    }
    assert_eq!(result.len(), 4);
    assert_eq!(result.acquisition_method(), AcquisitionMethod::Single(SourceKind::Browser));
}

#[tokio::test]
async fn network_errors_retry_the_same_adapter() {
    // Goods recovers on the second try; everything else keeps failing.
    let (api, api_probe) = scripted(SourceKind::PublicApi, |cat, nth| match (cat, nth) {
        (Category::Goods, 2) => Ok(vec![raw(SourceKind::PublicApi, cat, "A-1", "회복", "일반경쟁")]),
        _ => Err(AdapterFailure::network("connection reset")),
    });
    let demo: Box<dyn SourceAdapter> = Box::new(DemoAdapter::new(DemoSet::Sample));

    let mut orch = Orchestrator::new(vec![api, demo], fast_retry(3));
    let result = orch.collect(&range(), &[Category::Goods, Category::Services], None).await;

    let calls = api_probe.calls();
    assert_eq!(calls.iter().filter(|c| **c == Category::Goods).count(), 2);
    assert_eq!(calls.iter().filter(|c| **c == Category::Services).count(), 3);

    let goods = &result.outcomes()[0];
    assert_eq!(goods.method, Some(SourceKind::PublicApi));
    assert_eq!(goods.attempts[0].tries, 2);

    let services = &result.outcomes()[1];
    assert_eq!(services.method, Some(SourceKind::Demo));
    assert_eq!(services.attempts[0].tries, 3);
    assert_eq!(result.acquisition_method(), AcquisitionMethod::Mixed);
}

#[tokio::test]
async fn empty_and_unusable_answers_fall_through() {
    let (api, _) = scripted(SourceKind::PublicApi, |_, _| Ok(Vec::new()));
    // Rows without a title never normalize.
    let (browser, _) = scripted(SourceKind::Browser, |cat, _| {
        Ok(vec![RawRecord::with_fields(SourceKind::Browser, cat, fields! { "공고번호" => "X" })])
    });
    let demo: Box<dyn SourceAdapter> = Box::new(DemoAdapter::new(DemoSet::Sample));

    let mut orch = Orchestrator::new(vec![api, browser, demo], RetryPolicy::none());
    let result = orch.collect(&range(), &[Category::Construction], None).await;

    let outcome = &result.outcomes()[0];
    assert!(matches!(
        &outcome.attempts[0].outcome,
        AttemptOutcome::Failed(f) if f.reason == FailureReason::NoData
    ));
    assert_eq!(outcome.attempts[1].outcome, AttemptOutcome::Rejected(1));
    assert_eq!(outcome.method, Some(SourceKind::Demo));
    assert_eq!(result.rejected(), 1);
}

#[tokio::test]
async fn terminates_within_adapters_times_categories() {
    let (api, api_probe) = scripted(SourceKind::PublicApi, |_, _| Err(AdapterFailure::network("down")));
    let (browser, browser_probe) =
        scripted(SourceKind::Browser, |_, _| Err(AdapterFailure::parse_mismatch("layout changed")));
    let (last, last_probe) = scripted(SourceKind::Demo, |_, _| Err(AdapterFailure::no_data("nothing")));

    let retry = fast_retry(2);
    let mut orch = Orchestrator::new(vec![api, browser, last], retry.clone());
    let result = orch.collect(&range(), &Category::ALL, None).await;

    let adapters = 3;
    let categories = Category::ALL.len();
    let steps: usize = result.outcomes().iter().map(|o| o.attempts.len()).sum();
    assert!(steps <= adapters * categories);

    let calls = api_probe.calls().len() + browser_probe.calls().len() + last_probe.calls().len();
    assert!(calls <= adapters * categories * retry.max_attempts as usize);

    assert!(result.is_empty());
    assert!(result.outcomes().iter().all(|o| o.method.is_none()));
    assert_eq!(result.acquisition_method(), AcquisitionMethod::Nothing);
    assert_eq!(api_probe.shutdowns() + browser_probe.shutdowns() + last_probe.shutdowns(), 3);
}

#[tokio::test]
async fn demo_only_scenario() {
    // No key: the real API adapter refuses without touching the network.
    let api: Box<dyn SourceAdapter> = Box::new(PublicApiAdapter::new(&CollectOptions::default()));
    let (browser, _) = scripted(SourceKind::Browser, |_, _| {
        Err(AdapterFailure::unavailable("no Chrome/Chromium executable found"))
    });
    let demo: Box<dyn SourceAdapter> = Box::new(DemoAdapter::new(DemoSet::Sample));

    let mut orch = Orchestrator::new(vec![api, browser, demo], RetryPolicy::default());
    let result = orch.collect(&range(), &Category::ALL, None).await;

    assert_eq!(result.len(), 2);
    let summary = result.summary(10);
    assert_eq!(summary.total, 2);
    assert_eq!(summary.by_category, vec![(Category::Services, 2)]);
    assert_eq!(summary.method_count("open-competitive"), 1);
    assert_eq!(summary.method_count("restricted-competitive"), 1);
    assert_eq!(summary.acquisition, AcquisitionMethod::Single(SourceKind::Demo));

    let text = summary.to_string();
    assert!(text.contains("Acquisition method: demo-data"));
    assert!(text.contains("services: 2"));

    // Same two ids served for every category; dedup collapses the repeats.
    assert_eq!(result.duplicates(), 2 * (Category::ALL.len() - 1));
}

#[tokio::test]
async fn higher_priority_duplicate_wins() {
    // Goods: API succeeds with X. Services: API fails, browser re-lists X plus Y.
    let (api, _) = scripted(SourceKind::PublicApi, |cat, _| match cat {
        Category::Goods => Ok(vec![raw(SourceKind::PublicApi, cat, "X", "from api", "일반경쟁")]),
        _ => Err(AdapterFailure::authentication("refused")),
    });
    let (browser, _) = scripted(SourceKind::Browser, |cat, _| {
        Ok(vec![
            raw(SourceKind::Browser, cat, "X", "from browser", "일반경쟁"),
            raw(SourceKind::Browser, cat, "Y", "only in browser", "제한경쟁"),
        ])
    });

    let mut orch = Orchestrator::new(vec![api, browser], RetryPolicy::none());
    let result = orch.collect(&range(), &[Category::Goods, Category::Services], None).await;

    let ids: Vec<_> = result.records().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["X", "Y"]);
    assert_eq!(result.records()[0].title, "from api");
    assert_eq!(result.records()[0].source, SourceKind::PublicApi);
    assert_eq!(result.duplicates(), 1);
}

#[test]
fn lower_priority_first_is_replaced_in_place() {
    let browser = normalize(&raw(SourceKind::Browser, Category::Goods, "X", "browser", "일반경쟁")).unwrap();
    let other = normalize(&raw(SourceKind::Browser, Category::Goods, "Z", "z", "일반경쟁")).unwrap();
    let api = normalize(&raw(SourceKind::PublicApi, Category::Goods, "X", "api", "일반경쟁")).unwrap();
    let demo = normalize(&raw(SourceKind::Demo, Category::Goods, "X", "demo", "일반경쟁")).unwrap();

    let (out, collapsed) = dedup(vec![browser, other, api, demo]);
    assert_eq!(collapsed, 2);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].id, "X");
    assert_eq!(out[0].title, "api");
    assert_eq!(out[1].id, "Z");
}

#[test]
fn same_source_collision_keeps_the_last_write() {
    let first = normalize(&raw(SourceKind::PublicApi, Category::Goods, "X", "first", "일반경쟁")).unwrap();
    let mid = normalize(&raw(SourceKind::PublicApi, Category::Goods, "M", "m", "일반경쟁")).unwrap();
    let second = normalize(&raw(SourceKind::PublicApi, Category::Goods, "X", "second", "일반경쟁")).unwrap();

    let (out, _) = dedup(vec![first, mid, second]);
    assert_eq!(out[0].title, "second");
    assert_eq!(out[1].id, "M");
}

#[tokio::test]
async fn private_negotiated_never_exported_and_counts_add_up() {
    let (api, _) = scripted(SourceKind::PublicApi, |cat, _| {
        let p = cat.label();
        Ok(vec![
            raw(SourceKind::PublicApi, cat, &format!("{p}-1"), "일반", "일반경쟁입찰"),
            raw(SourceKind::PublicApi, cat, &format!("{p}-2"), "수의", "수의계약"),
            raw(SourceKind::PublicApi, cat, "SHARED", "여러 분류", "제한경쟁"),
            raw(SourceKind::PublicApi, cat, &format!("{p}-3"), "미상", ""),
        ])
    });
    let mut orch = Orchestrator::new(vec![api], RetryPolicy::none());
    let result = orch.collect(&range(), &Category::ALL, None).await;

    assert!(result.records().iter().all(|r| r.contract_method != ContractMethod::PrivateNegotiated));
    assert!(result.records().iter().any(|r| r.contract_method == ContractMethod::Unspecified));

    // 4 categories × 4 rows; SHARED appears 4 times; 4 private-negotiated.
    let unique: HashSet<_> = Category::ALL
        .iter()
        .flat_map(|c| {
            let p = c.label();
            [format!("{p}-1"), format!("{p}-2"), s("SHARED"), format!("{p}-3")]
        })
        .collect();
    assert_eq!(result.len(), unique.len() - result.filtered());
    assert_eq!(result.filtered(), 4);
    assert_eq!(result.duplicates(), 3);
}

#[test]
fn from_records_applies_dedup_and_filter() {
    let recs = vec![
        normalize(&raw(SourceKind::Demo, Category::Goods, "A", "a", "수의계약")).unwrap(),
        normalize(&raw(SourceKind::Demo, Category::Goods, "B", "b", "일반경쟁")).unwrap(),
        normalize(&raw(SourceKind::Demo, Category::Goods, "B", "b2", "일반경쟁")).unwrap(),
    ];
    let result = CollectionResult::from_records(recs, Vec::new(), 0);
    assert_eq!(result.len(), 1);
    assert_eq!(result.records()[0].title, "b2");
    assert_eq!(result.acquisition_method(), AcquisitionMethod::Single(SourceKind::Demo));
}

fn s(v: &str) -> String {
    v.to_string()
}
