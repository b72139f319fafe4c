// tests/api_adapter.rs
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use g2b_collect::config::options::CollectOptions;
use g2b_collect::error::FailureReason;
use g2b_collect::model::{Category, DateRange, SourceKind};
use g2b_collect::normalize::normalize;
use g2b_collect::sources::api::PublicApiAdapter;
use g2b_collect::sources::SourceAdapter;

fn range() -> DateRange {
    let now = NaiveDate::from_ymd_opt(2025, 7, 8).unwrap().and_hms_opt(12, 0, 0).unwrap();
    DateRange::last_days(7, now)
}

fn adapter(server: &MockServer, page_size: u32) -> PublicApiAdapter {
    PublicApiAdapter::new(&CollectOptions {
        api_key: Some("test%2Bkey%3D%3D".into()),
        api_base_url: server.uri(),
        page_size,
        max_pages: 5,
        ..CollectOptions::default()
    })
}

fn item(no: &str, method: &str) -> serde_json::Value {
    json!({
        "bidNtceNo": no,
        "bidNtceOrd": "000",
        "bidNtceNm": format!("공고 {no}"),
        "ntceInsttNm": "조달청",
        "dminsttNm": "서울특별시",
        "cntrctCnclsMthdNm": method,
        "bidNtceDt": "2025-07-03 10:00:00",
        "bidClseDt": "2025-07-10 18:00:00",
        "presmptPrc": 1500000,
    })
}

fn page(items: Vec<serde_json::Value>, total: usize) -> serde_json::Value {
    json!({
        "response": {
            "header": { "resultCode": "00", "resultMsg": "NORMAL SERVICE." },
            "body": { "items": items, "numOfRows": 2, "pageNo": 1, "totalCount": total }
        }
    })
}

const GOODS: &str = "/getBidPblancListInfoThngPPSSrch";

#[tokio::test]
async fn json_pages_are_followed_until_total() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GOODS))
        .and(query_param("pageNo", "1"))
        .and(query_param("serviceKey", "test+key=="))
        .and(query_param("inqryBgnDt", "202507011200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![item("R25BK0001", "일반경쟁입찰"), item("R25BK0002", "수의계약")],
            3,
        )))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(GOODS))
        .and(query_param("pageNo", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(vec![item("R25BK0003", "제한경쟁")], 3)))
        .expect(1)
        .mount(&server)
        .await;

    let mut api = adapter(&server, 2);
    let raws = api.collect(&range(), Category::Goods).await.unwrap();
    assert_eq!(raws.len(), 3);
    assert!(raws.iter().all(|r| r.source == SourceKind::PublicApi && r.category == Category::Goods));

    let rec = normalize(&raws[0]).unwrap();
    assert_eq!(rec.id, "R25BK0001-000");
    assert_eq!(rec.institution.as_deref(), Some("조달청"));
    assert_eq!(rec.demand_institution.as_deref(), Some("서울특별시"));
    assert_eq!(rec.estimated_price.as_deref(), Some("1500000"));
    assert!(rec.deadline.is_some());
}

#[tokio::test]
async fn missing_total_count_keeps_paging_on_full_pages() {
    let server = MockServer::start().await;
    let bare = |items: Vec<serde_json::Value>| {
        json!({
            "response": {
                "header": { "resultCode": "00", "resultMsg": "NORMAL SERVICE." },
                "body": { "items": items, "numOfRows": 2 }
            }
        })
    };
    Mock::given(method("GET"))
        .and(query_param("pageNo", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bare(vec![item("A", "일반경쟁"), item("B", "일반경쟁")])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("pageNo", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bare(vec![item("C", "제한경쟁")])))
        .expect(1)
        .mount(&server)
        .await;

    let raws = adapter(&server, 2).collect(&range(), Category::Goods).await.unwrap();
    assert_eq!(raws.len(), 3);
}

#[tokio::test]
async fn xml_refusal_is_authentication() {
    let server = MockServer::start().await;
    let body = r#"<OpenAPI_ServiceResponse>
        <cmmMsgHeader>
            <errMsg>SERVICE ERROR</errMsg>
            <returnAuthMsg>SERVICE_KEY_IS_NOT_REGISTERED_ERROR</returnAuthMsg>
            <returnReasonCode>30</returnReasonCode>
        </cmmMsgHeader>
    </OpenAPI_ServiceResponse>"#;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let err = adapter(&server, 100).collect(&range(), Category::Services).await.unwrap_err();
    assert_eq!(err.reason, FailureReason::Authentication);
    assert!(err.message.contains("SERVICE_KEY_IS_NOT_REGISTERED_ERROR"));
}

#[tokio::test]
async fn server_errors_are_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = adapter(&server, 100).collect(&range(), Category::Construction).await.unwrap_err();
    assert_eq!(err.reason, FailureReason::Network);
    assert!(err.reason.is_retryable());
}

#[tokio::test]
async fn forbidden_is_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = adapter(&server, 100).collect(&range(), Category::Goods).await.unwrap_err();
    assert_eq!(err.reason, FailureReason::Authentication);
}

#[tokio::test]
async fn no_data_code_and_empty_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/getBidPblancListInfoFrgcptPPSSrch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "header": { "resultCode": "03", "resultMsg": "NODATA_ERROR" } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/getBidPblancListInfoServcPPSSrch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "header": { "resultCode": "00", "resultMsg": "NORMAL SERVICE." },
                "body": { "items": "", "totalCount": 0 }
            }
        })))
        .mount(&server)
        .await;

    let mut api = adapter(&server, 100);
    let err = api.collect(&range(), Category::ForeignCapital).await.unwrap_err();
    assert_eq!(err.reason, FailureReason::NoData);
    let err = api.collect(&range(), Category::Services).await.unwrap_err();
    assert_eq!(err.reason, FailureReason::NoData);
}

#[tokio::test]
async fn garbage_body_is_parse_mismatch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Unexpected errors"))
        .mount(&server)
        .await;

    let err = adapter(&server, 100).collect(&range(), Category::Goods).await.unwrap_err();
    assert_eq!(err.reason, FailureReason::ParseMismatch);
}

#[tokio::test]
async fn later_page_failure_keeps_earlier_rows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("pageNo", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![item("A", "일반경쟁"), item("B", "일반경쟁")],
            10,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("pageNo", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let raws = adapter(&server, 2).collect(&range(), Category::Goods).await.unwrap();
    assert_eq!(raws.len(), 2);
}

#[tokio::test]
async fn missing_key_never_calls_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut api = PublicApiAdapter::new(&CollectOptions {
        api_key: None,
        api_base_url: server.uri(),
        ..CollectOptions::default()
    });
    let err = api.collect(&range(), Category::Goods).await.unwrap_err();
    assert_eq!(err.reason, FailureReason::Authentication);
}
