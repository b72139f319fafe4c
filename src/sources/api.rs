// src/sources/api.rs
//! Public bid-notice API adapter (data.go.kr `BidPublicInfoService`).
//!
//! One endpoint per category, paginated. The service answers in JSON when
//! asked, but error envelopes (bad key, quota) come back as XML regardless, so
//! both shapes are parsed and told apart by the first byte of the body.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use super::SourceAdapter;
use crate::config::consts::USER_AGENT;
use crate::config::options::CollectOptions;
use crate::error::{AdapterFailure, FailureReason};
use crate::model::{Category, DateRange, SourceKind};
use crate::normalize::RawRecord;

pub struct PublicApiAdapter {
    /// Builder failure is kept and reported on first use.
    client: Result<Client, AdapterFailure>,
    base_url: String,
    api_key: Option<String>,
    page_size: u32,
    max_pages: u32,
}

impl PublicApiAdapter {
    pub fn new(opts: &CollectOptions) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, application/xml;q=0.9, */*;q=0.8"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(opts.request_timeout)
            .build()
            .map_err(|e| AdapterFailure::unavailable(format!("HTTP client setup failed: {e}")));

        Self {
            client,
            base_url: opts.api_base_url.trim_end_matches('/').to_string(),
            api_key: opts.api_key.clone(),
            page_size: opts.page_size.max(1),
            max_pages: opts.max_pages.max(1),
        }
    }

    async fn fetch_page(
        &self,
        client: &Client,
        key: &str,
        range: &DateRange,
        category: Category,
        page: u32,
    ) -> Result<ApiPage, AdapterFailure> {
        let op = category.api_operation();
        let url = format!("{}/{}", self.base_url, op);
        let page_no = page.to_string();
        let rows = self.page_size.to_string();
        let start = range.api_start();
        let end = range.api_end();

        let resp = client
            .get(&url)
            .query(&[
                ("serviceKey", key),
                ("pageNo", page_no.as_str()),
                ("numOfRows", rows.as_str()),
                ("type", "json"),
                ("inqryDiv", "1"),
                ("inqryBgnDt", start.as_str()),
                ("inqryEndDt", end.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AdapterFailure::network(format!("{op} page {page}: {e}")))?;

        let status = resp.status();
        if let Some(reason) = classify_status(status) {
            return Err(AdapterFailure::new(reason, format!("{op} page {page}: HTTP {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| AdapterFailure::network(format!("{op} page {page}: reading body: {e}")))?;
        parse_page(&body)
    }
}

#[async_trait]
impl SourceAdapter for PublicApiAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::PublicApi
    }

    async fn collect(
        &mut self,
        range: &DateRange,
        category: Category,
    ) -> Result<Vec<RawRecord>, AdapterFailure> {
        let Some(key) = self.api_key.as_deref() else {
            return Err(AdapterFailure::authentication("no API key configured (G2B_API_KEY)"));
        };
        let key = decode_service_key(key);
        let client = self.client.as_ref().map_err(Clone::clone)?;

        let mut out: Vec<RawRecord> = Vec::new();
        for page in 1..=self.max_pages {
            let fetched = match self.fetch_page(client, &key, range, category, page).await {
                Ok(p) => p,
                Err(f) if page == 1 => return Err(f),
                Err(f) if f.reason == FailureReason::NoData => break,
                Err(f) => {
                    logw!("public-api: {} stopped after page {}: {}", category, page - 1, f);
                    break;
                }
            };

            let n = fetched.items.len();
            let total = fetched.total_count;
            out.extend(
                fetched
                    .items
                    .into_iter()
                    .map(|fields| RawRecord::with_fields(SourceKind::PublicApi, category, fields)),
            );
            logd!("public-api: {} page {} → {} items ({} / {})", category, page, n, out.len(), total);

            // A missing totalCount parses as 0 and says nothing about the end.
            if n == 0 || n < self.page_size as usize || (total > 0 && out.len() >= total) {
                break;
            }
        }

        if out.is_empty() {
            return Err(AdapterFailure::no_data(format!("no {} announcements in window", category)));
        }
        Ok(out)
    }
}

/// Portal keys are handed out both raw and percent-encoded; reqwest encodes
/// again, so decode once first.
fn decode_service_key(key: &str) -> String {
    let key = key.trim();
    if !key.contains('%') {
        return key.to_string();
    }
    url::form_urlencoded::parse(format!("k={key}").as_bytes())
        .next()
        .map(|(_, v)| v.into_owned())
        .unwrap_or_else(|| key.to_string())
}

fn classify_status(status: StatusCode) -> Option<FailureReason> {
    if status.is_success() {
        None
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        Some(FailureReason::Network)
    } else {
        // 401/403 and every other refusal.
        Some(FailureReason::Authentication)
    }
}

/// Result code from the service header → failure, if any.
fn classify_code(code: &str) -> Option<FailureReason> {
    match code.trim() {
        "00" | "0" | "" => None,
        "03" => Some(FailureReason::NoData),
        "01" | "02" | "04" | "05" => Some(FailureReason::Network),
        "10" | "11" | "12" | "20" | "22" | "30" | "31" | "32" | "33" => Some(FailureReason::Authentication),
        _ => Some(FailureReason::Authentication),
    }
}

#[derive(Debug, Default)]
pub(crate) struct ApiPage {
    pub code: Option<String>,
    pub message: Option<String>,
    pub total_count: usize,
    pub items: Vec<Vec<(String, String)>>,
}

/// Decode one response body and apply the result code.
pub(crate) fn parse_page(body: &str) -> Result<ApiPage, AdapterFailure> {
    let page = match body.trim_start().as_bytes().first() {
        Some(b'{') | Some(b'[') => parse_json(body)?,
        Some(b'<') => parse_xml(body)?,
        _ => {
            let head: String = body.trim().chars().take(80).collect();
            return Err(AdapterFailure::parse_mismatch(format!("unrecognised response body: {head:?}")));
        }
    };

    if let Some(code) = page.code.as_deref() {
        if let Some(reason) = classify_code(code) {
            let msg = page.message.as_deref().unwrap_or("no message");
            return Err(AdapterFailure::new(reason, format!("service returned {code}: {msg}")));
        }
    }
    if page.code.is_none() && page.items.is_empty() && page.total_count == 0 {
        return Err(AdapterFailure::parse_mismatch("response has neither a result code nor items"));
    }
    if page.items.is_empty() {
        return Err(AdapterFailure::no_data("empty result page"));
    }
    Ok(page)
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => s!(),
        other => other.to_string(),
    }
}

fn object_fields(v: &Value) -> Option<Vec<(String, String)>> {
    let obj = v.as_object()?;
    Some(obj.iter().map(|(k, v)| (k.clone(), scalar_text(v))).collect())
}

fn parse_json(body: &str) -> Result<ApiPage, AdapterFailure> {
    let v: Value = serde_json::from_str(body)
        .map_err(|e| AdapterFailure::parse_mismatch(format!("invalid JSON: {e}")))?;
    let root = v.get("response").unwrap_or(&v);

    let mut page = ApiPage::default();
    if let Some(header) = root.get("header") {
        page.code = header.get("resultCode").map(scalar_text);
        page.message = header.get("resultMsg").map(scalar_text);
    }

    let Some(body) = root.get("body") else {
        return Ok(page);
    };
    page.total_count = match body.get("totalCount") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as usize,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };

    // `items` is an array, `{ "item": [...] }`, `{ "item": {...} }`, or "".
    let items = match body.get("items") {
        Some(Value::Object(o)) => o.get("item").cloned().unwrap_or(Value::Null),
        Some(other) => other.clone(),
        None => Value::Null,
    };
    page.items = match items {
        Value::Array(arr) => arr.iter().filter_map(object_fields).collect(),
        obj @ Value::Object(_) => object_fields(&obj).into_iter().collect(),
        _ => Vec::new(),
    };
    Ok(page)
}

fn parse_xml(body: &str) -> Result<ApiPage, AdapterFailure> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut page = ApiPage::default();
    let mut item: Option<Vec<(String, String)>> = None;
    let mut tag = s!();

    loop {
        let text = match reader.read_event() {
            Ok(Event::Start(e)) => {
                tag = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if tag == "item" {
                    item = Some(Vec::new());
                }
                continue;
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"item" {
                    if let Some(fields) = item.take() {
                        page.items.push(fields);
                    }
                }
                tag.clear();
                continue;
            }
            Ok(Event::Text(t)) => t
                .unescape()
                .map_err(|e| AdapterFailure::parse_mismatch(format!("bad XML text: {e}")))?
                .into_owned(),
            Ok(Event::CData(c)) => String::from_utf8_lossy(&c.into_inner()).into_owned(),
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(e) => {
                return Err(AdapterFailure::parse_mismatch(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        };

        if tag.is_empty() {
            continue;
        }
        if let Some(fields) = item.as_mut() {
            fields.push((tag.clone(), text));
            continue;
        }
        match tag.as_str() {
            "resultCode" | "returnReasonCode" => page.code = Some(text),
            "resultMsg" | "errMsg" => {
                if page.message.is_none() {
                    page.message = Some(text);
                }
            }
            "returnAuthMsg" => page.message = Some(text),
            "totalCount" => page.total_count = text.trim().parse().unwrap_or(0),
            _ => {}
        }
    }
    Ok(page)
}
