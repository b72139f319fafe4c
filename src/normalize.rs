// src/normalize.rs
//! Raw adapter output → canonical [`BidRecord`].
//!
//! Each source names its fields differently: the public API uses its own
//! camelCase keys, browser tables carry Korean header text (or nothing but cell
//! position), demo data and the cache use the canonical snake_case names. All
//! of that knowledge lives here so adapters can stay dumb.

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::consts::DETAIL_LINK_PREFIX;
use crate::core::sanitize::clean_cell;
use crate::error::NormalizeError;
use crate::model::{BidRecord, Category, ContractMethod, SourceKind};

/// Canonical field names, in CSV column order.
pub const CANONICAL_FIELDS: [&str; 12] = [
    "id",
    "title",
    "institution",
    "demand_institution",
    "category",
    "contract_method",
    "published",
    "deadline",
    "opening",
    "estimated_price",
    "link",
    "source",
];

/// One unvalidated record as an adapter saw it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
    pub source: SourceKind,
    /// Category the adapter was asked for. A category cell overrides it.
    pub category: Category,
    /// Source-native `(key, value)` pairs, in source order.
    pub fields: Vec<(String, String)>,
}

impl RawRecord {
    pub fn new(source: SourceKind, category: Category) -> Self {
        Self { source, category, fields: Vec::new() }
    }

    pub fn with_fields(source: SourceKind, category: Category, fields: Vec<(String, String)>) -> Self {
        Self { source, category, fields }
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.push((key.into(), value.into()));
    }

    /// First value stored under exactly `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Id,
    Order,
    Title,
    Institution,
    Demand,
    Method,
    Published,
    Deadline,
    Opening,
    Price,
    Link,
    Category,
    Source,
}

const FIELD_COUNT: usize = 13;

impl Field {
    fn slot(self) -> usize {
        self as usize
    }
}

fn api_field(key: &str) -> Option<Field> {
    Some(match key {
        "bidNtceNo" => Field::Id,
        "bidNtceOrd" => Field::Order,
        "bidNtceNm" => Field::Title,
        "ntceInsttNm" => Field::Institution,
        "dminsttNm" | "dmndInsttNm" => Field::Demand,
        "cntrctCnclsMthdNm" | "cntrctMthd" => Field::Method,
        "bidNtceDt" => Field::Published,
        "bidClseDt" => Field::Deadline,
        "opengDt" => Field::Opening,
        "presmptPrc" | "asignBdgtAmt" => Field::Price,
        "bidNtceDtlUrl" => Field::Link,
        _ => return None,
    })
}

fn canonical_field(key: &str) -> Option<Field> {
    Some(match key {
        "id" => Field::Id,
        "title" => Field::Title,
        "institution" => Field::Institution,
        "demand_institution" => Field::Demand,
        "category" => Field::Category,
        "contract_method" => Field::Method,
        "published" => Field::Published,
        "deadline" => Field::Deadline,
        "opening" => Field::Opening,
        "estimated_price" => Field::Price,
        "link" => Field::Link,
        "source" => Field::Source,
        _ => return None,
    })
}

/// Header keyword rules for browser tables, most specific first. A header
/// takes the first rule it matches, and when two columns claim the same field
/// the one matched by the earlier rule wins (`공고번호` over a bare `번호`).
const HEADER_RULES: &[(&str, Field)] = &[
    ("공고번호", Field::Id),
    ("공고명", Field::Title),
    ("수요기관", Field::Demand),
    ("공고기관", Field::Institution),
    ("계약방법", Field::Method),
    ("입찰방법", Field::Method),
    ("개찰", Field::Opening),
    ("마감", Field::Deadline),
    ("접수", Field::Deadline),
    ("공고일", Field::Published),
    ("게시일", Field::Published),
    ("등록일", Field::Published),
    ("추정가격", Field::Price),
    ("예정가격", Field::Price),
    ("구분", Field::Category),
    ("업무", Field::Category),
    ("번호", Field::Id),
    ("제목", Field::Title),
    ("기관", Field::Institution),
    ("방법", Field::Method),
];

/// Key under which the browser adapter stores a cell with no usable header.
pub fn positional_key(index: usize) -> String {
    format!("#{index}")
}

/// Positional cells rank below every header rule.
const POSITIONAL_RANK: usize = HEADER_RULES.len();

fn browser_field(key: &str) -> Option<(Field, usize)> {
    if let Some(idx) = key.strip_prefix('#') {
        let field = match idx.parse::<usize>().ok()? {
            0 => Field::Id,
            1 => Field::Title,
            2 => Field::Institution,
            _ => return None,
        };
        return Some((field, POSITIONAL_RANK));
    }
    let compact: String = key.chars().filter(|c| !c.is_whitespace()).collect();
    HEADER_RULES
        .iter()
        .position(|(kw, _)| compact.contains(kw))
        .map(|rank| (HEADER_RULES[rank].1, rank))
}

/// Field for `key` plus its rank; lower ranks win a contested slot. Exact
/// key schemes all rank 0, so the first non-empty value stays.
fn resolve(source: SourceKind, key: &str) -> Option<(Field, usize)> {
    match source {
        SourceKind::PublicApi => api_field(key).map(|f| (f, 0)),
        SourceKind::Browser => browser_field(key),
        SourceKind::Demo | SourceKind::Cache => canonical_field(key).map(|f| (f, 0)),
    }
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y.%m.%d %H:%M:%S",
    "%Y.%m.%d %H:%M",
    "%Y%m%d%H%M%S",
    "%Y%m%d%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];

/// Lenient date-time parse. A trailing parenthesised part
/// (`2025/07/01 10:00 (2025/07/15 18:00)`) is ignored; date-only → midnight.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let t = text.split('(').next().unwrap_or_default().trim();
    if t.is_empty() {
        return None;
    }
    for f in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, f) {
            return Some(dt);
        }
    }
    for f in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(t, f) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn date_field(
    slots: &mut [Option<String>; FIELD_COUNT],
    field: Field,
    name: &'static str,
) -> Result<Option<NaiveDateTime>, NormalizeError> {
    match slots[field.slot()].take() {
        None => Ok(None),
        Some(value) => match parse_datetime(&value) {
            Some(dt) => Ok(Some(dt)),
            None => Err(NormalizeError::BadDate { field: name, value }),
        },
    }
}

pub fn detail_link(id: &str) -> String {
    format!("{DETAIL_LINK_PREFIX}{id}")
}

/// Map one raw record to the canonical schema. Pure.
pub fn normalize(raw: &RawRecord) -> Result<BidRecord, NormalizeError> {
    let mut slots: [Option<String>; FIELD_COUNT] = Default::default();
    let mut ranks = [usize::MAX; FIELD_COUNT];
    for (key, value) in &raw.fields {
        let Some((field, rank)) = resolve(raw.source, key) else { continue };
        let i = field.slot();
        if slots[i].is_some() && rank >= ranks[i] {
            continue;
        }
        if let Some(v) = clean_cell(value) {
            slots[i] = Some(v);
            ranks[i] = rank;
        }
    }

    let mut id = slots[Field::Id.slot()].take().ok_or(NormalizeError::MissingField("id"))?;
    if let Some(ord) = slots[Field::Order.slot()].take() {
        id = format!("{id}-{ord}");
    }
    let title = slots[Field::Title.slot()].take().ok_or(NormalizeError::MissingField("title"))?;
    let published = date_field(&mut slots, Field::Published, "published")?
        .ok_or(NormalizeError::MissingField("published"))?;
    let deadline = date_field(&mut slots, Field::Deadline, "deadline")?;
    let opening = date_field(&mut slots, Field::Opening, "opening")?;

    let category = slots[Field::Category.slot()]
        .take()
        .and_then(|c| Category::from_text(&c))
        .unwrap_or(raw.category);
    let contract_method = slots[Field::Method.slot()]
        .take()
        .map(|m| ContractMethod::from_text(&m))
        .unwrap_or(ContractMethod::Unspecified);

    // A reloaded cache row remembers where it originally came from.
    let source = match raw.source {
        SourceKind::Cache => slots[Field::Source.slot()]
            .take()
            .and_then(|s| SourceKind::from_label(&s))
            .unwrap_or(SourceKind::Cache),
        other => other,
    };

    let link = slots[Field::Link.slot()].take().unwrap_or_else(|| detail_link(&id));

    Ok(BidRecord {
        id,
        title,
        institution: slots[Field::Institution.slot()].take(),
        demand_institution: slots[Field::Demand.slot()].take(),
        category,
        contract_method,
        published,
        deadline,
        opening,
        estimated_price: slots[Field::Price.slot()].take(),
        link,
        source,
    })
}

/// Normalize a batch, logging and counting rejects instead of failing.
pub fn normalize_all(raws: &[RawRecord], rejected: &mut usize) -> Vec<BidRecord> {
    let mut out = Vec::with_capacity(raws.len());
    for raw in raws {
        match normalize(raw) {
            Ok(rec) => out.push(rec),
            Err(e) => {
                *rejected += 1;
                logw!("{} record rejected: {}", raw.source, e);
            }
        }
    }
    out
}
