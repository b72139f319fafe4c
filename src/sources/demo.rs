// src/sources/demo.rs
//! Fixed sample records so the pipeline always has something to show.
//! Every id starts with `DEMO-` and every title with `[DEMO]`.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;

use super::SourceAdapter;
use crate::error::AdapterFailure;
use crate::model::{Category, DateRange, SourceKind};
use crate::normalize::RawRecord;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DemoSet {
    /// Two services announcements.
    #[default]
    Sample,
    /// Every category and contract method, including one private-negotiated.
    Full,
}

impl DemoSet {
    pub fn label(self) -> &'static str {
        match self {
            DemoSet::Sample => "sample",
            DemoSet::Full => "full",
        }
    }
}

impl fmt::Display for DemoSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DemoSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sample" => Ok(DemoSet::Sample),
            "full" => Ok(DemoSet::Full),
            other => Err(format!("unknown demo set `{other}` (expected sample or full)")),
        }
    }
}

type Row = [&'static str; 10];

// id, title, institution, demand institution, category, method,
// published, deadline, opening, estimated price
const SAMPLE: &[Row] = &[
    [
        "DEMO-2025-0001",
        "[DEMO] 인공지능 기반 민원 상담 시스템 구축 용역",
        "서울특별시",
        "서울특별시 디지털정책과",
        "용역",
        "일반경쟁입찰",
        "2025-07-01 09:00",
        "2025-07-15 18:00",
        "2025-07-16 14:00",
        "450,000,000",
    ],
    [
        "DEMO-2025-0002",
        "[DEMO] 도청 통합 보안관제 유지관리 용역",
        "경기도",
        "경기도 정보통신과",
        "용역",
        "제한경쟁입찰",
        "2025-07-02 10:00",
        "2025-07-16 17:00",
        "2025-07-17 10:00",
        "110,000,000",
    ],
];

const EXTRA: &[Row] = &[
    [
        "DEMO-2025-0003",
        "[DEMO] 업무용 노트북 일괄 구매",
        "부산광역시",
        "부산광역시 총무과",
        "물품",
        "일반경쟁입찰",
        "2025-07-03 09:30",
        "2025-07-11 18:00",
        "2025-07-14 11:00",
        "85,000,000",
    ],
    [
        "DEMO-2025-0004",
        "[DEMO] 공공도서관 리모델링 공사",
        "인천광역시",
        "인천광역시 교육청",
        "공사",
        "제한경쟁입찰",
        "2025-07-03 14:00",
        "2025-07-21 18:00",
        "2025-07-22 10:00",
        "1,320,000,000",
    ],
    [
        "DEMO-2025-0005",
        "[DEMO] 해양관측 장비 도입",
        "조달청",
        "해양수산부",
        "외자",
        "지명경쟁입찰",
        "2025-07-04 10:00",
        "2025-07-25 17:00",
        "",
        "",
    ],
    [
        "DEMO-2025-0006",
        "[DEMO] 청사 시설물 긴급 보수 용역",
        "대전광역시",
        "대전광역시 회계과",
        "용역",
        "수의계약",
        "2025-07-04 15:00",
        "2025-07-08 12:00",
        "",
        "18,000,000",
    ],
    [
        "DEMO-2025-0007",
        "[DEMO] 민원실 안내 키오스크 구매",
        "광주광역시",
        "정보없음",
        "물품",
        "",
        "2025-07-05 09:00",
        "",
        "",
        "",
    ],
];

fn to_raw(row: &Row, requested: Category) -> RawRecord {
    let [id, title, inst, demand, cat, method, published, deadline, opening, price] = *row;
    RawRecord::with_fields(
        SourceKind::Demo,
        requested,
        fields! {
            "id" => id,
            "title" => title,
            "institution" => inst,
            "demand_institution" => demand,
            "category" => cat,
            "contract_method" => method,
            "published" => published,
            "deadline" => deadline,
            "opening" => opening,
            "estimated_price" => price,
        },
    )
}

pub struct DemoAdapter {
    set: DemoSet,
}

impl DemoAdapter {
    pub fn new(set: DemoSet) -> Self {
        Self { set }
    }

    fn rows(&self) -> impl Iterator<Item = &'static Row> {
        let extra: &'static [Row] = match self.set {
            DemoSet::Sample => &[],
            DemoSet::Full => EXTRA,
        };
        SAMPLE.iter().chain(extra.iter())
    }
}

#[async_trait]
impl SourceAdapter for DemoAdapter {
    fn kind(&self) -> SourceKind {
        SourceKind::Demo
    }

    /// Returns the whole set whatever the category; each row carries its own.
    async fn collect(
        &mut self,
        _range: &DateRange,
        category: Category,
    ) -> Result<Vec<RawRecord>, AdapterFailure> {
        logd!("demo-data: serving {} set for {}", self.set, category);
        Ok(self.rows().map(|r| to_raw(r, category)).collect())
    }
}
