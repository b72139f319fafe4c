// src/model.rs
//! Canonical domain types shared by every source adapter, the orchestrator and
//! the exporters.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};

/// Procurement category. Processing order follows `Category::ALL`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Goods,
    Services,
    Construction,
    ForeignCapital,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Goods,
        Category::Services,
        Category::Construction,
        Category::ForeignCapital,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Goods => "goods",
            Category::Services => "services",
            Category::Construction => "construction",
            Category::ForeignCapital => "foreign-capital",
        }
    }

    /// Name used by the G2B site itself.
    pub fn local_name(self) -> &'static str {
        match self {
            Category::Goods => "물품",
            Category::Services => "용역",
            Category::Construction => "공사",
            Category::ForeignCapital => "외자",
        }
    }

    /// Operation name on the public bid-notice service.
    pub fn api_operation(self) -> &'static str {
        match self {
            Category::Goods => "getBidPblancListInfoThngPPSSrch",
            Category::Services => "getBidPblancListInfoServcPPSSrch",
            Category::Construction => "getBidPblancListInfoCnstwkPPSSrch",
            Category::ForeignCapital => "getBidPblancListInfoFrgcptPPSSrch",
        }
    }

    /// Lenient parse from a label, a site name, or a table cell that contains one.
    pub fn from_text(text: &str) -> Option<Category> {
        let t = text.trim();
        let lower = t.to_ascii_lowercase();
        match lower.as_str() {
            "goods" | "thng" => return Some(Category::Goods),
            "services" | "service" | "servc" => return Some(Category::Services),
            "construction" | "cnstwk" => return Some(Category::Construction),
            "foreign-capital" | "foreign" | "frgcpt" => return Some(Category::ForeignCapital),
            _ => {}
        }
        Category::ALL.into_iter().find(|c| t.contains(c.local_name()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_text(s).ok_or_else(|| {
            format!("unknown category `{s}` (expected goods, services, construction, foreign-capital)")
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContractMethod {
    OpenCompetitive,
    RestrictedCompetitive,
    PrivateNegotiated,
    /// Recognised as a method but outside the three tracked kinds; raw text kept.
    Other(String),
    Unspecified,
}

impl ContractMethod {
    pub fn from_text(text: &str) -> ContractMethod {
        let t = text.trim();
        if t.is_empty() {
            return ContractMethod::Unspecified;
        }
        let key: String = t
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        if key.contains("수의") || key.contains("privatenegotiated") {
            ContractMethod::PrivateNegotiated
        } else if key.contains("제한경쟁") || key.contains("restricted") {
            ContractMethod::RestrictedCompetitive
        } else if key.contains("일반경쟁") || key.contains("opencompetitive") {
            ContractMethod::OpenCompetitive
        } else if key == "unspecified" {
            ContractMethod::Unspecified
        } else {
            ContractMethod::Other(t.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ContractMethod::OpenCompetitive => "open-competitive",
            ContractMethod::RestrictedCompetitive => "restricted-competitive",
            ContractMethod::PrivateNegotiated => "private-negotiated",
            ContractMethod::Other(text) => text,
            ContractMethod::Unspecified => "unspecified",
        }
    }

    pub fn is_private_negotiated(&self) -> bool {
        matches!(self, ContractMethod::PrivateNegotiated)
    }
}

impl fmt::Display for ContractMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a record came from. Lower priority value = more authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    PublicApi,
    Browser,
    Demo,
    /// Reloaded from the local cache file.
    Cache,
}

impl SourceKind {
    pub fn priority(self) -> u8 {
        match self {
            SourceKind::PublicApi => 0,
            SourceKind::Browser => 1,
            SourceKind::Demo => 2,
            SourceKind::Cache => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceKind::PublicApi => "public-api",
            SourceKind::Browser => "browser",
            SourceKind::Demo => "demo-data",
            SourceKind::Cache => "cache",
        }
    }

    pub fn from_label(text: &str) -> Option<SourceKind> {
        match text.trim() {
            "public-api" => Some(SourceKind::PublicApi),
            "browser" => Some(SourceKind::Browser),
            "demo-data" => Some(SourceKind::Demo),
            "cache" => Some(SourceKind::Cache),
            _ => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One announcement in canonical form. Built only by `normalize::normalize`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidRecord {
    pub id: String,
    pub title: String,
    pub institution: Option<String>,
    pub demand_institution: Option<String>,
    pub category: Category,
    pub contract_method: ContractMethod,
    pub published: NaiveDateTime,
    pub deadline: Option<NaiveDateTime>,
    pub opening: Option<NaiveDateTime>,
    /// Kept as published text; formatting varies by source.
    pub estimated_price: Option<String>,
    pub link: String,
    pub source: SourceKind,
}

/// Inclusive search window in local time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if start <= end { Self { start, end } } else { Self { start: end, end: start } }
    }

    /// The `days` days ending at `now`.
    pub fn last_days(days: i64, now: NaiveDateTime) -> Self {
        Self::new(now - Duration::days(days.max(0)), now)
    }

    /// `YYYYMMDDHHmm`, as the public API expects.
    pub fn api_start(&self) -> String {
        self.start.format("%Y%m%d%H%M").to_string()
    }

    pub fn api_end(&self) -> String {
        self.end.format("%Y%m%d%H%M").to_string()
    }
}
