// src/config/consts.rs

// Public data portal (bid notice service)
pub const API_BASE_URL: &str = "https://apis.data.go.kr/1230000/ad/BidPublicInfoService";
pub const API_KEY_ENV: &str = "G2B_API_KEY";
pub const PAGE_SIZE: u32 = 100;
pub const MAX_PAGES: u32 = 50;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// G2B site
pub const DETAIL_LINK_PREFIX: &str = "https://www.g2b.go.kr/pt/menu/selectSubFrame.do?bidNtceNo=";
pub const BROWSER_PAGES: &[&str] = &[
    "https://www.g2b.go.kr/ep/tbid/tbidFwd.do",
    "https://www.g2b.go.kr/ep/invitation/publish/bidInfoDtl.do",
    "https://www.g2b.go.kr/ep/invitation/publish/pubInvtInfo.do",
];
pub const CHROME_PATH_ENV: &str = "G2B_CHROME_PATH";
pub const PAGE_LOAD_TIMEOUT_SECS: u64 = 30;
pub const PAGE_SETTLE_MS: u64 = 2_000; // scripts fill the result grid after load

// Acquisition
pub const SEARCH_DAYS: i64 = 7;
pub const RETRY_ATTEMPTS: u32 = 3;
pub const RETRY_BASE_MS: u64 = 500;

// Local cache
pub const STORE_DIR: &str = ".store";
pub const CACHE_FILE: &str = "bids.csv";
pub const LOG_FILE: &str = "debug.log";

// Export
pub const DEFAULT_OUT_DIR: &str = "output";
pub const DEFAULT_LABEL: &str = "g2b_bids";
pub const CSV_SEP: char = ',';
pub const TOP_INSTITUTIONS: usize = 10;
