// src/sources/browser/chromium.rs
//! Headless Chromium over CDP.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::PageSource;
use crate::config::consts::{CHROME_PATH_ENV, PAGE_SETTLE_MS, USER_AGENT};
use crate::error::AdapterFailure;

/// Outer document plus every same-origin frame. G2B renders its result grid
/// inside frames, so the top document alone is usually empty.
const DOCUMENT_WITH_FRAMES_JS: &str = r#"(() => {
  const parts = [document.documentElement.outerHTML];
  for (const f of document.querySelectorAll('iframe, frame')) {
    try {
      if (f.contentDocument && f.contentDocument.documentElement) {
        parts.push(f.contentDocument.documentElement.outerHTML);
      }
    } catch (e) { /* cross-origin */ }
  }
  return parts.join('\n');
})()"#;

const COMMON_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    r"C:\Program Files\Google\Chrome\Application\chrome.exe",
    r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
];

/// Find a Chrome/Chromium binary: env override, then PATH, then usual spots.
pub fn find_chromium() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(CHROME_PATH_ENV).map(PathBuf::from) {
        if p.exists() {
            return Some(p);
        }
        logw!("{CHROME_PATH_ENV}={} does not exist; searching elsewhere", p.display());
    }
    for name in ["google-chrome", "google-chrome-stable", "chromium", "chromium-browser", "chrome"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }
    COMMON_PATHS.iter().map(PathBuf::from).find(|p| p.exists())
}

pub struct ChromiumPages {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
}

impl ChromiumPages {
    pub async fn launch(executable: Option<PathBuf>) -> Result<Self, AdapterFailure> {
        let path = executable
            .filter(|p| p.exists())
            .or_else(find_chromium)
            .ok_or_else(|| AdapterFailure::unavailable("no Chrome/Chromium executable found"))?;
        logd!("browser: launching {}", path.display());

        let config = BrowserConfig::builder()
            .chrome_executable(path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--lang=ko-KR")
            .arg("--window-size=1920,1080")
            .arg(format!("--user-agent={USER_AGENT}"))
            .build()
            .map_err(|e| AdapterFailure::unavailable(format!("browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AdapterFailure::unavailable(format!("failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self { browser, handler, page: None })
    }
}

/// Run one page-load step under a single deadline. Elapsed is a `network`
/// failure like any other load error.
pub(crate) async fn within<T, F>(timeout: Duration, fut: F) -> Result<T, AdapterFailure>
where
    F: Future<Output = Result<T, AdapterFailure>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(r) => r,
        Err(_) => Err(AdapterFailure::network(format!(
            "page load timed out after {}s",
            timeout.as_secs_f32()
        ))),
    }
}

/// Navigate, wait for the load to settle and snapshot the DOM, all inside
/// `timeout`.
async fn render(page: &Page, url: &str, timeout: Duration) -> Result<String, AdapterFailure> {
    within(timeout, async {
        page.goto(url)
            .await
            .map_err(|e| AdapterFailure::network(format!("navigation failed: {e}")))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| AdapterFailure::network(format!("page never finished loading: {e}")))?;
        tokio::time::sleep(Duration::from_millis(PAGE_SETTLE_MS)).await;

        let result = page
            .evaluate(DOCUMENT_WITH_FRAMES_JS)
            .await
            .map_err(|e| AdapterFailure::network(format!("reading DOM failed: {e}")))?;
        result
            .into_value::<String>()
            .map_err(|e| AdapterFailure::parse_mismatch(format!("DOM snapshot was not text: {e:?}")))
    })
    .await
}

#[async_trait]
impl PageSource for ChromiumPages {
    async fn fetch_html(&mut self, url: &str, timeout: Duration) -> Result<String, AdapterFailure> {
        let page = match self.page.take() {
            Some(p) => p,
            None => self
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| AdapterFailure::unavailable(format!("cannot open a tab: {e}")))?,
        };
        let html = render(&page, url, timeout).await;
        self.page = Some(page);
        html
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        let _ = self.browser.close().await;
        self.handler.abort();
    }
}
