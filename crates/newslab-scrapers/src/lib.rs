//! Portal scrapers and the Assembly bill API client.
//!
//! HTML extraction is expressed as ordered strategy lists: each rule is an
//! independent selector tried in priority order until one yields a value.
//! Scrapers produce [`NewsDraft`]s and never touch storage themselves.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use newslab_core::{BillDraft, NewsDraft};
use reqwest::StatusCode;
use scraper::{Html, Selector};
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{debug, warn};

pub const CRATE_NAME: &str = "newslab-scrapers";

/// Korean portals publish wall-clock times in KST.
const KST_OFFSET_SECS: i32 = 9 * 3600;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{0}")]
    Message(String),
}

// ---------------------------------------------------------------------------
// HTTP fetch with retry/backoff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retryable,
    NonRetryable,
}

pub fn classify_status(status: StatusCode) -> RetryDisposition {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        RetryDisposition::Retryable
    } else {
        RetryDisposition::NonRetryable
    }
}

pub fn classify_reqwest_error(err: &reqwest::Error) -> RetryDisposition {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        RetryDisposition::Retryable
    } else {
        RetryDisposition::NonRetryable
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_retries: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl BackoffPolicy {
    pub fn delay_for_attempt(&self, attempt_index: usize) -> Duration {
        let factor = 1u32.checked_shl(attempt_index as u32).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub backoff: BackoffPolicy,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            // Portals serve the mobile layout our selectors target.
            user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X) \
                         AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.0 Mobile/15E148"
                .to_string(),
            backoff: BackoffPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed after retries: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {status} for {url}")]
    HttpStatus { status: u16, url: String },
}

#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    backoff: BackoffPolicy,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            backoff: config.backoff,
        })
    }

    pub async fn fetch_text(&self, source_id: &str, url: &str) -> Result<String, FetchError> {
        debug!(source_id, url, "fetching");

        let mut attempt = 0;
        loop {
            match self.client.get(url).send().await {
                Ok(resp) => {
                    let status = resp.status();
                    let final_url = resp.url().to_string();
                    if status.is_success() {
                        return Ok(resp.text().await?);
                    }
                    if classify_status(status) == RetryDisposition::Retryable
                        && attempt < self.backoff.max_retries
                    {
                        tokio::time::sleep(self.backoff.delay_for_attempt(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(FetchError::HttpStatus {
                        status: status.as_u16(),
                        url: final_url,
                    });
                }
                Err(err) => {
                    if classify_reqwest_error(&err) == RetryDisposition::Retryable
                        && attempt < self.backoff.max_retries
                    {
                        tokio::time::sleep(self.backoff.delay_for_attempt(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(FetchError::Request(err));
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Selector strategy lists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum Target {
    /// Concatenated text content of the first match.
    Text,
    /// A named attribute of the first match.
    Attr(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractRule {
    pub selector: &'static str,
    pub target: Target,
}

fn text_or_none(value: String) -> Option<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Try each rule in order; the first one that yields a non-empty value
/// wins. Rules are independent, so a markup change breaking one selector
/// degrades to the next fallback instead of failing the parse.
pub fn extract_first(document: &Html, rules: &[ExtractRule]) -> Option<String> {
    for rule in rules {
        let Ok(sel) = Selector::parse(rule.selector) else {
            continue;
        };
        let found = document.select(&sel).find_map(|node| match rule.target {
            Target::Text => text_or_none(node.text().collect::<String>()),
            Target::Attr(name) => node.value().attr(name).and_then(|v| text_or_none(v.to_string())),
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Collapse whitespace runs and drop control characters from scraped text.
pub fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Thumbnail extraction
// ---------------------------------------------------------------------------

const THUMBNAIL_SKIP_URL_KEYWORDS: &[&str] = &[
    "logo", "icon", "button", "banner", "advertisement", "profile", "avatar", "favicon", "symbol",
    "emblem", "header", "footer", "nav", "menu",
];

const THUMBNAIL_SKIP_ALT_KEYWORDS: &[&str] = &[
    "로고", "logo", "아이콘", "광고", "배너", "언론사", "프로필", "미리보기",
];

fn is_valid_thumbnail(src: &str, alt: &str) -> bool {
    if !(src.starts_with("http") || src.starts_with("//")) {
        return false;
    }
    let src_lower = src.to_lowercase();
    if THUMBNAIL_SKIP_URL_KEYWORDS.iter().any(|k| src_lower.contains(k)) {
        return false;
    }
    let alt_lower = alt.to_lowercase();
    !THUMBNAIL_SKIP_ALT_KEYWORDS.iter().any(|k| alt_lower.contains(k))
}

const THUMBNAIL_IMG_SELECTORS: &[&str] = &[
    ".newsct_article img",
    "#dic_area img",
    "#harmonyContainer img",
    ".article_view img",
    "img.end_photo_org",
];

const THUMBNAIL_META_SELECTORS: &[&str] = &["meta[property=\"og:image\"]", "meta[name=\"twitter:image\"]"];

/// Article-body images win over meta-tag images; publisher logos and UI
/// chrome are filtered by keyword.
pub fn extract_thumbnail(document: &Html) -> Option<String> {
    for selector in THUMBNAIL_IMG_SELECTORS {
        let Ok(sel) = Selector::parse(selector) else {
            continue;
        };
        for img in document.select(&sel) {
            let src = img
                .value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"))
                .unwrap_or_default();
            let alt = img.value().attr("alt").unwrap_or_default();
            if is_valid_thumbnail(src, alt) {
                return Some(src.to_string());
            }
        }
    }
    for selector in THUMBNAIL_META_SELECTORS {
        let Ok(sel) = Selector::parse(selector) else {
            continue;
        };
        if let Some(content) = document
            .select(&sel)
            .next()
            .and_then(|m| m.value().attr("content"))
        {
            if is_valid_thumbnail(content, "") {
                return Some(content.to_string());
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Publish-time parsing
// ---------------------------------------------------------------------------

fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("valid KST offset")
}

fn digit_runs(text: &str) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            current.push(ch);
        } else if !current.is_empty() {
            if let Ok(v) = current.parse() {
                runs.push(v);
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        if let Ok(v) = current.parse() {
            runs.push(v);
        }
    }
    runs
}

fn kst_to_utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Option<DateTime<Utc>> {
    kst()
        .with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Best-effort parse of the publish-time formats the portals expose:
/// a 14-digit compact stamp (`YYYYMMDDHHMMSS`), RFC 3339, dotted dates
/// with an optional `오전`/`오후` half-day marker, and relative
/// `N분 전` / `N시간 전` phrases. Wall-clock inputs are taken as KST.
pub fn parse_korean_datetime(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.len() == 14 && text.chars().all(|c| c.is_ascii_digit()) {
        let y: i32 = text[0..4].parse().ok()?;
        let runs: Vec<u32> = [&text[4..6], &text[6..8], &text[8..10], &text[10..12], &text[12..14]]
            .iter()
            .map(|s| s.parse().ok())
            .collect::<Option<_>>()?;
        return kst_to_utc(y, runs[0], runs[1], runs[2], runs[3], runs[4]);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Some(minutes) = relative_amount(text, "분") {
        return Some(now - chrono::Duration::minutes(minutes));
    }
    if let Some(hours) = relative_amount(text, "시간") {
        return Some(now - chrono::Duration::hours(hours));
    }

    let runs = digit_runs(text);
    if runs.len() >= 5 && runs[0] >= 1970 {
        let mut hour = runs[3];
        if text.contains("오후") && hour < 12 {
            hour += 12;
        }
        if text.contains("오전") && hour == 12 {
            hour = 0;
        }
        return kst_to_utc(runs[0] as i32, runs[1], runs[2], hour, runs[4], 0);
    }

    None
}

fn relative_amount(text: &str, unit: &str) -> Option<i64> {
    let marker = format!("{unit} 전");
    let compact = format!("{unit}전");
    if !(text.contains(&marker) || text.contains(&compact)) {
        return None;
    }
    digit_runs(text).first().map(|v| *v as i64)
}

// ---------------------------------------------------------------------------
// News scrapers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub slug: &'static str,
    pub name: &'static str,
    pub listing_url: &'static str,
}

#[async_trait]
pub trait NewsScraper: Send + Sync {
    fn source_id(&self) -> &'static str;
    fn categories(&self) -> &'static [Category];

    async fn crawl_category(
        &self,
        http: &HttpClient,
        category: &Category,
        count: usize,
    ) -> Result<Vec<NewsDraft>, ScrapeError>;

    async fn crawl_all(
        &self,
        http: &HttpClient,
        per_category: usize,
    ) -> Result<Vec<NewsDraft>, ScrapeError> {
        let mut drafts = Vec::new();
        for category in self.categories() {
            match self.crawl_category(http, category, per_category).await {
                Ok(mut batch) => drafts.append(&mut batch),
                Err(err) => {
                    warn!(source = self.source_id(), category = category.slug, %err, "category crawl failed");
                }
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        Ok(drafts)
    }
}

fn resolve_href(base: &str, href: &str) -> Option<String> {
    if href.starts_with("http") {
        return Some(href.to_string());
    }
    let base = reqwest::Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// Collect unique article links from a listing page, in page order.
pub fn discover_links(html: &str, base_url: &str, url_marker: &str, count: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut links: Vec<String> = Vec::new();
    for anchor in document.select(&sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        if !href.contains(url_marker) || href.contains("/comment/") {
            continue;
        }
        let Some(resolved) = resolve_href(base_url, href) else {
            continue;
        };
        if !links.contains(&resolved) {
            links.push(resolved);
        }
        if links.len() >= count {
            break;
        }
    }
    links
}

const NAVER_CATEGORIES: &[Category] = &[
    Category { slug: "politics", name: "정치", listing_url: "https://news.naver.com/section/100" },
    Category { slug: "economy", name: "경제", listing_url: "https://news.naver.com/section/101" },
    Category { slug: "society", name: "사회", listing_url: "https://news.naver.com/section/102" },
    Category { slug: "world", name: "세계", listing_url: "https://news.naver.com/section/104" },
    Category { slug: "technology", name: "IT/과학", listing_url: "https://news.naver.com/section/105" },
];

const NAVER_TITLE_RULES: &[ExtractRule] = &[
    ExtractRule { selector: "h2.media_end_head_headline", target: Target::Text },
    ExtractRule { selector: "#title_area span", target: Target::Text },
    ExtractRule { selector: "meta[property=\"og:title\"]", target: Target::Attr("content") },
];

const NAVER_BODY_RULES: &[ExtractRule] = &[
    ExtractRule { selector: "#dic_area", target: Target::Text },
    ExtractRule { selector: ".newsct_article", target: Target::Text },
    ExtractRule { selector: "#newsEndContents", target: Target::Text },
];

const NAVER_PUBLISHER_RULES: &[ExtractRule] = &[
    ExtractRule { selector: ".media_end_head_top_logo img", target: Target::Attr("alt") },
    ExtractRule { selector: "meta[property=\"og:article:author\"]", target: Target::Attr("content") },
    ExtractRule { selector: ".press_logo img", target: Target::Attr("alt") },
];

const NAVER_TIME_RULES: &[ExtractRule] = &[
    ExtractRule {
        selector: ".media_end_head_info_datestamp_time",
        target: Target::Attr("data-date-time"),
    },
    ExtractRule { selector: "span[data-date-time]", target: Target::Attr("data-date-time") },
    ExtractRule { selector: ".media_end_head_info_datestamp_time", target: Target::Text },
    ExtractRule { selector: ".article_info .date", target: Target::Text },
];

/// Parse one Naver article page into a draft. Returns None when neither a
/// headline nor a body could be extracted.
pub fn parse_naver_article(
    html: &str,
    url: &str,
    category_name: &str,
    crawled_at: DateTime<Utc>,
) -> Option<NewsDraft> {
    let document = Html::parse_document(html);

    let title = clean_text(&extract_first(&document, NAVER_TITLE_RULES)?);
    let content = clean_text(&extract_first(&document, NAVER_BODY_RULES)?);
    let source = extract_first(&document, NAVER_PUBLISHER_RULES)
        .map(|s| clean_text(&s))
        .unwrap_or_else(|| "알수없음".to_string());
    let published_at = extract_first(&document, NAVER_TIME_RULES)
        .and_then(|t| parse_korean_datetime(&t, crawled_at));
    let thumbnail = extract_thumbnail(&document);

    Some(NewsDraft {
        title,
        content,
        url: url.to_string(),
        source,
        category: category_name.to_string(),
        crawled_at,
        published_at,
        thumbnail,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NaverScraper;

#[async_trait]
impl NewsScraper for NaverScraper {
    fn source_id(&self) -> &'static str {
        "naver"
    }

    fn categories(&self) -> &'static [Category] {
        NAVER_CATEGORIES
    }

    async fn crawl_category(
        &self,
        http: &HttpClient,
        category: &Category,
        count: usize,
    ) -> Result<Vec<NewsDraft>, ScrapeError> {
        let listing = http.fetch_text(self.source_id(), category.listing_url).await?;
        let links = discover_links(&listing, category.listing_url, "/mnews/article/", count);
        debug!(category = category.slug, links = links.len(), "naver listing parsed");

        let mut drafts = Vec::new();
        for link in links {
            match http.fetch_text(self.source_id(), &link).await {
                Ok(article_html) => {
                    if let Some(draft) =
                        parse_naver_article(&article_html, &link, category.name, Utc::now())
                    {
                        drafts.push(draft);
                    }
                }
                Err(err) => warn!(url = %link, %err, "naver article fetch failed"),
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok(drafts)
    }
}

const DAUM_CATEGORIES: &[Category] = &[
    Category { slug: "politics", name: "정치", listing_url: "https://news.daum.net/politics" },
    Category { slug: "economy", name: "경제", listing_url: "https://news.daum.net/economic" },
    Category { slug: "society", name: "사회", listing_url: "https://news.daum.net/society" },
    Category { slug: "world", name: "세계", listing_url: "https://news.daum.net/foreign" },
    Category { slug: "technology", name: "IT/과학", listing_url: "https://news.daum.net/digital" },
];

const DAUM_TITLE_RULES: &[ExtractRule] = &[
    ExtractRule { selector: "h3.tit_view", target: Target::Text },
    ExtractRule { selector: "h1.tit_view", target: Target::Text },
    ExtractRule { selector: "meta[property=\"og:title\"]", target: Target::Attr("content") },
];

const DAUM_BODY_RULES: &[ExtractRule] = &[
    ExtractRule { selector: "#harmonyContainer", target: Target::Text },
    ExtractRule { selector: ".article_view", target: Target::Text },
];

const DAUM_PUBLISHER_RULES: &[ExtractRule] = &[
    ExtractRule { selector: "meta[property=\"og:article:author\"]", target: Target::Attr("content") },
    ExtractRule { selector: "#kakaoServiceLogo", target: Target::Text },
    ExtractRule { selector: ".info_view .txt_info", target: Target::Text },
];

const DAUM_TIME_RULES: &[ExtractRule] = &[
    ExtractRule { selector: "span.num_date", target: Target::Text },
    ExtractRule { selector: "meta[property=\"article:published_time\"]", target: Target::Attr("content") },
];

pub fn parse_daum_article(
    html: &str,
    url: &str,
    category_name: &str,
    crawled_at: DateTime<Utc>,
) -> Option<NewsDraft> {
    let document = Html::parse_document(html);

    let title = clean_text(&extract_first(&document, DAUM_TITLE_RULES)?);
    let content = clean_text(&extract_first(&document, DAUM_BODY_RULES)?);
    let source = extract_first(&document, DAUM_PUBLISHER_RULES)
        .map(|s| clean_text(&s))
        .unwrap_or_else(|| "알수없음".to_string());
    let published_at = extract_first(&document, DAUM_TIME_RULES)
        .and_then(|t| parse_korean_datetime(&t, crawled_at));
    let thumbnail = extract_thumbnail(&document);

    Some(NewsDraft {
        title,
        content,
        url: url.to_string(),
        source,
        category: category_name.to_string(),
        crawled_at,
        published_at,
        thumbnail,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DaumScraper;

#[async_trait]
impl NewsScraper for DaumScraper {
    fn source_id(&self) -> &'static str {
        "daum"
    }

    fn categories(&self) -> &'static [Category] {
        DAUM_CATEGORIES
    }

    async fn crawl_category(
        &self,
        http: &HttpClient,
        category: &Category,
        count: usize,
    ) -> Result<Vec<NewsDraft>, ScrapeError> {
        let listing = http.fetch_text(self.source_id(), category.listing_url).await?;
        let links = discover_links(&listing, category.listing_url, "v.daum.net/v/", count);
        debug!(category = category.slug, links = links.len(), "daum listing parsed");

        let mut drafts = Vec::new();
        for link in links {
            match http.fetch_text(self.source_id(), &link).await {
                Ok(article_html) => {
                    if let Some(draft) =
                        parse_daum_article(&article_html, &link, category.name, Utc::now())
                    {
                        drafts.push(draft);
                    }
                }
                Err(err) => warn!(url = %link, %err, "daum article fetch failed"),
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        Ok(drafts)
    }
}

// ---------------------------------------------------------------------------
// Assembly bill API
// ---------------------------------------------------------------------------

const BILL_LIST_SERVICE: &str = "nzmimeepazxkubdpn";
const BILL_DETAIL_BASE: &str = "https://likms.assembly.go.kr/bill/billDetail.do?billId=";

const COMMITTEE_CATEGORIES: &[(&str, &str)] = &[
    ("정무", "정치/행정"),
    ("외교", "정치/행정"),
    ("법무", "정치/행정"),
    ("행정안전", "정치/행정"),
    ("기획재정", "경제/산업"),
    ("산업", "경제/산업"),
    ("금융", "경제/산업"),
    ("노동", "노동/복지"),
    ("보건", "노동/복지"),
    ("복지", "노동/복지"),
    ("교육", "교육/문화"),
    ("문화", "교육/문화"),
    ("환경", "환경/에너지"),
    ("에너지", "환경/에너지"),
    ("과학기술", "디지털/AI/데이터"),
    ("정보통신", "디지털/AI/데이터"),
];

const TITLE_CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("경제", "경제/산업"),
    ("산업", "경제/산업"),
    ("금융", "경제/산업"),
    ("노동", "노동/복지"),
    ("복지", "노동/복지"),
    ("의료", "노동/복지"),
    ("교육", "교육/문화"),
    ("문화", "교육/문화"),
    ("환경", "환경/에너지"),
    ("에너지", "환경/에너지"),
    ("디지털", "디지털/AI/데이터"),
    ("인공지능", "디지털/AI/데이터"),
    ("데이터", "디지털/AI/데이터"),
];

const STAGE_MAPPING: &[(&str, &str)] = &[("가결", "통과"), ("부결", "폐기")];

const KNOWN_PARTIES: &[&str] = &[
    "국민의힘",
    "더불어민주당",
    "정의당",
    "기본소득당",
    "진보당",
    "무소속",
];

pub fn categorize_bill(title: &str, committee: &str) -> &'static str {
    for (keyword, category) in COMMITTEE_CATEGORIES {
        if committee.contains(keyword) {
            return category;
        }
    }
    for (keyword, category) in TITLE_CATEGORY_KEYWORDS {
        if title.contains(keyword) {
            return category;
        }
    }
    "정치/행정"
}

fn map_stage(proc_result: &str) -> String {
    if proc_result.trim().is_empty() {
        return "접수".to_string();
    }
    for (from, to) in STAGE_MAPPING {
        if proc_result == *from {
            return (*to).to_string();
        }
    }
    proc_result.to_string()
}

fn extract_party(proposer: &str) -> String {
    KNOWN_PARTIES
        .iter()
        .find(|party| proposer.contains(**party))
        .map(|party| (*party).to_string())
        .unwrap_or_else(|| "무소속".to_string())
}

fn json_str<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a str> {
    let mut cur = value;
    for segment in path {
        cur = cur.get(*segment)?;
    }
    cur.as_str()
}

/// Turn one API row into a draft. Rows without a bill number or name are
/// dropped.
pub fn parse_bill_row(row: &JsonValue) -> Option<BillDraft> {
    let bill_number = json_str(row, &["BILL_NO"])?.trim().to_string();
    let title = json_str(row, &["BILL_NAME"])?.trim().to_string();
    if bill_number.is_empty() || title.is_empty() {
        return None;
    }

    let proposer = json_str(row, &["PROPOSER"]).unwrap_or_default().to_string();
    let committee = json_str(row, &["COMMITTEE"]).unwrap_or_default().to_string();
    let proc_result = json_str(row, &["PROC_RESULT"]).unwrap_or_default();
    let proposal_date = json_str(row, &["PROPOSE_DT"])
        .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok());
    let bill_id = json_str(row, &["BILL_ID"]).unwrap_or_default();
    let summary = json_str(row, &["SUMMARY"]).unwrap_or_default().to_string();

    Some(BillDraft {
        party: extract_party(&proposer),
        category: categorize_bill(&title, &committee).to_string(),
        stage: map_stage(proc_result),
        url: format!("{BILL_DETAIL_BASE}{bill_id}"),
        bill_number,
        title,
        summary,
        proposer,
        committee,
        proposal_date,
    })
}

/// Extract the row array from the list-service envelope:
/// `{ "<service>": [ { "head": ... }, { "row": [ ... ] } ] }`.
pub fn parse_bill_listing(body: &str) -> Result<Vec<BillDraft>, ScrapeError> {
    let value: JsonValue = serde_json::from_str(body)
        .map_err(|e| ScrapeError::Message(format!("invalid bill API response: {e}")))?;

    let Some(sections) = value.get(BILL_LIST_SERVICE).and_then(|v| v.as_array()) else {
        return Ok(Vec::new());
    };
    let rows = sections
        .iter()
        .find_map(|section| section.get("row").and_then(|r| r.as_array()));

    Ok(rows
        .map(|rows| rows.iter().filter_map(parse_bill_row).collect())
        .unwrap_or_default())
}

#[derive(Debug, Clone)]
pub struct AssemblyBillClient {
    pub base_url: String,
    pub api_key: String,
    pub page_size: usize,
}

impl AssemblyBillClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            page_size: 100,
        }
    }

    /// Fetch bills proposed in the last `days` days, paging until the API
    /// returns a short page.
    pub async fn fetch_recent_bills(
        &self,
        http: &HttpClient,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<BillDraft>, ScrapeError> {
        let end = now.with_timezone(&kst()).date_naive();
        let start = end - chrono::Duration::days(days);

        let mut bills = Vec::new();
        for page in 1.. {
            let url = format!(
                "{}/{}?Key={}&Type=json&pIndex={}&pSize={}&PROPOSE_DT={}~{}",
                self.base_url,
                BILL_LIST_SERVICE,
                self.api_key,
                page,
                self.page_size,
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d"),
            );
            let body = http.fetch_text("assembly", &url).await?;
            let page_bills = parse_bill_listing(&body)?;
            let page_len = page_bills.len();
            bills.extend(page_bills);
            if page_len < self.page_size {
                break;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        Ok(bills)
    }
}
