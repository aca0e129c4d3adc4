//! Core domain model and comparison-key normalizers for Newslab.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

pub const CRATE_NAME: &str = "newslab-core";

/// Comment-page URL variants collapse onto their parent article path.
const COMMENT_SEGMENT: &str = "/mnews/article/comment/";
const ARTICLE_SEGMENT: &str = "/mnews/article/";

/// Query parameters that identify an article and survive normalization.
/// Everything else (tracking parameters and the like) is dropped.
const KEPT_QUERY_PARAMS: [&str; 2] = ["oid", "aid"];

/// Canonicalize a raw article URL into a comparison key.
///
/// Collapses comment-page variants, keeps only the article-identifying
/// query parameters in a fixed order, strips fragments, case-folds the
/// host, and drops default ports and trailing slashes. Never fails: if
/// the input does not parse as a URL it is returned as-is (after the
/// comment-segment rewrite, which is plain text replacement).
pub fn normalize_url(raw: &str) -> String {
    let rewritten = raw.replace(COMMENT_SEGMENT, ARTICLE_SEGMENT);
    let Ok(mut parsed) = Url::parse(&rewritten) else {
        return rewritten;
    };

    let kept: Vec<(String, String)> = KEPT_QUERY_PARAMS
        .iter()
        .filter_map(|name| {
            parsed
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
        })
        .collect();

    parsed.set_fragment(None);
    if kept.is_empty() {
        parsed.set_query(None);
    } else {
        // Re-encode the decoded pairs; a plain format! would corrupt
        // values containing `&` or `=`.
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&kept)
            .finish();
        parsed.set_query(Some(&query));
    }

    let trimmed = parsed.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        parsed.set_path("/");
    } else {
        parsed.set_path(&trimmed);
    }

    // Url lowercases the host and omits default ports on serialization.
    parsed.to_string()
}

/// Canonicalize a headline into a comparison key: lowercase, whitespace
/// collapsed, everything outside Hangul syllables / ASCII alphanumerics /
/// whitespace removed. Pure and idempotent; empty input stays empty.
pub fn normalize_title(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || ('가'..='힣').contains(c) || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Moderation lifecycle of a stored article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewsStatus {
    Pending,
    Approved,
    Rejected,
}

impl NewsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsStatus::Pending => "PENDING",
            NewsStatus::Approved => "APPROVED",
            NewsStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(NewsStatus::Pending),
            "APPROVED" => Some(NewsStatus::Approved),
            "REJECTED" => Some(NewsStatus::Rejected),
            _ => None,
        }
    }
}

/// An unpersisted scraped article awaiting dedup-checked insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDraft {
    pub title: String,
    pub content: String,
    pub url: String,
    /// Publisher name as displayed by the portal.
    pub source: String,
    pub category: String,
    pub crawled_at: DateTime<Utc>,
    /// Best-effort true publish time; absent when the article page did not
    /// expose one.
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail: Option<String>,
}

impl NewsDraft {
    /// Calendar day used by the title-based duplicate check. The original
    /// publish time wins; crawl time is the fallback. Insert and query
    /// paths must both go through this so the comparison stays consistent.
    pub fn dedup_day(&self) -> NaiveDate {
        self.published_at.unwrap_or(self.crawled_at).date_naive()
    }
}

/// A persisted, uniquely-identified article row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRecord {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub url: String,
    pub source: String,
    pub category: String,
    pub status: NewsStatus,
    pub crawled_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub thumbnail: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Terminal result of one upsert: a fresh row or the id of the row that
/// already covered this candidate. Duplicate is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpsertOutcome {
    Inserted(i64),
    Duplicate(i64),
}

/// Per-batch tally. Invariant: `saved + duplicates + errors` equals the
/// number of candidates fed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub saved: usize,
    pub duplicates: usize,
    pub errors: usize,
    #[serde(default)]
    pub saved_ids: Vec<i64>,
}

impl BatchReport {
    pub fn record_saved(&mut self, id: i64) {
        self.saved += 1;
        self.saved_ids.push(id);
    }

    pub fn record_duplicate(&mut self) {
        self.duplicates += 1;
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    pub fn total(&self) -> usize {
        self.saved + self.duplicates + self.errors
    }
}

/// An unpersisted bill fetched from the Assembly open API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillDraft {
    pub bill_number: String,
    pub title: String,
    pub summary: String,
    pub proposer: String,
    pub party: String,
    pub proposal_date: Option<NaiveDate>,
    pub stage: String,
    pub category: String,
    pub committee: String,
    pub url: String,
}

/// Analysis fields written back to the summary table by the analyzer job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsAnalysis {
    pub summary: String,
    pub claim: String,
    pub keywords: String,
    pub reliability_score: i32,
    pub bias: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn comment_page_variant_collapses_to_article_url() {
        let a = normalize_url("https://n.news.naver.com/mnews/article/001/123");
        let b = normalize_url("https://n.news.naver.com/mnews/article/comment/001/123");
        assert_eq!(a, b);
    }

    #[test]
    fn tracking_params_dropped_and_kept_params_reordered() {
        let a = normalize_url("https://news.example.com/read?oid=001&aid=0001&utm_source=x");
        let b = normalize_url("https://news.example.com/read?aid=0001&oid=001");
        assert_eq!(a, b);
        assert_eq!(a, "https://news.example.com/read?oid=001&aid=0001");
    }

    #[test]
    fn percent_encoded_param_values_survive_reencoding() {
        let a = normalize_url("https://news.example.com/read?aid=a%26b%3Dc&oid=001");
        assert_eq!(a, "https://news.example.com/read?oid=001&aid=a%26b%3Dc");
        // The key is stable under repeated normalization.
        assert_eq!(normalize_url(&a), a);
    }

    #[test]
    fn fragment_host_case_and_trailing_slash_normalized() {
        let a = normalize_url("https://News.Example.Com:443/read/#comments");
        let b = normalize_url("https://news.example.com/read");
        assert_eq!(a, b);
    }

    #[test]
    fn unparseable_url_returned_unchanged() {
        assert_eq!(normalize_url("not a url at all"), "not a url at all");
    }

    #[test]
    fn title_normalization_is_idempotent() {
        let titles = [
            "정부, 예산안 발표… \"역대 최대\"",
            "  Breaking:   News!!  ",
            "",
            "한글과 English 123 혼합",
        ];
        for t in titles {
            let once = normalize_title(t);
            assert_eq!(once, normalize_title(&once));
        }
    }

    #[test]
    fn title_normalization_strips_punctuation_and_case() {
        assert_eq!(
            normalize_title("정부, 예산안   발표! [단독]"),
            "정부 예산안 발표 단독"
        );
        assert_eq!(normalize_title("Hello,  WORLD"), "hello world");
        assert_eq!(normalize_title(""), "");
    }

    #[test]
    fn dedup_day_prefers_original_publish_time() {
        let crawled = Utc.with_ymd_and_hms(2025, 8, 2, 1, 0, 0).single().unwrap();
        let published = Utc.with_ymd_and_hms(2025, 8, 1, 22, 30, 0).single().unwrap();
        let mut draft = NewsDraft {
            title: "t".into(),
            content: "c".into(),
            url: "https://example.com/a".into(),
            source: "s".into(),
            category: "정치".into(),
            crawled_at: crawled,
            published_at: Some(published),
            thumbnail: None,
        };
        assert_eq!(draft.dedup_day(), published.date_naive());
        draft.published_at = None;
        assert_eq!(draft.dedup_day(), crawled.date_naive());
    }

    #[test]
    fn batch_report_tally_adds_up() {
        let mut report = BatchReport::default();
        report.record_saved(1);
        report.record_saved(2);
        report.record_duplicate();
        report.record_error();
        assert_eq!(report.total(), 4);
        assert_eq!(report.saved_ids, vec![1, 2]);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [NewsStatus::Pending, NewsStatus::Approved, NewsStatus::Rejected] {
            assert_eq!(NewsStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(NewsStatus::parse("UNKNOWN"), None);
    }
}
