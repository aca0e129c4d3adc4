//! Postgres persistence for Newslab: dedup-checked upserts, moderation
//! queries, bill storage, and crawl logs.
//!
//! Duplicate detection is two-staged. Stage 1 compares normalized URLs
//! against a precomputed `normalized_url` column backed by a unique
//! index, which is the authoritative guard under concurrent writers.
//! Stage 2 is a best-effort application-level check for syndicated
//! re-publications: same publisher, same calendar day, same normalized
//! headline.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use newslab_core::{
    normalize_title, normalize_url, BatchReport, BillDraft, NewsAnalysis, NewsDraft, NewsRecord,
    NewsStatus, UpsertOutcome,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const CRATE_NAME: &str = "newslab-storage";

#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed candidate, rejected before any storage attempt.
    #[error("invalid candidate: {0}")]
    Validation(&'static str),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Upsert seam between the batch coordinator and a concrete store. The
/// coordinator's tally semantics are tested against an in-memory
/// implementation; production uses [`NewsStore`].
#[async_trait]
pub trait NewsSink: Send + Sync {
    async fn upsert_news(&self, draft: &NewsDraft) -> Result<UpsertOutcome, StoreError>;
}

/// Apply the upserter to a finite batch, one candidate at a time. A
/// failing record never aborts the batch; it is logged with enough
/// context for manual replay and counted in the tally.
pub async fn save_news_batch<S: NewsSink + ?Sized>(sink: &S, drafts: &[NewsDraft]) -> BatchReport {
    let mut report = BatchReport::default();
    for draft in drafts {
        match sink.upsert_news(draft).await {
            Ok(UpsertOutcome::Inserted(id)) => {
                debug!(id, title = %draft.title, "saved article");
                report.record_saved(id);
            }
            Ok(UpsertOutcome::Duplicate(existing_id)) => {
                debug!(existing_id, title = %draft.title, "duplicate article skipped");
                report.record_duplicate();
            }
            Err(err) => {
                warn!(url = %draft.url, title = %draft.title, %err, "failed to save article");
                report.record_error();
            }
        }
    }
    report
}

/// Upsert seam for bills, deduplicated by the unique bill number.
#[async_trait]
pub trait BillSink: Send + Sync {
    async fn upsert_bill(&self, bill: &BillDraft) -> Result<UpsertOutcome, StoreError>;
}

pub async fn save_bills_batch<S: BillSink + ?Sized>(sink: &S, bills: &[BillDraft]) -> BatchReport {
    let mut report = BatchReport::default();
    for bill in bills {
        match sink.upsert_bill(bill).await {
            Ok(UpsertOutcome::Inserted(id)) => report.record_saved(id),
            Ok(UpsertOutcome::Duplicate(_)) => report.record_duplicate(),
            Err(err) => {
                warn!(bill_number = %bill.bill_number, title = %bill.title, %err, "failed to save bill");
                report.record_error();
            }
        }
    }
    report
}

fn validate(draft: &NewsDraft) -> Result<(), StoreError> {
    if draft.title.trim().is_empty() {
        return Err(StoreError::Validation("missing title"));
    }
    if draft.url.trim().is_empty() {
        return Err(StoreError::Validation("missing url"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlLogRow {
    pub id: i64,
    pub source: String,
    pub articles_saved: i32,
    pub duplicates: i32,
    pub errors: i32,
    pub duration_seconds: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewsStore {
    pool: PgPool,
}

impl NewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a store over a lazily-connecting pool. No round-trip happens
    /// until the first query.
    pub fn connect_lazy(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Moderation queue: PENDING records, newest first.
    pub async fn pending_news(&self, limit: i64) -> Result<Vec<NewsRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, url, source, category, status,
                   publish_date, original_publish_date, thumbnail, created_at, updated_at
              FROM news
             WHERE status = 'PENDING'
             ORDER BY created_at DESC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(news_record_from_row).collect()
    }

    pub async fn news_by_id(&self, id: i64) -> Result<Option<NewsRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, content, url, source, category, status,
                   publish_date, original_publish_date, thumbnail, created_at, updated_at
              FROM news
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(news_record_from_row).transpose()
    }

    /// Status transition driven by the external moderation workflow.
    /// Returns false when no such record exists.
    pub async fn update_status(&self, id: i64, status: NewsStatus) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE news
               SET status = $1, updated_at = now()
             WHERE id = $2
            "#,
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            info!(id, status = status.as_str(), "news status updated");
        }
        Ok(updated)
    }

    pub async fn status_counts(&self) -> Result<BTreeMap<String, i64>, StoreError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM news GROUP BY status")
            .fetch_all(&self.pool)
            .await?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            counts.insert(status, count);
        }
        Ok(counts)
    }

    pub async fn record_crawl_log(
        &self,
        source: &str,
        report: &BatchReport,
        duration_seconds: f64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO crawl_logs (source, articles_saved, duplicates, errors, duration_seconds)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(source)
        .bind(report.saved as i32)
        .bind(report.duplicates as i32)
        .bind(report.errors as i32)
        .bind(duration_seconds)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn recent_crawl_logs(&self, limit: i64) -> Result<Vec<CrawlLogRow>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, source, articles_saved, duplicates, errors, duration_seconds, created_at
              FROM crawl_logs
             ORDER BY created_at DESC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(CrawlLogRow {
                id: row.try_get("id")?,
                source: row.try_get("source")?,
                articles_saved: row.try_get("articles_saved")?,
                duplicates: row.try_get("duplicates")?,
                errors: row.try_get("errors")?,
                duration_seconds: row.try_get("duration_seconds")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(out)
    }

    /// Articles the analyzer has not yet summarized.
    pub async fn news_without_summary(&self, limit: i64) -> Result<Vec<NewsRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT n.id, n.title, n.content, n.url, n.source, n.category, n.status,
                   n.publish_date, n.original_publish_date, n.thumbnail, n.created_at, n.updated_at
              FROM news n
             WHERE NOT EXISTS (SELECT 1 FROM news_summary s WHERE s.news_id = n.id)
             ORDER BY n.created_at DESC
             LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(news_record_from_row).collect()
    }

    /// Write-back from the analysis workflow into the sibling summary
    /// table keyed by news id.
    pub async fn save_analysis(
        &self,
        news_id: i64,
        analysis: &NewsAnalysis,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO news_summary (news_id, summary, claim, keywords, reliability_score, bias)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(news_id)
        .bind(&analysis.summary)
        .bind(&analysis.claim)
        .bind(&analysis.keywords)
        .bind(analysis.reliability_score)
        .bind(&analysis.bias)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("id")?)
    }
}

#[async_trait]
impl NewsSink for NewsStore {
    /// Check-then-act within one transaction. The unique index on
    /// `normalized_url` backstops the pre-check: a concurrent writer that
    /// wins the race turns our insert into a no-op, reported as a
    /// duplicate rather than an error.
    async fn upsert_news(&self, draft: &NewsDraft) -> Result<UpsertOutcome, StoreError> {
        validate(draft)?;

        let normalized_url = normalize_url(&draft.url);
        let normalized_title = normalize_title(&draft.title);
        let dedup_day = draft.dedup_day();

        let mut tx = self.pool.begin().await?;

        // Stage 1: URL equality catches re-crawls and comment-page variants.
        let by_url = sqlx::query("SELECT id FROM news WHERE normalized_url = $1")
            .bind(&normalized_url)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(row) = by_url {
            tx.commit().await?;
            return Ok(UpsertOutcome::Duplicate(row.try_get("id")?));
        }

        // Stage 2: syndication under a different URL, same outlet and day.
        if !normalized_title.is_empty() {
            let by_title = sqlx::query(
                r#"
                SELECT id FROM news
                 WHERE source = $1 AND dedup_day = $2 AND normalized_title = $3
                "#,
            )
            .bind(&draft.source)
            .bind(dedup_day)
            .bind(&normalized_title)
            .fetch_optional(&mut *tx)
            .await?;
            if let Some(row) = by_title {
                tx.commit().await?;
                return Ok(UpsertOutcome::Duplicate(row.try_get("id")?));
            }
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO news (title, content, url, normalized_url, source, category,
                              normalized_title, publish_date, original_publish_date,
                              dedup_day, thumbnail, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'PENDING')
            ON CONFLICT (normalized_url) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.content)
        .bind(&draft.url)
        .bind(&normalized_url)
        .bind(&draft.source)
        .bind(&draft.category)
        .bind(&normalized_title)
        .bind(draft.crawled_at)
        .bind(draft.published_at)
        .bind(dedup_day)
        .bind(&draft.thumbnail)
        .fetch_optional(&mut *tx)
        .await?;

        match inserted {
            Some(row) => {
                let id: i64 = row.try_get("id")?;
                tx.commit().await?;
                Ok(UpsertOutcome::Inserted(id))
            }
            None => {
                // Lost the race; the committed winner is the duplicate.
                let winner = sqlx::query("SELECT id FROM news WHERE normalized_url = $1")
                    .bind(&normalized_url)
                    .fetch_optional(&mut *tx)
                    .await?;
                tx.commit().await?;
                match winner {
                    Some(row) => Ok(UpsertOutcome::Duplicate(row.try_get("id")?)),
                    None => Err(StoreError::Storage(sqlx::Error::RowNotFound)),
                }
            }
        }
    }
}

#[async_trait]
impl BillSink for NewsStore {
    async fn upsert_bill(&self, bill: &BillDraft) -> Result<UpsertOutcome, StoreError> {
        if bill.bill_number.trim().is_empty() || bill.title.trim().is_empty() {
            return Err(StoreError::Validation("missing bill number or title"));
        }

        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query("SELECT id FROM bills WHERE bill_number = $1")
            .bind(&bill.bill_number)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(row) = existing {
            tx.commit().await?;
            return Ok(UpsertOutcome::Duplicate(row.try_get("id")?));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO bills (bill_number, title, summary, proposer_name, party_name,
                               proposal_date, stage, category, committee, source_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'PENDING')
            ON CONFLICT (bill_number) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&bill.bill_number)
        .bind(&bill.title)
        .bind(&bill.summary)
        .bind(&bill.proposer)
        .bind(&bill.party)
        .bind(bill.proposal_date)
        .bind(&bill.stage)
        .bind(&bill.category)
        .bind(&bill.committee)
        .bind(&bill.url)
        .fetch_optional(&mut *tx)
        .await?;

        match inserted {
            Some(row) => {
                let id: i64 = row.try_get("id")?;
                tx.commit().await?;
                Ok(UpsertOutcome::Inserted(id))
            }
            None => {
                // Lost the insert race; report the committed winner's id.
                let winner = sqlx::query("SELECT id FROM bills WHERE bill_number = $1")
                    .bind(&bill.bill_number)
                    .fetch_optional(&mut *tx)
                    .await?;
                tx.commit().await?;
                match winner {
                    Some(row) => Ok(UpsertOutcome::Duplicate(row.try_get("id")?)),
                    None => Err(StoreError::Storage(sqlx::Error::RowNotFound)),
                }
            }
        }
    }
}

fn news_record_from_row(row: &sqlx::postgres::PgRow) -> Result<NewsRecord, StoreError> {
    let status: String = row.try_get("status")?;
    Ok(NewsRecord {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        url: row.try_get("url")?,
        source: row.try_get("source")?,
        category: row.try_get("category")?,
        status: NewsStatus::parse(&status).unwrap_or(NewsStatus::Pending),
        crawled_at: row.try_get("publish_date")?,
        published_at: row.try_get("original_publish_date")?,
        thumbnail: row.try_get("thumbnail")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tokio::sync::Mutex;

    /// In-memory sink mirroring the two-stage dedup of the Postgres
    /// store. Stage 1 normalizes the stored raw URL at query time, like
    /// the precomputed column does at insert time.
    struct MemoryStore {
        rows: Mutex<Vec<MemoryRow>>,
        fail_on_url_marker: Option<&'static str>,
    }

    struct MemoryRow {
        id: i64,
        raw_url: String,
        normalized_title: String,
        source: String,
        day: chrono::NaiveDate,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                fail_on_url_marker: None,
            }
        }

        fn failing_on(marker: &'static str) -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                fail_on_url_marker: Some(marker),
            }
        }
    }

    #[async_trait]
    impl NewsSink for MemoryStore {
        async fn upsert_news(&self, draft: &NewsDraft) -> Result<UpsertOutcome, StoreError> {
            validate(draft)?;
            if let Some(marker) = self.fail_on_url_marker {
                if draft.url.contains(marker) {
                    return Err(StoreError::Storage(sqlx::Error::PoolTimedOut));
                }
            }

            let normalized_url = normalize_url(&draft.url);
            let normalized_title = normalize_title(&draft.title);
            let day = draft.dedup_day();

            let mut rows = self.rows.lock().await;
            if let Some(existing) = rows.iter().find(|r| normalize_url(&r.raw_url) == normalized_url) {
                return Ok(UpsertOutcome::Duplicate(existing.id));
            }
            if !normalized_title.is_empty() {
                if let Some(existing) = rows.iter().find(|r| {
                    r.source == draft.source && r.day == day && r.normalized_title == normalized_title
                }) {
                    return Ok(UpsertOutcome::Duplicate(existing.id));
                }
            }

            let id = rows.len() as i64 + 1;
            rows.push(MemoryRow {
                id,
                raw_url: draft.url.clone(),
                normalized_title,
                source: draft.source.clone(),
                day,
            });
            Ok(UpsertOutcome::Inserted(id))
        }
    }

    fn draft(title: &str, url: &str, source: &str) -> NewsDraft {
        NewsDraft {
            title: title.to_string(),
            content: "본문".to_string(),
            url: url.to_string(),
            source: source.to_string(),
            category: "정치".to_string(),
            crawled_at: Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).single().unwrap(),
            published_at: Some(Utc.with_ymd_and_hms(2025, 8, 1, 8, 0, 0).single().unwrap()),
            thumbnail: None,
        }
    }

    #[tokio::test]
    async fn comment_page_variant_is_reported_duplicate() {
        let store = MemoryStore::new();
        let batch = vec![
            draft("정부 예산안 발표", "https://n.example/mnews/article/1", "연합뉴스"),
            draft(
                "정부 예산안 발표",
                "https://n.example/mnews/article/comment/1",
                "연합뉴스",
            ),
            draft("완전히 다른 기사", "https://n.example/mnews/article/2", "연합뉴스"),
        ];

        let report = save_news_batch(&store, &batch).await;
        assert_eq!(report.saved, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.errors, 0);
        assert_eq!(report.saved_ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn same_headline_same_outlet_same_day_is_duplicate() {
        let store = MemoryStore::new();
        let first = draft("단독 보도", "https://a.example/article/1", "한겨레");
        let second = draft("단독  보도!", "https://b.example/other/99", "한겨레");

        assert_eq!(
            store.upsert_news(&first).await.unwrap(),
            UpsertOutcome::Inserted(1)
        );
        assert_eq!(
            store.upsert_news(&second).await.unwrap(),
            UpsertOutcome::Duplicate(1)
        );
    }

    #[tokio::test]
    async fn same_headline_different_outlets_both_insert() {
        let store = MemoryStore::new();
        let a = draft("같은 제목", "https://a.example/1", "한겨레");
        let b = draft("같은 제목", "https://b.example/1", "조선일보");

        assert_eq!(store.upsert_news(&a).await.unwrap(), UpsertOutcome::Inserted(1));
        assert_eq!(store.upsert_news(&b).await.unwrap(), UpsertOutcome::Inserted(2));
    }

    #[tokio::test]
    async fn same_headline_different_day_inserts() {
        let store = MemoryStore::new();
        let a = draft("같은 제목", "https://a.example/1", "한겨레");
        let mut b = draft("같은 제목", "https://a.example/2", "한겨레");
        b.published_at = Some(Utc.with_ymd_and_hms(2025, 8, 2, 8, 0, 0).single().unwrap());

        assert_eq!(store.upsert_news(&a).await.unwrap(), UpsertOutcome::Inserted(1));
        assert_eq!(store.upsert_news(&b).await.unwrap(), UpsertOutcome::Inserted(2));
    }

    #[tokio::test]
    async fn missing_title_is_a_validation_error() {
        let store = MemoryStore::new();
        let mut bad = draft("", "https://a.example/1", "한겨레");
        bad.title = "  ".to_string();

        let report = save_news_batch(&store, std::slice::from_ref(&bad)).await;
        assert_eq!(report.saved, 0);
        assert_eq!(report.duplicates, 0);
        assert_eq!(report.errors, 1);

        let err = store.upsert_news(&bad).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn batch_tally_always_adds_up_to_input_len() {
        let store = MemoryStore::failing_on("flaky");
        let batch = vec![
            draft("기사 하나", "https://a.example/1", "연합뉴스"),
            draft("기사 하나", "https://a.example/1", "연합뉴스"),
            draft("기사 둘", "https://a.example/flaky/2", "연합뉴스"),
            draft("기사 셋", "https://a.example/3", "연합뉴스"),
            draft("", "https://a.example/4", "연합뉴스"),
        ];

        let report = save_news_batch(&store, &batch).await;
        assert_eq!(report.total(), batch.len());
        assert_eq!(report.saved, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.errors, 2);
    }

    /// In-memory bill sink deduplicated by bill number, like the
    /// Postgres store.
    struct MemoryBillStore {
        rows: Mutex<Vec<(i64, String)>>,
    }

    impl MemoryBillStore {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BillSink for MemoryBillStore {
        async fn upsert_bill(&self, bill: &BillDraft) -> Result<UpsertOutcome, StoreError> {
            if bill.bill_number.trim().is_empty() || bill.title.trim().is_empty() {
                return Err(StoreError::Validation("missing bill number or title"));
            }
            let mut rows = self.rows.lock().await;
            if let Some((id, _)) = rows.iter().find(|(_, number)| *number == bill.bill_number) {
                return Ok(UpsertOutcome::Duplicate(*id));
            }
            let id = rows.len() as i64 + 1;
            rows.push((id, bill.bill_number.clone()));
            Ok(UpsertOutcome::Inserted(id))
        }
    }

    fn bill(number: &str, title: &str) -> BillDraft {
        BillDraft {
            bill_number: number.to_string(),
            title: title.to_string(),
            summary: String::new(),
            proposer: "홍길동의원 등 10인".to_string(),
            party: "무소속".to_string(),
            proposal_date: None,
            stage: "접수".to_string(),
            category: "정치/행정".to_string(),
            committee: String::new(),
            url: "https://likms.assembly.go.kr/bill/billDetail.do?billId=X".to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_bill_reports_the_existing_row_id() {
        let store = MemoryBillStore::new();
        assert_eq!(
            store.upsert_bill(&bill("2200001", "법안 하나")).await.unwrap(),
            UpsertOutcome::Inserted(1)
        );
        assert_eq!(
            store.upsert_bill(&bill("2200002", "법안 둘")).await.unwrap(),
            UpsertOutcome::Inserted(2)
        );
        // Re-submission reports the real winner, never a placeholder id.
        match store.upsert_bill(&bill("2200002", "법안 둘 재발의")).await.unwrap() {
            UpsertOutcome::Duplicate(id) => assert_eq!(id, 2),
            other => panic!("expected duplicate, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn bill_batch_tally_counts_every_outcome() {
        let store = MemoryBillStore::new();
        let batch = vec![
            bill("2200001", "법안 하나"),
            bill("2200001", "법안 하나"),
            bill("", "번호 없는 법안"),
            bill("2200003", "법안 셋"),
        ];
        let report = save_bills_batch(&store, &batch).await;
        assert_eq!(report.total(), batch.len());
        assert_eq!(report.saved, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.errors, 1);
    }

    #[tokio::test]
    async fn dedup_day_falls_back_to_crawl_time() {
        let store = MemoryStore::new();
        let mut a = draft("제목", "https://a.example/1", "한겨레");
        a.published_at = None;
        let mut b = draft("제목", "https://a.example/2", "한겨레");
        b.published_at = None;

        assert_eq!(store.upsert_news(&a).await.unwrap(), UpsertOutcome::Inserted(1));
        assert_eq!(
            store.upsert_news(&b).await.unwrap(),
            UpsertOutcome::Duplicate(1)
        );
    }
}
