use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::BoxFuture;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{query, PgPool, Postgres, Row};

use crate::middleware::error_handling::{AppError, Result};
use crate::models::sop::{SopRecord, SopSearchFilters};
use crate::models::validation::ValidationResult;

const DEFAULT_LIST_LIMIT: usize = 100;

/// In-place edit applied by `SopRepository::modify`
pub type RecordChange<'a> = Box<dyn FnOnce(&mut SopRecord) -> Result<()> + Send + 'a>;

/// Storage for SOP job records keyed by job id.
///
/// `update` replaces the whole record and is only used by the generation task
/// while it owns a pending or processing job. Every other write goes through
/// `modify`, which reads, edits and writes one record atomically.
pub trait SopRepository: Send + Sync {
    fn insert<'a>(&'a self, record: &'a SopRecord) -> BoxFuture<'a, Result<()>>;

    fn get<'a>(&'a self, job_id: &'a str) -> BoxFuture<'a, Result<Option<SopRecord>>>;

    fn update<'a>(&'a self, record: &'a SopRecord) -> BoxFuture<'a, Result<()>>;

    /// Apply `change` to the stored record and return the new version.
    /// When `change` fails the stored record is left untouched.
    fn modify<'a>(&'a self, job_id: &'a str, change: RecordChange<'a>) -> BoxFuture<'a, Result<SopRecord>>;

    /// Remove the record, returning what was stored
    fn delete<'a>(&'a self, job_id: &'a str) -> BoxFuture<'a, Result<SopRecord>>;

    /// Newest first
    fn list<'a>(&'a self, filters: &'a SopSearchFilters) -> BoxFuture<'a, Result<Vec<SopRecord>>>;

    /// Replace only the validation snapshot, leaving status and metadata as stored
    fn update_validation<'a>(
        &'a self,
        job_id: &'a str,
        result: &'a ValidationResult,
    ) -> BoxFuture<'a, Result<SopRecord>> {
        self.modify(
            job_id,
            Box::new(move |record: &mut SopRecord| {
                record.apply_validation(result);
                Ok(())
            }),
        )
    }
}

fn not_found(job_id: &str) -> AppError {
    AppError::NotFound(format!("SOP job {} not found", job_id))
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
pub struct InMemorySopRepository {
    records: DashMap<String, SopRecord>,
}

impl InMemorySopRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SopRepository for InMemorySopRepository {
    fn insert<'a>(&'a self, record: &'a SopRecord) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self.records.entry(record.job_id.clone()) {
                Entry::Occupied(_) => Err(AppError::Conflict(format!("SOP job {} already exists", record.job_id))),
                Entry::Vacant(slot) => {
                    slot.insert(record.clone());
                    Ok(())
                }
            }
        })
    }

    fn get<'a>(&'a self, job_id: &'a str) -> BoxFuture<'a, Result<Option<SopRecord>>> {
        Box::pin(async move { Ok(self.records.get(job_id).map(|entry| entry.value().clone())) })
    }

    fn update<'a>(&'a self, record: &'a SopRecord) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            match self.records.get_mut(&record.job_id) {
                Some(mut entry) => {
                    *entry = record.clone();
                    Ok(())
                }
                None => Err(not_found(&record.job_id)),
            }
        })
    }

    fn modify<'a>(&'a self, job_id: &'a str, change: RecordChange<'a>) -> BoxFuture<'a, Result<SopRecord>> {
        Box::pin(async move {
            // The shard lock is held for the whole read-edit-write
            let mut entry = self.records.get_mut(job_id).ok_or_else(|| not_found(job_id))?;
            let mut next = entry.value().clone();
            change(&mut next)?;
            *entry = next.clone();
            Ok(next)
        })
    }

    fn delete<'a>(&'a self, job_id: &'a str) -> BoxFuture<'a, Result<SopRecord>> {
        Box::pin(async move {
            self.records
                .remove(job_id)
                .map(|(_, record)| record)
                .ok_or_else(|| not_found(job_id))
        })
    }

    fn list<'a>(&'a self, filters: &'a SopSearchFilters) -> BoxFuture<'a, Result<Vec<SopRecord>>> {
        Box::pin(async move {
            let mut records: Vec<SopRecord> = self
                .records
                .iter()
                .filter(|entry| filters.matches(entry.value()))
                .map(|entry| entry.value().clone())
                .collect();

            records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.job_id.cmp(&b.job_id)));
            records.truncate(filters.limit.unwrap_or(DEFAULT_LIST_LIMIT));
            Ok(records)
        })
    }
}

// ============================================================================
// Postgres store
// ============================================================================

pub struct PgSopRepository {
    pool: PgPool,
}

impl PgSopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Migration failed: {}", e)))
    }
}

fn update_query(record: &SopRecord) -> Query<'_, Postgres, PgArguments> {
    query(
        r#"
        UPDATE sop_jobs
        SET status = $2, compliance_score = $3, updated_at = $4, payload = $5
        WHERE job_id = $1
        "#,
    )
    .bind(&record.job_id)
    .bind(record.status.as_str())
    .bind(record.compliance_score)
    .bind(record.updated_at)
    .bind(Json(record))
}

impl SopRepository for PgSopRepository {
    fn insert<'a>(&'a self, record: &'a SopRecord) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let result = query(
                r#"
                INSERT INTO sop_jobs (job_id, status, created_by, compliance_score, created_at, updated_at, payload)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (job_id) DO NOTHING
                "#,
            )
            .bind(&record.job_id)
            .bind(record.status.as_str())
            .bind(&record.created_by)
            .bind(record.compliance_score)
            .bind(record.created_at)
            .bind(record.updated_at)
            .bind(Json(record))
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(AppError::Conflict(format!("SOP job {} already exists", record.job_id)));
            }
            Ok(())
        })
    }

    fn get<'a>(&'a self, job_id: &'a str) -> BoxFuture<'a, Result<Option<SopRecord>>> {
        Box::pin(async move {
            let row = query("SELECT payload FROM sop_jobs WHERE job_id = $1")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?;

            match row {
                Some(row) => {
                    let Json(record): Json<SopRecord> = row.try_get("payload")?;
                    Ok(Some(record))
                }
                None => Ok(None),
            }
        })
    }

    fn update<'a>(&'a self, record: &'a SopRecord) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let result = update_query(record).execute(&self.pool).await?;

            if result.rows_affected() == 0 {
                return Err(not_found(&record.job_id));
            }
            Ok(())
        })
    }

    fn modify<'a>(&'a self, job_id: &'a str, change: RecordChange<'a>) -> BoxFuture<'a, Result<SopRecord>> {
        Box::pin(async move {
            let mut tx = self.pool.begin().await?;

            let row = query("SELECT payload FROM sop_jobs WHERE job_id = $1 FOR UPDATE")
                .bind(job_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| not_found(job_id))?;
            let Json(mut record): Json<SopRecord> = row.try_get("payload")?;

            change(&mut record)?;
            update_query(&record).execute(&mut *tx).await?;
            tx.commit().await?;

            Ok(record)
        })
    }

    fn delete<'a>(&'a self, job_id: &'a str) -> BoxFuture<'a, Result<SopRecord>> {
        Box::pin(async move {
            let row = query("DELETE FROM sop_jobs WHERE job_id = $1 RETURNING payload")
                .bind(job_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| not_found(job_id))?;

            let Json(record): Json<SopRecord> = row.try_get("payload")?;
            Ok(record)
        })
    }

    fn list<'a>(&'a self, filters: &'a SopSearchFilters) -> BoxFuture<'a, Result<Vec<SopRecord>>> {
        Box::pin(async move {
            let limit = filters.limit.unwrap_or(DEFAULT_LIST_LIMIT) as i64;
            let rows = query(
                r#"
                SELECT payload FROM sop_jobs
                WHERE ($1::TEXT IS NULL OR status = $1)
                  AND ($2::TEXT IS NULL OR created_by = $2)
                  AND ($3::DOUBLE PRECISION IS NULL OR compliance_score >= $3)
                ORDER BY created_at DESC, job_id
                LIMIT $4
                "#,
            )
            .bind(filters.status.map(|s| s.as_str()))
            .bind(filters.created_by.as_deref())
            .bind(filters.min_compliance_score)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter()
                .map(|row| -> Result<SopRecord> {
                    let Json(record): Json<SopRecord> = row.try_get("payload")?;
                    Ok(record)
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sop::{CreateSopRequest, PharmaceuticalDepartment, SopPriority, SopStatus};

    fn record(job_id: &str, created_by: &str) -> SopRecord {
        let request = CreateSopRequest {
            title: "Dispensing of raw materials".to_string(),
            description: "Weighing and dispensing in the dispensary booth".to_string(),
            department: PharmaceuticalDepartment::Warehouse,
            priority: SopPriority::Medium,
            regulatory_frameworks: vec!["who_gmp".to_string()],
            template_content: None,
            guideline_content: None,
        };
        SopRecord::new(job_id.to_string(), request, created_by.to_string())
    }

    #[tokio::test]
    async fn test_insert_get_update() {
        let repo = InMemorySopRepository::new();
        let mut rec = record("job-1", "alice");
        repo.insert(&rec).await.unwrap();

        assert!(matches!(repo.insert(&rec).await, Err(AppError::Conflict(_))));

        rec.status = SopStatus::Processing;
        repo.update(&rec).await.unwrap();
        let stored = repo.get("job-1").await.unwrap().unwrap();
        assert_eq!(stored.status, SopStatus::Processing);

        assert!(repo.get("missing").await.unwrap().is_none());
        assert!(matches!(repo.update(&record("missing", "bob")).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_failed_modify_leaves_record_untouched() {
        let repo = InMemorySopRepository::new();
        repo.insert(&record("job-1", "alice")).await.unwrap();

        let err = repo
            .modify(
                "job-1",
                Box::new(|rec: &mut SopRecord| {
                    rec.title = "Half-applied edit".to_string();
                    Err(AppError::Conflict("rejected".to_string()))
                }),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(repo.get("job-1").await.unwrap().unwrap().title, "Dispensing of raw materials");

        let missing = repo.modify("missing", Box::new(|_: &mut SopRecord| Ok(()))).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_validation_keeps_status() {
        let repo = InMemorySopRepository::new();
        let mut rec = record("job-1", "alice");
        rec.status = SopStatus::UnderReview;
        repo.insert(&rec).await.unwrap();

        let result = ValidationResult::system_failure("scorer offline");
        let stored = repo.update_validation("job-1", &result).await.unwrap();

        assert_eq!(stored.status, SopStatus::UnderReview);
        assert_eq!(stored.compliance_score, Some(0.0));
        assert_eq!(stored.latest_validation, Some(result));
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let repo = InMemorySopRepository::new();
        repo.insert(&record("job-1", "alice")).await.unwrap();

        let removed = repo.delete("job-1").await.unwrap();
        assert_eq!(removed.created_by, "alice");
        assert!(repo.get("job-1").await.unwrap().is_none());
        assert!(matches!(repo.delete("job-1").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_applies_filters_and_limit() {
        let repo = InMemorySopRepository::new();
        for (id, user) in [("job-1", "alice"), ("job-2", "bob"), ("job-3", "alice")] {
            repo.insert(&record(id, user)).await.unwrap();
        }

        let alice = SopSearchFilters {
            created_by: Some("alice".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&alice).await.unwrap().len(), 2);

        let limited = SopSearchFilters {
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(repo.list(&limited).await.unwrap().len(), 1);

        let failed = SopSearchFilters {
            status: Some(SopStatus::Failed),
            ..Default::default()
        };
        assert!(repo.list(&failed).await.unwrap().is_empty());
    }
}
