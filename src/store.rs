// store.rs
//! Durable poll storage: the `PollStore` trait and its PostgreSQL backend.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use thiserror::Error;

use crate::models::{sanitize_options, sanitize_text, Poll, PollOption, PollSummary};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("poll not found")]
    NotFound,
    #[error("option index out of range")]
    InvalidOption,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Interface to the underlying poll storage.
///
/// `increment_vote` must be atomic under concurrent calls: two overlapping
/// votes against the same poll are both reflected in the stored counters.
#[async_trait]
pub trait PollStore: Send + Sync {
    /// Reads a poll's title and current options.
    async fn get_poll(&self, poll_id: i64) -> Result<Poll, StoreError>;

    /// Creates a new poll and returns it with its assigned id. Labels are
    /// sanitized and empty rows dropped; missing vote counts start at zero.
    async fn create_poll(&self, title: &str, options: Vec<PollOption>)
        -> Result<Poll, StoreError>;

    /// Replaces a poll's entire options list (author label edits). Vote
    /// counts are taken from the submitted rows.
    async fn save_options(&self, poll_id: i64, options: Vec<PollOption>)
        -> Result<Poll, StoreError>;

    /// Adds 1 to exactly one option's counter and returns the full updated
    /// options list.
    async fn increment_vote(&self, poll_id: i64, option_index: usize)
        -> Result<Vec<PollOption>, StoreError>;

    /// All polls with their vote totals, newest first.
    async fn list_polls(&self) -> Result<Vec<PollSummary>, StoreError>;
}

/// PostgreSQL-backed store. Options live as one row per `(poll_id, idx)`,
/// so a vote is a single-row `UPDATE` rather than a whole-array rewrite.
pub struct PgPollStore {
    pool: PgPool,
}

impl PgPollStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_options(&self, poll_id: i64) -> Result<Vec<PollOption>, StoreError> {
        let options = sqlx::query_as::<_, PollOption>(
            "SELECT label, votes FROM poll_options WHERE poll_id = $1 ORDER BY idx",
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }
}

#[async_trait]
impl PollStore for PgPollStore {
    async fn get_poll(&self, poll_id: i64) -> Result<Poll, StoreError> {
        let row = sqlx::query("SELECT title FROM polls WHERE id = $1")
            .bind(poll_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        let options = self.fetch_options(poll_id).await?;
        Ok(Poll {
            id: poll_id,
            title: row.get("title"),
            options,
        })
    }

    async fn create_poll(
        &self,
        title: &str,
        options: Vec<PollOption>,
    ) -> Result<Poll, StoreError> {
        let title = sanitize_text(title);
        let options = sanitize_options(options);

        let mut tx = self.pool.begin().await?;
        let poll_id: i64 = sqlx::query("INSERT INTO polls (title) VALUES ($1) RETURNING id")
            .bind(&title)
            .fetch_one(&mut *tx)
            .await?
            .get("id");
        for (idx, opt) in options.iter().enumerate() {
            sqlx::query(
                "INSERT INTO poll_options (poll_id, idx, label, votes) VALUES ($1, $2, $3, $4)",
            )
            .bind(poll_id)
            .bind(idx as i32)
            .bind(&opt.label)
            .bind(opt.votes)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(Poll {
            id: poll_id,
            title,
            options,
        })
    }

    async fn save_options(
        &self,
        poll_id: i64,
        options: Vec<PollOption>,
    ) -> Result<Poll, StoreError> {
        let options = sanitize_options(options);

        let mut tx = self.pool.begin().await?;
        let row = sqlx::query("SELECT title FROM polls WHERE id = $1 FOR UPDATE")
            .bind(poll_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound)?;
        sqlx::query("DELETE FROM poll_options WHERE poll_id = $1")
            .bind(poll_id)
            .execute(&mut *tx)
            .await?;
        for (idx, opt) in options.iter().enumerate() {
            sqlx::query(
                "INSERT INTO poll_options (poll_id, idx, label, votes) VALUES ($1, $2, $3, $4)",
            )
            .bind(poll_id)
            .bind(idx as i32)
            .bind(&opt.label)
            .bind(opt.votes)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(Poll {
            id: poll_id,
            title: row.get("title"),
            options,
        })
    }

    async fn increment_vote(
        &self,
        poll_id: i64,
        option_index: usize,
    ) -> Result<Vec<PollOption>, StoreError> {
        let idx = i32::try_from(option_index).map_err(|_| StoreError::InvalidOption)?;

        // Single-row atomic update: concurrent votes serialize on the row,
        // so none are lost to a read-modify-write overwrite.
        let result =
            sqlx::query("UPDATE poll_options SET votes = votes + 1 WHERE poll_id = $1 AND idx = $2")
                .bind(poll_id)
                .bind(idx)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            let poll_exists = sqlx::query("SELECT 1 FROM polls WHERE id = $1")
                .bind(poll_id)
                .fetch_optional(&self.pool)
                .await?
                .is_some();
            return Err(if poll_exists {
                StoreError::InvalidOption
            } else {
                StoreError::NotFound
            });
        }

        self.fetch_options(poll_id).await
    }

    async fn list_polls(&self) -> Result<Vec<PollSummary>, StoreError> {
        let polls = sqlx::query_as::<_, PollSummary>(
            "SELECT p.id, p.title, p.created_at, \
                    COALESCE(SUM(o.votes), 0)::BIGINT AS total_votes \
             FROM polls p \
             LEFT JOIN poll_options o ON o.poll_id = p.id \
             GROUP BY p.id, p.title, p.created_at \
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(polls)
    }
}
