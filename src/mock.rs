// mock.rs
//! In-memory `PollStore` for tests and local development.
//!
//! Mutations take the write lock for the whole increment, so the store keeps
//! the same no-lost-update guarantee as the PostgreSQL backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{sanitize_options, sanitize_text, Poll, PollOption, PollSummary};
use crate::store::{PollStore, StoreError};

struct PollRecord {
    title: String,
    options: Vec<PollOption>,
    created_at: DateTime<Utc>,
}

pub struct MemoryPollStore {
    polls: RwLock<HashMap<i64, PollRecord>>,
    next_id: AtomicI64,
}

impl MemoryPollStore {
    pub fn new() -> Self {
        Self {
            polls: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryPollStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PollStore for MemoryPollStore {
    async fn get_poll(&self, poll_id: i64) -> Result<Poll, StoreError> {
        let polls = self.polls.read().unwrap();
        let record = polls.get(&poll_id).ok_or(StoreError::NotFound)?;
        Ok(Poll {
            id: poll_id,
            title: record.title.clone(),
            options: record.options.clone(),
        })
    }

    async fn create_poll(
        &self,
        title: &str,
        options: Vec<PollOption>,
    ) -> Result<Poll, StoreError> {
        let title = sanitize_text(title);
        let options = sanitize_options(options);
        let poll_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        self.polls.write().unwrap().insert(
            poll_id,
            PollRecord {
                title: title.clone(),
                options: options.clone(),
                created_at: Utc::now(),
            },
        );

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
        let mut polls = self.polls.write().unwrap();
        let record = polls.get_mut(&poll_id).ok_or(StoreError::NotFound)?;
        record.options = options.clone();
        Ok(Poll {
            id: poll_id,
            title: record.title.clone(),
            options,
        })
    }

    async fn increment_vote(
        &self,
        poll_id: i64,
        option_index: usize,
    ) -> Result<Vec<PollOption>, StoreError> {
        let mut polls = self.polls.write().unwrap();
        let record = polls.get_mut(&poll_id).ok_or(StoreError::NotFound)?;
        let option = record
            .options
            .get_mut(option_index)
            .ok_or(StoreError::InvalidOption)?;
        option.votes += 1;
        Ok(record.options.clone())
    }

    async fn list_polls(&self) -> Result<Vec<PollSummary>, StoreError> {
        let polls = self.polls.read().unwrap();
        let mut summaries: Vec<PollSummary> = polls
            .iter()
            .map(|(id, record)| PollSummary {
                id: *id,
                title: record.title.clone(),
                created_at: record.created_at,
                total_votes: record.options.iter().map(|opt| opt.votes).sum(),
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(summaries)
    }
}
