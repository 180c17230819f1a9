//! Client for the external append-only change-record store.
//!
//! The store is an external collaborator: batches of change records go out
//! as one POST, the feed comes back newest-first from a GET. Fetched feeds
//! are cached in the shared storage port under their own five-minute TTL,
//! tracked independently of the snapshot cache; a remote failure falls back
//! to the last cached feed when one exists.

mod error;

pub use error::ChangeLogError;

use std::time::Duration;

use bosswatch_types::{ChangeField, ChangeRecord, GameMode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::{StoragePort, keys};

/// Fetched feeds are trusted for five minutes, same constant as the
/// snapshot cache but tracked separately.
pub const CHANGE_LOG_TTL_MS: i64 = 5 * 60 * 1000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ChangeLogClient<S> {
    client: reqwest::Client,
    endpoint: String,
    store: S,
}

impl<S: StoragePort> ChangeLogClient<S> {
    pub fn new(endpoint: impl Into<String>, store: S) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            store,
        }
    }

    /// Send one batch of records. All-or-nothing from this side: the store
    /// either acknowledges the whole batch or the call fails. An empty batch
    /// is a no-op.
    pub async fn submit(&self, records: &[ChangeRecord]) -> Result<(), ChangeLogError> {
        if records.is_empty() {
            return Ok(());
        }

        let rows: Vec<WireChangeRow> = records.iter().map(WireChangeRow::from_record).collect();
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(REQUEST_TIMEOUT)
            .json(&rows)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChangeLogError::Status {
                status: status.as_u16(),
            });
        }

        let ack: SubmitAck = response.json().await?;
        if !ack.success {
            return Err(ChangeLogError::Rejected);
        }
        debug!(count = records.len(), "submitted change records");
        Ok(())
    }

    /// Retrieve the feed, newest first, optionally bounded to records after
    /// `since` (epoch millis). Full-feed results are cached; a fresh cache
    /// short-circuits the network, and a remote failure falls back to the
    /// cached feed regardless of its age.
    pub async fn fetch_since(
        &self,
        since: Option<i64>,
    ) -> Result<Vec<ChangeRecord>, ChangeLogError> {
        if since.is_none()
            && let Some((records, fetched_at)) = self.cached_feed()
            && Utc::now().timestamp_millis() - fetched_at < CHANGE_LOG_TTL_MS
        {
            debug!(count = records.len(), "serving cached change feed");
            return Ok(records);
        }

        match self.fetch_remote(since).await {
            Ok(records) => {
                if since.is_none() {
                    self.store_feed(&records);
                }
                Ok(records)
            }
            Err(err) => match self.cached_feed() {
                Some((records, _)) => {
                    warn!(%err, "change feed fetch failed, serving cached feed");
                    Ok(match since {
                        Some(cursor) => records
                            .into_iter()
                            .filter(|record| record.timestamp > cursor)
                            .collect(),
                        None => records,
                    })
                }
                None => Err(err),
            },
        }
    }

    async fn fetch_remote(&self, since: Option<i64>) -> Result<Vec<ChangeRecord>, ChangeLogError> {
        let mut request = self.client.get(&self.endpoint).timeout(REQUEST_TIMEOUT);
        if let Some(cursor) = since {
            request = request.query(&[("since", cursor.to_string())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChangeLogError::Status {
                status: status.as_u16(),
            });
        }

        let rows: Vec<WireChangeRow> = response.json().await?;
        Ok(validate_rows(rows))
    }

    fn cached_feed(&self) -> Option<(Vec<ChangeRecord>, i64)> {
        let raw = self.store.get(keys::CHANGE_LOG)?;
        let records = serde_json::from_str(&raw).ok()?;
        let fetched_at = self
            .store
            .get(keys::CHANGE_LOG_FETCHED_AT)?
            .trim()
            .parse::<i64>()
            .ok()?;
        Some((records, fetched_at))
    }

    fn store_feed(&self, records: &[ChangeRecord]) {
        match serde_json::to_string(records) {
            Ok(raw) => {
                self.store.set(keys::CHANGE_LOG, &raw);
                self.store.set(
                    keys::CHANGE_LOG_FETCHED_AT,
                    &Utc::now().timestamp_millis().to_string(),
                );
            }
            Err(err) => warn!(%err, "failed to serialize change feed for caching"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire shape
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct SubmitAck {
    #[serde(default)]
    success: bool,
}

/// Raw change row as the store serves it. Every field optional on ingest;
/// validation decides what survives.
#[derive(Debug, Serialize, Deserialize)]
struct WireChangeRow {
    game_mode: Option<String>,
    map: Option<String>,
    boss: Option<String>,
    field: Option<String>,
    old_value: Option<String>,
    new_value: Option<String>,
    timestamp: Option<serde_json::Value>,
}

impl WireChangeRow {
    fn from_record(record: &ChangeRecord) -> Self {
        Self {
            game_mode: Some(record.game_mode.wire_name().to_string()),
            map: Some(record.map.clone()),
            boss: Some(record.boss.clone()),
            field: Some(record.field.wire_name().to_string()),
            old_value: Some(record.old_value.clone()),
            new_value: Some(record.new_value.clone()),
            timestamp: Some(serde_json::Value::from(record.timestamp)),
        }
    }

    /// A row missing any required field, carrying an unrecognized field
    /// label, or with a non-numeric timestamp is dropped.
    fn validate(self) -> Option<ChangeRecord> {
        let timestamp = match self.timestamp? {
            serde_json::Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f as i64))?,
            _ => return None,
        };

        Some(ChangeRecord {
            map: self.map?,
            boss: self.boss?,
            field: ChangeField::from_wire(&self.field?)?,
            old_value: self.old_value?,
            new_value: self.new_value?,
            timestamp,
            game_mode: GameMode::from_wire(self.game_mode.as_deref().unwrap_or("")),
        })
    }
}

/// Drop invalid rows silently, preserving the store's newest-first order.
fn validate_rows(rows: Vec<WireChangeRow>) -> Vec<ChangeRecord> {
    let total = rows.len();
    let records: Vec<ChangeRecord> = rows.into_iter().filter_map(WireChangeRow::validate).collect();
    if records.len() < total {
        debug!(
            dropped = total - records.len(),
            "dropped invalid change rows on ingest"
        );
    }
    records
}
