//! One incremental run: token, pagination, diff against the store, batched insert.

use crate::config::{Config, SourceConfig};
use crate::dto::{NormalizedReportRow, PersistedBetRecord, RawBetRecord};
use crate::error::Result;
use crate::fetcher::{FetchOutcome, PaginatedFetcher, Termination};
use crate::normalize::{parse_bet_id, to_persisted_record, to_report_row};
use crate::store::{BetStore, SupabaseStore};
use crate::token::TokenAcquirer;
use std::fmt;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Idle,
    AcquiringToken,
    Paginating,
    Normalizing,
    Diffing,
    Inserting(usize),
    Done,
    Failed,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStage::Inserting(batch) => write!(f, "Inserting(batch {})", batch),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Result of writing one batch. Failures are recorded, never retried.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Inserted { index: usize, size: usize },
    Failed { index: usize, size: usize, reason: String },
}

impl BatchOutcome {
    pub fn size(&self) -> usize {
        match self {
            BatchOutcome::Inserted { size, .. } | BatchOutcome::Failed { size, .. } => *size,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, BatchOutcome::Inserted { .. })
    }
}

#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub fetched: usize,
    pub skipped_invalid_id: usize,
    pub max_existing_id: i64,
    pub new_records: usize,
    pub batches: Vec<BatchOutcome>,
    pub termination: Termination,
}

impl SyncSummary {
    /// Records actually written this run.
    pub fn inserted(&self) -> usize {
        self.batches
            .iter()
            .filter(|b| b.is_inserted())
            .map(BatchOutcome::size)
            .sum()
    }

    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|b| !b.is_inserted()).count()
    }
}

/// Rows newer than the high-water mark, in fetch order, plus the count of
/// rows skipped for lacking an integer `bet_id`.
///
/// No sorting or in-batch dedup happens here: the source is trusted to
/// return ids in non-decreasing order.
pub fn select_new_records(
    rows: &[RawBetRecord],
    max_existing_id: i64,
) -> (Vec<PersistedBetRecord>, usize) {
    let mut skipped = 0;
    let mut records = Vec::new();

    for raw in rows {
        let Some(id) = parse_bet_id(raw.bet_id.as_ref()) else {
            skipped += 1;
            continue;
        };
        if id > max_existing_id {
            records.push(to_persisted_record(id, raw));
        }
    }

    (records, skipped)
}

/// Token acquisition plus full pagination against one source.
pub async fn fetch_source(source: &SourceConfig) -> Result<FetchOutcome> {
    info!(stage = %SyncStage::AcquiringToken, "Fetching bets from source...");
    let page_config = TokenAcquirer::new(source)?.acquire().await?;

    info!(stage = %SyncStage::Paginating, "Paginating {}", source.api_url);
    let fetcher = PaginatedFetcher::new(source, &page_config.nonce)?;
    fetcher.fetch_all().await
}

/// Fetch everything and project it for reporting. No store access.
pub async fn export_report(source: &SourceConfig) -> Result<Vec<NormalizedReportRow>> {
    let outcome = fetch_source(source).await?;
    Ok(outcome.rows.iter().map(to_report_row).collect())
}

/// Run context: source settings, store handle and batch size.
///
/// The engine does not hold an HTTP session. Each `sync`/`dry_run` call
/// builds a fresh page client and a fresh nonce-bearing API session, and
/// drops both when the run ends, so runs never share a session or a nonce.
pub struct SyncEngine<S> {
    source: SourceConfig,
    store: S,
    batch_size: usize,
}

impl SyncEngine<SupabaseStore> {
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = SupabaseStore::new(&config.store)?;
        Ok(Self::new(config.source.clone(), store, config.store.batch_size))
    }
}

impl<S: BetStore> SyncEngine<S> {
    pub fn new(source: SourceConfig, store: S, batch_size: usize) -> Self {
        Self {
            source,
            store,
            batch_size: batch_size.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the pipeline and write new records.
    pub async fn sync(&self) -> Result<SyncSummary> {
        self.run(true).await
    }

    /// Run the pipeline up to the diff, without writing.
    pub async fn dry_run(&self) -> Result<SyncSummary> {
        self.run(false).await
    }

    /// A failed read is treated as an empty table so the run keeps going.
    async fn max_existing_id(&self) -> i64 {
        match self.store.max_id().await {
            Ok(max) => max.unwrap_or(0),
            Err(e) => {
                warn!("Error fetching max ID, assuming empty table: {}", e);
                0
            }
        }
    }

    async fn run(&self, write: bool) -> Result<SyncSummary> {
        info!(stage = %SyncStage::Idle, "Starting sync run");

        let max_existing_id = self.max_existing_id().await;
        info!("Max existing ID in DB: {}", max_existing_id);

        let outcome = fetch_source(&self.source).await.map_err(|e| {
            error!(stage = %SyncStage::Failed, "Sync aborted: {}", e);
            e
        })?;
        info!(
            "Fetched {} total bets over {} page(s), stopped on {:?}",
            outcome.rows.len(),
            outcome.pages_requested,
            outcome.termination
        );

        info!(stage = %SyncStage::Normalizing, "Mapping rows newer than {}", max_existing_id);
        let (new_records, skipped_invalid_id) =
            select_new_records(&outcome.rows, max_existing_id);

        if skipped_invalid_id > 0 {
            info!(
                stage = %SyncStage::Diffing,
                "Skipped {} rows without an integer bet_id", skipped_invalid_id
            );
        }
        info!(stage = %SyncStage::Diffing, "Found {} new records to insert.", new_records.len());

        let batches = if write {
            self.insert_batches(&new_records).await
        } else {
            info!("Dry run, nothing written");
            Vec::new()
        };

        let summary = SyncSummary {
            fetched: outcome.rows.len(),
            skipped_invalid_id,
            max_existing_id,
            new_records: new_records.len(),
            batches,
            termination: outcome.termination,
        };
        info!(
            stage = %SyncStage::Done,
            "Sync complete: {} inserted, {} failed batch(es)",
            summary.inserted(),
            summary.failed_batches()
        );
        Ok(summary)
    }

    /// Insert in order. A failed batch is logged and the next one still runs.
    async fn insert_batches(&self, records: &[PersistedBetRecord]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::new();

        for (index, batch) in records.chunks(self.batch_size).enumerate() {
            let stage = SyncStage::Inserting(index + 1);
            info!(%stage, "Inserting batch {} ({} records)...", index + 1, batch.len());

            let outcome = match self.store.insert(batch).await {
                Ok(()) => BatchOutcome::Inserted {
                    index,
                    size: batch.len(),
                },
                Err(e) => {
                    error!(%stage, "Error inserting batch: {}", e);
                    BatchOutcome::Failed {
                        index,
                        size: batch.len(),
                        reason: e.to_string(),
                    }
                }
            };
            outcomes.push(outcome);
        }

        outcomes
    }
}
