//! The balance store.
//!
//! Single-writer hub over one SQLite file in WAL mode. All mutation of the
//! `consumed` flag goes through [`BalanceStore::atomic_consume`], whose
//! conditional UPDATE inside an immediate transaction guarantees that exactly
//! one of any set of concurrent claimants wins.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::{debug, info};

use crate::entities::{BalanceRow, ClaimRequestRow, ClaimStatus, ConsumeOutcome, SnapshotMeta};
use crate::error::{StoreError, StoreResult};
use crate::schema::FAUCET_SCHEMA;

/// Handle to the faucet database. Cheap to clone; all clones share one
/// serialized connection.
#[derive(Clone, Debug)]
pub struct BalanceStore {
    conn: Arc<Mutex<Connection>>,
}

impl BalanceStore {
    /// Open (or initialize) the database at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Create a fresh database at `path`; fails if the file already exists.
    pub fn create(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(StoreError::PathExists(path.display().to_string()));
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StoreResult<Self> {
        // WAL for reader/writer concurrency; in-memory databases report
        // their own journal mode, which is fine.
        let _mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(FAUCET_SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Case-insensitive balance lookup.
    pub fn find(&self, addr: &str) -> StoreResult<Option<BalanceRow>> {
        let conn = self.lock();
        find_balance(&conn, addr)
    }

    /// Insert a batch of `(address, initial_amount)` rows in one transaction.
    ///
    /// Any primary-key collision rejects the whole batch.
    pub fn bulk_insert_balances(&self, batch: &[(String, u64)]) -> StoreResult<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO balances (l1_address, initial_amount, created_at)
                 VALUES (lower(?1), ?2, ?3)",
            )?;
            for (addr, amount) in batch {
                stmt.execute(params![addr, *amount as i64, now]).map_err(|e| {
                    if constraint_violation(&e) {
                        StoreError::DuplicateAddress
                    } else {
                        StoreError::Sqlite(e)
                    }
                })?;
            }
        }
        tx.commit()?;
        debug!(count = batch.len(), "inserted balance batch");
        Ok(batch.len())
    }

    /// Consume a balance row at most once.
    ///
    /// Runs as an immediate (write-locking) transaction. The UPDATE carries a
    /// `consumed = 0` predicate so that of two racing transactions exactly one
    /// observes a changed row; the other returns [`ConsumeOutcome::Raced`].
    pub fn atomic_consume(
        &self,
        addr: &str,
        destination_id: &str,
        tx_id_placeholder: &str,
    ) -> StoreResult<ConsumeOutcome> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(row) = find_balance(&tx, addr)? else {
            return Ok(ConsumeOutcome::NotFound);
        };
        if row.consumed {
            return Ok(ConsumeOutcome::AlreadyConsumed(row));
        }

        let now = Utc::now().to_rfc3339();
        let changed = tx.execute(
            "UPDATE balances
             SET consumed = 1, destination_id = ?2, relay_tx_id = ?3, consumed_at = ?4
             WHERE l1_address = lower(?1) AND consumed = 0",
            params![addr, destination_id, tx_id_placeholder, now],
        )?;
        if changed != 1 {
            tx.commit()?;
            return Ok(ConsumeOutcome::Raced);
        }

        let consumed = find_balance(&tx, addr)?.ok_or_else(|| {
            rusqlite::Error::QueryReturnedNoRows
        })?;
        tx.commit()?;
        info!(address = %consumed.l1_address, destination_id, "balance consumed");
        Ok(ConsumeOutcome::Consumed(consumed))
    }

    /// Record the upstream relay transaction id after a successful relay.
    /// Idempotent under identical inputs.
    pub fn finalize_relay_tx_id(
        &self,
        addr: &str,
        destination_id: &str,
        tx_id: &str,
    ) -> StoreResult<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE balances SET relay_tx_id = ?3
             WHERE l1_address = lower(?1) AND destination_id = ?2",
            params![addr, destination_id, tx_id],
        )?;
        Ok(())
    }

    /// Append a claim attempt to the log with status `pending`.
    pub fn log_claim_request(
        &self,
        addr: &str,
        destination_id: &str,
        amount: u64,
        sig_hex: &str,
    ) -> StoreResult<i64> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO claim_requests
             (l1_address, destination_id, amount, signature, status, created_at)
             VALUES (lower(?1), ?2, ?3, ?4, 'pending', ?5)",
            params![
                addr,
                destination_id,
                amount as i64,
                sig_hex,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Resolve a claim log row to `success` or `failed`.
    pub fn update_claim_request(
        &self,
        id: i64,
        status: ClaimStatus,
        error_message: Option<&str>,
        upstream_response: Option<&str>,
    ) -> StoreResult<()> {
        let conn = self.lock();
        conn.execute(
            "UPDATE claim_requests
             SET status = ?2, error_message = ?3, upstream_response = ?4, processed_at = ?5
             WHERE id = ?1",
            params![
                id,
                status.as_str(),
                error_message,
                upstream_response,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Fetch a claim log row by id.
    pub fn claim_request(&self, id: i64) -> StoreResult<Option<ClaimRequestRow>> {
        let conn = self.lock();
        conn.query_row(
            "SELECT id, l1_address, destination_id, amount, signature, status,
                    error_message, upstream_response, created_at, processed_at
             FROM claim_requests WHERE id = ?1",
            params![id],
            claim_request_from_row,
        )
        .optional()
        .map_err(StoreError::from)
    }

    /// Total number of snapshot addresses.
    pub fn count_total(&self) -> StoreResult<u64> {
        let conn = self.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM balances", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of unconsumed snapshot addresses.
    pub fn count_unconsumed(&self) -> StoreResult<u64> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM balances WHERE consumed = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Read the snapshot metadata singleton.
    pub fn get_snapshot_meta(&self) -> StoreResult<Option<SnapshotMeta>> {
        let conn = self.lock();
        conn.query_row(
            "SELECT block_height, address_count, total_amount, chain_rpc_endpoint,
                    mint_endpoint, created_at
             FROM snapshot_meta WHERE id = 1",
            [],
            |row| {
                Ok(SnapshotMeta {
                    block_height: row.get::<_, i64>(0)? as u64,
                    address_count: row.get::<_, i64>(1)? as u64,
                    total_amount: row.get::<_, i64>(2)? as u64,
                    chain_rpc_endpoint: row.get(3)?,
                    mint_endpoint: row.get(4)?,
                    created_at: parse_ts(&row.get::<_, String>(5)?)?,
                })
            },
        )
        .optional()
        .map_err(StoreError::from)
    }

    /// Write the snapshot metadata singleton. Fails if it already exists.
    pub fn set_snapshot_meta(&self, meta: &SnapshotMeta) -> StoreResult<()> {
        let conn = self.lock();
        conn.execute(
            "INSERT INTO snapshot_meta
             (id, block_height, address_count, total_amount, chain_rpc_endpoint,
              mint_endpoint, created_at)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                meta.block_height as i64,
                meta.address_count as i64,
                meta.total_amount as i64,
                meta.chain_rpc_endpoint,
                meta.mint_endpoint,
                meta.created_at.to_rfc3339()
            ],
        )
        .map_err(|e| {
            if constraint_violation(&e) {
                StoreError::MetaExists
            } else {
                StoreError::Sqlite(e)
            }
        })?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn find_balance(conn: &Connection, addr: &str) -> StoreResult<Option<BalanceRow>> {
    conn.query_row(
        "SELECT l1_address, initial_amount, consumed, destination_id, relay_tx_id,
                consumed_at, created_at
         FROM balances WHERE l1_address = lower(?1)",
        params![addr],
        balance_from_row,
    )
    .optional()
    .map_err(StoreError::from)
}

fn balance_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<BalanceRow> {
    let consumed_at: Option<String> = row.get(5)?;
    let created_at: String = row.get(6)?;
    Ok(BalanceRow {
        l1_address: row.get(0)?,
        initial_amount: row.get::<_, i64>(1)? as u64,
        consumed: row.get::<_, i64>(2)? != 0,
        destination_id: row.get(3)?,
        relay_tx_id: row.get(4)?,
        consumed_at: consumed_at.as_deref().map(parse_ts).transpose()?,
        created_at: parse_ts(&created_at)?,
    })
}

fn claim_request_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ClaimRequestRow> {
    let status: String = row.get(5)?;
    let created_at: String = row.get(8)?;
    let processed_at: Option<String> = row.get(9)?;
    Ok(ClaimRequestRow {
        id: row.get(0)?,
        l1_address: row.get(1)?,
        destination_id: row.get(2)?,
        amount: row.get::<_, i64>(3)? as u64,
        signature: row.get(4)?,
        status: ClaimStatus::parse(&status).unwrap_or(ClaimStatus::Pending),
        error_message: row.get(6)?,
        upstream_response: row.get(7)?,
        created_at: parse_ts(&created_at)?,
        processed_at: processed_at.as_deref().map(parse_ts).transpose()?,
    })
}

fn parse_ts(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
