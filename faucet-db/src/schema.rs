//! SQLite schema for the faucet balance store.
//!
//! Tables:
//! - `balances`: one row per snapshot address, consumed at most once
//! - `snapshot_meta`: singleton snapshot provenance row
//! - `claim_requests`: append-only claim attempt log

/// DDL for the faucet store.
pub const FAUCET_SCHEMA: &str = r#"
-- Snapshot balances (rows created only by the snapshot builder)
CREATE TABLE IF NOT EXISTS balances (
    l1_address      TEXT PRIMARY KEY,
    initial_amount  INTEGER NOT NULL,
    consumed        INTEGER NOT NULL DEFAULT 0,
    destination_id  TEXT,
    relay_tx_id     TEXT,
    consumed_at     TEXT,
    created_at      TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_balances_consumed
    ON balances(consumed);

-- Snapshot provenance (written once, read-only thereafter)
CREATE TABLE IF NOT EXISTS snapshot_meta (
    id                  INTEGER PRIMARY KEY CHECK (id = 1),
    block_height        INTEGER NOT NULL,
    address_count       INTEGER NOT NULL,
    total_amount        INTEGER NOT NULL,
    chain_rpc_endpoint  TEXT NOT NULL,
    mint_endpoint       TEXT NOT NULL,
    created_at          TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Claim attempt log (append-only; resolved exactly once)
CREATE TABLE IF NOT EXISTS claim_requests (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    l1_address        TEXT NOT NULL,
    destination_id    TEXT NOT NULL,
    amount            INTEGER NOT NULL,
    signature         TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'pending',
    error_message     TEXT,
    upstream_response TEXT,
    created_at        TEXT NOT NULL DEFAULT (datetime('now')),
    processed_at      TEXT
);

CREATE INDEX IF NOT EXISTS idx_claim_requests_address
    ON claim_requests(l1_address);
CREATE INDEX IF NOT EXISTS idx_claim_requests_status
    ON claim_requests(status);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn schema_is_valid_sql() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(FAUCET_SCHEMA).unwrap();
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(FAUCET_SCHEMA).unwrap();
        conn.execute_batch(FAUCET_SCHEMA).unwrap();
    }

    #[test]
    fn snapshot_meta_is_singleton() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(FAUCET_SCHEMA).unwrap();
        conn.execute(
            "INSERT INTO snapshot_meta (id, block_height, address_count, total_amount,
             chain_rpc_endpoint, mint_endpoint) VALUES (1, 10, 2, 100, 'rpc', 'mint')",
            [],
        )
        .unwrap();
        let err = conn.execute(
            "INSERT INTO snapshot_meta (id, block_height, address_count, total_amount,
             chain_rpc_endpoint, mint_endpoint) VALUES (2, 10, 2, 100, 'rpc', 'mint')",
            [],
        );
        assert!(err.is_err());
    }
}
