//! Integration tests for the faucet API endpoints.
//!
//! End-to-end claim flows run against an in-memory store and a mock mint
//! relay.

use std::sync::Arc;

use axum_test::TestServer;
use faucet_api::{create_router, AppState};
use faucet_core::{address, sign_claim};
use faucet_db::{BalanceStore, ClaimStatus};
use faucet_mint::{MintRelay, MockMintRelay};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde_json::json;

const HRP: &str = "alpha";
const AMOUNT: u64 = 150_000_000;
const DEST: &str = "0xDEAD";

fn keypair(seed: u8) -> (SecretKey, PublicKey) {
    let secp = Secp256k1::new();
    let secret = SecretKey::from_slice(&[seed; 32]).unwrap();
    let pubkey = PublicKey::from_secret_key(&secp, &secret);
    (secret, pubkey)
}

struct Harness {
    server: TestServer,
    store: Arc<BalanceStore>,
    addr: String,
    secret: SecretKey,
}

fn harness(mint: MockMintRelay) -> Harness {
    let store = Arc::new(BalanceStore::open_in_memory().unwrap());
    let (secret, pubkey) = keypair(1);
    let addr = address::from_pubkey(HRP, &pubkey.serialize()).unwrap();
    store
        .bulk_insert_balances(&[(addr.clone(), AMOUNT)])
        .unwrap();

    let relay: Arc<dyn MintRelay> = Arc::new(mint);
    let state = AppState::new(store.clone(), relay, HRP);
    let server = TestServer::new(create_router(state)).unwrap();

    Harness {
        server,
        store,
        addr,
        secret,
    }
}

fn claim_body(addr: &str, dest: &str, amount: u64, signature: &str) -> serde_json::Value {
    json!({
        "l1_addr": addr,
        "unicityId": dest,
        "amount": amount,
        "signature": signature,
    })
}

// ============ Health and stats ============

#[tokio::test]
async fn health_check_reports_ok() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let response = h.server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn stats_track_consumption() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let response = h.server.get("/api/v1/faucet/stats").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["totalAddresses"], 1);
    assert_eq!(body["availableAddresses"], 1);
    assert_eq!(body["mintedAddresses"], 0);

    let sig = sign_claim(&h.secret, &h.addr, DEST, AMOUNT).unwrap();
    h.server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, AMOUNT, &sig))
        .await
        .assert_status_ok();

    let body: serde_json::Value = h.server.get("/api/v1/faucet/stats").await.json();
    assert_eq!(body["availableAddresses"], 0);
    assert_eq!(body["mintedAddresses"], 1);
}

// ============ Balance endpoint ============

#[tokio::test]
async fn balance_of_snapshot_address() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let response = h
        .server
        .get(&format!("/api/v1/faucet/balance/{}", h.addr))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["inSnapshot"], true);
    assert_eq!(body["spent"], false);
    assert_eq!(body["amount"], 1.5);
    assert_eq!(body["amountInSmallUnits"], 150_000_000);
    assert_eq!(body["initialAmountInSmallUnits"], 150_000_000);
    assert_eq!(body["symbol"], "ALPHA");
    assert_eq!(body["decimals"], 8);
    assert!(body.get("mintedAt").is_none());
}

#[tokio::test]
async fn balance_of_unknown_address_is_empty_not_error() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let (_, other_pubkey) = keypair(9);
    let other = address::from_pubkey(HRP, &other_pubkey.serialize()).unwrap();

    let response = h
        .server
        .get(&format!("/api/v1/faucet/balance/{other}"))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["inSnapshot"], false);
    assert_eq!(body["amountInSmallUnits"], 0);
}

#[tokio::test]
async fn balance_of_invalid_address_is_400() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let response = h.server.get("/api/v1/faucet/balance/notanaddress").await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn balance_after_claim_shows_spent() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let sig = sign_claim(&h.secret, &h.addr, DEST, AMOUNT).unwrap();
    h.server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, AMOUNT, &sig))
        .await
        .assert_status_ok();

    let body: serde_json::Value = h
        .server
        .get(&format!("/api/v1/faucet/balance/{}", h.addr))
        .await
        .json();
    assert_eq!(body["spent"], true);
    assert_eq!(body["amountInSmallUnits"], 0);
    assert_eq!(body["initialAmountInSmallUnits"], 150_000_000);
    assert_eq!(body["unicityId"], DEST);
    assert!(body["mintedAt"].is_string());
}

// ============ Claim scenarios ============

#[tokio::test]
async fn happy_path_claim() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let sig = sign_claim(&h.secret, &h.addr, DEST, AMOUNT).unwrap();

    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, AMOUNT, &sig))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["amount"], 1.5);
    assert_eq!(body["amountInSmallUnits"], 150_000_000);
    assert_eq!(body["txId"], "xyz");

    let row = h.store.find(&h.addr).unwrap().unwrap();
    assert!(row.consumed);
    assert_eq!(row.relay_tx_id.as_deref(), Some("xyz"));
    assert_eq!(row.destination_id.as_deref(), Some(DEST));

    let log = h.store.claim_request(1).unwrap().unwrap();
    assert_eq!(log.status, ClaimStatus::Success);
    assert!(log.upstream_response.is_some());

    // second claim against the same address
    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, AMOUNT, &sig))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn amount_mismatch_is_400() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let wrong = AMOUNT - 1;
    let sig = sign_claim(&h.secret, &h.addr, DEST, wrong).unwrap();

    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, wrong, &sig))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("amount mismatch"));

    let row = h.store.find(&h.addr).unwrap().unwrap();
    assert!(!row.consumed);
}

#[tokio::test]
async fn wrong_signer_is_400() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let (other_secret, _) = keypair(2);
    let sig = sign_claim(&other_secret, &h.addr, DEST, AMOUNT).unwrap();

    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, AMOUNT, &sig))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("does not match address"));
}

#[tokio::test]
async fn parallel_claims_have_one_winner() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let sig = sign_claim(&h.secret, &h.addr, DEST, AMOUNT).unwrap();
    let body = claim_body(&h.addr, DEST, AMOUNT, &sig);

    let (a, b) = tokio::join!(
        h.server.post("/api/v1/faucet/request").json(&body),
        h.server.post("/api/v1/faucet/request").json(&body),
    );

    let mut codes = [a.status_code().as_u16(), b.status_code().as_u16()];
    codes.sort_unstable();
    assert_eq!(codes, [200, 409]);

    let row = h.store.find(&h.addr).unwrap().unwrap();
    assert!(row.consumed);
    assert_eq!(row.destination_id.as_deref(), Some(DEST));
}

#[tokio::test]
async fn unknown_address_is_404() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let (other_secret, other_pubkey) = keypair(9);
    let other = address::from_pubkey(HRP, &other_pubkey.serialize()).unwrap();
    let sig = sign_claim(&other_secret, &other, DEST, AMOUNT).unwrap();

    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&other, DEST, AMOUNT, &sig))
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn upstream_failure_leaves_reservation_in_place() {
    let h = harness(MockMintRelay::failing_with_status(502));
    let sig = sign_claim(&h.secret, &h.addr, DEST, AMOUNT).unwrap();

    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, AMOUNT, &sig))
        .await;
    assert_eq!(response.status_code(), 502);

    // the reservation survives the failed relay
    let row = h.store.find(&h.addr).unwrap().unwrap();
    assert!(row.consumed);
    assert_eq!(row.relay_tx_id.as_deref(), Some("pending"));

    let log = h.store.claim_request(1).unwrap().unwrap();
    assert_eq!(log.status, ClaimStatus::Failed);

    // a second claim sees the address as consumed
    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, AMOUNT, &sig))
        .await;
    assert_eq!(response.status_code(), 409);
}

// ============ Input validation ============

#[tokio::test]
async fn malformed_body_is_400() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&json!({"l1_addr": h.addr}))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn empty_destination_is_400() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let sig = sign_claim(&h.secret, &h.addr, "  ", AMOUNT).unwrap();
    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, "  ", AMOUNT, &sig))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn garbage_signature_is_400() {
    let h = harness(MockMintRelay::succeeding("xyz"));
    let response = h
        .server
        .post("/api/v1/faucet/request")
        .json(&claim_body(&h.addr, DEST, AMOUNT, "nothex"))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("signature"));
}
