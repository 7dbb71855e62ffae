//! Mock mint relay for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::client::{MintReceipt, MintRelay, MintRequest};
use crate::error::{MintError, MintResult};

/// Behavior of the mock relay.
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Return HTTP-200-style success with the given transaction id.
    Succeed { tx_id: String },
    /// Fail with the given HTTP status.
    FailStatus { code: u16 },
    /// Fail as if the connection dropped or timed out.
    FailConnection,
}

/// A [`MintRelay`] that records requests and answers per its configured mode.
pub struct MockMintRelay {
    mode: Mutex<MockMode>,
    requests: Mutex<Vec<MintRequest>>,
}

impl MockMintRelay {
    pub fn succeeding(tx_id: &str) -> Self {
        Self::with_mode(MockMode::Succeed {
            tx_id: tx_id.to_string(),
        })
    }

    pub fn failing_with_status(code: u16) -> Self {
        Self::with_mode(MockMode::FailStatus { code })
    }

    pub fn with_mode(mode: MockMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Swap the behavior mid-test.
    pub fn set_mode(&self, mode: MockMode) {
        *self.mode.lock().unwrap() = mode;
    }

    /// Requests observed so far.
    pub fn requests(&self) -> Vec<MintRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MintRelay for MockMintRelay {
    async fn request_mint(&self, request: &MintRequest) -> MintResult<MintReceipt> {
        self.requests.lock().unwrap().push(request.clone());
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            MockMode::Succeed { tx_id } => Ok(MintReceipt {
                tx_id: tx_id.clone(),
                response: json!({"success": true, "data": {"requestId": tx_id}}),
            }),
            MockMode::FailStatus { code } => Err(MintError::Status {
                code,
                body: "mint rejected".to_string(),
            }),
            MockMode::FailConnection => {
                Err(MintError::Connection("connection refused".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_requests() {
        let relay = MockMintRelay::succeeding("tx-1");
        let request = MintRequest {
            unicity_id: "0xDEAD".to_string(),
            coin: "alpha".to_string(),
            amount: 1.5,
        };
        let receipt = relay.request_mint(&request).await.unwrap();
        assert_eq!(receipt.tx_id, "tx-1");
        assert_eq!(relay.requests().len(), 1);

        relay.set_mode(MockMode::FailStatus { code: 502 });
        let err = relay.request_mint(&request).await.unwrap_err();
        assert!(matches!(err, MintError::Status { code: 502, .. }));
    }
}
