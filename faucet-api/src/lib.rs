//! Claim API surface for the Alpha faucet.

pub mod claim;
pub mod dto;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use claim::{ClaimOutcome, ClaimService};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use server::{create_server, run_server};
pub use state::{ApiConfig, AppState};
