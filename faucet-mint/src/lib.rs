//! Upstream mint relay client for the Alpha faucet.

pub mod client;
pub mod error;
pub mod mock;

pub use client::{
    HttpMintClient, MintReceipt, MintRelay, MintRequest, DEFAULT_RELAY_TIMEOUT,
};
pub use error::{MintError, MintResult};
pub use mock::{MockMintRelay, MockMode};
