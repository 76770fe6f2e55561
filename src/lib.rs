//! Read-only on-chain payment verification for tiered feature unlocks.
//!
//! paygate checks that a claimed cryptocurrency payment actually landed
//! at a configured receiving address on one of four chains (Solana,
//! Ethereum, Tron, BNB Smart Chain) and meets a tier's minimum amount.
//! It queries public ledger data sources only: no wallets, no private
//! keys, no signing.
//!
//! # Architecture
//!
//! ```text
//! dispatcher (HTTP layer, out of scope)
//!        │ VerificationRequest
//!        ▼
//! ┌─────────────────────┐
//! │ VerificationEngine  │──► AmountPolicy (tier minimum, normalize)
//! └─────────┬───────────┘
//!           │ chain id
//!           ▼
//! ┌─────────────────────┐
//! │ AdapterRegistry     │──► ChainAdapter (per-chain ledger query)
//! └─────────┬───────────┘
//!           │
//!           ▼
//!   Verdict: Paid / NotPaid / Error
//! ```
//!
//! Every `verify` call is independent; the registry and policy are
//! immutable after startup, so calls run concurrently with no locks.

pub mod adapters;
pub mod config;
pub mod engine;
pub mod error;
pub mod policy;
pub mod request;

pub use adapters::{AdapterRegistry, ChainAdapter, Transfer};
pub use config::GateConfig;
pub use engine::{NoPayment, Verdict, VerificationEngine};
pub use error::{Error, Result};
pub use policy::AmountPolicy;
pub use request::{Chain, Tier, VerificationRequest};
