// Application layer - use cases and orchestration.
// Clients (the CLI today, potentially an HTTP layer later) only ever talk
// to LedgerService; the repository is not part of the public contract.

pub mod auth;
pub mod error;
pub mod service;

pub use error::*;
pub use service::*;
