//! sacco-core
//!
//! Business services for the cooperative back office. Every operation takes
//! a `&mut Ledger`, validates its inputs, mutates balances and appends the
//! paired ledger rows inside that single borrow.
//! No CLI, no terminal I/O, no direct storage interactions.

pub mod balance_service;
pub mod error;
pub mod fixed_deposit_service;
pub mod loan_service;
pub mod registry_service;
pub mod share_service;
pub mod storage;
pub mod summary_service;
pub mod time;
pub mod transaction_service;

pub use balance_service::*;
pub use error::CoreError;
pub use fixed_deposit_service::*;
pub use loan_service::*;
pub use registry_service::*;
pub use share_service::*;
pub use storage::*;
pub use summary_service::*;
pub use time::*;
pub use transaction_service::*;
