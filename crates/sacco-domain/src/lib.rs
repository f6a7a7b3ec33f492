//! sacco-domain
//!
//! Pure domain models for the cooperative back office (Member, Account,
//! Transaction, Loan, share capital, the Ledger aggregate).
//! No I/O, no storage. Only data types and core enums.

pub mod account;
pub mod common;
pub mod event;
pub mod fixed_deposit;
pub mod ledger;
pub mod loan;
pub mod member;
pub mod shares;
pub mod transaction;

pub use account::*;
pub use common::*;
pub use event::*;
pub use fixed_deposit::*;
pub use ledger::*;
pub use loan::*;
pub use member::*;
pub use shares::*;
pub use transaction::*;
