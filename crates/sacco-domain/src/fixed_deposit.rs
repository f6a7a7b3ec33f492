//! Fixed-term deposits locked against a member account.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FixedDepositStatus {
    Active,
    Matured,
    PrematureWithdrawal,
    Renewed,
}

impl fmt::Display for FixedDepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FixedDepositStatus::Active => "Active",
            FixedDepositStatus::Matured => "Matured",
            FixedDepositStatus::PrematureWithdrawal => "Premature Withdrawal",
            FixedDepositStatus::Renewed => "Renewed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Principal locked away from an account for a fixed term. At most one
/// active deposit per account.
pub struct FixedDeposit {
    pub id: Uuid,
    pub deposit_number: String,
    pub account_id: Uuid,
    pub principal_amount: Decimal,
    /// Annual percentage, simple interest over the term.
    pub interest_rate: Decimal,
    pub term_months: u32,
    /// Principal plus the full term's interest, fixed at opening.
    pub maturity_amount: Decimal,
    pub start_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub status: FixedDepositStatus,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for FixedDeposit {
    fn id(&self) -> Uuid {
        self.id
    }
}
