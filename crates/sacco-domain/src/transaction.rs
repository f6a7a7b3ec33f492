//! Immutable ledger rows and the credit/debit direction mapping.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Every kind of money movement the ledger records.
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    LoanDisbursement,
    LoanRepayment,
    InterestPayment,
    FeeCharge,
    DividendPayment,
    SharePurchase,
    FixedDepositPlacement,
    FixedDepositMaturity,
}

impl TransactionKind {
    /// Effect of this kind on the owning account's balance. Total over the
    /// enum; a transfer debits the source account (the destination leg is
    /// credited by the recorder).
    pub fn direction(self) -> EntryDirection {
        match self {
            TransactionKind::Deposit
            | TransactionKind::LoanDisbursement
            | TransactionKind::InterestPayment
            | TransactionKind::DividendPayment
            | TransactionKind::FixedDepositMaturity => EntryDirection::Credit,
            TransactionKind::Withdrawal
            | TransactionKind::Transfer
            | TransactionKind::LoanRepayment
            | TransactionKind::FeeCharge
            | TransactionKind::SharePurchase
            | TransactionKind::FixedDepositPlacement => EntryDirection::Debit,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::Transfer => "Transfer",
            TransactionKind::LoanDisbursement => "Loan Disbursement",
            TransactionKind::LoanRepayment => "Loan Repayment",
            TransactionKind::InterestPayment => "Interest Payment",
            TransactionKind::FeeCharge => "Fee Charge",
            TransactionKind::DividendPayment => "Dividend Payment",
            TransactionKind::SharePurchase => "Share Purchase",
            TransactionKind::FixedDepositPlacement => "Fixed Deposit Placement",
            TransactionKind::FixedDepositMaturity => "Fixed Deposit Maturity",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Whether an amount is added to or taken from an account.
pub enum EntryDirection {
    Credit,
    Debit,
}

impl fmt::Display for EntryDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntryDirection::Credit => "Credit",
            EntryDirection::Debit => "Debit",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Reversed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Failed => "Failed",
            TransactionStatus::Reversed => "Reversed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One row of the ledger. Created once; the balance snapshot is never
/// recomputed, only `status` may change afterwards.
pub struct Transaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: TransactionKind,
    /// Always stored positive; the sign of the effect comes from the kind.
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub description: String,
    pub reference: String,
    pub status: TransactionStatus,
    /// Second leg of a transfer. Meaningless for every other kind.
    pub destination_account_id: Option<Uuid>,
    pub processed_by: Option<Uuid>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_covers_every_kind() {
        use EntryDirection::*;
        use TransactionKind::*;

        let cases = [
            (Deposit, Credit),
            (LoanDisbursement, Credit),
            (InterestPayment, Credit),
            (DividendPayment, Credit),
            (FixedDepositMaturity, Credit),
            (Withdrawal, Debit),
            (Transfer, Debit),
            (LoanRepayment, Debit),
            (FeeCharge, Debit),
            (SharePurchase, Debit),
            (FixedDepositPlacement, Debit),
        ];
        for (kind, expected) in cases {
            assert_eq!(kind.direction(), expected, "kind {kind}");
        }
    }

    #[test]
    fn kinds_serialize_to_snake_case() {
        let json = serde_json::to_string(&TransactionKind::LoanRepayment).unwrap();
        assert_eq!(json, "\"loan_repayment\"");
    }
}
