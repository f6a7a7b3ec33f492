//! Domain events emitted by the core services.
//!
//! Audit and notification layers observe money movement by draining
//! [`crate::Ledger::take_events`] after each operation; the services never
//! call those layers inline.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::transaction::TransactionKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    TransactionRecorded {
        transaction_id: Uuid,
        account_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
    },
    LoanOriginated {
        loan_id: Uuid,
        application_id: Uuid,
    },
    LoanDisbursed {
        loan_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
    },
    LoanPaymentApplied {
        loan_id: Uuid,
        payment_id: Uuid,
        amount: Decimal,
    },
    LoanCompleted {
        loan_id: Uuid,
    },
    SharesPurchased {
        member_id: Uuid,
        number_of_shares: Decimal,
    },
    FixedDepositOpened {
        deposit_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
    },
    FixedDepositClosed {
        deposit_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
    },
    DividendPaid {
        dividend_id: Uuid,
        member_id: Uuid,
        amount: Decimal,
    },
}
