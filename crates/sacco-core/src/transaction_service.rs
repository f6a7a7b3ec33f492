//! Records immutable ledger rows around guarded balance mutations.

use rust_decimal::Decimal;
use sacco_domain::{
    EntryDirection, Ledger, LedgerEvent, Transaction, TransactionKind, TransactionStatus,
};
use tracing::info;
use uuid::Uuid;

use crate::{BalanceService, Clock, CoreError};

/// Inputs for one ledger row.
#[derive(Debug, Clone)]
pub struct RecordTransaction {
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub reference: String,
    /// Required for transfers, rejected otherwise.
    pub destination_account_id: Option<Uuid>,
    pub processed_by: Option<Uuid>,
}

/// Creates Transaction rows and applies the matching balance mutations.
///
/// The whole read-mutate-record sequence happens under one `&mut Ledger`
/// borrow, and every guard on every touched account is checked before any
/// balance moves, so a failure never leaves a partial mutation behind.
pub struct TransactionService;

impl TransactionService {
    pub fn record(
        ledger: &mut Ledger,
        request: RecordTransaction,
        clock: &dyn Clock,
    ) -> Result<Transaction, CoreError> {
        if request.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        let direction = request.kind.direction();

        let source = ledger
            .account(request.account_id)
            .ok_or(CoreError::AccountNotFound(request.account_id))?;
        BalanceService::ensure_can_apply(source, request.amount, direction)?;
        let balance_before = source.balance;

        let destination_id = match (request.kind, request.destination_account_id) {
            (TransactionKind::Transfer, Some(id)) if id == request.account_id => {
                return Err(CoreError::Validation(
                    "transfer destination must differ from the source account".into(),
                ));
            }
            (TransactionKind::Transfer, Some(id)) => {
                let destination = ledger
                    .account(id)
                    .ok_or(CoreError::AccountNotFound(id))?;
                BalanceService::ensure_can_apply(
                    destination,
                    request.amount,
                    EntryDirection::Credit,
                )?;
                Some(id)
            }
            (TransactionKind::Transfer, None) => {
                return Err(CoreError::Validation(
                    "transfer requires a destination account".into(),
                ));
            }
            (_, Some(_)) => {
                return Err(CoreError::Validation(format!(
                    "{} does not take a destination account",
                    request.kind
                )));
            }
            (_, None) => None,
        };

        let now = clock.now();
        // Guards passed on every leg; mutations below cannot fail.
        let source = ledger
            .account_mut(request.account_id)
            .ok_or(CoreError::AccountNotFound(request.account_id))?;
        BalanceService::apply(source, request.amount, direction, now)?;
        let balance_after = source.balance;
        if let Some(id) = destination_id {
            let destination = ledger
                .account_mut(id)
                .ok_or(CoreError::AccountNotFound(id))?;
            BalanceService::apply(destination, request.amount, EntryDirection::Credit, now)?;
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            account_id: request.account_id,
            kind: request.kind,
            amount: request.amount,
            balance_before,
            balance_after,
            description: request.description,
            reference: request.reference,
            status: TransactionStatus::Completed,
            destination_account_id: destination_id,
            processed_by: request.processed_by,
            processed_at: Some(now),
            created_at: now,
        };
        info!(
            kind = %transaction.kind,
            amount = %transaction.amount,
            account = %transaction.account_id,
            "recorded transaction"
        );
        ledger.record_event(LedgerEvent::TransactionRecorded {
            transaction_id: transaction.id,
            account_id: transaction.account_id,
            kind: transaction.kind,
            amount: transaction.amount,
        });
        ledger.transactions.push(transaction.clone());
        ledger.touch();
        Ok(transaction)
    }
}
