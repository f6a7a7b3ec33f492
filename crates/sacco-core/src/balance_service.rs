//! Guarded balance mutation for accounts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sacco_domain::{Account, AccountStatus, EntryDirection};

use crate::CoreError;

/// Applies signed amounts to an account's balance pair. `balance` and
/// `available_balance` always move by the same amount, so
/// `available_balance <= balance` is preserved.
pub struct BalanceService;

impl BalanceService {
    /// Checks every guard without mutating, so a caller touching two
    /// accounts can validate both legs before moving any money.
    pub fn ensure_can_apply(
        account: &Account,
        amount: Decimal,
        direction: EntryDirection,
    ) -> Result<(), CoreError> {
        if amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        if account.status != AccountStatus::Active {
            return Err(CoreError::AccountNotActive {
                number: account.account_number.clone(),
                status: account.status.to_string(),
            });
        }
        if direction == EntryDirection::Debit && amount > account.available_balance {
            return Err(CoreError::InsufficientFunds(account.account_number.clone()));
        }
        Ok(())
    }

    /// Moves `amount` in `direction` and stamps `last_transaction_date`.
    pub fn apply(
        account: &mut Account,
        amount: Decimal,
        direction: EntryDirection,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        Self::ensure_can_apply(account, amount, direction)?;
        match direction {
            EntryDirection::Credit => {
                account.balance += amount;
                account.available_balance += amount;
            }
            EntryDirection::Debit => {
                account.balance -= amount;
                account.available_balance -= amount;
            }
        }
        account.last_transaction_date = Some(now);
        Ok(())
    }
}
