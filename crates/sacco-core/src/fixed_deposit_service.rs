//! Fixed-term deposits: opening, maturity payout, and early withdrawal.

use rust_decimal::Decimal;
use sacco_domain::{
    add_cycles, round_to_cents, FixedDeposit, FixedDepositStatus, Ledger, LedgerEvent,
    TransactionKind,
};
use tracing::info;
use uuid::Uuid;

use crate::{Clock, CoreError, RecordTransaction, TransactionService};

/// Locks principal away from an account for a fixed term and pays it back
/// with simple interest at maturity.
pub struct FixedDepositService;

impl FixedDepositService {
    /// Opens a deposit by debiting the principal from the account. The
    /// maturity amount is fixed at opening: `principal + principal *
    /// rate/100 * months/12`, rounded to cents. One active deposit per
    /// account.
    pub fn open(
        ledger: &mut Ledger,
        account_id: Uuid,
        principal: Decimal,
        interest_rate: Decimal,
        term_months: u32,
        auto_renew: bool,
        clock: &dyn Clock,
    ) -> Result<FixedDeposit, CoreError> {
        if principal <= Decimal::ZERO || interest_rate < Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        if term_months == 0 {
            return Err(CoreError::InvalidTerm(term_months));
        }
        let account = ledger
            .account(account_id)
            .ok_or(CoreError::AccountNotFound(account_id))?;
        let account_number = account.account_number.clone();
        let already_held = ledger
            .fixed_deposits
            .iter()
            .any(|d| d.account_id == account_id && d.status == FixedDepositStatus::Active);
        if already_held {
            return Err(CoreError::Validation(format!(
                "account {account_number} already holds an active fixed deposit"
            )));
        }

        let interest = principal * interest_rate / Decimal::ONE_HUNDRED
            * Decimal::from(term_months)
            / Decimal::from(12);
        let maturity_amount = round_to_cents(principal + interest);
        let start_date = clock.today();
        let id = Uuid::new_v4();
        let deposit_number = format!("FD{}", &id.simple().to_string()[..8].to_uppercase());

        TransactionService::record(
            ledger,
            RecordTransaction {
                account_id,
                kind: TransactionKind::FixedDepositPlacement,
                amount: principal,
                description: format!("Fixed deposit {deposit_number}"),
                reference: deposit_number.clone(),
                destination_account_id: None,
                processed_by: None,
            },
            clock,
        )?;

        let deposit = FixedDeposit {
            id,
            deposit_number,
            account_id,
            principal_amount: principal,
            interest_rate,
            term_months,
            maturity_amount,
            start_date,
            maturity_date: add_cycles(start_date, term_months),
            status: FixedDepositStatus::Active,
            auto_renew,
            created_at: clock.now(),
        };
        info!(
            deposit = %deposit.deposit_number,
            principal = %principal,
            maturity = %maturity_amount,
            "opened fixed deposit"
        );
        ledger.record_event(LedgerEvent::FixedDepositOpened {
            deposit_id: deposit.id,
            account_id,
            amount: principal,
        });
        ledger.fixed_deposits.push(deposit.clone());
        ledger.touch();
        Ok(deposit)
    }

    /// Settles a deposit on or after its maturity date. A plain deposit is
    /// paid out (principal plus interest) and marked matured; an auto-renew
    /// deposit rolls its maturity amount into a fresh term instead, and no
    /// money moves.
    pub fn mature(
        ledger: &mut Ledger,
        deposit_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<FixedDeposit, CoreError> {
        let deposit = Self::active_deposit(ledger, deposit_id)?;
        if clock.today() < deposit.maturity_date {
            return Err(CoreError::Validation(format!(
                "fixed deposit {} matures on {}",
                deposit.deposit_number, deposit.maturity_date
            )));
        }
        let deposit = deposit.clone();

        if deposit.auto_renew {
            let renewed_id = Uuid::new_v4();
            let interest = deposit.maturity_amount * deposit.interest_rate
                / Decimal::ONE_HUNDRED
                * Decimal::from(deposit.term_months)
                / Decimal::from(12);
            let renewed = FixedDeposit {
                id: renewed_id,
                deposit_number: format!(
                    "FD{}",
                    &renewed_id.simple().to_string()[..8].to_uppercase()
                ),
                account_id: deposit.account_id,
                principal_amount: deposit.maturity_amount,
                interest_rate: deposit.interest_rate,
                term_months: deposit.term_months,
                maturity_amount: round_to_cents(deposit.maturity_amount + interest),
                start_date: deposit.maturity_date,
                maturity_date: add_cycles(deposit.maturity_date, deposit.term_months),
                status: FixedDepositStatus::Active,
                auto_renew: true,
                created_at: clock.now(),
            };
            info!(
                deposit = %deposit.deposit_number,
                renewed = %renewed.deposit_number,
                "rolled fixed deposit into a new term"
            );
            if let Some(old) = ledger.fixed_deposit_mut(deposit_id) {
                old.status = FixedDepositStatus::Renewed;
            }
            ledger.fixed_deposits.push(renewed.clone());
            ledger.touch();
            return Ok(renewed);
        }

        TransactionService::record(
            ledger,
            RecordTransaction {
                account_id: deposit.account_id,
                kind: TransactionKind::FixedDepositMaturity,
                amount: deposit.maturity_amount,
                description: format!("Maturity of fixed deposit {}", deposit.deposit_number),
                reference: deposit.deposit_number.clone(),
                destination_account_id: None,
                processed_by: None,
            },
            clock,
        )?;
        if let Some(stored) = ledger.fixed_deposit_mut(deposit_id) {
            stored.status = FixedDepositStatus::Matured;
        }
        info!(deposit = %deposit.deposit_number, amount = %deposit.maturity_amount, "paid out matured deposit");
        ledger.record_event(LedgerEvent::FixedDepositClosed {
            deposit_id,
            account_id: deposit.account_id,
            amount: deposit.maturity_amount,
        });
        ledger.touch();
        Ok(ledger
            .fixed_deposit(deposit_id)
            .cloned()
            .unwrap_or(deposit))
    }

    /// Breaks a deposit before maturity. Only the principal comes back; the
    /// accrued interest is forfeited.
    pub fn withdraw_early(
        ledger: &mut Ledger,
        deposit_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<FixedDeposit, CoreError> {
        let deposit = Self::active_deposit(ledger, deposit_id)?.clone();
        if clock.today() >= deposit.maturity_date {
            return Err(CoreError::Validation(format!(
                "fixed deposit {} has matured; settle it at full value",
                deposit.deposit_number
            )));
        }

        TransactionService::record(
            ledger,
            RecordTransaction {
                account_id: deposit.account_id,
                kind: TransactionKind::FixedDepositMaturity,
                amount: deposit.principal_amount,
                description: format!(
                    "Early withdrawal of fixed deposit {}",
                    deposit.deposit_number
                ),
                reference: deposit.deposit_number.clone(),
                destination_account_id: None,
                processed_by: None,
            },
            clock,
        )?;
        if let Some(stored) = ledger.fixed_deposit_mut(deposit_id) {
            stored.status = FixedDepositStatus::PrematureWithdrawal;
        }
        info!(deposit = %deposit.deposit_number, principal = %deposit.principal_amount, "early fixed deposit withdrawal");
        ledger.record_event(LedgerEvent::FixedDepositClosed {
            deposit_id,
            account_id: deposit.account_id,
            amount: deposit.principal_amount,
        });
        ledger.touch();
        Ok(ledger
            .fixed_deposit(deposit_id)
            .cloned()
            .unwrap_or(deposit))
    }

    fn active_deposit(ledger: &Ledger, deposit_id: Uuid) -> Result<&FixedDeposit, CoreError> {
        let deposit = ledger
            .fixed_deposit(deposit_id)
            .ok_or_else(|| CoreError::Validation("fixed deposit not found".into()))?;
        if deposit.status != FixedDepositStatus::Active {
            return Err(CoreError::Validation(format!(
                "fixed deposit {} is {}",
                deposit.deposit_number, deposit.status
            )));
        }
        Ok(deposit)
    }
}
