//! Persistence abstraction and ledger integrity scanning.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use sacco_domain::Ledger;

use crate::CoreError;

/// Describes a persisted backup artifact for a ledger.
#[derive(Debug, Clone)]
pub struct LedgerBackupInfo {
    pub ledger: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends capable of storing ledgers and
/// backups.
pub trait LedgerStorage: Send + Sync {
    fn save_ledger(&self, name: &str, ledger: &Ledger) -> Result<(), CoreError>;
    fn load_ledger(&self, name: &str) -> Result<Ledger, CoreError>;
    fn list_ledgers(&self) -> Result<Vec<String>, CoreError>;
    fn delete_ledger(&self, name: &str) -> Result<(), CoreError>;
    fn save_ledger_to_path(&self, ledger: &Ledger, path: &Path) -> Result<(), CoreError>;
    fn load_ledger_from_path(&self, path: &Path) -> Result<Ledger, CoreError>;
    fn backup_ledger(
        &self,
        name: &str,
        ledger: &Ledger,
        note: Option<&str>,
    ) -> Result<LedgerBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<LedgerBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &LedgerBackupInfo) -> Result<Ledger, CoreError>;
}

/// Detects dangling references within a ledger snapshot. Loaded ledgers are
/// scanned so corrupt files surface as warnings rather than panics later.
pub fn ledger_warnings(ledger: &Ledger) -> Vec<String> {
    let member_ids: HashSet<_> = ledger.members.iter().map(|m| m.id).collect();
    let account_ids: HashSet<_> = ledger.accounts.iter().map(|a| a.id).collect();
    let type_ids: HashSet<_> = ledger.account_types.iter().map(|t| t.id).collect();
    let application_ids: HashSet<_> = ledger.loan_applications.iter().map(|a| a.id).collect();
    let loan_ids: HashSet<_> = ledger.loans.iter().map(|l| l.id).collect();
    let transaction_ids: HashSet<_> = ledger.transactions.iter().map(|t| t.id).collect();
    let mut warnings = Vec::new();

    for account in &ledger.accounts {
        if !member_ids.contains(&account.member_id) {
            warnings.push(format!(
                "account {} references unknown member {}",
                account.account_number, account.member_id
            ));
        }
        if !type_ids.contains(&account.account_type_id) {
            warnings.push(format!(
                "account {} references unknown account type {}",
                account.account_number, account.account_type_id
            ));
        }
        if account.available_balance > account.balance {
            warnings.push(format!(
                "account {} has available balance above its balance",
                account.account_number
            ));
        }
    }
    for txn in &ledger.transactions {
        if !account_ids.contains(&txn.account_id) {
            warnings.push(format!(
                "transaction {} references unknown account {}",
                txn.id, txn.account_id
            ));
        }
        if let Some(destination) = txn.destination_account_id {
            if !account_ids.contains(&destination) {
                warnings.push(format!(
                    "transaction {} references unknown destination account {}",
                    txn.id, destination
                ));
            }
        }
    }
    for loan in &ledger.loans {
        if !application_ids.contains(&loan.application_id) {
            warnings.push(format!(
                "loan {} references unknown application {}",
                loan.loan_number, loan.application_id
            ));
        }
        if !member_ids.contains(&loan.member_id) {
            warnings.push(format!(
                "loan {} references unknown member {}",
                loan.loan_number, loan.member_id
            ));
        }
    }
    for deposit in &ledger.fixed_deposits {
        if !account_ids.contains(&deposit.account_id) {
            warnings.push(format!(
                "fixed deposit {} references unknown account {}",
                deposit.deposit_number, deposit.account_id
            ));
        }
    }
    for payment in &ledger.loan_payments {
        if !loan_ids.contains(&payment.loan_id) {
            warnings.push(format!(
                "loan payment {} references unknown loan {}",
                payment.id, payment.loan_id
            ));
        }
        if !transaction_ids.contains(&payment.transaction_id) {
            warnings.push(format!(
                "loan payment {} references unknown transaction {}",
                payment.id, payment.transaction_id
            ));
        }
    }
    warnings
}
