//! The ledger aggregate: every entity collection plus lookup helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    account::{Account, AccountType},
    event::LedgerEvent,
    fixed_deposit::FixedDeposit,
    loan::{Loan, LoanApplication, LoanPayment, LoanProduct},
    member::Member,
    shares::{Dividend, DividendPayment, SharePrice, ShareTransaction},
    transaction::Transaction,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Aggregate root for one cooperative's books. Services mutate it through a
/// single `&mut` borrow, which is the unit-of-work boundary: a balance read,
/// its mutation, and the paired transaction row cannot interleave with
/// another mutation on the same ledger.
pub struct Ledger {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub members: Vec<Member>,
    pub account_types: Vec<AccountType>,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub loan_products: Vec<LoanProduct>,
    pub loan_applications: Vec<LoanApplication>,
    pub loans: Vec<Loan>,
    pub loan_payments: Vec<LoanPayment>,
    pub fixed_deposits: Vec<FixedDeposit>,
    pub share_prices: Vec<SharePrice>,
    pub share_transactions: Vec<ShareTransaction>,
    pub dividends: Vec<Dividend>,
    pub dividend_payments: Vec<DividendPayment>,
    /// Pending domain events. Not persisted; drained by observers.
    #[serde(skip)]
    events: Vec<LedgerEvent>,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            created_at: now,
            updated_at: now,
            members: Vec::new(),
            account_types: Vec::new(),
            accounts: Vec::new(),
            transactions: Vec::new(),
            loan_products: Vec::new(),
            loan_applications: Vec::new(),
            loans: Vec::new(),
            loan_payments: Vec::new(),
            fixed_deposits: Vec::new(),
            share_prices: Vec::new(),
            share_transactions: Vec::new(),
            dividends: Vec::new(),
            dividend_payments: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn member_mut(&mut self, id: Uuid) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.id == id)
    }

    pub fn member_by_number(&self, member_number: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.member_number == member_number)
    }

    pub fn account_type(&self, id: Uuid) -> Option<&AccountType> {
        self.account_types.iter().find(|t| t.id == id)
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn account_mut(&mut self, id: Uuid) -> Option<&mut Account> {
        self.accounts.iter_mut().find(|a| a.id == id)
    }

    pub fn account_by_number(&self, account_number: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|a| a.account_number == account_number)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn loan_product(&self, id: Uuid) -> Option<&LoanProduct> {
        self.loan_products.iter().find(|p| p.id == id)
    }

    pub fn application(&self, id: Uuid) -> Option<&LoanApplication> {
        self.loan_applications.iter().find(|a| a.id == id)
    }

    pub fn application_mut(&mut self, id: Uuid) -> Option<&mut LoanApplication> {
        self.loan_applications.iter_mut().find(|a| a.id == id)
    }

    pub fn loan(&self, id: Uuid) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    pub fn loan_mut(&mut self, id: Uuid) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|l| l.id == id)
    }

    /// The loan originated from an application, if one exists. Origination
    /// uses this as its duplicate guard.
    pub fn loan_for_application(&self, application_id: Uuid) -> Option<&Loan> {
        self.loans.iter().find(|l| l.application_id == application_id)
    }

    pub fn fixed_deposit(&self, id: Uuid) -> Option<&FixedDeposit> {
        self.fixed_deposits.iter().find(|d| d.id == id)
    }

    pub fn fixed_deposit_mut(&mut self, id: Uuid) -> Option<&mut FixedDeposit> {
        self.fixed_deposits.iter_mut().find(|d| d.id == id)
    }

    pub fn dividend(&self, id: Uuid) -> Option<&Dividend> {
        self.dividends.iter().find(|d| d.id == id)
    }

    pub fn dividend_mut(&mut self, id: Uuid) -> Option<&mut Dividend> {
        self.dividends.iter_mut().find(|d| d.id == id)
    }

    /// Accounts owned by one member.
    pub fn member_accounts(&self, member_id: Uuid) -> impl Iterator<Item = &Account> {
        self.accounts.iter().filter(move |a| a.member_id == member_id)
    }

    pub fn record_event(&mut self, event: LedgerEvent) {
        self.events.push(event);
    }

    /// Drains the pending domain events in emission order.
    pub fn take_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.events)
    }
}
