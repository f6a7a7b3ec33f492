//! Read-only aggregation over the ledger for dashboard display.

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sacco_domain::{
    ApplicationStatus, Ledger, Loan, LoanStatus, MembershipStatus, Transaction,
};
use uuid::Uuid;

use crate::CoreError;

/// Snapshot rendered on a member's dashboard.
#[derive(Debug, Clone)]
pub struct MemberDashboard {
    pub member_id: Uuid,
    pub total_savings: Decimal,
    pub share_balance: Decimal,
    /// Newest first.
    pub recent_transactions: Vec<Transaction>,
    pub active_loans: Vec<Loan>,
}

/// Headline counters for the staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchStats {
    pub total_members: usize,
    pub active_members: usize,
    pub active_loans: usize,
    /// Active loans whose next payment date has passed.
    pub overdue_loans: usize,
    pub todays_transactions: usize,
    pub pending_applications: usize,
}

/// Summarizes ledger state for the UI. Strictly read-only; nothing here is
/// part of the ledger's own contract.
pub struct SummaryService;

impl SummaryService {
    pub fn member_dashboard(
        ledger: &Ledger,
        member_id: Uuid,
        recent_limit: usize,
    ) -> Result<MemberDashboard, CoreError> {
        if ledger.member(member_id).is_none() {
            return Err(CoreError::MemberNotFound(member_id));
        }
        let savings_types = Self::savings_type_ids(ledger);
        let account_ids: HashSet<Uuid> =
            ledger.member_accounts(member_id).map(|a| a.id).collect();

        let total_savings = ledger
            .member_accounts(member_id)
            .filter(|a| savings_types.contains(&a.account_type_id))
            .map(|a| a.balance)
            .sum();

        let mut recent: Vec<&Transaction> = ledger
            .transactions
            .iter()
            .filter(|t| account_ids.contains(&t.account_id))
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_transactions = recent
            .into_iter()
            .take(recent_limit)
            .cloned()
            .collect();

        let active_loans = ledger
            .loans
            .iter()
            .filter(|l| l.member_id == member_id && l.status == LoanStatus::Active)
            .cloned()
            .collect();

        let share_balance = ledger
            .member(member_id)
            .map(|m| m.total_shares)
            .unwrap_or_default();

        Ok(MemberDashboard {
            member_id,
            total_savings,
            share_balance,
            recent_transactions,
            active_loans,
        })
    }

    pub fn branch_stats(ledger: &Ledger, today: NaiveDate) -> BranchStats {
        BranchStats {
            total_members: ledger.members.len(),
            active_members: ledger
                .members
                .iter()
                .filter(|m| m.status == MembershipStatus::Active)
                .count(),
            active_loans: ledger
                .loans
                .iter()
                .filter(|l| l.status == LoanStatus::Active)
                .count(),
            overdue_loans: ledger
                .loans
                .iter()
                .filter(|l| l.status == LoanStatus::Active && l.days_overdue(today) > 0)
                .count(),
            todays_transactions: ledger
                .transactions
                .iter()
                .filter(|t| t.created_at.date_naive() == today)
                .count(),
            pending_applications: ledger
                .loan_applications
                .iter()
                .filter(|a| {
                    matches!(
                        a.status,
                        ApplicationStatus::Pending | ApplicationStatus::UnderReview
                    )
                })
                .count(),
        }
    }

    /// Guesses which account types hold savings, matching the display
    /// heuristics of the original dashboards: exact code or name match
    /// first, then a substring match, then every type as a last resort.
    fn savings_type_ids(ledger: &Ledger) -> HashSet<Uuid> {
        let exact: HashSet<Uuid> = ledger
            .account_types
            .iter()
            .filter(|t| {
                t.code.eq_ignore_ascii_case("SAV")
                    || t.code.eq_ignore_ascii_case("SAVINGS")
                    || t.name.eq_ignore_ascii_case("savings")
                    || t.name.eq_ignore_ascii_case("savings account")
            })
            .map(|t| t.id)
            .collect();
        if !exact.is_empty() {
            return exact;
        }
        let loose: HashSet<Uuid> = ledger
            .account_types
            .iter()
            .filter(|t| {
                t.code.to_ascii_lowercase().contains("sav")
                    || t.name.to_ascii_lowercase().contains("sav")
            })
            .map(|t| t.id)
            .collect();
        if !loose.is_empty() {
            return loose;
        }
        ledger.account_types.iter().map(|t| t.id).collect()
    }
}
