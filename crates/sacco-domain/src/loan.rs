//! Loan products, applications, active loans, and payment records.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Identifiable, NamedEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Static pricing template for a class of loans.
pub struct LoanProduct {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: String,
    /// Annual percentage, simple interest.
    pub interest_rate: Decimal,
    pub minimum_amount: Decimal,
    pub maximum_amount: Decimal,
    pub minimum_period_months: u32,
    pub maximum_period_months: u32,
    pub collateral_required: bool,
    pub guarantors_required: u32,
    pub is_active: bool,
}

impl LoanProduct {
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        interest_rate: Decimal,
        minimum_amount: Decimal,
        maximum_amount: Decimal,
        minimum_period_months: u32,
        maximum_period_months: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            description: String::new(),
            interest_rate,
            minimum_amount,
            maximum_amount,
            minimum_period_months,
            maximum_period_months,
            collateral_required: false,
            guarantors_required: 2,
            is_active: true,
        }
    }
}

impl Identifiable for LoanProduct {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for LoanProduct {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Review pipeline of an application:
/// pending → under_review → approved | rejected, approved → disbursed.
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    Disbursed,
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApplicationStatus::Pending => "Pending Review",
            ApplicationStatus::UnderReview => "Under Review",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Disbursed => "Disbursed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: Uuid,
    pub application_number: String,
    pub member_id: Uuid,
    pub product_id: Uuid,
    pub amount_requested: Decimal,
    /// Set only when the application is approved.
    pub amount_approved: Option<Decimal>,
    pub period_months: u32,
    pub purpose: String,
    pub status: ApplicationStatus,
    pub application_date: NaiveDate,
    pub reviewed_by: Option<Uuid>,
    pub review_comments: String,
    pub created_at: DateTime<Utc>,
}

impl LoanApplication {
    pub fn new(
        application_number: impl Into<String>,
        member_id: Uuid,
        product_id: Uuid,
        amount_requested: Decimal,
        period_months: u32,
        application_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            application_number: application_number.into(),
            member_id,
            product_id,
            amount_requested,
            amount_approved: None,
            period_months,
            purpose: String::new(),
            status: ApplicationStatus::Pending,
            application_date,
            reviewed_by: None,
            review_comments: String::new(),
            created_at: Utc::now(),
        }
    }

    /// Principal a loan created from this application carries: the approved
    /// amount when one was set, the requested amount otherwise.
    pub fn principal(&self) -> Decimal {
        self.amount_approved.unwrap_or(self.amount_requested)
    }
}

impl Identifiable for LoanApplication {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Completed,
    Defaulted,
    WrittenOff,
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanStatus::Active => "Active",
            LoanStatus::Completed => "Completed",
            LoanStatus::Defaulted => "Defaulted",
            LoanStatus::WrittenOff => "Written Off",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// An amortizing loan. At creation `total_payable = principal + simple
/// interest`, `balance = total_payable` and `amount_paid = 0`.
pub struct Loan {
    pub id: Uuid,
    pub loan_number: String,
    pub application_id: Uuid,
    pub member_id: Uuid,
    pub product_id: Uuid,
    pub principal_amount: Decimal,
    /// Annual percentage, fixed for the life of the loan.
    pub interest_rate: Decimal,
    pub period_months: u32,
    pub monthly_payment: Decimal,
    pub total_payable: Decimal,
    pub amount_paid: Decimal,
    pub balance: Decimal,
    pub status: LoanStatus,
    pub disbursement_date: NaiveDate,
    pub maturity_date: NaiveDate,
    pub next_payment_date: NaiveDate,
    /// The ledger row that credited the principal. Set once; a loan is
    /// disbursed at most one time.
    pub disbursement_transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// Days past the scheduled payment date, zero when current.
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.next_payment_date < today {
            (today - self.next_payment_date).num_days()
        } else {
            0
        }
    }
}

impl Identifiable for Loan {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Record of one payment against a loan, linked 1:1 to the ledger row that
/// debited the member's account.
pub struct LoanPayment {
    pub id: Uuid,
    pub loan_id: Uuid,
    pub amount: Decimal,
    pub principal_amount: Decimal,
    pub interest_amount: Decimal,
    pub penalty_amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub payment_date: NaiveDate,
    pub processed_by: Option<Uuid>,
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for LoanPayment {
    fn id(&self) -> Uuid {
        self.id
    }
}
