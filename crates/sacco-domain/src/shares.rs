//! Share capital: pricing history, share movements, dividend declarations.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePrice {
    pub id: Uuid,
    pub price_per_share: Decimal,
    pub effective_date: NaiveDate,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
}

impl SharePrice {
    pub fn new(price_per_share: Decimal, effective_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            price_per_share,
            effective_date,
            is_current: true,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for SharePrice {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShareTransactionKind {
    Purchase,
    Sale,
    Dividend,
}

impl fmt::Display for ShareTransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ShareTransactionKind::Purchase => "Purchase",
            ShareTransactionKind::Sale => "Sale",
            ShareTransactionKind::Dividend => "Dividend Payment",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One share movement for a member, linked to the ledger row that moved the
/// money.
pub struct ShareTransaction {
    pub id: Uuid,
    pub member_id: Uuid,
    pub kind: ShareTransactionKind,
    pub number_of_shares: Decimal,
    pub price_per_share: Decimal,
    pub total_amount: Decimal,
    pub transaction_date: NaiveDate,
    pub processed_by: Option<Uuid>,
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for ShareTransaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Annual dividend declaration. One per year.
pub struct Dividend {
    pub id: Uuid,
    pub year: i32,
    pub rate_percentage: Decimal,
    pub total_amount: Decimal,
    pub declaration_date: NaiveDate,
    pub payment_date: NaiveDate,
    pub is_paid: bool,
    pub declared_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for Dividend {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// One member's payout under a declared dividend.
pub struct DividendPayment {
    pub id: Uuid,
    pub dividend_id: Uuid,
    pub member_id: Uuid,
    pub shares_held: Decimal,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for DividendPayment {
    fn id(&self) -> Uuid {
        self.id
    }
}
