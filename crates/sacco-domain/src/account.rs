//! Account types and member accounts.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Identifiable, NamedEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Pricing template for a class of accounts (savings, current, shares...).
pub struct AccountType {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: String,
    pub minimum_balance: Decimal,
    /// Annual percentage.
    pub interest_rate: Decimal,
    pub monthly_fee: Decimal,
    pub is_active: bool,
}

impl AccountType {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code: code.into(),
            description: String::new(),
            minimum_balance: Decimal::ZERO,
            interest_rate: Decimal::ZERO,
            monthly_fee: Decimal::ZERO,
            is_active: true,
        }
    }
}

impl Identifiable for AccountType {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for AccountType {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub account_number: String,
    pub member_id: Uuid,
    pub account_type_id: Uuid,
    pub balance: Decimal,
    pub available_balance: Decimal,
    pub status: AccountStatus,
    pub date_opened: NaiveDate,
    pub last_transaction_date: Option<DateTime<Utc>>,
    pub interest_earned: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        account_number: impl Into<String>,
        member_id: Uuid,
        account_type_id: Uuid,
        date_opened: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_number: account_number.into(),
            member_id,
            account_type_id,
            balance: Decimal::ZERO,
            available_balance: Decimal::ZERO,
            status: AccountStatus::Active,
            date_opened,
            last_transaction_date: None,
            interest_earned: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for Account {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Lifecycle state of an account. Only `Active` accounts accept mutations.
pub enum AccountStatus {
    Active,
    Dormant,
    Closed,
    Frozen,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccountStatus::Active => "Active",
            AccountStatus::Dormant => "Dormant",
            AccountStatus::Closed => "Closed",
            AccountStatus::Frozen => "Frozen",
        };
        f.write_str(label)
    }
}
