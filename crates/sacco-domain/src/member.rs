//! Cooperative member records.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::{Identifiable, NamedEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub member_number: String,
    pub name: String,
    pub status: MembershipStatus,
    pub membership_date: NaiveDate,
    pub monthly_contribution: Decimal,
    /// Share capital held, in currency units.
    pub total_shares: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        member_number: impl Into<String>,
        name: impl Into<String>,
        membership_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_number: member_number.into(),
            name: name.into(),
            status: MembershipStatus::Pending,
            membership_date,
            monthly_contribution: Decimal::ZERO,
            total_shares: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for Member {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Member {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Lifecycle state of a cooperative membership.
pub enum MembershipStatus {
    Pending,
    Active,
    Suspended,
    Terminated,
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MembershipStatus::Pending => "Pending Approval",
            MembershipStatus::Active => "Active",
            MembershipStatus::Suspended => "Suspended",
            MembershipStatus::Terminated => "Terminated",
        };
        f.write_str(label)
    }
}
