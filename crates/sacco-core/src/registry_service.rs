//! Validated registration of members, accounts, products, and the loan
//! application review pipeline.

use rust_decimal::Decimal;
use sacco_domain::{
    Account, AccountType, ApplicationStatus, Ledger, LoanApplication, LoanProduct, Member,
    MembershipStatus,
};
use tracing::info;
use uuid::Uuid;

use crate::CoreError;

/// Maintains the registries the ledger services depend on. Every entry is
/// validated against its unique business number and referenced entities
/// before it is stored; nothing here moves money.
pub struct RegistryService;

impl RegistryService {
    pub fn add_member(ledger: &mut Ledger, member: Member) -> Result<(), CoreError> {
        if member.name.trim().is_empty() {
            return Err(CoreError::Validation("member name must not be empty".into()));
        }
        if ledger.member_by_number(&member.member_number).is_some() {
            return Err(CoreError::Validation(format!(
                "member number `{}` already exists",
                member.member_number
            )));
        }
        ledger.members.push(member);
        ledger.touch();
        Ok(())
    }

    pub fn activate_member(ledger: &mut Ledger, member_id: Uuid) -> Result<(), CoreError> {
        let member = ledger
            .member_mut(member_id)
            .ok_or(CoreError::MemberNotFound(member_id))?;
        member.status = MembershipStatus::Active;
        ledger.touch();
        Ok(())
    }

    pub fn add_account_type(ledger: &mut Ledger, kind: AccountType) -> Result<(), CoreError> {
        let duplicate = ledger
            .account_types
            .iter()
            .any(|t| t.code.eq_ignore_ascii_case(&kind.code));
        if duplicate {
            return Err(CoreError::Validation(format!(
                "account type code `{}` already exists",
                kind.code
            )));
        }
        ledger.account_types.push(kind);
        ledger.touch();
        Ok(())
    }

    pub fn open_account(ledger: &mut Ledger, account: Account) -> Result<(), CoreError> {
        if ledger.member(account.member_id).is_none() {
            return Err(CoreError::MemberNotFound(account.member_id));
        }
        let kind = ledger.account_type(account.account_type_id).ok_or_else(|| {
            CoreError::Validation("account references an unknown account type".into())
        })?;
        if !kind.is_active {
            return Err(CoreError::Validation(format!(
                "account type `{}` is inactive",
                kind.code
            )));
        }
        if ledger.account_by_number(&account.account_number).is_some() {
            return Err(CoreError::Validation(format!(
                "account number `{}` already exists",
                account.account_number
            )));
        }
        info!(account = %account.account_number, "opened account");
        ledger.accounts.push(account);
        ledger.touch();
        Ok(())
    }

    pub fn add_loan_product(ledger: &mut Ledger, product: LoanProduct) -> Result<(), CoreError> {
        let duplicate = ledger
            .loan_products
            .iter()
            .any(|p| p.code.eq_ignore_ascii_case(&product.code));
        if duplicate {
            return Err(CoreError::Validation(format!(
                "loan product code `{}` already exists",
                product.code
            )));
        }
        if product.minimum_amount > product.maximum_amount {
            return Err(CoreError::Validation(
                "minimum amount exceeds maximum amount".into(),
            ));
        }
        if product.minimum_period_months > product.maximum_period_months {
            return Err(CoreError::Validation(
                "minimum period exceeds maximum period".into(),
            ));
        }
        ledger.loan_products.push(product);
        ledger.touch();
        Ok(())
    }

    /// Accepts a new application after checking it against its product's
    /// amount and term ranges.
    pub fn submit_application(
        ledger: &mut Ledger,
        application: LoanApplication,
    ) -> Result<(), CoreError> {
        if ledger.member(application.member_id).is_none() {
            return Err(CoreError::MemberNotFound(application.member_id));
        }
        let product = ledger.loan_product(application.product_id).ok_or_else(|| {
            CoreError::Validation("application references an unknown loan product".into())
        })?;
        if !product.is_active {
            return Err(CoreError::Validation(format!(
                "loan product `{}` is inactive",
                product.code
            )));
        }
        if application.amount_requested <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        if application.period_months == 0 {
            return Err(CoreError::InvalidTerm(application.period_months));
        }
        if application.amount_requested < product.minimum_amount
            || application.amount_requested > product.maximum_amount
        {
            return Err(CoreError::Validation(format!(
                "requested amount is outside the `{}` product range",
                product.code
            )));
        }
        if application.period_months < product.minimum_period_months
            || application.period_months > product.maximum_period_months
        {
            return Err(CoreError::Validation(format!(
                "requested term is outside the `{}` product range",
                product.code
            )));
        }
        let duplicate = ledger
            .loan_applications
            .iter()
            .any(|a| a.application_number == application.application_number);
        if duplicate {
            return Err(CoreError::Validation(format!(
                "application number `{}` already exists",
                application.application_number
            )));
        }
        ledger.loan_applications.push(application);
        ledger.touch();
        Ok(())
    }

    pub fn start_review(
        ledger: &mut Ledger,
        application_id: Uuid,
        reviewer: Uuid,
    ) -> Result<(), CoreError> {
        Self::transition(ledger, application_id, ApplicationStatus::Pending, |app| {
            app.status = ApplicationStatus::UnderReview;
            app.reviewed_by = Some(reviewer);
        })
    }

    /// Approves an application under review, fixing the approved amount.
    pub fn approve(
        ledger: &mut Ledger,
        application_id: Uuid,
        amount_approved: Decimal,
        reviewer: Uuid,
        comments: impl Into<String>,
    ) -> Result<(), CoreError> {
        if amount_approved <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        let comments = comments.into();
        Self::transition(ledger, application_id, ApplicationStatus::UnderReview, |app| {
            app.status = ApplicationStatus::Approved;
            app.amount_approved = Some(amount_approved);
            app.reviewed_by = Some(reviewer);
            app.review_comments = comments;
        })
    }

    pub fn reject(
        ledger: &mut Ledger,
        application_id: Uuid,
        reviewer: Uuid,
        comments: impl Into<String>,
    ) -> Result<(), CoreError> {
        let comments = comments.into();
        Self::transition(ledger, application_id, ApplicationStatus::UnderReview, |app| {
            app.status = ApplicationStatus::Rejected;
            app.reviewed_by = Some(reviewer);
            app.review_comments = comments;
        })
    }

    /// Marks an approved application as disbursed, making it eligible for
    /// loan origination.
    pub fn mark_disbursed(ledger: &mut Ledger, application_id: Uuid) -> Result<(), CoreError> {
        Self::transition(ledger, application_id, ApplicationStatus::Approved, |app| {
            app.status = ApplicationStatus::Disbursed;
        })
    }

    fn transition(
        ledger: &mut Ledger,
        application_id: Uuid,
        expected: ApplicationStatus,
        update: impl FnOnce(&mut LoanApplication),
    ) -> Result<(), CoreError> {
        let application = ledger
            .application_mut(application_id)
            .ok_or(CoreError::ApplicationNotFound(application_id))?;
        if application.status != expected {
            return Err(CoreError::Validation(format!(
                "application {} is {}, expected {}",
                application.application_number, application.status, expected
            )));
        }
        update(application);
        ledger.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ledger_with_member_and_product() -> (Ledger, Uuid, Uuid) {
        let mut ledger = Ledger::new("Test Cooperative");
        let member = Member::new("M001", "Asha Odhiambo", date(2024, 1, 15));
        let member_id = member.id;
        RegistryService::add_member(&mut ledger, member).expect("member added");

        let product = LoanProduct::new(
            "Development Loan",
            "DEV",
            dec!(12),
            dec!(1000),
            dec!(50000),
            6,
            36,
        );
        let product_id = product.id;
        RegistryService::add_loan_product(&mut ledger, product).expect("product added");
        (ledger, member_id, product_id)
    }

    fn application(member_id: Uuid, product_id: Uuid) -> LoanApplication {
        LoanApplication::new("LA0001", member_id, product_id, dec!(10000), 12, date(2024, 3, 1))
    }

    #[test]
    fn member_numbers_are_unique() {
        let (mut ledger, _, _) = ledger_with_member_and_product();
        let duplicate = Member::new("M001", "Another Person", date(2024, 2, 1));
        let err = RegistryService::add_member(&mut ledger, duplicate)
            .expect_err("duplicate member number must fail");
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn account_requires_known_member_and_active_type() {
        let (mut ledger, member_id, _) = ledger_with_member_and_product();
        let mut kind = AccountType::new("Savings Account", "SAV");
        kind.is_active = false;
        let kind_id = kind.id;
        RegistryService::add_account_type(&mut ledger, kind).expect("type added");

        let account = Account::new("ACC0001", member_id, kind_id, date(2024, 2, 1));
        let err = RegistryService::open_account(&mut ledger, account)
            .expect_err("inactive type must fail");
        assert!(matches!(err, CoreError::Validation(_)));

        let orphan = Account::new("ACC0002", Uuid::new_v4(), kind_id, date(2024, 2, 1));
        let err = RegistryService::open_account(&mut ledger, orphan)
            .expect_err("unknown member must fail");
        assert!(matches!(err, CoreError::MemberNotFound(_)));
    }

    #[test]
    fn application_must_fit_the_product_ranges() {
        let (mut ledger, member_id, product_id) = ledger_with_member_and_product();

        let mut too_large = application(member_id, product_id);
        too_large.amount_requested = dec!(90000);
        let err = RegistryService::submit_application(&mut ledger, too_large)
            .expect_err("amount above maximum must fail");
        assert!(matches!(err, CoreError::Validation(_)));

        let mut too_short = application(member_id, product_id);
        too_short.period_months = 3;
        let err = RegistryService::submit_application(&mut ledger, too_short)
            .expect_err("term below minimum must fail");
        assert!(matches!(err, CoreError::Validation(_)));

        RegistryService::submit_application(&mut ledger, application(member_id, product_id))
            .expect("valid application accepted");
    }

    #[test]
    fn review_pipeline_enforces_status_order() {
        let (mut ledger, member_id, product_id) = ledger_with_member_and_product();
        let app = application(member_id, product_id);
        let app_id = app.id;
        RegistryService::submit_application(&mut ledger, app).expect("submitted");
        let reviewer = Uuid::new_v4();

        // Cannot approve straight from pending.
        let err = RegistryService::approve(&mut ledger, app_id, dec!(8000), reviewer, "")
            .expect_err("approval without review must fail");
        assert!(matches!(err, CoreError::Validation(_)));

        RegistryService::start_review(&mut ledger, app_id, reviewer).expect("review started");
        RegistryService::approve(&mut ledger, app_id, dec!(8000), reviewer, "Within limits")
            .expect("approved");
        RegistryService::mark_disbursed(&mut ledger, app_id).expect("disbursed");

        let stored = ledger.application(app_id).unwrap();
        assert_eq!(stored.status, ApplicationStatus::Disbursed);
        assert_eq!(stored.amount_approved, Some(dec!(8000)));
        assert_eq!(stored.reviewed_by, Some(reviewer));
    }
}
