//! Loan origination, disbursement, and payment processing.

use chrono::Duration;
use rust_decimal::Decimal;
use sacco_domain::{
    add_cycles, round_to_cents, ApplicationStatus, Ledger, LedgerEvent, Loan, LoanPayment,
    LoanStatus, Transaction, TransactionKind, CYCLE_DAYS,
};
use tracing::info;
use uuid::Uuid;

use crate::{Clock, CoreError, RecordTransaction, TransactionService};

/// Share of every installment booked against principal; the remainder is
/// booked as interest. Fixed ratio carried over from the source system
/// rather than a reducing-balance recalculation.
const PRINCIPAL_RATIO: Decimal = Decimal::from_parts(8, 0, 0, false, 1);
const INTEREST_RATIO: Decimal = Decimal::from_parts(2, 0, 0, false, 1);

/// Turns disbursed applications into amortization plans and applies
/// payments against them.
pub struct LoanService;

impl LoanService {
    /// Creates the Loan for a disbursed application.
    ///
    /// Simple, non-compounding interest over the whole term:
    /// `interest = principal * rate/100 * months/12`. Installments are the
    /// total divided evenly across the term, rounded to cents half-to-even.
    /// Maturity and the first due date use 30-day cycles, not calendar
    /// months.
    pub fn originate(ledger: &mut Ledger, application_id: Uuid) -> Result<Loan, CoreError> {
        let application = ledger
            .application(application_id)
            .ok_or(CoreError::ApplicationNotFound(application_id))?;
        if application.status != ApplicationStatus::Disbursed {
            return Err(CoreError::ApplicationNotDisbursed(
                application.application_number.clone(),
            ));
        }
        if let Some(existing) = ledger.loan_for_application(application_id) {
            return Err(CoreError::DuplicateLoan(existing.loan_number.clone()));
        }

        let months = application.period_months;
        if months == 0 {
            return Err(CoreError::InvalidTerm(months));
        }
        let principal = application.principal();
        if principal <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        let product = ledger
            .loan_product(application.product_id)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "application {} references an unknown loan product",
                    application.application_number
                ))
            })?;

        let rate = product.interest_rate;
        let interest =
            principal * rate / Decimal::ONE_HUNDRED * Decimal::from(months) / Decimal::from(12);
        let total_payable = principal + interest;
        let monthly_payment = round_to_cents(total_payable / Decimal::from(months));

        let disbursement_date = application.application_date;
        let id = Uuid::new_v4();
        let loan = Loan {
            id,
            loan_number: format!("LN{}", &id.simple().to_string()[..8].to_uppercase()),
            application_id,
            member_id: application.member_id,
            product_id: application.product_id,
            principal_amount: principal,
            interest_rate: rate,
            period_months: months,
            monthly_payment,
            total_payable,
            amount_paid: Decimal::ZERO,
            balance: total_payable,
            status: LoanStatus::Active,
            disbursement_date,
            maturity_date: add_cycles(disbursement_date, months),
            next_payment_date: add_cycles(disbursement_date, 1),
            disbursement_transaction_id: None,
            created_at: chrono::Utc::now(),
        };
        info!(
            loan = %loan.loan_number,
            principal = %principal,
            total = %total_payable,
            months,
            "originated loan"
        );
        ledger.record_event(LedgerEvent::LoanOriginated {
            loan_id: loan.id,
            application_id,
        });
        ledger.loans.push(loan.clone());
        ledger.touch();
        Ok(loan)
    }

    /// Credits the loan principal to the member's account as a
    /// `loan_disbursement` row. A loan is disbursed at most once; the
    /// crediting row is remembered on the loan.
    pub fn disburse(
        ledger: &mut Ledger,
        loan_id: Uuid,
        account_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Transaction, CoreError> {
        let loan = ledger.loan(loan_id).ok_or(CoreError::LoanNotFound(loan_id))?;
        if loan.status != LoanStatus::Active {
            return Err(CoreError::LoanNotActive(loan.loan_number.clone()));
        }
        if loan.disbursement_transaction_id.is_some() {
            return Err(CoreError::Validation(format!(
                "loan {} has already been disbursed",
                loan.loan_number
            )));
        }
        let amount = loan.principal_amount;
        let loan_number = loan.loan_number.clone();

        let transaction = TransactionService::record(
            ledger,
            RecordTransaction {
                account_id,
                kind: TransactionKind::LoanDisbursement,
                amount,
                description: format!("Disbursement of loan {loan_number}"),
                reference: loan_number,
                destination_account_id: None,
                processed_by: None,
            },
            clock,
        )?;
        let loan = ledger
            .loan_mut(loan_id)
            .ok_or(CoreError::LoanNotFound(loan_id))?;
        loan.disbursement_transaction_id = Some(transaction.id);
        ledger.record_event(LedgerEvent::LoanDisbursed {
            loan_id,
            account_id,
            amount,
        });
        ledger.touch();
        Ok(transaction)
    }

    /// Applies one installment against an active loan.
    ///
    /// The regular installment splits 80/20 into principal/interest, each
    /// rounded to cents. When that total would overshoot the remaining
    /// balance, the split is taken on the balance instead so the final
    /// payment lands exactly on zero. Any positive `gross_amount` is
    /// accepted; the amount actually collected is the computed installment.
    pub fn apply_payment(
        ledger: &mut Ledger,
        loan_id: Uuid,
        funding_account_id: Uuid,
        gross_amount: Decimal,
        processed_by: Option<Uuid>,
        clock: &dyn Clock,
    ) -> Result<LoanPayment, CoreError> {
        let loan = ledger.loan(loan_id).ok_or(CoreError::LoanNotFound(loan_id))?;
        if loan.status != LoanStatus::Active || loan.balance <= Decimal::ZERO {
            return Err(CoreError::LoanNotActive(loan.loan_number.clone()));
        }
        if gross_amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }

        let balance_before = loan.balance;
        let loan_number = loan.loan_number.clone();
        let mut principal = round_to_cents(loan.monthly_payment * PRINCIPAL_RATIO);
        let mut interest = round_to_cents(loan.monthly_payment * INTEREST_RATIO);
        if principal + interest > balance_before {
            principal = round_to_cents(balance_before * PRINCIPAL_RATIO);
            interest = round_to_cents(balance_before * INTEREST_RATIO);
        }
        let total = principal + interest;
        let balance_after = balance_before - total;

        let payment_id = Uuid::new_v4();
        let transaction = TransactionService::record(
            ledger,
            RecordTransaction {
                account_id: funding_account_id,
                kind: TransactionKind::LoanRepayment,
                amount: total,
                description: format!("Loan payment for {loan_number}"),
                reference: format!(
                    "LOANPAY{}",
                    &payment_id.simple().to_string()[..6].to_uppercase()
                ),
                destination_account_id: None,
                processed_by,
            },
            clock,
        )?;

        let payment = LoanPayment {
            id: payment_id,
            loan_id,
            amount: total,
            principal_amount: principal,
            interest_amount: interest,
            penalty_amount: Decimal::ZERO,
            balance_before,
            balance_after,
            payment_date: clock.today(),
            processed_by,
            transaction_id: transaction.id,
            created_at: clock.now(),
        };

        let loan = ledger
            .loan_mut(loan_id)
            .ok_or(CoreError::LoanNotFound(loan_id))?;
        loan.amount_paid += total;
        loan.balance = balance_after;
        loan.next_payment_date += Duration::days(CYCLE_DAYS);
        let completed = balance_after <= Decimal::ZERO;
        if completed {
            loan.status = LoanStatus::Completed;
        }
        info!(
            loan = %loan_number,
            principal = %principal,
            interest = %interest,
            remaining = %balance_after,
            completed,
            "applied loan payment"
        );
        ledger.record_event(LedgerEvent::LoanPaymentApplied {
            loan_id,
            payment_id,
            amount: total,
        });
        if completed {
            ledger.record_event(LedgerEvent::LoanCompleted { loan_id });
        }
        ledger.loan_payments.push(payment.clone());
        ledger.touch();
        Ok(payment)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sacco_domain::{
        Account, ApplicationStatus, LoanApplication, LoanProduct, Member,
    };

    use super::*;
    use crate::FixedClock;

    struct Fixture {
        ledger: Ledger,
        application_id: Uuid,
        account_id: Uuid,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::at_midnight(date(2024, 6, 1))
    }

    /// A disbursed application for 10 000 at 12% over `months` months, plus
    /// a funded member account to pay from.
    fn fixture(months: u32) -> Fixture {
        let mut ledger = Ledger::new("Test Cooperative");
        let member = Member::new("M001", "Asha Odhiambo", date(2024, 1, 15));
        let member_id = member.id;
        ledger.members.push(member);

        let product = LoanProduct::new(
            "Development Loan",
            "DEV",
            dec!(12),
            dec!(1000),
            dec!(50000),
            1,
            36,
        );
        let product_id = product.id;
        ledger.loan_products.push(product);

        let mut application = LoanApplication::new(
            "LA0001",
            member_id,
            product_id,
            dec!(10000),
            months,
            date(2024, 3, 1),
        );
        application.status = ApplicationStatus::Disbursed;
        let application_id = application.id;
        ledger.loan_applications.push(application);

        let mut account = Account::new("ACC0001", member_id, Uuid::new_v4(), date(2024, 1, 20));
        account.balance = dec!(20000);
        account.available_balance = dec!(20000);
        let account_id = account.id;
        ledger.accounts.push(account);

        Fixture {
            ledger,
            application_id,
            account_id,
        }
    }

    #[test]
    fn origination_derives_the_amortization_plan() {
        let mut f = fixture(12);
        let loan = LoanService::originate(&mut f.ledger, f.application_id)
            .expect("origination succeeds");

        assert_eq!(loan.principal_amount, dec!(10000));
        assert_eq!(loan.total_payable, dec!(11200), "10000 + 10000*0.12*12/12");
        assert_eq!(loan.monthly_payment, dec!(933.33));
        assert_eq!(loan.balance, dec!(11200));
        assert_eq!(loan.amount_paid, Decimal::ZERO);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.disbursement_date, date(2024, 3, 1));
        assert_eq!(loan.maturity_date, date(2024, 3, 1) + Duration::days(360));
        assert_eq!(loan.next_payment_date, date(2024, 3, 31));
    }

    #[test]
    fn origination_requires_a_positive_term() {
        let mut f = fixture(0);
        let err = LoanService::originate(&mut f.ledger, f.application_id)
            .expect_err("zero term must fail");
        assert!(matches!(err, CoreError::InvalidTerm(0)));
    }

    #[test]
    fn origination_rejects_non_positive_principal() {
        let mut f = fixture(12);
        f.ledger
            .application_mut(f.application_id)
            .unwrap()
            .amount_approved = Some(Decimal::ZERO);
        let err = LoanService::originate(&mut f.ledger, f.application_id)
            .expect_err("zero principal must fail");
        assert!(matches!(err, CoreError::InvalidAmount));
    }

    #[test]
    fn origination_requires_a_disbursed_application() {
        let mut f = fixture(12);
        f.ledger.application_mut(f.application_id).unwrap().status =
            ApplicationStatus::Approved;
        let err = LoanService::originate(&mut f.ledger, f.application_id)
            .expect_err("approved-but-not-disbursed must fail");
        assert!(matches!(err, CoreError::ApplicationNotDisbursed(_)));
    }

    #[test]
    fn origination_is_idempotent_per_application() {
        let mut f = fixture(12);
        LoanService::originate(&mut f.ledger, f.application_id).expect("first succeeds");
        let err = LoanService::originate(&mut f.ledger, f.application_id)
            .expect_err("second must fail");
        assert!(matches!(err, CoreError::DuplicateLoan(_)));
        assert_eq!(f.ledger.loans.len(), 1, "never two loans for one application");
    }

    #[test]
    fn disbursement_credits_the_member_account() {
        let mut f = fixture(12);
        let loan = LoanService::originate(&mut f.ledger, f.application_id).unwrap();
        let row = LoanService::disburse(&mut f.ledger, loan.id, f.account_id, &clock())
            .expect("disbursement succeeds");
        assert_eq!(row.kind, TransactionKind::LoanDisbursement);
        assert_eq!(row.amount, dec!(10000));
        assert_eq!(f.ledger.account(f.account_id).unwrap().balance, dec!(30000));
    }

    #[test]
    fn disbursement_happens_at_most_once() {
        let mut f = fixture(12);
        let loan = LoanService::originate(&mut f.ledger, f.application_id).unwrap();
        let row = LoanService::disburse(&mut f.ledger, loan.id, f.account_id, &clock())
            .expect("first disbursement succeeds");
        assert_eq!(
            f.ledger.loan(loan.id).unwrap().disbursement_transaction_id,
            Some(row.id)
        );

        let err = LoanService::disburse(&mut f.ledger, loan.id, f.account_id, &clock())
            .expect_err("second disbursement must fail");
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(
            f.ledger.account(f.account_id).unwrap().balance,
            dec!(30000),
            "principal credited exactly once"
        );
        assert_eq!(f.ledger.transactions.len(), 1);
    }

    #[test]
    fn regular_payment_splits_eighty_twenty() {
        let mut f = fixture(12);
        let loan = LoanService::originate(&mut f.ledger, f.application_id).unwrap();
        // Round numbers make the split obvious.
        {
            let loan = f.ledger.loan_mut(loan.id).unwrap();
            loan.monthly_payment = dec!(100);
            loan.balance = dec!(1000);
            loan.total_payable = dec!(1000);
        }

        let payment = LoanService::apply_payment(
            &mut f.ledger,
            loan.id,
            f.account_id,
            dec!(100),
            None,
            &clock(),
        )
        .expect("payment succeeds");

        assert_eq!(payment.principal_amount, dec!(80.00));
        assert_eq!(payment.interest_amount, dec!(20.00));
        assert_eq!(payment.penalty_amount, Decimal::ZERO);
        assert_eq!(payment.amount, dec!(100.00));
        assert_eq!(payment.balance_before, dec!(1000));
        assert_eq!(payment.balance_after, dec!(900.00));

        let stored = f.ledger.loan(loan.id).unwrap();
        assert_eq!(stored.balance, dec!(900.00));
        assert_eq!(stored.amount_paid, dec!(100.00));
        assert_eq!(stored.status, LoanStatus::Active);
        assert_eq!(
            stored.next_payment_date,
            loan.next_payment_date + Duration::days(30)
        );

        let row = f.ledger.transaction(payment.transaction_id).expect("linked row");
        assert_eq!(row.kind, TransactionKind::LoanRepayment);
        assert_eq!(row.amount, dec!(100.00));
    }

    #[test]
    fn final_payment_truncates_to_remaining_balance() {
        let mut f = fixture(12);
        let loan = LoanService::originate(&mut f.ledger, f.application_id).unwrap();
        {
            let loan = f.ledger.loan_mut(loan.id).unwrap();
            loan.monthly_payment = dec!(100);
            loan.balance = dec!(50);
        }

        let payment = LoanService::apply_payment(
            &mut f.ledger,
            loan.id,
            f.account_id,
            dec!(100),
            None,
            &clock(),
        )
        .expect("final payment succeeds");

        assert_eq!(payment.principal_amount, dec!(40.00));
        assert_eq!(payment.interest_amount, dec!(10.00));
        assert_eq!(payment.amount, dec!(50.00));
        assert_eq!(payment.balance_after, dec!(0.00));
        let stored = f.ledger.loan(loan.id).unwrap();
        assert_eq!(stored.status, LoanStatus::Completed);
        assert!(f
            .ledger
            .take_events()
            .contains(&LedgerEvent::LoanCompleted { loan_id: loan.id }));
    }

    #[test]
    fn payment_against_completed_loan_fails() {
        let mut f = fixture(12);
        let loan = LoanService::originate(&mut f.ledger, f.application_id).unwrap();
        f.ledger.loan_mut(loan.id).unwrap().status = LoanStatus::Completed;
        let err = LoanService::apply_payment(
            &mut f.ledger,
            loan.id,
            f.account_id,
            dec!(100),
            None,
            &clock(),
        )
        .expect_err("completed loan must reject payment");
        assert!(matches!(err, CoreError::LoanNotActive(_)));
    }

    #[test]
    fn payment_rejects_non_positive_gross_amount() {
        let mut f = fixture(12);
        let loan = LoanService::originate(&mut f.ledger, f.application_id).unwrap();
        let err = LoanService::apply_payment(
            &mut f.ledger,
            loan.id,
            f.account_id,
            Decimal::ZERO,
            None,
            &clock(),
        )
        .expect_err("zero payment must fail");
        assert!(matches!(err, CoreError::InvalidAmount));
    }

    #[test]
    fn payment_fails_when_the_funding_account_cannot_cover_it() {
        let mut f = fixture(12);
        let loan = LoanService::originate(&mut f.ledger, f.application_id).unwrap();
        {
            let account = f.ledger.account_mut(f.account_id).unwrap();
            account.balance = dec!(10);
            account.available_balance = dec!(10);
        }
        let err = LoanService::apply_payment(
            &mut f.ledger,
            loan.id,
            f.account_id,
            dec!(100),
            None,
            &clock(),
        )
        .expect_err("uncovered payment must fail");
        assert!(matches!(err, CoreError::InsufficientFunds(_)));
        let stored = f.ledger.loan(loan.id).unwrap();
        assert_eq!(stored.balance, stored.total_payable, "loan untouched on failure");
        assert!(f.ledger.loan_payments.is_empty());
    }
}
