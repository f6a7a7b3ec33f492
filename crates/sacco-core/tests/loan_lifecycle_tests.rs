use chrono::NaiveDate;
use rust_decimal_macros::dec;
use sacco_core::{
    FixedClock, LoanService, RecordTransaction, RegistryService, SummaryService,
    TransactionService,
};
use sacco_domain::{
    Account, AccountType, ApplicationStatus, Ledger, LoanApplication, LoanProduct, LoanStatus,
    Member, TransactionKind,
};
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn full_loan_lifecycle_from_application_to_completion() {
    let mut ledger = Ledger::new("Umoja Cooperative");
    let clock = FixedClock::at_midnight(date(2024, 6, 1));

    let member = Member::new("M001", "Asha Odhiambo", date(2024, 1, 15));
    let member_id = member.id;
    RegistryService::add_member(&mut ledger, member).expect("member added");
    RegistryService::activate_member(&mut ledger, member_id).expect("member activated");

    let kind = AccountType::new("Savings Account", "SAV");
    let kind_id = kind.id;
    RegistryService::add_account_type(&mut ledger, kind).expect("type added");

    let account = Account::new("ACC0001", member_id, kind_id, date(2024, 1, 20));
    let account_id = account.id;
    RegistryService::open_account(&mut ledger, account).expect("account opened");

    // Seed the account so installments can be collected from it.
    TransactionService::record(
        &mut ledger,
        RecordTransaction {
            account_id,
            kind: TransactionKind::Deposit,
            amount: dec!(5000),
            description: "Initial deposit".into(),
            reference: String::new(),
            destination_account_id: None,
            processed_by: None,
        },
        &clock,
    )
    .expect("deposit recorded");

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

    let application = LoanApplication::new(
        "LA0001",
        member_id,
        product_id,
        dec!(10000),
        12,
        date(2024, 3, 1),
    );
    let application_id = application.id;
    RegistryService::submit_application(&mut ledger, application).expect("submitted");

    let reviewer = Uuid::new_v4();
    RegistryService::start_review(&mut ledger, application_id, reviewer).expect("under review");
    RegistryService::approve(&mut ledger, application_id, dec!(8000), reviewer, "Within limits")
        .expect("approved");
    RegistryService::mark_disbursed(&mut ledger, application_id).expect("disbursed");
    assert_eq!(
        ledger.application(application_id).unwrap().status,
        ApplicationStatus::Disbursed
    );

    let loan = LoanService::originate(&mut ledger, application_id).expect("originated");
    assert_eq!(loan.principal_amount, dec!(8000), "approved amount wins");
    assert_eq!(loan.total_payable, dec!(8960), "8000 + 8000*0.12*12/12");
    assert_eq!(loan.monthly_payment, dec!(746.67));

    LoanService::disburse(&mut ledger, loan.id, account_id, &clock).expect("credited");
    assert_eq!(ledger.account(account_id).unwrap().balance, dec!(13000));

    // Pay installments until the balance lands on zero.
    let mut installments = 0;
    while ledger.loan(loan.id).unwrap().status == LoanStatus::Active {
        LoanService::apply_payment(&mut ledger, loan.id, account_id, dec!(746.67), None, &clock)
            .expect("installment applied");
        installments += 1;
        assert!(installments <= 12, "term must not be exceeded");
    }

    let settled = ledger.loan(loan.id).unwrap();
    assert_eq!(settled.status, LoanStatus::Completed);
    assert_eq!(settled.balance, dec!(0.00));
    assert_eq!(settled.amount_paid, dec!(8960.00));
    assert_eq!(installments, 12);
    assert_eq!(ledger.loan_payments.len(), 12);

    // Every payment row has a matching account transaction.
    for payment in &ledger.loan_payments {
        let row = ledger
            .transaction(payment.transaction_id)
            .expect("linked transaction");
        assert_eq!(row.kind, TransactionKind::LoanRepayment);
        assert_eq!(row.amount, payment.amount);
    }

    // 5000 deposit + 8000 disbursed - 8960 repaid.
    assert_eq!(ledger.account(account_id).unwrap().balance, dec!(4040.00));

    let dashboard =
        SummaryService::member_dashboard(&ledger, member_id, 5).expect("dashboard renders");
    assert!(dashboard.active_loans.is_empty(), "loan is completed");
    assert_eq!(dashboard.total_savings, dec!(4040.00));

    let stats = SummaryService::branch_stats(&ledger, clock.0.date_naive());
    assert_eq!(stats.total_members, 1);
    assert_eq!(stats.active_loans, 0);
    assert_eq!(stats.pending_applications, 0);
}

#[test]
fn transfer_moves_funds_between_member_accounts_in_one_row() {
    let mut ledger = Ledger::new("Umoja Cooperative");
    let clock = FixedClock::at_midnight(date(2024, 6, 1));

    let member = Member::new("M001", "Asha Odhiambo", date(2024, 1, 15));
    let member_id = member.id;
    RegistryService::add_member(&mut ledger, member).expect("member added");
    let kind = AccountType::new("Savings Account", "SAV");
    let kind_id = kind.id;
    RegistryService::add_account_type(&mut ledger, kind).expect("type added");

    let mut source = Account::new("ACC0001", member_id, kind_id, date(2024, 1, 20));
    source.balance = dec!(1000);
    source.available_balance = dec!(1000);
    let source_id = source.id;
    RegistryService::open_account(&mut ledger, source).expect("source opened");

    let destination = Account::new("ACC0002", member_id, kind_id, date(2024, 1, 21));
    let destination_id = destination.id;
    RegistryService::open_account(&mut ledger, destination).expect("destination opened");

    let row = TransactionService::record(
        &mut ledger,
        RecordTransaction {
            account_id: source_id,
            kind: TransactionKind::Transfer,
            amount: dec!(250),
            description: "Move to holiday fund".into(),
            reference: String::new(),
            destination_account_id: Some(destination_id),
            processed_by: None,
        },
        &clock,
    )
    .expect("transfer recorded");

    assert_eq!(ledger.transactions.len(), 1, "a transfer is a single row");
    assert_eq!(row.destination_account_id, Some(destination_id));
    assert_eq!(ledger.account(source_id).unwrap().balance, dec!(750));
    assert_eq!(ledger.account(destination_id).unwrap().balance, dec!(250));
}
