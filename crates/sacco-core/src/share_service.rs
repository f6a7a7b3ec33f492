//! Share capital purchases and dividend declarations/payouts.

use rust_decimal::Decimal;
use sacco_domain::{
    round_to_cents, Dividend, DividendPayment, Ledger, LedgerEvent, SharePrice, ShareTransaction,
    ShareTransactionKind, TransactionKind,
};
use tracing::info;
use uuid::Uuid;

use crate::{Clock, CoreError, RecordTransaction, TransactionService};

/// Moves share capital: price setting, purchases funded from a member
/// account, and per-member dividend payouts.
pub struct ShareService;

impl ShareService {
    /// Publishes a new share price and retires the previous current one.
    pub fn set_price(
        ledger: &mut Ledger,
        price_per_share: Decimal,
        effective_date: chrono::NaiveDate,
    ) -> Result<(), CoreError> {
        if price_per_share <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        for price in &mut ledger.share_prices {
            price.is_current = false;
        }
        ledger
            .share_prices
            .push(SharePrice::new(price_per_share, effective_date));
        ledger.touch();
        Ok(())
    }

    /// The price in force: the row flagged current, falling back to the
    /// latest by effective date.
    pub fn current_price(ledger: &Ledger) -> Option<&SharePrice> {
        ledger
            .share_prices
            .iter()
            .find(|p| p.is_current)
            .or_else(|| ledger.share_prices.iter().max_by_key(|p| p.effective_date))
    }

    /// Buys shares for a member, debiting the funding account and growing
    /// `member.total_shares`.
    pub fn purchase(
        ledger: &mut Ledger,
        member_id: Uuid,
        funding_account_id: Uuid,
        number_of_shares: Decimal,
        processed_by: Option<Uuid>,
        clock: &dyn Clock,
    ) -> Result<ShareTransaction, CoreError> {
        if number_of_shares <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        if ledger.member(member_id).is_none() {
            return Err(CoreError::MemberNotFound(member_id));
        }
        let price = Self::current_price(ledger)
            .ok_or_else(|| CoreError::Validation("no share price has been set".into()))?;
        let price_per_share = price.price_per_share;
        let total_amount = round_to_cents(number_of_shares * price_per_share);

        let transaction = TransactionService::record(
            ledger,
            RecordTransaction {
                account_id: funding_account_id,
                kind: TransactionKind::SharePurchase,
                amount: total_amount,
                description: format!("Purchase of {number_of_shares} shares"),
                reference: String::new(),
                destination_account_id: None,
                processed_by,
            },
            clock,
        )?;

        let member = ledger
            .member_mut(member_id)
            .ok_or(CoreError::MemberNotFound(member_id))?;
        member.total_shares += number_of_shares;

        let share_transaction = ShareTransaction {
            id: Uuid::new_v4(),
            member_id,
            kind: ShareTransactionKind::Purchase,
            number_of_shares,
            price_per_share,
            total_amount,
            transaction_date: clock.today(),
            processed_by,
            transaction_id: transaction.id,
            created_at: clock.now(),
        };
        info!(member = %member_id, shares = %number_of_shares, "purchased shares");
        ledger.record_event(LedgerEvent::SharesPurchased {
            member_id,
            number_of_shares,
        });
        ledger.share_transactions.push(share_transaction.clone());
        ledger.touch();
        Ok(share_transaction)
    }

    /// Declares the dividend for a year. The projected total is the declared
    /// rate applied to all share capital currently held.
    pub fn declare_dividend(
        ledger: &mut Ledger,
        year: i32,
        rate_percentage: Decimal,
        declaration_date: chrono::NaiveDate,
        payment_date: chrono::NaiveDate,
        declared_by: Option<Uuid>,
        clock: &dyn Clock,
    ) -> Result<Dividend, CoreError> {
        if rate_percentage <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount);
        }
        if ledger.dividends.iter().any(|d| d.year == year) {
            return Err(CoreError::Validation(format!(
                "a dividend for {year} has already been declared"
            )));
        }
        let shares_outstanding: Decimal = ledger.members.iter().map(|m| m.total_shares).sum();
        let dividend = Dividend {
            id: Uuid::new_v4(),
            year,
            rate_percentage,
            total_amount: round_to_cents(
                shares_outstanding * rate_percentage / Decimal::ONE_HUNDRED,
            ),
            declaration_date,
            payment_date,
            is_paid: false,
            declared_by,
            created_at: clock.now(),
        };
        ledger.dividends.push(dividend.clone());
        ledger.touch();
        Ok(dividend)
    }

    /// Pays one member their share of a declared dividend, crediting the
    /// target account. A member is paid at most once per declaration.
    pub fn pay_dividend(
        ledger: &mut Ledger,
        dividend_id: Uuid,
        member_id: Uuid,
        account_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<DividendPayment, CoreError> {
        let dividend = ledger
            .dividend(dividend_id)
            .ok_or_else(|| CoreError::Validation("dividend not found".into()))?;
        let rate = dividend.rate_percentage;
        let year = dividend.year;
        let already_paid = ledger
            .dividend_payments
            .iter()
            .any(|p| p.dividend_id == dividend_id && p.member_id == member_id);
        if already_paid {
            return Err(CoreError::Validation(
                "member has already been paid this dividend".into(),
            ));
        }
        let member = ledger
            .member(member_id)
            .ok_or(CoreError::MemberNotFound(member_id))?;
        let shares_held = member.total_shares;
        let amount = round_to_cents(shares_held * rate / Decimal::ONE_HUNDRED);
        if amount <= Decimal::ZERO {
            return Err(CoreError::Validation("member holds no shares".into()));
        }

        let transaction = TransactionService::record(
            ledger,
            RecordTransaction {
                account_id,
                kind: TransactionKind::DividendPayment,
                amount,
                description: format!("Dividend payout for {year}"),
                reference: String::new(),
                destination_account_id: None,
                processed_by: None,
            },
            clock,
        )?;

        let payment = DividendPayment {
            id: Uuid::new_v4(),
            dividend_id,
            member_id,
            shares_held,
            amount,
            payment_date: clock.today(),
            transaction_id: transaction.id,
            created_at: clock.now(),
        };
        info!(member = %member_id, amount = %amount, "paid dividend");
        ledger.record_event(LedgerEvent::DividendPaid {
            dividend_id,
            member_id,
            amount,
        });
        ledger.dividend_payments.push(payment.clone());
        ledger.touch();
        Ok(payment)
    }
}
