use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::config::PayoffConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};
use crate::loan::Loan;
use crate::types::OverpaymentStrategy;

use super::amortization::{calculate_monthly_payment, AmortizationEngine};
use super::{validate_amount, validate_horizon, PaymentTerms};

/// effect of a recurring extra payment compared with the baseline schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffImpact {
    pub interest_saved: Money,
    pub months_saved: u32,
    /// same value as `interest_saved`; kept separate for labeling
    pub total_savings: Money,
    pub new_payoff_date: NaiveDate,
    pub baseline_payoff_date: NaiveDate,
    pub baseline_months: u32,
    pub new_months: u32,
}

impl PayoffImpact {
    fn unchanged(months: u32, as_of: NaiveDate) -> Result<Self> {
        let payoff_date = add_months(as_of, months)?;
        Ok(Self {
            interest_saved: Money::ZERO,
            months_saved: 0,
            total_savings: Money::ZERO,
            new_payoff_date: payoff_date,
            baseline_payoff_date: payoff_date,
            baseline_months: months,
            new_months: months,
        })
    }

    pub fn has_savings(&self) -> bool {
        self.months_saved > 0 || self.interest_saved.is_positive()
    }
}

/// effect of a one-time prepayment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumpSumImpact {
    pub strategy: OverpaymentStrategy,
    pub amount_applied: Money,
    pub old_balance: Money,
    pub new_balance: Money,
    pub old_payment: Money,
    pub new_payment: Money,
    pub old_months: u32,
    pub new_months: u32,
    pub months_saved: u32,
    pub interest_saved: Money,
    pub new_payoff_date: NaiveDate,
}

/// extra payment impact calculator
#[derive(Debug, Clone, Default)]
pub struct ExtraPaymentCalculator {
    engine: AmortizationEngine,
}

impl ExtraPaymentCalculator {
    pub fn new(config: PayoffConfig) -> Self {
        Self {
            engine: AmortizationEngine::new(config),
        }
    }

    fn config(&self) -> &PayoffConfig {
        self.engine.config()
    }

    /// re-simulate with and without `extra_payment` and report the difference
    pub fn interest_savings(
        &self,
        balance: Money,
        annual_rate: Rate,
        monthly_payment: Money,
        extra_payment: Money,
        remaining_months: u32,
        as_of: NaiveDate,
    ) -> Result<PayoffImpact> {
        PaymentTerms::new(balance, annual_rate, monthly_payment, extra_payment)
            .validate(self.config())?;
        validate_horizon("remaining_months", remaining_months, self.config())?;

        if extra_payment.is_zero() {
            PaymentTerms::new(balance, annual_rate, monthly_payment, Money::ZERO)
                .ensure_amortizes(None)?;
            return PayoffImpact::unchanged(remaining_months, as_of);
        }

        let horizon = self.config().max_months;
        let baseline = self
            .engine
            .simulate(balance, annual_rate, monthly_payment, Money::ZERO, horizon)?;
        if baseline.months() > remaining_months {
            warn!(
                "baseline payoff takes {} months but {} months remain on the loan",
                baseline.months(),
                remaining_months
            );
        }

        let accelerated = self
            .engine
            .simulate(balance, annual_rate, monthly_payment, extra_payment, horizon)?;

        let interest_saved = baseline.total_interest - accelerated.total_interest;
        let impact = PayoffImpact {
            interest_saved,
            months_saved: baseline.months().saturating_sub(accelerated.months()),
            total_savings: interest_saved,
            new_payoff_date: accelerated.payoff_date(as_of)?,
            baseline_payoff_date: baseline.payoff_date(as_of)?,
            baseline_months: baseline.months(),
            new_months: accelerated.months(),
        };

        debug!(
            "extra {} per month saves {} months and {} interest",
            extra_payment, impact.months_saved, impact.interest_saved
        );
        Ok(impact)
    }

    /// impact of the loan's own recurring extra payment
    pub fn savings_for_loan(&self, loan: &Loan, as_of: NaiveDate) -> Result<PayoffImpact> {
        self.interest_savings(
            loan.current_balance,
            loan.annual_rate,
            loan.monthly_payment,
            loan.extra_payment,
            loan.remaining_term_months,
            as_of,
        )
        .map_err(|e| e.for_loan(loan.id))
    }

    /// apply a one-time prepayment and absorb it by shortening the term or
    /// lowering the payment
    pub fn lump_sum_impact(
        &self,
        loan: &Loan,
        lump_sum: Money,
        strategy: OverpaymentStrategy,
        as_of: NaiveDate,
    ) -> Result<LumpSumImpact> {
        loan.validate(self.config())?;
        validate_amount("lump_sum", lump_sum)?;
        if lump_sum.is_zero() {
            return Err(PayoffError::invalid("lump_sum", "must be positive"));
        }

        let horizon = self.config().max_months;
        let baseline = self.engine.schedule_for_loan(loan)?;

        let amount_applied = lump_sum.min(loan.current_balance);
        let new_balance = loan.current_balance - amount_applied;

        let new_payment = match strategy {
            _ if new_balance.is_zero() => Money::ZERO,
            OverpaymentStrategy::ReduceTerm => loan.monthly_payment,
            OverpaymentStrategy::ReducePayment => {
                let term = baseline.months().max(1);
                calculate_monthly_payment(new_balance, loan.annual_rate, term)?
            }
        };

        let (new_months, new_interest) = if new_balance.is_zero() {
            (0, Money::ZERO)
        } else {
            let after = self
                .engine
                .simulate(new_balance, loan.annual_rate, new_payment, loan.extra_payment, horizon)
                .map_err(|e| e.for_loan(loan.id))?;
            (after.months(), after.total_interest)
        };

        Ok(LumpSumImpact {
            strategy,
            amount_applied,
            old_balance: loan.current_balance,
            new_balance,
            old_payment: loan.monthly_payment,
            new_payment,
            old_months: baseline.months(),
            new_months,
            months_saved: baseline.months().saturating_sub(new_months),
            interest_saved: baseline.total_interest - new_interest,
            new_payoff_date: add_months(as_of, new_months)?,
        })
    }
}

/// extra payment impact with the default configuration
pub fn calculate_interest_savings(
    balance: Money,
    annual_rate: Rate,
    monthly_payment: Money,
    extra_payment: Money,
    remaining_months: u32,
    as_of: NaiveDate,
) -> Result<PayoffImpact> {
    ExtraPaymentCalculator::default().interest_savings(
        balance,
        annual_rate,
        monthly_payment,
        extra_payment,
        remaining_months,
        as_of,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::from_str_exact(s).unwrap()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn reference_loan() -> Loan {
        Loan::builder()
            .balance(Money::from_major(12_000))
            .rate(Rate::from_percentage(6))
            .monthly_payment(Money::from_major(500))
            .term_months(26)
            .build()
            .unwrap()
    }

    #[test]
    fn test_extra_payment_savings() {
        let impact = calculate_interest_savings(
            Money::from_major(12_000),
            Rate::from_percentage(6),
            Money::from_major(500),
            Money::from_major(200),
            26,
            as_of(),
        )
        .unwrap();

        assert_eq!(impact.baseline_months, 26);
        assert_eq!(impact.new_months, 18);
        assert_eq!(impact.months_saved, 8);
        assert_eq!(impact.interest_saved, money("238.49"));
        assert_eq!(impact.total_savings, impact.interest_saved);
        assert_eq!(impact.baseline_payoff_date, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert_eq!(impact.new_payoff_date, NaiveDate::from_ymd_opt(2025, 7, 15).unwrap());
        assert!(impact.new_payoff_date < impact.baseline_payoff_date);
        assert!(impact.has_savings());
    }

    #[test]
    fn test_zero_extra_short_circuits() {
        let impact = calculate_interest_savings(
            Money::from_major(12_000),
            Rate::from_percentage(6),
            Money::from_major(500),
            Money::ZERO,
            26,
            as_of(),
        )
        .unwrap();

        assert_eq!(impact.months_saved, 0);
        assert_eq!(impact.interest_saved, Money::ZERO);
        assert_eq!(impact.new_payoff_date, impact.baseline_payoff_date);
        assert!(!impact.has_savings());
    }

    #[test]
    fn test_savings_never_negative() {
        let mut previous_months_saved = 0;
        for extra in [1, 10, 50, 200, 1_000, 20_000] {
            let impact = calculate_interest_savings(
                Money::from_major(12_000),
                Rate::from_percentage(6),
                Money::from_major(500),
                Money::from_major(extra),
                26,
                as_of(),
            )
            .unwrap();

            assert!(!impact.interest_saved.is_negative(), "extra {extra}");
            assert!(impact.months_saved >= previous_months_saved, "extra {extra}");
            previous_months_saved = impact.months_saved;
        }
        // a payment larger than the balance retires the loan in one month
        assert_eq!(previous_months_saved, 25);
    }

    #[test]
    fn test_non_amortizing_baseline_is_not_masked() {
        // the extra payment alone would amortize, but the baseline never does
        let err = calculate_interest_savings(
            Money::from_major(12_000),
            Rate::from_percentage(6),
            Money::from_major(50),
            Money::from_major(200),
            26,
            as_of(),
        )
        .unwrap_err();
        assert!(matches!(err, PayoffError::NonAmortizingPayment { .. }));

        let err = calculate_interest_savings(
            Money::from_major(12_000),
            Rate::from_percentage(6),
            Money::from_major(50),
            Money::ZERO,
            26,
            as_of(),
        )
        .unwrap_err();
        assert!(matches!(err, PayoffError::NonAmortizingPayment { .. }));
    }

    #[test]
    fn test_invalid_remaining_months() {
        let err = calculate_interest_savings(
            Money::from_major(12_000),
            Rate::from_percentage(6),
            Money::from_major(500),
            Money::from_major(200),
            0,
            as_of(),
        )
        .unwrap_err();
        assert!(matches!(err, PayoffError::InvalidInput { field: "remaining_months", .. }));
    }

    #[test]
    fn test_savings_for_loan_uses_loan_extra() {
        let mut loan = reference_loan();
        loan.extra_payment = Money::from_major(200);

        let impact = ExtraPaymentCalculator::default().savings_for_loan(&loan, as_of()).unwrap();
        assert_eq!(impact.months_saved, 8);
    }

    #[test]
    fn test_lump_sum_reduce_term() {
        let impact = ExtraPaymentCalculator::default()
            .lump_sum_impact(
                &reference_loan(),
                Money::from_major(2_000),
                OverpaymentStrategy::ReduceTerm,
                as_of(),
            )
            .unwrap();

        assert_eq!(impact.new_balance, Money::from_major(10_000));
        assert_eq!(impact.new_payment, impact.old_payment);
        assert_eq!(impact.old_months, 26);
        assert_eq!(impact.new_months, 22);
        assert_eq!(impact.months_saved, 4);
        assert_eq!(impact.interest_saved, money("253.06"));
        assert_eq!(impact.new_payoff_date, NaiveDate::from_ymd_opt(2025, 11, 15).unwrap());
    }

    #[test]
    fn test_lump_sum_reduce_payment() {
        let impact = ExtraPaymentCalculator::default()
            .lump_sum_impact(
                &reference_loan(),
                Money::from_major(2_000),
                OverpaymentStrategy::ReducePayment,
                as_of(),
            )
            .unwrap();

        assert_eq!(impact.new_payment, money("411.12"));
        assert!(impact.new_payment < impact.old_payment);
        assert_eq!(impact.new_months, 26);
        assert_eq!(impact.months_saved, 0);
        assert_eq!(impact.interest_saved, money("126.56"));
    }

    #[test]
    fn test_lump_sum_pays_off_loan() {
        let impact = ExtraPaymentCalculator::default()
            .lump_sum_impact(
                &reference_loan(),
                Money::from_major(50_000),
                OverpaymentStrategy::ReducePayment,
                as_of(),
            )
            .unwrap();

        assert_eq!(impact.amount_applied, Money::from_major(12_000));
        assert_eq!(impact.new_balance, Money::ZERO);
        assert_eq!(impact.new_payment, Money::ZERO);
        assert_eq!(impact.new_months, 0);
        assert_eq!(impact.interest_saved, money("815.58"));
        assert_eq!(impact.new_payoff_date, as_of());
    }

    #[test]
    fn test_lump_sum_must_be_positive() {
        let err = ExtraPaymentCalculator::default()
            .lump_sum_impact(
                &reference_loan(),
                Money::ZERO,
                OverpaymentStrategy::ReduceTerm,
                as_of(),
            )
            .unwrap_err();
        assert!(matches!(err, PayoffError::InvalidInput { field: "lump_sum", .. }));

        let err = ExtraPaymentCalculator::default()
            .lump_sum_impact(
                &reference_loan(),
                Money::from_decimal(rust_decimal::Decimal::MAX),
                OverpaymentStrategy::ReducePayment,
                as_of(),
            )
            .unwrap_err();
        assert!(matches!(err, PayoffError::InvalidInput { field: "lump_sum", .. }));
    }
}
