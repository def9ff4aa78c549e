pub mod amortization;
pub mod overpayment;

use crate::config::PayoffConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};
use crate::types::LoanId;

pub use amortization::{
    calculate_monthly_payment, simulate_schedule, AmortizationEngine, AmortizationPeriod,
    AmortizationSchedule, SchedulePeriods,
};
pub use overpayment::{
    calculate_interest_savings, ExtraPaymentCalculator, LumpSumImpact, PayoffImpact,
};

/// payment terms shared by every simulation entry point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentTerms {
    pub balance: Money,
    pub annual_rate: Rate,
    pub monthly_payment: Money,
    pub extra_payment: Money,
}

impl PaymentTerms {
    pub fn new(
        balance: Money,
        annual_rate: Rate,
        monthly_payment: Money,
        extra_payment: Money,
    ) -> Self {
        Self {
            balance,
            annual_rate,
            monthly_payment,
            extra_payment,
        }
    }

    pub fn total_payment(&self) -> Money {
        self.monthly_payment + self.extra_payment
    }

    /// reject out-of-domain inputs before any simulation starts
    pub fn validate(&self, config: &PayoffConfig) -> Result<()> {
        validate_amount("current_balance", self.balance)?;
        let max_rate = config.max_annual_rate.min(Rate::MAX_ANNUAL);
        if self.annual_rate.is_negative() || self.annual_rate > max_rate {
            return Err(PayoffError::invalid(
                "annual_rate",
                format!("must be within 0%..={}, got {}", max_rate, self.annual_rate),
            ));
        }
        validate_amount("monthly_payment", self.monthly_payment)?;
        if self.balance.is_positive() && !self.monthly_payment.is_positive() {
            return Err(PayoffError::invalid(
                "monthly_payment",
                "must be positive for an outstanding balance",
            ));
        }
        validate_amount("extra_payment", self.extra_payment)?;
        Ok(())
    }

    /// first period interest; fails if the payment can never reduce principal
    pub fn ensure_amortizes(&self, loan_id: Option<LoanId>) -> Result<Money> {
        let interest = self.balance.interest_for(self.annual_rate.monthly_rate());
        if self.balance.is_positive() && self.total_payment() <= interest {
            return Err(PayoffError::NonAmortizingPayment {
                loan_id,
                first_period_interest: interest,
                minimum_payment: interest + Money::CENT,
            });
        }
        Ok(interest)
    }
}

/// amounts must lie within `0..=Money::MAX_AMOUNT`
pub(crate) fn validate_amount(field: &'static str, amount: Money) -> Result<()> {
    if amount.is_negative() || amount > Money::MAX_AMOUNT {
        return Err(PayoffError::invalid(
            field,
            format!("must be within 0..={}, got {}", Money::MAX_AMOUNT, amount),
        ));
    }
    Ok(())
}

/// validate a horizon against the configured ceiling
pub(crate) fn validate_horizon(
    field: &'static str,
    months: u32,
    config: &PayoffConfig,
) -> Result<()> {
    if months == 0 || months > config.max_months {
        return Err(PayoffError::invalid(
            field,
            format!("must be within 1..={}, got {}", config.max_months, months),
        ));
    }
    Ok(())
}
