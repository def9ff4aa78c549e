use chrono::NaiveDate;
use log::{debug, trace, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::add_months;
use crate::config::PayoffConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{OutstandingBalance, PayoffError, Result};
use crate::loan::Loan;

use super::{validate_amount, validate_horizon, PaymentTerms};

/// one simulated month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationPeriod {
    /// 1-based
    pub period_index: u32,
    pub beginning_balance: Money,
    pub payment_amount: Money,
    pub interest_portion: Money,
    pub principal_portion: Money,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
    pub cumulative_principal: Money,
}

/// lazy, finite period sequence; clone it to restart from the same inputs
#[derive(Debug, Clone)]
pub struct SchedulePeriods {
    balance: Money,
    monthly_rate: Rate,
    total_payment: Money,
    period_index: u32,
    max_months: u32,
    cumulative_interest: Money,
    cumulative_principal: Money,
}

impl SchedulePeriods {
    fn new(terms: &PaymentTerms, max_months: u32) -> Self {
        Self {
            balance: terms.balance,
            monthly_rate: terms.annual_rate.monthly_rate(),
            total_payment: terms.total_payment(),
            period_index: 0,
            max_months,
            cumulative_interest: Money::ZERO,
            cumulative_principal: Money::ZERO,
        }
    }

    /// balance not yet retired by the periods produced so far
    pub fn outstanding(&self) -> Money {
        self.balance
    }

    /// periods produced so far
    pub fn periods_elapsed(&self) -> u32 {
        self.period_index
    }
}

impl Iterator for SchedulePeriods {
    type Item = AmortizationPeriod;

    fn next(&mut self) -> Option<AmortizationPeriod> {
        if !self.balance.is_positive() || self.period_index >= self.max_months {
            return None;
        }

        let interest = self.balance.interest_for(self.monthly_rate);
        let principal = (self.total_payment - interest).min(self.balance);
        // interest never grows as the balance falls, so this only guards misuse
        if !principal.is_positive() {
            return None;
        }

        let beginning_balance = self.balance;
        self.balance = (self.balance - principal).max(Money::ZERO);
        self.period_index += 1;
        self.cumulative_interest += interest;
        self.cumulative_principal += principal;

        Some(AmortizationPeriod {
            period_index: self.period_index,
            beginning_balance,
            payment_amount: principal + interest,
            interest_portion: interest,
            principal_portion: principal,
            remaining_balance: self.balance,
            cumulative_interest: self.cumulative_interest,
            cumulative_principal: self.cumulative_principal,
        })
    }
}

/// fully simulated schedule with totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub monthly_payment: Money,
    pub extra_payment: Money,
    pub periods: Vec<AmortizationPeriod>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_paid: Money,
}

impl AmortizationSchedule {
    fn from_periods(terms: &PaymentTerms, periods: Vec<AmortizationPeriod>) -> Self {
        let total_interest: Money = periods.iter().map(|p| p.interest_portion).sum();
        let total_principal: Money = periods.iter().map(|p| p.principal_portion).sum();

        Self {
            principal: terms.balance,
            annual_rate: terms.annual_rate,
            monthly_payment: terms.monthly_payment,
            extra_payment: terms.extra_payment,
            periods,
            total_interest,
            total_principal,
            total_paid: total_interest + total_principal,
        }
    }

    /// number of payments until payoff
    pub fn months(&self) -> u32 {
        self.periods.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// get period by 1-based index
    pub fn get_period(&self, period_index: u32) -> Option<&AmortizationPeriod> {
        period_index
            .checked_sub(1)
            .and_then(|i| self.periods.get(i as usize))
    }

    /// remaining balance after the given period (principal before the first)
    pub fn balance_after(&self, period_index: u32) -> Money {
        if period_index == 0 {
            return self.principal;
        }
        self.get_period(period_index)
            .map(|p| p.remaining_balance)
            .unwrap_or(Money::ZERO)
    }

    /// balance after the last period
    pub fn final_balance(&self) -> Money {
        self.periods
            .last()
            .map(|p| p.remaining_balance)
            .unwrap_or(self.principal)
    }

    /// date of the last payment when the first falls one month after `as_of`
    pub fn payoff_date(&self, as_of: NaiveDate) -> Result<NaiveDate> {
        add_months(as_of, self.months())
    }
}

/// amortization engine
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: PayoffConfig,
}

impl AmortizationEngine {
    pub fn new(config: PayoffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PayoffConfig {
        &self.config
    }

    /// validated lazy period sequence
    pub fn periods(
        &self,
        balance: Money,
        annual_rate: Rate,
        monthly_payment: Money,
        extra_payment: Money,
        max_months: u32,
    ) -> Result<SchedulePeriods> {
        let terms = PaymentTerms::new(balance, annual_rate, monthly_payment, extra_payment);
        terms.validate(&self.config)?;
        validate_horizon("max_months", max_months, &self.config)?;
        terms.ensure_amortizes(None)?;

        Ok(SchedulePeriods::new(&terms, max_months))
    }

    /// simulate the whole schedule; fails if the balance outlives `max_months`
    pub fn simulate(
        &self,
        balance: Money,
        annual_rate: Rate,
        monthly_payment: Money,
        extra_payment: Money,
        max_months: u32,
    ) -> Result<AmortizationSchedule> {
        let mut iter =
            self.periods(balance, annual_rate, monthly_payment, extra_payment, max_months)?;
        let periods: Vec<AmortizationPeriod> = iter.by_ref().collect();

        if iter.outstanding().is_positive() {
            warn!(
                "schedule for balance {} at {} not paid off within {} months, {} outstanding",
                balance,
                annual_rate,
                max_months,
                iter.outstanding()
            );
            return Err(PayoffError::HorizonExceeded {
                months: iter.periods_elapsed(),
                outstanding: vec![OutstandingBalance {
                    loan_id: None,
                    balance: iter.outstanding(),
                }],
            });
        }

        let terms = PaymentTerms::new(balance, annual_rate, monthly_payment, extra_payment);
        let schedule = AmortizationSchedule::from_periods(&terms, periods);
        debug!(
            "simulated {} periods for balance {}: interest {}",
            schedule.months(),
            balance,
            schedule.total_interest
        );
        Ok(schedule)
    }

    /// schedule for a stored loan, including its recurring extra payment
    pub fn schedule_for_loan(&self, loan: &Loan) -> Result<AmortizationSchedule> {
        loan.validate(&self.config)?;
        self.simulate(
            loan.current_balance,
            loan.annual_rate,
            loan.monthly_payment,
            loan.extra_payment,
            self.config.max_months,
        )
        .map_err(|e| e.for_loan(loan.id))
    }

    /// schedule that retires `principal` over `term_months` with a fixed payment
    pub fn schedule_for_term(
        &self,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
    ) -> Result<AmortizationSchedule> {
        validate_horizon("term_months", term_months, &self.config)?;
        let payment = calculate_monthly_payment(principal, annual_rate, term_months)?;
        trace!(
            "fixed payment {} for {} over {} months at {}",
            payment,
            principal,
            term_months,
            annual_rate
        );
        if principal.is_zero() {
            return Ok(AmortizationSchedule::from_periods(
                &PaymentTerms::new(principal, annual_rate, payment, Money::ZERO),
                Vec::new(),
            ));
        }
        self.simulate(principal, annual_rate, payment, Money::ZERO, self.config.max_months)
    }
}

/// simulate a schedule with the default configuration
pub fn simulate_schedule(
    balance: Money,
    annual_rate: Rate,
    monthly_payment: Money,
    extra_payment: Money,
    max_months: u32,
) -> Result<AmortizationSchedule> {
    AmortizationEngine::default().simulate(
        balance,
        annual_rate,
        monthly_payment,
        extra_payment,
        max_months,
    )
}

/// fixed monthly payment (EMI) retiring `principal` over `term_months`,
/// rounded up to the cent and raised further if per-period interest rounding
/// would leave a residual past the term
pub fn calculate_monthly_payment(
    principal: Money,
    annual_rate: Rate,
    term_months: u32,
) -> Result<Money> {
    validate_amount("principal", principal)?;
    if annual_rate.is_negative() || annual_rate > Rate::MAX_ANNUAL {
        return Err(PayoffError::invalid(
            "annual_rate",
            format!("must be within 0%..={}, got {}", Rate::MAX_ANNUAL, annual_rate),
        ));
    }
    if term_months == 0 {
        return Err(PayoffError::invalid("term_months", "must be positive"));
    }

    let r = annual_rate.monthly_rate().as_decimal();
    let mut payment = if r.is_zero() {
        Money::from_decimal_ceil(principal.as_decimal() / Decimal::from(term_months))
    } else {
        // EMI = P * r / (1 - (1 + r)^-n)
        let base = Decimal::ONE + r;
        let mut compound = Decimal::ONE;
        for _ in 0..term_months {
            match compound.checked_mul(base) {
                Some(next) => compound = next,
                None => {
                    compound = Decimal::MAX;
                    break;
                }
            }
        }
        let discount = Decimal::ONE / compound;
        Money::from_decimal_ceil(principal.as_decimal() * r / (Decimal::ONE - discount))
    };

    for _ in 0..MAX_PAYMENT_ADJUSTMENTS {
        if retires_within(principal, annual_rate, payment, term_months) {
            return Ok(payment);
        }
        payment += Money::CENT;
    }
    warn!(
        "payment {} still leaves a residual on {} after {} months",
        payment, principal, term_months
    );
    Ok(payment)
}

/// cent steps tried on top of the closed-form EMI; one is enough in practice
const MAX_PAYMENT_ADJUSTMENTS: u32 = 100;

fn retires_within(principal: Money, annual_rate: Rate, payment: Money, term_months: u32) -> bool {
    let terms = PaymentTerms::new(principal, annual_rate, payment, Money::ZERO);
    let mut periods = SchedulePeriods::new(&terms, term_months);
    periods.by_ref().for_each(drop);
    !periods.outstanding().is_positive()
}
