use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PayoffConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{PayoffError, Result};
use crate::payments::{calculate_monthly_payment, validate_horizon, PaymentTerms};
use crate::types::{LoanId, LoanType};

/// a loan as stored by the caller; immutable for the duration of a calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub name: String,
    pub loan_type: LoanType,
    pub current_balance: Money,
    pub annual_rate: Rate,
    pub monthly_payment: Money,
    pub remaining_term_months: u32,
    /// additional principal paid every period on top of `monthly_payment`
    pub extra_payment: Money,
}

impl Loan {
    pub fn builder() -> LoanBuilder {
        LoanBuilder::new()
    }

    pub fn terms(&self) -> PaymentTerms {
        PaymentTerms::new(
            self.current_balance,
            self.annual_rate,
            self.monthly_payment,
            self.extra_payment,
        )
    }

    pub fn is_paid_off(&self) -> bool {
        !self.current_balance.is_positive()
    }

    /// first period interest at the current balance
    pub fn monthly_interest(&self) -> Money {
        self.current_balance.interest_for(self.annual_rate.monthly_rate())
    }

    pub fn validate(&self, config: &PayoffConfig) -> Result<()> {
        self.terms().validate(config)?;
        validate_horizon("remaining_term_months", self.remaining_term_months, config)
    }
}

/// builder for loans
pub struct LoanBuilder {
    id: Option<LoanId>,
    name: Option<String>,
    loan_type: LoanType,
    balance: Option<Money>,
    rate: Option<Rate>,
    monthly_payment: Option<Money>,
    term_months: Option<u32>,
    extra_payment: Money,
}

impl LoanBuilder {
    pub fn new() -> Self {
        Self {
            id: None,
            name: None,
            loan_type: LoanType::default(),
            balance: None,
            rate: None,
            monthly_payment: None,
            term_months: None,
            extra_payment: Money::ZERO,
        }
    }

    pub fn id(mut self, id: LoanId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn loan_type(mut self, loan_type: LoanType) -> Self {
        self.loan_type = loan_type;
        self
    }

    pub fn balance(mut self, balance: Money) -> Self {
        self.balance = Some(balance);
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn monthly_payment(mut self, payment: Money) -> Self {
        self.monthly_payment = Some(payment);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn extra_payment(mut self, extra: Money) -> Self {
        self.extra_payment = extra;
        self
    }

    /// build and validate against the default configuration
    pub fn build(self) -> Result<Loan> {
        self.build_with_config(&PayoffConfig::default())
    }

    /// build and validate; a missing payment is derived from the term
    pub fn build_with_config(self, config: &PayoffConfig) -> Result<Loan> {
        let balance = self
            .balance
            .ok_or_else(|| PayoffError::invalid("current_balance", "balance required"))?;
        let rate = self
            .rate
            .ok_or_else(|| PayoffError::invalid("annual_rate", "rate required"))?;

        let (monthly_payment, term_months) = match (self.monthly_payment, self.term_months) {
            (Some(payment), Some(term)) => (payment, term),
            (None, Some(term)) => (calculate_monthly_payment(balance, rate, term)?, term),
            (Some(_), None) | (None, None) => {
                return Err(PayoffError::invalid("remaining_term_months", "term required"));
            }
        };

        let id = self.id.unwrap_or_else(Uuid::new_v4);
        let loan = Loan {
            id,
            name: self.name.unwrap_or_else(|| id.to_string()),
            loan_type: self.loan_type,
            current_balance: balance,
            annual_rate: rate,
            monthly_payment,
            remaining_term_months: term_months,
            extra_payment: self.extra_payment,
        };

        loan.validate(config)?;
        Ok(loan)
    }
}

impl Default for LoanBuilder {
    fn default() -> Self {
        Self::new()
    }
}
