use thiserror::Error;

use crate::decimal::Money;
use crate::types::LoanId;

/// balance left on a loan when a simulation hits its horizon
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutstandingBalance {
    pub loan_id: Option<LoanId>,
    pub balance: Money,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayoffError {
    #[error("invalid input for {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    #[error("payment never amortizes: first period interest {first_period_interest}, minimum payment {minimum_payment}")]
    NonAmortizingPayment {
        loan_id: Option<LoanId>,
        first_period_interest: Money,
        minimum_payment: Money,
    },

    #[error("not paid off within {months} months: {} still outstanding", total_outstanding(.outstanding))]
    HorizonExceeded {
        months: u32,
        outstanding: Vec<OutstandingBalance>,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("insufficient history: need {required} amounts, got {available}")]
    InsufficientHistory {
        required: usize,
        available: usize,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },
}

fn total_outstanding(outstanding: &[OutstandingBalance]) -> Money {
    outstanding.iter().map(|o| o.balance).sum()
}

impl PayoffError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        PayoffError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// attach a loan id to errors raised without one
    pub(crate) fn for_loan(self, id: LoanId) -> Self {
        match self {
            PayoffError::NonAmortizingPayment {
                loan_id: None,
                first_period_interest,
                minimum_payment,
            } => PayoffError::NonAmortizingPayment {
                loan_id: Some(id),
                first_period_interest,
                minimum_payment,
            },
            PayoffError::HorizonExceeded { months, outstanding } => PayoffError::HorizonExceeded {
                months,
                outstanding: outstanding
                    .into_iter()
                    .map(|o| OutstandingBalance {
                        loan_id: o.loan_id.or(Some(id)),
                        balance: o.balance,
                    })
                    .collect(),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, PayoffError>;
