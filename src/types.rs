use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan; ordering is used for deterministic tie-breaks
pub type LoanId = Uuid;

/// loan categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LoanType {
    Mortgage,
    AutoLoan,
    StudentLoan,
    PersonalLoan,
    CreditCard,
    #[default]
    Other,
}

/// ordering rule for directing a shared extra budget across debts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayoffStrategy {
    /// smallest balance first
    Snowball,
    /// highest interest rate first
    Avalanche,
}

impl fmt::Display for PayoffStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayoffStrategy::Snowball => write!(f, "snowball"),
            PayoffStrategy::Avalanche => write!(f, "avalanche"),
        }
    }
}

/// how a one-time prepayment is absorbed by the remaining schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverpaymentStrategy {
    /// keep the payment, finish earlier
    ReduceTerm,
    /// keep the term, lower the payment
    ReducePayment,
}
