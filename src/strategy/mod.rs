pub mod comparison;
pub mod simulation;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::events::PayoffEvent;
use crate::types::{LoanId, PayoffStrategy};

pub use comparison::{compare_strategies, Recommendation, StrategyComparator, StrategyComparison};
pub use simulation::{simulate_current_plan, simulate_strategy};

/// which plan produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanKind {
    /// every loan on its own payment, no budget redirection
    Current,
    Strategy(PayoffStrategy),
}

/// per-loan outcome within a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanPayoff {
    pub loan_id: LoanId,
    pub name: String,
    /// month of the final payment, 0 for loans that start paid off
    pub payoff_month: u32,
    pub interest_paid: Money,
    pub total_paid: Money,
}

/// balance snapshot of one loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanBalance {
    pub loan_id: LoanId,
    pub balance: Money,
    pub annual_rate: Rate,
}

/// one simulated month of a strategy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyPeriod {
    pub month: u32,
    /// loan selected from the opening balances; when its own payment clears
    /// it, the budget goes to `extra_recipients` instead
    pub target: LoanId,
    /// balances of unpaid loans when the target was chosen
    pub opening_balances: Vec<LoanBalance>,
    /// loans that actually received part of the extra budget, in order
    pub extra_recipients: Vec<LoanId>,
    pub extra_applied: Money,
    pub interest: Money,
    pub remaining_balance: Money,
}

/// result of simulating a plan across all loans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffPlan {
    pub kind: PlanKind,
    pub total_interest: Money,
    pub total_paid: Money,
    /// months until the last loan is paid off
    pub months: u32,
    pub payoff_date: NaiveDate,
    pub loans: Vec<LoanPayoff>,
    pub payoff_order: Vec<LoanId>,
    pub periods: Vec<StrategyPeriod>,
    pub events: Vec<PayoffEvent>,
}

impl PayoffPlan {
    pub fn loan(&self, loan_id: LoanId) -> Option<&LoanPayoff> {
        self.loans.iter().find(|l| l.loan_id == loan_id)
    }

    /// target of the extra budget in the given 1-based month
    pub fn target_in_month(&self, month: u32) -> Option<LoanId> {
        month
            .checked_sub(1)
            .and_then(|i| self.periods.get(i as usize))
            .map(|p| p.target)
    }
}
