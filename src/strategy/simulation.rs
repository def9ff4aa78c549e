use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::NaiveDate;
use log::{debug, trace, warn};

use crate::calendar::add_months;
use crate::config::PayoffConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{OutstandingBalance, PayoffError, Result};
use crate::events::{EventStore, PayoffEvent};
use crate::loan::Loan;
use crate::payments::{validate_amount, AmortizationEngine, PaymentTerms};
use crate::types::{LoanId, PayoffStrategy};

use super::{LoanBalance, LoanPayoff, PayoffPlan, PlanKind, StrategyPeriod};

/// mutable per-loan state for one strategy run
#[derive(Debug, Clone)]
struct DebtState {
    id: LoanId,
    name: String,
    balance: Money,
    annual_rate: Rate,
    monthly_rate: Rate,
    base_payment: Money,
    interest_paid: Money,
    total_paid: Money,
    payoff_month: Option<u32>,
}

impl DebtState {
    fn from_loan(loan: &Loan) -> Self {
        Self {
            id: loan.id,
            name: loan.name.clone(),
            balance: loan.current_balance,
            annual_rate: loan.annual_rate,
            monthly_rate: loan.annual_rate.monthly_rate(),
            base_payment: loan.monthly_payment,
            interest_paid: Money::ZERO,
            total_paid: Money::ZERO,
            payoff_month: if loan.current_balance.is_positive() { None } else { Some(0) },
        }
    }

    fn is_active(&self) -> bool {
        self.balance.is_positive()
    }

    /// accrue one month of interest and apply the loan's own payment;
    /// returns (interest, unused part of the base payment)
    fn pay_base(&mut self) -> (Money, Money) {
        let interest = self.balance.interest_for(self.monthly_rate);
        let payment = self.base_payment.min(self.balance + interest);
        self.balance = (self.balance + interest - payment).max(Money::ZERO);
        self.interest_paid += interest;
        self.total_paid += payment;
        (interest, self.base_payment - payment)
    }

    fn to_payoff(&self) -> LoanPayoff {
        LoanPayoff {
            loan_id: self.id,
            name: self.name.clone(),
            payoff_month: self.payoff_month.unwrap_or(0),
            interest_paid: self.interest_paid,
            total_paid: self.total_paid,
        }
    }
}

/// priority between two unpaid loans; `Less` means `a` is targeted first
fn priority(strategy: PayoffStrategy, a: &DebtState, b: &DebtState) -> Ordering {
    match strategy {
        PayoffStrategy::Snowball => a.balance.cmp(&b.balance).then(a.id.cmp(&b.id)),
        PayoffStrategy::Avalanche => b
            .annual_rate
            .cmp(&a.annual_rate)
            .then(a.balance.cmp(&b.balance))
            .then(a.id.cmp(&b.id)),
    }
}

fn select_target(debts: &[DebtState], strategy: PayoffStrategy) -> Option<usize> {
    debts
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_active())
        .min_by(|(_, a), (_, b)| priority(strategy, a, b))
        .map(|(i, _)| i)
}

/// validate a loan set for multi-loan simulation
pub(crate) fn validate_loans(loans: &[Loan], config: &PayoffConfig) -> Result<()> {
    if loans.is_empty() {
        return Err(PayoffError::invalid("loans", "at least one loan required"));
    }

    let mut seen = HashSet::new();
    for loan in loans {
        if !seen.insert(loan.id) {
            return Err(PayoffError::invalid("loans", format!("duplicate loan id {}", loan.id)));
        }
        loan.validate(config)?;
        PaymentTerms::new(loan.current_balance, loan.annual_rate, loan.monthly_payment, Money::ZERO)
            .ensure_amortizes(Some(loan.id))?;
    }
    Ok(())
}

fn validate_budget(budget: Money) -> Result<()> {
    validate_amount("available_extra_budget", budget)
}

/// Simulate all loans in parallel, directing the shared extra budget (plus
/// payments freed by paid-off loans) to one target per month.
///
/// Each loan pays only its `monthly_payment`; a loan's own `extra_payment`
/// is not part of the plan; fold it into `available_extra_budget` instead.
pub fn simulate_strategy(
    loans: &[Loan],
    available_extra_budget: Money,
    strategy: PayoffStrategy,
    config: &PayoffConfig,
    as_of: NaiveDate,
) -> Result<PayoffPlan> {
    validate_loans(loans, config)?;
    validate_budget(available_extra_budget)?;

    let mut debts: Vec<DebtState> = loans.iter().map(DebtState::from_loan).collect();
    let mut events = EventStore::new();
    let mut periods = Vec::new();
    let mut payoff_order = Vec::new();
    let mut freed = Money::ZERO;
    let mut last_target: Option<LoanId> = None;
    let mut month = 0;

    while let Some(target) = select_target(&debts, strategy) {
        if month >= config.max_months {
            let outstanding: Vec<OutstandingBalance> = debts
                .iter()
                .filter(|d| d.is_active())
                .map(|d| OutstandingBalance {
                    loan_id: Some(d.id),
                    balance: d.balance,
                })
                .collect();
            warn!("{} plan not paid off within {} months", strategy, config.max_months);
            return Err(PayoffError::HorizonExceeded { months: month, outstanding });
        }
        month += 1;

        let opening_balances: Vec<LoanBalance> = debts
            .iter()
            .filter(|d| d.is_active())
            .map(|d| LoanBalance {
                loan_id: d.id,
                balance: d.balance,
                annual_rate: d.annual_rate,
            })
            .collect();

        let target_id = debts[target].id;
        if last_target != Some(target_id) {
            events.emit(PayoffEvent::TargetSelected {
                strategy,
                month,
                loan_id: target_id,
                balance: debts[target].balance,
            });
            last_target = Some(target_id);
        }

        let mut pool = available_extra_budget + freed;
        let mut interest = Money::ZERO;
        let mut paid_this_month = Vec::new();

        for (i, debt) in debts.iter_mut().enumerate().filter(|(_, d)| d.is_active()) {
            let (accrued, unused) = debt.pay_base();
            interest += accrued;
            pool += unused;
            if !debt.is_active() {
                paid_this_month.push(i);
            }
        }

        // whole pool to the target; a paid-off target passes the remainder on
        let mut extra_applied = Money::ZERO;
        let mut extra_recipients = Vec::new();
        let mut recipient = Some(target);
        while pool.is_positive() {
            let idx = match recipient.filter(|&i| debts[i].is_active()) {
                Some(i) => i,
                None => match select_target(&debts, strategy) {
                    Some(i) => i,
                    None => break,
                },
            };
            let amount = pool.min(debts[idx].balance);
            debts[idx].balance -= amount;
            debts[idx].total_paid += amount;
            pool -= amount;
            extra_applied += amount;
            extra_recipients.push(debts[idx].id);

            if debts[idx].is_active() {
                recipient = Some(idx);
            } else {
                paid_this_month.push(idx);
                recipient = None;
            }
        }

        for &i in &paid_this_month {
            let debt = &mut debts[i];
            debt.payoff_month = Some(month);
            freed += debt.base_payment;
            payoff_order.push(debt.id);

            events.emit(PayoffEvent::LoanPaidOff {
                strategy,
                month,
                loan_id: debt.id,
                interest_paid: debt.interest_paid,
            });
            events.emit(PayoffEvent::PaymentRolledOver {
                strategy,
                month,
                from_loan: debt.id,
                amount: debt.base_payment,
                new_budget: available_extra_budget + freed,
            });
        }

        let remaining_balance: Money = debts.iter().map(|d| d.balance).sum();
        trace!(
            "{} month {}: target {}, extra {}, interest {}, remaining {}",
            strategy, month, target_id, extra_applied, interest, remaining_balance
        );

        periods.push(StrategyPeriod {
            month,
            target: target_id,
            opening_balances,
            extra_recipients,
            extra_applied,
            interest,
            remaining_balance,
        });
    }

    let plan = PayoffPlan {
        kind: PlanKind::Strategy(strategy),
        total_interest: debts.iter().map(|d| d.interest_paid).sum(),
        total_paid: debts.iter().map(|d| d.total_paid).sum(),
        months: month,
        payoff_date: add_months(as_of, month)?,
        loans: debts.iter().map(DebtState::to_payoff).collect(),
        payoff_order,
        periods,
        events: events.take_events(),
    };

    debug!("{} plan: {} months, interest {}", strategy, plan.months, plan.total_interest);
    Ok(plan)
}

/// amortize every loan independently on its own payment with no extra budget;
/// `extra_payment` on the loans is ignored as in `simulate_strategy`
pub fn simulate_current_plan(
    loans: &[Loan],
    config: &PayoffConfig,
    as_of: NaiveDate,
) -> Result<PayoffPlan> {
    validate_loans(loans, config)?;

    let engine = AmortizationEngine::new(config.clone());
    let mut payoffs = Vec::with_capacity(loans.len());
    for loan in loans {
        let schedule = engine
            .simulate(
                loan.current_balance,
                loan.annual_rate,
                loan.monthly_payment,
                Money::ZERO,
                config.max_months,
            )
            .map_err(|e| e.for_loan(loan.id))?;

        payoffs.push(LoanPayoff {
            loan_id: loan.id,
            name: loan.name.clone(),
            payoff_month: schedule.months(),
            interest_paid: schedule.total_interest,
            total_paid: schedule.total_paid,
        });
    }

    let mut order: Vec<&LoanPayoff> = payoffs.iter().filter(|p| p.payoff_month > 0).collect();
    order.sort_by(|a, b| a.payoff_month.cmp(&b.payoff_month).then(a.loan_id.cmp(&b.loan_id)));
    let payoff_order = order.iter().map(|p| p.loan_id).collect();
    let months = payoffs.iter().map(|p| p.payoff_month).max().unwrap_or(0);

    Ok(PayoffPlan {
        kind: PlanKind::Current,
        total_interest: payoffs.iter().map(|p| p.interest_paid).sum(),
        total_paid: payoffs.iter().map(|p| p.total_paid).sum(),
        months,
        payoff_date: add_months(as_of, months)?,
        loans: payoffs,
        payoff_order,
        periods: Vec::new(),
        events: Vec::new(),
    })
}
