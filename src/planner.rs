use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use log::info;

use crate::bills::{detect_anomaly, predict_next, AnomalyReport, BillPrediction};
use crate::config::PayoffConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::Loan;
use crate::payments::{
    AmortizationEngine, AmortizationSchedule, ExtraPaymentCalculator, LumpSumImpact, PayoffImpact,
};
use crate::recurrence::RecurringSchedule;
use crate::strategy::{StrategyComparator, StrategyComparison};
use crate::types::OverpaymentStrategy;

/// Entry point binding one configuration to the calculation engines.
///
/// The engines take the reference date as a parameter; the planner reads it
/// from the supplied time provider so callers never pass "today" by hand.
#[derive(Debug, Clone, Default)]
pub struct PayoffPlanner {
    config: PayoffConfig,
    engine: AmortizationEngine,
    calculator: ExtraPaymentCalculator,
    comparator: StrategyComparator,
}

impl PayoffPlanner {
    pub fn new(config: PayoffConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: AmortizationEngine::new(config.clone()),
            calculator: ExtraPaymentCalculator::new(config.clone()),
            comparator: StrategyComparator::new(config.clone()),
            config,
        })
    }

    pub fn config(&self) -> &PayoffConfig {
        &self.config
    }

    pub fn today(time_provider: &SafeTimeProvider) -> NaiveDate {
        time_provider.now().date_naive()
    }

    pub fn schedule(&self, loan: &Loan) -> Result<AmortizationSchedule> {
        self.engine.schedule_for_loan(loan)
    }

    pub fn payoff_date(&self, loan: &Loan, time_provider: &SafeTimeProvider) -> Result<NaiveDate> {
        self.schedule(loan)?.payoff_date(Self::today(time_provider))
    }

    /// impact of paying `extra_payment` on top of the loan's own payment each month
    pub fn extra_payment_impact(
        &self,
        loan: &Loan,
        extra_payment: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<PayoffImpact> {
        self.calculator
            .interest_savings(
                loan.current_balance,
                loan.annual_rate,
                loan.monthly_payment,
                extra_payment,
                loan.remaining_term_months,
                Self::today(time_provider),
            )
            .map_err(|e| e.for_loan(loan.id))
    }

    pub fn lump_sum_impact(
        &self,
        loan: &Loan,
        lump_sum: Money,
        strategy: OverpaymentStrategy,
        time_provider: &SafeTimeProvider,
    ) -> Result<LumpSumImpact> {
        self.calculator
            .lump_sum_impact(loan, lump_sum, strategy, Self::today(time_provider))
    }

    pub fn compare_strategies(
        &self,
        loans: &[Loan],
        available_extra_budget: Money,
        time_provider: &SafeTimeProvider,
    ) -> Result<StrategyComparison> {
        self.comparator
            .compare(loans, available_extra_budget, Self::today(time_provider))
    }

    pub fn bill_anomaly(&self, history: &[Money], current: Money) -> Result<AnomalyReport> {
        detect_anomaly(history, current, &self.config.anomaly)
    }

    pub fn predict_bill(&self, history: &[Money]) -> Result<BillPrediction> {
        predict_next(history, &self.config.anomaly)
    }

    /// occurrences of a recurring transaction that came due since the last run
    pub fn due_occurrences(
        &self,
        schedule: &RecurringSchedule,
        last_generated: Option<NaiveDate>,
        limit: usize,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<NaiveDate>> {
        let today = Self::today(time_provider);
        let due = schedule.due_through(last_generated, today, limit)?;
        if !due.is_empty() {
            info!("{} {:?} occurrences due through {}", due.len(), schedule.frequency, today);
        }
        Ok(due)
    }
}
