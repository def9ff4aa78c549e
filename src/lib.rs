pub mod bills;
pub mod calendar;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod payments;
pub mod planner;
pub mod recurrence;
pub mod strategy;
pub mod types;

// re-export key types
pub use bills::{
    detect_anomaly, predict_next, AnomalyReport, AnomalySeverity, BillPrediction, Trend,
};
pub use config::{AnomalyConfig, PayoffConfig};
pub use decimal::{Money, Rate};
pub use errors::{OutstandingBalance, PayoffError, Result};
pub use events::{EventStore, PayoffEvent};
pub use loan::{Loan, LoanBuilder};
pub use payments::{
    calculate_interest_savings, calculate_monthly_payment, simulate_schedule, AmortizationEngine,
    AmortizationPeriod, AmortizationSchedule, ExtraPaymentCalculator, LumpSumImpact, PayoffImpact,
};
pub use planner::PayoffPlanner;
pub use recurrence::{Frequency, RecurringSchedule};
pub use strategy::{
    compare_strategies, simulate_current_plan, simulate_strategy, LoanPayoff, PayoffPlan, PlanKind,
    Recommendation, StrategyComparator, StrategyComparison,
};
pub use types::{LoanId, LoanType, OverpaymentStrategy, PayoffStrategy};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
