use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use crate::config::PayoffConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::loan::Loan;
use crate::types::PayoffStrategy;

use super::simulation::{simulate_current_plan, simulate_strategy};
use super::PayoffPlan;

/// which strategy to follow and by how much it wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub best_strategy: PayoffStrategy,
    /// absolute gap between snowball and avalanche total interest
    pub interest_difference: Money,
    /// how many months sooner the best strategy finishes than the other one
    pub months_difference: i64,
    pub interest_saved_vs_current: Money,
    pub months_saved_vs_current: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyComparison {
    pub current_plan: PayoffPlan,
    pub snowball: PayoffPlan,
    pub avalanche: PayoffPlan,
    pub recommendation: Recommendation,
}

impl StrategyComparison {
    pub fn plan(&self, strategy: PayoffStrategy) -> &PayoffPlan {
        match strategy {
            PayoffStrategy::Snowball => &self.snowball,
            PayoffStrategy::Avalanche => &self.avalanche,
        }
    }

    pub fn best_plan(&self) -> &PayoffPlan {
        self.plan(self.recommendation.best_strategy)
    }
}

/// payoff strategy comparator
#[derive(Debug, Clone, Default)]
pub struct StrategyComparator {
    config: PayoffConfig,
}

impl StrategyComparator {
    pub fn new(config: PayoffConfig) -> Self {
        Self { config }
    }

    pub fn compare(
        &self,
        loans: &[Loan],
        available_extra_budget: Money,
        as_of: NaiveDate,
    ) -> Result<StrategyComparison> {
        let current_plan = simulate_current_plan(loans, &self.config, as_of)?;
        let snowball = simulate_strategy(
            loans,
            available_extra_budget,
            PayoffStrategy::Snowball,
            &self.config,
            as_of,
        )?;
        let avalanche = simulate_strategy(
            loans,
            available_extra_budget,
            PayoffStrategy::Avalanche,
            &self.config,
            as_of,
        )?;

        let recommendation = recommend(&current_plan, &snowball, &avalanche);
        info!(
            "compared {} loans with extra budget {}: {} recommended, saves {} interest",
            loans.len(),
            available_extra_budget,
            recommendation.best_strategy,
            recommendation.interest_saved_vs_current
        );

        Ok(StrategyComparison {
            current_plan,
            snowball,
            avalanche,
            recommendation,
        })
    }
}

/// lower computed total interest wins; ties go to avalanche
fn recommend(
    current: &PayoffPlan,
    snowball: &PayoffPlan,
    avalanche: &PayoffPlan,
) -> Recommendation {
    let (best, other, best_strategy) = if avalanche.total_interest <= snowball.total_interest {
        (avalanche, snowball, PayoffStrategy::Avalanche)
    } else {
        (snowball, avalanche, PayoffStrategy::Snowball)
    };

    Recommendation {
        best_strategy,
        interest_difference: (snowball.total_interest - avalanche.total_interest).abs(),
        months_difference: other.months as i64 - best.months as i64,
        interest_saved_vs_current: current.total_interest - best.total_interest,
        months_saved_vs_current: current.months as i64 - best.months as i64,
    }
}

/// compare strategies with the default configuration
///
/// Plans use each loan's `monthly_payment` only; any per-loan
/// `extra_payment` belongs in `available_extra_budget`.
pub fn compare_strategies(
    loans: &[Loan],
    available_extra_budget: Money,
    as_of: NaiveDate,
) -> Result<StrategyComparison> {
    StrategyComparator::default().compare(loans, available_extra_budget, as_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::errors::PayoffError;
    use crate::strategy::PlanKind;
    use uuid::Uuid;

    fn money(s: &str) -> Money {
        Money::from_str_exact(s).unwrap()
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn loan(id: u128, balance: i64, rate: u32, payment: i64) -> Loan {
        Loan::builder()
            .id(Uuid::from_u128(id))
            .balance(Money::from_major(balance))
            .rate(Rate::from_percentage(rate))
            .monthly_payment(Money::from_major(payment))
            .term_months(120)
            .build()
            .unwrap()
    }

    #[test]
    fn test_avalanche_recommended_when_rates_and_balances_disagree() {
        let loans = vec![loan(1, 1_000, 10, 50), loan(2, 5_000, 20, 150)];
        let comparison = compare_strategies(&loans, Money::from_major(300), as_of()).unwrap();

        assert_eq!(comparison.current_plan.kind, PlanKind::Current);
        assert_eq!(comparison.snowball.kind, PlanKind::Strategy(PayoffStrategy::Snowball));
        assert_eq!(comparison.snowball.target_in_month(1), Some(Uuid::from_u128(1)));
        assert_eq!(comparison.avalanche.target_in_month(1), Some(Uuid::from_u128(2)));
        assert!(comparison.avalanche.total_interest <= comparison.snowball.total_interest);

        let rec = &comparison.recommendation;
        assert_eq!(rec.best_strategy, PayoffStrategy::Avalanche);
        assert_eq!(rec.interest_difference, money("72.80"));
        assert_eq!(rec.months_difference, 0);
        assert_eq!(rec.interest_saved_vs_current, money("1799.59"));
        assert_eq!(rec.months_saved_vs_current, 36);
        assert_eq!(comparison.best_plan().total_interest, money("658.00"));
    }

    #[test]
    fn test_tie_favors_avalanche() {
        let loans = vec![loan(1, 1_000, 20, 50), loan(2, 5_000, 10, 150)];
        let comparison = compare_strategies(&loans, Money::from_major(300), as_of()).unwrap();

        assert_eq!(comparison.snowball.total_interest, comparison.avalanche.total_interest);
        assert_eq!(comparison.recommendation.best_strategy, PayoffStrategy::Avalanche);
        assert_eq!(comparison.recommendation.interest_difference, Money::ZERO);
    }

    #[test]
    fn test_snowball_wins_when_computed_lower() {
        let current = PayoffPlan {
            kind: PlanKind::Current,
            total_interest: Money::from_major(900),
            total_paid: Money::from_major(10_900),
            months: 40,
            payoff_date: as_of(),
            loans: Vec::new(),
            payoff_order: Vec::new(),
            periods: Vec::new(),
            events: Vec::new(),
        };
        let mut snowball = current.clone();
        snowball.kind = PlanKind::Strategy(PayoffStrategy::Snowball);
        snowball.total_interest = Money::from_major(500);
        snowball.months = 20;
        let mut avalanche = snowball.clone();
        avalanche.kind = PlanKind::Strategy(PayoffStrategy::Avalanche);
        avalanche.total_interest = money("500.01");
        avalanche.months = 21;

        let rec = recommend(&current, &snowball, &avalanche);
        assert_eq!(rec.best_strategy, PayoffStrategy::Snowball);
        assert_eq!(rec.interest_difference, Money::CENT);
        assert_eq!(rec.months_difference, 1);
        assert_eq!(rec.months_saved_vs_current, 20);
    }

    #[test]
    fn test_errors_propagate() {
        let loans = vec![loan(1, 12_000, 6, 50)];
        let err = compare_strategies(&loans, Money::from_major(1_000), as_of()).unwrap_err();
        assert!(matches!(err, PayoffError::NonAmortizingPayment { .. }));

        let comparator = StrategyComparator::new(PayoffConfig::default().with_max_months(12));
        let mut short = loan(1, 5_000, 10, 150);
        short.remaining_term_months = 12;
        let err = comparator.compare(&[short], Money::from_major(100), as_of()).unwrap_err();
        assert!(matches!(err, PayoffError::HorizonExceeded { .. }));

        // the stored term itself must fit the configured horizon
        let loans = vec![loan(1, 5_000, 10, 150)];
        let err = comparator.compare(&loans, Money::from_major(100), as_of()).unwrap_err();
        assert!(matches!(err, PayoffError::InvalidInput { field: "remaining_term_months", .. }));
    }

    #[test]
    fn test_comparison_serializes() {
        let loans = vec![loan(1, 1_000, 10, 50), loan(2, 5_000, 20, 150)];
        let comparison = compare_strategies(&loans, Money::from_major(300), as_of()).unwrap();

        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["recommendation"]["best_strategy"], "Avalanche");
        assert_eq!(json["avalanche"]["total_interest"], "658.00");

        let back: StrategyComparison = serde_json::from_value(json).unwrap();
        assert_eq!(back, comparison);
    }
}
