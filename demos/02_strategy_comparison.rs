/// strategy comparison - snowball vs avalanche across several debts
use chrono::{TimeZone, Utc};
use debt_payoff_rs::{
    Loan, LoanType, Money, PayoffEvent, PayoffPlanner, Rate, SafeTimeProvider, TimeSource,
};
use simple_logger::SimpleLogger;

fn debt(
    name: &str,
    loan_type: LoanType,
    balance: i64,
    rate: u32,
    payment: i64,
) -> debt_payoff_rs::Result<Loan> {
    Loan::builder()
        .name(name)
        .loan_type(loan_type)
        .balance(Money::from_major(balance))
        .rate(Rate::from_percentage(rate))
        .monthly_payment(Money::from_major(payment))
        .term_months(120)
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(log::LevelFilter::Info).init()?;

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(start));
    let loans = vec![
        debt("visa", LoanType::CreditCard, 2_500, 18, 75)?,
        debt("store card", LoanType::CreditCard, 800, 24, 40)?,
        debt("student", LoanType::StudentLoan, 7_000, 7, 150)?,
        debt("personal", LoanType::PersonalLoan, 800, 9, 30)?,
    ];

    let comparison =
        PayoffPlanner::default().compare_strategies(&loans, Money::from_major(250), &time)?;

    for plan in [&comparison.current_plan, &comparison.snowball, &comparison.avalanche] {
        println!(
            "{:?}: {} months, debt free {}, interest {}",
            plan.kind, plan.months, plan.payoff_date, plan.total_interest
        );
        for event in &plan.events {
            if let PayoffEvent::LoanPaidOff { month, loan_id, interest_paid, .. } = event {
                let name = plan.loan(*loan_id).map(|l| l.name.as_str()).unwrap_or("?");
                println!("  month {:>3}: {} paid off ({} interest)", month, name, interest_paid);
            }
        }
    }

    let rec = &comparison.recommendation;
    println!(
        "recommended: {} (saves {} and {} months over the current plan)",
        rec.best_strategy, rec.interest_saved_vs_current, rec.months_saved_vs_current
    );

    Ok(())
}
