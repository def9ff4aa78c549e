/// quick start - amortize one loan and print its schedule
use debt_payoff_rs::{Loan, Money, PayoffPlanner, Rate, SafeTimeProvider, TimeSource};
use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(log::LevelFilter::Info).init()?;

    // a $12,000 car loan at 6% with $500 monthly payments
    let loan = Loan::builder()
        .name("car")
        .balance(Money::from_major(12_000))
        .rate(Rate::from_percentage(6))
        .monthly_payment(Money::from_major(500))
        .term_months(26)
        .build()?;

    let time = SafeTimeProvider::new(TimeSource::System);
    let planner = PayoffPlanner::default();
    let schedule = planner.schedule(&loan)?;

    for period in &schedule.periods {
        println!(
            "{:>3}  payment {:>8}  interest {:>7}  principal {:>8}  balance {:>9}",
            period.period_index,
            period.payment_amount,
            period.interest_portion,
            period.principal_portion,
            period.remaining_balance
        );
    }
    println!(
        "paid off in {} months on {}, total interest {}",
        schedule.months(),
        planner.payoff_date(&loan, &time)?,
        schedule.total_interest
    );

    Ok(())
}
