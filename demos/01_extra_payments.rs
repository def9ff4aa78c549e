/// extra payments - recurring extra payments and one-time prepayments
use chrono::{TimeZone, Utc};
use debt_payoff_rs::{
    Loan, Money, OverpaymentStrategy, PayoffPlanner, Rate, SafeTimeProvider, TimeSource,
};
use simple_logger::SimpleLogger;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new().with_level(log::LevelFilter::Debug).init()?;

    let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    let time = SafeTimeProvider::new(TimeSource::Test(start));
    let planner = PayoffPlanner::default();

    // term loan whose payment is derived from the term
    let mortgage = Loan::builder()
        .name("mortgage")
        .balance(Money::from_major(250_000))
        .rate(Rate::from_bps(650))
        .term_months(360)
        .build()?;
    println!("mortgage payment: {}", mortgage.monthly_payment);

    for extra in [50, 100, 250, 500] {
        let impact = planner.extra_payment_impact(&mortgage, Money::from_major(extra), &time)?;
        println!(
            "extra {:>4}/month: {:>3} months sooner ({}), saves {} interest",
            extra, impact.months_saved, impact.new_payoff_date, impact.interest_saved
        );
    }

    for strategy in [OverpaymentStrategy::ReduceTerm, OverpaymentStrategy::ReducePayment] {
        let impact =
            planner.lump_sum_impact(&mortgage, Money::from_major(20_000), strategy, &time)?;
        println!(
            "lump sum 20000 ({:?}): payment {} -> {}, {} months saved, {} interest saved",
            strategy,
            impact.old_payment,
            impact.new_payment,
            impact.months_saved,
            impact.interest_saved
        );
    }

    Ok(())
}
