//! bill analytics over a history of monthly amounts
//!
//! Both operations look only at the trailing `window` amounts of the
//! history and use the population standard deviation of that window.

pub mod anomaly;
pub mod prediction;

use rust_decimal::prelude::*;

use crate::config::AnomalyConfig;
use crate::decimal::Money;
use crate::errors::{PayoffError, Result};
use crate::payments::validate_amount;

pub use anomaly::{detect_anomaly, AnomalyReport, AnomalySeverity};
pub use prediction::{predict_next, BillPrediction, Trend};

/// mean and spread of a window of amounts
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct WindowStats {
    pub count: usize,
    pub mean: Decimal,
    pub std_dev: Decimal,
}

/// trailing slice of `history` the statistics are computed over
pub(crate) fn trailing_window<'a>(
    history: &'a [Money],
    config: &AnomalyConfig,
) -> Result<&'a [Money]> {
    config.validate()?;
    if history.len() < config.min_history {
        return Err(PayoffError::InsufficientHistory {
            required: config.min_history,
            available: history.len(),
        });
    }
    for amount in history {
        validate_amount("history", *amount)?;
    }
    let start = history.len().saturating_sub(config.window);
    Ok(&history[start..])
}

pub(crate) fn mean_of(amounts: &[Money]) -> Decimal {
    if amounts.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = amounts.iter().map(|a| a.as_decimal()).sum();
    total / Decimal::from(amounts.len())
}

pub(crate) fn window_stats(window: &[Money]) -> Result<WindowStats> {
    let mean = mean_of(window);
    let squares: Decimal = window
        .iter()
        .map(|a| {
            let diff = a.as_decimal() - mean;
            diff * diff
        })
        .sum();
    let variance = if window.is_empty() {
        Decimal::ZERO
    } else {
        squares / Decimal::from(window.len())
    };
    let std_dev = variance
        .sqrt()
        .ok_or_else(|| PayoffError::invalid("history", "variance out of range"))?;

    Ok(WindowStats {
        count: window.len(),
        mean,
        std_dev,
    })
}
