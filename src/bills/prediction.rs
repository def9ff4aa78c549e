use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::AnomalyConfig;
use crate::decimal::Money;
use crate::errors::Result;

use super::{mean_of, trailing_window, window_stats};

/// band width of a prediction in standard deviations
const BAND_STD_DEVS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

/// expected next amount of a recurring bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillPrediction {
    pub predicted_amount: Money,
    pub lower_bound: Money,
    pub upper_bound: Money,
    pub std_dev: Money,
    pub trend: Trend,
    pub sample_size: usize,
}

impl BillPrediction {
    pub fn contains(&self, amount: Money) -> bool {
        amount >= self.lower_bound && amount <= self.upper_bound
    }
}

pub fn predict_next(history: &[Money], config: &AnomalyConfig) -> Result<BillPrediction> {
    let window = trailing_window(history, config)?;
    let stats = window_stats(window)?;
    let band = stats.std_dev * Decimal::from(BAND_STD_DEVS);

    Ok(BillPrediction {
        predicted_amount: Money::from_decimal(stats.mean),
        lower_bound: Money::from_decimal((stats.mean - band).max(Decimal::ZERO)),
        upper_bound: Money::from_decimal(stats.mean + band),
        std_dev: Money::from_decimal(stats.std_dev),
        trend: trend_of(window, config.trend_threshold),
        sample_size: stats.count,
    })
}

/// compare the older and newer halves of the window; the middle amount of an
/// odd-sized window belongs to neither
fn trend_of(window: &[Money], threshold: Decimal) -> Trend {
    let half = window.len() / 2;
    if half == 0 {
        return Trend::Stable;
    }
    let older = mean_of(&window[..half]);
    let newer = mean_of(&window[window.len() - half..]);

    if older.is_zero() {
        return if newer > Decimal::ZERO { Trend::Rising } else { Trend::Stable };
    }
    let change = (newer - older) / older;
    if change > threshold {
        Trend::Rising
    } else if change < -threshold {
        Trend::Falling
    } else {
        Trend::Stable
    }
}
