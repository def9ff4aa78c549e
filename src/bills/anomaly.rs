use log::debug;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::AnomalyConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::payments::validate_amount;

use super::{trailing_window, window_stats};

const Z_SCORE_DP: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalySeverity {
    Normal,
    Warning,
    Critical,
}

/// classification of a bill amount against its recent history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub amount: Money,
    pub mean: Money,
    pub std_dev: Money,
    /// standard deviations from the mean, absent when the history is flat
    pub z_score: Option<Decimal>,
    pub severity: AnomalySeverity,
    pub sample_size: usize,
}

impl AnomalyReport {
    pub fn is_anomaly(&self) -> bool {
        self.severity != AnomalySeverity::Normal
    }

    /// signed distance of the amount from the window mean
    pub fn deviation(&self) -> Money {
        self.amount - self.mean
    }
}

/// classify `current` against the trailing window of `history`
pub fn detect_anomaly(
    history: &[Money],
    current: Money,
    config: &AnomalyConfig,
) -> Result<AnomalyReport> {
    validate_amount("current", current)?;
    let window = trailing_window(history, config)?;
    let stats = window_stats(window)?;
    let diff = current.as_decimal() - stats.mean;

    let (z_score, severity) = if stats.std_dev.is_zero() {
        if diff.is_zero() {
            (Some(Decimal::ZERO), AnomalySeverity::Normal)
        } else {
            (None, AnomalySeverity::Critical)
        }
    } else {
        let z = diff / stats.std_dev;
        let severity = classify(z.abs(), config);
        (
            Some(z.round_dp_with_strategy(Z_SCORE_DP, RoundingStrategy::MidpointAwayFromZero)),
            severity,
        )
    };

    if severity != AnomalySeverity::Normal {
        debug!(
            "bill amount {} flagged {:?} against mean {:.2} over {} amounts",
            current, severity, stats.mean, stats.count
        );
    }

    Ok(AnomalyReport {
        amount: current,
        mean: Money::from_decimal(stats.mean),
        std_dev: Money::from_decimal(stats.std_dev),
        z_score,
        severity,
        sample_size: stats.count,
    })
}

fn classify(abs_z: Decimal, config: &AnomalyConfig) -> AnomalySeverity {
    if abs_z >= config.critical_z {
        AnomalySeverity::Critical
    } else if abs_z >= config.warning_z {
        AnomalySeverity::Warning
    } else {
        AnomalySeverity::Normal
    }
}
