use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{PayoffError, Result};

/// hard ceiling on simulated months (50 years)
pub const DEFAULT_MAX_MONTHS: u32 = 600;

/// largest trailing window of bill amounts (ten years of monthly bills)
pub const MAX_ANOMALY_WINDOW: usize = 120;

/// payoff engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoffConfig {
    /// simulation horizon in months; schedules longer than this fail
    pub max_months: u32,
    /// upper bound accepted for a loan's annual rate
    pub max_annual_rate: Rate,
    /// bill anomaly and prediction settings
    pub anomaly: AnomalyConfig,
}

/// bill anomaly detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// number of trailing amounts considered
    pub window: usize,
    /// minimum amounts required before statistics are trusted
    pub min_history: usize,
    /// z-score at which a bill is flagged as a warning
    pub warning_z: Decimal,
    /// z-score at which a bill is flagged as critical
    pub critical_z: Decimal,
    /// relative change between half-window means that counts as a trend
    pub trend_threshold: Decimal,
}

impl Default for PayoffConfig {
    fn default() -> Self {
        Self {
            max_months: DEFAULT_MAX_MONTHS,
            max_annual_rate: Rate::from_percentage(100),
            anomaly: AnomalyConfig::default(),
        }
    }
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            window: 6,
            min_history: 3,
            warning_z: dec!(2),
            critical_z: dec!(3),
            trend_threshold: dec!(0.05),
        }
    }
}

impl PayoffConfig {
    /// configuration for long mortgages (up to 40 years)
    pub fn mortgage() -> Self {
        Self {
            max_months: 480,
            max_annual_rate: Rate::from_percentage(25),
            ..Self::default()
        }
    }

    /// configuration for consumer debt such as cards and personal loans
    pub fn consumer_debt() -> Self {
        Self {
            max_months: 360,
            max_annual_rate: Rate::from_percentage(100),
            ..Self::default()
        }
    }

    /// override the simulation horizon
    pub fn with_max_months(mut self, max_months: u32) -> Self {
        self.max_months = max_months;
        self
    }

    /// parse from json; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: PayoffConfig =
            serde_json::from_str(json).map_err(|e| PayoffError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_months == 0 || self.max_months > DEFAULT_MAX_MONTHS {
            return Err(PayoffError::InvalidConfiguration {
                message: format!("max_months must be within 1..={}", DEFAULT_MAX_MONTHS),
            });
        }
        if self.max_annual_rate.is_negative()
            || self.max_annual_rate.is_zero()
            || self.max_annual_rate > Rate::MAX_ANNUAL
        {
            return Err(PayoffError::InvalidConfiguration {
                message: format!("max_annual_rate must be within (0%, {}]", Rate::MAX_ANNUAL),
            });
        }
        self.anomaly.validate()
    }
}

impl AnomalyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_history < 2 {
            return Err(PayoffError::InvalidConfiguration {
                message: "min_history must be at least 2".to_string(),
            });
        }
        if self.window < self.min_history || self.window > MAX_ANOMALY_WINDOW {
            return Err(PayoffError::InvalidConfiguration {
                message: format!("window must be within min_history..={}", MAX_ANOMALY_WINDOW),
            });
        }
        if self.warning_z <= Decimal::ZERO || self.critical_z < self.warning_z {
            return Err(PayoffError::InvalidConfiguration {
                message: "thresholds must satisfy 0 < warning_z <= critical_z".to_string(),
            });
        }
        if self.trend_threshold.is_sign_negative() {
            return Err(PayoffError::InvalidConfiguration {
                message: "trend_threshold must not be negative".to_string(),
            });
        }
        Ok(())
    }
}
