use crate::domain::services::duration::duration_seconds;
use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_SHORT_USAGE_SECONDS: u32 = 120;
pub const DEFAULT_RENEWAL_RATIO: f64 = 0.4;

/// 一種使用形式的三級費率
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRates {
    pub full: i64,
    pub half: i64,
    pub renew: i64,
}

/// 續約費用的計算方式
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenewalPolicy {
    /// 基本費用乘上 renewal_ratio
    #[default]
    Ratio,
    /// 使用費率表的 renew 欄，並套用分成比例
    Table,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeOutcome {
    pub fee: i64,
    pub error: Option<String>,
}

/// 使用形式（不分大小寫）對應的費率表
#[derive(Debug, Clone, Default)]
pub struct FeeTable {
    rates: HashMap<String, FeeRates>,
}

impl FeeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, usage_type: &str, rates: FeeRates) -> Result<()> {
        let key = normalize_usage(usage_type);
        if key.is_empty() {
            return Err(EtlError::ValidationError {
                message: "usage type in fee table cannot be empty".to_string(),
            });
        }
        if rates.full < 0 || rates.half < 0 || rates.renew < 0 {
            return Err(EtlError::ValidationError {
                message: format!("fee rates for '{}' must not be negative", usage_type),
            });
        }
        if self.rates.insert(key, rates).is_some() {
            return Err(EtlError::ValidationError {
                message: format!("usage type '{}' appears twice in fee table", usage_type),
            });
        }
        Ok(())
    }

    pub fn get(&self, usage_type: &str) -> Option<&FeeRates> {
        self.rates.get(&normalize_usage(usage_type))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

fn normalize_usage(usage_type: &str) -> String {
    usage_type.trim().to_lowercase()
}

/// 與試算表相同的四捨六入五成雙
fn round_fee(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// 依分成比例調整費用。`50%` 形式必須可解析；小數形式只在 0 與 1 之間時套用。
pub fn apply_share(fee: i64, share: &str) -> (i64, Option<String>) {
    let share = share.trim();
    if share.is_empty() {
        return (fee, None);
    }

    if share.contains('%') {
        return match share.replace('%', "").trim().parse::<f64>() {
            Ok(pct) => (round_fee(fee as f64 * (pct / 100.0)), None),
            Err(e) => (fee, Some(format!("Cannot convert share% '{}': {}", share, e))),
        };
    }

    match share.parse::<f64>() {
        Ok(ratio) if ratio > 0.0 && ratio < 1.0 => (round_fee(fee as f64 * ratio), None),
        _ => (fee, None),
    }
}

pub struct RoyaltyCalculator {
    table: FeeTable,
    short_usage_seconds: u32,
    renewal_ratio: f64,
    renewal_policy: RenewalPolicy,
}

impl RoyaltyCalculator {
    pub fn new(table: FeeTable) -> Self {
        Self {
            table,
            short_usage_seconds: DEFAULT_SHORT_USAGE_SECONDS,
            renewal_ratio: DEFAULT_RENEWAL_RATIO,
            renewal_policy: RenewalPolicy::Ratio,
        }
    }

    pub fn with_short_usage_seconds(mut self, seconds: u32) -> Self {
        self.short_usage_seconds = seconds;
        self
    }

    pub fn with_renewal(mut self, policy: RenewalPolicy, ratio: f64) -> Self {
        self.renewal_policy = policy;
        self.renewal_ratio = ratio;
        self
    }

    /// 基本費用：短於門檻用半價，否則全價，再套用分成比例
    pub fn base_fee(&self, usage_type: &str, duration: &str, share: &str) -> FeeOutcome {
        let Some(rates) = self.table.get(usage_type) else {
            return FeeOutcome {
                fee: 0,
                error: Some(format!(
                    "Usage type '{}' is not in the fee table",
                    usage_type.trim()
                )),
            };
        };

        let fee = if duration_seconds(duration) < self.short_usage_seconds {
            rates.half
        } else {
            rates.full
        };

        let (fee, error) = apply_share(fee, share);
        FeeOutcome { fee, error }
    }

    pub fn renewal_fee(&self, usage_type: &str, base_fee: i64, share: &str) -> i64 {
        match (self.renewal_policy, self.table.get(usage_type)) {
            (RenewalPolicy::Table, Some(rates)) => apply_share(rates.renew, share).0,
            _ => round_fee(base_fee as f64 * self.renewal_ratio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calculator() -> RoyaltyCalculator {
        let mut table = FeeTable::new();
        table
            .insert(
                "Nhạc nền",
                FeeRates {
                    full: 1_000_000,
                    half: 500_000,
                    renew: 300_000,
                },
            )
            .unwrap();
        RoyaltyCalculator::new(table)
    }

    #[test]
    fn test_full_and_half_rates_by_duration() {
        let calc = calculator();
        assert_eq!(calc.base_fee("Nhạc nền", "00:02:00", "").fee, 1_000_000);
        assert_eq!(calc.base_fee("nhạc nền ", "00:01:59", "").fee, 500_000);
        assert_eq!(calc.base_fee("Nhạc nền", "", "").fee, 500_000);
    }

    #[test]
    fn test_unknown_usage_type() {
        let outcome = calculator().base_fee("Quảng cáo", "00:03:00", "");
        assert_eq!(outcome.fee, 0);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Usage type 'Quảng cáo' is not in the fee table")
        );
    }

    #[test]
    fn test_share_adjustment() {
        let calc = calculator();
        assert_eq!(calc.base_fee("Nhạc nền", "00:03:00", "50%").fee, 500_000);
        assert_eq!(calc.base_fee("Nhạc nền", "00:03:00", "0.25").fee, 250_000);
        assert_eq!(calc.base_fee("Nhạc nền", "00:03:00", "1").fee, 1_000_000);

        let bad = calc.base_fee("Nhạc nền", "00:03:00", "abc%");
        assert_eq!(bad.fee, 1_000_000);
        assert!(bad.error.unwrap().starts_with("Cannot convert share%"));
    }

    #[test]
    fn test_rounding_is_half_to_even() {
        assert_eq!(apply_share(5, "50%").0, 2);
        assert_eq!(apply_share(15, "50%").0, 8);
        assert_eq!(apply_share(3, "0.5").0, 2);
    }

    #[test]
    fn test_renewal_policies() {
        let calc = calculator();
        assert_eq!(calc.renewal_fee("Nhạc nền", 500_000, ""), 200_000);

        let table_calc = calculator().with_renewal(RenewalPolicy::Table, DEFAULT_RENEWAL_RATIO);
        assert_eq!(table_calc.renewal_fee("Nhạc nền", 500_000, "50%"), 150_000);
    }

    #[test]
    fn test_fee_table_rejects_duplicates_and_negative_rates() {
        let mut table = FeeTable::new();
        let rates = FeeRates {
            full: 10,
            half: 5,
            renew: 4,
        };
        table.insert("Karaoke", rates).unwrap();
        assert!(table.insert(" KARAOKE", rates).is_err());
        assert!(table
            .insert(
                "Live",
                FeeRates {
                    full: -1,
                    half: 0,
                    renew: 0
                }
            )
            .is_err());
        assert_eq!(table.len(), 1);
    }
}
