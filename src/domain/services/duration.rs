use std::fmt;

const SECONDS_PER_DAY: u32 = 86_400;

/// 一天內的時間點，總是以 `HH:MM:SS` 顯示
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    seconds: u32,
}

impl ClockTime {
    pub fn from_seconds(seconds: u32) -> Option<Self> {
        (seconds < SECONDS_PER_DAY).then_some(Self { seconds })
    }

    /// 接受 `H:M:S`、`M:S` 或純秒數
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let parts: Vec<&str> = text.split(':').collect();
        let numbers: Option<Vec<u32>> = parts.iter().map(|p| p.trim().parse().ok()).collect();
        match numbers?.as_slice() {
            [h, m, s] if *h < 24 && *m < 60 && *s < 60 => Self::from_seconds(h * 3600 + m * 60 + s),
            [m, s] if *m < 60 && *s < 60 => Self::from_seconds(m * 60 + s),
            [secs] => Self::from_seconds(*secs),
            _ => None,
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.seconds
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_hms(self.seconds))
    }
}

pub fn format_hms(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// 「時間」欄位的分類結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeCell {
    Empty,
    Single(ClockTime),
    Range(ClockTime, ClockTime),
    /// 含 `-` 但起訖無法解析；保留原文，不視為錯誤
    BadRange(String),
    /// 單一值無法解析
    Invalid(String),
}

impl TimeCell {
    pub fn parse(text: &str) -> Self {
        let original = text.trim();
        if original.is_empty() {
            return TimeCell::Empty;
        }

        let normalized = original.replace(|c: char| c == '\u{2013}' || c == '\u{2014}', "-");
        if !normalized.contains('-') {
            return match ClockTime::parse(&normalized) {
                Some(clock) => TimeCell::Single(clock),
                None => TimeCell::Invalid(original.to_string()),
            };
        }

        let parts: Vec<&str> = normalized.split('-').collect();
        match parts.as_slice() {
            [start, end] => match (ClockTime::parse(start), ClockTime::parse(end)) {
                (Some(start), Some(end)) => TimeCell::Range(start, end),
                _ => TimeCell::BadRange(original.to_string()),
            },
            _ => TimeCell::BadRange(original.to_string()),
        }
    }

    /// 區間長度（秒）；跨午夜時補上一天
    pub fn duration_seconds(&self) -> Option<u32> {
        match self {
            TimeCell::Range(start, end) => {
                let (start, end) = (start.total_seconds(), end.total_seconds());
                Some(if end >= start {
                    end - start
                } else {
                    end + SECONDS_PER_DAY - start
                })
            }
            _ => None,
        }
    }
}

/// 正規化後的「時間」與「時長」欄位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeColumns {
    pub time: String,
    pub duration: String,
    pub seconds: u32,
    pub invalid: bool,
}

/// 保護期管道：只改寫合法的區間，其他維持原樣
pub fn range_columns(text: &str) -> TimeColumns {
    let cell = TimeCell::parse(text);
    match (&cell, cell.duration_seconds()) {
        (TimeCell::Range(start, end), Some(seconds)) => TimeColumns {
            time: format!("{} - {}", start, end),
            duration: format_hms(seconds),
            seconds,
            invalid: false,
        },
        _ => TimeColumns {
            time: text.to_string(),
            duration: String::new(),
            seconds: 0,
            invalid: false,
        },
    }
}

/// 版稅管道：單一時間點也會正規化，不合法的值會被標記
pub fn royalty_time_columns(text: &str) -> TimeColumns {
    let cell = TimeCell::parse(text);
    match cell {
        TimeCell::Empty => TimeColumns {
            time: String::new(),
            duration: String::new(),
            seconds: 0,
            invalid: false,
        },
        TimeCell::Single(clock) => TimeColumns {
            time: clock.to_string(),
            duration: String::new(),
            seconds: 0,
            invalid: false,
        },
        TimeCell::Range(..) => range_columns(text),
        TimeCell::BadRange(original) => TimeColumns {
            time: original,
            duration: String::new(),
            seconds: 0,
            invalid: false,
        },
        TimeCell::Invalid(original) => TimeColumns {
            time: original,
            duration: String::new(),
            seconds: 0,
            invalid: true,
        },
    }
}

/// 把 `HH:MM:SS` 或 `MM:SS` 形式的時長換回秒數，其他情況為 0
pub fn duration_seconds(text: &str) -> u32 {
    let parts: Vec<&str> = text.trim().split(':').collect();
    let numbers: Option<Vec<u32>> = parts.iter().map(|p| p.trim().parse().ok()).collect();
    match numbers.as_deref() {
        Some([h, m, s]) => h * 3600 + m * 60 + s,
        Some([m, s]) => m * 60 + s,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_parse_variants() {
        assert_eq!(ClockTime::parse("1:02:03").unwrap().to_string(), "01:02:03");
        assert_eq!(ClockTime::parse("4:56").unwrap().to_string(), "00:04:56");
        assert_eq!(ClockTime::parse("75").unwrap().to_string(), "00:01:15");
        assert!(ClockTime::parse("24:00:00").is_none());
        assert!(ClockTime::parse("00:60").is_none());
        assert!(ClockTime::parse("86400").is_none());
        assert!(ClockTime::parse("abc").is_none());
    }

    #[test]
    fn test_range_columns_rewrites_valid_range() {
        let cols = range_columns("00:00 - 04:56");
        assert_eq!(cols.time, "00:00:00 - 00:04:56");
        assert_eq!(cols.duration, "00:04:56");
        assert_eq!(cols.seconds, 296);
    }

    #[test]
    fn test_range_columns_cross_midnight() {
        let cols = range_columns("23:30:00 - 01:15:00");
        assert_eq!(cols.duration, "01:45:00");
    }

    #[test]
    fn test_range_columns_keeps_unparseable_text() {
        let cols = range_columns("intro - 3:xx");
        assert_eq!(cols.time, "intro - 3:xx");
        assert_eq!(cols.duration, "");
        assert_eq!(range_columns("04:56").time, "04:56");
    }

    #[test]
    fn test_royalty_columns_normalize_dashes_and_single_values() {
        let cols = royalty_time_columns("1:00 \u{2013} 2:30");
        assert_eq!(cols.time, "00:01:00 - 00:02:30");
        assert_eq!(cols.duration, "00:01:30");

        let single = royalty_time_columns("4:56");
        assert_eq!(single.time, "00:04:56");
        assert_eq!(single.duration, "");
        assert!(!single.invalid);

        let bad = royalty_time_columns("later");
        assert!(bad.invalid);
        assert_eq!(bad.time, "later");
    }

    #[test]
    fn test_royalty_columns_keep_bad_ranges_without_flag() {
        for text in ["intro - 3:xx", "1-2-3"] {
            let cols = royalty_time_columns(text);
            assert_eq!(cols.time, text);
            assert_eq!(cols.duration, "");
            assert!(!cols.invalid);
        }
        assert_eq!(
            TimeCell::parse("intro - 3:xx"),
            TimeCell::BadRange("intro - 3:xx".to_string())
        );
        assert_eq!(TimeCell::parse("3:xx"), TimeCell::Invalid("3:xx".to_string()));
    }

    #[test]
    fn test_duration_seconds() {
        assert_eq!(duration_seconds("00:01:59"), 119);
        assert_eq!(duration_seconds("02:00"), 120);
        assert_eq!(duration_seconds(""), 0);
        assert_eq!(duration_seconds("two minutes"), 0);
    }
}
