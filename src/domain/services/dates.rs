use crate::utils::error::{EtlError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// 續約期最多計算五次
pub const MAX_RENEWALS: usize = 5;

/// 依序嘗試的日期格式；`true` 表示該格式含 `%Y`，必須是四位數年份
const DATE_FORMATS: &[(&str, bool)] = &[
    ("%d/%m/%Y", true),
    ("%Y-%m-%d", true),
    ("%d-%m-%Y", true),
    ("%d/%m/%y", false),
    ("%d.%m.%Y", true),
    ("%d.%m.%y", false),
    ("%Y/%m/%d", true),
    ("%m/%d/%Y", true),
    ("%d %m %Y", true),
    ("%d-%m-%y", false),
];

/// 解析多種常見的日期寫法，全部失敗時回傳 `None`
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    // 不含空白的格式只看第一段，忽略像 "00:00:00" 這樣的時間部分
    let date_part = trimmed.split(' ').next().unwrap_or(trimmed);

    DATE_FORMATS.iter().find_map(|(fmt, four_digit_year)| {
        let candidate = if fmt.contains(' ') {
            if !trimmed.contains(' ') {
                return None;
            }
            trimmed
        } else {
            date_part
        };

        let date = NaiveDate::parse_from_str(candidate, fmt).ok()?;
        if *four_digit_year {
            (date.year() >= 1000).then_some(date)
        } else {
            Some(pivot_two_digit_year(date))
        }
    })
}

/// 兩位數年份 00-68 為 2000-2068，69-99 為 1969-1999；chrono 把 69 當成 2069
fn pivot_two_digit_year(date: NaiveDate) -> NaiveDate {
    if date.year() == 2069 {
        date.with_year(1969).unwrap_or(date)
    } else {
        date
    }
}

pub fn to_ddmmyyyy(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `date + years 年 - 1 天`；2/29 在平年會落在 2/28
pub fn term_end_after(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(years.checked_mul(12)?))?
        .pred_opt()
}

/// 一筆使用紀錄的保護期與續約期
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSchedule {
    pub publication: String,
    pub start: Option<NaiveDate>,
    pub term_end: Option<NaiveDate>,
    pub renewals: Vec<NaiveDate>,
    pub error: Option<String>,
}

impl TermSchedule {
    pub fn compute(
        publication: &str,
        initial_term: u32,
        ext_term: u32,
        today: NaiveDate,
    ) -> Result<Self> {
        let mut schedule = Self {
            publication: publication.to_string(),
            start: None,
            term_end: None,
            renewals: Vec::new(),
            error: None,
        };

        let start = match parse_date(publication) {
            Some(date) => date,
            None => {
                schedule.error = Some(if publication.trim().is_empty() {
                    "Missing date".to_string()
                } else {
                    format!("Invalid date: {}", publication)
                });
                return Ok(schedule);
            }
        };
        schedule.start = Some(start);

        let term_end = term_end_after(start, initial_term).ok_or_else(|| {
            EtlError::processing(format!(
                "term of {} years from {} is out of range",
                initial_term,
                to_ddmmyyyy(start)
            ))
        })?;
        schedule.term_end = Some(term_end);

        let mut last_end = term_end;
        while schedule.renewals.len() < MAX_RENEWALS && last_end <= today {
            let renewal_end = last_end
                .succ_opt()
                .and_then(|renewal_start| term_end_after(renewal_start, ext_term))
                .ok_or_else(|| {
                    EtlError::processing(format!(
                        "renewal of {} years after {} is out of range",
                        ext_term,
                        to_ddmmyyyy(last_end)
                    ))
                })?;
            schedule.renewals.push(renewal_end);
            last_end = renewal_end;
        }

        Ok(schedule)
    }

    /// 第 `index` 次續約（從 0 起算）的顯示值
    pub fn renewal_text(&self, index: usize) -> String {
        self.renewals
            .get(index)
            .map(|d| to_ddmmyyyy(*d))
            .unwrap_or_default()
    }

    pub fn start_text(&self) -> String {
        self.start.map(to_ddmmyyyy).unwrap_or_default()
    }

    pub fn term_end_text(&self) -> String {
        self.term_end.map(to_ddmmyyyy).unwrap_or_default()
    }
}
