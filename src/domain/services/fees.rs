use crate::domain::model::Record;
use crate::domain::services::columns;
use crate::domain::services::dates::{TermSchedule, MAX_RENEWALS};
use crate::domain::services::duration::royalty_time_columns;
use crate::domain::services::links::timestamped_link;
use crate::domain::services::royalty::RoyaltyCalculator;
use crate::utils::error::Result;
use chrono::NaiveDate;

#[derive(Debug, Clone, Copy)]
pub struct FeeTerms {
    pub initial_term: u32,
    pub ext_term: u32,
    pub today: NaiveDate,
}

/// 計算單列的費用欄位；保留所有輸入欄位
///
/// `excel_row` 是試算表中的列號（資料索引 + 2），只用於錯誤訊息。
pub fn process_fee_row(
    input: &Record,
    excel_row: usize,
    calculator: &RoyaltyCalculator,
    terms: &FeeTerms,
) -> Result<Record> {
    let mut output = input.clone();
    let mut notes: Vec<String> = Vec::new();

    let video_id = input.text(columns::ID_VIDEO);
    let time = royalty_time_columns(&input.text(columns::TIME));
    if time.invalid {
        notes.push(format!("Invalid time format at row {}", excel_row));
    }
    output.set_text(columns::TIME, time.time.as_str());
    output.set_text(columns::DURATION, time.duration.as_str());

    let start = input.text(columns::START_DATE);
    if !start.trim().is_empty() {
        let schedule =
            TermSchedule::compute(&start, terms.initial_term, terms.ext_term, terms.today)?;
        if schedule.term_end.is_some() {
            output.set_text(columns::TERM_END, schedule.term_end_text());
            for index in 0..MAX_RENEWALS {
                output.set_text(columns::RENEWALS[index], schedule.renewal_text(index));
            }
        }
    }

    let usage = input.text(columns::USAGE);
    if usage.trim().is_empty() {
        output.clear(columns::FEE);
        for column in columns::RENEWAL_FEES {
            output.clear(column);
        }
    } else {
        let share = input.text(columns::SHARE);
        let base = calculator.base_fee(&usage, &time.duration, &share);
        if let Some(error) = base.error {
            notes.push(error);
        }
        output.set_number(columns::FEE, base.fee);

        // 只有該次續約有日期時才計算續約費用
        for index in 0..MAX_RENEWALS {
            if output.text(columns::RENEWALS[index]).trim().is_empty() {
                output.clear(columns::RENEWAL_FEES[index]);
            } else {
                let renewal = calculator.renewal_fee(&usage, base.fee, &share);
                output.set_number(columns::RENEWAL_FEES[index], renewal);
            }
        }
    }

    output.set_text(columns::LINK, timestamped_link(&video_id, &time.time));

    if !notes.is_empty() {
        let existing = input.text(columns::ERROR);
        let joined = notes.join("; ");
        let message = if existing.trim().is_empty() {
            joined
        } else {
            format!("{}; {}", existing, joined)
        };
        output.set_text(columns::ERROR, message);
    }

    Ok(output)
}

/// 本模組寫入的欄位，依第一次出現的順序
pub fn fee_output_columns() -> Vec<&'static str> {
    let mut headers = vec![columns::TIME, columns::DURATION, columns::TERM_END];
    headers.extend(columns::RENEWALS);
    headers.push(columns::FEE);
    headers.extend(columns::RENEWAL_FEES);
    headers.push(columns::ERROR);
    headers.push(columns::LINK);
    headers
}
