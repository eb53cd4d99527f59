use crate::domain::model::Record;
use crate::domain::services::columns::{self, value_for};
use crate::domain::services::dates::{TermSchedule, MAX_RENEWALS};
use crate::domain::services::duration::range_columns;
use crate::domain::services::text::{combine_notes, proper_case};
use crate::utils::error::Result;
use chrono::NaiveDate;

/// 每列處理需要的選項
#[derive(Debug, Clone, Copy)]
pub struct TermOptions {
    pub initial_term: u32,
    pub ext_term: u32,
    pub auto_proper: bool,
    pub today: NaiveDate,
}

/// 子列（STT 含 `.`）沿用最近一個主列的影片與發行日期
#[derive(Debug, Clone, Default)]
pub struct SubRowState {
    video_id: String,
    publication: String,
}

const TEXT_COLUMNS: [&str; 6] = [
    columns::CODE,
    columns::TITLE,
    columns::AUTHOR,
    columns::COMPOSER,
    columns::LYRICIST,
    columns::USAGE,
];

pub fn is_sub_row(stt: &str) -> bool {
    stt.trim().contains('.')
}

/// 將輸入列轉成標準欄位的輸出列
pub fn process_row(
    input: &Record,
    state: &mut SubRowState,
    options: &TermOptions,
) -> Result<Record> {
    let mut output = Record::new();
    for column in columns::OUTPUT_COLUMNS {
        output.clear(column);
    }

    let stt = input.text(columns::STT).trim().to_string();
    output.set_text(columns::STT, stt.as_str());

    let (video_id, publication) = if is_sub_row(&stt) {
        (state.video_id.clone(), state.publication.clone())
    } else {
        state.video_id = value_for(input, columns::ID_VIDEO);
        state.publication = value_for(input, columns::PUBLISHED);
        (state.video_id.clone(), state.publication.clone())
    };
    output.set_text(columns::ID_VIDEO, video_id);

    for column in TEXT_COLUMNS {
        let value = value_for(input, column);
        if options.auto_proper && !value.is_empty() {
            output.set_text(column, proper_case(&value));
        } else {
            output.set_text(column, value);
        }
    }

    let time = range_columns(&value_for(input, columns::TIME));
    output.set_text(columns::TIME, time.time);
    output.set_text(columns::DURATION, time.duration);

    let schedule = TermSchedule::compute(
        &publication,
        options.initial_term,
        options.ext_term,
        options.today,
    )?;
    output.set_text(columns::START_DATE, schedule.start_text());
    output.set_text(columns::TERM_END, schedule.term_end_text());
    output.set_text(columns::PUBLISHED, schedule.publication.as_str());
    for index in 0..MAX_RENEWALS {
        output.set_text(columns::RENEWALS[index], schedule.renewal_text(index));
    }
    output.set_text(columns::ERROR, schedule.error.unwrap_or_default());

    output.set_text(
        columns::NOTES,
        combine_notes(
            &input.text(columns::EXCLUSIVE_NOTE),
            &input.text(columns::NOTE),
            &input.text(columns::NOTES),
        ),
    );

    let status = value_for(input, columns::STATUS);
    output.set_text(
        columns::STATUS,
        if status.is_empty() {
            columns::DEFAULT_STATUS.to_string()
        } else {
            status
        },
    );

    output.set_text(columns::SHARE, value_for(input, columns::SHARE));
    output.set_text(columns::TG_SHARE, value_for(input, columns::TG_SHARE));

    Ok(output)
}

/// 無法處理的列只保留 STT 與錯誤訊息
pub fn error_row(input: &Record, message: &str) -> Record {
    let mut output = Record::new();
    for column in columns::OUTPUT_COLUMNS {
        output.clear(column);
    }
    output.set_text(columns::STT, input.text(columns::STT).trim());
    output.set_text(columns::ERROR, message);
    output
}
