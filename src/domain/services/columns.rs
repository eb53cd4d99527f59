use crate::domain::model::Record;
use std::collections::HashSet;

pub const STT: &str = "STT";
pub const ID_VIDEO: &str = "ID Video";
pub const CODE: &str = "Code";
pub const TITLE: &str = "Tên tác phẩm";
pub const AUTHOR: &str = "Tác giả";
pub const COMPOSER: &str = "Tên tác giả nhạc";
pub const LYRICIST: &str = "Tên tác giả lời";
pub const TIME: &str = "Thời gian";
pub const DURATION: &str = "Thời lượng";
pub const START_DATE: &str = "Ngày bắt đầu";
pub const TERM_END: &str = "Thời hạn kết thúc";
pub const USAGE: &str = "Hình thức sử dụng";
pub const FEE: &str = "Mức nhuận bút";
pub const ERROR: &str = "Error";
pub const SHARE: &str = "Share%";
pub const TG_SHARE: &str = "TGShare";
pub const NOTES: &str = "Ghi chú";
pub const STATUS: &str = "Tình trạng";
pub const PUBLISHED: &str = "Ngày xuất bản";
pub const LINK: &str = "Link YouTube Timestamp";

pub const EXCLUSIVE_NOTE: &str = "Ghi Chú Độc Quyền";
pub const NOTE: &str = "NOTE";

pub const DEFAULT_STATUS: &str = "Available (Hoạt động)";

pub const RENEWALS: [&str; 5] = [
    "Gia hạn (lần 1)",
    "Gia hạn (lần 2)",
    "Gia hạn (lần 3)",
    "Gia hạn (lần 4)",
    "Gia hạn (lần 5)",
];

pub const RENEWAL_FEES: [&str; 5] = [
    "Mức nhuận bút gia hạn (lần 1)",
    "Mức nhuận bút gia hạn (lần 2)",
    "Mức nhuận bút gia hạn (lần 3)",
    "Mức nhuận bút gia hạn (lần 4)",
    "Mức nhuận bút gia hạn (lần 5)",
];

/// 輸出工作表的標準欄位順序
pub const OUTPUT_COLUMNS: [&str; 29] = [
    STT,
    ID_VIDEO,
    CODE,
    TITLE,
    AUTHOR,
    COMPOSER,
    LYRICIST,
    TIME,
    DURATION,
    START_DATE,
    TERM_END,
    RENEWALS[0],
    RENEWALS[1],
    RENEWALS[2],
    RENEWALS[3],
    RENEWALS[4],
    USAGE,
    FEE,
    RENEWAL_FEES[0],
    RENEWAL_FEES[1],
    RENEWAL_FEES[2],
    RENEWAL_FEES[3],
    RENEWAL_FEES[4],
    ERROR,
    SHARE,
    TG_SHARE,
    NOTES,
    STATUS,
    PUBLISHED,
];

/// 標準欄位 -> 輸入檔可能出現的欄名
const HEADER_ALIASES: &[(&str, &[&str])] = &[
    (STT, &["STT"]),
    (ID_VIDEO, &["ID (Video)", "ID Video"]),
    (CODE, &["Code"]),
    (TITLE, &["Tên Tác Phẩm", "Tên tác phẩm"]),
    (AUTHOR, &["Tác Giả", "Tên Tác giả"]),
    (COMPOSER, &["Tác giả nhạc"]),
    (LYRICIST, &["Tác giả lời"]),
    (
        TIME,
        &[
            "Thời gian",
            "Vị trí bài hát trong link\n(Từ giờ:phút:giây đến giờ:phút:giây)",
        ],
    ),
    (USAGE, &["Hình thức sử dụng", "Hình thức"]),
    (SHARE, &["Tỉ lệ % Share", "Share%"]),
    (NOTES, &[EXCLUSIVE_NOTE, NOTE, "Ghi chú"]),
    (STATUS, &["Status", "Tình trạng"]),
    (PUBLISHED, &["Ngày xuất bản", "Thời điểm xuất bản"]),
];

pub fn aliases_for(column: &str) -> Vec<&str> {
    HEADER_ALIASES
        .iter()
        .find(|(canonical, _)| *canonical == column)
        .map(|(_, aliases)| aliases.to_vec())
        .unwrap_or_else(|| vec![column])
}

/// 依別名順序取第一個非空值
pub fn value_for(record: &Record, column: &str) -> String {
    aliases_for(column)
        .into_iter()
        .map(|alias| record.text(alias))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

fn known_input_columns() -> HashSet<&'static str> {
    HEADER_ALIASES
        .iter()
        .flat_map(|(_, aliases)| aliases.iter().copied())
        .chain(OUTPUT_COLUMNS.iter().copied())
        .collect()
}

/// 既非別名也非標準欄位的輸入欄位，會原樣附在輸出最後
pub fn extra_columns<'a>(headers: &'a [String]) -> Vec<&'a str> {
    let known = known_input_columns();
    headers
        .iter()
        .map(String::as_str)
        .filter(|h| !known.contains(h))
        .collect()
}

pub fn is_fee_column(column: &str) -> bool {
    column == FEE || RENEWAL_FEES.contains(&column)
}
