use crate::domain::model::{Record, Sheet};
use crate::domain::services::columns;
use crate::domain::services::links::{is_valid_video_id, watch_url};
use crate::utils::error::Result;
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatUnderline, Url, Workbook, Worksheet,
};
use serde_json::Value;

pub const TERM_SHEET_NAME: &str = "Ket qua";
pub const ROYALTY_SHEET_NAME: &str = "Kết quả";

const MAX_COLUMN_WIDTH: usize = 50;
const MAX_LINK_COLUMN_WIDTH: usize = 70;

/// 輸出活頁簿的樣式選項
#[derive(Debug, Clone, Copy)]
pub struct WorkbookStyle {
    pub sheet_name: &'static str,
    pub center_cells: bool,
    pub highlight_fees: bool,
    pub autofit: bool,
}

impl WorkbookStyle {
    pub fn term() -> Self {
        Self {
            sheet_name: TERM_SHEET_NAME,
            center_cells: false,
            highlight_fees: false,
            autofit: false,
        }
    }

    pub fn royalty() -> Self {
        Self {
            sheet_name: ROYALTY_SHEET_NAME,
            center_cells: true,
            highlight_fees: true,
            autofit: true,
        }
    }
}

struct Formats {
    header: Format,
    cell: Format,
    fee: Format,
    hyperlink: Format,
    link_column: Format,
}

impl Formats {
    fn new(style: &WorkbookStyle) -> Self {
        let mut cell = Format::new()
            .set_font_name("Times New Roman")
            .set_font_size(12)
            .set_border(FormatBorder::Thin);
        if style.center_cells {
            cell = cell
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter);
        }

        let header = cell.clone().set_background_color(Color::Yellow);
        let fee = cell
            .clone()
            .set_background_color(Color::Yellow)
            .set_num_format("#,##0");
        let hyperlink = cell
            .clone()
            .set_font_color(Color::RGB(0x0000FF))
            .set_underline(FormatUnderline::Single);
        let link_column = hyperlink
            .clone()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter);

        Self {
            header,
            cell,
            fee,
            hyperlink,
            link_column,
        }
    }
}

/// 將工作表寫成 xlsx 位元組
pub fn write_workbook(sheet: &Sheet, style: &WorkbookStyle) -> Result<Vec<u8>> {
    let formats = Formats::new(style);
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(style.sheet_name)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header.as_str(), &formats.header)?;
    }

    for (index, record) in sheet.records.iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, header) in sheet.headers.iter().enumerate() {
            write_cell(worksheet, row, col as u16, header, record, style, &formats)?;
        }
    }

    if style.autofit {
        for (col, header) in sheet.headers.iter().enumerate() {
            let longest = sheet
                .records
                .iter()
                .map(|r| r.text(header).chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            let cap = if header == columns::LINK {
                MAX_LINK_COLUMN_WIDTH
            } else {
                MAX_COLUMN_WIDTH
            };
            worksheet.set_column_width(col as u16, ((longest + 2).min(cap)) as f64)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    header: &str,
    record: &Record,
    style: &WorkbookStyle,
    formats: &Formats,
) -> Result<()> {
    let value = record.get(header).cloned().unwrap_or(Value::Null);

    if let Value::Number(number) = &value {
        let number = number.as_f64().unwrap_or_default();
        let format = if style.highlight_fees && columns::is_fee_column(header) && number != 0.0 {
            &formats.fee
        } else {
            &formats.cell
        };
        worksheet.write_number_with_format(row, col, number, format)?;
        return Ok(());
    }

    let text = record.text(header);
    if text.is_empty() {
        worksheet.write_blank(row, col, &formats.cell)?;
        return Ok(());
    }

    if header == columns::ID_VIDEO && is_valid_video_id(&text) {
        let url = Url::new(watch_url(&text)).set_text(text.as_str());
        worksheet.write_url_with_format(row, col, url, &formats.hyperlink)?;
    } else if style.highlight_fees && header == columns::LINK && text.starts_with("https://") {
        worksheet.write_url_with_format(row, col, Url::new(text.as_str()), &formats.link_column)?;
    } else {
        worksheet.write_string_with_format(row, col, text.as_str(), &formats.cell)?;
    }

    Ok(())
}
