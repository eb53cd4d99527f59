use crate::domain::model::{Record, Sheet};
use crate::utils::error::{EtlError, Result};
use calamine::{Data, Reader, Xlsx};
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Xlsx,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &str) -> Result<Self> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => Ok(InputFormat::Xlsx),
            Some("csv") => Ok(InputFormat::Csv),
            _ => Err(EtlError::UnsupportedInputError {
                path: path.to_string(),
                reason: "expected an .xlsx, .xlsm or .csv file".to_string(),
            }),
        }
    }
}

/// 依副檔名解析輸入檔內容
pub fn read_sheet(source: &str, data: Vec<u8>) -> Result<Sheet> {
    match InputFormat::from_path(source)? {
        InputFormat::Xlsx => read_xlsx(source, data),
        InputFormat::Csv => read_csv(source, &data),
    }
}

/// 讀取第一個工作表，第一列為表頭
pub fn read_xlsx(source: &str, data: Vec<u8>) -> Result<Sheet> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| EtlError::UnsupportedInputError {
            path: source.to_string(),
            reason: "workbook has no worksheets".to_string(),
        })??;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(cell_text)
            .collect::<Vec<_>>(),
        None => Vec::new(),
    };

    let rows: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_text).collect()).collect();
    Ok(build_sheet(source, headers, rows))
}

pub fn read_csv(source: &str, data: &[u8]) -> Result<Sheet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(build_sheet(source, headers, rows))
}

fn build_sheet(source: &str, raw_headers: Vec<String>, rows: Vec<Vec<String>>) -> Sheet {
    let headers: Vec<String> = raw_headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = h.trim();
            if h.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                h.to_string()
            }
        })
        .collect();

    let mut sheet = Sheet::new(source, headers);
    for row in rows {
        let mut record = Record::new();
        for (header, value) in sheet.headers.iter().zip(row) {
            record.set_text(header, value);
        }
        if !record.is_blank() {
            sheet.records.push(record);
        }
    }

    tracing::debug!(
        "Read {} rows with {} columns from {}",
        sheet.records.len(),
        sheet.headers.len(),
        source
    );
    sheet
}

/// 所有儲存格都以文字處理
pub fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => datetime.format("%d/%m/%Y").to_string(),
            None => dt.as_f64().to_string(),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}
