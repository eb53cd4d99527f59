use crate::domain::model::Sheet;
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::io::Write;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub fn sheet_to_csv(sheet: &Sheet) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&sheet.headers)?;
    for record in &sheet.records {
        writer.write_record(sheet.headers.iter().map(|h| record.text(h)))?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

/// JSON 陣列；每列一個物件，只包含表頭中的欄位
pub fn sheet_to_json(sheet: &Sheet) -> Result<Vec<u8>> {
    let rows: Vec<Map<String, Value>> = sheet
        .records
        .iter()
        .map(|record| {
            sheet
                .headers
                .iter()
                .map(|h| (h.clone(), record.get(h).cloned().unwrap_or(Value::Null)))
                .collect()
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&rows)?)
}

/// 備份檔名：`<stem>_backup_<YYYYmmdd_HHMMSS>.zip`
pub fn backup_name(output_file: &str, at: NaiveDateTime) -> String {
    let path = Path::new(output_file);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let name = format!("{}_backup_{}.zip", stem, at.format("%Y%m%d_%H%M%S"));
    match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.join(name).to_string_lossy().into_owned(),
        None => name,
    }
}

/// 把既有的輸出檔壓成 zip
pub fn backup_archive(file_name: &str, contents: &[u8]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    zip.start_file(file_name, SimpleFileOptions::default())?;
    zip.write_all(contents)?;
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
