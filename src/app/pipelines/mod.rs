pub mod royalty_pipeline;
pub mod term_pipeline;

use crate::adapters::export::{backup_archive, backup_name, sheet_to_csv, sheet_to_json};
use crate::adapters::spreadsheet::read_sheet;
use crate::adapters::workbook::{write_workbook, WorkbookStyle};
use crate::core::{ExtractResult, Sheet, Storage};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDate;
use std::path::Path;

/// 讀取所有輸入檔；單一檔案失敗只記錄並略過
pub(crate) async fn read_inputs<S: Storage>(
    storage: &S,
    inputs: &[String],
) -> Result<ExtractResult> {
    let mut result = ExtractResult::default();

    for path in inputs {
        tracing::debug!("Reading input file: {}", path);
        let sheet = match storage.read_file(path).await {
            Ok(data) => read_sheet(path, data),
            Err(e) => Err(e),
        };

        match sheet {
            Ok(sheet) => {
                tracing::info!("📄 Loaded {} ({} rows)", path, sheet.len());
                result.sheets.push(sheet);
            }
            Err(e) => {
                tracing::error!(
                    "❌ Failed to read {} - it may be open in another program. Skipping. ({})",
                    path,
                    e
                );
                result.failed_sources.push(path.clone());
            }
        }
    }

    if result.sheets.is_empty() {
        return Err(EtlError::processing("No valid inputs could be read"));
    }

    Ok(result)
}

/// `<第一個輸入檔名>_<suffix>` 放在輸出目錄下
pub(crate) fn output_file_name(output_dir: &str, first_input: &str, suffix: &str) -> String {
    let stem = Path::new(first_input)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    Path::new(output_dir)
        .join(format!("{}{}", stem, suffix))
        .to_string_lossy()
        .into_owned()
}

pub(crate) fn today_or(as_of: Option<NaiveDate>) -> NaiveDate {
    as_of.unwrap_or_else(|| chrono::Local::now().date_naive())
}

/// 寫出 xlsx（必要時先備份舊檔），再依設定輸出 csv / json
pub(crate) async fn write_outputs<S: Storage>(
    storage: &S,
    sheet: &Sheet,
    xlsx_path: &str,
    style: &WorkbookStyle,
    formats: &[String],
    auto_backup: bool,
) -> Result<String> {
    if auto_backup && storage.exists(xlsx_path).await {
        let previous = storage.read_file(xlsx_path).await?;
        let file_name = Path::new(xlsx_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("previous.xlsx");
        let archive = backup_archive(file_name, &previous)?;
        let backup_path = backup_name(xlsx_path, chrono::Local::now().naive_local());
        storage.write_file(&backup_path, &archive).await?;
        tracing::info!("🗄️ Backed up previous result to {}", backup_path);
    }

    let workbook = write_workbook(sheet, style)?;
    tracing::debug!("Writing workbook ({} bytes) to {}", workbook.len(), xlsx_path);
    storage.write_file(xlsx_path, &workbook).await?;

    for format in formats {
        let (data, extension) = match format.as_str() {
            "csv" => (sheet_to_csv(sheet)?, "csv"),
            "json" => (sheet_to_json(sheet)?, "json"),
            _ => continue,
        };
        let path = Path::new(xlsx_path)
            .with_extension(extension)
            .to_string_lossy()
            .into_owned();
        storage.write_file(&path, &data).await?;
        tracing::info!("📝 Wrote {} export to {}", extension, path);
    }

    Ok(xlsx_path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        let name = output_file_name("out", "data/Danh sach T9.xlsx", "_Ket_qua.xlsx");
        assert_eq!(
            name,
            Path::new("out")
                .join("Danh sach T9_Ket_qua.xlsx")
                .to_string_lossy()
        );
    }

    #[test]
    fn test_today_or_prefers_pinned_date() {
        let pinned = NaiveDate::from_ymd_opt(2026, 10, 19);
        assert_eq!(Some(today_or(pinned)), pinned);
    }
}
