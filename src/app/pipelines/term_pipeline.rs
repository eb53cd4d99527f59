use super::{output_file_name, read_inputs, today_or, write_outputs};
use crate::adapters::workbook::WorkbookStyle;
use crate::core::{ConfigProvider, ExtractResult, Pipeline, Sheet, Storage, TransformResult};
use crate::domain::services::columns::{self, extra_columns};
use crate::domain::services::rows::{error_row, process_row, SubRowState, TermOptions};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;

pub const TERM_OUTPUT_SUFFIX: &str = "_Ket_qua.xlsx";

/// 期限管道：合併所有輸入檔，計算起算日、到期日與續約日期
pub struct TermPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> TermPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn options(&self) -> TermOptions {
        TermOptions {
            initial_term: self.config.initial_term(),
            ext_term: self.config.ext_term(),
            auto_proper: self.config.auto_proper(),
            today: today_or(self.config.as_of()),
        }
    }
}

#[async_trait]
impl<S, C> Pipeline for TermPipeline<S, C>
where
    S: Storage + Send + Sync,
    C: ConfigProvider + Send + Sync,
{
    async fn extract(&self) -> Result<ExtractResult> {
        read_inputs(&self.storage, self.config.input_files()).await
    }

    async fn transform(&self, data: ExtractResult) -> Result<TransformResult> {
        let options = self.options();
        tracing::debug!(
            "Term options: initial={} ext={} proper={} today={}",
            options.initial_term,
            options.ext_term,
            options.auto_proper,
            options.today
        );

        let source = data
            .sheets
            .first()
            .map(|s| s.source.clone())
            .unwrap_or_default();
        let mut merged = Sheet::new(
            source,
            columns::OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        );
        let mut row_errors = 0;

        for sheet in &data.sheets {
            let extras: Vec<String> = extra_columns(&sheet.headers)
                .into_iter()
                .map(str::to_string)
                .collect();
            for extra in &extras {
                merged.push_header(extra);
            }

            // 子列狀態不跨檔案
            let mut state = SubRowState::default();
            for (index, input) in sheet.records.iter().enumerate() {
                let mut output = match process_row(input, &mut state, &options) {
                    Ok(row) => row,
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ Row {} of {} could not be processed: {}",
                            index + 2,
                            sheet.source,
                            e
                        );
                        row_errors += 1;
                        error_row(input, &e.to_string())
                    }
                };
                for extra in &extras {
                    output.set_text(extra, input.text(extra));
                }
                merged.records.push(output);
            }
        }

        if merged.is_empty() {
            return Err(EtlError::processing("Input files contain no data rows"));
        }

        Ok(TransformResult {
            sheet: merged,
            row_errors,
            failed_sources: data.failed_sources,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let first_input = self
            .config
            .input_files()
            .first()
            .map(String::as_str)
            .unwrap_or("output");
        let path = output_file_name(self.config.output_path(), first_input, TERM_OUTPUT_SUFFIX);

        write_outputs(
            &self.storage,
            &result.sheet,
            &path,
            &WorkbookStyle::term(),
            self.config.output_formats(),
            self.config.auto_backup(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Record;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStorage {
        files: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl Storage for MemoryStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.files
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| EtlError::processing(format!("missing {}", path)))
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn exists(&self, path: &str) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }
    }

    struct TestConfig {
        inputs: Vec<String>,
        formats: Vec<String>,
    }

    impl ConfigProvider for TestConfig {
        fn input_files(&self) -> &[String] {
            &self.inputs
        }
        fn output_path(&self) -> &str {
            "out"
        }
        fn initial_term(&self) -> u32 {
            2
        }
        fn ext_term(&self) -> u32 {
            2
        }
        fn auto_proper(&self) -> bool {
            true
        }
        fn auto_backup(&self) -> bool {
            false
        }
        fn output_formats(&self) -> &[String] {
            &self.formats
        }
        fn as_of(&self) -> Option<NaiveDate> {
            NaiveDate::from_ymd_opt(2024, 6, 1)
        }
    }

    fn row(pairs: &[(&str, &str)]) -> Record {
        let mut record = Record::new();
        for (k, v) in pairs {
            record.set_text(k, *v);
        }
        record
    }

    fn pipeline() -> TermPipeline<MemoryStorage, TestConfig> {
        TermPipeline::new(
            MemoryStorage::default(),
            TestConfig {
                inputs: vec!["a.csv".to_string()],
                formats: vec!["xlsx".to_string(), "csv".to_string()],
            },
        )
    }

    #[tokio::test]
    async fn test_transform_merges_sheets_and_carries_extras() {
        let mut first = Sheet::new(
            "a.csv",
            vec!["STT".into(), "ID Video".into(), "Ngày xuất bản".into(), "Kênh".into()],
        );
        first.records.push(row(&[
            ("STT", "1"),
            ("ID Video", "dQw4w9WgXcQ"),
            ("Ngày xuất bản", "15/03/2020"),
            ("Kênh", "POPS"),
        ]));
        first.records.push(row(&[("STT", "1.1")]));
        let mut second = Sheet::new("b.csv", vec!["STT".into(), "Album".into()]);
        second.records.push(row(&[("STT", "2"), ("Album", "Xuân")]));

        let result = pipeline()
            .transform(ExtractResult {
                sheets: vec![first, second],
                failed_sources: vec!["c.xlsx".to_string()],
            })
            .await
            .unwrap();

        let sheet = result.sheet;
        assert_eq!(sheet.len(), 3);
        assert_eq!(&sheet.headers[..29], &columns::OUTPUT_COLUMNS.map(String::from)[..]);
        assert_eq!(&sheet.headers[29..], &["Kênh".to_string(), "Album".to_string()]);
        assert_eq!(sheet.records[1].text(columns::ID_VIDEO), "dQw4w9WgXcQ");
        assert_eq!(sheet.records[1].text(columns::START_DATE), "15/03/2020");
        assert_eq!(sheet.records[0].text("Kênh"), "POPS");
        assert_eq!(sheet.records[2].text("Album"), "Xuân");
        assert_eq!(result.failed_sources, vec!["c.xlsx"]);
    }

    #[tokio::test]
    async fn test_transform_rejects_empty_inputs() {
        let result = pipeline()
            .transform(ExtractResult {
                sheets: vec![Sheet::new("a.csv", vec!["STT".into()])],
                failed_sources: vec![],
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_load_writes_named_outputs() {
        let pipeline = pipeline();
        let mut sheet = Sheet::new("a.csv", vec!["STT".into()]);
        sheet.records.push(row(&[("STT", "1")]));

        let path = pipeline
            .load(TransformResult {
                sheet,
                row_errors: 0,
                failed_sources: vec![],
            })
            .await
            .unwrap();

        assert!(path.ends_with("a_Ket_qua.xlsx"));
        assert!(pipeline.storage.exists(&path).await);
        let csv_path = path.replace(".xlsx", ".csv");
        assert!(pipeline.storage.exists(&csv_path).await);
    }

    #[tokio::test]
    async fn test_extract_skips_unreadable_inputs() {
        let storage = MemoryStorage::default();
        storage
            .write_file("ok.csv", "STT,Tên tác phẩm\n1,bài ca\n".as_bytes())
            .await
            .unwrap();
        let pipeline = TermPipeline::new(
            storage,
            TestConfig {
                inputs: vec!["ok.csv".to_string(), "gone.csv".to_string()],
                formats: vec![],
            },
        );

        let extracted = pipeline.extract().await.unwrap();
        assert_eq!(extracted.sheets.len(), 1);
        assert_eq!(extracted.failed_sources, vec!["gone.csv"]);
    }
}
