use super::{output_file_name, read_inputs, today_or, write_outputs};
use crate::adapters::workbook::WorkbookStyle;
use crate::config::toml_config::TomlConfig;
use crate::core::{ConfigProvider, ExtractResult, Pipeline, Sheet, Storage, TransformResult};
use crate::domain::services::columns;
use crate::domain::services::fees::{fee_output_columns, process_fee_row, FeeTerms};
use crate::domain::services::royalty::RoyaltyCalculator;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use std::path::Path;

pub const ROYALTY_OUTPUT_SUFFIX: &str = "_Nhuan_but.xlsx";

/// 費用管道：讀取期限結果，依費率表填入基本與續約費用
pub struct RoyaltyPipeline<S: Storage> {
    storage: S,
    config: TomlConfig,
    calculator: RoyaltyCalculator,
}

impl<S: Storage> RoyaltyPipeline<S> {
    /// 費率表無效時回傳錯誤
    pub fn new(storage: S, config: TomlConfig) -> Result<Self> {
        let calculator = config.calculator()?;
        Ok(Self {
            storage,
            config,
            calculator,
        })
    }

    fn output_path(&self) -> String {
        match &self.config.load.output_file {
            Some(name) => Path::new(&self.config.load.output_path)
                .join(name)
                .to_string_lossy()
                .into_owned(),
            None => {
                let first_input = self
                    .config
                    .input_files()
                    .first()
                    .map(String::as_str)
                    .unwrap_or("output");
                output_file_name(&self.config.load.output_path, first_input, ROYALTY_OUTPUT_SUFFIX)
            }
        }
    }
}

#[async_trait]
impl<S> Pipeline for RoyaltyPipeline<S>
where
    S: Storage + Send + Sync,
{
    async fn extract(&self) -> Result<ExtractResult> {
        read_inputs(&self.storage, self.config.input_files()).await
    }

    async fn transform(&self, data: ExtractResult) -> Result<TransformResult> {
        let terms = FeeTerms {
            initial_term: self.config.initial_term(),
            ext_term: self.config.ext_term(),
            today: today_or(self.config.as_of()),
        };

        let source = data
            .sheets
            .first()
            .map(|s| s.source.clone())
            .unwrap_or_default();
        let mut merged = Sheet::new(source, Vec::new());
        let mut row_errors = 0;

        for sheet in &data.sheets {
            for header in &sheet.headers {
                merged.push_header(header);
            }

            for (index, input) in sheet.records.iter().enumerate() {
                let excel_row = index + 2;
                match process_fee_row(input, excel_row, &self.calculator, &terms) {
                    Ok(row) => {
                        if !row.text(columns::ERROR).trim().is_empty() {
                            row_errors += 1;
                        }
                        merged.records.push(row);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ Row {} of {} could not be processed: {}",
                            excel_row,
                            sheet.source,
                            e
                        );
                        row_errors += 1;
                        let mut row = input.clone();
                        row.set_text(columns::ERROR, e.to_string());
                        merged.records.push(row);
                    }
                }
            }
        }

        if merged.is_empty() {
            return Err(EtlError::processing("workbook has no data rows"));
        }

        for header in fee_output_columns() {
            merged.push_header(header);
        }
        merged.move_header_last(columns::LINK);

        Ok(TransformResult {
            sheet: merged,
            row_errors,
            failed_sources: data.failed_sources,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let path = self.output_path();
        write_outputs(
            &self.storage,
            &result.sheet,
            &path,
            &WorkbookStyle::royalty(),
            self.config.output_formats(),
            self.config.auto_backup(),
        )
        .await
    }
}
