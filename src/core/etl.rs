use crate::core::{Pipeline, RunSummary};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("🚀 Starting ETL process");

        // Extract
        let extracted = self.pipeline.extract().await?;
        let input_rows: usize = extracted.sheets.iter().map(|s| s.len()).sum();
        tracing::info!(
            "📥 Extracted {} rows from {} file(s)",
            input_rows,
            extracted.sheets.len()
        );
        self.monitor.log_stats("Extract");

        // Transform
        let transformed = self.pipeline.transform(extracted).await?;
        let records = transformed.sheet.len();
        let row_errors = transformed.row_errors;
        let failed_sources = transformed.failed_sources.clone();
        tracing::info!(
            "🔄 Transformed {} rows ({} with errors)",
            records,
            row_errors
        );
        self.monitor.log_stats("Transform");

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            output_path,
            records,
            row_errors,
            failed_sources,
        })
    }
}
