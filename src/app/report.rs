use crate::core::RunSummary;
use crate::utils::error::{ErrorSeverity, EtlError};

/// 部分輸入檔被略過時的退出碼
pub const PARTIAL_RUN_EXIT_CODE: i32 = 2;

/// 輸出執行結果，回傳退出碼（部分輸入被略過時為 2）
pub fn report_success(summary: &RunSummary) -> i32 {
    tracing::info!("✅ ETL process completed successfully!");
    println!("✅ Processed {} rows", summary.records);
    println!("📁 Output saved to: {}", summary.output_path);

    if summary.row_errors > 0 {
        println!("⚠️ {} rows have errors, see the Error column", summary.row_errors);
    }

    if summary.is_partial() {
        tracing::warn!(
            "⚠️ Skipped {} input file(s): {}",
            summary.failed_sources.len(),
            summary.failed_sources.join(", ")
        );
        eprintln!("⚠️ Skipped: {}", summary.failed_sources.join(", "));
        return PARTIAL_RUN_EXIT_CODE;
    }

    0
}

/// 記錄錯誤與建議，依嚴重程度回傳退出碼
pub fn report_failure(e: &EtlError) -> i32 {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    exit_code(e.severity())
}

pub fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
