// Adapters layer: concrete formats for external files (xlsx/csv input, styled xlsx output,
// csv/json exports and zip backups). Storage backends live under src/config.

pub mod export;
pub mod spreadsheet;
pub mod workbook;
