use royalty_etl::adapters::spreadsheet::read_xlsx;
use royalty_etl::core::Sheet;
use royalty_etl::domain::services::columns::{self, OUTPUT_COLUMNS, RENEWALS};
use royalty_etl::{CliConfig, EtlEngine, LocalStorage, TermPipeline};
use clap::Parser;
use rust_xlsxwriter::Workbook;
use std::path::Path;
use tempfile::TempDir;

fn write_input(path: &Path, headers: &[&str], rows: &[Vec<&str>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, col as u16, *header).unwrap();
    }
    for (row, values) in rows.iter().enumerate() {
        for (col, value) in values.iter().enumerate() {
            if !value.is_empty() {
                sheet
                    .write_string(row as u32 + 1, col as u16, *value)
                    .unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

fn write_sample_input(dir: &TempDir) -> String {
    let path = dir.path().join("Danh sach.xlsx");
    write_input(
        &path,
        &[
            "STT",
            "ID Video",
            "Tên tác phẩm",
            "Thời điểm xuất bản",
            "Thời gian",
            "Hình thức",
            "Tỉ lệ % Share",
            "Kênh",
        ],
        &[
            vec![
                "1",
                "dQw4w9WgXcQ",
                "bài hát mùa xuân",
                "15/03/2020",
                "1:00-4:00",
                "nhạc nền",
                "50%",
                "POPS",
            ],
            vec!["1.1", "", "đoạn hai", "", "", "", "", ""],
            vec!["2", "abcdefghijk", "ca khúc", "not a date", "", "", "", "VTV"],
        ],
    );
    path.to_string_lossy().into_owned()
}

fn read_output(path: &str) -> Sheet {
    let data = std::fs::read(path).unwrap();
    read_xlsx(path, data).unwrap()
}

fn run_args(input: &[String], output_dir: &Path, extra: &[&str]) -> CliConfig {
    let mut args = vec!["royalty-etl".to_string()];
    args.extend(input.iter().cloned());
    args.push("--output-path".to_string());
    args.push(output_dir.to_string_lossy().into_owned());
    args.push("--as-of".to_string());
    args.push("19/10/2026".to_string());
    args.extend(extra.iter().map(|s| s.to_string()));
    CliConfig::parse_from(args)
}

#[tokio::test]
async fn test_term_pipeline_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_sample_input(&dir);
    let out_dir = dir.path().join("out");

    let config = run_args(&[input], &out_dir, &["--no-backup"]);
    let pipeline = TermPipeline::new(LocalStorage::new(".".to_string()), config);
    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(summary.output_path.ends_with("Danh sach_Ket_qua.xlsx"));
    assert_eq!(summary.records, 3);
    assert!(!summary.is_partial());

    let sheet = read_output(&summary.output_path);
    let expected: Vec<String> = OUTPUT_COLUMNS.iter().map(|c| c.to_string()).collect();
    assert_eq!(&sheet.headers[..OUTPUT_COLUMNS.len()], &expected[..]);
    assert_eq!(sheet.headers[OUTPUT_COLUMNS.len()..], ["Kênh".to_string()]);
    assert_eq!(sheet.len(), 3);

    let main = &sheet.records[0];
    assert_eq!(main.text(columns::TITLE), "Bài Hát Mùa Xuân");
    assert_eq!(main.text(columns::USAGE), "Nhạc Nền");
    assert_eq!(main.text(columns::SHARE), "50%");
    assert_eq!(main.text(columns::TIME), "00:01:00 - 00:04:00");
    assert_eq!(main.text(columns::DURATION), "00:03:00");
    assert_eq!(main.text(columns::START_DATE), "15/03/2020");
    assert_eq!(main.text(columns::TERM_END), "14/03/2022");
    assert_eq!(main.text(RENEWALS[0]), "14/03/2024");
    assert_eq!(main.text(RENEWALS[1]), "14/03/2026");
    assert_eq!(main.text(RENEWALS[2]), "");
    assert_eq!(main.text(columns::STATUS), columns::DEFAULT_STATUS);
    assert_eq!(main.text("Kênh"), "POPS");

    let sub = &sheet.records[1];
    assert_eq!(sub.text(columns::STT), "1.1");
    assert_eq!(sub.text(columns::ID_VIDEO), "dQw4w9WgXcQ");
    assert_eq!(sub.text(columns::START_DATE), "15/03/2020");

    let bad = &sheet.records[2];
    assert_eq!(bad.text(columns::ERROR), "Invalid date: not a date");
    assert_eq!(bad.text(columns::TERM_END), "");
}

#[tokio::test]
async fn test_term_pipeline_merges_files_and_skips_unreadable_ones() {
    let dir = TempDir::new().unwrap();
    let first = write_sample_input(&dir);
    let second = dir.path().join("them.csv");
    std::fs::write(
        &second,
        "STT,Tên tác phẩm,Ngày xuất bản,Album\n7,bản tình ca,01/01/2025,Xuân\n",
    )
    .unwrap();
    let missing = dir.path().join("locked.xlsx");

    let inputs = vec![
        first,
        second.to_string_lossy().into_owned(),
        missing.to_string_lossy().into_owned(),
    ];
    let config = run_args(
        &inputs,
        dir.path(),
        &["--no-backup", "--no-proper", "--formats", "xlsx,csv,json"],
    );
    let pipeline = TermPipeline::new(LocalStorage::new(".".to_string()), config);
    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(summary.is_partial());
    assert_eq!(summary.failed_sources.len(), 1);
    assert_eq!(summary.records, 4);

    let sheet = read_output(&summary.output_path);
    assert_eq!(
        sheet.headers[OUTPUT_COLUMNS.len()..],
        ["Kênh".to_string(), "Album".to_string()]
    );
    let merged = &sheet.records[3];
    assert_eq!(merged.text(columns::TITLE), "bản tình ca");
    assert_eq!(merged.text(columns::TERM_END), "31/12/2026");
    assert_eq!(merged.text("Album"), "Xuân");
    assert_eq!(merged.text("Kênh"), "");

    let csv_path = Path::new(&summary.output_path).with_extension("csv");
    let csv = std::fs::read_to_string(csv_path).unwrap();
    assert!(csv.lines().next().unwrap().starts_with("STT,ID Video"));

    let json_path = Path::new(&summary.output_path).with_extension("json");
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(json_path).unwrap()).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_term_pipeline_fails_when_no_input_is_readable() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.xlsx").to_string_lossy().into_owned();

    let config = run_args(&[missing], dir.path(), &[]);
    let pipeline = TermPipeline::new(LocalStorage::new(".".to_string()), config);
    let result = EtlEngine::new(pipeline).run().await;

    assert!(result.is_err());
}
