use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 一列資料；欄位順序由所屬的 [`Sheet`] 決定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub data: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得欄位文字；缺少或為 null 時回傳空字串
    pub fn text(&self, column: &str) -> String {
        match self.data.get(column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn set_text(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        let value = if value.is_empty() {
            Value::Null
        } else {
            Value::String(value)
        };
        self.data.insert(column.to_string(), value);
    }

    pub fn set_number(&mut self, column: &str, value: i64) {
        self.data.insert(column.to_string(), Value::from(value));
    }

    pub fn clear(&mut self, column: &str) {
        self.data.insert(column.to_string(), Value::Null);
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.data.get(column)
    }

    pub fn is_blank(&self) -> bool {
        self.data.values().all(|v| match v {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        })
    }
}

/// 一個工作表：表頭順序 + 資料列
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub source: String,
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl Sheet {
    pub fn new(source: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            source: source.into(),
            headers,
            records: Vec::new(),
        }
    }

    pub fn push_header(&mut self, header: &str) {
        if !self.headers.iter().any(|h| h == header) {
            self.headers.push(header.to_string());
        }
    }

    /// 將指定欄位移到最後
    pub fn move_header_last(&mut self, header: &str) {
        if let Some(pos) = self.headers.iter().position(|h| h == header) {
            let moved = self.headers.remove(pos);
            self.headers.push(moved);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    pub sheets: Vec<Sheet>,
    pub failed_sources: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub sheet: Sheet,
    pub row_errors: usize,
    pub failed_sources: Vec<String>,
}

/// 一次執行的結果摘要
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub records: usize,
    pub row_errors: usize,
    pub failed_sources: Vec<String>,
}

impl RunSummary {
    pub fn is_partial(&self) -> bool {
        !self.failed_sources.is_empty()
    }
}
