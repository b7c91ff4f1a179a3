//! 백엔드가 돌려준 행 목록을 화면 표시용 표로 만든다.

use serde_json::Value;

use crate::backend::wire::Record;
use crate::dates;

/// Andreasen q-value 중간 표: 숨길 열.
pub const Q_VALUE_HIDDEN: &[&str] = &["sheet_constant", "pct_poros_CPFT"];

/// Andreasen q-value 중간 표: 열 이름 변경.
pub const Q_VALUE_LABELS: &[(&str, &str)] = &[
    ("sheet_proportion", "Sheet Proportion"),
    ("D_value", "Particle Size (μm)"),
    ("pct_CPFT", "%_CPFT"),
    ("pct_CPFT_interpolated", "%_CPFT (Interpolated)"),
    ("Normalized_D", "D/D_max"),
    ("Log_D/Dmax_value", "Log(D/D_max)"),
    ("Log_pct_CPFT", "Log(%_CPFT)"),
];

/// Modified Andreasen CPFT 오차 표.
pub const CPFT_ERROR_LABELS: &[(&str, &str)] = &[
    ("D_value", "Particle Size (μm)"),
    ("pct_CPFT_interpolation", "%_CPFT (Interpolated)"),
    ("pct_poros_CPFT", "Actual CPFT"),
    ("calculated_CPFT", "Calculated CPFT"),
    ("absolute_error", "Absolute Error"),
];

/// Double Modified 회귀용 표.
pub const DOUBLE_MODIFIED_LABELS: &[(&str, &str)] = &[
    ("pct_poros_CPFT", "%_CPFT"),
    ("D_value", "Particle Size (μm)"),
    ("x_value", "Log(D - D_min) - Log(D_max - D_min)"),
    ("log_pct_CPFT", "Log(%_CPFT)"),
];

pub const RECEIVED_DATE: &str = "Received Date";

/// 열 이름과 셀 값으로 이루어진 단순 표.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    /// 레코드 목록에서 표를 만든다. 열은 처음 등장한 순서대로, 빠진 셀은 null.
    pub fn from_records(records: &[Record]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();
        Self { columns, rows }
    }

    /// JSON 배열(행 목록)에서 표를 만든다. 객체가 아닌 원소는 건너뛴다.
    pub fn from_value(value: &Value) -> Self {
        let records: Vec<Record> = value
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|r| r.as_object().cloned())
                    .collect()
            })
            .unwrap_or_default();
        Self::from_records(&records)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 지정한 열을 제거한다. 없는 열은 무시한다.
    pub fn without_columns(mut self, names: &[&str]) -> Self {
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !names.contains(&c.as_str()))
            .collect();
        let mut flags = keep.iter();
        self.columns.retain(|_| *flags.next().unwrap_or(&true));
        for row in &mut self.rows {
            let mut flags = keep.iter();
            row.retain(|_| *flags.next().unwrap_or(&true));
        }
        self
    }

    /// 열 이름을 바꾼다. 표시용일 뿐 값은 그대로다.
    pub fn relabeled(mut self, labels: &[(&str, &str)]) -> Self {
        for column in &mut self.columns {
            if let Some((_, label)) = labels.iter().find(|(from, _)| from == column) {
                *column = (*label).to_string();
            }
        }
        self
    }

    /// 한 열의 모든 셀에 변환을 적용한다. 열이 없으면 false.
    pub fn map_column<F>(&mut self, name: &str, f: F) -> bool
    where
        F: Fn(&Value) -> Option<Value>,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(idx) {
                if let Some(new) = f(cell) {
                    *cell = new;
                }
            }
        }
        true
    }

    /// 숫자 열. 숫자로 읽을 수 없는 셀은 None.
    pub fn numeric_column(&self, name: &str) -> Option<Vec<Option<f64>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).and_then(cell_number))
                .collect(),
        )
    }
}

fn cell_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// 셀 표시 문자열.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => i.to_string(),
            (None, Some(f)) => format!("{f:.4}"),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// 샘플 데이터 시트 하나.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSheet {
    pub name: String,
    pub table: DataTable,
}

/// 샘플 데이터 응답을 시트별 표로 바꾸고 `Received Date`를 `DD-MM-YYYY`로 맞춘다.
pub fn sample_sheets(sample_data: &serde_json::Map<String, Value>) -> Vec<SampleSheet> {
    sample_data
        .iter()
        .map(|(name, rows)| {
            let mut table = DataTable::from_value(rows);
            table.map_column(RECEIVED_DATE, |cell| {
                dates::reformat_received_date(cell).map(Value::String)
            });
            SampleSheet {
                name: name.clone(),
                table,
            }
        })
        .collect()
}
