//! 백엔드 JSON 본문 형태.

use serde::Deserialize;
use serde_json::{Map, Value};

/// 테이블 한 행. 열 순서는 백엔드가 보낸 순서를 따른다.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub date_range: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn detail_from(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// `/get_sample_data/` 응답. 시트 이름 → 행 목록.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleDataResponse {
    #[serde(default)]
    pub sample_data: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GbdBody {
    pub total_volume: f64,
    pub specific_gravity: f64,
    pub gbd_values: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QValueRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "q-value")]
    pub q_value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QValueBody {
    pub q_values: Vec<QValueRow>,
    #[serde(default)]
    pub intermediate_table: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModifiedQValueBody {
    pub q_values: Vec<Record>,
    #[serde(default)]
    pub cpft_error_table: Vec<Record>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoubleModifiedRow {
    #[serde(rename = "Date")]
    pub date: String,
    pub q_value: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DoubleModifiedQValueBody {
    pub double_modified_q_values: Vec<DoubleModifiedRow>,
    #[serde(default)]
    pub intermediate_table: Vec<Record>,
}
