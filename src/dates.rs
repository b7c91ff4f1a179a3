//! 업로드 응답의 날짜 범위와 사용자가 고른 날짜를 다룬다.
//!
//! 백엔드는 `YYYY-MM-DD`로 범위를 돌려주고, 요청에는 `DD-MM-YYYY`를 받는다.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

pub const ISO_FORMAT: &str = "%Y-%m-%d";
pub const DISPLAY_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Error: Could not retrieve date range. Please check your file.")]
    MissingRange,
    #[error("'{0}' is not a YYYY-MM-DD date.")]
    InvalidIso(String),
    #[error("'{0}' is not a DD-MM-YYYY date.")]
    InvalidDisplay(String),
    #[error("Date range starts after it ends ({0} > {1}).")]
    Inverted(String, String),
    #[error("Please select a date from the available range: {min} to {max}")]
    OutOfRange { min: String, max: String },
    #[error("Upload a file before selecting a date.")]
    NoRange,
}

/// 선택 가능한 날짜 구간 (양 끝 포함).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    min: NaiveDate,
    max: NaiveDate,
}

impl DateRange {
    pub fn new(min: NaiveDate, max: NaiveDate) -> Result<Self, DateError> {
        if min > max {
            return Err(DateError::Inverted(to_display(min), to_display(max)));
        }
        Ok(Self { min, max })
    }

    /// 업로드 응답의 `date_range` 배열을 해석한다. 원소가 정확히 두 개여야 한다.
    pub fn from_iso_pair(values: &[String]) -> Result<Self, DateError> {
        match values {
            [min, max] => Self::new(parse_iso(min)?, parse_iso(max)?),
            _ => Err(DateError::MissingRange),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }

    /// 범위를 벗어난 날짜는 요청 전에 거절한다.
    pub fn check(&self, date: NaiveDate) -> Result<NaiveDate, DateError> {
        if self.contains(date) {
            Ok(date)
        } else {
            Err(DateError::OutOfRange {
                min: to_display(self.min),
                max: to_display(self.max),
            })
        }
    }

    /// `01-01-2024 to 31-01-2024`
    pub fn display(&self) -> String {
        format!("{} to {}", to_display(self.min), to_display(self.max))
    }
}

pub fn parse_iso(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
        .map_err(|_| DateError::InvalidIso(value.to_string()))
}

/// 사용자 입력용. `DD-MM-YYYY`를 우선으로 하고 ISO 형식도 받아준다.
pub fn parse_display(value: &str) -> Result<NaiveDate, DateError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_FORMAT))
        .map_err(|_| DateError::InvalidDisplay(value.to_string()))
}

pub fn to_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// 샘플 데이터의 `Received Date` 셀을 `DD-MM-YYYY`로 바꾼다.
///
/// 문자열(ISO 날짜/일시)과 epoch 밀리초 숫자를 지원한다. 해석할 수 없으면 None.
pub fn reformat_received_date(value: &Value) -> Option<String> {
    let date = match value {
        Value::String(s) => parse_loose(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(|dt| dt.date_naive()),
        _ => None,
    }?;
    Some(to_display(date))
}

fn parse_loose(value: &str) -> Option<NaiveDate> {
    let s = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, ISO_FORMAT) {
        return Some(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    NaiveDate::parse_from_str(s, DISPLAY_FORMAT).ok()
}
