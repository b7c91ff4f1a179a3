//! 원격 계산 서비스와의 HTTP 계약.

pub mod client;
pub mod liveness;
pub mod wire;

use std::fmt;

use serde_json::Value;
use thiserror::Error;

pub use client::{BackendSettings, HttpBackend, UploadFile};
pub use liveness::{
    is_backend_active, poll_until_awake, wait_for_backend, WakeOutcome, WakePolicy,
};

/// 백엔드 엔드포인트 목록.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Ping,
    Upload,
    SampleData,
    CalculateGbd,
    CalculateQValue,
    CalculateQValueModified,
    CalculateQValueDoubleModified,
}

impl Endpoint {
    /// 기준 URL 뒤에 붙는 경로.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Ping => "ping",
            Endpoint::Upload => "upload/",
            Endpoint::SampleData => "get_sample_data/",
            Endpoint::CalculateGbd => "calculate_gbd/",
            Endpoint::CalculateQValue => "calculate_q_value/",
            Endpoint::CalculateQValueModified => "calculate_q_value_modified_andreason/",
            Endpoint::CalculateQValueDoubleModified => "calculate_q_value_double_modified/",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    /// 연결 실패, 타임아웃, DNS 오류 등
    #[error("Request to {endpoint} failed: {message}")]
    Transport { endpoint: Endpoint, message: String },
    /// 200이 아닌 응답
    #[error("{endpoint} answered HTTP {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },
    /// 본문이 JSON이 아니거나 기대한 형태가 아님
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode { endpoint: Endpoint, message: String },
    #[error("Could not read upload file: {0}")]
    File(#[from] std::io::Error),
}

impl BackendError {
    /// 오류 응답 본문의 `detail` 필드. 문자열이 아니면 JSON 텍스트로 돌려준다.
    pub fn detail(&self) -> Option<String> {
        match self {
            BackendError::Status { body, .. } => wire::ErrorBody::detail_from(body),
            _ => None,
        }
    }
}

/// 대시보드가 백엔드에 요구하는 동작. 테스트에서는 가짜 구현으로 바꿔 끼운다.
pub trait Backend {
    /// `/ping`이 200을 돌려주면 true. 어떤 오류도 밖으로 내보내지 않는다.
    fn ping(&self) -> bool;

    /// 스프레드시트를 그대로 업로드한다.
    fn upload(&self, file: &UploadFile) -> Result<wire::UploadResponse, BackendError>;

    /// 쿼리 파라미터를 붙여 GET 요청을 보내고 JSON 본문을 돌려준다.
    fn get_json(&self, endpoint: Endpoint, query: &[(&str, String)]) -> Result<Value, BackendError>;
}
