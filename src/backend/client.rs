use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::blocking::{multipart, Client, Response};
use reqwest::StatusCode;
use serde_json::Value;

use super::wire::UploadResponse;
use super::{Backend, BackendError, Endpoint};

/// HTTP 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    /// `/ping` 전용 짧은 타임아웃
    pub ping_timeout: Duration,
    /// 일반 요청 타임아웃. None이면 제한 없이 기다린다.
    pub request_timeout: Option<Duration>,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            ping_timeout: Duration::from_secs(3),
            request_timeout: None,
        }
    }
}

/// 업로드할 파일. 내용 전체를 메모리에 올린다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, bytes))
    }
}

/// 확장자로 MIME 타입을 정한다.
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => "text/csv",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

/// reqwest blocking 클라이언트 기반 구현.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    settings: BackendSettings,
    client: Client,
}

impl HttpBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| BackendError::Transport {
                endpoint: Endpoint::Ping,
                message: e.to_string(),
            })?;
        Ok(Self { settings, client })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            endpoint.path()
        )
    }

    /// 상태 코드를 확인하고 본문을 문자열로 읽는다.
    fn read_body(
        endpoint: Endpoint,
        response: Response,
        started: Instant,
    ) -> Result<String, BackendError> {
        let status = response.status();
        let body = response.text().map_err(|e| transport(endpoint, &e))?;
        tracing::info!(
            %endpoint,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend response"
        );
        if status != StatusCode::OK {
            return Err(BackendError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

fn transport(endpoint: Endpoint, err: &reqwest::Error) -> BackendError {
    tracing::warn!(%endpoint, error = %err, "backend request failed");
    BackendError::Transport {
        endpoint,
        message: err.to_string(),
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    endpoint: Endpoint,
    body: &str,
) -> Result<T, BackendError> {
    serde_json::from_str(body).map_err(|e| BackendError::Decode {
        endpoint,
        message: e.to_string(),
    })
}

impl Backend for HttpBackend {
    fn ping(&self) -> bool {
        let url = self.url(Endpoint::Ping);
        match self
            .client
            .get(&url)
            .timeout(self.settings.ping_timeout)
            .send()
        {
            Ok(resp) => {
                let alive = resp.status() == StatusCode::OK;
                tracing::debug!(status = resp.status().as_u16(), alive, "ping");
                alive
            }
            Err(err) => {
                tracing::debug!(error = %err, "ping failed");
                false
            }
        }
    }

    fn upload(&self, file: &UploadFile) -> Result<UploadResponse, BackendError> {
        let endpoint = Endpoint::Upload;
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| transport(endpoint, &e))?;
        let form = multipart::Form::new().part("file", part);
        tracing::info!(file = %file.file_name, bytes = file.bytes.len(), "uploading");
        let started = Instant::now();
        let response = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .map_err(|e| transport(endpoint, &e))?;
        let body = Self::read_body(endpoint, response, started)?;
        decode(endpoint, &body)
    }

    fn get_json(
        &self,
        endpoint: Endpoint,
        query: &[(&str, String)],
    ) -> Result<Value, BackendError> {
        tracing::info!(%endpoint, ?query, "GET");
        let started = Instant::now();
        let response = self
            .client
            .get(self.url(endpoint))
            .query(query)
            .send()
            .map_err(|e| transport(endpoint, &e))?;
        let body = Self::read_body(endpoint, response, started)?;
        decode(endpoint, &body)
    }
}
