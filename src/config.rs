use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::backend::{BackendSettings, WakePolicy};
use crate::dashboard::DashboardSettings;
use crate::results::{DensityLabel, RenderOptions};

/// 계산 서비스 기본 주소.
pub const DEFAULT_BASE_URL: &str = "https://cumi-dashboard.onrender.com";

/// 기본 설정 파일 경로 (작업 디렉터리 기준).
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 애플리케이션 설정을 표현한다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 백엔드 기준 URL
    pub base_url: String,
    /// auto / en-us / ko-kr
    pub language: String,
    /// TOML 언어팩 디렉터리
    pub language_pack_dir: Option<String>,
    pub ping_timeout_secs: u64,
    pub wake_poll_interval_secs: u64,
    pub wake_ceiling_secs: u64,
    /// 없으면 타임아웃 없이 기다린다.
    pub request_timeout_secs: Option<u64>,
    pub inactivity_threshold_secs: u64,
    /// GUI 주기 갱신 간격
    pub refresh_interval_secs: u64,
    /// 0이면 혼합비 합계가 정확히 1이어야 한다.
    pub proportion_sum_tolerance: f64,
    pub modified_q_label: DensityLabel,
    pub window_alpha: f32,
    /// 사용자 지정 폰트(.ttf/.ttc)
    pub font_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "auto".to_string(),
            language_pack_dir: None,
            ping_timeout_secs: 3,
            wake_poll_interval_secs: 10,
            wake_ceiling_secs: 60,
            request_timeout_secs: None,
            inactivity_threshold_secs: 300,
            refresh_interval_secs: 300,
            proportion_sum_tolerance: 0.0,
            modified_q_label: DensityLabel::default(),
            window_alpha: 1.0,
            font_path: None,
        }
    }
}

/// 설정 로드/저장 시 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("파일 입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 파싱 오류: {0}")]
    Serde(#[from] toml::de::Error),
    #[error("설정 직렬화 오류: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// 지정한 경로에서 설정을 읽는다. 파일이 없으면 기본값으로 만들어 둔다.
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        let content = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(cfg)
    } else {
        let cfg = Config::default();
        save_config(&cfg, path)?;
        tracing::info!(path = %path.display(), "default config written");
        Ok(cfg)
    }
}

fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(cfg)?;
    fs::write(path, content)?;
    Ok(())
}

impl Config {
    /// 설정을 지정한 경로에 저장한다.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        save_config(self, path)
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.base_url.trim().to_string(),
            ping_timeout: Duration::from_secs(self.ping_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            wake: WakePolicy {
                poll_interval: Duration::from_secs(self.wake_poll_interval_secs.max(1)),
                ceiling: Duration::from_secs(self.wake_ceiling_secs),
            },
            proportion_tolerance: self.proportion_sum_tolerance.max(0.0),
            render: RenderOptions {
                modified_label: self.modified_q_label,
            },
            inactivity_threshold: Duration::from_secs(self.inactivity_threshold_secs),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(1))
    }

    pub fn font_path(&self) -> Option<PathBuf> {
        self.font_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}
