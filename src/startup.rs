//! 두 실행 파일(GUI/CLI)이 공유하는 시작 절차: 인자, 로깅, 설정.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{self, Config, ConfigError, DEFAULT_CONFIG_PATH};
use crate::i18n;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about = "CUMI GBD & q-value dashboard", long_about = None)]
pub struct Args {
    /// 설정 파일 경로
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
    /// 백엔드 기준 URL (설정 파일 값을 덮어쓴다)
    #[arg(long)]
    pub base_url: Option<String>,
    /// auto / en-us / ko-kr
    #[arg(long, short = 'L')]
    pub lang: Option<String>,
}

impl Args {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

/// `RUST_LOG`이 없으면 info 수준으로 stderr에 기록한다.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 설정을 읽고 명령줄 값을 덮어쓴다. 덮어쓴 값은 저장하지 않는다.
pub fn load_config(args: &Args) -> Result<Config, ConfigError> {
    let mut cfg = config::load_from(&args.config_path())?;
    apply_overrides(&mut cfg, args);
    Ok(cfg)
}

fn apply_overrides(cfg: &mut Config, args: &Args) {
    if let Some(url) = args.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        tracing::info!(base_url = url, "base URL overridden");
        cfg.base_url = url.to_string();
    }
    if let Some(lang) = &args.lang {
        cfg.language = i18n::resolve_language(lang, Some(cfg.language.as_str()));
    }
}
