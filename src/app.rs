use std::path::Path;
use std::time::Instant;

use thiserror::Error;

use crate::backend::{BackendError, HttpBackend};
use crate::config::{Config, ConfigError};
use crate::dashboard::{Dashboard, DashboardError};
use crate::i18n::{self, Translator};
use crate::proportions::ProportionError;
use crate::ui_cli;
use crate::ui_cli::MenuChoice;

/// 애플리케이션 실행 중 발생 가능한 오류를 표현한다.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Backend(#[from] BackendError),
    #[error("{0}")]
    Dashboard(#[from] DashboardError),
    #[error("{0}")]
    Proportion(#[from] ProportionError),
}

/// 설정으로 HTTP 백엔드를 만든다.
pub fn connect(config: &Config) -> Result<HttpBackend, AppError> {
    let backend = HttpBackend::new(config.backend_settings())?;
    tracing::info!(base_url = backend.base_url(), "backend configured");
    Ok(backend)
}

/// CLI 애플리케이션의 메인 루프를 실행한다.
pub fn run(config: &mut Config, config_path: &Path, tr: &mut Translator) -> Result<(), AppError> {
    let mut dashboard = Dashboard::new(connect(config)?, config.dashboard_settings());
    loop {
        if dashboard.observe_activity(Instant::now()) {
            println!("{}", tr.t(i18n::keys::INACTIVE_NOTICE));
        }
        ui_cli::print_status(tr, &dashboard);
        let choice = ui_cli::main_menu(tr)?;
        // 메뉴 입력 자체가 상호작용이다.
        dashboard.observe_activity(Instant::now());
        let outcome = match choice {
            MenuChoice::Upload => ui_cli::handle_upload(tr, &mut dashboard),
            MenuChoice::SelectDate => ui_cli::handle_select_date(tr, &mut dashboard),
            MenuChoice::VerifySample => ui_cli::handle_verify_sample(tr, &mut dashboard),
            MenuChoice::Calculate => ui_cli::handle_calculate(tr, &mut dashboard),
            MenuChoice::Settings => {
                if ui_cli::handle_settings(tr, config)? {
                    config.save_to(config_path)?;
                    let lang = i18n::resolve_language("auto", Some(config.language.as_str()));
                    *tr = Translator::new_with_pack(&lang, config.language_pack_dir.as_deref());
                    dashboard.set_backend(connect(config)?);
                    dashboard.set_settings(config.dashboard_settings());
                    println!("{}", tr.t(i18n::keys::SETTINGS_SAVED));
                }
                Ok(())
            }
            MenuChoice::Reload => {
                dashboard.reload(Instant::now());
                Ok(())
            }
            MenuChoice::Exit => {
                config.save_to(config_path)?;
                println!("{}", tr.t(i18n::keys::APP_EXIT));
                break;
            }
        };
        ui_cli::print_notices(&mut dashboard);
        // 대시보드 오류는 알림으로 이미 출력했다.
        match outcome {
            Ok(()) | Err(AppError::Dashboard(_)) => {}
            Err(AppError::Io(e)) => return Err(AppError::Io(e)),
            Err(e) => println!("{}: {e}", tr.t(i18n::keys::ERROR_PREFIX)),
        }
    }
    Ok(())
}
