use clap::Parser;
use cumi_dashboard::{app, i18n, startup};

/// 프로그램의 엔트리 포인트. 설정을 로드한 뒤 CLI 애플리케이션을 실행한다.
fn main() {
    startup::init_tracing();
    if let Err(err) = try_run() {
        eprintln!("오류: {err}");
        std::process::exit(1);
    }
}

fn try_run() -> Result<(), app::AppError> {
    let args = startup::Args::parse();
    let mut cfg = startup::load_config(&args)?;
    let lang = i18n::resolve_language("auto", Some(cfg.language.as_str()));
    let mut tr = i18n::Translator::new_with_pack(&lang, cfg.language_pack_dir.as_deref());
    app::run(&mut cfg, &args.config_path(), &mut tr)
}
