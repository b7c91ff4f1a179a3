use std::io::{self, Write};
use std::path::Path;
use std::thread;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

use crate::app::AppError;
use crate::backend::{Backend, BackendError, UploadFile};
use crate::calculation::{CalculationType, QValueMethod, Selection};
use crate::config::Config;
use crate::dashboard::{Dashboard, NoticeLevel};
use crate::i18n::{keys, Translator};
use crate::numfmt;
use crate::proportions::{self, SHEET_LABELS};
use crate::results::{DensityLabel, ResultView};
use crate::table::{cell_text, DataTable};

/// 표 하나에 출력할 최대 행 수.
const MAX_TABLE_ROWS: usize = 40;

/// 메인 메뉴 선택지를 표현한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Upload,
    SelectDate,
    VerifySample,
    Calculate,
    Settings,
    Reload,
    Exit,
}

/// 메인 메뉴를 표시하고 선택값을 반환한다.
pub fn main_menu(tr: &Translator) -> Result<MenuChoice, AppError> {
    println!("{}", tr.t(keys::MAIN_MENU_TITLE));
    for key in [
        keys::MAIN_MENU_UPLOAD,
        keys::MAIN_MENU_DATE,
        keys::MAIN_MENU_SAMPLE,
        keys::MAIN_MENU_CALCULATE,
        keys::MAIN_MENU_SETTINGS,
        keys::MAIN_MENU_RELOAD,
        keys::MAIN_MENU_EXIT,
    ] {
        println!("{}", tr.t(key));
    }
    loop {
        let sel = read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
        if let Some(choice) = parse_menu(&sel) {
            return Ok(choice);
        }
        println!("{}", tr.t(keys::INVALID_SELECTION_RETRY));
    }
}

fn parse_menu(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::Upload),
        "2" => Some(MenuChoice::SelectDate),
        "3" => Some(MenuChoice::VerifySample),
        "4" => Some(MenuChoice::Calculate),
        "5" => Some(MenuChoice::Settings),
        "9" => Some(MenuChoice::Reload),
        "0" => Some(MenuChoice::Exit),
        _ => None,
    }
}

/// 현재 세션 요약 한두 줄.
pub fn print_status<B: Backend>(tr: &Translator, dashboard: &Dashboard<B>) {
    let session = dashboard.session();
    match (&session.uploaded_file, session.date_range) {
        (Some(file), Some(range)) => println!(
            "{}",
            tr.tf(
                keys::STATUS_FILE,
                &[("file", file.clone()), ("range", range.display())]
            )
        ),
        _ => println!("{}", tr.t(keys::STATUS_NONE)),
    }
    if let Some(date) = dashboard.selected_date_text() {
        println!("{}", tr.tf(keys::STATUS_DATE, &[("date", date)]));
    }
}

/// 쌓인 알림을 출력하고 비운다.
pub fn print_notices<B: Backend>(dashboard: &mut Dashboard<B>) {
    for notice in dashboard.take_notices() {
        let tag = match notice.level {
            NoticeLevel::Info => "[i]",
            NoticeLevel::Success => "[ok]",
            NoticeLevel::Warning => "[!]",
            NoticeLevel::Error => "[x]",
        };
        println!("{tag} {}", notice.text);
    }
}

/// 파일 업로드 메뉴를 처리한다.
pub fn handle_upload<B: Backend>(
    tr: &Translator,
    dashboard: &mut Dashboard<B>,
) -> Result<(), AppError> {
    let path = read_line(&tr.t(keys::PROMPT_FILE_PATH))?;
    let path = path.trim().trim_matches('"');
    if path.is_empty() {
        return Ok(());
    }
    let file = UploadFile::from_path(Path::new(path)).map_err(BackendError::from)?;
    let mut announced = false;
    dashboard.upload(file, |step| {
        if !announced {
            println!("{}", crate::dashboard::WAKE_MESSAGE);
            announced = true;
        }
        thread::sleep(step);
    })?;
    Ok(())
}

/// 날짜 선택 메뉴를 처리한다.
pub fn handle_select_date<B: Backend>(
    tr: &Translator,
    dashboard: &mut Dashboard<B>,
) -> Result<(), AppError> {
    let text = read_line(&tr.t(keys::PROMPT_DATE))?;
    dashboard.select_date_text(&text)?;
    Ok(())
}

/// 샘플 데이터 확인 메뉴를 처리한다.
pub fn handle_verify_sample<B: Backend>(
    tr: &Translator,
    dashboard: &mut Dashboard<B>,
) -> Result<(), AppError> {
    let view = dashboard.verify_sample_data()?.clone();
    print_notices(dashboard);
    for sheet in &view.sheets {
        println!("\nSheet: {}", sheet.name);
        print_table(tr, &sheet.table);
    }
    Ok(())
}

/// 계산 메뉴: 종류 선택 → 혼합비 → 공극률 → 실행.
pub fn handle_calculate<B: Backend>(
    tr: &Translator,
    dashboard: &mut Dashboard<B>,
) -> Result<(), AppError> {
    let ty = choose(
        tr,
        &tr.t(keys::PROMPT_CALC_TYPE),
        &CalculationType::ALL,
        |t| t.label(),
        dashboard.session().selection().calculation_type(),
    )?;
    let method = if ty == CalculationType::QValues {
        choose(
            tr,
            &tr.t(keys::PROMPT_Q_METHOD),
            &QValueMethod::ALL,
            |m| m.label(),
            dashboard.session().selection().method(),
        )?
    } else {
        QValueMethod::Unselected
    };
    dashboard.select(Selection::from_parts(ty, method));
    let Some(kind) = dashboard.session().selection().kind() else {
        return Ok(());
    };

    print_proportions(tr, dashboard.session().proportions.draft());
    let input = read_line(&tr.t(keys::PROMPT_PROPORTIONS))?;
    if !input.trim().is_empty() {
        let values = proportions::parse_list(&input)?;
        dashboard.edit_proportions(values)?;
    }

    if kind.requires_porosity() {
        let text = read_line(&format!("{} ", kind.porosity_prompt()))?;
        dashboard.set_porosity_input(text.trim());
    }

    let readiness = dashboard.readiness();
    if let Some(message) = readiness.error_message() {
        println!("[x] {message}");
        return Ok(());
    }
    let Some(label) = readiness.button_label() else {
        return Ok(());
    };
    println!("\n[{label}]");
    let confirm = read_line(&tr.t(keys::PROMPT_CONFIRM_CALCULATE))?;
    if !confirm.trim().eq_ignore_ascii_case("y") {
        return Ok(());
    }
    let view = dashboard.calculate()?;
    print_notices(dashboard);
    print_result(tr, &view);
    Ok(())
}

/// 설정 메뉴를 처리한다. 바뀐 것이 있으면 true.
pub fn handle_settings(tr: &Translator, cfg: &mut Config) -> Result<bool, AppError> {
    println!("{}", tr.t(keys::SETTINGS_HEADING));
    println!(
        "{}",
        tr.tf(
            keys::SETTINGS_CURRENT,
            &[
                ("url", cfg.base_url.clone()),
                ("lang", cfg.language.clone()),
                ("label", label_code(cfg.modified_q_label).to_string()),
            ]
        )
    );
    println!("{}", tr.t(keys::SETTINGS_OPTIONS));
    let sel = read_line(&tr.t(keys::PROMPT_MENU_SELECT))?;
    match sel.trim() {
        "1" => {
            let url = read_line(&tr.t(keys::SETTINGS_PROMPT_BASE_URL))?;
            let url = url.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                cfg.base_url = url.to_string();
                return Ok(true);
            }
        }
        "2" => {
            let lang = read_line(&tr.t(keys::SETTINGS_PROMPT_LANGUAGE))?;
            let lang = lang.trim().to_lowercase();
            if matches!(lang.as_str(), "auto" | "en" | "en-us" | "ko" | "ko-kr") {
                cfg.language = lang;
                return Ok(true);
            }
        }
        "3" => {
            let label = read_line(&tr.t(keys::SETTINGS_PROMPT_LABEL))?;
            if let Some(label) = parse_label(&label) {
                cfg.modified_q_label = label;
                return Ok(true);
            }
        }
        _ => return Ok(false),
    }
    println!("{}", tr.t(keys::SETTINGS_INVALID));
    Ok(false)
}

fn label_code(label: DensityLabel) -> &'static str {
    match label {
        DensityLabel::PackingDensity => "packing-density",
        DensityLabel::Porosity => "porosity",
    }
}

fn parse_label(input: &str) -> Option<DensityLabel> {
    match input.trim().to_lowercase().as_str() {
        "packing-density" | "packing" | "density" => Some(DensityLabel::PackingDensity),
        "porosity" => Some(DensityLabel::Porosity),
        _ => None,
    }
}

/// 번호 목록에서 하나를 고른다. 엔터만 누르면 현재 값을 유지한다.
fn choose<T: Copy + PartialEq>(
    tr: &Translator,
    prompt: &str,
    options: &[T],
    label: impl Fn(T) -> &'static str,
    current: T,
) -> Result<T, AppError> {
    for (i, opt) in options.iter().enumerate() {
        let mark = if *opt == current { "*" } else { " " };
        println!("{mark}{i}) {}", label(*opt));
    }
    loop {
        let sel = read_line(prompt)?;
        let sel = sel.trim();
        if sel.is_empty() {
            return Ok(current);
        }
        if let Some(opt) = sel.parse::<usize>().ok().and_then(|i| options.get(i)) {
            return Ok(*opt);
        }
        println!("{}", tr.t(keys::INVALID_SELECTION_RETRY));
    }
}

fn print_proportions(tr: &Translator, values: [f64; 5]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec![tr.t(keys::TABLE_SHEET), tr.t(keys::TABLE_PROPORTION)]);
    for (sheet, value) in SHEET_LABELS.iter().zip(values) {
        table.add_row(vec![sheet.to_string(), numfmt::plain_float(value)]);
    }
    println!("{table}");
}

fn print_table(tr: &Translator, data: &DataTable) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(data.columns().to_vec());
    for row in data.rows().iter().take(MAX_TABLE_ROWS) {
        table.add_row(row.iter().map(cell_text).collect::<Vec<_>>());
    }
    println!("{table}");
    if data.rows().len() > MAX_TABLE_ROWS {
        println!(
            "{}",
            tr.tf(
                keys::TABLE_TRUNCATED,
                &[("count", (data.rows().len() - MAX_TABLE_ROWS).to_string())]
            )
        );
    }
}

fn print_result(tr: &Translator, view: &ResultView) {
    println!("\n## Results");
    for line in &view.headline {
        println!("{line}");
    }
    if let Some(heading) = view.list_heading {
        println!("### {heading}");
    }
    for line in &view.lines {
        println!("- {line}");
    }
    let Some(detail) = &view.detail else {
        return;
    };
    println!("\n[{}]", detail.title);
    if let Some(warning) = detail.empty_warning {
        println!("[!] {warning}");
    } else {
        println!("### {}", detail.table_heading);
        print_table(tr, &detail.table);
    }
    if let Some(plot) = &detail.plot {
        println!("### {}", plot.heading);
        match &plot.plot {
            Ok(p) => println!(
                "{}",
                tr.tf(
                    keys::REGRESSION_SUMMARY,
                    &[
                        ("slope", numfmt::fixed4(p.fit.slope)),
                        ("intercept", numfmt::fixed4(p.fit.intercept)),
                        ("points", p.points.len().to_string()),
                    ]
                )
            ),
            Err(e) => println!("[!] {e}"),
        }
    }
}

fn read_line(prompt: &str) -> Result<String, AppError> {
    print!("{prompt}");
    io::stdout().flush().map_err(AppError::Io)?;
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).map_err(AppError::Io)?;
    Ok(buf)
}
