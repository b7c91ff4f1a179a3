use std::collections::HashMap;
use std::fs;
use std::path::Path;
use sys_locale::get_locale;

/// 문자열 키를 모아두는 네임스페이스.
pub mod keys {
    pub const ERROR_PREFIX: &str = "general.error_prefix";
    pub const APP_EXIT: &str = "general.app_exit";

    pub const MAIN_MENU_TITLE: &str = "main_menu.title";
    pub const MAIN_MENU_UPLOAD: &str = "main_menu.upload";
    pub const MAIN_MENU_DATE: &str = "main_menu.date";
    pub const MAIN_MENU_SAMPLE: &str = "main_menu.sample";
    pub const MAIN_MENU_CALCULATE: &str = "main_menu.calculate";
    pub const MAIN_MENU_SETTINGS: &str = "main_menu.settings";
    pub const MAIN_MENU_RELOAD: &str = "main_menu.reload";
    pub const MAIN_MENU_EXIT: &str = "main_menu.exit";
    pub const PROMPT_MENU_SELECT: &str = "prompt.menu_select";
    pub const INVALID_SELECTION_RETRY: &str = "error.invalid_selection_retry";

    pub const STATUS_FILE: &str = "status.file";
    pub const STATUS_DATE: &str = "status.date";
    pub const STATUS_NONE: &str = "status.none";

    pub const PROMPT_FILE_PATH: &str = "prompt.file_path";
    pub const PROMPT_DATE: &str = "prompt.date";
    pub const PROMPT_CALC_TYPE: &str = "prompt.calc_type";
    pub const PROMPT_Q_METHOD: &str = "prompt.q_method";
    pub const PROMPT_PROPORTIONS: &str = "prompt.proportions";
    pub const PROMPT_CONFIRM_CALCULATE: &str = "prompt.confirm_calculate";

    pub const TABLE_SHEET: &str = "table.sheet";
    pub const TABLE_PROPORTION: &str = "table.proportion";
    pub const TABLE_TRUNCATED: &str = "table.truncated";
    pub const REGRESSION_SUMMARY: &str = "result.regression_summary";

    pub const INACTIVE_NOTICE: &str = "general.inactive_notice";

    pub const SETTINGS_HEADING: &str = "settings.heading";
    pub const SETTINGS_CURRENT: &str = "settings.current";
    pub const SETTINGS_OPTIONS: &str = "settings.options";
    pub const SETTINGS_PROMPT_BASE_URL: &str = "settings.prompt_base_url";
    pub const SETTINGS_PROMPT_LANGUAGE: &str = "settings.prompt_language";
    pub const SETTINGS_PROMPT_LABEL: &str = "settings.prompt_label";
    pub const SETTINGS_INVALID: &str = "settings.invalid";
    pub const SETTINGS_SAVED: &str = "settings.saved";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Ko,
    En,
}

impl Language {
    fn from_code(code: &str) -> Self {
        let c = code.to_lowercase();
        if c.starts_with("ko") {
            Language::Ko
        } else {
            Language::En
        }
    }
}

/// 런타임 언어 번들을 제공한다.
#[derive(Debug, Clone)]
pub struct Translator {
    lang: Language,
    overrides: Option<HashMap<String, String>>,
}

impl Translator {
    /// 언어 코드(ko/en)에 따라 번역기를 생성한다. 알 수 없는 코드는 en으로 폴백한다.
    pub fn new(lang_code: &str) -> Self {
        Self {
            lang: Language::from_code(lang_code),
            overrides: None,
        }
    }

    /// 언어 코드 + 언어팩 디렉터리(locales/ 등)를 받아서 번역기를 생성한다.
    /// 디렉터리가 없거나 파일이 없으면 내장 문자열만 사용한다.
    pub fn new_with_pack(lang_code: &str, pack_dir: Option<&str>) -> Self {
        let overrides = pack_dir
            .and_then(|dir| load_overrides(dir, lang_code))
            .or_else(|| load_overrides("locales", lang_code));
        tracing::debug!(
            lang = lang_code,
            overrides = overrides.as_ref().map_or(0, HashMap::len),
            "translator ready"
        );
        Self {
            lang: Language::from_code(lang_code),
            overrides,
        }
    }

    /// 키를 조회해 문자열을 반환한다. 언어팩에 없으면 None.
    pub fn lookup(&self, key: &str) -> Option<String> {
        self.overrides
            .as_ref()
            .and_then(|m| m.get(key).cloned())
    }

    /// 번역을 가져온다. 언어팩 → 내장 문자열 순. 한국어 문자열이 없으면 영어로 폴백한다.
    pub fn t(&self, key: &str) -> String {
        if let Some(v) = self.lookup(key) {
            return v;
        }
        let s = match self.lang {
            Language::Ko => ko(key).unwrap_or_else(|| en(key)),
            Language::En => en(key),
        };
        s.to_string()
    }

    /// `{name}` 자리표시자를 채운 번역.
    pub fn tf(&self, key: &str, vars: &[(&str, String)]) -> String {
        fill_template(&self.t(key), vars)
    }
}

pub fn fill_template(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (k, v) in vars {
        out = out.replace(&format!("{{{k}}}"), v);
    }
    out
}

/// CLI 플래그/설정/시스템 순으로 언어 코드를 결정한다.
pub fn resolve_language(cli_arg: &str, config_lang: Option<&str>) -> String {
    normalize_lang(cli_arg)
        .or_else(|| config_lang.and_then(normalize_lang))
        .or_else(detect_system_language)
        .unwrap_or_else(|| "en-us".to_string())
}

fn normalize_lang(code: &str) -> Option<String> {
    let c = code.trim().to_lowercase();
    match c.as_str() {
        "ko" => Some("ko".into()),
        "ko-kr" => Some("ko-kr".into()),
        "en" => Some("en".into()),
        "en-us" => Some("en-us".into()),
        "en-uk" | "en-gb" => Some("en-us".into()),
        "auto" | "" => None,
        other if other.starts_with("ko") => Some("ko".into()),
        other if other.starts_with("en") => Some("en-us".into()),
        _ => None,
    }
}

fn normalize_locale_string(loc: &str) -> Option<String> {
    let lang = loc
        .split(['.', '_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase();
    match lang.as_str() {
        "ko" => Some("ko".into()),
        "en" => Some("en".into()),
        _ => None,
    }
}

/// 시스템 로케일에서 언어를 추정한다.
pub fn detect_system_language() -> Option<String> {
    if let Some(loc) = get_locale() {
        if let Some(lang) = normalize_locale_string(&loc) {
            return Some(lang);
        }
    }
    for var in ["LANG", "LC_ALL"] {
        if let Ok(lang) = std::env::var(var) {
            if let Some(code) = normalize_locale_string(&lang) {
                return Some(code);
            }
        }
    }
    None
}

/// TOML 기반 언어팩을 로드한다. 형식: key = "value" 로 구성된 플랫 맵.
fn load_overrides(dir: &str, lang: &str) -> Option<HashMap<String, String>> {
    let try_load = |code: &str| -> Option<HashMap<String, String>> {
        let path = Path::new(dir).join(format!("{code}.toml"));
        let content = fs::read_to_string(path).ok()?;
        parse_toml_to_map(&content)
    };

    // 1) full code (e.g., en-us)
    if let Some(map) = try_load(lang) {
        return Some(map);
    }
    // 2) base code (e.g., en)
    if let Some((base, _)) = lang.split_once(['-', '_']) {
        if let Some(map) = try_load(base) {
            return Some(map);
        }
    }
    None
}

fn parse_toml_to_map(src: &str) -> Option<HashMap<String, String>> {
    let value: toml::Table = toml::from_str(src).ok()?;
    let mut map = HashMap::new();

    fn walk(prefix: &str, val: &toml::Value, out: &mut HashMap<String, String>) {
        match val {
            toml::Value::String(s) => {
                out.insert(prefix.to_string(), s.to_string());
            }
            toml::Value::Table(t) => {
                for (k, v) in t {
                    let key = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{prefix}.{k}")
                    };
                    walk(&key, v, out);
                }
            }
            _ => {}
        }
    }

    for (k, v) in &value {
        walk(k, v, &mut map);
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn ko(key: &str) -> Option<&'static str> {
    use keys::*;
    let s = match key {
        ERROR_PREFIX => "오류",
        APP_EXIT => "프로그램을 종료합니다.",
        MAIN_MENU_TITLE => "\n=== CUMI GBD & q-value 대시보드 ===",
        MAIN_MENU_UPLOAD => "1) 데이터 파일 업로드",
        MAIN_MENU_DATE => "2) 날짜 선택",
        MAIN_MENU_SAMPLE => "3) 샘플 데이터 확인",
        MAIN_MENU_CALCULATE => "4) 계산",
        MAIN_MENU_SETTINGS => "5) 설정",
        MAIN_MENU_RELOAD => "9) 새로고침 (세션 초기화)",
        MAIN_MENU_EXIT => "0) 종료",
        PROMPT_MENU_SELECT => "메뉴 선택: ",
        INVALID_SELECTION_RETRY => "잘못된 입력입니다. 다시 선택하세요.",
        STATUS_FILE => "파일: {file} ({range})",
        STATUS_DATE => "선택 날짜: {date}",
        STATUS_NONE => "업로드된 파일 없음",
        PROMPT_FILE_PATH => "파일 경로 (.csv/.xlsx): ",
        PROMPT_DATE => "날짜 입력 (DD-MM-YYYY): ",
        PROMPT_CALC_TYPE => "계산 종류 선택: ",
        PROMPT_Q_METHOD => "q-value 계산식 선택: ",
        PROMPT_PROPORTIONS => "혼합비 5개 입력 (쉼표 구분, 엔터 = 유지): ",
        PROMPT_CONFIRM_CALCULATE => "계산을 실행할까요? (y/n): ",
        TABLE_SHEET => "시트",
        TABLE_PROPORTION => "비율",
        TABLE_TRUNCATED => "... 외 {count}행",
        REGRESSION_SUMMARY => "회귀 직선: 기울기(q) = {slope}, 절편 = {intercept} ({points}점)",
        INACTIVE_NOTICE => "대시보드가 비활성 상태입니다. 새로고침(9) 후 계속하세요.",
        SETTINGS_HEADING => "\n-- 설정 --",
        SETTINGS_CURRENT => "서버: {url} | 언어: {lang} | Modified q 라벨: {label}",
        SETTINGS_OPTIONS => "1) 서버 주소  2) 언어  3) Modified q 라벨  0) 돌아가기",
        SETTINGS_PROMPT_BASE_URL => "새 서버 주소: ",
        SETTINGS_PROMPT_LANGUAGE => "언어 (auto/en-us/ko-kr): ",
        SETTINGS_PROMPT_LABEL => "라벨 (packing-density/porosity): ",
        SETTINGS_INVALID => "알 수 없는 값입니다.",
        SETTINGS_SAVED => "설정을 저장했습니다.",
        _ => return None,
    };
    Some(s)
}

fn en(key: &str) -> &'static str {
    use keys::*;
    match key {
        ERROR_PREFIX => "Error",
        APP_EXIT => "Exiting.",
        MAIN_MENU_TITLE => "\n=== CUMI GBD & q-value Dashboard ===",
        MAIN_MENU_UPLOAD => "1) Upload data file",
        MAIN_MENU_DATE => "2) Select date",
        MAIN_MENU_SAMPLE => "3) Verify sample data",
        MAIN_MENU_CALCULATE => "4) Calculate",
        MAIN_MENU_SETTINGS => "5) Settings",
        MAIN_MENU_RELOAD => "9) Reload (discard session)",
        MAIN_MENU_EXIT => "0) Exit",
        PROMPT_MENU_SELECT => "Select menu: ",
        INVALID_SELECTION_RETRY => "Invalid input. Please choose again.",
        STATUS_FILE => "File: {file} ({range})",
        STATUS_DATE => "Selected date: {date}",
        STATUS_NONE => "No file uploaded",
        PROMPT_FILE_PATH => "File path (.csv/.xlsx): ",
        PROMPT_DATE => "Select a date (DD-MM-YYYY): ",
        PROMPT_CALC_TYPE => "Select Calculation Type: ",
        PROMPT_Q_METHOD => "Select q-value Calculation Method: ",
        PROMPT_PROPORTIONS => "Enter 5 proportions (comma separated, Enter = keep): ",
        PROMPT_CONFIRM_CALCULATE => "Run the calculation? (y/n): ",
        TABLE_SHEET => "Sheet",
        TABLE_PROPORTION => "Proportion",
        TABLE_TRUNCATED => "... {count} more rows",
        REGRESSION_SUMMARY => {
            "Regression line: slope (q) = {slope}, intercept = {intercept} ({points} points)"
        }
        INACTIVE_NOTICE => "Dashboard is inactive! Please reload (9) to continue.",
        SETTINGS_HEADING => "\n-- Settings --",
        SETTINGS_CURRENT => "Server: {url} | Language: {lang} | Modified q label: {label}",
        SETTINGS_OPTIONS => "1) Server URL  2) Language  3) Modified q label  0) Back",
        SETTINGS_PROMPT_BASE_URL => "New server URL: ",
        SETTINGS_PROMPT_LANGUAGE => "Language (auto/en-us/ko-kr): ",
        SETTINGS_PROMPT_LABEL => "Label (packing-density/porosity): ",
        SETTINGS_INVALID => "Unknown value.",
        SETTINGS_SAVED => "Settings saved.",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn korean_falls_back_to_english_for_missing_keys() {
        let tr = Translator::new("ko-kr");
        assert_eq!(tr.t(keys::MAIN_MENU_EXIT), "0) 종료");
        assert_eq!(Translator::new("en-us").t(keys::MAIN_MENU_EXIT), "0) Exit");
        assert_eq!(tr.t("no.such.key"), "");
    }

    #[test]
    fn nested_tables_flatten_to_dotted_keys() {
        let map = parse_toml_to_map(
            r#"
            [gui.nav]
            app_title = "CUMI"
            [main_menu]
            exit = "0) Quit"
            "#,
        )
        .unwrap();
        assert_eq!(map.get("gui.nav.app_title").map(String::as_str), Some("CUMI"));
        assert_eq!(map.get("main_menu.exit").map(String::as_str), Some("0) Quit"));
    }

    #[test]
    fn explicit_language_wins_over_config() {
        assert_eq!(resolve_language("ko", Some("en-us")), "ko");
        assert_eq!(resolve_language("auto", Some("en-gb")), "en-us");
    }

    #[test]
    fn templates_fill_named_slots() {
        let tr = Translator::new("en");
        assert_eq!(
            tr.tf(keys::STATUS_DATE, &[("date", "15-01-2024".into())]),
            "Selected date: 15-01-2024"
        );
    }
}
