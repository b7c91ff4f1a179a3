//! 대시보드 컨트롤러.
//!
//! GUI와 CLI가 공유한다. 사용자 동작 하나가 한 번의 패스이고, 패스마다
//! 최대 한 번의 블로킹 HTTP 호출을 한다. 처리 결과는 알림 목록에 쌓인다.

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use thiserror::Error;

use crate::backend::wire::SampleDataResponse;
use crate::backend::{
    poll_until_awake, wait_for_backend, Backend, BackendError, Endpoint, UploadFile, WakeOutcome,
    WakePolicy,
};
use crate::calculation::{CalculationRequest, Selection, Transition};
use crate::dates::{self, DateError, DateRange};
use crate::inactivity::DEFAULT_THRESHOLD;
use crate::porosity::{Porosity, PorosityError};
use crate::proportions::ProportionError;
use crate::results::{CalculationResult, RenderOptions, ResultView};
use crate::session::SessionState;
use crate::table::{self, SampleSheet};

pub const WAKE_MESSAGE: &str = "Waking up the server... This may take ~1 minute. Please wait...";
pub const UPLOAD_OK: &str = "File uploaded successfully.";

/// 컨트롤러 동작 설정.
#[derive(Debug, Clone, Copy)]
pub struct DashboardSettings {
    pub wake: WakePolicy,
    /// 0이면 혼합비 합계가 정확히 1이어야 한다.
    pub proportion_tolerance: f64,
    pub render: RenderOptions,
    pub inactivity_threshold: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            wake: WakePolicy::default(),
            proportion_tolerance: 0.0,
            render: RenderOptions::default(),
            inactivity_threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// 화면에 순서대로 보여 줄 상태 메시지.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(
        "Error uploading file: {detail}. Please check your file format and ensure all required sheets/columns are included."
    )]
    Upload { detail: String },
    #[error(transparent)]
    Date(#[from] DateError),
    #[error("Error retrieving sample data.")]
    SampleData(#[source] BackendError),
    #[error("{0}")]
    NotReady(String),
    #[error("Error calculating {calculation_type}. Backend response: {body}")]
    Calculation {
        calculation_type: &'static str,
        body: String,
    },
    #[error("Exception: {0}")]
    Exception(String),
}

/// 계산 버튼을 누를 수 있는지와, 누를 수 없다면 그 이유.
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    NeedsUpload,
    NeedsDate,
    NeedsSelection,
    InvalidProportions(ProportionError),
    NeedsPorosity { prompt: &'static str },
    InvalidPorosity(PorosityError),
    Ready {
        request: CalculationRequest,
        label: String,
    },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready { .. })
    }

    pub fn button_label(&self) -> Option<&str> {
        match self {
            Readiness::Ready { label, .. } => Some(label),
            _ => None,
        }
    }

    /// 사용자에게 오류로 보여 줄 문구. 단순히 입력을 기다리는 상태는 None.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Readiness::InvalidProportions(e) => Some(e.to_string()),
            Readiness::InvalidPorosity(e) if e.is_reportable() => Some(e.to_string()),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self {
            Readiness::NeedsUpload => "Upload a file first.".into(),
            Readiness::NeedsDate => "Select a date first.".into(),
            Readiness::NeedsSelection => "Select a calculation type first.".into(),
            Readiness::InvalidProportions(e) => e.to_string(),
            Readiness::NeedsPorosity { prompt } => (*prompt).to_string(),
            Readiness::InvalidPorosity(e) => e.to_string(),
            Readiness::Ready { label, .. } => label.clone(),
        }
    }
}

/// 검증을 마친 샘플 데이터 보기.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleView {
    /// `DD-MM-YYYY`
    pub date: String,
    pub sheets: Vec<SampleSheet>,
}

pub struct Dashboard<B: Backend> {
    backend: B,
    settings: DashboardSettings,
    session: SessionState,
    notices: Vec<Notice>,
    sample: Option<SampleView>,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: B, settings: DashboardSettings) -> Self {
        Self {
            backend,
            session: SessionState::new(Instant::now(), settings.inactivity_threshold),
            settings,
            notices: Vec::new(),
            sample: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 기준 URL 변경 등으로 클라이언트를 바꿀 때. 세션은 유지한다.
    pub fn set_backend(&mut self, backend: B) {
        self.backend = backend;
    }

    pub fn set_settings(&mut self, settings: DashboardSettings) {
        self.settings = settings;
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn sample_view(&self) -> Option<&SampleView> {
        self.sample.as_ref()
    }

    fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notices.push(Notice {
            level,
            text: text.into(),
        });
    }

    fn fail(&mut self, err: DashboardError) -> DashboardError {
        self.notify(NoticeLevel::Error, err.to_string());
        err
    }

    /// 주기 틱과 모든 상호작용에서 호출한다. 비활성이면 true.
    pub fn observe_activity(&mut self, now: Instant) -> bool {
        self.session.inactivity.observe(now)
    }

    pub fn dismiss_overlay(&mut self) {
        self.session.inactivity.dismiss_overlay();
    }

    /// 세션을 버리고 처음 상태로 돌아간다.
    pub fn reload(&mut self, now: Instant) {
        self.session.reload(now);
        self.notices.clear();
        self.sample = None;
    }

    /// 서버를 깨운 뒤 파일을 올리고 날짜 범위를 받는다.
    ///
    /// `sleep`은 깨우기 폴링 사이의 대기에 쓰인다.
    pub fn upload<S>(&mut self, file: UploadFile, sleep: S) -> Result<DateRange, DashboardError>
    where
        S: FnMut(Duration),
    {
        let outcome = wait_for_backend(&self.backend, &self.settings.wake, sleep);
        self.upload_after_wake(file, outcome)
    }

    /// 호출자가 이미 `/ping`을 한 번 보낸 경우. `alive`가 그 결과다.
    pub fn upload_after_ping<S>(
        &mut self,
        file: UploadFile,
        alive: bool,
        sleep: S,
    ) -> Result<DateRange, DashboardError>
    where
        S: FnMut(Duration),
    {
        let outcome = if alive {
            WakeOutcome::AlreadyActive
        } else {
            poll_until_awake(&self.backend, &self.settings.wake, sleep)
        };
        self.upload_after_wake(file, outcome)
    }

    fn upload_after_wake(
        &mut self,
        file: UploadFile,
        outcome: WakeOutcome,
    ) -> Result<DateRange, DashboardError> {
        self.sample = None;
        match outcome {
            WakeOutcome::AlreadyActive => {}
            WakeOutcome::Woke { .. } | WakeOutcome::GaveUp { .. } => {
                self.notify(NoticeLevel::Info, WAKE_MESSAGE);
            }
        }

        let response = match self.backend.upload(&file) {
            Ok(response) => response,
            Err(err) => {
                self.session.clear_upload();
                let detail = match &err {
                    BackendError::Status { .. } => {
                        err.detail().unwrap_or_else(|| "Unknown error".to_string())
                    }
                    other => other.to_string(),
                };
                return Err(self.fail(DashboardError::Upload { detail }));
            }
        };

        let range = match DateRange::from_iso_pair(&response.date_range) {
            Ok(range) => range,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    date_range = ?response.date_range,
                    "unusable date range"
                );
                self.session.clear_upload();
                return Err(self.fail(DashboardError::Date(DateError::MissingRange)));
            }
        };
        tracing::info!(file = %file.file_name, range = %range.display(), "upload accepted");
        self.session.replace_upload(file.file_name, range);
        self.notify(NoticeLevel::Success, UPLOAD_OK);
        self.notify(
            NoticeLevel::Info,
            format!("Available date range: {}", range.display()),
        );
        Ok(range)
    }

    /// 범위 안의 날짜만 받아들인다. 거절하면 선택을 비운다.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<NaiveDate, DashboardError> {
        self.sample = None;
        let checked = match self.session.date_range {
            Some(range) => range.check(date),
            None => Err(DateError::NoRange),
        };
        match checked {
            Ok(date) => {
                self.session.selected_date = Some(date);
                Ok(date)
            }
            Err(err) => {
                tracing::debug!(%date, "date rejected");
                self.session.selected_date = None;
                Err(self.fail(err.into()))
            }
        }
    }

    /// `DD-MM-YYYY` (또는 ISO) 텍스트로 날짜를 고른다.
    pub fn select_date_text(&mut self, text: &str) -> Result<NaiveDate, DashboardError> {
        match dates::parse_display(text) {
            Ok(date) => self.select_date(date),
            Err(err) => {
                tracing::debug!(text, "date text rejected");
                self.session.selected_date = None;
                self.sample = None;
                Err(self.fail(err.into()))
            }
        }
    }

    /// `DD-MM-YYYY` 형태의 선택 날짜.
    pub fn selected_date_text(&self) -> Option<String> {
        self.session.selected_date.map(dates::to_display)
    }

    /// 선택한 날짜의 원본 시트를 가져온다. 계산에는 영향이 없다.
    pub fn verify_sample_data(&mut self) -> Result<&SampleView, DashboardError> {
        let Some(date) = self.selected_date_text() else {
            return Err(self.fail(DashboardError::NotReady(
                Readiness::NeedsDate.describe(),
            )));
        };
        let value = match self
            .backend
            .get_json(Endpoint::SampleData, &[("selected_date", date.clone())])
        {
            Ok(value) => value,
            Err(err) => return Err(self.fail(DashboardError::SampleData(err))),
        };
        let response: SampleDataResponse = match serde_json::from_value(value) {
            Ok(response) => response,
            Err(e) => {
                let err = BackendError::Decode {
                    endpoint: Endpoint::SampleData,
                    message: e.to_string(),
                };
                return Err(self.fail(DashboardError::SampleData(err)));
            }
        };
        let sheets = table::sample_sheets(&response.sample_data);
        if sheets.is_empty() {
            self.notify(
                NoticeLevel::Warning,
                format!("No sample data found for {date}"),
            );
        } else {
            self.notify(NoticeLevel::Success, format!("Sample Data for {date}:"));
        }
        Ok(&*self.sample.insert(SampleView { date, sheets }))
    }

    pub fn select(&mut self, selection: Selection) -> Transition {
        self.session.select(selection)
    }

    /// 혼합비 편집. 검증에 실패해도 편집값은 남아 다시 고칠 수 있다.
    pub fn edit_proportions(&mut self, values: [f64; 5]) -> Result<(), ProportionError> {
        let result = self
            .session
            .proportions
            .apply(values, self.settings.proportion_tolerance);
        if let Err(err) = &result {
            tracing::debug!(error = %err, "proportions rejected");
        }
        result
    }

    /// 혼합비 표 열 폭을 다시 맞춰야 하면 true를 한 번 돌려준다.
    pub fn take_table_reset(&mut self) -> bool {
        std::mem::take(&mut self.session.table_width_auto)
    }

    pub fn set_porosity_input(&mut self, text: impl Into<String>) {
        self.session.porosity_input = text.into();
    }

    /// 현재 입력으로 계산을 보낼 수 있는지 판단한다.
    pub fn readiness(&self) -> Readiness {
        let session = &self.session;
        if session.date_range.is_none() {
            return Readiness::NeedsUpload;
        }
        let Some(date) = session.selected_date else {
            return Readiness::NeedsDate;
        };
        let Some(kind) = session.selection().kind() else {
            return Readiness::NeedsSelection;
        };
        let proportions = match session
            .proportions
            .check(self.settings.proportion_tolerance)
        {
            Ok(set) => set,
            Err(err) => return Readiness::InvalidProportions(err),
        };
        let porosity = if kind.requires_porosity() {
            match Porosity::parse(&session.porosity_input) {
                Ok(p) => Some(p),
                Err(PorosityError::Empty) => {
                    return Readiness::NeedsPorosity {
                        prompt: kind.porosity_prompt(),
                    }
                }
                Err(err) => return Readiness::InvalidPorosity(err),
            }
        } else {
            None
        };
        Readiness::Ready {
            label: kind.button_label(porosity),
            request: CalculationRequest {
                kind,
                selected_date: dates::to_display(date),
                packing_density: porosity.map(|p| p.packing_density()),
                updated_proportions: proportions.to_query_value(),
            },
        }
    }

    /// 계산 요청을 정확히 한 번 보낸다. 실패하면 세션은 바뀌지 않는다.
    pub fn calculate(&mut self) -> Result<ResultView, DashboardError> {
        let (request, label) = match self.readiness() {
            Readiness::Ready { request, label } => (request, label),
            other => return Err(self.fail(DashboardError::NotReady(other.describe()))),
        };
        self.notify(NoticeLevel::Info, format!("Processing: {label}"));
        let kind = request.kind;
        let body = match self.backend.get_json(request.endpoint(), &request.query()) {
            Ok(body) => body,
            Err(BackendError::Status { body, .. }) => {
                return Err(self.fail(DashboardError::Calculation {
                    calculation_type: kind.calculation_type().label(),
                    body,
                }))
            }
            Err(err) => return Err(self.fail(DashboardError::Exception(err.to_string()))),
        };
        let result = match CalculationResult::decode(kind, body) {
            Ok(result) => result,
            Err(err) => return Err(self.fail(DashboardError::Exception(err.to_string()))),
        };
        let view = result.render(self.settings.render);
        self.session.last_result = Some(result);
        Ok(view)
    }

    /// 마지막 결과를 현재 표시 옵션으로 다시 그린다.
    pub fn result_view(&self) -> Option<ResultView> {
        self.session
            .last_result
            .as_ref()
            .map(|r| r.render(self.settings.render))
    }
}
