use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use cumi_dashboard::backend::wire::UploadResponse;
use cumi_dashboard::backend::{Backend, BackendError, Endpoint, UploadFile};
use cumi_dashboard::calculation::{QValueMethod, Selection, Transition};
use cumi_dashboard::dashboard::{
    Dashboard, DashboardError, DashboardSettings, NoticeLevel, Readiness, WAKE_MESSAGE,
};
use cumi_dashboard::proportions::DEFAULT_PROPORTIONS;
use cumi_dashboard::results::{DensityLabel, RenderOptions};
use cumi_dashboard::table::{cell_text, RECEIVED_DATE};
use serde_json::{json, Value};

type Call = (Endpoint, Vec<(String, String)>);

/// 호출을 기록하고 미리 넣어 둔 응답을 돌려주는 백엔드.
#[derive(Default)]
struct FakeBackend {
    /// None이면 항상 깨어 있다. Some(n)이면 n번째 ping부터 응답한다.
    wake_after: Option<u32>,
    asleep_forever: bool,
    pings: Cell<u32>,
    upload_result: RefCell<Option<Result<UploadResponse, BackendError>>>,
    responses: RefCell<VecDeque<Result<Value, BackendError>>>,
    calls: RefCell<Vec<Call>>,
}

impl FakeBackend {
    fn with_range(min: &str, max: &str) -> Self {
        let fake = Self::default();
        *fake.upload_result.borrow_mut() = Some(Ok(UploadResponse {
            date_range: vec![min.to_string(), max.to_string()],
        }));
        fake
    }

    fn respond(&self, value: Result<Value, BackendError>) {
        self.responses.borrow_mut().push_back(value);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Backend for FakeBackend {
    fn ping(&self) -> bool {
        let n = self.pings.get() + 1;
        self.pings.set(n);
        if self.asleep_forever {
            return false;
        }
        self.wake_after.map_or(true, |w| n >= w)
    }

    fn upload(&self, _file: &UploadFile) -> Result<UploadResponse, BackendError> {
        self.upload_result
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok(UploadResponse::default()))
    }

    fn get_json(
        &self,
        endpoint: Endpoint,
        query: &[(&str, String)],
    ) -> Result<Value, BackendError> {
        self.calls.borrow_mut().push((
            endpoint,
            query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({})))
    }
}

fn file() -> UploadFile {
    UploadFile::new("mix.xlsx", vec![1, 2, 3])
}

/// 2024년 1월 범위가 올라가 있고 15-01-2024가 선택된 대시보드.
fn ready_dashboard(settings: DashboardSettings) -> Dashboard<FakeBackend> {
    let backend = FakeBackend::with_range("2024-01-01", "2024-01-31");
    let mut dashboard = Dashboard::new(backend, settings);
    dashboard.upload(file(), |_| {}).unwrap();
    dashboard.select_date_text("15-01-2024").unwrap();
    dashboard.take_notices();
    dashboard
}

fn q_value_body() -> Value {
    json!({
        "q_values": [{"Date": "15-01-2024", "q-value": 0.2468}],
        "intermediate_table": [
            {"sheet_constant": 1, "D_value": 12.0, "Log_D/Dmax_value": -1.0, "Log_pct_CPFT": 1.7},
            {"sheet_constant": 1, "D_value": 120.0, "Log_D/Dmax_value": 0.0, "Log_pct_CPFT": 2.0}
        ]
    })
}

#[test]
fn andreasen_request_end_to_end() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    assert_eq!(
        dashboard.select(Selection::QValues(QValueMethod::Andreasen)),
        Transition::ResetProportions
    );
    assert_eq!(dashboard.session().proportions.draft(), DEFAULT_PROPORTIONS);

    let readiness = dashboard.readiness();
    assert_eq!(
        readiness.button_label(),
        Some("Calculate q-value using Andreasen Eq.")
    );

    dashboard.backend().respond(Ok(q_value_body()));
    let view = dashboard.calculate().unwrap();

    let calls = dashboard.backend().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Endpoint::CalculateQValue);
    assert_eq!(
        calls[0].1,
        vec![
            ("selected_date".to_string(), "15-01-2024".to_string()),
            (
                "updated_proportions".to_string(),
                "0.35,0.2,0.15,0.1,0.2".to_string()
            ),
        ]
    );

    assert_eq!(view.lines, vec!["q-value on 15-01-2024: 0.2468"]);
    let detail = view.detail.unwrap();
    assert_eq!(detail.title, "Show Processed Data Table & Regression Graph");
    assert!(!detail.table.columns().iter().any(|c| c == "sheet_constant"));
    let plot = detail.plot.unwrap().plot.unwrap();
    assert!((plot.q_value() - 0.3).abs() < 1e-9);

    let notices = dashboard.take_notices();
    assert_eq!(notices[0].text, "Processing: Calculate q-value using Andreasen Eq.");
    assert!(dashboard.session().last_result.is_some());
}

#[test]
fn dates_outside_range_are_rejected_without_calls() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    let day = |d, m, y| NaiveDate::from_ymd_opt(y, m, d).unwrap();

    assert!(dashboard.select_date(day(1, 1, 2024)).is_ok());
    assert!(dashboard.select_date(day(31, 1, 2024)).is_ok());

    let err = dashboard.select_date(day(31, 12, 2023)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please select a date from the available range: 01-01-2024 to 31-01-2024"
    );
    assert!(dashboard.session().selected_date.is_none());
    assert!(dashboard.select_date(day(1, 2, 2024)).is_err());

    dashboard.select(Selection::Gbd);
    assert_eq!(dashboard.readiness(), Readiness::NeedsDate);
    assert!(dashboard.calculate().is_err());
    assert!(dashboard.backend().calls().is_empty());
}

#[test]
fn unparseable_date_text_clears_previous_selection() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    assert!(dashboard.session().selected_date.is_some());

    assert!(dashboard.select_date_text("32-13-2024").is_err());
    assert!(dashboard.session().selected_date.is_none());
    assert_eq!(
        dashboard.take_notices().last().unwrap().level,
        NoticeLevel::Error
    );

    dashboard.select(Selection::QValues(QValueMethod::Andreasen));
    assert_eq!(dashboard.readiness(), Readiness::NeedsDate);
    assert!(dashboard.calculate().is_err());
    assert!(dashboard.verify_sample_data().is_err());
    assert!(dashboard.backend().calls().is_empty());
}

#[test]
fn sample_data_is_fetched_for_selected_date() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.backend().respond(Ok(json!({
        "sample_data": {
            "H(7-12)": [{"Received Date": "2024-01-15", "D_value": 12.0}]
        }
    })));

    let view = dashboard.verify_sample_data().unwrap();
    assert_eq!(view.date, "15-01-2024");
    let sheet = &view.sheets[0];
    assert_eq!(sheet.name, "H(7-12)");
    let col = sheet.table.column_index(RECEIVED_DATE).unwrap();
    assert_eq!(cell_text(&sheet.table.rows()[0][col]), "15-01-2024");

    let calls = dashboard.backend().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Endpoint::SampleData);
    assert_eq!(
        calls[0].1,
        vec![("selected_date".to_string(), "15-01-2024".to_string())]
    );
    let notices = dashboard.take_notices();
    assert_eq!(notices.last().unwrap().level, NoticeLevel::Success);
    assert_eq!(notices.last().unwrap().text, "Sample Data for 15-01-2024:");
}

#[test]
fn empty_sample_data_is_a_warning() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.backend().respond(Ok(json!({"sample_data": {}})));

    assert!(dashboard.verify_sample_data().unwrap().sheets.is_empty());
    let notices = dashboard.take_notices();
    assert_eq!(notices.last().unwrap().level, NoticeLevel::Warning);
    assert_eq!(
        notices.last().unwrap().text,
        "No sample data found for 15-01-2024"
    );
}

#[test]
fn sample_data_failure_leaves_calculation_usable() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.backend().respond(Err(BackendError::Status {
        endpoint: Endpoint::SampleData,
        status: 500,
        body: "Internal Server Error".into(),
    }));

    assert!(matches!(
        dashboard.verify_sample_data(),
        Err(DashboardError::SampleData(_))
    ));
    assert!(dashboard.sample_view().is_none());
    let notices = dashboard.take_notices();
    assert_eq!(notices.last().unwrap().level, NoticeLevel::Error);
    assert_eq!(notices.last().unwrap().text, "Error retrieving sample data.");

    dashboard.select(Selection::QValues(QValueMethod::Andreasen));
    dashboard.backend().respond(Ok(q_value_body()));
    assert!(dashboard.calculate().is_ok());
    let calls = dashboard.backend().calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, Endpoint::CalculateQValue);
    assert_eq!(
        calls[1].1,
        vec![
            ("selected_date".to_string(), "15-01-2024".to_string()),
            (
                "updated_proportions".to_string(),
                "0.35,0.2,0.15,0.1,0.2".to_string()
            ),
        ]
    );
}

#[test]
fn invalid_proportions_block_calculation() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.select(Selection::QValues(QValueMethod::DoubleModifiedAndreasen));

    assert!(dashboard
        .edit_proportions([0.5, -0.1, 0.2, 0.2, 0.2])
        .is_err());
    let readiness = dashboard.readiness();
    assert!(!readiness.is_ready());
    assert_eq!(
        readiness.error_message().as_deref(),
        Some("Proportion values cannot be negative. Please enter positive values.")
    );

    assert!(dashboard.edit_proportions([0.3, 0.2, 0.2, 0.2, 0.2]).is_err());
    assert!(!dashboard.readiness().is_ready());
    assert!(dashboard.calculate().is_err());
    assert!(dashboard.backend().calls().is_empty());

    dashboard.edit_proportions([0.2; 5]).unwrap();
    assert!(dashboard.readiness().is_ready());
}

#[test]
fn porosity_bounds_are_inclusive() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.select(Selection::Gbd);

    for ok in ["0", "1", "0.5"] {
        dashboard.set_porosity_input(ok);
        assert!(dashboard.readiness().is_ready(), "{ok}");
    }
    for bad in ["-0.1", "1.1", "abc"] {
        dashboard.set_porosity_input(bad);
        let readiness = dashboard.readiness();
        assert!(!readiness.is_ready(), "{bad}");
        assert!(readiness.error_message().is_some(), "{bad}");
    }
    dashboard.set_porosity_input("");
    assert!(matches!(
        dashboard.readiness(),
        Readiness::NeedsPorosity { .. }
    ));
    assert!(dashboard.backend().calls().is_empty());
}

#[test]
fn gbd_sends_packing_density() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.select(Selection::Gbd);
    dashboard.set_porosity_input("0.5");
    assert_eq!(
        dashboard.readiness().button_label(),
        Some("Calculate GBD Values with Porosity: 0.5")
    );
    dashboard.backend().respond(Ok(json!({
        "total_volume": 10.0,
        "specific_gravity": 2.65,
        "gbd_values": {"0.57": 1.42}
    })));
    let view = dashboard.calculate().unwrap();
    let calls = dashboard.backend().calls();
    assert_eq!(calls[0].0, Endpoint::CalculateGbd);
    assert!(calls[0]
        .1
        .contains(&("packing_density".to_string(), "0.5".to_string())));
    assert_eq!(view.lines, vec!["GBD for 43% Porosity: 1.4200 g/cc"]);
    assert_eq!(view.list_heading, Some("GBD Values"));
}

#[test]
fn modified_labels_follow_configured_convention() {
    let body = json!({"q_values": [{"Date": "15-01-2024", "q_80": 0.5512}]});

    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.select(Selection::QValues(QValueMethod::ModifiedAndreasen));
    dashboard.set_porosity_input("0.2");
    dashboard.backend().respond(Ok(body.clone()));
    let view = dashboard.calculate().unwrap();
    assert_eq!(
        view.lines,
        vec!["Modified q-value on 15-01-2024 at 20% Porosity: 0.5512"]
    );

    let settings = DashboardSettings {
        render: RenderOptions {
            modified_label: DensityLabel::Porosity,
        },
        ..DashboardSettings::default()
    };
    dashboard.set_settings(settings);
    let view = dashboard.result_view().unwrap();
    assert_eq!(
        view.lines,
        vec!["Modified q-value on 15-01-2024 at 80% Porosity: 0.5512"]
    );
}

#[test]
fn failed_calculation_keeps_previous_result() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.select(Selection::QValues(QValueMethod::Andreasen));
    dashboard.backend().respond(Ok(q_value_body()));
    dashboard.calculate().unwrap();
    let before = dashboard.session().last_result.clone();
    dashboard.take_notices();

    dashboard.backend().respond(Err(BackendError::Status {
        endpoint: Endpoint::CalculateQValue,
        status: 500,
        body: "Internal Server Error".into(),
    }));
    let err = dashboard.calculate().unwrap_err();
    assert!(matches!(err, DashboardError::Calculation { .. }));
    assert_eq!(dashboard.session().last_result, before);

    let notices = dashboard.take_notices();
    let last = notices.last().unwrap();
    assert_eq!(last.level, NoticeLevel::Error);
    assert_eq!(
        last.text,
        "Error calculating q-Values. Backend response: Internal Server Error"
    );
}

#[test]
fn upload_rejection_reports_backend_detail() {
    let fake = FakeBackend::default();
    *fake.upload_result.borrow_mut() = Some(Err(BackendError::Status {
        endpoint: Endpoint::Upload,
        status: 400,
        body: r#"{"detail": "Missing sheet H(220)"}"#.into(),
    }));
    let mut dashboard = Dashboard::new(fake, DashboardSettings::default());
    assert!(dashboard.upload(file(), |_| {}).is_err());
    assert!(dashboard.session().date_range.is_none());
    let notices = dashboard.take_notices();
    assert_eq!(
        notices.last().unwrap().text,
        "Error uploading file: Missing sheet H(220). Please check your file format and ensure all required sheets/columns are included."
    );
}

#[test]
fn sleeping_backend_is_polled_before_upload() {
    let fake = FakeBackend {
        wake_after: Some(3),
        ..FakeBackend::with_range("2024-01-01", "2024-01-31")
    };
    let mut dashboard = Dashboard::new(fake, DashboardSettings::default());
    let naps = Cell::new(0);
    dashboard.upload(file(), |d| {
        assert_eq!(d, Duration::from_secs(10));
        naps.set(naps.get() + 1);
    })
    .unwrap();
    assert_eq!(naps.get(), 1);
    let notices = dashboard.take_notices();
    assert_eq!(notices[0].text, WAKE_MESSAGE);
    assert_eq!(notices[1].text, "File uploaded successfully.");
}

#[test]
fn backend_that_never_wakes_still_gets_the_upload() {
    let fake = FakeBackend {
        asleep_forever: true,
        ..FakeBackend::with_range("2024-01-01", "2024-01-31")
    };
    let mut dashboard = Dashboard::new(fake, DashboardSettings::default());
    let mut slept = Duration::ZERO;
    assert!(dashboard.upload(file(), |d| slept += d).is_ok());
    assert_eq!(slept, Duration::from_secs(60));
    assert_eq!(dashboard.backend().pings.get(), 7);
}

#[test]
fn awake_backend_is_not_pinged_again() {
    let mut dashboard = Dashboard::new(
        FakeBackend::with_range("2024-01-01", "2024-01-31"),
        DashboardSettings::default(),
    );
    dashboard
        .upload_after_ping(file(), true, |_| panic!("no sleep for an awake backend"))
        .unwrap();
    assert_eq!(dashboard.backend().pings.get(), 0);
    let notices = dashboard.take_notices();
    assert!(notices.iter().all(|n| n.text != WAKE_MESSAGE));
}

#[test]
fn failed_first_ping_resumes_polling_without_repeating_it() {
    let fake = FakeBackend {
        wake_after: Some(1),
        ..FakeBackend::with_range("2024-01-01", "2024-01-31")
    };
    let mut dashboard = Dashboard::new(fake, DashboardSettings::default());
    dashboard
        .upload_after_ping(file(), false, |_| panic!("woke on the next ping"))
        .unwrap();
    assert_eq!(dashboard.backend().pings.get(), 1);
    let notices = dashboard.take_notices();
    assert_eq!(notices[0].text, WAKE_MESSAGE);
    assert_eq!(notices[1].text, "File uploaded successfully.");
}

#[test]
fn reload_discards_session() {
    let mut dashboard = ready_dashboard(DashboardSettings::default());
    dashboard.select(Selection::Gbd);
    dashboard.reload(Instant::now());
    assert!(dashboard.session().date_range.is_none());
    assert_eq!(dashboard.session().selection(), Selection::Unselected);
    assert_eq!(dashboard.readiness(), Readiness::NeedsUpload);
}
