//! 한 세션 동안 유지되는 사용자 상태. 새로고침하면 통째로 버린다.

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::calculation::{transition, Selection, Transition};
use crate::dates::DateRange;
use crate::inactivity::InactivityMonitor;
use crate::proportions::ProportionEditor;
use crate::results::CalculationResult;

#[derive(Debug, Clone)]
pub struct SessionState {
    /// 마지막으로 업로드에 성공한 파일 이름
    pub uploaded_file: Option<String>,
    pub date_range: Option<DateRange>,
    pub selected_date: Option<NaiveDate>,
    selection: Selection,
    pub proportions: ProportionEditor,
    pub porosity_input: String,
    pub last_result: Option<CalculationResult>,
    pub inactivity: InactivityMonitor,
    /// 혼합비 표 폭을 다시 자동으로 맞출지 (GUI)
    pub table_width_auto: bool,
}

impl SessionState {
    pub fn new(now: Instant, inactivity_threshold: Duration) -> Self {
        Self {
            uploaded_file: None,
            date_range: None,
            selected_date: None,
            selection: Selection::Unselected,
            proportions: ProportionEditor::default(),
            porosity_input: String::new(),
            last_result: None,
            inactivity: InactivityMonitor::new(now, inactivity_threshold),
            table_width_auto: true,
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// 선택을 바꾸고 전이표에 따라 혼합비를 초기화한다.
    ///
    /// 선택이 실제로 바뀌면 이전 결과와 공극률 입력도 지운다.
    pub fn select(&mut self, to: Selection) -> Transition {
        let from = self.selection;
        let step = transition(from, to);
        if step == Transition::ResetProportions {
            tracing::debug!(?from, ?to, "proportions reset");
            self.proportions.reset();
            self.table_width_auto = true;
        }
        if from != to {
            self.porosity_input.clear();
            self.last_result = None;
        }
        self.selection = to;
        step
    }

    /// 새 파일을 받았을 때. 날짜 선택과 결과는 무효가 된다.
    pub fn replace_upload(&mut self, file_name: String, range: DateRange) {
        self.uploaded_file = Some(file_name);
        self.date_range = Some(range);
        self.selected_date = None;
        self.last_result = None;
    }

    /// 업로드 실패 시 다시 업로드해야 한다.
    pub fn clear_upload(&mut self) {
        self.uploaded_file = None;
        self.date_range = None;
        self.selected_date = None;
        self.last_result = None;
    }

    /// 새로고침. 활동 시각도 지금으로 되돌린다.
    pub fn reload(&mut self, now: Instant) {
        let threshold = self.inactivity.threshold();
        tracing::info!("session reloaded");
        *self = Self::new(now, threshold);
    }
}
