//! 계산 응답 해석과 화면 표시용 결과 구성.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::backend::wire::{
    DoubleModifiedQValueBody, GbdBody, ModifiedQValueBody, QValueBody, Record,
};
use crate::calculation::CalculationKind;
use crate::numfmt;
use crate::regression::{
    RegressionError, RegressionPlot, RegressionSpec, DOUBLE_MODIFIED_REGRESSION,
    Q_VALUE_REGRESSION,
};
use crate::table::{self, DataTable};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResultError {
    #[error("Unexpected {kind} response: {message}")]
    Shape {
        kind: CalculationKind,
        message: String,
    },
    #[error("GBD key '{0}' is not a packing density.")]
    DensityKey(String),
    #[error("Field '{field}' on {date} is not a valid q-value column.")]
    QField { date: String, field: String },
}

/// Modified Andreasen 결과의 `q_<d>` 필드에서 `d`를 어떻게 읽을지.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DensityLabel {
    /// `d`는 충전 밀도 백분율. 공극률 = 100 - d.
    #[default]
    PackingDensity,
    /// `d`가 이미 공극률 백분율.
    Porosity,
}

impl DensityLabel {
    pub fn porosity_percent(self, label_value: f64) -> f64 {
        match self {
            DensityLabel::PackingDensity => 100.0 - label_value,
            DensityLabel::Porosity => label_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GbdValue {
    pub packing_density: f64,
    pub gbd: f64,
}

impl GbdValue {
    /// `100 - round(density * 100)`
    pub fn porosity_percent(&self) -> f64 {
        100.0 - (self.packing_density * 100.0).round()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GbdResult {
    pub total_volume: f64,
    pub specific_gravity: f64,
    pub values: Vec<GbdValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatedQValue {
    pub date: String,
    pub q_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QValueResult {
    pub q_values: Vec<DatedQValue>,
    pub intermediate_table: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedQValue {
    /// 원래 필드 이름 (`q_80`)
    pub field: String,
    /// 접두사를 뗀 숫자 (`80`)
    pub label_value: f64,
    pub q_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedQValueRow {
    pub date: String,
    pub values: Vec<ModifiedQValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifiedQValueResult {
    pub rows: Vec<ModifiedQValueRow>,
    pub cpft_error_table: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoubleModifiedQValueResult {
    pub q_values: Vec<DatedQValue>,
    pub intermediate_table: Vec<Record>,
}

/// 계산 종류별 응답.
#[derive(Debug, Clone, PartialEq)]
pub enum CalculationResult {
    Gbd(GbdResult),
    QValue(QValueResult),
    ModifiedQValue(ModifiedQValueResult),
    DoubleModifiedQValue(DoubleModifiedQValueResult),
}

fn shape<T: serde::de::DeserializeOwned>(
    kind: CalculationKind,
    body: Value,
) -> Result<T, ResultError> {
    serde_json::from_value(body).map_err(|e| ResultError::Shape {
        kind,
        message: e.to_string(),
    })
}

impl CalculationResult {
    /// 요청한 계산 종류에 맞춰 본문을 해석한다. 필수 필드가 없으면 오류다.
    pub fn decode(kind: CalculationKind, body: Value) -> Result<Self, ResultError> {
        match kind {
            CalculationKind::Gbd => {
                let raw: GbdBody = shape(kind, body)?;
                let values = raw
                    .gbd_values
                    .iter()
                    .map(|(key, value)| -> Result<GbdValue, ResultError> {
                        let packing_density = key
                            .trim()
                            .parse::<f64>()
                            .map_err(|_| ResultError::DensityKey(key.clone()))?;
                        let gbd = value.as_f64().ok_or_else(|| ResultError::Shape {
                            kind,
                            message: format!("gbd value for '{key}' is not a number"),
                        })?;
                        Ok(GbdValue {
                            packing_density,
                            gbd,
                        })
                    })
                    .collect::<Result<Vec<_>, ResultError>>()?;
                Ok(CalculationResult::Gbd(GbdResult {
                    total_volume: raw.total_volume,
                    specific_gravity: raw.specific_gravity,
                    values,
                }))
            }
            CalculationKind::Andreasen => {
                let raw: QValueBody = shape(kind, body)?;
                Ok(CalculationResult::QValue(QValueResult {
                    q_values: raw
                        .q_values
                        .into_iter()
                        .map(|r| DatedQValue {
                            date: r.date,
                            q_value: r.q_value,
                        })
                        .collect(),
                    intermediate_table: raw.intermediate_table,
                }))
            }
            CalculationKind::ModifiedAndreasen => {
                let raw: ModifiedQValueBody = shape(kind, body)?;
                let rows = raw
                    .q_values
                    .iter()
                    .map(|record| modified_row(kind, record))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(CalculationResult::ModifiedQValue(ModifiedQValueResult {
                    rows,
                    cpft_error_table: raw.cpft_error_table,
                }))
            }
            CalculationKind::DoubleModifiedAndreasen => {
                let raw: DoubleModifiedQValueBody = shape(kind, body)?;
                Ok(CalculationResult::DoubleModifiedQValue(
                    DoubleModifiedQValueResult {
                        q_values: raw
                            .double_modified_q_values
                            .into_iter()
                            .map(|r| DatedQValue {
                                date: r.date,
                                q_value: r.q_value,
                            })
                            .collect(),
                        intermediate_table: raw.intermediate_table,
                    },
                ))
            }
        }
    }
}

/// `{"Date": ..., "q_80": 0.55, ...}` 한 행을 해석한다.
fn modified_row(kind: CalculationKind, record: &Record) -> Result<ModifiedQValueRow, ResultError> {
    let date = match record.get("Date") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => {
            return Err(ResultError::Shape {
                kind,
                message: "q_values row without Date".into(),
            })
        }
    };
    let values = record
        .iter()
        .filter(|(field, _)| field.as_str() != "Date")
        .map(|(field, value)| -> Result<ModifiedQValue, ResultError> {
            let bad = || ResultError::QField {
                date: date.clone(),
                field: field.clone(),
            };
            let label_value = field
                .strip_prefix("q_")
                .unwrap_or(field)
                .parse::<f64>()
                .map_err(|_| bad())?;
            let q_value = value.as_f64().ok_or_else(bad)?;
            Ok(ModifiedQValue {
                field: field.clone(),
                label_value,
                q_value,
            })
        })
        .collect::<Result<Vec<_>, ResultError>>()?;
    Ok(ModifiedQValueRow { date, values })
}

/// 결과 상세(접힌 영역)의 회귀 그래프.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSection {
    pub heading: &'static str,
    pub plot: Result<RegressionPlot, RegressionError>,
}

/// 기본으로 접혀 있는 상세 영역.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSection {
    pub title: &'static str,
    pub table_heading: &'static str,
    pub table: DataTable,
    /// 표가 비었을 때의 경고
    pub empty_warning: Option<&'static str>,
    pub plot: Option<PlotSection>,
}

/// 프런트엔드가 그대로 그릴 수 있는 결과.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub kind: CalculationKind,
    /// 요약 위쪽 줄 (GBD 총부피/비중)
    pub headline: Vec<String>,
    /// 요약 목록 제목 (GBD만)
    pub list_heading: Option<&'static str>,
    pub lines: Vec<String>,
    pub detail: Option<DetailSection>,
}

pub const NO_INTERMEDIATE_DATA: &str = "No intermediate data available.";

/// 화면 표시 옵션.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub modified_label: DensityLabel,
}

fn regression_detail(
    title: &'static str,
    table_heading: &'static str,
    table: DataTable,
    plot_heading: &'static str,
    spec: RegressionSpec,
) -> DetailSection {
    let plot = RegressionPlot::from_table(&table, spec);
    DetailSection {
        title,
        table_heading,
        empty_warning: table.is_empty().then_some(NO_INTERMEDIATE_DATA),
        table,
        plot: Some(PlotSection {
            heading: plot_heading,
            plot,
        }),
    }
}

impl CalculationResult {
    pub fn kind(&self) -> CalculationKind {
        match self {
            CalculationResult::Gbd(_) => CalculationKind::Gbd,
            CalculationResult::QValue(_) => CalculationKind::Andreasen,
            CalculationResult::ModifiedQValue(_) => CalculationKind::ModifiedAndreasen,
            CalculationResult::DoubleModifiedQValue(_) => CalculationKind::DoubleModifiedAndreasen,
        }
    }

    pub fn render(&self, options: RenderOptions) -> ResultView {
        let kind = self.kind();
        match self {
            CalculationResult::Gbd(gbd) => ResultView {
                kind,
                headline: vec![
                    format!("Total Volume of the Mix: {:.4}", gbd.total_volume),
                    format!("Specific Gravity of the Mix: {:.4} g/cc", gbd.specific_gravity),
                ],
                list_heading: Some("GBD Values"),
                lines: gbd
                    .values
                    .iter()
                    .map(|v| {
                        format!(
                            "GBD for {}% Porosity: {:.4} g/cc",
                            numfmt::percent_label(v.porosity_percent()),
                            v.gbd
                        )
                    })
                    .collect(),
                detail: None,
            },
            CalculationResult::QValue(q) => ResultView {
                kind,
                headline: Vec::new(),
                list_heading: None,
                lines: q
                    .q_values
                    .iter()
                    .map(|v| format!("q-value on {}: {:.4}", v.date, v.q_value))
                    .collect(),
                detail: Some(regression_detail(
                    "Show Processed Data Table & Regression Graph",
                    "Processed Data Table",
                    DataTable::from_records(&q.intermediate_table)
                        .without_columns(table::Q_VALUE_HIDDEN)
                        .relabeled(table::Q_VALUE_LABELS),
                    "Regression Graph",
                    Q_VALUE_REGRESSION,
                )),
            },
            CalculationResult::ModifiedQValue(m) => ResultView {
                kind,
                headline: Vec::new(),
                list_heading: None,
                lines: m
                    .rows
                    .iter()
                    .flat_map(|row| {
                        row.values.iter().map(move |v| {
                            format!(
                                "Modified q-value on {} at {}% Porosity: {:.4}",
                                row.date,
                                numfmt::percent_label(
                                    options.modified_label.porosity_percent(v.label_value)
                                ),
                                v.q_value
                            )
                        })
                    })
                    .collect(),
                detail: (!m.cpft_error_table.is_empty()).then(|| DetailSection {
                    title: "Show Processed Data Table",
                    table_heading: "Processed Data Table",
                    table: DataTable::from_records(&m.cpft_error_table)
                        .relabeled(table::CPFT_ERROR_LABELS),
                    empty_warning: None,
                    plot: None,
                }),
            },
            CalculationResult::DoubleModifiedQValue(d) => ResultView {
                kind,
                headline: Vec::new(),
                list_heading: None,
                lines: d
                    .q_values
                    .iter()
                    .map(|v| format!("Double Modified q-value on {}: {:.4}", v.date, v.q_value))
                    .collect(),
                detail: Some(regression_detail(
                    "Show Processed Data Table",
                    "Processed Data Table for Regression",
                    DataTable::from_records(&d.intermediate_table)
                        .relabeled(table::DOUBLE_MODIFIED_LABELS),
                    "Regression Graph for Double Modified q-Value",
                    DOUBLE_MODIFIED_REGRESSION,
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn gbd_lines_use_rounded_porosity() {
        let body = json!({
            "total_volume": 12.345678,
            "specific_gravity": 2.5,
            "gbd_values": {"0.57": 1.42, "0.8": 2.0}
        });
        let view = CalculationResult::decode(CalculationKind::Gbd, body)
            .unwrap()
            .render(RenderOptions::default());
        assert_eq!(
            view.headline,
            vec![
                "Total Volume of the Mix: 12.3457",
                "Specific Gravity of the Mix: 2.5000 g/cc"
            ]
        );
        assert_eq!(
            view.lines,
            vec![
                "GBD for 43% Porosity: 1.4200 g/cc",
                "GBD for 20% Porosity: 2.0000 g/cc"
            ]
        );
        assert!(view.detail.is_none());
    }

    #[test]
    fn modified_labels_follow_convention() {
        let body = json!({"q_values": [{"Date": "15-01-2024", "q_80": 0.55}]});
        let result =
            CalculationResult::decode(CalculationKind::ModifiedAndreasen, body).unwrap();
        let packing = result.render(RenderOptions::default());
        assert_eq!(
            packing.lines,
            vec!["Modified q-value on 15-01-2024 at 20% Porosity: 0.5500"]
        );
        let porosity = result.render(RenderOptions {
            modified_label: DensityLabel::Porosity,
        });
        assert_eq!(
            porosity.lines,
            vec!["Modified q-value on 15-01-2024 at 80% Porosity: 0.5500"]
        );
        assert!(packing.detail.is_none());
    }

    #[test]
    fn unrecognized_shapes_are_rejected() {
        let err = CalculationResult::decode(
            CalculationKind::Andreasen,
            json!({"double_modified_q_values": []}),
        )
        .unwrap_err();
        assert!(matches!(err, ResultError::Shape { .. }));

        let err = CalculationResult::decode(
            CalculationKind::ModifiedAndreasen,
            json!({"q_values": [{"Date": "x", "qq": 1.0}]}),
        )
        .unwrap_err();
        assert!(matches!(err, ResultError::QField { .. }));
    }

    #[test]
    fn missing_intermediate_table_only_warns() {
        let body = json!({"q_values": [{"Date": "15-01-2024", "q-value": 0.41234}]});
        let view = CalculationResult::decode(CalculationKind::Andreasen, body)
            .unwrap()
            .render(RenderOptions::default());
        assert_eq!(view.lines, vec!["q-value on 15-01-2024: 0.4123"]);
        let detail = view.detail.unwrap();
        assert_eq!(detail.empty_warning, Some(NO_INTERMEDIATE_DATA));
        assert!(matches!(
            detail.plot.unwrap().plot,
            Err(RegressionError::MissingColumns { .. })
        ));
    }

    #[test]
    fn double_modified_plot_uses_x_value_column() {
        let body = json!({
            "double_modified_q_values": [{"Date": "15-01-2024", "q_value": 0.3}],
            "intermediate_table": [
                {"D_value": 10, "x_value": -1.0, "log_pct_CPFT": 1.7},
                {"D_value": 100, "x_value": 0.0, "log_pct_CPFT": 2.0}
            ]
        });
        let view = CalculationResult::decode(CalculationKind::DoubleModifiedAndreasen, body)
            .unwrap()
            .render(RenderOptions::default());
        let detail = view.detail.unwrap();
        assert_eq!(
            detail.table.columns(),
            [
                "Particle Size (μm)",
                "Log(D - D_min) - Log(D_max - D_min)",
                "Log(%_CPFT)"
            ]
        );
        let plot = detail.plot.unwrap().plot.unwrap();
        assert!((plot.q_value() - 0.3).abs() < 1e-12);
    }
}
