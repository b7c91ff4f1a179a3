//! 다섯 개 원료 시트의 혼합 비율 편집과 검증.

use thiserror::Error;

use crate::numfmt;

/// 시트 고정 순서. 백엔드 쿼리도 이 순서를 따른다.
pub const SHEET_LABELS: [&str; 5] = ["H(7-12)", "H(14-30)", "H(36-70)", "H(80-180)", "H(220)"];

/// 세션 시작/리셋 시 사용하는 기본 혼합비 (합계 = 1).
pub const DEFAULT_PROPORTIONS: [f64; 5] = [0.35, 0.20, 0.15, 0.10, 0.20];

/// 혼합비 검증 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProportionError {
    #[error("Proportion values cannot be negative. Please enter positive values.")]
    Negative { index: usize, value: f64 },
    #[error("The sum of all proportions must be exactly 1. Currently: {sum:.4}")]
    SumNotOne { sum: f64 },
    #[error("Expected {expected} proportion values, got {found}.")]
    WrongCount { expected: usize, found: usize },
    #[error("'{0}' is not a number.")]
    NotNumeric(String),
}

/// 검증을 통과한 혼합비 집합.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProportionSet {
    values: [f64; 5],
}

impl Default for ProportionSet {
    fn default() -> Self {
        Self {
            values: DEFAULT_PROPORTIONS,
        }
    }
}

impl ProportionSet {
    pub fn values(&self) -> [f64; 5] {
        self.values
    }

    pub fn sum(&self) -> f64 {
        sum_in_order(&self.values)
    }

    /// `updated_proportions` 쿼리 값.
    pub fn to_query_value(&self) -> String {
        numfmt::join_floats(&self.values)
    }
}

/// 왼쪽부터 차례로 더한다. 합계 비교가 입력 순서에 의존하므로 순서를 고정한다.
fn sum_in_order(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc, v| acc + v)
}

/// 편집된 값을 검증한다.
///
/// `tolerance`가 0 이하이면 합계가 정확히 1.0이어야 한다.
pub fn validate(values: [f64; 5], tolerance: f64) -> Result<ProportionSet, ProportionError> {
    if let Some((index, value)) = values
        .iter()
        .copied()
        .enumerate()
        .find(|(_, v)| *v < 0.0)
    {
        return Err(ProportionError::Negative { index, value });
    }
    let sum = sum_in_order(&values);
    let sums_to_one = if tolerance > 0.0 {
        (sum - 1.0).abs() <= tolerance
    } else {
        sum == 1.0
    };
    if !sums_to_one {
        return Err(ProportionError::SumNotOne { sum });
    }
    Ok(ProportionSet { values })
}

/// `0.35, 0.2, ...` 형태의 입력을 다섯 개 값으로 읽는다 (CLI용).
pub fn parse_list(input: &str) -> Result<[f64; 5], ProportionError> {
    let parsed = input
        .split([',', ' ', '\t'])
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| ProportionError::NotNumeric(s.trim().to_string()))
        })
        .collect::<Result<Vec<f64>, _>>()?;
    <[f64; 5]>::try_from(parsed.as_slice()).map_err(|_| ProportionError::WrongCount {
        expected: SHEET_LABELS.len(),
        found: parsed.len(),
    })
}

/// 편집 중인 혼합비. 검증은 요청 직전에 다시 한다.
#[derive(Debug, Clone, PartialEq)]
pub struct ProportionEditor {
    draft: [f64; 5],
}

impl Default for ProportionEditor {
    fn default() -> Self {
        Self {
            draft: DEFAULT_PROPORTIONS,
        }
    }
}

impl ProportionEditor {
    pub fn draft(&self) -> [f64; 5] {
        self.draft
    }

    /// 편집 결과를 반영하고 바로 검증한다. 실패해도 편집값은 남는다.
    pub fn apply(&mut self, values: [f64; 5], tolerance: f64) -> Result<(), ProportionError> {
        self.draft = values;
        validate(values, tolerance).map(|_| ())
    }

    /// 현재 편집값 기준의 검증 결과.
    pub fn check(&self, tolerance: f64) -> Result<ProportionSet, ProportionError> {
        validate(self.draft, tolerance)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_sum_exactly_to_one() {
        let set = validate(DEFAULT_PROPORTIONS, 0.0).expect("defaults are valid");
        assert_eq!(set.sum(), 1.0);
        assert_eq!(set.to_query_value(), "0.35,0.2,0.15,0.1,0.2");
    }

    #[test]
    fn negative_value_is_rejected_before_sum() {
        let err = validate([0.5, -0.1, 0.2, 0.2, 0.2], 0.0).unwrap_err();
        assert_eq!(
            err,
            ProportionError::Negative {
                index: 1,
                value: -0.1
            }
        );
    }

    #[test]
    fn sum_error_reports_four_decimals() {
        let err = validate([0.4, 0.2, 0.15, 0.1, 0.2], 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The sum of all proportions must be exactly 1. Currently: 1.0500"
        );
    }

    #[test]
    fn tolerance_accepts_rounding_noise() {
        // 0.6 + 0.1 * 4 = 0.9999999999999999
        let values = [0.6, 0.1, 0.1, 0.1, 0.1];
        assert!(matches!(
            validate(values, 0.0),
            Err(ProportionError::SumNotOne { .. })
        ));
        assert!(validate(values, 1e-9).is_ok());
    }

    #[test]
    fn editor_keeps_rejected_draft_for_correction() {
        let mut editor = ProportionEditor::default();
        editor.apply([0.2, 0.2, 0.2, 0.2, 0.2], 0.0).unwrap();
        assert_eq!(editor.check(0.0).unwrap().values(), [0.2; 5]);
        assert!(editor.apply([0.9, 0.2, 0.2, 0.2, 0.2], 0.0).is_err());
        assert_eq!(editor.draft(), [0.9, 0.2, 0.2, 0.2, 0.2]);
        assert!(editor.check(0.0).is_err());
        editor.reset();
        assert_eq!(editor.draft(), DEFAULT_PROPORTIONS);
    }

    #[test]
    fn parse_list_accepts_commas_and_spaces() {
        assert_eq!(
            parse_list("0.35, 0.2 0.15,0.1,0.2").unwrap(),
            [0.35, 0.2, 0.15, 0.1, 0.2]
        );
        assert!(matches!(
            parse_list("0.5,0.5"),
            Err(ProportionError::WrongCount { found: 2, .. })
        ));
        assert!(matches!(
            parse_list("0.5,x,0,0,0"),
            Err(ProportionError::NotNumeric(_))
        ));
    }
}
