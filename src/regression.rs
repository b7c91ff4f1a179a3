//! 로그-로그 회귀 직선 (1차 최소제곱).
//!
//! 기울기가 곧 q-value이므로, 백엔드가 계산한 q-value를 그래프에서 눈으로
//! 확인하는 용도다.

use thiserror::Error;

use crate::table::DataTable;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegressionError {
    #[error("Required columns for regression are missing.")]
    MissingColumns { x: String, y: String },
    #[error("x and y have different lengths ({0} vs {1}).")]
    LengthMismatch(usize, usize),
    #[error("At least two data points are needed for a regression line (got {0}).")]
    TooFewPoints(usize),
    #[error("All x values are identical; the regression line is undefined.")]
    DegenerateX,
}

/// y = slope * x + intercept
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// 닫힌 형태의 최소제곱 직선. 평균을 빼서 계산한다.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LinearFit, RegressionError> {
    if xs.len() != ys.len() {
        return Err(RegressionError::LengthMismatch(xs.len(), ys.len()));
    }
    let n = xs.len();
    if n < 2 {
        return Err(RegressionError::TooFewPoints(n));
    }
    let nf = n as f64;
    let mean_x = xs.iter().sum::<f64>() / nf;
    let mean_y = ys.iter().sum::<f64>() / nf;
    let (sxx, sxy) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
            let dx = x - mean_x;
            (sxx + dx * dx, sxy + dx * (y - mean_y))
        });
    if sxx == 0.0 {
        return Err(RegressionError::DegenerateX);
    }
    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// 회귀 그래프 하나의 열/축 정의.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegressionSpec {
    pub x_column: &'static str,
    pub y_column: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub title: &'static str,
}

pub const Q_VALUE_REGRESSION: RegressionSpec = RegressionSpec {
    x_column: "Log(D/D_max)",
    y_column: "Log(%_CPFT)",
    x_label: "Log(D/D_max)",
    y_label: "Log(% CPFT)",
    title: "q-Value Regression",
};

pub const DOUBLE_MODIFIED_REGRESSION: RegressionSpec = RegressionSpec {
    x_column: "Log(D - D_min) - Log(D_max - D_min)",
    y_column: "Log(%_CPFT)",
    x_label: "Log(D - D_min) - Log(D_max - D_min)",
    y_label: "Log(% CPFT)",
    title: "Double Modified q-Value Regression",
};

/// 산점도 + 회귀 직선.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionPlot {
    pub spec: RegressionSpec,
    pub points: Vec<[f64; 2]>,
    pub fit: LinearFit,
    /// 숫자가 아니어서 빠진 행 수
    pub skipped: usize,
}

impl RegressionPlot {
    /// 표의 두 열로 회귀를 수행한다. 두 값이 모두 유한한 행만 쓴다.
    pub fn from_table(table: &DataTable, spec: RegressionSpec) -> Result<Self, RegressionError> {
        let (Some(xs), Some(ys)) = (
            table.numeric_column(spec.x_column),
            table.numeric_column(spec.y_column),
        ) else {
            tracing::warn!(x = spec.x_column, y = spec.y_column, "regression columns missing");
            return Err(RegressionError::MissingColumns {
                x: spec.x_column.to_string(),
                y: spec.y_column.to_string(),
            });
        };
        let total = xs.len();
        let points: Vec<[f64; 2]> = xs
            .into_iter()
            .zip(ys)
            .filter_map(|pair| match pair {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some([x, y]),
                _ => None,
            })
            .collect();
        let (px, py): (Vec<f64>, Vec<f64>) = points.iter().map(|p| (p[0], p[1])).unzip();
        let fit = fit_line(&px, &py)?;
        Ok(Self {
            spec,
            skipped: total - points.len(),
            points,
            fit,
        })
    }

    pub fn q_value(&self) -> f64 {
        self.fit.slope
    }

    /// 범례 문구.
    pub fn legend(&self) -> String {
        format!("Regression Line (q = {:.4})", self.fit.slope)
    }

    /// 각 x 위치에서의 회귀 직선 점 (x 오름차순).
    pub fn fitted_points(&self) -> Vec<[f64; 2]> {
        let mut xs: Vec<f64> = self.points.iter().map(|p| p[0]).collect();
        xs.sort_by(f64::total_cmp);
        xs.into_iter().map(|x| [x, self.fit.at(x)]).collect()
    }
}
