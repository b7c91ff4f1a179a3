//! 화면 표시와 쿼리 문자열에 쓰이는 숫자 포맷 규칙.

/// 백엔드가 기대하는 형태로 실수를 문자열로 만든다.
///
/// 정수값은 `1.0`, `0.0`처럼 소수점 한 자리를 붙이고, 나머지는 왕복 가능한
/// 최단 표현(`0.35`, `0.30000000000000004`)을 그대로 쓴다.
pub fn plain_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// 소수점 4자리 고정 표기.
pub fn fixed4(value: f64) -> String {
    format!("{value:.4}")
}

/// 백분율 라벨용 표기. 정수면 소수부 없이, 아니면 최단 표현으로 쓴다.
pub fn percent_label(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// 쉼표로 이어 붙인 실수 목록.
pub fn join_floats(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| plain_float(*v))
        .collect::<Vec<_>>()
        .join(",")
}
