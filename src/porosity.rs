use std::fmt;

use thiserror::Error;

use crate::numfmt;

/// 공극률 입력 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PorosityError {
    /// 아직 입력하지 않음. 화면에는 오류로 표시하지 않는다.
    #[error("Porosity is required for this calculation.")]
    Empty,
    #[error("Please enter a numeric value for Porosity.")]
    NotNumeric(String),
    #[error("Please enter a valid Porosity value between 0 and 1.")]
    OutOfRange(f64),
}

impl PorosityError {
    /// 사용자에게 오류 메시지를 띄워야 하는 경우만 true.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, PorosityError::Empty)
    }
}

/// 0~1 범위의 공극률. 충전 밀도 = 1 - 공극률.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Porosity(f64);

impl Porosity {
    /// 텍스트 입력을 공극률로 해석한다. 앞뒤 공백은 무시한다.
    pub fn parse(input: &str) -> Result<Self, PorosityError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PorosityError::Empty);
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| PorosityError::NotNumeric(trimmed.to_string()))?;
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(PorosityError::OutOfRange(value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn packing_density(&self) -> f64 {
        1.0 - self.0
    }
}

impl fmt::Display for Porosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&numfmt::plain_float(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_closed_unit_interval() {
        for input in ["0", "1", "0.5", " 0.25 "] {
            assert!(Porosity::parse(input).is_ok(), "{input}");
        }
        assert_eq!(Porosity::parse("0.3").unwrap().packing_density(), 0.7);
    }

    #[test]
    fn rejects_out_of_range_and_garbage() {
        assert_eq!(Porosity::parse(""), Err(PorosityError::Empty));
        assert_eq!(Porosity::parse("   "), Err(PorosityError::Empty));
        assert!(matches!(
            Porosity::parse("-0.1"),
            Err(PorosityError::OutOfRange(_))
        ));
        assert!(matches!(
            Porosity::parse("1.1"),
            Err(PorosityError::OutOfRange(_))
        ));
        assert!(matches!(
            Porosity::parse("abc"),
            Err(PorosityError::NotNumeric(_))
        ));
        assert!(matches!(
            Porosity::parse("NaN"),
            Err(PorosityError::OutOfRange(_))
        ));
    }

    #[test]
    fn display_matches_button_label_format() {
        assert_eq!(Porosity::parse("0").unwrap().to_string(), "0.0");
        assert_eq!(Porosity::parse("0.35").unwrap().to_string(), "0.35");
    }
}
