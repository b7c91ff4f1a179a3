//! 계산 종류 선택과 요청 조립.

use std::fmt;

use crate::backend::Endpoint;
use crate::numfmt;
use crate::porosity::Porosity;

/// 상위 선택지: 계산 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalculationType {
    #[default]
    Unselected,
    GbdValues,
    QValues,
}

impl CalculationType {
    pub const ALL: [CalculationType; 3] = [
        CalculationType::Unselected,
        CalculationType::GbdValues,
        CalculationType::QValues,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CalculationType::Unselected => "Select",
            CalculationType::GbdValues => "GBD Values",
            CalculationType::QValues => "q-Values",
        }
    }
}

/// q-value 계산식 (하위 선택지).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QValueMethod {
    #[default]
    Unselected,
    Andreasen,
    ModifiedAndreasen,
    DoubleModifiedAndreasen,
}

impl QValueMethod {
    pub const ALL: [QValueMethod; 4] = [
        QValueMethod::Unselected,
        QValueMethod::Andreasen,
        QValueMethod::ModifiedAndreasen,
        QValueMethod::DoubleModifiedAndreasen,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QValueMethod::Unselected => "Select",
            QValueMethod::Andreasen => "q-value using Andreasen Eq.",
            QValueMethod::ModifiedAndreasen => "q-value using Modified Andreasen Eq.",
            QValueMethod::DoubleModifiedAndreasen => "q-value using Double Modified Andreasen Eq.",
        }
    }
}

/// 화면의 두 선택지를 합친 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Gbd,
    QValues(QValueMethod),
}

impl Selection {
    pub fn from_parts(ty: CalculationType, method: QValueMethod) -> Self {
        match ty {
            CalculationType::Unselected => Selection::Unselected,
            CalculationType::GbdValues => Selection::Gbd,
            CalculationType::QValues => Selection::QValues(method),
        }
    }

    pub fn calculation_type(self) -> CalculationType {
        match self {
            Selection::Unselected => CalculationType::Unselected,
            Selection::Gbd => CalculationType::GbdValues,
            Selection::QValues(_) => CalculationType::QValues,
        }
    }

    pub fn method(self) -> QValueMethod {
        match self {
            Selection::QValues(m) => m,
            _ => QValueMethod::Unselected,
        }
    }

    /// 계산을 보낼 수 있을 만큼 구체적인 선택이면 Some.
    pub fn kind(self) -> Option<CalculationKind> {
        match self {
            Selection::Unselected | Selection::QValues(QValueMethod::Unselected) => None,
            Selection::Gbd => Some(CalculationKind::Gbd),
            Selection::QValues(QValueMethod::Andreasen) => Some(CalculationKind::Andreasen),
            Selection::QValues(QValueMethod::ModifiedAndreasen) => {
                Some(CalculationKind::ModifiedAndreasen)
            }
            Selection::QValues(QValueMethod::DoubleModifiedAndreasen) => {
                Some(CalculationKind::DoubleModifiedAndreasen)
            }
        }
    }
}

/// 선택 변경 시 세션에 가할 변화.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Keep,
    ResetProportions,
}

/// 선택 전이표. (현재 선택, 새 선택) → 혼합비 초기화 여부.
///
/// | 현재 \ 새 선택        | 같음 | Unselected | Gbd   | QValues(다른 식) |
/// |----------------------|------|------------|-------|------------------|
/// | Unselected           | Keep | -          | Reset | Reset            |
/// | Gbd                  | Keep | Keep       | -     | Reset            |
/// | QValues(m)           | Keep | Keep       | Reset | Reset            |
pub fn transition(from: Selection, to: Selection) -> Transition {
    match (from, to) {
        (a, b) if a == b => Transition::Keep,
        (_, Selection::Unselected) => Transition::Keep,
        (_, Selection::Gbd) => Transition::ResetProportions,
        (_, Selection::QValues(_)) => Transition::ResetProportions,
    }
}

/// 완전히 지정된 계산 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculationKind {
    Gbd,
    Andreasen,
    ModifiedAndreasen,
    DoubleModifiedAndreasen,
}

impl CalculationKind {
    pub fn endpoint(self) -> Endpoint {
        match self {
            CalculationKind::Gbd => Endpoint::CalculateGbd,
            CalculationKind::Andreasen => Endpoint::CalculateQValue,
            CalculationKind::ModifiedAndreasen => Endpoint::CalculateQValueModified,
            CalculationKind::DoubleModifiedAndreasen => Endpoint::CalculateQValueDoubleModified,
        }
    }

    pub fn requires_porosity(self) -> bool {
        matches!(self, CalculationKind::Gbd | CalculationKind::ModifiedAndreasen)
    }

    /// 버튼 라벨에 들어가는 이름.
    pub fn display_name(self) -> &'static str {
        match self {
            CalculationKind::Gbd => CalculationType::GbdValues.label(),
            CalculationKind::Andreasen => QValueMethod::Andreasen.label(),
            CalculationKind::ModifiedAndreasen => QValueMethod::ModifiedAndreasen.label(),
            CalculationKind::DoubleModifiedAndreasen => {
                QValueMethod::DoubleModifiedAndreasen.label()
            }
        }
    }

    pub fn calculation_type(self) -> CalculationType {
        match self {
            CalculationKind::Gbd => CalculationType::GbdValues,
            _ => CalculationType::QValues,
        }
    }

    /// 공극률 입력란 안내 문구.
    pub fn porosity_prompt(self) -> &'static str {
        match self {
            CalculationKind::ModifiedAndreasen => {
                "Enter Porosity for Modified Andreasen Eq. (value should be between 0-1):"
            }
            _ => "Enter Porosity (value should be between 0-1):",
        }
    }

    /// `Calculate <이름>` (+ ` with Porosity: <값>`).
    pub fn button_label(self, porosity: Option<Porosity>) -> String {
        match porosity {
            Some(p) if self.requires_porosity() => {
                format!("Calculate {} with Porosity: {p}", self.display_name())
            }
            _ => format!("Calculate {}", self.display_name()),
        }
    }
}

impl fmt::Display for CalculationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 계산 엔드포인트로 보낼 요청.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationRequest {
    pub kind: CalculationKind,
    /// `DD-MM-YYYY`
    pub selected_date: String,
    pub packing_density: Option<f64>,
    pub updated_proportions: String,
}

impl CalculationRequest {
    pub fn endpoint(&self) -> Endpoint {
        self.kind.endpoint()
    }

    /// 쿼리 파라미터. 충전 밀도는 필요한 계산에만 붙는다.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("selected_date", self.selected_date.clone())];
        if self.kind.requires_porosity() {
            if let Some(density) = self.packing_density {
                query.push(("packing_density", numfmt::plain_float(density)));
            }
        }
        query.push(("updated_proportions", self.updated_proportions.clone()));
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_porosity_requirements() {
        let table = [
            (CalculationKind::Gbd, Endpoint::CalculateGbd, true),
            (CalculationKind::Andreasen, Endpoint::CalculateQValue, false),
            (
                CalculationKind::ModifiedAndreasen,
                Endpoint::CalculateQValueModified,
                true,
            ),
            (
                CalculationKind::DoubleModifiedAndreasen,
                Endpoint::CalculateQValueDoubleModified,
                false,
            ),
        ];
        for (kind, endpoint, porosity) in table {
            assert_eq!(kind.endpoint(), endpoint);
            assert_eq!(kind.requires_porosity(), porosity, "{kind}");
        }
    }

    #[test]
    fn button_labels() {
        let p = Porosity::parse("0.3").unwrap();
        assert_eq!(
            CalculationKind::Andreasen.button_label(None),
            "Calculate q-value using Andreasen Eq."
        );
        assert_eq!(
            CalculationKind::Gbd.button_label(Some(p)),
            "Calculate GBD Values with Porosity: 0.3"
        );
        assert_eq!(
            CalculationKind::ModifiedAndreasen.button_label(Some(p)),
            "Calculate q-value using Modified Andreasen Eq. with Porosity: 0.3"
        );
    }

    #[test]
    fn transitions_reset_on_every_real_change() {
        use Selection::*;
        let andreasen = QValues(QValueMethod::Andreasen);
        let modified = QValues(QValueMethod::ModifiedAndreasen);
        assert_eq!(transition(andreasen, andreasen), Transition::Keep);
        assert_eq!(transition(andreasen, modified), Transition::ResetProportions);
        assert_eq!(transition(Gbd, andreasen), Transition::ResetProportions);
        assert_eq!(transition(andreasen, Gbd), Transition::ResetProportions);
        assert_eq!(transition(Gbd, Unselected), Transition::Keep);
        assert_eq!(
            transition(Unselected, QValues(QValueMethod::Unselected)),
            Transition::ResetProportions
        );
    }

    #[test]
    fn query_omits_density_for_plain_q_value() {
        let request = CalculationRequest {
            kind: CalculationKind::Andreasen,
            selected_date: "15-01-2024".into(),
            packing_density: Some(0.7),
            updated_proportions: "0.35,0.2,0.15,0.1,0.2".into(),
        };
        assert_eq!(
            request.query(),
            vec![
                ("selected_date", "15-01-2024".to_string()),
                ("updated_proportions", "0.35,0.2,0.15,0.1,0.2".to_string()),
            ]
        );
        let gbd = CalculationRequest {
            kind: CalculationKind::Gbd,
            ..request
        };
        assert_eq!(gbd.query()[1], ("packing_density", "0.7".to_string()));
    }
}
