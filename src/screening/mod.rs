//! VoIP screening: strategies deciding whether a number may receive SMS.
//!
//! Classification gates dispatch (a rejected number never reaches the
//! transport), so no strategy is allowed to fail the call: the lookup
//! strategy fails open and the heuristic strategy cannot fail at all.

mod heuristic;
mod lookup;

pub use heuristic::HeuristicClassifier;
pub use lookup::LookupClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Which signal produced a verdict. Diagnostics only; control flow keys
/// off [`VoipVerdict::is_voip`] alone.
pub enum VoipRule {
    /// No rule matched.
    None,
    /// Lookup: carrier name matched a known VoIP operator.
    CarrierName,
    /// Lookup: carrier type reported as `voip`.
    CarrierType,
    /// Lookup: line type reported as a liveness risk.
    LineType,
    /// Heuristic: national number starts with a reserved range.
    ReservedPrefix,
    /// Heuristic: number is not tied to a geographic area.
    NonGeographic,
    /// Heuristic: metadata tables classified the number type directly.
    TypeOracle,
    /// Heuristic: long run of identical digits.
    RepeatedDigits,
    /// Heuristic: long strictly ascending digit run.
    AscendingDigits,
    /// Heuristic: number ends in four identical digits.
    QuadrupleTail,
    /// Heuristic: too few distinct digits for the number's length.
    LowDigitDiversity,
}

impl VoipRule {
    /// Short label for logs and report details.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CarrierName => "carrier name",
            Self::CarrierType => "carrier type",
            Self::LineType => "line type",
            Self::ReservedPrefix => "reserved prefix",
            Self::NonGeographic => "non-geographic",
            Self::TypeOracle => "number type",
            Self::RepeatedDigits => "repeated digits",
            Self::AscendingDigits => "ascending digits",
            Self::QuadrupleTail => "quadruple tail",
            Self::LowDigitDiversity => "low digit diversity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of classifying one number.
pub struct VoipVerdict {
    pub is_voip: bool,
    pub rule: VoipRule,
}

impl VoipVerdict {
    pub(crate) fn voip(rule: VoipRule) -> Self {
        Self {
            is_voip: true,
            rule,
        }
    }

    pub(crate) fn clear() -> Self {
        Self {
            is_voip: false,
            rule: VoipRule::None,
        }
    }
}

/// A classifier instance, one variant per strategy.
pub enum VoipClassifier {
    Lookup(LookupClassifier),
    Heuristic(HeuristicClassifier),
}

impl VoipClassifier {
    /// Decide whether a number should be rejected as VoIP.
    pub async fn classify(&self, phone: &str) -> VoipVerdict {
        match self {
            Self::Lookup(classifier) => classifier.classify(phone).await,
            Self::Heuristic(classifier) => classifier.classify(phone),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PhoneNormalizer;

    #[tokio::test]
    async fn heuristic_variant_dispatches_through_the_common_interface() {
        let classifier =
            VoipClassifier::Heuristic(HeuristicClassifier::new(PhoneNormalizer::Basic));
        let verdict = classifier.classify("+18005551234").await;
        assert!(verdict.is_voip);
        assert_eq!(verdict.rule, VoipRule::ReservedPrefix);

        let verdict = classifier.classify("+12065551234").await;
        assert!(!verdict.is_voip);
        assert_eq!(verdict.rule, VoipRule::None);
    }

    #[test]
    fn rule_labels_are_stable() {
        assert_eq!(VoipRule::None.as_str(), "none");
        assert_eq!(VoipRule::ReservedPrefix.as_str(), "reserved prefix");
        assert_eq!(VoipRule::CarrierType.as_str(), "carrier type");
    }
}
