//! Local VoIP heuristic: a short-circuiting rule cascade over the national
//! number. No network I/O; malformed input is never rejected, it simply
//! fails to match any rule.
//!
//! The digit-pattern rules are known to misclassify some legitimate mobile
//! numbers. The thresholds are part of the screening contract and are
//! pinned by tests; loosening or tightening them changes which real
//! numbers get blocked.

use crate::domain::phone::{
    NumberType, PhoneNormalizer, PhoneRecord, PERSONAL_SERVICE_PREFIXES, PREMIUM_RATE_PREFIXES,
    TOLL_FREE_PREFIXES,
};

use super::{VoipRule, VoipVerdict};

/// Identical digits in a row needed to trip the repeated-run rule.
/// Exactly-four tails are left to the quadruple-tail rule.
const IDENTICAL_RUN: usize = 5;

/// Strictly ascending digits in a row needed to trip the sequence rule.
const ASCENDING_RUN: usize = 5;

/// Minimum length before digit diversity is considered meaningful.
const DIVERSITY_MIN_LEN: usize = 7;

/// Distinct digit values at or below which a long number is suspect.
const DIVERSITY_MAX_DISTINCT: usize = 3;

#[derive(Debug, Clone, Copy)]
/// Rule-cascade classifier over the national number.
pub struct HeuristicClassifier {
    normalizer: PhoneNormalizer,
}

impl HeuristicClassifier {
    /// Classify using the given normalizer to recover number structure.
    pub fn new(normalizer: PhoneNormalizer) -> Self {
        Self { normalizer }
    }

    /// Run the cascade against a phone number string.
    pub fn classify(&self, phone: &str) -> VoipVerdict {
        Self::classify_record(&self.normalizer.inspect(phone))
    }

    /// Run the cascade against an already-inspected record.
    ///
    /// Rules are evaluated in a fixed order and the first positive verdict
    /// wins; an explicit `Mobile`/`FixedLine` type short-circuits the
    /// pattern rules entirely.
    pub fn classify_record(record: &PhoneRecord) -> VoipVerdict {
        let national = record.national.as_deref().unwrap_or("");

        if national.len() >= 3 && is_reserved_prefix(&national[..3]) {
            return VoipVerdict::voip(VoipRule::ReservedPrefix);
        }

        if record.non_geographic == Some(true) {
            return VoipVerdict::voip(VoipRule::NonGeographic);
        }

        match record.number_type {
            Some(
                NumberType::Voip
                | NumberType::PremiumRate
                | NumberType::TollFree
                | NumberType::SharedCost,
            ) => return VoipVerdict::voip(VoipRule::TypeOracle),
            Some(NumberType::Mobile | NumberType::FixedLine) => return VoipVerdict::clear(),
            Some(_) | None => {}
        }

        if has_identical_run(national, IDENTICAL_RUN) {
            return VoipVerdict::voip(VoipRule::RepeatedDigits);
        }

        if has_ascending_run(national, ASCENDING_RUN) {
            return VoipVerdict::voip(VoipRule::AscendingDigits);
        }

        if has_quadruple_tail(national) {
            return VoipVerdict::voip(VoipRule::QuadrupleTail);
        }

        if national.len() >= DIVERSITY_MIN_LEN && distinct_digits(national) <= DIVERSITY_MAX_DISTINCT
        {
            return VoipVerdict::voip(VoipRule::LowDigitDiversity);
        }

        VoipVerdict::clear()
    }
}

fn is_reserved_prefix(prefix: &str) -> bool {
    TOLL_FREE_PREFIXES.contains(&prefix)
        || PREMIUM_RATE_PREFIXES.contains(&prefix)
        || PERSONAL_SERVICE_PREFIXES.contains(&prefix)
}

fn has_identical_run(digits: &str, run: usize) -> bool {
    let bytes = digits.as_bytes();
    let mut count = 1;
    for window in bytes.windows(2) {
        if window[0] == window[1] {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            count = 1;
        }
    }
    false
}

fn has_ascending_run(digits: &str, run: usize) -> bool {
    let bytes = digits.as_bytes();
    let mut count = 1;
    for window in bytes.windows(2) {
        if window[1] == window[0] + 1 {
            count += 1;
            if count >= run {
                return true;
            }
        } else {
            count = 1;
        }
    }
    false
}

fn has_quadruple_tail(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    if bytes.len() < 4 {
        return false;
    }
    let tail = &bytes[bytes.len() - 4..];
    tail.iter().all(|b| *b == tail[0])
}

fn distinct_digits(digits: &str) -> usize {
    let mut seen = [false; 10];
    for byte in digits.bytes() {
        if byte.is_ascii_digit() {
            seen[usize::from(byte - b'0')] = true;
        }
    }
    seen.iter().filter(|s| **s).count()
}
