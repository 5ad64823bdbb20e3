//! Phone number normalization, validity, and inspection.
//!
//! Two interchangeable strategies are offered: [`PhoneNormalizer::Basic`]
//! never rejects input and applies NANP-flavored fixups, while
//! [`PhoneNormalizer::Rich`] parses through the `phonenumber` metadata
//! tables and falls back to the basic behavior whenever parsing fails.

use once_cell::sync::Lazy;
use regex::Regex;

static E164_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("E.164 regex is well-formed"));

/// Minimum length of a canonical phone string, `+` included.
pub const MIN_PHONE_LEN: usize = 7;
/// Maximum length of a canonical phone string, `+` included.
pub const MAX_PHONE_LEN: usize = 16;

/// NANP toll-free area codes (active and reserved 8xx blocks).
pub(crate) const TOLL_FREE_PREFIXES: &[&str] = &[
    "800", "822", "833", "844", "855", "866", "877", "880", "881", "882", "888",
];

/// NANP premium-rate area codes.
pub(crate) const PREMIUM_RATE_PREFIXES: &[&str] = &["900", "976"];

/// NANP personal-communication-service area codes (5xx non-geographic block).
pub(crate) const PERSONAL_SERVICE_PREFIXES: &[&str] = &[
    "500", "521", "522", "523", "524", "525", "533", "544", "566", "577", "588",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Classification of a number as reported by the metadata tables.
pub enum NumberType {
    Voip,
    PremiumRate,
    TollFree,
    SharedCost,
    Mobile,
    FixedLine,
    /// The tables could not settle on a single type.
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What is known about a phone number after inspection.
///
/// The optional fields are populated only when the rich strategy could
/// parse the input; the basic strategy fills in what plain digit
/// wrangling can recover.
pub struct PhoneRecord {
    /// Canonical dialable form, leading `+`.
    pub e164: String,
    /// Country calling code, when attributable.
    pub country_code: Option<u16>,
    /// National significant number (digits only).
    pub national: Option<String>,
    /// Whether the number is not tied to a geographic area.
    pub non_geographic: Option<bool>,
    /// Explicit type classification, when the tables provide one.
    pub number_type: Option<NumberType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
/// Strategy for turning arbitrary input into a canonical dialable number.
pub enum PhoneNormalizer {
    /// Digit-stripping with NANP fixups; lossy, never rejects input.
    #[default]
    Basic,
    /// Metadata-backed parsing; falls back to [`Self::Basic`] output when
    /// the input cannot be parsed or parses to an invalid number.
    Rich,
}

impl PhoneNormalizer {
    /// Turn arbitrary input into a canonical dialable number.
    ///
    /// Never fails; validity is a separate concern checked by
    /// [`Self::is_valid`].
    pub fn normalize(self, input: &str) -> String {
        match self {
            Self::Basic => basic_normalize(input),
            Self::Rich => rich_normalize(input),
        }
    }

    /// Check whether a (normalized) phone string is dialable.
    ///
    /// Returns `false` rather than erroring on malformed input.
    pub fn is_valid(self, phone: &str) -> bool {
        match self {
            Self::Basic => basic_is_valid(phone),
            Self::Rich => match phonenumber::parse(None, phone) {
                Ok(parsed) => phonenumber::is_valid(&parsed),
                Err(_) => basic_is_valid(phone),
            },
        }
    }

    /// Inspect a phone number, recovering as much structure as the
    /// strategy allows.
    pub fn inspect(self, phone: &str) -> PhoneRecord {
        match self {
            Self::Basic => basic_inspect(phone),
            Self::Rich => rich_inspect(phone),
        }
    }
}

fn digits_of(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

fn basic_normalize(input: &str) -> String {
    let digits = digits_of(input);
    if digits.len() == 10 {
        return format!("+1{digits}");
    }
    if digits.len() == 11 && digits.starts_with('1') {
        return format!("+{digits}");
    }
    if input.starts_with('+') {
        return input.to_owned();
    }
    format!("+{digits}")
}

fn basic_is_valid(phone: &str) -> bool {
    E164_REGEX.is_match(phone) && (MIN_PHONE_LEN..=MAX_PHONE_LEN).contains(&phone.len())
}

fn basic_inspect(input: &str) -> PhoneRecord {
    let e164 = basic_normalize(input);
    let digits = digits_of(&e164);
    let (country_code, national) = if digits.len() == 11 && digits.starts_with('1') {
        (Some(1), digits[1..].to_owned())
    } else {
        (None, digits)
    };
    PhoneRecord {
        e164,
        country_code,
        national: Some(national),
        non_geographic: None,
        number_type: None,
    }
}

fn rich_normalize(input: &str) -> String {
    match phonenumber::parse(None, input) {
        Ok(parsed) if phonenumber::is_valid(&parsed) => phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string(),
        _ => basic_normalize(input),
    }
}

fn rich_inspect(input: &str) -> PhoneRecord {
    let Ok(parsed) = phonenumber::parse(None, input) else {
        return basic_inspect(input);
    };
    let e164 = phonenumber::format(&parsed)
        .mode(phonenumber::Mode::E164)
        .to_string();
    let country_code = parsed.country().code();
    let national = parsed.national().value().to_string();
    PhoneRecord {
        e164,
        country_code: Some(country_code),
        // A number whose country cannot be attributed is a non-geographic
        // entity (international toll-free, premium ranges).
        non_geographic: Some(parsed.country().id().is_none()),
        number_type: reserved_number_type(country_code, &national),
        national: Some(national),
    }
}

/// Explicit number types recoverable from the NANP reserved ranges.
/// Everything else is left ambiguous.
fn reserved_number_type(country_code: u16, national: &str) -> Option<NumberType> {
    if country_code != 1 || national.len() < 3 {
        return None;
    }
    let prefix = &national[..3];
    if TOLL_FREE_PREFIXES.contains(&prefix) {
        Some(NumberType::TollFree)
    } else if PREMIUM_RATE_PREFIXES.contains(&prefix) {
        Some(NumberType::PremiumRate)
    } else {
        None
    }
}

/// Mask a phone number for log output (e.g. `+12****4567`).
pub fn mask_phone(phone: &str) -> String {
    let kept: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if kept.len() >= 7 {
        format!("{}****{}", &kept[0..3], &kept[kept.len() - 4..])
    } else {
        "****".to_owned()
    }
}
