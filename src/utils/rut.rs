use std::fmt;
use std::str::FromStr;

/// Computes the RUT check character ("dígito verificador") for a digit string,
/// most significant digit first.
///
/// Returns `None` when `digits` is empty or contains anything but `0-9`.
pub fn check_character(digits: &str) -> Option<char> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut sum: u32 = 0;
    let mut multiplier: u32 = 2;

    for b in digits.bytes().rev() {
        sum += u32::from(b - b'0') * multiplier;
        multiplier = if multiplier < 7 { multiplier + 1 } else { 2 };
    }

    match 11 - (sum % 11) {
        11 => Some('0'),
        10 => Some('k'),
        n => char::from_digit(n, 10),
    }
}

/// true iff `supplied` is a single character matching the computed check
/// character, ignoring case.
pub fn is_valid(digits: &str, supplied: &str) -> bool {
    let mut chars = supplied.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return false;
    };

    check_character(digits).is_some_and(|expected| expected.eq_ignore_ascii_case(&c))
}

/// A validated RUT: numeric body plus lowercase check character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rut {
    body: String,
    dv: char,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RutError {
    #[error("RUT must look like 12345678-5")]
    Malformed,
    #[error("RUT check character does not match")]
    CheckMismatch,
}

/// Longest body a RUT carries; matches the `workers.rut` column.
pub const MAX_BODY_DIGITS: usize = 8;

impl Rut {
    /// Validates and canonicalises: leading zeros are dropped (they do not
    /// change the check character) and the body may not exceed
    /// [`MAX_BODY_DIGITS`].
    pub fn new(body: &str, dv: &str) -> Result<Self, RutError> {
        let body = body.trim();
        let dv = dv.trim();
        if check_character(body).is_none() || dv.chars().count() != 1 {
            return Err(RutError::Malformed);
        }

        let body = match body.trim_start_matches('0') {
            "" => "0",
            significant => significant,
        };
        if body.len() > MAX_BODY_DIGITS {
            return Err(RutError::Malformed);
        }
        if !is_valid(body, dv) {
            return Err(RutError::CheckMismatch);
        }

        let dv = dv.chars().next().ok_or(RutError::Malformed)?;
        Ok(Self {
            body: body.to_string(),
            dv: dv.to_ascii_lowercase(),
        })
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn dv(&self) -> char {
        self.dv
    }
}

impl FromStr for Rut {
    type Err = RutError;

    /// Accepts `12345678-5`, `12.345.678-K` and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (body, dv) = s.trim().rsplit_once('-').ok_or(RutError::Malformed)?;
        let body: String = body.chars().filter(|c| *c != '.').collect();
        Rut::new(&body, dv)
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.body, self.dv)
    }
}
