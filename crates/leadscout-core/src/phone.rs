use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Brazilian area codes (DDD) in service.
const BR_AREA_CODES: &[u8] = &[
    11, 12, 13, 14, 15, 16, 17, 18, 19, 21, 22, 24, 27, 28, 31, 32, 33, 34, 35, 37, 38, 41, 42, 43,
    44, 45, 46, 47, 48, 49, 51, 53, 54, 55, 61, 62, 63, 64, 65, 66, 67, 68, 69, 71, 73, 74, 75, 77,
    79, 81, 82, 83, 84, 85, 86, 87, 88, 89, 91, 92, 93, 94, 95, 96, 97, 98, 99,
];

/// Numbering-plan region used to interpret numbers that carry no explicit
/// international prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Region {
    #[default]
    Brazil,
}

impl Region {
    /// Parse an ISO 3166-1 alpha-2 region code. Only `BR` is supported.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "BR" => Some(Region::Brazil),
            _ => None,
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Region::Brazil => "BR",
        }
    }

    /// International dialing code, without the `+`.
    #[must_use]
    pub fn dialing_code(self) -> &'static str {
        match self {
            Region::Brazil => "55",
        }
    }

    /// Reduce a national digit string (possibly carrying a trunk prefix) to
    /// its validated national significant number.
    fn national_number(self, digits: &str) -> Option<String> {
        match self {
            Region::Brazil => brazil_national_number(digits),
        }
    }
}

/// A phone number in canonical `+<country><national>` form.
///
/// Equality, hashing, and ordering follow the canonical string, so two
/// spellings of the same subscriber collapse to one value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalNumber {
    dialing_code: String,
    digits: String,
}

impl CanonicalNumber {
    #[must_use]
    pub fn dialing_code(&self) -> &str {
        &self.dialing_code
    }

    /// National significant number (area code plus subscriber number).
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// The canonical form without the leading `+`, as messaging providers
    /// identify accounts.
    #[must_use]
    pub fn normalized_id(&self) -> String {
        format!("{}{}", self.dialing_code, self.digits)
    }
}

impl fmt::Display for CanonicalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}{}", self.dialing_code, self.digits)
    }
}

impl Serialize for CanonicalNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for CanonicalNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        canonicalize(s, Region::default()).ok_or_else(|| format!("not a valid phone number: {s}"))
    }
}

/// Normalize a raw phone-like fragment into a [`CanonicalNumber`].
///
/// A fragment with an explicit international prefix (`+` or `00`) is parsed
/// as such and must belong to `region`. Anything else is read as a national
/// number of `region`, after stripping trunk and carrier prefixes. Returns
/// `None` for any unparsable or structurally invalid input.
#[must_use]
pub fn canonicalize(raw: &str, region: Region) -> Option<CanonicalNumber> {
    let trimmed = raw.trim();
    let digits = strip_noise(trimmed)?;

    if let Some(international) = international_digits(trimmed, &digits) {
        let national = international.strip_prefix(region.dialing_code())?;
        return build(region, national);
    }

    build(region, &digits).or_else(|| {
        // Country code written without the `+`.
        digits
            .strip_prefix(region.dialing_code())
            .and_then(|national| build(region, national))
    })
}

/// Collapse canonical numbers to a unique sequence, keeping first-seen order.
pub fn dedupe<I>(numbers: I) -> Vec<CanonicalNumber>
where
    I: IntoIterator<Item = CanonicalNumber>,
{
    let mut seen = HashSet::new();
    numbers
        .into_iter()
        .filter(|number| seen.insert(number.clone()))
        .collect()
}

fn build(region: Region, national: &str) -> Option<CanonicalNumber> {
    region.national_number(national).map(|digits| CanonicalNumber {
        dialing_code: region.dialing_code().to_string(),
        digits,
    })
}

/// Keep only the digits of `value`, stopping at an extension marker.
fn strip_noise(value: &str) -> Option<String> {
    let mut out = String::new();
    for ch in value.chars() {
        if ch.is_ascii_digit() {
            out.push(ch);
            continue;
        }
        if matches!(ch, 'x' | 'X' | '#' | ';' | ',') && !out.is_empty() {
            break;
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn international_digits<'a>(trimmed: &str, digits: &'a str) -> Option<&'a str> {
    if trimmed.starts_with('+') {
        return Some(digits);
    }
    digits.strip_prefix("00")
}

fn brazil_national_number(digits: &str) -> Option<String> {
    let national = match digits.strip_prefix('0') {
        Some(rest) => match rest.len() {
            // Trunk prefix `0`.
            10 | 11 => rest,
            // Trunk prefix plus a two-digit carrier selection code.
            12 | 13 => &rest[2..],
            _ => return None,
        },
        None => digits,
    };
    if !matches!(national.len(), 10 | 11) {
        return None;
    }

    let area_code: u8 = national.get(..2)?.parse().ok()?;
    if !BR_AREA_CODES.contains(&area_code) {
        return None;
    }

    let subscriber = national.as_bytes().get(2).copied()?;
    let valid = match national.len() {
        11 => subscriber == b'9',
        10 => (b'2'..=b'5').contains(&subscriber),
        _ => false,
    };
    valid.then(|| national.to_string())
}

#[cfg(test)]
#[path = "phone_test.rs"]
mod tests;
