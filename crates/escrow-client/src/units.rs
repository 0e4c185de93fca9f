//! address and token unit helpers
//!
//! pure functions, no network. amounts are kept as decimal strings until the
//! token's decimals are known, then scaled digit by digit into a u256 so the
//! integer amount is exact.

use alloy::primitives::{Address, U256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// largest decimals value whose scale factor still fits in a u256
pub const MAX_DECIMALS: u8 = 77;

/// fractional digits shown for balances and allowances
pub const DISPLAY_PLACES: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("amount is not a decimal number: {0}")]
    NotANumber(String),

    #[error("amount is negative")]
    Negative,

    #[error("amount has {got} fractional digits, token supports {max}")]
    TooManyDecimals { got: usize, max: u8 },

    #[error("amount does not fit in 256 bits")]
    Overflow,

    #[error("unsupported token decimals: {0}")]
    UnsupportedDecimals(u8),
}

/// parse a 20-byte hex address, with or without `0x`
///
/// all-lowercase and all-uppercase forms are accepted as-is. mixed case must
/// be a valid eip-55 checksum.
pub fn parse_address(input: &str) -> Option<Address> {
    let hex = input.strip_prefix("0x").unwrap_or(input);
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());

    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{hex}"), None).ok()
    } else {
        Address::from_str(hex).ok()
    }
}

pub fn is_valid_address(input: &str) -> bool {
    parse_address(input).is_some()
}

/// `0x1234...abcd` form used in the transfer list
pub fn shorten_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// a decimal-notation amount as typed by the operator
///
/// normalized on parse: no leading zeros in the whole part, no trailing zeros
/// in the fraction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecimalAmount {
    negative: bool,
    whole: String,
    fraction: String,
}

impl DecimalAmount {
    pub fn is_zero(&self) -> bool {
        self.whole == "0" && self.fraction.is_empty()
    }

    pub fn is_positive(&self) -> bool {
        !self.negative && !self.is_zero()
    }

    pub fn fraction_digits(&self) -> usize {
        self.fraction.len()
    }

    /// scale into the token's smallest unit
    pub fn to_smallest_unit(&self, decimals: u8) -> Result<U256, UnitsError> {
        if self.negative {
            return Err(UnitsError::Negative);
        }
        if decimals > MAX_DECIMALS {
            return Err(UnitsError::UnsupportedDecimals(decimals));
        }
        let fraction_digits = self.fraction_digits();
        if fraction_digits > decimals as usize {
            return Err(UnitsError::TooManyDecimals {
                got: fraction_digits,
                max: decimals,
            });
        }

        let padding = decimals as usize - fraction_digits;
        let ten = U256::from(10u8);

        self.whole
            .bytes()
            .chain(self.fraction.bytes())
            .chain(std::iter::repeat(b'0').take(padding))
            .try_fold(U256::ZERO, |acc, digit| {
                acc.checked_mul(ten)
                    .and_then(|v| v.checked_add(U256::from(digit - b'0')))
                    .ok_or(UnitsError::Overflow)
            })
    }
}

impl FromStr for DecimalAmount {
    type Err = UnitsError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        if s.is_empty() {
            return Err(UnitsError::Empty);
        }

        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(UnitsError::NotANumber(s.to_string()));
        }

        let whole = match whole.trim_start_matches('0') {
            "" => "0",
            trimmed => trimmed,
        };
        let fraction = fraction.trim_end_matches('0');

        let mut amount = Self {
            negative,
            whole: whole.to_string(),
            fraction: fraction.to_string(),
        };
        // "-0" is just zero
        if amount.is_zero() {
            amount.negative = false;
        }
        Ok(amount)
    }
}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        if self.fraction.is_empty() {
            write!(f, "{}", self.whole)
        } else {
            write!(f, "{}.{}", self.whole, self.fraction)
        }
    }
}

/// convert a decimal amount string into the token's smallest integer unit
pub fn to_smallest_unit(amount: &str, decimals: u8) -> Result<U256, UnitsError> {
    amount.parse::<DecimalAmount>()?.to_smallest_unit(decimals)
}

/// exact inverse of [`to_smallest_unit`]: `50000000` at 6 decimals is `"50.0"`
pub fn format_units(value: U256, decimals: u8) -> String {
    let (whole, fraction) = split_digits(value, decimals as usize);
    let fraction = match fraction.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    format!("{whole}.{fraction}")
}

/// [`format_units`] rounded half-up to two fractional digits, for display only
///
/// rounds on the digit string; exact for any u256 at any decimals.
pub fn format_display(value: U256, decimals: u8) -> String {
    let (whole, fraction) = split_digits(value, decimals as usize);
    let fraction = format!("{fraction:0<width$}", width = DISPLAY_PLACES + 1);
    let round_up = fraction.as_bytes()[DISPLAY_PLACES] >= b'5';

    let mut digits = format!("{whole}{}", &fraction[..DISPLAY_PLACES]).into_bytes();
    if round_up {
        increment_digits(&mut digits);
    }

    let (whole, fraction) = digits.split_at(digits.len() - DISPLAY_PLACES);
    format!(
        "{}.{}",
        String::from_utf8_lossy(whole),
        String::from_utf8_lossy(fraction)
    )
}

/// add one to an ascii decimal number in place, growing it on full carry
fn increment_digits(digits: &mut Vec<u8>) {
    for digit in digits.iter_mut().rev() {
        if *digit == b'9' {
            *digit = b'0';
        } else {
            *digit += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// split the decimal digits of `value` into whole and `places`-wide fraction
fn split_digits(value: U256, places: usize) -> (String, String) {
    let digits = value.to_string();
    let padded = if digits.len() <= places {
        format!("{}{}", "0".repeat(places + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - places);
    (whole.to_string(), fraction.to_string())
}
