//! Type-safe price representation using decimal arithmetic.
//!
//! The storefront sells in a single base currency (Argentine pesos). Other
//! ISO 4217 codes exist only so amounts can be rendered in the layout a
//! shopper from that market expects; there is no conversion between them.

use core::fmt;
use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CurrencyCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CurrencyError {
    /// The code is not one the storefront can format.
    #[error("unsupported currency code: {0}")]
    Unsupported(String),
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., pesos, not centavos).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// A zero amount in the given currency.
    #[must_use]
    pub const fn zero(currency_code: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency_code)
    }

    /// Format for display, e.g. `$ 1.234,56` for ARS or `$1,234.56` for USD.
    #[must_use]
    pub fn display(&self) -> String {
        self.currency_code.format(self.amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    ARS,
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
}

/// Where the symbol goes relative to the digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPosition {
    /// `$1,234.56`
    Prefix,
    /// `$ 1.234,56`
    PrefixSpaced,
    /// `1.234,56 €`
    SuffixSpaced,
}

impl CurrencyCode {
    /// Currency symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::ARS | Self::USD | Self::CAD | Self::AUD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
        }
    }

    /// Three-letter ISO code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ARS => "ARS",
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
        }
    }

    /// `(thousands, decimal)` separators.
    const fn separators(self) -> (char, char) {
        match self {
            Self::ARS | Self::EUR => ('.', ','),
            Self::USD | Self::GBP | Self::CAD | Self::AUD => (',', '.'),
        }
    }

    const fn symbol_position(self) -> SymbolPosition {
        match self {
            Self::ARS => SymbolPosition::PrefixSpaced,
            Self::EUR => SymbolPosition::SuffixSpaced,
            Self::USD | Self::GBP | Self::CAD | Self::AUD => SymbolPosition::Prefix,
        }
    }

    /// Format an amount in this currency with two fraction digits.
    ///
    /// Halves round away from zero, so `0.125` shows as `0,13`.
    #[must_use]
    pub fn format(self, amount: Decimal) -> String {
        let (thousands, decimal) = self.separators();
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let fixed = format!("{:.2}", rounded.abs());
        let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

        let mut digits = group_thousands(int_part, thousands);
        digits.push(decimal);
        digits.push_str(frac_part);

        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let symbol = self.symbol();

        match self.symbol_position() {
            SymbolPosition::Prefix => format!("{sign}{symbol}{digits}"),
            SymbolPosition::PrefixSpaced => format!("{sign}{symbol} {digits}"),
            SymbolPosition::SuffixSpaced => format!("{sign}{digits} {symbol}"),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ARS" => Ok(Self::ARS),
            "USD" => Ok(Self::USD),
            "EUR" => Ok(Self::EUR),
            "GBP" => Ok(Self::GBP),
            "CAD" => Ok(Self::CAD),
            "AUD" => Ok(Self::AUD),
            _ => Err(CurrencyError::Unsupported(s.to_owned())),
        }
    }
}

/// Insert `separator` every three digits from the right.
fn group_thousands(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
