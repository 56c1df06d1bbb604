use serde::{Deserialize, Serialize};

use crate::LedgerError;

/// Currency used when presenting amounts to callers.
///
/// The ledger itself is currency-agnostic (amounts are plain decimals); the
/// presentation contract supports exactly two codes and a toggle between
/// them. INR is the default, matching the upstream application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    #[default]
    Inr,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Inr => "INR",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Inr => "₹",
        }
    }

    /// Flips between the two supported codes.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Currency::Usd => Currency::Inr,
            Currency::Inr => Currency::Usd,
        }
    }

    /// Formats an amount with symbol, thousands grouping and two fraction
    /// digits, in the `en-US` style of the upstream formatter.
    ///
    /// ```rust
    /// use ledger::Currency;
    ///
    /// assert_eq!(Currency::Inr.format_amount(1234.5), "₹1,234.50");
    /// assert_eq!(Currency::Usd.format_amount(-50.0), "-$50.00");
    /// ```
    #[must_use]
    pub fn format_amount(self, amount: f64) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        let cents_total = (amount.abs() * 100.0).round() as i64;
        let major = cents_total / 100;
        let cents = cents_total % 100;
        format!("{sign}{}{}.{cents:02}", self.symbol(), group_thousands(major))
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut groups = Vec::new();
    let mut end = digits.len();
    while end > 3 {
        groups.push(&digits[end - 3..end]);
        end -= 3;
    }
    groups.push(&digits[..end]);
    groups.reverse();
    groups.join(",")
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = LedgerError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "INR" => Ok(Currency::Inr),
            other => Err(LedgerError::InvalidArgument(format!(
                "unsupported currency: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Currency;

    #[test]
    fn grouping_and_fraction_digits() {
        assert_eq!(Currency::Usd.format_amount(0.0), "$0.00");
        assert_eq!(Currency::Usd.format_amount(999.999), "$1,000.00");
        assert_eq!(Currency::Inr.format_amount(1_234_567.89), "₹1,234,567.89");
    }

    #[test]
    fn toggle_flips_between_the_two_codes() {
        assert_eq!(Currency::Inr.toggled(), Currency::Usd);
        assert_eq!(Currency::Usd.toggled(), Currency::Inr);
        assert_eq!(Currency::default(), Currency::Inr);
    }
}
