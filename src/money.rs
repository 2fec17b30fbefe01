//! Money formatting

use rusty_money::{Money, iso};

/// Render an amount held in minor units (cents) as a currency string, e.g. `$45.00`.
#[must_use]
pub fn format_amount(minor_units: u64) -> String {
    let minor_units = i64::try_from(minor_units).unwrap_or(i64::MAX);

    Money::from_minor(minor_units, iso::USD).to_string()
}
