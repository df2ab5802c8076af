//! Adapter layer: converts between the ledger's Decimal money and the f64 geometry world.

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Convert f64 to Decimal (lossy but sufficient for layout round-trips).
/// Non-finite input maps to zero.
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal to f64.
pub fn from_decimal(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Round a money amount to cents, the precision balances are stored at.
pub fn to_cents(d: Decimal) -> Decimal {
    d.round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn round_trip_cent_amounts() {
        assert_eq!(from_decimal(dec!(1234.56)), 1234.56);
        assert_eq!(to_cents(to_decimal(1234.56)), dec!(1234.56));
    }

    #[test]
    fn non_finite_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
    }
}
