//! Money calculation utilities using rust_decimal for precision
//!
//! All arithmetic is done in `Decimal`, then converted to `f64` for
//! storage/serialization. Amounts are Rupiah.

use rust_decimal::prelude::*;
use shared::error::{AppError, ErrorCode};

/// PPN (VAT) rate: 11%
pub const TAX_RATE: Decimal = Decimal::from_parts(11, 0, 0, false, 2);

/// Storage precision for amounts
const DECIMAL_PLACES: u32 = 2;

/// Order totals, fixed at creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Convert f64 to Decimal for calculation.
/// Non-finite input is logged and treated as zero.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `round(subtotal * 11%)` to whole Rupiah, half away from zero
pub fn tax_for(subtotal: Decimal) -> Decimal {
    (subtotal * TAX_RATE).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute order totals from the line totals and a requested discount.
///
/// `0 <= discount <= subtotal + tax`.
pub fn compute_totals(
    line_totals: impl IntoIterator<Item = Decimal>,
    discount: f64,
) -> Result<Totals, AppError> {
    if !discount.is_finite() || discount < 0.0 {
        return Err(AppError::with_message(
            ErrorCode::InvalidDiscount,
            format!("discount must be a finite non-negative number, got {discount}"),
        ));
    }
    let subtotal: Decimal = line_totals.into_iter().sum();
    let tax = tax_for(subtotal);
    let discount = to_decimal(discount);
    if discount > subtotal + tax {
        return Err(AppError::with_message(
            ErrorCode::InvalidDiscount,
            "discount exceeds order amount",
        )
        .with_detail("maxDiscount", to_f64(subtotal + tax)));
    }
    Ok(Totals {
        subtotal,
        tax,
        discount,
        total: subtotal + tax - discount,
    })
}

/// Cash handling: `amount_paid >= total`, change = paid - total.
/// Non-cash methods carry no change.
pub fn cash_change(total: Decimal, amount_paid: Option<f64>) -> Result<Decimal, AppError> {
    let paid = amount_paid.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "amountPaid is required for cash")
            .with_detail("field", "amountPaid")
    })?;
    if !paid.is_finite() {
        return Err(AppError::new(ErrorCode::PaymentAmountInvalid));
    }
    let paid = to_decimal(paid);
    if paid < total {
        return Err(AppError::new(ErrorCode::PaymentInsufficientAmount)
            .with_detail("total", to_f64(total))
            .with_detail("amountPaid", to_f64(paid)));
    }
    Ok(paid - total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn tax_is_eleven_percent_rounded_to_rupiah() {
        assert_eq!(tax_for(d(100_000)), d(11_000));
        // 12_345 * 0.11 = 1357.95
        assert_eq!(tax_for(d(12_345)), d(1_358));
        // 50 * 0.11 = 5.5 -> 6 (half away from zero)
        assert_eq!(tax_for(d(50)), d(6));
        assert_eq!(tax_for(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn totals_identity_holds() {
        let t = compute_totals([d(18_000), d(36_000)], 4_000.0).unwrap();
        assert_eq!(t.subtotal, d(54_000));
        assert_eq!(t.tax, d(5_940));
        assert_eq!(t.discount, d(4_000));
        assert_eq!(t.total, t.subtotal + t.tax - t.discount);
        assert_eq!(to_f64(t.total), 55_940.0);
    }

    #[test]
    fn discount_bounds() {
        assert_eq!(
            compute_totals([d(10_000)], -1.0).unwrap_err().code,
            ErrorCode::InvalidDiscount
        );
        assert_eq!(
            compute_totals([d(10_000)], f64::NAN).unwrap_err().code,
            ErrorCode::InvalidDiscount
        );
        // subtotal + tax = 11_100
        assert!(compute_totals([d(10_000)], 11_100.0).is_ok());
        assert_eq!(
            compute_totals([d(10_000)], 11_101.0).unwrap_err().code,
            ErrorCode::InvalidDiscount
        );
    }

    #[test]
    fn cash_change_rules() {
        assert_eq!(cash_change(d(55_940), Some(60_000.0)).unwrap(), d(4_060));
        assert_eq!(cash_change(d(55_940), Some(55_940.0)).unwrap(), Decimal::ZERO);
        assert_eq!(
            cash_change(d(55_940), Some(50_000.0)).unwrap_err().code,
            ErrorCode::PaymentInsufficientAmount
        );
        assert_eq!(
            cash_change(d(55_940), None).unwrap_err().code,
            ErrorCode::RequiredField
        );
    }

    #[test]
    fn to_f64_rounds_two_places() {
        assert_eq!(to_f64(Decimal::new(12_345, 3)), 12.35);
        assert_eq!(to_f64(to_decimal(0.1) + to_decimal(0.2)), 0.3);
    }
}
