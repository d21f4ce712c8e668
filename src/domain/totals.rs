//! Order total assembly

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::round_money;

/// Additive charges applied after discount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub shipping_fee: Decimal,
    /// Shipping is waived when the discounted amount reaches this value.
    pub free_shipping_threshold: Option<Decimal>,
    pub tax_rate_percent: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self { shipping_fee: Decimal::ZERO, free_shipping_threshold: None, tax_rate_percent: Decimal::ZERO }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// `total = max(subtotal - discount, 0) + shipping + tax`. The discount is
/// clamped into `0..=subtotal` before anything else; negative fees count as zero.
pub fn assemble(subtotal: Decimal, discount: Decimal, fees: &FeeSchedule) -> OrderTotals {
    let subtotal = subtotal.max(Decimal::ZERO);
    let discount = discount.max(Decimal::ZERO).min(subtotal);
    let net = (subtotal - discount).max(Decimal::ZERO);
    let shipping = match fees.free_shipping_threshold {
        Some(threshold) if net >= threshold => Decimal::ZERO,
        _ => fees.shipping_fee.max(Decimal::ZERO),
    };
    let tax = round_money(net * fees.tax_rate_percent.max(Decimal::ZERO) / Decimal::ONE_HUNDRED);
    OrderTotals { subtotal, discount, shipping, tax, total: net + shipping + tax }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn capped_percentage_example() {
        let t = assemble(dec!(1000), dec!(150), &FeeSchedule::default());
        assert_eq!(t.total, dec!(850));
    }

    #[test]
    fn oversized_discount_floors_at_zero() {
        let t = assemble(dec!(100), dec!(150), &FeeSchedule::default());
        assert_eq!(t.discount, dec!(100));
        assert_eq!(t.total, Decimal::ZERO);
    }

    #[test]
    fn fees_are_added_after_discount() {
        let fees = FeeSchedule { shipping_fee: dec!(50), free_shipping_threshold: None, tax_rate_percent: dec!(18) };
        let t = assemble(dec!(500), dec!(100), &fees);
        assert_eq!(t.tax, dec!(72));
        assert_eq!(t.shipping, dec!(50));
        assert_eq!(t.total, dec!(522));
    }

    #[test]
    fn free_shipping_uses_discounted_amount() {
        let fees = FeeSchedule { shipping_fee: dec!(50), free_shipping_threshold: Some(dec!(499)), ..FeeSchedule::default() };
        assert_eq!(assemble(dec!(520), dec!(0), &fees).shipping, Decimal::ZERO);
        assert_eq!(assemble(dec!(520), dec!(30), &fees).shipping, dec!(50));
    }

    #[test]
    fn total_is_never_negative() {
        for (s, d) in [(dec!(0), dec!(0)), (dec!(10), dec!(1000)), (dec!(-5), dec!(1))] {
            assert!(assemble(s, d, &FeeSchedule::default()).total >= Decimal::ZERO);
        }
    }

    #[test]
    fn negative_tax_rate_adds_nothing() {
        let fees = FeeSchedule { shipping_fee: dec!(-20), free_shipping_threshold: None, tax_rate_percent: dec!(-150) };
        let t = assemble(dec!(100), dec!(0), &fees);
        assert_eq!(t.tax, Decimal::ZERO);
        assert_eq!(t.shipping, Decimal::ZERO);
        assert_eq!(t.total, dec!(100));
    }
}
