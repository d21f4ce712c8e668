//! Coupon Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::value_objects::{round_money, CouponCode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType { Percentage, Fixed }

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Percentage => "percentage", Self::Fixed => "fixed" }
    }
    pub fn parse(value: &str) -> Option<Self> {
        match value { "percentage" => Some(Self::Percentage), "fixed" => Some(Self::Fixed), _ => None }
    }
}

#[derive(Clone, Debug)]
pub struct Coupon {
    pub id: Uuid,
    pub code: CouponCode,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub max_usage: Option<u32>,
    pub usage_count: u32,
    pub max_discount: Option<Decimal>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

/// Why a coupon cannot be applied.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponRejection {
    #[error("coupon not found")]
    NotFound,
    #[error("coupon is inactive")]
    Inactive,
    #[error("coupon has expired")]
    Expired,
    #[error("coupon usage limit reached")]
    UsageExhausted,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponEvaluation {
    pub valid: bool,
    pub discount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<CouponRejection>,
}

impl CouponEvaluation {
    fn rejected(reason: CouponRejection) -> Self { Self { valid: false, discount: Decimal::ZERO, reason: Some(reason) } }
    pub fn into_result(self) -> Result<Decimal, CouponRejection> {
        match self.reason { Some(reason) => Err(reason), None => Ok(self.discount) }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CouponTermsError {
    #[error("discount value must be positive")]
    NonPositiveValue,
    #[error("percentage discount cannot exceed 100")]
    PercentageAbove100,
    #[error("max discount must be positive")]
    NonPositiveCap,
    #[error("max usage must be at least 1")]
    ZeroMaxUsage,
}

/// Checks the admin-supplied terms of a coupon.
pub fn validate_terms(
    discount_type: DiscountType,
    discount_value: Decimal,
    max_discount: Option<Decimal>,
    max_usage: Option<u32>,
) -> Result<(), CouponTermsError> {
    if discount_value <= Decimal::ZERO { return Err(CouponTermsError::NonPositiveValue); }
    if discount_type == DiscountType::Percentage && discount_value > Decimal::ONE_HUNDRED {
        return Err(CouponTermsError::PercentageAbove100);
    }
    if max_discount.is_some_and(|cap| cap <= Decimal::ZERO) { return Err(CouponTermsError::NonPositiveCap); }
    if max_usage == Some(0) { return Err(CouponTermsError::ZeroMaxUsage); }
    Ok(())
}

impl Coupon {
    /// Discount this coupon grants on `subtotal`, ignoring eligibility.
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        let subtotal = subtotal.max(Decimal::ZERO);
        let raw = match self.discount_type {
            DiscountType::Percentage => percent_of(subtotal, self.discount_value),
            DiscountType::Fixed => self.discount_value,
        };
        let capped = self.max_discount.map_or(raw, |cap| raw.min(cap));
        round_money(capped.min(subtotal).max(Decimal::ZERO))
    }

    pub fn check_eligibility(&self, now: DateTime<Utc>) -> Result<(), CouponRejection> {
        if !self.is_active { return Err(CouponRejection::Inactive); }
        if self.expires_at.is_some_and(|at| now >= at) { return Err(CouponRejection::Expired); }
        if self.max_usage.is_some_and(|max| self.usage_count >= max) { return Err(CouponRejection::UsageExhausted); }
        Ok(())
    }
}

/// `value`% of `amount`. Near the top of the Decimal range the division is
/// done first, and anything still too large saturates at `amount`.
fn percent_of(amount: Decimal, value: Decimal) -> Decimal {
    match amount.checked_mul(value) {
        Some(product) => product / Decimal::ONE_HUNDRED,
        None => (amount / Decimal::ONE_HUNDRED).checked_mul(value).unwrap_or(amount),
    }
}

/// Reason to report when the guarded usage increment matched no row.
/// `current` is the coupon as re-read after the failed update; if it still
/// looks eligible another order took the last use.
pub fn redemption_failure(current: Option<&Coupon>, now: DateTime<Utc>) -> CouponRejection {
    match current {
        None => CouponRejection::NotFound,
        Some(c) => c.check_eligibility(now).err().unwrap_or(CouponRejection::UsageExhausted),
    }
}

/// Evaluates `code` against `subtotal`.
///
/// Checks run in order: existence and active flag, expiry, usage limit. The
/// first failure wins and no discount is granted.
pub fn evaluate(code: &str, subtotal: Decimal, coupon: Option<&Coupon>, now: DateTime<Utc>) -> CouponEvaluation {
    let coupon = match (CouponCode::new(code), coupon) {
        (Ok(code), Some(coupon)) if coupon.code == code => coupon,
        _ => return CouponEvaluation::rejected(CouponRejection::NotFound),
    };
    if let Err(reason) = coupon.check_eligibility(now) {
        return CouponEvaluation::rejected(reason);
    }
    CouponEvaluation { valid: true, discount: coupon.discount_for(subtotal), reason: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(discount_type: DiscountType, value: Decimal) -> Coupon {
        Coupon {
            id: Uuid::new_v4(),
            code: CouponCode::new("PRINT20").unwrap(),
            discount_type,
            discount_value: value,
            max_usage: None,
            usage_count: 0,
            max_discount: None,
            expires_at: None,
            is_active: true,
        }
    }

    #[test]
    fn percentage_is_capped_by_max_discount() {
        let mut c = coupon(DiscountType::Percentage, dec!(20));
        c.max_discount = Some(dec!(150));
        let eval = evaluate("PRINT20", dec!(1000), Some(&c), Utc::now());
        assert!(eval.valid);
        assert_eq!(eval.discount, dec!(150));
    }

    #[test]
    fn percentage_without_cap() {
        let c = coupon(DiscountType::Percentage, dec!(15));
        assert_eq!(evaluate("print20", dec!(250), Some(&c), Utc::now()).discount, dec!(37.50));
    }

    #[test]
    fn fixed_is_clamped_to_subtotal() {
        let c = coupon(DiscountType::Fixed, dec!(150));
        let eval = evaluate("PRINT20", dec!(100), Some(&c), Utc::now());
        assert!(eval.valid);
        assert_eq!(eval.discount, dec!(100));
    }

    #[test]
    fn fixed_below_subtotal_is_full_value() {
        let c = coupon(DiscountType::Fixed, dec!(75));
        assert_eq!(evaluate("PRINT20", dec!(500), Some(&c), Utc::now()).discount, dec!(75));
    }

    #[test]
    fn missing_or_mismatched_coupon_is_not_found() {
        let c = coupon(DiscountType::Fixed, dec!(10));
        assert_eq!(evaluate("PRINT20", dec!(100), None, Utc::now()).reason, Some(CouponRejection::NotFound));
        assert_eq!(evaluate("OTHER", dec!(100), Some(&c), Utc::now()).reason, Some(CouponRejection::NotFound));
        assert_eq!(evaluate("", dec!(100), Some(&c), Utc::now()).reason, Some(CouponRejection::NotFound));
    }

    #[test]
    fn inactive_is_rejected_before_expiry() {
        let mut c = coupon(DiscountType::Fixed, dec!(10));
        c.is_active = false;
        c.expires_at = Some(Utc::now() - Duration::days(1));
        let eval = evaluate("PRINT20", dec!(100), Some(&c), Utc::now());
        assert!(!eval.valid);
        assert_eq!(eval.discount, Decimal::ZERO);
        assert_eq!(eval.reason, Some(CouponRejection::Inactive));
    }

    #[test]
    fn expired_is_rejected_regardless_of_subtotal() {
        let mut c = coupon(DiscountType::Percentage, dec!(10));
        c.expires_at = Some(Utc::now() - Duration::minutes(1));
        for subtotal in [dec!(0), dec!(1), dec!(100000)] {
            let eval = evaluate("PRINT20", subtotal, Some(&c), Utc::now());
            assert_eq!(eval, CouponEvaluation { valid: false, discount: Decimal::ZERO, reason: Some(CouponRejection::Expired) });
        }
    }

    #[test]
    fn exhausted_usage_is_rejected() {
        let mut c = coupon(DiscountType::Fixed, dec!(10));
        c.max_usage = Some(5);
        c.usage_count = 5;
        assert_eq!(evaluate("PRINT20", dec!(100), Some(&c), Utc::now()).reason, Some(CouponRejection::UsageExhausted));
        c.usage_count = 4;
        assert!(evaluate("PRINT20", dec!(100), Some(&c), Utc::now()).valid);
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let mut c = coupon(DiscountType::Fixed, dec!(10));
        c.expires_at = Some(now);
        assert_eq!(evaluate("PRINT20", dec!(100), Some(&c), now).reason, Some(CouponRejection::Expired));
        c.expires_at = Some(now + Duration::seconds(1));
        assert!(evaluate("PRINT20", dec!(100), Some(&c), now).valid);
    }

    #[test]
    fn discount_never_exceeds_subtotal_or_cap() {
        let mut c = coupon(DiscountType::Percentage, dec!(100));
        c.max_discount = Some(dec!(40));
        for subtotal in [dec!(0), dec!(10), dec!(39.99), dec!(40), dec!(5000)] {
            let d = c.discount_for(subtotal);
            assert!(d <= subtotal && d <= dec!(40));
        }
    }

    #[test]
    fn huge_subtotal_does_not_overflow() {
        let mut c = coupon(DiscountType::Percentage, dec!(20));
        c.max_discount = Some(dec!(150));
        let huge = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let eval = evaluate("PRINT20", huge, Some(&c), Utc::now());
        assert!(eval.valid);
        assert_eq!(eval.discount, dec!(150));

        c.max_discount = None;
        let uncapped = c.discount_for(Decimal::MAX);
        assert!(uncapped > Decimal::ZERO && uncapped <= Decimal::MAX);
    }

    #[test]
    fn lost_redemption_reports_current_state() {
        let now = Utc::now();
        assert_eq!(redemption_failure(None, now), CouponRejection::NotFound);

        let mut c = coupon(DiscountType::Fixed, dec!(10));
        c.is_active = false;
        assert_eq!(redemption_failure(Some(&c), now), CouponRejection::Inactive);

        let mut c = coupon(DiscountType::Fixed, dec!(10));
        c.expires_at = Some(now - Duration::seconds(1));
        assert_eq!(redemption_failure(Some(&c), now), CouponRejection::Expired);

        let mut c = coupon(DiscountType::Fixed, dec!(10));
        c.max_usage = Some(3);
        c.usage_count = 3;
        assert_eq!(redemption_failure(Some(&c), now), CouponRejection::UsageExhausted);

        // Still eligible on re-read: a concurrent order took the last use.
        c.usage_count = 2;
        assert_eq!(redemption_failure(Some(&c), now), CouponRejection::UsageExhausted);
    }

    #[test]
    fn terms_validation() {
        assert_eq!(validate_terms(DiscountType::Percentage, dec!(120), None, None), Err(CouponTermsError::PercentageAbove100));
        assert_eq!(validate_terms(DiscountType::Fixed, dec!(0), None, None), Err(CouponTermsError::NonPositiveValue));
        assert_eq!(validate_terms(DiscountType::Fixed, dec!(500), Some(dec!(0)), None), Err(CouponTermsError::NonPositiveCap));
        assert_eq!(validate_terms(DiscountType::Fixed, dec!(500), None, Some(0)), Err(CouponTermsError::ZeroMaxUsage));
        assert!(validate_terms(DiscountType::Fixed, dec!(500), None, Some(1)).is_ok());
    }

    #[test]
    fn evaluation_serializes_reason_in_snake_case() {
        let c = coupon(DiscountType::Fixed, dec!(10));
        let mut spent = c.clone();
        spent.max_usage = Some(1);
        spent.usage_count = 1;
        let json = serde_json::to_value(evaluate("PRINT20", dec!(10), Some(&spent), Utc::now())).unwrap();
        assert_eq!(json["reason"], "usage_exhausted");
        assert_eq!(json["valid"], false);
    }
}
