//! Aggregates module
pub mod cart;
pub mod coupon;
pub mod order;

pub use cart::{Cart, CartChange, CartError, CartItem, CartLine};
pub use coupon::{Coupon, CouponEvaluation, CouponRejection, CouponTermsError, DiscountType};
pub use order::{Address, AppliedCoupon, LineItem, Order, OrderError, OrderStatus};
