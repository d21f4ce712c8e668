//! Domain layer: pricing, coupons, totals and the order/cart aggregates.
pub mod aggregates;
pub mod events;
pub mod pricing;
pub mod totals;
pub mod value_objects;
