//! Domain events
use crate::domain::aggregates::OrderStatus;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DomainEvent {
    Order(OrderEvent),
    Coupon(CouponEvent),
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Created { order_id: Uuid, order_number: String, customer_email: String, total: Decimal },
    StatusChanged { order_id: Uuid, from: OrderStatus, to: OrderStatus },
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponEvent {
    Redeemed { coupon_id: Uuid, code: String, order_id: Uuid, discount: Decimal },
}

impl DomainEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Order(OrderEvent::Created { .. }) => "printshop.order.created",
            Self::Order(OrderEvent::StatusChanged { .. }) => "printshop.order.status_changed",
            Self::Coupon(CouponEvent::Redeemed { .. }) => "printshop.coupon.redeemed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_change_payload() {
        let e = DomainEvent::Order(OrderEvent::StatusChanged { order_id: Uuid::nil(), from: OrderStatus::PendingReview, to: OrderStatus::Accepted });
        assert_eq!(e.subject(), "printshop.order.status_changed");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["from"], "pending_review");
    }
}
