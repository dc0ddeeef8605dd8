use crate::types::dtos::OrderDTO;
use crate::types::order_status::OrderStatus;
use serde::{Deserialize, Serialize};

/// Home screen numbers for the rider's current order list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub assigned: usize,
    pub picked: usize,
    pub delivering: usize,
    pub delivered: usize,
    pub cancelled: usize,
    pub unknown: usize,
    /// Cash to collect on orders that are still in flight (COD only).
    pub cash_to_collect: f64,
}

impl OrderSummary {
    pub fn from_orders(orders: &[OrderDTO]) -> Self {
        let mut summary = OrderSummary::default();
        for order in orders {
            let status = order.status();
            match status {
                OrderStatus::Assigned => summary.assigned += 1,
                OrderStatus::Picked => summary.picked += 1,
                OrderStatus::Delivering => summary.delivering += 1,
                OrderStatus::Delivered => summary.delivered += 1,
                OrderStatus::Cancelled => summary.cancelled += 1,
                OrderStatus::Unknown(_) => summary.unknown += 1,
            }
            if status.is_known() && !status.is_terminal() {
                summary.cash_to_collect += order.total_amount;
            }
        }
        summary
    }

    pub fn active(&self) -> usize {
        self.assigned + self.picked + self.delivering
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: u64, status: &str, amount: f64) -> OrderDTO {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "status": status,
            "totalAmount": amount,
        }))
        .unwrap()
    }

    #[test]
    fn test_counts_and_cash_only_for_active_orders() {
        let orders = vec![
            order(1, "pending", 100.0),
            order(2, "picked_up", 50.5),
            order(3, "OUT_FOR_DELIVERY", 20.0),
            order(4, "delivered", 999.0),
            order(5, "cancelled", 10.0),
            order(6, "held", 5.0),
        ];
        let summary = OrderSummary::from_orders(&orders);
        assert_eq!(summary.assigned, 1);
        assert_eq!(summary.picked, 1);
        assert_eq!(summary.delivering, 1);
        assert_eq!(summary.delivered, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.active(), 3);
        assert!((summary.cash_to_collect - 170.5).abs() < f64::EPSILON);
    }
}
