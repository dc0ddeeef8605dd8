use common::state_machine::{can_cancel, describe_status};
use common::types::dtos::OrderDTO;
use common::types::status_info::StatusInfo;

/// An order together with everything a screen needs to draw it.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: OrderDTO,
    pub info: StatusInfo,
    pub can_cancel: bool,
    /// A status update or code check for this order is in flight.
    pub updating: bool,
}

impl OrderView {
    pub fn new(order: &OrderDTO, updating: bool) -> Self {
        let status = order.status();
        Self {
            order: order.clone(),
            info: describe_status(&status),
            can_cancel: can_cancel(&status),
            updating,
        }
    }
}
