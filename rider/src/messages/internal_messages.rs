use crate::views::OrderView;
use actix::Message;
use common::errors::RiderError;
use common::state_machine::OrderAction;
use common::summary::OrderSummary;
use common::types::dtos::RiderProfileDTO;
use common::types::order_status::OrderStatus;

/// Fetches the assigned orders from the backend and replaces the local list.
#[derive(Message, Debug)]
#[rtype(result = "Result<Vec<OrderView>, RiderError>")]
pub struct RefreshOrders;

/// Local list as last fetched, no request made.
#[derive(Message, Debug)]
#[rtype(result = "Vec<OrderView>")]
pub struct CurrentOrders;

/// Asks what tapping the action button of an order should do.
#[derive(Message, Debug)]
#[rtype(result = "Result<OrderAction, RiderError>")]
pub struct PlanOrderAction {
    pub order_id: u64,
}

/// Moves an order forward to `to`, after the rider confirmed the dialog.
///
/// ## Contents
/// - `order_id`: The order to update.
/// - `to`: The status the screen offered, normally `StatusInfo::next_status`.
#[derive(Message, Debug)]
#[rtype(result = "Result<Vec<OrderView>, RiderError>")]
pub struct AdvanceOrder {
    pub order_id: u64,
    pub to: OrderStatus,
}

#[derive(Message, Debug)]
#[rtype(result = "Result<Vec<OrderView>, RiderError>")]
pub struct CancelOrder {
    pub order_id: u64,
}

/// Completes a delivery with the code the customer handed over.
///
/// ## Contents
/// - `order_id`: The order being delivered.
/// - `code`: Raw input; validated locally before anything is sent.
#[derive(Message, Debug)]
#[rtype(result = "Result<Vec<OrderView>, RiderError>")]
pub struct SubmitCode {
    pub order_id: u64,
    pub code: String,
}

#[derive(Message, Debug)]
#[rtype(result = "Result<Vec<OrderView>, RiderError>")]
pub struct LoadHistory;

/// Fetches the rider profile and refreshes the cached copy.
#[derive(Message, Debug)]
#[rtype(result = "Result<RiderProfileDTO, RiderError>")]
pub struct LoadProfile;

#[derive(Message, Debug)]
#[rtype(result = "OrderSummary")]
pub struct Summary;
