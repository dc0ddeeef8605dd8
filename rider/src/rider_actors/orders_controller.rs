use crate::messages::internal_messages::{
    AdvanceOrder, CancelOrder, CurrentOrders, LoadHistory, LoadProfile, PlanOrderAction,
    RefreshOrders, SubmitCode, Summary,
};
use crate::views::OrderView;
use actix::prelude::*;
use colored::Color;
use common::errors::RiderError;
use common::logger::Logger;
use common::network::RiderGateway;
use common::otp::ConfirmationCode;
use common::session::{Session, SessionStore};
use common::state_machine::{
    OrderAction, can_cancel, check_transition, plan_action, requires_confirmation,
};
use common::summary::OrderSummary;
use common::types::dtos::{OrderDTO, RiderProfileDTO};
use common::types::order_status::OrderStatus;
use std::collections::HashSet;
use std::sync::Arc;

type OrdersResult = Result<Vec<OrderView>, RiderError>;

/// Backing controller of the orders screens.
///
/// Owns the order list as last fetched from the backend and the set of orders
/// with a request in flight. Every mutation is followed by a full refetch; the
/// list is never patched with guessed states.
pub struct OrdersController {
    /// Session of the logged-in rider.
    pub session: Session,
    /// Backend access.
    pub gateway: Arc<dyn RiderGateway>,
    /// Where the refreshed profile is cached, if anywhere.
    pub session_store: Option<SessionStore>,
    /// Orders as last fetched.
    pub orders: Vec<OrderDTO>,
    /// Orders with a status update or code check in flight.
    pub updating: HashSet<u64>,
    pub logger: Logger,
}

impl OrdersController {
    pub fn new(
        session: Session,
        gateway: Arc<dyn RiderGateway>,
        session_store: Option<SessionStore>,
    ) -> Self {
        Self {
            session,
            gateway,
            session_store,
            orders: Vec::new(),
            updating: HashSet::new(),
            logger: Logger::new("Orders", Color::Blue),
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    fn views(&self) -> Vec<OrderView> {
        self.orders
            .iter()
            .map(|order| OrderView::new(order, self.updating.contains(&order.id)))
            .collect()
    }

    fn find(&self, order_id: u64) -> Result<&OrderDTO, RiderError> {
        self.orders
            .iter()
            .find(|order| order.id == order_id)
            .ok_or(RiderError::UnknownOrder(order_id))
    }

    fn find_mut(&mut self, order_id: u64) -> Option<&mut OrderDTO> {
        self.orders.iter_mut().find(|order| order.id == order_id)
    }

    /// Marks the order as in flight, refusing if it already is.
    fn begin_update(&mut self, order_id: u64) -> Result<(), RiderError> {
        if !self.updating.insert(order_id) {
            self.logger.warn(format!(
                "Order {} already has a request in flight, ignoring",
                order_id
            ));
            return Err(RiderError::Busy(order_id));
        }
        Ok(())
    }

    fn prepare_advance(&mut self, msg: &AdvanceOrder) -> Result<OrderStatus, RiderError> {
        let from = self.find(msg.order_id)?.status();
        let to = check_transition(&from, &msg.to)?;
        if requires_confirmation(&to) {
            return Err(RiderError::CodeRequired(msg.order_id));
        }
        self.begin_update(msg.order_id)?;
        Ok(to)
    }

    fn prepare_cancel(&mut self, order_id: u64) -> Result<(), RiderError> {
        let from = self.find(order_id)?.status();
        if !can_cancel(&from) {
            return Err(RiderError::TransitionDenied {
                from,
                to: OrderStatus::Cancelled,
            });
        }
        self.begin_update(order_id)
    }

    fn prepare_code(&mut self, msg: &SubmitCode) -> Result<ConfirmationCode, RiderError> {
        let from = self.find(msg.order_id)?.status();
        check_transition(&from, &OrderStatus::Delivered)?;
        let code = ConfirmationCode::parse(&msg.code)?;
        self.begin_update(msg.order_id)?;
        Ok(code)
    }

    /// Sends `update_status` for an order already marked in flight and
    /// refetches afterwards.
    fn send_status_update(
        &mut self,
        order_id: u64,
        to: OrderStatus,
    ) -> ResponseActFuture<Self, OrdersResult> {
        self.logger
            .info(format!("Sending order {} to {}", order_id, to));
        let gateway = self.gateway.clone();
        let token = self.session.token.clone();

        let fut = async move {
            let result = gateway.update_status(&token, order_id, &to).await;
            let refreshed = refetch_after(&*gateway, &token, &result).await;
            (result, refreshed)
        };

        Box::pin(fut.into_actor(self).map(move |(result, refreshed), act, _ctx| {
            act.updating.remove(&order_id);
            act.finish_mutation(order_id, result, refreshed)
        }))
    }

    /// Applies the refetched list and reports the mutation result.
    ///
    /// A successful mutation whose refetch failed still reports success; the
    /// list keeps its previous content until the next refresh.
    fn finish_mutation(
        &mut self,
        order_id: u64,
        result: Result<(), RiderError>,
        refreshed: Option<Result<Vec<OrderDTO>, RiderError>>,
    ) -> OrdersResult {
        match refreshed {
            Some(Ok(orders)) => self.orders = orders,
            Some(Err(e)) => self
                .logger
                .warn(format!("Could not refresh orders after updating {}: {}", order_id, e)),
            None => {}
        }
        match result {
            Ok(()) => Ok(self.views()),
            Err(e) => {
                self.logger
                    .error(format!("Update of order {} failed: {}", order_id, e));
                Err(e)
            }
        }
    }
}

/// Refetch after a mutation: always on success, and on server errors so the
/// list shows what the server really has.
async fn refetch_after(
    gateway: &dyn RiderGateway,
    token: &str,
    result: &Result<(), RiderError>,
) -> Option<Result<Vec<OrderDTO>, RiderError>> {
    let needs_refresh = match result {
        Ok(()) => true,
        Err(e) => e.needs_refresh(),
    };
    if needs_refresh {
        Some(gateway.fetch_orders(token).await)
    } else {
        None
    }
}

impl Actor for OrdersController {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        self.logger.info(format!(
            "Orders controller started for rider {}",
            self.session.profile.name
        ));
    }
}

impl Handler<RefreshOrders> for OrdersController {
    type Result = ResponseActFuture<Self, OrdersResult>;

    fn handle(&mut self, _msg: RefreshOrders, _ctx: &mut Self::Context) -> Self::Result {
        let gateway = self.gateway.clone();
        let token = self.session.token.clone();
        let fut = async move { gateway.fetch_orders(&token).await };

        Box::pin(fut.into_actor(self).map(|res, act, _ctx| -> OrdersResult {
            let orders = res?;
            act.logger.debug(format!("Fetched {} orders", orders.len()));
            act.orders = orders;
            Ok(act.views())
        }))
    }
}

impl Handler<CurrentOrders> for OrdersController {
    type Result = MessageResult<CurrentOrders>;

    fn handle(&mut self, _msg: CurrentOrders, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.views())
    }
}

impl Handler<PlanOrderAction> for OrdersController {
    type Result = Result<OrderAction, RiderError>;

    fn handle(&mut self, msg: PlanOrderAction, _ctx: &mut Self::Context) -> Self::Result {
        let order = self.find(msg.order_id)?;
        Ok(plan_action(order))
    }
}

impl Handler<AdvanceOrder> for OrdersController {
    type Result = ResponseActFuture<Self, OrdersResult>;

    fn handle(&mut self, msg: AdvanceOrder, _ctx: &mut Self::Context) -> Self::Result {
        match self.prepare_advance(&msg) {
            Ok(to) => self.send_status_update(msg.order_id, to),
            Err(e) => {
                self.logger
                    .warn(format!("Not advancing order {}: {}", msg.order_id, e));
                Box::pin(actix::fut::ready(Err(e)))
            }
        }
    }
}

impl Handler<CancelOrder> for OrdersController {
    type Result = ResponseActFuture<Self, OrdersResult>;

    fn handle(&mut self, msg: CancelOrder, _ctx: &mut Self::Context) -> Self::Result {
        match self.prepare_cancel(msg.order_id) {
            Ok(()) => self.send_status_update(msg.order_id, OrderStatus::Cancelled),
            Err(e) => {
                self.logger
                    .warn(format!("Not cancelling order {}: {}", msg.order_id, e));
                Box::pin(actix::fut::ready(Err(e)))
            }
        }
    }
}

impl Handler<SubmitCode> for OrdersController {
    type Result = ResponseActFuture<Self, OrdersResult>;

    fn handle(&mut self, msg: SubmitCode, _ctx: &mut Self::Context) -> Self::Result {
        let code = match self.prepare_code(&msg) {
            Ok(code) => code,
            Err(e) => {
                self.logger
                    .warn(format!("Not verifying order {}: {}", msg.order_id, e));
                return Box::pin(actix::fut::ready(Err(e)));
            }
        };

        let order_id = msg.order_id;
        self.logger
            .info(format!("Verifying delivery code for order {}", order_id));
        let gateway = self.gateway.clone();
        let token = self.session.token.clone();

        let fut = async move {
            let result = gateway.verify_code(&token, order_id, &code).await;
            let refreshed = refetch_after(&*gateway, &token, &result).await;
            (result, refreshed)
        };

        Box::pin(fut.into_actor(self).map(move |(result, refreshed), act, _ctx| {
            act.updating.remove(&order_id);
            if result.is_ok() {
                // The server accepted the code: the order is delivered even if
                // the refetch below fails.
                if let Some(order) = act.find_mut(order_id) {
                    order.status = OrderStatus::Delivered.as_str().to_string();
                }
            }
            act.finish_mutation(order_id, result, refreshed)
        }))
    }
}

impl Handler<LoadHistory> for OrdersController {
    type Result = ResponseActFuture<Self, OrdersResult>;

    fn handle(&mut self, _msg: LoadHistory, _ctx: &mut Self::Context) -> Self::Result {
        let gateway = self.gateway.clone();
        let token = self.session.token.clone();
        let fut = async move { gateway.fetch_history(&token).await };

        Box::pin(fut.into_actor(self).map(|res, _act, _ctx| -> OrdersResult {
            let history = res?;
            Ok(history
                .iter()
                .map(|order| OrderView::new(order, false))
                .collect())
        }))
    }
}

impl Handler<LoadProfile> for OrdersController {
    type Result = ResponseActFuture<Self, Result<RiderProfileDTO, RiderError>>;

    fn handle(&mut self, _msg: LoadProfile, _ctx: &mut Self::Context) -> Self::Result {
        let gateway = self.gateway.clone();
        let token = self.session.token.clone();
        let fut = async move { gateway.fetch_profile(&token).await };

        Box::pin(fut.into_actor(self).map(|res, act, _ctx| -> Result<RiderProfileDTO, RiderError> {
            let profile = res?;
            act.session.profile = profile.clone();
            if let Some(store) = &act.session_store {
                if let Err(e) = store.save_profile(&profile) {
                    act.logger
                        .warn(format!("Could not cache rider profile: {}", e));
                }
            }
            Ok(profile)
        }))
    }
}

impl Handler<Summary> for OrdersController {
    type Result = MessageResult<Summary>;

    fn handle(&mut self, _msg: Summary, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(OrderSummary::from_orders(&self.orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, RecordingGateway, order, session};
    use common::storage::MemoryStore;
    use std::time::Duration;

    fn start(gateway: Arc<RecordingGateway>) -> Addr<OrdersController> {
        OrdersController::new(session(), gateway, None).start()
    }

    async fn loaded(gateway: Arc<RecordingGateway>) -> Addr<OrdersController> {
        let addr = start(gateway);
        addr.send(RefreshOrders).await.unwrap().unwrap();
        addr
    }

    fn status_of(views: &[OrderView], id: u64) -> OrderStatus {
        views
            .iter()
            .find(|view| view.order.id == id)
            .map(|view| view.order.status())
            .unwrap()
    }

    #[actix_rt::test]
    async fn test_refresh_describes_orders() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![
            order(1, "PENDING"),
            order(2, "delivered"),
        ]));
        let addr = start(gateway.clone());

        let views = addr.send(RefreshOrders).await.unwrap().unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].info.label, "Assigned");
        assert_eq!(views[0].info.next_status, Some(OrderStatus::Picked));
        assert!(views[0].can_cancel);
        assert_eq!(views[1].info.next_status, None);
        assert!(!views[1].can_cancel);
        assert_eq!(gateway.calls(), vec![Call::FetchOrders]);
    }

    #[actix_rt::test]
    async fn test_short_code_is_rejected_without_calling_gateway() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(5, "delivering")]));
        let addr = loaded(gateway.clone()).await;

        let result = addr
            .send(SubmitCode {
                order_id: 5,
                code: "12".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(result, Err(RiderError::Validation(_))));
        assert_eq!(gateway.count(|c| matches!(c, Call::VerifyCode(..))), 0);
        let views = addr.send(CurrentOrders).await.unwrap();
        assert!(!views[0].updating);
    }

    #[actix_rt::test]
    async fn test_valid_code_delivers_order() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(5, "delivering")]));
        let addr = loaded(gateway.clone()).await;

        let views = addr
            .send(SubmitCode {
                order_id: 5,
                code: "4821".to_string(),
            })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            gateway.count(|c| *c == Call::VerifyCode(5, "4821".to_string())),
            1
        );
        assert_eq!(status_of(&views, 5), OrderStatus::Delivered);
        assert_eq!(views[0].info.next_status, None);
        let action = addr.send(PlanOrderAction { order_id: 5 }).await.unwrap();
        assert_eq!(action.unwrap(), OrderAction::AlreadyCompleted);
    }

    #[actix_rt::test]
    async fn test_rejected_code_keeps_status_and_refreshes() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(5, "delivering")]));
        let addr = loaded(gateway.clone()).await;

        let result = addr
            .send(SubmitCode {
                order_id: 5,
                code: "0000".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(result, Err(RiderError::Server { .. })));
        assert_eq!(gateway.count(|c| *c == Call::FetchOrders), 2);
        let views = addr.send(CurrentOrders).await.unwrap();
        assert_eq!(status_of(&views, 5), OrderStatus::Delivering);
        assert!(!views[0].updating);
    }

    #[actix_rt::test]
    async fn test_code_only_accepted_while_delivering() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(3, "picked")]));
        let addr = loaded(gateway.clone()).await;

        let result = addr
            .send(SubmitCode {
                order_id: 3,
                code: "4821".to_string(),
            })
            .await
            .unwrap();

        assert!(matches!(result, Err(RiderError::TransitionDenied { .. })));
        assert_eq!(gateway.count(|c| matches!(c, Call::VerifyCode(..))), 0);
    }

    #[actix_rt::test]
    async fn test_delivered_order_is_an_informational_no_op() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(9, "delivered")]));
        let addr = loaded(gateway.clone()).await;

        let action = addr.send(PlanOrderAction { order_id: 9 }).await.unwrap();

        assert_eq!(action.unwrap(), OrderAction::AlreadyCompleted);
        assert_eq!(gateway.calls(), vec![Call::FetchOrders]);
    }

    #[actix_rt::test]
    async fn test_cancel_assigned_order_skips_code_step() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(1, "assigned")]));
        let addr = loaded(gateway.clone()).await;

        let views = addr
            .send(CancelOrder { order_id: 1 })
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            gateway.calls(),
            vec![
                Call::FetchOrders,
                Call::UpdateStatus(1, OrderStatus::Cancelled),
                Call::FetchOrders,
            ]
        );
        assert_eq!(status_of(&views, 1), OrderStatus::Cancelled);
    }

    #[actix_rt::test]
    async fn test_cancel_terminal_order_is_denied() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(2, "delivered")]));
        let addr = loaded(gateway.clone()).await;

        let result = addr.send(CancelOrder { order_id: 2 }).await.unwrap();

        assert!(matches!(result, Err(RiderError::TransitionDenied { .. })));
        assert_eq!(gateway.count(|c| matches!(c, Call::UpdateStatus(..))), 0);
    }

    #[actix_rt::test]
    async fn test_advance_follows_the_chain() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(4, "pending")]));
        let addr = loaded(gateway.clone()).await;

        let views = addr
            .send(AdvanceOrder {
                order_id: 4,
                to: OrderStatus::Picked,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status_of(&views, 4), OrderStatus::Picked);

        let views = addr
            .send(AdvanceOrder {
                order_id: 4,
                to: OrderStatus::Delivering,
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status_of(&views, 4), OrderStatus::Delivering);

        let last = addr
            .send(AdvanceOrder {
                order_id: 4,
                to: OrderStatus::Delivered,
            })
            .await
            .unwrap();
        assert!(matches!(last, Err(RiderError::CodeRequired(4))));
        assert_eq!(gateway.count(|c| matches!(c, Call::UpdateStatus(..))), 2);
    }

    #[actix_rt::test]
    async fn test_skipping_a_state_is_denied() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![order(4, "assigned")]));
        let addr = loaded(gateway.clone()).await;

        let result = addr
            .send(AdvanceOrder {
                order_id: 4,
                to: OrderStatus::Delivering,
            })
            .await
            .unwrap();

        assert!(matches!(result, Err(RiderError::TransitionDenied { .. })));
        assert_eq!(gateway.count(|c| matches!(c, Call::UpdateStatus(..))), 0);
    }

    #[actix_rt::test]
    async fn test_server_error_refreshes_and_keeps_status() {
        let mut backend = RecordingGateway::with_orders(vec![order(6, "picked")]);
        backend.update_failure = Some((409, "Order reassigned".to_string()));
        let gateway = Arc::new(backend);
        let addr = loaded(gateway.clone()).await;

        let result = addr
            .send(AdvanceOrder {
                order_id: 6,
                to: OrderStatus::Delivering,
            })
            .await
            .unwrap();

        match result {
            Err(RiderError::Server { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Order reassigned");
            }
            other => panic!("expected server error, got {:?}", other),
        }
        assert_eq!(gateway.count(|c| *c == Call::FetchOrders), 2);
        let views = addr.send(CurrentOrders).await.unwrap();
        assert_eq!(status_of(&views, 6), OrderStatus::Picked);
    }

    #[actix_rt::test]
    async fn test_connectivity_error_skips_refresh_and_clears_marker() {
        let mut backend = RecordingGateway::with_orders(vec![order(6, "picked")]);
        backend.offline = true;
        let gateway = Arc::new(backend);
        let addr = loaded(gateway.clone()).await;

        let result = addr.send(CancelOrder { order_id: 6 }).await.unwrap();

        assert!(matches!(result, Err(RiderError::Connectivity(_))));
        assert_eq!(gateway.count(|c| *c == Call::FetchOrders), 1);
        let views = addr.send(CurrentOrders).await.unwrap();
        assert_eq!(status_of(&views, 6), OrderStatus::Picked);
        assert!(!views[0].updating);
    }

    #[actix_rt::test]
    async fn test_second_submission_while_in_flight_is_busy() {
        let mut backend = RecordingGateway::with_orders(vec![order(5, "delivering")]);
        backend.latency = Duration::from_millis(100);
        let gateway = Arc::new(backend);
        let addr = loaded(gateway.clone()).await;

        let submit = || SubmitCode {
            order_id: 5,
            code: "4821".to_string(),
        };
        let (first, second) = tokio::time::timeout(Duration::from_secs(5), async {
            tokio::join!(addr.send(submit()), addr.send(submit()))
        })
        .await
        .unwrap();

        assert!(first.unwrap().is_ok());
        assert!(matches!(second.unwrap(), Err(RiderError::Busy(5))));
        assert_eq!(gateway.count(|c| matches!(c, Call::VerifyCode(..))), 1);
    }

    #[actix_rt::test]
    async fn test_unknown_order_is_reported() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![]));
        let addr = loaded(gateway).await;

        let result = addr.send(PlanOrderAction { order_id: 77 }).await.unwrap();

        assert!(matches!(result, Err(RiderError::UnknownOrder(77))));
    }

    #[actix_rt::test]
    async fn test_summary_and_history() {
        let mut backend = RecordingGateway::with_orders(vec![
            order(1, "assigned"),
            order(2, "out_for_delivery"),
        ]);
        backend.history = vec![order(10, "delivered"), order(11, "cancelled")];
        let gateway = Arc::new(backend);
        let addr = loaded(gateway).await;

        let summary = addr.send(Summary).await.unwrap();
        assert_eq!(summary.active(), 2);
        assert_eq!(summary.delivering, 1);

        let history = addr.send(LoadHistory).await.unwrap().unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|view| !view.info.has_action()));
    }

    #[actix_rt::test]
    async fn test_profile_refresh_is_cached() {
        let gateway = Arc::new(RecordingGateway::with_orders(vec![]));
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        store.save(&session()).unwrap();
        let addr = OrdersController::new(session(), gateway, Some(store.clone())).start();

        let profile = addr.send(LoadProfile).await.unwrap().unwrap();

        assert_eq!(profile.name, "Asha");
        assert_eq!(store.load().unwrap().unwrap().profile, profile);
    }
}
