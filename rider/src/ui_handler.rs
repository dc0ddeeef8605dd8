use crate::auth::AuthFlow;
use crate::messages::internal_messages::{
    AdvanceOrder, CancelOrder, CurrentOrders, LoadHistory, LoadProfile, PlanOrderAction,
    RefreshOrders, SubmitCode, Summary,
};
use crate::rider_actors::OrdersController;
use crate::views::OrderView;
use actix::prelude::*;
use colored::*;
use common::errors::RiderError;
use common::logger::Logger;
use common::network::RiderGateway;
use common::session::Session;
use common::state_machine::{OrderAction, describe_status};
use common::types::status_info::ColorToken;
use std::io::{self, Write};
use std::sync::Arc;

/// What ended an orders menu session.
enum MenuExit {
    Logout,
    Quit,
}

/// Human-facing side of the client: prompts on stdin, alerts on the log.
///
/// Every [`RiderError`] coming back from the controller is shown as an alert
/// and the menu goes on.
pub struct UIHandler {
    pub auth: AuthFlow,
    pub gateway: Arc<dyn RiderGateway>,
    pub logger: Logger,
}

impl UIHandler {
    pub fn new(auth: AuthFlow, gateway: Arc<dyn RiderGateway>, logger: Logger) -> Self {
        UIHandler {
            auth,
            gateway,
            logger,
        }
    }

    pub async fn run(self) -> io::Result<()> {
        print_welcome_message();
        loop {
            let restored = match self.auth.restore() {
                Ok(session) => session,
                Err(e) => {
                    self.alert(&e);
                    None
                }
            };
            let session = match restored {
                Some(session) => session,
                None => match self.ask_login().await? {
                    Some(session) => session,
                    None => return Ok(()),
                },
            };

            let controller = OrdersController::new(
                session.clone(),
                self.gateway.clone(),
                Some(self.auth.sessions().clone()),
            )
            .with_logger(self.logger.scoped("orders"))
            .start();

            match self.orders_menu(&controller, &session).await? {
                MenuExit::Logout => {
                    if let Err(e) = self.auth.logout() {
                        self.alert(&e);
                    }
                }
                MenuExit::Quit => return Ok(()),
            }
        }
    }

    async fn ask_login(&self) -> io::Result<Option<Session>> {
        loop {
            self.logger.info("Please log in.");
            let Some(phone) = read_line("Phone:").await? else {
                return Ok(None);
            };
            let Some(password) = read_line("Password:").await? else {
                return Ok(None);
            };
            match self.auth.login(&phone, &password).await {
                Ok(session) => return Ok(Some(session)),
                Err(e) => self.alert(&e),
            }
        }
    }

    async fn orders_menu(
        &self,
        controller: &Addr<OrdersController>,
        session: &Session,
    ) -> io::Result<MenuExit> {
        self.logger
            .info(format!("Welcome, {}!", session.profile.name));
        self.refresh(controller).await?;

        loop {
            println!();
            println!("{}", "[1] Refresh orders   [2] Order action   [3] Cancel order".bold());
            println!("{}", "[4] Summary          [5] History        [6] Profile".bold());
            println!("{}", "[7] Logout           [0] Quit".bold());
            let Some(choice) = read_line(">").await? else {
                return Ok(MenuExit::Quit);
            };
            match choice.as_str() {
                "1" => self.refresh(controller).await?,
                "2" => self.order_action(controller).await?,
                "3" => self.cancel_order(controller).await?,
                "4" => self.summary(controller).await?,
                "5" => self.history(controller).await?,
                "6" => self.profile(controller).await?,
                "7" => return Ok(MenuExit::Logout),
                "0" | "q" => return Ok(MenuExit::Quit),
                _ => self.logger.warn("Invalid option."),
            }
        }
    }

    async fn refresh(&self, controller: &Addr<OrdersController>) -> io::Result<()> {
        match controller.send(RefreshOrders).await.map_err(mailbox)? {
            Ok(views) => self.show_orders("Assigned orders", &views),
            Err(e) => self.alert(&e),
        }
        Ok(())
    }

    async fn order_action(&self, controller: &Addr<OrdersController>) -> io::Result<()> {
        let Some(order_id) = self.ask_order_id().await? else {
            return Ok(());
        };
        let action = match controller
            .send(PlanOrderAction { order_id })
            .await
            .map_err(mailbox)?
        {
            Ok(action) => action,
            Err(e) => {
                self.alert(&e);
                return Ok(());
            }
        };

        let outcome = match action {
            OrderAction::Advance { to } => {
                let label = describe_status(&to).label;
                if !self
                    .confirm(&format!("Mark order {} as {}?", order_id, label))
                    .await?
                {
                    return Ok(());
                }
                controller
                    .send(AdvanceOrder { order_id, to })
                    .await
                    .map_err(mailbox)?
            }
            OrderAction::RequestCode => {
                let Some(code) = read_line("Customer's delivery code:").await? else {
                    return Ok(());
                };
                controller
                    .send(SubmitCode { order_id, code })
                    .await
                    .map_err(mailbox)?
            }
            OrderAction::AlreadyCompleted => {
                self.logger
                    .info(format!("Order {} is already completed.", order_id));
                return Ok(());
            }
            OrderAction::AlreadyCancelled => {
                self.logger
                    .info(format!("Order {} was cancelled.", order_id));
                return Ok(());
            }
            OrderAction::ViewOnly => {
                self.logger.info(format!(
                    "Order {} has a status this app does not handle; view only.",
                    order_id
                ));
                return Ok(());
            }
        };
        self.after_mutation(controller, outcome).await
    }

    async fn cancel_order(&self, controller: &Addr<OrdersController>) -> io::Result<()> {
        let Some(order_id) = self.ask_order_id().await? else {
            return Ok(());
        };
        if !self
            .confirm(&format!("Cancel order {}? This cannot be undone.", order_id))
            .await?
        {
            return Ok(());
        }
        let outcome = controller
            .send(CancelOrder { order_id })
            .await
            .map_err(mailbox)?;
        self.after_mutation(controller, outcome).await
    }

    async fn after_mutation(
        &self,
        controller: &Addr<OrdersController>,
        outcome: Result<Vec<OrderView>, RiderError>,
    ) -> io::Result<()> {
        match outcome {
            Ok(views) => {
                self.logger.info("Order updated.");
                self.show_orders("Assigned orders", &views);
            }
            Err(e) => {
                self.alert(&e);
                // the controller already refetched after a server error
                if e.needs_refresh() {
                    let views = controller
                        .send(CurrentOrders)
                        .await
                        .map_err(mailbox)?;
                    self.show_orders("Assigned orders", &views);
                }
            }
        }
        Ok(())
    }

    async fn summary(&self, controller: &Addr<OrdersController>) -> io::Result<()> {
        let summary = controller.send(Summary).await.map_err(mailbox)?;
        println!("{}", "Today".bold().underline());
        println!("  Active orders:    {}", summary.active());
        println!("    Assigned:       {}", summary.assigned);
        println!("    Picked up:      {}", summary.picked);
        println!("    Out for delivery: {}", summary.delivering);
        println!("  Delivered:        {}", summary.delivered);
        println!("  Cancelled:        {}", summary.cancelled);
        if summary.unknown > 0 {
            println!("  Other:            {}", summary.unknown);
        }
        println!("  Cash to collect:  ₹{:.2}", summary.cash_to_collect);
        Ok(())
    }

    async fn history(&self, controller: &Addr<OrdersController>) -> io::Result<()> {
        match controller.send(LoadHistory).await.map_err(mailbox)? {
            Ok(views) => self.show_orders("Order history", &views),
            Err(e) => self.alert(&e),
        }
        Ok(())
    }

    async fn profile(&self, controller: &Addr<OrdersController>) -> io::Result<()> {
        match controller.send(LoadProfile).await.map_err(mailbox)? {
            Ok(profile) => {
                println!("{}", "Profile".bold().underline());
                println!("  Name:    {}", profile.name);
                println!("  Phone:   {}", profile.phone);
                if let Some(code) = &profile.rider_code {
                    println!("  Rider:   {}", code);
                }
                let vehicle = [&profile.vehicle_type, &profile.vehicle_number]
                    .into_iter()
                    .flatten()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(" ");
                if !vehicle.is_empty() {
                    println!("  Vehicle: {}", vehicle);
                }
            }
            Err(e) => self.alert(&e),
        }
        Ok(())
    }

    fn show_orders(&self, title: &str, views: &[OrderView]) {
        println!("{}", title.bold().underline());
        if views.is_empty() {
            println!("  No orders.");
            return;
        }
        for view in views {
            let order = &view.order;
            let color = badge_color(view.info.color_token);
            let badge = format!("[{}]", view.info.label).color(color);
            println!(
                "  {:>6}  {:<12} {}  ₹{:.2}  {} item(s)",
                order.id,
                order.display_code(),
                badge,
                order.total_amount,
                order.item_count
            );
            if let Some(name) = &order.customer_name {
                let phone = order.customer_phone.as_deref().unwrap_or("-");
                println!("          {} ({})", name, phone);
            }
            if let Some(address) = &order.address {
                println!("          {}", address.one_line());
            }
            let mut action = format!("          → {}", view.info.action_label);
            if view.can_cancel {
                action.push_str("  |  cancel available");
            }
            if view.updating {
                action.push_str("  |  updating…");
            }
            println!("{}", action.dimmed());
        }
    }

    async fn ask_order_id(&self) -> io::Result<Option<u64>> {
        loop {
            let Some(input) = read_line("Order id (empty to go back):").await? else {
                return Ok(None);
            };
            if input.is_empty() {
                return Ok(None);
            }
            match input.trim_start_matches('#').parse::<u64>() {
                Ok(id) => return Ok(Some(id)),
                Err(_) => self.logger.warn("Order ids are numeric."),
            }
        }
    }

    async fn confirm(&self, question: &str) -> io::Result<bool> {
        let answer = read_line(&format!("{} [y/N]", question)).await?;
        Ok(matches!(
            answer.as_deref().map(str::to_lowercase).as_deref(),
            Some("y") | Some("yes")
        ))
    }

    fn alert(&self, error: &RiderError) {
        match error {
            RiderError::Connectivity(_) => self
                .logger
                .error("No internet connection. Check your network and try again."),
            RiderError::Server { status: 401, .. } => {
                self.logger.error(format!("{}", error));
                self.logger
                    .warn("Your session may have expired; logout and log in again.");
            }
            RiderError::Validation(_) | RiderError::Busy(_) | RiderError::CodeRequired(_) => {
                self.logger.warn(error.to_string())
            }
            _ => self.logger.error(error.to_string()),
        }
    }
}

fn badge_color(token: ColorToken) -> Color {
    match token {
        ColorToken::Info => Color::Cyan,
        ColorToken::Warning => Color::Yellow,
        ColorToken::Primary => Color::Blue,
        ColorToken::Success => Color::Green,
        ColorToken::Danger => Color::Red,
        ColorToken::Muted => Color::BrightBlack,
    }
}

fn mailbox(e: MailboxError) -> io::Error {
    io::Error::other(format!("orders controller unavailable: {}", e))
}

/// Reads one trimmed line from stdin without blocking the actor system.
/// `None` means stdin was closed.
async fn read_line(label: &str) -> io::Result<Option<String>> {
    let label = label.to_string();
    tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
        print!("{} ", label);
        io::stdout().flush()?;
        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        Ok(Some(input.trim().to_string()))
    })
    .await
    .map_err(io::Error::other)?
}

fn print_welcome_message() {
    println!("{}", "==============================".green());
    println!("{}", "        Rider  Client         ".green().bold());
    println!("{}", "==============================".green());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_color_token_has_a_badge_color() {
        assert_eq!(badge_color(ColorToken::Success), Color::Green);
        assert_eq!(badge_color(ColorToken::Danger), Color::Red);
        assert_eq!(badge_color(ColorToken::Muted), Color::BrightBlack);
    }
}
