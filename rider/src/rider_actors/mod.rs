pub mod orders_controller;

pub use orders_controller::OrdersController;
