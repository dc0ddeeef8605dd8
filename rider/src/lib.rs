pub mod auth;
pub mod config;
pub mod messages;
pub mod rider_actors;
pub mod ui_handler;
pub mod views;

#[cfg(test)]
pub(crate) mod test_support;
