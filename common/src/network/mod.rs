pub mod gateway;
pub mod http_gateway;
pub mod reachability;

pub use gateway::RiderGateway;
pub use http_gateway::{GatewayConfig, HttpGateway};
pub use reachability::{Reachability, TcpProbe};
