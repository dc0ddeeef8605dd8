pub mod dtos;
pub mod order_status;
pub mod status_info;
