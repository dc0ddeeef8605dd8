pub mod constants;
pub mod errors;
pub mod logger;
pub mod network;
pub mod otp;
pub mod session;
pub mod state_machine;
pub mod storage;
pub mod summary;
pub mod types;
