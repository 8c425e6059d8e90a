pub mod config;
pub mod dispatch;
pub mod logging;
pub mod pairing;
pub mod poll;
pub mod server;
pub mod telegram;
