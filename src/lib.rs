pub mod args;
pub mod config;
pub mod driver;
pub mod protocol;
pub mod publisher;
pub mod sdk;
pub mod sim;
