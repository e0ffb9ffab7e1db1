pub mod aliases;
pub mod catalog;
pub mod help;
pub mod protocol;
pub mod server;
