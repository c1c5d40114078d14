pub mod backend;
pub mod chat_message;
pub mod chat_room;
pub mod chat_store;
pub mod commandline;
pub mod configuration;
pub mod context;
pub mod database;
pub mod error;
pub mod realtime;
pub mod server;
pub mod session;
pub mod support;
pub mod types;
pub mod utils;
