pub mod arguments;
pub mod config;
pub mod database;
pub mod errors;
pub mod events;
pub mod hub;
pub mod logger;
pub mod run;
pub mod subscriber;
pub mod webserver;
