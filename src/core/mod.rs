pub mod app;
pub mod auth;
pub mod chat;
pub mod config;
pub mod keyring;
pub mod message;
pub mod session;
