//! MiniMind Chat is a terminal client for a MiniMind chat server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`api`] defines the request/response payloads and the HTTP client for
//!   the server's register, login, chat and history endpoints.
//! - [`core`] owns the session store, configuration, the login/register
//!   flows, chat page state and the page router used by the UI.
//! - [`ui`] renders the terminal interface and runs the interactive event
//!   loop.
//! - [`cli`] parses arguments and runs the one-shot commands.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
