//! Terminal UI layer for the interactive client.
//!
//! - [`chat_loop`]: terminal setup and the event loop that feeds key presses
//!   to [`crate::core::app::App`] and awaits the resulting requests.
//! - [`renderer`]: draws the auth page, the chat page and alert popups.
//! - [`theme`]: styles shared by the renderer and the compose box.
//!
//! Page state and request handling live in [`crate::core`]; this layer only
//! presents it and captures input.

pub mod chat_loop;
pub mod renderer;
pub mod theme;
