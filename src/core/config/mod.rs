pub mod data;
pub mod io;

pub use data::{path_display, Config, SessionStorage, API_URL_ENV_VAR};
pub use io::ConfigError;

#[cfg(test)]
mod tests;
