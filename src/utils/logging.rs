//! Diagnostic logging.
//!
//! The full-screen UI owns stdout and stderr, so tracing output only goes to
//! a file, and only when `--log <file>` is given. `RUST_LOG` overrides the
//! default filter.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "minimind_chat=info";

fn open_log_file(path: &Path) -> Result<File, Box<dyn std::error::Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

pub fn build_env_filter() -> Result<EnvFilter, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;
    Ok(filter)
}

/// Install the global subscriber writing to `path`. Without a path nothing is
/// installed and `tracing` macros are no-ops.
pub fn init_logging(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = open_log_file(path)?;
    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(build_env_filter()?)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %path.display(),
        "logging started"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_path_installs_nothing() {
        assert!(init_logging(None).is_ok());
    }

    #[test]
    fn log_file_is_created_in_append_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let _file = open_log_file(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier\n");
    }

    #[test]
    fn unwritable_log_path_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing-dir").join("chat.log");
        assert!(open_log_file(&path).is_err());
    }
}
