//! Binary entry point: set up logging, bind the roster file, load it once for
//! the initial screen, then drive the Ratatui event loop until the user exits.
use school_manager::logging::init_logging;
use school_manager::{ensure_store, log_path, run_app, App};

fn main() -> anyhow::Result<()> {
    init_logging(&log_path()?)?;

    let store = ensure_store()?;
    tracing::info!(path = %store.path().display(), "starting school manager");
    let report = store.load_report()?;

    let mut app = App::new(store, report);
    run_app(&mut app)
}
