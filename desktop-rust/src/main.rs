mod app;
mod cache;
mod io;
mod model;

use app::DesktopApp;
use foodseg_dashboard::config::Config;
use foodseg_dashboard::logging;

fn main() -> anyhow::Result<()> {
    logging::init(std::env::args().any(|a| a == "--verbose" || a == "-v"));

    let (config, status) = match Config::load() {
        Ok(config) => (config, String::new()),
        Err(err) => {
            tracing::warn!(error = %err, "config load failed; using defaults");
            (Config::default(), format!("Config load failed: {err}"))
        }
    };
    let app = DesktopApp::new(&config, status)?;

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Food Segmentation Dashboard",
        options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
}
