// GUI-subsystem binary: no console window is allocated on Windows in GUI
// mode. Headless mode (--input present) is routed before eframe starts.
#![windows_subsystem = "windows"]

use clap::Parser;
use eframe::egui;
use obscura::app::ObscuraApp;
use obscura::{cli, io, log_err, logger};

fn main() -> Result<(), eframe::Error> {
    // -- Headless mode -------------------------------------------------
    if cli::CliArgs::is_cli_mode() {
        let args = cli::CliArgs::parse();
        std::process::exit(cli::run(args));
    }

    // -- GUI mode ------------------------------------------------------

    // Session log (overwrites the previous session's file).
    logger::init();

    let args = cli::CliArgs::parse();
    let initial = args.image.as_deref().and_then(|path| {
        match io::load_image(path) {
            Ok(img) => Some(img),
            Err(e) => {
                log_err!("Could not open {}: {}", path.display(), e);
                eprintln!("Could not open {}: {}", path.display(), e);
                None
            }
        }
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_title("Obscura"),
        ..Default::default()
    };

    eframe::run_native(
        "Obscura",
        options,
        Box::new(|cc| Box::new(ObscuraApp::new(cc, initial))),
    )
}
