mod app;
mod case;
mod util;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON case file to load; the built-in sample case is used when omitted.
    #[arg(long)]
    case_file: Option<String>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "caseviz",
        options,
        Box::new(move |cc| Ok(Box::new(app::CasevizApp::new(cc, args.case_file.clone())))),
    )
}
