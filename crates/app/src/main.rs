use std::process;

mod headless;
mod logging;
mod resample;
mod roi;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    logging::setup_tracing(logging::level_from_args(&args));

    tracing::info!("surfvol starting");

    if let Err(err) = headless::run(&args) {
        eprintln!("surfvol error: {err}");
        process::exit(1);
    }
}
