fn main() {
    if let Err(err) = meteo_rain::app::run_api() {
        eprintln!("api startup failed: {err}");
        std::process::exit(1);
    }
}
