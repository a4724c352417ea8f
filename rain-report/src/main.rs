fn main() {
    if let Err(err) = meteo_rain::app::run_report() {
        eprintln!("report failed: {err}");
        std::process::exit(1);
    }
}
