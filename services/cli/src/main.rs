fn main() {
    if let Err(err) = scorecard_cli::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
