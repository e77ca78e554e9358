#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = windplay_cli::run_from_env() {
        eprintln!("windplay: {error}");
        std::process::exit(error.exit_code());
    }
}
