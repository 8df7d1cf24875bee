//! Entry point for the basket engine command-line tooling.
#![forbid(unsafe_code)]

fn main() {
    env_logger::init();
    if let Err(err) = basket_cli::run() {
        eprintln!("basket: {err:#}");
        std::process::exit(1);
    }
}
