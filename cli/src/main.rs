//! Binary entrypoint for glyphlens (made by FontLab https://www.fontlab.com/)

fn main() {
    if let Err(err) = glyphlens_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
