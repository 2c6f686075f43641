use std::process::ExitCode;

fn main() -> ExitCode {
    archmark::cli::run()
}
