use std::process::ExitCode;

fn main() -> ExitCode {
    hilight_cli::run()
}
