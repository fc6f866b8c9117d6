use std::process::ExitCode;

fn main() -> ExitCode {
    okrbot_cli::run()
}
