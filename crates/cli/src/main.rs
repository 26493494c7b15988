use std::process::ExitCode;

fn main() -> ExitCode {
    glidedesk_cli::run()
}
