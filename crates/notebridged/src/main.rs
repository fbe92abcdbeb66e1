use std::process::ExitCode;

fn main() -> ExitCode {
    match notebridged::run_bridge() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("notebridged: {error}");
            ExitCode::FAILURE
        }
    }
}
