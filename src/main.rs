use std::process::ExitCode;

fn main() -> ExitCode {
    match review_analyzer_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
