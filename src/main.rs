use std::process::ExitCode;

fn main() -> ExitCode {
    match formula_audit::run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
