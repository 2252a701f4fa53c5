//! Binary entrypoint for the Strudel validation worker.

use std::io::{self, Write};
use std::process::ExitCode;

use strudel_transpiler::StrudelTranspiler;
use strudel_validator::{Config, serve, telemetry};

fn main() -> ExitCode {
    let config = Config::default();
    if let Err(error) = telemetry::initialise(&config) {
        writeln!(io::stderr().lock(), "{error}").ok();
    }

    let stdin = io::stdin();
    let stdout = io::stdout();

    match serve(StrudelTranspiler::load, stdin.lock(), stdout.lock()) {
        Ok(shutdown) => shutdown.exit_code(),
        Err(error) => {
            writeln!(io::stderr().lock(), "{error}").ok();
            ExitCode::FAILURE
        }
    }
}
