use std::process::ExitCode;

fn main() -> ExitCode {
    docsort_lib::run()
}
