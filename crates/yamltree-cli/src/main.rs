use std::process::ExitCode;

fn main() -> ExitCode {
    yamltree_cli::run()
}
