use clap::Parser;
use tickbars::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
