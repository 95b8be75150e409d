
#[macro_use]
extern crate tracing;

use map_compiler::{
    logging::init_logging,
    settings::{Settings, SETTINGS_FILE_NAME},
    compile::{compile_file, check_file},
};
use std::{
    env::args,
    path::Path,
    process::ExitCode,
};
use anyhow::*;


const CLI_INTRO: &'static str = "mapc, the map document compiler.";

const CLI_HELP: &'static str = r#"
Examples:

    [this command] --compile maps/harbor.json maps/cliffs.json
    Compile each document into a .dlb artifact next to it.

    [this command] --check maps/harbor.json --compile maps/cliffs.json
    Check the first document without writing anything, compile the second.

Each file is handled on its own. The exit status is non-zero if any failed.

Settings are read from mapc.json in the working directory if present.

Env var examples:
    RUST_LOG=map_geom=trace
    Changes logging levels"#;


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mode {
    Compile,
    Check,
}

fn main() -> ExitCode {
    init_logging();

    let args = args().skip(1).collect::<Vec<_>>();
    if args.is_empty() || args.iter().any(|arg| arg == "--help") {
        println!("{}", CLI_INTRO);
        println!("{}", CLI_HELP);
        return ExitCode::SUCCESS;
    }

    let settings = Settings::read(SETTINGS_FILE_NAME);
    debug!(?settings, "loaded settings");

    let mut mode = Mode::Compile;
    let mut processed = 0;
    let mut failed = 0;
    for arg in &args {
        match arg.as_str() {
            "--compile" => mode = Mode::Compile,
            "--check" => mode = Mode::Check,
            _ => {
                processed += 1;
                if let Err(e) = process(mode, Path::new(arg), &settings) {
                    error!("{:#}", e);
                    failed += 1;
                }
            }
        }
    }

    if failed > 0 {
        error!("{} of {} file(s) failed", failed, processed);
        ExitCode::FAILURE
    } else {
        info!("{} file(s) done", processed);
        ExitCode::SUCCESS
    }
}

fn process(mode: Mode, path: &Path, settings: &Settings) -> Result<()> {
    match mode {
        Mode::Compile => {
            compile_file(path, settings)
                .with_context(|| format!("compiling {}", path.display()))?;
        }
        Mode::Check => {
            let journal = check_file(path, settings)
                .with_context(|| format!("checking {}", path.display()))?;
            let (report, count) = journal.render(settings.report_threshold);
            if count > 0 {
                println!("{}", report);
            }
            info!(path = %path.display(), "document is valid");
        }
    }
    Ok(())
}
