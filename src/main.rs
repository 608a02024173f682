use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kll::{
    config::{CallScope, Language, Options},
    run_file,
};
use tracing_subscriber::{EnvFilter, fmt};

/// kll is a small scripting language with objects, pointers and first-class
/// functions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Language of error messages.
    #[arg(long, global = true, value_enum, default_value_t = Language::PtBr)]
    language: Language,

    /// How function calls bind their parameters.
    #[arg(long, global = true, value_enum, default_value_t = CallScope::Shared)]
    call_scope: CallScope,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Runs a program.
    Run {
        /// The program to run.
        #[arg(default_value = "main.kll")]
        file: PathBuf,
    },
    /// Runs a program, printing its parsed statements and its final value.
    DebugRun {
        /// The program to run.
        #[arg(default_value = "main.kll")]
        file: PathBuf,
    },
}

fn main() {
    let args = Args::parse();

    // RUST_LOG controls the level, warnings only by default
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter)
         .with_writer(std::io::stderr)
         .with_target(false)
         .init();

    let (file, debug) = match args.command {
        Command::Run { file } => (file, false),
        Command::DebugRun { file } => (file, true),
    };
    let options = Options { call_scope: args.call_scope,
                            language: args.language,
                            debug };

    if let Err(e) = run_file(&file, options) {
        eprintln!("Failed to read the input file '{}'. Perhaps this file does not exist? ({e})",
                  file.display());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_default_to_portuguese() {
        let args = Args::try_parse_from(["kll", "run"]).unwrap();
        assert_eq!(args.language, Language::PtBr);
        let args = Args::try_parse_from(["kll", "--language", "en", "run", "x.kll"]).unwrap();
        assert_eq!(args.language, Language::En);
    }
}
