use std::path::{Path, PathBuf};

use clap::Parser;
use owo_colors::OwoColorize;
use transpiler::transpile_with_path;

#[derive(Parser, Debug)]
#[command(author, version, about = "Translates a Pascal-like source file to C#-like output", long_about = None)]
struct CommandLine {
    #[arg(required = true, help = "Path to the source file")]
    source: String,
    #[arg(short, long, help = "Output path (defaults to the source path with a .cs extension)")]
    output: Option<String>,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,
}

fn default_output_path(source: &Path) -> PathBuf {
    source.with_extension("cs")
}

fn run(cli: &CommandLine) -> Result<(), transpiler::TranspileError> {
    let source_path = Path::new(&cli.source);
    let output_path = cli.output.clone().map(PathBuf::from).unwrap_or_else(|| default_output_path(source_path));

    let contents = std::fs::read_to_string(source_path).unwrap_or_else(|e| {
        eprintln!("{} failed to read {}: {e}", "error:".bright_red().bold(), source_path.display());
        std::process::exit(1);
    });

    let output = transpile_with_path(&contents, &cli.source)?;

    std::fs::write(&output_path, output).unwrap_or_else(|e| {
        eprintln!("{} failed to write {}: {e}", "error:".bright_red().bold(), output_path.display());
        std::process::exit(1);
    });
    log::debug!("wrote {}", output_path.display());
    Ok(())
}

fn main() {
    let cli = CommandLine::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();

    if let Err(error) = run(&cli) {
        eprintln!("{} {error}", "error:".bright_red().bold());
        std::process::exit(1);
    }
}
