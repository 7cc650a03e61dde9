use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use codkus::{
    AppError, ExecSource, FixOptions, FixSource, FixVariant, GenerateOptions, ModelId, Settings,
    SolveOptions,
};

#[derive(Parser)]
#[command(name = "codkus")]
#[command(version)]
#[command(
    about = "Generate Python code and test cases with AI assistance",
    long_about = None
)]
struct Cli {
    /// Path to a codkus.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code and test cases for a task
    #[clap(visible_alias = "g")]
    Generate {
        /// Model for the generation stages
        #[arg(short, long, default_value = ModelId::default().as_str(), value_parser = parse_model)]
        model: ModelId,
        /// Execute the generated code and tests right away
        #[arg(long)]
        execute: bool,
        /// Export fixed_code.py and full_code.py into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Confirm the export without prompting
        #[arg(short = 'y', long)]
        yes: bool,
        /// Task description
        #[arg(trailing_var_arg = true, required = true)]
        task: Vec<String>,
    },
    /// Generate, run, and fix until the tests pass
    #[clap(visible_alias = "s")]
    Solve {
        /// Model for generation and fix stages
        #[arg(short, long, default_value = ModelId::default().as_str(), value_parser = parse_model)]
        model: ModelId,
        /// Fix only the code, leaving tests untouched
        #[arg(long)]
        code_only: bool,
        /// Override the fix-cycle budget
        #[arg(long)]
        max_fix_attempts: Option<u32>,
        /// Export fixed_code.py and full_code.py into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Confirm the export without prompting
        #[arg(short = 'y', long)]
        yes: bool,
        /// Task description
        #[arg(trailing_var_arg = true, required = true)]
        task: Vec<String>,
    },
    /// Run an existing code/tests pair and print the report
    #[clap(visible_alias = "x")]
    Exec {
        /// Code file (requires --tests)
        #[arg(long, requires = "tests")]
        code: Option<PathBuf>,
        /// Test file (requires --code)
        #[arg(long, requires = "code")]
        tests: Option<PathBuf>,
        /// Single FullCode file: code, blank line, tests
        #[arg(long, conflicts_with_all = ["code", "tests"])]
        full: Option<PathBuf>,
    },
    /// Run one fix cycle for existing artifacts
    #[clap(visible_alias = "f")]
    Fix {
        /// Model for the fix stage
        #[arg(short, long, default_value = ModelId::default().as_str(), value_parser = parse_model)]
        model: ModelId,
        /// Code file (requires --tests)
        #[arg(long, requires = "tests")]
        code: Option<PathBuf>,
        /// Test file (requires --code)
        #[arg(long, requires = "code")]
        tests: Option<PathBuf>,
        /// Single FullCode file: code, blank line, tests
        #[arg(long, conflicts_with_all = ["code", "tests"])]
        full: Option<PathBuf>,
        /// Error message, or @path to read it from a file
        #[arg(short, long)]
        error: String,
        /// Fix only the code, leaving tests untouched
        #[arg(long)]
        code_only: bool,
        /// Export fixed_code.py and full_code.py into this directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Confirm the export without prompting
        #[arg(short = 'y', long)]
        yes: bool,
        /// Task description
        #[arg(trailing_var_arg = true, required = true)]
        task: Vec<String>,
    },
    /// List supported models
    Models,
}

fn parse_model(value: &str) -> Result<ModelId, AppError> {
    ModelId::from_str(value)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate { model, execute, out_dir, yes, task } => {
            let options = GenerateOptions { model, execute };
            codkus::generate(settings, &task.join(" "), &options, out_dir.as_deref(), yes)
                .map(|_| ())
        }
        Commands::Solve { model, code_only, max_fix_attempts, out_dir, yes, task } => {
            let mut settings = settings;
            if let Some(max) = max_fix_attempts {
                settings.fix.max_attempts = max;
            }
            let options = SolveOptions { model, variant: variant_for(code_only) };
            codkus::solve(settings, &task.join(" "), &options, out_dir.as_deref(), yes)
                .map(|_| ())
        }
        Commands::Exec { code, tests, full } => {
            let source = exec_source(code, tests, full)?;
            codkus::exec(settings, &source).map(|_| ())
        }
        Commands::Fix { model, code, tests, full, error, code_only, out_dir, yes, task } => {
            let source = fix_source(code, tests, full)?;
            let options = FixOptions { model, variant: variant_for(code_only) };
            codkus::fix(
                settings,
                &task.join(" "),
                &source,
                &error,
                &options,
                out_dir.as_deref(),
                yes,
            )
            .map(|_| ())
        }
        Commands::Models => {
            codkus::models();
            Ok(())
        }
    }
}

fn variant_for(code_only: bool) -> FixVariant {
    if code_only { FixVariant::CodeOnly } else { FixVariant::Joint }
}

fn exec_source(
    code: Option<PathBuf>,
    tests: Option<PathBuf>,
    full: Option<PathBuf>,
) -> Result<ExecSource, AppError> {
    match (code, tests, full) {
        (Some(code), Some(tests), None) => Ok(ExecSource::Pair { code, tests }),
        (None, None, Some(full)) => Ok(ExecSource::Full(full)),
        _ => Err(AppError::config_error("Provide --code together with --tests, or --full")),
    }
}

fn fix_source(
    code: Option<PathBuf>,
    tests: Option<PathBuf>,
    full: Option<PathBuf>,
) -> Result<FixSource, AppError> {
    match (code, tests, full) {
        (Some(code), Some(tests), None) => Ok(FixSource::Pair { code, tests }),
        (None, None, Some(full)) => Ok(FixSource::Full(full)),
        _ => Err(AppError::config_error("Provide --code together with --tests, or --full")),
    }
}
