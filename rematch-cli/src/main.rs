use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rematch::{
    CaptureRef, CaptureValue, CompileOptions, Error, Executor, MatchOptions, MatchResult, Offload,
    Pattern, ReplaceOptions, RuntimeConfig, Shape, Target, Term, ValueSpec,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rematch")]
#[command(about = "Rematch - compile, match and replace with configurable capture reporting")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Where work runs (overrides REMATCH_OFFLOAD)
    #[arg(long, global = true)]
    offload: Option<Offload>,

    /// Worker pool size (overrides REMATCH_WORKERS)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a pattern and describe its groups
    Compile {
        /// The pattern
        pattern: String,
        /// Match without regard to case
        #[arg(short = 'i', long)]
        caseless: bool,
        /// Memory budget for the compiled program, in bytes
        #[arg(long)]
        max_mem: Option<i64>,
    },
    /// Match a pattern against a subject
    Match {
        /// The pattern
        pattern: String,
        /// The subject
        subject: String,
        /// Match without regard to case
        #[arg(short = 'i', long)]
        caseless: bool,
        /// Byte offset at which the search starts
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i64,
        /// Which captures to report
        #[arg(short, long, value_enum, default_value_t = CaptureArg::All)]
        capture: CaptureArg,
        /// Explicit group references (ordinals or names); overrides --capture
        #[arg(long, value_delimiter = ',')]
        refs: Vec<String>,
        /// Report offsets and lengths instead of captured text
        #[arg(long)]
        index: bool,
        /// Compile the pattern first and match with the handle
        #[arg(long)]
        precompile: bool,
    },
    /// Replace matches of a pattern
    Replace {
        /// The pattern
        pattern: String,
        /// The subject
        subject: String,
        /// Replacement template (\0-\9, \g{N}, \g{name}, \\)
        template: String,
        /// Replace every match instead of the first
        #[arg(short, long)]
        global: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CaptureArg {
    All,
    AllButFirst,
    First,
    None,
}

impl From<CaptureArg> for ValueSpec {
    fn from(arg: CaptureArg) -> Self {
        match arg {
            CaptureArg::All => ValueSpec::All,
            CaptureArg::AllButFirst => ValueSpec::AllButFirst,
            CaptureArg::First => ValueSpec::First,
            CaptureArg::None => ValueSpec::None,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = RuntimeConfig::from_env();
    if let Some(offload) = cli.offload {
        config.offload = offload;
    }
    if cli.workers.is_some() {
        config.workers = cli.workers;
    }
    let executor = Executor::from_config(&config);
    tracing::debug!(offloaded = executor.is_offloaded(), workers = executor.workers(), "executor ready");

    match cli.command {
        Commands::Compile {
            pattern,
            caseless,
            max_mem,
        } => cmd_compile(&executor, &pattern, compile_options(caseless, max_mem)),
        Commands::Match {
            pattern,
            subject,
            caseless,
            offset,
            capture,
            refs,
            index,
            precompile,
        } => {
            let spec = if refs.is_empty() {
                capture.into()
            } else {
                ValueSpec::List(refs.iter().map(|r| parse_ref(r)).collect())
            };
            let shape = if index { Shape::Index } else { Shape::Binary };
            let mut options = MatchOptions::new().offset(offset).capture_as(spec, shape);
            if precompile {
                let compiled = match compile_or_report(&executor, &pattern, compile_options(caseless, None)) {
                    Some(compiled) => compiled,
                    None => return ExitCode::from(2),
                };
                cmd_match(&executor, &subject, Target::Handle(&compiled), &options)
            } else {
                options.caseless = caseless;
                cmd_match(&executor, &subject, Target::Inline(pattern.as_bytes()), &options)
            }
        }
        Commands::Replace {
            pattern,
            subject,
            template,
            global,
        } => {
            let options = if global {
                ReplaceOptions::new().global()
            } else {
                ReplaceOptions::new()
            };
            cmd_replace(&executor, &pattern, &subject, &template, &options)
        }
    }
}

fn compile_options(caseless: bool, max_mem: Option<i64>) -> CompileOptions {
    let mut options = CompileOptions::new();
    if caseless {
        options = options.caseless();
    }
    if let Some(budget) = max_mem {
        options = options.max_mem(budget);
    }
    options
}

/// Integers go through the same decoding as host integers, so `0` and
/// negative ordinals are reported as bad references after a match.
fn parse_ref(raw: &str) -> CaptureRef {
    match raw.trim().parse::<i64>() {
        Ok(n) => CaptureRef::from_term(&Term::Int(n)),
        Err(_) => CaptureRef::Name(raw.trim().to_string()),
    }
}

fn report(err: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);
}

fn compile_or_report(executor: &Executor, pattern: &str, options: CompileOptions) -> Option<Pattern> {
    executor
        .run(|| rematch::compile(pattern.as_bytes(), &options))
        .inspect_err(report)
        .ok()
}

fn cmd_compile(executor: &Executor, pattern: &str, options: CompileOptions) -> ExitCode {
    let Some(compiled) = compile_or_report(executor, pattern, options) else {
        return ExitCode::from(2);
    };

    println!("{}", "✓ Compiled".green().bold());
    println!("  Pattern: {}", compiled.as_str().cyan());
    println!("  Groups:  {}", compiled.group_count());
    for group in compiled.groups().groups() {
        match &group.name {
            Some(name) => println!("    {} {}", format!("[{}]", group.index).dimmed(), name.yellow()),
            None => println!("    {}", format!("[{}]", group.index).dimmed()),
        }
    }
    ExitCode::SUCCESS
}

fn render(value: &CaptureValue) -> String {
    match value {
        CaptureValue::Index { offset, length } => format!("{offset}..{}", offset + length),
        CaptureValue::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn cmd_match(executor: &Executor, subject: &str, target: Target<'_>, options: &MatchOptions) -> ExitCode {
    match executor.run(|| rematch::run_match(subject.as_bytes(), target, options)) {
        Ok(MatchResult::NoMatch) => {
            println!("{}", "✗ No match".red());
            ExitCode::FAILURE
        }
        Ok(MatchResult::Matched) => {
            println!("{}", "✓ Match".green().bold());
            ExitCode::SUCCESS
        }
        Ok(MatchResult::Captures(values)) => {
            println!("{}", "✓ Match".green().bold());
            for (i, value) in values.iter().enumerate() {
                if value.is_unmatched() {
                    println!("  [{i}] {}", "<unmatched>".dimmed());
                } else {
                    println!("  [{i}] {}", render(value).green());
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(&e);
            ExitCode::from(2)
        }
    }
}

fn cmd_replace(
    executor: &Executor,
    pattern: &str,
    subject: &str,
    template: &str,
    options: &ReplaceOptions,
) -> ExitCode {
    let result = executor.run(|| {
        rematch::replace(
            subject.as_bytes(),
            pattern.into(),
            template.as_bytes(),
            options,
        )
    });
    match result {
        Ok(out) => {
            println!("{}", String::from_utf8_lossy(&out));
            ExitCode::SUCCESS
        }
        Err(Error::NotReplaced) => {
            println!("{}", "✗ Nothing replaced".red());
            ExitCode::FAILURE
        }
        Err(e) => {
            report(&e);
            ExitCode::from(2)
        }
    }
}
