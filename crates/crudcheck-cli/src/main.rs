//! crudcheck CLI - Contract checks for CRUD-style REST resources

mod storage;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crudcheck_core::plan::build_plan;
use crudcheck_core::verdict::{EXIT_CONFIG, EXIT_FAIL, EXIT_PASS, EXIT_TOOL};
use crudcheck_core::{CaseStatus, Config, RunReport, TestRegistry, VerdictPolicy, to_http_file};
use crudcheck_runner::{RunError, Runner};

#[derive(Parser)]
#[command(name = "crudcheck")]
#[command(about = "Contract checks for CRUD-style REST resources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Strict mode (known defects fail the run)
    #[arg(long, global = true)]
    strict: bool,

    /// Verbose output (debug logs on stderr unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: .crudcheck.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured base URL
    #[arg(long, global = true, env = "CRUDCHECK_BASE_URL")]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the contract suite
    Run {
        /// Directory for the reproductions file
        #[arg(short = 'd', long, default_value = ".crudcheck")]
        output_dir: PathBuf,
    },

    /// Show execution order and config checks without sending requests
    Plan,

    /// List registered cases
    List,

    /// Initialize config file
    Init,

    /// Export JSON Schema for the run report
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(u8::try_from(EXIT_TOOL).unwrap_or(3))
        }
    }
}

/// `RUST_LOG` wins; otherwise `-v` selects debug and the default is warn.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut cfg = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    if let Some(url) = &cli.base_url {
        cfg.base_url.clone_from(url);
    }
    tracing::debug!(
        base_url = %cfg.base_url,
        extra_cases = cfg.cases.len(),
        builtin_suite = cfg.builtin_suite,
        "config loaded"
    );
    Ok(cfg)
}

/// Registry errors are configuration errors, reported with exit code 2.
fn load_registry(cfg: &Config) -> Option<TestRegistry> {
    match cfg.registry() {
        Ok(registry) => Some(registry),
        Err(e) => {
            eprintln!("Error: invalid case configuration: {e}");
            None
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Run { output_dir } => run_suite(&cli, output_dir),

        Commands::Plan => {
            let cfg = load_config(&cli)?;
            let Some(registry) = load_registry(&cfg) else {
                return Ok(EXIT_CONFIG);
            };
            let plan = match build_plan(&cfg, &registry) {
                Ok(plan) => plan,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return Ok(EXIT_CONFIG);
                }
            };
            match cli.output {
                OutputFormat::Terminal => println!("{}", plan.to_terminal()),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
                OutputFormat::Silent => {}
            }
            Ok(if plan.has_errors() {
                EXIT_CONFIG
            } else {
                EXIT_PASS
            })
        }

        Commands::List => {
            let cfg = load_config(&cli)?;
            let Some(registry) = load_registry(&cfg) else {
                return Ok(EXIT_CONFIG);
            };
            match cli.output {
                OutputFormat::Terminal => {
                    for case in registry.cases() {
                        let mut tags = Vec::new();
                        if case.uses_mock_predecessor() {
                            tags.push("mock");
                        }
                        if case.known_defect.is_some() {
                            tags.push("known-defect");
                        }
                        let tags = if tags.is_empty() {
                            String::new()
                        } else {
                            format!(" [{}]", tags.join(", "))
                        };
                        println!(
                            "{:<40} {:<16} -> {}{tags}",
                            case.id,
                            case.label(),
                            case.expect.status,
                        );
                    }
                    println!("\n{} cases", registry.len());
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(registry.cases())?);
                }
                OutputFormat::Silent => {}
            }
            Ok(EXIT_PASS)
        }

        Commands::Init => {
            let config_path = ".crudcheck.toml";
            if Path::new(config_path).exists() {
                eprintln!("{config_path} already exists");
                return Ok(EXIT_FAIL);
            }

            std::fs::write(config_path, Config::example())
                .with_context(|| format!("cannot write {config_path}"))?;
            println!("Created {config_path}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: resource to test");
            println!("  - headers: auth tokens, API keys");
            println!("  - cases: extra cases run after the built-in suite");
            Ok(EXIT_PASS)
        }

        Commands::Schema => {
            let schema = crudcheck_core::schema::generate_schema();
            println!("{schema}");
            Ok(EXIT_PASS)
        }
    }
}

fn run_suite(cli: &Cli, output_dir: &Path) -> Result<i32> {
    let cfg = load_config(cli)?;
    let Some(registry) = load_registry(&cfg) else {
        return Ok(EXIT_CONFIG);
    };

    if cli.output != OutputFormat::Silent {
        eprintln!("Config:");
        eprintln!("  base_url: {}", cfg.base_url);
        if !cfg.headers.is_empty() {
            eprintln!("  headers:  {} configured", cfg.headers.len());
        }
        eprintln!("  cases:    {}", registry.len());
        if cli.strict {
            eprintln!("  strict:   known defects fail the run");
        }
        eprintln!();
    }

    let policy = if cli.strict {
        VerdictPolicy::strict()
    } else {
        VerdictPolicy::default()
    };
    let runner = Runner::from_config(&cfg)?.with_policy(policy);

    let start = Instant::now();
    let report = match runner.run(&registry) {
        Ok(report) => report,
        Err(RunError::Schedule(e)) => {
            eprintln!("Error: {e}");
            return Ok(EXIT_CONFIG);
        }
    };
    let duration_secs = start.elapsed().as_secs_f64();

    match cli.output {
        OutputFormat::Terminal => {
            print_report(&report);

            if report.failures().next().is_some() {
                let http_path = output_dir.join("reproductions.http");
                let written = std::fs::create_dir_all(output_dir)
                    .and_then(|()| std::fs::write(&http_path, to_http_file(report.failures())));
                match written {
                    Ok(()) => println!("Reproductions: {}", http_path.display()),
                    Err(e) => eprintln!("Warning: failed to write .http file: {e}"),
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Silent => {}
    }

    // Persist report to ~/.crudcheck/reports/
    let data = storage::ReportData {
        config: &cfg,
        report: &report,
        strict: cli.strict,
        duration_secs,
    };
    match storage::save_report(&data) {
        Ok(path) => {
            if cli.output != OutputFormat::Silent {
                eprintln!("Report saved: {}", path.display());
            }
        }
        Err(e) => eprintln!("Warning: failed to save report: {e}"),
    }

    Ok(report.verdict.exit_code)
}

fn print_report(report: &RunReport) {
    for r in &report.results {
        let icon = match r.status {
            CaseStatus::Passed => "ok",
            CaseStatus::Failed => "FAIL",
            CaseStatus::Skipped => "skip",
            CaseStatus::KnownDefect => "known",
            CaseStatus::NotRun => "--",
        };
        let used_mock = if r.used_mock { " [mock]" } else { "" };
        println!("  [{icon:>5}] {} {}{used_mock}", r.case_id, r.operation);
        if let Some(reason) = r.failure_reason() {
            println!("          {reason}");
        }
    }

    let s = &report.summary;
    println!("\n{}: {}", report.verdict.status, report.verdict.reason);
    println!(
        "  Cases: {} total, {} passed, {} failed, {} skipped, {} known defects",
        s.total, s.passed, s.failed, s.skipped, s.known_defects
    );
    println!("  Exit code: {}", report.verdict.exit_code);
}
