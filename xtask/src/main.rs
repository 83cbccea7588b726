use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the RideOver workspace",
    long_about = "A unified CLI for launching the rider app, running the test\n\
                  suites, and CI checks in the RideOver workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the rider app
    Ui {
        /// Build without the remote identity client
        #[arg(long)]
        local_only: bool,
        /// Log at debug level for the workspace crates
        #[arg(long)]
        verbose: bool,
    },
    /// Run the workspace tests
    Test {
        /// Restrict to one package
        #[arg(long, short)]
        package: Option<String>,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests with default features
    Check,
    /// Clippy and tests with the remote identity client compiled out
    LocalOnly,
    /// Run check + local-only
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str], envs: &[(&str, &str)]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .envs(envs.iter().copied())
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    run_cargo_with_env(args, &[]);
}

fn run_cargo_with_env(args: &[&str], envs: &[(&str, &str)]) {
    let status = cargo(args, envs);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"]);

    step("Test rideover_core");
    run_cargo(&["test", "-p", "rideover_core"]);

    step("Test rideover_ui");
    run_cargo(&["test", "-p", "rideover_ui"]);
}

fn ci_local_only() {
    step("Clippy (no default features)");
    run_cargo(&[
        "clippy",
        "-p",
        "rideover_core",
        "-p",
        "rideover_ui",
        "--all-targets",
        "--no-default-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test without remote-identity");
    run_cargo(&[
        "test",
        "-p",
        "rideover_core",
        "-p",
        "rideover_ui",
        "--no-default-features",
    ]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ui {
            local_only,
            verbose,
        } => {
            let mut args = vec!["run", "-p", "rideover_ui"];
            if local_only {
                args.push("--no-default-features");
            }
            let envs: &[(&str, &str)] = if verbose {
                &[("RIDEOVER_LOG_VERBOSE", "1")]
            } else {
                &[]
            };
            run_cargo_with_env(&args, envs);
        }
        Commands::Test { package } => match package {
            Some(package) => run_cargo(&["test", "-p", &package]),
            None => run_cargo(&["test", "--workspace"]),
        },
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::LocalOnly => ci_local_only(),
                CiJob::All => {
                    ci_check();
                    ci_local_only();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
