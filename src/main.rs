use clap::CommandFactory;
use colored::*;
use env_logger::{Builder, Env, Target};
use esfetch::error::{EsfetchError, Result as EsfetchResult};
use esfetch::list::{attach_versions, list_installations, print_listing};
use esfetch::{
    select_distributions, Cli, Commands, Config, FailurePolicy, HttpFetcher, InstallOutcome,
    Installer, Parser,
};
use log::info;
use std::fs;
use std::time::Instant;

fn main() -> EsfetchResult<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let start_time = Instant::now();
    let command = cli.action();
    info!("Application started with command: {command:?}");

    let config = Config::load(cli.config.as_deref())
        .map_err(|e| EsfetchError::Config(format!("{e:#}")))?;
    let root = config
        .resolve_root(cli.root.as_deref())
        .map_err(|e| EsfetchError::Config(format!("{e:#}")))?;

    match command {
        Commands::Install { names, fail_fast } => {
            let distributions = select_distributions(&config.distributions(), &names)?;
            let fetcher = HttpFetcher::new(&config.download.fetch_options())?;
            let installer = Installer::new(&root, fetcher)
                .executable(config.executable.as_str())
                .version_flag(config.version_flag.as_str());
            let policy = if fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Continue
            };

            let results = installer.install_all(&distributions, policy)?;

            let mut failures = 0;
            for (distribution, result) in &results {
                match result {
                    Ok(report) => {
                        println!("{}", report.path.display());
                        if let Some(query) = &report.version {
                            let output = query.output.trim_end();
                            if !output.is_empty() {
                                println!("{output}");
                            }
                        }
                        let outcome = match report.outcome {
                            InstallOutcome::Installed => report.outcome.to_string().green(),
                            InstallOutcome::AlreadyPresent => report.outcome.to_string().cyan(),
                            InstallOutcome::Pruned => report.outcome.to_string().yellow(),
                        };
                        println!("{}: {}", report.name.bold(), outcome);
                    }
                    Err(e) => {
                        failures += 1;
                        eprintln!("{}", format!("{}: {e}", distribution.name).red());
                    }
                }
            }

            let skipped = distributions.len() - results.len();
            if skipped > 0 {
                eprintln!(
                    "{}",
                    format!("Stopped early, {skipped} target(s) not attempted").yellow()
                );
            }

            info!(
                "Application finished. Total elapsed time: {:.2?}",
                start_time.elapsed()
            );
            if failures > 0 || skipped > 0 {
                std::process::exit(1);
            }
        }

        Commands::List { versions } => {
            let configured: Vec<String> = config
                .distributions()
                .into_iter()
                .map(|d| d.name)
                .collect();
            let mut entries = list_installations(&root, &config.executable, &configured)?;
            if versions {
                attach_versions(&mut entries, &config.executable, &config.version_flag);
            }
            print_listing(&root, &entries);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "esfetch", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn setup_logging(cli: &Cli) -> EsfetchResult<()> {
    let default_level = if cli.verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_level));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| EsfetchError::Other(e.to_string()))?;
    Ok(())
}
