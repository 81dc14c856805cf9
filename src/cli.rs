use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Installation root (defaults to `$HOME/es`)
    #[clap(long, value_parser, global = true)]
    pub root: Option<PathBuf>,

    /// Config file to use instead of the default search locations
    #[clap(long, value_parser, global = true)]
    pub config: Option<PathBuf>,

    #[clap(long, value_parser, default_value_t = false, global = true)]
    pub verbose: bool,

    #[clap(long, value_parser, global = true)]
    pub log: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Download and extract every configured version that is not yet installed
    Install {
        /// Only install these target names
        names: Vec<String>,

        /// Stop at the first download or extraction failure
        #[clap(long, value_parser, default_value_t = false)]
        fail_fast: bool,
    },
    /// Show what is installed under the root
    List {
        /// Run each executable to report its version
        #[clap(long, value_parser, default_value_t = false)]
        versions: bool,
    },
    /// Generate shell completions
    Completions {
        #[clap(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// The chosen subcommand, defaulting to installing everything.
    pub fn action(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Install {
            names: Vec::new(),
            fail_fast: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_install_everything() {
        let cli = Cli::parse_from(["esfetch"]);
        assert!(matches!(
            cli.action(),
            Commands::Install { ref names, fail_fast: false } if names.is_empty()
        ));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "esfetch",
            "install",
            "elasticsearch-7.10",
            "--fail-fast",
            "--root",
            "/tmp/es",
        ]);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/es")));
        match cli.action() {
            Commands::Install { names, fail_fast } => {
                assert_eq!(names, vec!["elasticsearch-7.10"]);
                assert!(fail_fast);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
