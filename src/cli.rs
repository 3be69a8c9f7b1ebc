//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fennica static site generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Content directory path (relative to project root)
    #[arg(short, long)]
    pub content: Option<PathBuf>,

    /// Config file name (default: fennica.toml)
    #[arg(short = 'C', long, default_value = "fennica.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Shared arguments for Generate and Dev commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Include items marked `draft: true`
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub drafts: Option<bool>,

    /// Minify the html content
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub minify: Option<bool>,

    /// Regenerate image variants even when they already exist
    #[arg(long)]
    pub force_images: bool,

    /// Override base URL used for absolute links in the RSS feeds.
    #[arg(long = "base-url")]
    pub base_url: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write every page, JSON snapshot and feed into the output directory, then exit
    Generate {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Serve pages rendered on demand and reload content as files change
    Dev {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long)]
        port: Option<u16>,

        /// enable watch
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

impl Cli {
    pub fn build_args(&self) -> &BuildArgs {
        match &self.command {
            Commands::Generate { build_args } | Commands::Dev { build_args, .. } => build_args,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from(["fennica", "-c", "src", "generate", "--drafts"]);
        assert!(matches!(cli.command, Commands::Generate { .. }));
        assert_eq!(cli.content, Some(PathBuf::from("src")));
        assert_eq!(cli.build_args().drafts, Some(true));
        assert_eq!(cli.config, PathBuf::from("fennica.toml"));
    }

    #[test]
    fn test_parse_dev_with_port() {
        let cli = Cli::parse_from(["fennica", "dev", "--port", "9000", "--watch", "false"]);
        match cli.command {
            Commands::Dev { port, watch, .. } => {
                assert_eq!(port, Some(9000));
                assert_eq!(watch, Some(false));
            }
            Commands::Generate { .. } => panic!("expected dev"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["fennica"]).is_err());
    }
}
