//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "ft",
    about = "Field service management API server",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1", env = "FT_HOST")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value_t = 3000, env = "FT_PORT")]
        port: u16,

        /// Directory uploaded photos are stored in and served from
        #[arg(long, default_value = "uploads", env = "FT_UPLOADS_DIR")]
        uploads_dir: PathBuf,

        /// Populate the store with demo data on startup
        #[arg(long)]
        seed: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["ft", "serve"]).unwrap();
        let Command::Serve {
            host,
            port,
            uploads_dir,
            seed,
        } = cli.command;
        assert_eq!(host, "127.0.0.1");
        assert_eq!(port, 3000);
        assert_eq!(uploads_dir, PathBuf::from("uploads"));
        assert!(!seed);
    }

    #[test]
    fn test_serve_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "ft", "serve", "--host", "0.0.0.0", "--port", "8080", "--seed",
        ])
        .unwrap();
        let Command::Serve {
            host, port, seed, ..
        } = cli.command;
        assert_eq!(host, "0.0.0.0");
        assert_eq!(port, 8080);
        assert!(seed);
    }

    #[test]
    fn test_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["ft"]).is_err());
    }
}
