use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "prism")]
#[command(about = "Spinning primitive viewer with a remote transform relay")]
#[command(version)]
pub struct Args {
    /// Scene file (defaults to ./prism.toml when present)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Start with spin off, as if the desktop asked for reduced motion
    #[arg(long)]
    pub reduced_motion: bool,

    /// Wait for a relay peer on ADDR
    #[arg(long, value_name = "ADDR", conflicts_with = "relay_connect")]
    pub relay_listen: Option<String>,

    /// Connect to a relay peer at ADDR
    #[arg(long, value_name = "ADDR")]
    pub relay_connect: Option<String>,

    /// Log filter in env_logger syntax, e.g. "debug" or "prism_runtime=debug"
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags() {
        let args = Args::try_parse_from(["prism"]).unwrap();
        assert!(args.config.is_none());
        assert!(!args.reduced_motion);
        assert!(args.log.is_none());
    }

    #[test]
    fn relay_modes_are_exclusive() {
        let res = Args::try_parse_from([
            "prism",
            "--relay-listen",
            "127.0.0.1:1",
            "--relay-connect",
            "127.0.0.1:2",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn config_path_and_log_filter() {
        let args =
            Args::try_parse_from(["prism", "-c", "scenes/demo.toml", "--log", "prism_runtime=debug"])
                .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("scenes/demo.toml")));
        assert_eq!(args.log.as_deref(), Some("prism_runtime=debug"));
    }
}
