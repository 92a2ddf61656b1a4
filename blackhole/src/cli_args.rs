use std::path::PathBuf;
use argh::FromArgs;

fn default_config_path() -> PathBuf {
    PathBuf::from("./blackhole.toml")
}

#[derive(Debug, FromArgs)]
#[argh(description = "authoritative DNS responder: SOA and NS for one zone, NXDOMAIN for everything else")]
pub struct CliArgs {
    #[argh(
        option,
        description = "config file path, default: './blackhole.toml'",
        default = "default_config_path()"
    )]
    pub config: PathBuf,
}
