use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use domain_name_query_types::{Name, NameError};
use serde::Deserialize;
use thiserror::Error;

/// Environment overrides look like `BLACKHOLE_LISTENER__PORT=5353`.
pub const ENV_PREFIX: &str = "BLACKHOLE";

pub fn get_config<'de, T: Deserialize<'de>>(config_path: PathBuf) -> Result<T, config::ConfigError> {
    let f = config::File::from(config_path).required(false);
    let config = config::Config::builder()
        .add_source(f)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    config.try_deserialize::<T>()
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid {field}: {source}")]
    InvalidName {
        field: &'static str,
        #[source]
        source: NameError,
    },

    #[error("base_domain must not be the root zone")]
    RootBaseDomain,

    #[error("server_name '{server_name}' is not within base_domain '{base_domain}'")]
    ServerNameOutsideZone {
        server_name: String,
        base_domain: String,
    },

    #[error("serial_revision must be between 0 and 99, got {0}")]
    SerialRevision(u8),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlackholeConfiguration {
    pub listener: ListenerConfiguration,
    pub zone: ZoneConfiguration,
    pub log: LogConfiguration,
}

impl BlackholeConfiguration {
    /// Reads the TOML file (a missing file means all defaults) and applies
    /// environment overrides.
    pub fn load(config_path: PathBuf) -> Result<Self, ConfigurationError> {
        Ok(get_config(config_path)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfiguration {
    pub address: IpAddr,
    pub port: u16,
    pub tcp: bool,
    pub udp: bool,
    pub tcp_idle_timeout_secs: u64,
}

impl ListenerConfiguration {
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.address, self.port)
    }

    pub fn tcp_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.tcp_idle_timeout_secs)
    }
}

impl Default for ListenerConfiguration {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 53,
            tcp: true,
            udp: true,
            tcp_idle_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfiguration {
    /// Filter directive, `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Also write the log to files in this directory. Stdout only when unset.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    pub rotation: LogRotation,
}

impl LogConfiguration {
    pub fn file_enabled(&self) -> bool {
        self.directory.is_some()
    }
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            directory: None,
            file_prefix: String::from("blackhole_dns.log"),
            rotation: LogRotation::Daily,
        }
    }
}

/// Zone settings as written in the file. [`ZoneConfiguration::validate`]
/// turns them into a [`Zone`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoneConfiguration {
    pub server_ip: IpAddr,
    pub server_name: String,
    pub base_domain: String,
    pub dns_ttl: u32,
    /// Local part of the responsible mailbox, `hostmaster` gives
    /// `hostmaster.<base_domain>`.
    pub hostmaster: String,
    pub serial_revision: u8,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
    /// Answer SOA/NS only for names inside `base_domain`.
    pub enforce_zone: bool,
}

impl Default for ZoneConfiguration {
    fn default() -> Self {
        Self {
            server_ip: IpAddr::V4(Ipv4Addr::new(54, 205, 13, 200)),
            server_name: String::from("blackhole.romulan.zone"),
            base_domain: String::from("romulan.zone"),
            dns_ttl: 60,
            hostmaster: String::from("hostmaster"),
            serial_revision: 0,
            refresh: 7200,
            retry: 900,
            expire: 1209600,
            minimum: 86400,
            enforce_zone: false,
        }
    }
}

/// Validated, immutable zone settings shared by the record builder and
/// the responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub server_ip: IpAddr,
    pub server_name: Name,
    pub base_domain: Name,
    pub rname: Name,
    pub dns_ttl: u32,
    pub serial_revision: u8,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
    pub enforce_zone: bool,
}

impl ZoneConfiguration {
    pub fn validate(&self) -> Result<Zone, ConfigurationError> {
        let base_domain = Name::from_ascii(&self.base_domain).map_err(invalid_name("base_domain"))?;
        if base_domain.is_root() {
            return Err(ConfigurationError::RootBaseDomain);
        }

        let server_name = Name::from_ascii(&self.server_name).map_err(invalid_name("server_name"))?;
        if !server_name.is_subdomain_of(&base_domain) {
            return Err(ConfigurationError::ServerNameOutsideZone {
                server_name: server_name.to_string(),
                base_domain: base_domain.to_string(),
            });
        }

        let rname = base_domain
            .prepend_label(self.hostmaster.as_bytes())
            .map_err(invalid_name("hostmaster"))?;

        if self.serial_revision > 99 {
            return Err(ConfigurationError::SerialRevision(self.serial_revision));
        }

        let zone = Zone {
            server_ip: self.server_ip,
            server_name,
            base_domain,
            rname,
            dns_ttl: self.dns_ttl,
            serial_revision: self.serial_revision,
            refresh: self.refresh,
            retry: self.retry,
            expire: self.expire,
            minimum: self.minimum,
            enforce_zone: self.enforce_zone,
        };

        Ok(zone)
    }
}

fn invalid_name(field: &'static str) -> impl FnOnce(NameError) -> ConfigurationError {
    move |source| ConfigurationError::InvalidName { field, source }
}
