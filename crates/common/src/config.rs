use std::{net::SocketAddr, path::PathBuf};

use byte_unit::n_mib_bytes;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

#[cfg(feature = "logging")]
use tracing_subscriber::filter::LevelFilter;

/// Database configuration.
#[derive(Deserialize)]
pub struct Database {
    /// Database URL string.
    pub url: String,
}

/// HTTP server configuration.
#[derive(Deserialize)]
pub struct Server {
    /// Address, that HTTP server will listen on.
    pub address: SocketAddr,
}

/// Implementation of [`serde`]'s deserializer for [`FromStr`] types.
#[cfg(feature = "logging")]
fn deserialize_from_str<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error,
    D: serde::de::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    std::str::FromStr::from_str(&s).map_err(serde::de::Error::custom)
}

/// Logging configuration.
#[cfg(feature = "logging")]
#[derive(Deserialize)]
pub struct Logging {
    /// Log level.
    #[serde(deserialize_with = "deserialize_from_str")]
    pub level: LevelFilter,
}

#[cfg(feature = "logging")]
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: LevelFilter::WARN,
        }
    }
}

/// Uploaded file storage configuration.
#[derive(Deserialize)]
pub struct Storage {
    /// Directory in which uploaded materials, assignment attachments
    /// and submissions are stored.
    #[serde(default = "default_uploads_path")]
    pub uploads_path: PathBuf,

    /// Max request body size accepted by upload routes, in bytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            uploads_path: default_uploads_path(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

fn default_uploads_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_size() -> usize {
    n_mib_bytes!(50) as usize
}

/// Account registration rules.
///
/// Only institutional email addresses may sign up. The role of a new account
/// is derived from the local part of its email address: any of the
/// [`student_keywords`](Signup::student_keywords) marks a student account,
/// while every other institutional address belongs to a teacher.
#[derive(Deserialize)]
pub struct Signup {
    /// Email suffix required for registration, including the `@` sign.
    #[serde(default = "default_signup_domain")]
    pub domain: String,

    /// Local part substrings that identify student accounts.
    #[serde(default = "default_student_keywords")]
    pub student_keywords: Vec<String>,
}

impl Default for Signup {
    fn default() -> Self {
        Self {
            domain: default_signup_domain(),
            student_keywords: default_student_keywords(),
        }
    }
}

fn default_signup_domain() -> String {
    String::from("@vitbhopal.ac.in")
}

fn default_student_keywords() -> Vec<String> {
    ["bce", "mim", "bai"].into_iter().map(String::from).collect()
}

/// General configuration.
#[derive(Deserialize)]
pub struct Config {
    /// General database configuration.
    pub database: Database,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: Option<Server>,

    /// Logging configuration.
    #[cfg(feature = "logging")]
    #[serde(default)]
    pub logging: Logging,

    /// Uploaded file storage configuration.
    #[serde(default)]
    pub storage: Storage,

    /// Account registration rules.
    #[serde(default)]
    pub signup: Signup,
}

impl Config {
    /// Create new config using default configuration file or environment variables.
    ///
    /// See [`Env`] for more details on how to use environment variables configuration.
    ///
    /// [`Env`]: figment::providers::Env
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("Config.toml"))
                .merge(Env::prefixed("CONFIG_").split("_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }

    /// Create new config suitable for running unit tests.
    #[cfg(feature = "test-utils")]
    pub fn for_tests() -> Self {
        Self {
            database: Database {
                url: String::from("sqlite::memory:"),
            },
            server: Some(Server {
                address: "127.0.0.1:3000".parse().unwrap(),
            }),
            #[cfg(feature = "logging")]
            logging: Logging::default(),
            storage: Storage::default(),
            signup: Signup::default(),
        }
    }
}
