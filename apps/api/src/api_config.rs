use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use nimbus_application::AppDefaults;
use nimbus_core::{AppError, Guid};
use tracing_subscriber::EnvFilter;

use crate::url_builder::ApiUrlBuilder;

/// Command selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiCommand {
    Serve,
    Migrate,
    Seed,
}

impl ApiCommand {
    fn from_arg(arg: Option<&str>) -> Result<Self, AppError> {
        match arg {
            None | Some("serve") => Ok(Self::Serve),
            Some("migrate") => Ok(Self::Migrate),
            Some("seed") => Ok(Self::Seed),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'serve', 'migrate' or 'seed'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub command: ApiCommand,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub external_protocol: String,
    pub external_domain: String,
    pub default_app_ssh_access: bool,
    pub cors_allowed_origin: Option<String>,
    pub dev_seed_user_guid: Option<Guid>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = ApiCommand::from_arg(env::args().nth(1).as_deref())?;

        let database_url = required_env("DATABASE_URL")?;
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let external_protocol =
            env::var("EXTERNAL_PROTOCOL").unwrap_or_else(|_| "http".to_owned());
        let external_domain =
            env::var("EXTERNAL_DOMAIN").unwrap_or_else(|_| format!("localhost:{api_port}"));
        let default_app_ssh_access = env::var("DEFAULT_APP_SSH_ACCESS")
            .unwrap_or_else(|_| "true".to_owned())
            .eq_ignore_ascii_case("true");

        let cors_allowed_origin = optional_non_empty_env("CORS_ALLOWED_ORIGIN");
        let dev_seed_user_guid = optional_non_empty_env("DEV_SEED_USER_GUID")
            .map(|value| {
                Guid::parse(value).map_err(|error| {
                    AppError::Validation(format!("invalid DEV_SEED_USER_GUID: {error}"))
                })
            })
            .transpose()?;

        Ok(Self {
            command,
            database_url,
            api_host,
            api_port,
            external_protocol,
            external_domain,
            default_app_ssh_access,
            cors_allowed_origin,
            dev_seed_user_guid,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }

    pub fn url_builder(&self) -> Result<ApiUrlBuilder, AppError> {
        ApiUrlBuilder::new(&self.external_protocol, &self.external_domain)
    }

    pub fn app_defaults(&self) -> AppDefaults {
        AppDefaults {
            default_app_ssh_access: self.default_app_ssh_access,
            ..AppDefaults::default()
        }
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
