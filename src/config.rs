use anyhow::{bail, Context, Result};
use clap::Parser;

/// Hydrology Open Data API client
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Hydrology API server address
    #[arg(long, env = "HOD_API_URL", default_value = "https://hod.example.gov/v1/")]
    pub api_url: String,

    /// OAuth2 authorization server address
    #[arg(long, env = "HOD_OAUTH_URL", default_value = "https://hod.example.gov/oauth2/")]
    pub oauth_url: String,

    /// OAuth2 client id
    #[arg(long, env = "HOD_CLIENT_ID")]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, env = "HOD_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Platform account, switches to the authorization-code flow
    #[arg(long, env = "HOD_USERNAME")]
    pub username: Option<String>,

    /// Platform password
    #[arg(long, env = "HOD_PASSWORD")]
    pub password: Option<String>,

    /// Redirect URI registered for the authorization-code flow
    #[arg(long, env = "HOD_REDIRECT_URI")]
    pub redirect_uri: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub oauth_url: String,
    pub client_id: String,
    pub client_secret: String,

    // Authorization-code flow only; all three or none
    pub username: Option<String>,
    pub password: Option<String>,
    pub redirect_uri: Option<String>,

    pub log_level: String,
}

impl Config {
    /// Load configuration with priority: CLI > ENV > defaults
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let args = CliArgs::parse();
        Self::from_args(args)
    }

    fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self {
            api_url: args.api_url,
            oauth_url: args.oauth_url,
            client_id: args
                .client_id
                .context("Client id is required (--client-id or HOD_CLIENT_ID)")?,
            client_secret: args
                .client_secret
                .context("Client secret is required (--client-secret or HOD_CLIENT_SECRET)")?,
            username: args.username,
            password: args.password,
            redirect_uri: args.redirect_uri,
            log_level: args.log_level,
        };
        config.validate()?;
        Ok(config)
    }

    /// Whether the supplied credentials select the authorization-code flow
    pub fn uses_authorization_code(&self) -> bool {
        self.username.is_some()
    }

    pub fn validate(&self) -> Result<()> {
        let user_fields = [
            self.username.is_some(),
            self.password.is_some(),
            self.redirect_uri.is_some(),
        ];
        if user_fields.iter().any(|&set| set) && !user_fields.iter().all(|&set| set) {
            bail!(
                "The authorization-code flow needs username, password and redirect uri together"
            );
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => bail!("Invalid log level: {other}"),
        }
    }
}
