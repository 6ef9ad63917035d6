use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Tokens carry no expiry unless a TTL is configured.
    pub ttl_minutes: Option<i64>,
}

/// Policy knobs for the identity resolver.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPolicy {
    /// When true, an unverifiable bearer token fails the request outright
    /// instead of downgrading it to anonymous.
    pub reject_invalid_token: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub auth: AuthPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "quillpad".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "quillpad-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|m| *m > 0),
        };
        let auth = AuthPolicy {
            reject_invalid_token: std::env::var("AUTH_REJECT_INVALID_TOKEN")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        };
        Ok(Self {
            database_url,
            jwt,
            auth,
        })
    }
}
