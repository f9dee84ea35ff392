use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state, loaded once at startup
/// and shared immutably across all requests via the application state.
#[derive(Clone)]
pub struct AppConfig {
    // Database connection string (SQLite).
    pub db_url: String,
    // Secret key used to sign and validate JWTs.
    pub jwt_secret: String,
    // Runtime environment marker. Controls log format and the dev bypass.
    pub env: Env,
}

/// Env
///
/// Runtime context marker, switching between development conveniences
/// (pretty logs, `x-user-id` bypass) and hardened production behavior.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test setup: an in-memory store
    /// and a fixed local signing secret.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            jwt_secret: "minornote-local-test-secret".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables, fail-fast.
    ///
    /// # Panics
    /// Panics if a variable required for the current environment is missing.
    /// Production demands an explicit `JWT_SECRET` and `DATABASE_URL`;
    /// local falls back to a file-backed SQLite database and a dev secret.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        match env {
            Env::Local => Self {
                env: Env::Local,
                db_url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:minornote.db".to_string()),
                jwt_secret: env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "minornote-local-test-secret".to_string()),
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                jwt_secret: env::var("JWT_SECRET").expect("FATAL: JWT_SECRET required in prod"),
            },
        }
    }
}
