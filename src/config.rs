use std::env;

/// Deployment mode, read from `APP_ENV`.
///
/// Anything other than `production` or `test` counts as development, so a
/// missing or misspelled value never accidentally enables production wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    pub fn is_production(&self) -> bool {
        *self == Environment::Production
    }
}

impl From<&str> for Environment {
    fn from(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "production" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }
}

/// Process-wide configuration, read once at startup and passed by reference
/// into everything that needs it. Required variables fail fast here rather
/// than erroring on the first request that touches them.
pub struct Config {
    pub environment: Environment,
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub session_secret: String,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV")
            .map(|v| Environment::from(v.as_str()))
            .unwrap_or(Environment::Development);

        let bcrypt_cost = env::var("BCRYPT_COST")
            .map(|v| v.parse().expect("BCRYPT_COST must be a number"))
            .unwrap_or(bcrypt::DEFAULT_COST);
        assert!(
            (4..=31).contains(&bcrypt_cost),
            "BCRYPT_COST must be between 4 and 31"
        );

        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            log::warn!("SESSION_SECRET not set, using the built-in default");
            "supersecret".to_string()
        });

        Self {
            environment,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            session_secret,
            bcrypt_cost,
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
