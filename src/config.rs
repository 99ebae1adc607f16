use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// S3/MinIO bucket backing the scan cache.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// `None` keeps the cache in process memory.
    pub storage: Option<StorageConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "qrtrail".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "qrtrail-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let storage = match std::env::var("MINIO_ENDPOINT") {
            Ok(endpoint) => Some(StorageConfig {
                endpoint,
                bucket: std::env::var("MINIO_BUCKET")?,
                access_key: std::env::var("MINIO_ACCESS_KEY")?,
                secret_key: std::env::var("MINIO_SECRET_KEY")?,
                region: std::env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".into()),
                prefix: std::env::var("CACHE_PREFIX").unwrap_or_else(|_| "cache".into()),
            }),
            Err(_) => None,
        };
        Ok(Self {
            database_url,
            jwt,
            storage,
        })
    }
}
