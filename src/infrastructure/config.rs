use serde::Deserialize;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const ENV_PREFIX: &str = "SESSIONS";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub influx: InfluxSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InfluxSettings {
    pub host: String,
    pub token: String,
    pub database: String,
    pub retention_policy: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind_address: String,
}

/// Load `config/app.*`, overridden by `SESSIONS__SECTION__KEY` environment variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    build_config(config::File::with_name("config/app").required(false))
}

fn build_config<S>(file: S) -> anyhow::Result<AppConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .set_default("server.bind_address", DEFAULT_BIND_ADDRESS)?
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
