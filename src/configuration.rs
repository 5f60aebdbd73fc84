use config::builder::DefaultState;
use config::ConfigBuilder;
use std::path::Path;
use std::time;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub application: ApplicationSettings,
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct ApplicationSettings {
    pub listen_addr: String,
    pub max_uptime_secs: Option<u64>,
}

impl ApplicationSettings {
    pub fn max_uptime(&self) -> Option<time::Duration> {
        self.max_uptime_secs.map(time::Duration::from_secs)
    }
}

pub fn get_configuration(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(
            config::File::new("configuration.toml", config::FileFormat::Toml).required(false),
        )
        .add_source(
            config::File::new("/etc/graceful/configuration.toml", config::FileFormat::Toml)
                .required(false),
        );

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
    }

    load(builder.add_source(environment()))
}

// Keys contain underscores, so nesting is separated by a double one:
// APPLICATION__LISTEN_ADDR, APPLICATION__MAX_UPTIME_SECS.
fn environment() -> config::Environment {
    config::Environment::default()
        .try_parsing(true)
        .separator("__")
}

fn load(builder: ConfigBuilder<DefaultState>) -> Result<Config, config::ConfigError> {
    let settings = builder
        .set_default("application.listen_addr", "127.0.0.1:8080")?
        .build()?;

    settings.try_deserialize::<Config>()
}
