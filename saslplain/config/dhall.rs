use std::path::Path;

use crate::Config;

pub fn read_config_file(path: impl AsRef<Path>) -> Result<Config, serde_dhall::Error> {
    serde_dhall::from_file(path).parse().map_err(Into::into)
}

pub fn parse_config(source: &str) -> Result<Config, serde_dhall::Error> {
    serde_dhall::from_str(source).parse().map_err(Into::into)
}

pub fn serialize_config(config: &Config) -> Result<String, serde_dhall::Error> {
    serde_dhall::serialize(config).to_string()
}
