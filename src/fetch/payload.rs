use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON parsing failed. ({0})")]
    Parse(String),
}

/// Body of a flag service response.
#[derive(Debug, Deserialize, Default, PartialEq)]
pub struct FlagsPayload {
    #[serde(default)]
    pub flags: HashMap<String, bool>,
}

/// The runtime configuration document deployed next to the application.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub env_key: Option<String>,
}

pub fn flags_from_json(json: &str) -> Result<FlagsPayload, Error> {
    serde_json::from_str::<FlagsPayload>(json).map_err(|err| Error::Parse(err.to_string()))
}

pub fn runtime_config_from_json(json: &str) -> Result<RuntimeConfig, Error> {
    serde_json::from_str::<RuntimeConfig>(json).map_err(|err| Error::Parse(err.to_string()))
}
