use std::fs;
use std::path::Path;

use csq_core::errors::{CsqError, ErrorInfo};
use serde::{de::DeserializeOwned, Serialize};

fn serde_error(code: &str, err: impl ToString) -> CsqError {
    CsqError::Serde(ErrorInfo::new(code, err.to_string()))
}

/// Serializes a value into YAML.
pub fn to_yaml_string<T: Serialize>(value: &T) -> Result<String, CsqError> {
    serde_yaml::to_string(value).map_err(|err| serde_error("yaml-serialize", err))
}

/// Deserializes a YAML payload into the requested type.
pub fn from_yaml_str<T: DeserializeOwned>(data: &str) -> Result<T, CsqError> {
    serde_yaml::from_str(data).map_err(|err| serde_error("yaml-deserialize", err))
}

/// Reads and parses a YAML file.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, CsqError> {
    let contents = fs::read_to_string(path).map_err(|err| CsqError::io("yaml-read", path, err))?;
    serde_yaml::from_str(&contents).map_err(|err| {
        CsqError::Serde(
            ErrorInfo::new("yaml-deserialize", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })
}

/// Writes `value` as YAML, creating parent directories as needed.
pub fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<(), CsqError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| CsqError::io("yaml-mkdir", parent, err))?;
    }
    let yaml = to_yaml_string(value)?;
    fs::write(path, yaml).map_err(|err| CsqError::io("yaml-write", path, err))
}
