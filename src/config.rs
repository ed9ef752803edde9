use thiserror::Error;

use crate::ir::{MethodId, Program};

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Entry method written as `Class::method`.
    pub entry: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no entry method: declare `entry C::m;` or a single static `main`")]
    NoEntry,
    #[error("malformed entry `{0}`, expected `Class::method`")]
    MalformedEntry(String),
    #[error("no method `{0}`")]
    UnknownEntry(String),
    #[error("`{0}` names more than one method")]
    AmbiguousEntry(String),
}

/// Picks the entry method: the configured one, then the program's declared
/// entry, then the only static method named `main`.
pub fn entry_method(program: &Program, conf: &Config) -> Result<MethodId, ConfigError> {
    if let Some(entry) = &conf.entry {
        let (class, method) = entry
            .split_once("::")
            .ok_or_else(|| ConfigError::MalformedEntry(entry.clone()))?;
        let methods = program.find_methods(class, method);
        return match methods.as_slice() {
            [m] => Ok(*m),
            [] => Err(ConfigError::UnknownEntry(entry.clone())),
            _ => Err(ConfigError::AmbiguousEntry(entry.clone())),
        };
    }
    if let Some(entry) = program.entry() {
        return Ok(entry);
    }
    let mains: Vec<_> = program
        .methods()
        .filter(|(_, m)| m.is_static && m.name == "main")
        .map(|(id, _)| id)
        .collect();
    match mains.as_slice() {
        [m] => Ok(*m),
        [] => Err(ConfigError::NoEntry),
        _ => Err(ConfigError::AmbiguousEntry("main".to_string())),
    }
}
