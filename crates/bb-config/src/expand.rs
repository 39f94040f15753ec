//! `${VAR}` and `${VAR:-default}` expansion for path-like config values.

use std::env::{self, VarError};

use crate::ConfigError;

/// Expand environment variable references in `value`.
///
/// `${VAR}` fails when VAR is unset, `${VAR:-default}` falls back to the
/// default. Values without `${` are returned as they are, so a bare `$` in a
/// path or link attribute is never touched.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context(value, |name| match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(source) => Err(Lookup {
            name: name.to_owned(),
            source,
        }),
    })
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{}}}: {}", e.cause.name, e.cause.source),
    })?;

    Ok(expanded.into_owned())
}

/// Failed variable lookup.
struct Lookup {
    name: String,
    source: VarError,
}
