use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank, and an error naming
/// the variable when it is set but does not parse.
pub fn parse_env<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid {name} environment variable: {e}")),
        _ => Ok(None),
    }
}
