//! Output mode selection.
//!
//! # Detection Priority
//!
//! 1. `MYSQLPROBE_PLAIN=1` - Force plain output
//! 2. `MYSQLPROBE_JSON=1` - Force JSON output
//! 3. Default: JSON
//!
//! An explicit `--format` on the command line overrides all of the above.

use std::env;
use std::fmt;
use std::str::FromStr;

/// Output mode for the probe report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum OutputMode {
    /// One JSON object per probe. Machine-parseable.
    #[default]
    Json,

    /// `key: value` lines for humans.
    Plain,
}

impl OutputMode {
    /// Detect the output mode from the process environment.
    #[must_use]
    pub fn detect() -> Self {
        Self::detect_with(|key| env::var(key).ok())
    }

    /// Detect the output mode using `lookup` to read variables.
    pub fn detect_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let truthy = |key: &str| lookup(key).is_some_and(|v| is_truthy(&v));

        if truthy("MYSQLPROBE_PLAIN") {
            return Self::Plain;
        }
        if truthy("MYSQLPROBE_JSON") {
            return Self::Json;
        }
        Self::Json
    }

    /// Use `requested` when given, otherwise detect from the environment.
    #[must_use]
    pub fn resolve(requested: Option<Self>) -> Self {
        requested.unwrap_or_else(Self::detect)
    }

    /// Get the mode name as a string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Plain => "plain",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "plain" | "text" => Ok(Self::Plain),
            other => Err(format!("unknown output mode '{other}'")),
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn detect(vars: &[(&str, &str)]) -> OutputMode {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        OutputMode::detect_with(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_json() {
        assert_eq!(detect(&[]), OutputMode::Json);
        assert_eq!(OutputMode::default(), OutputMode::Json);
    }

    #[test]
    fn plain_override_wins() {
        assert_eq!(detect(&[("MYSQLPROBE_PLAIN", "1")]), OutputMode::Plain);
        assert_eq!(
            detect(&[("MYSQLPROBE_PLAIN", "yes"), ("MYSQLPROBE_JSON", "1")]),
            OutputMode::Plain
        );
    }

    #[test]
    fn falsy_values_are_ignored() {
        assert_eq!(detect(&[("MYSQLPROBE_PLAIN", "0")]), OutputMode::Json);
        assert_eq!(detect(&[("MYSQLPROBE_PLAIN", "off")]), OutputMode::Json);
    }

    #[test]
    fn explicit_request_overrides_detection() {
        assert_eq!(
            OutputMode::resolve(Some(OutputMode::Plain)),
            OutputMode::Plain
        );
    }

    #[test]
    fn parses_names() {
        assert_eq!("JSON".parse::<OutputMode>(), Ok(OutputMode::Json));
        assert_eq!("text".parse::<OutputMode>(), Ok(OutputMode::Plain));
        assert!("rich".parse::<OutputMode>().is_err());
        assert_eq!(OutputMode::Plain.to_string(), "plain");
    }
}
