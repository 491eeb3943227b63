//! Error types for the option engine
//!
//! Input errors are collected per resolution and returned as a batch.
//! Table errors are fatal: a table that fails to load never resolves anything.

use serde::Serialize;
use thiserror::Error;

/// An input-validation error found while resolving one build variant
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveError {
    #[error("Unknown option: {option}")]
    UnknownOption { option: String },

    #[error("Invalid value `{value}` for {option} (expected one of: {})", .legal.join(", "))]
    InvalidChoice {
        option: String,
        value: String,
        legal: Vec<String>,
    },

    #[error("Missing value for required option {option}")]
    MissingValue { option: String },

    #[error("{option} = `{value}` is incompatible with {conflicts_with}: {reason}")]
    IncompatibleOption {
        option: String,
        value: String,
        conflicts_with: String,
        reason: String,
    },

    #[error("Toolchain `{toolchain}` does not match the table's toolchain `{expected}`")]
    UnknownToolchain { toolchain: String, expected: String },

    #[error("Unknown architecture `{architecture}` (expected one of: {})", .supported.join(", "))]
    UnknownArchitecture {
        architecture: String,
        supported: Vec<String>,
    },
}

impl ResolveError {
    /// The option the error is reported against; `None` for errors about
    /// the resolution context itself
    pub fn option(&self) -> Option<&str> {
        match self {
            ResolveError::UnknownOption { option }
            | ResolveError::InvalidChoice { option, .. }
            | ResolveError::MissingValue { option }
            | ResolveError::IncompatibleOption { option, .. } => Some(option),
            ResolveError::UnknownToolchain { .. } | ResolveError::UnknownArchitecture { .. } => None,
        }
    }
}

/// All validation errors for one build variant
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{} error(s) resolving variant {variant}: {}", .errors.len(), render_list(.errors))]
pub struct ResolutionFailure {
    pub variant: String,
    pub errors: Vec<ResolveError>,
}

fn render_list(errors: &[ResolveError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Faults in a declaration table, detected when the table is built
#[derive(Error, Debug)]
pub enum TableError {
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Option {option} declares no default rule")]
    MissingDefaultRule { option: String },

    #[error("Option {option} has a per-variant default without a fallback")]
    MissingFallback { option: String },

    #[error("Option {option} is declared more than once")]
    DuplicateOption { option: String },

    #[error("Option {option} declares no legal values")]
    EmptyChoices { option: String },

    #[error("Option {option} lists value `{value}` more than once")]
    DuplicateChoice { option: String, value: String },

    #[error("Default `{value}` of option {option} is not a legal value")]
    IllegalDefault { option: String, value: String },

    #[error("No-op sentinel `{value}` of option {option} is not a legal value")]
    UnknownSentinel { option: String, value: String },

    #[error("No-op sentinel `{value}` of option {option} emits tokens")]
    SentinelEmits { option: String, value: String },

    #[error("Option {option}: {detail}")]
    KindMismatch { option: String, detail: String },

    #[error("Rule references unknown option {option}")]
    UnknownRuleOption { option: String },

    #[error("Rule references illegal value `{value}` of option {option}")]
    IllegalRuleValue { option: String, value: String },

    #[error("Rule on option {option} names unsupported architecture `{architecture}`")]
    UnknownRuleArchitecture { option: String, architecture: String },
}

/// Faults in a request document
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Variant {variant} has no toolchain")]
    MissingToolchain { variant: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_choice_lists_legal_values() {
        let err = ResolveError::InvalidChoice {
            option: "Compiler.Optimization".into(),
            value: "Fastest".into(),
            legal: vec!["Disabled".into(), "MaxSpeed".into()],
        };

        assert_eq!(
            err.to_string(),
            "Invalid value `Fastest` for Compiler.Optimization (expected one of: Disabled, MaxSpeed)"
        );
        assert_eq!(err.option(), Some("Compiler.Optimization"));
    }

    #[test]
    fn test_context_errors_name_no_option() {
        let err = ResolveError::UnknownArchitecture {
            architecture: "armv7".into(),
            supported: vec!["arm64-v8a".into(), "armeabi-v7a".into()],
        };

        assert_eq!(
            err.to_string(),
            "Unknown architecture `armv7` (expected one of: arm64-v8a, armeabi-v7a)"
        );
        assert_eq!(err.option(), None);
    }

    #[test]
    fn test_failure_reports_every_error() {
        let failure = ResolutionFailure {
            variant: "Debug".into(),
            errors: vec![
                ResolveError::UnknownOption { option: "Foo".into() },
                ResolveError::MissingValue { option: "General.AndroidGradleBuildDir".into() },
            ],
        };

        let text = failure.to_string();
        assert!(text.starts_with("2 error(s) resolving variant Debug"));
        assert!(text.contains("Unknown option: Foo"));
        assert!(text.contains("General.AndroidGradleBuildDir"));
    }
}
