//! Emitter
//!
//! Renders a resolved configuration into flag tokens. Output order is the
//! table's declaration order, never map iteration order.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::configuration::ResolvedConfiguration;
use crate::declaration::{OptionDeclaration, TokenTemplate, ValueDomain, VALUE_PLACEHOLDER};
use crate::table::DeclarationTable;

/// One emitted unit of command-line or project-file text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlagToken {
    /// Qualified id of the contributing option
    pub option: String,
    pub flag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FlagToken {
    fn from_template(option: &str, template: &TokenTemplate, value: &str) -> Self {
        Self {
            option: option.to_string(),
            flag: template.flag.replace(VALUE_PLACEHOLDER, value),
            value: template
                .value
                .as_ref()
                .map(|v| v.replace(VALUE_PLACEHOLDER, value)),
        }
    }
}

impl fmt::Display for FlagToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.flag, value),
            None => f.write_str(&self.flag),
        }
    }
}

/// Tokens one declaration contributes for `value`
pub fn tokens_for(declaration: &OptionDeclaration, value: &str) -> Vec<FlagToken> {
    match declaration.domain() {
        ValueDomain::Choices { choices, no_op } => {
            if no_op.as_deref() == Some(value) {
                return Vec::new();
            }
            choices
                .iter()
                .find(|c| c.value == value)
                .map(|c| {
                    c.tokens
                        .iter()
                        .map(|t| FlagToken::from_template(declaration.id(), t, value))
                        .collect()
                })
                .unwrap_or_default()
        }
        ValueDomain::Scalar { template, .. } => {
            if value.trim().is_empty() {
                return Vec::new();
            }
            template
                .iter()
                .map(|t| FlagToken::from_template(declaration.id(), t, value))
                .collect()
        }
    }
}

/// Emitter bound to one declaration table
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'t> {
    table: &'t DeclarationTable,
}

impl<'t> Emitter<'t> {
    pub fn new(table: &'t DeclarationTable) -> Self {
        Self { table }
    }

    pub fn emit(&self, configuration: &ResolvedConfiguration) -> Vec<FlagToken> {
        self.table
            .declarations()
            .filter_map(|d| configuration.value(d.id()).map(|v| tokens_for(d, v)))
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::ValueSource;
    use crate::declaration::{Category, OptionSpec, ScalarKind};

    fn table() -> DeclarationTable {
        let specs = vec![
            OptionSpec::choice(Category::General, "ClangDebugInformationFormat")
                .silent("None")
                .value("FullDebug", ["-g2", "-gdwarf-4"])
                .value("LineNumber", ["-gline-tables-only"])
                .no_op("None")
                .default_value("FullDebug"),
            OptionSpec::choice(Category::General, "WarningLevel")
                .silent("Default")
                .value("EnableFormatAndSecurityWarnings", ["-Wformat", "-Wformat-security"])
                .no_op("Default")
                .default_value("Default"),
            OptionSpec::scalar(Category::General, "AndroidApkLocation", ScalarKind::Path)
                .template(vec![TokenTemplate::property("AndroidApkLocation", "{value}")])
                .default_value(""),
            OptionSpec::scalar(Category::General, "AndroidExtraGradleArgs", ScalarKind::String)
                .template(vec![TokenTemplate::flag("--gradle-args={value}")])
                .default_value(""),
        ];
        DeclarationTable::build(specs, Vec::new()).unwrap()
    }

    fn configuration(values: &[(&str, &str)]) -> ResolvedConfiguration {
        let mut config = ResolvedConfiguration::default();
        for (id, value) in values {
            config.insert(id, value, ValueSource::Default);
        }
        config
    }

    fn flags(tokens: &[FlagToken]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_no_op_sentinel_emits_nothing() {
        let table = table();
        let format = table.lookup("ClangDebugInformationFormat").unwrap();

        assert!(tokens_for(format, "None").is_empty());
        assert_eq!(flags(&tokens_for(format, "FullDebug")), vec!["-g2", "-gdwarf-4"]);
    }

    #[test]
    fn test_scalar_interpolation() {
        let table = table();
        let apk = table.lookup("AndroidApkLocation").unwrap();

        assert!(tokens_for(apk, "").is_empty());
        assert!(tokens_for(apk, "   ").is_empty());
        let tokens = tokens_for(apk, "out/game.apk");
        assert_eq!(tokens[0].flag, "AndroidApkLocation");
        assert_eq!(tokens[0].value.as_deref(), Some("out/game.apk"));
        assert_eq!(tokens[0].to_string(), "AndroidApkLocation=out/game.apk");
    }

    #[test]
    fn test_emission_follows_declaration_order() {
        let table = table();
        // Inserted in reverse of the declaration order
        let config = configuration(&[
            ("General.AndroidExtraGradleArgs", "--offline"),
            ("General.AndroidApkLocation", "app.apk"),
            ("General.WarningLevel", "EnableFormatAndSecurityWarnings"),
            ("General.ClangDebugInformationFormat", "LineNumber"),
        ]);

        let tokens = Emitter::new(&table).emit(&config);
        assert_eq!(
            flags(&tokens),
            vec![
                "-gline-tables-only",
                "-Wformat",
                "-Wformat-security",
                "AndroidApkLocation=app.apk",
                "--gradle-args=--offline",
            ]
        );
        assert_eq!(tokens[1].option, "General.WarningLevel");
    }
}
