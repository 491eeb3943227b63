//! Validator
//!
//! Pure legality checks over assignments and merged configurations. Every
//! check returns errors as data; nothing here aborts a resolution.

use std::collections::HashSet;
use tracing::debug;

use crate::configuration::ResolvedConfiguration;
use crate::context::ResolutionContext;
use crate::declaration::{OptionDeclaration, ValueDomain};
use crate::error::ResolveError;
use crate::table::{ConflictRule, DeclarationTable};

/// Check one value against its declaration
pub fn check_value(declaration: &OptionDeclaration, value: &str) -> Option<ResolveError> {
    match declaration.domain() {
        ValueDomain::Choices { choices, .. } => {
            if choices.iter().any(|c| c.value == value) {
                None
            } else {
                Some(ResolveError::InvalidChoice {
                    option: declaration.id().to_string(),
                    value: value.to_string(),
                    legal: choices.iter().map(|c| c.value.clone()).collect(),
                })
            }
        }
        ValueDomain::Scalar { required, .. } => {
            if *required && value.trim().is_empty() {
                Some(ResolveError::MissingValue {
                    option: declaration.id().to_string(),
                })
            } else {
                None
            }
        }
    }
}

/// Validator bound to one declaration table
#[derive(Debug, Clone, Copy)]
pub struct Validator<'t> {
    table: &'t DeclarationTable,
}

impl<'t> Validator<'t> {
    pub fn new(table: &'t DeclarationTable) -> Self {
        Self { table }
    }

    /// Check the context against the table's target, if it declares one
    pub fn check_context(&self, context: &ResolutionContext) -> Vec<ResolveError> {
        let Some(target) = self.table.target() else {
            return Vec::new();
        };

        let mut errors = Vec::new();
        if context.toolchain.name != target.toolchain {
            errors.push(ResolveError::UnknownToolchain {
                toolchain: context.toolchain.name.clone(),
                expected: target.toolchain.clone(),
            });
        }
        if !target.supports(&context.toolchain.architecture) {
            errors.push(ResolveError::UnknownArchitecture {
                architecture: context.toolchain.architecture.clone(),
                supported: target.architectures.clone(),
            });
        }
        errors
    }

    /// Check the context, every entry of a merged configuration, then the
    /// conflict rules. Rules touching an option that already failed are
    /// skipped, and architecture rules are skipped for an unknown
    /// architecture.
    pub fn validate(
        &self,
        context: &ResolutionContext,
        configuration: &ResolvedConfiguration,
    ) -> Vec<ResolveError> {
        let mut errors = self.check_context(context);
        let known_architecture = !errors
            .iter()
            .any(|e| matches!(e, ResolveError::UnknownArchitecture { .. }));
        let mut failed = HashSet::new();

        for declaration in self.table.declarations() {
            let Some(value) = configuration.value(declaration.id()) else {
                continue;
            };
            if let Some(error) = check_value(declaration, value) {
                failed.insert(declaration.id());
                errors.push(error);
            }
        }

        for rule in self.table.rules() {
            if !known_architecture && matches!(rule, ConflictRule::Architecture { .. }) {
                continue;
            }
            if let Some(error) = check_rule(rule, context, configuration, &failed) {
                errors.push(error);
            }
        }

        debug!(
            "Validated {} options for {}: {} error(s)",
            configuration.len(),
            context.variant,
            errors.len()
        );
        errors
    }
}

fn check_rule(
    rule: &ConflictRule,
    context: &ResolutionContext,
    configuration: &ResolvedConfiguration,
    failed: &HashSet<&str>,
) -> Option<ResolveError> {
    match rule {
        ConflictRule::Architecture {
            option,
            sentinel,
            architectures,
        } => {
            if failed.contains(option.as_str()) {
                return None;
            }
            let value = configuration.value(option)?;
            let architecture = &context.toolchain.architecture;
            if value == sentinel || architectures.iter().any(|a| a == architecture) {
                return None;
            }
            Some(ResolveError::IncompatibleOption {
                option: option.clone(),
                value: value.to_string(),
                conflicts_with: format!("architecture {}", architecture),
                reason: format!(
                    "only applicable to {}; use `{}` on other architectures",
                    architectures.join(", "),
                    sentinel
                ),
            })
        }
        ConflictRule::Exclusive {
            option,
            value,
            conflicts_with,
            allowed,
        } => {
            if failed.contains(option.as_str()) || failed.contains(conflicts_with.as_str()) {
                return None;
            }
            if configuration.value(option)? != value {
                return None;
            }
            let other = configuration.value(conflicts_with)?;
            if allowed.iter().any(|a| a == other) {
                return None;
            }
            Some(ResolveError::IncompatibleOption {
                option: option.clone(),
                value: value.clone(),
                conflicts_with: conflicts_with.clone(),
                reason: format!(
                    "{} is `{}` but must be one of: {}",
                    conflicts_with,
                    other,
                    allowed.join(", ")
                ),
            })
        }
    }
}
