//! Option Declaration Table
//!
//! Read-only catalogue of declarations and conflict rules. Every consistency
//! check runs in `DeclarationTable::build`; a table that exists is valid.

use std::collections::HashSet;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, info};

use crate::context::VariantClass;
use crate::declaration::{
    Category, Choice, DefaultRule, OptionDeclaration, OptionSpec, ScalarKind, TokenTemplate,
    ValueDomain,
};
use crate::error::TableError;

/// Cross-option constraint checked by the validator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictRule {
    /// `option` must hold `sentinel` unless the architecture is listed
    Architecture {
        option: String,
        sentinel: String,
        architectures: Vec<String>,
    },
    /// When `option` is `value`, `conflicts_with` must be one of `allowed`
    Exclusive {
        option: String,
        value: String,
        conflicts_with: String,
        allowed: Vec<String>,
    },
}

impl ConflictRule {
    fn options_mut(&mut self) -> Vec<&mut String> {
        match self {
            ConflictRule::Architecture { option, .. } => vec![option],
            ConflictRule::Exclusive {
                option,
                conflicts_with,
                ..
            } => vec![option, conflicts_with],
        }
    }

    fn referenced_values(&self) -> Vec<(&str, &str)> {
        match self {
            ConflictRule::Architecture {
                option, sentinel, ..
            } => vec![(option.as_str(), sentinel.as_str())],
            ConflictRule::Exclusive {
                option,
                value,
                conflicts_with,
                allowed,
            } => std::iter::once((option.as_str(), value.as_str()))
                .chain(allowed.iter().map(|v| (conflicts_with.as_str(), v.as_str())))
                .collect(),
        }
    }
}

/// Toolchain and architectures a table is authored for
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSupport {
    pub toolchain: String,
    pub architectures: Vec<String>,
}

impl TargetSupport {
    pub fn new<I, S>(toolchain: impl Into<String>, architectures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            toolchain: toolchain.into(),
            architectures: architectures.into_iter().map(Into::into).collect(),
        }
    }

    pub fn supports(&self, architecture: &str) -> bool {
        self.architectures.iter().any(|a| a == architecture)
    }
}

/// Immutable catalogue of option declarations in declaration order
#[derive(Debug, Clone)]
pub struct DeclarationTable {
    options: IndexMap<String, OptionDeclaration>,
    rules: Vec<ConflictRule>,
    target: Option<TargetSupport>,
}

impl DeclarationTable {
    /// Check and assemble a table from unchecked declarations
    pub fn build(specs: Vec<OptionSpec>, rules: Vec<ConflictRule>) -> Result<Self, TableError> {
        let mut options = IndexMap::with_capacity(specs.len());

        for spec in specs {
            let declaration = check_spec(spec)?;
            let id = declaration.id.clone();
            if options.contains_key(&id) {
                return Err(TableError::DuplicateOption { option: id });
            }
            options.insert(id, declaration);
        }

        let mut table = Self {
            options,
            rules: Vec::with_capacity(rules.len()),
            target: None,
        };

        for mut rule in rules {
            for option in rule.options_mut() {
                let id = table
                    .lookup(option)
                    .map(|d| d.id.clone())
                    .ok_or_else(|| TableError::UnknownRuleOption {
                        option: option.clone(),
                    })?;
                *option = id;
            }
            for (option, value) in rule.referenced_values() {
                let legal = table
                    .options
                    .get(option)
                    .is_some_and(|d| d.choice(value).is_some());
                if !legal {
                    return Err(TableError::IllegalRuleValue {
                        option: option.to_string(),
                        value: value.to_string(),
                    });
                }
            }
            table.rules.push(rule);
        }

        info!(
            "Loaded declaration table: {} options, {} rules",
            table.options.len(),
            table.rules.len()
        );
        Ok(table)
    }

    /// Restrict the table to one toolchain and its architectures. Every
    /// architecture rule must name supported architectures only.
    pub fn with_target(mut self, target: TargetSupport) -> Result<Self, TableError> {
        for rule in &self.rules {
            if let ConflictRule::Architecture {
                option,
                architectures,
                ..
            } = rule
            {
                if let Some(unknown) = architectures.iter().find(|a| !target.supports(a)) {
                    return Err(TableError::UnknownRuleArchitecture {
                        option: option.clone(),
                        architecture: unknown.clone(),
                    });
                }
            }
        }

        debug!(
            "Table targets {} ({})",
            target.toolchain,
            target.architectures.join(", ")
        );
        self.target = Some(target);
        Ok(self)
    }

    /// Parse and check a table authored in TOML
    pub fn from_toml_str(source: &str) -> Result<Self, TableError> {
        let document: TableDocument = toml::from_str(source)?;
        let specs = document
            .option
            .into_iter()
            .map(RawOption::into_spec)
            .collect::<Result<Vec<_>, _>>()?;
        let table = Self::build(specs, document.rule)?;
        match document.target {
            Some(target) => table.with_target(target),
            None => Ok(table),
        }
    }

    /// Toolchain restriction, if the table declares one
    pub fn target(&self) -> Option<&TargetSupport> {
        self.target.as_ref()
    }

    /// Find a declaration by qualified id, or by bare name when unambiguous
    pub fn lookup(&self, name: &str) -> Option<&OptionDeclaration> {
        if let Some(declaration) = self.options.get(name) {
            return Some(declaration);
        }
        let mut matches = self.options.values().filter(|d| d.name == name);
        match (matches.next(), matches.next()) {
            (Some(declaration), None) => Some(declaration),
            _ => None,
        }
    }

    /// Declarations in declaration (and emission) order
    pub fn declarations(&self) -> impl Iterator<Item = &OptionDeclaration> {
        self.options.values()
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &OptionDeclaration> {
        self.options.values().filter(move |d| d.category == category)
    }

    pub fn rules(&self) -> &[ConflictRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

fn check_spec(spec: OptionSpec) -> Result<OptionDeclaration, TableError> {
    let id = spec.id();

    if let Some(problem) = spec.problems.into_iter().next() {
        return Err(TableError::KindMismatch {
            option: id,
            detail: problem,
        });
    }

    let default = spec
        .default
        .ok_or_else(|| TableError::MissingDefaultRule { option: id.clone() })?;

    if let ValueDomain::Choices { choices, no_op } = &spec.domain {
        if choices.is_empty() {
            return Err(TableError::EmptyChoices { option: id });
        }

        let mut seen = HashSet::new();
        for choice in choices {
            if !seen.insert(choice.value.as_str()) {
                return Err(TableError::DuplicateChoice {
                    option: id,
                    value: choice.value.clone(),
                });
            }
        }

        for value in default.values() {
            if !seen.contains(value) {
                return Err(TableError::IllegalDefault {
                    option: id,
                    value: value.to_string(),
                });
            }
        }

        if let Some(sentinel) = no_op {
            match choices.iter().find(|c| &c.value == sentinel) {
                None => {
                    return Err(TableError::UnknownSentinel {
                        option: id,
                        value: sentinel.clone(),
                    })
                }
                Some(choice) if !choice.tokens.is_empty() => {
                    return Err(TableError::SentinelEmits {
                        option: id,
                        value: sentinel.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    debug!("Declared option {}", id);

    Ok(OptionDeclaration {
        id,
        name: spec.name,
        category: spec.category,
        domain: spec.domain,
        default,
        summary: spec.summary,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableDocument {
    target: Option<TargetSupport>,
    #[serde(default)]
    option: Vec<RawOption>,
    #[serde(default)]
    rule: Vec<ConflictRule>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Choice,
    String,
    Path,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOption {
    name: String,
    category: Category,
    kind: RawKind,
    default: Option<RawDefault>,
    summary: Option<String>,
    #[serde(default)]
    choices: Vec<RawChoice>,
    no_op: Option<String>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    emit: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDefault {
    Fixed(String),
    PerVariant {
        by_variant: IndexMap<String, String>,
        fallback: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChoice {
    value: String,
    #[serde(default)]
    emit: Vec<RawToken>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawToken {
    Flag(String),
    Property { flag: String, value: String },
}

impl From<RawToken> for TokenTemplate {
    fn from(raw: RawToken) -> Self {
        match raw {
            RawToken::Flag(flag) => TokenTemplate::flag(flag),
            RawToken::Property { flag, value } => TokenTemplate::property(flag, value),
        }
    }
}

impl RawOption {
    fn into_spec(self) -> Result<OptionSpec, TableError> {
        let id = self.category.qualify(&self.name);

        let mut spec = match self.kind {
            RawKind::Choice => {
                if self.required || !self.emit.is_empty() {
                    return Err(TableError::KindMismatch {
                        option: id,
                        detail: "`required` and `emit` apply to scalar options only".into(),
                    });
                }
                let mut spec = OptionSpec::choice(self.category, self.name);
                spec.domain = ValueDomain::Choices {
                    choices: self
                        .choices
                        .into_iter()
                        .map(|c| Choice {
                            value: c.value,
                            tokens: c.emit.into_iter().map(Into::into).collect(),
                        })
                        .collect(),
                    no_op: self.no_op,
                };
                spec
            }
            RawKind::String | RawKind::Path => {
                if !self.choices.is_empty() || self.no_op.is_some() {
                    return Err(TableError::KindMismatch {
                        option: id,
                        detail: "`choices` and `no_op` apply to choice options only".into(),
                    });
                }
                let kind = match self.kind {
                    RawKind::Path => ScalarKind::Path,
                    _ => ScalarKind::String,
                };
                let mut spec = OptionSpec::scalar(self.category, self.name, kind);
                spec.domain = ValueDomain::Scalar {
                    kind,
                    required: self.required,
                    template: self.emit.into_iter().map(Into::into).collect(),
                };
                spec
            }
        };

        spec.summary = self.summary;
        spec.default = match self.default {
            None => None,
            Some(RawDefault::Fixed(value)) => Some(DefaultRule::Fixed(value)),
            Some(RawDefault::PerVariant {
                by_variant,
                fallback,
            }) => {
                let fallback = fallback.ok_or(TableError::MissingFallback { option: id })?;
                Some(DefaultRule::PerVariant {
                    by_class: by_variant
                        .into_iter()
                        .map(|(class, value)| (VariantClass::from(class), value))
                        .collect(),
                    fallback,
                })
            }
        };

        Ok(spec)
    }
}
