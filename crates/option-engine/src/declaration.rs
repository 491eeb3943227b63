//! Option Declarations
//!
//! Immutable description of every tunable switch: identity, value domain,
//! default rule and emission templates.

use std::fmt;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::context::VariantClass;

/// Placeholder substituted with a scalar option's value
pub const VALUE_PLACEHOLDER: &str = "{value}";

/// Toolchain phase an option belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    Compiler,
    Linker,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Compiler => "Compiler",
            Category::Linker => "Linker",
        }
    }

    /// Qualified option id (`Category.Name`)
    pub fn qualify(&self, name: &str) -> String {
        format!("{}.{}", self.as_str(), name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of value an option accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    EnumeratedChoice,
    ScalarString,
    ScalarPath,
}

/// Kind of free-form value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Path,
}

/// One emitted fragment, before scalar interpolation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTemplate {
    pub flag: String,
    pub value: Option<String>,
}

impl TokenTemplate {
    /// A bare command-line flag
    pub fn flag(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: None,
        }
    }

    /// A flag carrying an attached value (project-file property)
    pub fn property(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: Some(value.into()),
        }
    }
}

/// A legal value of an enumerated option and the tokens it emits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub tokens: Vec<TokenTemplate>,
}

/// Kind-specific data of a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueDomain {
    Choices {
        /// Legal values in declaration order
        choices: Vec<Choice>,
        /// Value meaning "defer to the toolchain", never emitted
        no_op: Option<String>,
    },
    Scalar {
        kind: ScalarKind,
        required: bool,
        template: Vec<TokenTemplate>,
    },
}

/// How the effective default of an option is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultRule {
    Fixed(String),
    PerVariant {
        by_class: IndexMap<VariantClass, String>,
        fallback: String,
    },
}

impl DefaultRule {
    pub fn fixed(value: impl Into<String>) -> Self {
        DefaultRule::Fixed(value.into())
    }

    pub fn per_variant<I, K, V>(by_class: I, fallback: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<VariantClass>,
        V: Into<String>,
    {
        DefaultRule::PerVariant {
            by_class: by_class
                .into_iter()
                .map(|(k, v)| (Into::<VariantClass>::into(k).normalized(), v.into()))
                .collect(),
            fallback: fallback.into(),
        }
    }

    /// Every value the rule can produce
    pub fn values(&self) -> Vec<&str> {
        match self {
            DefaultRule::Fixed(value) => vec![value.as_str()],
            DefaultRule::PerVariant { by_class, fallback } => by_class
                .values()
                .map(String::as_str)
                .chain(std::iter::once(fallback.as_str()))
                .collect(),
        }
    }
}

/// A fully checked option declaration, owned by a `DeclarationTable`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDeclaration {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) category: Category,
    pub(crate) domain: ValueDomain,
    pub(crate) default: DefaultRule,
    pub(crate) summary: Option<String>,
}

impl OptionDeclaration {
    /// Qualified id (`Category.Name`)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Name within the category, without the category prefix
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn domain(&self) -> &ValueDomain {
        &self.domain
    }

    pub fn default_rule(&self) -> &DefaultRule {
        &self.default
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn kind(&self) -> OptionKind {
        match &self.domain {
            ValueDomain::Choices { .. } => OptionKind::EnumeratedChoice,
            ValueDomain::Scalar { kind: ScalarKind::String, .. } => OptionKind::ScalarString,
            ValueDomain::Scalar { kind: ScalarKind::Path, .. } => OptionKind::ScalarPath,
        }
    }

    /// Legal values of an enumerated option; empty for scalars
    pub fn legal_values(&self) -> Vec<&str> {
        match &self.domain {
            ValueDomain::Choices { choices, .. } => {
                choices.iter().map(|c| c.value.as_str()).collect()
            }
            ValueDomain::Scalar { .. } => Vec::new(),
        }
    }

    pub fn choice(&self, value: &str) -> Option<&Choice> {
        match &self.domain {
            ValueDomain::Choices { choices, .. } => choices.iter().find(|c| c.value == value),
            ValueDomain::Scalar { .. } => None,
        }
    }

    pub fn no_op(&self) -> Option<&str> {
        match &self.domain {
            ValueDomain::Choices { no_op, .. } => no_op.as_deref(),
            ValueDomain::Scalar { .. } => None,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self.domain, ValueDomain::Scalar { required: true, .. })
    }
}

/// Unchecked declaration, turned into an `OptionDeclaration` by
/// `DeclarationTable::build`
#[derive(Debug, Clone)]
pub struct OptionSpec {
    pub name: String,
    pub category: Category,
    pub domain: ValueDomain,
    pub default: Option<DefaultRule>,
    pub summary: Option<String>,
    pub(crate) problems: Vec<String>,
}

impl OptionSpec {
    /// Enumerated option with no values yet
    pub fn choice(category: Category, name: impl Into<String>) -> Self {
        Self::with_domain(
            category,
            name,
            ValueDomain::Choices {
                choices: Vec::new(),
                no_op: None,
            },
        )
    }

    /// Free-form option, optional and emitting nothing until given a template
    pub fn scalar(category: Category, name: impl Into<String>, kind: ScalarKind) -> Self {
        Self::with_domain(
            category,
            name,
            ValueDomain::Scalar {
                kind,
                required: false,
                template: Vec::new(),
            },
        )
    }

    fn with_domain(category: Category, name: impl Into<String>, domain: ValueDomain) -> Self {
        Self {
            name: name.into(),
            category,
            domain,
            default: None,
            summary: None,
            problems: Vec::new(),
        }
    }

    /// Append a legal value emitting the given flags
    pub fn value<I, S>(mut self, value: impl Into<String>, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = flags.into_iter().map(TokenTemplate::flag).collect();
        self.push_choice(value.into(), tokens);
        self
    }

    /// Append a legal value that emits nothing
    pub fn silent(mut self, value: impl Into<String>) -> Self {
        self.push_choice(value.into(), Vec::new());
        self
    }

    /// Append a legal value emitting arbitrary token templates
    pub fn value_with_tokens(mut self, value: impl Into<String>, tokens: Vec<TokenTemplate>) -> Self {
        self.push_choice(value.into(), tokens);
        self
    }

    fn push_choice(&mut self, value: String, tokens: Vec<TokenTemplate>) {
        match &mut self.domain {
            ValueDomain::Choices { choices, .. } => choices.push(Choice { value, tokens }),
            ValueDomain::Scalar { .. } => self
                .problems
                .push(format!("scalar option cannot declare choice `{}`", value)),
        }
    }

    pub fn no_op(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        match &mut self.domain {
            ValueDomain::Choices { no_op, .. } => *no_op = Some(value),
            ValueDomain::Scalar { .. } => self
                .problems
                .push(format!("scalar option cannot declare no-op `{}`", value)),
        }
        self
    }

    pub fn required(mut self) -> Self {
        match &mut self.domain {
            ValueDomain::Scalar { required, .. } => *required = true,
            ValueDomain::Choices { .. } => self
                .problems
                .push("enumerated option cannot be marked required".to_string()),
        }
        self
    }

    pub fn template(mut self, tokens: Vec<TokenTemplate>) -> Self {
        match &mut self.domain {
            ValueDomain::Scalar { template, .. } => *template = tokens,
            ValueDomain::Choices { .. } => self
                .problems
                .push("enumerated option emits per value, not through a template".to_string()),
        }
        self
    }

    pub fn default_rule(mut self, rule: DefaultRule) -> Self {
        self.default = Some(rule);
        self
    }

    pub fn default_value(self, value: impl Into<String>) -> Self {
        self.default_rule(DefaultRule::fixed(value))
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn id(&self) -> String {
        self.category.qualify(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_id() {
        assert_eq!(Category::Linker.qualify("BuildId"), "Linker.BuildId");
        let spec = OptionSpec::choice(Category::Compiler, "Optimization");
        assert_eq!(spec.id(), "Compiler.Optimization");
    }

    #[test]
    fn test_rule_values_include_fallback() {
        let rule = DefaultRule::per_variant([("Debug", "Disabled")], "MaxSpeed");
        assert_eq!(rule.values(), vec!["Disabled", "MaxSpeed"]);
    }

    #[test]
    fn test_scalar_spec_rejects_choice_data() {
        let spec = OptionSpec::scalar(Category::General, "AndroidApkName", ScalarKind::String)
            .value("x", ["-x"])
            .no_op("x");
        assert_eq!(spec.problems.len(), 2);
    }
}
