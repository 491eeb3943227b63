//! Default Resolver
//!
//! Computes the effective default of an option for a build-variant class.

use indexmap::IndexMap;

use crate::context::VariantClass;
use crate::declaration::{DefaultRule, OptionDeclaration};
use crate::table::DeclarationTable;

impl DefaultRule {
    /// The value this rule yields for `class`; total by construction
    pub fn value_for(&self, class: &VariantClass) -> &str {
        match self {
            DefaultRule::Fixed(value) => value,
            DefaultRule::PerVariant { by_class, fallback } => match class {
                VariantClass::Named(label) => by_class.get(&VariantClass::parse(label)),
                known => by_class.get(known),
            }
            .map_or(fallback.as_str(), String::as_str),
        }
    }
}

/// Effective default of one declaration
pub fn default_for<'t>(declaration: &'t OptionDeclaration, class: &VariantClass) -> &'t str {
    declaration.default_rule().value_for(class)
}

/// Defaults of every declared option for `class`, keyed by option id in
/// declaration order
pub fn defaults_for<'t>(table: &'t DeclarationTable, class: &VariantClass) -> IndexMap<&'t str, &'t str> {
    table
        .declarations()
        .map(|d| (d.id(), default_for(d, class)))
        .collect()
}
