//! Resolution Context
//!
//! Identifies what a resolution is performed for: the toolchain, its target
//! architecture and the build variant.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Build-variant class used to select variant-scoped defaults
///
/// `Named` never holds a Debug or Release label; build it through
/// [`VariantClass::named`] or [`VariantClass::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VariantClass {
    Debug,
    Release,
    Named(String),
}

impl VariantClass {
    /// Label of the class as written in tables and documents
    pub fn as_str(&self) -> &str {
        match self {
            VariantClass::Debug => "Debug",
            VariantClass::Release => "Release",
            VariantClass::Named(name) => name,
        }
    }

    /// Parse a class label; "debug" and "release" match in any case
    pub fn parse(label: &str) -> Self {
        if label.eq_ignore_ascii_case("debug") {
            VariantClass::Debug
        } else if label.eq_ignore_ascii_case("release") {
            VariantClass::Release
        } else {
            VariantClass::Named(label.to_string())
        }
    }

    /// Class for a caller-supplied label, normalised like `parse`
    pub fn named(label: impl Into<String>) -> Self {
        VariantClass::from(label.into())
    }

    /// Class of a conventional variant name such as `Debug_arm64-v8a`,
    /// taken from the segment before the first `_`, `|` or `-`
    pub fn from_variant_name(name: &str) -> Self {
        let leading = name
            .split(|c: char| matches!(c, '_' | '|' | '-'))
            .next()
            .unwrap_or(name);
        VariantClass::parse(leading)
    }

    /// The same class with a known label moved out of `Named`
    pub fn normalized(&self) -> Self {
        match self {
            VariantClass::Named(label) => VariantClass::parse(label),
            known => known.clone(),
        }
    }
}

impl Default for VariantClass {
    fn default() -> Self {
        VariantClass::Debug
    }
}

impl From<String> for VariantClass {
    fn from(label: String) -> Self {
        match VariantClass::parse(&label) {
            VariantClass::Named(_) => VariantClass::Named(label),
            known => known,
        }
    }
}

impl From<&str> for VariantClass {
    fn from(label: &str) -> Self {
        VariantClass::parse(label)
    }
}

impl From<VariantClass> for String {
    fn from(class: VariantClass) -> Self {
        match class {
            VariantClass::Named(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for VariantClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The compiler/linker target a resolution is performed for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolchainIdentity {
    /// Toolchain name (e.g. "agde-clang")
    pub name: String,

    /// Target architecture, opaque to the engine (e.g. "armeabi-v7a")
    pub architecture: String,
}

impl ToolchainIdentity {
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
        }
    }
}

impl fmt::Display for ToolchainIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.architecture)
    }
}

/// Everything a resolution needs to know besides the assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionContext {
    pub toolchain: ToolchainIdentity,

    /// Build variant name (e.g. "Debug_arm64")
    pub variant: String,

    /// Class used for default selection
    pub class: VariantClass,
}

impl ResolutionContext {
    pub fn new(toolchain: ToolchainIdentity, variant: impl Into<String>, class: VariantClass) -> Self {
        Self {
            toolchain,
            variant: variant.into(),
            class,
        }
    }

    /// Context whose variant name is the class label itself
    pub fn for_class(toolchain: ToolchainIdentity, class: VariantClass) -> Self {
        let variant = class.as_str().to_string();
        Self::new(toolchain, variant, class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_class_parse() {
        assert_eq!(VariantClass::parse("debug"), VariantClass::Debug);
        assert_eq!(VariantClass::parse("RELEASE"), VariantClass::Release);
        assert_eq!(
            VariantClass::parse("Profile"),
            VariantClass::Named("Profile".into())
        );
    }

    #[test]
    fn test_variant_class_string_round_trip() {
        let class: VariantClass = String::from("Release").into();
        assert_eq!(class, VariantClass::Release);
        assert_eq!(String::from(VariantClass::Named("Retail".into())), "Retail");
    }

    #[test]
    fn test_named_normalises_known_labels() {
        assert_eq!(VariantClass::named("debug"), VariantClass::Debug);
        assert_eq!(VariantClass::named("Retail"), VariantClass::Named("Retail".into()));
        assert_eq!(VariantClass::Named("Release".into()).normalized(), VariantClass::Release);
    }

    #[test]
    fn test_class_from_variant_name() {
        assert_eq!(VariantClass::from_variant_name("Debug_arm64-v8a"), VariantClass::Debug);
        assert_eq!(VariantClass::from_variant_name("release|x86"), VariantClass::Release);
        assert_eq!(VariantClass::from_variant_name("Release-armv7"), VariantClass::Release);
        assert_eq!(VariantClass::from_variant_name("Debug"), VariantClass::Debug);
        assert_eq!(
            VariantClass::from_variant_name("Profile_x86_64"),
            VariantClass::Named("Profile".into())
        );
    }

    #[test]
    fn test_context_for_class() {
        let ctx = ResolutionContext::for_class(
            ToolchainIdentity::new("agde-clang", "arm64-v8a"),
            VariantClass::Release,
        );
        assert_eq!(ctx.variant, "Release");
        assert_eq!(ctx.toolchain.to_string(), "agde-clang/arm64-v8a");
    }
}
