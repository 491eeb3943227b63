//! Resolution Requests
//!
//! Per-variant input to the resolver, optionally described as a TOML
//! document listing a project's build variants.

use serde::Deserialize;
use tracing::debug;

use crate::configuration::Assignments;
use crate::context::{ResolutionContext, ToolchainIdentity, VariantClass};
use crate::error::RequestError;

/// Context plus sparse assignments for one build variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub context: ResolutionContext,
    pub assignments: Assignments,
}

impl ResolutionRequest {
    pub fn new(context: ResolutionContext, assignments: Assignments) -> Self {
        Self {
            context,
            assignments,
        }
    }
}

/// A project's build variants
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestSet {
    /// Toolchain shared by variants that do not name their own
    pub toolchain: Option<String>,

    #[serde(default, rename = "variant")]
    pub variants: Vec<VariantEntry>,
}

/// One `[[variant]]` entry
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariantEntry {
    pub name: String,

    /// Defaults to the class named by the leading segment of `name`
    pub class: Option<VariantClass>,

    pub architecture: String,

    pub toolchain: Option<String>,

    #[serde(default)]
    pub options: Assignments,
}

impl RequestSet {
    /// Parse a request document into one request per variant
    pub fn from_toml_str(source: &str) -> Result<Vec<ResolutionRequest>, RequestError> {
        let set: RequestSet = toml::from_str(source)?;
        set.into_requests()
    }

    pub fn into_requests(self) -> Result<Vec<ResolutionRequest>, RequestError> {
        let shared = self.toolchain;
        self.variants
            .into_iter()
            .map(|entry| -> Result<ResolutionRequest, RequestError> {
                let toolchain = entry
                    .toolchain
                    .or_else(|| shared.clone())
                    .ok_or_else(|| RequestError::MissingToolchain {
                        variant: entry.name.clone(),
                    })?;
                let class = entry
                    .class
                    .unwrap_or_else(|| VariantClass::from_variant_name(&entry.name));

                debug!("Request {} ({}) for {}/{}", entry.name, class, toolchain, entry.architecture);

                Ok(ResolutionRequest::new(
                    ResolutionContext::new(
                        ToolchainIdentity::new(toolchain, entry.architecture),
                        entry.name,
                        class,
                    ),
                    entry.options,
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
toolchain = "agde-clang"

[[variant]]
name = "Debug"
architecture = "arm64-v8a"

[[variant]]
name = "Release_armv7"
class = "Release"
architecture = "armeabi-v7a"

[variant.options]
"General.ThumbMode" = "Thumb"
FloatABI = "Softfp"

[[variant]]
name = "Profile"
architecture = "x86_64"
toolchain = "agde-clang-17"

[[variant]]
name = "Debug_arm64-v8a"
architecture = "arm64-v8a"
"#;

    #[test]
    fn test_parse_request_document() {
        let requests = RequestSet::from_toml_str(SAMPLE).unwrap();
        assert_eq!(requests.len(), 4);

        assert_eq!(requests[0].context.class, VariantClass::Debug);
        assert!(requests[0].assignments.is_empty());

        let armv7 = &requests[1];
        assert_eq!(armv7.context.class, VariantClass::Release);
        assert_eq!(armv7.context.toolchain.architecture, "armeabi-v7a");
        let options: Vec<_> = armv7.assignments.iter().collect();
        assert_eq!(options, vec![("General.ThumbMode", "Thumb"), ("FloatABI", "Softfp")]);

        let profile = &requests[2];
        assert_eq!(profile.context.class, VariantClass::Named("Profile".into()));
        assert_eq!(profile.context.toolchain.name, "agde-clang-17");

        let debug_arm64 = &requests[3];
        assert_eq!(debug_arm64.context.class, VariantClass::Debug);
        assert_eq!(debug_arm64.context.variant, "Debug_arm64-v8a");
    }

    #[test]
    fn test_missing_toolchain() {
        let source = r#"
[[variant]]
name = "Debug"
architecture = "x86"
"#;
        let err = RequestSet::from_toml_str(source).unwrap_err();
        assert!(matches!(err, RequestError::MissingToolchain { variant } if variant == "Debug"));
    }

    #[test]
    fn test_malformed_document() {
        let err = RequestSet::from_toml_str("[[variant]]\nname = 3").unwrap_err();
        assert!(matches!(err, RequestError::Parse(_)));
    }
}
