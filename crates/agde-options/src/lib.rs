//! AGDE Option Catalogue
//!
//! Declaration data for the Android Game Development Extension clang
//! profile, loaded once per process and shared read-only between
//! resolutions.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;

use r_droid_option_engine::{
    DeclarationTable, ResolutionContext, Resolver, TableError, ToolchainIdentity, VariantClass,
};

/// Toolchain name used in resolution contexts
pub const TOOLCHAIN_NAME: &str = "agde-clang";

/// Declaration table source
pub const DECLARATIONS: &str = include_str!("../data/agde.toml");

static TABLE: OnceCell<DeclarationTable> = OnceCell::new();

/// The AGDE declaration table, built on first use
pub fn table() -> Result<&'static DeclarationTable, TableError> {
    TABLE.get_or_try_init(|| {
        info!("Loading AGDE declaration table");
        DeclarationTable::from_toml_str(DECLARATIONS)
    })
}

/// Resolver over the shared AGDE table
pub fn resolver() -> Result<Resolver<'static>, TableError> {
    table().map(Resolver::new)
}

/// Target ABI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbiTarget {
    #[serde(rename = "arm64-v8a")]
    Arm64V8a,
    #[serde(rename = "armeabi-v7a")]
    ArmeabiV7a,
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x86_64")]
    X86_64,
}

impl AbiTarget {
    /// ABI name as used by the NDK and in request documents
    pub fn as_str(&self) -> &'static str {
        match self {
            AbiTarget::Arm64V8a => "arm64-v8a",
            AbiTarget::ArmeabiV7a => "armeabi-v7a",
            AbiTarget::X86 => "x86",
            AbiTarget::X86_64 => "x86_64",
        }
    }

    /// Clang target triple
    pub fn clang_triple(&self) -> &'static str {
        match self {
            AbiTarget::Arm64V8a => "aarch64-linux-android",
            AbiTarget::ArmeabiV7a => "armv7a-linux-androideabi",
            AbiTarget::X86 => "i686-linux-android",
            AbiTarget::X86_64 => "x86_64-linux-android",
        }
    }

    /// Whether thumb mode and float-ABI selection apply
    pub fn is_arm32(&self) -> bool {
        matches!(self, AbiTarget::ArmeabiV7a)
    }

    pub fn all_targets() -> &'static [AbiTarget] {
        &[
            AbiTarget::Arm64V8a,
            AbiTarget::ArmeabiV7a,
            AbiTarget::X86,
            AbiTarget::X86_64,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all_targets().iter().copied().find(|abi| abi.as_str() == name)
    }

    pub fn toolchain(&self) -> ToolchainIdentity {
        ToolchainIdentity::new(TOOLCHAIN_NAME, self.as_str())
    }

    /// Resolution context for a variant named `<class>_<abi>`
    pub fn context(&self, class: VariantClass) -> ResolutionContext {
        let variant = format!("{}_{}", class, self.as_str());
        ResolutionContext::new(self.toolchain(), variant, class)
    }
}
