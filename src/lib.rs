//! R-Droid Flags - toolchain option resolution
//!
//! Turns a project's sparse per-variant option choices into ordered
//! compiler/linker flag tokens.
//!
//! ## Architecture
//!
//! - `r-droid-option-engine`: target-agnostic declaration tables, default
//!   resolution, validation, emission and the resolution pipeline
//! - `r-droid-agde-options`: the AGDE clang catalogue and ABI list
//!
//! Callers hand the resolver a context and assignments per build variant
//! and splice the returned tokens into a project file or invocation.

#![warn(missing_docs)]
#![warn(clippy::all)]

use thiserror::Error;
use tracing::info;

// Re-export member crates
pub use r_droid_option_engine as engine;
pub use r_droid_agde_options as agde;

use r_droid_option_engine::{Emission, RequestError, RequestSet, ResolutionFailure, TableError};

/// Errors that stop a whole document from being resolved
#[derive(Error, Debug)]
pub enum FlagsError {
    /// The AGDE declaration table failed to load
    #[error("Declaration table error: {0}")]
    Table(#[from] TableError),

    /// The request document could not be read
    #[error("Request error: {0}")]
    Request(#[from] RequestError),
}

/// Result type alias for document-level operations
pub type Result<T> = std::result::Result<T, FlagsError>;

/// Resolve every variant of a TOML request document against the AGDE
/// table. Per-variant failures are returned alongside successes; a variant
/// naming another toolchain or an unknown ABI fails on its own.
pub fn resolve_agde_document(source: &str) -> Result<Vec<std::result::Result<Emission, ResolutionFailure>>> {
    let resolver = agde::resolver()?;
    let requests = RequestSet::from_toml_str(source)?;

    info!("Resolving {} build variant(s)", requests.len());
    Ok(resolver.resolve_all(&requests))
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use r_droid_option_engine::{
        Assignments, DeclarationTable, Emission, FlagToken, ResolutionContext, ResolutionFailure,
        ResolveError, Resolver, ToolchainIdentity, VariantClass,
    };
    pub use r_droid_agde_options::AbiTarget;
}
