//! Option Resolution Engine
//!
//! Resolves sparse per-variant option assignments against a declaration
//! table and emits toolchain flag tokens in a reproducible order. The engine
//! is target-agnostic; flag tables are data.

pub mod error;
pub mod context;
pub mod declaration;
pub mod table;
pub mod configuration;
pub mod defaults;
pub mod validator;
pub mod emitter;
pub mod pipeline;
pub mod request;

pub use error::{ResolveError, ResolutionFailure, TableError, RequestError};
pub use context::{ResolutionContext, ToolchainIdentity, VariantClass};
pub use declaration::{
    Category, Choice, DefaultRule, OptionDeclaration, OptionKind, OptionSpec, ScalarKind,
    TokenTemplate, ValueDomain,
};
pub use table::{ConflictRule, DeclarationTable, TargetSupport};
pub use configuration::{Assignments, OptionAssignment, ResolvedConfiguration, ResolvedValue, ValueSource};
pub use defaults::{default_for, defaults_for};
pub use validator::{check_value, Validator};
pub use emitter::{tokens_for, Emitter, FlagToken};
pub use pipeline::{Emission, Resolution, ResolutionStage, Resolver};
pub use request::{RequestSet, ResolutionRequest, VariantEntry};
