//! Resolution Pipeline
//!
//! Drives one build variant through
//! `Collecting -> DefaultsApplied -> Validated -> Emitted | Failed`.
//! Each step runs any step it depends on, so callers may stop at any stage
//! to inspect the intermediate state.

use std::fmt;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::configuration::{Assignments, ResolvedConfiguration, ValueSource};
use crate::context::ResolutionContext;
use crate::defaults::default_for;
use crate::emitter::{Emitter, FlagToken};
use crate::error::{ResolutionFailure, ResolveError};
use crate::request::ResolutionRequest;
use crate::table::DeclarationTable;
use crate::validator::Validator;

/// Stage of a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionStage {
    Collecting,
    DefaultsApplied,
    Validated,
    Emitted,
    Failed,
}

impl ResolutionStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ResolutionStage::Emitted | ResolutionStage::Failed)
    }
}

impl fmt::Display for ResolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionStage::Collecting => "collecting",
            ResolutionStage::DefaultsApplied => "defaults-applied",
            ResolutionStage::Validated => "validated",
            ResolutionStage::Emitted => "emitted",
            ResolutionStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Successful outcome of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emission {
    pub context: ResolutionContext,
    pub configuration: ResolvedConfiguration,
    pub tokens: Vec<FlagToken>,
}

impl Emission {
    /// Value-less tokens as command-line arguments, in emission order
    pub fn arguments(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| t.value.is_none())
            .map(|t| t.flag.as_str())
            .collect()
    }

    /// Tokens carrying a value as name/value pairs, in emission order
    pub fn properties(&self) -> Vec<(&str, &str)> {
        self.tokens
            .iter()
            .filter_map(|t| t.value.as_deref().map(|v| (t.flag.as_str(), v)))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One build variant moving through the pipeline
#[derive(Debug)]
pub struct Resolution<'t> {
    table: &'t DeclarationTable,
    context: ResolutionContext,
    stage: ResolutionStage,
    explicit: IndexMap<&'t str, String>,
    configuration: ResolvedConfiguration,
    errors: Vec<ResolveError>,
}

impl<'t> Resolution<'t> {
    /// Collect explicit assignments; unknown options are recorded as errors
    pub fn new(
        table: &'t DeclarationTable,
        context: ResolutionContext,
        assignments: &Assignments,
    ) -> Self {
        let mut explicit = IndexMap::with_capacity(assignments.len());
        let mut errors = Vec::new();

        for (option, value) in assignments.iter() {
            match table.lookup(option) {
                Some(declaration) => {
                    explicit.insert(declaration.id(), value.to_string());
                }
                None => errors.push(ResolveError::UnknownOption {
                    option: option.to_string(),
                }),
            }
        }

        debug!(
            "Collecting {}: {} explicit assignment(s)",
            context.variant,
            explicit.len()
        );

        Self {
            table,
            context,
            stage: ResolutionStage::Collecting,
            explicit,
            configuration: ResolvedConfiguration::default(),
            errors,
        }
    }

    pub fn stage(&self) -> ResolutionStage {
        self.stage
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn configuration(&self) -> &ResolvedConfiguration {
        &self.configuration
    }

    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    /// Merge explicit values over defaults for every declared option
    pub fn apply_defaults(mut self) -> Self {
        if self.stage != ResolutionStage::Collecting {
            return self;
        }

        let mut configuration = ResolvedConfiguration::default();
        for declaration in self.table.declarations() {
            match self.explicit.get(declaration.id()) {
                Some(value) => configuration.insert(declaration.id(), value, ValueSource::Explicit),
                None => configuration.insert(
                    declaration.id(),
                    default_for(declaration, &self.context.class),
                    ValueSource::Default,
                ),
            }
        }

        self.configuration = configuration;
        self.transition(ResolutionStage::DefaultsApplied);
        self
    }

    /// Check the merged configuration; any error so far fails the resolution
    pub fn validate(self) -> Self {
        let mut this = self.apply_defaults();
        if this.stage != ResolutionStage::DefaultsApplied {
            return this;
        }

        let found = Validator::new(this.table).validate(&this.context, &this.configuration);
        this.errors.extend(found);

        if this.errors.is_empty() {
            this.transition(ResolutionStage::Validated);
        } else {
            warn!(
                "Resolution of {} failed with {} error(s)",
                this.context.variant,
                this.errors.len()
            );
            this.transition(ResolutionStage::Failed);
        }
        this
    }

    /// Render the validated configuration, or report every error found
    pub fn emit(self) -> Result<Emission, ResolutionFailure> {
        let mut this = self.validate();
        if this.stage == ResolutionStage::Failed {
            return Err(ResolutionFailure {
                variant: this.context.variant,
                errors: this.errors,
            });
        }

        let tokens = Emitter::new(this.table).emit(&this.configuration);
        this.transition(ResolutionStage::Emitted);
        info!(
            "Resolved {} for {}: {} token(s)",
            this.context.variant,
            this.context.toolchain,
            tokens.len()
        );

        Ok(Emission {
            context: this.context,
            configuration: this.configuration,
            tokens,
        })
    }

    fn transition(&mut self, next: ResolutionStage) {
        debug!("{}: {} -> {}", self.context.variant, self.stage, next);
        self.stage = next;
    }
}

/// Entry point for resolving build variants against one table
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    table: &'t DeclarationTable,
}

impl<'t> Resolver<'t> {
    pub fn new(table: &'t DeclarationTable) -> Self {
        Self { table }
    }

    /// The table every resolution of this resolver runs against
    pub fn table(&self) -> &'t DeclarationTable {
        self.table
    }

    pub fn resolve(
        &self,
        context: ResolutionContext,
        assignments: &Assignments,
    ) -> Result<Emission, ResolutionFailure> {
        Resolution::new(self.table, context, assignments).emit()
    }

    /// Resolve independent variants in parallel; outcomes keep request order
    pub fn resolve_all(
        &self,
        requests: &[ResolutionRequest],
    ) -> Vec<Result<Emission, ResolutionFailure>> {
        requests
            .par_iter()
            .map(|request| self.resolve(request.context.clone(), &request.assignments))
            .collect()
    }
}
