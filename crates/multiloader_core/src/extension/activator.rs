//! Entrypoint activation with per-entrypoint failure isolation.
//!
//! # Responsibility
//! - Resolve, construct and activate every entrypoint of one descriptor.
//! - Contain any failure (including panics) to the entrypoint that raised it.
//!
//! # Invariants
//! - Groups run in manifest order; refs run in array order.
//! - Every ref is attempted exactly once.
//! - A failing ref never stops sibling refs or sibling groups.

use crate::extension::isolation::IsolatedLoader;
use crate::extension::manifest::ExtensionDescriptor;
use crate::extension::symbols::{Activatable, BoxError, TypeDefinition};
use crate::logging::describe_panic_payload;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Activation protocol that ran for one entrypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invoker {
    Run,
    OnInitialize,
}

/// Result of one entrypoint attempt.
#[derive(Debug)]
pub struct EntrypointOutcome {
    pub group: String,
    pub target: String,
    pub result: Result<Invoker, ActivationError>,
}

impl EntrypointOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Ordered outcomes for every entrypoint of one extension.
#[derive(Debug, Default)]
pub struct ActivationReport {
    pub outcomes: Vec<EntrypointOutcome>,
}

impl ActivationReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Outcome for `target`, if it was attempted.
    pub fn outcome(&self, target: &str) -> Option<&EntrypointOutcome> {
        self.outcomes.iter().find(|outcome| outcome.target == target)
    }
}

/// Activates every entrypoint declared by `descriptor`.
///
/// `label` prefixes every log line (normally the ecosystem name).
pub fn activate_entrypoints(
    descriptor: &ExtensionDescriptor,
    loader: &IsolatedLoader<'_>,
    label: &str,
) -> ActivationReport {
    let mut report = ActivationReport::default();
    for (group, refs) in &descriptor.entrypoint_groups {
        for entry in refs {
            let target = entry.target.as_str();
            let result = activate_one(loader, target);
            match &result {
                Ok(invoker) => info!(
                    "event=entrypoint_ok module=activator loader={label} group={group} target={target} invoker={invoker:?}"
                ),
                Err(err) => error!(
                    "event=entrypoint_failed module=activator status=error loader={label} group={group} target={target} archive={} cause={err}",
                    loader.archive()
                ),
            }
            report.outcomes.push(EntrypointOutcome {
                group: group.clone(),
                target: target.to_string(),
                result,
            });
        }
    }
    report
}

fn activate_one(loader: &IsolatedLoader<'_>, target: &str) -> Result<Invoker, ActivationError> {
    let (definition, _origin) =
        loader
            .resolve(target)
            .ok_or_else(|| ActivationError::ResolutionFailed {
                target: target.to_string(),
                archive: loader.archive().to_string(),
            })?;

    match catch_unwind(AssertUnwindSafe(|| construct_and_invoke(definition))) {
        Ok(result) => result,
        Err(payload) => Err(ActivationError::Panicked {
            target: target.to_string(),
            payload: describe_panic_payload(payload.as_ref()),
        }),
    }
}

fn construct_and_invoke(definition: &TypeDefinition) -> Result<Invoker, ActivationError> {
    let target = definition.name();
    match definition.activatable() {
        Activatable::RunInvoker(construct) => {
            let mut instance = construct().map_err(|err| construction_failed(target, err))?;
            instance
                .run()
                .map_err(|err| invocation_failed(target, err))?;
            Ok(Invoker::Run)
        }
        Activatable::NamedMethodInvoker(construct) => {
            let mut instance = construct().map_err(|err| construction_failed(target, err))?;
            instance
                .on_initialize()
                .map_err(|err| invocation_failed(target, err))?;
            Ok(Invoker::OnInitialize)
        }
        Activatable::Inert(construct) => {
            construct().map_err(|err| construction_failed(target, err))?;
            Err(ActivationError::ActivationUnsupported {
                target: target.to_string(),
            })
        }
    }
}

fn construction_failed(target: &str, cause: BoxError) -> ActivationError {
    ActivationError::ConstructionFailed {
        target: target.to_string(),
        cause: cause.to_string(),
    }
}

fn invocation_failed(target: &str, cause: BoxError) -> ActivationError {
    ActivationError::InvocationFailed {
        target: target.to_string(),
        cause: cause.to_string(),
    }
}

/// Entrypoint-level failures. Never propagated past the activator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationError {
    ResolutionFailed { target: String, archive: String },
    ConstructionFailed { target: String, cause: String },
    ActivationUnsupported { target: String },
    InvocationFailed { target: String, cause: String },
    Panicked { target: String, payload: String },
}

impl Display for ActivationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolutionFailed { target, archive } => {
                write!(f, "cannot resolve `{target}` in host or `{archive}`")
            }
            Self::ConstructionFailed { target, cause } => {
                write!(f, "cannot construct `{target}`: {cause}")
            }
            Self::ActivationUnsupported { target } => write!(
                f,
                "`{target}` exposes neither `run` nor `on_initialize`"
            ),
            Self::InvocationFailed { target, cause } => {
                write!(f, "`{target}` failed during activation: {cause}")
            }
            Self::Panicked { target, payload } => {
                write!(f, "`{target}` panicked: {payload}")
            }
        }
    }
}

impl Error for ActivationError {}
