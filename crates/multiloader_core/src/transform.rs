//! Transformation subsystem seam.
//!
//! # Responsibility
//! - Define the contract used to forward transformation config paths.
//! - Provide `ConfigLedger`, an in-process implementation that records them.
//!
//! # Invariants
//! - `initialize` succeeds at most once per subsystem value.
//! - Declarations are accepted only after initialization.
//! - Declarations are kept in call order; duplicates are kept, not merged.
//! - Paths are recorded verbatim, without trimming or validation.

use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Contract of the external transformation/instrumentation subsystem.
pub trait TransformationSubsystem {
    /// One-time setup; must run before any `declare_config`.
    fn initialize(&mut self) -> Result<(), TransformError>;

    /// Forwards one config path verbatim.
    fn declare_config(&mut self, path: &str) -> Result<(), TransformError>;
}

/// Recording subsystem used by the CLI host and tests.
#[derive(Debug, Default)]
pub struct ConfigLedger {
    initialized: bool,
    declared: Vec<String>,
}

impl ConfigLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Declared config paths, in declaration order.
    pub fn declared(&self) -> &[String] {
        &self.declared
    }
}

impl TransformationSubsystem for ConfigLedger {
    fn initialize(&mut self) -> Result<(), TransformError> {
        if self.initialized {
            return Err(TransformError::AlreadyInitialized);
        }
        self.initialized = true;
        info!("event=transform_init module=transform status=ok");
        Ok(())
    }

    fn declare_config(&mut self, path: &str) -> Result<(), TransformError> {
        if !self.initialized {
            return Err(TransformError::NotInitialized);
        }
        self.declared.push(path.to_string());
        Ok(())
    }
}

/// Transformation subsystem errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    NotInitialized,
    AlreadyInitialized,
}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "transformation subsystem is not initialized"),
            Self::AlreadyInitialized => {
                write!(f, "transformation subsystem is already initialized")
            }
        }
    }
}

impl Error for TransformError {}
