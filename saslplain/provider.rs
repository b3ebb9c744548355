//! Bundles of mechanism factories that are installed into a registry together.

use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::plain::{PlainFactory, PLAIN};
use crate::registry::MechanismRegistry;

pub trait Provider {
    fn name(&self) -> &'static str;
    fn version(&self) -> f64;
    fn info(&self) -> &'static str;

    /// Register every mechanism this provider supplies.
    fn install(&self, registry: &mut MechanismRegistry) -> Result<(), ConfigurationError>;
}

/// Server-side PLAIN support.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainProvider;

impl PlainProvider {
    pub const NAME: &'static str = "SaslPlain";
}

impl Provider for PlainProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn version(&self) -> f64 {
        1.0
    }

    fn info(&self) -> &'static str {
        "Plain SASL provider"
    }

    fn install(&self, registry: &mut MechanismRegistry) -> Result<(), ConfigurationError> {
        tracing::debug!(provider = self.name(), version = self.version(), "installing provider");
        registry.register(PLAIN, Arc::new(PlainFactory))?;
        Ok(())
    }
}
