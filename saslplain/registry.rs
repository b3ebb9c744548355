use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::mechanism::ServerMechanism;
use crate::mechname::Mechname;
use crate::provider::{PlainProvider, Provider};
use crate::validate::Validator;

/// What a mechanism exposes on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SecurityProperties {
    /// The password crosses the wire in the clear.
    pub plaintext: bool,
    /// Peers can authenticate without an identity.
    pub anonymous: bool,
    /// Passive observers can run an offline dictionary attack.
    pub dictionary: bool,
}

/// Restrictions on which mechanisms may be offered.
///
/// The default policy allows every mechanism.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    #[serde(default)]
    pub no_plaintext: bool,
    #[serde(default)]
    pub no_anonymous: bool,
    #[serde(default)]
    pub no_dictionary: bool,
}

impl Policy {
    pub fn permits(&self, properties: &SecurityProperties) -> bool {
        !(self.no_plaintext && properties.plaintext
            || self.no_anonymous && properties.anonymous
            || self.no_dictionary && properties.dictionary)
    }
}

/// Constructor for [`ServerMechanism`]s of one or more mechanism names.
pub trait MechanismFactory: Send + Sync {
    /// The names this factory can create mechanisms for that `policy` permits.
    fn mechanism_names(&self, policy: &Policy) -> Vec<Mechname>;

    fn properties(&self, mechanism: &Mechname) -> SecurityProperties;

    /// Create a fresh mechanism instance.
    ///
    /// Returns `Ok(None)` if this factory does not produce `mechanism`. Fails if the
    /// mechanism needs a validator and none was given.
    fn create(
        &self,
        mechanism: &str,
        validator: Option<Validator>,
    ) -> Result<Option<Box<dyn ServerMechanism>>, ConfigurationError>;
}

/// Mapping from mechanism name to the factory producing it.
///
/// Populate it during startup, then either hand it out by shared reference or freeze it with
/// [`install`]. All lookups take `&self` and are safe to run concurrently.
#[derive(Default)]
pub struct MechanismRegistry {
    factories: HashMap<Mechname, Arc<dyn MechanismFactory>>,
}

impl MechanismRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in provider installed.
    pub fn with_defaults() -> Result<Self, ConfigurationError> {
        let mut registry = Self::new();
        PlainProvider.install(&mut registry)?;
        Ok(registry)
    }

    fn check_declared(
        name: &Mechname,
        factory: &dyn MechanismFactory,
    ) -> Result<(), ConfigurationError> {
        if factory.mechanism_names(&Policy::default()).contains(name) {
            Ok(())
        } else {
            Err(ConfigurationError::UndeclaredMechanism { name: name.clone() })
        }
    }

    /// Store `factory` under `name`, replacing and returning any factory previously
    /// registered under it.
    ///
    /// Replacing a factory is allowed but usually points at a configuration mistake, so it is
    /// logged. Use [`MechanismRegistry::register_unique`] to refuse it instead.
    pub fn register(
        &mut self,
        name: Mechname,
        factory: Arc<dyn MechanismFactory>,
    ) -> Result<Option<Arc<dyn MechanismFactory>>, ConfigurationError> {
        Self::check_declared(&name, factory.as_ref())?;
        tracing::debug!(mechanism = %name, "registering mechanism");
        let previous = self.factories.insert(name.clone(), factory);
        if previous.is_some() {
            tracing::warn!(mechanism = %name, "replaced an already registered mechanism factory");
        }
        Ok(previous)
    }

    pub fn register_unique(
        &mut self,
        name: Mechname,
        factory: Arc<dyn MechanismFactory>,
    ) -> Result<(), ConfigurationError> {
        if self.factories.contains_key(&name) {
            return Err(ConfigurationError::DuplicateMechanism { name });
        }
        self.register(name, factory).map(|_| ())
    }

    /// Start a negotiation for `name`.
    ///
    /// `Ok(None)` means the mechanism is not supported by this registry.
    pub fn create(
        &self,
        name: &str,
        validator: Option<Validator>,
    ) -> Result<Option<Box<dyn ServerMechanism>>, ConfigurationError> {
        match self.factories.get(name) {
            Some(factory) => factory.create(name, validator),
            None => {
                tracing::debug!(mechanism = name, "requested mechanism is not supported");
                Ok(None)
            }
        }
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn properties(&self, name: &str) -> Option<SecurityProperties> {
        self.factories
            .get_key_value(name)
            .map(|(name, factory)| factory.properties(name))
    }

    pub fn supported_names(&self) -> BTreeSet<Mechname> {
        self.factories.keys().cloned().collect()
    }

    /// Registered names that `policy` permits.
    pub fn supported_names_with(&self, policy: &Policy) -> BTreeSet<Mechname> {
        self.factories
            .iter()
            .filter(|(name, factory)| factory.mechanism_names(policy).contains(*name))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl fmt::Debug for MechanismRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MechanismRegistry")
            .field("mechanisms", &self.supported_names())
            .finish()
    }
}

static GLOBAL: OnceCell<MechanismRegistry> = OnceCell::new();

/// Freeze `registry` as the process-wide registry.
///
/// Can succeed only once, and only before the first call to [`global`].
pub fn install(
    registry: MechanismRegistry,
) -> Result<&'static MechanismRegistry, ConfigurationError> {
    let mut registry = Some(registry);
    let installed = GLOBAL.get_or_init(|| registry.take().unwrap_or_default());
    if registry.is_some() {
        return Err(ConfigurationError::AlreadyInstalled);
    }
    tracing::info!(mechanisms = installed.len(), "installed mechanism registry");
    Ok(installed)
}

/// The process-wide registry.
///
/// Installs [`MechanismRegistry::with_defaults`] if nothing has been installed yet. A failure
/// to build the defaults is returned and leaves the global unset.
pub fn global() -> Result<&'static MechanismRegistry, ConfigurationError> {
    GLOBAL.get_or_try_init(MechanismRegistry::with_defaults)
}
