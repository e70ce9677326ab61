//! Request-scoped capability container.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type CapabilityEntry = Arc<dyn Any + Send + Sync>;

/// An immutable, typed map of injectable capabilities.
///
/// One container is assembled per inbound call — base capabilities from the
/// server configuration, then whatever the interceptor chain adds — and is
/// frozen before the handler runs. It is visible to the handler only through
/// the call context and carries no ambient global state.
#[derive(Clone, Default)]
pub struct Capabilities {
    entries: Arc<HashMap<TypeId, CapabilityEntry>>,
}

impl Capabilities {
    /// Returns an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the capability of type `T`, when one was provided.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|entry| entry.downcast::<T>().ok())
    }

    /// Returns `true` when a capability of type `T` is present.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Returns the number of capabilities in the container.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the container is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Starts a builder seeded with this container's entries.
    #[must_use]
    pub fn to_builder(&self) -> CapabilitiesBuilder {
        CapabilitiesBuilder {
            entries: self.entries.as_ref().clone(),
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Capabilities")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// Staged construction of a [`Capabilities`] container.
///
/// Interceptors receive the builder during call setup and may add or replace
/// capabilities; the dispatcher freezes it before handler execution.
#[derive(Default)]
pub struct CapabilitiesBuilder {
    entries: HashMap<TypeId, CapabilityEntry>,
}

impl CapabilitiesBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provides a capability, replacing any previous one of the same type.
    pub fn provide<T: Send + Sync + 'static>(&mut self, capability: T) -> &mut Self {
        self.provide_arc(Arc::new(capability))
    }

    /// Provides an already-shared capability, replacing any previous one of
    /// the same type.
    pub fn provide_arc<T: Send + Sync + 'static>(&mut self, capability: Arc<T>) -> &mut Self {
        self.entries.insert(TypeId::of::<T>(), capability);
        self
    }

    /// Returns the staged capability of type `T`, when present.
    ///
    /// Later interceptors use this to see what earlier links provided.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.entries
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|entry| entry.downcast::<T>().ok())
    }

    /// Provides a capability, builder-style.
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, capability: T) -> Self {
        self.provide(capability);
        self
    }

    /// Freezes the builder into an immutable container.
    #[must_use]
    pub fn freeze(self) -> Capabilities {
        Capabilities {
            entries: Arc::new(self.entries),
        }
    }
}

impl fmt::Debug for CapabilitiesBuilder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CapabilitiesBuilder")
            .field("len", &self.entries.len())
            .finish()
    }
}
