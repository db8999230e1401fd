//! Builds padlock accessors from configuration.
//!
//! The set of accessor kinds is closed: [`AccessType`] picks the transport
//! and, for `custom`, an [`InstanceSpec`] chain describes how to assemble the
//! accessor.

use crate::accessor::{PadlockAccessor, TracedPadlock};
use crate::config::{AccessType, InstanceSpec, PadlockConfig, DEFAULT_KEYPAD_SIZE};
use crate::error::{Error, Result};
use crate::lock::{Padlock, WriteLatency};
use tracing::{debug, warn};

/// Builder for boxed [`PadlockAccessor`] instances
#[derive(Debug, Clone, Default)]
pub struct PadlockBuilder {
    config: Option<PadlockConfig>,
    keypad_size: Option<usize>,
    latency: Option<WriteLatency>,
}

impl PadlockBuilder {
    /// Creates a builder with no configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration to build from
    pub fn with_config(mut self, config: PadlockConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the keypad size; overrides the configured one
    pub fn with_keypad_size(mut self, keypad_size: usize) -> Self {
        self.keypad_size = Some(keypad_size);
        self
    }

    /// Sets the write latency; overrides the configured `fast` flag
    pub fn with_latency(mut self, latency: WriteLatency) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Builds the accessor.
    ///
    /// Without a configuration this is a local padlock of the explicit keypad
    /// size, or [`DEFAULT_KEYPAD_SIZE`].
    pub fn build(&self) -> Result<Box<dyn PadlockAccessor>> {
        let access_type = self
            .config
            .as_ref()
            .map(|c| c.access_type)
            .unwrap_or_default();
        let keypad_size = self
            .keypad_size
            .or_else(|| self.config.as_ref().map(|c| c.keypad_size))
            .unwrap_or(DEFAULT_KEYPAD_SIZE);

        debug!(
            "Building {} padlock accessor (keypad size {})",
            access_type, keypad_size
        );

        match access_type {
            AccessType::Rest | AccessType::Socket | AccessType::Cli => {
                Err(Error::unsupported_access_type(access_type))
            }
            AccessType::Custom => {
                match self.config.as_ref().and_then(|c| c.instance.as_ref()) {
                    Some(instance) => self.build_instance(instance),
                    None => {
                        warn!("Custom access type without an instance; using a local padlock");
                        self.local(keypad_size)
                    }
                }
            }
            AccessType::Local => self.local(keypad_size),
        }
    }

    fn latency(&self) -> WriteLatency {
        match (self.latency, &self.config) {
            (Some(latency), _) => latency,
            (None, Some(config)) if config.fast => WriteLatency::none(),
            _ => WriteLatency::from_env(),
        }
    }

    fn local(&self, keypad_size: usize) -> Result<Box<dyn PadlockAccessor>> {
        let padlock = Padlock::new(keypad_size)?.with_latency(self.latency());
        Ok(Box::new(padlock))
    }

    fn build_instance(&self, instance: &InstanceSpec) -> Result<Box<dyn PadlockAccessor>> {
        match instance {
            InstanceSpec::Padlock { keypad_size } => self.local(*keypad_size),
            InstanceSpec::Preset { passcode } => {
                let padlock = Padlock::with_passcode(passcode.clone())?.with_latency(self.latency());
                Ok(Box::new(padlock))
            }
            InstanceSpec::Traced { inner } => {
                let inner = self.build_instance(inner)?;
                Ok(Box::new(TracedPadlock::new(inner)))
            }
        }
    }
}
