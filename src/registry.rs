use std::collections::HashMap;

use slotmap::SlotMap;

use crate::compose::{Policy, compose};
use crate::error::DelegationError;
use crate::signature::{Delegate, SignatureFamily, SlotFn};

slotmap::new_key_type! {
    /// Stable handle to an installed slot, returned by [`SlotRegistry::install`].
    pub struct SlotKey;
}

#[derive(Debug)]
struct Slot {
    name: String,
    base: SlotFn,
    active: SlotFn,
}

/// Per-instance storage for delegatable method slots.
///
/// The owning host type installs one slot per delegatable method at
/// construction and keeps the returned [`SlotKey`] for invocation; its
/// ordinary method bodies forward to the `call_*` accessors, so callers
/// cannot tell a delegatable method from a plain one. Anyone holding a
/// mutable reference may register delegates by name.
///
/// Slots live as long as the registry; `active` is only ever replaced, never
/// removed. Callables are reference-counted without atomics, so the registry
/// is single-threaded by construction.
#[derive(Debug, Default)]
pub struct SlotRegistry {
    slots: SlotMap<SlotKey, Slot>,
    names: HashMap<String, SlotKey>,
}

impl SlotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a delegatable slot. Called once per name by the owning type,
    /// before any registration targets that name. The slot's signature family
    /// is fixed by `base` and never changes afterward.
    ///
    /// Installing the same name twice is a defect in the host type and fails
    /// with [`DelegationError::DuplicateInstall`].
    pub fn install(
        &mut self,
        name: impl Into<String>,
        base: SlotFn,
    ) -> Result<SlotKey, DelegationError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(DelegationError::DuplicateInstall(name));
        }

        let family = base.family();
        let key = self.slots.insert(Slot {
            name: name.clone(),
            active: base.clone(),
            base,
        });
        self.names.insert(name.clone(), key);

        tracing::debug!(slot = %name, signature = family.describe(), "installed delegatable slot");
        Ok(key)
    }

    /// Register a delegate against an installed slot. `policy` is one of the
    /// literal tokens `"before"`, `"after"`, or `"replace"`.
    ///
    /// Fails with [`DelegationError::NotDelegatable`] when no slot was
    /// installed under `name` with the delegate's signature family, and with
    /// [`DelegationError::InvalidPolicy`] for an unrecognized token. On any
    /// error the previously active implementation stays in force; on success
    /// the composed implementation replaces it and every subsequent
    /// invocation observes the new behavior.
    pub fn register(
        &mut self,
        name: &str,
        policy: &str,
        delegate: Delegate,
    ) -> Result<(), DelegationError> {
        let Some(&key) = self.names.get(name) else {
            return Err(DelegationError::NotDelegatable {
                name: name.to_string(),
                signature: delegate.family().describe(),
            });
        };

        let policy: Policy = policy.parse()?;
        let slot = &mut self.slots[key];
        slot.active = compose(name, &slot.active, delegate, policy)?;

        tracing::debug!(slot = %name, policy = ?policy, "registered delegate");
        Ok(())
    }

    /// The immutable base implementation installed for a slot.
    pub fn base(&self, key: SlotKey) -> &SlotFn {
        &self.slots[key].base
    }

    pub fn key(&self, name: &str) -> Option<SlotKey> {
        self.names.get(name).copied()
    }

    pub fn family(&self, name: &str) -> Option<SignatureFamily> {
        let key = self.key(name)?;
        Some(self.slots[key].active.family())
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    // -- Invocation. One accessor per signature family; the host's method
    // bodies forward here. Invoking a key through the wrong accessor is a
    // defect in the host type and panics, as does a key from another
    // registry.

    pub fn call_unit(&self, key: SlotKey) {
        match &self.slots[key].active {
            SlotFn::Unit(f) => f(),
            _ => self.family_mismatch(key, SignatureFamily::Unit),
        }
    }

    pub fn call_flag(&self, key: SlotKey, v: bool) {
        match &self.slots[key].active {
            SlotFn::Flag(f) => f(v),
            _ => self.family_mismatch(key, SignatureFamily::Flag),
        }
    }

    pub fn call_scalar(&self, key: SlotKey, x: f64) {
        match &self.slots[key].active {
            SlotFn::Scalar(f) => f(x),
            _ => self.family_mismatch(key, SignatureFamily::Scalar),
        }
    }

    pub fn call_buffer(&self, key: SlotKey, buf: &mut [f64]) {
        match &self.slots[key].active {
            SlotFn::Buffer(f) => f(buf),
            _ => self.family_mismatch(key, SignatureFamily::Buffer),
        }
    }

    pub fn call_scalar_buffer(&self, key: SlotKey, x: f64, buf: &mut [f64]) {
        match &self.slots[key].active {
            SlotFn::ScalarBuffer(f) => f(x, buf),
            _ => self.family_mismatch(key, SignatureFamily::ScalarBuffer),
        }
    }

    pub fn call_scalar_buffer_pair(&self, key: SlotKey, x: f64, a: &mut [f64], b: &mut [f64]) {
        match &self.slots[key].active {
            SlotFn::ScalarBufferPair(f) => f(x, a, b),
            _ => self.family_mismatch(key, SignatureFamily::ScalarBufferPair),
        }
    }

    pub fn call_buffer_triple(&self, key: SlotKey, a: &mut [f64], b: &mut [f64], c: &mut [f64]) {
        match &self.slots[key].active {
            SlotFn::BufferTriple(f) => f(a, b, c),
            _ => self.family_mismatch(key, SignatureFamily::BufferTriple),
        }
    }

    pub fn call_name_of_index(&self, key: SlotKey, i: usize) -> String {
        match &self.slots[key].active {
            SlotFn::NameOfIndex(f) => f(i),
            _ => self.family_mismatch(key, SignatureFamily::NameOfIndex),
        }
    }

    pub fn call_index_of_name(&self, key: SlotKey, name: &str) -> usize {
        match &self.slots[key].active {
            SlotFn::IndexOfName(f) => f(name),
            _ => self.family_mismatch(key, SignatureFamily::IndexOfName),
        }
    }

    pub fn call_scalar_of_scalar(&self, key: SlotKey, x: f64) -> f64 {
        match &self.slots[key].active {
            SlotFn::ScalarOfScalar(f) => f(x),
            _ => self.family_mismatch(key, SignatureFamily::ScalarOfScalar),
        }
    }

    fn family_mismatch(&self, key: SlotKey, expected: SignatureFamily) -> ! {
        let slot = &self.slots[key];
        panic!(
            "slot '{}' invoked as '{}' but installed as '{}'",
            slot.name,
            expected.describe(),
            slot.base.family().describe()
        );
    }
}
