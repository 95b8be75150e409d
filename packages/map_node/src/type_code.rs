//! One-code-one-type registry.
//!
//! Polymorphic payloads in the binary form are preceded by a small integer
//! code telling the reader which type follows. Two types must never share a
//! code, and this registry is where that is enforced.

use crate::{
    error::Result,
    bail,
    ensure,
};
use std::{
    any::{TypeId, type_name},
    collections::HashMap,
    sync::OnceLock,
};
use parking_lot::Mutex;


/// Code meaning "no shape follows".
pub const NO_TYPE_CODE: u16 = 0;


#[derive(Debug, Default)]
pub struct TypeCodeRegistry {
    bound: HashMap<u16, (TypeId, &'static str)>,
}

impl TypeCodeRegistry {
    pub fn new() -> Self {
        TypeCodeRegistry::default()
    }

    /// Bind `code` to `T`, or confirm that it is already bound to `T`.
    /// Returns the code for convenient inline use.
    pub fn confirm<T: 'static>(&mut self, code: u16) -> Result<u16> {
        ensure!(
            code != NO_TYPE_CODE,
            TypeCode,
            "type code {} is reserved, cannot bind it to {}",
            NO_TYPE_CODE,
            type_name::<T>(),
        );
        let id = TypeId::of::<T>();
        match self.bound.get(&code) {
            Some(&(bound_id, _)) if bound_id == id => (),
            Some(&(_, bound_name)) => bail!(
                TypeCode,
                "type code {} is used by both {} and {}",
                code,
                bound_name,
                type_name::<T>(),
            ),
            None => {
                trace!(code, ty = type_name::<T>(), "binding type code");
                self.bound.insert(code, (id, type_name::<T>()));
            }
        }
        Ok(code)
    }

    pub fn type_name_of(&self, code: u16) -> Option<&'static str> {
        self.bound.get(&code).map(|&(_, name)| name)
    }

    pub fn len(&self) -> usize {
        self.bound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}


/// Process-wide registry, created on first use.
pub fn global() -> &'static Mutex<TypeCodeRegistry> {
    static GLOBAL: OnceLock<Mutex<TypeCodeRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(Default::default)
}

/// Confirm a binding against the process-wide registry.
pub fn confirm_global<T: 'static>(code: u16) -> Result<u16> {
    global().lock().confirm::<T>(code)
}


#[test]
fn test_confirm_is_idempotent() {
    let mut reg = TypeCodeRegistry::new();
    assert_eq!(reg.confirm::<f32>(7).unwrap(), 7);
    assert_eq!(reg.confirm::<f32>(7).unwrap(), 7);
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.type_name_of(7), Some("f32"));
}

#[test]
fn test_conflicting_types_are_rejected() {
    use crate::error::ErrorKind;

    let mut reg = TypeCodeRegistry::new();
    reg.confirm::<f32>(3).unwrap();
    let e = reg.confirm::<i32>(3).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TypeCode);
    assert_eq!(reg.type_name_of(3), Some("f32"));

    let e = reg.confirm::<i32>(NO_TYPE_CODE).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TypeCode);
    assert!(reg.type_name_of(NO_TYPE_CODE).is_none());
}
