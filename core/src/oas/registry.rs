#![deny(missing_docs)]

//! # Type Registry
//!
//! Owns every named type of a compilation. A name is *reserved* before the schema
//! behind it is described, so a schema that refers back to itself (directly or through
//! another component) only ever sees an alias to the reserved name.
//!
//! Reservation is idempotent per [`TypeOrigin`]: asking twice for the same component,
//! response, or synthesis hint path yields the same name. Distinct origins that want
//! the same name get a numeric suffix.

use crate::error::{AppError, AppResult};
use crate::oas::models::{Schema, TypeDefinition};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Highest numeric suffix tried before giving up on a name.
const MAX_NAME_SUFFIX: usize = 1000;

/// What a named type was created for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    /// `#/components/schemas/{key}`.
    Component(String),
    /// `#/components/responses/{key}`.
    Response(String),
    /// Inline schema at the given hint path.
    Synthesized(Vec<String>),
}

#[derive(Debug)]
struct Slot {
    json_name: Option<String>,
    schema: Option<Schema>,
    external: bool,
}

/// Name → definition table with cycle tracking.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    slots: IndexMap<String, Slot>,
    by_origin: HashMap<TypeOrigin, String>,
    resolving: HashSet<String>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a name for `origin`, preferring `base`.
    ///
    /// Returns the name and whether it was newly reserved.
    pub fn reserve(&mut self, base: &str, origin: TypeOrigin) -> AppResult<(String, bool)> {
        if let Some(existing) = self.by_origin.get(&origin) {
            return Ok((existing.clone(), false));
        }

        let name = if !self.slots.contains_key(base) {
            base.to_string()
        } else {
            (2..=MAX_NAME_SUFFIX)
                .map(|n| format!("{base}{n}"))
                .find(|candidate| !self.slots.contains_key(candidate))
                .ok_or_else(|| {
                    AppError::NameCollision(format!(
                        "no free name for '{}' after {} attempts",
                        base, MAX_NAME_SUFFIX
                    ))
                })?
        };

        let json_name = match &origin {
            TypeOrigin::Component(key) | TypeOrigin::Response(key) => Some(key.clone()),
            TypeOrigin::Synthesized(_) => None,
        };
        self.slots.insert(
            name.clone(),
            Slot {
                json_name,
                schema: None,
                external: false,
            },
        );
        self.by_origin.insert(origin, name.clone());
        Ok((name, true))
    }

    /// Name previously reserved for `origin`.
    pub fn name_for(&self, origin: &TypeOrigin) -> Option<&str> {
        self.by_origin.get(origin).map(String::as_str)
    }

    /// Stores the descriptor of a reserved name.
    pub fn fill(&mut self, name: &str, schema: Schema) -> AppResult<()> {
        match self.slots.get_mut(name) {
            Some(slot) => {
                slot.schema = Some(schema);
                Ok(())
            }
            None => Err(AppError::General(format!(
                "type '{}' was filled without being reserved",
                name
            ))),
        }
    }

    /// Marks a reserved name as declared outside this compilation unit.
    pub fn mark_external(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.external = true;
        }
    }

    /// Whether `name` is declared outside this compilation unit.
    pub fn is_external(&self, name: &str) -> bool {
        self.slots.get(name).is_some_and(|s| s.external)
    }

    /// Descriptor of a filled name.
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.slots.get(name).and_then(|s| s.schema.as_ref())
    }

    /// Whether `name` already has a descriptor.
    pub fn is_filled(&self, name: &str) -> bool {
        self.schema(name).is_some()
    }

    /// Enters the description of `name`. Returns `false` if it is already in progress.
    pub fn begin(&mut self, name: &str) -> bool {
        self.resolving.insert(name.to_string())
    }

    /// Leaves the description of `name`.
    pub fn end(&mut self, name: &str) {
        self.resolving.remove(name);
    }

    /// Whether `name` is being described further up the stack.
    pub fn is_resolving(&self, name: &str) -> bool {
        self.resolving.contains(name)
    }

    /// Current position, for [`TypeRegistry::names_since`].
    pub fn mark(&self) -> usize {
        self.slots.len()
    }

    /// Names reserved after `mark`, in reservation order.
    pub fn names_since(&self, mark: usize) -> Vec<String> {
        self.slots
            .iter()
            .skip(mark)
            .filter(|(_, slot)| !slot.external)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Finalizes the registry into emitted definitions.
    ///
    /// Fails if a reserved name never received a descriptor.
    pub fn into_definitions(self) -> AppResult<Vec<TypeDefinition>> {
        let mut definitions = Vec::with_capacity(self.slots.len());
        for (name, slot) in self.slots {
            if slot.external {
                continue;
            }
            let schema = slot.schema.ok_or_else(|| {
                AppError::General(format!("type '{}' was reserved but never described", name))
            })?;
            definitions.push(TypeDefinition {
                name,
                json_name: slot.json_name,
                schema,
            });
        }
        Ok(definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_is_idempotent_per_origin() {
        let mut reg = TypeRegistry::new();
        let origin = TypeOrigin::Synthesized(vec!["Pet".into(), "owner".into()]);
        let (first, fresh) = reg.reserve("PetOwner", origin.clone()).unwrap();
        assert!(fresh);
        let (second, fresh_again) = reg.reserve("PetOwner", origin).unwrap();
        assert_eq!(first, second);
        assert!(!fresh_again);
    }

    #[test]
    fn test_collisions_get_suffixes() {
        let mut reg = TypeRegistry::new();
        let (a, _) = reg
            .reserve("Pet", TypeOrigin::Component("Pet".into()))
            .unwrap();
        let (b, _) = reg
            .reserve("Pet", TypeOrigin::Component("pet".into()))
            .unwrap();
        let (c, _) = reg
            .reserve("Pet", TypeOrigin::Synthesized(vec!["Pet".into()]))
            .unwrap();
        assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("Pet", "Pet2", "Pet3"));
    }

    #[test]
    fn test_unfilled_slot_is_error() {
        let mut reg = TypeRegistry::new();
        reg.reserve("Ghost", TypeOrigin::Component("Ghost".into()))
            .unwrap();
        assert!(reg.into_definitions().is_err());
    }

    #[test]
    fn test_external_slots_are_not_emitted() {
        let mut reg = TypeRegistry::new();
        reg.reserve("Error", TypeOrigin::Component("Error".into()))
            .unwrap();
        reg.mark_external("Error");
        reg.reserve("Pet", TypeOrigin::Component("Pet".into()))
            .unwrap();
        reg.fill("Pet", Schema::primitive("String")).unwrap();
        let defs = reg.into_definitions().unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "Pet");
        assert_eq!(defs[0].json_name.as_deref(), Some("Pet"));
    }

    #[test]
    fn test_resolving_set_and_marks() {
        let mut reg = TypeRegistry::new();
        let mark = reg.mark();
        reg.reserve("A", TypeOrigin::Synthesized(vec!["A".into()]))
            .unwrap();
        assert!(reg.begin("A"));
        assert!(!reg.begin("A"));
        assert!(reg.is_resolving("A"));
        reg.end("A");
        assert!(!reg.is_resolving("A"));
        assert_eq!(reg.names_since(mark), vec!["A".to_string()]);
    }
}
