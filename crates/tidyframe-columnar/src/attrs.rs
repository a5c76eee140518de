use crate::error::{ColumnError, ColumnResult};
use crate::identity::StorageId;
use crate::types::Value;
use std::collections::{BTreeMap, HashMap};
use std::ops::Deref;
use std::sync::Arc;

/// Table-level metadata: column names in order, grouping keys and extra attributes.
///
/// The name index is built alongside the names, so a set never holds duplicate names.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeSet {
    names: Vec<String>,
    index: HashMap<String, usize>,
    groups: Vec<String>,
    extras: BTreeMap<String, Value>,
}

impl AttributeSet {
    pub fn new(names: Vec<String>) -> ColumnResult<Self> {
        let mut set = Self::default();
        set.set_names(names)?;
        Ok(set)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn extras(&self) -> &BTreeMap<String, Value> {
        &self.extras
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extras.get(key)
    }

    pub fn set_names(&mut self, names: Vec<String>) -> ColumnResult<()> {
        let mut index = HashMap::with_capacity(names.len());
        for (idx, name) in names.iter().enumerate() {
            if index.insert(name.clone(), idx).is_some() {
                return Err(ColumnError::DuplicateName(name.clone()));
            }
        }
        self.names = names;
        self.index = index;
        Ok(())
    }

    pub fn set_groups(&mut self, groups: Vec<String>) {
        self.groups = groups;
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: Value) {
        self.extras.insert(key.into(), value);
    }

    pub fn clear_extras(&mut self) {
        self.extras.clear();
    }
}

/// Shared handle to an immutable [`AttributeSet`].
///
/// Changing any attribute goes through [`Attributes::derive`], which always allocates a new set;
/// untouched tables keep pointing at the original.
#[derive(Clone, Debug, PartialEq)]
pub struct Attributes {
    inner: Arc<AttributeSet>,
}

impl Attributes {
    pub fn new(set: AttributeSet) -> Self {
        Self {
            inner: Arc::new(set),
        }
    }

    pub fn from_names(names: Vec<String>) -> ColumnResult<Self> {
        Ok(Self::new(AttributeSet::new(names)?))
    }

    /// Copy the set, apply `change`, and wrap the result in a new allocation.
    pub fn derive(
        &self,
        change: impl FnOnce(&mut AttributeSet) -> ColumnResult<()>,
    ) -> ColumnResult<Self> {
        let mut set = (*self.inner).clone();
        change(&mut set)?;
        Ok(Self::new(set))
    }

    /// Same contents, new allocation.
    pub fn rebuilt(&self) -> Self {
        Self::new((*self.inner).clone())
    }

    pub fn identity(&self) -> StorageId {
        StorageId::of(&self.inner)
    }

    pub fn shares_storage(&self, other: &Attributes) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Deref for Attributes {
    type Target = AttributeSet;

    fn deref(&self) -> &AttributeSet {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_names_are_rejected() {
        let err = AttributeSet::new(vec!["a".into(), "b".into(), "a".into()]).unwrap_err();
        assert_eq!(err, ColumnError::DuplicateName("a".into()));
    }

    #[test]
    fn derive_allocates_even_without_changes() {
        let attrs = Attributes::from_names(vec!["a".into()]).unwrap();
        let derived = attrs.derive(|_| Ok(())).unwrap();
        assert_eq!(*attrs, *derived);
        assert!(!attrs.shares_storage(&derived));
        assert_ne!(attrs.identity(), derived.identity());
    }
}
