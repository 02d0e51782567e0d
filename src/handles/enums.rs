use std::sync::Arc;

use crate::{handles::TypeHandle, Error, Result};

#[derive(Debug)]
struct EnumMemberInfo {
    name: String,
    value: i64,
    integer_type: TypeHandle,
}

/// A handle to one enumerator of an enumeration type.
///
/// Carries the enumerator's name, its value (sign-extended to 64 bits) and the
/// enumeration's backing integer type.
#[derive(Debug, Clone, Default)]
pub struct EnumMemberHandle {
    inner: Option<Arc<EnumMemberInfo>>,
}

impl EnumMemberHandle {
    /// An explicitly invalid enumerator handle.
    #[must_use]
    pub fn invalid() -> Self {
        EnumMemberHandle { inner: None }
    }

    pub(crate) fn new(name: String, value: i64, integer_type: TypeHandle) -> Self {
        EnumMemberHandle {
            inner: Some(Arc::new(EnumMemberInfo {
                name,
                value,
                integer_type,
            })),
        }
    }

    /// Whether this handle references a real enumerator.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// The enumerator's name; empty if invalid.
    #[must_use]
    pub fn name(&self) -> String {
        self.inner
            .as_ref()
            .map(|info| info.name.clone())
            .unwrap_or_default()
    }

    /// The enumerator's signed value; 0 if invalid.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.inner.as_ref().map_or(0, |info| info.value)
    }

    /// The enumerator's value reinterpreted as unsigned; 0 if invalid.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn unsigned_value(&self) -> u64 {
        self.value() as u64
    }

    /// The enumeration's backing integer type; invalid handle propagates.
    #[must_use]
    pub fn integer_type(&self) -> TypeHandle {
        self.inner
            .as_ref()
            .map(|info| info.integer_type.clone())
            .unwrap_or_default()
    }
}

/// An ordered sequence of [`EnumMemberHandle`] values, in declaration order.
///
/// Produced by [`TypeHandle::enum_members`]. Indexed access follows the same
/// contract as [`crate::handles::TypeListHandle::get`].
#[derive(Debug, Clone, Default)]
pub struct EnumMemberListHandle {
    entries: Vec<EnumMemberHandle>,
}

impl EnumMemberListHandle {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        EnumMemberListHandle {
            entries: Vec::new(),
        }
    }

    /// Append an enumerator to the end of the list.
    ///
    /// Invalid handles are silently dropped.
    pub fn append(&mut self, member: EnumMemberHandle) {
        if member.is_valid() {
            self.entries.push(member);
        }
    }

    /// The enumerator at `index`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfRange`] when `index` is past the end of the list.
    pub fn get(&self, index: usize) -> Result<EnumMemberHandle> {
        self.entries.get(index).cloned().ok_or(Error::OutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Number of enumerators in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the list holds no enumerators.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the enumerators in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, EnumMemberHandle> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a EnumMemberListHandle {
    type Item = &'a EnumMemberHandle;
    type IntoIter = std::slice::Iter<'a, EnumMemberHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
