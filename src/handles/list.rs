use crate::{handles::TypeHandle, Error, Result};

/// An ordered, growable sequence of [`TypeHandle`] values.
///
/// Lists are how the facade returns multiple types at once (function argument
/// lists, lookup results). Appending an invalid handle is a no-op, so a list
/// only ever holds valid handles at insertion time. Cloning a list copies the
/// sequence while sharing each entry's backing record; growing or shrinking the
/// clone leaves the original untouched.
///
/// # Examples
///
/// ```rust
/// use typescope::engine::TypeEngine;
/// use typescope::handles::{TypeHandle, TypeListHandle};
/// use typescope::kinds::BasicType;
///
/// let engine = TypeEngine::new();
/// let int_ty = engine.basic_type(BasicType::Int).unwrap();
///
/// let mut list = TypeListHandle::new();
/// list.append(TypeHandle::new(&engine, &int_ty));
/// list.append(TypeHandle::invalid()); // ignored
///
/// assert_eq!(list.len(), 1);
/// assert_eq!(list.get(0).unwrap().basic_type(), BasicType::Int);
/// assert!(list.get(1).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeListHandle {
    entries: Vec<TypeHandle>,
}

impl TypeListHandle {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        TypeListHandle {
            entries: Vec::new(),
        }
    }

    /// Append a handle to the end of the list.
    ///
    /// Invalid handles are silently dropped.
    pub fn append(&mut self, handle: TypeHandle) {
        if handle.is_valid() {
            self.entries.push(handle);
        }
    }

    /// The handle at `index`.
    ///
    /// # Errors
    /// Returns [`Error::OutOfRange`] when `index` is past the end of the list.
    pub fn get(&self, index: usize) -> Result<TypeHandle> {
        self.entries.get(index).cloned().ok_or(Error::OutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Number of handles in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the list holds no handles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the handles in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, TypeHandle> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a TypeListHandle {
    type Item = &'a TypeHandle;
    type IntoIter = std::slice::Iter<'a, TypeHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Extend<TypeHandle> for TypeListHandle {
    fn extend<I: IntoIterator<Item = TypeHandle>>(&mut self, iter: I) {
        for handle in iter {
            self.append(handle);
        }
    }
}
