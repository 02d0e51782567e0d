use std::fmt;
use std::sync::{Arc, Weak};

use crate::{
    engine::{MethodRecord, TypeEngine},
    handles::TypeHandle,
    kinds::MemberFunctionKind,
    Error, Result,
};

#[derive(Debug, Clone)]
struct MemberFunctionInfo {
    engine: Weak<TypeEngine>,
    method: MethodRecord,
}

/// A handle to one member function of an aggregate type.
///
/// Produced by [`TypeHandle::member_function_at`]. The handle exposes the
/// function's name, its classification, its declared function type, and its
/// signature broken into return and argument types.
#[derive(Debug, Clone, Default)]
pub struct MemberFunctionHandle {
    inner: Option<Arc<MemberFunctionInfo>>,
}

impl MemberFunctionHandle {
    /// An explicitly invalid member-function handle.
    #[must_use]
    pub fn invalid() -> Self {
        MemberFunctionHandle { inner: None }
    }

    pub(crate) fn from_method(engine: &Arc<TypeEngine>, method: &MethodRecord) -> Self {
        MemberFunctionHandle {
            inner: Some(Arc::new(MemberFunctionInfo {
                engine: Arc::downgrade(engine),
                method: method.clone(),
            })),
        }
    }

    // Engine-alive guard, mirroring the parent handle's validity rule.
    fn guard(&self) -> Option<(Arc<TypeEngine>, &MethodRecord)> {
        let info = self.inner.as_ref()?;
        let engine = info.engine.upgrade()?;
        Some((engine, &info.method))
    }

    /// Whether this handle references a live member function.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.guard().is_some()
    }

    /// The function's name; empty if invalid.
    #[must_use]
    pub fn name(&self) -> String {
        match self.guard() {
            Some((_, method)) => method.name.clone(),
            None => String::new(),
        }
    }

    /// The function's classification;
    /// [`MemberFunctionKind::Unknown`] if invalid.
    #[must_use]
    pub fn kind(&self) -> MemberFunctionKind {
        match self.guard() {
            Some((_, method)) => method.kind,
            None => MemberFunctionKind::Unknown,
        }
    }

    /// The declared function type; invalid handle propagates.
    #[must_use]
    pub fn declared_type(&self) -> TypeHandle {
        match self.guard() {
            Some((engine, method)) => match method.ty.upgrade() {
                Some(ty) => TypeHandle::new(&engine, &ty),
                None => TypeHandle::invalid(),
            },
            None => TypeHandle::invalid(),
        }
    }

    /// The function's return type; invalid handle propagates.
    #[must_use]
    pub fn return_type(&self) -> TypeHandle {
        match self.guard() {
            Some((engine, method)) => match method.result.upgrade() {
                Some(result) => TypeHandle::new(&engine, &result),
                None => TypeHandle::invalid(),
            },
            None => TypeHandle::invalid(),
        }
    }

    /// Number of declared arguments; 0 if invalid.
    #[must_use]
    pub fn argument_count(&self) -> usize {
        match self.guard() {
            Some((_, method)) => method.arguments.len(),
            None => 0,
        }
    }

    /// The argument type at `index`; invalid handle if out of range.
    #[must_use]
    pub fn argument_at(&self, index: usize) -> TypeHandle {
        match self.guard() {
            Some((engine, method)) => match method.arguments.get(index).and_then(|a| a.upgrade()) {
                Some(argument) => TypeHandle::new(&engine, &argument),
                None => TypeHandle::invalid(),
            },
            None => TypeHandle::invalid(),
        }
    }

    /// Render the function's signature into a text sink, e.g. `int get(char, int)`.
    ///
    /// # Errors
    /// Returns [`Error::Unresolved`] when the handle is invalid or its signature
    /// can no longer be resolved.
    pub fn describe<W: fmt::Write>(&self, out: &mut W) -> Result<()> {
        let (engine, method) = self.guard().ok_or(Error::Unresolved)?;
        engine.describe_member_function(method, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TypeBuilder;
    use crate::kinds::{BasicType, RecordKind};

    fn sample_class(engine: &Arc<TypeEngine>) -> crate::engine::TypeRecordRc {
        let int_ty = engine.basic_type(BasicType::Int).unwrap();
        let char_ty = engine.basic_type(BasicType::Char).unwrap();
        let getter_ty = engine.function_type(&int_ty, &[char_ty.clone()]);
        TypeBuilder::record(engine, RecordKind::Class, "Sample")
            .method("get", MemberFunctionKind::InstanceMethod, &getter_ty)
            .unwrap()
            .build()
    }

    #[test]
    fn test_invalid_function_sentinels() {
        let function = MemberFunctionHandle::invalid();
        assert!(!function.is_valid());
        assert_eq!(function.name(), "");
        assert_eq!(function.kind(), MemberFunctionKind::Unknown);
        assert!(!function.declared_type().is_valid());
        assert!(!function.return_type().is_valid());
        assert_eq!(function.argument_count(), 0);
        assert!(!function.argument_at(0).is_valid());

        let mut out = String::new();
        assert!(matches!(
            function.describe(&mut out),
            Err(Error::Unresolved)
        ));
    }

    #[test]
    fn test_member_function_accessors() {
        let engine = TypeEngine::new();
        let class = sample_class(&engine);
        let handle = TypeHandle::new(&engine, &class);

        assert_eq!(handle.member_function_count(), 1);
        let function = handle.member_function_at(0);
        assert!(function.is_valid());
        assert_eq!(function.name(), "get");
        assert_eq!(function.kind(), MemberFunctionKind::InstanceMethod);
        assert_eq!(function.return_type().basic_type(), BasicType::Int);
        assert_eq!(function.argument_count(), 1);
        assert_eq!(function.argument_at(0).basic_type(), BasicType::Char);
        assert!(!function.argument_at(1).is_valid());
        assert!(function.declared_type().is_function());
    }

    #[test]
    fn test_describe_signature() {
        let engine = TypeEngine::new();
        let class = sample_class(&engine);
        let function = TypeHandle::new(&engine, &class).member_function_at(0);

        let mut out = String::new();
        function.describe(&mut out).unwrap();
        assert_eq!(out, "int get(char)");
    }

    #[test]
    fn test_engine_drop_invalidates_function_handle() {
        let engine = TypeEngine::new();
        let class = sample_class(&engine);
        let function = TypeHandle::new(&engine, &class).member_function_at(0);
        assert!(function.is_valid());

        drop((engine, class));
        assert!(!function.is_valid());
        assert_eq!(function.name(), "");
    }
}
