use std::fmt;
use std::sync::Arc;

use crate::{
    engine::{ResolvedType, TypeEngine, TypeRecordRc, TypeShape},
    handles::{
        EnumMemberHandle, EnumMemberListHandle, MemberFunctionHandle, MemberHandle, TypeListHandle,
    },
    kinds::{BasicType, TemplateArgumentKind, TypeClass, TypeFlags, TypeResolution},
};

/// A lightweight, copyable handle to one resolved type.
///
/// The handle wraps an optional shared reference to a [`ResolvedType`] owned by a
/// [`TypeEngine`]. Cloning a handle shares the backing record; it never duplicates
/// type information. A handle is invalid when it was default-constructed, when a
/// derivation failed, or when its engine has been dropped — every query on an
/// invalid handle returns a documented sentinel instead of failing.
///
/// Queries about runtime shape (classification, members, derivations) consult the
/// dynamic representation when one is known; queries about the declaration (byte
/// size, basic-type enumeration, template arguments, names) consult the static
/// representation. See [`TypeResolution`].
///
/// # Examples
///
/// ```rust
/// use typescope::engine::TypeEngine;
/// use typescope::handles::TypeHandle;
/// use typescope::kinds::BasicType;
///
/// let engine = TypeEngine::new();
/// let int_ty = engine.basic_type(BasicType::Int).unwrap();
/// let handle = TypeHandle::new(&engine, &int_ty);
///
/// assert_eq!(handle.byte_size(), 4);
/// assert_eq!(handle.basic_type(), BasicType::Int);
/// assert!(handle.pointer_type().is_pointer());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeHandle {
    inner: Option<Arc<ResolvedType>>,
}

impl TypeHandle {
    /// An explicitly invalid handle.
    #[must_use]
    pub fn invalid() -> Self {
        TypeHandle { inner: None }
    }

    /// Create a handle for a record owned by `engine`.
    #[must_use]
    pub fn new(engine: &Arc<TypeEngine>, record: &TypeRecordRc) -> Self {
        TypeHandle {
            inner: Some(Arc::new(ResolvedType::new(engine, record.clone()))),
        }
    }

    /// Create a handle whose dynamic representation differs from the static one.
    #[must_use]
    pub fn with_dynamic(
        engine: &Arc<TypeEngine>,
        static_record: &TypeRecordRc,
        dynamic_record: &TypeRecordRc,
    ) -> Self {
        TypeHandle {
            inner: Some(Arc::new(ResolvedType::with_dynamic(
                engine,
                static_record.clone(),
                dynamic_record.clone(),
            ))),
        }
    }

    /// Create a handle sharing an existing backing pair.
    #[must_use]
    pub fn from_resolved(resolved: Arc<ResolvedType>) -> Self {
        TypeHandle {
            inner: Some(resolved),
        }
    }

    /// Whether this handle references a live resolved type.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.guard().is_some()
    }

    // The uniform precondition check: `None` when the handle is absent or the
    // backing engine is gone. Every query funnels through this.
    fn guard(&self) -> Option<&Arc<ResolvedType>> {
        self.inner.as_ref().filter(|resolved| resolved.is_valid())
    }

    // Resolve to (engine, record) under a resolution preference.
    fn delegate(&self, resolution: TypeResolution) -> Option<(Arc<TypeEngine>, TypeRecordRc)> {
        let resolved = self.guard()?;
        let engine = resolved.engine()?;
        Some((engine, resolved.record(resolution).clone()))
    }

    // Wrap an engine-derived record into a new handle, invalid on None.
    fn wrap(engine: &Arc<TypeEngine>, record: Option<TypeRecordRc>) -> TypeHandle {
        match record {
            Some(record) => TypeHandle::new(engine, &record),
            None => TypeHandle::invalid(),
        }
    }

    /// Storage size of the declared type in bytes; 0 if invalid.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        match self.delegate(TypeResolution::Static) {
            Some((_, record)) => record.byte_size,
            None => 0,
        }
    }

    /// Whether the runtime shape is a pointer; `false` if invalid.
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.type_class().contains(TypeClass::POINTER)
    }

    /// Whether the runtime shape is an array; `false` if invalid.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.type_class().contains(TypeClass::ARRAY)
    }

    /// Whether the runtime shape is a reference; `false` if invalid.
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.type_class().contains(TypeClass::REFERENCE)
    }

    /// Whether the runtime shape is a function type; `false` if invalid.
    #[must_use]
    pub fn is_function(&self) -> bool {
        self.type_class().contains(TypeClass::FUNCTION)
    }

    /// Whether the runtime shape is a typedef; `false` if invalid.
    #[must_use]
    pub fn is_typedef(&self) -> bool {
        self.type_class().contains(TypeClass::TYPEDEF)
    }

    /// Whether the runtime shape is an aggregate with a vtable; `false` if invalid.
    #[must_use]
    pub fn is_polymorphic_class(&self) -> bool {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => {
                engine.classify(&record).is_aggregate() && record.is_polymorphic
            }
            None => false,
        }
    }

    /// Whether the declared type's definition is complete; `false` if invalid.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        match self.delegate(TypeResolution::Static) {
            Some((_, record)) => record.is_complete,
            None => false,
        }
    }

    /// The pointer type `T *` for this type; invalid handle propagates.
    #[must_use]
    pub fn pointer_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => TypeHandle::new(&engine, &engine.pointer_to(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// The pointed-to type, for pointers and references; invalid otherwise.
    #[must_use]
    pub fn pointee_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => Self::wrap(&engine, engine.pointee(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// The lvalue reference type `T &` for this type; invalid handle propagates.
    #[must_use]
    pub fn reference_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => TypeHandle::new(&engine, &engine.reference_to(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// The result of dereferencing this type, looking through typedefs; invalid
    /// if this is not a pointer or reference.
    #[must_use]
    pub fn dereferenced_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => Self::wrap(&engine, engine.dereferenced(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// The target of a typedef; invalid if this is not a typedef.
    #[must_use]
    pub fn typedefed_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => Self::wrap(&engine, engine.typedef_target(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// This type with CV qualifiers stripped.
    #[must_use]
    pub fn unqualified_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => TypeHandle::new(&engine, &engine.unqualified(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// The canonical form of this type: qualifiers stripped and typedef chains
    /// followed to a fixpoint.
    #[must_use]
    pub fn canonical_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => TypeHandle::new(&engine, &engine.canonical(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// The element type of an array; invalid if this is not an array.
    #[must_use]
    pub fn array_element_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => Self::wrap(&engine, engine.array_element(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// The basic-type enumeration of the declared type;
    /// [`BasicType::Invalid`] if invalid or not a built-in.
    #[must_use]
    pub fn basic_type(&self) -> BasicType {
        match self.delegate(TypeResolution::Static) {
            Some((engine, record)) => engine.basic_kind(&record),
            None => BasicType::Invalid,
        }
    }

    /// Manufacture a handle for a built-in type in the same engine context.
    ///
    /// The result is independent of this handle's record but scoped to the same
    /// engine; invalid if this handle is invalid or `basic` is the sentinel.
    #[must_use]
    pub fn basic_type_handle(&self, basic: BasicType) -> TypeHandle {
        match self.delegate(TypeResolution::Static) {
            Some((engine, _)) => Self::wrap(&engine, engine.basic_type(basic)),
            None => TypeHandle::invalid(),
        }
    }

    /// The return type of a function type; invalid if the lookup fails.
    #[must_use]
    pub fn function_return_type(&self) -> TypeHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => Self::wrap(&engine, engine.function_return(&record)),
            None => TypeHandle::invalid(),
        }
    }

    /// The argument types of a function type, in declaration order.
    ///
    /// Empty if this is not a function type or the function takes no arguments.
    #[must_use]
    pub fn function_argument_types(&self) -> TypeListHandle {
        let mut list = TypeListHandle::new();
        if let Some((engine, record)) = self.delegate(TypeResolution::Dynamic) {
            for argument in engine.function_arguments(&record) {
                list.append(TypeHandle::new(&engine, &argument));
            }
        }
        list
    }

    /// Number of member functions; 0 if invalid.
    #[must_use]
    pub fn member_function_count(&self) -> usize {
        match self.delegate(TypeResolution::Dynamic) {
            Some((_, record)) => record.member_functions.len(),
            None => 0,
        }
    }

    /// The member function at `index`; invalid handle if the lookup fails.
    #[must_use]
    pub fn member_function_at(&self, index: usize) -> MemberFunctionHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => match record.member_functions.get(index) {
                Some(method) => MemberFunctionHandle::from_method(&engine, method),
                None => MemberFunctionHandle::invalid(),
            },
            None => MemberFunctionHandle::invalid(),
        }
    }

    /// Number of direct base classes; 0 if invalid.
    #[must_use]
    pub fn direct_base_class_count(&self) -> usize {
        match self.delegate(TypeResolution::Dynamic) {
            Some((_, record)) => record.direct_bases.len(),
            None => 0,
        }
    }

    /// The direct base class at `index`, with its bit offset from the engine;
    /// invalid member handle if the lookup fails.
    #[must_use]
    pub fn direct_base_class_at(&self, index: usize) -> MemberHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => match record.direct_bases.get(index) {
                Some(base) => match base.ty.upgrade() {
                    Some(base_ty) => MemberHandle::base(
                        TypeHandle::new(&engine, &base_ty),
                        base_ty.display_name().to_string(),
                        base.bit_offset,
                    ),
                    None => MemberHandle::invalid(),
                },
                None => MemberHandle::invalid(),
            },
            None => MemberHandle::invalid(),
        }
    }

    /// Number of virtual base classes; 0 if invalid.
    #[must_use]
    pub fn virtual_base_class_count(&self) -> usize {
        match self.delegate(TypeResolution::Dynamic) {
            Some((_, record)) => record.virtual_bases.len(),
            None => 0,
        }
    }

    /// The virtual base class at `index`; invalid member handle if the lookup fails.
    #[must_use]
    pub fn virtual_base_class_at(&self, index: usize) -> MemberHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => match record.virtual_bases.get(index) {
                Some(base) => match base.ty.upgrade() {
                    Some(base_ty) => MemberHandle::base(
                        TypeHandle::new(&engine, &base_ty),
                        base_ty.display_name().to_string(),
                        base.bit_offset,
                    ),
                    None => MemberHandle::invalid(),
                },
                None => MemberHandle::invalid(),
            },
            None => MemberHandle::invalid(),
        }
    }

    /// Number of data fields; 0 if invalid.
    #[must_use]
    pub fn field_count(&self) -> usize {
        match self.delegate(TypeResolution::Dynamic) {
            Some((_, record)) => record.fields.len(),
            None => 0,
        }
    }

    /// The field at `index`, with name, bit offset and bitfield metadata;
    /// invalid member handle if the lookup fails.
    #[must_use]
    pub fn field_at(&self, index: usize) -> MemberHandle {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => match record.fields.get(index) {
                Some(field) => match field.ty.upgrade() {
                    Some(field_ty) => MemberHandle::field(
                        TypeHandle::new(&engine, &field_ty),
                        field.name.clone(),
                        field.bit_offset,
                        field.bitfield_width,
                    ),
                    None => MemberHandle::invalid(),
                },
                None => MemberHandle::invalid(),
            },
            None => MemberHandle::invalid(),
        }
    }

    /// The enumerators of an enumeration, in declaration order.
    ///
    /// Each member carries its name, value and the enum's backing integer type.
    /// Empty if this is not an enumeration.
    #[must_use]
    pub fn enum_members(&self) -> EnumMemberListHandle {
        let mut list = EnumMemberListHandle::new();
        if let Some((engine, record)) = self.delegate(TypeResolution::Dynamic) {
            let canonical = engine.canonical(&record);
            if let TypeShape::Enum { backing } = &canonical.shape {
                let backing_ty = Self::wrap(&engine, backing.upgrade());
                for enumerator in &canonical.enumerators {
                    list.append(EnumMemberHandle::new(
                        enumerator.name.clone(),
                        enumerator.value,
                        backing_ty.clone(),
                    ));
                }
            }
        }
        list
    }

    /// The structural classification; [`TypeClass::INVALID`] if invalid.
    #[must_use]
    pub fn type_class(&self) -> TypeClass {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => engine.classify(&record),
            None => TypeClass::INVALID,
        }
    }

    /// Number of template arguments of the declared type; 0 if invalid.
    #[must_use]
    pub fn template_argument_count(&self) -> usize {
        match self.delegate(TypeResolution::Static) {
            Some((_, record)) => record.template_args.len(),
            None => 0,
        }
    }

    /// The template argument type at `index`; invalid handle if the slot does not
    /// hold a type or the index is out of range.
    #[must_use]
    pub fn template_argument_type(&self, index: usize) -> TypeHandle {
        match self.delegate(TypeResolution::Static) {
            Some((engine, record)) => match record.template_args.get(index) {
                Some(argument) => {
                    Self::wrap(&engine, argument.ty.as_ref().and_then(|ty| ty.upgrade()))
                }
                None => TypeHandle::invalid(),
            },
            None => TypeHandle::invalid(),
        }
    }

    /// The template argument kind at `index`;
    /// [`TemplateArgumentKind::Null`] if invalid or out of range.
    #[must_use]
    pub fn template_argument_kind(&self, index: usize) -> TemplateArgumentKind {
        match self.delegate(TypeResolution::Static) {
            Some((_, record)) => record
                .template_args
                .get(index)
                .map(|argument| argument.kind)
                .unwrap_or_default(),
            None => TemplateArgumentKind::Null,
        }
    }

    /// The canonical spelling of the type name; empty if invalid.
    #[must_use]
    pub fn name(&self) -> String {
        match self.delegate(TypeResolution::Static) {
            Some((_, record)) => record.name.clone(),
            None => String::new(),
        }
    }

    /// The presentation name; empty if invalid.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.delegate(TypeResolution::Static) {
            Some((_, record)) => record.display_name().to_string(),
            None => String::new(),
        }
    }

    /// The property flag mask; empty if invalid.
    #[must_use]
    pub fn type_flags(&self) -> TypeFlags {
        match self.delegate(TypeResolution::Dynamic) {
            Some((engine, record)) => engine.type_info(&record),
            None => TypeFlags::empty(),
        }
    }

    /// Render a description of this type into a text sink.
    ///
    /// Writes the placeholder `No value` for an invalid handle; never fails for
    /// reasons other than the sink itself.
    ///
    /// # Errors
    /// Only fails when the sink fails.
    pub fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        match self.delegate(TypeResolution::Static) {
            Some((engine, record)) => engine.describe(&record, out),
            None => out.write_str("No value"),
        }
    }
}

impl PartialEq for TypeHandle {
    // Two invalid handles are equal; an invalid and a valid handle never are;
    // valid handles compare their backing records under the engine's equality.
    fn eq(&self, other: &Self) -> bool {
        match (self.guard(), other.guard()) {
            (None, None) => true,
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for TypeHandle {}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f)
    }
}
