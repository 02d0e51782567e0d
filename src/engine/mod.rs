//! The backing type engine that handle queries delegate to.
//!
//! This module owns every resolved type record and answers the structural queries
//! the handle facade forwards. It bridges the gap between whatever loaded the debug
//! information and the read-only introspection surface in [`crate::handles`].
//!
//! # Key Components
//!
//! - [`TypeEngine`]: Central owner of all [`TypeRecord`]s; classifies, derives and
//!   interns types and renders descriptions
//! - [`TypeRecord`]: One resolved type with its structural shape and member tables
//! - [`TypeBuilder`]: Fluent construction of aggregate and enumeration records
//! - [`ResolvedType`]: The static/dynamic record pair a handle actually wraps
//!
//! # Interning
//!
//! Derived types (pointer-to, reference-to, arrays, unqualified forms) are interned
//! per engine: deriving the same type twice yields the same record. Handle equality
//! compares record ids, so interning is what makes `ptr_a == ptr_b` hold for two
//! independently derived pointers to the same type.
//!
//! # Examples
//!
//! ```rust
//! use typescope::engine::TypeEngine;
//! use typescope::kinds::BasicType;
//!
//! let engine = TypeEngine::new();
//! let int_ty = engine.basic_type(BasicType::Int).unwrap();
//! let ptr = engine.pointer_to(&int_ty);
//! assert_eq!(ptr.name, "int *");
//! assert_eq!(ptr.byte_size, 8);
//! ```

mod builder;
mod record;

use std::fmt;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use dashmap::DashMap;

pub use builder::TypeBuilder;
pub use record::{
    BaseRecord, EnumeratorRecord, FieldRecord, MethodRecord, TemplateArgRecord, TypeId, TypeLink,
    TypeRecord, TypeRecordRc, TypeShape,
};

use crate::{
    kinds::{BasicType, RecordKind, TypeClass, TypeFlags, TypeQualifiers, TypeResolution},
    Error, Result,
};

/// Cycle guard for typedef/qualifier chains. Debug info never nests this deep.
const MAX_CANONICAL_DEPTH: usize = 64;

/// Interning key for engine-derived records.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum DerivedKey {
    Pointer(TypeId),
    Reference(TypeId),
    Array(TypeId, Option<u64>),
    Unqualified(TypeId),
    Qualified(TypeId, u8),
}

/// Central owner of all resolved type records.
///
/// The engine is the authoritative source of type information: it stores records,
/// manufactures canonical built-in types, derives related types and renders
/// descriptions. Handles hold a [`Weak`] reference to their engine; once the engine
/// is dropped, every handle that pointed into it reports itself invalid.
///
/// All internal collections are concurrent (`DashMap`, `boxcar::Vec`), so records
/// can be registered and queried from multiple threads without external locking.
pub struct TypeEngine {
    /// Strong ownership of every record, in registration order
    records: boxcar::Vec<TypeRecordRc>,
    /// Primary index by id
    by_id: DashMap<TypeId, TypeRecordRc>,
    /// Interned built-in types
    basics: DashMap<BasicType, TypeRecordRc>,
    /// Interned derived types
    derived: DashMap<DerivedKey, TypeRecordRc>,
    /// Pointer size in bytes for derived pointer/reference records
    pointer_size: u64,
    /// Next id to hand out
    next_id: AtomicU32,
}

impl TypeEngine {
    /// Create a new engine for an LP64 target (8-byte pointers).
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_pointer_size(8)
    }

    /// Create a new engine with an explicit pointer size in bytes.
    #[must_use]
    pub fn with_pointer_size(pointer_size: u64) -> Arc<Self> {
        Arc::new(TypeEngine {
            records: boxcar::Vec::new(),
            by_id: DashMap::new(),
            basics: DashMap::new(),
            derived: DashMap::new(),
            pointer_size,
            next_id: AtomicU32::new(1),
        })
    }

    /// The pointer size this engine derives pointer and reference records with.
    #[must_use]
    pub fn pointer_size(&self) -> u64 {
        self.pointer_size
    }

    /// Number of records registered in this engine.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.records.count()
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: TypeId) -> Option<TypeRecordRc> {
        self.by_id.get(&id).map(|entry| entry.clone())
    }

    /// Look up a record by id, failing with [`Error::TypeNotFound`].
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if no record with the given id exists.
    pub fn require(&self, id: TypeId) -> Result<TypeRecordRc> {
        self.get(id).ok_or(Error::TypeNotFound(id))
    }

    /// Allocate an id, build the record through `make`, and take ownership of it.
    pub(crate) fn commit(&self, make: impl FnOnce(TypeId) -> TypeRecord) -> TypeRecordRc {
        let id = TypeId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let record = Arc::new(make(id));
        self.records.push(record.clone());
        self.by_id.insert(id, record.clone());
        record
    }

    /// A bare record with no members, used as the base of every commit.
    pub(crate) fn blank(id: TypeId, name: String, shape: TypeShape, byte_size: u64) -> TypeRecord {
        TypeRecord {
            id,
            name,
            display_name: None,
            shape,
            byte_size,
            qualifiers: TypeQualifiers::empty(),
            is_complete: true,
            is_polymorphic: false,
            fields: Vec::new(),
            direct_bases: Vec::new(),
            virtual_bases: Vec::new(),
            member_functions: Vec::new(),
            enumerators: Vec::new(),
            template_args: Vec::new(),
        }
    }

    /// Manufacture the canonical record for a built-in type.
    ///
    /// The record is interned: every call with the same [`BasicType`] returns the
    /// same record, scoped to this engine. Returns `None` for
    /// [`BasicType::Invalid`].
    #[must_use]
    pub fn basic_type(&self, basic: BasicType) -> Option<TypeRecordRc> {
        if !basic.is_valid() {
            return None;
        }
        let record = self
            .basics
            .entry(basic)
            .or_insert_with(|| {
                self.commit(|id| {
                    Self::blank(
                        id,
                        basic.name().to_string(),
                        TypeShape::Basic(basic),
                        basic.byte_size(),
                    )
                })
            })
            .clone();
        Some(record)
    }

    /// Derive the pointer type `T *` for a record.
    #[must_use]
    pub fn pointer_to(&self, target: &TypeRecordRc) -> TypeRecordRc {
        self.derived
            .entry(DerivedKey::Pointer(target.id))
            .or_insert_with(|| {
                self.commit(|id| {
                    Self::blank(
                        id,
                        format!("{} *", target.display_name()),
                        TypeShape::Pointer {
                            pointee: TypeLink::new(target),
                        },
                        self.pointer_size,
                    )
                })
            })
            .clone()
    }

    /// Derive the lvalue reference type `T &` for a record.
    #[must_use]
    pub fn reference_to(&self, target: &TypeRecordRc) -> TypeRecordRc {
        self.derived
            .entry(DerivedKey::Reference(target.id))
            .or_insert_with(|| {
                self.commit(|id| {
                    Self::blank(
                        id,
                        format!("{} &", target.display_name()),
                        TypeShape::Reference {
                            referenced: TypeLink::new(target),
                        },
                        self.pointer_size,
                    )
                })
            })
            .clone()
    }

    /// Derive an array type over an element record.
    ///
    /// A sized array occupies `length * element size` bytes; an unsized array
    /// reports size 0 and renders as `T []`. A length that would overflow the
    /// size computation also reports size 0.
    #[must_use]
    pub fn array_of(&self, element: &TypeRecordRc, length: Option<u64>) -> TypeRecordRc {
        self.derived
            .entry(DerivedKey::Array(element.id, length))
            .or_insert_with(|| {
                self.commit(|id| {
                    let name = match length {
                        Some(n) => format!("{} [{}]", element.display_name(), n),
                        None => format!("{} []", element.display_name()),
                    };
                    Self::blank(
                        id,
                        name,
                        TypeShape::Array {
                            element: TypeLink::new(element),
                            length,
                        },
                        length
                            .unwrap_or(0)
                            .checked_mul(element.byte_size)
                            .unwrap_or(0),
                    )
                })
            })
            .clone()
    }

    /// Create a function type record from a return type and argument types.
    #[must_use]
    pub fn function_type(&self, result: &TypeRecordRc, arguments: &[TypeRecordRc]) -> TypeRecordRc {
        self.commit(|id| {
            let rendered: Vec<&str> = arguments.iter().map(|a| a.display_name()).collect();
            Self::blank(
                id,
                format!("{} ({})", result.display_name(), rendered.join(", ")),
                TypeShape::Function {
                    result: TypeLink::new(result),
                    arguments: arguments.iter().map(TypeLink::new).collect(),
                },
                0,
            )
        })
    }

    /// Create a typedef record aliasing a target type.
    #[must_use]
    pub fn typedef_of(&self, name: &str, target: &TypeRecordRc) -> TypeRecordRc {
        self.commit(|id| {
            let mut record = Self::blank(
                id,
                name.to_string(),
                TypeShape::Typedef {
                    target: TypeLink::new(target),
                },
                target.byte_size,
            );
            record.is_complete = target.is_complete;
            record
        })
    }

    /// Derive the CV-qualified form of a record.
    ///
    /// Returns the record unchanged when `qualifiers` is empty. Qualifying an
    /// already-qualified record merges the masks, so `const` stacked with
    /// `volatile` yields one `const volatile T` record. The qualified form shares
    /// the base type's shape and member tables; [`TypeEngine::unqualified`]
    /// recovers the fully unqualified base.
    #[must_use]
    pub fn qualified(&self, target: &TypeRecordRc, qualifiers: TypeQualifiers) -> TypeRecordRc {
        if qualifiers.is_empty() {
            return target.clone();
        }
        let base = self.unqualified(target);
        let merged = qualifiers | target.qualifiers;
        let record = self
            .derived
            .entry(DerivedKey::Qualified(base.id, merged.bits()))
            .or_insert_with(|| {
                self.commit(|id| {
                    let mut prefix = String::new();
                    if merged.contains(TypeQualifiers::CONST) {
                        prefix.push_str("const ");
                    }
                    if merged.contains(TypeQualifiers::VOLATILE) {
                        prefix.push_str("volatile ");
                    }
                    TypeRecord {
                        id,
                        name: format!("{}{}", prefix, base.display_name()),
                        display_name: None,
                        shape: base.shape.clone(),
                        byte_size: base.byte_size,
                        qualifiers: merged,
                        is_complete: base.is_complete,
                        is_polymorphic: base.is_polymorphic,
                        fields: base.fields.clone(),
                        direct_bases: base.direct_bases.clone(),
                        virtual_bases: base.virtual_bases.clone(),
                        member_functions: base.member_functions.clone(),
                        enumerators: base.enumerators.clone(),
                        template_args: base.template_args.clone(),
                    }
                })
            })
            .clone();
        self.derived
            .insert(DerivedKey::Unqualified(record.id), base);
        record
    }

    /// Strip CV qualifiers from a record.
    #[must_use]
    pub fn unqualified(&self, record: &TypeRecordRc) -> TypeRecordRc {
        if record.qualifiers.is_empty() {
            return record.clone();
        }
        self.derived
            .get(&DerivedKey::Unqualified(record.id))
            .map_or_else(|| record.clone(), |entry| entry.clone())
    }

    /// Resolve a record to its canonical form.
    ///
    /// Strips qualifiers and follows typedef chains until a fixpoint, bounded to
    /// guard against cyclic debug info.
    #[must_use]
    pub fn canonical(&self, record: &TypeRecordRc) -> TypeRecordRc {
        let mut current = record.clone();
        for _ in 0..MAX_CANONICAL_DEPTH {
            if !current.qualifiers.is_empty() {
                current = self.unqualified(&current);
                continue;
            }
            match &current.shape {
                TypeShape::Typedef { target } => match target.upgrade() {
                    Some(next) => current = next,
                    None => break,
                },
                _ => break,
            }
        }
        current
    }

    /// The pointed-to or referenced type of a pointer or reference record.
    #[must_use]
    pub fn pointee(&self, record: &TypeRecordRc) -> Option<TypeRecordRc> {
        match &record.shape {
            TypeShape::Pointer { pointee } => pointee.upgrade(),
            TypeShape::Reference { referenced } => referenced.upgrade(),
            _ => None,
        }
    }

    /// The result of dereferencing a record, looking through typedefs first.
    #[must_use]
    pub fn dereferenced(&self, record: &TypeRecordRc) -> Option<TypeRecordRc> {
        self.pointee(&self.canonical(record))
    }

    /// The target of a typedef record.
    #[must_use]
    pub fn typedef_target(&self, record: &TypeRecordRc) -> Option<TypeRecordRc> {
        match &record.shape {
            TypeShape::Typedef { target } => target.upgrade(),
            _ => None,
        }
    }

    /// The element type of an array record, looking through typedefs first.
    #[must_use]
    pub fn array_element(&self, record: &TypeRecordRc) -> Option<TypeRecordRc> {
        match &self.canonical(record).shape {
            TypeShape::Array { element, .. } => element.upgrade(),
            _ => None,
        }
    }

    /// The return type of a function record, looking through typedefs first.
    #[must_use]
    pub fn function_return(&self, record: &TypeRecordRc) -> Option<TypeRecordRc> {
        match &self.canonical(record).shape {
            TypeShape::Function { result, .. } => result.upgrade(),
            _ => None,
        }
    }

    /// The argument types of a function record, in declaration order.
    ///
    /// Empty when the record is not a function type.
    #[must_use]
    pub fn function_arguments(&self, record: &TypeRecordRc) -> Vec<TypeRecordRc> {
        match &self.canonical(record).shape {
            TypeShape::Function { arguments, .. } => {
                arguments.iter().filter_map(TypeLink::upgrade).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Classify a record into its [`TypeClass`].
    #[must_use]
    pub fn classify(&self, record: &TypeRecordRc) -> TypeClass {
        match &record.shape {
            TypeShape::Basic(_) => TypeClass::BUILTIN,
            TypeShape::Pointer { .. } => TypeClass::POINTER,
            TypeShape::Reference { .. } => TypeClass::REFERENCE,
            TypeShape::Array { .. } => TypeClass::ARRAY,
            TypeShape::Function { .. } => TypeClass::FUNCTION,
            TypeShape::Typedef { .. } => TypeClass::TYPEDEF,
            TypeShape::Record { kind } => match kind {
                RecordKind::Struct => TypeClass::STRUCT,
                RecordKind::Class => TypeClass::CLASS,
                RecordKind::Union => TypeClass::UNION,
            },
            TypeShape::Enum { .. } => TypeClass::ENUMERATION,
            TypeShape::Unknown => TypeClass::INVALID,
        }
    }

    /// The basic-type enumeration of a record, through typedefs and qualifiers.
    ///
    /// [`BasicType::Invalid`] when the canonical form is not a built-in.
    #[must_use]
    pub fn basic_kind(&self, record: &TypeRecordRc) -> BasicType {
        match self.canonical(record).shape {
            TypeShape::Basic(basic) => basic,
            _ => BasicType::Invalid,
        }
    }

    /// Compute the property flag mask for a record.
    #[must_use]
    pub fn type_info(&self, record: &TypeRecordRc) -> TypeFlags {
        let mut flags = match &record.shape {
            TypeShape::Basic(_) => TypeFlags::IS_BUILTIN | TypeFlags::HAS_VALUE,
            TypeShape::Pointer { .. } => {
                TypeFlags::IS_POINTER | TypeFlags::HAS_VALUE | TypeFlags::HAS_CHILDREN
            }
            TypeShape::Reference { .. } => TypeFlags::IS_REFERENCE | TypeFlags::HAS_CHILDREN,
            TypeShape::Array { .. } => TypeFlags::IS_ARRAY | TypeFlags::HAS_CHILDREN,
            TypeShape::Function { .. } => TypeFlags::IS_FUNCTION,
            TypeShape::Typedef { .. } => {
                let underlying = self.canonical(record);
                if Arc::ptr_eq(&underlying, record) {
                    TypeFlags::IS_TYPEDEF
                } else {
                    TypeFlags::IS_TYPEDEF | self.type_info(&underlying)
                }
            }
            TypeShape::Record { .. } => {
                let mut f = TypeFlags::IS_AGGREGATE;
                if !record.fields.is_empty() || !record.direct_bases.is_empty() {
                    f |= TypeFlags::HAS_CHILDREN;
                }
                if record.is_polymorphic {
                    f |= TypeFlags::IS_POLYMORPHIC;
                }
                f
            }
            TypeShape::Enum { .. } => TypeFlags::IS_ENUMERATION | TypeFlags::HAS_VALUE,
            TypeShape::Unknown => TypeFlags::empty(),
        };
        if record.is_complete {
            flags |= TypeFlags::IS_COMPLETE;
        }
        flags
    }

    /// Render a description of a record into a text sink.
    ///
    /// # Errors
    /// Only fails when the sink itself fails.
    pub fn describe<W: fmt::Write>(&self, record: &TypeRecordRc, out: &mut W) -> fmt::Result {
        out.write_str(record.display_name())
    }

    /// Render a description of a member function into a text sink.
    ///
    /// This is the one formatter that can fail for reasons other than the sink:
    /// the record links of the function may no longer resolve.
    ///
    /// # Errors
    /// Returns [`Error::Unresolved`] if the return type link is dead, or
    /// [`Error::TypeError`] if the sink rejects the output.
    pub fn describe_member_function<W: fmt::Write>(
        &self,
        method: &MethodRecord,
        out: &mut W,
    ) -> Result<()> {
        let result = method.result.upgrade().ok_or(Error::Unresolved)?;
        let arguments: Vec<String> = method
            .arguments
            .iter()
            .filter_map(|a| a.upgrade())
            .map(|a| a.display_name().to_string())
            .collect();
        write!(
            out,
            "{} {}({})",
            result.display_name(),
            method.name,
            arguments.join(", ")
        )
        .map_err(|_| Error::TypeError("description sink rejected output".to_string()))?;
        Ok(())
    }
}

impl fmt::Debug for TypeEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeEngine")
            .field("types", &self.type_count())
            .field("pointer_size", &self.pointer_size)
            .finish()
    }
}

/// The backing record pair behind one type handle.
///
/// Couples a statically declared record with an optional dynamic (runtime) record
/// and a weak reference to the owning engine. Handles share `ResolvedType` values
/// through [`Arc`]; copying a handle shares the backing pair, it never duplicates
/// the records.
#[derive(Debug, Clone)]
pub struct ResolvedType {
    engine: Weak<TypeEngine>,
    static_record: TypeRecordRc,
    dynamic_record: Option<TypeRecordRc>,
}

impl ResolvedType {
    /// Create a resolved type with only a static record.
    #[must_use]
    pub fn new(engine: &Arc<TypeEngine>, static_record: TypeRecordRc) -> Self {
        ResolvedType {
            engine: Arc::downgrade(engine),
            static_record,
            dynamic_record: None,
        }
    }

    /// Create a resolved type with a distinct dynamic record.
    #[must_use]
    pub fn with_dynamic(
        engine: &Arc<TypeEngine>,
        static_record: TypeRecordRc,
        dynamic_record: TypeRecordRc,
    ) -> Self {
        ResolvedType {
            engine: Arc::downgrade(engine),
            static_record,
            dynamic_record: Some(dynamic_record),
        }
    }

    /// Select the record for a resolution preference.
    ///
    /// [`TypeResolution::Dynamic`] falls back to the static record when no dynamic
    /// record is known.
    #[must_use]
    pub fn record(&self, resolution: TypeResolution) -> &TypeRecordRc {
        match resolution {
            TypeResolution::Static => &self.static_record,
            TypeResolution::Dynamic => self.dynamic_record.as_ref().unwrap_or(&self.static_record),
        }
    }

    /// The owning engine, if it is still alive.
    #[must_use]
    pub fn engine(&self) -> Option<Arc<TypeEngine>> {
        self.engine.upgrade()
    }

    /// Whether the owning engine is still alive.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.engine.strong_count() > 0
    }
}

impl PartialEq for ResolvedType {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.engine, &other.engine)
            && self.static_record.id == other.static_record.id
            && self.dynamic_record.as_ref().map(|r| r.id)
                == other.dynamic_record.as_ref().map(|r| r.id)
    }
}

impl Eq for ResolvedType {}
