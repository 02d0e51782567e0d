use std::fmt;
use std::sync::{Arc, Weak};

use crate::kinds::{
    BasicType, MemberFunctionKind, RecordKind, TemplateArgumentKind, TypeQualifiers,
};

/// Reference to a [`TypeRecord`]
pub type TypeRecordRc = Arc<TypeRecord>;

/// An identifier for one resolved type record.
///
/// Ids are assigned by the owning [`crate::engine::TypeEngine`] and are unique within
/// that engine. Two records from the same engine describe the same type exactly when
/// their ids are equal; comparing ids across engines is meaningless.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Creates a new id from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        TypeId(value)
    }

    /// Returns the raw id value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A weak reference from one type record to another.
///
/// Structural links inside [`TypeShape`] are weak so that self-referential types
/// (a struct holding a pointer to itself) do not leak. The engine owns the strong
/// references, so upgrading succeeds as long as the engine is alive.
#[derive(Clone, Debug)]
pub struct TypeLink {
    weak_ref: Weak<TypeRecord>,
}

impl TypeLink {
    /// Create a new `TypeLink` from a strong reference
    pub fn new(strong_ref: &TypeRecordRc) -> Self {
        Self {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    /// Get a strong reference to the record, returning None if it has been dropped
    #[must_use]
    pub fn upgrade(&self) -> Option<TypeRecordRc> {
        self.weak_ref.upgrade()
    }

    /// Check if the referenced record is still alive
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Get the id of the referenced record (if still alive)
    #[must_use]
    pub fn id(&self) -> Option<TypeId> {
        self.upgrade().map(|r| r.id)
    }
}

impl From<TypeRecordRc> for TypeLink {
    fn from(strong_ref: TypeRecordRc) -> Self {
        Self::new(&strong_ref)
    }
}

/// Structural classification of a record, with links to the related records.
#[derive(Debug, Clone)]
pub enum TypeShape {
    /// A built-in type
    Basic(BasicType),
    /// A pointer
    Pointer {
        /// The pointed-to type
        pointee: TypeLink,
    },
    /// An lvalue reference
    Reference {
        /// The referenced type
        referenced: TypeLink,
    },
    /// An array
    Array {
        /// The element type
        element: TypeLink,
        /// Element count, if the array is sized
        length: Option<u64>,
    },
    /// A function type
    Function {
        /// The return type
        result: TypeLink,
        /// Argument types in declaration order
        arguments: Vec<TypeLink>,
    },
    /// A type alias
    Typedef {
        /// The aliased type
        target: TypeLink,
    },
    /// A struct/class/union aggregate
    Record {
        /// Which aggregate keyword declared it
        kind: RecordKind,
    },
    /// An enumeration
    Enum {
        /// The backing integer type
        backing: TypeLink,
    },
    /// The engine could not classify the type
    Unknown,
}

/// One data field or base-class slot of an aggregate.
#[derive(Debug, Clone)]
pub struct FieldRecord {
    /// Field name; `None` for anonymous members
    pub name: Option<String>,
    /// The field's type
    pub ty: TypeLink,
    /// Offset of the field from the start of the owning type, in bits
    pub bit_offset: u64,
    /// Bitfield width in bits; `None` when the field is not a bitfield
    pub bitfield_width: Option<u32>,
}

/// One direct or virtual base-class slot of an aggregate.
#[derive(Debug, Clone)]
pub struct BaseRecord {
    /// The base-class type
    pub ty: TypeLink,
    /// Offset of the base subobject, in bits
    pub bit_offset: u64,
}

/// One member function of an aggregate.
#[derive(Debug, Clone)]
pub struct MethodRecord {
    /// Function name
    pub name: String,
    /// Classification (constructor, destructor, instance, static)
    pub kind: MemberFunctionKind,
    /// The declared function type
    pub ty: TypeLink,
    /// The return type
    pub result: TypeLink,
    /// Argument types in declaration order
    pub arguments: Vec<TypeLink>,
}

/// One enumerator of an enumeration type.
#[derive(Debug, Clone)]
pub struct EnumeratorRecord {
    /// Enumerator name
    pub name: String,
    /// Enumerator value, sign-extended
    pub value: i64,
}

/// One template argument slot of an instantiated template.
#[derive(Debug, Clone)]
pub struct TemplateArgRecord {
    /// What kind of argument occupies the slot
    pub kind: TemplateArgumentKind,
    /// The argument type, for [`TemplateArgumentKind::Type`] and integral arguments
    pub ty: Option<TypeLink>,
    /// The argument value, for [`TemplateArgumentKind::Integral`]
    pub value: Option<i64>,
}

/// One resolved type owned by a [`crate::engine::TypeEngine`].
///
/// A record combines the structural classification ([`TypeShape`]) with the flat
/// member collections a debugger front end iterates: fields, bases, member
/// functions, enumerators and template arguments. Records are immutable once
/// registered; handles only ever read them.
#[derive(Debug)]
pub struct TypeRecord {
    /// Engine-assigned identifier, unique within the owning engine
    pub id: TypeId,
    /// Canonical spelling of the type name
    pub name: String,
    /// Presentation name, when it differs from [`TypeRecord::name`]
    pub(crate) display_name: Option<String>,
    /// Structural classification
    pub shape: TypeShape,
    /// Storage size in bytes of the declared type
    pub byte_size: u64,
    /// CV qualifiers attached to this record
    pub qualifiers: TypeQualifiers,
    /// Whether the definition is complete
    pub is_complete: bool,
    /// Whether the aggregate carries a vtable
    pub is_polymorphic: bool,
    /// Data fields, in declaration order
    pub fields: Vec<FieldRecord>,
    /// Direct base classes, in declaration order
    pub direct_bases: Vec<BaseRecord>,
    /// Virtual base classes, in declaration order
    pub virtual_bases: Vec<BaseRecord>,
    /// Member functions, in declaration order
    pub member_functions: Vec<MethodRecord>,
    /// Enumerators, in declaration order
    pub enumerators: Vec<EnumeratorRecord>,
    /// Template arguments of the instantiation
    pub template_args: Vec<TemplateArgRecord>,
}

impl TypeRecord {
    /// The presentation name of this type, falling back to the canonical name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    /// Returns `true` if this record is a typedef.
    #[must_use]
    pub fn is_typedef(&self) -> bool {
        matches!(self.shape, TypeShape::Typedef { .. })
    }

    /// Returns `true` if this record is a struct/class/union aggregate.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        matches!(self.shape, TypeShape::Record { .. })
    }
}

impl PartialEq for TypeRecord {
    // Ids are unique per engine; record identity within one engine is id identity.
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRecord {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_id_roundtrip() {
        let id = TypeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(format!("{id}"), "#42");
        assert_eq!(format!("{id:?}"), "TypeId(42)");
    }

    #[test]
    fn test_type_link_lifecycle() {
        let record = Arc::new(TypeRecord {
            id: TypeId::new(1),
            name: "int".to_string(),
            display_name: None,
            shape: TypeShape::Basic(BasicType::Int),
            byte_size: 4,
            qualifiers: TypeQualifiers::empty(),
            is_complete: true,
            is_polymorphic: false,
            fields: Vec::new(),
            direct_bases: Vec::new(),
            virtual_bases: Vec::new(),
            member_functions: Vec::new(),
            enumerators: Vec::new(),
            template_args: Vec::new(),
        });

        let link = TypeLink::new(&record);
        assert!(link.is_valid());
        assert_eq!(link.id(), Some(TypeId::new(1)));
        assert_eq!(link.upgrade().unwrap().name, "int");

        drop(record);
        assert!(!link.is_valid());
        assert!(link.upgrade().is_none());
        assert_eq!(link.id(), None);
    }

    #[test]
    fn test_record_display_name_fallback() {
        let record = TypeRecord {
            id: TypeId::new(7),
            name: "basic_string<char>".to_string(),
            display_name: Some("std::string".to_string()),
            shape: TypeShape::Record {
                kind: RecordKind::Class,
            },
            byte_size: 32,
            qualifiers: TypeQualifiers::empty(),
            is_complete: true,
            is_polymorphic: false,
            fields: Vec::new(),
            direct_bases: Vec::new(),
            virtual_bases: Vec::new(),
            member_functions: Vec::new(),
            enumerators: Vec::new(),
            template_args: Vec::new(),
        };
        assert_eq!(record.display_name(), "std::string");
        assert!(record.is_aggregate());
        assert!(!record.is_typedef());
    }
}
