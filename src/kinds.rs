//! Classification enumerations shared between the type engine and the handle facade.
//!
//! Every query on a handle that does not produce another handle produces one of the
//! values defined here: a built-in type enumeration, a structural class, a flag mask,
//! or a kind classifier. Each enumeration carries an explicit invalid/null sentinel
//! so that queries on invalid handles have a well-defined answer.

use bitflags::bitflags;
use strum::{EnumCount, EnumIter};

/// Built-in (primitive) type enumeration.
///
/// Mirrors the C-family built-ins a debugger's type engine manufactures on demand.
/// [`BasicType::Invalid`] is the sentinel returned when a handle is invalid or the
/// type has user-defined structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumCount, EnumIter)]
pub enum BasicType {
    /// Sentinel for invalid handles and non-builtin types
    #[default]
    Invalid,
    /// `void` - no storage
    Void,
    /// `char` with platform-defined signedness
    Char,
    /// `signed char`
    SignedChar,
    /// `unsigned char`
    UnsignedChar,
    /// `wchar_t`
    WChar,
    /// `char16_t`
    Char16,
    /// `char32_t`
    Char32,
    /// `short`
    Short,
    /// `unsigned short`
    UnsignedShort,
    /// `int`
    Int,
    /// `unsigned int`
    UnsignedInt,
    /// `long`
    Long,
    /// `unsigned long`
    UnsignedLong,
    /// `long long`
    LongLong,
    /// `unsigned long long`
    UnsignedLongLong,
    /// `__int128`
    Int128,
    /// `unsigned __int128`
    UnsignedInt128,
    /// `bool`
    Bool,
    /// `_Float16` / `half`
    Half,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `long double`
    LongDouble,
    /// `std::nullptr_t`
    NullPtr,
    /// A built-in the engine recognises but this enumeration does not model
    Other,
}

impl BasicType {
    /// The canonical spelling of this built-in type.
    ///
    /// Empty for [`BasicType::Invalid`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BasicType::Invalid => "",
            BasicType::Void => "void",
            BasicType::Char => "char",
            BasicType::SignedChar => "signed char",
            BasicType::UnsignedChar => "unsigned char",
            BasicType::WChar => "wchar_t",
            BasicType::Char16 => "char16_t",
            BasicType::Char32 => "char32_t",
            BasicType::Short => "short",
            BasicType::UnsignedShort => "unsigned short",
            BasicType::Int => "int",
            BasicType::UnsignedInt => "unsigned int",
            BasicType::Long => "long",
            BasicType::UnsignedLong => "unsigned long",
            BasicType::LongLong => "long long",
            BasicType::UnsignedLongLong => "unsigned long long",
            BasicType::Int128 => "__int128",
            BasicType::UnsignedInt128 => "unsigned __int128",
            BasicType::Bool => "bool",
            BasicType::Half => "half",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::LongDouble => "long double",
            BasicType::NullPtr => "std::nullptr_t",
            BasicType::Other => "<builtin>",
        }
    }

    /// Storage size in bytes for an LP64 target.
    ///
    /// 0 for `void`, [`BasicType::Invalid`] and [`BasicType::Other`].
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        match self {
            BasicType::Invalid | BasicType::Void | BasicType::Other => 0,
            BasicType::Char | BasicType::SignedChar | BasicType::UnsignedChar | BasicType::Bool => {
                1
            }
            BasicType::Short | BasicType::UnsignedShort | BasicType::Char16 | BasicType::Half => 2,
            BasicType::Int
            | BasicType::UnsignedInt
            | BasicType::WChar
            | BasicType::Char32
            | BasicType::Float => 4,
            BasicType::Long
            | BasicType::UnsignedLong
            | BasicType::LongLong
            | BasicType::UnsignedLongLong
            | BasicType::Double
            | BasicType::NullPtr => 8,
            BasicType::Int128 | BasicType::UnsignedInt128 | BasicType::LongDouble => 16,
        }
    }

    /// Returns `true` for every value except the [`BasicType::Invalid`] sentinel.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self, BasicType::Invalid)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Structural classification of a type.
    ///
    /// Modelled as a mask so that callers can test a handle against several
    /// classes at once. The empty mask is the invalid sentinel.
    pub struct TypeClass: u32 {
        /// Array of a fixed or unknown element count
        const ARRAY = 0x0001;
        /// Built-in/primitive type
        const BUILTIN = 0x0002;
        /// Enumeration
        const ENUMERATION = 0x0004;
        /// Function type
        const FUNCTION = 0x0008;
        /// Pointer type
        const POINTER = 0x0010;
        /// Reference type
        const REFERENCE = 0x0020;
        /// `struct` aggregate
        const STRUCT = 0x0040;
        /// `class` aggregate
        const CLASS = 0x0080;
        /// `union` aggregate
        const UNION = 0x0100;
        /// Typedef / type alias
        const TYPEDEF = 0x0200;
    }
}

impl TypeClass {
    /// The invalid sentinel (empty mask).
    pub const INVALID: TypeClass = TypeClass::empty();

    /// Any aggregate with members (`struct`, `class` or `union`).
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        self.intersects(TypeClass::STRUCT | TypeClass::CLASS | TypeClass::UNION)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// Property flags computed by the engine for a resolved type.
    ///
    /// 0 for an invalid handle.
    pub struct TypeFlags: u32 {
        /// Type has child values (members, base classes or pointees)
        const HAS_CHILDREN = 0x0001;
        /// Type carries a scalar value of its own
        const HAS_VALUE = 0x0002;
        /// Type is a pointer
        const IS_POINTER = 0x0004;
        /// Type is a reference
        const IS_REFERENCE = 0x0008;
        /// Type is an array
        const IS_ARRAY = 0x0010;
        /// Type is a function
        const IS_FUNCTION = 0x0020;
        /// Type is a typedef
        const IS_TYPEDEF = 0x0040;
        /// Type is an enumeration
        const IS_ENUMERATION = 0x0080;
        /// Type is a built-in
        const IS_BUILTIN = 0x0100;
        /// Type is a struct/class/union aggregate
        const IS_AGGREGATE = 0x0200;
        /// Aggregate carries a vtable
        const IS_POLYMORPHIC = 0x0400;
        /// Definition is complete
        const IS_COMPLETE = 0x0800;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    /// CV qualifiers attached to a type record.
    pub struct TypeQualifiers: u8 {
        /// `const`
        const CONST = 0x01;
        /// `volatile`
        const VOLATILE = 0x02;
    }
}

/// Aggregate flavor of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Declared with `struct`
    Struct,
    /// Declared with `class`
    Class,
    /// Declared with `union`
    Union,
}

impl RecordKind {
    /// The declaration keyword for this aggregate flavor.
    #[must_use]
    pub fn keyword(&self) -> &'static str {
        match self {
            RecordKind::Struct => "struct",
            RecordKind::Class => "class",
            RecordKind::Union => "union",
        }
    }
}

/// Kind classifier for one template argument slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateArgumentKind {
    /// Sentinel for invalid handles and out-of-range indices
    #[default]
    Null,
    /// The argument is a type
    Type,
    /// The argument is an integral constant
    Integral,
    /// The argument is a declaration
    Declaration,
    /// The argument is itself a template
    Template,
    /// The argument is an unevaluated expression
    Expression,
    /// The argument is a parameter pack
    Pack,
}

/// Kind classifier for a member function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemberFunctionKind {
    /// Classification is not known
    #[default]
    Unknown,
    /// Constructor
    Constructor,
    /// Destructor
    Destructor,
    /// Non-static member function
    InstanceMethod,
    /// Static member function
    StaticMethod,
}

/// Selects which representation of a polymorphic value a query consults.
///
/// The static representation is the declared type; the dynamic representation is the
/// runtime shape, which can differ for polymorphic values. Queries about structure
/// (pointer, array, class shape) use [`TypeResolution::Dynamic`]; queries about the
/// declaration (byte size, basic-type enumeration) use [`TypeResolution::Static`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeResolution {
    /// The statically declared type
    Static,
    /// The runtime (dynamic) type, falling back to static when not known
    Dynamic,
}
