//! Builder for aggregate and enumeration type records.
//!
//! This module provides the [`TypeBuilder`] struct, which offers a fluent API for
//! constructing struct/class/union and enum records with fields, base classes,
//! member functions, enumerators and template arguments. Derived types (pointers,
//! references, arrays, typedefs, qualified forms) are minted directly by
//! [`TypeEngine`] methods; the builder covers everything with member tables.
//!
//! # Example
//!
//! ```rust
//! use typescope::engine::{TypeBuilder, TypeEngine};
//! use typescope::kinds::{BasicType, RecordKind};
//!
//! let engine = TypeEngine::new();
//! let int_ty = engine.basic_type(BasicType::Int).unwrap();
//! let point = TypeBuilder::record(&engine, RecordKind::Struct, "Point")
//!     .byte_size(8)
//!     .field("x", &int_ty, 0)
//!     .field("y", &int_ty, 32)
//!     .build();
//! assert_eq!(point.fields.len(), 2);
//! ```

use std::sync::Arc;

use crate::{
    engine::{
        BaseRecord, EnumeratorRecord, FieldRecord, MethodRecord, TemplateArgRecord, TypeEngine,
        TypeLink, TypeRecord, TypeRecordRc, TypeShape,
    },
    kinds::{MemberFunctionKind, RecordKind, TemplateArgumentKind},
    Error::TypeError,
    Result,
};

/// Provides a fluent API for building aggregate and enumeration records
pub struct TypeBuilder {
    /// Engine that will own the finished record
    engine: Arc<TypeEngine>,
    /// Canonical name of the type under construction
    name: String,
    /// Presentation name override
    display_name: Option<String>,
    /// Structural shape of the type under construction
    shape: TypeShape,
    /// Storage size in bytes
    byte_size: u64,
    /// Whether the definition is complete
    is_complete: bool,
    /// Whether the aggregate carries a vtable
    is_polymorphic: bool,
    /// Accumulated fields
    fields: Vec<FieldRecord>,
    /// Accumulated direct bases
    direct_bases: Vec<BaseRecord>,
    /// Accumulated virtual bases
    virtual_bases: Vec<BaseRecord>,
    /// Accumulated member functions
    member_functions: Vec<MethodRecord>,
    /// Accumulated enumerators
    enumerators: Vec<EnumeratorRecord>,
    /// Accumulated template arguments
    template_args: Vec<TemplateArgRecord>,
}

impl TypeBuilder {
    fn new(engine: &Arc<TypeEngine>, name: &str, shape: TypeShape, byte_size: u64) -> Self {
        TypeBuilder {
            engine: engine.clone(),
            name: name.to_string(),
            display_name: None,
            shape,
            byte_size,
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

    /// Start building a struct/class/union record
    ///
    /// ## Arguments
    /// * `engine` - The engine that will own the record
    /// * `kind`   - Which aggregate keyword declares it
    /// * `name`   - The type name
    #[must_use]
    pub fn record(engine: &Arc<TypeEngine>, kind: RecordKind, name: &str) -> Self {
        Self::new(engine, name, TypeShape::Record { kind }, 0)
    }

    /// Start building an enumeration record
    ///
    /// ## Arguments
    /// * `engine`  - The engine that will own the record
    /// * `name`    - The enumeration name
    /// * `backing` - The backing integer type
    #[must_use]
    pub fn enumeration(engine: &Arc<TypeEngine>, name: &str, backing: &TypeRecordRc) -> Self {
        let byte_size = backing.byte_size;
        Self::new(
            engine,
            name,
            TypeShape::Enum {
                backing: TypeLink::new(backing),
            },
            byte_size,
        )
    }

    /// Set a presentation name that differs from the canonical name
    #[must_use]
    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    /// Set the storage size in bytes
    #[must_use]
    pub fn byte_size(mut self, byte_size: u64) -> Self {
        self.byte_size = byte_size;
        self
    }

    /// Mark the definition as forward-declared only
    #[must_use]
    pub fn incomplete(mut self) -> Self {
        self.is_complete = false;
        self
    }

    /// Mark the aggregate as carrying a vtable
    #[must_use]
    pub fn polymorphic(mut self) -> Self {
        self.is_polymorphic = true;
        self
    }

    /// Append a named data field
    ///
    /// ## Arguments
    /// * `name`       - The field name
    /// * `ty`         - The field type
    /// * `bit_offset` - Offset from the start of the owning type, in bits
    #[must_use]
    pub fn field(mut self, name: &str, ty: &TypeRecordRc, bit_offset: u64) -> Self {
        self.fields.push(FieldRecord {
            name: Some(name.to_string()),
            ty: TypeLink::new(ty),
            bit_offset,
            bitfield_width: None,
        });
        self
    }

    /// Append an anonymous data field
    #[must_use]
    pub fn anonymous_field(mut self, ty: &TypeRecordRc, bit_offset: u64) -> Self {
        self.fields.push(FieldRecord {
            name: None,
            ty: TypeLink::new(ty),
            bit_offset,
            bitfield_width: None,
        });
        self
    }

    /// Append a bitfield
    ///
    /// ## Arguments
    /// * `name`       - The field name
    /// * `ty`         - The declared field type
    /// * `bit_offset` - Offset from the start of the owning type, in bits
    /// * `width`      - The bitfield width, in bits
    #[must_use]
    pub fn bitfield(mut self, name: &str, ty: &TypeRecordRc, bit_offset: u64, width: u32) -> Self {
        self.fields.push(FieldRecord {
            name: Some(name.to_string()),
            ty: TypeLink::new(ty),
            bit_offset,
            bitfield_width: Some(width),
        });
        self
    }

    /// Append a direct base class at the given bit offset
    #[must_use]
    pub fn base(mut self, ty: &TypeRecordRc, bit_offset: u64) -> Self {
        self.direct_bases.push(BaseRecord {
            ty: TypeLink::new(ty),
            bit_offset,
        });
        self
    }

    /// Append a virtual base class at the given bit offset
    #[must_use]
    pub fn virtual_base(mut self, ty: &TypeRecordRc, bit_offset: u64) -> Self {
        self.virtual_bases.push(BaseRecord {
            ty: TypeLink::new(ty),
            bit_offset,
        });
        self
    }

    /// Append a member function
    ///
    /// The return and argument types are pulled out of the declared function type.
    ///
    /// ## Arguments
    /// * `name` - The function name
    /// * `kind` - Classification of the function
    /// * `ty`   - The declared function type; must have a function shape
    ///
    /// # Errors
    /// Returns [`TypeError`] if `ty` is not a function type.
    pub fn method(
        mut self,
        name: &str,
        kind: MemberFunctionKind,
        ty: &TypeRecordRc,
    ) -> Result<Self> {
        let TypeShape::Function { result, arguments } = &ty.shape else {
            return Err(TypeError(format!(
                "member function '{}' declared with non-function type '{}'",
                name, ty.name
            )));
        };
        self.member_functions.push(MethodRecord {
            name: name.to_string(),
            kind,
            ty: TypeLink::new(ty),
            result: result.clone(),
            arguments: arguments.clone(),
        });
        Ok(self)
    }

    /// Append an enumerator
    #[must_use]
    pub fn enumerator(mut self, name: &str, value: i64) -> Self {
        self.enumerators.push(EnumeratorRecord {
            name: name.to_string(),
            value,
        });
        self
    }

    /// Append a type template argument
    #[must_use]
    pub fn template_type_arg(mut self, ty: &TypeRecordRc) -> Self {
        self.template_args.push(TemplateArgRecord {
            kind: TemplateArgumentKind::Type,
            ty: Some(TypeLink::new(ty)),
            value: None,
        });
        self
    }

    /// Append an integral template argument with its declared type
    #[must_use]
    pub fn template_integral_arg(mut self, ty: &TypeRecordRc, value: i64) -> Self {
        self.template_args.push(TemplateArgRecord {
            kind: TemplateArgumentKind::Integral,
            ty: Some(TypeLink::new(ty)),
            value: Some(value),
        });
        self
    }

    /// Register the finished record with the engine and return it
    #[must_use]
    pub fn build(self) -> TypeRecordRc {
        let TypeBuilder {
            engine,
            name,
            display_name,
            shape,
            byte_size,
            is_complete,
            is_polymorphic,
            fields,
            direct_bases,
            virtual_bases,
            member_functions,
            enumerators,
            template_args,
        } = self;
        engine.commit(|id| TypeRecord {
            id,
            name,
            display_name,
            shape,
            byte_size,
            qualifiers: crate::kinds::TypeQualifiers::empty(),
            is_complete,
            is_polymorphic,
            fields,
            direct_bases,
            virtual_bases,
            member_functions,
            enumerators,
            template_args,
        })
    }
}
