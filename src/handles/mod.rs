//! The read-only handle facade over the type engine.
//!
//! Handles are the public face of the crate: lightweight, cloneable views onto
//! records owned by a [`crate::engine::TypeEngine`]. A handle never mutates the
//! engine and never owns type information outright, so handles stay cheap to
//! copy and safe to hold across threads.
//!
//! Every handle kind shares one contract: a handle can be *invalid* (default
//! construction, a failed derivation, a dropped engine), and every query on an
//! invalid handle degrades to a documented sentinel instead of returning an
//! error. Derivations propagate invalidity, so chains like
//! `handle.pointee_type().canonical_type()` are always safe to write.
//!
//! The handle kinds:
//!
//! - [`TypeHandle`] — one resolved type and all queries over it
//! - [`TypeListHandle`] — an ordered sequence of type handles
//! - [`MemberHandle`] — a field or base-class slot, with offsets and bitfield data
//! - [`MemberFunctionHandle`] — a member function and its signature
//! - [`EnumMemberHandle`] / [`EnumMemberListHandle`] — enumerators of an enum type
//!
//! # Examples
//!
//! ```rust
//! use typescope::engine::{TypeBuilder, TypeEngine};
//! use typescope::handles::TypeHandle;
//! use typescope::kinds::{BasicType, RecordKind};
//!
//! let engine = TypeEngine::new();
//! let int_ty = engine.basic_type(BasicType::Int).unwrap();
//! let point = TypeBuilder::record(&engine, RecordKind::Struct, "Point")
//!     .byte_size(8)
//!     .field("x", &int_ty, 0)
//!     .field("y", &int_ty, 32)
//!     .build();
//!
//! let handle = TypeHandle::new(&engine, &point);
//! assert_eq!(handle.field_count(), 2);
//! assert_eq!(handle.field_at(1).name(), "y");
//! assert_eq!(handle.field_at(1).byte_offset(), 4);
//! ```

mod enums;
mod function;
mod list;
mod member;
mod ty;

pub use enums::{EnumMemberHandle, EnumMemberListHandle};
pub use function::MemberFunctionHandle;
pub use list::TypeListHandle;
pub use member::MemberHandle;
pub use ty::TypeHandle;
