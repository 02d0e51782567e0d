//! # typescope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! from the typescope library. Import this module to get quick access to the
//! essential types for type introspection.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all typescope operations
pub use crate::Error;

/// The result type used throughout typescope
pub use crate::Result;

// ================================================================================================
// Engine Side
// ================================================================================================

/// Central owner of resolved type records
pub use crate::engine::TypeEngine;

/// Fluent construction of aggregate and enumeration records
pub use crate::engine::TypeBuilder;

/// Record identity and the record type itself
pub use crate::engine::{TypeId, TypeRecord, TypeRecordRc, TypeShape};

// ================================================================================================
// Handle Facade
// ================================================================================================

/// The central type handle and the handles it produces
pub use crate::handles::{
    EnumMemberHandle, EnumMemberListHandle, MemberFunctionHandle, MemberHandle, TypeHandle,
    TypeListHandle,
};

// ================================================================================================
// Classification Enumerations
// ================================================================================================

/// Built-in type enumeration, structural classes and flag masks
pub use crate::kinds::{
    BasicType, MemberFunctionKind, RecordKind, TemplateArgumentKind, TypeClass, TypeFlags,
    TypeQualifiers, TypeResolution,
};
