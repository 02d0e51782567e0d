// Copyright 2026 typescope contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # typescope
//!
//! A read-only type-introspection facade for debugger front ends, built in pure
//! Rust. `typescope` separates the *engine* that owns resolved type information
//! from the lightweight *handles* clients hold: handles are cheap to copy, safe
//! to share across threads, and degrade gracefully — an invalid handle answers
//! every query with a documented sentinel instead of failing.
//!
//! ## Features
//!
//! - **Uniform invalidity** - Default-constructed handles, failed derivations and
//!   dropped engines all degrade to sentinels; derivation chains never panic
//! - **Static/dynamic resolution** - Declared-type queries and runtime-shape
//!   queries can consult different records for polymorphic values
//! - **Interned derivations** - Pointer, reference, array and qualified types are
//!   interned per engine, so independently derived handles compare equal
//! - **Concurrent engine** - Records register and resolve from multiple threads
//!   without external locking
//!
//! ## Quick Start
//!
//! Add `typescope` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! typescope = "0.1"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use typescope::prelude::*;
//!
//! let engine = TypeEngine::new();
//! let int_ty = engine.basic_type(BasicType::Int).unwrap();
//! let handle = TypeHandle::new(&engine, &int_ty);
//!
//! assert_eq!(handle.byte_size(), 4);
//! assert!(handle.pointer_type().is_pointer());
//! ```
//!
//! ### Inspecting an aggregate
//!
//! ```rust
//! use typescope::prelude::*;
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
//! for index in 0..handle.field_count() {
//!     let field = handle.field_at(index);
//!     println!("+{}: {}", field.byte_offset(), field.name());
//! }
//! ```
//!
//! ## Architecture
//!
//! `typescope` is organized into a small set of modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`engine`] - The [`engine::TypeEngine`] owning every resolved record, plus
//!   the [`engine::TypeBuilder`] for registering aggregates and enumerations
//! - [`handles`] - The read-only facade: [`handles::TypeHandle`] and the member,
//!   function, list and enumerator handles it produces
//! - [`kinds`] - Classification enumerations and flag masks shared by both sides
//! - [`Error`] and [`Result`] - Error handling for the few operations that fail
//!
//! The split mirrors how a debugger works: the engine side is populated once from
//! debug information, while the handle side is handed to scripts and UI layers
//! that must never be able to corrupt it or crash on stale state.

mod error;

pub mod engine;
pub mod handles;
pub mod kinds;
pub mod prelude;

pub use error::Error;

/// Result type alias for operations that can fail with a [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
