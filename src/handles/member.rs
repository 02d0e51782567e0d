use std::fmt;

use crate::handles::TypeHandle;

#[derive(Debug, Clone)]
struct MemberInfo {
    name: Option<String>,
    ty: TypeHandle,
    bit_offset: u64,
    bitfield_width: Option<u32>,
}

/// A handle to one data field or base-class slot of an aggregate type.
///
/// Member handles are produced by [`TypeHandle::field_at`],
/// [`TypeHandle::direct_base_class_at`] and [`TypeHandle::virtual_base_class_at`].
/// An invalid member handle (out-of-range index, invalid parent) answers every
/// query with a sentinel, like its parent.
#[derive(Debug, Clone, Default)]
pub struct MemberHandle {
    inner: Option<MemberInfo>,
}

impl MemberHandle {
    /// An explicitly invalid member handle.
    #[must_use]
    pub fn invalid() -> Self {
        MemberHandle { inner: None }
    }

    pub(crate) fn field(
        ty: TypeHandle,
        name: Option<String>,
        bit_offset: u64,
        bitfield_width: Option<u32>,
    ) -> Self {
        MemberHandle {
            inner: Some(MemberInfo {
                name,
                ty,
                bit_offset,
                bitfield_width,
            }),
        }
    }

    pub(crate) fn base(ty: TypeHandle, name: String, bit_offset: u64) -> Self {
        Self::field(ty, Some(name), bit_offset, None)
    }

    /// Whether this handle references a real member.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// The member's name; empty for anonymous members and invalid handles.
    #[must_use]
    pub fn name(&self) -> String {
        self.inner
            .as_ref()
            .and_then(|info| info.name.clone())
            .unwrap_or_default()
    }

    /// The member's type; invalid handle propagates.
    #[must_use]
    pub fn member_type(&self) -> TypeHandle {
        self.inner
            .as_ref()
            .map(|info| info.ty.clone())
            .unwrap_or_default()
    }

    /// Offset of the member from the start of the owning type, in bits; 0 if invalid.
    #[must_use]
    pub fn bit_offset(&self) -> u64 {
        self.inner.as_ref().map_or(0, |info| info.bit_offset)
    }

    /// Offset of the member in whole bytes (the bit offset truncated); 0 if invalid.
    #[must_use]
    pub fn byte_offset(&self) -> u64 {
        self.bit_offset() / 8
    }

    /// Whether this member is a bitfield; `false` if invalid.
    #[must_use]
    pub fn is_bitfield(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|info| info.bitfield_width.is_some())
    }

    /// Width of the bitfield in bits; 0 for non-bitfields and invalid handles.
    #[must_use]
    pub fn bitfield_width(&self) -> u32 {
        self.inner
            .as_ref()
            .and_then(|info| info.bitfield_width)
            .unwrap_or(0)
    }

    /// Render a one-line description of this member into a text sink.
    ///
    /// The line gives the byte offset, a `+ N bits` remainder when the member is
    /// not byte-aligned, the member's type in parentheses, its name, and a
    /// trailing `: W` bitfield width when present:
    ///
    /// ```text
    /// +2 + 4 bits: (int) flags : 3
    /// +3: (char) tag
    /// ```
    ///
    /// Writes the placeholder `No value` for an invalid handle.
    ///
    /// # Errors
    /// Only fails when the sink fails.
    pub fn describe<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        let Some(info) = self.inner.as_ref() else {
            return out.write_str("No value");
        };

        let bytes = info.bit_offset / 8;
        let bits = info.bit_offset % 8;
        if bits != 0 {
            write!(out, "+{bytes} + {bits} bits: (")?;
        } else {
            write!(out, "+{bytes}: (")?;
        }
        info.ty.describe(out)?;
        write!(out, ") {}", self.name())?;
        if let Some(width) = info.bitfield_width {
            write!(out, " : {width}")?;
        }
        Ok(())
    }
}

impl fmt::Display for MemberHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TypeEngine;
    use crate::kinds::BasicType;

    fn int_handle(engine: &std::sync::Arc<TypeEngine>) -> TypeHandle {
        TypeHandle::new(engine, &engine.basic_type(BasicType::Int).unwrap())
    }

    #[test]
    fn test_invalid_member_sentinels() {
        let member = MemberHandle::invalid();
        assert!(!member.is_valid());
        assert_eq!(member.name(), "");
        assert!(!member.member_type().is_valid());
        assert_eq!(member.bit_offset(), 0);
        assert_eq!(member.byte_offset(), 0);
        assert!(!member.is_bitfield());
        assert_eq!(member.bitfield_width(), 0);
        assert_eq!(member.to_string(), "No value");
    }

    #[test]
    fn test_bitfield_accessors() {
        let engine = TypeEngine::new();
        let member = MemberHandle::field(int_handle(&engine), Some("flags".into()), 20, Some(3));
        assert!(member.is_valid());
        assert_eq!(member.name(), "flags");
        assert_eq!(member.bit_offset(), 20);
        assert_eq!(member.byte_offset(), 2);
        assert!(member.is_bitfield());
        assert_eq!(member.bitfield_width(), 3);
    }

    #[test]
    fn test_describe_bitfield() {
        let engine = TypeEngine::new();
        let member = MemberHandle::field(int_handle(&engine), Some("flags".into()), 20, Some(3));
        assert_eq!(member.to_string(), "+2 + 4 bits: (int) flags : 3");
    }

    #[test]
    fn test_describe_byte_aligned() {
        let engine = TypeEngine::new();
        let char_ty = engine.basic_type(BasicType::Char).unwrap();
        let member = MemberHandle::field(
            TypeHandle::new(&engine, &char_ty),
            Some("tag".into()),
            24,
            None,
        );
        assert_eq!(member.to_string(), "+3: (char) tag");
    }

    #[test]
    fn test_anonymous_member_has_empty_name() {
        let engine = TypeEngine::new();
        let int_ty = engine.basic_type(BasicType::Int).unwrap();
        let record = crate::engine::TypeBuilder::record(
            &engine,
            crate::kinds::RecordKind::Struct,
            "Padded",
        )
        .anonymous_field(&int_ty, 0)
        .build();

        let member = TypeHandle::new(&engine, &record).field_at(0);
        assert!(member.is_valid());
        assert_eq!(member.name(), "");
        assert_eq!(member.to_string(), "+0: (int) ");
    }
}
