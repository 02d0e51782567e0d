//! End-to-end introspection tests exercising the full engine-to-handle surface.

use std::sync::Arc;

use typescope::prelude::*;

struct Fixture {
    engine: Arc<TypeEngine>,
    base: TypeRecordRc,
    derived: TypeRecordRc,
}

/// Build an engine populated with a small C++-flavoured type hierarchy:
///
/// ```text
/// class Base { virtual ~Base(); int id; };
/// class Derived : public Base { unsigned flags : 3; char tag; };
/// ```
fn populated_engine() -> Fixture {
    let engine = TypeEngine::new();
    let int_ty = engine.basic_type(BasicType::Int).unwrap();
    let uint_ty = engine.basic_type(BasicType::UnsignedInt).unwrap();
    let char_ty = engine.basic_type(BasicType::Char).unwrap();
    let void_ty = engine.basic_type(BasicType::Void).unwrap();

    let dtor_ty = engine.function_type(&void_ty, &[]);
    let base = TypeBuilder::record(&engine, RecordKind::Class, "Base")
        .byte_size(16)
        .polymorphic()
        .field("id", &int_ty, 64)
        .method("~Base", MemberFunctionKind::Destructor, &dtor_ty)
        .unwrap()
        .build();

    let derived = TypeBuilder::record(&engine, RecordKind::Class, "Derived")
        .byte_size(24)
        .polymorphic()
        .base(&base, 0)
        .bitfield("flags", &uint_ty, 128, 3)
        .field("tag", &char_ty, 136)
        .build();

    Fixture {
        engine,
        base,
        derived,
    }
}

#[test]
fn invalid_handle_answers_every_query_with_sentinels() {
    let handle = TypeHandle::invalid();

    assert!(!handle.is_valid());
    assert_eq!(handle.byte_size(), 0);
    assert_eq!(handle.name(), "");
    assert_eq!(handle.display_name(), "");
    assert_eq!(handle.basic_type(), BasicType::Invalid);
    assert_eq!(handle.type_class(), TypeClass::INVALID);
    assert_eq!(handle.type_flags(), TypeFlags::empty());
    assert!(!handle.is_pointer());
    assert!(!handle.is_reference());
    assert!(!handle.is_array());
    assert!(!handle.is_function());
    assert!(!handle.is_typedef());
    assert!(!handle.is_polymorphic_class());
    assert!(!handle.is_complete());
    assert_eq!(handle.field_count(), 0);
    assert_eq!(handle.member_function_count(), 0);
    assert_eq!(handle.direct_base_class_count(), 0);
    assert_eq!(handle.virtual_base_class_count(), 0);
    assert_eq!(handle.template_argument_count(), 0);
    assert_eq!(handle.template_argument_kind(0), TemplateArgumentKind::Null);
    assert!(handle.function_argument_types().is_empty());
    assert!(handle.enum_members().is_empty());
}

#[test]
fn derivations_on_invalid_handles_stay_invalid() {
    let handle = TypeHandle::invalid();

    // Arbitrary derivation chains never panic and never produce validity.
    let chained = handle
        .pointer_type()
        .pointee_type()
        .canonical_type()
        .unqualified_type()
        .dereferenced_type()
        .array_element_type()
        .typedefed_type()
        .function_return_type();
    assert!(!chained.is_valid());
    assert!(!handle.basic_type_handle(BasicType::Int).is_valid());
    assert!(!handle.field_at(0).is_valid());
    assert!(!handle.field_at(0).member_type().is_valid());
    assert!(!handle.member_function_at(0).is_valid());
    assert!(!handle.member_function_at(0).return_type().is_valid());
}

#[test]
fn handle_equality_laws() {
    let fixture = populated_engine();
    let base = TypeHandle::new(&fixture.engine, &fixture.base);
    let derived = TypeHandle::new(&fixture.engine, &fixture.derived);

    // Reflexive, and equal across independently created handles to one record.
    assert_eq!(base, base);
    assert_eq!(base, base.clone());
    assert_eq!(base, TypeHandle::new(&fixture.engine, &fixture.base));
    assert_ne!(base, derived);

    // Two invalid handles are equal; valid never equals invalid.
    assert_eq!(TypeHandle::invalid(), TypeHandle::invalid());
    assert_ne!(base, TypeHandle::invalid());
    assert_ne!(TypeHandle::invalid(), base);

    // Independently derived pointers to the same record compare equal.
    assert_eq!(base.pointer_type(), base.pointer_type());
    assert_ne!(base.pointer_type(), derived.pointer_type());

    // The same spelling in a different engine is a different type.
    let other_engine = TypeEngine::new();
    let other_int = other_engine.basic_type(BasicType::Int).unwrap();
    let local_int = fixture.engine.basic_type(BasicType::Int).unwrap();
    assert_ne!(
        TypeHandle::new(&other_engine, &other_int),
        TypeHandle::new(&fixture.engine, &local_int)
    );
}

#[test]
fn aggregate_structure_is_reachable_from_handles() {
    let fixture = populated_engine();
    let base = TypeHandle::new(&fixture.engine, &fixture.base);
    let derived = TypeHandle::new(&fixture.engine, &fixture.derived);

    assert_eq!(base.type_class(), TypeClass::CLASS);
    assert!(base.is_polymorphic_class());
    assert!(base.is_complete());
    assert_eq!(base.byte_size(), 16);
    assert!(base
        .type_flags()
        .contains(TypeFlags::IS_AGGREGATE | TypeFlags::IS_POLYMORPHIC | TypeFlags::IS_COMPLETE));

    assert_eq!(derived.direct_base_class_count(), 1);
    let base_slot = derived.direct_base_class_at(0);
    assert!(base_slot.is_valid());
    assert_eq!(base_slot.name(), "Base");
    assert_eq!(base_slot.bit_offset(), 0);
    assert_eq!(base_slot.member_type(), base);
    assert_eq!(derived.virtual_base_class_count(), 0);

    assert_eq!(base.member_function_count(), 1);
    let dtor = base.member_function_at(0);
    assert_eq!(dtor.kind(), MemberFunctionKind::Destructor);
    assert_eq!(dtor.name(), "~Base");
    assert_eq!(dtor.return_type().basic_type(), BasicType::Void);
    assert_eq!(dtor.argument_count(), 0);
    assert!(dtor.declared_type().is_function());
}

#[test]
fn field_and_bitfield_metadata() {
    let fixture = populated_engine();
    let derived = TypeHandle::new(&fixture.engine, &fixture.derived);

    assert_eq!(derived.field_count(), 2);

    let flags = derived.field_at(0);
    assert_eq!(flags.name(), "flags");
    assert_eq!(flags.bit_offset(), 128);
    assert_eq!(flags.byte_offset(), 16);
    assert!(flags.is_bitfield());
    assert_eq!(flags.bitfield_width(), 3);

    let tag = derived.field_at(1);
    assert_eq!(tag.name(), "tag");
    assert!(!tag.is_bitfield());
    assert_eq!(tag.bitfield_width(), 0);
    assert_eq!(tag.member_type().basic_type(), BasicType::Char);

    // Out-of-range member access degrades to an invalid member handle.
    assert!(!derived.field_at(99).is_valid());
    assert!(!derived.direct_base_class_at(99).is_valid());
    assert!(!derived.virtual_base_class_at(0).is_valid());
}

#[test]
fn member_description_rendering() {
    let engine = TypeEngine::new();
    let int_ty = engine.basic_type(BasicType::Int).unwrap();
    let char_ty = engine.basic_type(BasicType::Char).unwrap();
    let packed = TypeBuilder::record(&engine, RecordKind::Struct, "Packed")
        .byte_size(4)
        .bitfield("mode", &int_ty, 20, 3)
        .field("tag", &char_ty, 24)
        .build();
    let handle = TypeHandle::new(&engine, &packed);

    let mut out = String::new();
    handle.field_at(0).describe(&mut out).unwrap();
    assert_eq!(out, "+2 + 4 bits: (int) mode : 3");

    out.clear();
    handle.field_at(1).describe(&mut out).unwrap();
    assert_eq!(out, "+3: (char) tag");

    out.clear();
    handle.field_at(7).describe(&mut out).unwrap();
    assert_eq!(out, "No value");
}

#[test]
fn pointer_reference_and_array_chains() {
    let fixture = populated_engine();
    let engine = &fixture.engine;
    let base = TypeHandle::new(engine, &fixture.base);

    let ptr = base.pointer_type();
    assert!(ptr.is_pointer());
    assert_eq!(ptr.name(), "Base *");
    assert_eq!(ptr.byte_size(), engine.pointer_size());
    assert_eq!(ptr.pointee_type(), base);
    assert_eq!(ptr.dereferenced_type(), base);
    assert!(ptr
        .type_flags()
        .contains(TypeFlags::IS_POINTER | TypeFlags::HAS_VALUE));

    let reference = base.reference_type();
    assert!(reference.is_reference());
    assert_eq!(reference.dereferenced_type(), base);

    let int_ty = engine.basic_type(BasicType::Int).unwrap();
    let array = TypeHandle::new(engine, &engine.array_of(&int_ty, Some(8)));
    assert!(array.is_array());
    assert_eq!(array.byte_size(), 32);
    assert_eq!(array.name(), "int [8]");
    assert_eq!(array.array_element_type().basic_type(), BasicType::Int);

    // Mismatched derivations degrade instead of failing.
    assert!(!base.array_element_type().is_valid());
    assert!(!base.pointee_type().is_valid());
    assert!(!base.function_return_type().is_valid());
    assert!(!ptr.typedefed_type().is_valid());
}

#[test]
fn typedef_and_qualifier_canonicalization() {
    let engine = TypeEngine::new();
    let int_ty = engine.basic_type(BasicType::Int).unwrap();
    let alias = engine.typedef_of("int32_t", &int_ty);
    let alias_of_alias = engine.typedef_of("my_int", &alias);
    let handle = TypeHandle::new(&engine, &alias_of_alias);

    assert!(handle.is_typedef());
    assert_eq!(handle.name(), "my_int");
    assert_eq!(handle.typedefed_type().name(), "int32_t");
    assert_eq!(handle.canonical_type().name(), "int");
    assert_eq!(handle.basic_type(), BasicType::Int);
    assert!(handle
        .type_flags()
        .contains(TypeFlags::IS_TYPEDEF | TypeFlags::IS_BUILTIN));

    let const_int = engine.qualified(&int_ty, TypeQualifiers::CONST);
    let const_handle = TypeHandle::new(&engine, &const_int);
    assert_eq!(const_handle.name(), "const int");
    assert_eq!(const_handle.unqualified_type().name(), "int");
    assert_eq!(const_handle.canonical_type().basic_type(), BasicType::Int);

    // Stacked qualifiers merge into one record and strip in one step.
    let both = engine.qualified(&const_int, TypeQualifiers::VOLATILE);
    let both_handle = TypeHandle::new(&engine, &both);
    assert_eq!(both_handle.name(), "const volatile int");
    assert_eq!(both_handle.unqualified_type().name(), "int");
    assert_eq!(both_handle.basic_type(), BasicType::Int);
}

#[test]
fn virtual_base_classes_carry_their_offsets() {
    let engine = TypeEngine::new();
    let int_ty = engine.basic_type(BasicType::Int).unwrap();

    let top = TypeBuilder::record(&engine, RecordKind::Class, "Top")
        .byte_size(8)
        .field("shared", &int_ty, 0)
        .build();
    let left = TypeBuilder::record(&engine, RecordKind::Class, "Left")
        .byte_size(24)
        .virtual_base(&top, 128)
        .build();
    let right = TypeBuilder::record(&engine, RecordKind::Class, "Right")
        .byte_size(24)
        .virtual_base(&top, 128)
        .build();
    let diamond = TypeBuilder::record(&engine, RecordKind::Class, "Diamond")
        .byte_size(40)
        .base(&left, 0)
        .base(&right, 128)
        .virtual_base(&top, 256)
        .build();
    let handle = TypeHandle::new(&engine, &diamond);

    assert_eq!(handle.direct_base_class_count(), 2);
    assert_eq!(handle.virtual_base_class_count(), 1);

    let vbase = handle.virtual_base_class_at(0);
    assert!(vbase.is_valid());
    assert_eq!(vbase.name(), "Top");
    assert_eq!(vbase.bit_offset(), 256);
    assert_eq!(vbase.byte_offset(), 32);
    assert_eq!(
        vbase.member_type(),
        TypeHandle::new(&engine, &top)
    );
    assert!(!vbase.is_bitfield());

    // Virtual bases live in their own table, separate from direct bases.
    assert_eq!(handle.direct_base_class_at(0).name(), "Left");
    assert_eq!(
        TypeHandle::new(&engine, &left).virtual_base_class_at(0).name(),
        "Top"
    );
    assert!(!handle.virtual_base_class_at(1).is_valid());
}

#[test]
fn function_types_expose_signatures() {
    let engine = TypeEngine::new();
    let int_ty = engine.basic_type(BasicType::Int).unwrap();
    let char_ty = engine.basic_type(BasicType::Char).unwrap();
    let func = engine.function_type(&int_ty, &[char_ty.clone(), int_ty.clone()]);
    let handle = TypeHandle::new(&engine, &func);

    assert!(handle.is_function());
    assert_eq!(handle.name(), "int (char, int)");
    assert_eq!(handle.function_return_type().basic_type(), BasicType::Int);

    let arguments = handle.function_argument_types();
    assert_eq!(arguments.len(), 2);
    assert_eq!(arguments.get(0).unwrap().basic_type(), BasicType::Char);
    assert_eq!(arguments.get(1).unwrap().basic_type(), BasicType::Int);
    assert!(matches!(
        arguments.get(2),
        Err(Error::OutOfRange { index: 2, len: 2 })
    ));
}

#[test]
fn member_function_signature_rendering() {
    let engine = TypeEngine::new();
    let int_ty = engine.basic_type(BasicType::Int).unwrap();
    let char_ty = engine.basic_type(BasicType::Char).unwrap();
    let getter = engine.function_type(&int_ty, &[char_ty.clone()]);
    let widget = TypeBuilder::record(&engine, RecordKind::Class, "Widget")
        .method("lookup", MemberFunctionKind::InstanceMethod, &getter)
        .unwrap()
        .build();

    let function = TypeHandle::new(&engine, &widget).member_function_at(0);
    let mut out = String::new();
    function.describe(&mut out).unwrap();
    assert_eq!(out, "int lookup(char)");

    let missing = TypeHandle::new(&engine, &widget).member_function_at(5);
    let mut sink = String::new();
    assert!(matches!(missing.describe(&mut sink), Err(Error::Unresolved)));
    assert!(sink.is_empty());
}

#[test]
fn enumeration_members_in_declaration_order() {
    let engine = TypeEngine::new();
    let uint_ty = engine.basic_type(BasicType::UnsignedInt).unwrap();
    let color = TypeBuilder::enumeration(&engine, "Color", &uint_ty)
        .enumerator("Red", 0)
        .enumerator("Green", 5)
        .enumerator("Blue", 6)
        .build();
    let handle = TypeHandle::new(&engine, &color);

    assert_eq!(handle.type_class(), TypeClass::ENUMERATION);
    assert_eq!(handle.byte_size(), 4);

    let members = handle.enum_members();
    assert_eq!(members.len(), 3);
    let names: Vec<String> = members.iter().map(EnumMemberHandle::name).collect();
    assert_eq!(names, vec!["Red", "Green", "Blue"]);
    assert_eq!(members.get(1).unwrap().value(), 5);
    assert_eq!(
        members.get(0).unwrap().integer_type().basic_type(),
        BasicType::UnsignedInt
    );

    // Enumerators surface through a typedef of the enum as well.
    let alias = engine.typedef_of("color_t", &color);
    let alias_members = TypeHandle::new(&engine, &alias).enum_members();
    assert_eq!(alias_members.len(), 3);
}

#[test]
fn basic_type_roundtrip_for_every_enumeration_value() {
    use strum::IntoEnumIterator;

    let engine = TypeEngine::new();
    let anchor = TypeHandle::new(&engine, &engine.basic_type(BasicType::Int).unwrap());

    for basic in BasicType::iter() {
        let handle = anchor.basic_type_handle(basic);
        if basic == BasicType::Invalid {
            assert!(!handle.is_valid());
        } else {
            assert!(handle.is_valid(), "{basic:?} should resolve");
            assert_eq!(handle.basic_type(), basic);
            assert_eq!(handle.name(), basic.name());
            assert_eq!(handle.byte_size(), basic.byte_size());
            assert_eq!(handle.type_class(), TypeClass::BUILTIN);
        }
    }
}

#[test]
fn type_list_copies_are_independent() {
    let engine = TypeEngine::new();
    let int_handle = TypeHandle::new(&engine, &engine.basic_type(BasicType::Int).unwrap());
    let char_handle = TypeHandle::new(&engine, &engine.basic_type(BasicType::Char).unwrap());

    let mut original = TypeListHandle::new();
    original.append(int_handle.clone());

    let mut copy = original.clone();
    copy.append(char_handle);

    assert_eq!(original.len(), 1);
    assert_eq!(copy.len(), 2);
    // Entries in the copy still reference the same underlying types.
    assert_eq!(copy.get(0).unwrap(), int_handle);
    assert_eq!(original.get(0).unwrap(), copy.get(0).unwrap());

    // Appending an invalid handle is a no-op on either list.
    copy.append(TypeHandle::invalid());
    assert_eq!(copy.len(), 2);
}

#[test]
fn static_and_dynamic_views_of_a_polymorphic_value() {
    let fixture = populated_engine();
    let base = TypeHandle::new(&fixture.engine, &fixture.base);
    let derived = TypeHandle::new(&fixture.engine, &fixture.derived);

    // A handle viewing a `Base`-typed value whose runtime type is `Derived`.
    let viewed = TypeHandle::with_dynamic(&fixture.engine, &fixture.base, &fixture.derived);

    // Declared-type queries answer for Base.
    assert_eq!(viewed.name(), "Base");
    assert_eq!(viewed.byte_size(), 16);

    // Runtime-shape queries answer for Derived.
    assert_eq!(viewed.field_count(), 2);
    assert_eq!(viewed.direct_base_class_count(), 1);
    assert_eq!(viewed.direct_base_class_at(0).member_type(), base);
    assert_eq!(viewed.field_at(0).name(), "flags");
    assert!(viewed.is_polymorphic_class());

    // The record pair distinguishes the view from both plain handles.
    assert_ne!(viewed, base);
    assert_ne!(viewed, derived);

    // The plain static handles still answer for their own records.
    assert_eq!(base.field_count(), 1);
    assert_eq!(derived.field_count(), 2);
}

#[test]
fn dropping_the_engine_invalidates_all_handles() {
    let fixture = populated_engine();
    let base = TypeHandle::new(&fixture.engine, &fixture.base);
    let derived = TypeHandle::new(&fixture.engine, &fixture.derived);
    let ptr = base.pointer_type();
    let member = derived.field_at(0);
    let function = base.member_function_at(0);

    assert!(base.is_valid());
    assert!(ptr.is_valid());
    assert!(member.is_valid());
    assert!(function.is_valid());

    drop(fixture);

    assert!(!base.is_valid());
    assert!(!derived.is_valid());
    assert!(!ptr.is_valid());
    assert!(!function.is_valid());
    assert_eq!(base.byte_size(), 0);
    assert_eq!(base.name(), "");
    assert_eq!(base, TypeHandle::invalid());
    assert!(!base.pointer_type().is_valid());
    // Member handles captured their data eagerly but their type handle went stale.
    assert!(member.is_valid());
    assert!(!member.member_type().is_valid());
}

#[test]
fn describing_types_into_text_sinks() {
    let fixture = populated_engine();
    let base = TypeHandle::new(&fixture.engine, &fixture.base);

    let mut out = String::new();
    base.describe(&mut out).unwrap();
    assert_eq!(out, "Base");
    assert_eq!(base.to_string(), "Base");

    let renamed = TypeBuilder::record(&fixture.engine, RecordKind::Class, "basic_string<char>")
        .display_name("std::string")
        .build();
    let renamed_handle = TypeHandle::new(&fixture.engine, &renamed);
    assert_eq!(renamed_handle.name(), "basic_string<char>");
    assert_eq!(renamed_handle.display_name(), "std::string");
    assert_eq!(renamed_handle.to_string(), "std::string");

    assert_eq!(TypeHandle::invalid().to_string(), "No value");
}
