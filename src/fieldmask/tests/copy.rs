// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod common;

use common::*;
use google_cloud_fieldmask::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn image_list<I>(images: I) -> List
where
    I: IntoIterator<Item = Record>,
{
    List::new(
        Shape::pointer(Shape::record(&image())),
        images.into_iter().map(Pointer::to),
    )
}

fn friend_list<I>(friends: I) -> List
where
    I: IntoIterator<Item = Record>,
{
    List::new(
        Shape::pointer(Shape::deferred(user)),
        friends.into_iter().map(Pointer::to),
    )
}

#[test]
fn partial_user() -> Result {
    let src = Value::from(full_user()?);
    let mut dst = Value::from(Record::new(user()));
    let filter = filter(
        "Id,Avatar{OriginalUrl},Tags,Images,Permissions,\
         Friends{Images{ResizedUrl}},ExtraUser{Id,Avatar{OriginalUrl}}",
    )?;
    copy_into(&filter, &src, &mut dst, &options())?;

    let friend = Record::new(user()).set(
        "Images",
        image_list([new_image("", "f1_small.jpg")?, new_image("", "f2_small.jpg")?]),
    )?;
    let extra = Record::new(user())
        .set("Id", 42_u32)?
        .set("Avatar", Pointer::to(new_image("extra.jpg", "")?))?;
    let want = Record::new(user())
        .set("Id", 1_u32)?
        .set("Avatar", Pointer::to(new_image("original.jpg", "")?))?
        .set("Tags", List::new(Shape::String, ["tag_1", "tag_2"]))?
        .set(
            "Images",
            image_list([
                new_image("1.jpg", "1_small.jpg")?,
                new_image("2.jpg", "2_small.jpg")?,
            ]),
        )?
        .set(
            "Permissions",
            List::new(Shape::I32, [PERMISSION_READ, PERMISSION_WRITE]),
        )?
        .set("Friends", friend_list([friend]))?
        .set("ExtraUser", Pointer::to(Any::from_record(&extra)))?;
    assert_eq!(dst, Value::from(want));
    Ok(())
}

#[test]
fn pointer_and_interface_roots() -> Result {
    let src = Value::from(Pointer::to(full_user()?));
    let mut dst = Value::from(Pointer::null(Shape::record(&user())));
    copy_into(&filter("Id,Username")?, &src, &mut dst, &options())?;

    let want = Record::new(user())
        .set("Id", 1_u32)?
        .set("Username", "username")?;
    assert_eq!(dst, Value::from(Pointer::to(want)));

    let src = Value::from(Interface::new(user_name(), Pointer::to(full_user()?)));
    let mut dst = Value::from(Record::new(user()));
    copy_into(&filter("Id")?, &src, &mut dst, &options())?;
    assert_eq!(dst, Value::from(Record::new(user()).set("Id", 1_u32)?));
    Ok(())
}

#[test]
fn existing_any_preserved() -> Result {
    let src = Value::from(full_user()?);
    let existing = Record::new(user())
        .set("Id", 7_u32)?
        .set("Username", "existing")?;
    let mut dst = Value::from(
        Record::new(user()).set("ExtraUser", Pointer::to(Any::from_record(&existing)))?,
    );
    copy_into(
        &filter("ExtraUser{Id,Avatar{OriginalUrl}}")?,
        &src,
        &mut dst,
        &options(),
    )?;

    let any = dst
        .as_record()
        .and_then(|r| r.get("ExtraUser"))
        .and_then(Value::as_pointer)
        .and_then(Pointer::target)
        .and_then(Value::as_any)
        .cloned()
        .unwrap_or_default();
    assert_eq!(any.type_url(), Some("type.googleapis.com/testproto.User"));
    let got = any.to_record(&registry())?;
    let want = Record::new(user())
        .set("Id", 42_u32)?
        .set("Username", "existing")?
        .set("Avatar", Pointer::to(new_image("extra.jpg", "")?))?;
    assert_eq!(got, want);
    Ok(())
}

#[test]
fn any_with_unknown_type() -> Result {
    let src = Value::from(full_user()?);
    let mut dst = Value::from(Record::new(user()));
    let options = CopyOptions::new().set_registry(TypeRegistry::new().register(image()));
    let err = copy_into(&filter("ExtraUser")?, &src, &mut dst, &options).unwrap_err();
    assert!(err.is_codec(), "{err:?}");
    assert_eq!(err.path(), "ExtraUser");
    Ok(())
}

#[test]
fn inverse_mask() -> Result {
    let src = Value::from(full_user()?);
    let mut dst = Value::from(Record::new(user()));
    let filter = FieldFilter::from(InverseMask::parse("Id,Friends{Images,Name}")?);
    copy_into(&filter, &src, &mut dst, &options())?;

    let mut want = full_user()?;
    want.put("Id", Value::U32(0))?;
    let friend = Record::new(user())
        .set("Id", 2_u32)?
        .set("Username", "friend")?
        .set("Permissions", List::new(Shape::I32, [PERMISSION_READ]))?
        .set("Avatar", Pointer::to(new_image("friend.jpg", "friend_small.jpg")?))?
        .set("Tags", List::new(Shape::String, ["friend_tag"]))?;
    want.put("Friends", Value::from(friend_list([friend])))?;
    assert_eq!(dst, Value::from(want));
    Ok(())
}

#[test]
fn oneof_variants() -> Result {
    let src = Value::from(full_user()?);
    let mut dst = Value::from(Record::new(user()).set("Name", male("Bob")?)?);
    copy_into(&filter("Name")?, &src, &mut dst, &options())?;
    let got = dst.as_record().and_then(|r| r.get("Name")).cloned();
    assert_eq!(got, Some(Value::from(male("John")?)));

    // The existing variant is updated in place, it must have the same fields.
    let mut dst = Value::from(Record::new(user()).set("Name", female("Alice")?)?);
    let err = copy_into(&filter("Name")?, &src, &mut dst, &options()).unwrap_err();
    assert!(err.is_unwritable(), "{err:?}");
    assert_eq!(err.path(), "Name.MaleName");

    let src = Value::from(Record::new(user()));
    copy_into(&filter("Name")?, &src, &mut dst, &options())?;
    let got = dst.as_record().and_then(|r| r.get("Name")).cloned();
    assert_eq!(got, Some(Value::from(Interface::null(user_name()))));
    Ok(())
}

#[test]
fn bare_oneof_value_is_unwritable() -> Result {
    let src = Value::from(full_user()?);
    let adam = Record::new(male_name()).set("MaleName", "Adam")?;
    let existing = Record::new(user()).set("Name", Interface::new(user_name(), adam))?;
    let mut dst = Value::from(existing.clone());
    let err = copy_into(&filter("Name")?, &src, &mut dst, &options()).unwrap_err();
    assert!(err.is_unwritable(), "{err:?}");
    assert_eq!(err.path(), "Name");
    assert_eq!(dst, Value::from(existing));
    Ok(())
}

#[test]
fn repeated_copy_is_idempotent() -> Result {
    let src = Value::from(full_user()?);
    let filter = filter(
        "Id,Avatar{OriginalUrl},Images{ResizedUrl},Friends{Username,Images},ExtraUser{Id},Name",
    )?;
    let mut dst = Value::from(Record::new(user()));
    copy_into(&filter, &src, &mut dst, &options())?;
    let once = dst.clone();
    copy_into(&filter, &src, &mut dst, &options())?;
    assert_eq!(dst, once);
    Ok(())
}

#[test]
fn fields_outside_the_mask_are_kept() -> Result {
    let src = Value::from(full_user()?);
    let existing = Record::new(user())
        .set("Username", "existing")?
        .set("Deactivated", false)?
        .set("Tags", List::new(Shape::String, ["a", "b", "c"]))?;
    let mut dst = Value::from(existing);
    copy_into(&filter("Id,Tags")?, &src, &mut dst, &options())?;

    let want = Record::new(user())
        .set("Id", 1_u32)?
        .set("Username", "existing")?
        .set("Tags", List::new(Shape::String, ["tag_1", "tag_2"]))?;
    assert_eq!(dst, Value::from(want));
    Ok(())
}

#[test]
fn unknown_destination_field() -> Result {
    let src_type = Arc::new(
        RecordType::builder("A")
            .field("Field1", Shape::String)
            .field("Field2", Shape::I32)
            .build(),
    );
    let dst_type = Arc::new(RecordType::builder("B").field("Field1", Shape::String).build());
    let src = Value::from(
        Record::new(src_type)
            .set("Field1", "value")?
            .set("Field2", 1)?,
    );

    let mut dst = Value::from(Record::new(dst_type.clone()));
    copy_into(&filter("Field1")?, &src, &mut dst, &CopyOptions::new())?;
    assert_eq!(
        dst,
        Value::from(Record::new(dst_type.clone()).set("Field1", "value")?)
    );

    let mut dst = Value::from(Record::new(dst_type));
    let err = copy_into(&FieldFilter::All, &src, &mut dst, &CopyOptions::new()).unwrap_err();
    assert!(err.is_unwritable(), "{err:?}");
    assert_eq!(err.path(), "Field2");
    Ok(())
}

#[test]
fn nested_error_path() -> Result {
    let inner = Arc::new(RecordType::builder("Inner").field("Value", Shape::I32).build());
    let other = Arc::new(RecordType::builder("Other").field("Value", Shape::String).build());
    let src_type = Arc::new(
        RecordType::builder("Outer")
            .field("Items", Shape::list(Shape::pointer(Shape::record(&inner))))
            .build(),
    );
    let dst_type = Arc::new(
        RecordType::builder("Outer")
            .field("Items", Shape::list(Shape::pointer(Shape::record(&other))))
            .build(),
    );
    let src = Value::from(Record::new(src_type).set(
        "Items",
        List::new(
            Shape::pointer(Shape::record(&inner)),
            [Pointer::to(Record::new(inner.clone()).set("Value", 1)?)],
        ),
    )?);
    let mut dst = Value::from(Record::new(dst_type));
    let err = copy_into(&FieldFilter::All, &src, &mut dst, &CopyOptions::new()).unwrap_err();
    assert!(err.is_structural_mismatch(), "{err:?}");
    assert_eq!(err.path(), "Items.0.Value");
    Ok(())
}

#[test]
fn source_tag() -> Result {
    let tagged = Arc::new(
        RecordType::builder("Tagged")
            .add_field(FieldDescriptor::new("Id", Shape::U32).set_tag("db", "user_id"))
            .add_field(
                FieldDescriptor::new("Username", Shape::String).set_tag("db", "name,omitempty"),
            )
            .field("Role", Shape::I32)
            .build(),
    );
    let src = Value::from(
        Record::new(tagged.clone())
            .set("Id", 1_u32)?
            .set("Username", "username")?
            .set("Role", ROLE_REGULAR)?,
    );
    let mut dst = Value::from(Record::new(user()));
    let options = CopyOptions::new().set_source_tag("db");
    copy_into(&filter("user_id,name,Role")?, &src, &mut dst, &options)?;

    let want = Record::new(user())
        .set("Id", 1_u32)?
        .set("Username", "username")?
        .set("Role", ROLE_REGULAR)?;
    assert_eq!(dst, Value::from(want));

    let mut dst = Value::from(Record::new(user()));
    copy_into(&filter("Id")?, &src, &mut dst, &options)?;
    assert_eq!(dst, Value::from(Record::new(user())));
    Ok(())
}

#[test]
fn destination_tag() -> Result {
    let renamed = Arc::new(
        RecordType::builder("Renamed")
            .field("UserId", Shape::U32)
            .field("Username", Shape::String)
            .build(),
    );
    let src_type = Arc::new(
        RecordType::builder("Source")
            .add_field(FieldDescriptor::new("Id", Shape::U32).set_tag("copy", "UserId"))
            .field("Username", Shape::String)
            .build(),
    );
    let src = Value::from(
        Record::new(src_type)
            .set("Id", 1_u32)?
            .set("Username", "username")?,
    );
    let mut dst = Value::from(Record::new(renamed.clone()));
    let options = CopyOptions::new().set_destination_tag("copy");
    copy_into(&FieldFilter::All, &src, &mut dst, &options)?;

    let want = Record::new(renamed)
        .set("UserId", 1_u32)?
        .set("Username", "username")?;
    assert_eq!(dst, Value::from(want));
    Ok(())
}

#[test]
fn sequence_limit() -> Result {
    let user = full_user()?;
    let tags = user.get("Tags").map_or(0, |v| v as *const Value as usize);
    let src = Value::from(user);
    let mut dst = Value::from(Record::new(common::user()));
    // The limit applies only to the `Tags` list of this source.
    let options = options().set_sequence_limit(move |v: &Value| {
        if std::ptr::eq(v, tags as *const Value) {
            1
        } else {
            usize::MAX
        }
    });
    copy_into(&filter("Tags,Permissions")?, &src, &mut dst, &options)?;

    let want = Record::new(common::user())
        .set("Tags", List::new(Shape::String, ["tag_1"]))?
        .set(
            "Permissions",
            List::new(Shape::I32, [PERMISSION_READ, PERMISSION_WRITE]),
        )?;
    assert_eq!(dst, Value::from(want));
    Ok(())
}

#[test]
fn strict() -> Result {
    let src = Value::from(full_user()?);
    let mut dst = Value::from(Record::new(user()));
    copy_into(&filter("Id,Unknown")?, &src, &mut dst, &options())?;

    let options = options().set_strict(true);
    let err = copy_into(&filter("Id,Avatar{Unknown}")?, &src, &mut dst, &options).unwrap_err();
    assert!(err.is_unknown_field(), "{err:?}");
    assert_eq!(err.path(), "Avatar");
    Ok(())
}

#[test]
fn from_field_mask() -> Result {
    let field_mask = serde_json::from_value::<FieldMask>(serde_json::json!({
        "paths": "id,avatar.original_url,friends.username"
    }))?;
    let filter = FieldFilter::from(Mask::from_field_mask(&field_mask, camel_case)?);
    let src = Value::from(full_user()?);
    let mut dst = Value::from(Record::new(user()));
    copy_into(&filter, &src, &mut dst, &options())?;

    let friend = Record::new(user()).set("Username", "friend")?;
    let want = Record::new(user())
        .set("Id", 1_u32)?
        .set("Avatar", Pointer::to(new_image("original.jpg", "")?))?
        .set("Friends", friend_list([friend]))?;
    assert_eq!(dst, Value::from(want));
    Ok(())
}
