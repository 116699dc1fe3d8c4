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

//! Record types shared by the integration tests.
//!
//! The types mimic the code generated for a protobuf `User` message, with a
//! `oneof` modeled as an interface, and unexported bookkeeping fields.

#![allow(dead_code)]

use google_cloud_fieldmask::*;
use std::sync::{Arc, LazyLock};

pub type Result = anyhow::Result<()>;

pub const ROLE_REGULAR: i32 = 1;
pub const PERMISSION_READ: i32 = 1;
pub const PERMISSION_WRITE: i32 = 2;

static IMAGE: LazyLock<Arc<RecordType>> = LazyLock::new(|| {
    Arc::new(
        RecordType::builder("testproto.Image")
            .field("OriginalUrl", Shape::String)
            .field("ResizedUrl", Shape::String)
            .add_field(FieldDescriptor::new("state", Shape::I32).set_exported(false))
            .build(),
    )
});

static USER_NAME: LazyLock<Arc<InterfaceType>> =
    LazyLock::new(|| Arc::new(InterfaceType::new("isUser_Name", ["isUser_Name"])));

static MALE_NAME: LazyLock<Arc<RecordType>> = LazyLock::new(|| {
    Arc::new(
        RecordType::builder("testproto.User_MaleName")
            .field("MaleName", Shape::String)
            .capability("isUser_Name")
            .build(),
    )
});

static FEMALE_NAME: LazyLock<Arc<RecordType>> = LazyLock::new(|| {
    Arc::new(
        RecordType::builder("testproto.User_FemaleName")
            .field("FemaleName", Shape::String)
            .capability("isUser_Name")
            .build(),
    )
});

static USER: LazyLock<Arc<RecordType>> = LazyLock::new(|| {
    Arc::new(
        RecordType::builder("testproto.User")
            .field("Id", Shape::U32)
            .field("Username", Shape::String)
            .field("Role", Shape::I32)
            .field("Meta", Shape::map(Shape::String))
            .field("Deactivated", Shape::Bool)
            .field("Permissions", Shape::list(Shape::I32))
            .field("Avatar", Shape::pointer(Shape::record(&IMAGE)))
            .field("Images", Shape::list(Shape::pointer(Shape::record(&IMAGE))))
            .field("Tags", Shape::list(Shape::String))
            .field("Friends", Shape::list(Shape::pointer(Shape::deferred(user))))
            .field("Name", Shape::interface(&USER_NAME))
            .field("ExtraUser", Shape::pointer(Shape::Any))
            .add_field(FieldDescriptor::new("state", Shape::I32).set_exported(false))
            .add_field(FieldDescriptor::new("sizeCache", Shape::I32).set_exported(false))
            .build(),
    )
});

pub fn image() -> Arc<RecordType> {
    IMAGE.clone()
}

pub fn user() -> Arc<RecordType> {
    USER.clone()
}

pub fn male_name() -> Arc<RecordType> {
    MALE_NAME.clone()
}

pub fn female_name() -> Arc<RecordType> {
    FEMALE_NAME.clone()
}

pub fn user_name() -> Arc<InterfaceType> {
    USER_NAME.clone()
}

/// A registry with all the types that may appear in an `Any`.
pub fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .register(TypeRef::Deferred(user))
        .register(image())
        .register(male_name())
        .register(female_name())
}

pub fn options() -> CopyOptions {
    CopyOptions::new().set_registry(registry())
}

pub fn filter(text: &str) -> anyhow::Result<FieldFilter> {
    Ok(FieldFilter::from(Mask::parse(text)?))
}

pub fn new_image(original: &str, resized: &str) -> anyhow::Result<Record> {
    Ok(Record::new(image())
        .set("OriginalUrl", original)?
        .set("ResizedUrl", resized)?)
}

pub fn male(name: &str) -> anyhow::Result<Interface> {
    let name = Record::new(male_name()).set("MaleName", name)?;
    Ok(Interface::new(user_name(), Pointer::to(name)))
}

pub fn female(name: &str) -> anyhow::Result<Interface> {
    let name = Record::new(female_name()).set("FemaleName", name)?;
    Ok(Interface::new(user_name(), Pointer::to(name)))
}

/// A user with every field set.
pub fn full_user() -> anyhow::Result<Record> {
    let friend = Record::new(user())
        .set("Id", 2_u32)?
        .set("Username", "friend")?
        .set("Permissions", List::new(Shape::I32, [PERMISSION_READ]))?
        .set("Avatar", Pointer::to(new_image("friend.jpg", "friend_small.jpg")?))?
        .set(
            "Images",
            List::new(
                Shape::pointer(Shape::record(&image())),
                [
                    Pointer::to(new_image("f1.jpg", "f1_small.jpg")?),
                    Pointer::to(new_image("f2.jpg", "f2_small.jpg")?),
                ],
            ),
        )?
        .set("Tags", List::new(Shape::String, ["friend_tag"]))?
        .set("Name", female("Alice")?)?;
    let extra = Record::new(user())
        .set("Id", 42_u32)?
        .set("Username", "extra")?
        .set("Avatar", Pointer::to(new_image("extra.jpg", "extra_small.jpg")?))?;

    let record = Record::new(user())
        .set("Id", 1_u32)?
        .set("Username", "username")?
        .set("Role", ROLE_REGULAR)?
        .set(
            "Meta",
            MapValue::new(Shape::String, [("foo", Value::from("bar"))]),
        )?
        .set("Deactivated", true)?
        .set(
            "Permissions",
            List::new(Shape::I32, [PERMISSION_READ, PERMISSION_WRITE]),
        )?
        .set("Avatar", Pointer::to(new_image("original.jpg", "resized.jpg")?))?
        .set(
            "Images",
            List::new(
                Shape::pointer(Shape::record(&image())),
                [
                    Pointer::to(new_image("1.jpg", "1_small.jpg")?),
                    Pointer::to(new_image("2.jpg", "2_small.jpg")?),
                ],
            ),
        )?
        .set("Tags", List::new(Shape::String, ["tag_1", "tag_2"]))?
        .set(
            "Friends",
            List::new(Shape::pointer(Shape::deferred(user)), [Pointer::to(friend)]),
        )?
        .set("Name", male("John")?)?
        .set("ExtraUser", Pointer::to(Any::from_record(&extra)))?;
    Ok(record)
}
