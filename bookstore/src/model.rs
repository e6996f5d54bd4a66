// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! High-level data types.

use bookstore_core::model::{EmailAddress, ModelError, ModelResult};
use derive_getters::Getters;
use derive_more::{Constructor, Display};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

mod password;
pub use password::{HashedPassword, Password};

/// Identifier of a user, as assigned by the database.
#[derive(
    Clone, Constructor, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Parses a user identifier from untrusted text, such as a path segment.
    ///
    /// Any integer is accepted, even if the database never assigns it.
    pub fn parse(s: &str) -> ModelResult<Self> {
        s.parse::<i64>().map(Self).map_err(|_| ModelError("Invalid user ID".to_owned()))
    }

    /// Returns the raw value of the identifier.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

/// Identifier of a book, as assigned by the database.
#[derive(
    Clone, Constructor, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct BookId(i64);

impl BookId {
    /// Returns the raw value of the identifier.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

/// Identifier of an order, as assigned by the database.
#[derive(
    Clone, Constructor, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd,
    Serialize,
)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Returns the raw value of the identifier.
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

/// A registered user of the store.
///
/// Users are never serialized directly because they carry the password hash.  The REST layer
/// exposes a separate view of them.
#[derive(Clone, Constructor, Debug, Getters, PartialEq)]
pub struct User {
    /// Identifier of the user.
    id: UserId,

    /// Email address used to register the user.  Unique across all users.
    email: EmailAddress,

    /// Hash of the user's password.
    password: HashedPassword,

    /// Time at which the user was created.
    created_at: OffsetDateTime,

    /// Time at which the user was last modified.
    updated_at: OffsetDateTime,
}

/// A book in the store's catalog.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct Book {
    /// Identifier of the book.
    #[serde(rename = "ID")]
    id: BookId,

    /// Title of the book.
    title: String,

    /// Author of the book.
    author: String,

    /// Time at which the book was added to the catalog.
    #[serde(rename = "CreatedAt", with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time at which the book was last modified.
    #[serde(rename = "UpdatedAt", with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}

/// An order placed by a user for one or more books.
#[derive(Clone, Constructor, Debug, Deserialize, Getters, PartialEq, Serialize)]
pub struct Order {
    /// Identifier of the order.
    #[serde(rename = "ID")]
    id: OrderId,

    /// User that placed the order.
    user_id: UserId,

    /// Books in the order, in the order in which they were requested.
    books: Vec<Book>,

    /// Time at which the order was placed.
    #[serde(rename = "CreatedAt", with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,

    /// Time at which the order was last modified.
    #[serde(rename = "UpdatedAt", with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
}
