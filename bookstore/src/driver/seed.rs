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

//! Extends the driver with the `seed` method to populate the store with sample data.

use crate::db;
use crate::driver::Driver;
use crate::model::{BookId, Password, UserId};
use bookstore_core::driver::DriverResult;
use bookstore_core::model::EmailAddress;
use derive_getters::Getters;

/// Books inserted by `seed`, as (title, author) pairs.
const SEED_BOOKS: &[(&str, &str)] = &[
    ("Harry Potter and the Sorcerer's Stone", "J.K. Rowling"),
    ("The Lord of the Rings", "J.R.R. Tolkien"),
    ("Dune", "Frank Herbert"),
    ("Foundation", "Isaac Asimov"),
    ("Snow Crash", "Neal Stephenson"),
    ("The Left Hand of Darkness", "Ursula K. Le Guin"),
    ("Ender's Game", "Orson Scott Card"),
    ("Hyperion", "Dan Simmons"),
    ("The Martian", "Andy Weir"),
];

/// Email address of the user inserted by `seed`.
const SEED_USER_EMAIL: &str = "test@example.com";

/// Password of the user inserted by `seed`.
const SEED_USER_PASSWORD: &str = "password";

/// Identifiers of the entities created by `seed`.
#[derive(Debug, Getters)]
pub struct SeedSummary {
    /// Identifiers of the seeded books, in insertion order.
    book_ids: Vec<BookId>,

    /// Identifier of the seeded user.
    user_id: UserId,
}

impl Driver {
    /// Wipes all data in the store and replaces it with a fixed set of books and a test user.
    pub async fn seed(self) -> DriverResult<SeedSummary> {
        let email = EmailAddress::new(SEED_USER_EMAIL)?;
        let password = Password::new(SEED_USER_PASSWORD)?.hash(self.opts.password_cost)?;

        let mut tx = self.db.begin().await?;
        db::clear_all(tx.ex()).await?;

        let now = self.clock.now_utc();
        let mut book_ids = Vec::with_capacity(SEED_BOOKS.len());
        for (title, author) in SEED_BOOKS {
            let book =
                db::create_book(tx.ex(), (*title).to_owned(), (*author).to_owned(), now).await?;
            book_ids.push(*book.id());
        }
        let user = db::create_user(tx.ex(), email, password, now).await?;

        tx.commit().await?;
        Ok(SeedSummary { book_ids, user_id: *user.id() })
    }
}
