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

//! Test utilities for the business layer.

use crate::db;
use crate::driver::{Driver, DriverOptions};
use crate::model::{Book, HashedPassword, User};
use bookstore_core::clocks::testutils::SettableClock;
use bookstore_core::db::{Db, Executor};
use bookstore_core::model::EmailAddress;
use std::sync::Arc;
use time::macros::datetime;

/// Cheapest cost accepted by bcrypt, to keep tests fast.
pub(crate) const TEST_PASSWORD_COST: u32 = 4;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The clock used by the driver, which tests can advance.
    clock: Arc<SettableClock>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database and a settable clock.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(bookstore_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(datetime!(2024-05-01 10:00:00 UTC)));
        let opts = DriverOptions { password_cost: TEST_PASSWORD_COST };
        let driver = Driver::new(db.clone(), clock.clone(), opts);
        Self { db, clock, driver }
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Gets the clock used by the driver.
    pub(crate) fn clock(&self) -> &SettableClock {
        &self.clock
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Creates a user by directly modifying the backing database.
    pub(crate) async fn create_user(&self, email: &'static str) -> User {
        db::create_user(
            &mut self.ex().await,
            EmailAddress::from(email),
            HashedPassword::new("not-a-real-hash"),
            datetime!(2024-04-01 08:00:00 UTC),
        )
        .await
        .unwrap()
    }

    /// Creates a book by directly modifying the backing database.
    pub(crate) async fn create_book(&self, title: &'static str, author: &'static str) -> Book {
        db::create_book(
            &mut self.ex().await,
            title.to_owned(),
            author.to_owned(),
            datetime!(2024-04-01 08:00:00 UTC),
        )
        .await
        .unwrap()
    }
}
