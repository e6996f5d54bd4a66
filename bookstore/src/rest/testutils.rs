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

//! Test utilities for the REST API.

use crate::db;
use crate::driver::testutils::TEST_PASSWORD_COST;
use crate::driver::{Driver, DriverOptions, SeedSummary};
use crate::model::{Book, HashedPassword, Order, User, UserId};
use crate::rest::app;
use axum::Router;
use bookstore_core::clocks::testutils::SettableClock;
use bookstore_core::db::{Db, DbError, Executor};
use bookstore_core::model::EmailAddress;
use std::sync::Arc;
use time::macros::datetime;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the app.
    db: Arc<dyn Db + Send + Sync>,

    /// A copy of the driver used by the app, to run operations directly.
    driver: Driver,

    /// The router for the app under test.
    app: Router,
}

impl TestContext {
    /// Initializes the app using an in-memory database and a settable clock.
    pub(crate) async fn setup() -> Self {
        let db: Arc<dyn Db + Send + Sync> =
            Arc::new(bookstore_core::db::sqlite::testutils::setup().await);
        db::init_schema(&mut db.ex().await.unwrap()).await.unwrap();
        let clock = Arc::new(SettableClock::new(datetime!(2024-05-01 10:00:00 UTC)));
        let opts = DriverOptions { password_cost: TEST_PASSWORD_COST };
        let driver = Driver::new(db.clone(), clock, opts);
        let app = app(driver.clone());
        Self { db, driver, app }
    }

    /// Gets a clone of the app router.
    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    /// Consumes the context and transforms it into the app router.
    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Gets a direct executor against the database.
    async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Closes the database so that any further request that reaches it fails.
    pub(crate) async fn close_db(&self) {
        self.db.close().await;
    }

    /// Populates the database with the sample data.
    pub(crate) async fn seed(&self) -> SeedSummary {
        self.driver.clone().seed().await.unwrap()
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
    pub(crate) async fn create_book(&self, title: &'static str) -> Book {
        db::create_book(
            &mut self.ex().await,
            title.to_owned(),
            format!("Author of {}", title),
            datetime!(2024-04-01 08:00:00 UTC),
        )
        .await
        .unwrap()
    }

    /// Creates an order by directly modifying the backing database.
    pub(crate) async fn create_order(&self, user_id: UserId, books: Vec<Book>) -> Order {
        db::create_order(&mut self.ex().await, user_id, books, datetime!(2024-04-02 08:00:00 UTC))
            .await
            .unwrap()
    }

    /// Gets the user registered with `email`, if any, by directly querying the database.
    pub(crate) async fn get_user_by_email(&self, email: &str) -> Option<User> {
        match db::get_user_by_email(&mut self.ex().await, &EmailAddress::from(email)).await {
            Ok(user) => Some(user),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Gets all orders of `user_id` by directly querying the database.
    pub(crate) async fn get_orders(&self, user_id: UserId) -> Vec<Order> {
        db::list_orders_for_user(&mut self.ex().await, user_id).await.unwrap()
    }
}
