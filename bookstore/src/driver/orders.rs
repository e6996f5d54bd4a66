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

//! Extends the driver with order operations.

use crate::db;
use crate::driver::Driver;
use crate::model::{BookId, Order, UserId};
use bookstore_core::db::DbError;
use bookstore_core::driver::{DriverError, DriverResult};

impl Driver {
    /// Places a new order for `user_id` with the books identified by `book_ids`.
    ///
    /// All books must exist.  Nothing is persisted if any of them, or the user, is missing.
    /// The list may be empty and may name the same book more than once.
    pub(crate) async fn create_order(
        self,
        user_id: UserId,
        book_ids: Vec<BookId>,
    ) -> DriverResult<Order> {
        let mut tx = self.db.begin().await?;

        match db::get_user(tx.ex(), user_id).await {
            Ok(_) => (),
            Err(DbError::NotFound) => {
                return Err(DriverError::NotFound(format!("User {} not found", user_id)));
            }
            Err(e) => return Err(e.into()),
        }

        let mut books = Vec::with_capacity(book_ids.len());
        for id in book_ids {
            match db::get_book(tx.ex(), id).await {
                Ok(book) => books.push(book),
                Err(DbError::NotFound) => {
                    return Err(DriverError::NotFound(format!("Book {} not found", id)));
                }
                Err(e) => return Err(e.into()),
            }
        }

        let now = self.clock.now_utc();
        let order = db::create_order(tx.ex(), user_id, books, now).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// Gets all orders placed by `user_id`.  Unknown users have no orders.
    pub(crate) async fn list_orders_for_user(self, user_id: UserId) -> DriverResult<Vec<Order>> {
        let mut tx = self.db.begin().await?;
        let orders = db::list_orders_for_user(tx.ex(), user_id).await?;
        tx.commit().await?;
        Ok(orders)
    }
}
