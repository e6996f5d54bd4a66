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

//! Database abstraction to manipulate users, books and orders.

use crate::model::{Book, BookId, HashedPassword, Order, OrderId, User, UserId};
use bookstore_core::db::sqlite::{self, build_timestamp, map_sqlx_error, unpack_timestamp};
use bookstore_core::db::{DbError, DbResult, Executor};
use bookstore_core::model::EmailAddress;
use futures::TryStreamExt;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::collections::HashMap;
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Initializes the database schema.
pub async fn init_schema(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Sqlite(ex) => sqlite::run_schema(ex, include_str!("sqlite.sql")).await,
    }
}

/// Deletes all rows from all tables.
pub async fn clear_all(ex: &mut Executor) -> DbResult<()> {
    match ex {
        Executor::Sqlite(ex) => {
            let query_str = "
                DELETE FROM order_books;
                DELETE FROM orders;
                DELETE FROM users;
                DELETE FROM books;";
            sqlx::raw_sql(query_str).execute(ex.conn()).await.map_err(map_sqlx_error)?;
            Ok(())
        }
    }
}

/// Extracts the timestamp stored in the `<column>_secs` and `<column>_nsecs` pair of `row`.
fn get_timestamp(row: &SqliteRow, column: &str) -> DbResult<OffsetDateTime> {
    let secs: i64 = row.try_get(format!("{}_secs", column).as_str()).map_err(map_sqlx_error)?;
    let nsecs: i64 = row.try_get(format!("{}_nsecs", column).as_str()).map_err(map_sqlx_error)?;
    build_timestamp(secs, nsecs)
}

impl TryFrom<SqliteRow> for User {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let email: String = row.try_get("email").map_err(map_sqlx_error)?;
        let password: String = row.try_get("password").map_err(map_sqlx_error)?;
        let created_at = get_timestamp(&row, "created_at")?;
        let updated_at = get_timestamp(&row, "updated_at")?;

        Ok(User::new(
            UserId::new(id),
            EmailAddress::new(email)?,
            HashedPassword::new(password),
            created_at,
            updated_at,
        ))
    }
}

impl TryFrom<SqliteRow> for Book {
    type Error = DbError;

    fn try_from(row: SqliteRow) -> DbResult<Self> {
        let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
        let title: String = row.try_get("title").map_err(map_sqlx_error)?;
        let author: String = row.try_get("author").map_err(map_sqlx_error)?;
        let created_at = get_timestamp(&row, "created_at")?;
        let updated_at = get_timestamp(&row, "updated_at")?;

        Ok(Book::new(BookId::new(id), title, author, created_at, updated_at))
    }
}

/// Builds an order from a row of the `orders` table and its already-loaded `books`.
fn order_from_row(row: &SqliteRow, books: Vec<Book>) -> DbResult<Order> {
    let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
    let user_id: i64 = row.try_get("user_id").map_err(map_sqlx_error)?;
    let created_at = get_timestamp(row, "created_at")?;
    let updated_at = get_timestamp(row, "updated_at")?;

    Ok(Order::new(OrderId::new(id), UserId::new(user_id), books, created_at, updated_at))
}

/// Creates a new user with an `email` address and a `password` in hashed form, recording `now`
/// as its creation time.
pub async fn create_user(
    ex: &mut Executor,
    email: EmailAddress,
    password: HashedPassword,
    now: OffsetDateTime,
) -> DbResult<User> {
    let (now_secs, now_nsecs) = unpack_timestamp(now);

    let id = match ex {
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO users (
                    email, password,
                    created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs
                ) VALUES (?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(email.as_str())
                .bind(password.as_str())
                .bind(now_secs)
                .bind(now_nsecs)
                .bind(now_secs)
                .bind(now_nsecs)
                .execute(ex.conn())
                .await
                .map_err(map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion affected more than one row".to_owned(),
                ));
            }
            done.last_insert_rowid()
        }
    };

    Ok(User::new(UserId::new(id), email, password, now, now))
}

/// Gets information about an existing user with identifier `id`.
pub async fn get_user(ex: &mut Executor, id: UserId) -> DbResult<User> {
    match ex {
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM users WHERE id = ? AND deleted_at_secs IS NULL";
            let raw_user = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(map_sqlx_error)?;
            User::try_from(raw_user)
        }
    }
}

/// Gets information about an existing user registered with `email`.
pub async fn get_user_by_email(ex: &mut Executor, email: &EmailAddress) -> DbResult<User> {
    match ex {
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM users WHERE email = ? AND deleted_at_secs IS NULL";
            let raw_user = sqlx::query(query_str)
                .bind(email.as_str())
                .fetch_one(ex.conn())
                .await
                .map_err(map_sqlx_error)?;
            User::try_from(raw_user)
        }
    }
}

/// Adds a book with a `title` and an `author` to the catalog, recording `now` as its creation
/// time.
pub async fn create_book(
    ex: &mut Executor,
    title: String,
    author: String,
    now: OffsetDateTime,
) -> DbResult<Book> {
    let (now_secs, now_nsecs) = unpack_timestamp(now);

    let id = match ex {
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO books (
                    title, author,
                    created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs
                ) VALUES (?, ?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(&title)
                .bind(&author)
                .bind(now_secs)
                .bind(now_nsecs)
                .bind(now_secs)
                .bind(now_nsecs)
                .execute(ex.conn())
                .await
                .map_err(map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion affected more than one row".to_owned(),
                ));
            }
            done.last_insert_rowid()
        }
    };

    Ok(Book::new(BookId::new(id), title, author, now, now))
}

/// Gets an existing book with identifier `id`.
pub async fn get_book(ex: &mut Executor, id: BookId) -> DbResult<Book> {
    match ex {
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM books WHERE id = ? AND deleted_at_secs IS NULL";
            let raw_book = sqlx::query(query_str)
                .bind(id.as_i64())
                .fetch_one(ex.conn())
                .await
                .map_err(map_sqlx_error)?;
            Book::try_from(raw_book)
        }
    }
}

/// Gets all books in the catalog sorted by their identifier.
pub async fn list_books(ex: &mut Executor) -> DbResult<Vec<Book>> {
    match ex {
        Executor::Sqlite(ex) => {
            let query_str = "SELECT * FROM books WHERE deleted_at_secs IS NULL ORDER BY id";
            let mut rows = sqlx::query(query_str).fetch(ex.conn());

            let mut books = vec![];
            while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
                books.push(Book::try_from(row)?);
            }
            Ok(books)
        }
    }
}

/// Creates a new order for `user_id` containing `books`, recording `now` as its creation time.
///
/// The position of each book in `books` is persisted so that the order lists them back in the
/// same sequence.  Referencing a user or a book that does not exist yields `DbError::NotFound`.
pub async fn create_order(
    ex: &mut Executor,
    user_id: UserId,
    books: Vec<Book>,
    now: OffsetDateTime,
) -> DbResult<Order> {
    let (now_secs, now_nsecs) = unpack_timestamp(now);

    let id = match ex {
        Executor::Sqlite(ex) => {
            let query_str = "
                INSERT INTO orders (
                    user_id,
                    created_at_secs, created_at_nsecs, updated_at_secs, updated_at_nsecs
                ) VALUES (?, ?, ?, ?, ?)";
            let done = sqlx::query(query_str)
                .bind(user_id.as_i64())
                .bind(now_secs)
                .bind(now_nsecs)
                .bind(now_secs)
                .bind(now_nsecs)
                .execute(ex.conn())
                .await
                .map_err(map_sqlx_error)?;
            if done.rows_affected() != 1 {
                return Err(DbError::BackendError(
                    "Insertion affected more than one row".to_owned(),
                ));
            }
            let id = done.last_insert_rowid();

            for (position, book) in books.iter().enumerate() {
                let position = i64::try_from(position)
                    .map_err(|e| DbError::BackendError(format!("Too many books: {}", e)))?;

                let query_str =
                    "INSERT INTO order_books (order_id, book_id, position) VALUES (?, ?, ?)";
                let done = sqlx::query(query_str)
                    .bind(id)
                    .bind(book.id().as_i64())
                    .bind(position)
                    .execute(ex.conn())
                    .await
                    .map_err(map_sqlx_error)?;
                if done.rows_affected() != 1 {
                    return Err(DbError::BackendError(
                        "Insertion affected more than one row".to_owned(),
                    ));
                }
            }

            id
        }
    };

    Ok(Order::new(OrderId::new(id), user_id, books, now, now))
}

/// Gets all orders placed by `user_id` sorted by their identifier, with their books populated.
///
/// The books of all orders are fetched with a single query, so the cost of this operation does
/// not grow with the number of orders.
pub async fn list_orders_for_user(ex: &mut Executor, user_id: UserId) -> DbResult<Vec<Order>> {
    match ex {
        Executor::Sqlite(ex) => {
            let mut books_by_order: HashMap<OrderId, Vec<Book>> = HashMap::new();
            {
                let query_str = "
                    SELECT ob.order_id, b.*
                    FROM order_books ob
                        JOIN orders o ON o.id = ob.order_id
                        JOIN books b ON b.id = ob.book_id
                    WHERE
                        o.user_id = ? AND
                        o.deleted_at_secs IS NULL AND
                        b.deleted_at_secs IS NULL
                    ORDER BY ob.order_id, ob.position";
                let mut rows = sqlx::query(query_str).bind(user_id.as_i64()).fetch(ex.conn());
                while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
                    let order_id: i64 = row.try_get("order_id").map_err(map_sqlx_error)?;
                    books_by_order
                        .entry(OrderId::new(order_id))
                        .or_default()
                        .push(Book::try_from(row)?);
                }
            }

            let query_str = "
                SELECT * FROM orders
                WHERE user_id = ? AND deleted_at_secs IS NULL
                ORDER BY id";
            let mut rows = sqlx::query(query_str).bind(user_id.as_i64()).fetch(ex.conn());

            let mut orders = vec![];
            while let Some(row) = rows.try_next().await.map_err(map_sqlx_error)? {
                let id: i64 = row.try_get("id").map_err(map_sqlx_error)?;
                let books = books_by_order.remove(&OrderId::new(id)).unwrap_or_default();
                orders.push(order_from_row(&row, books)?);
            }
            Ok(orders)
        }
    }
}
