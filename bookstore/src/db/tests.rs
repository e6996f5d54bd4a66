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

//! Tests for the database layer against an in-memory SQLite database.

use super::*;
use bookstore_core::db::Db;
use bookstore_core::db::sqlite::SqliteDb;
use time::macros::datetime;

/// Opens a fresh in-memory database with the schema applied.
async fn setup() -> SqliteDb {
    let db = bookstore_core::db::sqlite::testutils::setup().await;
    init_schema(&mut db.ex().await.unwrap()).await.unwrap();
    db
}

/// Syntactic sugar to create a user given only its email address.
async fn create_simple_user(ex: &mut Executor, email: &'static str) -> User {
    create_user(
        ex,
        EmailAddress::from(email),
        HashedPassword::new("some-hash"),
        datetime!(2024-05-01 10:00:00 UTC),
    )
    .await
    .unwrap()
}

/// Syntactic sugar to create a book given only its title.
async fn create_simple_book(ex: &mut Executor, title: &'static str) -> Book {
    create_book(
        ex,
        title.to_owned(),
        format!("Author of {}", title),
        datetime!(2024-05-01 10:00:00 UTC),
    )
    .await
    .unwrap()
}

/// Marks the row `id` of `table` as deleted by setting its soft-deletion timestamp.
async fn soft_delete(ex: &mut Executor, table: &str, id: i64) {
    match ex {
        Executor::Sqlite(ex) => {
            let query_str = format!(
                "UPDATE {} SET deleted_at_secs = 1, deleted_at_nsecs = 0 WHERE id = ?",
                table
            );
            sqlx::query(&query_str).bind(id).execute(ex.conn()).await.unwrap();
        }
    }
}

#[tokio::test]
async fn test_init_schema_is_idempotent() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    create_simple_book(&mut ex, "Dune").await;
    init_schema(&mut ex).await.unwrap();
    assert_eq!(1, list_books(&mut ex).await.unwrap().len());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_users_ok() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    let now = datetime!(2024-05-01 10:00:00.123 UTC);
    let user = create_user(
        &mut ex,
        EmailAddress::from("a@example.com"),
        HashedPassword::new("the-hash"),
        now,
    )
    .await
    .unwrap();
    assert_eq!(&EmailAddress::from("a@example.com"), user.email());
    assert_eq!(&HashedPassword::new("the-hash"), user.password());
    assert_eq!(&now, user.created_at());
    assert_eq!(&now, user.updated_at());

    assert_eq!(user, get_user(&mut ex, *user.id()).await.unwrap());
    assert_eq!(
        user,
        get_user_by_email(&mut ex, &EmailAddress::from("a@example.com")).await.unwrap()
    );

    let other = create_simple_user(&mut ex, "b@example.com").await;
    assert_ne!(user.id(), other.id());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_users_duplicate_email() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    create_simple_user(&mut ex, "a@example.com").await;
    assert_eq!(
        DbError::AlreadyExists,
        create_user(
            &mut ex,
            EmailAddress::from("a@example.com"),
            HashedPassword::new("other-hash"),
            datetime!(2024-05-02 10:00:00 UTC),
        )
        .await
        .unwrap_err()
    );

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_users_not_found() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    assert_eq!(DbError::NotFound, get_user(&mut ex, UserId::new(1)).await.unwrap_err());
    assert_eq!(
        DbError::NotFound,
        get_user_by_email(&mut ex, &EmailAddress::from("a@example.com")).await.unwrap_err()
    );

    let user = create_simple_user(&mut ex, "a@example.com").await;
    soft_delete(&mut ex, "users", user.id().as_i64()).await;
    assert_eq!(DbError::NotFound, get_user(&mut ex, *user.id()).await.unwrap_err());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_users_abort_creation() {
    let db = setup().await;

    let mut tx = db.begin().await.unwrap();
    let user = create_simple_user(tx.ex(), "a@example.com").await;
    drop(tx);

    let mut ex = db.ex().await.unwrap();
    assert_eq!(DbError::NotFound, get_user(&mut ex, *user.id()).await.unwrap_err());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_books_ok() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    assert!(list_books(&mut ex).await.unwrap().is_empty());

    let book1 = create_simple_book(&mut ex, "Dune").await;
    let book2 = create_simple_book(&mut ex, "Foundation").await;
    let book3 = create_simple_book(&mut ex, "Hyperion").await;
    assert!(book1.id() < book2.id());
    assert!(book2.id() < book3.id());

    assert_eq!(book2, get_book(&mut ex, *book2.id()).await.unwrap());
    assert_eq!(
        vec![book1.clone(), book2.clone(), book3.clone()],
        list_books(&mut ex).await.unwrap()
    );

    soft_delete(&mut ex, "books", book2.id().as_i64()).await;
    assert_eq!(DbError::NotFound, get_book(&mut ex, *book2.id()).await.unwrap_err());
    assert_eq!(vec![book1, book3], list_books(&mut ex).await.unwrap());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_books_not_found() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    assert_eq!(DbError::NotFound, get_book(&mut ex, BookId::new(5)).await.unwrap_err());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_orders_ok() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    let user1 = create_simple_user(&mut ex, "a@example.com").await;
    let user2 = create_simple_user(&mut ex, "b@example.com").await;
    let book1 = create_simple_book(&mut ex, "Dune").await;
    let book2 = create_simple_book(&mut ex, "Foundation").await;
    let book3 = create_simple_book(&mut ex, "Hyperion").await;

    assert!(list_orders_for_user(&mut ex, *user1.id()).await.unwrap().is_empty());

    let now1 = datetime!(2024-05-03 11:00:00 UTC);
    let order1 = create_order(&mut ex, *user1.id(), vec![book3.clone(), book1.clone()], now1)
        .await
        .unwrap();
    assert_eq!(user1.id(), order1.user_id());
    assert_eq!(&vec![book3.clone(), book1.clone()], order1.books());
    assert_eq!(&now1, order1.created_at());

    let now2 = datetime!(2024-05-03 12:00:00 UTC);
    let order2 = create_order(&mut ex, *user2.id(), vec![book2.clone()], now2).await.unwrap();

    let now3 = datetime!(2024-05-03 13:00:00 UTC);
    let order3 = create_order(&mut ex, *user1.id(), vec![book2.clone(), book3.clone()], now3)
        .await
        .unwrap();

    assert_eq!(
        vec![order1.clone(), order3.clone()],
        list_orders_for_user(&mut ex, *user1.id()).await.unwrap()
    );
    assert_eq!(vec![order2], list_orders_for_user(&mut ex, *user2.id()).await.unwrap());
    assert!(list_orders_for_user(&mut ex, UserId::new(12345)).await.unwrap().is_empty());

    soft_delete(&mut ex, "orders", order1.id().as_i64()).await;
    assert_eq!(vec![order3], list_orders_for_user(&mut ex, *user1.id()).await.unwrap());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_orders_unknown_references() {
    let db = setup().await;

    let user;
    let book;
    {
        let mut ex = db.ex().await.unwrap();
        user = create_simple_user(&mut ex, "a@example.com").await;
        book = create_simple_book(&mut ex, "Dune").await;
    }

    let mut tx = db.begin().await.unwrap();
    assert_eq!(
        DbError::NotFound,
        create_order(
            tx.ex(),
            UserId::new(9999),
            vec![book.clone()],
            datetime!(2024-05-03 11:00:00 UTC)
        )
        .await
        .unwrap_err()
    );
    drop(tx);

    let missing = Book::new(
        BookId::new(9999),
        "Missing".to_owned(),
        "Nobody".to_owned(),
        datetime!(2024-05-03 11:00:00 UTC),
        datetime!(2024-05-03 11:00:00 UTC),
    );
    let mut tx = db.begin().await.unwrap();
    assert_eq!(
        DbError::NotFound,
        create_order(tx.ex(), *user.id(), vec![book, missing], datetime!(2024-05-03 11:00:00 UTC))
            .await
            .unwrap_err()
    );
    drop(tx);

    let mut ex = db.ex().await.unwrap();
    assert!(list_orders_for_user(&mut ex, *user.id()).await.unwrap().is_empty());

    drop(ex);
    db.close().await;
}

#[tokio::test]
async fn test_clear_all() {
    let db = setup().await;
    let mut ex = db.ex().await.unwrap();

    let user = create_simple_user(&mut ex, "a@example.com").await;
    let book = create_simple_book(&mut ex, "Dune").await;
    create_order(&mut ex, *user.id(), vec![book], datetime!(2024-05-03 11:00:00 UTC))
        .await
        .unwrap();

    clear_all(&mut ex).await.unwrap();

    assert_eq!(DbError::NotFound, get_user(&mut ex, *user.id()).await.unwrap_err());
    assert!(list_books(&mut ex).await.unwrap().is_empty());
    assert!(list_orders_for_user(&mut ex, *user.id()).await.unwrap().is_empty());

    // Emails of deleted users can be registered again.
    create_simple_user(&mut ex, "a@example.com").await;

    drop(ex);
    db.close().await;
}
