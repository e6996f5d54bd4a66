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

//! API to place a new order.

use crate::driver::Driver;
use crate::model::{BookId, Order, UserId};
use axum::Json;
use axum::extract::State;
use bookstore_core::rest::{Envelope, JsonBody, RestError, RestResult, success};
use serde::{Deserialize, Serialize};

/// Reference to an existing book within an order request.  Any other book fields sent by the
/// client are ignored.
#[derive(Deserialize, Serialize)]
pub(crate) struct BookRef {
    /// Identifier of the book.
    #[serde(rename = "ID")]
    pub(crate) id: BookId,
}

/// Message sent to the server to place an order.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct CreateOrderRequest {
    /// User placing the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) user_id: Option<UserId>,

    /// Books to include in the order.
    #[serde(default)]
    pub(crate) books: Vec<BookRef>,
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    JsonBody(request): JsonBody<CreateOrderRequest>,
) -> RestResult<Json<Envelope<Order>>> {
    let user_id = match request.user_id {
        Some(user_id) => user_id,
        None => return Err(RestError::InvalidRequest("User ID is required".to_owned())),
    };
    let book_ids = request.books.into_iter().map(|b| b.id).collect();

    let order = driver.create_order(user_id, book_ids).await?;
    Ok(success("Order created successfully", order))
}
