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

//! Entry point to the REST server.

use crate::driver::Driver;
use axum::Router;
use bookstore_core::rest::with_middleware;

mod books_get;
mod orders_post;
#[cfg(test)]
mod testutils;
mod user_orders_get;
mod users_post;

/// Creates the router for the application, with request logging and panic recovery applied to
/// all routes.
pub(crate) fn app(driver: Driver) -> Router {
    use axum::routing::{get, post};

    let router = Router::new()
        .route("/users", post(users_post::handler))
        .route("/books", get(books_get::handler))
        .route("/orders", post(orders_post::handler))
        .route("/orders/:user_id", get(user_orders_get::handler))
        .with_state(driver);
    with_middleware(router)
}
