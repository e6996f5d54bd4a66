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

//! API to list the orders placed by a user.

use crate::driver::Driver;
use crate::model::{Order, UserId};
use axum::Json;
use axum::extract::{Path, State};
use bookstore_core::rest::{EmptyBody, Envelope, RestResult, success};

/// GET handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    Path(user_id): Path<String>,
    _: EmptyBody,
) -> RestResult<Json<Envelope<Vec<Order>>>> {
    let user_id = UserId::parse(&user_id)?;

    let orders = driver.list_orders_for_user(user_id).await?;
    Ok(success("Orders retrieved successfully", orders))
}
