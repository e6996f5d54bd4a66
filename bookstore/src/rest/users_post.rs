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

//! API to create a new user.

use crate::driver::Driver;
use crate::model::{Password, User, UserId};
use axum::Json;
use axum::extract::State;
use bookstore_core::model::EmailAddress;
use bookstore_core::rest::{Envelope, JsonBody, RestError, RestResult, success};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Message sent to the server to create a user.
#[derive(Default, Deserialize, Serialize)]
pub(crate) struct CreateUserRequest {
    /// Email address to register.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,

    /// Password for the new user, in plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) password: Option<String>,
}

/// Public view of a user, which never includes the password.
#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub(crate) struct UserResponse {
    /// Identifier of the user.
    #[serde(rename = "ID")]
    pub(crate) id: UserId,

    /// Email address of the user.
    pub(crate) email: EmailAddress,

    /// Time at which the user was created.
    #[serde(rename = "CreatedAt", with = "time::serde::rfc3339")]
    pub(crate) created_at: OffsetDateTime,

    /// Time at which the user was last modified.
    #[serde(rename = "UpdatedAt", with = "time::serde::rfc3339")]
    pub(crate) updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: *user.id(),
            email: user.email().clone(),
            created_at: *user.created_at(),
            updated_at: *user.updated_at(),
        }
    }
}

/// POST handler for this API.
pub(crate) async fn handler(
    State(driver): State<Driver>,
    JsonBody(request): JsonBody<CreateUserRequest>,
) -> RestResult<Json<Envelope<UserResponse>>> {
    let (email, password) = match (request.email, request.password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            (email, password)
        }
        _ => {
            return Err(RestError::InvalidRequest("Email and password are required".to_owned()));
        }
    };
    let email = EmailAddress::new(email)?;
    let password = Password::new(password)?;

    let user = driver.create_user(email, password).await?;
    Ok(success("User created successfully", UserResponse::from(user)))
}
