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

//! Extends the driver with user management operations.

use crate::db;
use crate::driver::Driver;
use crate::model::{Password, User};
use bookstore_core::db::DbError;
use bookstore_core::driver::{DriverError, DriverResult};
use bookstore_core::model::EmailAddress;

impl Driver {
    /// Registers a new user with `email` and `password`.
    ///
    /// The password is hashed before it reaches the database.
    pub(crate) async fn create_user(
        self,
        email: EmailAddress,
        password: Password,
    ) -> DriverResult<User> {
        let password = password.hash(self.opts.password_cost)?;

        let mut tx = self.db.begin().await?;
        let now = self.clock.now_utc();
        let user = match db::create_user(tx.ex(), email, password, now).await {
            Ok(user) => user,
            Err(DbError::AlreadyExists) => {
                return Err(DriverError::AlreadyExists(
                    "Email address is already registered".to_owned(),
                ));
            }
            Err(e) => return Err(e.into()),
        };
        tx.commit().await?;
        Ok(user)
    }
}
