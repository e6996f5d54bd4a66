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

//! Business logic for the service.

use bookstore_core::clocks::Clock;
use bookstore_core::db::Db;
use bookstore_core::env::get_optional_var;
use std::sync::Arc;

mod books;
mod orders;
mod seed;
pub use seed::SeedSummary;
#[cfg(test)]
pub(crate) mod testutils;
mod users;

/// Lowest bcrypt cost accepted for password hashing.
const MIN_PASSWORD_COST: u32 = 4;

/// Highest bcrypt cost accepted for password hashing.
const MAX_PASSWORD_COST: u32 = 31;

/// Configuration options for the driver.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverOptions {
    /// The bcrypt cost to use when hashing new passwords.
    pub password_cost: u32,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self { password_cost: bcrypt::DEFAULT_COST }
    }
}

impl DriverOptions {
    /// Creates a new set of options from environment variables whose names start with `prefix`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        let password_cost = get_optional_var::<u32>(prefix, "PASSWORD_COST")?
            .unwrap_or(bcrypt::DEFAULT_COST);
        if !(MIN_PASSWORD_COST..=MAX_PASSWORD_COST).contains(&password_cost) {
            return Err(format!(
                "Invalid value in environment variable {}_PASSWORD_COST: must be in the range \
                [{}, {}]",
                prefix, MIN_PASSWORD_COST, MAX_PASSWORD_COST
            ));
        }
        Ok(Self { password_cost })
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Clock instance to obtain the current time.
    clock: Arc<dyn Clock + Send + Sync>,

    /// Options for the driver.
    opts: DriverOptions,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub fn new(
        db: Arc<dyn Db + Send + Sync>,
        clock: Arc<dyn Clock + Send + Sync>,
        opts: DriverOptions,
    ) -> Self {
        Self { db, clock, opts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_options_from_env_all_present() {
        let overrides = [("BOOKSTORE_PASSWORD_COST", Some("5"))];
        temp_env::with_vars(overrides, || {
            let opts = DriverOptions::from_env("BOOKSTORE").unwrap();
            assert_eq!(DriverOptions { password_cost: 5 }, opts);
        });
    }

    #[test]
    fn test_driver_options_from_env_default() {
        temp_env::with_vars_unset(["BOOKSTORE_PASSWORD_COST"], || {
            let opts = DriverOptions::from_env("BOOKSTORE").unwrap();
            assert_eq!(DriverOptions::default(), opts);
        });
    }

    #[test]
    fn test_driver_options_from_env_bad_values() {
        for (value, error) in
            [("abc", "Invalid type"), ("3", "range [4, 31]"), ("32", "range [4, 31]")]
        {
            temp_env::with_vars([("BOOKSTORE_PASSWORD_COST", Some(value))], || {
                let e = DriverOptions::from_env("BOOKSTORE").unwrap_err();
                assert!(e.contains("BOOKSTORE_PASSWORD_COST"), "{}", e);
                assert!(e.contains(&error), "'{}' does not contain '{}'", e, error);
            });
        }
    }
}
