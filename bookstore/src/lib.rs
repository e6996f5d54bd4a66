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

//! REST service to manage the inventory and orders of a small bookstore.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use bookstore_core::clocks::SystemClock;
use bookstore_core::db::Db;
use bookstore_core::db::sqlite;
use bookstore_core::env::get_optional_var;
use log::{info, warn};
use std::error::Error;
use std::net::Ipv4Addr;
use std::sync::Arc;

pub mod db;
pub mod driver;
use driver::{Driver, DriverOptions};
pub mod model;
mod rest;
use rest::app;

/// Default port to listen on when not configured.
const DEFAULT_PORT: u16 = 8000;

/// Default path to the database file when not configured.
const DEFAULT_DATABASE: &str = "bookstore.db";

/// Configuration options for the service.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceOptions {
    /// Port to listen on, on all interfaces.
    pub port: u16,

    /// Path to the SQLite database file, or `:memory:`.
    pub database: String,

    /// Whether to wipe the database and load sample data at startup.
    pub seed: bool,

    /// Options for the business logic.
    pub driver: DriverOptions,
}

impl ServiceOptions {
    /// Creates a new set of options from environment variables whose names start with `prefix`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        Ok(Self {
            port: get_optional_var::<u16>(prefix, "PORT")?.unwrap_or(DEFAULT_PORT),
            database: get_optional_var::<String>(prefix, "DATABASE")?
                .unwrap_or_else(|| DEFAULT_DATABASE.to_owned()),
            seed: get_optional_var::<bool>(prefix, "SEED")?.unwrap_or(true),
            driver: DriverOptions::from_env(prefix)?,
        })
    }
}

/// Waits until the process is asked to terminate.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received termination request; shutting down"),
        Err(e) => {
            warn!("Cannot listen for termination requests: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

/// Prepares the database in `db` and serves the application until shutdown.
async fn run(db: Arc<dyn Db + Send + Sync>, opts: ServiceOptions) -> Result<(), Box<dyn Error>> {
    db::init_schema(&mut db.ex().await?).await?;

    let driver = Driver::new(db, Arc::new(SystemClock::default()), opts.driver);
    if opts.seed {
        let summary = driver.clone().seed().await?;
        info!("Seeded database with {} books", summary.book_ids().len());
    }

    let listener = tokio::net::TcpListener::bind((Ipv4Addr::UNSPECIFIED, opts.port)).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app(driver)).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

/// Instantiates all resources to serve the application with the given `opts`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(opts: ServiceOptions) -> Result<(), Box<dyn Error>> {
    let db = Arc::new(sqlite::connect(&opts.database).await?);
    let result = run(db.clone(), opts).await;
    db.close().await;
    result
}
