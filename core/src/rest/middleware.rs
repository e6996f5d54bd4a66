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

//! Middleware applied uniformly to all routes of the service.

use crate::rest::{Envelope, INTERNAL_ERROR_MESSAGE};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use log::{error, info};
use std::any::Any;
use std::time::Instant;
use tower_http::catch_panic::CatchPanicLayer;

/// Logs the method, path, final status and duration of every request once it completes.
pub async fn log_request(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;

    info!("{} {} {} {:?}", method, path, response.status().as_u16(), start.elapsed());
    response
}

/// Converts a panic raised by a handler into a 500 error envelope after logging its details.
pub fn panic_to_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("Recovered from panic while serving request: {}", details);

    (http::StatusCode::INTERNAL_SERVER_ERROR, Json(Envelope::<()>::error(INTERNAL_ERROR_MESSAGE)))
        .into_response()
}

/// Wraps all routes in `router` with panic recovery and, outermost, request logging.
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_to_response))
        .layer(middleware::from_fn(log_request))
}
