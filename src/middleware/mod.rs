// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, response headers).

pub mod auth;
pub mod security;

pub use auth::{create_jwt, require_auth, AuthCoach};
pub use security::{add_no_cache_headers, add_security_headers};
