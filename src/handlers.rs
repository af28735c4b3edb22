//! HTTP endpoint handlers.
//!
//! Each submodule owns one router, nested under its path prefix in
//! `main.rs`. Handlers validate request shape (field presence, email
//! syntax, numeric timestamps) before anything reaches the engine or a
//! repository, and translate the engine's error set into HTTP statuses:
//! absence becomes a 4xx, everything else a generic 500 with the detail
//! logged server-side.

pub mod customer;
pub mod health;
pub mod risk;
pub mod student;
