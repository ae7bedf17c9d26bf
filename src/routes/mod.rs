//! Router Module Index
//!
//! Splits the API by access level. Authentication is applied as a layer on the
//! authenticated router; the ADMIN authority is enforced per handler through the
//! `AdminUser` extractor.

/// Routes reachable without a token: health, registration, login and the news proxy.
pub mod public;

/// Routes behind the `AuthUser` middleware. Writes inside them still require `AdminUser`.
pub mod authenticated;

/// Account management and the dashboard, nested under `/api/admin`.
pub mod admin;
