//! Router Module Index
//!
//! Organizes routing into security-segregated modules. Access control is
//! applied explicitly at the module level: public routes carry no auth,
//! authenticated routes sit behind the `AuthUser` middleware, and admin
//! routes additionally run the admin-only guard inside each handler.

/// Routes accessible to anonymous callers: registration, login, and the
/// open read surface for posts, comments, and tags.
pub mod public;

/// Routes requiring a validated identity. Owner/admin checks happen per
/// handler via the guards module.
pub mod authenticated;

/// Routes restricted to admin users: account listing and tag moderation.
pub mod admin;
