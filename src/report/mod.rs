//! Reports over every certificate of the portal.
//!
//! Filtering, aggregation and pagination live in
//! [`certportal_shared::report`], this module only serves them.

pub mod handle;
