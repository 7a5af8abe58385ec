//! Shared Kernel - Domain-crossing minimal core
//!
//! The smallest common vocabulary shared by every crate in the workspace:
//! a unified error type, its HTTP-facing classification, and conversions
//! from the error types of the libraries we build on.
//!
//! **Design Principle**: only things that are "hard to change" and mean the
//! same thing in every domain belong here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
