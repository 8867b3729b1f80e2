//! AWS integration for awsnav: profile discovery, SSO session
//! management, client construction, and the per-service operations the
//! wizards and subcommands call.

pub mod apigateway;
pub mod catalog;
pub mod client;
pub mod cost;
pub mod ec2;
pub mod ecs;
mod error;
pub mod logs;
pub mod profiles;
pub mod s3;
pub mod session;

pub use client::{ContextCache, SessionContext};
pub use error::SessionError;
