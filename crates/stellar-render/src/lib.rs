//! Server-side render bootstrap for Stellar.
//!
//! This crate provides:
//! - `Environment` - Static render configuration shared by every request
//! - `create_environment` / `create_basic_environment` - Strict and defaulting constructors
//! - `resolve_route` - Route resolution through the environment's route cache
//! - `MiddlewareModule` - The project's optional `onRequest` handler
//! - `RenderPipeline` - Ties the above together per request
//!
//! The environment is built once at startup and handed to each request as
//! an `Arc<Environment>`; there is no global state.

mod directives;
mod environment;
mod error;
mod middleware;
mod pipeline;
mod resolve;
mod routing;

pub use directives::*;
pub use environment::*;
pub use error::*;
pub use middleware::*;
pub use pipeline::*;
pub use resolve::*;
pub use routing::*;
