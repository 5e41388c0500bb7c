//! Core types shared by the Stellar rendering and build layers.
//!
//! This crate provides the fundamental types:
//! - `RuntimeMode` - Development vs. production behavior switch
//! - `RouteData` / `RouteMatch` - Route definitions and match results
//! - `RequestContext` - Per-request data handed to the render pipeline
//! - `RendererDescriptor` / `MarkdownOptions` - Opaque render configuration
//! - Middleware virtual module identifiers

mod context;
mod middleware;
mod mode;
mod render;
mod route;

pub use context::*;
pub use middleware::*;
pub use mode::*;
pub use render::*;
pub use route::*;
