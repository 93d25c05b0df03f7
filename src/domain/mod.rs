//! Tree engine: arena storage, balancing and queries.
//!
//! No I/O lives here; configuration arrives as a ready [`TreeConfig`](crate::TreeConfig).

pub mod error;
pub mod node;
pub mod render;
pub mod tree;
pub mod validate;
mod walk;

pub use error::{TreeError, TreeResult};
pub use node::{Color, NodeRef};
pub use render::TreeRender;
pub use tree::RbTree;
