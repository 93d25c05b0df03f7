//! Arena-backed red-black tree for ordered key storage.
//!
//! [`RbTree`] keeps keys sorted with logarithmic insert, erase and lookup.
//! Nodes are addressed through [`NodeRef`] handles, which the tree checks on
//! use, so a handle from another tree or to an erased node yields an error
//! instead of undefined behavior.
//!
//! ```
//! use rbindex::RbTree;
//!
//! let mut tree = RbTree::new();
//! for key in [5, 1, 4, 2, 3] {
//!     tree.insert(key)?;
//! }
//! assert_eq!(tree.to_array(3), vec![1, 2, 3]);
//!
//! let four = tree.find(&4).expect("present");
//! assert_eq!(tree.erase(four)?, 4);
//! assert!(tree.find(&4).is_none());
//! # Ok::<(), rbindex::TreeError>(())
//! ```

pub mod config;
pub mod domain;
pub mod util;

pub use config::TreeConfig;
pub use domain::{Color, NodeRef, RbTree, TreeError, TreeRender, TreeResult};
