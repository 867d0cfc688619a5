//! st-layout: indexed view over the servo block tree.
//!
//! A [`BlockLayout`] owns one [`ServoLoop`](st_blocks::ServoLoop) and, from a
//! single traversal at construction, derives:
//! - loop-by-kind and block-by-kind indices (child-slot paths into the tree),
//! - a nested name tree for display.
//!
//! # Example
//!
//! ```
//! use st_blocks::{BlockKind, LoopKind, NodeKind};
//! use st_layout::BlockLayout;
//!
//! let layout = BlockLayout::default();
//! assert_eq!(layout.find_block(BlockKind::MotorPlant).name(), "Motor Plant");
//! assert!(layout.is_descendant(LoopKind::ServoPlant, NodeKind::Block(BlockKind::MotorPlant)));
//! assert_eq!(layout.flatten_blocks().len(), 7);
//! ```

pub mod error;
pub mod layout;
pub mod path;
pub mod tree;

pub use error::{LayoutError, LayoutResult};
pub use layout::BlockLayout;
pub use path::NodePath;
pub use tree::LayoutTree;
