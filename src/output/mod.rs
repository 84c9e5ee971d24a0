//! Output Module
//!
//! Where generated artifacts go and how they are serialized:
//! - Path layout and directory creation
//! - PNG graph rendering
//! - Raw `.npy` arrays

pub mod graph;
pub mod npy;
pub mod paths;

pub use graph::{render_graph, write_graph};
pub use npy::{read_npy, write_npy};
pub use paths::{category_of, ensure_dir, output_stem, OutputLayout};
