//! Grouping: collapsing a subgraph into a single node with a live boundary.

pub mod dispatch;
pub mod editor;
pub mod node;

pub use dispatch::GroupDispatcher;
pub use editor::GroupEditor;
pub use node::GroupNode;
