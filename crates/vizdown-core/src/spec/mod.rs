//! Input data model: spec nodes and page specs.

pub mod node;
pub mod page;

pub use node::{Node, NodeKind, UNORDERED, sort_by_insertion, walk, walk_mut};
pub use page::{
    DataFormat, DataSource, Dataset, PageSpec, SidebarPosition, SidebarSpec,
    dataset_name_for_path,
};
