//! Stacks: the two documents describing one, its on-disk layout, and the
//! operations run on a whole stack.

pub mod archive;
pub mod install;
pub mod layout;
pub mod load;
pub mod types;

pub use archive::{export, import};
pub use install::{InstallOptions, InstallReport, StackInstaller};
pub use layout::StackLayout;
pub use load::Stack;
pub use types::{Component, StackConfig, StackDefinition, StackType};
