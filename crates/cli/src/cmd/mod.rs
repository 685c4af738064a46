mod export;
mod import;
mod info;
mod install;
mod modules;

pub use export::cmd_export;
pub use import::cmd_import;
pub use info::cmd_info;
pub use install::cmd_install;
pub use modules::cmd_modules;
