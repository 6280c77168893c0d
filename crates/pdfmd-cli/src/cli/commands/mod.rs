mod batch;
mod config;
mod convert;
mod info;

pub use batch::run_batch;
pub use config::run_show_config;
pub use convert::run_convert;
pub use info::run_info;
