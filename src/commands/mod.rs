mod config_cmd;
mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use sync_cmd::SyncCommand;
