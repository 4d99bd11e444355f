mod runner;
mod shutdown;

pub use runner::{assemble_router, run, RunOptions, ShutdownOptions};
pub use shutdown::wait_for_shutdown;
