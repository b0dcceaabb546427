//! Process-wide state shared by the commands and the actor system.

mod state;

pub use state::{
    is_serving, is_shutdown, register_shutdown, set_serving, setup_shutdown_handler,
};
