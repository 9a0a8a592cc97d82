//! Turning Relay connection arguments into a fetch window.

mod args;
mod window;

pub use self::args::{ArgumentNames, PaginationArgs};
pub use self::window::WindowResolver;
