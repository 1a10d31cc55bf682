mod base;
mod interface;
mod middleware;
mod printer;
mod session;

pub use middleware::ArgumentParser;
pub use session::{Outcome, ParseStatus, SessionView};

pub(crate) use base::{BoundArgument, Engine};
pub(crate) use interface::{ConsoleInterface, UserInterface};
pub(crate) use printer::Printer;
