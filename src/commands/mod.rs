mod check;
mod inspect;
mod run;
mod validate;

pub use check::check_command;
pub use inspect::inspect_command;
pub use run::{RunArgs, run_command};
pub use validate::validate_command;
