mod bounded;
mod types;

pub use bounded::collect_bounded;
pub use types::{Binder, Command, Mapper, Operation, QueryOperation, UpdateOperation};
