mod traits;
mod value;

pub use traits::{ColumnIndex, Connection, ConnectionProvider, Cursor, Parameters, Row, Statement};
pub use value::{FromValue, Value};
