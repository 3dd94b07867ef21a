#![forbid(unsafe_code)]

mod error;
mod map;
mod set;
mod value;
pub mod combinatorics;
pub mod interrupt;

pub use combinatorics::{DEFAULT_POWERSET_LIMIT, permutations, power_set, power_set_value};
pub use error::CombinatoricsError;
pub use interrupt::{InterruptCommand, InterruptEvent, InterruptHandle, InterruptLevel, Interrupter};
pub use map::ValueMap;
pub use set::ValueSet;
pub use value::{FunctionValue, RecordValue, Value};
