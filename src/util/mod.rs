mod bounded;

pub use bounded::{read_max, Bounded, ReadMaxError};
