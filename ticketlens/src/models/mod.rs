mod search;

pub use search::*;
