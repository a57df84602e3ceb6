//! Cache module for storing JSON objects on disk
//!
//! Each object lives in its own file, named after the identifier it was saved
//! under, inside one flat cache directory. Freshness is judged from the file's
//! modification time, so there is no metadata envelope around the stored JSON.

mod manager;
mod object;

pub use manager::{CacheError, FileCache};
pub use object::{JsonOriginatedObject, JsonSource};
