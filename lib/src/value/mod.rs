mod value;
mod source;
mod sink;
mod format;

pub use value::*;
pub use source::*;
pub use sink::*;
pub use format::*;
