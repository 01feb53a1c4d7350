mod concurrent;
mod encoder;
mod interface;
mod mutex;
mod sequential;

pub use concurrent::*;
pub(crate) use encoder::*;
pub use interface::*;
pub(crate) use mutex::*;
pub use sequential::*;
