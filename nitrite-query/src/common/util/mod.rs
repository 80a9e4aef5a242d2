mod date_utils;
mod text_utils;
mod type_utils;
mod value_utils;

pub use date_utils::*;
pub use text_utils::*;
pub use type_utils::*;
pub use value_utils::*;
