pub mod field;
pub mod form;
pub mod value;

pub use field::*;
pub use form::*;
pub use value::*;
