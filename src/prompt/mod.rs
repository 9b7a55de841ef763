pub mod constructor;
pub mod extract;
