pub mod compiler;
pub mod predicate;
