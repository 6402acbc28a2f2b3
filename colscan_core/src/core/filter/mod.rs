pub mod compiler;
pub mod encoder;
pub mod kinds;
pub mod like;
pub mod logical;
pub mod operation;
pub mod scanner;
