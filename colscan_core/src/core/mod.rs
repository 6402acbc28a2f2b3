pub mod block;
pub mod db_type;
pub mod error;
pub mod events;
pub mod filter;
pub mod processor;
pub mod protocol;
pub mod sentinel;
