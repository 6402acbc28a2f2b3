pub mod primitive_processor;
