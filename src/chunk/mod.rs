mod assembler;
mod classifier;

pub use assembler::ChunkAssembler;
pub use classifier::{RECAP_MARKER, classify};
