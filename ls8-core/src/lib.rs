pub mod decoder;
pub mod loader;
pub mod memory;
pub mod opcode;
pub mod sink;

pub use crate::decoder::{DecodeError, DecodeOne, Instruction};
pub use crate::loader::{parse_image, LoadError, ProgramLoader, TextImageLoader};
pub use crate::memory::{Memory, MemoryError};
pub use crate::opcode::Opcode8;
pub use crate::sink::{BufferSink, Output, OutputSink, StdoutSink};
