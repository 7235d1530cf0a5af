pub mod asm;
pub mod codec;
pub mod disasm;
pub mod pipeline;
pub mod reference;
pub mod resolver;
pub mod stream;

pub use codec::{ExternalCodec, ScriptCodec};
pub use disasm::DisasmOptions;
pub use pipeline::{PackOptions, Pipeline, Report, UnpackOptions};
pub use reference::ReferenceTable;
pub use stream::{Record, Warning};
