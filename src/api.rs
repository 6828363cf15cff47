// Facade for the public write API; delegates to submodules under src/api/

#[path = "api/writer.rs"]
mod writer;
#[path = "api/text.rs"]
mod text;
#[path = "api/scoped.rs"]
mod scoped;

pub use scoped::{
    atomic_write_bytes, atomic_write_text, atomic_write_with, open_atomic_text_writer,
    open_atomic_writer, with_atomic_text_writer, with_atomic_writer,
};
pub use text::AtomicTextWriter;
pub use writer::AtomicWriter;
