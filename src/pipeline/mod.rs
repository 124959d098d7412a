//! Pipeline stages for document recognition.
//!
//! Each submodule implements one transformation step, and data flows one way
//! through them:
//!
//! ```text
//! input ──▶ load ──▶ encode ──▶ ocr ──▶ interpret
//! (bytes)   (pages)  (base64)   (HTTP)  (mode-specific result)
//!            │
//!            ├─ render  PDF via pdfium (spawn_blocking)
//!            └─ docx    embedded images via the package's relationships
//! ```
//!
//! 1. [`input`]     — detect the format from the declared filename
//! 2. [`load`]      — turn a document into opaque RGB pages; [`render`] and
//!    [`docx`] do the format-specific work
//! 3. [`encode`]    — PNG-encode a page as a `data:` URI
//! 4. [`ocr`]       — the recognizer seam; the only stage with network I/O
//! 5. [`interpret`] — pure heuristics over the returned text, using the
//!    shared [`table`] model

pub mod docx;
pub mod encode;
pub mod input;
pub mod interpret;
pub mod load;
pub mod ocr;
pub mod render;
pub mod table;
