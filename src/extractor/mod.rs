//! Annotation extraction: source file -> scope tree -> line type table.

pub mod extractor;
