//! # kilo-editor — Editor core for kilo
//!
//! The device-independent half of the editor:
//!
//! - **[`cursor`]** — bounded cursor position with edge-wrap movement
//! - **[`screen`]** — stateless full-frame composition into a render buffer
//!
//! Future modules will add the text buffer, file I/O, and the view layer
//! once the editor grows past empty-row rendering.

pub mod cursor;
pub mod screen;
