//! # Sumiji
//!
//! An interactive, incrementally-editable text rendering core for Rust.
//!
//! ## Overview
//!
//! `Sumiji` provides the two hard pieces of an interactive text stack: a
//! batched glyph-run renderer and a caret/selection controller.
//!
//! * [`GlyphRun`] packs a fixed sequence of shaped glyphs into a
//!   render-ready vertex buffer, batched per texture, with O(1) substring
//!   width queries and word-wrap break search over precomputed cumulative
//!   advances.
//! * [`TextBlock`] builds lazily-recomputed multi-line text on top of
//!   [`GlyphRun`]: line breaking (wrap or explicit newlines), alignment,
//!   and full redraw.
//! * [`Caret`] turns keyboard, mouse and timer events into document
//!   mutations and visual cursor/selection state on an incremental layout.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sumiji::{TextBlock, HorizontalAlign};
//!
//! // 1. Obtain a font collaborator (anything implementing GlyphProvider).
//! // let font: Arc<dyn GlyphProvider> = ...;
//!
//! // 2. Build a text block and configure layout.
//! // let mut block = TextBlock::new(font, "Hello, world!");
//! // block.set_width(Some(400.0));
//! // block.set_halign(HorizontalAlign::Center);
//!
//! // 3. Draw each frame through your DrawTarget implementation.
//! // block.draw(&mut target);
//! ```
//!
//! ## Design
//!
//! *   **Batched rendering**: blend and texture state change once per
//!     texture-run, never per glyph.
//! *   **Lazy re-layout**: mutating a [`TextBlock`] marks it stale; the
//!     next reader recomputes once.
//! *   **Single-threaded**: everything runs on the event-loop thread; the
//!     blink timer is a cooperative, injected [`Scheduler`] capability.
//!
//! Font loading, shaping and rasterization, the graphics context, and the
//! document/layout storage are external collaborators reached through the
//! traits in [`glyph`], [`run`] and [`editable`].

pub mod block;
pub mod caret;
pub mod editable;
pub mod glyph;
pub mod run;

// common re-exports
pub use block::{HorizontalAlign, TextBlock, VerticalAlign};
pub use caret::{
    Caret, TextMotion,
    blink::{FrameScheduler, Scheduler, TimerToken},
};
pub use editable::{CaretBar, EditableDocument, EditableLayout, StyleAttrs, StyleValue};
pub use glyph::{Glyph, GlyphProvider, GlyphTexture, TextureId};
pub use run::{DrawTarget, GlyphRun, GlyphVertex, TextureRun};

// re-export dependencies
pub use bytemuck;
pub use euclid;
