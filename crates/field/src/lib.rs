#![forbid(unsafe_code)]
//! field: the pure math behind the wellfield visualization.
//!
//! Two leaf functions make up the whole model:
//!
//! ```text
//!   NDC (px, py) ──▶ FieldParams::field_coords ──▶ evaluate_field(x, y, t) ──▶ z
//!                                                                           │
//!   display RGBA ◀── Rgba::amplified(gain) ◀── colorize(v) ◀── normalize(z) ┘
//! ```
//!
//! Everything here is stateless and safe to call from any number of threads.
//! Hosts (the CPU rasterizer and the GPU fragment shader in `renderer`) feed
//! a pixel coordinate and a time sample in and get a color back.
pub mod color;
pub mod error;
pub mod evaluator;
pub mod params;

pub use color::{colorize, rgb8, Palette, Rgba};
pub use error::FieldError;
pub use evaluator::evaluate_field;
pub use params::{ndc_from_pixel, FieldParams};
