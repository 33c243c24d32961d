//! # plexus
//!
//! Particle and trail field animations with grid-accelerated connection
//! lines, rendered with wgpu.
//!
//! A field is a bounded population of moving entities (bare particles or
//! multi-segment trails). Every frame the field integrates its entities,
//! discovers pairs closer than the connection distance through a uniform
//! spatial grid, and batches the connecting lines into opacity bins for
//! instanced drawing. Layers compose: a viewport-sized background field, a
//! dense logo field with pointer-driven 3D tilt and a restartable reveal
//! animation, trails, and a parallax starfield.
//!
//! ## Quick Start
//!
//! ```ignore
//! use plexus::Plexus;
//!
//! fn main() -> Result<(), plexus::RunError> {
//!     Plexus::new()
//!         .with_title("plexus")
//!         .with_background_field()
//!         .with_logo_field()
//!         .run()
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Fields
//!
//! [`Field`] owns particle state and produces a [`Frame`] of draw geometry
//! per tick; [`trail::TrailField`] is the trail-history variant. Both ramp
//! their population up linearly over the first seconds after a (re)start.
//! Presets in [`config`] reproduce the shipped tunings, keyed on viewport
//! width.
//!
//! ### Connection lines
//!
//! Pairs within the connection distance are found with a uniform grid whose
//! cell size equals that distance ([`spatial::CellGrid`]), so only the 3x3
//! cell neighborhood is scanned per entity. Lines are grouped into opacity
//! bins and each bin draws as one instanced batch.
//!
//! ### Off-thread simulation
//!
//! [`worker::FieldWorker`] moves a field onto its own thread. The handle
//! sends latest-value-wins updates (pointer, theme) and receives finished
//! frames; dropping it stops and joins the thread.
//!
//! ### Runtime keys
//!
//! `T` toggles light/dark theme in place (no simulation reset), `R`
//! restarts the fields with a fresh ramp-up, `Escape` quits.

pub mod app;
pub mod config;
pub mod error;
pub mod field;
pub mod gpu;
pub mod input;
pub mod particle;
pub mod reveal;
pub mod rotation;
pub mod spatial;
pub mod starfield;
pub mod time;
pub mod trail;
pub mod worker;

pub use app::Plexus;
pub use config::{FieldConfig, FieldMode, StarfieldConfig, Theme, TrailConfig};
pub use error::{ConfigError, GpuError, RunError, WorkerError};
pub use field::{Field, FieldPhase, Frame};
pub use rotation::RotationController;
pub use starfield::Starfield;
pub use trail::TrailField;
pub use worker::FieldWorker;
