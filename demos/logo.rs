//! The dense logo field: pointer tilt, reveal animation, 500 particles.
//!
//! Move the pointer to tilt the layer; press T to toggle the theme and
//! replay the reveal, R to restart the ramp-up.

use plexus::Plexus;

fn main() {
    Plexus::new()
        .with_title("plexus - logo field")
        .with_window_size(1000, 1100)
        .with_logo_field()
        .run()
        .expect("failed to run");
}
