//! Parallax starfield on its own. Move the pointer to shift the layers.

use plexus::Plexus;

fn main() {
    Plexus::new()
        .with_title("plexus - starfield")
        .with_starfield()
        .run()
        .expect("failed to run");
}
