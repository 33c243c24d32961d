//! The viewport-sized background field over a starfield.

use plexus::Plexus;

fn main() {
    Plexus::new()
        .with_title("plexus - background field")
        .with_starfield()
        .with_background_field()
        .run()
        .expect("failed to run");
}
