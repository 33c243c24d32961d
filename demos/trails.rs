//! Trail field: wrapping heads with fading polyline histories.

use plexus::{Plexus, Theme};

fn main() {
    Plexus::new()
        .with_title("plexus - trails")
        .with_theme(Theme::Dark)
        .with_trails()
        .run()
        .expect("failed to run");
}
