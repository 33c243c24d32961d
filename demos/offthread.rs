//! Background and logo fields simulated on worker threads; the event-loop
//! thread only forwards pointer updates and draws the latest frames.

use plexus::Plexus;

fn main() {
    Plexus::new()
        .with_title("plexus - off-thread fields")
        .with_background_field()
        .with_logo_field()
        .offthread()
        .run()
        .expect("failed to run");
}
