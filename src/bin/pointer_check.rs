use hand_pointer::pointer::{EnigoPointer, PointerSink};

fn main() {
    println!("Testing pointer access...\n");

    match EnigoPointer::new() {
        Ok(mut pointer) => {
            println!("✓ Pointer backend connected");

            match pointer.screen_size() {
                Ok((w, h)) => {
                    println!("✓ Screen size {}x{}", w, h);
                    match pointer.set_cursor_position(w as i32 / 2, h as i32 / 2) {
                        Ok(_) => {
                            println!("✓ Cursor moved to screen center - POINTER ACCESS WORKING!")
                        }
                        Err(e) => println!("✗ Failed to move cursor: {}", e),
                    }
                }
                Err(e) => println!("✗ Failed to query screen size: {}", e),
            }
        }
        Err(e) => {
            println!("✗ Failed to open pointer backend: {}", e);
            println!("\nPossible causes:");
            println!("1. No display server is running");
            println!("2. Accessibility permissions not granted");
            println!("3. Running under Wayland without X11 support");
        }
    }
}
