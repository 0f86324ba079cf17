//! Gallery listing for the terminal.
//!
//! The listing is fully rebuilt from the current sequence after every
//! mutation, so the positional indices shown always match what
//! `delete_at` will act on. Pure string formatting, no terminal state.

use crate::gallery::Gallery;

/// Format bytes as a human-readable size (B, KB, MB).
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Rebuild the full gallery listing from the current sequence.
pub fn gallery_listing(gallery: &Gallery) -> String {
    if gallery.is_empty() {
        return "Gallery: empty (capture a photo to enable sending)".to_string();
    }

    let mut out = format!(
        "Gallery: {}/{} photo(s){}\n",
        gallery.len(),
        gallery.capacity(),
        if gallery.is_full() { " - full" } else { "" }
    );

    for (index, image) in gallery.images().iter().enumerate() {
        out.push_str(&format!(
            "  [{}] {}x{} jpeg, {}\n",
            index,
            image.width(),
            image.height(),
            format_size(image.encoded_len())
        ));
    }

    out.push_str("Commands: snap | del <index> | send [user] | quit");
    out
}
