mod macros;

pub use macros::*;

use std::path::Path;
use std::time::UNIX_EPOCH;

use memchr::memmem;

/// Removes every `<!-- ... -->` comment from `input`. An unterminated comment
/// runs to the end of the input.
///
/// ```rust
/// use atrium::util::strip_html_comments;
///
/// let svg = "<svg><!-- generated --><symbol id=\"a\"/><!--\nmulti\n--></svg>";
/// assert_eq!(strip_html_comments(svg), "<svg><symbol id=\"a\"/></svg>");
/// assert_eq!(strip_html_comments("a<!-- open"), "a");
/// assert_eq!(strip_html_comments("no comments"), "no comments");
/// ```
pub fn strip_html_comments(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = memmem::find(rest.as_bytes(), b"<!--") {
        output.push_str(&rest[..start]);
        let comment = &rest[start + 4..];
        match memmem::find(comment.as_bytes(), b"-->") {
            Some(end) => rest = &comment[end + 3..],
            None => return output,
        }
    }

    output.push_str(rest);
    output
}

/// The last modification time of the file at `path` in seconds since the
/// Unix epoch.
pub fn modified_secs<P: AsRef<Path>>(path: P) -> Option<u64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(modified.duration_since(UNIX_EPOCH).ok()?.as_secs())
}

/// Guesses the MIME type of `path`, preferring the file's leading bytes when
/// it can be read and falling back to its extension.
///
/// ```rust
/// use atrium::util::mime_type;
///
/// assert_eq!(mime_type("assets/favicon.svg"), Some("image/svg+xml"));
/// assert_eq!(mime_type("/icons/apple.PNG"), Some("image/png"));
/// assert_eq!(mime_type("favicon.ico"), Some("image/x-icon"));
/// assert_eq!(mime_type("README"), None);
/// ```
pub fn mime_type<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    let path = path.as_ref();
    sniff_mime_type(path).or_else(|| extension_mime_type(path))
}

fn sniff_mime_type(path: &Path) -> Option<&'static str> {
    use std::io::Read;

    const MAGIC: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\x00\x00\x01\x00", "image/x-icon"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"\xff\xd8\xff", "image/jpeg"),
    ];

    let mut head = [0u8; 8];
    let mut file = std::fs::File::open(path).ok()?;
    let n = file.read(&mut head).ok()?;
    MAGIC.iter()
        .find(|(magic, _)| head[..n].starts_with(magic))
        .map(|(_, mime)| *mime)
}

fn extension_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match &*ext {
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "ico" => "image/x-icon",
        "gif" => "image/gif",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "css" => "text/css",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        _ => return None,
    };

    Some(mime)
}
