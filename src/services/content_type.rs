use mime_guess::mime::Mime;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Pick the media type to store a file with.
///
/// A declared type wins when it parses and says more than
/// `application/octet-stream`; otherwise the type is guessed from the file
/// name.
pub fn detect_content_type(filename: &str, declared: Option<&str>) -> String {
    let declared = declared
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .filter(|ct| {
            ct.parse::<Mime>()
                .is_ok_and(|m| m.essence_str() != OCTET_STREAM)
        });

    match declared {
        Some(ct) => ct.to_string(),
        None => mime_guess::from_path(filename)
            .first_or_octet_stream()
            .to_string(),
    }
}
