//! Content-Disposition filename extraction.

/// Extracts the filename from a raw Content-Disposition header value.
///
/// Permissive on purpose: takes whatever follows the first `filename=`, with
/// an optional opening quote, up to the next `"`, `;` or newline, trimmed.
/// Only when no plain `filename=` exists is an RFC 5987
/// `filename*=UTF-8''percent-encoded` value decoded instead.
pub fn filename_from_content_disposition(header_value: &str) -> Option<String> {
    plain_filename(header_value).or_else(|| extended_filename(header_value))
}

fn plain_filename(value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    let pos = lower.find("filename=")?;
    let rest = value[pos + "filename=".len()..].trim_start_matches('"');
    let end = rest.find(['"', ';', '\n']).unwrap_or(rest.len());
    let name = rest[..end].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn extended_filename(value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    let pos = lower.find("filename*=")?;
    let rest = value[pos + "filename*=".len()..].trim();
    let rest = rest.split(';').next()?.trim().trim_matches('"');
    let (charset, encoded) = rest.split_once("''")?;
    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    let decoded = percent_decode(encoded);
    let decoded = decoded.trim();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded.to_string())
    }
}

/// Simple percent-decode for the RFC 5987 value; malformed escapes pass through.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).copied().and_then(hex_digit);
            let lo = bytes.get(i + 2).copied().and_then(hex_digit);
            if let (Some(h), Some(l)) = (hi, lo) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
