//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Parse collected header lines into HeadResult.
///
/// curl reports the headers of every response in a redirect chain; each
/// status line starts over so only the final response is kept. Status and
/// effective URL are filled in by the caller from the handle.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut result = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            result = HeadResult::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    result.content_length = Some(n);
                }
            }
            if name.eq_ignore_ascii_case("content-type") {
                result.content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-disposition") {
                result.content_disposition = Some(value.to_string());
            }
        }
    }

    result
}

/// Status code of an `HTTP/1.1 206 Partial Content` line.
pub(crate) fn status_code(line: &str) -> Option<u32> {
    let line = line.trim();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
