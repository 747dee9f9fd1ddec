use crate::plan::SubstitutionTable;

/// Applies `substitutions` to every line of `source`, then strips trailing
/// `//` comments. `\n`, `\r\n` and a lone `\r` all end a line; endings are
/// preserved as written.
pub fn prepare_text(source: &str, substitutions: &SubstitutionTable) -> String {
    let mut prepared = String::with_capacity(source.len());
    let mut rest = source;

    while !rest.is_empty() {
        let (body, ending, tail) = next_line(rest);
        let substituted = substitutions.apply(body);
        prepared.push_str(strip_line_comment(&substituted));
        prepared.push_str(ending);
        rest = tail;
    }

    prepared
}

/// Cuts the line at the first `//` not immediately preceded by `:`.
///
/// Only the `://` case is protected, so `//` inside a string literal that is
/// not part of a URL scheme is still treated as a comment.
pub fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for index in memchr::memchr_iter(b'/', bytes) {
        let doubled = bytes.get(index + 1) == Some(&b'/');
        let after_colon = index > 0 && bytes[index - 1] == b':';
        if doubled && !after_colon {
            return &line[..index];
        }
    }
    line
}

/// Splits off the first line as `(body, ending, remainder)`.
fn next_line(text: &str) -> (&str, &str, &str) {
    let Some(index) = memchr::memchr2(b'\n', b'\r', text.as_bytes()) else {
        return (text, "", "");
    };
    let end = if text[index..].starts_with("\r\n") {
        index + 2
    } else {
        index + 1
    };
    (&text[..index], &text[index..end], &text[end..])
}
