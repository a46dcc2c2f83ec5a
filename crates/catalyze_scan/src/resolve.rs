//! Resolving quoted include text against the including file's path.

/// Resolves the quoted include `text` found in `file` to a tracked path.
///
/// - A `file` without `/` lives in the working directory, so `text` is used
///   as is.
/// - Otherwise `text` is joined to `file`'s directory, after each leading
///   `../` has removed one trailing component from that directory. Once the
///   directory is used up, any remaining `../` stay in the result; for an
///   absolute `file` they are dropped at `/`.
///
/// Only leading `../` segments are folded; `./` and interior `..` are kept
/// verbatim.
pub fn resolve_include(file: &str, text: &str) -> String {
    let Some(slash) = file.rfind('/') else {
        return text.to_string();
    };
    if !text.starts_with("../") {
        return format!("{}{}", &file[..=slash], text);
    }

    let rooted = file.starts_with('/');
    let mut dir = &file[..slash];
    let mut rest = text;
    while let Some(stripped) = rest.strip_prefix("../") {
        if dir.is_empty() && !rooted {
            break;
        }
        // `/..` is `/`.
        dir = match dir.rfind('/') {
            Some(pos) => &dir[..pos],
            None => "",
        };
        rest = stripped;
    }

    match (dir.is_empty(), rooted) {
        (false, _) => format!("{dir}/{rest}"),
        (true, true) => format!("/{rest}"),
        (true, false) => rest.to_string(),
    }
}
