//! Textual gate shim.
//!
//! Rewrites convenience gates that are outside the qelib1 surface into
//! supported primitives before the source ever reaches the lexer. The only
//! expansion today is the controlled-Y-rotation:
//!
//! ```text
//! cry(θ) a, b;   →   ry((θ)/2) b; cx a, b; ry(-((θ)/2)) b; cx a, b;
//! ```
//!
//! The pass is purely textual and idempotent (its output contains no `cry`
//! calls). Newlines swallowed by an expansion are re-emitted so line numbers
//! in later parse errors still refer to the original source.

/// Expand convenience gates into supported primitives.
pub fn expand_convenience_gates(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let bytes = source.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        // Copy line comments verbatim so a `cry` inside one is untouched.
        if bytes[i] == b'/' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
            let end = source[i..]
                .find('\n')
                .map_or(source.len(), |offset| i + offset);
            out.push_str(&source[i..end]);
            i = end;
            continue;
        }

        if source[i..].starts_with("cry")
            && !prev_is_ident_char(bytes, i)
            && !next_is_ident_char(bytes, i + 3)
        {
            if let Some((expansion, consumed)) = rewrite_cry(&source[i..]) {
                out.push_str(&expansion);
                // Keep the line count stable.
                for _ in source[i..i + consumed].matches('\n') {
                    out.push('\n');
                }
                i += consumed;
                continue;
            }
        }

        let ch = source[i..].chars().next().expect("in-bounds char");
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

fn prev_is_ident_char(bytes: &[u8], i: usize) -> bool {
    i > 0 && is_ident_char(bytes[i - 1])
}

fn next_is_ident_char(bytes: &[u8], i: usize) -> bool {
    i < bytes.len() && is_ident_char(bytes[i])
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Rewrite one `cry(θ) a, b;` statement starting at the `cry` token.
///
/// Returns the replacement text and the number of source bytes consumed, or
/// `None` if the statement is malformed (in which case it is left alone and
/// the parser reports the error).
fn rewrite_cry(rest: &str) -> Option<(String, usize)> {
    let after_name = &rest[3..];
    let open = after_name.find(|c: char| !c.is_whitespace())?;
    if after_name.as_bytes()[open] != b'(' {
        return None;
    }

    // Balanced-paren scan for the angle expression.
    let mut depth = 0usize;
    let mut close = None;
    for (offset, ch) in after_name[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + offset);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close?;
    // The angle may span lines; flatten it so the swallowed-newline
    // accounting below stays exact.
    let theta = after_name[open + 1..close].trim().replace('\n', " ");
    let theta = theta.as_str();

    let semicolon = after_name[close..].find(';')? + close;
    let operands: Vec<String> = after_name[close + 1..semicolon]
        .split(',')
        .map(|s| s.trim().replace('\n', " "))
        .collect();
    let [control, target] = operands.as_slice() else {
        return None;
    };
    if theta.is_empty() || control.is_empty() || target.is_empty() {
        return None;
    }

    let expansion = format!(
        "ry(({theta})/2) {target}; cx {control}, {target}; \
         ry(-(({theta})/2)) {target}; cx {control}, {target};"
    );
    Some((expansion, 3 + semicolon + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expands_cry() {
        let out = expand_convenience_gates("cry(pi/2) q[0], q[1];");
        assert_eq!(
            out,
            "ry((pi/2)/2) q[1]; cx q[0], q[1]; ry(-((pi/2)/2)) q[1]; cx q[0], q[1];"
        );
    }

    #[test]
    fn test_idempotent() {
        let once = expand_convenience_gates("h q[0]; cry(0.5) q[0], q[1]; x q[1];");
        let twice = expand_convenience_gates(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_leaves_comments_alone() {
        let source = "// cry(pi) q[0], q[1];\nh q[0];";
        assert_eq!(expand_convenience_gates(source), source);
    }

    #[test]
    fn test_ignores_identifier_prefixes() {
        // `crya` is some other (unknown) gate, not a cry call.
        let source = "crya(1.0) q[0], q[1];";
        assert_eq!(expand_convenience_gates(source), source);
    }

    #[test]
    fn test_preserves_line_count() {
        let source = "cry(pi\n/2) q[0],\nq[1];\nx q[0];";
        let out = expand_convenience_gates(source);
        assert_eq!(
            source.matches('\n').count(),
            out.matches('\n').count()
        );
    }

    #[test]
    fn test_malformed_cry_left_untouched() {
        let source = "cry q[0], q[1];";
        assert_eq!(expand_convenience_gates(source), source);
    }
}
