//! `key=value` argument lists for `@Repeat` and embeds

/// Split `key=value, key2=value2` into trimmed pairs
///
/// Commas and `=` inside quotes or brackets do not split. Comparison
/// operators (`==`, `!=`, `<=`, `>=`) are never taken as the binding `=`.
pub(crate) fn parse_bindings(argument: &str) -> Result<Vec<(String, String)>, String> {
    if argument.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut bindings: Vec<(String, String)> = Vec::new();
    for part in split_top_level(argument, b',') {
        let part = part.trim();
        if part.is_empty() {
            return Err("empty entry in argument list".to_string());
        }

        let eq = binding_eq(part).ok_or_else(|| format!("expected key=value, found '{}'", part))?;
        let key = part[..eq].trim();
        let value = part[eq + 1..].trim();

        if !is_identifier(key) {
            return Err(format!("'{}' is not a valid name", key));
        }
        if value.is_empty() {
            return Err(format!("'{}' has no value", key));
        }
        if bindings.iter().any(|(existing, _)| existing == key) {
            return Err(format!("'{}' is given more than once", key));
        }
        bindings.push((key.to_string(), value.to_string()));
    }
    Ok(bindings)
}

/// Strip one pair of matching quotes, if present
pub(crate) fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&first), Some(&last))
            if value.len() >= 2 && first == last && (first == b'\'' || first == b'"') =>
        {
            &value[1..value.len() - 1]
        }
        _ => value,
    }
}

pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn split_top_level(text: &str, separator: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;

    for (pos, &byte) in text.as_bytes().iter().enumerate() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == q {
                quote = None;
            }
            continue;
        }
        match byte {
            b'\'' | b'"' => quote = Some(byte),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b if b == separator && depth == 0 => {
                parts.push(&text[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Offset of the `=` separating key from value
fn binding_eq(part: &str) -> Option<usize> {
    let bytes = part.as_bytes();
    split_top_level(part, b'=')
        .first()
        .map(|key| key.len())
        .filter(|&eq| eq < bytes.len())
        .filter(|&eq| {
            let before = eq.checked_sub(1).map(|i| bytes[i]);
            let after = bytes.get(eq + 1).copied();
            !matches!(before, Some(b'!' | b'<' | b'>' | b'=')) && after != Some(b'=')
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_bindings() {
        assert_eq!(
            parse_bindings("items=people, var='p', sep=','").unwrap(),
            pairs(&[("items", "people"), ("var", "'p'"), ("sep", "','")])
        );
    }

    #[test]
    fn test_parse_bindings_keeps_expressions_whole() {
        assert_eq!(
            parse_bindings("label = name + ', ' + id, big=count >= 3, f=tags.contains('a,b')")
                .unwrap(),
            pairs(&[
                ("label", "name + ', ' + id"),
                ("big", "count >= 3"),
                ("f", "tags.contains('a,b')"),
            ])
        );
    }

    #[test]
    fn test_parse_bindings_empty() {
        assert_eq!(parse_bindings("").unwrap(), vec![]);
        assert_eq!(parse_bindings("   ").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_bindings_errors() {
        assert!(parse_bindings("items").is_err());
        assert!(parse_bindings("a == b").is_err());
        assert!(parse_bindings("a=1,,b=2").is_err());
        assert!(parse_bindings("1x=2").is_err());
        assert!(parse_bindings("a=").is_err());
        assert!(parse_bindings("a=1, a=2").is_err());
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'p'"), "p");
        assert_eq!(unquote("\",\""), ",");
        assert_eq!(unquote("bare"), "bare");
        assert_eq!(unquote("'"), "'");
        assert_eq!(unquote("'mixed\""), "'mixed\"");
    }
}
