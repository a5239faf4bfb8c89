use crate::errors::SignatureError;

/// Reads the ordered parameter names out of a signature
///
/// Accepts closure heads (`|meat: String, egg|`), parenthesized lists
/// (`(meat, egg)`, `fn breakfast(meat, egg)`), a single arrow parameter
/// (`meat => ...`) and bare lists (`meat, egg`). Comments, types, default
/// values and `mut` are dropped.
pub fn parse_parameter_names(signature: &str) -> Result<Vec<String>, SignatureError> {
    let source = strip_comments(signature)?;
    let list = parameter_list(source.trim())?;

    split_top_level(list)
        .into_iter()
        .map(str::trim)
        .filter(|param| !param.is_empty())
        .map(parameter_name)
        .collect()
}

fn strip_comments(source: &str) -> Result<String, SignatureError> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = rest.find('/') {
        let (before, comment) = rest.split_at(start);
        if let Some(line) = comment.strip_prefix("//") {
            out.push_str(before);
            rest = line.find('\n').map_or("", |end| &line[end..]);
        } else if let Some(block) = comment.strip_prefix("/*") {
            out.push_str(before);
            out.push(' ');
            let end = block.find("*/").ok_or(SignatureError::Unterminated('/'))?;
            rest = &block[end + 2..];
        } else {
            out.push_str(before);
            out.push('/');
            rest = &comment[1..];
        }
    }
    out.push_str(rest);

    Ok(out)
}

fn parameter_list(source: &str) -> Result<&str, SignatureError> {
    let source = source.strip_prefix("async ").map_or(source, str::trim_start);
    let source = source.strip_prefix("move ").map_or(source, str::trim_start);

    if let Some(closure) = source.strip_prefix('|') {
        let end = closure.find('|').ok_or(SignatureError::Unterminated('|'))?;
        return Ok(&closure[..end]);
    }

    if source.starts_with('(') || source.starts_with("fn ") {
        let start = source.find('(').ok_or(SignatureError::Unterminated('('))?;
        let end = matching_paren(&source[start..]).ok_or(SignatureError::Unterminated('('))?;
        return Ok(&source[start + 1..start + end]);
    }

    if let Some((param, _)) = source.split_once("=>") {
        return Ok(param);
    }

    Ok(source)
}

/// Byte offset of the parenthesis closing the one `source` starts with
fn matching_paren(source: &str) -> Option<usize> {
    let mut depth = 0_usize;
    for (offset, c) in source.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits on commas which are not nested in a type or a default value
fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut start = 0;

    for (offset, c) in list.char_indices() {
        match c {
            '(' | '[' | '{' | '<' => depth += 1,
            ')' | ']' | '}' | '>' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&list[start..offset]);
                start = offset + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);

    parts
}

fn parameter_name(param: &str) -> Result<String, SignatureError> {
    let name = param.strip_prefix("mut ").unwrap_or(param);
    let name = name
        .split([':', '='])
        .next()
        .unwrap_or_default()
        .trim();

    if !is_identifier(name) {
        return Err(SignatureError::InvalidParameter(param.to_string()));
    }

    Ok(name.to_string())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(signature: &str) -> Vec<String> {
        parse_parameter_names(signature).unwrap()
    }

    #[test]
    fn reads_bare_lists() {
        assert_eq!(names("meat, egg, juice"), ["meat", "egg", "juice"]);
        assert_eq!(names("meat"), ["meat"]);
        assert!(names("").is_empty());
        assert!(names("  ").is_empty());
    }

    #[test]
    fn reads_closure_heads() {
        assert_eq!(names("|meat: String, egg| meat"), ["meat", "egg"]);
        assert_eq!(names("move |mut meat, egg: u8|"), ["meat", "egg"]);
        assert!(names("|| 42").is_empty());
    }

    #[test]
    fn reads_parenthesized_lists() {
        assert_eq!(names("(meat, egg)"), ["meat", "egg"]);
        assert_eq!(
            names("fn breakfast(meat: HashMap<String, u8>, egg: (u8, u8)) -> u8"),
            ["meat", "egg"]
        );
        assert_eq!(names("async fn juice(fruit = 'orange', $)"), ["fruit", "$"]);
    }

    #[test]
    fn reads_arrow_parameters() {
        assert_eq!(names("meat => meat.len()"), ["meat"]);
        assert_eq!(names("(meat, egg) => meat"), ["meat", "egg"]);
    }

    #[test]
    fn drops_comments() {
        assert_eq!(
            names("(meat /* ham */, // the egg\n egg)"),
            ["meat", "egg"]
        );
        assert_eq!(names("meat, egg // juice"), ["meat", "egg"]);
    }

    #[test]
    fn rejects_malformed_signatures() {
        assert_eq!(
            parse_parameter_names("|meat, egg"),
            Err(SignatureError::Unterminated('|'))
        );
        assert_eq!(
            parse_parameter_names("fn breakfast(meat"),
            Err(SignatureError::Unterminated('('))
        );
        assert_eq!(
            parse_parameter_names("meat /* egg"),
            Err(SignatureError::Unterminated('/'))
        );
        assert_eq!(
            parse_parameter_names("meat, 2egg"),
            Err(SignatureError::InvalidParameter("2egg".into()))
        );
        assert_eq!(
            parse_parameter_names("&self"),
            Err(SignatureError::InvalidParameter("&self".into()))
        );
    }
}
