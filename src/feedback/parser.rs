// src/feedback/parser.rs — Parse model output into a suggestion list

/// Accepts a JSON array of strings anywhere in the text (fenced or not),
/// otherwise falls back to one suggestion per bullet or numbered line.
pub fn parse_suggestions(response: &str) -> Vec<String> {
    if let Some(list) = json_array(response) {
        return list;
    }

    response
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("```"))
        .map(strip_marker)
        .filter(|l| !l.is_empty() && !l.ends_with(':'))
        .map(String::from)
        .collect()
}

fn json_array(text: &str) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    let items: Vec<serde_json::Value> = serde_json::from_str(&text[start..=end]).ok()?;
    let list: Vec<String> = items
        .into_iter()
        .filter_map(|v| match v {
            serde_json::Value::String(s) => Some(s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect();
    Some(list)
}

fn strip_marker(line: &str) -> &str {
    let line = line
        .trim_start_matches(['-', '*', '•'])
        .trim_start();
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(r) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return r.trim().trim_matches('"');
        }
    }
    line.trim_matches('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_array() {
        let out = parse_suggestions(r#"["Add steel frame", "Add parking"]"#);
        assert_eq!(out, vec!["Add steel frame", "Add parking"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "Here you go:\n```json\n[\"Use aluminum\", \" \", 3]\n```";
        assert_eq!(parse_suggestions(text), vec!["Use aluminum"]);
    }

    #[test]
    fn test_parse_bullets() {
        let text = "Suggestions:\n- Add solar panels\n* Reduce stories\n2) Use concrete\n3. \"Add elevator\"";
        assert_eq!(
            parse_suggestions(text),
            vec![
                "Add solar panels",
                "Reduce stories",
                "Use concrete",
                "Add elevator"
            ]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_suggestions("   \n").is_empty());
    }
}
