use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TEMPLATE_TOKEN_RE: Regex = Regex::new(r":([A-Za-z0-9_]+)|\*([A-Za-z0-9_]*)").unwrap();
}

/// Which part of a URL a template is compiled for. It decides what a `:param` may span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplateKind {
    Path,
    Hostname,
}

impl TemplateKind {
    fn param_class(self) -> &'static str {
        match self {
            TemplateKind::Path => "([^/]+)",
            TemplateKind::Hostname => "([^.]+)",
        }
    }
}

/// Compiles a route template into an anchored regex and the ordered list of its parameter
/// names, one name per capture group.
///
/// `:name` captures one path segment (or hostname label), `*name` captures the rest including
/// slashes, and a bare `*` is named after its position among the unnamed wildcards (`"0"`, `"1"`).
pub(crate) fn generate_exact_match_regex(template: &str, kind: TemplateKind) -> Result<(Regex, Vec<String>), regex::Error> {
    let mut pattern = String::with_capacity(template.len() * 2 + 2);
    let mut params = Vec::new();
    let mut unnamed = 0_usize;
    let mut last = 0_usize;

    pattern.push('^');

    for caps in TEMPLATE_TOKEN_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        pattern.push_str(&regex::escape(&template[last..whole.start()]));

        if let Some(name) = caps.get(1) {
            pattern.push_str(kind.param_class());
            params.push(name.as_str().to_owned());
        } else {
            pattern.push_str("(.*)");
            match caps.get(2).map(|m| m.as_str()) {
                Some(name) if !name.is_empty() => params.push(name.to_owned()),
                _ => {
                    params.push(unnamed.to_string());
                    unnamed += 1;
                }
            }
        }

        last = whole.end();
    }

    pattern.push_str(&regex::escape(&template[last..]));
    pattern.push('$');

    Ok((Regex::new(&pattern)?, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_path() {
        let (re, params) = generate_exact_match_regex("/users.json", TemplateKind::Path).unwrap();
        assert!(re.is_match("/users.json"));
        assert!(!re.is_match("/usersXjson"));
        assert!(!re.is_match("/users.json/"));
        assert!(params.is_empty());
    }

    #[test]
    fn segment_params() {
        let (re, params) = generate_exact_match_regex("/users/:userId/books/:bookId", TemplateKind::Path).unwrap();
        let caps = re.captures("/users/alice/books/42").unwrap();
        assert_eq!(&caps[1], "alice");
        assert_eq!(&caps[2], "42");
        assert_eq!(params, vec!["userId", "bookId"]);
        assert!(!re.is_match("/users/alice/extra/books/42"));
    }

    #[test]
    fn wildcards() {
        let (re, params) = generate_exact_match_regex("/files/*path", TemplateKind::Path).unwrap();
        assert_eq!(&re.captures("/files/a/b/c.txt").unwrap()[1], "a/b/c.txt");
        assert!(re.is_match("/files/"));
        assert_eq!(params, vec!["path"]);

        let (_, params) = generate_exact_match_regex("/*/x/*", TemplateKind::Path).unwrap();
        assert_eq!(params, vec!["0", "1"]);
    }

    #[test]
    fn hostname_params_span_one_label() {
        let (re, params) = generate_exact_match_regex(":tenant.example.com", TemplateKind::Hostname).unwrap();
        assert_eq!(&re.captures("acme.example.com").unwrap()[1], "acme");
        assert!(!re.is_match("a.b.example.com"));
        assert_eq!(params, vec!["tenant"]);
    }
}
