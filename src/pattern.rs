use regex::Regex;

use crate::commands::CommandError;

/// A compiled KEYS glob pattern.
///
/// Supports `*`, `?`, `[...]` classes (with `^` negation and `a-z` ranges) and
/// `\x` escapes. Every other character matches itself.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(glob: &str) -> Result<Self, CommandError> {
        let regex = Regex::new(&glob_to_regex(glob))
            .map_err(|e| CommandError::InvalidPattern(e.to_string()))?;

        Ok(Self(regex))
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.0.is_match(key)
    }
}

fn glob_to_regex(glob: &str) -> String {
    let chars: Vec<char> = glob.chars().collect();
    let mut regex = String::with_capacity(glob.len() + 8);
    regex.push_str("(?s)^");

    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '\\' if i + 1 < chars.len() => {
                i += 1;
                regex.push_str(&regex::escape(&chars[i].to_string()));
            }
            '[' => match parse_class(&chars, i + 1) {
                Some((class, end)) => {
                    regex.push_str(&class);
                    i = end;
                }
                // Unterminated class, treat the bracket literally.
                None => regex.push_str(r"\["),
            },
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
        i += 1;
    }

    regex.push('$');
    regex
}

/// Translates a `[...]` class starting right after the opening bracket.
/// Returns the regex class and the index of the closing bracket.
fn parse_class(chars: &[char], start: usize) -> Option<(String, usize)> {
    let mut i = start;
    let mut negated = false;

    if chars.get(i) == Some(&'^') {
        negated = true;
        i += 1;
    }

    let mut members: Vec<(char, char)> = Vec::new();

    while i < chars.len() {
        let c = match chars[i] {
            ']' => {
                let mut class = String::from(if negated { "[^" } else { "[" });

                for (low, high) in &members {
                    class.push_str(&escape_class_char(*low));
                    if low != high {
                        class.push('-');
                        class.push_str(&escape_class_char(*high));
                    }
                }

                // An empty class matches nothing.
                if members.is_empty() {
                    return Some((
                        if negated { "(?s:.)" } else { "[^\\s\\S]" }.to_string(),
                        i,
                    ));
                }

                class.push(']');
                return Some((class, i));
            }
            '\\' if i + 1 < chars.len() => {
                i += 1;
                chars[i]
            }
            c => c,
        };

        if chars.get(i + 1) == Some(&'-') && i + 2 < chars.len() && chars[i + 2] != ']' {
            let mut high = chars[i + 2];
            let mut low = c;
            if low > high {
                std::mem::swap(&mut low, &mut high);
            }
            members.push((low, high));
            i += 3;
        } else {
            members.push((c, c));
            i += 1;
        }
    }

    None
}

fn escape_class_char(c: char) -> String {
    match c {
        '\\' | ']' | '[' | '^' | '-' | '&' | '~' => format!("\\{}", c),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(glob: &str, key: &str) -> bool {
        Pattern::new(glob).map(|p| p.is_match(key)).unwrap_or(false)
    }

    #[test]
    fn star_and_question_mark() {
        assert!(matches("a*", "a"));
        assert!(matches("a*", "ab"));
        assert!(!matches("a*", "b"));
        assert!(matches("h?llo", "hello"));
        assert!(!matches("h?llo", "hllo"));
        assert!(matches("*", ""));
    }

    #[test]
    fn matches_the_whole_key() {
        assert!(!matches("a", "ba"));
        assert!(!matches("a", "ab"));
    }

    #[test]
    fn character_classes() {
        assert!(matches("h[ae]llo", "hallo"));
        assert!(!matches("h[ae]llo", "hillo"));
        assert!(matches("h[^e]llo", "hallo"));
        assert!(!matches("h[^e]llo", "hello"));
        assert!(matches("h[a-b]llo", "hbllo"));
        assert!(matches("h[b-a]llo", "hallo"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(matches("a.b", "a.b"));
        assert!(!matches("a.b", "axb"));
        assert!(matches("(x)+", "(x)+"));
        assert!(matches("price$", "price$"));
    }

    #[test]
    fn escapes_and_unterminated_class() {
        assert!(matches(r"a\*", "a*"));
        assert!(!matches(r"a\*", "ab"));
        assert!(matches("a[b", "a[b"));
    }
}
