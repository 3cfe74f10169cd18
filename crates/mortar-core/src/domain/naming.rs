//! Identifier case conversion for generated names and paths.

/// `WidgetOrder` → `widget_order`. Used for file names and SQL columns.
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// `widget_order` → `WidgetOrder`.
///
/// Common initialisms keep Go's all-caps spelling: `user_id` → `UserID`.
pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            if INITIALISMS.contains(&w.as_str()) {
                return w.to_uppercase();
            }
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

/// `WidgetOrder` → `widgetOrder`. Used for JSON keys and Go locals.
pub fn to_camel_case(s: &str) -> String {
    let mut words = split_words(s).into_iter();
    let Some(first) = words.next() else {
        return String::new();
    };
    let rest: String = words.map(|w| to_pascal_case(&w)).collect();
    format!("{first}{rest}")
}

/// Go name protoc-gen-go gives a snake case proto identifier:
/// `owner_id` → `OwnerId`, with no initialism handling.
pub fn proto_go_name(snake: &str) -> String {
    snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// English plural of a snake or Pascal case noun, for table names.
pub fn pluralize(word: &str) -> String {
    let lower = word.to_lowercase();
    if lower.ends_with('y') && !lower.ends_with("ay") && !lower.ends_with("ey") && !lower.ends_with("oy") {
        format!("{}ies", &word[..word.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

const INITIALISMS: &[&str] = &["id", "url", "uuid", "http", "api", "sql", "json"];

/// Split an identifier into lowercase words.
///
/// Separators (`_`, `-`, whitespace) always split. A lower→upper transition
/// splits (`myApp`), and so does the last capital of an acronym run
/// (`HTTPServer` → `http`, `server`).
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            if (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}
