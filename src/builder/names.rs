use ahash::AHashSet;

const BUILTIN_TYPES: &[&str] = &[
    "any", "anydata", "boolean", "byte", "decimal", "error", "float", "future", "int", "json",
    "map", "record", "stream", "string", "table", "typedesc", "xml",
];

/// `<prefix><n>` for the smallest `n >= 1` that is not already visible.
pub fn generate(prefix: &str, visible: &AHashSet<String>) -> String {
    let mut n = 1usize;
    loop {
        let candidate = format!("{}{}", prefix, n);
        if !visible.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// A variable-name prefix derived from a type, e.g. `http:Response` gives `response`
/// and `string` gives `stringResult`.
pub fn prefix_for_type(type_name: &str) -> String {
    let local = type_name.rsplit(':').next().unwrap_or(type_name);
    let base: String = local
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if base.is_empty() {
        return "result".to_string();
    }
    if BUILTIN_TYPES.contains(&base.as_str()) {
        return format!("{}Result", base);
    }
    lower_first(&base)
}

pub(crate) fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generates a name and marks it as taken, for templates that declare several names.
pub fn claim(prefix: &str, taken: &mut AHashSet<String>) -> String {
    let name = generate(prefix, taken);
    taken.insert(name.clone());
    name
}
