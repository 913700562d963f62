/// Wraps a search term for a substring LIKE match. The `%`, `_` and `\`
/// metacharacters in the term are escaped with `\`, so statements using the
/// result must declare `ESCAPE '\'`.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
