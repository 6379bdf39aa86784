// Name pattern matching with `*` (any run, possibly empty) and `?` (exactly
// one character). Brackets carry no special meaning.

use glob::Pattern;
use log::debug;

/// Returns true if `name` matches `pattern`.
pub fn matches(pattern: &str, name: &str) -> bool {
    if pattern.is_empty() {
        return name.is_empty();
    }
    if pattern == "*" {
        return true;
    }
    match Pattern::new(&normalize(pattern)) {
        Ok(compiled) => compiled.matches(name),
        Err(e) => {
            debug!("Pattern '{}' did not compile ({}), comparing literally", pattern, e);
            pattern == name
        }
    }
}

/// Collapses runs of `*` and makes `[` / `]` literal, leaving only `*` and `?`
/// as metacharacters.
fn normalize(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut previous_star = false;
    for c in pattern.chars() {
        match c {
            '*' if previous_star => continue,
            '*' => {
                previous_star = true;
                out.push('*');
            }
            '[' => {
                previous_star = false;
                out.push_str("[[]");
            }
            ']' => {
                previous_star = false;
                out.push_str("[]]");
            }
            _ => {
                previous_star = false;
                out.push(c);
            }
        }
    }
    out
}
