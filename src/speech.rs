//! Turns list names and items into sentences fit for text-to-speech.
//!
//! Items stored on Our Groceries carry their quantity as a display suffix,
//! e.g. `"Apples (3)"`. [`describe_item`] turns that into `"3 apples"`;
//! anything without the suffix is spoken as-is.

use std::sync::LazyLock;

use pluralizer::pluralize;
use regex::Regex;

static QUANTITY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.*\S)\s*\((\d+)\)\s*$").expect("quantity suffix pattern is valid")
});

/// Append `" List"` unless the name already ends in the word "list".
pub fn describe_list(name: &str) -> String {
    let name = name.trim_end();
    let ends_in_list = name
        .split_whitespace()
        .next_back()
        .is_some_and(|word| word.eq_ignore_ascii_case("list"));

    if ends_in_list {
        name.to_string()
    } else if name.is_empty() {
        "List".to_string()
    } else {
        format!("{name} List")
    }
}

/// Split `"<name> (<digits>)"` into its name and count.
pub fn parse_item(item: &str) -> Option<(&str, u64)> {
    let caps = QUANTITY_SUFFIX.captures(item)?;
    let name = caps.get(1)?.as_str();
    let count = caps.get(2)?.as_str().parse().ok()?;
    Some((name, count))
}

/// The item name without any quantity suffix.
pub fn item_base_name(item: &str) -> &str {
    match parse_item(item) {
        Some((name, _)) => name,
        None => item.trim(),
    }
}

/// Speak a single item: `"Apple (3)"` becomes `"3 apples"`. A name that
/// is already plural is kept, whatever the count.
pub fn describe_item(item: &str) -> String {
    let Some((name, count)) = parse_item(item) else {
        return item.to_string();
    };
    let name = name.to_lowercase();
    let noun = if is_plural(&name) {
        name
    } else {
        pluralize(&name, count as isize, false)
    };
    format!("{count} {noun}")
}

/// Whether an item reads as plural once spoken: a quantity other than one,
/// or a name that is itself plural.
pub fn item_is_plural(item: &str) -> bool {
    match parse_item(item) {
        Some((name, count)) => count != 1 || is_plural(&name.to_lowercase()),
        None => is_plural(&item.trim().to_lowercase()),
    }
}

/// A recognized plural: pluralizing leaves it alone, singularizing doesn't.
/// Uncountable words ("milk", "rice") are neither.
fn is_plural(word: &str) -> bool {
    pluralize(word, 2, false) == word && pluralize(word, 1, false) != word
}

/// Enumerate items Oxford-comma style: `"a, b, and c"`.
pub fn describe_item_set<S: AsRef<str>>(items: &[S]) -> String {
    let described: Vec<String> = items.iter().map(|i| describe_item(i.as_ref())).collect();
    match described.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_item_splits_quantity() {
        assert_eq!(parse_item("Apple (3)"), Some(("Apple", 3)));
        assert_eq!(parse_item("Hot Dog Buns (12)"), Some(("Hot Dog Buns", 12)));
    }

    #[test]
    fn parse_item_rejects_plain_names() {
        assert_eq!(parse_item("Apples"), None);
        assert_eq!(parse_item("(3)"), None);
        assert_eq!(parse_item("Apples (three)"), None);
        assert_eq!(parse_item("Apples (3) extra"), None);
    }

    #[test]
    fn base_name_strips_suffix() {
        assert_eq!(item_base_name("Milk (2)"), "Milk");
        assert_eq!(item_base_name(" Milk "), "Milk");
    }

    #[test]
    fn plural_names_are_recognized() {
        assert!(is_plural("apples"));
        assert!(is_plural("hot dog buns"));
        assert!(!is_plural("banana"));
        assert!(!is_plural("milk"));
    }

    #[test]
    fn empty_list_name_still_reads_as_list() {
        assert_eq!(describe_list(""), "List");
        assert_eq!(describe_list(describe_list("").as_str()), "List");
    }

    #[test]
    fn list_word_must_be_whole_word() {
        assert_eq!(describe_list("Checklist"), "Checklist List");
        assert_eq!(describe_list("my list"), "my list");
    }
}
