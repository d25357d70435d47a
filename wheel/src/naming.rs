//! Naming conventions for generated code
//!
//! Every name a template needs (struct names, table names, route paths, file
//! stems) is derived here from the raw resource name. All functions are pure:
//! the same input always yields the same [`DerivedNames`].
//!
//! Regular English inflection is delegated to the `Inflector` crate. Words it
//! gets wrong (irregular plurals such as `person`/`people`) and words that do
//! not inflect at all are handled by explicit tables that take precedence.
//! A singular suggested by `Inflector` is only accepted when pluralizing it
//! gives back the word it came from, so `heroes` never turns into `her`.

use inflector::Inflector;
use serde::Serialize;

use crate::error::Error;

/// Irregular singular/plural pairs checked before the regular rules.
const IRREGULARS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
    ("ox", "oxen"),
    ("quiz", "quizzes"),
    ("buzz", "buzzes"),
    ("leaf", "leaves"),
    ("half", "halves"),
    ("knife", "knives"),
    ("wife", "wives"),
    ("life", "lives"),
    ("hero", "heroes"),
    ("potato", "potatoes"),
    ("tomato", "tomatoes"),
    ("cactus", "cacti"),
    ("fungus", "fungi"),
    ("campus", "campuses"),
    ("bus", "buses"),
    ("status", "statuses"),
    ("virus", "viruses"),
    ("criterion", "criteria"),
];

/// Words whose singular and plural forms are identical.
const UNCOUNTABLES: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "deer",
    "news",
    "metadata",
];

/// Strict and reserved Rust keywords
///
/// A resource or column with one of these names would produce a module, field
/// or type the generated project cannot compile.
pub const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern", "false", "fn", "for",
    "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub", "ref", "return",
    "self", "Self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try", "gen",
];

/// All naming variants of a resource
///
/// Built by [`resolve`]. Serialized into every template context under the
/// `names` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedNames {
    /// `snake_case` singular (`user_profile`)
    pub singular: String,
    /// `snake_case` plural (`user_profiles`)
    pub plural: String,
    /// `PascalCase` singular used for structs (`UserProfile`)
    pub type_name: String,
    /// `PascalCase` plural (`UserProfiles`)
    pub plural_type_name: String,
    /// File stem for per-resource files (`user_profile`)
    pub file_stem: String,
    /// Database table and plural module name (`user_profiles`)
    pub table_name: String,
    /// URL path of the resource collection (`/user-profiles`)
    pub route_path: String,
    /// Human readable singular (`User Profile`)
    pub title: String,
    /// Human readable plural (`User Profiles`)
    pub plural_title: String,
}

/// Derive every naming variant from a raw resource name
///
/// The name may be given in any case and in singular or plural form;
/// `resolve("users")`, `resolve("User")` and `resolve("user")` all produce the
/// same result.
///
/// # Examples
///
/// ```
/// # use wheel::naming::resolve;
/// let names = resolve("user");
/// assert_eq!(names.singular, "user");
/// assert_eq!(names.plural, "users");
/// assert_eq!(names.type_name, "User");
/// assert_eq!(names.route_path, "/users");
/// ```
#[must_use]
pub fn resolve(name: &str) -> DerivedNames {
    let snake = name.to_snake_case();
    let singular = singularize(&snake);
    let plural = pluralize(&singular);

    DerivedNames {
        type_name: singular.to_pascal_case(),
        plural_type_name: plural.to_pascal_case(),
        file_stem: singular.clone(),
        table_name: plural.clone(),
        route_path: format!("/{}", plural.to_kebab_case()),
        title: singular.to_title_case(),
        plural_title: plural.to_title_case(),
        singular,
        plural,
    }
}

/// Whether `word` is a Rust keyword, strict or reserved
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    RUST_KEYWORDS.contains(&word)
}

/// Check a resource name against `[A-Za-z0-9_]+`
///
/// Names must also start with a letter or underscore and contain at least one
/// letter or digit, since they end up as Rust identifiers in generated code.
/// The derived singular and plural forms must not be Rust keywords.
///
/// # Errors
///
/// Returns [`Error::InvalidResourceName`] when the name is empty, contains a
/// character outside the allowed class, starts with a digit, has nothing but
/// underscores, or resolves to a keyword.
pub fn validate_name(name: &str) -> Result<(), Error> {
    let invalid = |reason| Error::InvalidResourceName {
        name: name.to_string(),
        reason,
    };

    let well_formed = name.chars().next().is_some_and(|c| !c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !well_formed {
        return Err(invalid("use letters, digits and underscores, not starting with a digit"));
    }
    if !name.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("name needs at least one letter or digit"));
    }

    let names = resolve(name);
    if !names
        .singular
        .trim_start_matches('_')
        .starts_with(|c: char| c.is_ascii_alphabetic())
    {
        return Err(invalid("name must have a letter before any digit"));
    }
    if is_keyword(&name.to_snake_case()) || is_keyword(&names.singular) || is_keyword(&names.plural) {
        return Err(invalid("name is a Rust keyword"));
    }

    Ok(())
}

/// Pluralize the last `snake_case` segment of a word
///
/// # Examples
///
/// ```
/// # use wheel::naming::pluralize;
/// assert_eq!(pluralize("post"), "posts");
/// assert_eq!(pluralize("category"), "categories");
/// assert_eq!(pluralize("person"), "people");
/// assert_eq!(pluralize("user_profile"), "user_profiles");
/// ```
#[must_use]
pub fn pluralize(word: &str) -> String {
    let (head, last) = split_last_segment(word);
    format!("{head}{}", pluralize_word(last))
}

/// Singularize the last `snake_case` segment of a word
///
/// # Examples
///
/// ```
/// # use wheel::naming::singularize;
/// assert_eq!(singularize("posts"), "post");
/// assert_eq!(singularize("categories"), "category");
/// assert_eq!(singularize("people"), "person");
/// assert_eq!(singularize("post"), "post");
/// ```
#[must_use]
pub fn singularize(word: &str) -> String {
    let (head, last) = split_last_segment(word);
    format!("{head}{}", singularize_word(last))
}

fn split_last_segment(word: &str) -> (&str, &str) {
    word.rfind('_')
        .map_or(("", word), |idx| word.split_at(idx + 1))
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let singular = singularize_word(word);
    let plural = plural_form(&singular);
    // a plural that reads back as a different word would not round trip
    if singularize_word(&plural) == singular {
        plural
    } else {
        singular
    }
}

fn singularize_word(word: &str) -> String {
    let mut current = word.to_lowercase();
    loop {
        let next = singular_step(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn plural_form(word: &str) -> String {
    if UNCOUNTABLES.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = irregular(word) {
        return (*plural).to_string();
    }

    let plural = word.to_plural();
    if plural.is_empty() {
        format!("{word}s")
    } else {
        plural
    }
}

/// One singularization step; candidates are always shorter than `word`
fn singular_step(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLES.contains(&word) {
        return word.to_string();
    }
    if let Some((singular, _)) = irregular(word) {
        return (*singular).to_string();
    }

    let inflected = word.to_singular();
    if inflected == word {
        return inflected;
    }

    let result = [
        inflected.as_str(),
        word.strip_suffix("es").unwrap_or_default(),
        word.strip_suffix('s').unwrap_or_default(),
    ]
    .into_iter()
    .find(|candidate| !candidate.is_empty() && candidate.len() < word.len() && plural_form(candidate) == word)
    .map_or_else(|| word.to_string(), str::to_string);
    result
}

fn irregular(word: &str) -> Option<&'static (&'static str, &'static str)> {
    IRREGULARS
        .iter()
        .find(|(singular, plural)| *singular == word || *plural == word)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_resolve_user() {
        let names = resolve("user");
        assert_eq!(names.singular, "user");
        assert_eq!(names.plural, "users");
        assert_eq!(names.type_name, "User");
        assert_eq!(names.file_stem, "user");
        assert_eq!(names.table_name, "users");
        assert_eq!(names.route_path, "/users");
    }

    #[test]
    fn test_resolve_multi_word() {
        let names = resolve("UserProfile");
        assert_eq!(names.singular, "user_profile");
        assert_eq!(names.plural, "user_profiles");
        assert_eq!(names.type_name, "UserProfile");
        assert_eq!(names.plural_type_name, "UserProfiles");
        assert_eq!(names.route_path, "/user-profiles");
        assert_eq!(names.title, "User Profile");
        assert_eq!(names.plural_title, "User Profiles");
    }

    #[test]
    fn test_resolve_plural_input_does_not_double_inflect() {
        assert_eq!(resolve("users"), resolve("user"));
        assert_eq!(resolve("categories"), resolve("category"));
        assert_eq!(resolve("people"), resolve("person"));
        assert_eq!(resolve("user_profiles"), resolve("user_profile"));
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("post"), "posts");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("comment"), "comments");
        assert_eq!(pluralize("user"), "users");
    }

    #[test]
    fn test_irregular_table_overrides_rules() {
        assert_eq!(pluralize("person"), "people");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("mouse"), "mice");
        assert_eq!(singularize("geese"), "goose");
        assert_eq!(singularize("oxen"), "ox");
    }

    #[test]
    fn test_uncountables_are_unchanged() {
        assert_eq!(pluralize("sheep"), "sheep");
        assert_eq!(singularize("sheep"), "sheep");
        assert_eq!(pluralize("news"), "news");
    }

    #[test]
    fn test_only_last_segment_is_inflected() {
        assert_eq!(pluralize("blog_person"), "blog_people");
        assert_eq!(singularize("order_items"), "order_item");
    }

    #[test]
    fn test_singularize_round_trip() {
        for word in [
            "post", "posts", "user", "users", "category", "categories", "comment",
            "person", "people", "child", "children", "sheep", "mouse", "mice",
        ] {
            assert_eq!(
                singularize(&pluralize(word)),
                singularize(word),
                "round trip failed for {word}"
            );
        }
    }

    #[test]
    fn test_inflector_singular_must_pluralize_back() {
        for (plural, singular) in [
            ("heroes", "hero"),
            ("knives", "knife"),
            ("wives", "wife"),
            ("halves", "half"),
            ("cacti", "cactus"),
            ("buzzes", "buzz"),
            ("campuses", "campus"),
            ("boxes", "box"),
        ] {
            assert_eq!(singularize(plural), singular, "{plural}");
            assert_eq!(singularize(singular), singular, "{singular}");
            assert_eq!(pluralize(singular), plural, "{singular}");
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("post").is_ok());
        assert!(validate_name("UserProfile").is_ok());
        assert!(validate_name("_draft").is_ok());
        assert!(validate_name("order_items2").is_ok());

        assert!(validate_name("").is_err());
        assert!(validate_name("2fast").is_err());
        assert!(validate_name("user-profile").is_err());
        assert!(validate_name("user profile").is_err());
        assert!(validate_name("posts/comments").is_err());
    }

    #[test]
    fn test_underscore_only_names_are_rejected() {
        for name in ["_", "__", "___", "_1"] {
            let err = validate_name(name).unwrap_err();
            assert!(matches!(err, Error::InvalidResourceName { .. }), "{name}");
        }
    }

    #[test]
    fn test_keyword_names_are_rejected() {
        for name in ["type", "types", "match", "fn", "Self", "async", "yield", "Struct"] {
            let err = validate_name(name).unwrap_err();
            assert!(err.to_string().contains("Rust keyword"), "{name}: {err}");
        }
        assert!(validate_name("user_type").is_ok());
        assert!(validate_name("matches_played").is_ok());
    }

    proptest! {
        #[test]
        fn resolve_is_deterministic(name in "[a-z][a-z0-9]{0,11}") {
            prop_assert_eq!(resolve(&name), resolve(&name));
        }

        #[test]
        fn singularize_undoes_pluralize(word in "[a-z]{2,10}") {
            prop_assert_eq!(singularize(&pluralize(&word)), singularize(&word));
            prop_assert_eq!(resolve(&pluralize(&word)), resolve(&word));
        }

        #[test]
        fn valid_names_pass_validation(name in "[A-Za-z][A-Za-z0-9_]{0,15}") {
            let names = resolve(&name);
            prop_assume!(!is_keyword(&name.to_snake_case()));
            prop_assume!(!is_keyword(&names.singular) && !is_keyword(&names.plural));
            prop_assert!(validate_name(&name).is_ok());
        }
    }
}
