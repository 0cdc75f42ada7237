//! Skill extraction by fixed pattern rules.
//!
//! Each entry in [`SKILL_PATTERNS`] is a label and a regular expression made
//! of word-bounded alternatives. Matching is case-insensitive. Adding a skill
//! means adding one row to the table.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// `(label, pattern)` pairs. Patterns are compiled case-insensitively.
pub const SKILL_PATTERNS: &[(&str, &str)] = &[
    ("Python", r"\bpython\b"),
    ("JavaScript", r"\bjavascript\b|\bjs\b"),
    ("TypeScript", r"\btypescript\b|\bts\b"),
    ("React", r"\breact(\.js)?\b"),
    ("Node.js", r"\bnode(\.js)?\b"),
    ("Vue", r"\bvue(\.js)?\b"),
    ("Django", r"\bdjango\b"),
    ("Flask", r"\bflask\b"),
    ("Laravel", r"\blaravel\b"),
    ("Docker", r"\bdocker\b"),
    ("Kubernetes", r"\bkubernetes\b|\bk8s\b"),
    ("SQL", r"\bsql\b|\bpostgres\b|\bmysql\b"),
    ("NoSQL", r"\bnosql\b|\bmongodb\b|\bredis\b"),
    (
        "CI/CD",
        r"\bci/cd\b|\bci\b\s*/\s*\bcd\b|\bjenkins\b|\bgithub actions\b|\bazure devops\b",
    ),
    ("Azure", r"\bazure\b"),
    ("AWS", r"\baws\b|\bamazon web services\b"),
    ("GCP", r"\bgcp\b|\bgoogle cloud\b"),
    (
        "Machine Learning",
        r"\bmachine learning\b|\bml\b|\bpytorch\b|\btensorflow\b|\bscikit-learn\b",
    ),
    (
        "Data Engineering",
        r"\bdata (engineer|engineering)\b|\bspark\b|\bhadoop\b|\bairflow\b",
    ),
];

static COMPILED: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    SKILL_PATTERNS
        .iter()
        .map(|(label, pattern)| {
            let re = Regex::new(&format!("(?i){pattern}"))
                .unwrap_or_else(|e| panic!("invalid skill pattern for {label}: {e}"));
            (*label, re)
        })
        .collect()
});

/// Return every skill label whose pattern occurs anywhere in `text`.
pub fn extract_skills(text: &str) -> BTreeSet<&'static str> {
    if text.is_empty() {
        return BTreeSet::new();
    }
    COMPILED
        .iter()
        .filter(|(_, re)| re.is_match(text))
        .map(|(label, _)| *label)
        .collect()
}

/// [`extract_skills`] as owned, sorted tags ready to store on a posting.
pub fn extract_tags(text: &str) -> Vec<String> {
    extract_skills(text).into_iter().map(str::to_string).collect()
}
