//! Path template matching.
//!
//! Two templates denote the same endpoint when they are equal after every
//! parameter placeholder is replaced by a wildcard, so `/pets/{id}` and
//! `/pets/{petId}` match while `/pets/{id}` and `/cats/{id}` do not.
//!
//! Placeholder grammar: a single `{`, one or more characters other than `{`,
//! `}` and `/`, then a single `}` that is not immediately followed by another
//! `}`. The doubled braces `{{` and `}}` are always literal pairs. Everything
//! else is literal text. Tokenising is a single left-to-right pass.

use std::collections::{BTreeMap, VecDeque};

/// One token of a tokenised path template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathToken {
    Literal(String),
    Parameter,
}

/// Wildcard-normalised form of a template; equal signatures match.
pub type PathSignature = Vec<PathToken>;

/// Tokenise a path template into literal runs and anonymous parameters
pub fn tokenize(template: &str) -> PathSignature {
    let chars: Vec<char> = template.chars().collect();
    let mut tokens: PathSignature = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();

        if (c == '{' && next == Some('{')) || (c == '}' && next == Some('}')) {
            literal.push(c);
            literal.push(c);
            i += 2;
            continue;
        }

        if c == '{' {
            if let Some(close) = placeholder_end(&chars, i) {
                if !literal.is_empty() {
                    tokens.push(PathToken::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(PathToken::Parameter);
                i = close + 1;
                continue;
            }
        }

        literal.push(c);
        i += 1;
    }

    if !literal.is_empty() {
        tokens.push(PathToken::Literal(literal));
    }
    tokens
}

/// Index of the `}` closing a placeholder opened at `open`, if it is one
fn placeholder_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 1;
    while j < chars.len() && !matches!(chars[j], '{' | '}' | '/') {
        j += 1;
    }
    let closes = chars.get(j) == Some(&'}');
    let non_empty = j > open + 1;
    let doubled = chars.get(j + 1) == Some(&'}');
    (closes && non_empty && !doubled).then_some(j)
}

/// True when the two templates denote the same endpoint
pub fn templates_equivalent(a: &str, b: &str) -> bool {
    tokenize(a) == tokenize(b)
}

/// Result of pairing the path names of two documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatches {
    /// `(source name, destination name)` in source document order
    pub matched: Vec<(String, String)>,
    /// Source templates with no counterpart, in source order
    pub removed: Vec<String>,
    /// Destination templates with no counterpart, in destination order
    pub added: Vec<String>,
}

/// Pair source and destination templates by signature.
///
/// Each template takes part in at most one match. When several templates in
/// one document share a signature they are paired with the other side's in
/// document order.
pub fn match_path_templates<S, D>(source: &[S], destination: &[D]) -> PathMatches
where
    S: AsRef<str>,
    D: AsRef<str>,
{
    let mut available: BTreeMap<PathSignature, VecDeque<usize>> = BTreeMap::new();
    for (index, name) in destination.iter().enumerate() {
        available
            .entry(tokenize(name.as_ref()))
            .or_default()
            .push_back(index);
    }

    let mut taken = vec![false; destination.len()];
    let mut result = PathMatches::default();

    for name in source {
        let name = name.as_ref();
        let partner = available
            .get_mut(&tokenize(name))
            .and_then(|queue| queue.pop_front());
        match partner {
            Some(index) => {
                taken[index] = true;
                result
                    .matched
                    .push((name.to_string(), destination[index].as_ref().to_string()));
            }
            None => result.removed.push(name.to_string()),
        }
    }

    result.added = destination
        .iter()
        .zip(taken)
        .filter(|(_, taken)| !taken)
        .map(|(name, _)| name.as_ref().to_string())
        .collect();

    result
}
