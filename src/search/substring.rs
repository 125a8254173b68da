use crate::candidate::Candidate;

/// One field of a match, split around the first occurrence of the query.
/// Concatenating the three parts always reconstructs the field text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub prefix: String,
    pub matched: String,
    pub suffix: String,
}

impl MatchSpan {
    pub fn unmatched(text: impl Into<String>) -> Self {
        Self {
            prefix: text.into(),
            matched: String::new(),
            suffix: String::new(),
        }
    }

    pub fn text(&self) -> String {
        format!("{}{}{}", self.prefix, self.matched, self.suffix)
    }

    pub fn is_hit(&self) -> bool {
        !self.matched.is_empty()
    }
}

/// A candidate annotated with highlighting spans for both matchable fields.
/// Produced fresh on every filter pass and replaced wholesale, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub value: String,
    pub name: MatchSpan,
    pub phone: MatchSpan,
}

/// Filters `candidates` against `query`, preserving input order.
///
/// An empty query returns every candidate unhighlighted. Otherwise a
/// candidate is kept when its composite name (`"CODE | Label"`) contains the
/// query case-insensitively, or its phone contains it byte-for-byte.
pub fn filter(query: &str, candidates: &[Candidate]) -> Vec<Match> {
    let mut matches = Vec::new();

    for candidate in candidates {
        let name = candidate.display_name();

        if query.is_empty() {
            matches.push(Match {
                value: candidate.label.clone(),
                name: MatchSpan::unmatched(name),
                phone: MatchSpan::unmatched(candidate.phone.clone()),
            });
            continue;
        }

        let name_span = split_insensitive(&name, query);
        let phone_span = split_exact(&candidate.phone, query);
        if name_span.is_none() && phone_span.is_none() {
            continue;
        }

        matches.push(Match {
            value: candidate.label.clone(),
            name: name_span.unwrap_or_else(|| MatchSpan::unmatched(name)),
            phone: phone_span.unwrap_or_else(|| MatchSpan::unmatched(candidate.phone.clone())),
        });
    }

    matches
}

// Char-indexed so the matched fragment is the actual slice of `text`, not
// the query as typed; reconstruction must hold when letter case differs.
fn split_insensitive(text: &str, query: &str) -> Option<MatchSpan> {
    let haystack: Vec<char> = text.chars().map(|c| c.to_ascii_lowercase()).collect();
    let needle: Vec<char> = query.chars().map(|c| c.to_ascii_lowercase()).collect();

    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }

    let start = (0..=haystack.len() - needle.len())
        .find(|&start| haystack[start..start + needle.len()] == needle[..])?;
    let end = start + needle.len();

    let chars: Vec<char> = text.chars().collect();
    Some(MatchSpan {
        prefix: chars[..start].iter().collect(),
        matched: chars[start..end].iter().collect(),
        suffix: chars[end..].iter().collect(),
    })
}

fn split_exact(text: &str, query: &str) -> Option<MatchSpan> {
    let start = text.find(query)?;
    let end = start + query.len();
    Some(MatchSpan {
        prefix: text[..start].to_string(),
        matched: text[start..end].to_string(),
        suffix: text[end..].to_string(),
    })
}
