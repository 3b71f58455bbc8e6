//! Evaluates parsed directives against one file's facts.

use super::node::DirectiveNode;
use crate::core::facts::{FileFact, EXTENSION_SEPARATOR};
use crate::error::FormatError;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::time::SystemTime;

/// Expand `nodes` for `fact`, concatenating the results in order
pub fn expand(nodes: &[DirectiveNode], fact: &FileFact<'_>) -> Result<String, FormatError> {
    let mut output = String::new();

    for node in nodes {
        match node {
            DirectiveNode::Literal(text) => output.push_str(text),
            DirectiveNode::PercentEscape => output.push('%'),
            DirectiveNode::SeparatorEscape => output.push(EXTENSION_SEPARATOR),
            DirectiveNode::BasenameRef => output.push_str(fact.basename()),
            DirectiveNode::ExtensionRef => output.push_str(fact.extension()),
            DirectiveNode::HashRef => output.push_str(fact.hash_prefix()?),
            DirectiveNode::SizeRef => output.push_str(&fact.size_bytes().to_string()),
            DirectiveNode::SliceRef { begin, end } => {
                output.push_str(&slice_chars(fact.basename(), *begin, *end))
            }
            DirectiveNode::TokenRef {
                delimiter,
                index,
                case,
            } => {
                let field = token_field(fact.basename(), delimiter, *index)?;
                output.push_str(&case.apply(field));
            }
            DirectiveNode::TimeRef { pattern } => {
                output.push_str(&format_time(fact.modified(), pattern)?)
            }
        }
    }

    Ok(output)
}

/// Character slice with sequence-slicing semantics.
///
/// Negative bounds count back from the end, omitted bounds default to the
/// start and end, and both are clamped into `[0, len]`. An empty range is
/// an empty string, never an error.
pub fn slice_chars(name: &str, begin: Option<i64>, end: Option<i64>) -> String {
    let len = name.chars().count() as i64;
    let clamp = |bound: i64| {
        if bound < 0 {
            (len + bound).max(0)
        } else {
            bound.min(len)
        }
    };

    let begin = begin.map_or(0, clamp);
    let end = end.map_or(len, clamp);
    if begin >= end {
        return String::new();
    }

    name.chars()
        .skip(begin as usize)
        .take((end - begin) as usize)
        .collect()
}

/// The `index`th (1-based) field of `name` split on every `delimiter`
pub fn token_field<'n>(name: &'n str, delimiter: &str, index: usize) -> Result<&'n str, FormatError> {
    let mut fields = name.split(delimiter);
    match index.checked_sub(1).and_then(|i| fields.nth(i)) {
        Some(field) => Ok(field),
        None => Err(FormatError::FieldIndex {
            name: name.to_string(),
            delimiter: delimiter.to_string(),
            index,
            fields: name.split(delimiter).count(),
        }),
    }
}

/// Format a modification time in local time with a strftime pattern.
///
/// The pattern is only checked here, when a file is actually formatted.
pub fn format_time(modified: SystemTime, pattern: &str) -> Result<String, FormatError> {
    let invalid = || FormatError::TimeFormat {
        pattern: pattern.to_string(),
    };

    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }

    let local: DateTime<Local> = modified.into();
    let mut output = String::new();
    write!(output, "{}", local.format_with_items(items.into_iter())).map_err(|_| invalid())?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::facts::MemoryFacts;
    use crate::core::format::parse;
    use std::path::Path;
    use std::time::{Duration, UNIX_EPOCH};

    fn expand_for(path: &str, contents: &str, template: &str) -> Result<String, FormatError> {
        let facts = MemoryFacts::new().with_file(path, contents, UNIX_EPOCH);
        let fact = FileFact::extract(Path::new(path), &facts).unwrap();
        expand(&parse(template).unwrap(), &fact)
    }

    #[test]
    fn expands_simple_directives() {
        assert_eq!(expand_for("foo", "", "%%").unwrap(), "%");
        assert_eq!(expand_for("foo", "", "bar").unwrap(), "bar");
        assert_eq!(expand_for("foo", "", "%.").unwrap(), ".");
        assert_eq!(expand_for("foo/bar.gz", "", "%B.%E").unwrap(), "bar.gz");
        assert_eq!(expand_for("foo/bar.tar", "", "%B.%E.gz").unwrap(), "bar.tar.gz");
        assert_eq!(expand_for("foo/bar.gz", "", "%B.tar.gz").unwrap(), "bar.tar.gz");
    }

    #[test]
    fn escapes_yield_exactly_one_character() {
        for template in ["x%%y", "%%%.%%", "%.%.", "a%%%%b"] {
            let expanded = expand_for("name.txt", "", template).unwrap();
            let percents = template.matches("%%").count();
            let separators = template.matches("%.").count();
            assert_eq!(expanded.matches('%').count(), percents, "{template}");
            assert_eq!(expanded.matches('.').count(), separators, "{template}");
        }
    }

    #[test]
    fn expands_tokens() {
        let name = "foo-bar-baz.gz";
        assert_eq!(expand_for(name, "", "%B").unwrap(), "foo-bar-baz");
        assert_eq!(expand_for(name, "", "%E").unwrap(), "gz");
        assert_eq!(expand_for(name, "", "%(-=1)T").unwrap(), "foo");
        assert_eq!(expand_for(name, "", "%(-=2)T").unwrap(), "bar");
        assert_eq!(expand_for(name, "", "%(-=3)T.%E").unwrap(), "baz.gz");
        assert_eq!(expand_for(name, "", "%(-=2)U.%E").unwrap(), "BAR.gz");

        assert_eq!(
            expand_for("foo-bar.txt", "", "%(-=1)U_%(-=2)U.TXT").unwrap(),
            "FOO_BAR.TXT"
        );
        assert_eq!(
            expand_for("FOO_BAR.TXT", "", "%(_=1)L-%(_=2)L.txt").unwrap(),
            "foo-bar.txt"
        );
    }

    #[test]
    fn token_out_of_range_is_an_error() {
        let error = expand_for("a_b.txt", "", "%(_=3)T").unwrap_err();
        match error {
            FormatError::FieldIndex { index, fields, .. } => {
                assert_eq!(index, 3);
                assert_eq!(fields, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn name_without_delimiter_is_one_field() {
        assert_eq!(expand_for("plain.txt", "", "%(-=1)T").unwrap(), "plain");
        assert_eq!(expand_for(".txt", "", "%(-=1)T").unwrap(), "");
        assert!(expand_for("plain.txt", "", "%(-=2)T").is_err());
    }

    #[test]
    fn expands_slices() {
        assert_eq!(expand_for("foobar.txt", "", "%(,)C%.%E").unwrap(), "foobar.txt");
        assert_eq!(expand_for("foobar.txt", "", "%(1,)C%.%E").unwrap(), "oobar.txt");
        assert_eq!(expand_for("foobar.txt", "", "%(,-1)C%.%E").unwrap(), "fooba.txt");
        assert_eq!(expand_for("foobar.txt", "", "%(1,2)C%.%E").unwrap(), "o.txt");
    }

    #[test]
    fn slice_matches_sequence_slicing() {
        let name = "abcdef";
        let chars: Vec<char> = name.chars().collect();
        let len = chars.len() as i64;
        let reference = |b: i64, e: i64| -> String {
            let norm = |i: i64| if i < 0 { (len + i).max(0) } else { i.min(len) };
            let (b, e) = (norm(b), norm(e));
            if b >= e {
                String::new()
            } else {
                chars[b as usize..e as usize].iter().collect()
            }
        };

        for begin in -9..=9 {
            for end in begin..=9 {
                assert_eq!(
                    slice_chars(name, Some(begin), Some(end)),
                    reference(begin, end),
                    "[{begin}:{end}]"
                );
            }
        }
        assert_eq!(slice_chars(name, None, Some(-2)), "abcd");
        assert_eq!(slice_chars(name, Some(-2), None), "ef");
        assert_eq!(slice_chars(name, Some(4), Some(2)), "");
        assert_eq!(slice_chars("", Some(-1), None), "");
    }

    #[test]
    fn slice_counts_characters() {
        assert_eq!(slice_chars("héllo", Some(1), Some(3)), "él");
    }

    #[test]
    fn expands_size_and_hash() {
        assert_eq!(expand_for("small.txt", "11111", "%S").unwrap(), "5");
        // sha256("") = e3b0c442...
        assert_eq!(expand_for("empty.txt", "", "%H").unwrap(), "e3b0c442");
        assert_eq!(
            expand_for("one-two-three.txt", "1234", "%(-=2)T-%S.%E").unwrap(),
            "two-4.txt"
        );
    }

    #[test]
    fn repeated_hash_reads_file_once() {
        let facts = MemoryFacts::new().with_file("a.txt", "abc", UNIX_EPOCH);
        let fact = FileFact::extract(Path::new("a.txt"), &facts).unwrap();
        let expanded = expand(&parse("%H-%H").unwrap(), &fact).unwrap();

        assert_eq!(expanded, "ba7816bf-ba7816bf");
        assert_eq!(facts.opens(), 1);
    }

    #[test]
    fn formats_modification_time() {
        let modified = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let expected = DateTime::<Local>::from(modified).format("%Y%m%d").to_string();
        assert_eq!(format_time(modified, "%Y%m%d").unwrap(), expected);
        assert_eq!(format_time(modified, "plain").unwrap(), "plain");
    }

    #[test]
    fn invalid_time_pattern_fails_at_expansion() {
        // Parses fine; only the formatter rejects it
        let nodes = parse("%(%Q)M").unwrap();
        let facts = MemoryFacts::new().with_file("a.txt", "", UNIX_EPOCH);
        let fact = FileFact::extract(Path::new("a.txt"), &facts).unwrap();

        assert!(matches!(
            expand(&nodes, &fact),
            Err(FormatError::TimeFormat { .. })
        ));
    }
}
