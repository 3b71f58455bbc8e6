//! Format template parser.
//!
//! Grammar, informally:
//!
//! ```text
//! template  := (literal | directive)*
//! directive := '%' ( '(' args ')' )? letter
//! ```
//!
//! `args` runs to the first `)`. Which letters accept or require an
//! argument list is decided per directive.

use super::node::{DirectiveNode, TokenCase};
use crate::error::{ParseError, ParseErrorKind};
use std::iter::Peekable;
use std::str::CharIndices;
use tracing::trace;

const DIRECTIVE_PREFIX: char = '%';
const ARGS_OPEN: char = '(';
const ARGS_CLOSE: char = ')';
const SLICE_SEPARATOR: char = ',';
const TOKEN_SEPARATOR: char = '=';

/// Parse a printf-style template into directive nodes.
///
/// Adjacent literal characters are merged into one [`DirectiveNode::Literal`].
pub fn parse(template: &str) -> Result<Vec<DirectiveNode>, ParseError> {
    Parser::new(template).run()
}

struct Parser<'t> {
    template: &'t str,
    chars: Peekable<CharIndices<'t>>,
}

impl<'t> Parser<'t> {
    fn new(template: &'t str) -> Self {
        Self {
            template,
            chars: template.char_indices().peekable(),
        }
    }

    fn run(mut self) -> Result<Vec<DirectiveNode>, ParseError> {
        let mut nodes = Vec::new();
        let mut literal = String::new();

        while let Some((start, ch)) = self.chars.next() {
            if ch != DIRECTIVE_PREFIX {
                literal.push(ch);
                continue;
            }

            let node = self.directive(start)?;
            trace!("parsed {:?} at {} in {:?}", node, start, self.template);

            if !literal.is_empty() {
                nodes.push(DirectiveNode::Literal(std::mem::take(&mut literal)));
            }
            nodes.push(node);
        }

        if !literal.is_empty() {
            nodes.push(DirectiveNode::Literal(literal));
        }

        Ok(nodes)
    }

    /// Parse the directive whose `%` sits at byte offset `start`
    fn directive(&mut self, start: usize) -> Result<DirectiveNode, ParseError> {
        let (mut index, mut letter) = match self.chars.next() {
            Some(next) => next,
            None => return Err(self.error(start, self.template.len(), ParseErrorKind::TrailingPercent)),
        };

        let mut args = None;
        if letter == ARGS_OPEN {
            let open = index;
            let close = loop {
                match self.chars.next() {
                    Some((i, ARGS_CLOSE)) => break i,
                    Some(_) => continue,
                    None => {
                        return Err(self.error(
                            start,
                            self.template.len(),
                            ParseErrorKind::UnclosedArguments,
                        ))
                    }
                }
            };
            let template = self.template;
            args = Some(&template[open + 1..close]);

            (index, letter) = match self.chars.next() {
                Some(next) => next,
                None => {
                    return Err(self.error(
                        start,
                        self.template.len(),
                        ParseErrorKind::MissingDirective,
                    ))
                }
            };
        }

        let end = index + letter.len_utf8();
        let fail = |kind| self.error(start, end, kind);

        match (letter, args) {
            ('%', None) => Ok(DirectiveNode::PercentEscape),
            ('.', None) => Ok(DirectiveNode::SeparatorEscape),
            ('B', None) => Ok(DirectiveNode::BasenameRef),
            ('E', None) => Ok(DirectiveNode::ExtensionRef),
            ('H', None) => Ok(DirectiveNode::HashRef),
            ('S', None) => Ok(DirectiveNode::SizeRef),
            ('%' | '.' | 'B' | 'E' | 'H' | 'S', Some(_)) => {
                Err(fail(ParseErrorKind::UnexpectedArguments(letter)))
            }
            ('C' | 'T' | 'L' | 'U' | 'M', None) => Err(fail(ParseErrorKind::MissingArguments(letter))),
            ('C', Some(args)) => parse_slice(args).map_err(fail),
            ('T', Some(args)) => parse_token(args, TokenCase::Keep).map_err(fail),
            ('L', Some(args)) => parse_token(args, TokenCase::Lower).map_err(fail),
            ('U', Some(args)) => parse_token(args, TokenCase::Upper).map_err(fail),
            ('M', Some("")) => Err(fail(ParseErrorKind::EmptyTimeFormat)),
            ('M', Some(pattern)) => Ok(DirectiveNode::TimeRef {
                pattern: pattern.to_string(),
            }),
            _ => Err(fail(ParseErrorKind::UnknownDirective(letter))),
        }
    }

    fn error(&self, start: usize, end: usize, kind: ParseErrorKind) -> ParseError {
        ParseError {
            template: self.template.to_string(),
            position: start,
            fragment: self.template[start..end].to_string(),
            kind,
        }
    }
}

/// `begin,end`, either side optional
fn parse_slice(args: &str) -> Result<DirectiveNode, ParseErrorKind> {
    let (begin, end) = args
        .split_once(SLICE_SEPARATOR)
        .ok_or(ParseErrorKind::MissingComma)?;

    Ok(DirectiveNode::SliceRef {
        begin: parse_bound(begin)?,
        end: parse_bound(end)?,
    })
}

fn parse_bound(text: &str) -> Result<Option<i64>, ParseErrorKind> {
    if text.is_empty() {
        return Ok(None);
    }

    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidBound(text.to_string()));
    }

    text.parse()
        .map(Some)
        .map_err(|_| ParseErrorKind::InvalidBound(text.to_string()))
}

/// `token=number`; the delimiter may itself contain `=`, so split at the last one
fn parse_token(args: &str, case: TokenCase) -> Result<DirectiveNode, ParseErrorKind> {
    let (delimiter, number) = args
        .rsplit_once(TOKEN_SEPARATOR)
        .ok_or(ParseErrorKind::MissingEquals)?;

    if delimiter.is_empty() {
        return Err(ParseErrorKind::EmptyDelimiter);
    }

    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidFieldIndex(number.to_string()));
    }

    let index: usize = number
        .parse()
        .map_err(|_| ParseErrorKind::InvalidFieldIndex(number.to_string()))?;
    if index == 0 {
        return Err(ParseErrorKind::ZeroFieldIndex);
    }

    Ok(DirectiveNode::TokenRef {
        delimiter: delimiter.to_string(),
        index,
        case,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(template: &str) -> ParseErrorKind {
        parse(template).unwrap_err().kind
    }

    #[test]
    fn parses_plain_text_as_one_literal() {
        assert_eq!(
            parse("bar").unwrap(),
            vec![DirectiveNode::Literal("bar".to_string())]
        );
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn parses_zero_argument_directives() {
        assert_eq!(
            parse("%B%.%E").unwrap(),
            vec![
                DirectiveNode::BasenameRef,
                DirectiveNode::SeparatorEscape,
                DirectiveNode::ExtensionRef,
            ]
        );
        assert_eq!(
            parse("%H-%S%%").unwrap(),
            vec![
                DirectiveNode::HashRef,
                DirectiveNode::Literal("-".to_string()),
                DirectiveNode::SizeRef,
                DirectiveNode::PercentEscape,
            ]
        );
    }

    #[test]
    fn parses_slice_bounds() {
        assert_eq!(
            parse("%(,)C").unwrap(),
            vec![DirectiveNode::SliceRef { begin: None, end: None }]
        );
        assert_eq!(
            parse("%(1,-1)C").unwrap(),
            vec![DirectiveNode::SliceRef {
                begin: Some(1),
                end: Some(-1)
            }]
        );
        assert_eq!(
            parse("%(-3,)C").unwrap(),
            vec![DirectiveNode::SliceRef {
                begin: Some(-3),
                end: None
            }]
        );
    }

    #[test]
    fn parses_token_variants() {
        assert_eq!(
            parse("%(-=2)U").unwrap(),
            vec![DirectiveNode::TokenRef {
                delimiter: "-".to_string(),
                index: 2,
                case: TokenCase::Upper,
            }]
        );
        // Multi-character delimiter that contains the separator itself
        assert_eq!(
            parse("%(a=b=10)L").unwrap(),
            vec![DirectiveNode::TokenRef {
                delimiter: "a=b".to_string(),
                index: 10,
                case: TokenCase::Lower,
            }]
        );
    }

    #[test]
    fn time_pattern_keeps_percent_signs() {
        assert_eq!(
            parse("%(%Y%m%d)M_%B").unwrap(),
            vec![
                DirectiveNode::TimeRef {
                    pattern: "%Y%m%d".to_string()
                },
                DirectiveNode::Literal("_".to_string()),
                DirectiveNode::BasenameRef,
            ]
        );
    }

    #[test]
    fn literal_runs_are_split_around_directives() {
        assert_eq!(
            parse("a%Bb").unwrap(),
            vec![
                DirectiveNode::Literal("a".to_string()),
                DirectiveNode::BasenameRef,
                DirectiveNode::Literal("b".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_trailing_percent() {
        let error = parse("name%").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::TrailingPercent);
        assert_eq!(error.position, 4);
        assert_eq!(error.fragment, "%");
    }

    #[test]
    fn rejects_unknown_directive() {
        let error = parse("%B%Q.txt").unwrap_err();
        assert_eq!(error.kind, ParseErrorKind::UnknownDirective('Q'));
        assert_eq!(error.position, 2);
        assert_eq!(error.fragment, "%Q");
    }

    #[test]
    fn rejects_unbalanced_parentheses() {
        assert_eq!(kind_of("%(1,2C"), ParseErrorKind::UnclosedArguments);
        assert_eq!(kind_of("%(1,2)"), ParseErrorKind::MissingDirective);
    }

    #[test]
    fn rejects_malformed_slice() {
        assert_eq!(kind_of("%(12)C"), ParseErrorKind::MissingComma);
        assert_eq!(
            kind_of("%(a,2)C"),
            ParseErrorKind::InvalidBound("a".to_string())
        );
        assert_eq!(
            kind_of("%(1,-)C"),
            ParseErrorKind::InvalidBound("-".to_string())
        );
        assert_eq!(
            kind_of("%(+1,)C"),
            ParseErrorKind::InvalidBound("+1".to_string())
        );
    }

    #[test]
    fn rejects_malformed_token() {
        assert_eq!(kind_of("%(-2)T"), ParseErrorKind::MissingEquals);
        assert_eq!(kind_of("%(=2)T"), ParseErrorKind::EmptyDelimiter);
        assert_eq!(
            kind_of("%(-=x)T"),
            ParseErrorKind::InvalidFieldIndex("x".to_string())
        );
        assert_eq!(
            kind_of("%(-=-1)T"),
            ParseErrorKind::InvalidFieldIndex("-1".to_string())
        );
        assert_eq!(kind_of("%(-=0)U"), ParseErrorKind::ZeroFieldIndex);
    }

    #[test]
    fn rejects_argument_mismatches() {
        assert_eq!(kind_of("%C"), ParseErrorKind::MissingArguments('C'));
        assert_eq!(kind_of("%M"), ParseErrorKind::MissingArguments('M'));
        assert_eq!(kind_of("%()M"), ParseErrorKind::EmptyTimeFormat);
        assert_eq!(kind_of("%(x)B"), ParseErrorKind::UnexpectedArguments('B'));
    }

    #[test]
    fn error_fragment_covers_argument_list() {
        let error = parse("x%(a,b)C").unwrap_err();
        assert_eq!(error.position, 1);
        assert_eq!(error.fragment, "%(a,b)C");
    }

    #[test]
    fn handles_multibyte_text() {
        assert_eq!(
            parse("é%Bü").unwrap(),
            vec![
                DirectiveNode::Literal("é".to_string()),
                DirectiveNode::BasenameRef,
                DirectiveNode::Literal("ü".to_string()),
            ]
        );
        assert_eq!(kind_of("%ß"), ParseErrorKind::UnknownDirective('ß'));
    }
}
