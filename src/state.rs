/*!
The per-invocation parsing session: a chain of active parser nodes and the
token-consumption loop.

Each call to [`ArgumentParser::parse_args`][crate::ArgumentParser] builds
one [`ParsingState`], walks the token list to exhaustion (classifying every
leading token as a long flag, a short cluster, or a positional/subcommand
word, and advancing by however many tokens that path consumed), then runs a
finalization pass over the whole chain for required arguments and a
required subcommand. The only state carried across tokens is the chain
(which grows when a subcommand is matched, and never shrinks) and the set
of already-seen argument ids.
*/

use std::collections::BTreeSet;

use crate::{
    Category,
    argument::{Argument, ArgumentId, split_value},
    errors::{ErrorKind, ParseError},
    parser::{ArgumentParser, ParserRef},
};

/// The words that trigger a help request, and the category of help each
/// one asks for. Checked inside every failure branch, not up front, so
/// that a help trigger anywhere in the remaining input takes priority over
/// the error that would otherwise be raised.
const HELP_TRIGGERS: &[(&str, Category)] = &[
    ("--help", Category::General),
    ("-help", Category::General),
    ("-h", Category::General),
    ("-?", Category::General),
    ("--help-adv", Category::Advanced),
    ("--help-advanced", Category::Advanced),
    ("--help-dbg", Category::Debugging),
    ("--help-debug", Category::Debugging),
    ("--help-all", Category::Debugging),
];

pub(crate) struct ParsingState<'p> {
    tree: &'p ArgumentParser,

    /// Active parser nodes, outermost first. Starts as just the node the
    /// parse was rooted at; grows when a subcommand word is matched.
    chain: Vec<ParserRef>,

    /// Every argument matched so far in this call. Rejects illegal
    /// repetition during the walk and drives the required check at the
    /// end.
    seen: BTreeSet<ArgumentId>,
}

impl<'p> ParsingState<'p> {
    pub(crate) fn new(tree: &'p ArgumentParser, start: ParserRef) -> Self {
        Self {
            tree,
            chain: vec![start],
            seen: BTreeSet::new(),
        }
    }

    pub(crate) fn parse_args(mut self, args: &[String]) -> Result<(), ParseError> {
        let mut remaining = args;
        while !remaining.is_empty() {
            let consumed = self.parse_more(remaining)?;
            remaining = &remaining[consumed..];
        }
        self.finalize()
    }

    /// Handle the leading token of `remaining`, returning how many tokens
    /// were consumed.
    fn parse_more(&mut self, remaining: &[String]) -> Result<usize, ParseError> {
        let current = remaining[0].as_str();
        if current.starts_with("--") {
            self.parse_long(current, remaining)
        } else if current.starts_with('-') && current != "-" {
            self.parse_shorts(current, remaining)
        } else {
            self.parse_positional(current, remaining)
        }
    }

    fn innermost(&self) -> ParserRef {
        debug_assert!(!self.chain.is_empty());
        self.chain.last().copied().unwrap_or(ParserRef::ROOT)
    }

    fn err(&self, kind: ErrorKind, word: &str) -> ParseError {
        ParseError {
            kind,
            word: Some(word.to_owned()),
            parser: self.innermost(),
            argument: None,
        }
    }

    fn arg_err(&self, kind: ErrorKind, word: &str, argument: &Argument) -> ParseError {
        ParseError {
            kind,
            word: Some(word.to_owned()),
            parser: self.innermost(),
            argument: Some(argument.id()),
        }
    }

    /// Scan the remaining tokens for a help trigger, surfacing
    /// `HelpRequested` instead of whatever error the caller was about to
    /// raise.
    fn check_help(&self, remaining: &[String]) -> Result<(), ParseError> {
        for word in remaining {
            if let Some(&(_, category)) = HELP_TRIGGERS
                .iter()
                .find(|&&(trigger, _)| trigger == word.as_str())
            {
                return Err(self.err(ErrorKind::HelpRequested { category }, word));
            }
        }
        Ok(())
    }

    /// Flag candidates are scanned innermost-node first, newest argument
    /// first, so a subcommand's own flag shadows an ancestor's.
    fn find_long(&self, given: &str) -> Option<(&'p Argument, &'p str)> {
        let tree = self.tree;
        self.chain.iter().rev().find_map(|&node| {
            tree.arguments_of(node)
                .iter()
                .rev()
                .find_map(|argument| argument.match_long(given).map(|name| (argument, name)))
        })
    }

    fn find_short(&self, letters: &str) -> Option<(&'p Argument, &'p str)> {
        let tree = self.tree;
        self.chain.iter().rev().find_map(|&node| {
            tree.arguments_of(node)
                .iter()
                .rev()
                .find_map(|argument| argument.match_short(letters).map(|short| (argument, short)))
        })
    }

    /// Positional slots fill oldest-first: forward chain order, and only
    /// arguments that haven't matched yet are eligible.
    fn first_open_positional(&self) -> Option<&'p Argument> {
        let tree = self.tree;
        self.chain.iter().find_map(|&node| {
            tree.arguments_of(node)
                .iter()
                .find(|argument| argument.is_positional() && !self.seen.contains(&argument.id()))
        })
    }

    fn parse_long(&mut self, given: &str, remaining: &[String]) -> Result<usize, ParseError> {
        match self.find_long(given) {
            Some((argument, name)) => self.handle_long(given, name, argument, remaining),
            None => {
                self.check_help(remaining)?;
                Err(self.err(
                    ErrorKind::UnknownArgument {
                        token: given.to_owned(),
                    },
                    given,
                ))
            }
        }
    }

    fn handle_long(
        &mut self,
        given: &str,
        name: &str,
        argument: &Argument,
        remaining: &[String],
    ) -> Result<usize, ParseError> {
        if self.seen.contains(&argument.id()) && !argument.can_repeat() {
            self.check_help(remaining)?;
            return Err(self.arg_err(
                ErrorKind::InvalidArgumentRepetition {
                    spelling: name.to_owned(),
                },
                given,
                argument,
            ));
        }
        self.seen.insert(argument.id());

        let (_, value) = split_value(given);
        match value {
            // `--flag`: a valueless flag consumes just itself
            None if !argument.wants_value() => {
                argument.handle(name, "");
                Ok(1)
            }
            // `--flag value`: the next token is the value
            None => match remaining.get(1) {
                Some(value) => {
                    argument.handle(name, value);
                    Ok(2)
                }
                None => {
                    self.check_help(remaining)?;
                    Err(self.arg_err(
                        ErrorKind::MissingArgumentValue {
                            spelling: name.to_owned(),
                        },
                        given,
                        argument,
                    ))
                }
            },
            // `--flag=value` against a flag that takes no value
            Some(value) if !argument.wants_value() => {
                self.check_help(remaining)?;
                Err(self.arg_err(
                    ErrorKind::InvalidArgumentValue {
                        text: value.to_owned(),
                    },
                    given,
                    argument,
                ))
            }
            // `--flag=value`, including the empty `--flag=`
            Some(value) => {
                argument.handle(name, value);
                Ok(1)
            }
        }
    }

    /**
    Walk a short cluster: repeatedly match a visible argument's single-dash
    spelling as a prefix of the remaining letters. Valueless flags keep
    draining the same token; a value-wanting flag ends the cluster, taking
    either the rest of the token or the next token as its value.
    */
    fn parse_shorts(&mut self, token: &str, remaining: &[String]) -> Result<usize, ParseError> {
        let mut letters = &token[1..];
        while !letters.is_empty() {
            let Some((argument, short)) = self.find_short(letters) else {
                self.check_help(remaining)?;
                return Err(self.err(
                    ErrorKind::UnknownArgument {
                        token: format!("-{letters}"),
                    },
                    token,
                ));
            };

            let spelling = format!("-{short}");
            if self.seen.contains(&argument.id()) && !argument.can_repeat() {
                self.check_help(remaining)?;
                return Err(self.arg_err(
                    ErrorKind::InvalidArgumentRepetition { spelling },
                    token,
                    argument,
                ));
            }
            self.seen.insert(argument.id());

            let rest = &letters[short.len()..];
            if argument.wants_value() {
                return if rest.is_empty() {
                    match remaining.get(1) {
                        Some(value) => {
                            argument.handle(&spelling, value);
                            Ok(2)
                        }
                        None => {
                            self.check_help(remaining)?;
                            Err(self.arg_err(
                                ErrorKind::MissingArgumentValue { spelling },
                                token,
                                argument,
                            ))
                        }
                    }
                } else {
                    // The rest of the token is the attached value
                    argument.handle(&spelling, rest);
                    Ok(1)
                };
            }

            argument.handle(&spelling, "");
            letters = rest;
        }
        // The whole cluster drained via valueless flags
        Ok(1)
    }

    fn parse_positional(&mut self, given: &str, remaining: &[String]) -> Result<usize, ParseError> {
        if let Some(argument) = self.first_open_positional() {
            self.seen.insert(argument.id());
            argument.handle(given, given);
            return Ok(1);
        }

        // No open positional slot; maybe a subcommand of the innermost
        // parser. A matched subcommand permanently extends the chain: a
        // later token can't re-select a sibling or return to this group.
        let tail = self.innermost();
        match self.tree.group_of(tail) {
            Some(group) => match group.lookup(given) {
                Some(child) => {
                    group.dispatch(given);
                    self.chain.push(child);
                    Ok(1)
                }
                None => {
                    self.check_help(remaining)?;
                    Err(self.err(
                        ErrorKind::InvalidArgumentValue {
                            text: given.to_owned(),
                        },
                        given,
                    ))
                }
            },
            None => {
                self.check_help(remaining)?;
                Err(self.err(
                    ErrorKind::UnknownArgument {
                        token: given.to_owned(),
                    },
                    given,
                ))
            }
        }
    }

    /**
    Post-exhaustion checks. Required arguments are verified across the
    entire chain first (outermost node's arguments before any child's, in
    declaration order, so the reported violation is deterministic); a
    required subparser group on the innermost node is a separate,
    second-priority check.
    */
    fn finalize(&self) -> Result<(), ParseError> {
        for &node in &self.chain {
            for argument in self.tree.arguments_of(node) {
                if argument.is_required() && !self.seen.contains(&argument.id()) {
                    return Err(ParseError {
                        kind: ErrorKind::MissingArgument {
                            name: argument.preferred_name().to_owned(),
                        },
                        word: None,
                        parser: node,
                        argument: Some(argument.id()),
                    });
                }
            }
        }

        let tail = self.innermost();
        if let Some(group) = self.tree.group_of(tail)
            && group.is_required()
        {
            return Err(ParseError {
                kind: ErrorKind::MissingArgument {
                    name: group.title().to_owned(),
                },
                word: None,
                parser: tail,
                argument: None,
            });
        }

        Ok(())
    }
}
