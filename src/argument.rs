/*!
The immutable argument descriptor: one flag or positional, its spellings,
and its matching rules. Arguments are constructed from an [`ArgumentSpec`]
and never change after they're attached to a parser.
*/

use std::{cell::RefCell, fmt, rc::Rc};

use crate::{Category, errors::InvalidArgumentParams};

/**
A matched-argument callback. Handlers are invoked as
`handler(spelling, value)`, where `spelling` is the declared name the
argument was matched under (for a positional, the matched word itself) and
`value` is the raw text of the value, or the empty string for arguments
that don't want one.

Handlers are side-effect only and must not fail; anything fallible belongs
after the parse. Parsing takes the tree by `&self`, so handlers that store
results do so through shared interior mutability (see [`store_string`]).
*/
pub type Handler = Box<dyn Fn(&str, &str)>;

/// Store the matched value into an `Rc<RefCell<Option<String>>>` slot.
pub fn store_string(slot: &Rc<RefCell<Option<String>>>) -> Handler {
    let slot = Rc::clone(slot);
    Box::new(move |_spelling, value| {
        *slot.borrow_mut() = Some(value.to_owned());
    })
}

/// Store a fixed value into a slot whenever the argument matches. Usually
/// used through [`store_true`] and [`store_false`].
pub fn store_value<T: Clone + 'static>(slot: &Rc<RefCell<Option<T>>>, value: T) -> Handler {
    let slot = Rc::clone(slot);
    Box::new(move |_spelling, _value| {
        *slot.borrow_mut() = Some(value.clone());
    })
}

/// Store `true` into a slot whenever the argument matches.
pub fn store_true(slot: &Rc<RefCell<Option<bool>>>) -> Handler {
    store_value(slot, true)
}

/// Store `false` into a slot whenever the argument matches.
pub fn store_false(slot: &Rc<RefCell<Option<bool>>>) -> Handler {
    store_value(slot, false)
}

/**
A stable, comparable handle identifying one [`Argument`] for the lifetime
of its parser tree. Ids are sequence numbers assigned at attachment and are
used as set keys (repetition and requiredness tracking), never for display.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArgumentId(pub(crate) u64);

/**
The parameters for a new argument. Only `names` is mandatory; everything
else has a useful default, so specs are usually written with struct update
syntax over [`ArgumentSpec::named`]:

```
use polemic::ArgumentSpec;

let spec = ArgumentSpec {
    wants_value: false,
    ..ArgumentSpec::named(["--verbose", "-v"])
};
```
*/
pub struct ArgumentSpec {
    /**
    The spellings of this argument, in order of preference. Exactly one of
    two shapes is valid: a single name that doesn't start with a dash
    (a positional), or any number of `-`/`--` prefixed names (a flag).
    */
    pub names: Vec<String>,

    /// Called on every successful match. `None` means the match is
    /// recorded but otherwise ignored.
    pub handler: Option<Handler>,

    /// Whether the argument may appear more than once.
    pub can_repeat: bool,

    /// Whether the argument must appear. When unset, positionals default
    /// to required and flags to optional.
    pub required: Option<bool>,

    /// Whether the argument takes a value. Defaults to true.
    pub wants_value: bool,

    /// Display name for the value in help output, overriding the derived
    /// `<name>` placeholder.
    pub metavar: Option<String>,

    /// Free-form help text. Reflowed to fit the help layout.
    pub help: Option<String>,

    /// Which help tier this argument appears in.
    pub category: Category,
}

impl Default for ArgumentSpec {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            handler: None,
            can_repeat: false,
            required: None,
            wants_value: true,
            metavar: None,
            help: None,
            category: Category::General,
        }
    }
}

impl ArgumentSpec {
    /// A default spec with the given names.
    pub fn named<I>(names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

fn is_positional_word(name: &str) -> bool {
    !name.starts_with('-')
}

/// Split a word at its first `=`, if any: `--foo=bar` becomes
/// `("--foo", Some("bar"))` and `--foo` becomes `("--foo", None)`.
pub(crate) fn split_value(word: &str) -> (&str, Option<&str>) {
    match memchr::memchr(b'=', word.as_bytes()) {
        Some(i) => (&word[..i], Some(&word[i + 1..])),
        None => (word, None),
    }
}

/**
A single flag or positional attached to a parser node. Created through
[`ArgumentParser::add_argument`][crate::ArgumentParser::add_argument];
immutable from then on.
*/
pub struct Argument {
    id: ArgumentId,
    names: Vec<String>,
    handler: Option<Handler>,
    can_repeat: bool,
    required: bool,
    wants_value: bool,
    metavar: Option<String>,
    help: Option<String>,
    category: Category,
    positional: bool,
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("id", &self.id)
            .field("names", &self.names)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .field("can_repeat", &self.can_repeat)
            .field("required", &self.required)
            .field("wants_value", &self.wants_value)
            .field("metavar", &self.metavar)
            .field("help", &self.help)
            .field("category", &self.category)
            .field("positional", &self.positional)
            .finish()
    }
}

impl Argument {
    pub(crate) fn new(id: ArgumentId, spec: ArgumentSpec) -> Result<Self, InvalidArgumentParams> {
        let positional = match spec.names.as_slice() {
            [] => return Err(InvalidArgumentParams::new("names must be non-empty")),
            [single] => is_positional_word(single),
            names => {
                if names.iter().any(|name| is_positional_word(name)) {
                    return Err(InvalidArgumentParams::new(
                        "names must all be flag spellings, or a single positional name",
                    ));
                }
                false
            }
        };

        let required = spec.required.unwrap_or(positional);

        Ok(Self {
            id,
            names: spec.names,
            handler: spec.handler,
            can_repeat: spec.can_repeat,
            required,
            wants_value: spec.wants_value,
            metavar: spec.metavar,
            help: spec.help,
            category: spec.category,
            positional,
        })
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ArgumentId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn is_positional(&self) -> bool {
        self.positional
    }

    #[inline]
    #[must_use]
    pub fn can_repeat(&self) -> bool {
        self.can_repeat
    }

    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[inline]
    #[must_use]
    pub fn wants_value(&self) -> bool {
        self.wants_value
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    /// The first declared name; the spelling used in diagnostics.
    #[inline]
    #[must_use]
    pub fn preferred_name(&self) -> &str {
        &self.names[0]
    }

    pub(crate) fn names(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub(crate) fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /**
    Match a long-flag word against this argument's declared names. A word
    matches if it equals a declared name exactly, or begins with a declared
    name immediately followed by `=`. Returns the matched declared name.
    */
    #[must_use]
    pub fn match_long(&self, word: &str) -> Option<&str> {
        let (head, _value) = split_value(word);
        self.names().find(|&name| name == head)
    }

    /**
    Match the leading letters of a short cluster (the token with its `-`
    already stripped) against this argument's single-dash names. Returns
    the matched letters, sans dash, when one of those names is a prefix of
    `letters`.
    */
    #[must_use]
    pub fn match_short(&self, letters: &str) -> Option<&str> {
        self.names()
            .filter(|name| name.len() >= 2 && name.starts_with('-') && !name.starts_with("--"))
            .map(|name| &name[1..])
            .find(|&short| letters.starts_with(short))
    }

    /// Invoke this argument's handler, if it has one. Side-effect only.
    pub fn handle(&self, spelling: &str, value: &str) {
        if let Some(handler) = &self.handler {
            handler(spelling, value);
        }
    }

    /// The placeholder used for this argument's value in help output.
    #[must_use]
    pub fn value_name(&self) -> String {
        if let Some(metavar) = &self.metavar {
            return metavar.clone();
        }
        let preferred = self.preferred_name();
        if self.positional {
            format!("<{preferred}>")
        } else if let Some(stripped) = preferred.strip_prefix("--") {
            format!("<{stripped}>")
        } else {
            "<value>".to_owned()
        }
    }

    /// The one-line synopsis fragment for this argument, as it appears in
    /// a usage string.
    #[must_use]
    pub fn syntax_string(&self) -> String {
        let value = self.value_name();
        if self.positional {
            match (self.required, self.can_repeat) {
                (true, false) => value,
                (true, true) => format!("{value} [{value} [...]]"),
                (false, false) => format!("[{value}]"),
                (false, true) => format!("[{value} [{value} [...]]]"),
            }
        } else if self.wants_value {
            let name = self.preferred_name();
            let sep = if name.starts_with("--") { '=' } else { ' ' };
            match (self.required, self.can_repeat) {
                (true, false) => format!("{name}{sep}{value}"),
                (true, true) => format!("{name}{sep}{value} [{name}{sep}{value} [...]]"),
                (false, false) => format!("[{name}{sep}{value}]"),
                (false, true) => format!("[{name}{sep}{value} [{name}{sep}{value} [...]]]"),
            }
        } else {
            format!("[{}]", self.preferred_name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argument(spec: ArgumentSpec) -> Result<Argument, InvalidArgumentParams> {
        Argument::new(ArgumentId(0), spec)
    }

    #[test]
    fn positional_name() {
        let arg = argument(ArgumentSpec::named(["foo"])).unwrap();
        assert!(arg.is_positional());
        assert!(arg.is_required());
        assert_eq!(arg.preferred_name(), "foo");
    }

    #[test]
    fn positional_required_override() {
        let arg = argument(ArgumentSpec {
            required: Some(false),
            ..ArgumentSpec::named(["foo"])
        })
        .unwrap();
        assert!(arg.is_positional());
        assert!(!arg.is_required());
    }

    #[test]
    fn flag_defaults() {
        let arg = argument(ArgumentSpec::named(["--foo", "-F"])).unwrap();
        assert!(!arg.is_positional());
        assert!(!arg.is_required());
        assert!(arg.wants_value());
        assert!(!arg.can_repeat());
    }

    #[test]
    fn rejects_multiple_positional_spellings() {
        let error = argument(ArgumentSpec::named(["foo", "bar"])).unwrap_err();
        assert_eq!(
            error.message(),
            "names must all be flag spellings, or a single positional name"
        );
    }

    #[test]
    fn rejects_mixed_positional_and_long() {
        assert!(argument(ArgumentSpec::named(["positional", "--flags"])).is_err());
    }

    #[test]
    fn rejects_mixed_positional_and_short() {
        assert!(argument(ArgumentSpec::named(["positional", "-Short"])).is_err());
    }

    #[test]
    fn rejects_empty_names() {
        let error = argument(ArgumentSpec::default()).unwrap_err();
        assert_eq!(error.message(), "names must be non-empty");
    }

    #[test]
    fn long_match_is_exact_or_equals() {
        let arg = argument(ArgumentSpec::named(["--foo", "-F"])).unwrap();
        assert_eq!(arg.match_long("--foo"), Some("--foo"));
        assert_eq!(arg.match_long("--foo=bar"), Some("--foo"));
        assert_eq!(arg.match_long("--foo="), Some("--foo"));
        assert_eq!(arg.match_long("--foo-with-extra"), None);
        assert_eq!(arg.match_long("--fo"), None);
    }

    #[test]
    fn short_match_is_prefix() {
        let arg = argument(ArgumentSpec::named(["--other", "-O"])).unwrap();
        assert_eq!(arg.match_short("O"), Some("O"));
        assert_eq!(arg.match_short("Omeow"), Some("O"));
        assert_eq!(arg.match_short("B"), None);

        let multi = argument(ArgumentSpec::named(["--no-bar", "-nb"])).unwrap();
        assert_eq!(multi.match_short("nb"), Some("nb"));
        assert_eq!(multi.match_short("n"), None);
    }

    #[test]
    fn long_names_never_match_short() {
        let arg = argument(ArgumentSpec::named(["--foo"])).unwrap();
        assert_eq!(arg.match_short("foo"), None);
    }

    #[test]
    fn split_value_at_first_equals() {
        assert_eq!(split_value("--foo=bar"), ("--foo", Some("bar")));
        assert_eq!(split_value("--foo="), ("--foo", Some("")));
        assert_eq!(split_value("--foo=a=b"), ("--foo", Some("a=b")));
        assert_eq!(split_value("--foo"), ("--foo", None));
    }
}
