/*!
A declarative, handler-driven command line arguments parsing library.
polemic is a more sensible way to handle (command-line) arguments.

Unlike derive-based parsers, polemic builds its model at runtime: you
describe a tree of parsers, each owning a set of arguments and (optionally)
a group of named subcommands, and every matched argument is delivered to a
handler closure as raw text. The parse itself is a single synchronous walk
over the token list; there is no type coercion and no I/O.

```
use polemic::{ArgumentParser, ArgumentSpec, store_string};
use std::{cell::RefCell, rc::Rc};

let mut parser = ArgumentParser::new(Default::default());
let root = parser.root();

let path = Rc::new(RefCell::new(None));
parser
    .add_argument(
        root,
        ArgumentSpec {
            handler: Some(store_string(&path)),
            ..ArgumentSpec::named(["--path", "-P"])
        },
    )
    .unwrap();

parser.parse_args(["--path=somewhere"]).unwrap();
assert_eq!(path.borrow().as_deref(), Some("somewhere"));
```

Errors are structured values: construction misuse is reported as
[`InvalidArgumentParams`][errors::InvalidArgumentParams], while anything
that goes wrong during a parse is a [`ParseError`][errors::ParseError]
carrying the offending token, parser, and argument. A help trigger found
among the remaining tokens surfaces as
[`ErrorKind::HelpRequested`][errors::ErrorKind], which the [`help`] module
can render into a usage message.
*/

pub mod argument;
pub mod errors;
pub mod help;
pub mod parser;
mod state;

pub use argument::{
    Argument, ArgumentId, ArgumentSpec, Handler, store_false, store_string, store_true,
    store_value,
};
pub use errors::{ErrorKind, InvalidArgumentParams, ParseError};
pub use parser::{
    ArgumentParser, ParserRef, ParserSpec, SubparserGroupSpec, SubparserRef, SubparserSpec,
};

/**
The display/visibility tier of an argument or subcommand. Categories are
ordered: a help request for a given category shows everything at or below
it, so `General` help omits `Advanced` and `Debugging` items. `Hidden`
sorts above every requestable category and is never shown.

Categories are orthogonal to parsing: a hidden argument still matches.
*/
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    #[default]
    General,
    Advanced,
    Debugging,
    Hidden,
}
