use std::{cell::RefCell, env, process::ExitCode, rc::Rc};

use lazy_format::lazy_format;
use polemic::{
    ArgumentParser, ArgumentSpec, Category, ErrorKind, ParserSpec, SubparserGroupSpec,
    SubparserSpec, store_string, store_true,
};

/// The values collected from the command line. Handlers store into these
/// slots as arguments are matched.
#[derive(Default)]
struct Invocation {
    first: Rc<RefCell<Option<String>>>,
    flag: Rc<RefCell<Option<String>>>,
    advanced: Rc<RefCell<Option<bool>>>,
    subcommand: Rc<RefCell<Option<String>>>,
    message: Rc<RefCell<Option<String>>>,
}

fn build_parser(slots: &Invocation) -> anyhow::Result<ArgumentParser> {
    let mut parser = ArgumentParser::new(ParserSpec {
        prog: Some("polemic-demo".to_owned()),
        description: Some(
            "This is a simple example program that displays some of the \
             capabilities of the polemic library.

             This text is the \"description\" for the top-level example."
                .to_owned(),
        ),
        epilog: Some(
            "This is the epilog text. It appears at the bottom of help \
             messages of the associated command that saw the help request."
                .to_owned(),
        ),
    });
    let root = parser.root();

    parser.add_argument(
        root,
        ArgumentSpec {
            handler: Some(store_string(&slots.first)),
            help: Some("Set the first positional argument (required)".to_owned()),
            ..ArgumentSpec::named(["first"])
        },
    )?;
    parser.add_argument(
        root,
        ArgumentSpec {
            handler: Some(store_string(&slots.flag)),
            required: Some(true),
            help: Some("Specify the flag value with this option".to_owned()),
            ..ArgumentSpec::named(["--flag", "-f"])
        },
    )?;
    parser.add_argument(
        root,
        ArgumentSpec {
            handler: Some(store_true(&slots.advanced)),
            wants_value: false,
            category: Category::Advanced,
            help: Some("Enable advanced features (advanced)".to_owned()),
            ..ArgumentSpec::named(["--enable-advanced-features", "-E!"])
        },
    )?;

    let subcommands = parser.add_subparsers(
        root,
        SubparserGroupSpec {
            handler: Some(store_string(&slots.subcommand)),
            description: Some("Specify the subcommand to execute".to_owned()),
            required: Some(true),
            ..SubparserGroupSpec::default()
        },
    )?;
    let echo = parser.add_parser(
        subcommands,
        SubparserSpec {
            description: Some(
                "Print a message\n\n(This doesn't do anything, it's just an example.)".to_owned(),
            ),
            ..SubparserSpec::named("echo")
        },
    )?;
    parser.add_argument(
        echo,
        ArgumentSpec {
            handler: Some(store_string(&slots.message)),
            required: Some(true),
            help: Some(
                "The message to pass to the echo program. This message string \
                 is required. This is a help paragraph. It should automatically \
                 be reflowed to fit within 79 columns."
                    .to_owned(),
            ),
            ..ArgumentSpec::named(["message"])
        },
    )?;

    Ok(parser)
}

fn main() -> ExitCode {
    let slots = Invocation::default();
    let parser = match build_parser(&slots) {
        Ok(parser) => parser,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    let progname = env::args()
        .next()
        .unwrap_or_else(|| "polemic-demo".to_owned());

    match parser.parse_from_env() {
        Ok(()) => {
            if slots.subcommand.borrow().as_deref() == Some("echo")
                && let Some(message) = slots.message.borrow().as_deref()
            {
                println!("{message}");
            }
            ExitCode::SUCCESS
        }
        Err(error) => match error.help_request() {
            // A help trigger isn't a failure: render the help text for the
            // parser that was active and exit cleanly
            Some(category) => {
                eprint!("{}", parser.help_string_as(error.parser, category, &progname));
                ExitCode::SUCCESS
            }
            None => {
                eprintln!(
                    "Usage: {}",
                    parser.usage_string_as(error.parser, Category::General, &progname)
                );
                let message = lazy_format!(match (&error.kind) {
                    ErrorKind::MissingArgument { name } =>
                        ("Missing required argument '{name}'"),
                    other => ("{other}"),
                });
                eprintln!("{message}");
                ExitCode::FAILURE
            }
        },
    }
}
