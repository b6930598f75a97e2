/*!
Usage and help rendering. This layer only consumes the parsed model: it
walks the same tree the matching engine does, filtered by [`Category`],
and produces text. Nothing here is invoked during parsing.
*/

use core::fmt::{self, Write};

use indent_write::fmt::IndentWriter;
use joinery::JoinableIterator;
use lazy_format::lazy_format;
use textwrap::Options;

use crate::{
    Category,
    argument::Argument,
    parser::{ArgumentParser, ParserRef},
};

const COLUMN_LIMIT: usize = 79;

/// Reflow free-form text into indented paragraphs. Leading/trailing
/// whitespace on each line is discarded; a blank line separates
/// paragraphs.
fn reflow(text: &str, indent: &str, width: usize) -> String {
    fn flush(out: &mut String, paragraph: &mut String, options: &Options) {
        if paragraph.is_empty() {
            return;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&textwrap::fill(paragraph, options.clone()));
        paragraph.clear();
    }

    let options = Options::new(width)
        .initial_indent(indent)
        .subsequent_indent(indent);

    let mut out = String::new();
    let mut paragraph = String::new();
    for line in text.trim().lines().map(str::trim) {
        if line.is_empty() {
            flush(&mut out, &mut paragraph, &options);
        } else {
            if !paragraph.is_empty() {
                paragraph.push(' ');
            }
            paragraph.push_str(line);
        }
    }
    flush(&mut out, &mut paragraph, &options);
    out
}

/// The multi-line help block for one argument: its spellings (with value
/// placeholders), then its reflowed help text.
fn write_argument_help(out: &mut impl Write, argument: &Argument) -> fmt::Result {
    let value = argument.value_name();
    if argument.is_positional() {
        writeln!(out, "{value}")?;
    } else {
        for name in argument.names() {
            let value = &value;
            let spelling = lazy_format!(match ((argument.wants_value(), name.starts_with("--"))) {
                (false, _) => ("{name}"),
                (true, true) => ("{name}={value}"),
                (true, false) => ("{name} {value}"),
            });
            writeln!(out, "{spelling}")?;
        }
    }
    if let Some(help) = argument.help_text() {
        let help = reflow(help, "   ", COLUMN_LIMIT);
        writeln!(out, " ➥ {}", help.trim())?;
    }
    Ok(())
}

impl ArgumentParser {
    /**
    The argument portion of a usage line for one node: the syntax of every
    visible argument, followed by the `{a,b,c}` subcommand set when the
    node has one (bracketed when the group isn't required).
    */
    #[must_use]
    pub fn arg_usage_string(&self, node: ParserRef, max: Category) -> String {
        let syntaxes: Vec<String> = self
            .visible_arguments(node, max)
            .map(|argument| argument.syntax_string())
            .collect();
        let mut ret = syntaxes.join(" ");

        if let Some(group) = self.group_of(node) {
            let names: Vec<&str> = self
                .visible_subcommands(node, max)
                .map(|(name, _)| name)
                .collect();
            let names = names.iter().join_with(",");
            if !ret.is_empty() {
                ret.push(' ');
            }
            let subcommands = lazy_format!(
                if group.is_required() => ("{{{names}}}")
                else => ("[{{{names}}}]")
            );
            ret.push_str(&subcommands.to_string());
        }
        ret
    }

    /// A full usage line for `node`, using the node's configured program
    /// name.
    #[must_use]
    pub fn usage_string(&self, node: ParserRef, max: Category) -> String {
        let prog = self.spec_of(node).prog.clone();
        self.usage_string_as(node, max, prog.as_deref().unwrap_or("<program>"))
    }

    /**
    A full usage line for `node` under the given program name: the
    subcommand path from the root (with required arguments of intermediate
    nodes spliced in), then the node's own argument syntax.
    */
    #[must_use]
    pub fn usage_string_as(&self, node: ParserRef, max: Category, progname: &str) -> String {
        let mut suffix = String::new();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            for argument in self.visible_arguments(current, max) {
                if argument.is_required() && current != node {
                    suffix = format!(" {}{}", argument.syntax_string(), suffix);
                }
            }
            let name = self.name_of(current);
            if !name.is_empty() {
                suffix = format!(" {name}{suffix}");
            }
            cursor = self.parent_of(current);
        }

        let mut ret = format!("{progname}{suffix}");
        // A long command path pushes the arguments onto their own line
        if ret.len() + 1 > 50 {
            ret.push('\n');
            ret.push_str(&" ".repeat(10));
        }
        let args = self.arg_usage_string(node, max);
        if !args.is_empty() {
            ret.push(' ');
            ret.push_str(&args);
        }
        ret
    }

    /// The complete help text for `node`, using the node's configured
    /// program name.
    #[must_use]
    pub fn help_string(&self, node: ParserRef, max: Category) -> String {
        let prog = self.spec_of(node).prog.clone();
        self.help_string_as(node, max, prog.as_deref().unwrap_or("<program>"))
    }

    /// The complete help text for `node`: usage, description, required
    /// and optional argument sections, subcommand listing, help-trigger
    /// hints, and epilog.
    #[must_use]
    pub fn help_string_as(&self, node: ParserRef, max: Category, progname: &str) -> String {
        let mut out = String::new();
        // Writing into a String never fails
        let _ = self.write_help(&mut out, node, max, progname);
        out
    }

    fn write_help(
        &self,
        out: &mut String,
        node: ParserRef,
        max: Category,
        progname: &str,
    ) -> fmt::Result {
        writeln!(out, "Usage: {}", self.usage_string_as(node, max, progname))?;
        writeln!(out)?;

        if let Some(description) = &self.spec_of(node).description {
            writeln!(out, "{}", reflow(description, "  ", COLUMN_LIMIT))?;
            writeln!(out)?;
        }

        self.write_argument_section(out, node, max, "Required arguments", true)?;
        self.write_argument_section(out, node, max, "Optional arguments", false)?;

        if let Some(group) = self.group_of(node) {
            writeln!(out, "{}:", group.title())?;
            if let Some(description) = group.description() {
                let mut indented = IndentWriter::new("  ", &mut *out);
                for line in description.trim().lines() {
                    writeln!(indented, "{}", line.trim())?;
                }
                writeln!(out)?;
            }
            for (name, child) in self.visible_subcommands(node, max) {
                write!(out, "• {name} {}", self.arg_usage_string(child, max))?;
                match &self.spec_of(child).description {
                    Some(description) => {
                        let description = reflow(description, "     ", COLUMN_LIMIT);
                        writeln!(out, "\n   ➥ {}", description.trim())?;
                    }
                    None => writeln!(out)?,
                }
            }
            writeln!(out)?;
        }

        let any_of = |category: Category| {
            self.arguments_of(node)
                .iter()
                .any(|argument| argument.category() == category)
                || self.group_of(node).is_some_and(|group| {
                    group
                        .entries()
                        .any(|(_, child)| self.category_of(child) == category)
                })
        };
        let any_advanced = any_of(Category::Advanced);
        let any_debugging = any_of(Category::Debugging);

        if any_advanced || any_debugging {
            writeln!(out, "Help options:")?;
            writeln!(out, "  --help / -h")?;
            writeln!(out, "    ➥ Get general help")?;
            writeln!(out)?;
            if any_advanced {
                writeln!(out, "  --help-adv")?;
                writeln!(out, "    ➥ Include advanced program options")?;
                writeln!(out)?;
            }
            if any_debugging {
                writeln!(out, "  --help-dbg")?;
                writeln!(out, "    ➥ Include debugging program options")?;
                writeln!(out)?;
            }
        }

        if let Some(epilog) = &self.spec_of(node).epilog {
            writeln!(out, "{}", reflow(epilog, "", COLUMN_LIMIT))?;
            writeln!(out)?;
        }
        Ok(())
    }

    fn write_argument_section(
        &self,
        out: &mut String,
        node: ParserRef,
        max: Category,
        header: &str,
        required: bool,
    ) -> fmt::Result {
        let mut any = false;
        for argument in self.visible_arguments(node, max) {
            if argument.is_required() != required {
                continue;
            }
            if !any {
                writeln!(out, "{header}:")?;
                any = true;
            }
            let mut indented = IndentWriter::new("  ", &mut *out);
            write_argument_help(&mut indented, argument)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArgumentSpec, ParserSpec, SubparserGroupSpec, SubparserSpec};

    fn example_parser() -> ArgumentParser {
        let mut parser = ArgumentParser::new(ParserSpec {
            prog: Some("example".to_owned()),
            description: Some("A small example program.".to_owned()),
            epilog: None,
        });
        let root = parser.root();
        parser
            .add_argument(root, ArgumentSpec::named(["input"]))
            .unwrap();
        parser
            .add_argument(
                root,
                ArgumentSpec {
                    required: Some(true),
                    ..ArgumentSpec::named(["--flag", "-f"])
                },
            )
            .unwrap();
        parser
            .add_argument(
                root,
                ArgumentSpec {
                    wants_value: false,
                    category: Category::Advanced,
                    ..ArgumentSpec::named(["--tune"])
                },
            )
            .unwrap();
        let group = parser
            .add_subparsers(
                root,
                SubparserGroupSpec {
                    required: Some(true),
                    ..SubparserGroupSpec::default()
                },
            )
            .unwrap();
        parser
            .add_parser(group, SubparserSpec::named("echo"))
            .unwrap();
        parser
            .add_parser(group, SubparserSpec::named("cat"))
            .unwrap();
        parser
    }

    #[test]
    fn reflow_wraps_and_preserves_paragraphs() {
        let text = "one two three\nfour\n\nsecond paragraph";
        let reflowed = reflow(text, "  ", 79);
        assert_eq!(reflowed, "  one two three four\n\n  second paragraph");
    }

    #[test]
    fn reflow_respects_column_limit() {
        let word = "word ".repeat(40);
        let reflowed = reflow(&word, "", 20);
        assert!(reflowed.lines().all(|line| line.len() <= 20));
    }

    #[test]
    fn usage_names_subcommand_set() {
        let parser = example_parser();
        let usage = parser.usage_string(parser.root(), Category::General);
        assert!(usage.starts_with("example"));
        assert!(usage.contains("--flag=<flag>"));
        assert!(usage.contains("{echo,cat}"));
        // Advanced flag hidden from general usage
        assert!(!usage.contains("--tune"));
    }

    #[test]
    fn advanced_usage_includes_advanced_flags() {
        let parser = example_parser();
        let usage = parser.usage_string(parser.root(), Category::Advanced);
        assert!(usage.contains("[--tune]"));
    }

    #[test]
    fn help_sections_present() {
        let parser = example_parser();
        let help = parser.help_string(parser.root(), Category::General);
        assert!(help.starts_with("Usage: example"));
        assert!(help.contains("Required arguments:"));
        assert!(help.contains("subcommands:"));
        assert!(help.contains("• echo"));
    }

    #[test]
    fn long_command_path_breaks_usage_line() {
        let mut parser = ArgumentParser::new(ParserSpec::default());
        let root = parser.root();
        let group = parser
            .add_subparsers(root, SubparserGroupSpec::default())
            .unwrap();
        let child = parser
            .add_parser(group, SubparserSpec::named("transmogrify-the-widgets"))
            .unwrap();
        parser
            .add_argument(child, ArgumentSpec::named(["--with-sprockets"]))
            .unwrap();

        let usage =
            parser.usage_string_as(child, Category::General, "frobnicator-control-utility");
        let mut lines = usage.lines();
        assert_eq!(
            lines.next(),
            Some("frobnicator-control-utility transmogrify-the-widgets")
        );
        let continuation = lines.next().unwrap();
        assert!(continuation.starts_with("          "));
        assert!(continuation.trim_start().starts_with("[--with-sprockets"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn subcommand_usage_includes_ancestor_path() {
        let parser = example_parser();
        let echo = parser
            .visible_subcommands(parser.root(), Category::General)
            .find(|&(name, _)| name == "echo")
            .map(|(_, child)| child)
            .unwrap();
        let usage = parser.usage_string_as(echo, Category::General, "example");
        assert!(usage.starts_with("example"));
        assert!(usage.contains("echo"));
    }
}
