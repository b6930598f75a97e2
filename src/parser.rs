/*!
The parser tree: a root [`ArgumentParser`] owning every node, argument, and
subparser group in one place, handed out to callers as lightweight index
handles.

The tree is built up front and is immutable during parsing; a parse borrows
it by `&self`, so several independent parses against one tree are fine.
Ownership is deliberately flat: nodes don't own their children directly,
they're all stored in one arena with non-owning parent/child links, which
keeps handles copyable and avoids reference-counted cycles.
*/

use std::env;

use crate::{
    Category,
    argument::{Argument, ArgumentId, ArgumentSpec, Handler},
    errors::{InvalidArgumentParams, ParseError},
    state::ParsingState,
};

/// A handle to one parser node in the tree. Copyable; only meaningful for
/// the [`ArgumentParser`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParserRef(pub(crate) usize);

impl ParserRef {
    pub(crate) const ROOT: ParserRef = ParserRef(0);
}

/// A handle to a node's subparser group, returned by
/// [`ArgumentParser::add_subparsers`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubparserRef(usize);

/// Program-level metadata for a parser node. Opaque to the matching
/// engine; consumed by help rendering.
#[derive(Debug, Clone, Default)]
pub struct ParserSpec {
    /// The program name shown in usage text. Defaults to `<program>`.
    pub prog: Option<String>,

    /// Paragraphs describing the program, shown after the usage line.
    pub description: Option<String>,

    /// Paragraphs shown at the bottom of the help text.
    pub epilog: Option<String>,
}

/// The parameters for a new subcommand parser.
#[derive(Debug, Clone, Default)]
pub struct SubparserSpec {
    /// The word that selects this subcommand.
    pub name: String,

    pub description: Option<String>,
    pub epilog: Option<String>,

    /// Which help tier this subcommand appears in.
    pub category: Category,
}

impl SubparserSpec {
    /// A default spec with the given subcommand name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// The parameters for a node's subparser group.
pub struct SubparserGroupSpec {
    /// The heading used for the group in help output, and the name
    /// reported when a required group is absent. Defaults to
    /// `subcommands`.
    pub title: String,

    /// Invoked with the matched subcommand word (as both spelling and
    /// value) whenever a child parser is selected.
    pub handler: Option<Handler>,

    pub description: Option<String>,

    /// Whether a subcommand must be selected. Defaults to false.
    pub required: Option<bool>,
}

impl Default for SubparserGroupSpec {
    fn default() -> Self {
        Self {
            title: "subcommands".to_owned(),
            handler: None,
            description: None,
            required: None,
        }
    }
}

struct Node {
    spec: ParserSpec,
    /// The subcommand word that selects this node; empty for the root.
    name: String,
    category: Category,
    parent: Option<ParserRef>,
    /// Insertion order is both the positional-consumption order and the
    /// display order.
    arguments: Vec<Argument>,
    group: Option<SubparserRef>,
}

pub(crate) struct SubparserGroup {
    owner: ParserRef,
    title: String,
    description: Option<String>,
    required: bool,
    handler: Option<Handler>,
    /// Insertion-ordered; lookup is by exact name.
    parsers: Vec<(String, ParserRef)>,
}

impl SubparserGroup {
    pub(crate) fn title(&self) -> &str {
        &self.title
    }

    pub(crate) fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn is_required(&self) -> bool {
        self.required
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<ParserRef> {
        self.parsers
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|&(_, child)| child)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, ParserRef)> {
        self.parsers
            .iter()
            .map(|&(ref name, child)| (name.as_str(), child))
    }

    /// Invoke the group's dispatch handler, if any, with the matched
    /// subcommand word.
    pub(crate) fn dispatch(&self, word: &str) {
        if let Some(handler) = &self.handler {
            handler(word, word);
        }
    }
}

/**
A tree of parser nodes, each owning a list of [`Argument`]s and at most one
subparser group. Build the tree once, then call [`parse_args`]
[ArgumentParser::parse_args] as many times as you like; parsing never
mutates the tree.
*/
pub struct ArgumentParser {
    nodes: Vec<Node>,
    groups: Vec<SubparserGroup>,
    next_argument: u64,
}

impl ArgumentParser {
    #[must_use]
    pub fn new(spec: ParserSpec) -> Self {
        Self {
            nodes: vec![Node {
                spec,
                name: String::new(),
                category: Category::General,
                parent: None,
                arguments: Vec::new(),
                group: None,
            }],
            groups: Vec::new(),
            next_argument: 0,
        }
    }

    /// The handle for the root node.
    #[must_use]
    pub fn root(&self) -> ParserRef {
        ParserRef::ROOT
    }

    /**
    Attach a new argument to `node`. Arguments are matched in attachment
    order (for positionals) and offered to flag matching newest-first
    within a node. Fails only if the spec itself is invalid.
    */
    pub fn add_argument(
        &mut self,
        node: ParserRef,
        spec: ArgumentSpec,
    ) -> Result<ArgumentId, InvalidArgumentParams> {
        let id = ArgumentId(self.next_argument);
        let argument = Argument::new(id, spec)?;
        self.next_argument += 1;
        self.nodes[node.0].arguments.push(argument);
        Ok(id)
    }

    /// Attach a subparser group to `node`. Each node may have at most one
    /// group.
    pub fn add_subparsers(
        &mut self,
        node: ParserRef,
        spec: SubparserGroupSpec,
    ) -> Result<SubparserRef, InvalidArgumentParams> {
        if self.nodes[node.0].group.is_some() {
            return Err(InvalidArgumentParams::new(
                "a parser may have at most one subparser group",
            ));
        }
        let group = SubparserRef(self.groups.len());
        self.groups.push(SubparserGroup {
            owner: node,
            title: spec.title,
            description: spec.description,
            required: spec.required.unwrap_or(false),
            handler: spec.handler,
            parsers: Vec::new(),
        });
        self.nodes[node.0].group = Some(group);
        Ok(group)
    }

    /// Register a new subcommand parser in `group`. The new node's parent
    /// is the node the group is attached to.
    pub fn add_parser(
        &mut self,
        group: SubparserRef,
        spec: SubparserSpec,
    ) -> Result<ParserRef, InvalidArgumentParams> {
        if self.groups[group.0].lookup(&spec.name).is_some() {
            return Err(InvalidArgumentParams::new("duplicate subparser name"));
        }
        let parent = self.groups[group.0].owner;
        let child = ParserRef(self.nodes.len());
        self.nodes.push(Node {
            spec: ParserSpec {
                prog: Some(spec.name.clone()),
                description: spec.description,
                epilog: spec.epilog,
            },
            name: spec.name.clone(),
            category: spec.category,
            parent: Some(parent),
            arguments: Vec::new(),
            group: None,
        });
        self.groups[group.0].parsers.push((spec.name, child));
        Ok(child)
    }

    /// Parse a list of text tokens against the root parser. On success,
    /// every matched handler has already been invoked.
    pub fn parse_args<I>(&self, args: I) -> Result<(), ParseError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.parse_args_at(self.root(), args)
    }

    /// Parse a list of text tokens with the parser chain rooted at `node`
    /// instead of the tree root.
    pub fn parse_args_at<I>(&self, node: ParserRef, args: I) -> Result<(), ParseError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        ParsingState::new(self, node).parse_args(&args)
    }

    /// Parse the operating system's invocation arguments, excluding the
    /// program name. Non-UTF-8 arguments are decoded lossily.
    pub fn parse_from_env(&self) -> Result<(), ParseError> {
        self.parse_args(
            env::args_os()
                .skip(1)
                .map(|arg| arg.to_string_lossy().into_owned()),
        )
    }

    /// Look up an argument by its id, anywhere in the tree.
    #[must_use]
    pub fn argument(&self, id: ArgumentId) -> Option<&Argument> {
        self.nodes
            .iter()
            .flat_map(|node| &node.arguments)
            .find(|argument| argument.id() == id)
    }

    /**
    The arguments of `node` visible at or below a maximum category. Used
    for help rendering; has no effect on matching, which always sees every
    argument.
    */
    pub fn visible_arguments(
        &self,
        node: ParserRef,
        max: Category,
    ) -> impl Iterator<Item = &Argument> {
        self.nodes[node.0]
            .arguments
            .iter()
            .filter(move |argument| argument.category() <= max)
    }

    /// The subcommands of `node` visible at or below a maximum category,
    /// in registration order.
    pub fn visible_subcommands(
        &self,
        node: ParserRef,
        max: Category,
    ) -> impl Iterator<Item = (&str, ParserRef)> {
        self.nodes[node.0]
            .group
            .into_iter()
            .flat_map(|group| self.groups[group.0].entries())
            .filter(move |&(_, child)| self.nodes[child.0].category <= max)
    }

    pub(crate) fn arguments_of(&self, node: ParserRef) -> &[Argument] {
        &self.nodes[node.0].arguments
    }

    pub(crate) fn group_of(&self, node: ParserRef) -> Option<&SubparserGroup> {
        self.nodes[node.0].group.map(|group| &self.groups[group.0])
    }

    pub(crate) fn parent_of(&self, node: ParserRef) -> Option<ParserRef> {
        self.nodes[node.0].parent
    }

    pub(crate) fn category_of(&self, node: ParserRef) -> Category {
        self.nodes[node.0].category
    }

    pub(crate) fn name_of(&self, node: ParserRef) -> &str {
        &self.nodes[node.0].name
    }

    pub(crate) fn spec_of(&self, node: ParserRef) -> &ParserSpec {
        &self.nodes[node.0].spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_most_one_group_per_node() {
        let mut parser = ArgumentParser::new(ParserSpec::default());
        let root = parser.root();
        parser
            .add_subparsers(root, SubparserGroupSpec::default())
            .unwrap();
        assert!(
            parser
                .add_subparsers(root, SubparserGroupSpec::default())
                .is_err()
        );
    }

    #[test]
    fn duplicate_subcommand_names_rejected() {
        let mut parser = ArgumentParser::new(ParserSpec::default());
        let root = parser.root();
        let group = parser
            .add_subparsers(root, SubparserGroupSpec::default())
            .unwrap();
        parser
            .add_parser(group, SubparserSpec::named("foo"))
            .unwrap();
        assert!(parser.add_parser(group, SubparserSpec::named("foo")).is_err());
    }

    #[test]
    fn argument_ids_are_distinct() {
        let mut parser = ArgumentParser::new(ParserSpec::default());
        let root = parser.root();
        let first = parser
            .add_argument(root, ArgumentSpec::named(["--first"]))
            .unwrap();
        let second = parser
            .add_argument(root, ArgumentSpec::named(["--second"]))
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(parser.argument(first).unwrap().preferred_name(), "--first");
        assert_eq!(
            parser.argument(second).unwrap().preferred_name(),
            "--second"
        );
    }

    #[test]
    fn hidden_subcommands_filtered_from_views() {
        let mut parser = ArgumentParser::new(ParserSpec::default());
        let root = parser.root();
        let group = parser
            .add_subparsers(root, SubparserGroupSpec::default())
            .unwrap();
        parser
            .add_parser(group, SubparserSpec::named("shown"))
            .unwrap();
        parser
            .add_parser(
                group,
                SubparserSpec {
                    category: Category::Hidden,
                    ..SubparserSpec::named("secret")
                },
            )
            .unwrap();

        let names: Vec<&str> = parser
            .visible_subcommands(root, Category::Debugging)
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, ["shown"]);
    }
}
