//! Tree-sitter parsing wrapper for Strudel snippets.
//!
//! Strudel code is JavaScript, parsed here with the TypeScript grammar (a
//! superset). Tree-sitter is error-tolerant and context-free, so top-level
//! `await` parses without wrapping and syntax problems surface as `ERROR`
//! or missing nodes rather than as a failed parse. Constructs that only
//! TypeScript accepts are reported as faults too.

use std::ops::Range;

use crate::error::TranspilerLoadError;

/// Name reported when the grammar fails to load.
pub(crate) const GRAMMAR_NAME: &str = "typescript";

/// Node kinds the TypeScript grammar produces for syntax plain JavaScript
/// rejects.
const TYPESCRIPT_ONLY_KINDS: &[&str] = &[
    "abstract_class_declaration",
    "abstract_method_signature",
    "accessibility_modifier",
    "ambient_declaration",
    "as_expression",
    "asserts_annotation",
    "enum_declaration",
    "function_signature",
    "implements_clause",
    "index_signature",
    "instantiation_expression",
    "interface_declaration",
    "internal_module",
    "module",
    "non_null_expression",
    "optional_parameter",
    "override_modifier",
    "satisfies_expression",
    "type_alias_declaration",
    "type_annotation",
    "type_assertion",
    "type_parameters",
    "type_predicate_annotation",
];

/// Result of parsing a snippet.
#[derive(Debug)]
pub(crate) struct ParseResult<'src> {
    tree: tree_sitter::Tree,
    source: &'src str,
}

/// The first syntax problem found in a snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxFault {
    /// Byte range of the offending token, empty at end of input.
    pub byte_range: Range<usize>,
    /// Token the grammar expected at that point, if known.
    pub expected: Option<String>,
}

impl SyntaxFault {
    const fn unexpected(byte_range: Range<usize>) -> Self {
        Self {
            byte_range,
            expected: None,
        }
    }
}

/// A string literal interpreted as a mini-notation pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PatternLiteral {
    /// Byte range of the whole literal, quotes included.
    pub literal: Range<usize>,
    /// Byte range of the literal's content, quotes excluded.
    pub content: Range<usize>,
}

impl<'src> ParseResult<'src> {
    /// Returns the source text that was parsed.
    pub(crate) const fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the first syntax problem in the snippet.
    ///
    /// Bracket mismatches are located from the token stream: a stray closer
    /// is reported where it appears and an unclosed opener at the end of the
    /// last token. Otherwise the first missing node, `ERROR` node or
    /// TypeScript-only construct in document order is reported.
    pub(crate) fn first_error(&self) -> Option<SyntaxFault> {
        let root = self.tree.root_node();
        if !root.has_error() {
            return find_typescript_only(root);
        }

        let tokens = leaves(root);
        bracket_fault(&tokens).or_else(|| find_first_error(root))
    }

    /// Collects every string literal that Strudel treats as mini-notation.
    ///
    /// Double-quoted strings and template literals without substitutions
    /// qualify. Single-quoted strings stay plain JavaScript strings.
    pub(crate) fn pattern_literals(&self) -> Vec<PatternLiteral> {
        let mut literals = Vec::new();
        collect_pattern_literals(self.tree.root_node(), self.source, &mut literals);
        literals
    }

    /// Returns the start byte of the final top-level statement when that
    /// statement is an expression.
    pub(crate) fn final_expression_start(&self) -> Option<usize> {
        let root = self.tree.root_node();
        let mut cursor = root.walk();
        let last = root
            .named_children(&mut cursor)
            .filter(|child| child.kind() != "comment")
            .last()?;
        (last.kind() == "expression_statement").then_some(last.start_byte())
    }
}

/// Tree-sitter parser bound to the JavaScript-compatible grammar.
pub(crate) struct Parser {
    inner: tree_sitter::Parser,
}

impl Parser {
    /// Creates a parser bound to the grammar.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar's ABI is incompatible with the linked
    /// Tree-sitter runtime.
    pub(crate) fn new() -> Result<Self, TranspilerLoadError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
            .map_err(|e| TranspilerLoadError::grammar_init(GRAMMAR_NAME, e.to_string()))?;

        Ok(Self { inner })
    }

    /// Parses a snippet.
    ///
    /// Returns `None` only when Tree-sitter gives up without a tree, which
    /// does not happen without a timeout or cancellation flag.
    pub(crate) fn parse<'src>(&mut self, source: &'src str) -> Option<ParseResult<'src>> {
        let tree = self.inner.parse(source, None)?;
        Some(ParseResult { tree, source })
    }
}

/// Collects every token with a width, in document order.
fn leaves(root: tree_sitter::Node<'_>) -> Vec<tree_sitter::Node<'_>> {
    let mut leaves = Vec::new();
    let mut cursor = root.walk();
    'walk: loop {
        let node = cursor.node();
        if node.child_count() == 0 {
            if !node.is_missing() && node.start_byte() < node.end_byte() {
                leaves.push(node);
            }
        } else if cursor.goto_first_child() {
            continue;
        }

        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    leaves
}

fn bracket_fault(leaves: &[tree_sitter::Node<'_>]) -> Option<SyntaxFault> {
    let mut open: Vec<&'static str> = Vec::new();

    for leaf in leaves {
        let kind = leaf.kind();
        if let Some(closer) = closer_for(kind) {
            open.push(closer);
        } else if is_closer(kind) && open.pop() != Some(kind) {
            return Some(SyntaxFault::unexpected(leaf.byte_range()));
        }
    }

    let closer = open.pop()?;
    let end = leaves.last().map_or(0, tree_sitter::Node::end_byte);
    Some(SyntaxFault {
        byte_range: end..end,
        expected: Some(closer.to_owned()),
    })
}

fn closer_for(kind: &str) -> Option<&'static str> {
    match kind {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" | "${" => Some("}"),
        _ => None,
    }
}

fn is_closer(kind: &str) -> bool {
    matches!(kind, ")" | "]" | "}")
}

fn find_first_error(node: tree_sitter::Node<'_>) -> Option<SyntaxFault> {
    if node.is_missing() {
        return Some(SyntaxFault {
            byte_range: node.byte_range(),
            expected: Some(node.kind().to_owned()),
        });
    }
    if node.is_error() {
        return Some(fault_within_error(node));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if !child.has_error() {
            continue;
        }
        if let Some(fault) = find_first_error(child) {
            return Some(fault);
        }
    }

    None
}

/// Locates the first token of an `ERROR` node that follows the complete
/// statements the parser managed to recover.
fn fault_within_error(node: tree_sitter::Node<'_>) -> SyntaxFault {
    let mut cursor = node.walk();
    let offender = node
        .children(&mut cursor)
        .find(|child| child.has_error() || !is_complete_statement(*child));

    match offender {
        Some(child) if child.has_error() => find_first_error(child)
            .unwrap_or_else(|| SyntaxFault::unexpected(child.byte_range())),
        Some(child) => SyntaxFault::unexpected(child.byte_range()),
        None => SyntaxFault::unexpected(node.byte_range()),
    }
}

fn is_complete_statement(node: tree_sitter::Node<'_>) -> bool {
    node.is_named()
        && (node.kind().ends_with("statement") || node.kind().ends_with("declaration"))
}

fn find_typescript_only(node: tree_sitter::Node<'_>) -> Option<SyntaxFault> {
    if node.is_named() && TYPESCRIPT_ONLY_KINDS.contains(&node.kind()) {
        return Some(SyntaxFault::unexpected(typescript_token(node)));
    }

    let mut cursor = node.walk();
    let mut children = node.children(&mut cursor);
    children.find_map(find_typescript_only)
}

/// Returns the token a JavaScript parser would stop at inside a
/// TypeScript-only construct.
fn typescript_token(node: tree_sitter::Node<'_>) -> Range<usize> {
    let token = match node.kind() {
        "as_expression" | "satisfies_expression" | "non_null_expression" => {
            let mut cursor = node.walk();
            let mut children = node.children(&mut cursor);
            children.find(|child| matches!(child.kind(), "as" | "satisfies" | "!"))
        }
        "interface_declaration" | "type_alias_declaration" => node.child_by_field_name("name"),
        _ => None,
    };
    token.unwrap_or(node).byte_range()
}

fn collect_pattern_literals(
    node: tree_sitter::Node<'_>,
    source: &str,
    literals: &mut Vec<PatternLiteral>,
) {
    match node.kind() {
        "string" if starts_with_double_quote(node, source) => {
            literals.push(literal_of(node));
            return;
        }
        "template_string" if !has_substitution(node) => {
            literals.push(literal_of(node));
            return;
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_pattern_literals(child, source, literals);
    }
}

fn starts_with_double_quote(node: tree_sitter::Node<'_>, source: &str) -> bool {
    source
        .get(node.byte_range())
        .is_some_and(|text| text.starts_with('"'))
}

fn has_substitution(node: tree_sitter::Node<'_>) -> bool {
    let mut cursor = node.walk();
    let mut children = node.named_children(&mut cursor);
    children.any(|child| child.kind() == "template_substitution")
}

fn literal_of(node: tree_sitter::Node<'_>) -> PatternLiteral {
    let literal = node.byte_range();
    // Both delimiters are single-byte ASCII quotes.
    let content_start = literal.start.saturating_add(1);
    let content_end = literal.end.saturating_sub(1).max(content_start);
    PatternLiteral {
        literal,
        content: content_start..content_end,
    }
}
