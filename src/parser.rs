use crate::error::{Error, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tree_sitter::{Language, Node, Parser as TsParser, Tree};

static JSON_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"json:"([^"]*)""#).expect("valid json tag regex"));

/// Structural parser for Go source files.
///
/// The `AstParser` uses tree-sitter's Go grammar to parse a file and collects the declarations
/// the generator cares about: the package clause, imports, function and method declarations
/// with their attached doc comments, and top-level struct types.
///
/// # Example
///
/// ```no_run
/// use swag_gen::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("api/user.go")).unwrap();
/// for func in parsed.documented_functions() {
///     println!("{} has {} comment lines", func.name, func.doc_lines.len());
/// }
/// ```
pub struct AstParser;

/// A successfully parsed Go file.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// Name from the `package` clause
    pub package_name: String,
    /// Import paths, without quotes
    pub imports: Vec<String>,
    /// Top-level function and method declarations in source order
    pub functions: Vec<FunctionDecl>,
    /// Top-level struct type declarations in source order
    pub structs: Vec<StructDecl>,
}

impl ParsedFile {
    /// Functions with at least one attached comment line
    pub fn documented_functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.iter().filter(|f| !f.doc_lines.is_empty())
    }

    /// Find a struct declaration by name
    pub fn find_struct(&self, name: &str) -> Option<&StructDecl> {
        self.structs.iter().find(|s| s.name == name)
    }
}

/// A function-like declaration and the comment block directly above it.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    /// Receiver type for methods (e.g. `*UserHandler`)
    pub receiver: Option<String>,
    /// Comment lines with `//` or `/* */` markers stripped and whitespace trimmed
    pub doc_lines: Vec<String>,
    /// 1-based line of the declaration
    pub line: usize,
    /// Byte offset of the declaration
    pub offset: usize,
}

/// A top-level `type X struct { ... }` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: String,
    /// 1-based line of the type spec
    pub line: usize,
    pub fields: Vec<FieldDecl>,
}

/// One field of a struct declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Go field name (the type name for embedded fields)
    pub name: String,
    /// Field type as written in source
    pub type_name: String,
    /// Name from the `json:"..."` tag, if any
    pub json_name: Option<String>,
    /// Embedded (anonymous) field
    pub embedded: bool,
    /// Tagged `json:"-"`
    pub skipped: bool,
}

impl FieldDecl {
    /// The name the field is serialized under
    pub fn serialized_name(&self) -> &str {
        self.json_name.as_deref().unwrap_or(&self.name)
    }
}

impl AstParser {
    /// Parses a single Go source file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the Go source file to parse
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Go syntax or has no package clause
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());

        let content = fs::read_to_string(path)
            .map_err(|e| Error::parse(path, format!("failed to read file: {}", e)))?;

        let parsed = Self::parse_source(path, &content)?;

        debug!(
            "Successfully parsed file: {} ({} functions, {} structs)",
            path.display(),
            parsed.functions.len(),
            parsed.structs.len()
        );

        Ok(parsed)
    }

    /// Parses Go source text; `path` is only used for provenance and error messages.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        let tree = Self::parse_tree(path, content)?;
        let root = tree.root_node();

        if root.has_error() {
            let message = match first_error(root) {
                Some(node) => format!(
                    "syntax error at line {}, column {}",
                    node.start_position().row + 1,
                    node.start_position().column + 1
                ),
                None => "syntax error".to_string(),
            };
            return Err(Error::parse(path, message));
        }

        let mut parsed = ParsedFile {
            path: path.to_path_buf(),
            ..ParsedFile::default()
        };
        let mut has_package = false;

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            match node.kind() {
                "package_clause" => {
                    has_package = true;
                    parsed.package_name = package_name(&node, content);
                }
                "import_declaration" => collect_imports(&node, content, &mut parsed.imports),
                "function_declaration" | "method_declaration" => {
                    if let Some(func) = extract_function(&node, content) {
                        parsed.functions.push(func);
                    }
                }
                "type_declaration" => collect_structs(&node, content, &mut parsed.structs),
                _ => {}
            }
        }

        if !has_package {
            return Err(Error::parse(path, "expected 'package' clause"));
        }

        Ok(parsed)
    }

    fn parse_tree(path: &Path, content: &str) -> Result<Tree> {
        let language: Language = tree_sitter_go::LANGUAGE.into();
        let mut parser = TsParser::new();
        parser
            .set_language(&language)
            .map_err(|e| Error::parse(path, format!("failed to load Go grammar: {}", e)))?;

        parser
            .parse(content, None)
            .ok_or_else(|| Error::parse(path, "parser returned no tree"))
    }
}

fn node_text<'a>(node: &Node, content: &'a str) -> &'a str {
    &content[node.byte_range()]
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

fn package_name(node: &Node, content: &str) -> String {
    let mut cursor = node.walk();
    let name = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "package_identifier")
        .map(|c| node_text(&c, content).to_string())
        .unwrap_or_default();
    name
}

fn collect_imports(node: &Node, content: &str, imports: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_spec" => {
                if let Some(path) = child.child_by_field_name("path") {
                    let raw = node_text(&path, content);
                    imports.push(raw.trim_matches(|c| c == '"' || c == '`').to_string());
                }
            }
            "import_spec_list" => collect_imports(&child, content, imports),
            _ => {}
        }
    }
}

fn extract_function(node: &Node, content: &str) -> Option<FunctionDecl> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(&name_node, content).to_string();

    let receiver = node.child_by_field_name("receiver").and_then(|r| {
        let mut cursor = r.walk();
        let param = r
            .named_children(&mut cursor)
            .find(|c| c.kind() == "parameter_declaration")?;
        param
            .child_by_field_name("type")
            .map(|t| node_text(&t, content).to_string())
    });

    Some(FunctionDecl {
        name,
        receiver,
        doc_lines: doc_comment_lines(node, content),
        line: node.start_position().row + 1,
        offset: node.start_byte(),
    })
}

fn collect_structs(node: &Node, content: &str, structs: &mut Vec<StructDecl>) {
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let (Some(name_node), Some(type_node)) = (
            spec.child_by_field_name("name"),
            spec.child_by_field_name("type"),
        ) else {
            continue;
        };
        if type_node.kind() != "struct_type" {
            continue;
        }

        structs.push(StructDecl {
            name: node_text(&name_node, content).to_string(),
            line: spec.start_position().row + 1,
            fields: struct_fields(&type_node, content),
        });
    }
}

fn struct_fields(struct_node: &Node, content: &str) -> Vec<FieldDecl> {
    let mut fields = Vec::new();

    let mut cursor = struct_node.walk();
    for list in struct_node.named_children(&mut cursor) {
        if list.kind() != "field_declaration_list" {
            continue;
        }

        let mut list_cursor = list.walk();
        for decl in list.named_children(&mut list_cursor) {
            if decl.kind() != "field_declaration" {
                continue;
            }

            let type_name = decl
                .child_by_field_name("type")
                .map(|t| node_text(&t, content).to_string())
                .unwrap_or_default();
            let tag = decl
                .child_by_field_name("tag")
                .map(|t| node_text(&t, content))
                .and_then(|t| JSON_TAG_REGEX.captures(t))
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().split(',').next().unwrap_or("").to_string());

            let skipped = tag.as_deref() == Some("-");
            let json_name = tag.filter(|t| !t.is_empty() && t != "-");

            let mut name_cursor = decl.walk();
            let names: Vec<String> = decl
                .children_by_field_name("name", &mut name_cursor)
                .map(|n| node_text(&n, content).to_string())
                .collect();

            if names.is_empty() {
                let embedded_name = type_name
                    .trim_start_matches('*')
                    .rsplit('.')
                    .next()
                    .unwrap_or("")
                    .to_string();
                fields.push(FieldDecl {
                    name: embedded_name,
                    type_name,
                    json_name,
                    embedded: true,
                    skipped,
                });
                continue;
            }

            for name in names {
                fields.push(FieldDecl {
                    name,
                    type_name: type_name.clone(),
                    json_name: json_name.clone(),
                    embedded: false,
                    skipped,
                });
            }
        }
    }

    fields
}

/// Collect the comment group that ends on the line right above `node`.
///
/// A blank line, a non-comment sibling or a comment that trails code on its own line ends the
/// group.
fn doc_comment_lines(node: &Node, content: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut expected_row = node.start_position().row;
    let mut sibling = node.prev_sibling();

    while let Some(s) = sibling {
        if s.kind() != "comment" || s.end_position().row + 1 != expected_row {
            break;
        }
        if !starts_line(&s, content) {
            break;
        }
        blocks.push(node_text(&s, content));
        expected_row = s.start_position().row;
        sibling = s.prev_sibling();
    }

    blocks.reverse();
    blocks.into_iter().flat_map(strip_comment_markers).collect()
}

fn starts_line(node: &Node, content: &str) -> bool {
    let start = node.start_byte();
    let line_start = content[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    content[line_start..start].trim().is_empty()
}

fn strip_comment_markers(raw: &str) -> Vec<String> {
    if let Some(line) = raw.strip_prefix("//") {
        return vec![line.trim().to_string()];
    }

    let body = raw
        .strip_prefix("/*")
        .and_then(|b| b.strip_suffix("*/"))
        .unwrap_or(raw);
    body.lines()
        .map(|l| l.trim().trim_start_matches('*').trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}
