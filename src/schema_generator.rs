use crate::parser::StructDecl;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Prefix of every reference into `components.schemas`
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, number, boolean, array, object)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int64", "double", "date-time")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Items schema for array types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Properties for object types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    /// Required property names for object types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Reference to another schema
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Schema {
    /// A schema with only a `type`
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    /// A schema with a `type` and a `format`
    pub fn formatted(schema_type: &str, format: &str) -> Self {
        Self {
            format: Some(format.to_string()),
            ..Self::typed(schema_type)
        }
    }

    /// An array schema wrapping `items`
    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array")
        }
    }

    /// A `$ref` to a named component schema
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("{}{}", SCHEMA_REF_PREFIX, name)),
            ..Self::default()
        }
    }

    /// The component name this schema refers to, if it is a `$ref`
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(SCHEMA_REF_PREFIX))
    }
}

/// Scalar type categories with a fixed OpenAPI mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    /// Any signed or unsigned integer width
    Integer,
    Float32,
    Float64,
    Bool,
    /// Go `byte`, rendered as a byte string
    Byte,
    /// Go `rune`, a 32-bit code point
    Rune,
    /// `time.Time`
    DateTime,
    /// `time.Duration`
    Duration,
}

/// Structural description of a type, shared by the string and introspection entry points.
///
/// Raw type names from source are parsed into a descriptor by [`TypeDescriptor::parse`];
/// Rust types describe themselves through [`Describe`]. Both are turned into a [`Schema`] by
/// the same resolution function, so equivalent types always produce equivalent schemas.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// Pointer / optional wrapper around another type
    Pointer(Box<TypeDescriptor>),
    /// Slice or fixed-size array
    Slice(Box<TypeDescriptor>),
    /// Key-value map
    Map,
    Scalar(ScalarKind),
    /// Inline struct with its fields in declaration order
    Struct(Vec<FieldDescriptor>),
    /// A named custom type, rendered as a `$ref`
    Named(String),
    /// `interface{}` / `any`
    Any,
}

/// A single field of a [`TypeDescriptor::Struct`]
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub descriptor: TypeDescriptor,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
        }
    }
}

impl TypeDescriptor {
    /// Classify a raw Go type name such as `*User`, `[]int64` or `map[string]interface{}`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Some(inner) = raw.strip_prefix('*') {
            return TypeDescriptor::Pointer(Box::new(Self::parse(inner)));
        }

        if let Some(inner) = raw.strip_prefix("[]") {
            return TypeDescriptor::Slice(Box::new(Self::parse(inner)));
        }

        // Fixed-size arrays: [N]T
        if raw.starts_with('[') {
            if let Some(close) = raw.find(']') {
                let len = &raw[1..close];
                if !len.is_empty() && len.chars().all(|c| c.is_ascii_digit()) {
                    return TypeDescriptor::Slice(Box::new(Self::parse(&raw[close + 1..])));
                }
            }
        }

        if raw.starts_with("map[") {
            return TypeDescriptor::Map;
        }

        match raw {
            "" | "interface{}" | "any" => TypeDescriptor::Any,
            "string" => TypeDescriptor::Scalar(ScalarKind::String),
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint8" | "uint16"
            | "uint32" | "uint64" | "uintptr" => TypeDescriptor::Scalar(ScalarKind::Integer),
            "float32" => TypeDescriptor::Scalar(ScalarKind::Float32),
            "float64" => TypeDescriptor::Scalar(ScalarKind::Float64),
            "bool" => TypeDescriptor::Scalar(ScalarKind::Bool),
            "byte" => TypeDescriptor::Scalar(ScalarKind::Byte),
            "rune" => TypeDescriptor::Scalar(ScalarKind::Rune),
            "time.Time" => TypeDescriptor::Scalar(ScalarKind::DateTime),
            "time.Duration" => TypeDescriptor::Scalar(ScalarKind::Duration),
            name => TypeDescriptor::Named(name.to_string()),
        }
    }

    /// Whether this descriptor is a pointer / optional wrapper
    pub fn is_pointer(&self) -> bool {
        matches!(self, TypeDescriptor::Pointer(_))
    }
}

/// Types that can describe their own shape, the introspection entry point of the mapper.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_scalar {
    ($kind:expr => $($ty:ty),+) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Scalar($kind)
                }
            }
        )+
    };
}

describe_scalar!(ScalarKind::String => String, str, char);
describe_scalar!(ScalarKind::Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
describe_scalar!(ScalarKind::Float32 => f32);
describe_scalar!(ScalarKind::Float64 => f64);
describe_scalar!(ScalarKind::Bool => bool);
describe_scalar!(ScalarKind::Duration => std::time::Duration);

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Pointer(Box::new(T::describe()))
    }
}

impl<T: Describe + ?Sized> Describe for Box<T> {
    fn describe() -> TypeDescriptor {
        T::describe()
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Slice(Box::new(T::describe()))
    }
}

impl<T: Describe, const N: usize> Describe for [T; N] {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Slice(Box::new(T::describe()))
    }
}

impl<K, V> Describe for HashMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map
    }
}

impl<K, V> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map
    }
}

impl Describe for serde_json::Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Any
    }
}

/// Schema generator - converts type names and type descriptors to OpenAPI schemas
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    /// Named schemas built so far, keyed by component name
    schemas: BTreeMap<String, Schema>,
}

impl SchemaGenerator {
    /// Create a new, empty SchemaGenerator
    pub fn new() -> Self {
        debug!("Initializing SchemaGenerator");
        Self::default()
    }

    /// Build a schema from a raw type name as found in source
    pub fn build_schema(&self, type_name: &str) -> Schema {
        debug!("Generating schema for type: {}", type_name);
        resolve(&TypeDescriptor::parse(type_name))
    }

    /// Build a schema from structural type information
    pub fn build_from_descriptor(&self, descriptor: &TypeDescriptor) -> Schema {
        resolve(descriptor)
    }

    /// Build a schema for a Rust type through its [`Describe`] implementation
    pub fn build_for<T: Describe + ?Sized>(&self) -> Schema {
        self.build_from_descriptor(&T::describe())
    }

    /// Build an object schema from `(field name, raw type)` pairs and register it under `name`.
    ///
    /// Every field whose type is not a pointer is marked as required.
    pub fn build_struct_schema<'a, I>(&mut self, name: &str, fields: I) -> Schema
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        debug!("Generating struct schema for: {}", name);

        let fields = fields
            .into_iter()
            .map(|(field, ty)| FieldDescriptor::new(field, TypeDescriptor::parse(ty)))
            .collect();
        let schema = resolve(&TypeDescriptor::Struct(fields));

        self.schemas.insert(name.to_string(), schema.clone());
        schema
    }

    /// Build and register the schema for a struct declaration found in source.
    ///
    /// Embedded fields and fields tagged `json:"-"` are skipped; JSON tag names replace the
    /// Go field names.
    pub fn build_struct_decl_schema(&mut self, name: &str, decl: &StructDecl) -> Schema {
        let fields: Vec<(&str, &str)> = decl
            .fields
            .iter()
            .filter(|f| !f.embedded && !f.skipped)
            .map(|f| (f.serialized_name(), f.type_name.as_str()))
            .collect();

        self.build_struct_schema(name, fields)
    }

    /// Register schemas for every struct reachable from `roots`.
    ///
    /// Names are matched against the declarations by their last path segment, so a reference to
    /// `models.User` is satisfied by `type User struct`. Names without a declaration are left as
    /// unresolved `$ref` stubs. Returns the names that could not be resolved.
    pub fn collect_referenced<I>(&mut self, roots: I, structs: &[StructDecl]) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let by_name: HashMap<&str, &StructDecl> =
            structs.iter().map(|s| (s.name.as_str(), s)).collect();

        let mut pending: Vec<String> = roots.into_iter().collect();
        let mut seen = BTreeSet::new();
        let mut unresolved = Vec::new();

        while let Some(name) = pending.pop() {
            if !seen.insert(name.clone()) || self.schemas.contains_key(&name) {
                continue;
            }

            let short = name.rsplit('.').next().unwrap_or(&name);
            match by_name.get(short) {
                Some(decl) => {
                    let schema = self.build_struct_decl_schema(&name, decl);
                    pending.extend(referenced_schema_names(&schema));
                }
                None => {
                    debug!("Could not resolve type: {}", name);
                    unresolved.push(name);
                }
            }
        }

        unresolved
    }

    /// Get all generated schemas
    pub fn schemas(&self) -> &BTreeMap<String, Schema> {
        &self.schemas
    }

    /// Get a single generated schema by name
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Consume the generator, returning its schemas
    pub fn into_schemas(self) -> BTreeMap<String, Schema> {
        self.schemas
    }
}

/// Every component name referenced by `schema`, including nested items and properties
pub fn referenced_schema_names(schema: &Schema) -> Vec<String> {
    let mut names = Vec::new();
    collect_refs(schema, &mut names);
    names
}

fn collect_refs(schema: &Schema, names: &mut Vec<String>) {
    if let Some(name) = schema.reference_name() {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    if let Some(items) = &schema.items {
        collect_refs(items, names);
    }
    if let Some(properties) = &schema.properties {
        for property in properties.values() {
            collect_refs(property, names);
        }
    }
}

fn resolve(descriptor: &TypeDescriptor) -> Schema {
    match descriptor {
        TypeDescriptor::Pointer(inner) => resolve(inner),
        TypeDescriptor::Slice(inner) => Schema::array(resolve(inner)),
        TypeDescriptor::Map => Schema::typed("object"),
        TypeDescriptor::Scalar(kind) => scalar_schema(*kind),
        TypeDescriptor::Struct(fields) => {
            let mut properties = BTreeMap::new();
            let mut required = Vec::new();

            for field in fields {
                properties.insert(field.name.clone(), resolve(&field.descriptor));
                if !field.descriptor.is_pointer() {
                    required.push(field.name.clone());
                }
            }

            Schema {
                properties: Some(properties),
                required: (!required.is_empty()).then_some(required),
                ..Schema::typed("object")
            }
        }
        TypeDescriptor::Named(name) => Schema::reference(name),
        TypeDescriptor::Any => Schema::default(),
    }
}

fn scalar_schema(kind: ScalarKind) -> Schema {
    match kind {
        ScalarKind::String => Schema::typed("string"),
        ScalarKind::Integer => Schema::formatted("integer", "int64"),
        ScalarKind::Float32 => Schema::formatted("number", "float"),
        ScalarKind::Float64 => Schema::formatted("number", "double"),
        ScalarKind::Bool => Schema::typed("boolean"),
        ScalarKind::Byte => Schema::formatted("string", "byte"),
        ScalarKind::Rune => Schema::formatted("integer", "int32"),
        ScalarKind::DateTime => Schema::formatted("string", "date-time"),
        ScalarKind::Duration => Schema::typed("string"),
    }
}
