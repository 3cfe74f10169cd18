//! Domain value objects: FieldType, Format, Transport, Backend.
//!
//! Pure value types with a string form and a `FromStr` parser. The Go, SQL
//! and protobuf spellings of a field type live here so every layer agrees on
//! them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

// ── FieldType ────────────────────────────────────────────────────────────────

/// Semantic type of an entity field.
///
/// Parsed from `string`, `int`, `float`, `bool`, `time`, `uuid`,
/// `ref<Entity>`, `optional<T>` (or `T?`) and `list<T>` (or `[]T`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Time,
    Uuid,
    /// Reference to another entity by ID.
    Ref(String),
    Optional(Box<FieldType>),
    List(Box<FieldType>),
}

impl FieldType {
    /// Go spelling, as used in struct fields.
    pub fn go_type(&self) -> String {
        match self {
            Self::String | Self::Uuid | Self::Ref(_) => "string".into(),
            Self::Int => "int64".into(),
            Self::Float => "float64".into(),
            Self::Bool => "bool".into(),
            Self::Time => "time.Time".into(),
            Self::Optional(inner) => format!("*{}", inner.go_type()),
            Self::List(inner) => format!("[]{}", inner.go_type()),
        }
    }

    /// Postgres column type.
    pub fn sql_type(&self) -> String {
        match self {
            Self::String | Self::Ref(_) => "TEXT".into(),
            Self::Int => "BIGINT".into(),
            Self::Float => "DOUBLE PRECISION".into(),
            Self::Bool => "BOOLEAN".into(),
            Self::Time => "TIMESTAMPTZ".into(),
            Self::Uuid => "UUID".into(),
            Self::Optional(inner) => inner.sql_type(),
            Self::List(_) => "JSONB".into(),
        }
    }

    /// Protobuf field type, including the `repeated`/`optional` label.
    pub fn proto_type(&self) -> String {
        match self {
            Self::String | Self::Uuid | Self::Ref(_) | Self::Time => "string".into(),
            Self::Int => "int64".into(),
            Self::Float => "double".into(),
            Self::Bool => "bool".into(),
            Self::Optional(inner) => format!("optional {}", inner.proto_type()),
            Self::List(inner) => format!("repeated {}", inner.proto_type()),
        }
    }

    /// Whether the Go spelling needs the `time` package.
    pub fn uses_time(&self) -> bool {
        match self {
            Self::Time => true,
            Self::Optional(inner) | Self::List(inner) => inner.uses_time(),
            _ => false,
        }
    }

    /// Whether the SQL column can be NULL.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// Scalar carried by protobuf with the same Go type on both sides.
    pub fn is_proto_scalar(&self) -> bool {
        matches!(
            self,
            Self::String | Self::Int | Self::Float | Self::Bool | Self::Uuid | Self::Ref(_)
        )
    }

    /// Whether the value is a string on the wire, so format checks apply.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::String | Self::Uuid | Self::Ref(_))
    }

    /// The entity this type references, however deeply nested.
    pub fn referenced_entity(&self) -> Option<&str> {
        match self {
            Self::Ref(target) => Some(target),
            Self::Optional(inner) | Self::List(inner) => inner.referenced_entity(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Time => f.write_str("time"),
            Self::Uuid => f.write_str("uuid"),
            Self::Ref(target) => write!(f, "ref<{target}>"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::List(inner) => write!(f, "list<{inner}>"),
        }
    }
}

fn wrapped<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.strip_prefix(prefix)?.strip_suffix('>')
}

impl FromStr for FieldType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: &str| DomainError::InvalidFieldType {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        if let Some(inner) = s.strip_suffix('?') {
            return Ok(Self::Optional(Box::new(inner.parse()?)));
        }
        if let Some(inner) = s.strip_prefix("[]") {
            return Ok(Self::List(Box::new(inner.parse()?)));
        }
        if let Some(inner) = wrapped(s, "optional<") {
            return Ok(Self::Optional(Box::new(inner.parse()?)));
        }
        if let Some(inner) = wrapped(s, "list<") {
            return Ok(Self::List(Box::new(inner.parse()?)));
        }
        if let Some(target) = wrapped(s, "ref<") {
            let target = target.trim();
            if target.is_empty() {
                return Err(invalid("reference needs an entity name"));
            }
            return Ok(Self::Ref(target.to_string()));
        }

        match s.to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Ok(Self::String),
            "int" | "integer" | "int64" => Ok(Self::Int),
            "float" | "float64" | "double" => Ok(Self::Float),
            "bool" | "boolean" => Ok(Self::Bool),
            "time" | "timestamp" | "datetime" => Ok(Self::Time),
            "uuid" => Ok(Self::Uuid),
            "" => Err(invalid("empty type")),
            _ => Err(invalid("unknown type")),
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

// ── Format ───────────────────────────────────────────────────────────────────

/// Extra format constraint on a textual field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// A UUID identifier.
    Identifier,
    Email,
    Url,
}

impl Format {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Email => "email",
            Self::Url => "url",
        }
    }

    /// The ozzo-validation `is` rule for this format.
    pub const fn go_rule(&self) -> &'static str {
        match self {
            Self::Identifier => "is.UUIDv4",
            Self::Email => "is.EmailFormat",
            Self::Url => "is.URL",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identifier" | "id" | "uuid" => Ok(Self::Identifier),
            "email" => Ok(Self::Email),
            "url" | "uri" => Ok(Self::Url),
            other => Err(DomainError::InvalidField(format!(
                "unknown format `{other}`"
            ))),
        }
    }
}

// ── Transport ────────────────────────────────────────────────────────────────

/// A protocol an entity is exposed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    Http,
    Grpc,
}

impl Transport {
    pub const ALL: [Self; 2] = [Self::Http, Self::Grpc];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Grpc => "grpc",
        }
    }

    /// Go package name of the generated handler.
    pub const fn package(&self) -> &'static str {
        match self {
            Self::Http => "httptransport",
            Self::Grpc => "grpctransport",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transport {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "rest" => Ok(Self::Http),
            "grpc" => Ok(Self::Grpc),
            other => Err(DomainError::InvalidField(format!(
                "unknown transport `{other}`"
            ))),
        }
    }
}

// ── Backend ──────────────────────────────────────────────────────────────────

/// A storage backend an entity is persisted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Postgres,
    Memory,
}

impl Backend {
    pub const ALL: [Self; 2] = [Self::Postgres, Self::Memory];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" | "inmemory" => Ok(Self::Memory),
            other => Err(DomainError::InvalidField(format!(
                "unknown backend `{other}`"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_shorthands() {
        assert_eq!(
            "int?".parse::<FieldType>().unwrap(),
            FieldType::Optional(Box::new(FieldType::Int))
        );
        assert_eq!(
            "[]string".parse::<FieldType>().unwrap(),
            FieldType::List(Box::new(FieldType::String))
        );
        assert_eq!(
            "list<ref<Owner>>".parse::<FieldType>().unwrap(),
            FieldType::List(Box::new(FieldType::Ref("Owner".into())))
        );
    }

    #[test]
    fn field_type_rejects_unknown() {
        let err = "money".parse::<FieldType>().unwrap_err();
        assert!(matches!(err, DomainError::InvalidFieldType { .. }));
        assert!("ref<>".parse::<FieldType>().is_err());
    }

    #[test]
    fn go_spellings() {
        assert_eq!(FieldType::Int.go_type(), "int64");
        assert_eq!("time?".parse::<FieldType>().unwrap().go_type(), "*time.Time");
        assert_eq!("[]float".parse::<FieldType>().unwrap().go_type(), "[]float64");
        assert!("[]time".parse::<FieldType>().unwrap().uses_time());
    }

    #[test]
    fn display_is_parseable() {
        let ty: FieldType = "optional<list<uuid>>".parse().unwrap();
        assert_eq!(ty.to_string().parse::<FieldType>().unwrap(), ty);
    }

    #[test]
    fn field_type_deserializes_from_string() {
        let ty: FieldType = serde_json::from_str("\"ref<Owner>\"").unwrap();
        assert_eq!(ty.referenced_entity(), Some("Owner"));
    }

    #[test]
    fn transports_and_backends_parse() {
        assert_eq!("REST".parse::<Transport>().unwrap(), Transport::Http);
        assert_eq!("pg".parse::<Backend>().unwrap(), Backend::Postgres);
        assert!("kafka".parse::<Transport>().is_err());
    }
}
