use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Type of a value passed to or returned from a function
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number,
    Bool,
    List(Box<AttributeType>),
    Set(Box<AttributeType>),
    Map(Box<AttributeType>),
    Object(HashMap<String, AttributeType>),
    Tuple(Vec<AttributeType>),
    /// Pseudo-type accepting a value of any type
    Dynamic,
}

impl AttributeType {
    pub fn list(elem: AttributeType) -> Self {
        AttributeType::List(Box::new(elem))
    }

    pub fn set(elem: AttributeType) -> Self {
        AttributeType::Set(Box::new(elem))
    }

    pub fn map(elem: AttributeType) -> Self {
        AttributeType::Map(Box::new(elem))
    }

    /// Whether a value of type `actual` may be passed where `self` is expected.
    /// No conversion is attempted: apart from the dynamic pseudo-type the two
    /// types must agree structurally.
    ///
    /// Only types are compared. A collection whose element type is dynamic is
    /// accepted for any element type; use `Dynamic::conforms_to` to check the
    /// elements a value actually holds.
    pub fn accepts(&self, actual: &AttributeType) -> bool {
        match (self, actual) {
            (AttributeType::Dynamic, _) | (_, AttributeType::Dynamic) => true,
            (AttributeType::List(want), AttributeType::List(got))
            | (AttributeType::Set(want), AttributeType::Set(got))
            | (AttributeType::Map(want), AttributeType::Map(got)) => want.accepts(got),
            (AttributeType::Object(want), AttributeType::Object(got)) => {
                want.len() == got.len()
                    && want
                        .iter()
                        .all(|(name, ty)| got.get(name).is_some_and(|g| ty.accepts(g)))
            }
            (AttributeType::Tuple(want), AttributeType::Tuple(got)) => {
                want.len() == got.len() && want.iter().zip(got).all(|(w, g)| w.accepts(g))
            }
            (want, got) => want == got,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::String => f.write_str("string"),
            AttributeType::Number => f.write_str("number"),
            AttributeType::Bool => f.write_str("bool"),
            AttributeType::List(elem) => write!(f, "list of {}", elem),
            AttributeType::Set(elem) => write!(f, "set of {}", elem),
            AttributeType::Map(elem) => write!(f, "map of {}", elem),
            AttributeType::Object(_) => f.write_str("object"),
            AttributeType::Tuple(_) => f.write_str("tuple"),
            AttributeType::Dynamic => f.write_str("dynamic"),
        }
    }
}

// Types travel in the JSON type notation: "string", ["list","string"],
// ["object",{"name":"string"}], ["tuple",["string","bool"]], "dynamic".
impl Serialize for AttributeType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            AttributeType::String => serializer.serialize_str("string"),
            AttributeType::Number => serializer.serialize_str("number"),
            AttributeType::Bool => serializer.serialize_str("bool"),
            AttributeType::Dynamic => serializer.serialize_str("dynamic"),
            AttributeType::List(elem) => ("list", elem.as_ref()).serialize(serializer),
            AttributeType::Set(elem) => ("set", elem.as_ref()).serialize(serializer),
            AttributeType::Map(elem) => ("map", elem.as_ref()).serialize(serializer),
            AttributeType::Object(attrs) => ("object", attrs).serialize(serializer),
            AttributeType::Tuple(elems) => ("tuple", elems).serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeRepr {
    Primitive(String),
    Complex(String, serde_json::Value),
}

impl<'de> Deserialize<'de> for AttributeType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match TypeRepr::deserialize(deserializer)? {
            TypeRepr::Primitive(name) => match name.as_str() {
                "string" => Ok(AttributeType::String),
                "number" => Ok(AttributeType::Number),
                "bool" => Ok(AttributeType::Bool),
                "dynamic" => Ok(AttributeType::Dynamic),
                other => Err(de::Error::custom(format!("unknown type '{}'", other))),
            },
            TypeRepr::Complex(kind, inner) => match kind.as_str() {
                "list" => Ok(AttributeType::List(Box::new(from_json(inner)?))),
                "set" => Ok(AttributeType::Set(Box::new(from_json(inner)?))),
                "map" => Ok(AttributeType::Map(Box::new(from_json(inner)?))),
                "object" => Ok(AttributeType::Object(from_json(inner)?)),
                "tuple" => Ok(AttributeType::Tuple(from_json(inner)?)),
                other => Err(de::Error::custom(format!("unknown type kind '{}'", other))),
            },
        }
    }
}

fn from_json<T, E>(value: serde_json::Value) -> std::result::Result<T, E>
where
    T: serde::de::DeserializeOwned,
    E: de::Error,
{
    serde_json::from_value(value).map_err(E::custom)
}
