//! Intrinsic references and property values.
//!
//! An [`Intrinsic`] is a deferred, platform-level lookup: a `Ref` to another logical ID, a
//! `GetAtt` of one of its attributes, or a pseudo parameter such as the current region.
//! Intrinsics stay tagged while stacks are composed so they can be rewritten or rendered
//! as plain text (a parameter description cannot contain one), and are only turned into
//! platform syntax by the serializer.
//!
//! Manifests written by hand use the escaped marker form `!Ref Id` / `!GetAtt Id.Attr`.
//! [`Intrinsic::from_str`] and the [`Display`](std::fmt::Display) impl convert between the
//! two and round-trip exactly.

use indexmap::IndexMap;
use serde_json::{Number, json};
use std::fmt;
use std::str::FromStr;

const REF_MARKER: &str = "!Ref ";
const GETATT_MARKER: &str = "!GetAtt ";

/// Platform pseudo parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoParam {
    AccountId,
    NoValue,
    Partition,
    Region,
    StackId,
    StackName,
    UrlSuffix,
}

impl PseudoParam {
    /// Every pseudo parameter, in name order.
    pub const ALL: [PseudoParam; 7] = [
        Self::AccountId,
        Self::NoValue,
        Self::Partition,
        Self::Region,
        Self::StackId,
        Self::StackName,
        Self::UrlSuffix,
    ];

    /// The platform name, e.g. `AWS::Region`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AccountId => "AWS::AccountId",
            Self::NoValue => "AWS::NoValue",
            Self::Partition => "AWS::Partition",
            Self::Region => "AWS::Region",
            Self::StackId => "AWS::StackId",
            Self::StackName => "AWS::StackName",
            Self::UrlSuffix => "AWS::URLSuffix",
        }
    }

    /// Look up a pseudo parameter by its platform name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

/// A deferred lookup resolved by the platform at deploy time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// Reference to a resource or parameter declared in the same template.
    Ref(String),
    /// Attribute of a resource declared in the same template.
    GetAtt {
        logical_id: String,
        attribute: String,
    },
    /// A pseudo parameter.
    Pseudo(PseudoParam),
}

impl Intrinsic {
    pub fn reference(logical_id: impl Into<String>) -> Self {
        Self::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::GetAtt {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    /// The logical ID this intrinsic targets, if it targets one.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Ref(id) => Some(id),
            Self::GetAtt {
                logical_id,
                ..
            } => Some(logical_id),
            Self::Pseudo(_) => None,
        }
    }

    /// Render in the platform's native object syntax.
    #[must_use]
    pub fn render_native(&self) -> serde_json::Value {
        match self {
            Self::Ref(id) => json!({ "Ref": id }),
            Self::GetAtt {
                logical_id,
                attribute,
            } => json!({ "Fn::GetAtt": [logical_id, attribute] }),
            Self::Pseudo(param) => json!({ "Ref": param.name() }),
        }
    }

    /// Render as plain text with the marker stripped, for contexts that cannot hold an
    /// intrinsic (parameter descriptions).
    #[must_use]
    pub fn render_plain(&self) -> String {
        match self {
            Self::Ref(id) => id.clone(),
            Self::GetAtt {
                logical_id,
                attribute,
            } => format!("{logical_id}.{attribute}"),
            Self::Pseudo(param) => param.name().to_string(),
        }
    }

    fn retarget(&mut self, rename: &impl Fn(&str) -> Option<String>) {
        match self {
            Self::Ref(id)
            | Self::GetAtt {
                logical_id: id,
                ..
            } => {
                if let Some(renamed) = rename(id) {
                    *id = renamed;
                }
            }
            Self::Pseudo(_) => {}
        }
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ref(id) => write!(f, "{REF_MARKER}{id}"),
            Self::GetAtt {
                logical_id,
                attribute,
            } => write!(f, "{GETATT_MARKER}{logical_id}.{attribute}"),
            Self::Pseudo(param) => write!(f, "{REF_MARKER}{}", param.name()),
        }
    }
}

impl FromStr for Intrinsic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(target) = s.strip_prefix(REF_MARKER) {
            let target = target.trim();
            if target.is_empty() {
                return Err(format!("empty reference in '{s}'"));
            }
            return Ok(match PseudoParam::from_name(target) {
                Some(param) => Self::Pseudo(param),
                None => Self::Ref(target.to_string()),
            });
        }
        if let Some(target) = s.strip_prefix(GETATT_MARKER) {
            // Attributes may contain dots (Outputs.Name), logical IDs never do
            return match target.trim().split_once('.') {
                Some((id, attr)) if !id.is_empty() && !attr.is_empty() => {
                    Ok(Self::get_att(id, attr))
                }
                _ => Err(format!("expected '!GetAtt Id.Attribute', got '{s}'")),
            };
        }
        Err(format!("'{s}' is not an intrinsic marker"))
    }
}

/// A property value: a literal, a list, an ordered map, or an intrinsic.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Intrinsic(Intrinsic),
}

impl Value {
    /// Build a map value from key/value pairs, keeping their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a list of strings.
    pub fn strings<S: Into<String>>(items: impl IntoIterator<Item = S>) -> Self {
        Self::List(items.into_iter().map(|s| Self::String(s.into())).collect())
    }

    /// Convert JSON into a value, parsing intrinsic markers found in strings.
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(n.clone()),
            serde_json::Value::String(s) => match s.parse::<Intrinsic>() {
                Ok(intrinsic) => Self::Intrinsic(intrinsic),
                Err(_) => Self::String(s.clone()),
            },
            serde_json::Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            serde_json::Value::Object(map) => {
                Self::Map(map.iter().map(|(k, v)| (k.clone(), Self::from_json(v))).collect())
            }
        }
    }

    /// Convert TOML into a value. Datetimes become strings.
    #[must_use]
    pub fn from_toml(value: &toml::Value) -> Self {
        match value {
            toml::Value::String(s) => Self::from_json(&serde_json::Value::String(s.clone())),
            toml::Value::Integer(i) => Self::Number((*i).into()),
            toml::Value::Float(f) => Number::from_f64(*f).map_or(Self::Null, Self::Number),
            toml::Value::Boolean(b) => Self::Bool(*b),
            toml::Value::Datetime(d) => Self::String(d.to_string()),
            toml::Value::Array(items) => Self::List(items.iter().map(Self::from_toml).collect()),
            toml::Value::Table(table) => {
                Self::Map(table.iter().map(|(k, v)| (k.clone(), Self::from_toml(v))).collect())
            }
        }
    }

    /// Render into JSON with every intrinsic in native platform syntax.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Self::Intrinsic(intrinsic) => intrinsic.render_native(),
        }
    }

    /// Visit every intrinsic nested in this value.
    pub fn intrinsics(&self) -> Vec<&Intrinsic> {
        let mut found = Vec::new();
        self.collect_intrinsics(&mut found);
        found
    }

    fn collect_intrinsics<'a>(&'a self, found: &mut Vec<&'a Intrinsic>) {
        match self {
            Self::List(items) => items.iter().for_each(|v| v.collect_intrinsics(found)),
            Self::Map(map) => map.values().for_each(|v| v.collect_intrinsics(found)),
            Self::Intrinsic(intrinsic) => found.push(intrinsic),
            _ => {}
        }
    }

    /// Rewrite the targets of nested `Ref`/`GetAtt` intrinsics.
    ///
    /// `rename` returns the new logical ID, or `None` to leave a target untouched.
    pub fn retarget(&mut self, rename: &impl Fn(&str) -> Option<String>) {
        match self {
            Self::List(items) => items.iter_mut().for_each(|v| v.retarget(rename)),
            Self::Map(map) => map.values_mut().for_each(|v| v.retarget(rename)),
            Self::Intrinsic(intrinsic) => intrinsic.retarget(rename),
            _ => {}
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}

impl From<Intrinsic> for Value {
    fn from(value: Intrinsic) -> Self {
        Self::Intrinsic(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Self::Map(value)
    }
}
