//! Typed values: `st-array` and `st-map` boxes.
//!
//! A boxed value keeps structure through var indirection, so
//! `value(theme, primary)` can index into a map long after the map was
//! declared. Box types are pluggable through [`BoxRegistry`]; the default
//! registry carries the two built-ins plus their deprecated camel-case
//! aliases.

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;

use crate::css::value::{ValueNode, split_comma, stringify};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoxError {
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A value inside a box: either plain text or a nested box.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomValue {
    Str(String),
    Boxed(Box<BoxedValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoxPayload {
    Array(Vec<CustomValue>),
    Map(IndexMap<SmolStr, CustomValue>),
}

/// A parsed typed value, tagged with its canonical type name.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxedValue {
    pub tag: SmolStr,
    pub payload: BoxPayload,
}

/// Behavior of one box type.
pub trait BoxType: Send + Sync {
    fn parse(&self, args: &[ValueNode], registry: &BoxRegistry) -> Result<BoxPayload, BoxError>;

    /// Index one path step into the payload.
    fn index<'v>(&self, payload: &'v BoxPayload, key: &str) -> Option<&'v CustomValue>;

    /// The string a box renders to when used without a path.
    fn flatten(&self, payload: &BoxPayload) -> Result<String, BoxError>;
}

struct Registration {
    tag: SmolStr,
    behavior: Arc<dyn BoxType>,
    deprecated: bool,
}

/// Box types by name, including deprecated aliases.
#[derive(Default)]
pub struct BoxRegistry {
    entries: RwLock<FxHashMap<SmolStr, Registration>>,
}

/// A successful registry lookup.
pub struct BoxLookup {
    /// Canonical tag, regardless of the name used.
    pub tag: SmolStr,
    pub behavior: Arc<dyn BoxType>,
    /// True when looked up through a deprecated alias.
    pub deprecated: bool,
}

impl BoxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, tag: impl Into<SmolStr>, behavior: Arc<dyn BoxType>) {
        let tag = tag.into();
        self.entries.write().insert(
            tag.clone(),
            Registration { tag, behavior, deprecated: false },
        );
    }

    /// Register `alias` as a deprecated name for an existing type.
    pub fn register_alias(&self, alias: impl Into<SmolStr>, canonical: &str) {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(canonical) {
            let registration = Registration {
                tag: existing.tag.clone(),
                behavior: existing.behavior.clone(),
                deprecated: true,
            };
            entries.insert(alias.into(), registration);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<BoxLookup> {
        self.entries.read().get(name).map(|registration| BoxLookup {
            tag: registration.tag.clone(),
            behavior: registration.behavior.clone(),
            deprecated: registration.deprecated,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }
}

/// The registry with `st-array`, `st-map`, and their legacy aliases.
pub fn default_registry() -> &'static BoxRegistry {
    static REGISTRY: OnceLock<BoxRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let registry = BoxRegistry::new();
        registry.register("st-array", Arc::new(StArray));
        registry.register("st-map", Arc::new(StMap));
        registry.register_alias("stArray", "st-array");
        registry.register_alias("stMap", "st-map");
        registry
    })
}

/// Parse a function call into a boxed value if its name is a registered box
/// type. `Ok(None)` means the name is not a box type at all. The boolean
/// reports deprecated-alias use.
pub fn parse_box(
    name: &str,
    args: &[ValueNode],
    registry: &BoxRegistry,
) -> Result<Option<(BoxedValue, bool)>, BoxError> {
    let Some(lookup) = registry.lookup(name) else {
        return Ok(None);
    };
    let payload = lookup.behavior.parse(args, registry)?;
    Ok(Some((BoxedValue { tag: lookup.tag, payload }, lookup.deprecated)))
}

/// Walk `path` into a boxed value and render the result as a string.
pub fn get_value(
    boxed: &BoxedValue,
    path: &[&str],
    registry: &BoxRegistry,
) -> Result<String, BoxError> {
    let mut current = CustomValueRef::Boxed(boxed);
    for key in path {
        let CustomValueRef::Boxed(inner) = current else {
            return Err(BoxError::InvalidArgument(format!(
                "cannot index a plain value with `{key}`"
            )));
        };
        let behavior = registry
            .lookup(&inner.tag)
            .ok_or_else(|| BoxError::UnknownType(inner.tag.to_string()))?
            .behavior;
        let next = behavior.index(&inner.payload, key).ok_or_else(|| {
            BoxError::InvalidArgument(format!("`{key}` not found in `{}`", inner.tag))
        })?;
        current = match next {
            CustomValue::Str(text) => CustomValueRef::Str(text),
            CustomValue::Boxed(nested) => CustomValueRef::Boxed(nested),
        };
    }
    match current {
        CustomValueRef::Str(text) => Ok(text.clone()),
        CustomValueRef::Boxed(inner) => {
            let behavior = registry
                .lookup(&inner.tag)
                .ok_or_else(|| BoxError::UnknownType(inner.tag.to_string()))?
                .behavior;
            behavior.flatten(&inner.payload)
        }
    }
}

enum CustomValueRef<'v> {
    Str(&'v String),
    Boxed(&'v BoxedValue),
}

/// Convert a boxed value into plain JSON for exports.
pub fn unbox(boxed: &BoxedValue) -> serde_json::Value {
    match &boxed.payload {
        BoxPayload::Array(items) => {
            serde_json::Value::Array(items.iter().map(unbox_value).collect())
        }
        BoxPayload::Map(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(key, value)| (key.to_string(), unbox_value(value)))
                .collect(),
        ),
    }
}

fn unbox_value(value: &CustomValue) -> serde_json::Value {
    match value {
        CustomValue::Str(text) => serde_json::Value::String(text.clone()),
        CustomValue::Boxed(inner) => unbox(inner),
    }
}

/// One comma group becomes a nested box when it is a single registered
/// function call, plain text otherwise.
fn group_to_value(group: &[ValueNode], registry: &BoxRegistry) -> Result<CustomValue, BoxError> {
    if let [ValueNode::Function { name, args }] = group {
        if let Some((boxed, _)) = parse_box(name, args, registry)? {
            return Ok(CustomValue::Boxed(Box::new(boxed)));
        }
    }
    Ok(CustomValue::Str(stringify(group).trim().to_string()))
}

/// `st-array(a, b, ...)`: ordered values, indexed by position.
struct StArray;

impl BoxType for StArray {
    fn parse(&self, args: &[ValueNode], registry: &BoxRegistry) -> Result<BoxPayload, BoxError> {
        let items = split_comma(args)
            .iter()
            .map(|group| group_to_value(group, registry))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(BoxPayload::Array(items))
    }

    fn index<'v>(&self, payload: &'v BoxPayload, key: &str) -> Option<&'v CustomValue> {
        let BoxPayload::Array(items) = payload else { return None };
        items.get(key.parse::<usize>().ok()?)
    }

    fn flatten(&self, payload: &BoxPayload) -> Result<String, BoxError> {
        let BoxPayload::Array(items) = payload else {
            return Err(BoxError::InvalidArgument("expected an array payload".into()));
        };
        let parts = items
            .iter()
            .map(|item| match item {
                CustomValue::Str(text) => Ok(text.clone()),
                CustomValue::Boxed(_) => Err(BoxError::InvalidArgument(
                    "cannot flatten an array holding nested typed values".into(),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(parts.join(", "))
    }
}

/// `st-map(key value, ...)`: named values, indexed by key.
struct StMap;

impl BoxType for StMap {
    fn parse(&self, args: &[ValueNode], registry: &BoxRegistry) -> Result<BoxPayload, BoxError> {
        let mut entries = IndexMap::new();
        for group in split_comma(args) {
            let Some((ValueNode::Ident(key), rest)) = group.split_first() else {
                return Err(BoxError::InvalidArgument(format!(
                    "map entry `{}` must start with a key",
                    stringify(&group)
                )));
            };
            let rest: Vec<ValueNode> = rest
                .iter()
                .skip_while(|node| matches!(node, ValueNode::Space))
                .cloned()
                .collect();
            if rest.is_empty() {
                return Err(BoxError::InvalidArgument(format!(
                    "map key `{key}` is missing a value"
                )));
            }
            entries.insert(SmolStr::new(key), group_to_value(&rest, registry)?);
        }
        Ok(BoxPayload::Map(entries))
    }

    fn index<'v>(&self, payload: &'v BoxPayload, key: &str) -> Option<&'v CustomValue> {
        let BoxPayload::Map(entries) = payload else { return None };
        entries.get(key)
    }

    fn flatten(&self, payload: &BoxPayload) -> Result<String, BoxError> {
        let _ = payload;
        Err(BoxError::InvalidArgument(
            "a map cannot be used directly as a declaration value".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::value::parse_value;

    fn parse_one(input: &str) -> (BoxedValue, bool) {
        let nodes = parse_value(input);
        let [ValueNode::Function { name, args }] = nodes.as_slice() else {
            panic!("expected a single function call");
        };
        parse_box(name, args, default_registry())
            .unwrap()
            .expect("expected a registered box type")
    }

    #[test]
    fn array_parses_and_indexes() {
        let (boxed, deprecated) = parse_one("st-array(red, 1px solid green)");
        assert!(!deprecated);
        assert_eq!(boxed.tag, "st-array");
        assert_eq!(get_value(&boxed, &["0"], default_registry()).unwrap(), "red");
        assert_eq!(get_value(&boxed, &["1"], default_registry()).unwrap(), "1px solid green");
    }

    #[test]
    fn array_flattens_without_path() {
        let (boxed, _) = parse_one("st-array(red, green)");
        assert_eq!(get_value(&boxed, &[], default_registry()).unwrap(), "red, green");
    }

    #[test]
    fn map_parses_and_indexes() {
        let (boxed, _) = parse_one("st-map(primary green, border 1px solid red)");
        assert_eq!(get_value(&boxed, &["primary"], default_registry()).unwrap(), "green");
        assert_eq!(
            get_value(&boxed, &["border"], default_registry()).unwrap(),
            "1px solid red"
        );
    }

    #[test]
    fn map_without_path_is_an_error() {
        let (boxed, _) = parse_one("st-map(a b)");
        assert!(matches!(
            get_value(&boxed, &[], default_registry()),
            Err(BoxError::InvalidArgument(_))
        ));
    }

    #[test]
    fn nested_boxes() {
        let (boxed, _) = parse_one("st-map(colors st-array(red, green))");
        assert_eq!(get_value(&boxed, &["colors", "1"], default_registry()).unwrap(), "green");
    }

    #[test]
    fn legacy_aliases_parse_with_canonical_tag() {
        let (boxed, deprecated) = parse_one("stArray(a, b)");
        assert!(deprecated);
        assert_eq!(boxed.tag, "st-array");
        let (boxed, deprecated) = parse_one("stMap(k v)");
        assert!(deprecated);
        assert_eq!(boxed.tag, "st-map");
    }

    #[test]
    fn bad_paths_error() {
        let (boxed, _) = parse_one("st-map(a b)");
        assert!(matches!(
            get_value(&boxed, &["missing"], default_registry()),
            Err(BoxError::InvalidArgument(_))
        ));
        assert!(matches!(
            get_value(&boxed, &["a", "deeper"], default_registry()),
            Err(BoxError::InvalidArgument(_))
        ));
    }

    #[test]
    fn map_entry_without_value_errors() {
        let nodes = parse_value("st-map(lonely)");
        let [ValueNode::Function { name, args }] = nodes.as_slice() else { panic!() };
        assert!(matches!(
            parse_box(name, args, default_registry()),
            Err(BoxError::InvalidArgument(_))
        ));
    }

    #[test]
    fn unbox_to_json() {
        let (boxed, _) = parse_one("st-map(primary green, sizes st-array(1px, 2px))");
        let json = unbox(&boxed);
        assert_eq!(json["primary"], "green");
        assert_eq!(json["sizes"][0], "1px");
        assert_eq!(json["sizes"][1], "2px");
    }

    #[test]
    fn unknown_function_is_not_a_box() {
        let nodes = parse_value("linear-gradient(red, green)");
        let [ValueNode::Function { name, args }] = nodes.as_slice() else { panic!() };
        assert!(parse_box(name, args, default_registry()).unwrap().is_none());
    }
}
