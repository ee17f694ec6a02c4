//! Registry of function mixins.
//!
//! A function mixin is host-provided code bound to an import request and an
//! export name; applying one yields declarations from its call arguments.
//! This is how non-stylesheet modules participate in `-st-mixin`.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// A callable mixin. `args` are the evaluated, comma-separated call
/// arguments; the result is a list of `(property, value)` declarations.
pub trait MixinFunction: Send + Sync {
    fn apply(&self, args: &[String]) -> Result<Vec<(String, String)>, String>;
}

impl<F> MixinFunction for F
where
    F: Fn(&[String]) -> Result<Vec<(String, String)>, String> + Send + Sync,
{
    fn apply(&self, args: &[String]) -> Result<Vec<(String, String)>, String> {
        self(args)
    }
}

/// Function mixins keyed by `(module request, export name)`.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: RwLock<FxHashMap<(String, SmolStr), Arc<dyn MixinFunction>>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        module: impl Into<String>,
        export: impl Into<SmolStr>,
        function: Arc<dyn MixinFunction>,
    ) {
        self.functions.write().insert((module.into(), export.into()), function);
    }

    pub fn get(&self, module: &str, export: &str) -> Option<Arc<dyn MixinFunction>> {
        self.functions.read().get(&(module.to_string(), SmolStr::new(export))).cloned()
    }

    /// True if any export is registered under `module`; such requests skip
    /// stylesheet resolution entirely.
    pub fn has_module(&self, module: &str) -> bool {
        self.functions.read().keys().any(|(m, _)| m == module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_apply() {
        let registry = FunctionRegistry::new();
        registry.register(
            "./mixins.js",
            "stripes",
            Arc::new(|args: &[String]| {
                Ok(vec![("background".to_string(), args.join(" "))])
            }),
        );

        assert!(registry.has_module("./mixins.js"));
        assert!(!registry.has_module("./other.js"));

        let function = registry.get("./mixins.js", "stripes").unwrap();
        let decls = function.apply(&["red".into(), "blue".into()]).unwrap();
        assert_eq!(decls, vec![("background".to_string(), "red blue".to_string())]);
    }
}
