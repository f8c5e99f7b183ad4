//! The lifted-function registry.

use indexmap::IndexMap;
use jslift_binder::CallAugmentation;
use tracing::warn;

/// Placeholder passed for an explicit parameter the caller left out, so that
/// appended captures still line up with their parameters.
const MISSING_ARGUMENT: &str = "void 0";

/// A nested function moved to the top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiftedFunction {
    pub name: String,
    /// Parameters as declared.
    pub explicit_params: Vec<String>,
    /// Variables the function used to capture, in order of first reference.
    pub captured_params: Vec<String>,
    /// The emitted body block, starting with `{`.
    pub body: String,
}

impl LiftedFunction {
    pub fn new(name: impl Into<String>, explicit_params: Vec<String>, captured_params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            explicit_params,
            captured_params,
            body: String::new(),
        }
    }

    /// Explicit parameters followed by captured ones.
    pub fn parameters(&self) -> impl Iterator<Item = &str> {
        self.explicit_params
            .iter()
            .chain(self.captured_params.iter())
            .map(String::as_str)
    }

    /// Captured names that a call passing `argument_count` explicit
    /// arguments receives as trailing arguments.
    pub fn appended_captures(&self, argument_count: usize) -> &[String] {
        let skip = argument_count.saturating_sub(self.explicit_params.len());
        self.captured_params.get(skip..).unwrap_or(&[])
    }

    /// The full text of every argument appended to such a call: a
    /// `void 0` for each explicit parameter the call leaves out, then the
    /// captured names.
    pub fn appended_arguments(&self, argument_count: usize) -> Vec<&str> {
        let missing = self.explicit_params.len().saturating_sub(argument_count);
        std::iter::repeat(MISSING_ARGUMENT)
            .take(missing)
            .chain(self.appended_captures(argument_count).iter().map(String::as_str))
            .collect()
    }
}

#[derive(Debug)]
struct Entry {
    serial: u64,
    function: LiftedFunction,
}

/// Ticket returned by `Registry::register`, used to attach the body to the
/// record it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationId(u64);

/// Insertion-ordered map from function name to its lifted record.
///
/// Registering a name again replaces the record in place, so the output keeps
/// the position of the first declaration with the content of the last.
#[derive(Debug, Default)]
pub struct Registry {
    entries: IndexMap<String, Entry>,
    next_serial: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, function: LiftedFunction) -> RegistrationId {
        let serial = self.next_serial;
        self.next_serial += 1;
        if self.entries.contains_key(&function.name) {
            warn!(name = %function.name, "nested function redeclared; replacing earlier lifted definition");
        }
        self.entries.insert(function.name.clone(), Entry { serial, function });
        RegistrationId(serial)
    }

    /// Store the emitted body for the registration `id`. Does nothing if the
    /// record has since been replaced.
    pub fn set_body(&mut self, name: &str, id: RegistrationId, body: String) {
        if let Some(entry) = self.entries.get_mut(name) {
            if entry.serial == id.0 {
                entry.function.body = body;
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&LiftedFunction> {
        self.entries.get(name).map(|entry| &entry.function)
    }

    /// Records in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &LiftedFunction> {
        self.entries.values().map(|entry| &entry.function)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl CallAugmentation for Registry {
    fn appended_captures(&self, callee: &str, argument_count: usize) -> &[String] {
        self.get(callee)
            .map(|function| function.appended_captures(argument_count))
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_appended_arguments_without_explicit_params() {
        let f = LiftedFunction::new("f", vec![], names(&["a", "b"]));
        assert_eq!(f.appended_arguments(0), vec!["a", "b"]);
        assert_eq!(f.appended_arguments(1), vec!["b"]);
        assert!(f.appended_arguments(2).is_empty());
        assert!(f.appended_arguments(5).is_empty());
    }

    #[test]
    fn test_appended_arguments_pad_missing_explicit_params() {
        let f = LiftedFunction::new("f", names(&["p", "q"]), names(&["c"]));
        assert_eq!(f.appended_arguments(2), vec!["c"]);
        assert_eq!(f.appended_arguments(1), vec!["void 0", "c"]);
        assert_eq!(f.appended_arguments(0), vec!["void 0", "void 0", "c"]);
        assert!(f.appended_arguments(3).is_empty());
    }

    #[test]
    fn test_parameters_order() {
        let f = LiftedFunction::new("f", names(&["a"]), names(&["x", "y"]));
        assert_eq!(f.parameters().collect::<Vec<_>>(), vec!["a", "x", "y"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut registry = Registry::new();
        registry.register(LiftedFunction::new("a", vec![], names(&["x"])));
        registry.register(LiftedFunction::new("b", vec![], vec![]));
        registry.register(LiftedFunction::new("a", vec![], names(&["y"])));
        let order: Vec<&str> = registry.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        assert_eq!(registry.get("a").map(|f| f.captured_params.clone()), Some(names(&["y"])));
    }

    #[test]
    fn test_stale_body_is_ignored() {
        let mut registry = Registry::new();
        let first = registry.register(LiftedFunction::new("a", vec![], vec![]));
        let second = registry.register(LiftedFunction::new("a", vec![], vec![]));
        registry.set_body("a", second, "{ second }".to_string());
        registry.set_body("a", first, "{ first }".to_string());
        assert_eq!(registry.get("a").map(|f| f.body.as_str()), Some("{ second }"));
    }

    #[test]
    fn test_call_augmentation_lookup() {
        let mut registry = Registry::new();
        registry.register(LiftedFunction::new("f", names(&["p"]), names(&["c"])));
        assert_eq!(registry.appended_captures("f", 0), names(&["c"]).as_slice());
        assert!(registry.appended_captures("g", 0).is_empty());
    }
}
