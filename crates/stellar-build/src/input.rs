//! Bundler input options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Entry points as the bundler accepts them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputOption {
    /// A single entry.
    Single(String),
    /// Unnamed entries.
    Many(Vec<String>),
    /// Entries keyed by output chunk name.
    Named(BTreeMap<String, String>),
}

impl InputOption {
    /// Entry module ids, in order.
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Self::Single(id) => vec![id.as_str()],
            Self::Many(ids) => ids.iter().map(String::as_str).collect(),
            Self::Named(map) => map.values().map(String::as_str).collect(),
        }
    }

    /// Whether `id` is already an entry.
    pub fn contains(&self, id: &str) -> bool {
        self.entries().contains(&id)
    }
}

/// Options the bundler is started with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Entry points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<InputOption>,
}

impl BuildOptions {
    /// Options with the given entries.
    pub fn with_inputs(inputs: &[&str]) -> Self {
        Self {
            input: Some(InputOption::Many(inputs.iter().map(|s| s.to_string()).collect())),
        }
    }

    /// Entry module ids, in order.
    pub fn entries(&self) -> Vec<&str> {
        self.input.as_ref().map(InputOption::entries).unwrap_or_default()
    }
}

/// Append entries to the bundler input, keeping its existing shape.
///
/// Entries already present are skipped. In a named map the new entry is
/// keyed by its own id.
pub fn add_input(mut options: BuildOptions, inputs: &[&str]) -> BuildOptions {
    let new: Vec<String> = inputs
        .iter()
        .filter(|id| !options.input.as_ref().is_some_and(|input| input.contains(id)))
        .map(|id| id.to_string())
        .collect();

    options.input = Some(match options.input.take() {
        None => InputOption::Many(new),
        Some(InputOption::Single(existing)) => {
            let mut all = vec![existing];
            all.extend(new);
            InputOption::Many(all)
        }
        Some(InputOption::Many(mut existing)) => {
            existing.extend(new);
            InputOption::Many(existing)
        }
        Some(InputOption::Named(mut existing)) => {
            for id in new {
                existing.insert(id.clone(), id);
            }
            InputOption::Named(existing)
        }
    });

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "@stellar-middleware";

    #[test]
    fn test_add_input_to_empty_options() {
        let options = add_input(BuildOptions::default(), &[ID]);
        assert_eq!(options.input, Some(InputOption::Many(vec![ID.to_string()])));
    }

    #[test]
    fn test_add_input_to_single_entry() {
        let options = BuildOptions {
            input: Some(InputOption::Single("src/entry.ts".into())),
        };
        let options = add_input(options, &[ID]);
        assert_eq!(options.entries(), vec!["src/entry.ts", ID]);
    }

    #[test]
    fn test_add_input_to_list() {
        let options = add_input(BuildOptions::with_inputs(&["a", "b"]), &[ID]);
        assert_eq!(options.entries(), vec!["a", "b", ID]);
    }

    #[test]
    fn test_add_input_to_named_map() {
        let options = BuildOptions {
            input: Some(InputOption::Named(BTreeMap::from([(
                "entry".to_string(),
                "src/entry.ts".to_string(),
            )]))),
        };
        let options = add_input(options, &[ID]);

        match options.input {
            Some(InputOption::Named(map)) => {
                assert_eq!(map.get(ID).map(String::as_str), Some(ID));
                assert_eq!(map.len(), 2);
            }
            other => panic!("expected named input, got {:?}", other),
        }
    }

    #[test]
    fn test_add_input_skips_existing() {
        let options = add_input(BuildOptions::with_inputs(&[ID]), &[ID]);
        let options = add_input(options, &[ID]);
        assert_eq!(options.entries(), vec![ID]);
    }

    #[test]
    fn test_untagged_input_shapes_deserialize() {
        let single: BuildOptions = serde_json::from_str(r#"{"input":"a.ts"}"#).unwrap();
        assert_eq!(single.input, Some(InputOption::Single("a.ts".into())));

        let named: BuildOptions = serde_json::from_str(r#"{"input":{"main":"a.ts"}}"#).unwrap();
        assert_eq!(named.entries(), vec!["a.ts"]);

        let none: BuildOptions = serde_json::from_str("{}").unwrap();
        assert!(none.entries().is_empty());
    }
}
