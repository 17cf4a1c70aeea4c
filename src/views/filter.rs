//! `all`-or-one filter values as they arrive from the dashboard controls.

use crate::execution::ExecutionStatus;
use crate::task::{TaskPriority, TaskStatus};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An enumerated value a filter can select.
pub trait FilterValue: Copy + PartialEq {
    fn parse(value: &str) -> Option<Self>;
    fn as_str(&self) -> &'static str;
}

impl FilterValue for TaskStatus {
    fn parse(value: &str) -> Option<Self> {
        TaskStatus::parse(value)
    }
    fn as_str(&self) -> &'static str {
        TaskStatus::as_str(self)
    }
}

impl FilterValue for TaskPriority {
    fn parse(value: &str) -> Option<Self> {
        TaskPriority::parse(value)
    }
    fn as_str(&self) -> &'static str {
        TaskPriority::as_str(self)
    }
}

impl FilterValue for ExecutionStatus {
    fn parse(value: &str) -> Option<Self> {
        ExecutionStatus::parse(value)
    }
    fn as_str(&self) -> &'static str {
        ExecutionStatus::as_str(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter<T> {
    #[default]
    All,
    Only(T),
}

impl<T: FilterValue> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(wanted) => wanted == value,
        }
    }

    /// Parse a raw control value. Anything outside the enumerated set is
    /// treated as `all` rather than rejected.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw == "all" {
            return Filter::All;
        }
        match T::parse(raw) {
            Some(value) => Filter::Only(value),
            None => {
                tracing::warn!("Ignoring unknown filter value {:?}, using all", raw);
                Filter::All
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Only(value) => value.as_str(),
        }
    }
}

impl<T: FilterValue> Serialize for Filter<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, T: FilterValue> Deserialize<'de> for Filter<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Filter::parse_lenient(&raw))
    }
}

/// Case-insensitive substring match; an empty needle matches everything.
pub(crate) fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    needle_lower.is_empty() || haystack.to_lowercase().contains(needle_lower)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(Filter::<TaskStatus>::parse_lenient("all"), Filter::All);
        assert_eq!(
            Filter::<TaskStatus>::parse_lenient("paused"),
            Filter::Only(TaskStatus::Paused)
        );
        assert_eq!(Filter::<TaskStatus>::parse_lenient("exploded"), Filter::All);
        assert_eq!(Filter::<TaskPriority>::parse_lenient(""), Filter::All);
    }

    #[test]
    fn test_serde_is_lenient() {
        let f: Filter<TaskPriority> = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(f, Filter::Only(TaskPriority::Urgent));
        let f: Filter<TaskPriority> = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(f, Filter::All);
        assert_eq!(
            serde_json::to_string(&Filter::Only(ExecutionStatus::Failed)).unwrap(),
            "\"failed\""
        );
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Nightly Lint", "lint"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Deploy", "lint"));
    }
}
