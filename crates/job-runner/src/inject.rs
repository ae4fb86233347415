//! Value injection into template text
//!
//! Injection is a pure text rewrite. For each injection point, the first line
//! that assigns to that exact name has its right-hand side replaced by a
//! literal rendering of the value; every other byte of the template is left
//! alone. Only the first assignment is rewritten, even when the name is
//! assigned again further down.

use crate::error::{JobError, Result};
use crate::literal;
use crate::template::{TemplateDescriptor, ValueShape};
use serde_json::{Map, Value};
use std::ops::Range;
use tracing::debug;

/// One element of a [`InjectionValue::Records`] list
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// A key/value object such as `{"uuid": ..., "new_url": ...}`
    Object(Map<String, Value>),
    /// A two-element pair
    Pair(Value, Value),
}

impl Record {
    fn render(&self) -> String {
        match self {
            Record::Object(map) => literal::json(&Value::Object(map.clone())),
            Record::Pair(a, b) => literal::sequence([literal::json(a), literal::json(b)]),
        }
    }
}

/// A typed value for an injection point
#[derive(Debug, Clone, PartialEq)]
pub enum InjectionValue {
    /// Single string
    Text(String),
    /// List of strings
    TextList(Vec<String>),
    /// List of records
    Records(Vec<Record>),
}

impl InjectionValue {
    /// Shape of this value
    pub fn shape(&self) -> ValueShape {
        match self {
            InjectionValue::Text(_) => ValueShape::Text,
            InjectionValue::TextList(_) => ValueShape::TextList,
            InjectionValue::Records(_) => ValueShape::Records,
        }
    }

    /// Literal rendering written into the template
    pub fn render(&self) -> String {
        match self {
            InjectionValue::Text(s) => literal::quote(s),
            InjectionValue::TextList(items) => {
                literal::sequence(items.iter().map(|s| literal::quote(s)))
            }
            InjectionValue::Records(records) => literal::sequence(records.iter().map(Record::render)),
        }
    }

    /// Validate a JSON value against `shape`
    pub fn from_json(name: &str, shape: ValueShape, value: Value) -> Result<Self> {
        match shape {
            ValueShape::Text => match value {
                Value::String(s) => Ok(InjectionValue::Text(s)),
                other => Err(JobError::invalid_injection(
                    name,
                    format!("expected a string, got {}", kind(&other)),
                )),
            },
            ValueShape::TextList => {
                let items = expect_array(name, value)?;
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Value::String(s) => Ok(s),
                        other => Err(JobError::invalid_injection(
                            name,
                            format!("element {} must be a string, got {}", i, kind(&other)),
                        )),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(InjectionValue::TextList)
            }
            ValueShape::Records => {
                let items = expect_array(name, value)?;
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Value::Object(map) => Ok(Record::Object(map)),
                        Value::Array(mut pair) if pair.len() == 2 => {
                            let second = pair.pop().unwrap_or(Value::Null);
                            let first = pair.pop().unwrap_or(Value::Null);
                            Ok(Record::Pair(first, second))
                        }
                        other => Err(JobError::invalid_injection(
                            name,
                            format!(
                                "element {} must be an object or a two-element pair, got {}",
                                i,
                                kind(&other)
                            ),
                        )),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(InjectionValue::Records)
            }
        }
    }
}

fn expect_array(name: &str, value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(JobError::invalid_injection(
            name,
            format!("expected an array, got {}", kind(&other)),
        )),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Ordered set of values to inject, keyed by injection-point name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionSet {
    entries: Vec<(String, InjectionValue)>,
}

impl InjectionSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a value
    pub fn insert(&mut self, name: impl Into<String>, value: InjectionValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: InjectionValue) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a value
    pub fn get(&self, name: &str) -> Option<&InjectionValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InjectionValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a set from raw JSON, validating each value against `descriptor`
    pub fn from_json(descriptor: &TemplateDescriptor, values: Map<String, Value>) -> Result<Self> {
        let mut set = Self::new();
        for (name, value) in values {
            let point = descriptor
                .point(&name)
                .ok_or_else(|| JobError::UnknownInjection {
                    template: descriptor.key.clone(),
                    name: name.clone(),
                })?;
            let value = InjectionValue::from_json(&name, point.shape, value)?;
            set.insert(name, value);
        }
        Ok(set)
    }

    /// Check every value against `descriptor`
    pub fn validate(&self, descriptor: &TemplateDescriptor) -> Result<()> {
        for (name, value) in self.iter() {
            let point = descriptor
                .point(name)
                .ok_or_else(|| JobError::UnknownInjection {
                    template: descriptor.key.clone(),
                    name: name.to_string(),
                })?;
            if point.shape != value.shape() {
                return Err(JobError::invalid_injection(
                    name,
                    format!("expected {}, got {}", point.shape, value.shape()),
                ));
            }
        }
        Ok(())
    }
}

/// Which injections were applied and which found no assignment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
    /// Names whose assignment was rewritten
    pub applied: Vec<String>,
    /// Names with no assignment in the template
    pub skipped: Vec<String>,
}

/// Template text after injection
#[derive(Debug, Clone)]
pub struct Injected {
    /// Rewritten text
    pub text: String,
    /// What happened to each injection
    pub report: InjectionReport,
}

/// Byte range of the right-hand side of the first assignment to `name`
///
/// An assignment line is optional leading spaces or tabs, the exact name,
/// optional spaces or tabs, then a single `=` (not `==`). The range starts
/// after the `=` and any spaces or tabs that follow it, and ends before the
/// line's newline (or at the end of the text).
pub fn find_assignment(text: &str, name: &str) -> Option<Range<usize>> {
    if name.is_empty() {
        return None;
    }

    let mut line_start = 0;
    while line_start <= text.len() {
        let line_end = text[line_start..]
            .find('\n')
            .map_or(text.len(), |i| line_start + i);
        let line = &text[line_start..line_end];

        if let Some(rhs) = assignment_rhs(line, name) {
            return Some(line_start + rhs.start..line_start + rhs.end);
        }

        if line_end == text.len() {
            break;
        }
        line_start = line_end + 1;
    }
    None
}

fn assignment_rhs(line: &str, name: &str) -> Option<Range<usize>> {
    let is_blank = |c: char| c == ' ' || c == '\t';

    let indent = line.len() - line.trim_start_matches(is_blank).len();
    let rest = line[indent..].strip_prefix(name)?;
    let after_name = rest.trim_start_matches(is_blank);
    // `name_x = ...` is a different name
    if after_name.len() == rest.len() && !rest.starts_with('=') {
        return None;
    }
    let value = after_name.strip_prefix('=')?;
    if value.starts_with('=') {
        return None;
    }
    let value_trimmed = value.trim_start_matches(is_blank);

    let start = line.len() - value_trimmed.len();
    // A CRLF line keeps its carriage return
    let end = if line.ends_with('\r') { line.len() - 1 } else { line.len() };
    Some(start..end.max(start))
}

/// Rewrite the first assignment of every name in `values`
///
/// Names without an assignment are skipped, not reported as errors.
pub fn inject(text: &str, values: &InjectionSet) -> Injected {
    let mut out = text.to_string();
    let mut report = InjectionReport::default();

    for (name, value) in values.iter() {
        match find_assignment(&out, name) {
            Some(range) => {
                out.replace_range(range, &value.render());
                report.applied.push(name.to_string());
            }
            None => {
                debug!("No assignment to {} in template, skipping injection", name);
                report.skipped.push(name.to_string());
            }
        }
    }

    Injected { text: out, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::InjectionPoint;
    use serde_json::json;

    const SHEET: &str = "import os\n\
GOOGLE_SHEET_URL = \"https://docs.google.com/old\"\n\
\n\
def main():\n    print(GOOGLE_SHEET_URL)\n";

    #[test]
    fn test_inject_text() {
        let values = InjectionSet::new().with(
            "GOOGLE_SHEET_URL",
            InjectionValue::Text("https://docs.google.com/new".into()),
        );
        let injected = inject(SHEET, &values);

        assert_eq!(
            injected.text,
            SHEET.replace("https://docs.google.com/old", "https://docs.google.com/new")
        );
        assert_eq!(injected.report.applied, vec!["GOOGLE_SHEET_URL"]);
        assert!(injected.report.skipped.is_empty());
    }

    #[test]
    fn test_missing_name_leaves_text_unchanged() {
        let values = InjectionSet::new().with("uuid_list", InjectionValue::TextList(vec!["a".into()]));
        let injected = inject(SHEET, &values);

        assert_eq!(injected.text, SHEET);
        assert_eq!(injected.report.skipped, vec!["uuid_list"]);
    }

    #[test]
    fn test_only_first_assignment_rewritten() {
        let text = "uuid_list = []\nuuid_list = ['keep']\n";
        let values = InjectionSet::new().with(
            "uuid_list",
            InjectionValue::TextList(vec!["u1".into(), "u2".into()]),
        );

        assert_eq!(
            inject(text, &values).text,
            "uuid_list = [\"u1\", \"u2\"]\nuuid_list = ['keep']\n"
        );
    }

    #[test]
    fn test_indented_assignment_matches() {
        let text = "if __name__ == '__main__':\n    multimedia_data = [(\"a\",\"b\"),]\n    run()\n";
        let values = InjectionSet::new().with(
            "multimedia_data",
            InjectionValue::Records(vec![Record::Pair(json!("id1"), json!("https://new"))]),
        );

        assert_eq!(
            inject(text, &values).text,
            "if __name__ == '__main__':\n    multimedia_data = [[\"id1\", \"https://new\"]]\n    run()\n"
        );
    }

    #[test]
    fn test_name_prefix_and_comparison_do_not_match() {
        assert_eq!(find_assignment("uuid_list_old = 1\n", "uuid_list"), None);
        assert_eq!(find_assignment("uuid_list == 1\n", "uuid_list"), None);
        assert_eq!(find_assignment("# uuid_list = 1\n", "uuid_list"), None);
        assert_eq!(find_assignment("x.uuid_list = 1\n", "uuid_list"), None);
    }

    #[test]
    fn test_spacing_variants() {
        let text = "A=1\nB  =\t2\n";
        assert_eq!(find_assignment(text, "A"), Some(2..3));
        assert_eq!(&text[find_assignment(text, "B").unwrap()], "2");
    }

    #[test]
    fn test_final_line_without_newline() {
        let text = "x = 1\nuuid_list = []";
        let values = InjectionSet::new().with("uuid_list", InjectionValue::TextList(vec![]));
        assert_eq!(inject(text, &values).text, "x = 1\nuuid_list = []");

        let range = find_assignment(text, "uuid_list").unwrap();
        assert_eq!(range, 18..20);
    }

    #[test]
    fn test_crlf_line_keeps_carriage_return() {
        let text = "URL = 'a'\r\nnext = 1\r\n";
        let values = InjectionSet::new().with("URL", InjectionValue::Text("b".into()));
        assert_eq!(inject(text, &values).text, "URL = \"b\"\r\nnext = 1\r\n");
    }

    #[test]
    fn test_empty_right_hand_side() {
        let text = "URL =\nrest\n";
        let values = InjectionSet::new().with("URL", InjectionValue::Text("v".into()));
        assert_eq!(inject(text, &values).text, "URL =\"v\"\nrest\n");
    }

    #[test]
    fn test_records_render() {
        let value = InjectionValue::Records(vec![
            Record::Object(
                json!({"uuid": "u-1", "new_ppt_url": "https://p"})
                    .as_object()
                    .cloned()
                    .unwrap(),
            ),
            Record::Pair(json!("u-2"), json!("https://q")),
        ]);
        assert_eq!(
            value.render(),
            r#"[{"uuid": "u-1", "new_ppt_url": "https://p"}, ["u-2", "https://q"]]"#
        );
    }

    #[test]
    fn test_record_keys_keep_caller_order() {
        let descriptor = TemplateDescriptor::standard("any.py");
        let values: Map<String, Value> =
            serde_json::from_str(r#"{"pairs": [{"z": 1, "a": 2, "m": {"y": 0, "b": 1}}]}"#).unwrap();
        let set = InjectionSet::from_json(&descriptor, values).unwrap();

        assert_eq!(
            set.get("pairs").unwrap().render(),
            r#"[{"z": 1, "a": 2, "m": {"y": 0, "b": 1}}]"#
        );
    }

    #[test]
    fn test_from_json_shapes() {
        let descriptor = TemplateDescriptor::standard("any.py");
        let values = json!({
            "GOOGLE_SHEET_URL": "https://sheet",
            "uuid_list": ["a", "b"],
            "pairs": [{"uuid": "u", "new_ppt_url": "n"}, ["x", "y"]],
        });
        let set = InjectionSet::from_json(&descriptor, values.as_object().cloned().unwrap()).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(
            set.get("GOOGLE_SHEET_URL"),
            Some(&InjectionValue::Text("https://sheet".into()))
        );
        assert!(matches!(set.get("pairs"), Some(InjectionValue::Records(r)) if r.len() == 2));
    }

    #[test]
    fn test_from_json_rejects_wrong_shapes() {
        let descriptor = TemplateDescriptor::standard("any.py");

        let err = InjectionSet::from_json(
            &descriptor,
            json!({"uuid_list": "not-a-list"}).as_object().cloned().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, JobError::InvalidInjection { ref name, .. } if name == "uuid_list"));

        let err = InjectionSet::from_json(
            &descriptor,
            json!({"pairs": [["only-one"]]}).as_object().cloned().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, JobError::InvalidInjection { .. }));

        let err = InjectionSet::from_json(
            &descriptor,
            json!({"uuid_list": ["ok", 3]}).as_object().cloned().unwrap(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("element 1 must be a string"));
    }

    #[test]
    fn test_from_json_rejects_undeclared_name() {
        let descriptor = TemplateDescriptor::new(
            "custom.py",
            vec![InjectionPoint::new("TARGET", ValueShape::Text)],
        );
        let err = InjectionSet::from_json(
            &descriptor,
            json!({"uuid_list": []}).as_object().cloned().unwrap(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            JobError::UnknownInjection { ref template, ref name }
                if template == "custom.py" && name == "uuid_list"
        ));
    }

    #[test]
    fn test_validate_shape_mismatch() {
        let descriptor = TemplateDescriptor::standard("any.py");
        let set = InjectionSet::new().with("uuid_list", InjectionValue::Text("x".into()));
        assert!(matches!(
            set.validate(&descriptor),
            Err(JobError::InvalidInjection { .. })
        ));
    }

    #[test]
    fn test_insert_replaces() {
        let mut set = InjectionSet::new();
        set.insert("URL", InjectionValue::Text("a".into()));
        set.insert("URL", InjectionValue::Text("b".into()));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("URL"), Some(&InjectionValue::Text("b".into())));
    }
}
