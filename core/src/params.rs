//! Request parameter model and URL encoding.
//!
//! # Design
//! All three parameter shapes encode through a single routine parameterized
//! by the percent-escaping dialect. Absent optional values are dropped at
//! construction time so they never reach the wire as empty fields.

use crate::encoding::{url_form_encode, url_query_encode};

/// The value shapes a request parameter can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterValue {
    /// A single string value.
    Simple(String),
    /// Ordered values sharing one name, encoded with a `[]` suffix each.
    Array(Vec<String>),
    /// String-keyed entries sharing one name, encoded with `[key]`
    /// suffixes. Entry order is preserved in the encoded output.
    Dictionary(Vec<(String, String)>),
}

/// A named request parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    value: ParameterValue,
}

impl Parameter {
    pub fn simple(name: impl Into<String>, value: impl Into<String>) -> Parameter {
        Parameter {
            name: name.into(),
            value: ParameterValue::Simple(value.into()),
        }
    }

    /// `None` when the source value is absent, so optional parameters can
    /// be collected without ever encoding an empty field.
    pub fn optional(name: impl Into<String>, value: Option<String>) -> Option<Parameter> {
        value.map(|value| Parameter::simple(name, value))
    }

    pub fn array(name: impl Into<String>, values: Vec<String>) -> Parameter {
        Parameter {
            name: name.into(),
            value: ParameterValue::Array(values),
        }
    }

    /// Builds a dictionary parameter, dropping entries whose value is
    /// absent.
    pub fn dictionary(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (String, Option<String>)>,
    ) -> Parameter {
        let entries = entries
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect();
        Parameter {
            name: name.into(),
            value: ParameterValue::Dictionary(entries),
        }
    }
}

/// An ordered set of uniquely named request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<Parameter>,
}

impl Parameters {
    /// Duplicate parameter names are caller bugs, not runtime data.
    pub fn new(parameters: Vec<Parameter>) -> Parameters {
        for (i, parameter) in parameters.iter().enumerate() {
            assert!(
                parameters[..i].iter().all(|earlier| earlier.name != parameter.name),
                "duplicate parameter name `{}`",
                parameter.name
            );
        }
        Parameters { entries: parameters }
    }

    pub fn empty() -> Parameters {
        Parameters { entries: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encoding for GET query strings.
    pub fn url_query_encoded(&self) -> String {
        self.url_encoded(url_query_encode)
    }

    /// Encoding for POST/PATCH form bodies.
    pub fn url_form_encoded(&self) -> String {
        self.url_encoded(url_form_encode)
    }

    fn url_encoded(&self, escape: fn(&str) -> String) -> String {
        let fragments: Vec<String> = self
            .entries
            .iter()
            .map(|parameter| {
                let name = escape(&parameter.name);
                match &parameter.value {
                    ParameterValue::Simple(value) => {
                        format!("{name}={}", escape(value))
                    }
                    ParameterValue::Array(values) => values
                        .iter()
                        .map(|value| format!("{name}[]={}", escape(value)))
                        .collect::<Vec<_>>()
                        .join("&"),
                    ParameterValue::Dictionary(entries) => entries
                        .iter()
                        .map(|(key, value)| format!("{name}[{}]={}", escape(key), escape(value)))
                        .collect::<Vec<_>>()
                        .join("&"),
                }
            })
            .collect();
        fragments.join("&")
    }
}
