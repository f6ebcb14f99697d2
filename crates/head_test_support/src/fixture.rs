//! Golden fixture format.
//!
//! ```toml
//! name = "meta dedup keeps first position"
//!
//! [[instances]]
//! title = "Outer"
//! meta = [{ attributes = [["name", "description"], ["content", "outer"]] }]
//!
//! [expected]
//! title = "<title>Outer</title>"
//! ```
//!
//! Attributes are ordered `[name, value]` pairs. A string value is text,
//! `true` is a bare flag and `false` is an undefined value. Missing expected
//! entries mean the aspect renders as an empty string.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub config: Option<FixtureConfig>,
    #[serde(default)]
    pub instances: Vec<FixtureInstance>,
    #[serde(default)]
    pub expected: Expected,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureConfig {
    pub encode_special_characters: Option<bool>,
    pub managed_attribute: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FixtureValue {
    Text(String),
    Flag(bool),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureTag {
    #[serde(default)]
    pub attributes: Vec<(String, FixtureValue)>,
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureInstance {
    pub title: Option<String>,
    pub title_template: Option<String>,
    pub default_title: Option<String>,
    pub title_attributes: Option<Vec<(String, FixtureValue)>>,
    pub base: Option<FixtureTag>,
    pub html_attributes: Option<Vec<(String, FixtureValue)>>,
    pub body_attributes: Option<Vec<(String, FixtureValue)>>,
    #[serde(default)]
    pub meta: Vec<FixtureTag>,
    #[serde(default)]
    pub link: Vec<FixtureTag>,
    #[serde(default)]
    pub script: Vec<FixtureTag>,
    #[serde(default)]
    pub noscript: Vec<FixtureTag>,
    #[serde(default)]
    pub style: Vec<FixtureTag>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expected {
    #[serde(default)]
    pub html_attributes: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub meta: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub noscript: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub body_attributes: String,
}
