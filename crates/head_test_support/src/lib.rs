use head::{AttrList, AttrValue, HeadConfig, HeadState, PropBag, TagDescriptor};
use std::fs;
use std::path::{Path, PathBuf};

pub mod fixture;

pub use crate::fixture::{Expected, Fixture, FixtureConfig, FixtureInstance, FixtureTag, FixtureValue};

/// Every `*.toml` fixture in `dir`, sorted by file name.
pub fn load_fixtures(dir: &Path) -> Vec<(PathBuf, Fixture)> {
    let entries = fs::read_dir(dir)
        .unwrap_or_else(|err| panic!("failed to read fixture dir {dir:?}: {err}"));
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();
    paths
        .into_iter()
        .map(|path| {
            let fixture = load_fixture(&path);
            (path, fixture)
        })
        .collect()
}

pub fn load_fixture(path: &Path) -> Fixture {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|err| panic!("failed to read fixture {path:?}: {err}"));
    toml::from_str(&content).unwrap_or_else(|err| panic!("invalid fixture {path:?}: {err}"))
}

/// One `aspect: markup` line per aspect, in head order.
pub fn render_lines(state: &HeadState) -> Vec<String> {
    head::Aspect::ALL
        .iter()
        .map(|aspect| format!("{aspect}: {}", state.slot(*aspect)))
        .collect()
}

/// Report of every aspect whose rendered line differs, one block per aspect.
/// Lines are `render_lines` output; a side that has no line for an aspect
/// shows `<missing>`.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;
    fn split(line: &str) -> (String, String) {
        match line.split_once(": ") {
            Some((aspect, markup)) => (aspect.to_string(), markup.to_string()),
            None => (String::new(), line.to_string()),
        }
    }
    fn lookup(lines: &[(String, String)], aspect: &str) -> String {
        lines
            .iter()
            .find(|(a, _)| a == aspect)
            .map_or_else(|| "<missing>".to_string(), |(_, markup)| markup.clone())
    }

    let expected: Vec<(String, String)> = expected.iter().map(|l| split(l)).collect();
    let actual: Vec<(String, String)> = actual.iter().map(|l| split(l)).collect();

    let mut aspects: Vec<&str> = Vec::new();
    for (aspect, _) in expected.iter().chain(&actual) {
        if !aspects.contains(&aspect.as_str()) {
            aspects.push(aspect.as_str());
        }
    }

    let mut out = String::new();
    let mut mismatches = 0;
    for aspect in aspects {
        let left = lookup(&expected, aspect);
        let right = lookup(&actual, aspect);
        if left == right {
            continue;
        }
        mismatches += 1;
        let _ = writeln!(&mut out, "[{aspect}]");
        let _ = writeln!(&mut out, "  expected: {left}");
        let _ = writeln!(&mut out, "    actual: {right}");
    }
    let _ = writeln!(&mut out, "{mismatches} aspect(s) differ");
    out
}

fn attr_list(pairs: &[(String, FixtureValue)]) -> AttrList {
    pairs
        .iter()
        .map(|(name, value)| (name.as_str(), AttrValue::from(value)))
        .collect()
}

impl From<&FixtureValue> for AttrValue {
    fn from(value: &FixtureValue) -> Self {
        match value {
            FixtureValue::Text(text) => AttrValue::Text(text.clone()),
            FixtureValue::Flag(true) => AttrValue::Flag,
            FixtureValue::Flag(false) => AttrValue::Undefined,
        }
    }
}

impl FixtureTag {
    pub fn to_descriptor(&self) -> TagDescriptor {
        TagDescriptor {
            attributes: attr_list(&self.attributes),
            content: self.content.clone(),
        }
    }
}

impl FixtureInstance {
    pub fn to_props(&self) -> PropBag {
        let tags = |list: &[FixtureTag]| -> Vec<TagDescriptor> {
            list.iter().map(FixtureTag::to_descriptor).collect()
        };
        PropBag {
            title: self.title.clone(),
            title_template: self.title_template.clone(),
            default_title: self.default_title.clone(),
            title_attributes: self.title_attributes.as_deref().map(attr_list),
            base: self.base.as_ref().map(FixtureTag::to_descriptor),
            html_attributes: self.html_attributes.as_deref().map(attr_list),
            body_attributes: self.body_attributes.as_deref().map(attr_list),
            meta: tags(&self.meta),
            link: tags(&self.link),
            script: tags(&self.script),
            noscript: tags(&self.noscript),
            style: tags(&self.style),
        }
    }
}

impl Fixture {
    pub fn config(&self) -> HeadConfig {
        let mut config = HeadConfig::default();
        if let Some(fixture) = &self.config {
            if let Some(encode) = fixture.encode_special_characters {
                config.encode_special_characters = encode;
            }
            config.managed_attribute = fixture.managed_attribute.clone();
        }
        config
    }

    pub fn props(&self) -> Vec<PropBag> {
        self.instances.iter().map(FixtureInstance::to_props).collect()
    }

    pub fn expected_lines(&self) -> Vec<String> {
        let e = &self.expected;
        [
            ("htmlAttributes", &e.html_attributes),
            ("title", &e.title),
            ("base", &e.base),
            ("meta", &e.meta),
            ("link", &e.link),
            ("script", &e.script),
            ("noscript", &e.noscript),
            ("style", &e.style),
            ("bodyAttributes", &e.body_attributes),
        ]
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diff_names_only_the_aspects_that_differ() {
        let expected = lines(&["title: <title>A</title>", "base: ", "meta: "]);
        let actual = lines(&["title: <title>B</title>", "base: ", "meta: <meta/>"]);
        let report = diff_lines(&expected, &actual);
        assert!(report.contains("[title]\n  expected: <title>A</title>\n    actual: <title>B</title>"));
        assert!(report.contains("[meta]"));
        assert!(!report.contains("[base]"));
        assert!(report.ends_with("2 aspect(s) differ\n"));
    }

    #[test]
    fn diff_marks_missing_aspects() {
        let report = diff_lines(&lines(&["style: "]), &[]);
        assert!(report.contains("[style]\n  expected: \n    actual: <missing>"));
    }
}
