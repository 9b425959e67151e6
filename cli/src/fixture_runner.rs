use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use notedoc::structure_document;
use serde::Deserialize;
use terminology::Recognizer;
use tracing::debug;

const FIXTURE_SUFFIX: &str = ".note.md";

/// Expectations declared in a fixture's frontmatter. Absent keys are not checked.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fixture {
    #[serde(default)]
    pub description: Option<String>,

    /// Canonical terms of the annotation set, in order.
    #[serde(default)]
    pub expect_terms: Option<Vec<String>>,

    /// Heading titles in outline pre-order.
    #[serde(default)]
    pub expect_sections: Option<Vec<String>>,

    /// Section type names of classified headings, in source order.
    #[serde(default)]
    pub expect_section_types: Option<Vec<String>>,

    /// Each entry must be a substring of some patient-field error.
    #[serde(default)]
    pub expect_patient_errors: Option<Vec<String>>,
}

/// Split a fixture into its frontmatter and the note after it.
pub fn parse_fixture(content: &str) -> Result<(Fixture, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let rest = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let close = rest
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;
    let frontmatter = rest[..close].trim_end_matches('\r');
    let after = &rest[close + 4..];
    let note = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after);

    let fixture = toml::from_str(frontmatter).map_err(|e| format!("TOML parse error: {e}"))?;
    Ok((fixture, note))
}

pub enum Outcome {
    Pass,
    Fail(String),
}

pub struct FixtureResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: Outcome,
}

impl FixtureResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.trim_end_matches(FIXTURE_SUFFIX))
                .unwrap_or("?")
        })
    }
}

fn run_fixture(path: &Path, recognizer: &Recognizer<'_>) -> FixtureResult {
    let fail = |description: Option<String>, reason: String| FixtureResult {
        path: path.to_path_buf(),
        description,
        outcome: Outcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => return fail(None, format!("cannot read file: {e}")),
    };
    let (fixture, note) = match parse_fixture(&content) {
        Ok(parsed) => parsed,
        Err(e) => return fail(None, format!("frontmatter error: {e}")),
    };

    let outcome = match check(&fixture, note, recognizer) {
        Some(reason) => Outcome::Fail(reason),
        None => Outcome::Pass,
    };
    FixtureResult {
        path: path.to_path_buf(),
        description: fixture.description,
        outcome,
    }
}

/// Returns the first mismatch, if any.
fn check(fixture: &Fixture, note: &str, recognizer: &Recognizer<'_>) -> Option<String> {
    if let Some(expected) = &fixture.expect_terms {
        let actual: Vec<String> = recognizer
            .recognize(note)
            .into_iter()
            .map(|a| a.term.canonical_term.clone())
            .collect();
        if let Some(reason) = compare("terms", expected, &actual) {
            return Some(reason);
        }
    }

    let needs_document = fixture.expect_sections.is_some()
        || fixture.expect_section_types.is_some()
        || fixture.expect_patient_errors.is_some();
    if !needs_document {
        return None;
    }
    let doc = structure_document(note);

    if let Some(expected) = &fixture.expect_sections {
        let tree = doc.tree();
        let actual: Vec<String> = doc
            .roots()
            .iter()
            .flat_map(|&root| std::iter::once(root).chain(tree.descendants(root)))
            .filter_map(|id| doc.section(id).and_then(|b| b.title.clone()))
            .collect();
        if let Some(reason) = compare("sections", expected, &actual) {
            return Some(reason);
        }
    }

    if let Some(expected) = &fixture.expect_section_types {
        let actual: Vec<String> = doc
            .blocks()
            .iter()
            .filter_map(|b| b.section_type())
            .map(|t| t.as_str().to_string())
            .collect();
        if let Some(reason) = compare("section types", expected, &actual) {
            return Some(reason);
        }
    }

    if let Some(expected) = &fixture.expect_patient_errors {
        let actual: Vec<&String> = doc
            .blocks()
            .iter()
            .filter_map(|b| b.metadata.patient.as_ref())
            .flat_map(|p| p.errors())
            .collect();
        for wanted in expected {
            if !actual.iter().any(|e| e.contains(wanted.as_str())) {
                return Some(format!(
                    "expected a patient error containing \"{wanted}\"\n  actual errors: {actual:?}"
                ));
            }
        }
        if expected.is_empty() && !actual.is_empty() {
            return Some(format!("expected no patient errors, got: {actual:?}"));
        }
    }

    None
}

fn compare(what: &str, expected: &[String], actual: &[String]) -> Option<String> {
    (expected != actual).then(|| {
        format!("{what} mismatch\n  expected: {expected:?}\n  actual:   {actual:?}")
    })
}

/// `.note.md` files under `root`, keyed by their directory relative to `root`.
/// Files directly in `root` are in category "".
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, root, out);
            continue;
        }
        let is_fixture = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(FIXTURE_SUFFIX));
        if is_fixture {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let categories = discover(path);
    if categories.is_empty() {
        eprintln!("no {FIXTURE_SUFFIX} files found in {}", path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} fixtures)", category_label(category), files.len());
    }
}

struct Style {
    color: bool,
}

impl Style {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }
}

/// Pick the categories to run. A requested category also selects its subfolders.
fn select<'c>(
    all: &'c BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'c str, &'c [PathBuf]> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v.as_slice())).collect();
    }
    let mut selected = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let prefix = format!("{request}/");
        let before = selected.len();
        for (category, files) in all {
            if category == request || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files.as_slice());
            }
        }
        if selected.len() == before {
            let available: Vec<&str> = all.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{request}' not found (available: {})",
                available.join(", ")
            );
        }
    }
    selected
}

/// Run every fixture under `path` (or the single fixture `path`) and report.
/// Returns the process exit code: 0 when everything passed.
pub fn run_fixtures(
    path: &Path,
    recognizer: &Recognizer<'_>,
    no_color: bool,
    categories: &[String],
) -> i32 {
    let style = Style { color: !no_color };

    let all = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover(path)
    };
    if all.is_empty() {
        eprintln!("no {FIXTURE_SUFFIX} files found in {}", path.display());
        return 1;
    }
    let selected = select(&all, categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures = Vec::new();
    for (category, files) in &selected {
        eprintln!();
        eprintln!("{}", style.paint("1", category_label(category)));
        for file in *files {
            let result = run_fixture(file, recognizer);
            debug!(path = %file.display(), passed = matches!(result.outcome, Outcome::Pass), "fixture");
            match result.outcome {
                Outcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", style.pass(), result.label());
                }
                Outcome::Fail(_) => {
                    eprintln!("  {}  {}", style.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let Outcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {line}");
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {passed} passed, 0 failed", style.paint("32", "ok"));
        0
    } else {
        eprintln!(
            "test result: {}. {passed} passed, {} failed (of {})",
            style.paint("31", "FAILED"),
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
