use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run the binary from `dir` so no stray `notedoc.toml` is picked up.
fn notedoc(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_notedoc"))
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .arg("--no-color")
        .args(args)
        .output()
        .expect("notedoc runs")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn workdir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("write file");
    }
    dir
}

const CUSTOM_DICTIONARY: &str = r#"
[[term]]
term = "widget syndrome"
aliases = ["ws"]
[[term.codes]]
code = "X99"
vocabulary = "ICD10"
"#;

#[test]
fn valid_codes_exit_zero() {
    let dir = workdir(&[]);
    let output = notedoc(dir.path(), &["code", "I10", "7980"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("I10\tvalid\thypertension"), "{out}");
    assert!(out.contains("7980\tvalid\tpenicillin"), "{out}");
}

#[test]
fn invalid_code_exits_one_with_shape_hint() {
    let dir = workdir(&[]);
    let output = notedoc(dir.path(), &["code", "I10", "Z99.9", "123456789", "bogus"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("Z99.9\tinvalid\tlooks like ICD10"), "{out}");
    assert!(out.contains("123456789\tinvalid\tlooks like RXNORM"), "{out}");
    assert!(out.contains("bogus\tinvalid\tnot a recognized code shape"), "{out}");
}

#[test]
fn terms_text_output() {
    let dir = workdir(&[("note.txt", "Patient has hypertension.")]);
    let output = notedoc(dir.path(), &["terms", "note.txt"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert_eq!(
        stdout(&output).trim(),
        "12..24  \"hypertension\"  -> hypertension [ICD10:I10]"
    );
}

#[test]
fn annotate_labels_multibyte_notes() {
    let dir = workdir(&[("note.txt", "Café: hypertension et CHF\n")]);
    let output = notedoc(dir.path(), &["terms", "--annotate", "note.txt"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("2 term(s) recognized"), "{out}");
    assert!(out.contains("hypertension [ICD10:I10]"), "{out}");
    assert!(out.contains("congestive heart failure [ICD10:I50.9]"), "{out}");
    assert!(out.contains("note.txt"), "{out}");
}

#[test]
fn annotate_without_terms_says_so() {
    let dir = workdir(&[("note.txt", "Routine visit, no complaints.\n")]);
    let output = notedoc(dir.path(), &["terms", "--annotate", "note.txt"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("no terms recognized in note.txt"));
}

#[test]
fn config_tunes_the_resolver() {
    let note = ("note.txt", "CHF - congestive heart failure");
    let count = |dir: &TempDir| {
        let output = notedoc(dir.path(), &["terms", "--json", "note.txt"]);
        assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
        let json: serde_json::Value =
            serde_json::from_str(&stdout(&output)).expect("terms --json prints JSON");
        json.as_array().map(Vec::len)
    };

    let defaults = workdir(&[note]);
    assert_eq!(count(&defaults), Some(1));

    let tuned = workdir(&[
        note,
        ("notedoc.toml", "[resolver]\nproximity_window = 0\n"),
    ]);
    assert_eq!(count(&tuned), Some(2));
}

#[test]
fn config_dictionary_is_relative_to_the_config_file() {
    let dir = workdir(&[
        ("terms.toml", CUSTOM_DICTIONARY),
        ("note.txt", "Known WS, also hypertension."),
    ]);
    fs::create_dir(dir.path().join("conf")).expect("mkdir");
    fs::write(
        dir.path().join("conf/notedoc.toml"),
        "dictionary = \"../terms.toml\"\n",
    )
    .expect("write config");

    let output = notedoc(dir.path(), &["--config", "conf/notedoc.toml", "terms", "note.txt"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("-> widget syndrome [ICD10:X99]"), "{out}");
    assert!(!out.contains("hypertension"), "{out}");
}

#[test]
fn dictionary_flag_overrides_config() {
    let dir = workdir(&[
        ("custom.toml", CUSTOM_DICTIONARY),
        ("notedoc.toml", "dictionary = \"missing.toml\"\n"),
    ]);
    let output = notedoc(dir.path(), &["code", "X99", "--dictionary", "custom.toml"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    assert!(stdout(&output).contains("X99\tvalid\twidget syndrome"));
}

#[test]
fn invalid_dictionary_is_reported_against_its_source() {
    let dir = workdir(&[(
        "bad.toml",
        "[[term]]\nterm = \"lonely\"\n",
    )]);
    let output = notedoc(dir.path(), &["code", "I10", "--dictionary", "bad.toml"]);
    assert_eq!(output.status.code(), Some(2));
    let err = stderr(&output);
    assert!(err.contains("term `lonely` has no codes"), "{err}");
    assert!(err.contains("bad.toml"), "{err}");
}

#[test]
fn unknown_config_key_is_an_error() {
    let dir = workdir(&[("notedoc.toml", "dictionery = \"x.toml\"\n")]);
    let output = notedoc(dir.path(), &["code", "I10"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("invalid config"));
}

#[test]
fn outline_prints_nested_sections() {
    let dir = workdir(&[(
        "note.md",
        "# Chief Complaint\nchest pain\n## HPI\nhypertension and chf\n# Plan\nrest\n",
    )]);
    let output = notedoc(dir.path(), &["outline", "--terms", "note.md"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let lines: Vec<String> = stdout(&output).lines().map(str::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "# Chief Complaint  (chief-complaint)  [1 terms]",
            "  ## HPI  (hpi)  [2 terms]",
            "# Plan  (assessment-plan)  [0 terms]",
        ]
    );
}

#[test]
fn outline_json_has_blocks_and_tree() {
    let dir = workdir(&[("note.md", "# Allergies\nPENICILLINS\n")]);
    let output = notedoc(dir.path(), &["outline", "--json", "note.md"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("JSON output");
    assert_eq!(json["blocks"][0]["kind"], "heading");
    assert_eq!(json["blocks"][0]["metadata"]["section_type"], "allergies");
    assert_eq!(json["blocks"][1]["kind"], "text");
    assert_eq!(json["tree"]["roots"].as_array().map(Vec::len), Some(1));
}

#[test]
fn bundled_fixtures_pass() {
    let dir = workdir(&[]);
    let fixtures = fixtures();
    let output = notedoc(dir.path(), &["test", &fixtures.to_string_lossy()]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("test result: ok. 4 passed, 0 failed"), "{err}");
    assert!(err.contains("sections"), "{err}");
    assert!(err.contains("terms"), "{err}");
}

#[test]
fn fixture_categories_filter() {
    let dir = workdir(&[]);
    let fixtures = fixtures();
    let output = notedoc(dir.path(), &["test", &fixtures.to_string_lossy(), "-c", "terms"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(0), "{err}");
    assert!(err.contains("2 passed"), "{err}");

    let listed = notedoc(dir.path(), &["test", &fixtures.to_string_lossy(), "--list-categories"]);
    let err = stderr(&listed);
    assert!(err.contains("sections (2 fixtures)"), "{err}");
    assert!(err.contains("terms (2 fixtures)"), "{err}");
}

#[test]
fn failing_fixture_exits_one() {
    let dir = workdir(&[(
        "wrong.note.md",
        "---\nexpect_terms = [\"asthma\"]\n---\nhypertension\n",
    )]);
    let output = notedoc(dir.path(), &["test", "wrong.note.md"]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1), "{err}");
    assert!(err.contains("FAIL  wrong"), "{err}");
    assert!(err.contains("terms mismatch"), "{err}");
    assert!(err.contains("0 passed, 1 failed (of 1)"), "{err}");
}

#[test]
fn malformed_frontmatter_fails() {
    let dir = workdir(&[("broken.note.md", "no frontmatter here\n")]);
    let output = notedoc(dir.path(), &["test", "."]);
    let err = stderr(&output);
    assert_eq!(output.status.code(), Some(1), "{err}");
    assert!(err.contains("missing opening --- frontmatter delimiter"), "{err}");
}
