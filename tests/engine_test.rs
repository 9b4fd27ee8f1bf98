use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use prjtpl::engine::{ensure_output_dir, Engine, Workspace};
use prjtpl::error::{Error, Result};
use prjtpl::handler::{Handler, Matcher};
use tempfile::TempDir;
use walkdir::WalkDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

/// Relative paths of every file below `root`, sorted.
fn files(root: &Path) -> Vec<String> {
    let mut found: Vec<String> = WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path().strip_prefix(root).unwrap().to_string_lossy().into_owned())
        .collect();
    found.sort();
    found
}

fn roots() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let template = temp_dir.path().join("template");
    let output = temp_dir.path().join("output");
    fs::create_dir_all(&template).unwrap();
    (temp_dir, template, output)
}

fn recorder(log: &Rc<RefCell<Vec<PathBuf>>>) -> impl Fn(&mut Workspace, &Path) -> Result<bool> {
    let log = Rc::clone(log);
    move |_, path| {
        log.borrow_mut().push(path.to_path_buf());
        Ok(true)
    }
}

#[test_log::test]
fn test_deploys_template_tree() {
    let (_temp_dir, template, output) = roots();
    write(&template, "a.txt", "Hi %NAME%");
    write(&template, "sub/.git/config", "[core]");
    write(&template, "sub/b.txt", "%NAME% bye");

    let mut engine = Engine::new(&template, &output);
    engine.add_substitution("%NAME%", "World");
    engine.process().unwrap();

    assert_eq!(read(&output, "a.txt"), "Hi World\n");
    assert_eq!(read(&output, "sub/b.txt"), "World bye\n");
    assert!(!output.join("sub/.git").exists());
    assert_eq!(files(&output), vec!["a.txt".to_string(), "sub/b.txt".to_string()]);
}

#[test]
fn test_hidden_and_backup_entries_are_skipped() {
    let (_temp_dir, template, output) = roots();
    write(&template, ".hidden", "secret");
    write(&template, ".config/settings", "x");
    write(&template, "main.c~", "backup");
    write(&template, "dir~/inner.txt", "backup dir");
    write(&template, "main.c", "int main;");

    Engine::new(&template, &output).process().unwrap();

    assert_eq!(files(&output), vec!["main.c".to_string()]);
}

#[test]
fn test_markers_in_names_are_substituted() {
    let (_temp_dir, template, output) = roots();
    write(&template, "%NAME%/%NAME%.h", "#pragma once");
    write(&template, "src/%NAME%.c", "#include \"%NAME%.h\"\n");

    let mut engine = Engine::new(&template, &output);
    engine.add_substitution("%NAME%", "demo");
    engine.process().unwrap();

    assert_eq!(read(&output, "demo/demo.h"), "#pragma once\n");
    assert_eq!(read(&output, "src/demo.c"), "#include \"demo.h\"\n");
}

#[test]
fn test_repeated_runs_are_identical() {
    let (temp_dir, template, first) = roots();
    let second = temp_dir.path().join("second");
    write(&template, "README", "%NAME% by %AUTHOR%\n\nsee %NAME%.c");
    write(&template, "src/%NAME%.c", "/* %AUTHOR% */");
    write(&template, "docs/a/b/c.md", "# %NAME%");

    for output in [&first, &second] {
        let mut engine = Engine::new(&template, output);
        engine.add_substitution("%NAME%", "demo");
        engine.add_substitution("%AUTHOR%", "someone");
        engine.process().unwrap();
    }

    assert!(!dir_diff::is_different(&first, &second).unwrap());
}

#[test]
fn test_substitution_order_reaches_file_content() {
    let (_temp_dir, template, output) = roots();
    write(&template, "chained.txt", "%B%");

    let mut engine = Engine::new(&template, &output);
    engine.add_substitution("%B%", "%A%");
    engine.add_substitution("%A%", "1");
    engine.process().unwrap();

    assert_eq!(read(&output, "chained.txt"), "1\n");
}

#[test]
fn test_regex_substitution() {
    let (_temp_dir, template, output) = roots();
    write(&template, "LICENSE", "Copyright 1999, 2004");

    let mut engine = Engine::new(&template, &output);
    engine.add_regex_substitution(r"\b\d{4}\b", "2026").unwrap();
    engine.process().unwrap();

    assert_eq!(read(&output, "LICENSE"), "Copyright 2026, 2026\n");
}

#[test]
fn test_line_endings() {
    let (_temp_dir, template, output) = roots();
    write(&template, "no_newline", "a\nb");
    write(&template, "empty", "");
    write(&template, "blank_lines", "\n\n");

    Engine::new(&template, &output).process().unwrap();

    assert_eq!(read(&output, "no_newline"), "a\nb\n");
    assert_eq!(read(&output, "empty"), "");
    assert_eq!(read(&output, "blank_lines"), "\n\n");
}

#[test]
fn test_custom_handler_overrides_builtins() {
    let (_temp_dir, template, output) = roots();
    write(&template, "page.html.erb", "<%= 1 %>");
    write(&template, "notes.txt", "%NAME%");
    write(&template, "kept.md", "%NAME%");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut engine = Engine::new(&template, &output);
    engine.add_substitution("%NAME%", "demo");
    engine.add_handler(Handler::custom(Matcher::suffix(".erb"), recorder(&seen)));
    engine.add_handler(Handler::custom(Matcher::suffix(".txt"), recorder(&seen)));
    engine.process().unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![template.join("page.html.erb"), template.join("notes.txt")]
    );
    assert_eq!(files(&output), vec!["kept.md".to_string()]);
    assert_eq!(read(&output, "kept.md"), "demo\n");
}

#[test]
fn test_queue_is_last_in_first_out() {
    let (_temp_dir, template, output) = roots();
    write(&template, "a.txt", "");
    write(&template, "b.txt", "");
    write(&template, "c.txt", "");
    write(&template, "d/e.txt", "");

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut engine = Engine::new(&template, &output);
    engine.add_handler(Handler::custom(Matcher::suffix(".txt"), recorder(&seen)));
    engine.process().unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            template.join("d/e.txt"),
            template.join("c.txt"),
            template.join("b.txt"),
            template.join("a.txt"),
        ]
    );
}

#[test]
fn test_source_outside_template_is_a_mapping_error() {
    let (temp_dir, template, output) = roots();
    write(&template, "inside.txt", "in");
    write(temp_dir.path(), "outside.txt", "out");

    let mut engine = Engine::new(&template, &output);
    engine.enqueue(temp_dir.path().join("outside.txt"));

    match engine.process() {
        Err(Error::MappingError { source_path, template_root }) => {
            assert_eq!(source_path, temp_dir.path().join("outside.txt"));
            assert_eq!(template_root, template);
        }
        other => panic!("Expected MappingError, got {:?}", other),
    }
    assert!(!output.exists());

    // the failed run leaves nothing queued, so the next run starts from the root
    engine.process().unwrap();
    assert_eq!(files(&output), vec!["inside.txt".to_string()]);
}

#[test]
fn test_enqueued_path_replaces_root_seed() {
    let (_temp_dir, template, output) = roots();
    write(&template, "top.txt", "top");
    write(&template, "sub/inner.txt", "inner");

    let mut engine = Engine::new(&template, &output);
    engine.enqueue(template.join("sub"));
    engine.process().unwrap();

    assert_eq!(files(&output), vec!["sub/inner.txt".to_string()]);
}

#[test]
fn test_second_run_uses_updated_substitutions() {
    let (_temp_dir, template, output) = roots();
    write(&template, "value.txt", "%VALUE%");

    let mut engine = Engine::new(&template, &output);
    engine.process().unwrap();
    assert_eq!(read(&output, "value.txt"), "%VALUE%\n");

    engine.add_substitution("%VALUE%", "42");
    engine.process().unwrap();
    assert_eq!(read(&output, "value.txt"), "42\n");
}

#[test]
fn test_binary_handler_copies_bytes_verbatim() {
    let (_temp_dir, template, output) = roots();
    let bytes = [0x89, b'P', b'N', b'G', 0xFF, b'%', b'N', b'A', b'M', b'E', b'%'];
    fs::write(template.join("logo.png"), bytes).unwrap();

    let mut engine = Engine::new(&template, &output);
    engine.add_substitution("%NAME%", "demo");
    engine.add_handler(Handler::binary(Matcher::glob("**/*.png").unwrap()));
    engine.process().unwrap();

    assert_eq!(fs::read(output.join("logo.png")).unwrap(), bytes);
}

#[test]
fn test_non_utf8_content_is_substituted_bytewise() {
    let (_temp_dir, template, output) = roots();
    write(&template, "a_README", "%NAME%\n");
    fs::write(template.join("z_notes.txt"), b"Caf\xe9 %NAME%\n").unwrap();
    fs::write(template.join("y_icon.ico"), [0x00, 0xFF, 0xFE, b'\n']).unwrap();

    let mut engine = Engine::new(&template, &output);
    engine.add_substitution("%NAME%", "demo");
    engine.process().unwrap();

    assert_eq!(fs::read(output.join("z_notes.txt")).unwrap(), b"Caf\xe9 demo\n".to_vec());
    assert_eq!(fs::read(output.join("y_icon.ico")).unwrap(), vec![0x00, 0xFF, 0xFE, b'\n']);
    assert_eq!(read(&output, "a_README"), "demo\n");
}

#[test_log::test]
fn test_handler_error_aborts_run() {
    let (_temp_dir, template, output) = roots();
    write(&template, "a.txt", "a");
    write(&template, "z.fail", "z");

    let mut engine = Engine::new(&template, &output);
    engine.add_handler(Handler::custom(Matcher::suffix(".fail"), |_, path| {
        Err(Error::ExternalProcessError(format!("refusing {}", path.display())))
    }));

    assert!(matches!(engine.process(), Err(Error::ExternalProcessError(_))));
    // z.fail is popped before a.txt
    assert!(!output.join("a.txt").exists());
}

#[test]
fn test_generated_files_are_recorded() {
    let (_temp_dir, template, output) = roots();
    write(&template, "a.txt", "a");
    write(&template, "b/%NAME%.txt", "b");

    let mut engine = Engine::new(&template, &output);
    engine.add_substitution("%NAME%", "demo");
    engine.process().unwrap();

    assert_eq!(engine.generated(), &[output.join("b/demo.txt"), output.join("a.txt")]);
}

#[test]
fn test_ensure_output_dir() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    let new_dir = path.join("new_dir");
    assert_eq!(ensure_output_dir(&new_dir, false).unwrap(), new_dir);

    assert!(matches!(
        ensure_output_dir(path, false),
        Err(Error::OutputDirectoryExistsError { .. })
    ));

    assert!(ensure_output_dir(path, true).is_ok());
}
