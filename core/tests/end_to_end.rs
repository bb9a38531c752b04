//! End-to-end workflow tests: catalog discovery feeding the engine, session
//! persistence through disk, and artifact rendering.

use promptpack_core::{
    Catalog, Config, SelectionEngine, SessionSnapshot, SnippetRegistry, estimate_tokens,
    render_output,
};
use std::fs;
use std::path::PathBuf;

fn build_project() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    fs::write(root.join("main.rs"), "fn main() {}\n").unwrap();
    fs::create_dir(root.join("docs")).unwrap();
    fs::write(root.join("docs/readme.md"), "# readme\n").unwrap();
    fs::create_dir(root.join("node_modules")).unwrap();
    fs::write(root.join("node_modules/dep.js"), "ignored").unwrap();
    fs::create_dir(root.join("prompts")).unwrap();
    fs::write(root.join("prompts/intro.txt"), "You are a code reviewer.").unwrap();
    fs::write(root.join("prompts/rules.txt"), "Answer in patches only.").unwrap();
    (dir, root)
}

#[test]
fn session_survives_a_process_restart() {
    let (_guard, root) = build_project();
    let config = Config::default();
    let session_path = config.session_path(&root);

    // First "process": curate and persist.
    {
        let mut catalog = Catalog::new(root.clone(), &config).unwrap();
        let mut engine = SelectionEngine::new(&root);
        catalog.scan_into(&mut engine).unwrap();
        let mut registry = SnippetRegistry::new();
        registry.load_dir(&config.snippet_dir(&root)).unwrap();

        engine.toggle_include(&root.join("docs")).unwrap();
        engine.toggle_include(&root.join("main.rs")).unwrap();
        engine.toggle_exclude(&root.join("docs/readme.md")).unwrap();
        registry.select("rules.txt").unwrap();
        registry.select("intro.txt").unwrap();
        registry.move_up("intro.txt").unwrap();

        engine.snapshot(&registry).save(&session_path).unwrap();
    }

    // Second "process": rediscover and restore.
    let mut catalog = Catalog::new(root.clone(), &config).unwrap();
    let mut engine = SelectionEngine::new(&root);
    catalog.scan_into(&mut engine).unwrap();
    let mut registry = SnippetRegistry::new();
    registry.load_dir(&config.snippet_dir(&root)).unwrap();

    let snapshot = SessionSnapshot::load(&session_path).unwrap();
    engine.restore(&snapshot, &mut registry);

    assert_eq!(
        engine.selected_files(),
        vec![root.join("main.rs").to_string_lossy().into_owned()]
    );
    assert!(engine.is_excluded(&root.join("docs/readme.md")));
    assert!(engine.is_selected(&root.join("docs")));
    assert_eq!(
        registry.selected_names(),
        ["intro.txt".to_string(), "rules.txt".to_string()]
    );

    let out = render_output(&engine, &mut catalog, &registry);
    let intro_pos = out.find("You are a code reviewer.").unwrap();
    let rules_pos = out.find("Answer in patches only.").unwrap();
    assert!(intro_pos < rules_pos);
    assert!(out.contains("File: main.rs"));
    assert!(!out.contains("readme.md"));
    assert!(!out.contains("node_modules"));
}

#[test]
fn lazy_discovery_reaches_the_same_state_as_eager() {
    let (_guard, root) = build_project();
    let config = Config::default();

    // Lazy path: enumerate one level, decide, then expand later.
    let mut catalog = Catalog::new(root.clone(), &config).unwrap();
    let mut engine = SelectionEngine::new(&root);
    let top = catalog.discover(&root);
    engine.on_discovered(&root, &top.dirs, &top.files).unwrap();

    // Exclude docs before its children exist in the engine.
    engine.toggle_exclude(&root.join("docs")).unwrap();
    let docs = catalog.discover(&root.join("docs"));
    engine
        .on_discovered(&root.join("docs"), &docs.dirs, &docs.files)
        .unwrap();

    assert!(engine.is_excluded(&root.join("docs/readme.md")));
    assert!(engine.effective_excluded(&root.join("docs/readme.md")));

    // Eager path over an identical tree, same operation order.
    let mut eager_catalog = Catalog::new(root.clone(), &config).unwrap();
    let mut eager_engine = SelectionEngine::new(&root);
    eager_catalog.scan_into(&mut eager_engine).unwrap();
    eager_engine.toggle_exclude(&root.join("docs")).unwrap();

    assert_eq!(engine.selected_files(), eager_engine.selected_files());
    assert_eq!(engine.excluded_paths(), eager_engine.excluded_paths());
}

#[test]
fn dynamic_snippets_render_like_file_backed_ones() {
    let (_guard, root) = build_project();
    let config = Config::default();
    let mut catalog = Catalog::new(root.clone(), &config).unwrap();
    let mut engine = SelectionEngine::new(&root);
    catalog.scan_into(&mut engine).unwrap();
    let mut registry = SnippetRegistry::new();
    registry.load_dir(&config.snippet_dir(&root)).unwrap();

    // An external exporter hands the engine a named blob; its origin is
    // irrelevant from here on.
    registry.register_dynamic("tables.json", "{\"users\": []}".into());
    registry.select("tables.json").unwrap();

    let estimate = estimate_tokens(&engine, &catalog, &registry);
    assert_eq!(estimate, registry.get("tables.json").unwrap().cost);

    let out = render_output(&engine, &mut catalog, &registry);
    assert!(out.contains("{\"users\": []}"));
    assert!(out.contains("No code files selected for inclusion"));
}
