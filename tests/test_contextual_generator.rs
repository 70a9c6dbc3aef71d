//! End-to-end tests for the contextual generator.
//!
//! Each test loads a small project into an `AnalysisHost`, lists the
//! actions at a caret and applies one of them to an in-memory buffer.

use asgen::LineCol;
use asgen::ide::{ActionKind, AnalysisHost, EditError, EditOutcome, SourceBuffer, TextBuffer};
use rstest::rstest;

const TOOL: &str = "package lib;\n\nclass Tool {\n  public function new() {}\n}\n";

fn host_with(path: &str, text: &str) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    host.set_file_content("lib/Tool.hx", TOOL);
    host.set_file_content("lib/Alpha.hx", "package lib;\nclass Alpha {}\n");
    host.set_file_content("zed/Zeta.hx", "package zed;\nclass Zeta {}\n");
    host.set_file_content(path, text);
    host
}

fn kinds(host: &AnalysisHost, path: &str, caret: LineCol) -> Vec<ActionKind> {
    let file = host.file_id(path).unwrap();
    host.analysis()
        .actions_at(file, caret)
        .into_iter()
        .map(|a| a.kind)
        .collect()
}

// ============================================================================
// RESTRICTED KINDS
// ============================================================================

const IFOO: &str = "package app;

import lib.Alpha;
import zed.Zeta;

interface IFoo {
  function make(t:Tool):Void;
}
";

#[test]
fn test_interface_offers_only_import_and_inserts_alphabetically() {
    let mut host = host_with("app/IFoo.hx", IFOO);
    let file = host.file_id("app/IFoo.hx").unwrap();
    let caret = LineCol::new(6, 22);

    let actions = host.analysis().actions_at(file, caret);
    assert_eq!(actions.len(), 1);
    assert_eq!(
        actions[0].kind,
        ActionKind::AddImport {
            qualified_name: "lib.Tool".into()
        }
    );
    assert_eq!(actions[0].label, "Add import lib.Tool");

    let mut buffer = SourceBuffer::new(IFOO);
    host.apply_action(&actions[0], &mut buffer).unwrap();
    assert_eq!(
        buffer.as_str(),
        "package app;

import lib.Alpha;
import lib.Tool;
import zed.Zeta;

interface IFoo {
  function make(t:Tool):Void;
}
"
    );
}

#[rstest]
#[case::interface("interface IFoo {\n  function make(t:Tool):Void;\n}\n", LineCol::new(3, 22))]
#[case::typedef("typedef TFoo = {\n  var t:Tool;\n}\n", LineCol::new(3, 12))]
#[case::enumeration("enum EFoo {\n  Make(t:Tool);\n}\n", LineCol::new(3, 13))]
fn test_restricted_kinds_offer_import_only(#[case] body: &str, #[case] caret: LineCol) {
    let text = format!("package app;\n\n{body}");
    let host = host_with("app/Restricted.hx", &text);
    let actions = kinds(&host, "app/Restricted.hx", caret);
    assert_eq!(
        actions,
        vec![ActionKind::AddImport {
            qualified_name: "lib.Tool".into()
        }]
    );
}

#[rstest]
#[case::interface("interface IFoo {\n  var _size:Int;\n}\n")]
#[case::typedef("typedef TFoo = {\n  var _size:Int;\n}\n")]
fn test_restricted_kinds_never_offer_accessors(#[case] body: &str) {
    let text = format!("package app;\n\n{body}");
    let host = host_with("app/Restricted.hx", &text);
    assert!(kinds(&host, "app/Restricted.hx", LineCol::new(3, 11)).is_empty());
}

// ============================================================================
// CLASSES
// ============================================================================

const BASE: &str = "package app;

class Base {
    public function new() {}

    public function update(dt:Float):Void {}
}
";

const FOO: &str = "package app;

class Foo extends Base {
    public function new() {
        super();
        update
    }
}
";

#[test]
fn test_class_override_stub_after_current_member() {
    let mut host = host_with("app/Foo.hx", FOO);
    host.set_file_content("app/Base.hx", BASE);
    let file = host.file_id("app/Foo.hx").unwrap();

    let actions = host.analysis().actions_at(file, LineCol::new(5, 14));
    let override_action = actions
        .iter()
        .find(|a| matches!(a.kind, ActionKind::OverrideMethod { .. }))
        .expect("override action");
    assert_eq!(override_action.label, "Override 'update'");

    let mut buffer = SourceBuffer::new(FOO);
    let outcome = host.apply_action(override_action, &mut buffer).unwrap();
    assert_eq!(
        buffer.as_str(),
        "package app;

class Foo extends Base {
    public function new() {
        super();
        update
    }

    override public function update(dt:Float):Void {
        super.update(dt);
    }
}
"
    );
    assert_eq!(outcome, EditOutcome::Applied { caret: LineCol::new(10, 5) });
    assert_eq!(buffer.caret_position(), LineCol::new(10, 5));
}

#[rstest]
#[case::class("class")]
#[case::final_class("final class")]
fn test_class_keeps_accessor_actions(#[case] keyword: &str) {
    let text = format!("package app;\n\n{keyword} Box {{\n  var _size:Int;\n}}\n");
    let host = host_with("app/Box.hx", &text);
    let actions = kinds(&host, "app/Box.hx", LineCol::new(3, 11));
    assert!(actions.contains(&ActionKind::GenerateGetterSetter { field: "_size".into() }));
    assert!(actions.contains(&ActionKind::GenerateGetter { field: "_size".into() }));
    assert!(actions.contains(&ActionKind::GenerateSetter { field: "_size".into() }));
}

#[test]
fn test_import_twice_is_single_entry() {
    const MAIN: &str = "package app;\n\nclass Main {\n  var t:Tool;\n}\n";
    let mut host = host_with("app/Main.hx", MAIN);
    let file = host.file_id("app/Main.hx").unwrap();

    let actions = host.analysis().actions_at(file, LineCol::new(3, 12));
    let import = actions
        .into_iter()
        .find(|a| a.kind.is_import())
        .expect("import action");

    let mut buffer = SourceBuffer::new(MAIN);
    assert!(matches!(
        host.apply_action(&import, &mut buffer),
        Ok(EditOutcome::Applied { .. })
    ));
    assert_eq!(
        host.apply_action(&import, &mut buffer),
        Ok(EditOutcome::Unchanged)
    );
    assert_eq!(buffer.as_str().matches("import lib.Tool;").count(), 1);
}

#[test]
fn test_stale_buffer_is_left_untouched() {
    const MAIN: &str = "package app;\n\nclass Main {\n  var _size:Int;\n}\n";
    let mut host = host_with("app/Main.hx", MAIN);
    let file = host.file_id("app/Main.hx").unwrap();
    let action = host
        .analysis()
        .actions_at(file, LineCol::new(3, 11))
        .into_iter()
        .find(|a| matches!(a.kind, ActionKind::GenerateGetter { .. }))
        .expect("getter action");

    let edited = "package app;\n\nclass Main {\n  var _size:Float;\n}\n";
    let mut buffer = SourceBuffer::new(edited);
    let result = host.apply_action(&action, &mut buffer);
    assert!(matches!(result, Err(EditError::StaleAnchor { .. })));
    assert_eq!(buffer.as_str(), edited);
}

#[test]
fn test_outside_any_type_only_imports() {
    const MAIN: &str = "package app;\n\nimport lib.Alpha;\nTool\n";
    let host = host_with("app/Loose.hx", MAIN);
    let actions = kinds(&host, "app/Loose.hx", LineCol::new(3, 4));
    assert!(actions.iter().all(ActionKind::is_import));
}

// ============================================================================
// MODULES
// ============================================================================

const SHAPES: &str = "package lib;\n\nclass Shapes {}\n\nclass Circle {}\n";

#[test]
fn test_module_import_covers_secondary_type() {
    const MAIN: &str = "package app;\n\nimport lib.Shapes;\n\nclass Main {\n  var c:Circle;\n}\n";
    let mut host = host_with("app/Main.hx", MAIN);
    host.set_file_content("lib/Shapes.hx", SHAPES);

    let actions = kinds(&host, "app/Main.hx", LineCol::new(5, 14));
    assert!(!actions.iter().any(ActionKind::is_import), "{actions:?}");
}

#[test]
fn test_secondary_type_is_imported_through_its_module() {
    const MAIN: &str = "package app;\n\nclass Main {\n  var c:Circle;\n}\n";
    let mut host = host_with("app/Main.hx", MAIN);
    host.set_file_content("lib/Shapes.hx", SHAPES);
    let file = host.file_id("app/Main.hx").unwrap();

    let import = host
        .analysis()
        .actions_at(file, LineCol::new(3, 14))
        .into_iter()
        .find(|a| a.kind.is_import())
        .expect("import action");
    assert_eq!(
        import.kind,
        ActionKind::AddImport {
            qualified_name: "lib.Shapes.Circle".into()
        }
    );

    let mut buffer = SourceBuffer::new(MAIN);
    host.apply_action(&import, &mut buffer).unwrap();
    assert_eq!(
        buffer.as_str(),
        "package app;\n\nimport lib.Shapes.Circle;\n\nclass Main {\n  var c:Circle;\n}\n"
    );
    assert_eq!(
        host.apply_action(&import, &mut buffer),
        Ok(EditOutcome::Unchanged)
    );
}
