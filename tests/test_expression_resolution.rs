//! Expression resolution through the analysis host.

use std::sync::Arc;

use asgen::LineCol;
use asgen::hir::{AccessShape, ExprContext, TypeTarget};
use asgen::ide::AnalysisHost;

const GAME: &str = "package game;

class Stats {
  public var owner:Player;
  public function new() {}
}

class Player {
  public var stats:Stats;
  public static var count:Int;
  public function new() {}
}

class Main {
  function run(p:Player) {
    p.stats.missing
    p.stats.owner
    Player.count
    var stats = p.stats;
  }
}
";

fn host() -> AnalysisHost {
    let mut host = AnalysisHost::new();
    host.set_file_content("game/Game.hx", GAME);
    host
}

#[test]
fn test_broken_chain_keeps_last_type() {
    let host = host();
    let file = host.file_id("game/Game.hx").unwrap();
    let result = host.analysis().resolve_at(file, LineCol::new(15, 19)).unwrap();

    assert_eq!(result.token, "p.stats.missing");
    assert_eq!(result.member, None);
    assert_eq!(result.ty, Some(TypeTarget::Symbol(Arc::from("game.Stats"))));
    assert_eq!(result.unresolved.as_deref(), Some("missing"));
}

#[test]
fn test_full_chain_resolves_member() {
    let host = host();
    let file = host.file_id("game/Game.hx").unwrap();
    let result = host.analysis().resolve_at(file, LineCol::new(16, 17)).unwrap();

    let member = result.member.as_ref().expect("member");
    assert_eq!(&*member.owner, "game.Stats");
    assert_eq!(member.name, "owner");
    assert_eq!(result.ty, Some(TypeTarget::Symbol(Arc::from("game.Player"))));
    assert!(result.is_resolved());
}

#[test]
fn test_static_access_through_type_name() {
    let host = host();
    let file = host.file_id("game/Game.hx").unwrap();
    let result = host.analysis().resolve_at(file, LineCol::new(17, 16)).unwrap();

    assert_eq!(result.shape, AccessShape::Static);
    assert_eq!(result.ty, Some(TypeTarget::Builtin("Int".into())));
}

#[test]
fn test_local_visible_below_declaration() {
    let host = host();
    let file = host.file_id("game/Game.hx").unwrap();
    let result = host
        .analysis()
        .resolve(file, LineCol::new(19, 4), "stats")
        .unwrap();
    // `stats` is declared on line 18, the caret is below it
    assert!(result.local.is_some());
}

#[test]
fn test_declaration_position() {
    let host = host();
    let file = host.file_id("game/Game.hx").unwrap();
    let result = host.analysis().resolve_at(file, LineCol::new(18, 8)).unwrap();
    assert!(matches!(result.context, ExprContext::Declaration(_)));
}

#[test]
fn test_unknown_file_has_no_result() {
    let host = host();
    assert!(
        host.analysis()
            .resolve_at(asgen::FileId::new(42), LineCol::new(0, 0))
            .is_none()
    );
}
