//! Lowering from the syntax tree to symbols.

use std::sync::Arc;

use smol_str::SmolStr;

use super::imports::ImportTable;
use super::symbols::{LocalVar, Member, MemberKind, Param, Symbol, TypeKind, TypeRef, Visibility};
use crate::base::FileId;
use crate::syntax::{Language, MemberDecl, MemberDeclKind, SourceFile, TypeDecl};

/// Everything a single file contributes to the symbol table.
#[derive(Clone, Debug)]
pub struct FileSymbols {
    pub package: Arc<str>,
    pub package_line: Option<u32>,
    pub imports: ImportTable,
    pub symbols: Vec<Symbol>,
}

/// Lower a parsed file into symbols.
pub fn lower_file(file: FileId, source: &SourceFile, language: Language) -> FileSymbols {
    let package: Arc<str> = Arc::from(source.package.as_str());
    let symbols = source
        .types
        .iter()
        .map(|decl| lower_type(file, &package, decl, language))
        .collect::<Vec<_>>();

    tracing::trace!(?file, package = %package, symbols = symbols.len(), "lowered file");

    FileSymbols {
        package,
        package_line: source.package_line,
        imports: ImportTable::from_decls(&source.imports),
        symbols,
    }
}

pub(crate) fn qualify(package: &str, name: &str) -> Arc<str> {
    if package.is_empty() {
        Arc::from(name)
    } else {
        Arc::from(format!("{package}.{name}"))
    }
}

fn lower_type(file: FileId, package: &Arc<str>, decl: &TypeDecl, language: Language) -> Symbol {
    let kind = TypeKind::from(decl.kind);
    let default_visibility = member_default_visibility(kind, language);

    let mut members: Vec<Member> = Vec::with_capacity(decl.members.len());
    for member in &decl.members {
        let lowered = lower_member(member, default_visibility);
        merge_member(&mut members, lowered);
    }

    let end_line = match (decl.open_brace, decl.close_brace) {
        (_, Some(close)) => close.line,
        // unclosed body runs to the end of the file
        (Some(_), None) => u32::MAX,
        (None, None) => members
            .iter()
            .map(|m| m.end_line)
            .max()
            .unwrap_or(decl.start.line),
    };

    Symbol {
        name: decl.name.clone(),
        qualified_name: qualify(package, &decl.name),
        package: package.clone(),
        module: qualify(package, &decl.name),
        kind,
        modifiers: decl.modifiers,
        type_params: decl.type_params.clone(),
        members,
        extends: decl.extends.iter().map(|t| TypeRef::new(t.clone())).collect(),
        implements: decl.implements.iter().map(|t| TypeRef::new(t.clone())).collect(),
        underlying: decl.underlying.clone().map(TypeRef::new),
        file,
        start: decl.start,
        open_brace: decl.open_brace,
        close_brace: decl.close_brace,
        end_line,
    }
}

fn member_default_visibility(kind: TypeKind, language: Language) -> Visibility {
    match (kind, language) {
        (TypeKind::Interface | TypeKind::Enum | TypeKind::TypeDef, _) => Visibility::Public,
        (_, Language::Haxe) => Visibility::Private,
        (_, Language::ActionScript) => Visibility::Internal,
    }
}

fn lower_member(decl: &MemberDecl, default_visibility: Visibility) -> Member {
    let kind = match decl.kind {
        MemberDeclKind::Var => MemberKind::Field,
        MemberDeclKind::Property => MemberKind::Property,
        MemberDeclKind::Function => MemberKind::Method,
        MemberDeclKind::EnumCase => MemberKind::EnumCase,
    };

    let params = decl
        .params
        .iter()
        .map(|p| Param {
            name: p.name.clone(),
            type_ref: p.type_ref.clone().map(TypeRef::new),
            optional: p.optional,
            default: p.default.clone(),
            rest: p.rest,
        })
        .collect::<Vec<_>>();

    let mut locals: Vec<LocalVar> = Vec::with_capacity(params.len() + decl.locals.len());
    if kind == MemberKind::Method {
        locals.extend(params.iter().map(|p| LocalVar {
            name: p.name.clone(),
            type_ref: p.type_ref.clone(),
            line: decl.start.line,
            is_param: true,
        }));
    }
    locals.extend(decl.locals.iter().map(|l| LocalVar {
        name: l.name.clone(),
        type_ref: l.type_ref.clone().map(TypeRef::new),
        line: l.line,
        is_param: false,
    }));

    Member {
        name: decl.name.clone(),
        kind,
        visibility: Visibility::from_modifiers(decl.modifiers, default_visibility),
        modifiers: decl.modifiers,
        type_ref: decl.type_ref.clone().map(TypeRef::new),
        params,
        accessors: decl.accessors.clone(),
        start: decl.start,
        end_line: decl.end_line,
        locals,
    }
}

/// ActionScript declares a property as a separate getter and setter. Fold the
/// second half into the first so each property is one member.
fn merge_member(members: &mut Vec<Member>, member: Member) {
    if member.kind == MemberKind::Property {
        let existing = members
            .iter_mut()
            .find(|m| m.kind == MemberKind::Property && m.name == member.name);
        if let Some(existing) = existing {
            let (get, set) = match (&existing.accessors, &member.accessors) {
                (Some((g1, s1)), Some((g2, s2))) => (
                    pick_accessor(g1, g2),
                    pick_accessor(s1, s2),
                ),
                (Some(pair), None) | (None, Some(pair)) => pair.clone(),
                (None, None) => return,
            };
            existing.accessors = Some((get, set));
            if existing.type_ref.is_none() {
                existing.type_ref = member.type_ref;
            }
            existing.end_line = existing.end_line.max(member.end_line);
            return;
        }
    }
    members.push(member);
}

fn pick_accessor(first: &SmolStr, second: &SmolStr) -> SmolStr {
    if first == "never" {
        second.clone()
    } else {
        first.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn lower(text: &str, language: Language) -> FileSymbols {
        lower_file(FileId::new(0), &parse(text), language)
    }

    #[test]
    fn test_qualified_names_and_kinds() {
        let text = "package a.b;\nimport c.D;\nclass Foo {}\ninterface IBar {}\nenum Color { Red; }\n";
        let lowered = lower(text, Language::Haxe);

        assert_eq!(&*lowered.package, "a.b");
        assert!(lowered.imports.contains("c.D"));
        let names: Vec<_> = lowered.symbols.iter().map(|s| &*s.qualified_name).collect();
        assert_eq!(names, vec!["a.b.Foo", "a.b.IBar", "a.b.Color"]);
        assert_eq!(lowered.symbols[1].kind, TypeKind::Interface);
        assert_eq!(lowered.symbols[2].kind, TypeKind::Enum);
        assert_eq!(lowered.symbols[2].members[0].kind, MemberKind::EnumCase);
    }

    #[test]
    fn test_root_package() {
        let lowered = lower("class Main {}\n", Language::Haxe);
        assert_eq!(&*lowered.symbols[0].qualified_name, "Main");
        assert!(lowered.package.is_empty());
    }

    #[test]
    fn test_default_member_visibility() {
        let text = "class A {\n  var x:Int;\n  public function f() {}\n}\ninterface I {\n  function g():Void;\n}\n";
        let lowered = lower(text, Language::Haxe);
        assert_eq!(lowered.symbols[0].members[0].visibility, Visibility::Private);
        assert_eq!(lowered.symbols[0].members[1].visibility, Visibility::Public);
        assert_eq!(lowered.symbols[1].members[0].visibility, Visibility::Public);
    }

    #[test]
    fn test_params_become_locals() {
        let text = "class A {\n  function f(a:Int) {\n    var b = 1;\n  }\n}\n";
        let lowered = lower(text, Language::Haxe);
        let f = &lowered.symbols[0].members[0];
        assert_eq!(f.locals.len(), 2);
        assert!(f.locals[0].is_param);
        assert_eq!(f.locals[1].name, "b");
        assert_eq!(f.locals[1].line, 2);
    }

    #[test]
    fn test_actionscript_accessors_merge() {
        let text = "package p {\n  public class A {\n    public function get size():int { return 1; }\n    public function set size(v:int):void {}\n  }\n}\n";
        let lowered = lower(text, Language::ActionScript);
        let class = &lowered.symbols[0];
        assert_eq!(class.members.len(), 1);
        let size = &class.members[0];
        assert_eq!(size.kind, MemberKind::Property);
        assert_eq!(
            size.accessors,
            Some((SmolStr::new("get"), SmolStr::new("set")))
        );
        assert_eq!(size.type_ref, Some(TypeRef::new("int")));
    }

    #[test]
    fn test_unclosed_class_extends_to_end() {
        let lowered = lower("class A {\n  var x:Int;\n", Language::Haxe);
        assert_eq!(lowered.symbols[0].end_line, u32::MAX);
    }
}
