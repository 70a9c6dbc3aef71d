//! Action catalog — which generator actions apply at the caret.
//!
//! Listing is pure: it reads a [`FileContext`] and a [`ResolutionResult`]
//! and returns descriptors. Nothing is edited until the host applies one.
//!
//! The kind of the enclosing type decides the action set once per query:
//! interfaces, enums and typedefs can only gain imports; classes and
//! abstracts (and the void sentinel outside any type) evaluate every
//! predicate, each of which contributes nothing when it does not apply.

use std::sync::Arc;

use smol_str::SmolStr;

use super::labels::{GENERATOR_DESCRIPTION_KEY, GENERATOR_ICON, LabelProvider};
use super::options::GeneratorOptions;
use crate::base::{FileId, LineCol};
use crate::hir::{
    ExprContext, FileContext, Member, MemberKind, ResolutionResult, Symbol, TypeKind, Visibility,
};
use crate::syntax::Language;

/// A generator action and the data it needs to plan its edit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    AddImport { qualified_name: Arc<str> },
    /// Turn a local variable into a class field.
    PromoteLocal { name: SmolStr },
    GenerateGetter { field: SmolStr },
    GenerateSetter { field: SmolStr },
    GenerateGetterSetter { field: SmolStr },
    OverrideMethod { owner: Arc<str>, name: SmolStr },
    ImplementInterface { interface: Arc<str> },
    /// Forward the public methods of a field's type through the field.
    GenerateDelegates { field: SmolStr },
    GenerateSwitchCases { enum_type: Arc<str> },
    CreateVariable { name: SmolStr },
    CreateMethod { name: SmolStr, args: usize },
}

impl ActionKind {
    pub fn label_key(&self) -> &'static str {
        match self {
            ActionKind::AddImport { .. } => "ASCompletion.Label.AddImport",
            ActionKind::PromoteLocal { .. } => "ASCompletion.Label.PromoteLocal",
            ActionKind::GenerateGetter { .. } => "ASCompletion.Label.GenerateGetter",
            ActionKind::GenerateSetter { .. } => "ASCompletion.Label.GenerateSetter",
            ActionKind::GenerateGetterSetter { .. } => "ASCompletion.Label.GenerateGetterSetter",
            ActionKind::OverrideMethod { .. } => "ASCompletion.Label.OverrideMethod",
            ActionKind::ImplementInterface { .. } => "ASCompletion.Label.ImplementInterface",
            ActionKind::GenerateDelegates { .. } => "ASCompletion.Label.GenerateDelegates",
            ActionKind::GenerateSwitchCases { .. } => "ASCompletion.Label.GenerateSwitchCases",
            ActionKind::CreateVariable { .. } => "ASCompletion.Label.CreateVariable",
            ActionKind::CreateMethod { .. } => "ASCompletion.Label.CreateMethod",
        }
    }

    /// The name substituted into the label.
    pub fn subject(&self) -> &str {
        match self {
            ActionKind::AddImport { qualified_name } => qualified_name,
            ActionKind::ImplementInterface { interface } => interface,
            ActionKind::GenerateSwitchCases { enum_type } => enum_type,
            ActionKind::PromoteLocal { name }
            | ActionKind::CreateVariable { name }
            | ActionKind::CreateMethod { name, .. }
            | ActionKind::OverrideMethod { name, .. } => name,
            ActionKind::GenerateGetter { field }
            | ActionKind::GenerateSetter { field }
            | ActionKind::GenerateGetterSetter { field }
            | ActionKind::GenerateDelegates { field } => field,
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self, ActionKind::AddImport { .. })
    }
}

/// A listed action as shown to the user. Carries the file and caret it was
/// listed for so applying it needs nothing else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub id: u32,
    pub kind: ActionKind,
    pub file: FileId,
    pub caret: LineCol,
    pub label: String,
    pub description: String,
    pub icon: u32,
}

/// Attach labels and ids to listed actions.
pub fn describe(
    kinds: Vec<ActionKind>,
    file: FileId,
    caret: LineCol,
    labels: &dyn LabelProvider,
) -> Vec<ActionDescriptor> {
    let description = labels.format(GENERATOR_DESCRIPTION_KEY, "");
    kinds
        .into_iter()
        .enumerate()
        .map(|(id, kind)| ActionDescriptor {
            id: id as u32,
            label: labels.format(kind.label_key(), kind.subject()),
            description: description.clone(),
            icon: GENERATOR_ICON,
            kind,
            file,
            caret,
        })
        .collect()
}

// ============================================================================
// CATALOG
// ============================================================================

/// Every action that applies to `resolution` at the context's caret.
pub fn list_actions(
    ctx: &FileContext<'_>,
    resolution: &ResolutionResult,
    options: &GeneratorOptions,
) -> Vec<ActionKind> {
    let class = ctx.current_class();
    let mut actions = Vec::new();

    match class.kind {
        TypeKind::Interface | TypeKind::Enum | TypeKind::TypeDef => {
            import_actions(ctx, resolution, &mut actions);
        }
        TypeKind::Class | TypeKind::Abstract => {
            import_actions(ctx, resolution, &mut actions);
            if !class.is_void() {
                member_actions(ctx, class, resolution, options, &mut actions);
            }
        }
    }

    tracing::debug!(
        class = %class.qualified_name,
        kind = class.kind.display(),
        token = %resolution.token,
        count = actions.len(),
        "listed actions"
    );
    actions
}

fn member_actions(
    ctx: &FileContext<'_>,
    class: &Symbol,
    resolution: &ResolutionResult,
    options: &GeneratorOptions,
    actions: &mut Vec<ActionKind>,
) {
    promote_local(ctx, class, resolution, actions);
    accessors(ctx, class, resolution, options, actions);
    override_method(ctx, class, resolution, actions);
    implement_interfaces(ctx, class, resolution, actions);
    delegates(ctx, class, resolution, actions);
    switch_cases(ctx, resolution, actions);
    create_member(ctx, class, resolution, actions);
}

/// Import for a type named at the caret that is not yet visible.
fn import_actions(ctx: &FileContext<'_>, resolution: &ResolutionResult, actions: &mut Vec<ActionKind>) {
    if resolution.token.is_empty()
        || resolution.member.is_some()
        || matches!(resolution.context, ExprContext::Declaration(_))
    {
        return;
    }

    let table = ctx.table();
    let line = ctx.caret().line;
    let mut candidates: Vec<&Symbol> = Vec::new();

    if let Some(symbol) = resolution.type_symbol(table) {
        if !ctx.is_imported(symbol, line) {
            candidates.push(symbol);
        }
    }
    if candidates.is_empty() {
        if let Some(name) = &resolution.unresolved {
            candidates.extend(
                table
                    .lookup_simple(name)
                    .into_iter()
                    .filter(|s| !ctx.is_imported(s, line)),
            );
        }
    }

    let mut paths: Vec<_> = candidates.into_iter().map(Symbol::import_path).collect();
    paths.sort();
    paths.dedup();
    actions.extend(
        paths
            .into_iter()
            .map(|qualified_name| ActionKind::AddImport { qualified_name }),
    );
}

fn promote_local(
    ctx: &FileContext<'_>,
    class: &Symbol,
    resolution: &ResolutionResult,
    actions: &mut Vec<ActionKind>,
) {
    let Some(local) = &resolution.local else {
        return;
    };
    if local.is_param || ctx.current_member().is_none() || class.has_member(&local.name) {
        return;
    }
    actions.push(ActionKind::PromoteLocal {
        name: local.name.clone(),
    });
}

/// Own field named by the token, or the field declared on the caret line.
fn target_field<'a>(
    ctx: &FileContext<'a>,
    class: &'a Symbol,
    resolution: &ResolutionResult,
) -> Option<&'a Member> {
    if let Some((owner, member)) = resolution.member_in(ctx.table()) {
        if owner.qualified_name == class.qualified_name && member.kind == MemberKind::Field {
            return class.member(&member.name);
        }
        return None;
    }
    ctx.current_member()
        .filter(|m| m.kind == MemberKind::Field && m.start.line == ctx.caret().line)
}

/// Property name for a backing field, e.g. `_size` → `size`.
pub(crate) fn property_name<'n>(field: &'n str, prefix: &str) -> Option<&'n str> {
    if prefix.is_empty() {
        return None;
    }
    let name = field.strip_prefix(prefix)?.trim_start_matches(prefix);
    (!name.is_empty()).then_some(name)
}

fn accessors(
    ctx: &FileContext<'_>,
    class: &Symbol,
    resolution: &ResolutionResult,
    options: &GeneratorOptions,
    actions: &mut Vec<ActionKind>,
) {
    let Some(field) = target_field(ctx, class, resolution) else {
        return;
    };
    let Some(property) = property_name(&field.name, &options.field_prefix) else {
        return;
    };

    let (has_getter, has_setter) = match ctx.language() {
        Language::Haxe => (
            class.has_member(&format!("get_{property}")),
            class.has_member(&format!("set_{property}")),
        ),
        Language::ActionScript => match class.member(property).and_then(|m| m.accessors.as_ref()) {
            Some((get, set)) => (get != "never", set != "never"),
            None => (false, false),
        },
    };
    // a Haxe property of the same name blocks a new declaration
    if ctx.language() == Language::Haxe && class.has_member(property) {
        return;
    }

    let field = field.name.clone();
    if !has_getter && !has_setter {
        actions.push(ActionKind::GenerateGetterSetter { field: field.clone() });
    }
    if !has_getter {
        actions.push(ActionKind::GenerateGetter { field: field.clone() });
    }
    if !has_setter {
        actions.push(ActionKind::GenerateSetter { field });
    }
}

fn override_method(
    ctx: &FileContext<'_>,
    class: &Symbol,
    resolution: &ResolutionResult,
    actions: &mut Vec<ActionKind>,
) {
    let Some((owner, member)) = resolution.member_in(ctx.table()) else {
        return;
    };
    if owner.qualified_name == class.qualified_name
        || !member.is_overridable()
        || class.has_member(&member.name)
    {
        return;
    }
    let inherited = ctx
        .table()
        .ancestors(class)
        .iter()
        .any(|a| a.qualified_name == owner.qualified_name);
    if inherited {
        actions.push(ActionKind::OverrideMethod {
            owner: owner.qualified_name.clone(),
            name: member.name.clone(),
        });
    }
}

/// Interface members a class still lacks.
pub(crate) fn missing_interface_members<'a>(
    ctx: &FileContext<'a>,
    class: &'a Symbol,
    interface: &'a Symbol,
) -> Vec<(&'a Symbol, &'a Member)> {
    let table = ctx.table();
    let mut missing = Vec::new();
    for declaring in table.interface_closure(interface) {
        for member in &declaring.members {
            if table.find_member(class, &member.name).is_none()
                && !missing.iter().any(|(_, m): &(&Symbol, &Member)| m.name == member.name)
            {
                missing.push((declaring, member));
            }
        }
    }
    missing
}

fn implement_interfaces(
    ctx: &FileContext<'_>,
    class: &Symbol,
    resolution: &ResolutionResult,
    actions: &mut Vec<ActionKind>,
) {
    let table = ctx.table();
    let on_declaration = ctx.caret().line == class.start.line;
    let named = resolution.type_symbol(table);

    for interface in table.all_interfaces(class) {
        let targeted = on_declaration
            || named.is_some_and(|n| n.qualified_name == interface.qualified_name);
        if targeted && !missing_interface_members(ctx, class, interface).is_empty() {
            actions.push(ActionKind::ImplementInterface {
                interface: interface.qualified_name.clone(),
            });
        }
    }
}

/// Public instance methods of `target` the class does not define yet.
pub(crate) fn delegate_methods<'a>(
    ctx: &FileContext<'a>,
    class: &'a Symbol,
    target: &'a Symbol,
) -> Vec<&'a Member> {
    let table = ctx.table();
    let mut methods: Vec<&Member> = Vec::new();
    let owners = std::iter::once(target).chain(table.ancestors(target));
    for owner in owners {
        for member in owner.methods() {
            let public = owner.kind == TypeKind::Interface
                || member.visibility == Visibility::Public;
            if public
                && !member.is_static()
                && !member.is_constructor()
                && table.find_member(class, &member.name).is_none()
                && !methods.iter().any(|m| m.name == member.name)
            {
                methods.push(member);
            }
        }
    }
    methods
}

fn delegates(
    ctx: &FileContext<'_>,
    class: &Symbol,
    resolution: &ResolutionResult,
    actions: &mut Vec<ActionKind>,
) {
    let Some(field) = target_field(ctx, class, resolution) else {
        return;
    };
    let Some(target) = field
        .type_ref
        .as_ref()
        .and_then(|t| ctx.table().resolve_type_ref(t, class.file))
    else {
        return;
    };
    if matches!(target.kind, TypeKind::Class | TypeKind::Interface)
        && !delegate_methods(ctx, class, target).is_empty()
    {
        actions.push(ActionKind::GenerateDelegates {
            field: field.name.clone(),
        });
    }
}

fn switch_cases(ctx: &FileContext<'_>, resolution: &ResolutionResult, actions: &mut Vec<ActionKind>) {
    if resolution.preceding.as_deref() != Some("switch") || ctx.current_member().is_none() {
        return;
    }
    let Some(enum_type) = resolution
        .type_symbol(ctx.table())
        .filter(|s| s.kind == TypeKind::Enum && !s.members.is_empty())
    else {
        return;
    };
    if super::generate::switch_open_line(ctx).is_some() {
        actions.push(ActionKind::GenerateSwitchCases {
            enum_type: enum_type.qualified_name.clone(),
        });
    }
}

fn create_member(
    ctx: &FileContext<'_>,
    class: &Symbol,
    resolution: &ResolutionResult,
    actions: &mut Vec<ActionKind>,
) {
    let Some(name) = &resolution.unresolved else {
        return;
    };
    let Some(last) = resolution.segments.last() else {
        return;
    };
    if last.name != *name
        || !resolution.is_instance_name()
        || ctx.current_member().is_none()
        || class.has_member(name)
        || ctx.language().is_builtin(name)
        || !name.starts_with(|c: char| c.is_lowercase() || c == '_')
    {
        return;
    }
    let kind = match last.call {
        Some(args) => ActionKind::CreateMethod {
            name: name.clone(),
            args,
        },
        None => ActionKind::CreateVariable { name: name.clone() },
    };
    actions.push(kind);
}
