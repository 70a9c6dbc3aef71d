//! Edit planning — turns an [`ActionKind`] into a [`SourceChange`].
//!
//! Placement rules:
//! - imports: alphabetical position among existing imports, else after the
//!   last import, else after the `package` line, else at the top of the file
//! - fields: after the last field, else right after the opening brace
//! - methods: after the member under the caret, else before the closing
//!   brace of the class
//!
//! Indentation is copied from neighbouring lines unless the options fix it.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::actions::{ActionKind, delegate_methods, missing_interface_members, property_name};
use super::edit::{EditError, SourceChange};
use super::options::{BraceStyle, GeneratorOptions};
use crate::base::LineCol;
use crate::hir::{FileContext, ImportSlot, Member, MemberKind, Symbol, TypeKind, TypeRef};
use crate::syntax::Language;

/// Plan the edit for `action` against the context's snapshot.
pub fn plan(
    ctx: &FileContext<'_>,
    action: &ActionKind,
    options: &GeneratorOptions,
) -> Result<SourceChange, EditError> {
    let mut change = SourceChange::new(ctx.file());

    if let ActionKind::AddImport { qualified_name } = action {
        add_import(&mut change, ctx, qualified_name, options)?;
        return Ok(change);
    }

    let class = ctx.current_class();
    if class.is_void() {
        return Err(EditError::NotApplicable("caret is outside any type".into()));
    }
    let planner = Planner::new(ctx, class, options);

    match action {
        ActionKind::AddImport { .. } => {}
        ActionKind::PromoteLocal { name } => planner.promote_local(&mut change, name)?,
        ActionKind::GenerateGetter { field } => planner.accessors(&mut change, field, true, false)?,
        ActionKind::GenerateSetter { field } => planner.accessors(&mut change, field, false, true)?,
        ActionKind::GenerateGetterSetter { field } => {
            planner.accessors(&mut change, field, true, true)?
        }
        ActionKind::OverrideMethod { owner, name } => planner.override_method(&mut change, owner, name)?,
        ActionKind::ImplementInterface { interface } => planner.implement(&mut change, interface)?,
        ActionKind::GenerateDelegates { field } => planner.delegates(&mut change, field)?,
        ActionKind::GenerateSwitchCases { enum_type } => planner.switch_cases(&mut change, enum_type)?,
        ActionKind::CreateVariable { name } => planner.create_variable(&mut change, name)?,
        ActionKind::CreateMethod { name, args } => planner.create_method(&mut change, name, *args)?,
    }

    tracing::debug!(action = ?action, edits = change.edits.len(), "planned change");
    Ok(change)
}

// ============================================================================
// IMPORTS
// ============================================================================

fn leading_ws(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn line_len(ctx: &FileContext<'_>, line: u32) -> Result<u32, EditError> {
    ctx.line_text(line)
        .map(|text| text.len() as u32)
        .ok_or_else(|| EditError::MissingAnchor(format!("line {line} is not in the snapshot")))
}

/// Add an import edit. Already visible names produce no edit.
fn add_import(
    change: &mut SourceChange,
    ctx: &FileContext<'_>,
    qualified_name: &str,
    options: &GeneratorOptions,
) -> Result<(), EditError> {
    let imports = ctx.imports();
    let already = imports.contains(qualified_name)
        || ctx
            .table()
            .lookup_import_path(qualified_name)
            .is_some_and(|s| ctx.is_imported(s, ctx.caret().line));
    if already {
        tracing::debug!(qualified_name, "import already present");
        return Ok(());
    }

    let statement = format!("import {qualified_name};");
    match imports.slot_for(qualified_name, options.sort_imports) {
        ImportSlot::Before(line) => {
            let text = anchor_text(ctx, line)?;
            let indent = leading_ws(text).to_string();
            change
                .anchor(line, text)
                .insert(LineCol::new(line, 0), format!("{indent}{statement}\n"));
        }
        ImportSlot::After(line) => {
            let text = anchor_text(ctx, line)?;
            let indent = leading_ws(text).to_string();
            change
                .anchor(line, text)
                .insert(LineCol::new(line, text.len() as u32), format!("\n{indent}{statement}"));
        }
        ImportSlot::Empty => match ctx.info().package_line {
            Some(package_line) => {
                let mut line = package_line;
                let mut text = anchor_text(ctx, line)?;
                let block = ctx.language() == Language::ActionScript;
                if block && !text.contains('{') {
                    if let Some(next) = ctx.line_text(line + 1).filter(|t| t.trim_start().starts_with('{')) {
                        line += 1;
                        text = next;
                    }
                }
                let inserted = if block {
                    format!("\n{}{statement}", indent_unit(ctx, None))
                } else {
                    format!("\n\n{statement}")
                };
                change
                    .anchor(line, text)
                    .insert(LineCol::new(line, text.len() as u32), inserted);
            }
            None => {
                let text = ctx.line_text(0).unwrap_or_default();
                change
                    .anchor(0, text)
                    .insert(LineCol::new(0, 0), format!("{statement}\n\n"));
            }
        },
    }
    Ok(())
}

fn anchor_text<'a>(ctx: &FileContext<'a>, line: u32) -> Result<&'a str, EditError> {
    ctx.line_text(line)
        .ok_or_else(|| EditError::MissingAnchor(format!("line {line} is not in the snapshot")))
}

/// Indent unit from options, or inferred from the file: a tab if any line is
/// tab-indented, else the smallest space indent, else a tab.
fn indent_unit(ctx: &FileContext<'_>, options: Option<&GeneratorOptions>) -> String {
    if let Some(unit) = options.and_then(GeneratorOptions::indent_unit) {
        return unit;
    }
    let mut smallest: Option<usize> = None;
    for line in ctx.info().source().lines() {
        if line.trim().is_empty() {
            continue;
        }
        let ws = leading_ws(line);
        if ws.starts_with('\t') {
            return "\t".to_string();
        }
        if !ws.is_empty() && ws.chars().all(|c| c == ' ') {
            smallest = Some(smallest.map_or(ws.len(), |s| s.min(ws.len())));
        }
    }
    match smallest {
        Some(n) => " ".repeat(n),
        None => "\t".to_string(),
    }
}

/// Names of the types in `type_ref`, including generic arguments.
fn type_names(type_ref: &TypeRef, out: &mut Vec<String>) {
    let stripped = type_ref.strip_null();
    if let Some(name) = stripped.lookup_name() {
        out.push(name.to_string());
    }
    for arg in stripped.type_args() {
        type_names(&arg, out);
    }
}

// ============================================================================
// MEMBERS
// ============================================================================

/// Where a block goes and what wraps it.
struct Slot {
    at: LineCol,
    anchor: u32,
    prefix: String,
    suffix: String,
}

struct Planner<'c, 'a> {
    ctx: &'c FileContext<'a>,
    class: &'a Symbol,
    options: &'c GeneratorOptions,
    language: Language,
    unit: String,
    class_indent: String,
    member_indent: String,
}

impl<'c, 'a> Planner<'c, 'a> {
    fn new(ctx: &'c FileContext<'a>, class: &'a Symbol, options: &'c GeneratorOptions) -> Self {
        let unit = indent_unit(ctx, Some(options));
        let class_indent = ctx
            .line_text(class.start.line)
            .map(|l| leading_ws(l).to_string())
            .unwrap_or_default();
        let member_indent = class
            .members
            .iter()
            .filter(|m| m.start.line != class.start.line)
            .find_map(|m| ctx.line_text(m.start.line))
            .map(|l| leading_ws(l).to_string())
            .filter(|ws| !ws.is_empty())
            .unwrap_or_else(|| format!("{class_indent}{unit}"));

        Self {
            ctx,
            class,
            options,
            language: ctx.language(),
            unit,
            class_indent,
            member_indent,
        }
    }

    fn close_brace(&self) -> Result<LineCol, EditError> {
        self.class
            .close_brace
            .ok_or_else(|| EditError::MissingAnchor(format!("{} has no closing brace", self.class.name)))
    }

    /// End of `line`, if inserting there stays inside the class body.
    fn after_line(&self, line: u32) -> Result<Option<Slot>, EditError> {
        let close = self.class.close_brace;
        if close.is_some_and(|c| c.line <= line) {
            return Ok(None);
        }
        Ok(Some(Slot {
            at: LineCol::new(line, line_len(self.ctx, line)?),
            anchor: line,
            prefix: String::new(),
            suffix: String::new(),
        }))
    }

    /// Directly before the closing brace, on lines of its own.
    fn before_close(&self, blank_before: bool) -> Result<Slot, EditError> {
        let close = self.close_brace()?;
        let text = anchor_text(self.ctx, close.line)?;
        let before = text.get(..close.col as usize).unwrap_or_default();
        let on_own_line = before.trim().is_empty() && !self.opens_on(close.line);

        Ok(if on_own_line {
            Slot {
                at: LineCol::new(close.line, 0),
                anchor: close.line,
                prefix: if blank_before { "\n".into() } else { String::new() },
                suffix: "\n".into(),
            }
        } else {
            Slot {
                at: close,
                anchor: close.line,
                prefix: "\n".into(),
                suffix: format!("\n{}", self.class_indent),
            }
        })
    }

    fn opens_on(&self, line: u32) -> bool {
        self.class.open_brace.is_some_and(|open| open.line == line)
    }

    fn field_slot(&self) -> Result<Slot, EditError> {
        let last_field = self
            .class
            .members
            .iter()
            .filter(|m| matches!(m.kind, MemberKind::Field | MemberKind::Property))
            .max_by_key(|m| m.end_line);
        if let Some(field) = last_field {
            if let Some(mut slot) = self.after_line(field.end_line)? {
                slot.prefix = "\n".into();
                return Ok(slot);
            }
        }

        let open = self
            .class
            .open_brace
            .ok_or_else(|| EditError::MissingAnchor(format!("{} has no body", self.class.name)))?;
        match self.after_line(open.line)? {
            Some(mut slot) => {
                slot.prefix = "\n".into();
                Ok(slot)
            }
            None => self.before_close(false),
        }
    }

    fn method_slot(&self) -> Result<Slot, EditError> {
        let current = self
            .ctx
            .current_member()
            .filter(|m| m.kind == MemberKind::Method);
        if let Some(member) = current {
            if let Some(mut slot) = self.after_line(member.end_line)? {
                slot.prefix = "\n\n".into();
                return Ok(slot);
            }
        }
        self.before_close(!self.class.members.is_empty())
    }

    fn push(&self, change: &mut SourceChange, slot: Slot, block: &str) -> Result<(), EditError> {
        let text = anchor_text(self.ctx, slot.anchor)?;
        change
            .anchor(slot.anchor, text)
            .insert(slot.at, format!("{}{block}{}", slot.prefix, slot.suffix));
        Ok(())
    }

    fn import_types(&self, change: &mut SourceChange, types: &[(&TypeRef, crate::base::FileId)]) -> Result<(), EditError> {
        let table = self.ctx.table();
        let line = self.ctx.caret().line;
        let mut names = Vec::new();
        let mut needed: Vec<Arc<str>> = Vec::new();
        let mut seen = FxHashSet::default();
        for (type_ref, from) in types {
            names.clear();
            type_names(type_ref, &mut names);
            for name in &names {
                if self.language.is_builtin(name) {
                    continue;
                }
                let Some(symbol) = table.resolve_type_name(name, *from) else {
                    continue;
                };
                if !self.ctx.is_imported(symbol, line) && seen.insert(symbol.qualified_name.clone()) {
                    needed.push(symbol.import_path());
                }
            }
        }
        needed.sort();
        for qualified_name in needed {
            add_import(change, self.ctx, &qualified_name, self.options)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // templates
    // ------------------------------------------------------------------

    fn static_kw(is_static: bool) -> &'static str {
        if is_static { "static " } else { "" }
    }

    fn dynamic(&self) -> &'static str {
        self.language.dynamic_type()
    }

    fn function_block(&self, header: &str, body: &[String]) -> String {
        let ind = &self.member_indent;
        let mut text = match self.options.brace_style {
            BraceStyle::SameLine => format!("{ind}{header} {{\n"),
            BraceStyle::NextLine => format!("{ind}{header}\n{ind}{{\n"),
        };
        for line in body {
            text.push_str(&format!("{ind}{}{line}\n", self.unit));
        }
        text.push_str(&format!("{ind}}}"));
        text
    }

    fn signature(&self, name: &str, member: &Member) -> String {
        let mut text = format!("function {name}({})", member.params_text(self.language));
        if let Some(ret) = &member.type_ref {
            text.push(':');
            text.push_str(ret.as_str());
        }
        text
    }

    fn returns_value(member: &Member) -> bool {
        member.type_ref.as_ref().is_some_and(|t| !t.is_void())
    }

    /// A value of `type_ref` to return from a stub.
    fn default_value(&self, type_ref: &TypeRef) -> &'static str {
        match (self.language, type_ref.as_str()) {
            (Language::Haxe, "Int" | "Float" | "UInt") => "0",
            (Language::ActionScript, "int" | "uint" | "Number") => "0",
            (Language::Haxe, "Bool") | (Language::ActionScript, "Boolean") => "false",
            _ => "null",
        }
    }

    fn private_kw(&self) -> &'static str {
        match self.language {
            Language::Haxe => "",
            Language::ActionScript => "private ",
        }
    }

    fn public_kw(&self) -> &'static str {
        if self.options.public_accessors { "public " } else { "" }
    }

    // ------------------------------------------------------------------
    // actions
    // ------------------------------------------------------------------

    fn current_method(&self) -> Result<&'a Member, EditError> {
        self.ctx
            .current_member()
            .ok_or_else(|| EditError::NotApplicable("caret is not inside a member".into()))
    }

    fn promote_local(&self, change: &mut SourceChange, name: &str) -> Result<(), EditError> {
        let member = self.current_method()?;
        let local = member
            .visible_locals(self.ctx.caret().line)
            .find(|l| l.name == name && !l.is_param)
            .ok_or_else(|| EditError::UnknownSymbol(name.to_string()))?;
        if self.class.has_member(name) {
            return Err(EditError::NotApplicable(format!("{name} is already a member")));
        }

        let ty = local
            .type_ref
            .as_ref()
            .map_or(self.dynamic(), |t| t.as_str());
        let decl = format!(
            "{}{}{}var {name}:{ty};",
            self.member_indent,
            self.private_kw(),
            Self::static_kw(member.is_static()),
        );
        self.push(change, self.field_slot()?, &decl)?;

        // keep the local's value: assign it to the new field on the next line
        if let Some(line_text) = self.ctx.line_text(local.line) {
            if line_text.trim_end().ends_with(';') && local.line < member.end_line {
                let receiver = if member.is_static() {
                    self.class.name.to_string()
                } else {
                    "this".to_string()
                };
                let assign = format!("\n{}{receiver}.{name} = {name};", leading_ws(line_text));
                change
                    .anchor(local.line, line_text)
                    .insert(LineCol::new(local.line, line_text.len() as u32), assign);
            }
        }
        Ok(())
    }

    fn accessors(
        &self,
        change: &mut SourceChange,
        field_name: &str,
        getter: bool,
        setter: bool,
    ) -> Result<(), EditError> {
        let field = self
            .class
            .member(field_name)
            .filter(|m| m.kind == MemberKind::Field)
            .ok_or_else(|| EditError::UnknownSymbol(field_name.to_string()))?;
        let property = property_name(&field.name, &self.options.field_prefix)
            .ok_or_else(|| EditError::NotApplicable(format!("{field_name} has no accessor prefix")))?;
        let ty = field.type_ref.as_ref().map_or(self.dynamic(), |t| t.as_str());
        let static_kw = Self::static_kw(field.is_static());
        let public = self.public_kw();

        let mut methods = Vec::new();
        match self.language {
            Language::Haxe => {
                let get = if getter { "get" } else { "never" };
                let set = if setter { "set" } else { "never" };
                let decl = format!(
                    "{}{public}{static_kw}var {property}({get}, {set}):{ty};",
                    self.member_indent
                );
                self.push(change, self.field_slot()?, &decl)?;
                if getter {
                    methods.push(self.function_block(
                        &format!("{static_kw}function get_{property}():{ty}"),
                        &[format!("return {field_name};")],
                    ));
                }
                if setter {
                    methods.push(self.function_block(
                        &format!("{static_kw}function set_{property}(value:{ty}):{ty}"),
                        &[format!("return {field_name} = value;")],
                    ));
                }
            }
            Language::ActionScript => {
                if getter {
                    methods.push(self.function_block(
                        &format!("{public}{static_kw}function get {property}():{ty}"),
                        &[format!("return {field_name};")],
                    ));
                }
                if setter {
                    methods.push(self.function_block(
                        &format!("{public}{static_kw}function set {property}(value:{ty}):void"),
                        &[format!("{field_name} = value;")],
                    ));
                }
            }
        }
        self.push(change, self.method_slot()?, &methods.join("\n\n"))
    }

    fn override_method(&self, change: &mut SourceChange, owner: &str, name: &str) -> Result<(), EditError> {
        let parent = self
            .ctx
            .table()
            .lookup_qualified(owner)
            .ok_or_else(|| EditError::UnknownSymbol(owner.to_string()))?;
        let member = parent
            .member(name)
            .filter(|m| m.is_method())
            .ok_or_else(|| EditError::UnknownSymbol(format!("{owner}.{name}")))?;
        if self.class.has_member(name) {
            return Err(EditError::NotApplicable(format!("{name} is already overridden")));
        }

        let header = format!(
            "override {} {}",
            member.visibility.keyword(),
            self.signature(name, member)
        );
        let call = format!("super.{name}({});", member.args_text());
        let body = if Self::returns_value(member) {
            format!("return {call}")
        } else {
            call
        };
        self.import_types(change, &signature_types(member, parent.file))?;
        self.push(change, self.method_slot()?, &self.function_block(&header, &[body]))
    }

    fn implement(&self, change: &mut SourceChange, interface: &str) -> Result<(), EditError> {
        let symbol = self
            .ctx
            .table()
            .lookup_qualified(interface)
            .ok_or_else(|| EditError::UnknownSymbol(interface.to_string()))?;
        let missing = missing_interface_members(self.ctx, self.class, symbol);
        if missing.is_empty() {
            return Err(EditError::NotApplicable(format!("{interface} is fully implemented")));
        }

        let mut types = Vec::new();
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        for (declaring, member) in &missing {
            types.extend(signature_types(member, declaring.file));
            match member.kind {
                MemberKind::Method => {
                    let header = format!("public {}", self.signature(&member.name, member));
                    let body = match &member.type_ref {
                        Some(ret) if !ret.is_void() => vec![format!("return {};", self.default_value(ret))],
                        _ => Vec::new(),
                    };
                    methods.push(self.function_block(&header, &body));
                }
                MemberKind::Field | MemberKind::Property => {
                    let accessors = member
                        .accessors
                        .as_ref()
                        .map(|(g, s)| format!("({g}, {s})"))
                        .unwrap_or_default();
                    let ty = member.type_ref.as_ref().map_or(self.dynamic(), |t| t.as_str());
                    fields.push(format!(
                        "{}public var {}{accessors}:{ty};",
                        self.member_indent, member.name
                    ));
                }
                MemberKind::EnumCase => {}
            }
        }

        self.import_types(change, &types)?;
        if !fields.is_empty() {
            self.push(change, self.field_slot()?, &fields.join("\n"))?;
        }
        if !methods.is_empty() {
            self.push(change, self.method_slot()?, &methods.join("\n\n"))?;
        }
        Ok(())
    }

    fn delegates(&self, change: &mut SourceChange, field_name: &str) -> Result<(), EditError> {
        let field = self
            .class
            .member(field_name)
            .ok_or_else(|| EditError::UnknownSymbol(field_name.to_string()))?;
        let target = field
            .type_ref
            .as_ref()
            .and_then(|t| self.ctx.table().resolve_type_ref(t, self.class.file))
            .ok_or_else(|| EditError::UnknownSymbol(format!("type of {field_name}")))?;
        let methods = delegate_methods(self.ctx, self.class, target);
        if methods.is_empty() {
            return Err(EditError::NotApplicable(format!("nothing to delegate to {field_name}")));
        }

        let mut types = Vec::new();
        let blocks = methods
            .iter()
            .map(|method| {
                types.extend(signature_types(method, target.file));
                let call = format!("{field_name}.{}({});", method.name, method.args_text());
                let body = if Self::returns_value(method) {
                    format!("return {call}")
                } else {
                    call
                };
                let header = format!("{}{}", self.public_kw(), self.signature(&method.name, method));
                self.function_block(&header, &[body])
            })
            .collect::<Vec<_>>();

        self.import_types(change, &types)?;
        self.push(change, self.method_slot()?, &blocks.join("\n\n"))
    }

    fn switch_cases(&self, change: &mut SourceChange, enum_type: &str) -> Result<(), EditError> {
        let symbol = self
            .ctx
            .table()
            .lookup_qualified(enum_type)
            .filter(|s| s.kind == TypeKind::Enum)
            .ok_or_else(|| EditError::UnknownSymbol(enum_type.to_string()))?;
        let open_line = switch_open_line(self.ctx)
            .ok_or_else(|| EditError::MissingAnchor("switch has no opening brace".into()))?;
        let switch_text = anchor_text(self.ctx, self.ctx.caret().line)?;
        let indent = format!("{}{}", leading_ws(switch_text), self.unit);

        let cases = symbol
            .members
            .iter()
            .filter(|m| m.kind == MemberKind::EnumCase)
            .map(|case| {
                if case.params.is_empty() {
                    format!("\n{indent}case {}:", case.name)
                } else {
                    let binds = case.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>();
                    format!("\n{indent}case {}({}):", case.name, binds.join(", "))
                }
            })
            .collect::<String>();

        let text = anchor_text(self.ctx, open_line)?;
        change
            .anchor(open_line, text)
            .insert(LineCol::new(open_line, text.len() as u32), cases);
        Ok(())
    }

    fn create_variable(&self, change: &mut SourceChange, name: &str) -> Result<(), EditError> {
        if self.class.has_member(name) {
            return Err(EditError::NotApplicable(format!("{name} already exists")));
        }
        let is_static = self.ctx.current_member().is_some_and(Member::is_static);
        let decl = format!(
            "{}{}{}var {name}:{};",
            self.member_indent,
            self.private_kw(),
            Self::static_kw(is_static),
            self.dynamic()
        );
        self.push(change, self.field_slot()?, &decl)
    }

    fn create_method(&self, change: &mut SourceChange, name: &str, args: usize) -> Result<(), EditError> {
        if self.class.has_member(name) {
            return Err(EditError::NotApplicable(format!("{name} already exists")));
        }
        let is_static = self.ctx.current_member().is_some_and(Member::is_static);
        let params = (0..args)
            .map(|i| format!("arg{i}:{}", self.dynamic()))
            .collect::<Vec<_>>()
            .join(", ");
        let header = format!(
            "{}{}function {name}({params}):{}",
            self.private_kw(),
            Self::static_kw(is_static),
            self.language.void_type()
        );
        self.push(change, self.method_slot()?, &self.function_block(&header, &[]))
    }
}

fn signature_types(member: &Member, from: crate::base::FileId) -> Vec<(&TypeRef, crate::base::FileId)> {
    member
        .params
        .iter()
        .filter_map(|p| p.type_ref.as_ref())
        .chain(member.type_ref.as_ref())
        .map(|t| (t, from))
        .collect()
}

/// Line holding the `{` of the `switch` on the caret line, when the switch
/// has no cases yet.
pub(crate) fn switch_open_line(ctx: &FileContext<'_>) -> Option<u32> {
    let line = ctx.caret().line;
    let text = ctx.line_text(line)?;
    if !text.contains("switch") {
        return None;
    }
    let open = if text.trim_end().ends_with('{') {
        line
    } else if ctx.line_text(line + 1)?.trim() == "{" {
        line + 1
    } else {
        return None;
    };
    let has_cases = ctx
        .line_text(open + 1)
        .is_some_and(|next| next.trim_start().starts_with("case"));
    (!has_cases).then_some(open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::{FileInfo, SymbolTable, lower_file};
    use crate::ide::edit::SourceBuffer;
    use crate::syntax::parse;

    fn table(files: &[(&str, &str)]) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (id, (path, text)) in files.iter().enumerate() {
            let file = FileId::new(id as u32);
            let language = if path.ends_with(".as") {
                Language::ActionScript
            } else {
                Language::Haxe
            };
            let lowered = lower_file(file, &parse(text), language);
            let info = FileInfo::new(*path, language, *text, &lowered);
            table.add_file(file, info, lowered.symbols);
        }
        table
    }

    fn apply(files: &[(&str, &str)], caret: LineCol, action: ActionKind) -> String {
        apply_with(files, caret, action, &GeneratorOptions::default())
    }

    fn apply_with(
        files: &[(&str, &str)],
        caret: LineCol,
        action: ActionKind,
        options: &GeneratorOptions,
    ) -> String {
        let table = table(files);
        let ctx = FileContext::new(&table, FileId::new(0), caret).unwrap();
        let change = plan(&ctx, &action, options).unwrap();
        let mut buffer = SourceBuffer::new(files[0].1);
        change.apply(&mut buffer).unwrap();
        buffer.into_string()
    }

    #[test]
    fn test_import_sorted_position() {
        let main = "package app;\n\nimport a.Alpha;\nimport c.Gamma;\n\nclass Main {}\n";
        let out = apply(
            &[("app/Main.hx", main), ("b/Beta.hx", "package b;\nclass Beta {}\n")],
            LineCol::new(5, 0),
            ActionKind::AddImport { qualified_name: Arc::from("b.Beta") },
        );
        assert_eq!(
            out,
            "package app;\n\nimport a.Alpha;\nimport b.Beta;\nimport c.Gamma;\n\nclass Main {}\n"
        );
    }

    #[test]
    fn test_import_after_package() {
        let main = "package app;\n\nclass Main {}\n";
        let out = apply(
            &[("app/Main.hx", main), ("b/Beta.hx", "package b;\nclass Beta {}\n")],
            LineCol::new(2, 0),
            ActionKind::AddImport { qualified_name: Arc::from("b.Beta") },
        );
        assert_eq!(out, "package app;\n\nimport b.Beta;\n\nclass Main {}\n");
    }

    #[test]
    fn test_import_without_package() {
        let out = apply(
            &[("Main.hx", "class Main {}\n"), ("b/Beta.hx", "package b;\nclass Beta {}\n")],
            LineCol::new(0, 0),
            ActionKind::AddImport { qualified_name: Arc::from("b.Beta") },
        );
        assert_eq!(out, "import b.Beta;\n\nclass Main {}\n");
    }

    #[test]
    fn test_import_already_present_is_noop() {
        let table = table(&[
            ("app/Main.hx", "package app;\nimport b.Beta;\nclass Main {}\n"),
            ("b/Beta.hx", "package b;\nclass Beta {}\n"),
        ]);
        let ctx = FileContext::new(&table, FileId::new(0), LineCol::new(2, 0)).unwrap();
        let change = plan(
            &ctx,
            &ActionKind::AddImport { qualified_name: Arc::from("b.Beta") },
            &GeneratorOptions::default(),
        )
        .unwrap();
        assert!(change.is_noop());
    }

    #[test]
    fn test_import_inside_actionscript_package_block() {
        let main = "package app {\n    public class Main {\n    }\n}\n";
        let out = apply(
            &[("app/Main.as", main), ("lib/Tool.as", "package lib {\n    public class Tool {}\n}\n")],
            LineCol::new(1, 4),
            ActionKind::AddImport { qualified_name: Arc::from("lib.Tool") },
        );
        assert_eq!(
            out,
            "package app {\n    import lib.Tool;\n    public class Main {\n    }\n}\n"
        );
    }

    #[test]
    fn test_next_line_braces_and_fixed_indent() {
        let options = GeneratorOptions::default()
            .with_brace_style(BraceStyle::NextLine)
            .with_indent(crate::ide::options::IndentStyle::Spaces(2));
        let out = apply_with(
            &[("A.hx", "class A {\n}\n")],
            LineCol::new(0, 0),
            ActionKind::CreateMethod { name: "go".into(), args: 0 },
            &options,
        );
        assert_eq!(out, "class A {\n  function go():Void\n  {\n  }\n}\n");
    }

    #[test]
    fn test_haxe_getter_setter() {
        let main = "class Box {\n\tvar _size:Int;\n}\n";
        let out = apply(
            &[("Box.hx", main)],
            LineCol::new(1, 6),
            ActionKind::GenerateGetterSetter { field: "_size".into() },
        );
        assert_eq!(
            out,
            "class Box {\n\tvar _size:Int;\n\tpublic var size(get, set):Int;\n\n\tfunction get_size():Int {\n\t\treturn _size;\n\t}\n\n\tfunction set_size(value:Int):Int {\n\t\treturn _size = value;\n\t}\n}\n"
        );
    }

    #[test]
    fn test_actionscript_getter() {
        let main = "package {\n    public class Box {\n        private var _size:int;\n    }\n}\n";
        let out = apply(
            &[("Box.as", main)],
            LineCol::new(2, 20),
            ActionKind::GenerateGetter { field: "_size".into() },
        );
        assert_eq!(
            out,
            "package {\n    public class Box {\n        private var _size:int;\n\n        public function get size():int {\n            return _size;\n        }\n    }\n}\n"
        );
    }

    #[test]
    fn test_override_after_current_member() {
        let base = "package app;\nclass Base {\n  public function tick(dt:Float):Bool { return true; }\n}\n";
        let main = "package app;\nclass Foo extends Base {\n  function run() {\n    tick;\n  }\n}\n";
        let out = apply(
            &[("app/Foo.hx", main), ("app/Base.hx", base)],
            LineCol::new(3, 8),
            ActionKind::OverrideMethod { owner: Arc::from("app.Base"), name: "tick".into() },
        );
        assert_eq!(
            out,
            "package app;\nclass Foo extends Base {\n  function run() {\n    tick;\n  }\n\n  override public function tick(dt:Float):Bool {\n    return super.tick(dt);\n  }\n}\n"
        );
    }

    #[test]
    fn test_one_line_class_body() {
        let out = apply(
            &[("Foo.hx", "class Foo { }\n")],
            LineCol::new(0, 0),
            ActionKind::CreateVariable { name: "count".into() },
        );
        assert_eq!(out, "class Foo { \n\tvar count:Dynamic;\n}\n");
    }

    #[test]
    fn test_implement_interface_with_import() {
        let iface = "package api;\nimport model.Item;\ninterface IStore {\n  function get(id:Int):Item;\n  function clear():Void;\n}\n";
        let main = "package app;\nimport api.IStore;\n\nclass Store implements IStore {\n  public function clear():Void {}\n}\n";
        let out = apply(
            &[
                ("app/Store.hx", main),
                ("api/IStore.hx", iface),
                ("model/Item.hx", "package model;\nclass Item {}\n"),
            ],
            LineCol::new(3, 4),
            ActionKind::ImplementInterface { interface: Arc::from("api.IStore") },
        );
        assert_eq!(
            out,
            "package app;\nimport api.IStore;\nimport model.Item;\n\nclass Store implements IStore {\n  public function clear():Void {}\n\n  public function get(id:Int):Item {\n    return null;\n  }\n}\n"
        );
    }

    #[test]
    fn test_switch_cases() {
        let color = "enum Color {\n  Red;\n  Rgb(r:Int, g:Int, b:Int);\n}\n";
        let main = "class Paint {\n  function f(c:Color) {\n    switch (c) {\n    }\n  }\n}\n";
        let out = apply(
            &[("Paint.hx", main), ("Color.hx", color)],
            LineCol::new(2, 13),
            ActionKind::GenerateSwitchCases { enum_type: Arc::from("Color") },
        );
        assert_eq!(
            out,
            "class Paint {\n  function f(c:Color) {\n    switch (c) {\n      case Red:\n      case Rgb(r, g, b):\n    }\n  }\n}\n"
        );
    }

    #[test]
    fn test_promote_local_assigns_field() {
        let main = "class A {\n  var x:Int;\n\n  function f() {\n    var tmp:String = \"a\";\n  }\n}\n";
        let out = apply(
            &[("A.hx", main)],
            LineCol::new(4, 11),
            ActionKind::PromoteLocal { name: "tmp".into() },
        );
        assert_eq!(
            out,
            "class A {\n  var x:Int;\n  var tmp:String;\n\n  function f() {\n    var tmp:String = \"a\";\n    this.tmp = tmp;\n  }\n}\n"
        );
    }

    #[test]
    fn test_create_method_before_closing_brace() {
        let main = "class A {\n  var x:Int;\n}\n";
        let out = apply(
            &[("A.hx", main)],
            LineCol::new(1, 2),
            ActionKind::CreateMethod { name: "go".into(), args: 1 },
        );
        assert_eq!(
            out,
            "class A {\n  var x:Int;\n\n  function go(arg0:Dynamic):Void {\n  }\n}\n"
        );
    }

    #[test]
    fn test_unclosed_class_is_missing_anchor() {
        let table = table(&[("A.hx", "class A {\n  var x:Int;\n")]);
        let ctx = FileContext::new(&table, FileId::new(0), LineCol::new(1, 2)).unwrap();
        let err = plan(
            &ctx,
            &ActionKind::CreateMethod { name: "go".into(), args: 0 },
            &GeneratorOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::MissingAnchor(_)));
    }

    #[test]
    fn test_indent_inference() {
        let table = table(&[("A.hx", "class A {\n    var x:Int;\n        var y:Int;\n}\n")]);
        let ctx = FileContext::new(&table, FileId::new(0), LineCol::new(1, 0)).unwrap();
        assert_eq!(indent_unit(&ctx, None), "    ");
    }
}
