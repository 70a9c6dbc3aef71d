//! Expression resolution — what the token left of the caret refers to.
//!
//! A token such as `player.stats.health` is split into segments and walked
//! left to right. The leftmost segment is looked up in this order:
//!
//! 1. `this` / `super`
//! 2. parameters and locals of the current member declared on or above the
//!    caret line
//! 3. members of the current class, own before inherited
//! 4. type names: same file, imports, same package, root package
//! 5. builtin types of the file's language
//! 6. a fully qualified `pack.Type` path
//!
//! Each following segment is a member lookup on the type produced by the
//! previous one. When a segment fails the walk stops and the result keeps the
//! last type it reached, so callers can still act on the unresolved tail.

use std::sync::Arc;

use smol_str::SmolStr;

use super::context::FileContext;
use super::index::SymbolTable;
use super::symbols::{LocalVar, Member, MemberKind, Symbol, TypeRef};
use crate::base::FileId;
use crate::syntax::CharacterClass;

// ============================================================================
// QUERY
// ============================================================================

/// Input to [`resolve_expression`]: the context token and the text in front
/// of it on the caret line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExprQuery<'q> {
    pub token: &'q str,
    pub line_prefix: &'q str,
}

impl<'q> ExprQuery<'q> {
    pub fn new(token: &'q str, line_prefix: &'q str) -> Self {
        Self { token, line_prefix }
    }

    /// Extract the token ending at byte column `col` of `line`.
    pub fn at_column(line: &'q str, col: usize, class: &CharacterClass) -> Self {
        let (start, token) = context_token(line, col, class);
        Self {
            token,
            line_prefix: &line[..start],
        }
    }
}

/// Scan backwards from `col` for an expression token: word characters, dots,
/// and balanced `(...)` / `[...]` groups. Returns the token's start column and
/// text.
pub fn context_token<'l>(line: &'l str, col: usize, class: &CharacterClass) -> (usize, &'l str) {
    let mut end = col.min(line.len());
    while !line.is_char_boundary(end) {
        end -= 1;
    }

    let mut start = end;
    let mut depth = 0usize;
    // token start before entering the current group
    let mut outside = end;
    for (idx, c) in line[..end].char_indices().rev() {
        if depth > 0 {
            match c {
                ')' | ']' => depth += 1,
                '(' | '[' => depth -= 1,
                _ => {}
            }
            start = idx;
            continue;
        }
        match c {
            ')' | ']' => {
                outside = start;
                depth = 1;
                start = idx;
            }
            '.' => start = idx,
            c if class.contains(c) => start = idx,
            _ => break,
        }
    }
    if depth > 0 {
        // the group never opened on this line
        start = outside;
    }
    (start, &line[start..end])
}

/// One dotted segment: `name`, `name(a, b)` or `name[i]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub name: SmolStr,
    /// Argument count when the segment is a call.
    pub call: Option<usize>,
    pub indexed: bool,
}

/// Split a token into segments at top-level dots.
pub fn split_segments(token: &str) -> Vec<Segment> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (idx, c) in token.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            '.' if depth == 0 => {
                parts.push(&token[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&token[start..]);

    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(parse_segment)
        .collect()
}

fn parse_segment(text: &str) -> Segment {
    let name_end = text.find(['(', '[']).unwrap_or(text.len());
    let name = SmolStr::new(text[..name_end].trim());
    let rest = &text[name_end..];

    let call = rest.strip_prefix('(').map(|args| {
        let mut depth = 0i32;
        let mut count = 0usize;
        let mut any = false;
        for c in args.chars() {
            match c {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' if depth == 0 => break,
                ')' | ']' | '}' => depth -= 1,
                ',' if depth == 0 => count += 1,
                c if !c.is_whitespace() => any = true,
                _ => {}
            }
        }
        if any { count + 1 } else { 0 }
    });

    Segment {
        name,
        call,
        indexed: rest.contains('['),
    }
}

// ============================================================================
// RESULT
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessShape {
    /// A bare identifier.
    None,
    /// `a.b` on an instance.
    Field,
    /// The last segment is called: `a.b()`.
    MethodCall,
    /// `Type.member`.
    Static,
}

/// Syntactic position of the caret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprContext {
    /// Nothing to the left of the caret.
    Empty,
    /// Right after a keyword that introduces a new name.
    Declaration(SmolStr),
    Expression,
}

/// Member reference carried by a result: owner type plus member name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberRef {
    pub owner: Arc<str>,
    pub name: SmolStr,
}

/// The type an expression evaluates to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeTarget {
    /// A type in the symbol table, by qualified name.
    Symbol(Arc<str>),
    /// A builtin or otherwise unresolved type name.
    Builtin(SmolStr),
}

impl TypeTarget {
    pub fn symbol<'t>(&self, table: &'t SymbolTable) -> Option<&'t Symbol> {
        match self {
            TypeTarget::Symbol(name) => table.lookup_qualified(name),
            TypeTarget::Builtin(_) => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolutionResult {
    pub context: ExprContext,
    pub token: SmolStr,
    pub segments: Vec<Segment>,
    /// Word directly before the token, e.g. `new`, `switch`, `var`.
    pub preceding: Option<SmolStr>,
    pub member: Option<MemberRef>,
    pub local: Option<LocalVar>,
    pub ty: Option<TypeTarget>,
    pub shape: AccessShape,
    /// First segment that could not be resolved.
    pub unresolved: Option<SmolStr>,
}

impl ResolutionResult {
    fn new(context: ExprContext, token: &str, preceding: Option<&str>) -> Self {
        Self {
            context,
            token: SmolStr::new(token),
            segments: Vec::new(),
            preceding: preceding.map(SmolStr::new),
            member: None,
            local: None,
            ty: None,
            shape: AccessShape::None,
            unresolved: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.unresolved.is_none() && (self.member.is_some() || self.local.is_some() || self.ty.is_some())
    }

    /// The resolved member together with its owner.
    pub fn member_in<'t>(&self, table: &'t SymbolTable) -> Option<(&'t Symbol, &'t Member)> {
        let member = self.member.as_ref()?;
        let owner = table.lookup_qualified(&member.owner)?;
        Some((owner, owner.member(&member.name)?))
    }

    pub fn type_symbol<'t>(&self, table: &'t SymbolTable) -> Option<&'t Symbol> {
        self.ty.as_ref()?.symbol(table)
    }

    /// Whether the token names something on the current instance: `x` or
    /// `this.x`.
    pub fn is_instance_name(&self) -> bool {
        match self.segments.as_slice() {
            [_] => true,
            [this, _] => this.name == "this",
            _ => false,
        }
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Keywords after which the token names a new declaration.
const NAMING_KEYWORDS: &[&str] = &[
    "var", "final", "const", "function", "class", "interface", "enum", "typedef", "abstract",
    "package", "import", "using",
];

/// Keywords after which the token is a type name.
const TYPE_KEYWORDS: &[&str] = &["new", "extends", "implements", "cast", "is", "as"];

fn preceding_word(prefix: &str) -> Option<&str> {
    let trimmed = prefix.trim_end().trim_end_matches('(').trim_end();
    let start = trimmed
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphanumeric() || *c == '_')
        .last()
        .map(|(idx, _)| idx)?;
    Some(&trimmed[start..])
}

#[derive(Clone, Copy)]
enum Target<'a> {
    Symbol(&'a Symbol),
    Builtin(&'a str),
}

impl Target<'_> {
    fn to_type_target(self) -> TypeTarget {
        match self {
            Target::Symbol(symbol) => TypeTarget::Symbol(symbol.qualified_name.clone()),
            Target::Builtin(name) => TypeTarget::Builtin(SmolStr::new(name)),
        }
    }
}

struct Walk<'a> {
    ty: Option<Target<'a>>,
    is_static: bool,
    member: Option<(&'a Symbol, &'a Member)>,
    local: Option<&'a LocalVar>,
}

/// Resolve an expression token at the context's caret.
pub fn resolve_expression(ctx: &FileContext<'_>, query: &ExprQuery<'_>) -> ResolutionResult {
    let token = query.token.trim();
    let preceding = preceding_word(query.line_prefix);
    let language = ctx.language();

    if token.is_empty() {
        let context = match preceding {
            Some(word) if language.is_declaration_keyword(word) => {
                ExprContext::Declaration(SmolStr::new(word))
            }
            _ => ExprContext::Empty,
        };
        return ResolutionResult::new(context, token, preceding);
    }

    if let Some(word) = preceding.filter(|w| NAMING_KEYWORDS.contains(w)) {
        let mut result = ResolutionResult::new(ExprContext::Declaration(SmolStr::new(word)), token, preceding);
        result.segments = split_segments(token);
        return result;
    }

    let mut result = ResolutionResult::new(ExprContext::Expression, token, preceding);
    result.segments = split_segments(token);
    let Some(first) = result.segments.first().cloned() else {
        return result;
    };

    let type_position = query.line_prefix.trim_end().ends_with(':')
        || preceding.is_some_and(|w| TYPE_KEYWORDS.contains(&w));
    let constructed = preceding == Some("new");

    let Some((mut walk, consumed)) = resolve_leading(ctx, &result.segments, type_position) else {
        tracing::trace!(token, "leading segment unresolved");
        result.unresolved = Some(first.name);
        return result;
    };
    if constructed && first.call.is_some() {
        walk.is_static = false;
    }

    let mut last_access_static = walk.is_static;
    for segment in &result.segments[consumed..] {
        let owner = match walk.ty {
            Some(Target::Symbol(symbol)) => symbol,
            _ => {
                result.unresolved = Some(segment.name.clone());
                break;
            }
        };
        last_access_static = walk.is_static;
        match ctx.symbols().lookup_member(owner, &segment.name) {
            Some((declaring, member)) => {
                walk.ty = Some(member_type(ctx, declaring, member));
                walk.member = Some((declaring, member));
                walk.local = None;
                walk.is_static = false;
            }
            None => {
                result.unresolved = Some(segment.name.clone());
                break;
            }
        }
    }

    result.ty = walk.ty.map(Target::to_type_target);
    if result.unresolved.is_none() {
        result.member = walk.member.map(|(owner, member)| MemberRef {
            owner: owner.qualified_name.clone(),
            name: member.name.clone(),
        });
        result.local = walk.local.cloned();
    }

    result.shape = match result.segments.as_slice() {
        [.., last] if last.call.is_some() => AccessShape::MethodCall,
        [_] => AccessShape::None,
        _ if last_access_static => AccessShape::Static,
        _ => AccessShape::Field,
    };

    tracing::trace!(
        token,
        ty = ?result.ty,
        member = ?result.member,
        unresolved = ?result.unresolved,
        "resolved expression"
    );
    result
}

/// Resolve the leftmost segment. Returns the walk state and the number of
/// segments consumed (more than one for a qualified type path).
fn resolve_leading<'a>(
    ctx: &FileContext<'a>,
    segments: &[Segment],
    type_position: bool,
) -> Option<(Walk<'a>, usize)> {
    let table = ctx.table();
    let class = ctx.current_class();
    let first = segments.first()?;
    let name = first.name.as_str();
    let instance = |ty: Option<Target<'a>>| Walk {
        ty,
        is_static: false,
        member: None,
        local: None,
    };

    match name {
        "this" if !class.is_void() => return Some((instance(Some(Target::Symbol(class))), 1)),
        "super" if !class.is_void() => {
            let parent = table.superclass(class)?;
            return Some((instance(Some(Target::Symbol(parent))), 1));
        }
        _ => {}
    }

    if !type_position {
        if let Some(local) = ctx
            .current_member()
            .and_then(|m| m.visible_locals(ctx.caret().line).find(|l| l.name == name))
        {
            let ty = local.type_ref.as_ref().map(|t| type_ref_target(ctx, t, ctx.file()));
            let mut walk = instance(ty);
            walk.local = Some(local);
            return Some((walk, 1));
        }

        if !class.is_void() {
            if let Some((owner, member)) = ctx.symbols().lookup_member(class, name) {
                let mut walk = instance(Some(member_type(ctx, owner, member)));
                walk.member = Some((owner, member));
                return Some((walk, 1));
            }
        }
    }

    let static_ref = |ty: Target<'a>| Walk {
        ty: Some(ty),
        is_static: true,
        member: None,
        local: None,
    };

    if let Some(symbol) = ctx.symbols().lookup_symbol(name, ctx.file()) {
        return Some((static_ref(Target::Symbol(symbol)), 1));
    }

    if let Some(builtin) = ctx
        .language()
        .builtin_types()
        .iter()
        .copied()
        .find(|b| *b == name)
    {
        return Some((static_ref(Target::Builtin(builtin)), 1));
    }

    // pack.sub.Type
    for end in (2..=segments.len()).rev() {
        if segments[..end - 1].iter().any(|s| s.call.is_some() || s.indexed) {
            continue;
        }
        let path = segments[..end]
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(".");
        if let Some(symbol) = table.lookup_import_path(&path) {
            return Some((static_ref(Target::Symbol(symbol)), end));
        }
    }

    None
}

fn member_type<'a>(ctx: &FileContext<'a>, owner: &'a Symbol, member: &'a Member) -> Target<'a> {
    if member.kind == MemberKind::EnumCase {
        return Target::Symbol(owner);
    }
    match &member.type_ref {
        Some(type_ref) => type_ref_target(ctx, type_ref, owner.file),
        None => Target::Builtin(ctx.language().dynamic_type()),
    }
}

fn type_ref_target<'a>(
    ctx: &FileContext<'a>,
    type_ref: &'a TypeRef,
    from: FileId,
) -> Target<'a> {
    match ctx.table().resolve_type_ref(type_ref, from) {
        Some(symbol) => Target::Symbol(symbol),
        None => Target::Builtin(type_ref.as_str()),
    }
}
