//! Recursive-descent parser for declaration sources.
//!
//! The parser recovers the declaration skeleton of a file: namespaces, type
//! declarations, attributes and member signatures. Bodies, initializers and
//! constraint clauses are skipped by delimiter matching.

use std::{ops::Range, path::Path};

use crate::{
    Error, Result, SourceContext,
    lexer::{Spanned, Token, lex},
    syntax::{Attribute, DeclKind, Member, MemberKind, Param, SourceFile, TypeDeclSyntax, TypeSyntax},
};

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "internal",
    "static",
    "sealed",
    "abstract",
    "partial",
    "readonly",
    "virtual",
    "override",
    "async",
    "extern",
    "unsafe",
    "volatile",
    "new",
    "const",
    "required",
    "file",
    "ref",
    "fixed",
];

const PARAM_MODIFIERS: &[&str] = &["this", "ref", "out", "in", "params", "scoped", "readonly"];

/// Parse a declaration source file.
pub fn parse_source(src: &str, path: &Path) -> Result<SourceFile> {
    let ctx = SourceContext::new(src, path.display().to_string());
    let tokens = lex(&ctx)?;
    let mut parser = Parser {
        ctx: &ctx,
        tokens,
        pos: 0,
        usings: Vec::new(),
        global_usings: Vec::new(),
        types: Vec::new(),
    };
    parser.parse_namespace_members(String::new(), false)?;

    Ok(SourceFile {
        path: path.to_path_buf(),
        usings: parser.usings,
        global_usings: parser.global_usings,
        types: parser.types,
    })
}

/// Read and parse a declaration source file from disk.
pub fn parse_file(path: &Path) -> Result<SourceFile> {
    let src = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_source(&src, path)
}

struct Parser<'a> {
    ctx: &'a SourceContext,
    tokens: Vec<Spanned>,
    pos: usize,
    usings: Vec<String>,
    global_usings: Vec<String>,
    types: Vec<TypeDeclSyntax>,
}

impl<'a> Parser<'a> {
    // ------------------------------------------------------------------
    // Token cursor
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<Token> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).map(|t| t.token)
    }

    fn text(&self, n: usize) -> &'a str {
        let src: &'a str = self.ctx.src();
        self.tokens
            .get(self.pos + n)
            .map_or("", |t| &src[t.span.clone()])
    }

    fn at(&self, token: Token) -> bool {
        self.peek() == Some(token)
    }

    fn at_ident(&self, word: &str) -> bool {
        self.at(Token::Ident) && self.text(0) == word
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.at(token) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.at_ident(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn error(&self, expected: &str) -> Box<Error> {
        match self.tokens.get(self.pos) {
            Some(tok) => self.ctx.unexpected_token(
                format!("{} '{}'", tok.token.describe(), self.text(0)),
                expected,
                tok.span.clone(),
            ),
            None => self.ctx.unexpected_eof(expected),
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<&'a str> {
        if !self.at(Token::Ident) {
            return Err(self.error(expected));
        }
        let text = self.text(0).trim_start_matches('@');
        self.bump();
        Ok(text)
    }

    // ------------------------------------------------------------------
    // Skipping
    // ------------------------------------------------------------------

    /// Skip a delimited group starting at the current opener. Returns the
    /// byte range between the delimiters.
    fn skip_balanced(&mut self) -> Result<Range<usize>> {
        let start = match self.tokens.get(self.pos) {
            Some(tok) => tok.span.end,
            None => return Err(self.ctx.unexpected_eof("a delimited group")),
        };
        let mut depth = 0usize;
        while let Some(tok) = self.tokens.get(self.pos) {
            let (token, end) = (tok.token, tok.span.start);
            self.bump();
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(start..end);
                    }
                }
                _ => {}
            }
        }
        Err(self.ctx.unexpected_eof("a closing delimiter"))
    }

    /// Skip forward to one of `stops` at nesting depth zero, or to an
    /// unmatched closer. The stop token is not consumed.
    ///
    /// With `generics`, commas inside `<...>` do not stop the scan.
    fn skip_until(&mut self, stops: &[Token], generics: bool) {
        let mut depth = 0usize;
        let mut angle = 0usize;
        while let Some(token) = self.peek() {
            if depth == 0 && stops.contains(&token) && (token != Token::Comma || angle == 0) {
                return;
            }
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                Token::Lt if generics => angle += 1,
                Token::Gt if generics => angle = angle.saturating_sub(1),
                _ => {}
            }
            self.bump();
        }
    }

    fn skip_past(&mut self, token: Token) {
        self.skip_until(&[token], false);
        self.eat(token);
    }

    /// Skip the remainder of a member whose shape is not retained: bodies,
    /// expression bodies, accessor blocks and terminating semicolons.
    fn skip_member_body(&mut self) {
        let mut depth = 0usize;
        let mut in_expression = false;
        while let Some(token) = self.peek() {
            match token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket => depth = depth.saturating_sub(1),
                Token::RBrace => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                    if depth == 0 && !in_expression {
                        self.bump();
                        if self.at(Token::Eq) {
                            in_expression = true;
                            continue;
                        }
                        return;
                    }
                }
                Token::Semi if depth == 0 => {
                    self.bump();
                    return;
                }
                Token::Eq | Token::Arrow if depth == 0 => in_expression = true,
                _ => {}
            }
            self.bump();
        }
    }

    /// Skip `where T : ...` clauses.
    fn skip_constraints(&mut self) {
        if !self.at_ident("where") {
            return;
        }
        while let Some(token) = self.peek() {
            if matches!(token, Token::LBrace | Token::Semi | Token::Arrow) {
                break;
            }
            self.bump();
        }
    }

    // ------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------

    fn parse_namespace_members(&mut self, mut namespace: String, braced: bool) -> Result<()> {
        loop {
            match self.peek() {
                None if braced => return Err(self.ctx.unexpected_eof("'}'")),
                None => return Ok(()),
                Some(Token::RBrace) if braced => {
                    self.bump();
                    return Ok(());
                }
                Some(Token::Semi) => self.bump(),
                _ if self.at_ident("global") && self.text(1) == "using" => {
                    self.bump();
                    self.parse_using(true)?;
                }
                _ if self.at_ident("extern") && self.text(1) == "alias" => {
                    self.skip_past(Token::Semi);
                }
                _ if self.at_ident("using") => self.parse_using(false)?,
                _ if self.at_ident("namespace") => {
                    self.bump();
                    let name = self.parse_qualified_name()?;
                    let full = qualify(&namespace, &name);
                    if self.eat(Token::Semi) {
                        namespace = full;
                    } else {
                        self.expect(Token::LBrace, "'{' or ';'")?;
                        self.parse_namespace_members(full, true)?;
                    }
                }
                _ => {
                    let parsed = self.parse_attribute_lists()?;
                    let had_attributes = !parsed.is_empty();
                    let attributes: Vec<Attribute> = parsed
                        .into_iter()
                        .filter(|a| !matches!(a.target.as_deref(), Some("assembly" | "module")))
                        .collect();
                    if had_attributes && attributes.is_empty() {
                        continue;
                    }
                    self.parse_type_decl(&namespace, attributes)?;
                }
            }
        }
    }

    fn parse_using(&mut self, global: bool) -> Result<()> {
        self.bump();
        let is_static = self.eat_ident("static");
        let is_alias = self.at(Token::Ident) && self.peek_nth(1) == Some(Token::Eq);
        if is_static || is_alias {
            self.skip_past(Token::Semi);
            return Ok(());
        }

        let name = self.parse_qualified_name()?;
        self.expect(Token::Semi, "';'")?;
        let usings = if global {
            &mut self.global_usings
        } else {
            &mut self.usings
        };
        if !usings.contains(&name) {
            usings.push(name);
        }
        Ok(())
    }

    fn parse_qualified_name(&mut self) -> Result<String> {
        if self.at(Token::Ident) && self.peek_nth(1) == Some(Token::DoubleColon) {
            self.pos += 2;
        }
        let mut name = self.expect_ident("a name")?.to_string();
        while self.at(Token::Dot) && self.peek_nth(1) == Some(Token::Ident) {
            self.bump();
            name.push('.');
            name.push_str(self.expect_ident("a name")?);
        }
        Ok(name)
    }

    // ------------------------------------------------------------------
    // Attributes and modifiers
    // ------------------------------------------------------------------

    fn parse_attribute_lists(&mut self) -> Result<Vec<Attribute>> {
        let mut attributes = Vec::new();
        while self.eat(Token::LBracket) {
            let target = if self.at(Token::Ident) && self.peek_nth(1) == Some(Token::Colon) {
                let target = self.text(0).to_string();
                self.pos += 2;
                Some(target)
            } else {
                None
            };

            loop {
                let name = self.parse_qualified_name()?;
                if self.at(Token::Lt) {
                    self.parse_type_args()?;
                }
                let args = if self.at(Token::LParen) {
                    let range = self.skip_balanced()?;
                    Some(self.ctx.src()[range].trim().to_string())
                } else {
                    None
                };
                attributes.push(Attribute {
                    name,
                    args,
                    target: target.clone(),
                });

                if !self.eat(Token::Comma) || self.at(Token::RBracket) {
                    break;
                }
            }
            self.expect(Token::RBracket, "']'")?;
        }
        Ok(attributes)
    }

    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        while self.at(Token::Ident) && MODIFIERS.contains(&self.text(0)) {
            modifiers.push(self.text(0).to_string());
            self.bump();
        }
        modifiers
    }

    fn at_type_keyword(&self) -> bool {
        if !self.at(Token::Ident) {
            return false;
        }
        match self.text(0) {
            "class" | "struct" | "interface" | "enum" => true,
            "record" => self.peek_nth(1) == Some(Token::Ident),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Type declarations
    // ------------------------------------------------------------------

    fn parse_type_decl(&mut self, namespace: &str, attributes: Vec<Attribute>) -> Result<()> {
        let mut modifiers = self.parse_modifiers();

        let kind = if self.eat_ident("class") {
            DeclKind::Class
        } else if self.eat_ident("struct") {
            DeclKind::Struct
        } else if self.eat_ident("interface") {
            DeclKind::Interface
        } else if self.eat_ident("enum") {
            DeclKind::Enum
        } else if self.eat_ident("record") {
            if self.eat_ident("struct") {
                modifiers.push("struct".to_string());
            } else {
                let _ = self.eat_ident("class");
            }
            DeclKind::Record
        } else if self.eat_ident("delegate") {
            self.skip_past(Token::Semi);
            return Ok(());
        } else {
            return Err(self.error("a type declaration"));
        };

        let name = self.expect_ident("a type name")?.to_string();
        let generic_params = if self.at(Token::Lt) {
            self.parse_generic_params()?
        } else {
            Vec::new()
        };

        let mut members = Vec::new();
        if self.at(Token::LParen) {
            if kind == DeclKind::Record {
                members = self.parse_positional_properties()?;
            } else {
                self.skip_balanced()?;
            }
        }

        let mut base_list = Vec::new();
        if self.eat(Token::Colon) {
            loop {
                base_list.push(self.parse_type()?);
                if self.at(Token::LParen) {
                    self.skip_balanced()?;
                }
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.skip_constraints();

        let index = self.types.len();
        self.types.push(TypeDeclSyntax {
            name: name.clone(),
            namespace: namespace.to_string(),
            kind,
            generic_params,
            attributes,
            modifiers,
            base_list,
            members: Vec::new(),
        });

        if self.eat(Token::LBrace) {
            if kind == DeclKind::Enum {
                self.parse_enum_body(&mut members)?;
            } else {
                self.parse_members(namespace, &name, &mut members)?;
            }
        } else {
            self.expect(Token::Semi, "'{' or ';'")?;
        }
        self.eat(Token::Semi);

        self.types[index].members = members;
        Ok(())
    }

    fn parse_generic_params(&mut self) -> Result<Vec<String>> {
        self.expect(Token::Lt, "'<'")?;
        let mut params = Vec::new();
        loop {
            self.parse_attribute_lists()?;
            if (self.at_ident("in") || self.at_ident("out"))
                && self.peek_nth(1) == Some(Token::Ident)
            {
                self.bump();
            }
            params.push(self.expect_ident("a type parameter")?.to_string());
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Gt, "'>'")?;
        Ok(params)
    }

    /// Positional record parameters become public properties.
    fn parse_positional_properties(&mut self) -> Result<Vec<Member>> {
        let params = self.parse_params()?;
        Ok(params
            .into_iter()
            .map(|param| Member {
                name: param.name,
                kind: MemberKind::Property {
                    ty: param.ty,
                    has_setter: true,
                },
                attributes: Vec::new(),
                modifiers: vec!["public".to_string()],
            })
            .collect())
    }

    fn parse_enum_body(&mut self, members: &mut Vec<Member>) -> Result<()> {
        loop {
            if self.peek().is_none() {
                return Err(self.ctx.unexpected_eof("'}'"));
            }
            if self.eat(Token::RBrace) {
                return Ok(());
            }

            let attributes = self.parse_attribute_lists()?;
            let name = self.expect_ident("an enum member")?.to_string();
            if self.eat(Token::Eq) {
                self.skip_until(&[Token::Comma], false);
            }
            members.push(Member {
                name,
                kind: MemberKind::EnumMember,
                attributes,
                modifiers: Vec::new(),
            });

            if !self.eat(Token::Comma) {
                self.expect(Token::RBrace, "',' or '}'")?;
                return Ok(());
            }
        }
    }

    // ------------------------------------------------------------------
    // Members
    // ------------------------------------------------------------------

    fn parse_members(
        &mut self,
        namespace: &str,
        owner: &str,
        members: &mut Vec<Member>,
    ) -> Result<()> {
        loop {
            match self.peek() {
                None => return Err(self.ctx.unexpected_eof("'}'")),
                Some(Token::RBrace) => {
                    self.bump();
                    return Ok(());
                }
                Some(Token::Semi) => {
                    self.bump();
                    continue;
                }
                _ => {}
            }

            let attributes = self.parse_attribute_lists()?;
            let start = self.pos;
            let modifiers = self.parse_modifiers();

            if self.at_type_keyword() || self.at_ident("delegate") {
                self.pos = start;
                self.parse_type_decl(namespace, attributes)?;
                continue;
            }

            // Events, conversion operators, finalizers and constructors.
            if self.at_ident("event")
                || self.at_ident("implicit")
                || self.at_ident("explicit")
                || (self.at(Token::Op) && self.text(0) == "~")
                || (self.at_ident(owner) && self.peek_nth(1) == Some(Token::LParen))
            {
                self.skip_member_body();
                continue;
            }

            let ty = self.parse_type()?;

            // Indexers and operators.
            if self.at_ident("this") || self.at_ident("operator") {
                self.skip_member_body();
                continue;
            }

            let qualified = self.parse_qualified_name()?;
            let name = last_segment(&qualified).to_string();

            match self.peek() {
                Some(Token::Lt) | Some(Token::LParen) => {
                    let generic_params = if self.at(Token::Lt) {
                        self.parse_generic_params()?
                    } else {
                        Vec::new()
                    };
                    let params = self.parse_params()?;
                    self.skip_constraints();
                    self.skip_member_body();
                    members.push(Member {
                        name,
                        kind: MemberKind::Method {
                            return_type: ty,
                            params,
                            generic_params,
                        },
                        attributes,
                        modifiers,
                    });
                }
                Some(Token::LBrace) => {
                    let has_setter = self.parse_accessors()?;
                    if self.eat(Token::Eq) {
                        self.skip_past(Token::Semi);
                    }
                    members.push(Member {
                        name,
                        kind: MemberKind::Property { ty, has_setter },
                        attributes,
                        modifiers,
                    });
                }
                Some(Token::Arrow) => {
                    self.skip_member_body();
                    members.push(Member {
                        name,
                        kind: MemberKind::Property {
                            ty,
                            has_setter: false,
                        },
                        attributes,
                        modifiers,
                    });
                }
                Some(Token::Eq) | Some(Token::Comma) | Some(Token::Semi) => {
                    let readonly = modifiers.iter().any(|m| m == "readonly" || m == "const");
                    let mut names = vec![name];
                    loop {
                        if self.eat(Token::Eq) {
                            self.skip_until(&[Token::Comma, Token::Semi], true);
                        }
                        if self.eat(Token::Comma) {
                            names.push(self.expect_ident("a field name")?.to_string());
                            continue;
                        }
                        self.expect(Token::Semi, "';'")?;
                        break;
                    }
                    for name in names {
                        members.push(Member {
                            name,
                            kind: MemberKind::Field {
                                ty: ty.clone(),
                                readonly,
                            },
                            attributes: attributes.clone(),
                            modifiers: modifiers.clone(),
                        });
                    }
                }
                _ => return Err(self.error("a member declaration")),
            }
        }
    }

    /// Skip an accessor block and report whether it declares `set` or `init`.
    fn parse_accessors(&mut self) -> Result<bool> {
        let start = self.pos;
        self.skip_balanced()?;

        let src = self.ctx.src();
        let mut depth = 0usize;
        let mut has_setter = false;
        for tok in &self.tokens[start..self.pos] {
            match tok.token {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth = depth.saturating_sub(1)
                }
                Token::Ident if depth == 1 => {
                    if matches!(&src[tok.span.clone()], "set" | "init") {
                        has_setter = true;
                    }
                }
                _ => {}
            }
        }
        Ok(has_setter)
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();
        if self.eat(Token::RParen) {
            return Ok(params);
        }

        loop {
            self.parse_attribute_lists()?;
            let mut modifiers = Vec::new();
            while self.at(Token::Ident)
                && PARAM_MODIFIERS.contains(&self.text(0))
                && !matches!(
                    self.peek_nth(1),
                    Some(Token::Comma | Token::RParen | Token::Eq)
                )
            {
                modifiers.push(self.text(0).to_string());
                self.bump();
            }

            let ty = self.parse_type()?;
            let name = self.expect_ident("a parameter name")?.to_string();
            if self.eat(Token::Eq) {
                self.skip_until(&[Token::Comma, Token::RParen], false);
            }
            params.push(Param { name, ty, modifiers });

            if self.eat(Token::Comma) {
                continue;
            }
            self.expect(Token::RParen, "',' or ')'")?;
            return Ok(params);
        }
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_type(&mut self) -> Result<TypeSyntax> {
        let mut ty = if self.eat(Token::LParen) {
            let mut items = Vec::new();
            loop {
                items.push(self.parse_type()?);
                if self.at(Token::Ident) {
                    self.bump();
                }
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen, "')'")?;
            TypeSyntax::Tuple(items)
        } else {
            let name = self.parse_qualified_name()?;
            let args = if self.at(Token::Lt) {
                self.parse_type_args()?
            } else {
                Vec::new()
            };
            TypeSyntax::Named { name, args }
        };

        loop {
            if self.eat(Token::Question) {
                ty = TypeSyntax::Nullable(Box::new(ty));
            } else if self.at(Token::LBracket)
                && matches!(self.peek_nth(1), Some(Token::RBracket | Token::Comma))
            {
                self.bump();
                while self.eat(Token::Comma) {}
                self.expect(Token::RBracket, "']'")?;
                ty = TypeSyntax::Array(Box::new(ty));
            } else if self.at(Token::Op) && self.text(0) == "*" {
                self.bump();
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_type_args(&mut self) -> Result<Vec<TypeSyntax>> {
        self.expect(Token::Lt, "'<'")?;
        let mut args = Vec::new();
        loop {
            args.push(self.parse_type()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Gt, "'>'")?;
        Ok(args)
    }
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", namespace, name)
    }
}

fn last_segment(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, last)| last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SourceFile {
        parse_source(src, Path::new("Test.cs")).unwrap()
    }

    fn member<'f>(decl: &'f TypeDeclSyntax, name: &str) -> &'f Member {
        decl.members.iter().find(|m| m.name == name).unwrap()
    }

    const VIEW_MODEL: &str = r#"
using System;
using System.Threading.Tasks;
using CommunityToolkit.Mvvm.ComponentModel;
using CommunityToolkit.Mvvm.Input;

namespace Demo.ViewModels;

public partial class MainViewModel : ObservableObject, IDisposable
{
    [ObservableProperty]
    private string _name = "untitled";

    [ObservableProperty]
    private int _count;

    private readonly Dictionary<string, int> _cache = new Dictionary<string, int>(), _other = new();

    public MainViewModel(IService service) : base()
    {
        Service = service;
    }

    public IService Service { get; }

    public bool IsBusy => _count > 0;

    [RelayCommand]
    private void Reset() { Count = 0; if (Name is { Length: > 0 }) { Name = "}"; } }

    [RelayCommand]
    private async Task SaveAsync(string path, CancellationToken token = default)
    {
        await Task.Delay(10);
    }

    public event EventHandler Changed;

    public void Dispose() { }
}
"#;

    #[test]
    fn test_parse_view_model_skeleton() {
        let file = parse(VIEW_MODEL);
        assert_eq!(
            file.usings,
            vec![
                "System",
                "System.Threading.Tasks",
                "CommunityToolkit.Mvvm.ComponentModel",
                "CommunityToolkit.Mvvm.Input"
            ]
        );
        assert_eq!(file.types.len(), 1);

        let vm = &file.types[0];
        assert_eq!(vm.full_name(), "Demo.ViewModels.MainViewModel");
        assert_eq!(vm.kind, DeclKind::Class);
        assert_eq!(
            vm.base_list,
            vec![
                TypeSyntax::simple("ObservableObject"),
                TypeSyntax::simple("IDisposable")
            ]
        );

        let names: Vec<&str> = vm.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "_name", "_count", "_cache", "_other", "Service", "IsBusy", "Reset", "SaveAsync",
                "Dispose"
            ]
        );
    }

    #[test]
    fn test_parse_field_attributes_and_types() {
        let file = parse(VIEW_MODEL);
        let vm = &file.types[0];

        let name = member(vm, "_name");
        assert_eq!(name.attributes[0].name, "ObservableProperty");
        assert!(matches!(&name.kind, MemberKind::Field { ty, .. } if *ty == TypeSyntax::simple("string")));

        let cache = member(vm, "_cache");
        assert!(matches!(&cache.kind, MemberKind::Field { readonly: true, .. }));
    }

    #[test]
    fn test_parse_method_signature() {
        let file = parse(VIEW_MODEL);
        let save = member(&file.types[0], "SaveAsync");

        assert!(save.has_modifier("async"));
        match &save.kind {
            MemberKind::Method {
                return_type,
                params,
                ..
            } => {
                assert_eq!(*return_type, TypeSyntax::simple("Task"));
                assert_eq!(params.len(), 2);
                assert_eq!(params[0].name, "path");
                assert_eq!(params[1].ty, TypeSyntax::simple("CancellationToken"));
            }
            other => panic!("expected method, got {:?}", other),
        }
        assert_eq!(save.identity_key(), "SaveAsync(string,CancellationToken)");
    }

    #[test]
    fn test_parse_properties_detect_setters() {
        let file = parse(
            r#"
namespace Demo.Models
{
    public class Item
    {
        public string Title { get; set; } = string.Empty;
        public int Id { get; init; }
        public DateTime Created { get; }
        public string Label => $"{Title} ({Id})";
    }
}
"#,
        );
        let item = &file.types[0];
        assert_eq!(item.namespace, "Demo.Models");

        let setters: Vec<(&str, bool)> = item
            .members
            .iter()
            .map(|m| match &m.kind {
                MemberKind::Property { has_setter, .. } => (m.name.as_str(), *has_setter),
                _ => (m.name.as_str(), false),
            })
            .collect();
        assert_eq!(
            setters,
            vec![
                ("Title", true),
                ("Id", true),
                ("Created", false),
                ("Label", false)
            ]
        );
    }

    #[test]
    fn test_parse_complex_types() {
        let file = parse(
            r#"
namespace Demo;
class Holder
{
    public global::System.Collections.Generic.List<int?>[] Lists;
    public Dictionary<string, List<Item>> Index;
    public (int Id, string Name) Pair;
    public byte[,] Grid;
}
"#,
        );
        let holder = &file.types[0];
        let ty = |name: &str| match &member(holder, name).kind {
            MemberKind::Field { ty, .. } => ty.to_string(),
            _ => String::new(),
        };
        assert_eq!(ty("Lists"), "System.Collections.Generic.List<int?>[]");
        assert_eq!(ty("Index"), "Dictionary<string, List<Item>>");
        assert_eq!(ty("Pair"), "(int, string)");
        assert_eq!(ty("Grid"), "byte[]");
    }

    #[test]
    fn test_parse_records_enums_and_nested_types() {
        let file = parse(
            r#"
namespace Demo.Models;

public record Point(double X, double Y);

public record struct Range(int Start, int End) : IComparable<Range>
{
    public int CompareTo(Range other) => Start.CompareTo(other.Start);
}

[Flags]
public enum Status : byte
{
    None = 0,
    Active = 1 << 0,
    Archived = 1 << 1,
}

public class Outer<T> where T : class, new()
{
    public class Inner { public T Value; }
    public Inner Child { get; set; }
}

public delegate void Callback(int code);
"#,
        );
        let names: Vec<(&str, DeclKind)> = file
            .types
            .iter()
            .map(|t| (t.name.as_str(), t.kind))
            .collect();
        assert_eq!(
            names,
            vec![
                ("Point", DeclKind::Record),
                ("Range", DeclKind::Record),
                ("Status", DeclKind::Enum),
                ("Outer", DeclKind::Class),
                ("Inner", DeclKind::Class)
            ]
        );

        assert!(!file.types[0].modifiers.contains(&"struct".to_string()));
        assert!(file.types[1].modifiers.contains(&"struct".to_string()));

        let point = &file.types[0];
        assert_eq!(point.members.len(), 2);
        assert!(point.members.iter().all(|m| m.has_modifier("public")));

        let status = &file.types[2];
        let members: Vec<&str> = status.members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(members, vec!["None", "Active", "Archived"]);
        assert_eq!(status.attributes[0].name, "Flags");

        let outer = &file.types[3];
        assert_eq!(outer.generic_params, vec!["T"]);
        assert_eq!(outer.members.len(), 1);
        assert_eq!(file.types[4].namespace, "Demo.Models");
    }

    #[test]
    fn test_parse_attribute_forms() {
        let file = parse(
            r#"
[assembly: InternalsVisibleTo("Tests")]
namespace Demo;
[Serializable, Mvvm.ObservableObject]
public partial class Vm
{
    [field: NonSerialized]
    [ObservableProperty, NotifyPropertyChangedFor(nameof(Total))]
    private int _count;
}
"#,
        );
        let vm = &file.types[0];
        let attrs: Vec<&str> = vm.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(attrs, vec!["Serializable", "Mvvm.ObservableObject"]);

        let count = &vm.members[0];
        assert_eq!(count.attributes.len(), 3);
        assert_eq!(count.attributes[0].target.as_deref(), Some("field"));
        assert_eq!(count.attributes[2].args.as_deref(), Some("nameof(Total)"));
    }

    #[test]
    fn test_parse_global_usings() {
        let file = parse("global using CommunityToolkit.Mvvm.ComponentModel;\nusing System;\n");
        assert_eq!(file.global_usings, vec!["CommunityToolkit.Mvvm.ComponentModel"]);
        assert_eq!(file.usings, vec!["System"]);
        assert!(file.types.is_empty());
    }

    #[test]
    fn test_parse_error_reports_location() {
        let err = parse_source("namespace Demo; class { }", Path::new("Bad.cs")).unwrap_err();
        match *err {
            Error::UnexpectedToken { expected, .. } => assert_eq!(expected, "a type name"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_parse_unterminated_body_is_eof_error() {
        let err = parse_source("class A { void F() {", Path::new("Bad.cs")).unwrap_err();
        assert!(matches!(*err, Error::UnexpectedEof { .. }));
    }
}
