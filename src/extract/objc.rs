//! Objective-C interfaces, categories and protocols.

use crate::core::{
    Decl, FunctionDecl, ObjCCategoryDecl, ObjCInterfaceDecl, ObjCProtocolDecl, Type,
};

use super::ctype::{parse_fields, split_top_level, Parser, Token, TypeContext};

const VISIBILITY: &[&str] = &["@private", "@public", "@protected", "@package"];

/// Names listed by `@class A, B;` or `@protocol A, B;`.
pub fn forward_names(tokens: &[Token]) -> Vec<String> {
    let body = tokens.get(1..).unwrap_or_default();
    let body = match body.last() {
        Some(t) if t.is_punct(';') => &body[..body.len() - 1],
        _ => body,
    };
    split_top_level(body, ',')
        .into_iter()
        .filter_map(|part| part.first().and_then(Token::ident).map(str::to_string))
        .collect()
}

/// Parse an `@interface` or `@protocol` block into its declaration.
///
/// Returns `None` if the block does not start with a name.
pub fn parse_block(tokens: &[Token], ctx: &mut dyn TypeContext) -> Option<Decl> {
    let mut p = Parser::new(tokens);
    let keyword = p.bump()?.ident()?.to_string();
    let name = p.bump()?.ident()?.to_string();

    match keyword.as_str() {
        "@protocol" => {
            // Adopted protocols are not recorded on protocols.
            if p.peek().is_some_and(|t| t.is_punct('<')) {
                p.group()?;
            }
            let mut protocol = ObjCProtocolDecl::new(name);
            for method in parse_methods(&mut p, ctx) {
                protocol.add_function(method);
            }
            Some(protocol.into())
        }
        "@interface" => {
            // Lightweight generics `NSArray<ObjectType>` are followed by a
            // superclass or category; otherwise `<...>` lists protocols.
            if p.peek().is_some_and(|t| t.is_punct('<')) {
                let mut ahead = p.clone();
                ahead.group()?;
                if ahead.peek().is_some_and(|t| t.is_punct(':') || t.is_punct('(')) {
                    p = ahead;
                }
            }
            if p.peek().is_some_and(|t| t.is_punct('(')) {
                let category = p
                    .group()?
                    .first()
                    .and_then(Token::ident)
                    .unwrap_or_default()
                    .to_string();
                if p.peek().is_some_and(|t| t.is_punct('<')) {
                    p.group()?;
                }
                let mut decl = ObjCCategoryDecl::new(name, category);
                for method in parse_methods(&mut p, ctx) {
                    decl.add_function(method);
                }
                return Some(decl.into());
            }
            parse_interface(name, &mut p, ctx)
        }
        _ => None,
    }
}

fn parse_interface(name: String, p: &mut Parser<'_>, ctx: &mut dyn TypeContext) -> Option<Decl> {
    let superclass = if p.eat_punct(':') {
        Some(p.bump()?.ident()?.to_string())
    } else {
        None
    };

    let mut interface = ObjCInterfaceDecl::new(name, superclass, false);

    if p.peek().is_some_and(|t| t.is_punct('<')) {
        for protocol in split_top_level(p.group()?, ',') {
            if let Some(name) = protocol.first().and_then(Token::ident) {
                interface.add_protocol(name);
            }
        }
    }

    if p.peek().is_some_and(|t| t.is_punct('{')) {
        let ivars: Vec<Token> = p
            .group()?
            .iter()
            .filter(|t| !t.ident().is_some_and(|w| VISIBILITY.contains(&w)))
            .cloned()
            .collect();
        for field in parse_fields(&ivars, ctx) {
            interface.add_field(field.name, field.ty).ok()?;
        }
    }

    for method in parse_methods(p, ctx) {
        interface.add_function(method).ok()?;
    }

    Some(interface.into())
}

/// Method declarations up to `@end`, skipping properties and other members.
fn parse_methods(p: &mut Parser<'_>, ctx: &mut dyn TypeContext) -> Vec<FunctionDecl> {
    let mut methods = Vec::new();

    while let Some(token) = p.peek() {
        match token {
            Token::Ident(w) if w == "@end" => break,
            Token::Ident(w) if w == "@optional" || w == "@required" => {
                p.bump();
            }
            Token::Punct(sign @ ('-' | '+')) => {
                let is_class = *sign == '+';
                p.bump();
                if let Some(method) = parse_method(p, ctx, is_class) {
                    methods.push(method);
                }
                skip_member(p);
            }
            _ => skip_member(p),
        }
    }

    methods
}

/// Skip to just past the next `;`, or up to `@end`.
fn skip_member(p: &mut Parser<'_>) {
    while let Some(token) = p.peek() {
        if token.is_ident("@end") || token.is_punct('-') || token.is_punct('+') {
            return;
        }
        if token.is_punct('(') || token.is_punct('{') {
            p.group();
            continue;
        }
        p.bump();
        if token.is_punct(';') {
            return;
        }
    }
}

/// The `(type)` at the cursor, or `id` when there is none.
fn method_type(p: &mut Parser<'_>, ctx: &mut dyn TypeContext) -> Option<Type> {
    if !p.peek().is_some_and(|t| t.is_punct('(')) {
        return Some(Type::simple("id"));
    }
    let inside = p.group()?;
    Parser::new(inside).parse_type_name(ctx)
}

/// A method after its `-` or `+`.
fn parse_method(p: &mut Parser<'_>, ctx: &mut dyn TypeContext, is_class: bool) -> Option<FunctionDecl> {
    let return_type = method_type(p, ctx)?;
    let mut selector = String::new();
    let mut params = Vec::new();
    let mut is_variadic = false;

    let first = p.peek()?.ident().unwrap_or_default().to_string();
    if first.is_empty() && !p.peek().is_some_and(|t| t.is_punct(':')) {
        return None;
    }

    loop {
        let part = match p.peek() {
            Some(Token::Ident(w)) if p.peek_at(1).is_some_and(|t| t.is_punct(':')) => {
                p.bump();
                w.clone()
            }
            Some(Token::Punct(':')) => String::new(),
            _ => break,
        };
        p.bump();
        selector.push_str(&part);
        selector.push(':');

        let ty = method_type(p, ctx)?;
        let name = p.bump()?.ident()?.to_string();
        params.push((name, ty));

        if p.peek().is_some_and(|t| t.is_punct(',')) && p.peek_at(1) == Some(&Token::Ellipsis) {
            p.bump();
            p.bump();
            is_variadic = true;
            break;
        }
    }

    if selector.is_empty() {
        p.bump();
        selector = first;
    }

    let mut method = FunctionDecl::new(selector, return_type, is_variadic);
    for (name, ty) in params {
        method.add_field(name, ty);
    }
    method.set_is_objc_method(true);
    method.set_is_class_method(is_class);
    Some(method)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DeclId, Field, HasFields, HasFunctions, TagKind};
    use crate::extract::ctype::{tokenize, unresolved_tag};

    struct NoTypes;

    impl TypeContext for NoTypes {
        fn is_typedef(&self, _: &str) -> bool {
            false
        }

        fn constant(&self, _: &str) -> Option<i64> {
            None
        }

        fn type_name(&self, name: &str) -> String {
            name.to_string()
        }

        fn tag_type(&self, kind: TagKind, name: &str) -> Type {
            unresolved_tag(kind, name)
        }

        fn define_record(&mut self, name: &str, is_union: bool, _: Vec<Field>) -> Type {
            Type::Record {
                name: name.to_string(),
                is_union,
                id: DeclId(1),
            }
        }

        fn define_enum(&mut self, name: &str, _: Vec<(String, i64)>) -> Type {
            unresolved_tag(TagKind::Enum, name)
        }
    }

    fn parse(text: &str) -> Decl {
        parse_block(&tokenize(text), &mut NoTypes).unwrap()
    }

    #[test]
    fn test_forward_names() {
        assert_eq!(
            forward_names(&tokenize("@class NSString, NSArray<T>, NSData;")),
            vec!["NSString", "NSArray", "NSData"]
        );
    }

    #[test]
    fn test_interface_with_ivars_and_methods() {
        let decl = parse(
            "@interface Widget : NSObject <Drawable, NSCopying> {\n\
             @private\n int _width;\n NSString *_title;\n}\n\
             @property (nonatomic) int width;\n\
             - (int)width;\n\
             - (void)setWidth:(int)width height:(int)height;\n\
             + (instancetype)widgetWithTitle:(NSString *)title NS_SWIFT_NAME(init(title:));\n\
             @end",
        );
        let Decl::ObjCInterfaceDecl(interface) = decl else {
            panic!("expected an interface");
        };
        assert_eq!(interface.name(), "Widget");
        assert_eq!(interface.superclass(), Some("NSObject"));
        assert_eq!(interface.protocols(), ["Drawable", "NSCopying"]);
        assert!(!interface.is_forward());

        let ivars: Vec<&str> = interface.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(ivars, vec!["_width", "_title"]);
        assert_eq!(interface.fields()[1].ty, Type::pointer(Type::simple("NSString")));

        let methods = interface.functions();
        let selectors: Vec<&str> = methods.iter().map(|m| m.name()).collect();
        assert_eq!(selectors, vec!["width", "setWidth:height:", "widgetWithTitle:"]);
        assert_eq!(methods[1].params().len(), 2);
        assert_eq!(methods[1].params()[1].name, "height");
        assert!(methods.iter().all(|m| m.is_objc_method()));
        assert!(methods[2].is_class_method());
        assert!(!methods[0].is_class_method());
        assert_eq!(methods[2].return_type(), &Type::simple("instancetype"));
    }

    #[test]
    fn test_root_interface_keeps_protocols() {
        let Decl::ObjCInterfaceDecl(root) =
            parse("@interface NSObject <NSObject, NSCopying>\n- (id)self;\n@end")
        else {
            panic!("expected an interface");
        };
        assert_eq!(root.superclass(), None);
        assert_eq!(root.protocols(), ["NSObject", "NSCopying"]);
        assert_eq!(root.functions().len(), 1);

        let Decl::ObjCInterfaceDecl(generic) =
            parse("@interface Box<ObjectType> : NSObject <NSCopying>\n@end")
        else {
            panic!("expected an interface");
        };
        assert_eq!(generic.superclass(), Some("NSObject"));
        assert_eq!(generic.protocols(), ["NSCopying"]);
    }

    #[test]
    fn test_category() {
        let Decl::ObjCCategoryDecl(category) = parse("@interface Widget (Layout)\n- (void)layout;\n@end")
        else {
            panic!("expected a category");
        };
        assert_eq!(category.name(), "Widget");
        assert_eq!(category.category(), "Layout");
        assert_eq!(category.functions().len(), 1);
        assert!(category.functions()[0].return_type().is_void());
    }

    #[test]
    fn test_protocol_with_optional_methods() {
        let Decl::ObjCProtocolDecl(protocol) = parse(
            "@protocol Drawable <NSObject>\n- (void)draw;\n@optional\n+ (id)shared;\n\
             - (void)log:(NSString *)format, ...;\n@end",
        ) else {
            panic!("expected a protocol");
        };
        assert_eq!(protocol.name(), "Drawable");
        let methods = protocol.functions();
        assert_eq!(methods.len(), 3);
        assert!(methods[1].is_class_method());
        assert_eq!(methods[2].name(), "log:");
        assert!(methods[2].is_variadic());
    }

    #[test]
    fn test_method_without_return_type_defaults_to_id() {
        let Decl::ObjCProtocolDecl(protocol) = parse("@protocol P\n- init;\n@end") else {
            panic!("expected a protocol");
        };
        assert_eq!(protocol.functions()[0].return_type(), &Type::simple("id"));
    }
}
