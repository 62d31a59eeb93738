//! Test fixtures for common test scenarios.
//!
//! A unit with one declaration of every kind, and header snippets for the
//! scanner tests.

use crate::core::{
    EnumDecl, FunctionDecl, ObjCCategoryDecl, ObjCInterfaceDecl, ObjCProtocolDecl, RecordDecl,
    TranslationUnit, Type, TypeDecl, TypedefDecl, UnhandledDecl, VarDecl,
};

/// A unit holding one declaration of each kind, in a fixed order.
pub fn sample_unit() -> TranslationUnit {
    let mut unit = TranslationUnit::new().with_source("sample.h");

    let mut unhandled = UnhandledDecl::new("detail", "Namespace");
    unhandled.set_location("sample.h:1");
    unit.push(unhandled);

    unit.push(TypeDecl::new("opaque", Type::record("opaque", false)));

    unit.push(VarDecl::new("lib_errno", Type::int()).with_extern(true));

    let mut add = FunctionDecl::new("add", Type::int(), false);
    add.add_field("a", Type::int());
    add.add_field("b", Type::int());
    unit.push(add);

    unit.push(TypedefDecl::new(
        "handle_t",
        Type::pointer(Type::record("opaque", false)),
    ));

    let mut point = RecordDecl::new("Point", false);
    point.add_field("x", Type::int());
    point.add_field("y", Type::int());
    point.set_bit_size(64);
    point.set_bit_alignment(32);
    unit.push(point);

    let mut color = EnumDecl::new("Color");
    color.add_field("RED", 0);
    color.add_signed("INVALID", -1);
    unit.push(color);

    let mut widget = ObjCInterfaceDecl::new("Widget", Some("NSObject".to_string()), false);
    widget.add_protocol("NSCopying");
    // Defined interfaces accept members.
    let _ = widget.add_field("_size", Type::int());
    let mut method = FunctionDecl::new("size", Type::int(), false);
    method.set_is_objc_method(true);
    let _ = widget.add_function(method);
    unit.push(widget);

    let mut category = ObjCCategoryDecl::new("Widget", "Drawing");
    let mut draw = FunctionDecl::new("draw", Type::void(), false);
    draw.set_is_objc_method(true);
    category.add_function(draw);
    unit.push(category);

    unit.push(ObjCProtocolDecl::new("Drawable"));

    unit
}

/// A plain C header exercising most of the scanner.
pub const C_HEADER: &str = r#"
#ifndef SAMPLE_H
#define SAMPLE_H

#include <stddef.h>

#define SAMPLE_VERSION "1.2"
#define SAMPLE_MAX 64

/* A point. */
typedef struct {
    int x;
    int y;
} Point;

struct node {
    struct node *next;
    unsigned flags : 3;
    unsigned kind : 5;
    double weight;
};

union value;

enum color { RED, GREEN = 5, BLUE, BLACK = -1 };

typedef int (*compare_fn)(const void *a, const void *b);

extern int sample_errno;

int sample_add(int a, int b);
void sample_log(const char *fmt, ...);
size_t sample_len(const char *s);

static inline int sample_twice(int x) {
    return x * 2;
}
#endif
"#;

/// An Objective-C header.
pub const OBJC_HEADER: &str = r#"
@class NSString, NSData;

@protocol Drawable <NSObject>
- (void)draw;
+ (id)shared;
@end

@interface Widget : NSObject <Drawable, NSCopying> {
    int _width;
    NSString *_title;
}
- (int)width;
- (void)setWidth:(int)width height:(int)height;
+ (instancetype)widgetWithTitle:(NSString *)title;
@end

@interface Widget (Layout)
- (void)layout;
@end
"#;
