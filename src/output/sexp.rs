//! S-expression output.
//!
//! One form per declaration, one line each, preceded by a `;;` comment with
//! the source location when there is one:
//!
//! ```text
//! ;; point.h:3
//! (struct "Point" 64 32 ("x" :int) ("y" :int))
//! ```

use std::fmt::Write as _;

use super::OutputDriver;
use crate::core::{
    DeclBase, EnumDecl, Field, FunctionDecl, HasFields, HasFunctions, ObjCCategoryDecl,
    ObjCInterfaceDecl, ObjCProtocolDecl, RecordDecl, Type, TypeDecl, TypedefDecl, UnhandledDecl,
    VarDecl,
};

/// Renders declarations as S-expressions.
#[derive(Debug, Default)]
pub struct SexpDriver {
    out: String,
}

impl SexpDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&mut self, base: &DeclBase) {
        if let Some(location) = base.location() {
            self.write_comment(location);
        }
    }

    fn form(&mut self, form: String) {
        self.out.push_str(&form);
        self.out.push('\n');
    }
}

fn quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn keyword(name: &str) -> String {
    format!(":{}", name.split_whitespace().collect::<Vec<_>>().join("-"))
}

pub(crate) fn type_form(ty: &Type) -> String {
    match ty {
        Type::Basic { name, .. } => keyword(name),
        Type::Simple { name } => quote(name),
        Type::Pointer(inner) => format!("(:pointer {})", type_form(inner)),
        Type::Array { element, size } => {
            format!("(:array {} {})", type_form(element), size.unwrap_or(0))
        }
        Type::Bitfield { base, width } => format!("(:bitfield {} {})", type_form(base), width),
        Type::Record { name, is_union, id } => {
            let tag = if *is_union { ":union" } else { ":struct" };
            format!("({} {} {})", tag, quote(name), id)
        }
        Type::Enum { name, id } => format!("(:enum {} {})", quote(name), id),
        Type::FunctionPointer {
            return_type,
            params,
            is_variadic,
        } => {
            let params: Vec<String> = params.iter().map(type_form).collect();
            let variadic = if *is_variadic { " :variadic" } else { "" };
            format!(
                "(:function-pointer {} ({}){})",
                type_form(return_type),
                params.join(" "),
                variadic
            )
        }
    }
}

fn field_forms(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|f| format!("({} {})", quote(&f.name), type_form(&f.ty)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn method_form(f: &FunctionDecl) -> String {
    let mut form = format!(
        "(method {} ({}) {}",
        quote(f.name()),
        field_forms(f.fields()),
        type_form(f.return_type())
    );
    if f.is_class_method() {
        form.push_str(" :class");
    }
    if f.is_variadic() {
        form.push_str(" :variadic");
    }
    form.push(')');
    form
}

fn methods_form(methods: &[FunctionDecl]) -> String {
    let methods: Vec<String> = methods.iter().map(method_form).collect();
    if methods.is_empty() {
        "(methods)".to_string()
    } else {
        format!("(methods {})", methods.join(" "))
    }
}

impl OutputDriver for SexpDriver {
    fn write_comment(&mut self, text: &str) {
        for line in text.lines() {
            let _ = writeln!(self.out, ";; {}", line);
        }
    }

    fn write_unhandled(&mut self, d: &UnhandledDecl) {
        self.begin(d.base());
        self.form(format!("(unhandled {} {})", quote(d.name()), quote(d.kind())));
    }

    fn write_type_decl(&mut self, d: &TypeDecl) {
        self.begin(d.base());
        self.form(format!("(type {} {})", quote(d.name()), type_form(d.ty())));
    }

    fn write_var(&mut self, d: &VarDecl) {
        self.begin(d.base());
        if d.is_extern() {
            self.form(format!("(extern {} {})", quote(d.name()), type_form(d.ty())));
            return;
        }
        let value = if d.is_string() {
            d.value().to_string()
        } else if d.value().is_empty() {
            "nil".to_string()
        } else if d.value().parse::<i64>().is_ok()
            || d.value().parse::<f64>().is_ok_and(f64::is_finite)
        {
            d.value().to_string()
        } else {
            quote(d.value())
        };
        self.form(format!(
            "(const {} {} {})",
            quote(d.name()),
            type_form(d.ty()),
            value
        ));
    }

    fn write_function(&mut self, d: &FunctionDecl) {
        self.begin(d.base());
        let variadic = if d.is_variadic() { " :variadic" } else { "" };
        self.form(format!(
            "(function {} ({}) {}{})",
            quote(d.name()),
            field_forms(d.fields()),
            type_form(d.return_type()),
            variadic
        ));
    }

    fn write_typedef(&mut self, d: &TypedefDecl) {
        self.begin(d.base());
        self.form(format!("(typedef {} {})", quote(d.name()), type_form(d.ty())));
    }

    fn write_record(&mut self, d: &RecordDecl) {
        self.begin(d.base());
        let tag = if d.is_union() { "union" } else { "struct" };
        let mut form = format!(
            "({} {} {} {}",
            tag,
            quote(d.name()),
            d.bit_size(),
            d.bit_alignment()
        );
        if !d.fields().is_empty() {
            form.push(' ');
            form.push_str(&field_forms(d.fields()));
        }
        form.push(')');
        self.form(form);
    }

    fn write_enum(&mut self, d: &EnumDecl) {
        self.begin(d.base());
        let mut form = format!("(enum {}", quote(d.name()));
        for field in d.fields() {
            let _ = write!(form, " ({} {})", quote(field.name), field.signed_value());
        }
        form.push(')');
        self.form(form);
    }

    fn write_objc_interface(&mut self, d: &ObjCInterfaceDecl) {
        self.begin(d.base());
        if d.is_forward() {
            self.form(format!("(objc-class {})", quote(d.name())));
            return;
        }
        let superclass = d.superclass().map(quote).unwrap_or_else(|| "nil".to_string());
        let protocols: Vec<String> = d.protocols().iter().map(|p| quote(p)).collect();
        self.form(format!(
            "(objc-interface {} {} ({}) (ivars{}{}) {})",
            quote(d.name()),
            superclass,
            protocols.join(" "),
            if d.fields().is_empty() { "" } else { " " },
            field_forms(d.fields()),
            methods_form(d.functions())
        ));
    }

    fn write_objc_category(&mut self, d: &ObjCCategoryDecl) {
        self.begin(d.base());
        self.form(format!(
            "(objc-category {} {} {})",
            quote(d.name()),
            quote(d.category()),
            methods_form(d.functions())
        ));
    }

    fn write_objc_protocol(&mut self, d: &ObjCProtocolDecl) {
        self.begin(d.base());
        self.form(format!(
            "(objc-protocol {} {})",
            quote(d.name()),
            methods_form(d.functions())
        ));
    }

    fn finish(&mut self) -> String {
        std::mem::take(&mut self.out)
    }
}
