//! JSON output.
//!
//! The document is an array with one object per declaration. Every object
//! has a `"tag"` naming its kind; types are nested objects whose tag starts
//! with `:` for builtin shapes (`":int"`, `":pointer"`, `":struct"`, ...).

use serde_json::{json, Map, Value};

use super::OutputDriver;
use crate::core::{
    DeclBase, EnumDecl, Field, FunctionDecl, HasFields, HasFunctions, ObjCCategoryDecl,
    ObjCInterfaceDecl, ObjCProtocolDecl, RecordDecl, Type, TypeDecl, TypedefDecl, UnhandledDecl,
    VarDecl,
};

/// Renders declarations as a JSON array.
#[derive(Debug, Default)]
pub struct JsonDriver {
    pretty: bool,
    entries: Vec<Value>,
}

impl JsonDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indent the output.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn push(&mut self, object: Map<String, Value>) {
        self.entries.push(Value::Object(object));
    }
}

/// `{"tag": tag, "name": .., "location": .., "id": ..}`
fn base_object(tag: &str, base: &DeclBase) -> Map<String, Value> {
    let mut object = Map::new();
    object.insert("tag".into(), json!(tag));
    object.insert("name".into(), json!(base.name()));
    if let Some(location) = base.location() {
        object.insert("location".into(), json!(location));
    }
    if base.id().is_assigned() {
        object.insert("id".into(), json!(base.id().get()));
    }
    object
}

/// Builtin type names become keywords: `unsigned int` -> `:unsigned-int`.
fn keyword(name: &str) -> String {
    format!(":{}", name.split_whitespace().collect::<Vec<_>>().join("-"))
}

pub(crate) fn type_value(ty: &Type) -> Value {
    match ty {
        Type::Basic {
            name,
            bit_size,
            bit_alignment,
        } => {
            if ty.is_void() {
                json!({ "tag": ":void" })
            } else {
                json!({
                    "tag": keyword(name),
                    "bit-size": bit_size,
                    "bit-alignment": bit_alignment,
                })
            }
        }
        Type::Simple { name } => json!({ "tag": name }),
        Type::Pointer(inner) => json!({ "tag": ":pointer", "type": type_value(inner) }),
        Type::Array { element, size } => json!({
            "tag": ":array",
            "type": type_value(element),
            "size": size.unwrap_or(0),
        }),
        Type::Bitfield { base, width } => json!({
            "tag": ":bitfield",
            "type": type_value(base),
            "width": width,
        }),
        Type::Record { name, is_union, id } => json!({
            "tag": if *is_union { ":union" } else { ":struct" },
            "name": name,
            "id": id.get(),
        }),
        Type::Enum { name, id } => json!({
            "tag": ":enum",
            "name": name,
            "id": id.get(),
        }),
        Type::FunctionPointer {
            return_type,
            params,
            is_variadic,
        } => json!({
            "tag": ":function-pointer",
            "return-type": type_value(return_type),
            "parameters": params.iter().map(type_value).collect::<Vec<_>>(),
            "variadic": is_variadic,
        }),
    }
}

fn field_values(tag: &str, fields: &[Field]) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|f| json!({ "tag": tag, "name": f.name, "type": type_value(&f.ty) }))
            .collect(),
    )
}

/// Literal text as the closest JSON value.
fn literal_value(text: &str, is_string: bool) -> Value {
    if is_string {
        let unquoted = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(text);
        return json!(unquoted);
    }
    if let Ok(n) = text.parse::<i64>() {
        return json!(n);
    }
    if let Ok(n) = text.parse::<u64>() {
        return json!(n);
    }
    if let Ok(n) = text.parse::<f64>() {
        if n.is_finite() {
            return json!(n);
        }
    }
    json!(text)
}

fn method_value(f: &FunctionDecl) -> Value {
    json!({
        "name": f.name(),
        "class-method": f.is_class_method(),
        "variadic": f.is_variadic(),
        "parameters": field_values("parameter", f.fields()),
        "return-type": type_value(f.return_type()),
    })
}

fn method_values(methods: &[FunctionDecl]) -> Value {
    Value::Array(methods.iter().map(method_value).collect())
}

impl OutputDriver for JsonDriver {
    /// JSON has no comments.
    fn write_comment(&mut self, _text: &str) {}

    fn write_unhandled(&mut self, d: &UnhandledDecl) {
        let mut object = base_object("unhandled", d.base());
        object.insert("kind".into(), json!(d.kind()));
        self.push(object);
    }

    fn write_type_decl(&mut self, d: &TypeDecl) {
        let mut object = base_object("type", d.base());
        object.insert("type".into(), type_value(d.ty()));
        self.push(object);
    }

    fn write_var(&mut self, d: &VarDecl) {
        let tag = if d.is_extern() { "extern" } else { "const" };
        let mut object = base_object(tag, d.base());
        object.insert("type".into(), type_value(d.ty()));
        if !d.value().is_empty() {
            object.insert("value".into(), literal_value(d.value(), d.is_string()));
        }
        self.push(object);
    }

    fn write_function(&mut self, d: &FunctionDecl) {
        let mut object = base_object("function", d.base());
        object.insert("variadic".into(), json!(d.is_variadic()));
        if d.is_objc_method() {
            object.insert("objc-method".into(), json!(true));
            object.insert("class-method".into(), json!(d.is_class_method()));
        }
        object.insert("parameters".into(), field_values("parameter", d.fields()));
        object.insert("return-type".into(), type_value(d.return_type()));
        self.push(object);
    }

    fn write_typedef(&mut self, d: &TypedefDecl) {
        let mut object = base_object("typedef", d.base());
        object.insert("type".into(), type_value(d.ty()));
        self.push(object);
    }

    fn write_record(&mut self, d: &RecordDecl) {
        let tag = if d.is_union() { "union" } else { "struct" };
        let mut object = base_object(tag, d.base());
        object.insert("bit-size".into(), json!(d.bit_size()));
        object.insert("bit-alignment".into(), json!(d.bit_alignment()));
        object.insert("fields".into(), field_values("field", d.fields()));
        self.push(object);
    }

    fn write_enum(&mut self, d: &EnumDecl) {
        let mut object = base_object("enum", d.base());
        let fields: Vec<Value> = d
            .fields()
            .map(|f| json!({ "tag": "field", "name": f.name, "value": f.signed_value() }))
            .collect();
        object.insert("fields".into(), Value::Array(fields));
        self.push(object);
    }

    fn write_objc_interface(&mut self, d: &ObjCInterfaceDecl) {
        let mut object = base_object("@interface", d.base());
        object.insert("superclass".into(), json!(d.superclass().unwrap_or("")));
        object.insert("forward".into(), json!(d.is_forward()));
        object.insert("protocols".into(), json!(d.protocols()));
        object.insert("ivars".into(), field_values("field", d.fields()));
        object.insert("methods".into(), method_values(d.functions()));
        self.push(object);
    }

    fn write_objc_category(&mut self, d: &ObjCCategoryDecl) {
        let mut object = base_object("@category", d.base());
        object.insert("category".into(), json!(d.category()));
        object.insert("methods".into(), method_values(d.functions()));
        self.push(object);
    }

    fn write_objc_protocol(&mut self, d: &ObjCProtocolDecl) {
        let mut object = base_object("@protocol", d.base());
        object.insert("methods".into(), method_values(d.functions()));
        self.push(object);
    }

    fn finish(&mut self) -> String {
        let document = Value::Array(std::mem::take(&mut self.entries));
        if self.pretty {
            format!("{:#}\n", document)
        } else {
            format!("{}\n", document)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DeclId, TranslationUnit};
    use crate::output::render_to_string;
    use crate::test_support::sample_unit;

    fn render_json(unit: &TranslationUnit) -> Vec<Value> {
        let text = render_to_string(unit, &mut JsonDriver::new());
        match serde_json::from_str::<Value>(&text).unwrap() {
            Value::Array(entries) => entries,
            other => panic!("expected array, got {other}"),
        }
    }

    #[test]
    fn test_one_object_per_decl_in_order() {
        let unit = sample_unit();
        let entries = render_json(&unit);

        assert_eq!(entries.len(), unit.len());
        for (entry, decl) in entries.iter().zip(unit.iter()) {
            assert_eq!(entry["name"], json!(decl.name()));
            assert_eq!(entry["id"], json!(decl.id().get()));
        }
    }

    #[test]
    fn test_record_object() {
        let mut unit = TranslationUnit::new();
        let mut point = RecordDecl::new("Point", false);
        point.add_field("x", Type::int());
        point.add_field("y", Type::int());
        point.set_bit_size(64);
        point.set_bit_alignment(32);
        point.set_location("point.h:3");
        unit.push(point);

        let entries = render_json(&unit);
        let record = &entries[0];
        assert_eq!(record["tag"], "struct");
        assert_eq!(record["location"], "point.h:3");
        assert_eq!(record["bit-size"], 64);
        assert_eq!(record["fields"][0]["name"], "x");
        assert_eq!(record["fields"][1]["name"], "y");
        assert_eq!(record["fields"][1]["type"]["tag"], ":int");
        assert_eq!(record["fields"][1]["type"]["bit-size"], 32);
    }

    #[test]
    fn test_type_values() {
        assert_eq!(
            type_value(&Type::basic("unsigned long long", 64, 64))["tag"],
            ":unsigned-long-long"
        );
        assert_eq!(type_value(&Type::void()), json!({ "tag": ":void" }));
        assert_eq!(
            type_value(&Type::pointer(Type::simple("FILE"))),
            json!({ "tag": ":pointer", "type": { "tag": "FILE" } })
        );
        let rec = Type::Record {
            name: String::new(),
            is_union: true,
            id: DeclId(5),
        };
        assert_eq!(
            type_value(&rec),
            json!({ "tag": ":union", "name": "", "id": 5 })
        );
        assert_eq!(type_value(&Type::array(Type::int(), None))["size"], 0);
    }

    #[test]
    fn test_literal_values() {
        assert_eq!(literal_value("42", false), json!(42));
        assert_eq!(literal_value("-1", false), json!(-1));
        assert_eq!(literal_value("2.5", false), json!(2.5));
        assert_eq!(literal_value("\"hi\"", true), json!("hi"));
        assert_eq!(literal_value("0x10", false), json!("0x10"));
    }

    #[test]
    fn test_enum_values_signed() {
        let mut unit = TranslationUnit::new();
        let mut e = EnumDecl::new("status");
        e.add_signed("ERR", -1);
        e.add_field("OK", 0);
        unit.push(e);

        let entries = render_json(&unit);
        assert_eq!(entries[0]["fields"][0]["value"], -1);
        assert_eq!(entries[0]["fields"][1]["value"], 0);
    }

    #[test]
    fn test_pretty_output_is_valid_json() {
        let unit = sample_unit();
        let text = render_to_string(&unit, &mut JsonDriver::new().with_pretty(true));
        assert!(text.contains('\n'));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().map(Vec::len), Some(unit.len()));
    }
}
