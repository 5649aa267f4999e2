use std::sync::Arc;

use pooled_interchange::{
    convert_fields, BufferPool, ContentWriter, ConvertError, Date, DateTime, Decimal,
    FieldDescriptor, JsonSink, Record, Sink, Source, TypeCatalog, Value, ValueKind,
};

#[test]
fn base_type_lookup() {
    let cat = TypeCatalog::base();
    assert_eq!(cat.get_base_type(23).map(|t| t.name()), Some("INT"));
    assert!(cat.get_base_type(999_999).is_none());
    assert_eq!(cat.get_base_type(1700).map(|t| t.kind()), Some(ValueKind::Decimal));
    assert_eq!(cat.get_base_type(1015).map(|t| t.kind()), Some(ValueKind::StrArray));
}

// A row of positional columns, standing in for a database result.
struct Row<'a> {
    names: &'a [&'a str],
    cells: Vec<Value<'a>>,
}

impl Source for Row<'_> {
    fn get(&self, name: &str, _kind: ValueKind) -> Option<Value<'_>> {
        let i = self.names.iter().position(|n| *n == name)?;
        self.cells.get(i).map(Value::borrowed)
    }
}

// Test: a row converted field by field into a record.
// Verifies: each converter shapes its value to the entry's kind and missing
// cells become the kind's zero.
#[test]
fn row_to_record() {
    let cat = TypeCatalog::base();
    let fields = [
        FieldDescriptor::new(&cat, "id", 20),
        FieldDescriptor::new(&cat, "price", 790),
        FieldDescriptor::new(&cat, "tags", 1015),
        FieldDescriptor::new(&cat, "qty", 21),
        FieldDescriptor::new(&cat, "note", 25),
    ];
    let row = Row {
        names: &["id", "price", "tags", "qty"],
        cells: vec![
            Value::Int(7),
            Value::Int(12),
            Value::Array(vec![Value::from("a"), Value::Char('b')]),
            Value::Long(70_000),
        ],
    };
    let mut rec = Record::new();
    let report = convert_fields(&fields, &row, &mut rec);
    assert!(report.is_complete());
    assert_eq!(report.converted, 5);

    assert_eq!(rec.value("id"), Some(&Value::Long(7)));
    assert_eq!(rec.value("price"), Some(&Value::Decimal(Decimal::from(12i64))));
    assert_eq!(
        rec.value("tags"),
        Some(&Value::Array(vec![Value::from("a"), Value::from("b")]))
    );
    // 70000 does not fit SMALLINT
    assert_eq!(rec.value("qty"), Some(&Value::Short(0)));
    assert_eq!(rec.value("note"), Some(&Value::Null));
}

// Test: a batch containing an unknown type identifier.
// Verifies: only that field fails; the rest still reach the sink.
#[test]
fn unknown_type_fails_one_field() {
    let cat = TypeCatalog::base();
    let fields = [
        FieldDescriptor::new(&cat, "a", 16),
        FieldDescriptor::new(&cat, "b", 999_999),
        FieldDescriptor::new(&cat, "c", 16),
    ];
    let src: Record = [("a", true), ("b", true), ("c", false)].into_iter().collect();
    let mut out = Record::new();
    let report = convert_fields(&fields, &src, &mut out);
    assert_eq!(report.converted, 2);
    assert_eq!(
        report.failures,
        [ConvertError::UnsupportedType {
            field: "b".to_owned(),
            type_id: 999_999
        }]
    );
    let names: Vec<&str> = out.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["a", "c"]);
}

// Test: descriptors read from records, then used to render JSON.
// Verifies: the same converters drive an outbound writer sink.
#[test]
fn record_to_json() {
    let cat = TypeCatalog::base();
    let meta: Vec<Record> = [("id", 23i64), ("when", 1114), ("cost", 1700), ("blob", 17)]
        .into_iter()
        .map(|(name, oid)| {
            let mut r = Record::new();
            r.set("name", name).set("typoid", oid).set("def", false);
            r
        })
        .collect();
    let fields: Vec<FieldDescriptor> = meta
        .iter()
        .map(|m| FieldDescriptor::read(m, &cat))
        .collect::<Result<_, _>>()
        .unwrap();

    let when = DateTime::new(Date::new(2024, 3, 7).unwrap(), 12, 30, 0).unwrap();
    let mut src = Record::new();
    src.set("id", 5i32)
        .set("when", when)
        .set("cost", Decimal::new(-50, 2).unwrap())
        .set("blob", vec![0xde_u8, 0xad]);

    let mut out = Arc::new(BufferPool::default()).byte_content();
    let mut json = JsonSink::new(&mut out);
    let report = convert_fields(&fields, &src, &mut json);
    assert_eq!(json.finish(), 4);
    assert!(report.is_complete());
    assert_eq!(
        std::str::from_utf8(out.as_bytes()).unwrap(),
        r#"{"id":5,"when":"2024-03-07 12:30:00","cost":-0.50,"blob":"dead"}"#
    );
    assert_eq!(out.len(), out.as_bytes().len());
}

#[test]
fn sink_receives_zero_for_missing_primitives() {
    let cat = TypeCatalog::base();
    let mut out = Record::new();
    let empty = Record::new();
    for (id, want) in [
        (16, Value::Bool(false)),
        (23, Value::Int(0)),
        (701, Value::Double(0.0)),
        (17, Value::Null),
    ] {
        cat.get_base_type(id).unwrap().convert("x", &empty, &mut out);
        assert_eq!(out.value("x"), Some(&want), "type {id}");
    }
    out.put("y", Value::Int(1));
    assert_eq!(out.len(), 2);
}
