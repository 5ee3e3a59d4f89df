#[cfg(test)]
mod tests {
    use serde_json::json;
    use std::sync::LazyLock;
    use strata::{AttributeDef, DataType, Entity, JsonOptions, Model, Schema, Value};

    static INVOICE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("invoice")
            .attribute(AttributeDef::new("id", "invoice_id", DataType::sql("int")).primary_key())
            .attribute(AttributeDef::named("number", DataType::sql("varchar(16)")).default(""))
            .attribute(AttributeDef::named("total", DataType::sql("double")).default(0))
            .attribute(AttributeDef::named("note", DataType::sql("text")).nullable())
            .attribute(AttributeDef::named("summary", DataType::sql("varchar(64)")).default("").dynamic())
            .attribute(
                AttributeDef::named("items", DataType::children(InvoiceItem::schema))
                    .foreign_key("id", Some("invoice")),
            )
            .build()
    });

    static INVOICE_ITEM: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("invoice_item")
            .attribute(AttributeDef::named("invoice", DataType::sql("int")).primary_key())
            .attribute(AttributeDef::named("position", DataType::sql("smallint")).primary_key())
            .attribute(AttributeDef::named("label", DataType::sql("varchar(64)")).default(""))
            .build()
    });

    static STAMP: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("stamp")
            .attribute(AttributeDef::named("label", DataType::sql("varchar(8)")).default(""))
            .build()
    });

    struct Invoice;
    impl Entity for Invoice {
        fn schema() -> &'static Schema {
            &INVOICE
        }
    }

    struct InvoiceItem;
    impl Entity for InvoiceItem {
        fn schema() -> &'static Schema {
            &INVOICE_ITEM
        }
    }

    fn item(invoice: i32, position: i32, label: &str) -> Model {
        let mut result = InvoiceItem::fabricate().unwrap();
        result
            .set_attrib_value("invoice", invoice)
            .unwrap()
            .set_attrib_value("position", position)
            .unwrap()
            .set_attrib_value("label", label)
            .unwrap();
        result
    }

    fn invoice() -> Model {
        let mut result = Invoice::fabricate().unwrap();
        result
            .set_attrib_value("id", 5)
            .unwrap()
            .set_attrib_value("number", "A-005")
            .unwrap()
            .set_attrib_value("total", "19.90")
            .unwrap()
            .set_attrib_value("summary", "two items")
            .unwrap()
            .set_attrib_value("items", vec![item(5, 1, "Pen"), item(5, 2, "Ink")])
            .unwrap();
        result
    }

    #[test]
    fn sql_object() {
        let invoice = invoice();
        let projection = invoice.sql_object(false).unwrap();
        assert_eq!(projection.names(), ["invoice_id", "number", "total", "note"]);
        assert_eq!(projection.get("note"), Some(&Value::SqlNull));
        assert_eq!(projection.get("invoice_id"), Some(&Value::Int(5)));
        assert_eq!(invoice.sql_object(true).unwrap(), projection);

        let fresh = Invoice::fabricate().unwrap();
        let projection = fresh.sql_object(true).unwrap();
        assert!(!projection.contains("invoice_id"));
        assert!(!projection.contains("items"));
        assert!(fresh.sql_object(false).unwrap().contains("invoice_id"));
    }

    #[test]
    fn raw_object() {
        let invoice = invoice();
        assert_eq!(
            serde_json::Value::Object(invoice.raw_object(false).unwrap()),
            json!({
                "invoice_id": 5,
                "number": "A-005",
                "total": 19.9,
                "note": null,
                "summary": "two items",
                "items": [
                    { "invoice": 5, "position": 1 },
                    { "invoice": 5, "position": 2 },
                ],
            })
        );
        assert_eq!(
            serde_json::Value::Object(invoice.raw_object(true).unwrap())["items"],
            json!([
                { "invoice": 5, "position": 1, "label": "Pen" },
                { "invoice": 5, "position": 2, "label": "Ink" },
            ])
        );
        assert_eq!(
            invoice
                .raw_object(false)
                .unwrap()
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            ["invoice_id", "number", "total", "note", "summary", "items"]
        );
        let plain = invoice.raw_array(false).unwrap();
        assert!(matches!(plain.get("items"), Some(Value::Children(v)) if v.len() == 2));
    }

    #[test]
    fn raw_json() {
        let invoice = invoice();
        assert_eq!(
            invoice
                .raw_json(
                    JsonOptions {
                        pretty: false,
                        skip_nulls: true,
                    },
                    true
                )
                .unwrap(),
            r#"{"invoice_id":5,"number":"A-005","total":19.9,"summary":"two items","items":[{"invoice":5,"position":1,"label":"Pen"},{"invoice":5,"position":2,"label":"Ink"}]}"#
        );
        let json = invoice.raw_json(JsonOptions::default(), false).unwrap();
        assert!(json.contains(r#""note":null"#));
        assert!(json.contains(r#""items":[{"invoice":5,"position":1},{"invoice":5,"position":2}]"#));
    }

    #[test]
    fn empty_children() {
        let fresh = Invoice::fabricate().unwrap();
        assert_eq!(fresh.stored("items").unwrap(), &Value::Children(Vec::new()));
        assert_eq!(
            serde_json::Value::Object(fresh.raw_object(true).unwrap())["items"],
            json!([])
        );
        assert_eq!(
            serde_json::Value::Object(fresh.raw_object(false).unwrap())["items"],
            json!([])
        );
        assert!(fresh.get_as::<Vec<Model>>("items").unwrap().is_empty());
    }

    #[test]
    fn key_reference() {
        let invoice = invoice();
        assert_eq!(invoice.key_reference(), json!(5));
        assert_eq!(
            item(5, 3, "Nib").key_reference(),
            json!({ "invoice": 5, "position": 3 })
        );
        assert_eq!(
            Model::fabricate(&STAMP).unwrap().key_reference(),
            serde_json::Value::Null
        );
    }
}
