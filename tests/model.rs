#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal::Decimal;
    use std::sync::LazyLock;
    use strata::{
        AttributeDef, DataType, Entity, InputConfig, InputKind, Model, ModelError, Record, Result,
        Schema, Value, convert, mapping,
    };
    use strata_memory::MemoryConnection;
    use time::macros::{date, datetime};

    static EMPLOYEE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("employee")
            .table_schema("staff")
            .attribute(AttributeDef::new("id", "employee_id", DataType::sql("int(10) unsigned")).primary_key())
            .attribute(AttributeDef::new("name", "employee_name", DataType::sql("varchar(64)")).default("Unnamed"))
            .attribute(AttributeDef::named("salary", DataType::sql("double")).default(1000))
            .attribute(AttributeDef::named("active", DataType::sql("flag")).default(true))
            .attribute(AttributeDef::named("hired", DataType::sql("datetime")).nullable())
            .attribute(AttributeDef::named("manager", DataType::sql("int")).nullable())
            .attribute(
                AttributeDef::named("role", DataType::sql("varchar(16)"))
                    .default("staff")
                    .input(InputConfig {
                        kind: InputKind::Select,
                        values: vec![
                            ("staff".into(), "Staff".into()),
                            ("lead".into(), "Team lead".into()),
                        ],
                        required: true,
                        ..Default::default()
                    }),
            )
            .getter("active", convert::flag_getter)
            .getter("hired", convert::datetime_getter)
            .setter("hired", convert::datetime_setter)
            .setter("name", capitalize)
            .build()
    });

    static LINK: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("employee_project")
            .attribute(AttributeDef::named("employee_id", DataType::sql("int")).default(0))
            .attribute(AttributeDef::named("project_id", DataType::sql("int")).default(0))
            .build()
    });

    struct Employee;

    impl Entity for Employee {
        fn schema() -> &'static Schema {
            &EMPLOYEE
        }
    }

    fn capitalize(value: Value, _model: &Model) -> Result<Value> {
        Ok(match value {
            Value::Varchar(v) => {
                let mut chars = v.chars();
                Value::Varchar(match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => v,
                })
            }
            v => v,
        })
    }

    #[test]
    fn fabricate_defaults() {
        let employee = Employee::fabricate().unwrap();
        assert!(!employee.is_loaded());
        assert_eq!(
            serde_json::Value::Object(employee.raw_object(false).unwrap()),
            serde_json::json!({
                "employee_id": 0,
                "employee_name": "Unnamed",
                "salary": 1000.0,
                "active": "Y",
                "hired": null,
                "manager": null,
                "role": "staff",
            })
        );
        assert!(employee.is_key_empty());
        assert_eq!(employee.get("salary").unwrap(), Value::Float(1000.0));
        assert_eq!(employee.get("active").unwrap(), Value::Boolean(true));
    }

    #[test]
    fn access_by_any_name() {
        let mut employee = Employee::fabricate().unwrap();
        employee
            .set_attrib_value("employee_name", "grace")
            .unwrap()
            .set_attrib_value("salary", "2500.5")
            .unwrap()
            .set_attrib_value("manager", Value::SqlNull)
            .unwrap();
        assert_eq!(employee.get_as::<String>("name").unwrap(), "Grace");
        assert_eq!(employee.get_as::<String>("employee_name").unwrap(), "Grace");
        assert_eq!(employee.get_as::<f64>("salary").unwrap(), 2500.5);
        assert_eq!(employee.get("manager").unwrap(), Value::Null);
        assert_eq!(employee.resolve("employee_id"), Some("id"));
        assert_eq!(employee.resolve("id"), Some("id"));
        assert_eq!(employee.resolve("nickname"), None);

        let error = employee.get("nickname").unwrap_err();
        assert!(matches!(
            ModelError::of(&error),
            Some(ModelError::InvalidParameter(..))
        ));
        let error = employee.set_attrib_value("nickname", 1).unwrap_err();
        assert!(matches!(
            ModelError::of(&error),
            Some(ModelError::InvalidParameter(..))
        ));
        let error = employee.set_attrib_value("salary", "lots").unwrap_err();
        assert!(matches!(
            ModelError::of(&error),
            Some(ModelError::InvalidValue(..))
        ));
        assert_eq!(employee.get_as::<f64>("salary").unwrap(), 2500.5);
    }

    #[test]
    fn getters_and_setters() {
        let mut employee = Employee::fabricate().unwrap();
        assert_eq!(employee.get("hired").unwrap(), Value::Null);
        assert_eq!(
            employee
                .get_attrib_value("hired", Value::Varchar("never".into()))
                .unwrap(),
            Value::Varchar("never".into())
        );
        employee
            .set_attrib_value("hired", datetime!(2020-06-15 08:00:00))
            .unwrap();
        assert_eq!(
            employee.stored("hired").unwrap(),
            &Value::Varchar("2020-06-15 08:00:00".into())
        );
        assert_eq!(
            employee.get("hired").unwrap(),
            Value::Timestamp(datetime!(2020-06-15 08:00:00))
        );
        employee.set_attrib_value("hired", date!(2021 - 01 - 31)).unwrap();
        assert_eq!(
            employee.stored("hired").unwrap(),
            &Value::Varchar("2021-01-31 00:00:00".into())
        );
        employee.set_attrib_value("active", "N").unwrap();
        assert!(!employee.get_as::<bool>("active").unwrap());
    }

    #[tokio::test]
    async fn fill_with_decimals() {
        let mut connection = MemoryConnection::default();
        let mut employee = Employee::fabricate().unwrap();
        employee
            .fill(
                &mut connection,
                &Record::new()
                    .with("employee_id", Decimal::new(419, 1))
                    .with("salary", Decimal::new(250075, 2))
                    .with("manager", Decimal::new(7, 0)),
            )
            .await
            .unwrap();
        assert_eq!(employee.key().unwrap(), 41);
        assert_eq!(employee.get("salary").unwrap(), Value::Float(2500.75));
        assert_eq!(employee.get("manager").unwrap(), Value::Int(7));
        assert_eq!(employee.get_as::<String>("name").unwrap(), "Unnamed");
        assert!(connection.calls().await.is_empty());
    }

    #[test]
    fn identity() {
        let mut employee = Employee::fabricate().unwrap();
        assert_eq!(employee.key_name(true).unwrap(), "id");
        assert_eq!(employee.key_name(false).unwrap(), "employee_id");
        assert_eq!(employee.key_names(false).unwrap(), ["employee_id"]);
        employee.set_key("41").unwrap();
        assert_eq!(employee.key().unwrap(), 41);
        assert!(!employee.is_key_empty());
        assert_eq!(
            employee.key_pairs().unwrap(),
            [("employee_id", Value::Int(41))]
        );

        let link = Model::fabricate(&LINK).unwrap();
        for error in [
            link.key_name(true).unwrap_err(),
            link.key_names(false).unwrap_err(),
            link.key().unwrap_err(),
            link.key_pairs().unwrap_err(),
        ] {
            assert!(matches!(
                ModelError::of(&error),
                Some(ModelError::NoPrimaryKey { .. })
            ));
        }
        assert!(link.is_key_empty());
    }

    #[test]
    fn assign_and_replicate() {
        let mut employee = Employee::fabricate().unwrap();
        employee
            .assign(
                &Record::new()
                    .with("id", 7)
                    .with("name", "linus")
                    .with("role", "lead")
                    .with("unrelated", "ignored"),
            )
            .unwrap();
        assert_eq!(employee.get_as::<String>("name").unwrap(), "Linus");
        let replica = employee.replicate(&["id", "employee_name"]).unwrap();
        assert!(replica.is_key_empty());
        assert_eq!(replica.get_as::<String>("name").unwrap(), "Unnamed");
        assert_eq!(replica.get_as::<String>("role").unwrap(), "lead");
        assert_ne!(replica, employee);
        assert_eq!(employee.replicate(&[]).unwrap(), employee);
        assert!(employee.replicate(&["nickname"]).is_err());
    }

    #[test]
    fn iteration() {
        let employee = Employee::fabricate().unwrap();
        let names = employee.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "employee_id",
                "employee_name",
                "salary",
                "active",
                "hired",
                "manager",
                "role"
            ]
        );
        let mut iter = employee.iter();
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.peek_def().map(|v| v.key), Some("id"));
        iter.next();
        iter.next();
        assert_eq!(iter.next(), Some(("salary", &Value::Float(1000.0))));
        let copy = iter.clone();
        assert_eq!(copy.len(), 4);
        iter.rewind();
        assert_eq!(iter.next().map(|(name, _)| name), Some("employee_id"));
        let mut count = 0;
        for (_, value) in &employee {
            assert!(!matches!(value, Value::Child(..)));
            count += 1;
        }
        assert_eq!(count, 7);
    }

    #[test]
    fn schema_metadata() {
        let schema = Employee::schema();
        assert_eq!(schema.table().full_name(), "staff.employee");
        assert_eq!(schema.attributes().len(), 7);
        let role = schema.attribute("role").unwrap();
        assert_eq!(role.input.kind, InputKind::Select);
        assert_eq!(role.input.values.len(), 2);
        assert!(role.input.required);
        assert!(role.is_column());
        assert!(schema.accessors().getter("active").is_some());
        assert!(schema.accessors().setter("active").is_none());
        assert!(schema.has_primary_key());
        assert!(!LINK.has_primary_key());
        assert!(schema.relations().next().is_none());
    }

    #[test]
    fn name_mapping_cache() {
        static LATE: LazyLock<Schema> = LazyLock::new(|| {
            Schema::builder("late")
                .attribute(AttributeDef::new("code", "late_code", DataType::sql("char(3)")).primary_key())
                .build()
        });
        assert!(!mapping::is_cached(&LATE));
        assert_eq!(mapping::resolve(&LATE, "late_code"), Some("code"));
        assert!(mapping::is_cached(&LATE));
        let first = mapping::name_map(&LATE);
        let second = mapping::name_map(&LATE);
        assert!(std::sync::Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn debug_output() {
        let mut employee = Employee::fabricate().unwrap();
        employee.set_attrib_value("id", 3).unwrap();
        let debug = format!("{employee:?}");
        assert!(debug.starts_with("Model { table: \"staff.employee\", loaded: false, id: Int(3)"));
        assert_eq!(
            employee.raw_array(false).unwrap().to_string(),
            indoc! {r#"
                employee_id = 3, employee_name = "Unnamed", salary = 1000, active = Y, hired = null, manager = null, role = "staff""#}
        );
    }
}
