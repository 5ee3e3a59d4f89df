use indoc::formatdoc;
use std::sync::LazyLock;
use strata::{
    AttributeDef, CreateOption, DataType, Entity, Executor, JsonOptions, LoadOption, Model, Record,
    Result, Schema, Value, convert,
};
use time::macros::datetime;
use tokio::sync::Mutex;

static ORDER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("sales_order")
        .attribute(AttributeDef::new("id", "order_id", DataType::sql("int")).primary_key())
        .attribute(AttributeDef::named("customer", DataType::sql("varchar(64)")).default(""))
        .attribute(AttributeDef::new("placed", "placed_at", DataType::sql("datetime")).nullable())
        .attribute(
            AttributeDef::named("lines", DataType::children(OrderLine::schema))
                .foreign_key("id", Some("order")),
        )
        .getter("placed", convert::datetime_getter)
        .setter("placed", convert::datetime_setter)
        .build()
});

static ORDER_LINE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("sales_order_line")
        .attribute(AttributeDef::new("id", "line_id", DataType::sql("int")).primary_key())
        .attribute(AttributeDef::new("order", "line_order_id", DataType::sql("int")).default(0))
        .attribute(AttributeDef::named("sku", DataType::sql("varchar(32)")).default(""))
        .attribute(AttributeDef::named("quantity", DataType::sql("smallint")).default(1))
        .build()
});

pub struct Order;

impl Entity for Order {
    fn schema() -> &'static Schema {
        &ORDER
    }
}

pub struct OrderLine;

impl Entity for OrderLine {
    fn schema() -> &'static Schema {
        &ORDER_LINE
    }
}

fn line(sku: &str, quantity: i32) -> Result<Model> {
    let mut result = OrderLine::fabricate()?;
    result
        .set_attrib_value("sku", sku)?
        .set_attrib_value("quantity", quantity)?;
    Ok(result)
}

async fn lines_of<E: Executor>(executor: &mut E, order: i64) -> Vec<Model> {
    OrderLine::load_all(executor, "line_order_id", &order.into())
        .await
        .expect("Failed to load the order lines")
}

pub async fn orders<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    for schema in [Order::schema(), OrderLine::schema()] {
        executor
            .drop_table(schema.table())
            .await
            .expect("Failed to drop the table");
        executor
            .create_table(schema)
            .await
            .expect("Failed to create the table");
    }

    // Create with children
    let lines = vec![line("CH-01", 4).unwrap(), line("TB-02", 1).unwrap()];
    let order = Order::create(
        executor,
        &Record::new()
            .with("customer", "Ann")
            .with("placed", datetime!(2024-03-01 10:30:00))
            .with("lines", lines),
        CreateOption::Fail,
    )
    .await
    .expect("Failed to create the order");
    let id = order.key().unwrap();
    let created = order.get_as::<Vec<Model>>("lines").unwrap();
    assert_eq!(created.len(), 2);
    for line in &created {
        assert!(line.is_loaded());
        assert!(line.key().unwrap() > 0);
        assert_eq!(line.get_as::<i64>("order").unwrap(), id);
    }

    // Load brings the children along
    let mut loaded = Order::load(
        executor,
        &Record::new().with("order_id", id),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the order");
    assert_eq!(loaded.raw_array(false).unwrap(), order.raw_array(false).unwrap());
    let children = loaded.get_as::<Vec<Model>>("lines").unwrap();
    assert_eq!(
        children
            .iter()
            .map(|v| v.get_as::<String>("sku").unwrap())
            .collect::<Vec<_>>(),
        ["CH-01", "TB-02"]
    );
    let first = created[0].key().unwrap();
    let second = created[1].key().unwrap();
    assert_eq!(
        loaded
            .raw_json(
                JsonOptions {
                    pretty: true,
                    skip_nulls: false,
                },
                false
            )
            .unwrap(),
        formatdoc! {r#"
            {{
              "order_id": {id},
              "customer": "Ann",
              "placed_at": "2024-03-01 10:30:00",
              "lines": [
                {first},
                {second}
              ]
            }}"#,
            first = first,
            second = second,
            id = id,
        }
    );
    let iterated = loaded.raw_array(true).unwrap();
    let Some(Value::List(nested)) = iterated.get("lines") else {
        panic!("The iterated view must nest the lines");
    };
    assert_eq!(nested.len(), 2);
    assert!(matches!(&nested[0], Value::Record(v) if v.get("sku") == Some(&Value::Varchar("CH-01".into()))));
    assert!(loaded.sql_object(false).unwrap().get("lines").is_none());

    // Saving cascades to the children
    let mut children = loaded.get_as::<Vec<Model>>("lines").unwrap();
    children[1].set_attrib_value("quantity", 3).unwrap();
    children.push(line("LG-03", 2).unwrap());
    loaded.set_attrib_value("lines", children).unwrap();
    assert!(loaded.save(executor, None, true).await.unwrap());
    let stored = lines_of(executor, id).await;
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[1].get_as::<i32>("quantity").unwrap(), 3);
    assert_eq!(stored[2].get_as::<i64>("order").unwrap(), id);

    // Delete removes the children first
    assert!(loaded.delete(executor).await.unwrap());
    assert!(lines_of(executor, id).await.is_empty());
    assert!(loaded.get_as::<Vec<Model>>("lines").unwrap().is_empty());

    // Children not held in memory are looked up before deleting
    let mut order = Order::create(
        executor,
        &Record::new()
            .with("customer", "Bob")
            .with("lines", vec![line("PN-04", 6).unwrap()]),
        CreateOption::Fail,
    )
    .await
    .expect("Failed to create the order");
    let id = order.key().unwrap();
    order
        .set_attrib_value("lines", Vec::<Model>::new())
        .unwrap();
    assert_eq!(lines_of(executor, id).await.len(), 1);
    assert!(order.delete(executor).await.unwrap());
    assert!(lines_of(executor, id).await.is_empty());
}
