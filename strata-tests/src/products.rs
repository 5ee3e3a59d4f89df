use std::sync::LazyLock;
use strata::{
    AttributeDef, CreateOption, DataType, Entity, Executor, Flag, LoadOption, ModelError, Record,
    Schema, Value, convert,
};
use time::{Date, macros::date};
use tokio::sync::Mutex;

static PRODUCT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("product")
        .attribute(AttributeDef::new("id", "product_id", DataType::sql("int(11) unsigned")).primary_key())
        .attribute(AttributeDef::new("name", "product_name", DataType::sql("varchar(64)")).default(""))
        .attribute(AttributeDef::new("price", "product_price", DataType::sql("double")).default(0.0))
        .attribute(AttributeDef::new("in_stock", "product_in_stock", DataType::sql("flag")).default(Flag::No))
        .attribute(AttributeDef::new("added", "product_added", DataType::sql("date")).nullable())
        .attribute(AttributeDef::named("notes", DataType::sql("text")).nullable())
        .getter("in_stock", convert::flag_getter)
        .getter("added", convert::date_getter)
        .setter("added", convert::date_setter)
        .build()
});

pub struct Product;

impl Entity for Product {
    fn schema() -> &'static Schema {
        &PRODUCT
    }
}

pub async fn products<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    Product::drop_table(executor)
        .await
        .expect("Failed to drop the product table");
    Product::create_table(executor)
        .await
        .expect("Failed to create the product table");

    // Create
    let widget = Product::create(
        executor,
        &Record::new()
            .with("product_name", "Widget")
            .with("price", 9.5)
            .with("in_stock", true)
            .with("added", date!(2024 - 01 - 05)),
        CreateOption::Fail,
    )
    .await
    .expect("Failed to create the widget");
    assert!(widget.is_loaded());
    let id = widget.key().expect("The widget must have a key");
    assert!(id > 0);
    assert_eq!(widget.get("in_stock").unwrap(), Value::Boolean(true));
    assert_eq!(widget.stored("in_stock").unwrap(), &Value::Flag(Flag::Yes));
    assert_eq!(widget.get_as::<Date>("added").unwrap(), date!(2024 - 01 - 05));
    assert_eq!(widget.get("notes").unwrap(), Value::Null);

    // Load by key
    let loaded = Product::load(
        executor,
        &Record::new().with("id", id),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the widget");
    assert!(loaded.is_loaded());
    assert_eq!(loaded.raw_array(false).unwrap(), widget.raw_array(false).unwrap());
    assert_eq!(loaded.get_as::<String>("product_name").unwrap(), "Widget");
    assert_eq!(loaded.get_as::<f64>("price").unwrap(), 9.5);

    // Missing rows
    let missing = Product::load(
        executor,
        &Record::new().with("id", id + 1000).with("name", "Ghost"),
        LoadOption::NotExistsNew,
    )
    .await
    .expect("Failed to load a missing product");
    assert!(!missing.is_loaded());
    assert_eq!(missing.get_as::<String>("name").unwrap(), "Ghost");
    let error = Product::load(
        executor,
        &Record::new().with("id", id + 1000),
        LoadOption::NotExistsFail,
    )
    .await
    .expect_err("Loading a missing product must fail");
    assert!(matches!(
        ModelError::of(&error),
        Some(ModelError::NotFound { .. })
    ));
    let keyless = Product::load(executor, &Record::new(), LoadOption::NotExistsNew)
        .await
        .expect("Failed to load without key");
    assert!(!keyless.is_loaded());
    let gadget = Product::load(
        executor,
        &Record::new().with("id", id + 50).with("name", "Gadget"),
        LoadOption::NotExistsCreate,
    )
    .await
    .expect("Failed to create the gadget on load");
    assert!(gadget.is_loaded());
    assert_eq!(gadget.key().unwrap(), id + 50);

    // Update
    let mut widget = widget;
    widget
        .set_attrib_value("price", 12.25)
        .unwrap()
        .set_attrib_value("notes", "Restocked monthly")
        .unwrap();
    assert!(
        widget
            .save(executor, None, true)
            .await
            .expect("Failed to save the widget")
    );
    let mut other = Product::load(
        executor,
        &Record::new().with("id", id),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the widget again");
    assert_eq!(other.get_as::<f64>("price").unwrap(), 12.25);
    assert_eq!(
        other.get_as::<String>("notes").unwrap(),
        "Restocked monthly"
    );

    // Partial save, only the name is written
    other.set_attrib_value("name", "Widget Pro").unwrap();
    other.set_attrib_value("price", 99).unwrap();
    assert!(
        other
            .save(executor, Some(&["name"][..]), false)
            .await
            .expect("Failed to save the widget partially")
    );
    widget
        .reload(executor)
        .await
        .expect("Failed to reload the widget");
    assert_eq!(widget.get_as::<String>("name").unwrap(), "Widget Pro");
    assert_eq!(widget.get_as::<f64>("price").unwrap(), 12.25);

    // Nullable values become null again
    widget.set_attrib_value("notes", Value::Null).unwrap();
    assert!(widget.save(executor, None, false).await.unwrap());
    other.reload(executor).await.expect("Failed to reload");
    assert_eq!(other.get("notes").unwrap(), Value::Null);
    assert_eq!(
        widget.sql_object(false).unwrap().get("notes"),
        Some(&Value::SqlNull)
    );

    // Duplicates
    let duplicate = Record::new().with("id", id).with("name", "Clone");
    let mut failure = None;
    crate::silent_logs! {
        failure = Product::create(executor, &duplicate, CreateOption::Fail)
            .await
            .err();
    }
    let error = failure.expect("A duplicate key must fail");
    assert!(matches!(
        ModelError::of(&error),
        Some(ModelError::Duplicate { .. })
    ));
    let ignored = Product::create(executor, &duplicate, CreateOption::IgnoreOnFailure)
        .await
        .expect("An ignored failure must not fail");
    assert!(!ignored.is_loaded());
    let updated = Product::create(executor, &duplicate, CreateOption::UpdateOnExists)
        .await
        .expect("Failed to update the existing product");
    assert!(updated.is_loaded());
    widget.reload(executor).await.expect("Failed to reload");
    assert_eq!(widget.get_as::<String>("name").unwrap(), "Clone");

    // Delete
    assert!(widget.delete(executor).await.expect("Failed to delete"));
    assert!(!widget.is_loaded());
    assert!(!widget.delete(executor).await.expect("Failed to delete again"));
    let error = widget
        .reload(executor)
        .await
        .expect_err("Reloading a deleted product must fail");
    assert!(matches!(
        ModelError::of(&error),
        Some(ModelError::NotFound { .. })
    ));
    let mut unsaved = Product::fabricate().unwrap();
    assert!(!unsaved.delete(executor).await.unwrap());
}
