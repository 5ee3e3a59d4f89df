use std::sync::LazyLock;
use strata::{
    AttributeDef, CreateOption, DataType, Entity, Executor, Flag, LoadOption, Model, Record,
    Result, Schema, Value, convert,
};
use time::{Date, macros::date};
use tokio::sync::Mutex;

static CUSTOMER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("customer")
        .attribute(AttributeDef::new("id", "customer_id", DataType::sql("bigint")).primary_key())
        .attribute(AttributeDef::named("email", DataType::sql("varchar(128)")).default(""))
        .attribute(AttributeDef::new("first_name", "firstname", DataType::sql("varchar(64)")).default(""))
        .attribute(AttributeDef::new("last_name", "lastname", DataType::sql("varchar(64)")).default(""))
        .attribute(AttributeDef::named("newsletter", DataType::sql("enum('Y','N')")).default(false))
        .attribute(AttributeDef::named("birthday", DataType::sql("date")).nullable())
        .attribute(AttributeDef::named("display_name", DataType::sql("varchar(130)")).default("").dynamic())
        .attribute(
            AttributeDef::named("address", DataType::child(Address::schema))
                .foreign_key("id", Some("customer")),
        )
        .getter("newsletter", convert::flag_getter)
        .getter("birthday", convert::date_getter)
        .setter("birthday", convert::date_setter)
        .on_instantiate(display_name)
        .build()
});

static ADDRESS: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("customer_address")
        .attribute(AttributeDef::new("id", "address_id", DataType::sql("bigint")).primary_key())
        .attribute(AttributeDef::new("customer", "customer_id", DataType::sql("bigint")).default(0))
        .attribute(AttributeDef::named("city", DataType::sql("varchar(64)")).default(""))
        .attribute(AttributeDef::named("zip", DataType::sql("varchar(10)")).default(""))
        .build()
});

pub struct Customer;

impl Entity for Customer {
    fn schema() -> &'static Schema {
        &CUSTOMER
    }
}

pub struct Address;

impl Entity for Address {
    fn schema() -> &'static Schema {
        &ADDRESS
    }
}

fn display_name(model: &mut Model) -> Result<()> {
    let first = model.get_as::<String>("first_name")?;
    let last = model.get_as::<String>("last_name")?;
    model.set_attrib_value("display_name", format!("{first} {last}").trim().to_owned())?;
    Ok(())
}

pub async fn customers<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    for schema in [Customer::schema(), Address::schema()] {
        executor
            .drop_table(schema.table())
            .await
            .expect("Failed to drop the table");
        executor
            .create_table(schema)
            .await
            .expect("Failed to create the table");
    }

    let mut address = Address::fabricate().unwrap();
    address
        .set_attrib_value("city", "Trieste")
        .unwrap()
        .set_attrib_value("zip", "34121")
        .unwrap();
    let customer = Customer::create(
        executor,
        &Record::new()
            .with("email", "ada@example.com")
            .with("firstname", "Ada")
            .with("lastname", "Byron")
            .with("newsletter", "Y")
            .with("birthday", "1815-12-10")
            .with("address", address),
        CreateOption::Fail,
    )
    .await
    .expect("Failed to create the customer");
    assert_eq!(
        customer.get_as::<String>("display_name").unwrap(),
        "Ada Byron"
    );
    let projection = customer.sql_object(false).unwrap();
    assert!(!projection.contains("display_name"));
    assert!(!projection.contains("address"));
    assert_eq!(projection.get("newsletter"), Some(&Value::Flag(Flag::Yes)));

    // Lookup by email, with the child and the derived name
    let loaded = Customer::load_by_attributes(
        executor,
        &Record::new().with("email", "ada@example.com"),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the customer by email");
    assert!(loaded.is_loaded());
    assert_eq!(loaded.key().unwrap(), customer.key().unwrap());
    assert_eq!(loaded.get("newsletter").unwrap(), Value::Boolean(true));
    assert_eq!(loaded.get_as::<Date>("birthday").unwrap(), date!(1815 - 12 - 10));
    assert_eq!(
        loaded.get_as::<String>("display_name").unwrap(),
        "Ada Byron"
    );
    let address = loaded.get_as::<Model>("address").unwrap();
    assert!(address.is_loaded());
    assert_eq!(address.get_as::<String>("city").unwrap(), "Trieste");
    assert_eq!(
        address.get_as::<i64>("customer").unwrap(),
        loaded.key().unwrap()
    );

    // Replica saved as a new customer with its own address
    let mut replica = loaded.replicate(&["id", "email"]).unwrap();
    assert!(!replica.is_loaded());
    assert_eq!(replica.get_as::<String>("email").unwrap(), "");
    assert_eq!(replica.get_as::<String>("firstname").unwrap(), "Ada");
    replica
        .set_attrib_value("email", "ada.twin@example.com")
        .unwrap();
    assert!(replica.save(executor, None, true).await.unwrap());
    assert_ne!(replica.key().unwrap(), loaded.key().unwrap());
    let addresses = Address::load_all(executor, "city", &"Trieste".into())
        .await
        .expect("Failed to load the addresses");
    assert_eq!(addresses.len(), 2);
    assert_eq!(
        addresses[1].get_as::<i64>("customer").unwrap(),
        replica.key().unwrap()
    );

    // Unset nullable values and missing children
    let bare = Customer::create(
        executor,
        &Record::new().with("email", "nobody@example.com"),
        CreateOption::Fail,
    )
    .await
    .expect("Failed to create the customer");
    assert_eq!(bare.get("birthday").unwrap(), Value::Null);
    assert_eq!(bare.get("newsletter").unwrap(), Value::Boolean(false));
    let bare = Customer::load(
        executor,
        &Record::new().with("customer_id", bare.key().unwrap()),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the customer");
    assert_eq!(bare.get("address").unwrap(), Value::Null);
    assert_eq!(bare.get_as::<String>("display_name").unwrap(), "");
}
