use std::sync::LazyLock;
use strata::{
    AttributeDef, CreateOption, DataType, Entity, Executor, LoadOption, ModelError, Record, Schema,
};
use tokio::sync::Mutex;

/// Junction rows, identified only by their values.
static PRODUCT_TAG: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("product_tag")
        .attribute(AttributeDef::new("product", "product_id", DataType::sql("int")).default(0))
        .attribute(AttributeDef::named("tag", DataType::sql("varchar(32)")).default(""))
        .attribute(AttributeDef::named("weight", DataType::sql("smallint")).nullable())
        .build()
});

pub struct ProductTag;

impl Entity for ProductTag {
    fn schema() -> &'static Schema {
        &PRODUCT_TAG
    }
}

fn is_no_primary_key(error: &strata::Error) -> bool {
    matches!(
        ModelError::of(error),
        Some(ModelError::NoPrimaryKey { .. })
    )
}

pub async fn keyless<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    ProductTag::drop_table(executor)
        .await
        .expect("Failed to drop the product_tag table");
    ProductTag::create_table(executor)
        .await
        .expect("Failed to create the product_tag table");

    let mut tag = ProductTag::create(
        executor,
        &Record::new().with("product", 3).with("tag", "outdoor"),
        CreateOption::Fail,
    )
    .await
    .expect("Failed to create the tag");
    assert!(tag.is_loaded());
    ProductTag::create(
        executor,
        &Record::new()
            .with("product", 3)
            .with("tag", "garden")
            .with("weight", 2),
        CreateOption::Fail,
    )
    .await
    .expect("Failed to create the tag");

    // Identity is not available
    assert!(is_no_primary_key(&tag.key_name(true).unwrap_err()));
    assert!(is_no_primary_key(&tag.key().unwrap_err()));
    assert!(is_no_primary_key(&tag.key_pairs().unwrap_err()));
    let error = tag
        .save(executor, None, true)
        .await
        .expect_err("Updating a keyless row must fail");
    assert!(is_no_primary_key(&error));
    let mut unsaved = ProductTag::fabricate().unwrap();
    let error = unsaved
        .delete(executor)
        .await
        .expect_err("Deleting an unloaded keyless row must fail");
    assert!(is_no_primary_key(&error));

    // Lookup by the supplied attributes
    let garden = ProductTag::load(
        executor,
        &Record::new().with("product_id", 3).with("tag", "garden"),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the garden tag");
    assert!(garden.is_loaded());
    assert_eq!(garden.get_as::<i32>("weight").unwrap(), 2);
    let first = ProductTag::load_by_attributes(
        executor,
        &Record::new().with("product", 3),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load by attributes");
    assert_eq!(first.get_as::<String>("tag").unwrap(), "outdoor");
    let error = ProductTag::load_by_attributes(
        executor,
        &Record::new().with("colour", "red"),
        LoadOption::NotExistsNew,
    )
    .await
    .expect_err("Unknown attributes cannot filter");
    assert!(matches!(
        ModelError::of(&error),
        Some(ModelError::InvalidParameter(..))
    ));

    // Delete by every stored value
    assert!(tag.delete(executor).await.expect("Failed to delete the tag"));
    let gone = ProductTag::load_by_attributes(
        executor,
        &Record::new().with("product", 3).with("tag", "outdoor"),
        LoadOption::NotExistsNew,
    )
    .await
    .expect("Failed to load by attributes");
    assert!(!gone.is_loaded());
    let left = ProductTag::load_all(executor, "product_id", &3.into())
        .await
        .expect("Failed to load all the tags");
    assert_eq!(left.len(), 1);
}
