use std::sync::LazyLock;
use strata::{
    AttributeDef, CreateOption, DataType, Entity, Executor, LoadOption, Record, Schema, Value,
};
use tokio::sync::Mutex;

static TRANSLATION: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("translation")
        .table_schema("i18n")
        .attribute(AttributeDef::new("item", "item_id", DataType::sql("int")).primary_key())
        .attribute(AttributeDef::new("language", "language_code", DataType::sql("char(2)")).primary_key())
        .attribute(AttributeDef::named("title", DataType::sql("varchar(128)")).default(""))
        .attribute(AttributeDef::named("body", DataType::sql("mediumtext")).nullable())
        .build()
});

pub struct Translation;

impl Entity for Translation {
    fn schema() -> &'static Schema {
        &TRANSLATION
    }
}

pub async fn translations<E: Executor>(executor: &mut E) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    // Setup
    Translation::drop_table(executor)
        .await
        .expect("Failed to drop the translation table");
    Translation::create_table(executor)
        .await
        .expect("Failed to create the translation table");

    for (language, title) in [("en", "Chair"), ("it", "Sedia"), ("de", "Stuhl")] {
        let translation = Translation::create(
            executor,
            &Record::new()
                .with("item_id", 7)
                .with("language", language)
                .with("title", title),
            CreateOption::Fail,
        )
        .await
        .expect("Failed to create the translation");
        assert!(translation.is_loaded());
    }

    let mut italian = Translation::load(
        executor,
        &Record::new().with("item", 7).with("language_code", "it"),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the italian translation");
    assert_eq!(italian.get_as::<String>("title").unwrap(), "Sedia");
    assert_eq!(italian.key_names(true).unwrap(), ["item", "language"]);
    assert_eq!(italian.key_names(false).unwrap(), ["item_id", "language_code"]);
    assert_eq!(italian.key_name(false).unwrap(), "item_id");
    assert_eq!(
        italian.key_pairs().unwrap(),
        [("item_id", Value::Int(7)), ("language_code", "it".into())]
    );

    // Same item, other language
    let german = Translation::load(
        executor,
        &Record::new().with("item", 7).with("language", "de"),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the german translation");
    assert_eq!(german.get_as::<String>("title").unwrap(), "Stuhl");

    // Update keyed by both values
    italian
        .set_attrib_value("body", "Sedia in legno")
        .unwrap();
    assert!(italian.save(executor, None, true).await.unwrap());
    let english = Translation::load(
        executor,
        &Record::new().with("item", 7).with("language", "en"),
        LoadOption::NotExistsFail,
    )
    .await
    .expect("Failed to load the english translation");
    assert_eq!(english.get("body").unwrap(), Value::Null);
    italian.reload(executor).await.expect("Failed to reload");
    assert_eq!(
        italian.get_as::<String>("body").unwrap(),
        "Sedia in legno"
    );

    let all = Translation::load_all(executor, "item_id", &Value::Int(7))
        .await
        .expect("Failed to load all the translations");
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|v| v.is_loaded()));

    // Delete one language only
    assert!(italian.delete(executor).await.unwrap());
    let all = Translation::load_all(executor, "item_id", &Value::Int(7))
        .await
        .expect("Failed to load all the translations");
    assert_eq!(all.len(), 2);
    assert!(
        all.iter()
            .all(|v| v.get_as::<String>("language").unwrap() != "it")
    );
}
