#[cfg(test)]
mod tests {
    use std::sync::LazyLock;
    use strata_core::{
        AttributeDef, Connection, DataType, Executor, ModelError, Record, Schema, TableRef, Value,
        stream::TryStreamExt,
    };
    use strata_memory::{Call, MemoryConnection, matches_value};
    use strata_tests::{init_logs, silent_logs};

    static COUNTER: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("counter")
            .attribute(AttributeDef::named("id", DataType::sql("int")).primary_key())
            .attribute(AttributeDef::named("label", DataType::sql("varchar(16)")).default(""))
            .build()
    });

    #[tokio::test]
    async fn url_parameters() {
        init_logs();
        let connection = MemoryConnection::connect("memory://alpha?start=100&read_only=true".into())
            .await
            .expect("Could not open the memory database");
        assert_eq!(connection.label(), "alpha");
        assert!(connection.is_read_only());

        let connection = MemoryConnection::connect("memory://beta".into())
            .await
            .expect("Could not open the memory database");
        assert_eq!(connection.label(), "beta");
        assert!(!connection.is_read_only());
    }

    #[tokio::test]
    async fn wrong_url() {
        init_logs();
        silent_logs! {
            assert!(
                MemoryConnection::connect("postgres://localhost".into())
                    .await
                    .is_err()
            );
            assert!(
                MemoryConnection::connect("memory://gamma?start=first".into())
                    .await
                    .is_err()
            );
            assert!(
                MemoryConnection::connect("memory://gamma?read_only=perhaps".into())
                    .await
                    .is_err()
            );
        }
    }

    #[tokio::test]
    async fn generated_keys() {
        init_logs();
        let mut connection = MemoryConnection::connect("memory://keys?start=100".into())
            .await
            .expect("Could not open the memory database");
        connection
            .create_table(&COUNTER)
            .await
            .expect("Could not create the table");
        let table = COUNTER.table();
        let first = connection
            .insert(table, &Record::new().with("label", "first"))
            .await
            .expect("Could not insert");
        assert_eq!(first.rows_affected, 1);
        assert_eq!(first.new_key(), Some(100));
        let second = connection
            .insert(table, &Record::new().with("label", "second"))
            .await
            .expect("Could not insert");
        assert_eq!(second.new_key(), Some(101));
        let explicit = connection
            .insert(table, &Record::new().with("id", 200).with("label", "third"))
            .await
            .expect("Could not insert");
        assert_eq!(explicit.new_key(), None);
        let next = connection
            .insert(table, &Record::new().with("label", "fourth"))
            .await
            .expect("Could not insert");
        assert_eq!(next.new_key(), Some(201));

        silent_logs! {
            let error = connection
                .insert(table, &Record::new().with("id", 100).with("label", "again"))
                .await
                .expect_err("Duplicate key must fail");
            assert!(matches!(
                ModelError::of(&error),
                Some(ModelError::Duplicate { .. })
            ));
        }
        assert_eq!(connection.rows(table).await.len(), 4);

        let last = connection
            .insert(table, &Record::new().with("id", i64::MAX).with("label", "last"))
            .await
            .expect("Could not insert the highest key");
        assert_eq!(last.rows_affected, 1);
        silent_logs! {
            let error = connection
                .insert(table, &Record::new().with("label", "overflow"))
                .await
                .expect_err("No key is left to generate");
            assert!(matches!(
                ModelError::of(&error),
                Some(ModelError::Database(..))
            ));
        }
        assert_eq!(connection.rows(table).await.len(), 5);
    }

    #[tokio::test]
    async fn null_values() {
        init_logs();
        let mut connection = MemoryConnection::default();
        let table = TableRef::new("loose");
        connection
            .insert(
                &table,
                &Record::new().with("a", 1).with("b", Value::SqlNull),
            )
            .await
            .expect("Could not insert");
        let row = connection
            .select(&table, &[("a", Value::Int(1))])
            .await
            .expect("Could not select")
            .expect("Row not found");
        assert_eq!(row.get("b"), Some(&Value::Null));
        let row = connection
            .select(&table, &[("b", Value::SqlNull)])
            .await
            .expect("Could not select");
        assert!(row.is_some());
        assert!(matches_value(&Value::Int(7), &Value::Varchar("7".into())));
        assert!(!matches_value(&Value::Null, &Value::Varchar("".into())));
    }

    #[tokio::test]
    async fn read_only() {
        init_logs();
        let mut connection = MemoryConnection::connect("memory://frozen?read_only=1".into())
            .await
            .expect("Could not open the memory database");
        let table = TableRef::new("frozen_table");
        silent_logs! {
            assert!(
                connection
                    .insert(&table, &Record::new().with("a", 1))
                    .await
                    .is_err()
            );
            assert!(connection.delete(&table, &[("a", Value::Int(1))]).await.is_err());
        }
        assert!(connection.rows(&table).await.is_empty());
    }

    #[tokio::test]
    async fn calls_and_sharing() {
        init_logs();
        let mut connection = MemoryConnection::default();
        let observer = connection.clone();
        let table = TableRef::new("shared");
        connection
            .insert(&table, &Record::new().with("k", 1).with("v", "x"))
            .await
            .expect("Could not insert");
        connection
            .insert(&table, &Record::new().with("k", 1).with("v", "y"))
            .await
            .expect("Could not insert");
        let rows = connection
            .select_all(&table, "k", &Value::Int(1))
            .try_collect::<Vec<_>>()
            .await
            .expect("Could not select");
        assert_eq!(rows.len(), 2);
        let affected = connection
            .update(&table, &[("v", "y".into())], &Record::new().with("v", "z"))
            .await
            .expect("Could not update");
        assert_eq!(affected.rows_affected, 1);
        let affected = connection
            .delete(&table, &[("k", Value::Int(1))])
            .await
            .expect("Could not delete");
        assert_eq!(affected.rows_affected, 2);

        let calls = observer.calls().await;
        assert_eq!(calls.len(), 5);
        assert!(calls[0].is_insert());
        assert!(matches!(&calls[2], Call::SelectAll { key, .. } if key == "k"));
        assert!(calls[3].is_update());
        assert!(calls[4].is_delete());
        assert!(calls.iter().all(|v| v.table() == "shared"));
        assert!(observer.rows(&table).await.is_empty());
        observer.clear_calls().await;
        assert!(connection.calls().await.is_empty());
    }
}
