#[cfg(test)]
mod tests {
    use std::sync::LazyLock;
    use strata::{
        AttributeDef, CreateOption, DataType, Entity, LoadOption, Model, Record, Schema, Value,
    };
    use strata_memory::{Call, MemoryConnection};

    static LESSON: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("lesson")
            .table_schema("course")
            .attribute(AttributeDef::new("course", "course_id", DataType::sql("int")).primary_key())
            .attribute(AttributeDef::new("number", "lesson_no", DataType::sql("smallint")).primary_key())
            .attribute(AttributeDef::named("title", DataType::sql("varchar(64)")).default(""))
            .attribute(
                AttributeDef::named("exercises", DataType::children(Exercise::schema))
                    .foreign_key("course", Some("course")),
            )
            .build()
    });

    static EXERCISE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("exercise")
            .table_schema("course")
            .attribute(AttributeDef::new("id", "exercise_id", DataType::sql("int")).primary_key())
            .attribute(AttributeDef::new("course", "exercise_course", DataType::sql("int")).default(0))
            .attribute(AttributeDef::named("prompt", DataType::sql("text")).default(""))
            .build()
    });

    static ENROLMENT: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("enrolment")
            .attribute(AttributeDef::named("student", DataType::sql("int")).default(0))
            .attribute(AttributeDef::named("course", DataType::sql("int")).default(0))
            .attribute(AttributeDef::named("note", DataType::sql("varchar(64)")).nullable())
            .build()
    });

    struct Lesson;
    impl Entity for Lesson {
        fn schema() -> &'static Schema {
            &LESSON
        }
    }

    struct Exercise;
    impl Entity for Exercise {
        fn schema() -> &'static Schema {
            &EXERCISE
        }
    }

    struct Enrolment;
    impl Entity for Enrolment {
        fn schema() -> &'static Schema {
            &ENROLMENT
        }
    }

    fn exercise(prompt: &str) -> Model {
        let mut result = Exercise::fabricate().unwrap();
        result.set_attrib_value("prompt", prompt).unwrap();
        result
    }

    async fn prepared() -> MemoryConnection {
        let mut connection = MemoryConnection::new("cascade", 1, false);
        Lesson::create_table(&mut connection).await.unwrap();
        Exercise::create_table(&mut connection).await.unwrap();
        Enrolment::create_table(&mut connection).await.unwrap();
        connection
    }

    #[tokio::test]
    async fn composite_key_update() {
        let mut connection = prepared().await;
        let mut lesson = Lesson::create(
            &mut connection,
            &Record::new()
                .with("course", 4)
                .with("number", 2)
                .with("title", "Borrowing"),
            CreateOption::Fail,
        )
        .await
        .unwrap();
        connection.clear_calls().await;

        lesson.set_attrib_value("title", "Lifetimes").unwrap();
        assert!(lesson.save(&mut connection, None, true).await.unwrap());
        let calls = connection.calls().await;
        assert_eq!(calls.len(), 1);
        let Call::Update { table, keys, record } = &calls[0] else {
            panic!("Expected a single update, got {calls:?}");
        };
        assert_eq!(table, "course.lesson");
        assert_eq!(
            *keys,
            [
                ("course_id".to_owned(), Value::Int(4)),
                ("lesson_no".to_owned(), Value::Int(2)),
            ]
        );
        assert_eq!(record.names(), ["title"]);
        assert_eq!(record.get("title"), Some(&Value::Varchar("Lifetimes".into())));
    }

    #[tokio::test]
    async fn children_deleted_before_parent() {
        let mut connection = prepared().await;
        let mut lesson = Lesson::create(
            &mut connection,
            &Record::new()
                .with("course", 9)
                .with("number", 1)
                .with("exercises", vec![exercise("Swap two values"), exercise("Split a slice")]),
            CreateOption::Fail,
        )
        .await
        .unwrap();
        let inserts = connection
            .calls()
            .await
            .into_iter()
            .filter(Call::is_insert)
            .map(|v| v.table().to_owned())
            .collect::<Vec<_>>();
        assert_eq!(inserts, ["course.lesson", "course.exercise", "course.exercise"]);
        connection.clear_calls().await;

        assert!(lesson.delete(&mut connection).await.unwrap());
        let calls = connection.calls().await;
        assert!(calls.iter().all(Call::is_delete));
        let tables = calls.iter().map(Call::table).collect::<Vec<_>>();
        assert_eq!(tables, ["course.exercise", "course.exercise", "course.lesson"]);
        assert!(!lesson.is_loaded());
        assert!(connection.rows(Exercise::schema().table()).await.is_empty());
    }

    #[tokio::test]
    async fn children_looked_up_before_delete() {
        let mut connection = prepared().await;
        Lesson::create(
            &mut connection,
            &Record::new()
                .with("course", 11)
                .with("number", 3)
                .with("exercises", vec![exercise("Write a trait")]),
            CreateOption::Fail,
        )
        .await
        .unwrap();
        let mut lesson = Model::fabricate(&LESSON).unwrap();
        lesson
            .assign(&Record::new().with("course", 11).with("number", 3))
            .unwrap();
        connection.clear_calls().await;

        assert!(lesson.delete(&mut connection).await.unwrap());
        let calls = connection.calls().await;
        assert!(matches!(
            &calls[0],
            Call::SelectAll { table, key, value }
                if table == "course.exercise" && key == "exercise_course" && *value == Value::Int(11)
        ));
        assert!(calls[1..].iter().all(Call::is_delete));
        assert_eq!(calls.last().map(Call::table), Some("course.lesson"));
        assert_eq!(lesson.get_as::<Vec<Model>>("exercises").unwrap().len(), 0);
    }

    #[tokio::test]
    async fn keyless_delete_by_values() {
        let mut connection = prepared().await;
        let mut enrolment = Enrolment::create(
            &mut connection,
            &Record::new().with("student", 5).with("course", 9),
            CreateOption::Fail,
        )
        .await
        .unwrap();
        connection.clear_calls().await;

        assert!(enrolment.delete(&mut connection).await.unwrap());
        let calls = connection.calls().await;
        assert_eq!(
            calls,
            [Call::Delete {
                table: "enrolment".into(),
                keys: vec![
                    ("student".into(), Value::Int(5)),
                    ("course".into(), Value::Int(9)),
                ],
            }]
        );
        let missing = Enrolment::load_by_attributes(
            &mut connection,
            &Record::new().with("student", 5),
            LoadOption::NotExistsNew,
        )
        .await
        .unwrap();
        assert!(!missing.is_loaded());
    }
}
