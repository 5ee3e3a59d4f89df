#[cfg(test)]
mod tests {
    use strata_core::Driver;
    use strata_memory::MemoryDriver;
    use strata_tests::{execute_tests, init_logs};

    #[tokio::test]
    async fn memory() {
        init_logs();
        let driver = MemoryDriver::new();
        let connection = driver
            .connect("memory://suite?start=1".into())
            .await
            .expect("Could not open the memory database");
        execute_tests(connection).await;
    }
}
