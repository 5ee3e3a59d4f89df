mod customers;
mod keyless;
mod orders;
mod products;
mod translations;

use crate::{
    customers::customers, keyless::keyless, orders::orders, products::products,
    translations::translations,
};
use log::LevelFilter;
use std::env;
use strata::Connection;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

pub async fn execute_tests<C: Connection>(mut connection: C) {
    products(&mut connection).await;
    translations(&mut connection).await;
    keyless(&mut connection).await;
    orders(&mut connection).await;
    customers(&mut connection).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
