use redis_lite::{commands::CommandError, key_value_store::DataKind};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_append_command() {
    let env = TestEnv::new();

    let test_cases = vec![
        (TestUtils::append_command("greeting", "Hello"), TestUtils::expected_integer(5)),
        (TestUtils::append_command("greeting", " World"), TestUtils::expected_integer(11)),
        (TestUtils::get_command("greeting"), TestUtils::expected_bulk_string("Hello World")),
    ];

    for (command, expected) in test_cases {
        env.exec_command_ok(command, expected).await;
    }
}

#[tokio::test]
async fn test_handle_append_command_keeps_expiration() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command_with_options("token", "abc", &["EX", "100"]),
        TestUtils::expected_simple_string("OK"),
    )
    .await;
    env.exec_command_ok(TestUtils::append_command("token", "def"), TestUtils::expected_integer(6))
        .await;

    let mut db_guard = env.get_db().await;
    let value = db_guard.store.get("token").unwrap();
    assert!(value.expiration.is_some());
}

#[tokio::test]
async fn test_handle_append_command_invalid() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::lpush_command("fruits", &["kiwi"]),
        TestUtils::expected_integer(1),
    )
    .await;

    env.exec_command_err(
        TestUtils::append_command("fruits", "x"),
        CommandError::WrongType {
            expected: DataKind::String,
            actual: DataKind::List,
        },
    )
    .await;
}
