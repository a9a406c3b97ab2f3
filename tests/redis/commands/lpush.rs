use redis_lite::{commands::CommandError, key_value_store::DataKind};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_lpush_command() {
    let env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::rpush_command("letters", &["a", "b", "c"]),
            TestUtils::expected_integer(3),
        ),
        (
            TestUtils::lpush_command("letters", &["x", "y"]),
            TestUtils::expected_integer(5),
        ),
        (
            TestUtils::lrange_command("letters", 0, -1),
            TestUtils::expected_array(&["y", "x", "a", "b", "c"]),
        ),
        (
            TestUtils::lpush_command("fresh", &["1", "2", "3"]),
            TestUtils::expected_integer(3),
        ),
        (
            TestUtils::lrange_command("fresh", 0, -1),
            TestUtils::expected_array(&["3", "2", "1"]),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_ok(command, expected).await;
    }
}

#[tokio::test]
async fn test_handle_lpush_command_invalid() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command("letters", "abc"),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_err(
        TestUtils::lpush_command("letters", &["x"]),
        CommandError::WrongType {
            expected: DataKind::List,
            actual: DataKind::String,
        },
    )
    .await;
}
