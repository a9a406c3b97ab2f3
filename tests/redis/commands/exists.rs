use redis_lite::{arguments::ArgumentError, commands::CommandError};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_exists_command() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command("grape", "mango"),
        TestUtils::expected_simple_string("OK"),
    )
    .await;
    env.exec_command_ok(
        TestUtils::rpush_command("fruits", &["kiwi"]),
        TestUtils::expected_integer(1),
    )
    .await;
    env.exec_command_ok(
        TestUtils::set_command_with_options("stale", "x", &["PX", "0"]),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    let test_cases = vec![
        (TestUtils::exists_command(&["grape"]), TestUtils::expected_integer(1)),
        (TestUtils::exists_command(&["missing"]), TestUtils::expected_integer(0)),
        (TestUtils::exists_command(&["stale"]), TestUtils::expected_integer(0)),
        (
            TestUtils::exists_command(&["grape", "fruits", "missing", "grape"]),
            TestUtils::expected_integer(3),
        ),
    ];

    for (command, expected) in test_cases {
        env.exec_command_ok(command, expected).await;
    }

    env.exec_command_err(
        TestUtils::exists_command(&[]),
        CommandError::InvalidArguments(ArgumentError::NotEnoughArguments {
            required: 1,
            provided: 0,
        }),
    )
    .await;
}
