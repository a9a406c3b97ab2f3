use std::time::Duration;

use redis_lite::{
    arguments::ArgumentError,
    commands::CommandError,
    key_value_store::DataKind,
};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_blpop_command_immediate() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::rpush_command("grape", &["mango", "kiwi"]),
        TestUtils::expected_integer(2),
    )
    .await;

    env.exec_command_ok(
        TestUtils::blpop_command("grape", "0"),
        TestUtils::expected_array(&["grape", "mango"]),
    )
    .await;

    assert_eq!(env.waiter_count("grape").await, 0);
    env.exec_command_ok(TestUtils::llen_command("grape"), TestUtils::expected_integer(1))
        .await;
}

#[tokio::test]
async fn test_handle_blpop_command_timeout() {
    let env = TestEnv::new();

    env.exec_command_ok(TestUtils::blpop_command("grape", "0.05"), TestUtils::expected_null())
        .await;

    assert_eq!(env.waiter_count("grape").await, 0);
}

#[tokio::test]
async fn test_handle_blpop_command_invalid() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command("grape", "mango"),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    let test_cases = vec![
        (
            TestUtils::blpop_command("grape", "1"),
            CommandError::WrongType {
                expected: DataKind::List,
                actual: DataKind::String,
            },
        ),
        (
            TestUtils::blpop_command("fruits", "-1"),
            CommandError::InvalidTimeout,
        ),
        (
            TestUtils::blpop_command("fruits", "inf"),
            CommandError::InvalidTimeout,
        ),
        (
            TestUtils::blpop_command("fruits", "soon"),
            CommandError::InvalidArguments(ArgumentError::InvalidValue {
                field: "timeout",
                value: "soon".to_string(),
                expected: "a number",
            }),
        ),
        (
            TestUtils::command(&["BLPOP", "fruits", "vegetables", "1"]),
            CommandError::UnsupportedMultipleKeys,
        ),
        (
            TestUtils::command(&["BLPOP", "fruits"]),
            CommandError::InvalidArguments(ArgumentError::NotEnoughArguments {
                required: 2,
                provided: 1,
            }),
        ),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_err(command, expected_error).await;
    }

    assert_eq!(env.waiter_count("fruits").await, 0);
}

#[tokio::test]
async fn test_handle_blpop_command_woken_by_lpush() {
    let env = TestEnv::new();

    let task = TestUtils::spawn_blpop_task(&env, "queue", "0", TestUtils::context(1));
    TestUtils::wait_for_waiters(&env, "queue", 1).await;

    env.exec_command_ok(
        TestUtils::lpush_command("queue", &["job"]),
        TestUtils::expected_integer(1),
    )
    .await;

    assert_eq!(
        TestUtils::wait_for_completion(task, Duration::from_secs(2)).await,
        Ok(TestUtils::expected_array(&["queue", "job"]))
    );
    assert!(env.get_db().await.store.is_empty());
}
