use redis_lite::{
    arguments::ArgumentError,
    commands::CommandError,
    key_value_store::DataKind,
};

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_set_command() {
    let env = TestEnv::new();

    let test_cases = vec![
        (TestUtils::set_command("grape", "mango"), TestUtils::expected_simple_string("OK")),
        (TestUtils::get_command("grape"), TestUtils::expected_bulk_string("mango")),
        (TestUtils::set_command("grape", "kiwi"), TestUtils::expected_simple_string("OK")),
        (TestUtils::get_command("grape"), TestUtils::expected_bulk_string("kiwi")),
    ];

    for (command, expected) in test_cases {
        env.exec_command_ok(command, expected).await;
    }
}

#[tokio::test]
async fn test_handle_set_command_conditions() {
    let env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::set_command_with_options("fruit", "pear", &["XX"]),
            TestUtils::expected_null(),
        ),
        (TestUtils::get_command("fruit"), TestUtils::expected_null()),
        (
            TestUtils::set_command_with_options("fruit", "pear", &["nx"]),
            TestUtils::expected_simple_string("OK"),
        ),
        (
            TestUtils::set_command_with_options("fruit", "plum", &["NX"]),
            TestUtils::expected_null(),
        ),
        (
            TestUtils::set_command_with_options("fruit", "plum", &["XX"]),
            TestUtils::expected_simple_string("OK"),
        ),
        (TestUtils::get_command("fruit"), TestUtils::expected_bulk_string("plum")),
    ];

    for (command, expected) in test_cases {
        env.exec_command_ok(command, expected).await;
    }
}

#[tokio::test]
async fn test_handle_set_command_get_option() {
    let env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::set_command_with_options("fruit", "pear", &["GET"]),
            TestUtils::expected_null(),
        ),
        (
            TestUtils::set_command_with_options("fruit", "plum", &["GET"]),
            TestUtils::expected_bulk_string("pear"),
        ),
        (
            TestUtils::set_command_with_options("fruit", "fig", &["NX", "GET"]),
            TestUtils::expected_null(),
        ),
        (TestUtils::get_command("fruit"), TestUtils::expected_bulk_string("plum")),
    ];

    for (command, expected) in test_cases {
        env.exec_command_ok(command, expected).await;
    }
}

#[tokio::test]
async fn test_handle_set_command_get_option_on_list() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::rpush_command("fruits", &["kiwi"]),
        TestUtils::expected_integer(1),
    )
    .await;

    env.exec_command_err(
        TestUtils::set_command_with_options("fruits", "pear", &["GET"]),
        CommandError::WrongType {
            expected: DataKind::String,
            actual: DataKind::List,
        },
    )
    .await;

    env.exec_command_ok(TestUtils::llen_command("fruits"), TestUtils::expected_integer(1))
        .await;

    env.exec_command_ok(
        TestUtils::set_command("fruits", "pear"),
        TestUtils::expected_simple_string("OK"),
    )
    .await;
    env.exec_command_ok(
        TestUtils::type_command("fruits"),
        TestUtils::expected_simple_string("string"),
    )
    .await;
}

#[tokio::test]
async fn test_handle_set_command_with_expiration() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command_with_options("grape", "mango", &["px", "100"]),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_ok(
        TestUtils::get_command("grape"),
        TestUtils::expected_bulk_string("mango"),
    )
    .await;

    TestUtils::sleep_ms(150).await;

    env.exec_command_ok(TestUtils::get_command("grape"), TestUtils::expected_null())
        .await;
}

#[tokio::test]
async fn test_handle_set_command_keepttl() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command_with_options("session", "a", &["EX", "100"]),
        TestUtils::expected_simple_string("OK"),
    )
    .await;
    let original = env.get_db().await.store.get("session").unwrap().expiration;

    env.exec_command_ok(
        TestUtils::set_command_with_options("session", "b", &["KEEPTTL"]),
        TestUtils::expected_simple_string("OK"),
    )
    .await;
    assert_eq!(env.get_db().await.store.get("session").unwrap().expiration, original);

    env.exec_command_ok(
        TestUtils::set_command("session", "c"),
        TestUtils::expected_simple_string("OK"),
    )
    .await;
    assert_eq!(env.get_db().await.store.get("session").unwrap().expiration, None);
}

#[tokio::test]
async fn test_handle_set_command_non_positive_expiration() {
    let env = TestEnv::new();

    env.exec_command_ok(
        TestUtils::set_command_with_options("gone", "x", &["EX", "0"]),
        TestUtils::expected_simple_string("OK"),
    )
    .await;

    env.exec_command_ok(TestUtils::get_command("gone"), TestUtils::expected_null())
        .await;
}

#[tokio::test]
async fn test_handle_set_command_invalid() {
    let env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::command(&["SET", "key"]),
            CommandError::InvalidArguments(ArgumentError::NotEnoughArguments {
                required: 2,
                provided: 1,
            }),
        ),
        (
            TestUtils::set_command_with_options("key", "value", &["PX"]),
            CommandError::InvalidArguments(ArgumentError::MissingValue { keyword: "PX" }),
        ),
        (
            TestUtils::set_command_with_options("key", "value", &["PX", "soon"]),
            CommandError::InvalidArguments(ArgumentError::InvalidValue {
                field: "milliseconds",
                value: "soon".to_string(),
                expected: "an integer",
            }),
        ),
        (
            TestUtils::set_command_with_options("key", "value", &["NX", "XX"]),
            CommandError::InvalidArguments(ArgumentError::ConflictingKeywords {
                group: "condition",
                first: "NX",
                second: "XX",
            }),
        ),
        (
            TestUtils::set_command_with_options("key", "value", &["EX", "1", "KEEPTTL"]),
            CommandError::InvalidArguments(ArgumentError::ConflictingKeywords {
                group: "expire",
                first: "EX",
                second: "KEEPTTL",
            }),
        ),
        (
            TestUtils::set_command_with_options("key", "value", &["GET", "get"]),
            CommandError::InvalidArguments(ArgumentError::DuplicateKeyword {
                token: "get".to_string(),
                index: 4,
            }),
        ),
        (
            TestUtils::set_command_with_options("key", "value", &["FOREVER"]),
            CommandError::InvalidArguments(ArgumentError::UnknownKeyword {
                token: "FOREVER".to_string(),
                index: 3,
            }),
        ),
        (
            TestUtils::set_command_with_options("key", "value", &["EXAT", "99999999999999999"]),
            CommandError::InvalidExpireTime,
        ),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_err(command, expected_error).await;
    }

    assert!(env.get_db().await.store.is_empty());
}
