use redis_lite::commands::CommandError;

use crate::test_utils::{TestEnv, TestUtils};

#[tokio::test]
async fn test_handle_unknown_command() {
    let env = TestEnv::new();

    let test_cases = vec![
        (
            TestUtils::command(&["FLUSHALL"]),
            CommandError::UnknownCommand("FLUSHALL".to_string()),
        ),
        (
            TestUtils::command(&["xadd", "stream", "*"]),
            CommandError::UnknownCommand("xadd".to_string()),
        ),
    ];

    for (command, expected_error) in test_cases {
        env.exec_command_err(command, expected_error).await;
    }
}

#[tokio::test]
async fn test_error_reply_names_the_command() {
    let env = TestEnv::new();

    let error = env
        .exec_command(TestUtils::command(&["llen"]), &TestUtils::context(7))
        .await
        .unwrap_err();

    assert_eq!(error.command, "LLEN");
    assert_eq!(
        error.as_resp(),
        redis_lite::resp::RespValue::SimpleError(
            "ERR error while handling command `LLEN`: wrong number of arguments: expected at least 1, got 0"
                .to_string()
        )
    );
}
