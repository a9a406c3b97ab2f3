use std::{sync::Arc, time::Duration};

use bytes::BytesMut;
use redis_lite::{
    commands::{CommandContext, CommandError, CommandHandler, HandleCommandError},
    database::{Database, SharedDatabase},
    input::read_and_parse_resp,
    resp::RespValue,
    server::serve,
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    task::JoinHandle,
    time::timeout,
};
use tokio_util::sync::CancellationToken;

/// Test utilities for simplifying Redis command tests
pub struct TestUtils;

/// Test environment holding the shared database
#[derive(Clone)]
pub struct TestEnv {
    pub db: SharedDatabase,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            db: Database::shared(),
        }
    }

    /// Execute a command on behalf of the given client and return the result
    pub async fn exec_command(
        &self,
        command: RespValue,
        context: &CommandContext,
    ) -> Result<RespValue, HandleCommandError> {
        let command_handler =
            CommandHandler::new(command).map_err(|e| HandleCommandError::new("", e))?;

        command_handler
            .handle_command(Arc::clone(&self.db), context)
            .await
    }

    /// Execute a command and assert it succeeds with expected result
    pub async fn exec_command_ok(&self, command: RespValue, expected_response: RespValue) {
        let result = self
            .exec_command(command.clone(), &TestUtils::context(1))
            .await;

        assert_eq!(result, Ok(expected_response), "executing {:?}", command);
    }

    /// Execute a command and assert it fails with the expected error
    pub async fn exec_command_err(&self, command: RespValue, expected_error: CommandError) {
        let result = self
            .exec_command(command.clone(), &TestUtils::context(1))
            .await;

        assert_eq!(
            result.map_err(|e| e.source),
            Err(expected_error),
            "executing {:?}",
            command
        );
    }

    /// Get a reference to the database for inspection
    pub async fn get_db(&self) -> tokio::sync::MutexGuard<'_, Database> {
        self.db.lock().await
    }

    /// Number of clients currently blocked on the key
    pub async fn waiter_count(&self, key: &str) -> usize {
        self.get_db().await.state.waiter_count(key)
    }
}

impl TestUtils {
    /// Build a request from its tokens
    pub fn command(tokens: &[&str]) -> RespValue {
        RespValue::array_of_bulk_strings(tokens.iter().copied())
    }

    pub fn context(client_id: u64) -> CommandContext {
        CommandContext::new(client_id, CancellationToken::new())
    }

    pub fn ping_command() -> RespValue {
        Self::command(&["PING"])
    }

    pub fn echo_command(message: &str) -> RespValue {
        Self::command(&["ECHO", message])
    }

    pub fn get_command(key: &str) -> RespValue {
        Self::command(&["GET", key])
    }

    pub fn set_command(key: &str, value: &str) -> RespValue {
        Self::command(&["SET", key, value])
    }

    /// Create a SET command followed by the given options, e.g. `["PX", "100", "NX"]`
    pub fn set_command_with_options(key: &str, value: &str, options: &[&str]) -> RespValue {
        let mut tokens = vec!["SET", key, value];
        tokens.extend_from_slice(options);

        Self::command(&tokens)
    }

    pub fn append_command(key: &str, value: &str) -> RespValue {
        Self::command(&["APPEND", key, value])
    }

    /// Create an RPUSH command with multiple values
    pub fn rpush_command(key: &str, values: &[&str]) -> RespValue {
        let mut tokens = vec!["RPUSH", key];
        tokens.extend_from_slice(values);

        Self::command(&tokens)
    }

    /// Create an LPUSH command with multiple values
    pub fn lpush_command(key: &str, values: &[&str]) -> RespValue {
        let mut tokens = vec!["LPUSH", key];
        tokens.extend_from_slice(values);

        Self::command(&tokens)
    }

    pub fn llen_command(key: &str) -> RespValue {
        Self::command(&["LLEN", key])
    }

    pub fn lrange_command(key: &str, start: i64, stop: i64) -> RespValue {
        Self::command(&["LRANGE", key, &start.to_string(), &stop.to_string()])
    }

    pub fn lpop_command(key: &str) -> RespValue {
        Self::command(&["LPOP", key])
    }

    pub fn lpop_command_multiple_items(key: &str, count: &str) -> RespValue {
        Self::command(&["LPOP", key, count])
    }

    pub fn rpop_command(key: &str) -> RespValue {
        Self::command(&["RPOP", key])
    }

    pub fn rpop_command_multiple_items(key: &str, count: &str) -> RespValue {
        Self::command(&["RPOP", key, count])
    }

    pub fn blpop_command(key: &str, timeout_seconds: &str) -> RespValue {
        Self::command(&["BLPOP", key, timeout_seconds])
    }

    pub fn type_command(key: &str) -> RespValue {
        Self::command(&["TYPE", key])
    }

    pub fn exists_command(keys: &[&str]) -> RespValue {
        let mut tokens = vec!["EXISTS"];
        tokens.extend_from_slice(keys);

        Self::command(&tokens)
    }

    pub fn expected_simple_string(value: &str) -> RespValue {
        RespValue::simple_string(value)
    }

    pub fn expected_bulk_string(value: &str) -> RespValue {
        RespValue::bulk_string(value)
    }

    pub fn expected_integer(value: i64) -> RespValue {
        RespValue::Integer(value)
    }

    pub fn expected_array(values: &[&str]) -> RespValue {
        RespValue::array_of_bulk_strings(values.iter().copied())
    }

    pub fn expected_null() -> RespValue {
        RespValue::Null
    }

    /// Spawn a BLPOP on its own task, as a separate client would issue it
    pub fn spawn_blpop_task(
        env: &TestEnv,
        key: &str,
        timeout_seconds: &str,
        context: CommandContext,
    ) -> JoinHandle<Result<RespValue, CommandError>> {
        let env = env.clone();
        let command = Self::blpop_command(key, timeout_seconds);

        tokio::spawn(async move {
            env.exec_command(command, &context)
                .await
                .map_err(|e| e.source)
        })
    }

    /// Wait for a spawned command, failing the test if it takes longer than `limit`
    pub async fn wait_for_completion(
        task: JoinHandle<Result<RespValue, CommandError>>,
        limit: Duration,
    ) -> Result<RespValue, CommandError> {
        timeout(limit, task)
            .await
            .expect("task did not complete in time")
            .expect("task panicked")
    }

    /// Wait until `count` clients are blocked on `key`
    pub async fn wait_for_waiters(env: &TestEnv, key: &str, count: usize) {
        timeout(Duration::from_secs(2), async {
            while env.waiter_count(key).await < count {
                Self::sleep_ms(5).await;
            }
        })
        .await
        .expect("clients did not block in time");
    }

    pub async fn sleep_ms(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    /// Start a server on an ephemeral port, returning its address and the shutdown token
    pub async fn start_server() -> (String, CancellationToken) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap().to_string();
        let shutdown = CancellationToken::new();

        tokio::spawn(serve(listener, Database::shared(), shutdown.clone()));

        (address, shutdown)
    }
}

/// A raw TCP client speaking RESP
pub struct TestClient {
    pub stream: TcpStream,
    buffer: BytesMut,
}

impl TestClient {
    pub async fn connect(address: &str) -> Self {
        Self {
            stream: TcpStream::connect(address).await.unwrap(),
            buffer: BytesMut::new(),
        }
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
        self.stream.flush().await.unwrap();
    }

    pub async fn send(&mut self, command: RespValue) {
        self.send_raw(&command.encode()).await;
    }

    pub async fn read_response(&mut self) -> RespValue {
        timeout(
            Duration::from_secs(3),
            read_and_parse_resp(&mut self.stream, &mut self.buffer),
        )
        .await
        .expect("no response in time")
        .expect("invalid response")
    }

    pub async fn request(&mut self, command: RespValue) -> RespValue {
        self.send(command).await;
        self.read_response().await
    }

    /// Whether the server closed the connection without sending anything else
    pub async fn is_closed(&mut self) -> bool {
        matches!(
            timeout(
                Duration::from_secs(3),
                read_and_parse_resp(&mut self.stream, &mut self.buffer),
            )
            .await,
            Ok(Err(_))
        )
    }
}
