//! Console shim: interactive terminal chat.
//!
//! Reads one line per input, writes replies as `Jarvis: <text>`. Used for
//! `jarvis chat` interactive mode. Blank lines are skipped; termination
//! words are passed through so the calling loop can say goodbye.

use async_trait::async_trait;
use jarvis_core::channel::ConversationIo;
use jarvis_core::error::ChannelError;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tracing::debug;

const USER_PROMPT: &str = "You: ";
const REPLY_PREFIX: &str = "Jarvis: ";

/// Line-oriented console I/O over any async reader/writer pair.
pub struct ConsoleIo<R, W> {
    lines: Lines<R>,
    writer: W,
    show_prompt: bool,
}

impl ConsoleIo<BufReader<io::Stdin>, io::Stdout> {
    /// Console bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> ConsoleIo<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: reader.lines(),
            writer,
            show_prompt: true,
        }
    }

    /// Don't print the `You: ` prompt before reading.
    pub fn without_prompt(mut self) -> Self {
        self.show_prompt = false;
        self
    }

    /// Write a line as-is, without the reply prefix (banners, notices).
    pub async fn announce(&mut self, text: &str) -> Result<(), ChannelError> {
        self.write_line(text).await
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    async fn write_line(&mut self, text: &str) -> Result<(), ChannelError> {
        self.writer
            .write_all(format!("{text}\n").as_bytes())
            .await
            .map_err(|e| ChannelError::DeliveryFailed(e.to_string()))?;
        self.writer
            .flush()
            .await
            .map_err(|e| ChannelError::DeliveryFailed(e.to_string()))
    }
}

#[async_trait]
impl<R, W> ConversationIo for ConsoleIo<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    fn name(&self) -> &str {
        "console"
    }

    async fn acquire_input(&mut self) -> Result<Option<String>, ChannelError> {
        loop {
            if self.show_prompt {
                self.writer
                    .write_all(USER_PROMPT.as_bytes())
                    .await
                    .map_err(|e| ChannelError::DeliveryFailed(e.to_string()))?;
                self.writer
                    .flush()
                    .await
                    .map_err(|e| ChannelError::DeliveryFailed(e.to_string()))?;
            }

            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Ok(Some(line.to_string()));
                }
                Ok(None) => {
                    debug!("Console input closed");
                    return Ok(None); // EOF (Ctrl+D)
                }
                Err(e) => return Err(ChannelError::ConnectionLost(e.to_string())),
            }
        }
    }

    async fn present_output(&mut self, text: &str) -> Result<(), ChannelError> {
        self.write_line(&format!("{REPLY_PREFIX}{text}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console(input: &'static str) -> ConsoleIo<BufReader<&'static [u8]>, Vec<u8>> {
        ConsoleIo::new(BufReader::new(input.as_bytes()), Vec::new())
    }

    #[tokio::test]
    async fn reads_lines_and_skips_blanks() {
        let mut io = console("hello\n\n   \n  what is 2+2  \n");
        assert_eq!(io.acquire_input().await.unwrap().as_deref(), Some("hello"));
        assert_eq!(io.acquire_input().await.unwrap().as_deref(), Some("what is 2+2"));
        assert_eq!(io.acquire_input().await.unwrap(), None);
    }

    #[tokio::test]
    async fn termination_words_are_passed_through() {
        let mut io = console("exit\n");
        assert_eq!(io.acquire_input().await.unwrap().as_deref(), Some("exit"));
    }

    #[tokio::test]
    async fn replies_are_prefixed() {
        let mut io = console("").without_prompt();
        io.present_output("It's sunny, 20C").await.unwrap();
        io.announce("Goodbye!").await.unwrap();
        let written = String::from_utf8(io.into_writer()).unwrap();
        assert_eq!(written, "Jarvis: It's sunny, 20C\nGoodbye!\n");
    }

    #[tokio::test]
    async fn prompt_is_shown_before_each_read() {
        let mut io = console("hi\n");
        io.acquire_input().await.unwrap();
        let written = String::from_utf8(io.into_writer()).unwrap();
        assert_eq!(written, "You: ");
    }

    #[test]
    fn console_name() {
        assert_eq!(console("").name(), "console");
    }
}
