//! Line-based console input and the interactive confirmation gate.

use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

use concierge_core::{ConfirmationGate, Presentation};

use crate::render::render_presentation;

/// Answers accepted as "yes". Spanish forms are kept for existing users.
const AFFIRMATIVE: &[&str] = &["y", "yes", "s", "si", "sí"];

pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    AFFIRMATIVE.contains(&answer.as_str())
}

/// Prompted line reader shared by the REPL and the gate.
pub struct Console<R> {
    lines: Mutex<Lines<R>>,
}

impl Console<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R: AsyncBufRead + Unpin> Console<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }

    /// Print `label` and read one line. `None` on end of input or a read
    /// error.
    pub async fn prompt(&self, label: &str) -> Option<String> {
        print!("{}", label);
        // A prompt that fails to flush is still answerable.
        let _ = std::io::stdout().flush();

        let mut lines = self.lines.lock().await;
        match lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read from console");
                None
            }
        }
    }
}

/// Shows the presentation and asks its question on the console.
/// End of input counts as "no".
pub struct ConsoleGate<R> {
    console: Arc<Console<R>>,
}

impl<R> ConsoleGate<R> {
    pub fn new(console: Arc<Console<R>>) -> Self {
        Self { console }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> ConfirmationGate for ConsoleGate<R> {
    async fn confirm(&self, presentation: &Presentation<'_>) -> bool {
        println!("{}", render_presentation(presentation));
        let label = format!("{} [y/N] ", presentation.question());
        self.console
            .prompt(&label)
            .await
            .map(|answer| is_affirmative(&answer))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::testing::fixtures;

    fn console(input: &'static str) -> Arc<Console<BufReader<&'static [u8]>>> {
        Arc::new(Console::new(BufReader::new(input.as_bytes())))
    }

    #[test]
    fn test_is_affirmative() {
        for answer in ["y", "Y", "yes", " YES ", "s", "si", "Sí", "sí"] {
            assert!(is_affirmative(answer), "{:?} should be yes", answer);
        }
        for answer in ["", "n", "no", "nope", "yes please", "ok"] {
            assert!(!is_affirmative(answer), "{:?} should be no", answer);
        }
    }

    #[tokio::test]
    async fn test_prompt_reads_lines_then_eof() {
        let console = console("first\nsecond\n");
        assert_eq!(console.prompt("> ").await.as_deref(), Some("first"));
        assert_eq!(console.prompt("> ").await.as_deref(), Some("second"));
        assert_eq!(console.prompt("> ").await, None);
    }

    #[tokio::test]
    async fn test_gate_answers_from_console() {
        let gate = ConsoleGate::new(console("si\nno\n"));
        let asset = fixtures::asset("orders", "sales", "dw.sales.orders");
        let presentation = Presentation::Match {
            request: "orders",
            asset: &asset,
        };

        assert!(gate.confirm(&presentation).await);
        assert!(!gate.confirm(&presentation).await);
        // Input exhausted.
        assert!(!gate.confirm(&presentation).await);
    }
}
