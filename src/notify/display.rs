use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::error::DeliveryError;

use super::{Message, Notifier};

enum Sink {
    Stdout,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

/// Display-only delivery: writes the message to stdout (or a buffer in tests).
pub struct DisplayNotifier {
    sink: Sink,
}

impl DisplayNotifier {
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    pub fn buffered(buf: Arc<Mutex<Vec<u8>>>) -> Self {
        Self {
            sink: Sink::Buffer(buf),
        }
    }
}

fn render(msg: &Message) -> String {
    format!("== {} ==\n{}\n", msg.subject, msg.body)
}

#[async_trait::async_trait]
impl Notifier for DisplayNotifier {
    fn name(&self) -> &'static str {
        "display"
    }

    async fn send(&self, msg: &Message) -> Result<(), DeliveryError> {
        let text = render(msg);
        match &self.sink {
            Sink::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(text.as_bytes())
                    .and_then(|_| out.flush())
                    .map_err(|e| DeliveryError::Build(format!("stdout: {e}")))
            }
            Sink::Buffer(buf) => {
                buf.lock()
                    .map_err(|_| DeliveryError::Build("display buffer poisoned".into()))?
                    .extend_from_slice(text.as_bytes());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_subject_and_body() {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let n = DisplayNotifier::buffered(buf.clone());
        n.send(&Message {
            subject: "Spearfishing update".into(),
            body: "Overall rating: 80/100\n".into(),
        })
        .await
        .unwrap();
        let out = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(out.starts_with("== Spearfishing update =="));
        assert!(out.contains("Overall rating: 80/100"));
    }
}
