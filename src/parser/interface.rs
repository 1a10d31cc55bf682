use crate::error::ParseError;

pub(crate) trait UserInterface {
    fn print(&self, message: String);
    fn print_warning(&self, message: String);
    fn print_error(&self, error: &ParseError);
    fn print_error_context(&self, error_context: ErrorContext);
}

#[derive(Default)]
pub(crate) struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_warning(&self, message: String) {
        eprintln!("{message}");
    }

    fn print_error(&self, error: &ParseError) {
        eprintln!("{error}");
    }

    fn print_error_context(&self, error_context: ErrorContext) {
        eprintln!("{error_context}");
    }
}

// Points at the offending token within the input stream.  The offset counts characters
// over the concatenated tokens; the rendering re-inserts the implicit separating spaces.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ErrorContext {
    offset: usize,
    tokens: Vec<String>,
}

impl ErrorContext {
    pub(crate) fn new(offset: usize, tokens: &[&str]) -> Self {
        Self {
            offset,
            tokens: tokens.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tokens_length = 0;
        let mut projection = String::default();
        let mut projection_offset = 0;

        for (i, token) in self.tokens.iter().enumerate() {
            tokens_length += token.len();
            projection.push_str(token);

            if i + 1 < self.tokens.len() {
                projection.push(' ');

                if tokens_length <= self.offset {
                    projection_offset += 1;
                }
            }
        }

        write!(
            f,
            "{projection}\n{:width$}^",
            "",
            width = std::cmp::min(self.offset, tokens_length.saturating_sub(1)) + projection_offset
        )
    }
}

#[cfg(test)]
pub(crate) mod util {
    use std::cell::RefCell;
    use std::sync::mpsc;

    use crate::error::ParseError;
    use crate::parser::interface::{ErrorContext, UserInterface};

    #[derive(Default)]
    pub(crate) struct InMemoryInterface {
        message: RefCell<Option<Vec<String>>>,
        warning: RefCell<Option<Vec<String>>>,
        error: RefCell<Option<String>>,
        error_context: RefCell<Option<ErrorContext>>,
    }

    impl UserInterface for InMemoryInterface {
        fn print(&self, message: String) {
            // Allows for print() to be called many times, concatenating the messages.
            let mut output = self.message.borrow_mut();

            match output.as_mut() {
                Some(messages) => messages.push(message),
                None => {
                    output.replace(vec![message]);
                }
            }
        }

        fn print_warning(&self, message: String) {
            let mut output = self.warning.borrow_mut();

            match output.as_mut() {
                Some(messages) => messages.push(message),
                None => {
                    output.replace(vec![message]);
                }
            }
        }

        fn print_error(&self, error: &ParseError) {
            // Assumes print_error() is only ever called once.
            self.error.borrow_mut().replace(error.to_string());
        }

        fn print_error_context(&self, error_context: ErrorContext) {
            // Assumes print_error_context() is only ever called once.
            self.error_context.borrow_mut().replace(error_context);
        }
    }

    impl InMemoryInterface {
        pub(crate) fn consume(
            self,
        ) -> (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<ErrorContext>,
        ) {
            let InMemoryInterface {
                message,
                warning,
                error,
                error_context,
            } = self;

            (
                message.take().map(|messages| messages.join("\n")),
                warning.take().map(|messages| messages.join("\n")),
                error.take(),
                error_context.take(),
            )
        }

        pub(crate) fn consume_message(self) -> String {
            let (message, warning, error, error_context) = self.consume();
            assert_eq!(warning, None);
            assert_eq!(error, None);
            assert_eq!(error_context, None);
            message.unwrap()
        }
    }

    pub(crate) fn channel_interface() -> (SenderInterface, ReceiverInterface) {
        let (message_tx, message_rx) = mpsc::channel();
        let (warning_tx, warning_rx) = mpsc::channel();
        let (error_tx, error_rx) = mpsc::channel();
        let (error_context_tx, error_context_rx) = mpsc::channel();
        let sender = SenderInterface {
            message_tx,
            warning_tx,
            error_tx,
            error_context_tx,
        };
        let receiver = ReceiverInterface {
            message_rx,
            warning_rx,
            error_rx,
            error_context_rx,
        };
        (sender, receiver)
    }

    // Hands output across an ownership boundary: the parser owns the sender, the test
    // keeps the receiver.  Dropping the sender closes the channels.
    pub(crate) struct SenderInterface {
        message_tx: mpsc::Sender<Option<String>>,
        warning_tx: mpsc::Sender<Option<String>>,
        error_tx: mpsc::Sender<Option<String>>,
        error_context_tx: mpsc::Sender<Option<ErrorContext>>,
    }

    impl Drop for SenderInterface {
        fn drop(&mut self) {
            self.message_tx.send(None).unwrap();
            self.warning_tx.send(None).unwrap();
            self.error_tx.send(None).unwrap();
            self.error_context_tx.send(None).unwrap();
        }
    }

    impl UserInterface for SenderInterface {
        fn print(&self, message: String) {
            self.message_tx.send(Some(message)).unwrap();
        }

        fn print_warning(&self, message: String) {
            self.warning_tx.send(Some(message)).unwrap();
        }

        fn print_error(&self, error: &ParseError) {
            self.error_tx.send(Some(error.to_string())).unwrap();
        }

        fn print_error_context(&self, error_context: ErrorContext) {
            self.error_context_tx.send(Some(error_context)).unwrap();
        }
    }

    pub(crate) struct ReceiverInterface {
        message_rx: mpsc::Receiver<Option<String>>,
        warning_rx: mpsc::Receiver<Option<String>>,
        error_rx: mpsc::Receiver<Option<String>>,
        error_context_rx: mpsc::Receiver<Option<ErrorContext>>,
    }

    impl ReceiverInterface {
        pub(crate) fn consume(
            self,
        ) -> (
            Option<String>,
            Option<String>,
            Option<String>,
            Option<ErrorContext>,
        ) {
            let ReceiverInterface {
                message_rx,
                warning_rx,
                error_rx,
                error_context_rx,
            } = self;

            (
                drain(message_rx),
                drain(warning_rx),
                drain(error_rx),
                // Assumes print_error_context() is only ever called once
                // (we take the first if multiple were sent on the channel).
                error_context_rx.recv().unwrap(),
            )
        }

        pub(crate) fn consume_message(self) -> String {
            let (message, warning, error, error_context) = self.consume();
            assert_eq!(warning, None);
            assert_eq!(error, None);
            assert_eq!(error_context, None);
            message.unwrap()
        }
    }

    fn drain(receiver: mpsc::Receiver<Option<String>>) -> Option<String> {
        let mut values = Vec::default();

        while let Some(message) = receiver.recv().unwrap() {
            values.push(message);
        }

        if values.is_empty() {
            None
        } else {
            Some(values.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, vec![], "\n^")]
    #[case(0, vec!["abc"], "abc\n^")]
    #[case(1, vec!["abc"], "abc\n ^")]
    #[case(2, vec!["abc"], "abc\n  ^")]
    #[case(3, vec!["abc"], "abc\n  ^")]
    #[case(0, vec!["abc", "123"], "abc 123\n^")]
    #[case(3, vec!["abc", "123"], "abc 123\n    ^")]
    #[case(4, vec!["abc", "123"], "abc 123\n     ^")]
    fn error_context(#[case] offset: usize, #[case] tokens: Vec<&str>, #[case] expected: &str) {
        assert_eq!(ErrorContext::new(offset, &tokens).to_string(), expected);
    }
}
