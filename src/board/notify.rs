/// Fire-and-forget notification sink for user feedback.
///
/// In the full product this is where rejection emails and toast-style
/// confirmations go out; here the console implementation prints, and tests
/// record. No return value is ever consulted.
pub trait NotificationSink {
    fn notify(&mut self, title: &str, detail: Option<&str>);
}

/// Sink that prints notifications to stdout.
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&mut self, title: &str, detail: Option<&str>) {
        log::debug!("notification: {}", title);
        match detail {
            Some(detail) => println!("{}: {}", title, detail),
            None => println!("{}", title),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Sink that records every notification for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Vec<(String, Option<String>)>,
    }

    impl NotificationSink for RecordingNotifier {
        fn notify(&mut self, title: &str, detail: Option<&str>) {
            self.sent
                .push((title.to_string(), detail.map(|d| d.to_string())));
        }
    }
}
