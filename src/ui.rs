use crate::constants::MAX_ARGS_TO_SHOW;
use indicatif::{ProgressBar, ProgressStyle};
use num_format::{Locale, ToFormattedString};
use std::time::Duration;

/// write a coloured line to the given stream
#[macro_export]
macro_rules! styled {
    ($stream:ident, $colour:ident, $fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::$stream(), "{}", format!($fmt $(, $($arg)*)?).$colour());
    }};
    ($stream:ident, $colour:ident, $expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::$stream(), "{}", format!("{}", $expr).$colour());
    }};
}

#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {
        $crate::styled!(stderr, yellow, $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::styled!(stderr, red, $($arg)*)
    };
}

#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        $crate::styled!(stdout, green, $($arg)*)
    };
}

/// troubleshooting text, dimmed on stderr
#[macro_export]
macro_rules! hint {
    ($($arg:tt)*) => {
        $crate::styled!(stderr, dimmed, $($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), $fmt $(, $($arg)*)?);
    }};
    ($expr:expr) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", $expr);
    }};
}

/// start a spinner showing `message`; hidden when stderr is not a terminal
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// "1 file", "1,234 files"
pub fn count(n: usize, noun: &str) -> String {
    let suffix = if n == 1 { "" } else { "s" };
    format!("{} {noun}{suffix}", n.to_formatted_string(&Locale::en))
}

/// render a git invocation for messages, eliding long argument lists
pub fn describe_command(args: &[&str]) -> String {
    let shown = args.len().min(MAX_ARGS_TO_SHOW);
    let words = std::iter::once("git").chain(args[..shown].iter().copied());
    let mut rendered = shlex::try_join(words).unwrap_or_else(|_| format!("git {}", args[..shown].join(" ")));
    if args.len() > shown {
        rendered.push_str(&format!(" (+{} more)", args.len() - shown));
    }
    rendered
}
