//! Terminal output for the `adalat-server` CLI.
//!
//! Every helper prints one styled line when colour is on, or a tagged plain
//! line (`[OK]`, `[WARN]`, ...) that stays greppable in scripts and tests.

use std::fmt::Display;

use owo_colors::OwoColorize;

pub struct Output {
    pub colored: bool,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self { colored: true }
    }

    pub fn no_color() -> Self {
        Self { colored: false }
    }

    fn line(&self, styled: impl Display, plain: impl Display) {
        if self.colored {
            println!("{styled}");
        } else {
            println!("{plain}");
        }
    }

    pub fn banner(&self) {
        let version = format!("v{}", env!("CARGO_PKG_VERSION"));
        self.line(
            format_args!(
                "\n   {} {}\n   {}\n",
                "⚖  Adalat".bright_green().bold(),
                version.dimmed(),
                "Bangladesh Legal Assistant".bright_white()
            ),
            format_args!("\n   Adalat {version}\n   Bangladesh Legal Assistant\n"),
        );
    }

    pub fn success(&self, message: &str) {
        self.line(
            format_args!("  {} {}", "✓".green().bold(), message.green()),
            format_args!("  [OK] {message}"),
        );
    }

    pub fn info(&self, message: &str) {
        self.line(
            format_args!("  {} {}", "•".blue(), message),
            format_args!("  [INFO] {message}"),
        );
    }

    pub fn warning(&self, message: &str) {
        self.line(
            format_args!("  {} {}", "⚠".yellow().bold(), message.yellow()),
            format_args!("  [WARN] {message}"),
        );
    }

    /// Errors go to stderr so `ask` failures don't mix with answers.
    pub fn error(&self, message: &str) {
        if self.colored {
            eprintln!("  {} {}", "✗".red().bold(), message.red());
        } else {
            eprintln!("  [ERROR] {message}");
        }
    }

    /// `[n/total]` progress line for ingest.
    pub fn step(&self, n: u32, total: u32, message: &str) {
        let counter = format!("[{n}/{total}]");
        self.line(
            format_args!("  {} {}", counter.dimmed(), message.bright_white()),
            format_args!("  {counter} {message}"),
        );
    }

    /// A file or directory written by `init`.
    pub fn created(&self, kind: &str, path: &str) {
        self.line(
            format_args!("  {} {} {}", "✓".green().bold(), kind.dimmed(), path.bright_white()),
            format_args!("  [CREATED] {kind} {path}"),
        );
    }

    pub fn skipped(&self, path: &str, reason: &str) {
        self.line(
            format_args!("  {} {} {}", "○".yellow(), path.dimmed(), format!("({reason})").yellow()),
            format_args!("  [SKIPPED] {path} ({reason})"),
        );
    }

    pub fn header(&self, title: &str) {
        self.line(
            format_args!("\n  {}", title.bright_white().bold().underline()),
            format_args!("\n  === {title} ==="),
        );
    }

    pub fn subheader(&self, title: &str) {
        self.line(
            format_args!("\n  {}", title.cyan().bold()),
            format_args!("\n  --- {title} ---"),
        );
    }

    pub fn kv(&self, key: &str, value: &str) {
        self.line(
            format_args!("    {}: {}", key.dimmed(), value.bright_white()),
            format_args!("    {key}: {value}"),
        );
    }

    pub fn hint(&self, message: &str) {
        self.line(
            format_args!("\n  {} {}", "💡".dimmed(), message.dimmed().italic()),
            format_args!("\n  [TIP] {message}"),
        );
    }

    /// A shell command the user can copy.
    pub fn command(&self, cmd: &str) {
        let cmd = format!("$ {cmd}");
        self.line(format_args!("     {}", cmd.bright_cyan()), format_args!("     {cmd}"));
    }

    pub fn complete(&self, message: &str) {
        self.line(
            format_args!("\n  {} {}", "🚀".green(), message.bright_green().bold()),
            format_args!("\n  [DONE] {message}"),
        );
    }

    /// Answer text, indented under the headers.
    pub fn paragraph(&self, text: &str) {
        for line in text.lines() {
            println!("    {line}");
        }
    }

    /// Numbered citation under an answer.
    pub fn source(&self, index: usize, title: &str, detail: &str) {
        let tag = format!("[{index}]");
        self.line(
            format_args!("    {} {} {}", tag.bright_cyan(), title.bright_white(), detail.dimmed()),
            format_args!("    {tag} {title} {detail}"),
        );
    }

    pub fn newline(&self) {
        println!();
    }
}
