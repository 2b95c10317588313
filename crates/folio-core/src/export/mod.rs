// ABOUTME: Export module for rendering an Outline into human-readable formats.
// ABOUTME: Markdown is the only format; it backs the CLI's export command.

pub mod markdown;

pub use markdown::export_markdown;
