//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Accent for the active view tab and highlights.
pub const INDIGO: Color = Color::Rgb(99, 102, 241);
/// Used for SOS flags and alerts.
pub const SOS_RED: Color = Color::Rgb(220, 38, 38);
/// Used for completed chores.
pub const DONE_GREEN: Color = Color::Rgb(16, 185, 129);
/// Used for stale pending chores.
pub const STALE_AMBER: Color = Color::Rgb(245, 158, 11);
