//! Shared UI icons.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static PAUSE: Emoji<'_, '_> = Emoji("⏸️  ", "[PAUSE]");

// Progress indicators
pub static RUNNING: Emoji<'_, '_> = Emoji("▶️  ", "[>]");
pub static DOCUMENT: Emoji<'_, '_> = Emoji("📄 ", "-");
pub static REVIEW: Emoji<'_, '_> = Emoji("🔍 ", "[R]");
pub static WAVE: Emoji<'_, '_> = Emoji("🌊 ", "[W]");
pub static INFO: Emoji<'_, '_> = Emoji("💬 ", "[i]");
