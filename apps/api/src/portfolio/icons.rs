//! Skill icon resolution.
//!
//! Icons are stored as free-form identifiers. Only names in [`Glyph`] map to a
//! rendered glyph; anything else is shown as literal text.

use serde::Serialize;

/// Glyphs the frontend knows how to draw. Wire names match the icon set's
/// component names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Glyph {
    Braces,
    Cloud,
    Code,
    Cpu,
    Database,
    GitBranch,
    Globe,
    Layers,
    Lightbulb,
    Palette,
    Server,
    Smartphone,
    Sparkles,
    Terminal,
    Trophy,
    Wifi,
    Zap,
}

impl Glyph {
    pub fn from_name(name: &str) -> Option<Self> {
        let glyph = match name {
            "Braces" => Glyph::Braces,
            "Cloud" => Glyph::Cloud,
            "Code" => Glyph::Code,
            "Cpu" => Glyph::Cpu,
            "Database" => Glyph::Database,
            "GitBranch" => Glyph::GitBranch,
            "Globe" => Glyph::Globe,
            "Layers" => Glyph::Layers,
            "Lightbulb" => Glyph::Lightbulb,
            "Palette" => Glyph::Palette,
            "Server" => Glyph::Server,
            "Smartphone" => Glyph::Smartphone,
            "Sparkles" => Glyph::Sparkles,
            "Terminal" => Glyph::Terminal,
            "Trophy" => Glyph::Trophy,
            "Wifi" => Glyph::Wifi,
            "Zap" => Glyph::Zap,
            _ => return None,
        };
        Some(glyph)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IconRender {
    Glyph { name: Glyph },
    Text { text: String },
}

/// Resolves a skill's icon. A missing icon falls back to the skill name.
pub fn resolve(icon: Option<&str>, skill_name: &str) -> IconRender {
    match icon {
        Some(name) => match Glyph::from_name(name) {
            Some(glyph) => IconRender::Glyph { name: glyph },
            None => IconRender::Text {
                text: name.to_string(),
            },
        },
        None => IconRender::Text {
            text: skill_name.to_string(),
        },
    }
}
