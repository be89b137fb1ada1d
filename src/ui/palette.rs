use ratatui::style::{Color, Modifier, Style};

use crate::settings::Theme;

/// Colors used to draw one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub accent: Color,
    pub muted: Color,
    pub highlight: Color,
    pub gauge: Color,
    pub banner: Color,
    pub ripple: [Color; 6],
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                fg: Color::White,
                accent: Color::Magenta,
                muted: Color::DarkGray,
                highlight: Color::Yellow,
                gauge: Color::Green,
                banner: Color::Yellow,
                ripple: [
                    Color::Yellow,
                    Color::Magenta,
                    Color::Cyan,
                    Color::Green,
                    Color::Red,
                    Color::Blue,
                ],
            },
            Theme::Light => Self {
                fg: Color::Black,
                accent: Color::Blue,
                muted: Color::Gray,
                highlight: Color::Red,
                gauge: Color::Blue,
                banner: Color::Magenta,
                ripple: [
                    Color::Blue,
                    Color::Red,
                    Color::Magenta,
                    Color::Green,
                    Color::Black,
                    Color::Cyan,
                ],
            },
            Theme::Neon => Self {
                fg: Color::LightGreen,
                accent: Color::LightMagenta,
                muted: Color::Rgb(90, 90, 120),
                highlight: Color::LightCyan,
                gauge: Color::LightMagenta,
                banner: Color::LightYellow,
                ripple: [
                    Color::LightMagenta,
                    Color::LightCyan,
                    Color::LightGreen,
                    Color::LightYellow,
                    Color::Rgb(255, 0, 170),
                    Color::Rgb(0, 255, 200),
                ],
            },
            Theme::Ocean => Self {
                fg: Color::Rgb(200, 230, 255),
                accent: Color::Cyan,
                muted: Color::Rgb(70, 100, 130),
                highlight: Color::LightBlue,
                gauge: Color::Cyan,
                banner: Color::LightCyan,
                ripple: [
                    Color::Cyan,
                    Color::LightBlue,
                    Color::Blue,
                    Color::LightCyan,
                    Color::Rgb(0, 150, 200),
                    Color::White,
                ],
            },
        }
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn bold(&self) -> Style {
        self.text().add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn ripple_color(&self, index: usize) -> Color {
        self.ripple[index % self.ripple.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_theme_has_a_distinct_palette() {
        let palettes: Vec<Palette> = Theme::ALL.iter().map(|t| Palette::for_theme(*t)).collect();
        for (i, a) in palettes.iter().enumerate() {
            for b in &palettes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn ripple_color_wraps() {
        let p = Palette::for_theme(Theme::Dark);
        assert_eq!(p.ripple_color(0), p.ripple_color(6));
    }
}
