// soft color palettes for the chat

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Dusk,
    Dawn,
    Lavender,
    Ocean,
}

impl ThemeKind {
    pub const ALL: &'static [ThemeKind] = &[Self::Dusk, Self::Dawn, Self::Lavender, Self::Ocean];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Dusk => "dusk",
            Self::Dawn => "dawn",
            Self::Lavender => "lavender",
            Self::Ocean => "ocean",
        }
    }
}

// pick a light palette on light terminals
pub fn detect_theme() -> ThemeKind {
    match terminal_light::luma() {
        Ok(luma) if luma > 0.6 => ThemeKind::Dawn,
        _ => ThemeKind::Dusk,
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub accent: Color,
    pub border: Color,
    pub user: Color,
    pub assistant: Color,
    pub alert: Color,
    pub muted: Color,
}

impl Theme {
    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dusk => Self {
                bg: Color::Rgb(27, 29, 43),
                fg: Color::Rgb(214, 218, 236),
                accent: Color::Rgb(143, 170, 255),
                border: Color::Rgb(58, 62, 88),
                user: Color::Rgb(170, 214, 235),
                assistant: Color::Rgb(206, 190, 250),
                alert: Color::Rgb(244, 128, 140),
                muted: Color::Rgb(120, 126, 154),
            },
            ThemeKind::Dawn => Self {
                bg: Color::Rgb(248, 244, 250),
                fg: Color::Rgb(62, 58, 88),
                accent: Color::Rgb(110, 96, 196),
                border: Color::Rgb(218, 210, 230),
                user: Color::Rgb(40, 110, 150),
                assistant: Color::Rgb(120, 80, 170),
                alert: Color::Rgb(190, 40, 70),
                muted: Color::Rgb(146, 140, 162),
            },
            ThemeKind::Lavender => Self {
                bg: Color::Rgb(36, 30, 48),
                fg: Color::Rgb(228, 220, 240),
                accent: Color::Rgb(200, 168, 240),
                border: Color::Rgb(70, 58, 92),
                user: Color::Rgb(240, 190, 220),
                assistant: Color::Rgb(190, 176, 250),
                alert: Color::Rgb(250, 120, 130),
                muted: Color::Rgb(132, 118, 156),
            },
            ThemeKind::Ocean => Self {
                bg: Color::Rgb(18, 34, 44),
                fg: Color::Rgb(210, 232, 238),
                accent: Color::Rgb(96, 200, 210),
                border: Color::Rgb(40, 70, 84),
                user: Color::Rgb(150, 220, 200),
                assistant: Color::Rgb(140, 190, 240),
                alert: Color::Rgb(240, 120, 110),
                muted: Color::Rgb(100, 136, 148),
            },
        }
    }

    // style helpers
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn user(&self) -> Style {
        Style::default().fg(self.user)
    }

    pub fn assistant(&self) -> Style {
        Style::default().fg(self.assistant)
    }

    pub fn alert(&self) -> Style {
        Style::default().fg(self.alert).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cycles_through_all() {
        let mut kind = ThemeKind::Dusk;
        for _ in 0..ThemeKind::ALL.len() {
            kind = kind.next();
        }
        assert_eq!(kind, ThemeKind::Dusk);
    }
}
