use ratatui::{prelude::*, style::palette::tailwind};

/// Colors for the catalog screens
///
/// A slate base with emerald for healthy state and rose for failures.
/// Views read the raw colors for backgrounds and use the style helpers
/// below for everything else.
#[derive(Debug, Clone)]
pub struct Theme {
    pub surface: Color,
    pub surface_raised: Color,
    pub surface_overlay: Color,

    pub fg: Color,
    pub fg_dim: Color,
    pub fg_faint: Color,

    /// Borders and key hints
    pub accent: Color,
    /// Border of the expanded repository detail
    pub accent_detail: Color,

    pub ok: Color,
    pub failure: Color,
    pub caution: Color,

    pub highlight_bg: Color,
    pub highlight_fg: Color,

    pub header_bg: Color,
    pub header_fg: Color,
    pub row_fg: Color,
    pub row_bg: Color,
    pub row_bg_alt: Color,

    pub skeleton: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            surface: tailwind::SLATE.c950,
            surface_raised: tailwind::SLATE.c900,
            surface_overlay: tailwind::SLATE.c800,

            fg: tailwind::SLATE.c100,
            fg_dim: tailwind::SLATE.c300,
            fg_faint: tailwind::SLATE.c500,

            accent: tailwind::SKY.c400,
            accent_detail: tailwind::INDIGO.c400,

            ok: tailwind::EMERALD.c400,
            failure: tailwind::ROSE.c400,
            caution: tailwind::AMBER.c400,

            highlight_bg: tailwind::SKY.c700,
            highlight_fg: Color::White,

            header_bg: tailwind::SLATE.c700,
            header_fg: tailwind::SLATE.c50,
            row_fg: tailwind::SLATE.c200,
            row_bg: tailwind::SLATE.c950,
            row_bg_alt: tailwind::SLATE.c900,

            skeleton: tailwind::SLATE.c700,
        }
    }
}

impl Theme {
    pub fn panel_border(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn panel_title(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    /// The key itself in "r reload"
    pub fn key_hint(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn key_description(&self) -> Style {
        Style::default().fg(self.fg_dim)
    }

    pub fn table_header(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn table_selected(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Zebra striping for tag and repository rows
    pub fn table_row(&self, index: usize) -> Style {
        let bg = match index % 2 {
            0 => self.row_bg,
            _ => self.row_bg_alt,
        };
        Style::default().fg(self.row_fg).bg(bg)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.failure).add_modifier(Modifier::BOLD)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.ok)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.caution).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.fg_faint)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg)
    }
}
