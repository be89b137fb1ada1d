pub mod charting;
pub mod palette;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Block, BorderType, Chart, Clear, Dataset, Gauge, GraphType, Paragraph, Widget, Wrap,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::App,
    feedback::ClickRipples,
    session::{SessionStatus, ALLOWED_DURATIONS},
    settings::Toggle,
    ui::{
        charting::{compute_chart_params, format_label, history_points},
        palette::Palette,
    },
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const HISTORY_ROWS: usize = 5;
const MENU_WIDTH: u16 = 36;
const MENU_HEIGHT: u16 = 10;
const MENU_KEYS: [char; 4] = ['s', 'k', 'e', 'a'];
const LEGEND: [&str; 6] = [
    "(space/click) click",
    "(enter) start",
    "(r)eset",
    "(1-4) duration",
    "(m)enu",
    "(q)uit",
];

/// Where each part of the game screen is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header: Rect,
    pub timer: Rect,
    pub click_area: Rect,
    pub result: Rect,
    pub stats: Rect,
    pub history: Rect,
    pub legend: Rect,
}

/// Split the terminal area. Mouse hit-testing uses the same function, so
/// clicks land exactly where the click area was drawn.
pub fn layout(area: Rect) -> AppLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),                       // header
            Constraint::Length(1),                       // countdown
            Constraint::Min(5),                          // click area
            Constraint::Length(2),                       // result
            Constraint::Length(1),                       // stats
            Constraint::Length(HISTORY_ROWS as u16 + 2), // history
            Constraint::Length(1),                       // legend
        ])
        .split(area);

    AppLayout {
        header: chunks[0],
        timer: chunks[1],
        click_area: chunks[2],
        result: chunks[3],
        stats: chunks[4],
        history: chunks[5],
        legend: chunks[6],
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let settings = self.context.settings();
        let palette = Palette::for_theme(settings.theme);
        let chunks = layout(area);

        Block::default().style(palette.text()).render(area, buf);

        render_header(self, &palette, chunks.header, buf);
        render_timer(self, &palette, chunks.timer, buf);
        render_click_area(self, &palette, chunks.click_area, buf);
        render_result(self, &palette, chunks.result, buf);
        render_stats(self, &palette, chunks.stats, buf);
        render_history(self, &palette, chunks.history, buf);

        Paragraph::new(Span::styled(
            LEGEND.iter().join("  "),
            palette.muted().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks.legend, buf);
    }
}

fn render_header(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let selected = app.controller.selected_duration();
    let mut spans = vec![Span::styled("clikr  ", palette.accent())];
    for (idx, secs) in ALLOWED_DURATIONS.iter().enumerate() {
        let label = format!("({}) {}s ", idx + 1, secs);
        let style = if *secs == selected {
            palette.bold().fg(palette.highlight).add_modifier(Modifier::REVERSED)
        } else {
            palette.muted()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    Paragraph::new(Line::from(spans)).render(area, buf);

    Paragraph::new(Span::styled(theme_label(app), palette.muted()))
        .alignment(Alignment::Right)
        .render(area, buf);
}

fn theme_label(app: &App) -> String {
    format!("theme: {}", app.context.settings().theme)
}

fn render_timer(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let session = app.controller.session();
    let ratio = (1.0 - session.progress()).clamp(0.0, 1.0);
    Gauge::default()
        .gauge_style(Style::default().fg(palette.gauge).bg(palette.muted))
        .use_unicode(true)
        .ratio(ratio)
        .label(Span::styled(
            format!("{}s", session.remaining_secs),
            palette.bold(),
        ))
        .render(area, buf);
}

fn render_click_area(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let border_style = if app.controller.is_running() {
        Style::default().fg(palette.accent)
    } else {
        palette.muted()
    };
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(Line::from(" click here ").centered());
    let inner = block.inner(area);
    block.render(area, buf);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(inner);

    let status_style = match app.controller.status() {
        SessionStatus::Idle => palette.bold(),
        SessionStatus::Running => palette.accent(),
        SessionStatus::Ended => palette.bold().fg(palette.highlight),
    };
    Paragraph::new(Span::styled(app.status_text(), status_style))
        .alignment(Alignment::Center)
        .render(rows[1], buf);

    Paragraph::new(Span::styled(
        app.controller.click_count().to_string(),
        palette.bold(),
    ))
    .alignment(Alignment::Center)
    .render(rows[3], buf);

    render_ripples(&app.ripples, palette, area, inner, buf);

    if let Some(title) = app.banner.current() {
        render_banner(title, palette, inner, buf);
    }
}

/// Particles are positioned relative to the click area and clipped to its interior.
fn render_ripples(
    ripples: &ClickRipples,
    palette: &Palette,
    origin: Rect,
    clip: Rect,
    buf: &mut Buffer,
) {
    for particle in &ripples.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = origin.x.saturating_add(particle.x as u16);
        let y = origin.y.saturating_add(particle.y as u16);
        if x < clip.left() || x >= clip.right() || y < clip.top() || y >= clip.bottom() {
            continue;
        }

        let alpha = 1.0 - (particle.age / particle.max_age);
        let mut style = Style::default().fg(palette.ripple_color(particle.color_index));
        if alpha > 0.5 {
            style = style.add_modifier(Modifier::BOLD);
        } else {
            style = style.add_modifier(Modifier::DIM);
        }

        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_char(particle.symbol);
            cell.set_style(style);
        }
    }
}

fn render_banner(title: &str, palette: &Palette, area: Rect, buf: &mut Buffer) {
    if area.height == 0 {
        return;
    }
    let text = format!(" {title} ");
    let width = (text.width() as u16).min(area.width);
    let banner = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y,
        width,
        height: 1,
    };
    Clear.render(banner, buf);
    Paragraph::new(Span::styled(
        text,
        Style::default()
            .fg(palette.banner)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
    ))
    .render(banner, buf);
}

fn render_result(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let lines = match app.controller.last_result() {
        Some(result) if app.controller.status() == SessionStatus::Ended => vec![
            Line::from(Span::styled(
                format!("Total Clicks: {}", result.clicks),
                palette.bold(),
            )),
            Line::from(Span::styled(
                format!("{:.2} clicks per second", result.cps),
                palette.accent(),
            )),
        ],
        _ => vec![Line::from(Span::styled(
            format!("{}s run", app.controller.selected_duration()),
            palette.muted(),
        ))],
    };
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_stats(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let ledger = app.context.ledger();
    let text = match (ledger.best_score(), ledger.average_score()) {
        (Some(best), Some(avg)) => format!(
            "best {:.2}   avg {:.2}   sd {:.2}   runs {}",
            best,
            avg,
            ledger.consistency().unwrap_or(0.0),
            ledger.len()
        ),
        _ => String::from("no runs yet"),
    };
    Paragraph::new(Span::styled(text, palette.bold()))
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_history(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let ledger = app.context.ledger();
    let mut lines: Vec<Line> = ledger
        .recent_history(HISTORY_ROWS)
        .map(|record| {
            Line::from(vec![
                Span::styled(format!("{:>6.2} cps  ", record.cps), palette.bold()),
                Span::styled(
                    record.timestamp.format("%b %d %H:%M").to_string(),
                    palette.muted(),
                ),
            ])
        })
        .collect();
    let unlocked = app.context.achievements();
    if !unlocked.is_empty() {
        lines.push(Line::from(Span::styled(
            unlocked.iter().join(" "),
            Style::default().fg(palette.highlight),
        )));
    }

    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_style(palette.muted())
                .title(" recent "),
        )
        .wrap(Wrap { trim: true })
        .render(columns[0], buf);

    let points = history_points(ledger.scores());
    let (runs, highest_cps) = compute_chart_params(&points);
    let datasets = vec![Dataset::default()
        .marker(Marker::Braille)
        .style(Style::default().fg(palette.accent))
        .graph_type(GraphType::Line)
        .data(&points)];

    Chart::new(datasets)
        .block(
            Block::bordered()
                .border_style(palette.muted())
                .title(" cps history "),
        )
        .x_axis(
            Axis::default()
                .bounds([1.0, runs])
                .labels(vec![
                    Span::styled("1", palette.bold()),
                    Span::styled(format_label(runs), palette.bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, highest_cps])
                .labels(vec![
                    Span::styled("0", palette.bold()),
                    Span::styled(format_label(highest_cps), palette.bold()),
                ]),
        )
        .render(columns[1], buf);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Settings popup, drawn on top of the game screen.
pub fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let settings = app.context.settings();
    let palette = Palette::for_theme(settings.theme);
    let popup = centered_rect(MENU_WIDTH, MENU_HEIGHT, area);

    let on_off = |enabled: bool| {
        if enabled {
            Span::styled("ON", palette.accent())
        } else {
            Span::styled("OFF", palette.muted())
        }
    };

    let mut lines: Vec<Line> = Toggle::ALL
        .iter()
        .zip(MENU_KEYS)
        .map(|(toggle, key)| {
            let label = format!("({key}) {toggle}");
            let pad = 24usize.saturating_sub(label.width());
            Line::from(vec![
                Span::styled(label, palette.text()),
                Span::raw(" ".repeat(pad)),
                on_off(settings.get(*toggle)),
            ])
        })
        .collect();
    lines.push(Line::from(vec![
        Span::styled("(t) Theme", palette.text()),
        Span::raw(" ".repeat(15)),
        Span::styled(settings.theme.to_string(), palette.accent()),
    ]));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "(m/esc) close",
        palette.muted().add_modifier(Modifier::ITALIC),
    )));

    Clear.render(popup, buf);
    Paragraph::new(lines)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(palette.accent))
                .title(Line::from(" settings ").centered()),
        )
        .style(palette.text())
        .render(popup, buf);
}
