use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph, Row, Table, Widget,
        Wrap,
    },
};
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::math::Difficulty;
use crate::profile::UserProfile;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 4;
const URGENT_TIME_FRACTION: f64 = 0.3;

const PARTICLE_COLORS: [Color; 7] = [
    Color::Yellow,
    Color::Magenta,
    Color::Cyan,
    Color::Green,
    Color::Red,
    Color::Blue,
    Color::White,
];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Auth => render_auth(self, area, buf),
            AppState::Menu => render_menu(self, area, buf),
            AppState::Playing => render_board(self, area, buf),
            AppState::GameOver => render_game_over(self, area, buf),
            AppState::Profile => render_profile(self, area, buf),
        }

        render_celebration(self, area, buf);
    }
}

fn difficulty_color(difficulty: Difficulty) -> Color {
    match difficulty {
        Difficulty::Easy => Color::Green,
        Difficulty::Medium => Color::Yellow,
        Difficulty::Hard => Color::Red,
    }
}

fn avatar_color(name: &str) -> Color {
    match name {
        "rose" => Color::LightRed,
        "blue" => Color::Blue,
        "emerald" => Color::Green,
        "amber" => Color::Yellow,
        "purple" => Color::Magenta,
        "indigo" => Color::LightBlue,
        _ => Color::White,
    }
}

fn title_line() -> Line<'static> {
    Line::from(vec![
        Span::styled(
            "MATH",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "FLASH",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ])
}

fn centered_chunks(area: Rect, constraints: &[Constraint]) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(1)
        .constraints(constraints.to_vec())
        .split(area)
}

fn render_auth(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = centered_chunks(
        area,
        &[
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(2),
        ],
    );

    let header = Paragraph::new(vec![
        title_line(),
        Line::from(Span::styled(
            "train your brain in seconds",
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("name: ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            app.name_input.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ]))
    .block(Block::default().borders(Borders::ALL).title("new player"))
    .alignment(Alignment::Left);
    input.render(chunks[1], buf);

    let mut lines: Vec<Line> = Vec::new();
    if !app.book.profiles.is_empty() {
        lines.push(Line::from(Span::styled(
            "or pick an existing player:",
            Style::default().add_modifier(Modifier::DIM),
        )));
        for (idx, profile) in app.book.profiles.iter().enumerate() {
            let marker = if idx == app.auth_index { "> " } else { "  " };
            let style = if idx == app.auth_index {
                Style::default()
                    .fg(avatar_color(&profile.avatar_color))
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!("{marker}{} ({} solved)", profile.name, profile.total_solved),
                style,
            )));
        }
    }
    Paragraph::new(lines)
        .alignment(Alignment::Left)
        .render(chunks[2], buf);

    let help = Paragraph::new(Span::styled(
        "type a name and press enter · up/down pick · esc quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    help.render(chunks[3], buf);
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = centered_chunks(
        area,
        &[
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(2),
        ],
    );

    let greeting = match app.book.active() {
        Some(profile) => format!("hey {}, pick your pace", profile.name),
        None => "pick your pace".to_string(),
    };
    let header = Paragraph::new(vec![
        title_line(),
        Line::from(Span::styled(
            greeting,
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    let best_for = |difficulty: Difficulty| {
        app.book
            .active()
            .map(|p| p.high_scores.get(difficulty))
            .unwrap_or(0)
    };

    let mut lines: Vec<Line> = Vec::new();
    for (idx, difficulty) in Difficulty::ALL.into_iter().enumerate() {
        let selected = idx == app.menu_index;
        let marker = if selected { "> " } else { "  " };
        let style = if selected {
            Style::default()
                .fg(difficulty_color(difficulty))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        lines.push(Line::from(Span::styled(
            format!(
                "{marker}{difficulty:<8} {:>4.1}s per round   best {}",
                difficulty.base_time_ms() / 1000.0,
                best_for(difficulty),
            ),
            style,
        )));
        lines.push(Line::default());
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let help = Paragraph::new(Span::styled(
        "enter start · up/down difficulty · p profile · l logout · q quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    help.render(chunks[2], buf);
}

fn render_board(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(game) = app.game.as_ref() else {
        return;
    };

    let urgent = game.time_fraction() < URGENT_TIME_FRACTION;

    let chunks = centered_chunks(
        area,
        &[
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(2),
        ],
    );

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(30)])
        .split(chunks[0]);

    let mode_color = if urgent {
        Color::Red
    } else {
        difficulty_color(game.difficulty)
    };
    let mut score_spans = vec![Span::styled(
        format!("{}", game.score),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if game.is_new_best() {
        score_spans.push(Span::raw("  "));
        score_spans.push(Span::styled(
            "NEW BEST!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::RAPID_BLINK),
        ));
    }
    let status = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{} MODE", game.difficulty),
            Style::default().fg(mode_color).add_modifier(Modifier::BOLD),
        )),
        Line::from(score_spans),
    ]);
    status.render(header_cols[0], buf);

    let gauge_style = if urgent {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(gauge_style)
        .ratio(game.time_fraction())
        .label(format!("{:.1}s", game.time_remaining_ms / 1000.0));
    gauge.render(header_cols[1], buf);

    let equation = Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled(
            game.equation.text.clone(),
            Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
        )),
        Line::default(),
        Line::from(Span::styled(
            format!("{}", game.equation.displayed_result),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ])
    .alignment(Alignment::Center);
    equation.render(chunks[1], buf);

    let combo = if game.combo > 0 {
        format!("combo {}  ·  x{} points", game.combo, game.multiplier())
    } else {
        String::new()
    };
    Paragraph::new(Span::styled(
        combo,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let help = Paragraph::new(Line::from(vec![
        Span::styled(
            "left/f",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" wrong    ", Style::default().add_modifier(Modifier::DIM)),
        Span::styled(
            "right/j",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" correct", Style::default().add_modifier(Modifier::DIM)),
    ]))
    .alignment(Alignment::Center);
    help.render(chunks[3], buf);
}

fn render_game_over(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(summary) = app.last_summary.as_ref() else {
        return;
    };

    let chunks = centered_chunks(
        area,
        &[
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(2),
        ],
    );

    let best = app
        .book
        .active()
        .map(|p| p.high_scores.get(summary.difficulty))
        .unwrap_or(0);

    let headline = if summary.record_broken {
        Span::styled(
            "NEW RECORD!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            "GAME OVER",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    };
    let header = Paragraph::new(vec![
        Line::from(headline),
        Line::default(),
        Line::from(Span::styled(
            format!("{}", summary.score),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} · best {best}", summary.difficulty),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    let mut detail = format!(
        "best combo {} · {:.0}s played",
        summary.best_combo, summary.duration_secs
    );
    if let Some(avg) = summary.avg_response_ms {
        detail.push_str(&format!(" · {avg:.0}ms per answer"));
        if let Some(sd) = summary.response_std_dev_ms {
            detail.push_str(&format!(" (±{sd:.0})"));
        }
    }
    Paragraph::new(Span::styled(
        detail,
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(chunks[1], buf);

    render_history_chart(app, summary.difficulty, chunks[2], buf);

    let help = Paragraph::new(Span::styled(
        "r play again · m menu · p profile · q quit",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    help.render(chunks[3], buf);
}

fn render_history_chart(app: &App, difficulty: Difficulty, area: Rect, buf: &mut Buffer) {
    let Some(profile) = app.book.active() else {
        return;
    };

    let points: Vec<(f64, f64)> = profile
        .history
        .iter()
        .filter(|r| r.difficulty == difficulty)
        .enumerate()
        .map(|(idx, r)| (idx as f64, r.score as f64))
        .collect();

    if points.len() < 2 {
        return;
    }

    let max_score = points.iter().map(|p| p.1).fold(1.0_f64, f64::max);

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(difficulty_color(difficulty)))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("recent {difficulty} games")),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().add_modifier(Modifier::DIM))
                .bounds([0.0, (points.len() - 1) as f64]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().add_modifier(Modifier::DIM))
                .bounds([0.0, max_score * 1.2])
                .labels(["0".to_string(), format!("{max_score:.0}")]),
        );
    chart.render(area, buf);
}

fn render_profile(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(profile) = app.book.active() else {
        return;
    };

    let chunks = centered_chunks(
        area,
        &[
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(4),
            Constraint::Length(2),
        ],
    );

    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                "██ ",
                Style::default().fg(avatar_color(&profile.avatar_color)),
            ),
            Span::styled(
                profile.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(Span::styled(
            format!("{} points scored all-time", profile.total_solved),
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    let mut best_lines: Vec<Line> = vec![Line::from(Span::styled(
        "best scores",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for difficulty in Difficulty::ALL {
        best_lines.push(Line::from(Span::styled(
            format!("{difficulty:<8} {}", profile.high_scores.get(difficulty)),
            Style::default().fg(difficulty_color(difficulty)),
        )));
    }
    Paragraph::new(best_lines)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    render_profile_detail(app, profile, chunks[2], buf);

    let help = Paragraph::new(Span::styled(
        "b back",
        Style::default().add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    help.render(chunks[3], buf);
}

fn render_profile_detail(app: &App, profile: &UserProfile, area: Rect, buf: &mut Buffer) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let mut history_lines: Vec<Line> = vec![Line::from(Span::styled(
        "recent games",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for record in profile.history.iter().rev() {
        let age_secs = chrono::Local::now()
            .signed_duration_since(record.timestamp)
            .num_seconds()
            .max(0) as u64;
        let when = HumanTime::from(std::time::Duration::from_secs(age_secs))
            .to_text_en(Accuracy::Rough, Tense::Past);
        history_lines.push(Line::from(Span::styled(
            format!("{:>3} · {:<6} · {when}", record.score, record.difficulty),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    if profile.history.is_empty() {
        history_lines.push(Line::from(Span::styled(
            "no games yet",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    Paragraph::new(history_lines).render(cols[0], buf);

    if app.profile_stats.is_empty() {
        Paragraph::new(Span::styled(
            "no answer stats yet",
            Style::default().add_modifier(Modifier::DIM),
        ))
        .render(cols[1], buf);
        return;
    }

    let rows: Vec<Row> = app
        .profile_stats
        .iter()
        .map(|s| {
            Row::new(vec![
                s.operator.clone(),
                format!("{:.0}", s.avg_response_ms),
                format!("{:.1}", s.miss_rate),
                format!("{}", s.attempts),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["op", "avg ms", "miss %", "tries"]).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(Block::default().borders(Borders::ALL).title("by operator"));
    table.render(cols[1], buf);
}

fn render_celebration(app: &App, area: Rect, buf: &mut Buffer) {
    if !app.celebration.is_active {
        return;
    }

    for particle in &app.celebration.particles {
        let x = particle.x.round();
        let y = particle.y.round();
        if x < 0.0 || y < 0.0 {
            continue;
        }
        let (x, y) = (x as u16, y as u16);
        if x >= area.right() || y >= area.bottom() {
            continue;
        }
        if let Some(cell) = buf.cell_mut((x, y)) {
            cell.set_char(particle.symbol);
            cell.set_style(
                Style::default()
                    .fg(PARTICLE_COLORS[particle.color_index % PARTICLE_COLORS.len()])
                    .add_modifier(Modifier::BOLD),
            );
        }
    }
}
