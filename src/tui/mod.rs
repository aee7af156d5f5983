//! TUI module - Terminal dashboard with ratatui

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap},
};
use std::io::{stdout, Stdout};
use tracing::warn;

use crate::coach::Coach;
use crate::db::{Database, TrainingRecord};
use crate::exercises::ExerciseTaxonomy;
use crate::llm::TextGenerator;
use crate::ml::{one_rep_max, Analytics, AnalyticsSnapshot, Recommender};
use crate::session::{Session, View};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// App state for TUI
pub struct App<G: TextGenerator> {
    db: Database,
    taxonomy: ExerciseTaxonomy,
    coach: Coach<G>,
    session: Session,
    records: Vec<TrainingRecord>,
    status: Option<String>,
    should_quit: bool,
}

impl<G: TextGenerator> App<G> {
    pub fn new(db: Database, taxonomy: ExerciseTaxonomy, coach: Coach<G>, session: Session) -> Result<Self> {
        let owner = session.owner().unwrap_or_default().to_string();
        let records = db.read_all(&owner)?;
        Ok(Self {
            db,
            taxonomy,
            coach,
            session,
            records,
            status: None,
            should_quit: false,
        })
    }

    /// Run the TUI application
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        let result = self.event_loop(&mut terminal);

        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    fn reload(&mut self) {
        let owner = self.session.owner().unwrap_or_default().to_string();
        match self.db.read_all(&owner) {
            Ok(records) => {
                self.records = records;
                self.status = Some(format!("Loaded {} records", self.records.len()));
            }
            Err(e) => {
                warn!("Reload failed: {}", e);
                self.status = Some(format!("Could not read records: {}", e));
            }
        }
    }

    /// Ask the coach; blocks the draw loop until the provider answers
    fn refresh_advice(&mut self) {
        let today = Self::today();
        let handle = tokio::runtime::Handle::current();
        let advice = tokio::task::block_in_place(|| handle.block_on(self.coach.advise(&self.records, today)));
        self.session.set_advice(advice);
    }

    fn render(&self, frame: &mut Frame) {
        match self.session.view() {
            View::Dashboard => self.render_dashboard(frame),
            View::Detail(exercise) => self.render_detail(frame, exercise),
        }
    }

    fn header(&self) -> Paragraph<'static> {
        Paragraph::new(format!(
            "liftos - Progressive overload tracker | {}",
            self.session.owner().unwrap_or("-")
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL))
    }

    fn footer(text: &str) -> Paragraph<'_> {
        Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL))
    }

    fn render_dashboard(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(7),
                Constraint::Length(3),
            ])
            .split(frame.area());

        frame.render_widget(self.header(), chunks[0]);

        // Body part filter
        let mut titles = vec!["All".to_string()];
        titles.extend(self.taxonomy.body_parts().map(str::to_string));
        let selected_tab = self
            .session
            .filter()
            .and_then(|f| self.taxonomy.body_parts().position(|p| p == f))
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .select(selected_tab)
            .highlight_style(Style::default().fg(Color::Yellow).bold())
            .block(Block::default().borders(Borders::ALL).title("Body part"));
        frame.render_widget(tabs, chunks[1]);

        // Exercise list with last session
        let analytics = Analytics::new(self.records.clone());
        let items: Vec<ListItem> = self
            .session
            .visible_exercises(&self.taxonomy)
            .into_iter()
            .map(|exercise| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<26}", exercise)),
                    Span::styled(analytics.last_record_label(exercise), Style::default().fg(Color::Gray)),
                ]))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
            .highlight_symbol(">> ")
            .block(Block::default().borders(Borders::ALL).title("Exercises"));
        let mut state = ListState::default().with_selected(Some(self.session.selected()));
        frame.render_stateful_widget(list, chunks[2], &mut state);

        // Recommendation and coach
        let today = Self::today();
        let recommendation = Recommender::new(&self.records, &self.taxonomy, today).get_recommendation();
        let mut lines = vec![match recommendation {
            Some(rec) => Line::from(vec![
                Span::styled("Train next: ", Style::default().bold()),
                Span::raw(format!(
                    "{} ({}){}",
                    rec.body_part,
                    rec.reason,
                    rec.exercise.map(|e| format!(" - try {}", e)).unwrap_or_default()
                )),
            ]),
            None => Line::from("Train next: add body parts to the taxonomy"),
        }];
        match self.session.advice() {
            Some(advice) => lines.extend(advice.text().lines().map(|l| Line::from(l.to_string()))),
            None => lines.push(Line::styled("Press c for coaching advice", Style::default().fg(Color::DarkGray))),
        }
        if let Some(status) = &self.status {
            lines.push(Line::styled(status.clone(), Style::default().fg(Color::Yellow)));
        }
        let title = if self.coach.is_configured() {
            "Coach"
        } else {
            "Coach (offline: set OPENAI_API_KEY)"
        };
        let coach = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(coach, chunks[3]);

        frame.render_widget(
            Self::footer("q: quit | ←/→: body part | ↑/↓: select | Enter: detail | c: coach | r: reload"),
            chunks[4],
        );
    }

    fn render_detail(&self, frame: &mut Frame, exercise: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(6),
                Constraint::Min(10),
                Constraint::Length(10),
                Constraint::Length(3),
            ])
            .split(frame.area());

        frame.render_widget(self.header(), chunks[0]);

        let snapshot = AnalyticsSnapshot::compute(&self.records, &self.taxonomy, exercise, Self::today());

        // Summary
        let mut lines = vec![Line::from(vec![
            Span::styled(exercise.to_string(), Style::default().fg(Color::Cyan).bold()),
            Span::raw(format!("  [{}]", snapshot.body_part)),
        ])];
        match &snapshot.summary {
            Some(summary) => {
                lines.push(Line::from(format!(
                    "Last: {} | {}kg x {}",
                    summary.last.date.format("%Y-%m-%d"),
                    summary.last.weight(),
                    summary.last.rep_count()
                )));
                lines.push(Line::from(format!(
                    "PR: {}kg ({}) | {} sessions",
                    summary.personal_record.weight(),
                    summary.personal_record.date.format("%Y-%m-%d"),
                    summary.sessions
                )));
            }
            None => lines.push(Line::from("First time! Log a set to start the history.")),
        }
        lines.push(match &snapshot.prediction {
            Some(p) => Line::from(format!(
                "Suggested today: {:.1} kg ({:+.2} kg/week)",
                p.predicted_kg,
                p.daily_progress * 7.0
            )),
            None => Line::styled("Not enough data for a trend yet", Style::default().fg(Color::DarkGray)),
        });
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Summary")),
            chunks[1],
        );

        let series = snapshot
            .summary
            .as_ref()
            .map(|s| s.one_rep_max_series.clone())
            .unwrap_or_default();

        // 1RM trend
        if let Some(first) = series.first() {
            let points: Vec<(f64, f64)> = series
                .iter()
                .map(|p| ((p.date - first.date).num_days() as f64, p.one_rep_max))
                .collect();
            let max_x = points.iter().map(|(x, _)| *x).fold(1.0, f64::max);
            let max_y = points.iter().map(|(_, y)| *y).fold(0.0, f64::max) * 1.1;
            let last_date = series.last().map(|p| p.date).unwrap_or(first.date);

            let dataset = Dataset::default()
                .name("est. 1RM")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&points);
            let chart = Chart::new(vec![dataset])
                .block(Block::default().borders(Borders::ALL).title("Estimated 1RM (Epley)"))
                .x_axis(
                    Axis::default()
                        .bounds([0.0, max_x])
                        .labels(vec![
                            first.date.format("%m/%d").to_string(),
                            last_date.format("%m/%d").to_string(),
                        ]),
                )
                .y_axis(
                    Axis::default()
                        .bounds([0.0, max_y.max(1.0)])
                        .labels(vec!["0".to_string(), format!("{:.0}", max_y)]),
                );
            frame.render_widget(chart, chunks[2]);
        } else {
            frame.render_widget(
                Paragraph::new("No history").block(Block::default().borders(Borders::ALL).title("Estimated 1RM")),
                chunks[2],
            );
        }

        // History, newest first
        let rows: Vec<Row> = series
            .iter()
            .rev()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.date.format("%Y-%m-%d").to_string()),
                    Cell::from(format!("{}", p.weight)),
                    Cell::from(p.reps.to_string()),
                    Cell::from(format!("{:.1}", one_rep_max(p.weight, p.reps))),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(10),
                Constraint::Length(6),
                Constraint::Min(8),
            ],
        )
        .header(Row::new(vec!["Date", "kg", "Reps", "1RM"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("History"));
        frame.render_widget(table, chunks[3]);

        frame.render_widget(Self::footer("q: quit | Esc/Backspace: back | c: coach"), chunks[4]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match (self.session.view().clone(), key.code) {
                (_, KeyCode::Char('q')) => self.should_quit = true,
                (_, KeyCode::Char('c')) => self.refresh_advice(),
                (_, KeyCode::Char('r')) => self.reload(),
                (View::Dashboard, KeyCode::Down) => self.session.select_next(&self.taxonomy),
                (View::Dashboard, KeyCode::Up) => self.session.select_previous(&self.taxonomy),
                (View::Dashboard, KeyCode::Right | KeyCode::Tab) => self.session.next_filter(&self.taxonomy),
                (View::Dashboard, KeyCode::Left | KeyCode::BackTab) => {
                    self.session.previous_filter(&self.taxonomy)
                }
                (View::Dashboard, KeyCode::Enter) => {
                    self.session.open_selected(&self.taxonomy);
                }
                (View::Detail(_), KeyCode::Esc | KeyCode::Backspace) => self.session.back(),
                _ => {}
            }
        }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
